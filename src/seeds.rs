//! Seed data: sample questions, assessments, taxonomy codes, and answer
//! templates that make the app useful before any content is authored.

use crate::domain::{
  Alternative, AnswerTemplate, Assessment, AssessmentStatus, DescriptorCode, Difficulty, Question,
  QuestionType, StandardCode, StandardLevel,
};

/// Subjects offered by the editor's subject picker. The domain itself keeps
/// subject as an open string.
pub const SUBJECTS: &[&str] = &["Geography", "Chemistry", "Literature", "Math", "History", "Physics"];

fn alt(id: &str, text: &str, is_correct: bool) -> Alternative {
  Alternative { id: id.into(), text: text.into(), is_correct }
}

/// Built-in sample questions seeding the bank.
pub fn seed_questions() -> Vec<Question> {
  vec![
    Question {
      id: "q1".into(),
      text: "What is the capital of France?".into(),
      kind: QuestionType::MultipleChoice,
      alternatives: vec![
        alt("a1", "Berlin", false),
        alt("a2", "Madrid", false),
        alt("a3", "Paris", true),
        alt("a4", "Rome", false),
      ],
      image_url: Some("https://picsum.photos/400/200".into()),
      subject: "Geography".into(),
      difficulty: Difficulty::Easy,
      standards: vec!["EF06GE01".into()],
      descriptors: vec!["D01".into()],
    },
    Question {
      id: "q2".into(),
      text: "The chemical symbol for water is H2O.".into(),
      kind: QuestionType::TrueFalse,
      alternatives: vec![alt("b1", "True", true), alt("b2", "False", false)],
      image_url: None,
      subject: "Chemistry".into(),
      difficulty: Difficulty::Easy,
      standards: vec!["EF09CI01".into()],
      descriptors: vec!["D05".into()],
    },
    Question {
      id: "q3".into(),
      text: "Who wrote \"To Kill a Mockingbird\"?".into(),
      kind: QuestionType::ShortAnswer,
      alternatives: vec![alt("c1", "Harper Lee", true)],
      image_url: None,
      subject: "Literature".into(),
      difficulty: Difficulty::Medium,
      standards: vec!["EM13LGG101".into()],
      descriptors: vec!["D12".into()],
    },
  ]
}

/// Sample assessments referencing the seed questions.
pub fn seed_assessments() -> Vec<Assessment> {
  vec![
    Assessment {
      id: "as1".into(),
      title: "Midterm Geography Exam".into(),
      subject: "Geography".into(),
      status: AssessmentStatus::Published,
      created_at: "2023-10-15".into(),
      last_modified: "2023-10-20".into(),
      question_ids: vec!["q1".into()],
    },
    Assessment {
      id: "as2".into(),
      title: "Basic Chemistry Quiz".into(),
      subject: "Chemistry".into(),
      status: AssessmentStatus::Draft,
      created_at: "2023-11-01".into(),
      last_modified: "2023-11-02".into(),
      question_ids: vec!["q2".into()],
    },
    Assessment {
      id: "as3".into(),
      title: "American Literature Pop Quiz".into(),
      subject: "Literature".into(),
      status: AssessmentStatus::Archived,
      created_at: "2023-09-25".into(),
      last_modified: "2023-09-25".into(),
      question_ids: vec!["q3".into()],
    },
  ]
}

/// Curriculum standard codes (upper taxonomy tier). Only Objective-level
/// entries are offered for classification.
pub fn seed_standard_codes() -> Vec<StandardCode> {
  vec![
    StandardCode {
      id: "std1".into(),
      code: "EF06GE01".into(),
      description: "Describe elements and processes of natural and human-shaped landscapes.".into(),
      level: StandardLevel::Objective,
      parent_id: None,
    },
    StandardCode {
      id: "std2".into(),
      code: "EF09CI01".into(),
      description: "Investigate the composition of matter and chemical transformations.".into(),
      level: StandardLevel::Objective,
      parent_id: None,
    },
    StandardCode {
      id: "std3".into(),
      code: "EM13LGG101".into(),
      description: "Understand and analyze processes of discourse production and circulation.".into(),
      level: StandardLevel::Objective,
      parent_id: None,
    },
  ]
}

/// Descriptor codes (finer taxonomy tier), each under one standard code.
pub fn seed_descriptor_codes() -> Vec<DescriptorCode> {
  vec![
    DescriptorCode {
      id: "d1".into(),
      code: "D01".into(),
      description: "Locate explicit information in a text.".into(),
      standard_id: "std1".into(),
    },
    DescriptorCode {
      id: "d2".into(),
      code: "D05".into(),
      description: "Identify the basic structure of an argumentative text.".into(),
      standard_id: "std2".into(),
    },
    DescriptorCode {
      id: "d3".into(),
      code: "D12".into(),
      description: "Identify the purpose of texts of different genres.".into(),
      standard_id: "std3".into(),
    },
  ]
}

/// Answer-sheet templates (reference data shown by the template picker).
pub fn seed_answer_templates() -> Vec<AnswerTemplate> {
  vec![
    AnswerTemplate {
      id: "t1".into(),
      name: "Standard MC with 4 Options".into(),
      question_type: QuestionType::MultipleChoice,
      description: "A standard multiple choice template with 1 correct and 3 incorrect answers.".into(),
      created_at: "2023-08-01".into(),
    },
    AnswerTemplate {
      id: "t2".into(),
      name: "Simple True/False".into(),
      question_type: QuestionType::TrueFalse,
      description: "A basic True/False answer structure.".into(),
      created_at: "2023-08-02".into(),
    },
  ]
}
