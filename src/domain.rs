//! Domain models: question types, alternatives, questions, assessments, and
//! the curriculum taxonomy reference entities.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Closed set of answer formats a question can have.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
  MultipleChoice,
  TrueFalse,
  ShortAnswer,
}
impl Default for QuestionType {
  fn default() -> Self { QuestionType::MultipleChoice }
}

impl QuestionType {
  /// Parse the display label the generative service emits.
  /// Unknown labels are rejected at the gateway, not coerced.
  pub fn from_label(label: &str) -> Option<Self> {
    match label.trim() {
      "Multiple Choice" => Some(QuestionType::MultipleChoice),
      "True/False" => Some(QuestionType::TrueFalse),
      "Short Answer" => Some(QuestionType::ShortAnswer),
      _ => None,
    }
  }
}

/// Difficulty tier attached to every question.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
  Easy,
  Medium,
  Hard,
}
impl Default for Difficulty {
  fn default() -> Self { Difficulty::Medium }
}

impl Difficulty {
  /// Lenient label parser: anything outside {Easy, Medium, Hard} becomes
  /// Medium rather than failing the whole operation.
  pub fn from_label_lenient(label: &str) -> Self {
    match label.trim() {
      "Easy" => Difficulty::Easy,
      "Hard" => Difficulty::Hard,
      _ => Difficulty::Medium,
    }
  }
}

/// One answer option belonging to a question. Ids are unique within the
/// owning question only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alternative {
  pub id: String,
  pub text: String,
  pub is_correct: bool,
}

impl Alternative {
  pub fn new(text: impl Into<String>, is_correct: bool) -> Self {
    Self { id: Uuid::new_v4().to_string(), text: text.into(), is_correct }
  }
}

/// An exam question owned by the bank. Alternative order is display order;
/// for MultipleChoice/TrueFalse exactly one alternative is correct at any
/// settled state, and for ShortAnswer the first alternative is canonical.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
  pub id: String,
  pub text: String,
  #[serde(rename = "type")]
  pub kind: QuestionType,
  pub alternatives: Vec<Alternative>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub image_url: Option<String>,
  pub subject: String,
  pub difficulty: Difficulty,
  #[serde(default)]
  pub standards: Vec<String>,
  #[serde(default)]
  pub descriptors: Vec<String>,
}

impl Question {
  /// Default scaffold used by the manual "add" action: a MultipleChoice
  /// question with one correct and two incorrect alternatives.
  pub fn scaffold() -> Self {
    Self {
      id: Uuid::new_v4().to_string(),
      text: "New question text...".into(),
      kind: QuestionType::MultipleChoice,
      alternatives: vec![
        Alternative::new("Correct Answer", true),
        Alternative::new("Incorrect Answer 1", false),
        Alternative::new("Incorrect Answer 2", false),
      ],
      image_url: None,
      subject: "General".into(),
      difficulty: Difficulty::Medium,
      standards: vec![],
      descriptors: vec![],
    }
  }

  /// The alternative currently marked correct, if any.
  pub fn correct_alternative(&self) -> Option<&Alternative> {
    self.alternatives.iter().find(|a| a.is_correct)
  }
}

/// Lifecycle state of an assessment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
  Draft,
  Published,
  Archived,
}

/// A composed exam referencing bank questions by id. Referenced ids must
/// exist in the bank; deletes cascade through `question_ids`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
  pub id: String,
  pub title: String,
  pub subject: String,
  pub status: AssessmentStatus,
  pub created_at: String,
  pub last_modified: String,
  pub question_ids: Vec<String>,
}

/// Hierarchy tier of a curriculum standard entry. Only Objective-level
/// entries are used for classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StandardLevel {
  General,
  Specific,
  Objective,
}

/// Broad curriculum standard code (upper taxonomy tier).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardCode {
  pub id: String,
  pub code: String,
  pub description: String,
  pub level: StandardLevel,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub parent_id: Option<String>,
}

/// Fine-grained descriptor code referencing exactly one standard code.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptorCode {
  pub id: String,
  pub code: String,
  pub description: String,
  pub standard_id: String,
}

/// Reusable answer-sheet template (reference data only).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerTemplate {
  pub id: String,
  pub name: String,
  pub question_type: QuestionType,
  pub description: String,
  pub created_at: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn scaffold_has_exactly_one_correct_alternative() {
    let q = Question::scaffold();
    assert_eq!(q.kind, QuestionType::MultipleChoice);
    assert_eq!(q.alternatives.len(), 3);
    let correct: Vec<_> = q.alternatives.iter().filter(|a| a.is_correct).collect();
    assert_eq!(correct.len(), 1);
    assert_eq!(correct[0].text, "Correct Answer");
  }

  #[test]
  fn scaffold_ids_are_unique() {
    let a = Question::scaffold();
    let b = Question::scaffold();
    assert_ne!(a.id, b.id);
    let mut alt_ids: Vec<_> = a.alternatives.iter().map(|x| x.id.as_str()).collect();
    alt_ids.sort();
    alt_ids.dedup();
    assert_eq!(alt_ids.len(), 3);
  }

  #[test]
  fn difficulty_labels_coerce_to_medium() {
    assert_eq!(Difficulty::from_label_lenient("Easy"), Difficulty::Easy);
    assert_eq!(Difficulty::from_label_lenient("Hard"), Difficulty::Hard);
    assert_eq!(Difficulty::from_label_lenient("Medium"), Difficulty::Medium);
    assert_eq!(Difficulty::from_label_lenient("Impossible"), Difficulty::Medium);
    assert_eq!(Difficulty::from_label_lenient(""), Difficulty::Medium);
  }

  #[test]
  fn question_type_labels_are_strict() {
    assert_eq!(QuestionType::from_label("Multiple Choice"), Some(QuestionType::MultipleChoice));
    assert_eq!(QuestionType::from_label("True/False"), Some(QuestionType::TrueFalse));
    assert_eq!(QuestionType::from_label("Short Answer"), Some(QuestionType::ShortAnswer));
    assert_eq!(QuestionType::from_label("Essay"), None);
  }
}
