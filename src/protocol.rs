//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::builder::Preview;
use crate::domain::{
    AnswerTemplate, Assessment, DescriptorCode, Difficulty, Question, StandardCode,
};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,

    // Question bank
    ListQuestions {
        #[serde(default)]
        search: Option<String>,
    },
    AddQuestion,
    UpdateQuestion {
        question: Question,
    },
    DeleteQuestion {
        #[serde(rename = "questionId")]
        question_id: String,
    },
    GenerateQuestion {
        topic: String,
    },
    ExtractFromDocument {
        #[serde(rename = "documentBase64")]
        document_base64: String,
        mime: String,
    },

    // Edit sessions
    BeginEdit {
        #[serde(rename = "questionId")]
        question_id: String,
    },
    SetDraftText {
        #[serde(rename = "questionId")]
        question_id: String,
        text: String,
    },
    SetDraftSubject {
        #[serde(rename = "questionId")]
        question_id: String,
        subject: String,
    },
    SetDraftDifficulty {
        #[serde(rename = "questionId")]
        question_id: String,
        difficulty: Difficulty,
    },
    SetDraftCodes {
        #[serde(rename = "questionId")]
        question_id: String,
        standards: Vec<String>,
        descriptors: Vec<String>,
    },
    SetAlternativeText {
        #[serde(rename = "questionId")]
        question_id: String,
        #[serde(rename = "alternativeId")]
        alternative_id: String,
        text: String,
    },
    MarkCorrect {
        #[serde(rename = "questionId")]
        question_id: String,
        #[serde(rename = "alternativeId")]
        alternative_id: String,
    },
    ApplyPhrasing {
        #[serde(rename = "questionId")]
        question_id: String,
        text: String,
    },
    SaveDraft {
        #[serde(rename = "questionId")]
        question_id: String,
    },
    CancelDraft {
        #[serde(rename = "questionId")]
        question_id: String,
    },

    // Per-draft AI assists
    Classify {
        #[serde(rename = "questionId")]
        question_id: String,
    },
    SuggestPhrasings {
        #[serde(rename = "questionId")]
        question_id: String,
    },
    GenerateDistractors {
        #[serde(rename = "questionId")]
        question_id: String,
    },

    // Assessment builder
    ToggleSelection {
        #[serde(rename = "questionId")]
        question_id: String,
    },
    SetAssessmentTitle {
        title: String,
    },
    SetPageBudget {
        pages: u32,
    },
    SuggestLayout,
    Preview,

    // Reference data
    ListAssessments,
    ListTaxonomy,
    ListTemplates,
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Questions {
        questions: Vec<Question>,
    },
    Question {
        question: Question,
    },
    Draft {
        draft: Question,
    },
    /// An async AI result arrived after its edit session ended and was
    /// dropped without touching anything.
    Discarded {
        #[serde(rename = "questionId")]
        question_id: String,
    },
    Deleted {
        #[serde(rename = "questionId")]
        question_id: String,
        removed: bool,
    },
    Saved {
        question: Question,
    },
    Canceled {
        #[serde(rename = "questionId")]
        question_id: String,
    },
    Phrasings {
        suggestions: Vec<String>,
    },
    Extracted {
        count: usize,
        questions: Vec<Question>,
    },
    Selection {
        selected: bool,
        selection: Vec<String>,
    },
    Builder {
        title: String,
        #[serde(rename = "pageBudget")]
        page_budget: u32,
        selection: Vec<String>,
    },
    LayoutSuggestion {
        pages: u32,
        message: String,
    },
    Preview {
        preview: Preview,
    },
    Assessments {
        assessments: Vec<Assessment>,
    },
    Taxonomy {
        standards: Vec<StandardCode>,
        descriptors: Vec<DescriptorCode>,
        subjects: Vec<String>,
    },
    Templates {
        templates: Vec<AnswerTemplate>,
    },
    Error {
        message: String,
    },
}

//
// HTTP request/response DTOs
//

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
    #[serde(rename = "aiEnabled")]
    pub ai_enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct QuestionsQuery {
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QuestionIdIn {
    #[serde(rename = "questionId")]
    pub question_id: String,
}

#[derive(Serialize)]
pub struct DeleteOut {
    pub removed: bool,
}

#[derive(Debug, Deserialize)]
pub struct DraftTextIn {
    #[serde(rename = "questionId")]
    pub question_id: String,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct DraftSubjectIn {
    #[serde(rename = "questionId")]
    pub question_id: String,
    pub subject: String,
}

#[derive(Debug, Deserialize)]
pub struct DraftDifficultyIn {
    #[serde(rename = "questionId")]
    pub question_id: String,
    pub difficulty: Difficulty,
}

#[derive(Debug, Deserialize)]
pub struct DraftCodesIn {
    #[serde(rename = "questionId")]
    pub question_id: String,
    #[serde(default)]
    pub standards: Vec<String>,
    #[serde(default)]
    pub descriptors: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct AlternativeTextIn {
    #[serde(rename = "questionId")]
    pub question_id: String,
    #[serde(rename = "alternativeId")]
    pub alternative_id: String,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct MarkCorrectIn {
    #[serde(rename = "questionId")]
    pub question_id: String,
    #[serde(rename = "alternativeId")]
    pub alternative_id: String,
}

#[derive(Serialize)]
pub struct DraftOut {
    /// Absent when a stale async result was discarded instead of merged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft: Option<Question>,
    pub applied: bool,
}

#[derive(Serialize)]
pub struct CanceledOut {
    pub canceled: bool,
}

#[derive(Serialize)]
pub struct PhrasingsOut {
    pub suggestions: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct TopicIn {
    pub topic: String,
}

#[derive(Debug, Deserialize)]
pub struct ExtractIn {
    #[serde(rename = "documentBase64")]
    pub document_base64: String,
    pub mime: String,
}

#[derive(Serialize)]
pub struct ExtractOut {
    pub count: usize,
    pub questions: Vec<Question>,
}

#[derive(Debug, Deserialize)]
pub struct TitleIn {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct PagesIn {
    pub pages: u32,
}

#[derive(Serialize)]
pub struct BuilderOut {
    pub title: String,
    #[serde(rename = "pageBudget")]
    pub page_budget: u32,
    pub selection: Vec<String>,
}

#[derive(Serialize)]
pub struct ToggleOut {
    pub selected: bool,
    pub selection: Vec<String>,
}

#[derive(Serialize)]
pub struct LayoutOut {
    pub pages: u32,
    pub message: String,
}

#[derive(Serialize)]
pub struct TaxonomyOut {
    pub standards: Vec<StandardCode>,
    pub descriptors: Vec<DescriptorCode>,
    pub subjects: Vec<String>,
}
