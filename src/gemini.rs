//! Minimal Gemini client for our use-cases.
//!
//! We only call `generateContent` and always request a strict JSON response
//! against a declared schema. Calls are instrumented and log model names,
//! latencies, and response sizes (not contents).
//!
//! NOTE: We never log the API key and we keep payload truncations short.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::config::Prompts;
use crate::domain::{Alternative, Difficulty, Question, QuestionType};
use crate::util::fill_template;

/// Uniform failure raised by every gateway operation: the operation name
/// plus the underlying cause. Callers never see a partial result.
#[derive(Debug, Error)]
#[error("AI operation '{op}' failed: {cause}")]
pub struct AssistError {
  pub op: &'static str,
  pub cause: String,
}

/// Classification result for a single question text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classification {
  pub standard: String,
  pub descriptor: String,
  pub difficulty: Difficulty,
}

#[derive(Clone)]
pub struct Gemini {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
}

impl Gemini {
  /// Construct the client if we find GEMINI_API_KEY; otherwise return None.
  /// Absence of the key disables every AI affordance up front.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("GEMINI_API_KEY").ok()?;
    let base_url = std::env::var("GEMINI_BASE_URL")
      .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".into());
    let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".into());

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .ok()?;

    Some(Self { client, api_key, base_url, model })
  }

  /// JSON-schema `generateContent` call. Generic over the target type T.
  #[instrument(level = "info", skip(self, parts, schema), fields(model = %self.model))]
  async fn generate_json<T: for<'a> Deserialize<'a>>(
    &self,
    parts: Vec<PartReq>,
    schema: Value,
  ) -> Result<T, String> {
    let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
    let req = GenerateContentRequest {
      contents: vec![ContentReq { parts }],
      generation_config: GenerationConfig {
        response_mime_type: "application/json".into(),
        response_schema: schema,
      },
    };

    let res = self
      .client
      .post(&url)
      .header(USER_AGENT, "bancada-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header("x-goog-api-key", &self.api_key)
      .json(&req)
      .send()
      .await
      .map_err(|e| e.to_string())?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_gemini_error(&body).unwrap_or_else(|| body);
      return Err(format!("Gemini HTTP {}: {}", status, msg));
    }

    let body: GenerateContentResponse = res.json().await.map_err(|e| e.to_string())?;
    if let Some(usage) = &body.usage_metadata {
      info!(prompt_tokens = ?usage.prompt_token_count, response_tokens = ?usage.candidates_token_count, total_tokens = ?usage.total_token_count, "Gemini usage");
    }
    let text = body
      .candidates
      .into_iter()
      .next()
      .and_then(|c| c.content)
      .and_then(|c| c.parts.into_iter().next())
      .and_then(|p| p.text)
      .ok_or_else(|| "empty candidate response".to_string())?;

    serde_json::from_str::<T>(&text).map_err(|e| format!("JSON parse error: {}", e))
  }

  // --- High-level operations (domain-specialized) ---

  /// Classify a question text into one standard code, one descriptor code,
  /// and a difficulty. Out-of-set difficulty labels coerce to Medium.
  #[instrument(level = "info", skip(self, prompts, question_text), fields(text_len = question_text.len()))]
  pub async fn classify(
    &self,
    prompts: &Prompts,
    question_text: &str,
  ) -> Result<Classification, AssistError> {
    const OP: &str = "classify";
    let task = fill_template(&prompts.classify_task_template, &[("text", question_text)]);
    let start = std::time::Instant::now();
    let raw = self
      .generate_json::<ClassificationRaw>(vec![PartReq::text(task)], classification_schema())
      .await
      .map_err(|cause| op_failed(OP, cause))?;
    info!(elapsed = ?start.elapsed(), standard = %raw.standard, descriptor = %raw.descriptor, "Classification received");

    Ok(Classification {
      standard: raw.standard,
      descriptor: raw.descriptor,
      difficulty: Difficulty::from_label_lenient(&raw.difficulty),
    })
  }

  /// Suggest alternative phrasings for a question text. A fresh call
  /// regenerates; nothing is cached.
  #[instrument(level = "info", skip(self, prompts, question_text), fields(text_len = question_text.len()))]
  pub async fn suggest_phrasings(
    &self,
    prompts: &Prompts,
    question_text: &str,
  ) -> Result<Vec<String>, AssistError> {
    const OP: &str = "suggest_phrasings";
    let task = fill_template(&prompts.phrasing_task_template, &[("text", question_text)]);
    let suggestions = self
      .generate_json::<Vec<String>>(vec![PartReq::text(task)], string_array_schema())
      .await
      .map_err(|cause| op_failed(OP, cause))?;
    info!(count = suggestions.len(), "Phrasing suggestions received");
    Ok(suggestions)
  }

  /// Generate plausible-but-incorrect alternatives for a question, based on
  /// its currently correct answer. Fails fast with an empty list (and no
  /// network call) when no alternative is marked correct.
  #[instrument(level = "info", skip(self, prompts, question), fields(question_id = %question.id))]
  pub async fn generate_distractors(
    &self,
    prompts: &Prompts,
    question: &Question,
  ) -> Result<Vec<String>, AssistError> {
    const OP: &str = "generate_distractors";
    let correct = match question.correct_alternative() {
      Some(a) => a.text.clone(),
      None => {
        warn!(question_id = %question.id, "Cannot generate distractors without a correct answer");
        return Ok(vec![]);
      }
    };
    let task = fill_template(
      &prompts.distractor_task_template,
      &[("text", question.text.as_str()), ("correct", correct.as_str())],
    );
    let distractors = self
      .generate_json::<Vec<String>>(vec![PartReq::text(task)], string_array_schema())
      .await
      .map_err(|cause| op_failed(OP, cause))?;
    info!(count = distractors.len(), "Distractors received");
    Ok(distractors)
  }

  /// Generate a fully-formed question about a topic, with freshly minted
  /// ids for the question and each alternative.
  #[instrument(level = "info", skip(self, prompts, topic), fields(topic_len = topic.len()))]
  pub async fn generate_question(
    &self,
    prompts: &Prompts,
    topic: &str,
  ) -> Result<Question, AssistError> {
    const OP: &str = "generate_question";
    let task = fill_template(&prompts.generate_task_template, &[("topic", topic)]);
    let start = std::time::Instant::now();
    let result = self
      .generate_json::<GenQuestion>(vec![PartReq::text(task)], question_schema())
      .await;
    let elapsed = start.elapsed();

    let gen = match result {
      Ok(gen) => gen,
      Err(e) => {
        error!(?elapsed, error = %e, "Model call failed during question generation");
        return Err(op_failed(OP, e));
      }
    };

    let q = into_question(gen).map_err(|cause| op_failed(OP, cause))?;
    info!(
      ?elapsed,
      question_id = %q.id,
      text_preview = %crate::util::trunc_for_log(&q.text, 60),
      "Question successfully generated"
    );
    Ok(q)
  }

  /// Extract every recognizable question from a document supplied as a
  /// base64 payload. An empty list is a valid, non-error outcome.
  #[instrument(level = "info", skip(self, prompts, document_base64, mime), fields(payload_len = document_base64.len(), %mime))]
  pub async fn extract_from_document(
    &self,
    prompts: &Prompts,
    document_base64: &str,
    mime: &str,
  ) -> Result<Vec<Question>, AssistError> {
    const OP: &str = "extract_from_document";
    let bytes = BASE64
      .decode(document_base64.trim())
      .map_err(|e| op_failed(OP, format!("invalid base64 document payload: {}", e)))?;
    info!(document_bytes = bytes.len(), "Submitting document for extraction");

    let parts = vec![
      PartReq::inline(mime, document_base64.trim()),
      PartReq::text(prompts.extract_task.clone()),
    ];
    let extracted = self
      .generate_json::<Vec<GenQuestion>>(parts, questions_array_schema())
      .await
      .map_err(|cause| op_failed(OP, cause))?;

    let mut out = Vec::with_capacity(extracted.len());
    for gen in extracted {
      out.push(into_question(gen).map_err(|cause| op_failed(OP, cause))?);
    }
    info!(count = out.len(), "Document extraction finished");
    Ok(out)
  }
}

fn op_failed(op: &'static str, cause: String) -> AssistError {
  AssistError { op, cause }
}

// --- Generated-question validation ---

/// Convert a decoded service payload into a domain question, minting fresh
/// ids. Rejects unknown type labels, empty alternative lists, and
/// MultipleChoice/TrueFalse payloads without exactly one correct answer.
/// Difficulty stays lenient; structure does not.
fn into_question(gen: GenQuestion) -> Result<Question, String> {
  let kind = QuestionType::from_label(&gen.kind)
    .ok_or_else(|| format!("unrecognized question type label: '{}'", gen.kind))?;

  if gen.alternatives.is_empty() {
    return Err("question has no alternatives".into());
  }
  if matches!(kind, QuestionType::MultipleChoice | QuestionType::TrueFalse) {
    let correct = gen.alternatives.iter().filter(|a| a.is_correct).count();
    if correct != 1 {
      return Err(format!("expected exactly one correct alternative, found {}", correct));
    }
  }

  Ok(Question {
    id: Uuid::new_v4().to_string(),
    text: gen.text,
    kind,
    alternatives: gen
      .alternatives
      .into_iter()
      .map(|a| Alternative::new(a.text, a.is_correct))
      .collect(),
    image_url: None,
    subject: gen.subject,
    difficulty: Difficulty::from_label_lenient(&gen.difficulty),
    standards: gen.standards,
    descriptors: gen.descriptors,
  })
}

// --- Declared response schemas ---

fn classification_schema() -> Value {
  json!({
    "type": "OBJECT",
    "properties": {
      "standard": { "type": "STRING" },
      "descriptor": { "type": "STRING" },
      "difficulty": { "type": "STRING" },
    },
    "required": ["standard", "descriptor", "difficulty"],
  })
}

fn string_array_schema() -> Value {
  json!({ "type": "ARRAY", "items": { "type": "STRING" } })
}

fn question_schema() -> Value {
  json!({
    "type": "OBJECT",
    "properties": {
      "text": { "type": "STRING", "description": "The full text of the question." },
      "type": { "type": "STRING", "description": "Type of question: 'Multiple Choice', 'True/False', or 'Short Answer'." },
      "alternatives": {
        "type": "ARRAY",
        "description": "List of possible answers.",
        "items": {
          "type": "OBJECT",
          "properties": {
            "text": { "type": "STRING", "description": "The text of the answer alternative." },
            "isCorrect": { "type": "BOOLEAN", "description": "Whether this alternative is the correct answer." },
          },
          "required": ["text", "isCorrect"],
        },
      },
      "subject": { "type": "STRING", "description": "A relevant subject for the question (e.g., 'Geography')." },
      "difficulty": { "type": "STRING", "description": "Difficulty level: 'Easy', 'Medium', or 'Hard'." },
      "standards": { "type": "ARRAY", "description": "An array with one suggested standard code.", "items": { "type": "STRING" } },
      "descriptors": { "type": "ARRAY", "description": "An array with one suggested descriptor code.", "items": { "type": "STRING" } },
    },
    "required": ["text", "type", "alternatives", "subject", "difficulty", "standards", "descriptors"],
  })
}

fn questions_array_schema() -> Value {
  json!({ "type": "ARRAY", "items": question_schema() })
}

// --- Wire DTOs ---

#[derive(Serialize)]
struct GenerateContentRequest {
  contents: Vec<ContentReq>,
  #[serde(rename = "generationConfig")]
  generation_config: GenerationConfig,
}
#[derive(Serialize)]
struct ContentReq {
  parts: Vec<PartReq>,
}
#[derive(Serialize)]
struct PartReq {
  #[serde(skip_serializing_if = "Option::is_none")]
  text: Option<String>,
  #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
  inline_data: Option<InlineData>,
}
impl PartReq {
  fn text(s: impl Into<String>) -> Self {
    Self { text: Some(s.into()), inline_data: None }
  }
  fn inline(mime: &str, data: &str) -> Self {
    Self {
      text: None,
      inline_data: Some(InlineData { mime_type: mime.into(), data: data.into() }),
    }
  }
}
#[derive(Serialize)]
struct InlineData {
  #[serde(rename = "mimeType")]
  mime_type: String,
  data: String,
}
#[derive(Serialize)]
struct GenerationConfig {
  #[serde(rename = "responseMimeType")]
  response_mime_type: String,
  #[serde(rename = "responseSchema")]
  response_schema: Value,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
  #[serde(default)]
  candidates: Vec<CandidateResp>,
  #[serde(default, rename = "usageMetadata")]
  usage_metadata: Option<UsageMetadata>,
}
#[derive(Deserialize)]
struct CandidateResp {
  content: Option<ContentResp>,
}
#[derive(Deserialize)]
struct ContentResp {
  #[serde(default)]
  parts: Vec<PartResp>,
}
#[derive(Deserialize)]
struct PartResp {
  text: Option<String>,
}
#[derive(Deserialize)]
struct UsageMetadata {
  #[serde(default, rename = "promptTokenCount")]
  prompt_token_count: Option<u32>,
  #[serde(default, rename = "candidatesTokenCount")]
  candidates_token_count: Option<u32>,
  #[serde(default, rename = "totalTokenCount")]
  total_token_count: Option<u32>,
}

#[derive(Deserialize)]
struct ClassificationRaw {
  standard: String,
  descriptor: String,
  difficulty: String,
}

#[derive(Deserialize)]
struct GenAlternative {
  text: String,
  #[serde(rename = "isCorrect")]
  is_correct: bool,
}

#[derive(Deserialize)]
struct GenQuestion {
  text: String,
  #[serde(rename = "type")]
  kind: String,
  alternatives: Vec<GenAlternative>,
  subject: String,
  difficulty: String,
  #[serde(default)]
  standards: Vec<String>,
  #[serde(default)]
  descriptors: Vec<String>,
}

/// Try to extract a clean error message from a Gemini error body.
fn extract_gemini_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap {
    error: EObj,
  }
  #[derive(Deserialize)]
  struct EObj {
    message: String,
  }
  match serde_json::from_str::<EWrap>(body) {
    Ok(w) => Some(w.error.message),
    Err(_) => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn gen(kind: &str, correct_flags: &[bool]) -> GenQuestion {
    GenQuestion {
      text: "What is the boiling point of water at sea level?".into(),
      kind: kind.into(),
      alternatives: correct_flags
        .iter()
        .enumerate()
        .map(|(i, &c)| GenAlternative { text: format!("option {}", i), is_correct: c })
        .collect(),
      subject: "Chemistry".into(),
      difficulty: "Easy".into(),
      standards: vec!["EF09CI01".into()],
      descriptors: vec!["D05".into()],
    }
  }

  #[test]
  fn accepts_multiple_choice_with_one_correct() {
    let q = into_question(gen("Multiple Choice", &[false, true, false, false])).expect("valid");
    assert_eq!(q.kind, QuestionType::MultipleChoice);
    assert_eq!(q.alternatives.len(), 4);
    assert_eq!(q.alternatives.iter().filter(|a| a.is_correct).count(), 1);
    assert!(!q.id.is_empty());
  }

  #[test]
  fn rejects_multiple_choice_without_exactly_one_correct() {
    assert!(into_question(gen("Multiple Choice", &[false, false])).is_err());
    assert!(into_question(gen("Multiple Choice", &[true, true])).is_err());
    assert!(into_question(gen("True/False", &[true, true])).is_err());
  }

  #[test]
  fn rejects_unknown_type_label_and_empty_alternatives() {
    assert!(into_question(gen("Essay", &[true])).is_err());
    assert!(into_question(gen("Multiple Choice", &[])).is_err());
  }

  #[test]
  fn short_answer_skips_the_correct_count_rule() {
    let q = into_question(gen("Short Answer", &[false])).expect("valid");
    assert_eq!(q.kind, QuestionType::ShortAnswer);
    assert_eq!(q.alternatives.len(), 1);
  }

  #[test]
  fn generated_difficulty_is_coerced_not_rejected() {
    let mut g = gen("Multiple Choice", &[true, false]);
    g.difficulty = "Brutal".into();
    let q = into_question(g).expect("valid");
    assert_eq!(q.difficulty, Difficulty::Medium);
  }

  #[test]
  fn minted_alternative_ids_are_fresh_and_unique() {
    let q = into_question(gen("Multiple Choice", &[true, false, false])).expect("valid");
    let mut ids: Vec<_> = q.alternatives.iter().map(|a| a.id.clone()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 3);
  }

  fn offline_client() -> Gemini {
    // Points at a closed port; tests below must return before any request.
    Gemini {
      client: reqwest::Client::new(),
      api_key: "test-key".into(),
      base_url: "http://127.0.0.1:9".into(),
      model: "test-model".into(),
    }
  }

  #[tokio::test]
  async fn distractors_without_a_correct_answer_skip_the_network() {
    let g = offline_client();
    let prompts = Prompts::default();
    let mut q = Question::scaffold();
    for a in &mut q.alternatives {
      a.is_correct = false;
    }
    let out = g.generate_distractors(&prompts, &q).await.expect("soft no-op");
    assert!(out.is_empty());
  }

  #[tokio::test]
  async fn extraction_rejects_invalid_base64_before_any_request() {
    let g = offline_client();
    let prompts = Prompts::default();
    let err = g
      .extract_from_document(&prompts, "not base64 at all!!", "application/pdf")
      .await
      .expect_err("must fail");
    assert_eq!(err.op, "extract_from_document");
    assert!(err.cause.contains("base64"));
  }

  #[test]
  fn question_schema_declares_the_required_fields() {
    let s = question_schema();
    let required: Vec<_> = s["required"].as_array().unwrap().iter().map(|v| v.as_str().unwrap()).collect();
    for f in ["text", "type", "alternatives", "subject", "difficulty", "standards", "descriptors"] {
      assert!(required.contains(&f), "missing {}", f);
    }
  }
}
