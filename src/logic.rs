//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - question bank CRUD + search
//!   - the edit-session flow (begin/mutate/save/cancel)
//!   - the AI assists, each gated on configuration and guarded against
//!     stale results landing in a session that has since ended
//!   - builder operations and the derived preview

use tracing::{error, info, instrument};

use crate::builder::Preview;
use crate::domain::{Difficulty, Question};
use crate::error::ApiError;
use crate::gemini::Gemini;
use crate::state::AppState;

/// Outcome of an async AI merge: either the updated draft, or nothing
/// because the originating session ended while the call was in flight.
pub enum MergeOutcome {
  Applied(Question),
  Discarded,
}

fn require_ai(state: &AppState) -> Result<&Gemini, ApiError> {
  state.gemini.as_ref().ok_or(ApiError::AiDisabled)
}

fn no_draft(id: &str) -> ApiError {
  ApiError::NoActiveDraft(id.to_string())
}

// -------- Question bank --------

#[instrument(level = "info", skip(state), fields(term_len = search.as_deref().unwrap_or("").len()))]
pub async fn list_questions(state: &AppState, search: Option<String>) -> Vec<Question> {
  state.search_questions(search.as_deref().unwrap_or("")).await
}

#[instrument(level = "info", skip(state))]
pub async fn add_question(state: &AppState) -> Question {
  state.add_scaffold().await
}

#[instrument(level = "info", skip(state, question), fields(id = %question.id))]
pub async fn update_question(state: &AppState, question: Question) -> Question {
  state.update_question(question.clone()).await;
  question
}

#[instrument(level = "info", skip(state), fields(%question_id))]
pub async fn delete_question(state: &AppState, question_id: &str) -> bool {
  state.delete_question(question_id).await
}

#[instrument(level = "info", skip(state, topic), fields(topic_len = topic.len()))]
pub async fn generate_question(state: &AppState, topic: &str) -> Result<Question, ApiError> {
  let ai = require_ai(state)?;
  let question = ai.generate_question(&state.prompts, topic).await.map_err(|e| {
    error!(target: "assist", error = %e, "Question generation failed");
    e
  })?;
  state.insert_question(question.clone()).await;
  info!(target: "bank", id = %question.id, "Generated question added");
  Ok(question)
}

#[instrument(level = "info", skip(state, document_base64, mime), fields(payload_len = document_base64.len(), %mime))]
pub async fn extract_from_document(
  state: &AppState,
  document_base64: &str,
  mime: &str,
) -> Result<Vec<Question>, ApiError> {
  let ai = require_ai(state)?;
  let questions = ai
    .extract_from_document(&state.prompts, document_base64, mime)
    .await
    .map_err(|e| {
      error!(target: "assist", error = %e, "Document extraction failed");
      e
    })?;
  state.insert_extracted(questions.clone()).await;
  info!(target: "bank", count = questions.len(), "Extracted questions added");
  Ok(questions)
}

// -------- Edit sessions --------

#[instrument(level = "info", skip(state), fields(%question_id))]
pub async fn begin_edit(state: &AppState, question_id: &str) -> Result<Question, ApiError> {
  state
    .begin_edit(question_id)
    .await
    .ok_or_else(|| ApiError::UnknownQuestion(question_id.to_string()))
}

pub async fn set_draft_text(state: &AppState, id: &str, text: String) -> Result<Question, ApiError> {
  state.mutate_draft(id, |e| e.set_text(text)).await.ok_or_else(|| no_draft(id))
}

pub async fn set_draft_subject(
  state: &AppState,
  id: &str,
  subject: String,
) -> Result<Question, ApiError> {
  state.mutate_draft(id, |e| e.set_subject(subject)).await.ok_or_else(|| no_draft(id))
}

pub async fn set_draft_difficulty(
  state: &AppState,
  id: &str,
  difficulty: Difficulty,
) -> Result<Question, ApiError> {
  state.mutate_draft(id, |e| e.set_difficulty(difficulty)).await.ok_or_else(|| no_draft(id))
}

pub async fn set_draft_codes(
  state: &AppState,
  id: &str,
  standards: Vec<String>,
  descriptors: Vec<String>,
) -> Result<Question, ApiError> {
  state
    .mutate_draft(id, |e| e.set_codes(standards, descriptors))
    .await
    .ok_or_else(|| no_draft(id))
}

pub async fn set_alternative_text(
  state: &AppState,
  id: &str,
  alternative_id: &str,
  text: String,
) -> Result<Question, ApiError> {
  state
    .mutate_draft(id, |e| e.set_alternative_text(alternative_id, text))
    .await
    .ok_or_else(|| no_draft(id))
}

pub async fn mark_correct(
  state: &AppState,
  id: &str,
  alternative_id: &str,
) -> Result<Question, ApiError> {
  state
    .mutate_draft(id, |e| {
      e.mark_correct(alternative_id);
    })
    .await
    .ok_or_else(|| no_draft(id))
}

/// The user picked one phrasing from the suggestion modal. Synchronous
/// write to the open draft; dismissing the modal never reaches this.
pub async fn apply_phrasing(state: &AppState, id: &str, text: String) -> Result<Question, ApiError> {
  state.mutate_draft(id, |e| e.apply_phrasing(text)).await.ok_or_else(|| no_draft(id))
}

#[instrument(level = "info", skip(state), fields(%question_id))]
pub async fn save_draft(state: &AppState, question_id: &str) -> Result<Question, ApiError> {
  state.save_draft(question_id).await.ok_or_else(|| no_draft(question_id))
}

#[instrument(level = "info", skip(state), fields(%question_id))]
pub async fn cancel_draft(state: &AppState, question_id: &str) -> Result<(), ApiError> {
  if state.cancel_draft(question_id).await {
    Ok(())
  } else {
    Err(no_draft(question_id))
  }
}

// -------- Per-draft AI assists --------

/// Classify the draft's text. The result lands in the draft only if the
/// same edit session is still open when the call returns.
#[instrument(level = "info", skip(state), fields(%question_id))]
pub async fn classify_draft(state: &AppState, question_id: &str) -> Result<MergeOutcome, ApiError> {
  let ai = require_ai(state)?;
  let (draft, token) =
    state.draft_snapshot(question_id).await.ok_or_else(|| no_draft(question_id))?;

  let classification = ai.classify(&state.prompts, &draft.text).await.map_err(|e| {
    error!(target: "assist", %question_id, error = %e, "Classification failed");
    e
  })?;

  match state.merge_classification(question_id, token, &classification).await {
    Some(draft) => Ok(MergeOutcome::Applied(draft)),
    None => Ok(MergeOutcome::Discarded),
  }
}

/// Fetch phrasing candidates for the draft's text. Nothing is applied here;
/// the client shows a modal and sends `apply_phrasing` for the chosen one.
#[instrument(level = "info", skip(state), fields(%question_id))]
pub async fn suggest_phrasings(
  state: &AppState,
  question_id: &str,
) -> Result<Vec<String>, ApiError> {
  let ai = require_ai(state)?;
  let (draft, _token) =
    state.draft_snapshot(question_id).await.ok_or_else(|| no_draft(question_id))?;

  let suggestions = ai.suggest_phrasings(&state.prompts, &draft.text).await.map_err(|e| {
    error!(target: "assist", %question_id, error = %e, "Phrasing suggestion failed");
    e
  })?;
  Ok(suggestions)
}

/// Generate distractors for the draft. A draft with no correct alternative
/// is a soft no-op (the gateway skips the network call and the draft stays
/// as it is).
#[instrument(level = "info", skip(state), fields(%question_id))]
pub async fn generate_distractors(
  state: &AppState,
  question_id: &str,
) -> Result<MergeOutcome, ApiError> {
  let ai = require_ai(state)?;
  let (draft, token) =
    state.draft_snapshot(question_id).await.ok_or_else(|| no_draft(question_id))?;

  let distractors = ai.generate_distractors(&state.prompts, &draft).await.map_err(|e| {
    error!(target: "assist", %question_id, error = %e, "Distractor generation failed");
    e
  })?;

  if draft.correct_alternative().is_none() {
    // Soft failure already logged by the gateway; leave the draft alone.
    return Ok(MergeOutcome::Applied(draft));
  }

  match state.merge_distractors(question_id, token, distractors).await {
    Some(draft) => Ok(MergeOutcome::Applied(draft)),
    None => Ok(MergeOutcome::Discarded),
  }
}

// -------- Assessment builder --------

#[instrument(level = "info", skip(state), fields(%question_id))]
pub async fn toggle_selection(
  state: &AppState,
  question_id: &str,
) -> Result<(bool, Vec<String>), ApiError> {
  if !state.bank.read().await.contains(question_id) {
    return Err(ApiError::UnknownQuestion(question_id.to_string()));
  }
  let mut builder = state.builder.write().await;
  let selected = builder.toggle(question_id);
  Ok((selected, builder.selection().to_vec()))
}

pub async fn set_assessment_title(state: &AppState, title: String) -> (String, u32, Vec<String>) {
  let mut builder = state.builder.write().await;
  builder.set_title(title);
  (builder.title.clone(), builder.page_budget, builder.selection().to_vec())
}

pub async fn set_page_budget(state: &AppState, pages: u32) -> (String, u32, Vec<String>) {
  let mut builder = state.builder.write().await;
  builder.set_page_budget(pages);
  (builder.title.clone(), builder.page_budget, builder.selection().to_vec())
}

/// Placeholder: no layout algorithm exists in this build. Reports the
/// unchanged budget so the affordance stays honest.
pub async fn suggest_layout(state: &AppState) -> (u32, String) {
  let builder = state.builder.read().await;
  (
    builder.page_budget,
    "Layout optimization is not available; keeping the current page budget.".into(),
  )
}

pub async fn builder_state(state: &AppState) -> (String, u32, Vec<String>) {
  let builder = state.builder.read().await;
  (builder.title.clone(), builder.page_budget, builder.selection().to_vec())
}

pub async fn render_preview(state: &AppState) -> Preview {
  let builder = state.builder.read().await;
  let bank = state.bank.read().await;
  builder.preview(&bank)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::state::AppState;

  fn state_without_ai() -> AppState {
    std::env::remove_var("GEMINI_API_KEY");
    AppState::new()
  }

  #[tokio::test]
  async fn ai_ops_fail_up_front_without_a_credential() {
    let s = state_without_ai();
    s.begin_edit("q1").await.unwrap();
    assert!(matches!(classify_draft(&s, "q1").await, Err(ApiError::AiDisabled)));
    assert!(matches!(suggest_phrasings(&s, "q1").await, Err(ApiError::AiDisabled)));
    assert!(matches!(generate_question(&s, "volcanoes").await, Err(ApiError::AiDisabled)));
  }

  #[tokio::test]
  async fn draft_ops_require_an_open_session() {
    let s = state_without_ai();
    assert!(matches!(
      set_draft_text(&s, "q1", "x".into()).await,
      Err(ApiError::NoActiveDraft(_))
    ));
    assert!(matches!(save_draft(&s, "q1").await, Err(ApiError::NoActiveDraft(_))));
    assert!(matches!(cancel_draft(&s, "q1").await, Err(ApiError::NoActiveDraft(_))));
  }

  #[tokio::test]
  async fn toggling_an_unknown_question_is_rejected() {
    let s = state_without_ai();
    assert!(matches!(
      toggle_selection(&s, "ghost").await,
      Err(ApiError::UnknownQuestion(_))
    ));
    let (selected, selection) = toggle_selection(&s, "q1").await.unwrap();
    assert!(selected);
    assert_eq!(selection, ["q1"]);
  }

  #[tokio::test]
  async fn preview_reflects_toggle_order_end_to_end() {
    let s = state_without_ai();
    toggle_selection(&s, "q2").await.unwrap();
    toggle_selection(&s, "q1").await.unwrap();
    let preview = render_preview(&s).await;
    assert_eq!(preview.items[0].text, "The chemical symbol for water is H2O.");
    assert_eq!(preview.items[1].text, "What is the capital of France?");
  }
}
