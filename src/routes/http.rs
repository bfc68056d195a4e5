//! HTTP endpoint handlers. These are thin wrappers that forward to core
//! logic. Each handler is instrumented and logs parameters and basic result
//! info; gateway failures surface as typed `ApiError` responses.

use std::sync::Arc;

use axum::{
  extract::{Query, State},
  response::IntoResponse,
  Json,
};
use tracing::{info, instrument};

use crate::domain::Question;
use crate::error::ApiError;
use crate::logic::{self, MergeOutcome};
use crate::protocol::*;
use crate::state::AppState;

fn draft_out(outcome: MergeOutcome) -> DraftOut {
  match outcome {
    MergeOutcome::Applied(draft) => DraftOut { draft: Some(draft), applied: true },
    MergeOutcome::Discarded => DraftOut { draft: None, applied: false },
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut { ok: true, ai_enabled: state.gemini.is_some() })
}

// -------- Question bank --------

#[instrument(level = "info", skip(state, q))]
pub async fn http_list_questions(
  State(state): State<Arc<AppState>>,
  Query(q): Query<QuestionsQuery>,
) -> impl IntoResponse {
  let questions = logic::list_questions(&state, q.search).await;
  Json(questions)
}

#[instrument(level = "info", skip(state))]
pub async fn http_add_question(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let question = logic::add_question(&state).await;
  info!(target: "bank", id = %question.id, "HTTP question added");
  Json(question)
}

#[instrument(level = "info", skip(state, body), fields(id = %body.id))]
pub async fn http_update_question(
  State(state): State<Arc<AppState>>,
  Json(body): Json<Question>,
) -> impl IntoResponse {
  Json(logic::update_question(&state, body).await)
}

#[instrument(level = "info", skip(state, body), fields(%body.question_id))]
pub async fn http_delete_question(
  State(state): State<Arc<AppState>>,
  Json(body): Json<QuestionIdIn>,
) -> impl IntoResponse {
  let removed = logic::delete_question(&state, &body.question_id).await;
  Json(DeleteOut { removed })
}

#[instrument(level = "info", skip(state, body), fields(topic_len = body.topic.len()))]
pub async fn http_generate_question(
  State(state): State<Arc<AppState>>,
  Json(body): Json<TopicIn>,
) -> Result<Json<Question>, ApiError> {
  let question = logic::generate_question(&state, &body.topic).await?;
  Ok(Json(question))
}

#[instrument(level = "info", skip(state, body), fields(payload_len = body.document_base64.len(), mime = %body.mime))]
pub async fn http_extract_from_document(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ExtractIn>,
) -> Result<Json<ExtractOut>, ApiError> {
  let questions = logic::extract_from_document(&state, &body.document_base64, &body.mime).await?;
  info!(target: "bank", count = questions.len(), "HTTP extraction imported");
  Ok(Json(ExtractOut { count: questions.len(), questions }))
}

// -------- Edit sessions --------

#[instrument(level = "info", skip(state, body), fields(%body.question_id))]
pub async fn http_begin_edit(
  State(state): State<Arc<AppState>>,
  Json(body): Json<QuestionIdIn>,
) -> Result<Json<DraftOut>, ApiError> {
  let draft = logic::begin_edit(&state, &body.question_id).await?;
  Ok(Json(DraftOut { draft: Some(draft), applied: true }))
}

#[instrument(level = "info", skip(state, body), fields(%body.question_id, text_len = body.text.len()))]
pub async fn http_set_draft_text(
  State(state): State<Arc<AppState>>,
  Json(body): Json<DraftTextIn>,
) -> Result<Json<DraftOut>, ApiError> {
  let draft = logic::set_draft_text(&state, &body.question_id, body.text).await?;
  Ok(Json(DraftOut { draft: Some(draft), applied: true }))
}

#[instrument(level = "info", skip(state, body), fields(%body.question_id, subject = %body.subject))]
pub async fn http_set_draft_subject(
  State(state): State<Arc<AppState>>,
  Json(body): Json<DraftSubjectIn>,
) -> Result<Json<DraftOut>, ApiError> {
  let draft = logic::set_draft_subject(&state, &body.question_id, body.subject).await?;
  Ok(Json(DraftOut { draft: Some(draft), applied: true }))
}

#[instrument(level = "info", skip(state, body), fields(%body.question_id))]
pub async fn http_set_draft_difficulty(
  State(state): State<Arc<AppState>>,
  Json(body): Json<DraftDifficultyIn>,
) -> Result<Json<DraftOut>, ApiError> {
  let draft = logic::set_draft_difficulty(&state, &body.question_id, body.difficulty).await?;
  Ok(Json(DraftOut { draft: Some(draft), applied: true }))
}

#[instrument(level = "info", skip(state, body), fields(%body.question_id))]
pub async fn http_set_draft_codes(
  State(state): State<Arc<AppState>>,
  Json(body): Json<DraftCodesIn>,
) -> Result<Json<DraftOut>, ApiError> {
  let draft =
    logic::set_draft_codes(&state, &body.question_id, body.standards, body.descriptors).await?;
  Ok(Json(DraftOut { draft: Some(draft), applied: true }))
}

#[instrument(level = "info", skip(state, body), fields(%body.question_id, %body.alternative_id))]
pub async fn http_set_alternative_text(
  State(state): State<Arc<AppState>>,
  Json(body): Json<AlternativeTextIn>,
) -> Result<Json<DraftOut>, ApiError> {
  let draft =
    logic::set_alternative_text(&state, &body.question_id, &body.alternative_id, body.text).await?;
  Ok(Json(DraftOut { draft: Some(draft), applied: true }))
}

#[instrument(level = "info", skip(state, body), fields(%body.question_id, %body.alternative_id))]
pub async fn http_mark_correct(
  State(state): State<Arc<AppState>>,
  Json(body): Json<MarkCorrectIn>,
) -> Result<Json<DraftOut>, ApiError> {
  let draft = logic::mark_correct(&state, &body.question_id, &body.alternative_id).await?;
  Ok(Json(DraftOut { draft: Some(draft), applied: true }))
}

#[instrument(level = "info", skip(state, body), fields(%body.question_id, text_len = body.text.len()))]
pub async fn http_apply_phrasing(
  State(state): State<Arc<AppState>>,
  Json(body): Json<DraftTextIn>,
) -> Result<Json<DraftOut>, ApiError> {
  let draft = logic::apply_phrasing(&state, &body.question_id, body.text).await?;
  Ok(Json(DraftOut { draft: Some(draft), applied: true }))
}

#[instrument(level = "info", skip(state, body), fields(%body.question_id))]
pub async fn http_save_draft(
  State(state): State<Arc<AppState>>,
  Json(body): Json<QuestionIdIn>,
) -> Result<Json<Question>, ApiError> {
  let question = logic::save_draft(&state, &body.question_id).await?;
  info!(target: "editor", id = %question.id, "HTTP draft saved");
  Ok(Json(question))
}

#[instrument(level = "info", skip(state, body), fields(%body.question_id))]
pub async fn http_cancel_draft(
  State(state): State<Arc<AppState>>,
  Json(body): Json<QuestionIdIn>,
) -> Result<Json<CanceledOut>, ApiError> {
  logic::cancel_draft(&state, &body.question_id).await?;
  Ok(Json(CanceledOut { canceled: true }))
}

// -------- Per-draft AI assists --------

#[instrument(level = "info", skip(state, body), fields(%body.question_id))]
pub async fn http_classify(
  State(state): State<Arc<AppState>>,
  Json(body): Json<QuestionIdIn>,
) -> Result<Json<DraftOut>, ApiError> {
  let outcome = logic::classify_draft(&state, &body.question_id).await?;
  Ok(Json(draft_out(outcome)))
}

#[instrument(level = "info", skip(state, body), fields(%body.question_id))]
pub async fn http_suggest_phrasings(
  State(state): State<Arc<AppState>>,
  Json(body): Json<QuestionIdIn>,
) -> Result<Json<PhrasingsOut>, ApiError> {
  let suggestions = logic::suggest_phrasings(&state, &body.question_id).await?;
  Ok(Json(PhrasingsOut { suggestions }))
}

#[instrument(level = "info", skip(state, body), fields(%body.question_id))]
pub async fn http_generate_distractors(
  State(state): State<Arc<AppState>>,
  Json(body): Json<QuestionIdIn>,
) -> Result<Json<DraftOut>, ApiError> {
  let outcome = logic::generate_distractors(&state, &body.question_id).await?;
  Ok(Json(draft_out(outcome)))
}

// -------- Assessment builder --------

#[instrument(level = "info", skip(state))]
pub async fn http_builder_state(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let (title, page_budget, selection) = logic::builder_state(&state).await;
  Json(BuilderOut { title, page_budget, selection })
}

#[instrument(level = "info", skip(state, body), fields(%body.question_id))]
pub async fn http_toggle_selection(
  State(state): State<Arc<AppState>>,
  Json(body): Json<QuestionIdIn>,
) -> Result<Json<ToggleOut>, ApiError> {
  let (selected, selection) = logic::toggle_selection(&state, &body.question_id).await?;
  Ok(Json(ToggleOut { selected, selection }))
}

#[instrument(level = "info", skip(state, body), fields(title_len = body.title.len()))]
pub async fn http_set_title(
  State(state): State<Arc<AppState>>,
  Json(body): Json<TitleIn>,
) -> impl IntoResponse {
  let (title, page_budget, selection) = logic::set_assessment_title(&state, body.title).await;
  Json(BuilderOut { title, page_budget, selection })
}

#[instrument(level = "info", skip(state, body), fields(pages = body.pages))]
pub async fn http_set_pages(
  State(state): State<Arc<AppState>>,
  Json(body): Json<PagesIn>,
) -> impl IntoResponse {
  let (title, page_budget, selection) = logic::set_page_budget(&state, body.pages).await;
  Json(BuilderOut { title, page_budget, selection })
}

#[instrument(level = "info", skip(state))]
pub async fn http_suggest_layout(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let (pages, message) = logic::suggest_layout(&state).await;
  Json(LayoutOut { pages, message })
}

#[instrument(level = "info", skip(state))]
pub async fn http_preview(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(logic::render_preview(&state).await)
}

// -------- Reference data --------

#[instrument(level = "info", skip(state))]
pub async fn http_assessments(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let assessments = state.assessments.read().await.clone();
  Json(assessments)
}

#[instrument(level = "info", skip(state))]
pub async fn http_taxonomy(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(TaxonomyOut {
    standards: state.standards.as_ref().clone(),
    descriptors: state.descriptors.as_ref().clone(),
    subjects: crate::seeds::SUBJECTS.iter().map(|s| s.to_string()).collect(),
  })
}

#[instrument(level = "info", skip(state))]
pub async fn http_templates(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(state.templates.as_ref().clone())
}
