//! WebSocket upgrade + message loop. Each client message is parsed as JSON
//! and forwarded to core logic. We reply with a single JSON message per
//! request; failures flatten into an `error` message.

use std::sync::Arc;

use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument};

use crate::error::ApiError;
use crate::logic::{self, MergeOutcome};
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "bancada_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "bancada_backend", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target = "bancada_backend", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state).await
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "bancada_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "bancada_backend", "WebSocket disconnected");
}

fn fail(e: ApiError) -> ServerWsMessage {
  ServerWsMessage::Error { message: e.to_string() }
}

fn draft_reply(question_id: String, outcome: MergeOutcome) -> ServerWsMessage {
  match outcome {
    MergeOutcome::Applied(draft) => ServerWsMessage::Draft { draft },
    MergeOutcome::Discarded => ServerWsMessage::Discarded { question_id },
  }
}

#[instrument(level = "info", skip(state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    // Question bank
    ClientWsMessage::ListQuestions { search } => {
      let questions = logic::list_questions(state, search).await;
      ServerWsMessage::Questions { questions }
    }
    ClientWsMessage::AddQuestion => {
      let question = logic::add_question(state).await;
      tracing::info!(target: "bank", id = %question.id, "WS question added");
      ServerWsMessage::Question { question }
    }
    ClientWsMessage::UpdateQuestion { question } => {
      let question = logic::update_question(state, question).await;
      ServerWsMessage::Question { question }
    }
    ClientWsMessage::DeleteQuestion { question_id } => {
      let removed = logic::delete_question(state, &question_id).await;
      ServerWsMessage::Deleted { question_id, removed }
    }
    ClientWsMessage::GenerateQuestion { topic } => match logic::generate_question(state, &topic).await {
      Ok(question) => ServerWsMessage::Question { question },
      Err(e) => fail(e),
    },
    ClientWsMessage::ExtractFromDocument { document_base64, mime } => {
      match logic::extract_from_document(state, &document_base64, &mime).await {
        Ok(questions) => ServerWsMessage::Extracted { count: questions.len(), questions },
        Err(e) => fail(e),
      }
    }

    // Edit sessions
    ClientWsMessage::BeginEdit { question_id } => match logic::begin_edit(state, &question_id).await {
      Ok(draft) => ServerWsMessage::Draft { draft },
      Err(e) => fail(e),
    },
    ClientWsMessage::SetDraftText { question_id, text } => {
      match logic::set_draft_text(state, &question_id, text).await {
        Ok(draft) => ServerWsMessage::Draft { draft },
        Err(e) => fail(e),
      }
    }
    ClientWsMessage::SetDraftSubject { question_id, subject } => {
      match logic::set_draft_subject(state, &question_id, subject).await {
        Ok(draft) => ServerWsMessage::Draft { draft },
        Err(e) => fail(e),
      }
    }
    ClientWsMessage::SetDraftDifficulty { question_id, difficulty } => {
      match logic::set_draft_difficulty(state, &question_id, difficulty).await {
        Ok(draft) => ServerWsMessage::Draft { draft },
        Err(e) => fail(e),
      }
    }
    ClientWsMessage::SetDraftCodes { question_id, standards, descriptors } => {
      match logic::set_draft_codes(state, &question_id, standards, descriptors).await {
        Ok(draft) => ServerWsMessage::Draft { draft },
        Err(e) => fail(e),
      }
    }
    ClientWsMessage::SetAlternativeText { question_id, alternative_id, text } => {
      match logic::set_alternative_text(state, &question_id, &alternative_id, text).await {
        Ok(draft) => ServerWsMessage::Draft { draft },
        Err(e) => fail(e),
      }
    }
    ClientWsMessage::MarkCorrect { question_id, alternative_id } => {
      match logic::mark_correct(state, &question_id, &alternative_id).await {
        Ok(draft) => ServerWsMessage::Draft { draft },
        Err(e) => fail(e),
      }
    }
    ClientWsMessage::ApplyPhrasing { question_id, text } => {
      match logic::apply_phrasing(state, &question_id, text).await {
        Ok(draft) => ServerWsMessage::Draft { draft },
        Err(e) => fail(e),
      }
    }
    ClientWsMessage::SaveDraft { question_id } => match logic::save_draft(state, &question_id).await {
      Ok(question) => {
        tracing::info!(target: "editor", id = %question.id, "WS draft saved");
        ServerWsMessage::Saved { question }
      }
      Err(e) => fail(e),
    },
    ClientWsMessage::CancelDraft { question_id } => {
      match logic::cancel_draft(state, &question_id).await {
        Ok(()) => ServerWsMessage::Canceled { question_id },
        Err(e) => fail(e),
      }
    }

    // Per-draft AI assists
    ClientWsMessage::Classify { question_id } => {
      match logic::classify_draft(state, &question_id).await {
        Ok(outcome) => draft_reply(question_id, outcome),
        Err(e) => fail(e),
      }
    }
    ClientWsMessage::SuggestPhrasings { question_id } => {
      match logic::suggest_phrasings(state, &question_id).await {
        Ok(suggestions) => ServerWsMessage::Phrasings { suggestions },
        Err(e) => fail(e),
      }
    }
    ClientWsMessage::GenerateDistractors { question_id } => {
      match logic::generate_distractors(state, &question_id).await {
        Ok(outcome) => draft_reply(question_id, outcome),
        Err(e) => fail(e),
      }
    }

    // Assessment builder
    ClientWsMessage::ToggleSelection { question_id } => {
      match logic::toggle_selection(state, &question_id).await {
        Ok((selected, selection)) => ServerWsMessage::Selection { selected, selection },
        Err(e) => fail(e),
      }
    }
    ClientWsMessage::SetAssessmentTitle { title } => {
      let (title, page_budget, selection) = logic::set_assessment_title(state, title).await;
      ServerWsMessage::Builder { title, page_budget, selection }
    }
    ClientWsMessage::SetPageBudget { pages } => {
      let (title, page_budget, selection) = logic::set_page_budget(state, pages).await;
      ServerWsMessage::Builder { title, page_budget, selection }
    }
    ClientWsMessage::SuggestLayout => {
      let (pages, message) = logic::suggest_layout(state).await;
      ServerWsMessage::LayoutSuggestion { pages, message }
    }
    ClientWsMessage::Preview => {
      let preview = logic::render_preview(state).await;
      ServerWsMessage::Preview { preview }
    }

    // Reference data
    ClientWsMessage::ListAssessments => {
      let assessments = state.assessments.read().await.clone();
      ServerWsMessage::Assessments { assessments }
    }
    ClientWsMessage::ListTaxonomy => ServerWsMessage::Taxonomy {
      standards: state.standards.as_ref().clone(),
      descriptors: state.descriptors.as_ref().clone(),
      subjects: crate::seeds::SUBJECTS.iter().map(|s| s.to_string()).collect(),
    },
    ClientWsMessage::ListTemplates => ServerWsMessage::Templates {
      templates: state.templates.as_ref().clone(),
    },
  }
}
