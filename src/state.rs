//! Application state: in-memory stores, prompts, Gemini client, and the
//! edit-session lifecycle.
//!
//! This module owns:
//!   - the question bank (single owner of committed records)
//!   - the assessment list and taxonomy/template reference data
//!   - open edit sessions (draft/commit split, one per question id)
//!   - the builder session
//!   - the prompts struct (from TOML or defaults)
//!   - optional Gemini client
//!
//! Stale-async policy: every edit session carries a token minted at open
//! time. AI results are merged only while the same session (same token) is
//! still open; save, cancel, delete, and re-open all invalidate in-flight
//! results.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, instrument, warn};

use crate::bank::QuestionBank;
use crate::builder::BuilderSession;
use crate::config::{load_bank_config_from_env, Prompts, QuestionCfg};
use crate::domain::{
    Alternative, AnswerTemplate, Assessment, DescriptorCode, Difficulty, Question, QuestionType,
    StandardCode,
};
use crate::editor::EditSession;
use crate::gemini::{Classification, Gemini};
use crate::seeds::{
    seed_answer_templates, seed_assessments, seed_descriptor_codes, seed_questions,
    seed_standard_codes,
};
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub bank: Arc<RwLock<QuestionBank>>,
    pub assessments: Arc<RwLock<Vec<Assessment>>>,
    pub editors: Arc<RwLock<HashMap<String, EditSession>>>,
    pub builder: Arc<RwLock<BuilderSession>>,
    pub standards: Arc<Vec<StandardCode>>,
    pub descriptors: Arc<Vec<DescriptorCode>>,
    pub templates: Arc<Vec<AnswerTemplate>>,
    pub gemini: Option<Gemini>,
    pub prompts: Prompts,
    next_token: Arc<AtomicU64>,
}

impl AppState {
    /// Build state from env: load config, seed the bank, init Gemini.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        // Load TOML config if provided (prompts + optional local bank).
        let cfg_opt = load_bank_config_from_env();
        let prompts = cfg_opt
            .as_ref()
            .map(|c| c.prompts.clone())
            .unwrap_or_default();

        let mut questions: Vec<Question> = Vec::new();

        // Insert config-based questions (if any), skipping invalid entries.
        if let Some(cfg) = &cfg_opt {
            for qc in &cfg.questions {
                match question_from_cfg(qc) {
                    Ok(q) => questions.push(q),
                    Err(reason) => {
                        error!(target: "bank", text = %crate::util::trunc_for_log(&qc.text, 40), %reason, "Skipping bank item");
                    }
                }
            }
        }

        // Always append built-in seeds, but don't overwrite existing ids.
        for q in seed_questions() {
            if !questions.iter().any(|existing| existing.id == q.id) {
                questions.push(q);
            }
        }

        // Inventory summary by question type.
        let mut by_kind: HashMap<&'static str, usize> = HashMap::new();
        for q in &questions {
            let key = match q.kind {
                QuestionType::MultipleChoice => "multiple_choice",
                QuestionType::TrueFalse => "true_false",
                QuestionType::ShortAnswer => "short_answer",
            };
            *by_kind.entry(key).or_insert(0) += 1;
        }
        for (kind, count) in by_kind {
            info!(target: "bank", %kind, count, "Startup question inventory");
        }

        // Build optional Gemini client (if API key present). Absence is a
        // configuration state reported once, here, not per call.
        let gemini = Gemini::from_env();
        if let Some(g) = &gemini {
            info!(target: "bancada_backend", base_url = %g.base_url, model = %g.model, "AI assist enabled.");
        } else {
            warn!(target: "bancada_backend", "AI assist disabled (no GEMINI_API_KEY). AI affordances are off.");
        }

        Self {
            bank: Arc::new(RwLock::new(QuestionBank::new(questions))),
            assessments: Arc::new(RwLock::new(seed_assessments())),
            editors: Arc::new(RwLock::new(HashMap::new())),
            builder: Arc::new(RwLock::new(BuilderSession::default())),
            standards: Arc::new(seed_standard_codes()),
            descriptors: Arc::new(seed_descriptor_codes()),
            templates: Arc::new(seed_answer_templates()),
            gemini,
            prompts,
            next_token: Arc::new(AtomicU64::new(1)),
        }
    }

    // --- Question bank lifecycle ---

    /// Create a scaffold question and prepend it to the bank.
    #[instrument(level = "info", skip(self))]
    pub async fn add_scaffold(&self) -> Question {
        let q = Question::scaffold();
        self.bank.write().await.add(q.clone());
        info!(target: "bank", id = %q.id, "Question added");
        q
    }

    /// Prepend an externally produced question (AI generation).
    #[instrument(level = "debug", skip(self, q), fields(id = %q.id))]
    pub async fn insert_question(&self, q: Question) {
        self.bank.write().await.add(q);
    }

    /// Prepend a batch (document extraction), preserving its order at the
    /// front of the bank.
    #[instrument(level = "info", skip(self, questions), fields(count = questions.len()))]
    pub async fn insert_extracted(&self, questions: Vec<Question>) {
        let mut bank = self.bank.write().await;
        for q in questions.into_iter().rev() {
            bank.add(q);
        }
    }

    /// Replace a committed record directly (bypassing the editor). Unknown
    /// ids are a silent no-op, same as the bank contract.
    #[instrument(level = "debug", skip(self, q), fields(id = %q.id))]
    pub async fn update_question(&self, q: Question) {
        self.bank.write().await.update(q);
    }

    /// Delete a question and cascade: close its edit session, prune it from
    /// the builder selection and from every assessment's id list.
    #[instrument(level = "info", skip(self), fields(%id))]
    pub async fn delete_question(&self, id: &str) -> bool {
        let removed = self.bank.write().await.remove(id);
        if !removed {
            return false;
        }
        if self.editors.write().await.remove(id).is_some() {
            info!(target: "bank", %id, "Closed edit session of deleted question");
        }
        self.builder.write().await.prune(id);
        for assessment in self.assessments.write().await.iter_mut() {
            assessment.question_ids.retain(|qid| qid != id);
        }
        info!(target: "bank", %id, "Question deleted");
        true
    }

    pub async fn search_questions(&self, term: &str) -> Vec<Question> {
        self.bank.read().await.search(term)
    }

    #[allow(dead_code)]
    pub async fn get_question(&self, id: &str) -> Option<Question> {
        self.bank.read().await.get(id).cloned()
    }

    // --- Edit sessions ---

    /// Viewing -> Editing: open a session whose draft is a deep copy of the
    /// committed record. Re-opening replaces any existing session, which
    /// also invalidates that session's in-flight AI results.
    #[instrument(level = "info", skip(self), fields(%id))]
    pub async fn begin_edit(&self, id: &str) -> Option<Question> {
        let committed = self.bank.read().await.get(id).cloned()?;
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let session = EditSession::open(&committed, token);
        let draft = session.draft.clone();
        self.editors.write().await.insert(id.to_string(), session);
        Some(draft)
    }

    /// Editing -> Viewing (save): commit the draft and close the session.
    /// A question deleted mid-edit commits nowhere (silent bank no-op).
    #[instrument(level = "info", skip(self), fields(%id))]
    pub async fn save_draft(&self, id: &str) -> Option<Question> {
        let session = self.editors.write().await.remove(id)?;
        self.bank.write().await.update(session.draft.clone());
        Some(session.draft)
    }

    /// Editing -> Viewing (cancel): discard the draft; the committed record
    /// is untouched.
    #[instrument(level = "info", skip(self), fields(%id))]
    pub async fn cancel_draft(&self, id: &str) -> bool {
        self.editors.write().await.remove(id).is_some()
    }

    /// Apply a synchronous draft mutation, returning the updated draft.
    pub async fn mutate_draft<F>(&self, id: &str, f: F) -> Option<Question>
    where
        F: FnOnce(&mut EditSession),
    {
        let mut editors = self.editors.write().await;
        let session = editors.get_mut(id)?;
        f(session);
        Some(session.draft.clone())
    }

    /// Snapshot a draft plus its session token before launching an async AI
    /// call.
    pub async fn draft_snapshot(&self, id: &str) -> Option<(Question, u64)> {
        let editors = self.editors.read().await;
        editors.get(id).map(|s| (s.draft.clone(), s.token))
    }

    /// Merge a classification result, unless the originating session is
    /// gone or was reopened in the meantime.
    #[instrument(level = "info", skip(self, c), fields(%id, token))]
    pub async fn merge_classification(
        &self,
        id: &str,
        token: u64,
        c: &Classification,
    ) -> Option<Question> {
        let mut editors = self.editors.write().await;
        match editors.get_mut(id) {
            Some(session) if session.token == token => {
                session.apply_classification(c);
                Some(session.draft.clone())
            }
            _ => {
                warn!(target: "editor", %id, token, "Discarding stale classification result");
                None
            }
        }
    }

    /// Merge generated distractors under the same staleness rule.
    #[instrument(level = "info", skip(self, distractors), fields(%id, token, count = distractors.len()))]
    pub async fn merge_distractors(
        &self,
        id: &str,
        token: u64,
        distractors: Vec<String>,
    ) -> Option<Question> {
        let mut editors = self.editors.write().await;
        match editors.get_mut(id) {
            Some(session) if session.token == token => {
                if session.apply_distractors(distractors) {
                    Some(session.draft.clone())
                } else {
                    None
                }
            }
            _ => {
                warn!(target: "editor", %id, token, "Discarding stale distractor result");
                None
            }
        }
    }
}

/// Build a question from a TOML bank entry, enforcing the settled-state
/// invariants the editor would otherwise maintain.
fn question_from_cfg(qc: &QuestionCfg) -> Result<Question, &'static str> {
    if qc.text.trim().is_empty() {
        return Err("missing text");
    }
    if qc.alternatives.is_empty() {
        return Err("missing alternatives");
    }
    let kind = qc.kind.unwrap_or_default();
    if matches!(kind, QuestionType::MultipleChoice | QuestionType::TrueFalse) {
        let correct = qc.alternatives.iter().filter(|a| a.correct).count();
        if correct != 1 {
            return Err("expected exactly one correct alternative");
        }
    }
    Ok(Question {
        id: qc.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string()),
        text: qc.text.clone(),
        kind,
        alternatives: qc
            .alternatives
            .iter()
            .map(|a| Alternative::new(a.text.clone(), a.correct))
            .collect(),
        image_url: qc.image_url.clone(),
        subject: qc.subject.clone().unwrap_or_else(|| "General".into()),
        difficulty: qc
            .difficulty
            .as_deref()
            .map(Difficulty::from_label_lenient)
            .unwrap_or_default(),
        standards: qc.standards.clone(),
        descriptors: qc.descriptors.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AlternativeCfg;

    fn state() -> AppState {
        AppState::new()
    }

    #[tokio::test]
    async fn add_scaffold_grows_the_bank_with_a_fresh_id() {
        let s = state();
        let before = s.bank.read().await.len();
        let q = s.add_scaffold().await;
        let bank = s.bank.read().await;
        assert_eq!(bank.len(), before + 1);
        assert_eq!(bank.all()[0].id, q.id);
        assert!(bank.all()[1..].iter().all(|other| other.id != q.id));
        let correct: Vec<_> = q.alternatives.iter().filter(|a| a.is_correct).collect();
        assert_eq!(correct.len(), 1);
        assert_eq!(correct[0].text, "Correct Answer");
    }

    #[tokio::test]
    async fn cancel_restores_the_committed_record_exactly() {
        let s = state();
        let committed = s.get_question("q1").await.unwrap();

        s.begin_edit("q1").await.unwrap();
        s.mutate_draft("q1", |e| {
            e.set_text("Scribbled over");
            e.set_subject("History");
            e.set_difficulty(Difficulty::Hard);
            e.mark_correct("a1");
            e.set_alternative_text("a2", "Oslo");
        })
        .await
        .unwrap();

        assert!(s.cancel_draft("q1").await);
        assert_eq!(s.get_question("q1").await.unwrap(), committed);
        assert!(s.editors.read().await.get("q1").is_none());
    }

    #[tokio::test]
    async fn save_commits_the_draft_to_the_bank() {
        let s = state();
        s.begin_edit("q1").await.unwrap();
        s.mutate_draft("q1", |e| e.set_text("What is the capital of Spain?"))
            .await
            .unwrap();
        let saved = s.save_draft("q1").await.unwrap();
        assert_eq!(saved.text, "What is the capital of Spain?");
        assert_eq!(s.get_question("q1").await.unwrap().text, "What is the capital of Spain?");
        assert!(s.editors.read().await.get("q1").is_none());
    }

    #[tokio::test]
    async fn stale_results_are_discarded_after_cancel() {
        let s = state();
        s.begin_edit("q1").await.unwrap();
        let (_, token) = s.draft_snapshot("q1").await.unwrap();
        s.cancel_draft("q1").await;

        let c = Classification {
            standard: "EF09CI01".into(),
            descriptor: "D05".into(),
            difficulty: Difficulty::Hard,
        };
        assert!(s.merge_classification("q1", token, &c).await.is_none());
        // Committed record never saw the result.
        assert_eq!(s.get_question("q1").await.unwrap().difficulty, Difficulty::Easy);
    }

    #[tokio::test]
    async fn stale_results_are_discarded_after_reopen() {
        let s = state();
        s.begin_edit("q1").await.unwrap();
        let (_, old_token) = s.draft_snapshot("q1").await.unwrap();

        // User cancels and starts over while the call is in flight.
        s.cancel_draft("q1").await;
        s.begin_edit("q1").await.unwrap();

        assert!(s.merge_distractors("q1", old_token, vec!["Lyon".into()]).await.is_none());
        let (draft, new_token) = s.draft_snapshot("q1").await.unwrap();
        assert_ne!(old_token, new_token);
        assert_eq!(draft.alternatives.len(), 4, "fresh draft untouched by stale merge");
    }

    #[tokio::test]
    async fn live_session_merges_apply_to_the_draft_only() {
        let s = state();
        s.begin_edit("q1").await.unwrap();
        let (_, token) = s.draft_snapshot("q1").await.unwrap();

        let c = Classification {
            standard: "EM13LGG101".into(),
            descriptor: "D12".into(),
            difficulty: Difficulty::Hard,
        };
        let draft = s.merge_classification("q1", token, &c).await.unwrap();
        assert_eq!(draft.standards, ["EM13LGG101"]);
        // Not committed until save.
        assert_eq!(s.get_question("q1").await.unwrap().standards, ["EF06GE01"]);
    }

    #[tokio::test]
    async fn delete_cascades_through_selection_assessments_and_sessions() {
        let s = state();
        s.builder.write().await.toggle("q1");
        s.builder.write().await.toggle("q2");
        s.begin_edit("q1").await.unwrap();

        assert!(s.delete_question("q1").await);

        assert!(s.get_question("q1").await.is_none());
        assert_eq!(s.builder.read().await.selection(), ["q2"]);
        assert!(s.editors.read().await.get("q1").is_none());
        let assessments = s.assessments.read().await;
        let midterm = assessments.iter().find(|a| a.id == "as1").unwrap();
        assert!(midterm.question_ids.is_empty());
    }

    #[tokio::test]
    async fn deleting_mid_edit_drops_the_pending_save() {
        let s = state();
        s.begin_edit("q2").await.unwrap();
        s.delete_question("q2").await;
        // Session is gone, so there is nothing left to save.
        assert!(s.save_draft("q2").await.is_none());
        assert!(s.get_question("q2").await.is_none());
    }

    #[test]
    fn config_entries_violating_invariants_are_skipped() {
        let entry = QuestionCfg {
            id: None,
            text: "Pick one.".into(),
            kind: Some(QuestionType::MultipleChoice),
            subject: None,
            difficulty: Some("Tricky".into()),
            alternatives: vec![
                AlternativeCfg { text: "A".into(), correct: true },
                AlternativeCfg { text: "B".into(), correct: true },
            ],
            standards: vec![],
            descriptors: vec![],
            image_url: None,
        };
        assert!(question_from_cfg(&entry).is_err());

        let mut fixed = entry;
        fixed.alternatives[1].correct = false;
        let q = question_from_cfg(&fixed).expect("valid entry");
        assert_eq!(q.difficulty, Difficulty::Medium, "lenient difficulty label");
        assert_eq!(q.subject, "General");
    }
}
