//! Per-question edit sessions: the draft/commit split.
//!
//! A session holds a deep copy of the committed record; every mutation below
//! touches only that draft. Committing (save) and discarding (cancel) are
//! state transitions owned by `AppState`; the token lets async AI results
//! prove they belong to the session that launched them.

use tracing::warn;

use crate::domain::{Alternative, Difficulty, Question, QuestionType};
use crate::gemini::Classification;

/// An open editing session for one question.
#[derive(Clone, Debug)]
pub struct EditSession {
  pub draft: Question,
  /// Monotonic per-open token. An AI result captured under an older token is
  /// discarded instead of merged.
  pub token: u64,
}

impl EditSession {
  pub fn open(committed: &Question, token: u64) -> Self {
    Self { draft: committed.clone(), token }
  }

  pub fn set_text(&mut self, text: impl Into<String>) {
    self.draft.text = text.into();
  }

  pub fn set_subject(&mut self, subject: impl Into<String>) {
    self.draft.subject = subject.into();
  }

  pub fn set_difficulty(&mut self, difficulty: Difficulty) {
    self.draft.difficulty = difficulty;
  }

  pub fn set_codes(&mut self, standards: Vec<String>, descriptors: Vec<String>) {
    self.draft.standards = standards;
    self.draft.descriptors = descriptors;
  }

  /// Edit one alternative's text, keyed by alternative id. Unknown ids are
  /// ignored.
  pub fn set_alternative_text(&mut self, alternative_id: &str, text: impl Into<String>) {
    if let Some(alt) = self.draft.alternatives.iter_mut().find(|a| a.id == alternative_id) {
      alt.text = text.into();
    }
  }

  /// Mark one alternative as the correct answer. Exclusive for
  /// MultipleChoice/TrueFalse: setting one clears all siblings. ShortAnswer
  /// has no correct-flag semantics, so this is a no-op there. Returns
  /// whether anything was applied.
  pub fn mark_correct(&mut self, alternative_id: &str) -> bool {
    if self.draft.kind == QuestionType::ShortAnswer {
      return false;
    }
    if !self.draft.alternatives.iter().any(|a| a.id == alternative_id) {
      return false;
    }
    for alt in &mut self.draft.alternatives {
      alt.is_correct = alt.id == alternative_id;
    }
    true
  }

  /// Merge a classification result into the draft: one standard code, one
  /// descriptor code, and the (already coerced) difficulty.
  pub fn apply_classification(&mut self, c: &Classification) {
    self.draft.standards = vec![c.standard.clone()];
    self.draft.descriptors = vec![c.descriptor.clone()];
    self.draft.difficulty = c.difficulty;
  }

  /// Write the phrasing the user picked from the suggestion modal into the
  /// draft text. Dismissing the modal simply never calls this.
  pub fn apply_phrasing(&mut self, text: impl Into<String>) {
    self.draft.text = text.into();
  }

  /// Rebuild the alternative list as [current correct answer, generated
  /// distractors...]. Soft no-op when no alternative is marked correct.
  pub fn apply_distractors(&mut self, distractors: Vec<String>) -> bool {
    let correct = match self.draft.correct_alternative() {
      Some(a) => a.clone(),
      None => {
        warn!(question_id = %self.draft.id, "Ignoring distractors: draft has no correct alternative");
        return false;
      }
    };
    let mut alternatives = vec![correct];
    alternatives.extend(distractors.into_iter().map(|text| Alternative::new(text, false)));
    self.draft.alternatives = alternatives;
    true
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::seeds::seed_questions;

  fn session_for(id: &str) -> EditSession {
    let q = seed_questions().into_iter().find(|q| q.id == id).unwrap();
    EditSession::open(&q, 1)
  }

  #[test]
  fn open_deep_copies_the_committed_record() {
    let committed = seed_questions().remove(0);
    let mut s = EditSession::open(&committed, 7);
    s.set_text("edited");
    assert_eq!(committed.text, "What is the capital of France?");
    assert_eq!(s.draft.text, "edited");
    assert_eq!(s.token, 7);
  }

  #[test]
  fn mark_correct_is_exclusive_for_multiple_choice() {
    let mut s = session_for("q1");
    assert!(s.mark_correct("a1"));
    let correct: Vec<_> =
      s.draft.alternatives.iter().filter(|a| a.is_correct).map(|a| a.id.as_str()).collect();
    assert_eq!(correct, ["a1"]);

    // Toggling another alternative moves the single flag, never duplicates it.
    assert!(s.mark_correct("a4"));
    assert_eq!(s.draft.alternatives.iter().filter(|a| a.is_correct).count(), 1);
    assert!(s.draft.alternatives.iter().find(|a| a.id == "a4").unwrap().is_correct);
  }

  #[test]
  fn mark_correct_is_exclusive_for_true_false() {
    let mut s = session_for("q2");
    assert!(s.mark_correct("b2"));
    let flags: Vec<_> = s.draft.alternatives.iter().map(|a| a.is_correct).collect();
    assert_eq!(flags, [false, true]);
  }

  #[test]
  fn mark_correct_ignores_short_answer_and_unknown_ids() {
    let mut s = session_for("q3");
    assert!(!s.mark_correct("c1"));
    assert!(s.draft.alternatives[0].is_correct, "short-answer flag untouched");

    let mut s = session_for("q1");
    assert!(!s.mark_correct("nope"));
    assert!(s.draft.alternatives.iter().find(|a| a.id == "a3").unwrap().is_correct);
  }

  #[test]
  fn alternative_text_edits_are_keyed_by_id() {
    let mut s = session_for("q1");
    s.set_alternative_text("a2", "Lisbon");
    assert_eq!(s.draft.alternatives[1].text, "Lisbon");
    s.set_alternative_text("missing", "x");
    assert!(s.draft.alternatives.iter().all(|a| a.text != "x"));
  }

  #[test]
  fn classification_overwrites_codes_and_difficulty() {
    let mut s = session_for("q1");
    s.apply_classification(&Classification {
      standard: "EF09CI01".into(),
      descriptor: "D05".into(),
      difficulty: Difficulty::Hard,
    });
    assert_eq!(s.draft.standards, ["EF09CI01"]);
    assert_eq!(s.draft.descriptors, ["D05"]);
    assert_eq!(s.draft.difficulty, Difficulty::Hard);
  }

  #[test]
  fn distractors_keep_the_correct_answer_first() {
    let mut s = session_for("q1");
    assert!(s.apply_distractors(vec!["Lyon".into(), "Marseille".into(), "Nice".into()]));
    assert_eq!(s.draft.alternatives.len(), 4);
    assert!(s.draft.alternatives[0].is_correct);
    assert_eq!(s.draft.alternatives[0].text, "Paris");
    assert!(s.draft.alternatives[1..].iter().all(|a| !a.is_correct));
    // Fresh ids for the generated entries.
    assert_ne!(s.draft.alternatives[1].id, "a1");
  }

  #[test]
  fn distractors_without_a_correct_answer_are_dropped() {
    let mut s = session_for("q1");
    for a in &mut s.draft.alternatives {
      a.is_correct = false;
    }
    let before = s.draft.alternatives.clone();
    assert!(!s.apply_distractors(vec!["Lyon".into()]));
    assert_eq!(s.draft.alternatives, before);
  }
}
