//! The question bank: the single owner of all committed question records.
//!
//! The full set is always materialized in memory; search is a linear scan
//! recomputed per call, which is fine at authoring-tool scale.

use crate::domain::Question;

#[derive(Clone, Debug, Default)]
pub struct QuestionBank {
  questions: Vec<Question>,
}

impl QuestionBank {
  pub fn new(questions: Vec<Question>) -> Self {
    Self { questions }
  }

  #[allow(dead_code)]
  pub fn len(&self) -> usize {
    self.questions.len()
  }

  /// Newly created questions go to the front of the list.
  pub fn add(&mut self, question: Question) {
    self.questions.insert(0, question);
  }

  /// Replace the record with the same id. Unknown ids are a silent no-op so
  /// that a stale update arriving after a delete cannot fail the caller.
  pub fn update(&mut self, question: Question) {
    if let Some(slot) = self.questions.iter_mut().find(|q| q.id == question.id) {
      *slot = question;
    }
  }

  /// Remove by id. Returns whether anything was removed.
  pub fn remove(&mut self, id: &str) -> bool {
    let before = self.questions.len();
    self.questions.retain(|q| q.id != id);
    self.questions.len() != before
  }

  pub fn get(&self, id: &str) -> Option<&Question> {
    self.questions.iter().find(|q| q.id == id)
  }

  pub fn contains(&self, id: &str) -> bool {
    self.get(id).is_some()
  }

  /// Case-insensitive substring match on question text only. An empty term
  /// returns the full bank in original order.
  pub fn search(&self, term: &str) -> Vec<Question> {
    let needle = term.to_lowercase();
    self
      .questions
      .iter()
      .filter(|q| q.text.to_lowercase().contains(&needle))
      .cloned()
      .collect()
  }

  #[allow(dead_code)]
  pub fn all(&self) -> &[Question] {
    &self.questions
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::Question;
  use crate::seeds::seed_questions;

  fn seeded() -> QuestionBank {
    QuestionBank::new(seed_questions())
  }

  #[test]
  fn add_prepends_and_grows_the_bank() {
    let mut bank = seeded();
    let before = bank.len();
    let q = Question::scaffold();
    let id = q.id.clone();
    bank.add(q);
    assert_eq!(bank.len(), before + 1);
    assert_eq!(bank.all()[0].id, id);
  }

  #[test]
  fn update_replaces_by_id() {
    let mut bank = seeded();
    let mut q = bank.get("q1").unwrap().clone();
    q.text = "What is the capital of Italy?".into();
    bank.update(q);
    assert_eq!(bank.get("q1").unwrap().text, "What is the capital of Italy?");
  }

  #[test]
  fn update_with_unknown_id_is_a_silent_no_op() {
    let mut bank = seeded();
    let before = bank.len();
    let mut ghost = Question::scaffold();
    ghost.id = "no-such-id".into();
    bank.update(ghost);
    assert_eq!(bank.len(), before);
    assert!(bank.get("no-such-id").is_none());
  }

  #[test]
  fn remove_reports_whether_anything_went_away() {
    let mut bank = seeded();
    assert!(bank.remove("q2"));
    assert!(!bank.remove("q2"));
    assert!(bank.get("q2").is_none());
  }

  #[test]
  fn search_matches_text_case_insensitively() {
    let bank = seeded();
    let hits = bank.search("capital");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "q1");
    let hits = bank.search("CAPITAL");
    assert_eq!(hits.len(), 1);
  }

  #[test]
  fn search_ignores_subject_and_codes() {
    let bank = seeded();
    assert!(bank.search("Geography").is_empty());
    assert!(bank.search("EF06GE01").is_empty());
  }

  #[test]
  fn empty_search_returns_everything_in_order() {
    let bank = seeded();
    let hits = bank.search("");
    assert_eq!(hits.len(), bank.len());
    let ids: Vec<_> = hits.iter().map(|q| q.id.as_str()).collect();
    assert_eq!(ids, ["q1", "q2", "q3"]);
  }
}
