//! The assessment builder session: title, page budget, question selection,
//! and the derived printable preview.
//!
//! The selection is a list with set-like membership toggling: toggling an id
//! on appends it, toggling it off removes it, so re-adding moves an item to
//! the end. The preview is a pure projection of {title, selection, question
//! content at read time} and holds no state of its own.

use serde::Serialize;

use crate::bank::QuestionBank;
use crate::domain::QuestionType;
use crate::util::letter_marker;

pub const DEFAULT_TITLE: &str = "New Assessment";
pub const DEFAULT_PAGE_BUDGET: u32 = 2;

#[derive(Clone, Debug)]
pub struct BuilderSession {
  pub title: String,
  pub page_budget: u32,
  selection: Vec<String>,
}

impl Default for BuilderSession {
  fn default() -> Self {
    Self { title: DEFAULT_TITLE.into(), page_budget: DEFAULT_PAGE_BUDGET, selection: vec![] }
  }
}

/// One rendered question in the preview document.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PreviewItem {
  /// 1-based position in the assessment.
  pub ordinal: usize,
  pub text: String,
  pub lines: Vec<String>,
}

/// The derived preview document.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preview {
  pub title: String,
  pub items: Vec<PreviewItem>,
}

impl BuilderSession {
  /// Toggle a question's membership. Returns true if the id is selected
  /// after the call. Toggling twice restores the original membership.
  pub fn toggle(&mut self, question_id: &str) -> bool {
    if let Some(pos) = self.selection.iter().position(|id| id == question_id) {
      self.selection.remove(pos);
      false
    } else {
      self.selection.push(question_id.to_string());
      true
    }
  }

  pub fn set_title(&mut self, title: impl Into<String>) {
    self.title = title.into();
  }

  pub fn set_page_budget(&mut self, pages: u32) {
    self.page_budget = pages;
  }

  /// Drop a question id from the selection (cascade path for deletes).
  pub fn prune(&mut self, question_id: &str) {
    self.selection.retain(|id| id != question_id);
  }

  pub fn selection(&self) -> &[String] {
    &self.selection
  }

  /// Render the preview in selection order. Ids no longer present in the
  /// bank are skipped; cascade delete keeps that transient.
  pub fn preview(&self, bank: &QuestionBank) -> Preview {
    let items = self
      .selection
      .iter()
      .filter_map(|id| bank.get(id))
      .enumerate()
      .map(|(i, q)| PreviewItem {
        ordinal: i + 1,
        text: q.text.clone(),
        lines: answer_lines(q),
      })
      .collect();
    Preview { title: self.title.clone(), items }
  }
}

fn answer_lines(q: &crate::domain::Question) -> Vec<String> {
  match q.kind {
    QuestionType::MultipleChoice => q
      .alternatives
      .iter()
      .enumerate()
      .map(|(i, alt)| format!("{}) {}", letter_marker(i), alt.text))
      .collect(),
    QuestionType::TrueFalse => vec!["( ) True   ( ) False".into()],
    QuestionType::ShortAnswer => vec!["________________________________".into()],
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::seeds::seed_questions;

  fn bank() -> QuestionBank {
    QuestionBank::new(seed_questions())
  }

  #[test]
  fn toggle_twice_restores_membership() {
    let mut b = BuilderSession::default();
    assert!(b.toggle("q1"));
    assert!(b.toggle("q2"));
    assert!(!b.toggle("q1"));
    assert_eq!(b.selection(), ["q2"]);
    // Re-adding goes to the end, not back to its old slot.
    assert!(b.toggle("q1"));
    assert_eq!(b.selection(), ["q2", "q1"]);
  }

  #[test]
  fn preview_follows_selection_order_not_bank_order() {
    let mut b = BuilderSession::default();
    b.toggle("q2");
    b.toggle("q1");
    let p = b.preview(&bank());
    assert_eq!(p.items.len(), 2);
    assert_eq!(p.items[0].ordinal, 1);
    assert_eq!(p.items[0].text, "The chemical symbol for water is H2O.");
    assert_eq!(p.items[1].ordinal, 2);
    assert_eq!(p.items[1].text, "What is the capital of France?");
  }

  #[test]
  fn preview_renders_each_question_type() {
    let mut b = BuilderSession::default();
    b.toggle("q1");
    b.toggle("q2");
    b.toggle("q3");
    let p = b.preview(&bank());

    assert_eq!(p.items[0].lines, ["A) Berlin", "B) Madrid", "C) Paris", "D) Rome"]);
    assert_eq!(p.items[1].lines, ["( ) True   ( ) False"]);
    assert_eq!(p.items[2].lines.len(), 1);
    assert!(p.items[2].lines[0].chars().all(|c| c == '_'));
  }

  #[test]
  fn preview_reflects_title_and_holds_no_state() {
    let mut b = BuilderSession::default();
    assert_eq!(b.preview(&bank()).title, DEFAULT_TITLE);
    b.set_title("Unit 3 Review");
    assert_eq!(b.preview(&bank()).title, "Unit 3 Review");
    assert!(b.preview(&bank()).items.is_empty());
  }

  #[test]
  fn preview_skips_ids_missing_from_the_bank() {
    let mut b = BuilderSession::default();
    b.toggle("q1");
    b.toggle("ghost");
    b.toggle("q3");
    let p = b.preview(&bank());
    let ordinals: Vec<_> = p.items.iter().map(|i| i.ordinal).collect();
    assert_eq!(ordinals, [1, 2]);
    assert_eq!(p.items[1].text, "Who wrote \"To Kill a Mockingbird\"?");
  }

  #[test]
  fn prune_removes_without_reordering_the_rest() {
    let mut b = BuilderSession::default();
    b.toggle("q1");
    b.toggle("q2");
    b.toggle("q3");
    b.prune("q2");
    assert_eq!(b.selection(), ["q1", "q3"]);
  }
}
