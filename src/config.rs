//! Loading authoring configuration (prompt templates + optional local
//! question bank) from TOML.
//!
//! See `BankConfig` and `Prompts` for the expected schema.

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct BankConfig {
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub questions: Vec<QuestionCfg>,
}

/// Question entry accepted in TOML configuration. Entries that violate the
/// one-correct-alternative rule are skipped at load time, not repaired.
#[derive(Clone, Debug, Deserialize)]
pub struct QuestionCfg {
  #[serde(default)] pub id: Option<String>,
  pub text: String,
  #[serde(default)] pub kind: Option<crate::domain::QuestionType>,
  #[serde(default)] pub subject: Option<String>,
  #[serde(default)] pub difficulty: Option<String>,
  #[serde(default)] pub alternatives: Vec<AlternativeCfg>,
  #[serde(default)] pub standards: Vec<String>,
  #[serde(default)] pub descriptors: Vec<String>,
  #[serde(default)] pub image_url: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AlternativeCfg {
  pub text: String,
  #[serde(default)] pub correct: bool,
}

/// Task templates sent to the generative service. Defaults mirror the
/// instructions the authoring UI was built around; override them in TOML to
/// tune tone or taxonomy wording.
#[derive(Clone, Debug, Deserialize)]
pub struct Prompts {
  pub classify_task_template: String,
  pub phrasing_task_template: String,
  pub distractor_task_template: String,
  pub generate_task_template: String,
  pub extract_task: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      classify_task_template: "Given the question \"{text}\", classify it against the curriculum taxonomy. Provide one standard code, one descriptor code, and a difficulty level ('Easy', 'Medium', or 'Hard').".into(),
      phrasing_task_template: "Generate 3 alternative phrasings for the following question: \"{text}\"".into(),
      distractor_task_template: "For the multiple-choice question \"{text}\", the correct answer is \"{correct}\". Generate 3 plausible but incorrect answer choices (distractors).".into(),
      generate_task_template: "Generate a medium-difficulty multiple-choice question about \"{topic}\". Include one correct answer and three incorrect distractors. Also suggest a subject, one standard code, and one descriptor code. The difficulty must be 'Easy', 'Medium', or 'Hard'. Ensure there is only one correct answer.".into(),
      extract_task: "Analyze the content of this document and extract all the educational questions you can find. For each question provide: `text` (the full question text); `type` ('Multiple Choice', 'True/False', or 'Short Answer'); `alternatives` (objects with `text` and `isCorrect`; for short answer questions provide a single alternative with the correct answer); `subject`; `difficulty` ('Easy', 'Medium', or 'Hard'); `standards` (an array with one relevant standard code); `descriptors` (an array with one relevant descriptor code). Ensure that for multiple-choice questions only one alternative has `isCorrect` set to true. If you cannot determine the content, return an empty array.".into(),
    }
  }
}

/// Attempt to load `BankConfig` from BANK_CONFIG_PATH. On any parsing/IO
/// error, returns None.
pub fn load_bank_config_from_env() -> Option<BankConfig> {
  let path = std::env::var("BANK_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<BankConfig>(&s) {
      Ok(cfg) => {
        info!(target: "bancada_backend", %path, "Loaded bank config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "bancada_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "bancada_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
