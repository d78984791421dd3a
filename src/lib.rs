pub mod config;
pub mod error;
pub mod evaluator;
pub mod handlers;
pub mod loader;
pub mod models;
pub mod routes;
pub mod session;
pub mod shuffle;
pub mod state;

use config::{Config, QuestionSource};
use loader::{FileQuestionBankLoader, HttpQuestionBankLoader, QuestionBankLoader, StaticQuestionBankLoader};
use std::sync::Arc;

pub const SAMPLE_QUESTION_BANK: &str = include_str!("../data/questions.json");

pub fn build_state(config: &Config) -> anyhow::Result<state::AppState> {
    let loader: Arc<dyn QuestionBankLoader> = match &config.source {
        QuestionSource::File(path) => Arc::new(FileQuestionBankLoader { path: path.clone() }),
        QuestionSource::Url(url) => Arc::new(HttpQuestionBankLoader::new(url.clone())),
        QuestionSource::Bundled => Arc::new(StaticQuestionBankLoader::from_json(SAMPLE_QUESTION_BANK)?),
    };
    Ok(state::AppState::new(loader, config.seed))
}
