use crate::models::{validate_question_bank, Question};
use futures::future::BoxFuture;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed question bank: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("cannot read question bank: {0}")]
    Io(#[from] std::io::Error),
    #[error("the question bank is empty")]
    Empty,
}

// One fetch per load, no retries.
pub trait QuestionBankLoader: Send + Sync {
    fn fetch(&self) -> BoxFuture<'static, Result<Vec<Question>, LoadError>>;
}

pub fn parse_question_bank(raw: &[u8]) -> Result<Vec<Question>, LoadError> {
    let records: Vec<serde_json::Value> = serde_json::from_slice(raw)?;
    if records.is_empty() {
        return Err(LoadError::Empty);
    }
    let questions: Vec<Question> = records
        .into_iter()
        .enumerate()
        .map(|(i, record)| {
            let (question, err) = Question::from_value_lenient(record);
            if let Some(err) = err {
                warn!(index = i, "unreadable question replaced by placeholder: {}", err);
            }
            question
        })
        .collect();
    for issue in validate_question_bank(&questions) {
        warn!(field = %issue.field, "question bank issue: {}", issue.issue);
    }
    Ok(questions)
}

#[derive(Clone)]
pub struct HttpQuestionBankLoader {
    pub client: reqwest::Client,
    pub url: String,
}

impl HttpQuestionBankLoader {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

impl QuestionBankLoader for HttpQuestionBankLoader {
    fn fetch(&self) -> BoxFuture<'static, Result<Vec<Question>, LoadError>> {
        let client = self.client.clone();
        let url = self.url.clone();
        Box::pin(async move {
            let response = client.get(&url).send().await?;
            if !response.status().is_success() {
                return Err(LoadError::Status(response.status()));
            }
            let body = response.bytes().await?;
            let questions = parse_question_bank(&body)?;
            info!(url = %url, count = questions.len(), "question bank fetched");
            Ok(questions)
        })
    }
}

#[derive(Clone)]
pub struct FileQuestionBankLoader {
    pub path: PathBuf,
}

impl QuestionBankLoader for FileQuestionBankLoader {
    fn fetch(&self) -> BoxFuture<'static, Result<Vec<Question>, LoadError>> {
        let path = self.path.clone();
        Box::pin(async move {
            let raw = tokio::fs::read(&path).await?;
            let questions = parse_question_bank(&raw)?;
            info!(path = %path.display(), count = questions.len(), "question bank read");
            Ok(questions)
        })
    }
}

#[derive(Clone)]
pub struct StaticQuestionBankLoader {
    pub questions: Vec<Question>,
}

impl StaticQuestionBankLoader {
    pub fn from_json(raw: &str) -> Result<Self, LoadError> {
        Ok(Self {
            questions: parse_question_bank(raw.as_bytes())?,
        })
    }
}

impl QuestionBankLoader for StaticQuestionBankLoader {
    fn fetch(&self) -> BoxFuture<'static, Result<Vec<Question>, LoadError>> {
        let questions = self.questions.clone();
        Box::pin(async move {
            if questions.is_empty() {
                return Err(LoadError::Empty);
            }
            Ok(questions)
        })
    }
}
