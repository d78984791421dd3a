use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionSource {
    File(PathBuf),
    Url(String),
    Bundled,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub source: QuestionSource,
    pub seed: Option<u64>,
    pub cors_origin: String,
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Self {
        let source = if let Some(path) = non_empty_var("QUESTION_BANK_PATH") {
            QuestionSource::File(PathBuf::from(path))
        } else if let Some(url) = non_empty_var("QUESTION_BANK_URL") {
            QuestionSource::Url(url)
        } else {
            QuestionSource::Bundled
        };
        let host = non_empty_var("BACKEND_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = non_empty_var("BACKEND_PORT")
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(8080);
        let seed = non_empty_var("QUIZ_SEED").and_then(|v| v.parse::<u64>().ok());
        let cors_origin =
            non_empty_var("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:5173".to_string());

        Self {
            host,
            port,
            source,
            seed,
            cors_origin,
        }
    }

    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}
