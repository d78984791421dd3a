use crate::loader::{LoadError, QuestionBankLoader};
use crate::session::QuizController;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct AppState {
    pub quiz: Arc<RwLock<QuizController>>,
    pub loader: Arc<dyn QuestionBankLoader>,
}

impl AppState {
    pub fn new(loader: Arc<dyn QuestionBankLoader>, seed: Option<u64>) -> Self {
        Self {
            quiz: Arc::new(RwLock::new(QuizController::new(seed))),
            loader,
        }
    }

    // The lock is not held while the fetch is in flight.
    pub async fn reload(&self) -> Result<usize, LoadError> {
        self.quiz.write().await.begin_loading();
        let fetched = self.loader.fetch().await;
        self.quiz.write().await.load(fetched)
    }
}
