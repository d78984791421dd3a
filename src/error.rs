use crate::loader::LoadError;
use crate::session::SessionError;
use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: ErrorPayload,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ErrorDetail>,
    pub request_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDetail {
    pub field: String,
    pub issue: String,
}

impl ErrorDetail {
    pub fn new(field: impl Into<String>, issue: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            issue: issue.into(),
        }
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub details: Vec<ErrorDetail>,
    pub request_id: String,
}

impl AppError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: Vec::new(),
            request_id: request_id.into(),
        }
    }

    pub fn with_details(mut self, details: Vec<ErrorDetail>) -> Self {
        self.details = details;
        self
    }

    pub fn session(err: SessionError, request_id: impl Into<String>) -> Self {
        let (status, code) = match &err {
            SessionError::NotLoaded => (StatusCode::SERVICE_UNAVAILABLE, "NOT_LOADED"),
            SessionError::LoadFailed(_) => (StatusCode::SERVICE_UNAVAILABLE, "LOAD_FAILED"),
            SessionError::Finished => (StatusCode::CONFLICT, "QUIZ_FINISHED"),
            SessionError::NotFinished => (StatusCode::CONFLICT, "QUIZ_NOT_FINISHED"),
            SessionError::AlreadyAnswered => (StatusCode::CONFLICT, "ALREADY_ANSWERED"),
            SessionError::Unanswered => (StatusCode::CONFLICT, "UNANSWERED"),
            SessionError::StaleToken => (StatusCode::CONFLICT, "STALE_TOKEN"),
            SessionError::BlankFilled(_) => (StatusCode::CONFLICT, "BLANK_FILLED"),
            SessionError::WordExhausted(_) => (StatusCode::CONFLICT, "WORD_EXHAUSTED"),
            SessionError::IncompleteAnswer => (StatusCode::UNPROCESSABLE_ENTITY, "INCOMPLETE_ANSWER"),
            SessionError::AnswerShapeMismatch { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "ANSWER_SHAPE_MISMATCH"),
            SessionError::Unsupported => (StatusCode::UNPROCESSABLE_ENTITY, "UNSUPPORTED_QUESTION"),
            SessionError::NotDragAndDrop => (StatusCode::UNPROCESSABLE_ENTITY, "NOT_DRAG_AND_DROP"),
            SessionError::UnknownWord(_) => (StatusCode::UNPROCESSABLE_ENTITY, "UNKNOWN_WORD"),
            SessionError::BlankOutOfRange { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "BLANK_OUT_OF_RANGE"),
        };
        let details = match &err {
            SessionError::AnswerShapeMismatch { expected } => {
                vec![ErrorDetail::new("answer", format!("expected {}", expected))]
            }
            SessionError::IncompleteAnswer => vec![ErrorDetail::new("answer", "missing or incomplete")],
            SessionError::UnknownWord(word) | SessionError::WordExhausted(word) => {
                vec![ErrorDetail::new("word", word.clone())]
            }
            SessionError::BlankOutOfRange { index, targets } => vec![ErrorDetail::new(
                "blankIndex",
                format!("{} is outside 0..{}", index, targets),
            )],
            _ => Vec::new(),
        };
        Self::new(status, code, err.to_string(), request_id).with_details(details)
    }

    pub fn load(err: &LoadError, request_id: impl Into<String>) -> Self {
        let code = match err {
            LoadError::Empty => "EMPTY_QUESTION_BANK",
            _ => "LOAD_FAILED",
        };
        Self::new(StatusCode::SERVICE_UNAVAILABLE, code, err.to_string(), request_id)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let payload = ErrorBody {
            error: ErrorPayload {
                code: self.code,
                message: self.message,
                details: self.details,
                request_id: self.request_id,
            },
        };
        (self.status, Json(payload)).into_response()
    }
}
