use crate::error::AppError;
use crate::models::UserAnswer;
use crate::session::{
    percentage, FeedbackBand, FinalResult, Navigation, Placement, QuizView,
};
use crate::state::AppState;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

fn request_id_from_headers(headers: &HeaderMap) -> String {
    headers
        .get("x-request-id")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

pub async fn get_quiz(State(state): State<AppState>) -> Json<QuizView> {
    Json(state.quiz.read().await.view())
}

pub async fn load_quiz(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<QuizView>, AppError> {
    let req_id = request_id_from_headers(&headers);
    let total = state
        .reload()
        .await
        .map_err(|err| AppError::load(&err, req_id))?;
    info!(total, "quiz reloaded on request");
    Ok(Json(state.quiz.read().await.view()))
}

#[derive(Debug, Deserialize)]
pub struct AnswerPayload {
    pub answer: UserAnswer,
}

pub async fn submit_answer(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<AnswerPayload>,
) -> Result<Json<QuizView>, AppError> {
    let req_id = request_id_from_headers(&headers);
    let mut quiz = state.quiz.write().await;
    quiz.submit_answer(payload.answer)
        .map_err(|err| AppError::session(err, req_id))?;
    Ok(Json(quiz.view()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragPayload {
    pub word: String,
    pub blank_index: usize,
}

#[derive(Debug, Serialize)]
pub struct PlacementResponse {
    pub placement: Placement,
    pub quiz: QuizView,
}

pub async fn place_word(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<DragPayload>,
) -> Result<Json<PlacementResponse>, AppError> {
    let req_id = request_id_from_headers(&headers);
    let mut quiz = state.quiz.write().await;
    let placement = quiz
        .pick_up(&payload.word)
        .and_then(|token| quiz.place(token, payload.blank_index))
        .map_err(|err| AppError::session(err, req_id))?;
    Ok(Json(PlacementResponse {
        placement,
        quiz: quiz.view(),
    }))
}

#[derive(Debug, Serialize)]
pub struct NavigationResponse {
    pub navigation: Navigation,
    pub quiz: QuizView,
}

pub async fn advance(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<NavigationResponse>, AppError> {
    let req_id = request_id_from_headers(&headers);
    let mut quiz = state.quiz.write().await;
    let navigation = quiz
        .advance()
        .map_err(|err| AppError::session(err, req_id))?;
    Ok(Json(NavigationResponse {
        navigation,
        quiz: quiz.view(),
    }))
}

pub async fn retreat(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<QuizView>, AppError> {
    let req_id = request_id_from_headers(&headers);
    let mut quiz = state.quiz.write().await;
    quiz.retreat()
        .map_err(|err| AppError::session(err, req_id))?;
    Ok(Json(quiz.view()))
}

pub async fn restart(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<QuizView>, AppError> {
    let req_id = request_id_from_headers(&headers);
    let mut quiz = state.quiz.write().await;
    quiz.restart()
        .map_err(|err| AppError::session(err, req_id))?;
    Ok(Json(quiz.view()))
}

pub async fn score(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    let req_id = request_id_from_headers(&headers);
    let report = state
        .quiz
        .read()
        .await
        .score()
        .map_err(|err| AppError::session(err, req_id))?;
    let pct = percentage(report.score, report.total);
    Ok(Json(json!({
        "score": report.score,
        "total": report.total,
        "percentage": pct,
        "band": FeedbackBand::from_percentage(pct),
    })))
}

pub async fn result(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<FinalResult>, AppError> {
    let req_id = request_id_from_headers(&headers);
    let quiz = state.quiz.read().await;
    let result = quiz
        .final_result()
        .map_err(|err| AppError::session(err, req_id))?;
    Ok(Json(result.clone()))
}
