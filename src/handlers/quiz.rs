// src/handlers/quiz.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    models::quiz_set::{QuizSummary, StepView},
    store::QuizStore,
};

/// Public step payload, `{ success: true, ...StepView }`.
#[derive(Debug, Serialize)]
pub struct StepResponse {
    pub success: bool,
    #[serde(flatten)]
    pub step: StepView,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ActiveQuizzesResponse {
    pub success: bool,
    pub quizzes: Vec<QuizSummary>,
}

/// Resolves a public step identifier to the content of that step.
///
/// Unknown identifiers and identifiers of deactivated quiz sets are both 404.
pub async fn get_step(
    State(store): State<QuizStore>,
    Path(step_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let not_found = || AppError::NotFound("Quiz not found or inactive".to_string());

    let quiz = store
        .find_active_by_step_id(&step_id)
        .await?
        .ok_or_else(not_found)?;

    let step = quiz.resolve(&step_id).ok_or_else(not_found)?;
    tracing::debug!(quiz_id = quiz.id, page = step.role().page_type(), "Resolved quiz step");

    Ok(Json(StepResponse {
        success: true,
        step,
    }))
}

/// Lists published quiz sets, newest first.
pub async fn list_active(State(store): State<QuizStore>) -> Result<impl IntoResponse, AppError> {
    let quizzes = store.list_active().await?;

    Ok(Json(ActiveQuizzesResponse {
        success: true,
        quizzes,
    }))
}
