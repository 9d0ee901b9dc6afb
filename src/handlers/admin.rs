// src/handlers/admin.rs

use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    error::AppError,
    models::quiz_set::{QuizDraft, QuizSet, QuizSetRequest, StepIds},
    store::QuizStore,
    utils::jwt::Claims,
};

fn quiz_not_found() -> AppError {
    AppError::NotFound("Quiz not found".to_string())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuizListResponse {
    pub success: bool,
    pub quizzes: Vec<QuizSet>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuizResponse {
    pub success: bool,
    pub quiz: QuizSet,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedQuizResponse {
    pub success: bool,
    pub message: String,
    pub quiz_id: i64,
    pub step_ids: StepIds,
    pub entry_link: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggledQuizResponse {
    pub success: bool,
    pub is_active: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    fn ok(message: &str) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.to_string(),
        })
    }
}

/// Lists every quiz set, active or not.
/// Admin only.
pub async fn list_quizzes(State(store): State<QuizStore>) -> Result<impl IntoResponse, AppError> {
    let quizzes = store.list_all().await?;

    Ok(Json(QuizListResponse {
        success: true,
        quizzes,
    }))
}

/// Retrieves a quiz set by internal ID.
/// Admin only.
pub async fn get_quiz(
    State(store): State<QuizStore>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = id?;
    let quiz = store.find_by_id(id).await?.ok_or_else(quiz_not_found)?;

    Ok(Json(QuizResponse {
        success: true,
        quiz,
    }))
}

/// Creates a quiz set and mints its four public step identifiers.
/// Admin only.
pub async fn create_quiz(
    State(store): State<QuizStore>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<QuizSetRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let draft = QuizDraft::from(payload);
    let step_ids = StepIds::generate();
    let quiz_id = store.create(&draft, &step_ids).await?;

    tracing::info!(
        "Admin {} created quiz set {} ({})",
        claims.username,
        quiz_id,
        draft.quiz_name
    );

    let entry_link = step_ids.entry_link();
    Ok((
        StatusCode::CREATED,
        Json(CreatedQuizResponse {
            success: true,
            message: "Quiz created successfully".to_string(),
            quiz_id,
            step_ids,
            entry_link,
        }),
    ))
}

/// Replaces every authored field of a quiz set.
/// Step identifiers are kept so that links already handed out stay valid.
/// Admin only.
pub async fn update_quiz(
    State(store): State<QuizStore>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<QuizSetRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    payload.validate()?;

    if !store.update(id, &QuizDraft::from(payload)).await? {
        return Err(quiz_not_found());
    }

    Ok(MessageResponse::ok("Quiz updated successfully"))
}

/// Deletes a quiz set by ID.
/// Admin only.
pub async fn delete_quiz(
    State(store): State<QuizStore>,
    Extension(claims): Extension<Claims>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = id?;

    if !store.delete(id).await? {
        return Err(quiz_not_found());
    }

    tracing::info!("Admin {} deleted quiz set {}", claims.username, id);
    Ok(MessageResponse::ok("Quiz deleted successfully"))
}

/// Publishes or unpublishes a quiz set.
/// Admin only.
pub async fn toggle_quiz(
    State(store): State<QuizStore>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = id?;
    let is_active = store.toggle_active(id).await?.ok_or_else(quiz_not_found)?;

    Ok(Json(ToggledQuizResponse {
        success: true,
        is_active,
    }))
}
