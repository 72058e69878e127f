// src/handlers/quiz.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::quiz_result::{SubmitQuizRequest, SubmitQuizResponse},
    repository::Store,
    services::scoring,
    utils::jwt::AuthUser,
};

/// Scores a quiz submission and records the result for the caller.
///
/// Answers are matched to the course's quizzes by position.
pub async fn submit_quiz(
    State(store): State<Arc<dyn Store>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<SubmitQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.user_id.as_deref().is_some_and(|id| id != user.id) {
        tracing::warn!("Quiz submission names another user; recording for the caller");
    }

    let (result, percentage) =
        scoring::submit(store.as_ref(), &user.id, &req.course_id, req.answers).await?;

    Ok(Json(SubmitQuizResponse { result, percentage }))
}

/// Lists the caller's results for a course.
pub async fn get_results(
    State(store): State<Arc<dyn Store>>,
    Extension(user): Extension<AuthUser>,
    Path(course_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let results = store.list_quiz_results(&course_id, &user.id).await?;
    Ok(Json(results))
}
