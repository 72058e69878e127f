// src/handlers/course.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        course::{Course, GenerateCourseRequest, SaveCourseResponse},
        timestamp,
    },
    repository::Store,
    services::course_generator::CourseGenerator,
    utils::jwt::AuthUser,
};

/// Generates a course for the caller. The result is returned, not stored.
pub async fn generate_course(
    State(generator): State<CourseGenerator>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<GenerateCourseRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }
    let topic = payload.topic.trim();
    if topic.is_empty() {
        return Err(AppError::BadRequest("Topic must not be empty.".to_string()));
    }

    let content = generator.generate(topic).await?;

    Ok(Json(Course::from_content(&user.id, topic, content)))
}

/// Saves a course for the caller, whatever owner the body names.
pub async fn save_course(
    State(store): State<Arc<dyn Store>>,
    Extension(user): Extension<AuthUser>,
    Json(mut course): Json<Course>,
) -> Result<impl IntoResponse, AppError> {
    course.user_id = user.id;
    course.created_at = timestamp(course.created_at);

    store.insert_course(&course).await?;
    tracing::info!(course_id = %course.id, "Course saved");

    Ok(Json(SaveCourseResponse {
        message: "Course saved successfully".to_string(),
        course_id: course.id,
    }))
}

/// Lists the caller's courses.
pub async fn list_courses(
    State(store): State<Arc<dyn Store>>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, AppError> {
    let courses = store.list_courses(&user.id).await?;
    Ok(Json(courses))
}

/// Fetches one of the caller's courses. Other users' courses are reported as missing.
pub async fn get_course(
    State(store): State<Arc<dyn Store>>,
    Extension(user): Extension<AuthUser>,
    Path(course_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let course = store
        .find_user_course(&course_id, &user.id)
        .await?
        .ok_or(AppError::NotFound("Course not found".to_string()))?;

    Ok(Json(course))
}
