// src/models/quiz_result.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};

/// Represents the 'quiz_results' table in the database.
/// One immutable row per submission; answers are matched to quizzes by position.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct QuizResult {
    pub id: String,
    pub user_id: String,
    pub course_id: String,
    /// Number of positionally matching answers.
    pub score: i64,
    /// Number of questions in the course, not the number submitted.
    pub total_questions: i64,
    pub answers: Json<Vec<String>>,
    pub correct_answers: Json<Vec<String>>,
    pub submitted_at: DateTime<Utc>,
}

/// DTO for submitting quiz answers.
#[derive(Debug, Deserialize)]
pub struct SubmitQuizRequest {
    pub course_id: String,
    /// Accepted for client compatibility; results are recorded for the authenticated user.
    #[serde(default)]
    pub user_id: Option<String>,
    pub answers: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitQuizResponse {
    pub result: QuizResult,
    pub percentage: f64,
}
