// src/models/course.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

use super::{new_id, now};

/// Progress marker of a course. Stored, never transitioned by the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl CompletionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CompletionStatus::NotStarted => "not_started",
            CompletionStatus::InProgress => "in_progress",
            CompletionStatus::Completed => "completed",
        }
    }

    /// Unknown values read back from storage fall back to `NotStarted`.
    pub fn from_db(value: &str) -> Self {
        match value {
            "in_progress" => CompletionStatus::InProgress,
            "completed" => CompletionStatus::Completed,
            _ => CompletionStatus::NotStarted,
        }
    }
}

/// A synthesized link to video search results for a lesson topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    #[serde(default = "new_id")]
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub videos: Vec<Video>,
    #[serde(default)]
    pub code_examples: Option<String>,
}

/// One multiple-choice question. `correct_answer` is expected to be one of `options`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    #[serde(default = "new_id")]
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: Option<String>,
}

/// Generated course material before it is bound to an owner.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseContent {
    pub title: String,
    pub description: String,
    pub lessons: Vec<Lesson>,
    pub quizzes: Vec<Quiz>,
}

/// A course as exchanged with clients.
/// Fields a client may omit when saving get fresh defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    #[serde(default = "new_id")]
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    pub topic: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
    #[serde(default)]
    pub quizzes: Vec<Quiz>,
    #[serde(default = "now")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completion_status: CompletionStatus,
}

impl Course {
    /// Binds generated content to its owner and topic.
    pub fn from_content(user_id: &str, topic: &str, content: CourseContent) -> Self {
        Self {
            id: new_id(),
            user_id: user_id.to_string(),
            topic: topic.to_string(),
            title: content.title,
            description: content.description,
            lessons: content.lessons,
            quizzes: content.quizzes,
            created_at: now(),
            completion_status: CompletionStatus::NotStarted,
        }
    }

    /// Correct answers in stored quiz order.
    pub fn correct_answers(&self) -> Vec<String> {
        self.quizzes.iter().map(|q| q.correct_answer.clone()).collect()
    }
}

/// Represents the 'courses' table in the database.
/// Lessons and quizzes are stored as JSONB arrays.
#[derive(Debug, FromRow)]
pub struct CourseRow {
    pub id: String,
    pub user_id: String,
    pub topic: String,
    pub title: String,
    pub description: String,
    pub lessons: Json<Vec<Lesson>>,
    pub quizzes: Json<Vec<Quiz>>,
    pub created_at: DateTime<Utc>,
    pub completion_status: String,
}

impl From<CourseRow> for Course {
    fn from(row: CourseRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            topic: row.topic,
            title: row.title,
            description: row.description,
            lessons: row.lessons.0,
            quizzes: row.quizzes.0,
            created_at: row.created_at,
            completion_status: CompletionStatus::from_db(&row.completion_status),
        }
    }
}

/// DTO for requesting a generated course.
#[derive(Debug, Deserialize, Validate)]
pub struct GenerateCourseRequest {
    #[validate(length(min = 1, message = "Topic must not be empty."))]
    pub topic: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SaveCourseResponse {
    pub message: String,
    pub course_id: String,
}
