// src/repository/mod.rs

//! Document storage for users, courses and quiz results.
//!
//! Handlers only see the `Store` trait so the HTTP layer can run against
//! Postgres in production and against an in-memory store in tests.

pub mod postgres;

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{course::Course, quiz_result::QuizResult, user::User},
};

pub use postgres::PgStore;

#[async_trait]
pub trait Store: Send + Sync {
    /// Inserts a new user. A taken username is `AppError::Conflict`.
    async fn insert_user(&self, user: &User) -> Result<(), AppError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Inserts a course. An identifier that is already stored is `AppError::Conflict`.
    async fn insert_course(&self, course: &Course) -> Result<(), AppError>;

    /// All courses owned by `user_id`, in storage order.
    async fn list_courses(&self, user_id: &str) -> Result<Vec<Course>, AppError>;

    /// Looks a course up by identifier regardless of owner.
    async fn find_course(&self, course_id: &str) -> Result<Option<Course>, AppError>;

    /// Looks a course up by identifier, only if owned by `user_id`.
    async fn find_user_course(
        &self,
        course_id: &str,
        user_id: &str,
    ) -> Result<Option<Course>, AppError>;

    async fn insert_quiz_result(&self, result: &QuizResult) -> Result<(), AppError>;

    /// All results `user_id` submitted for `course_id`, in storage order.
    async fn list_quiz_results(
        &self,
        course_id: &str,
        user_id: &str,
    ) -> Result<Vec<QuizResult>, AppError>;
}
