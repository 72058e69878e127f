// src/repository/postgres.rs

use async_trait::async_trait;
use sqlx::{PgPool, types::Json};

use super::Store;
use crate::{
    error::AppError,
    models::{
        course::{Course, CourseRow},
        quiz_result::QuizResult,
        user::User,
    },
};

const COURSE_COLUMNS: &str = "id, user_id, topic, title, description, lessons, quizzes, created_at, completion_status";

const QUIZ_RESULT_COLUMNS: &str =
    "id, user_id, course_id, score, total_questions, answers, correct_answers, submitted_at";

/// Postgres-backed `Store`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
}

#[async_trait]
impl Store for PgStore {
    async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("Username '{}' already exists", user.username))
            } else {
                tracing::error!("Failed to insert user: {:?}", e);
                AppError::from(e)
            }
        })?;

        Ok(())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn insert_course(&self, course: &Course) -> Result<(), AppError> {
        sqlx::query(&format!(
            "INSERT INTO courses ({COURSE_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"
        ))
        .bind(&course.id)
        .bind(&course.user_id)
        .bind(&course.topic)
        .bind(&course.title)
        .bind(&course.description)
        .bind(Json(&course.lessons))
        .bind(Json(&course.quizzes))
        .bind(course.created_at)
        .bind(course.completion_status.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("Course '{}' is already saved", course.id))
            } else {
                tracing::error!("Failed to insert course: {:?}", e);
                AppError::from(e)
            }
        })?;

        Ok(())
    }

    async fn list_courses(&self, user_id: &str) -> Result<Vec<Course>, AppError> {
        let rows = sqlx::query_as::<_, CourseRow>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Course::from).collect())
    }

    async fn find_course(&self, course_id: &str) -> Result<Option<Course>, AppError> {
        let row = sqlx::query_as::<_, CourseRow>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1"
        ))
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Course::from))
    }

    async fn find_user_course(
        &self,
        course_id: &str,
        user_id: &str,
    ) -> Result<Option<Course>, AppError> {
        let row = sqlx::query_as::<_, CourseRow>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1 AND user_id = $2"
        ))
        .bind(course_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Course::from))
    }

    async fn insert_quiz_result(&self, result: &QuizResult) -> Result<(), AppError> {
        sqlx::query(&format!(
            "INSERT INTO quiz_results ({QUIZ_RESULT_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"
        ))
        .bind(&result.id)
        .bind(&result.user_id)
        .bind(&result.course_id)
        .bind(result.score)
        .bind(result.total_questions)
        .bind(&result.answers)
        .bind(&result.correct_answers)
        .bind(result.submitted_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert quiz result: {:?}", e);
            AppError::from(e)
        })?;

        Ok(())
    }

    async fn list_quiz_results(
        &self,
        course_id: &str,
        user_id: &str,
    ) -> Result<Vec<QuizResult>, AppError> {
        let results = sqlx::query_as::<_, QuizResult>(&format!(
            "SELECT {QUIZ_RESULT_COLUMNS} FROM quiz_results WHERE course_id = $1 AND user_id = $2"
        ))
        .bind(course_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(results)
    }
}
