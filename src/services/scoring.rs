// src/services/scoring.rs

use sqlx::types::Json;

use crate::{
    error::AppError,
    models::{new_id, now, quiz_result::QuizResult},
    repository::Store,
};

/// Counts submitted answers that equal the correct answer at the same index.
///
/// Only the overlapping prefix is compared; extra or missing answers are not errors.
pub fn score_answers(correct_answers: &[String], submitted: &[String]) -> usize {
    correct_answers
        .iter()
        .zip(submitted)
        .filter(|(correct, given)| correct == given)
        .count()
}

/// Score as a percentage of `total`, rounded to two decimals. Zero when there are no questions.
pub fn percentage(score: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = score as f64 / total as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}

/// Scores a submission against the stored course and records the result.
///
/// The course is looked up by identifier only. The course itself is never modified.
pub async fn submit(
    store: &dyn Store,
    user_id: &str,
    course_id: &str,
    answers: Vec<String>,
) -> Result<(QuizResult, f64), AppError> {
    let course = store
        .find_course(course_id)
        .await?
        .ok_or(AppError::NotFound("Course not found".to_string()))?;

    let correct_answers = course.correct_answers();
    let score = score_answers(&correct_answers, &answers);
    let total = correct_answers.len();

    let result = QuizResult {
        id: new_id(),
        user_id: user_id.to_string(),
        course_id: course.id,
        score: score as i64,
        total_questions: total as i64,
        answers: Json(answers),
        correct_answers: Json(correct_answers),
        submitted_at: now(),
    };

    store.insert_quiz_result(&result).await?;
    tracing::info!(
        course_id = %result.course_id,
        score,
        total,
        "Quiz submission recorded"
    );

    Ok((result, percentage(score, total)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn positional_matches_are_counted() {
        let correct = strings(&["A", "B", "C"]);
        let score = score_answers(&correct, &strings(&["A", "X", "C"]));
        assert_eq!(score, 2);
        assert_eq!(percentage(score, correct.len()), 66.67);
    }

    #[test]
    fn order_matters() {
        let correct = strings(&["A", "B", "C"]);
        assert_eq!(score_answers(&correct, &strings(&["C", "B", "A"])), 1);
    }

    #[test]
    fn short_submission_scores_prefix_only() {
        let correct = strings(&["A", "B", "C", "D"]);
        let score = score_answers(&correct, &strings(&["A", "B"]));
        assert_eq!(score, 2);
        assert_eq!(percentage(score, correct.len()), 50.0);
    }

    #[test]
    fn long_submission_ignores_tail() {
        let correct = strings(&["A"]);
        assert_eq!(score_answers(&correct, &strings(&["A", "A", "A"])), 1);
    }

    #[test]
    fn empty_quiz_set_is_zero_percent() {
        let score = score_answers(&[], &strings(&["A", "B"]));
        assert_eq!(score, 0);
        assert_eq!(percentage(score, 0), 0.0);
    }

    #[test]
    fn percentage_rounds_to_two_decimals() {
        assert_eq!(percentage(1, 3), 33.33);
        assert_eq!(percentage(1, 6), 16.67);
        assert_eq!(percentage(3, 3), 100.0);
    }
}
