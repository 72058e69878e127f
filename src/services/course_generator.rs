// src/services/course_generator.rs

//! Turns a topic into course content via the configured text generator.
//!
//! The model is asked for a fixed JSON shape. Whatever comes back is parsed
//! leniently: absent fields get defaults so a usable course is returned
//! whenever the text is valid JSON at all.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::Deserialize;
use tracing::{error, info, instrument};
use url::Url;

use crate::{
    config::GenerationSettings,
    error::AppError,
    llm::TextGenerator,
    models::{
        course::{CourseContent, Lesson, Quiz, Video},
        new_id,
    },
};

const VIDEO_SEARCH_URL: &str = "https://www.youtube.com/results";
const VIDEO_THUMBNAIL_URL: &str = "https://picsum.photos/1280/720";

static LEADING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```[A-Za-z0-9_-]*[ \t]*\r?\n?").expect("valid regex"));
static TRAILING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n?[ \t]*```$").expect("valid regex"));

#[derive(Clone)]
pub struct CourseGenerator {
    generator: Arc<dyn TextGenerator>,
    settings: GenerationSettings,
}

/// Course as the model returns it. Every field is optional.
#[derive(Debug, Default, Deserialize)]
struct RawCourse {
    title: Option<String>,
    description: Option<String>,
    lessons: Option<Vec<RawLesson>>,
    quizzes: Option<Vec<RawQuiz>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawLesson {
    title: Option<String>,
    content: Option<String>,
    /// Usually a string; some models send an array of snippets.
    code_examples: Option<serde_json::Value>,
    video_queries: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawQuiz {
    question: Option<String>,
    options: Option<Vec<serde_json::Value>>,
    correct_answer: Option<String>,
    explanation: Option<String>,
}

impl CourseGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>, settings: GenerationSettings) -> Self {
        Self { generator, settings }
    }

    /// Generates course content for `topic`. Nothing is persisted.
    #[instrument(level = "info", skip(self), fields(topic_len = topic.len()))]
    pub async fn generate(&self, topic: &str) -> Result<CourseContent, AppError> {
        let prompt = build_prompt(topic, &self.settings);
        let response = self.generator.generate_json(&prompt).await?;
        info!(response_len = response.len(), "LLM response received");

        let content = parse_course(topic, &response)?;
        info!(
            lessons = content.lessons.len(),
            quizzes = content.quizzes.len(),
            "Course content generated"
        );
        Ok(content)
    }
}

/// Builds the single prompt sent to the text generator.
pub fn build_prompt(topic: &str, settings: &GenerationSettings) -> String {
    let lessons = settings.lessons;
    let quizzes = settings.quizzes;
    format!(
        r#"You are an expert course creator. Create a concise mini-course about '{topic}'.
Include {lessons_min}-{lessons_max} detailed lessons and {quizzes_min}-{quizzes_max} quiz questions in total.
Focus on practical knowledge and real-world applications.

Respond ONLY with valid JSON in exactly this shape:
{{
  "title": "Course title",
  "description": "Short course description",
  "lessons": [
    {{
      "title": "Lesson title",
      "content": "Lesson body with explanations, examples and key concepts, formatted as markdown",
      "code_examples": "Code examples when relevant, as markdown code blocks",
      "video_queries": ["YouTube search query", "another YouTube search query"]
    }}
  ],
  "quizzes": [
    {{
      "question": "Question text",
      "options": ["Option A", "Option B", "Option C", "Option D"],
      "correct_answer": "Option A",
      "explanation": "Why this answer is correct"
    }}
  ]
}}
The correct_answer must be copied exactly from one of the options."#,
        lessons_min = lessons.min,
        lessons_max = lessons.max,
        quizzes_min = quizzes.min,
        quizzes_max = quizzes.max,
    )
}

/// Removes a markdown code fence wrapped around the payload, if any.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let start = LEADING_FENCE.find(trimmed).map_or(0, |m| m.end());
    let rest = &trimmed[start..];
    let end = TRAILING_FENCE.find(rest).map_or(rest.len(), |m| m.start());
    rest[..end].trim()
}

/// Parses generator output into course content, defaulting missing fields.
pub fn parse_course(topic: &str, response: &str) -> Result<CourseContent, AppError> {
    let cleaned = strip_code_fences(response);
    let raw: RawCourse = serde_json::from_str(cleaned).map_err(|e| {
        error!(error = %e, raw = %response, "Failed to parse LLM response as JSON");
        AppError::GenerationError("could not parse the generated course".to_string())
    })?;

    let lessons = raw
        .lessons
        .unwrap_or_default()
        .into_iter()
        .map(|lesson| Lesson {
            id: new_id(),
            title: lesson.title.unwrap_or_else(|| "Untitled Lesson".to_string()),
            content: lesson.content.unwrap_or_default(),
            videos: scalar_texts(lesson.video_queries)
                .iter()
                .map(|query| video_for_query(query))
                .collect(),
            code_examples: lesson.code_examples.and_then(code_text),
        })
        .collect();

    let quizzes = raw
        .quizzes
        .unwrap_or_default()
        .into_iter()
        .map(|quiz| Quiz {
            id: new_id(),
            question: quiz.question.unwrap_or_default(),
            options: scalar_texts(quiz.options),
            correct_answer: quiz.correct_answer.unwrap_or_default(),
            explanation: quiz.explanation,
        })
        .collect();

    Ok(CourseContent {
        title: raw.title.unwrap_or_else(|| format!("Course: {topic}")),
        description: raw
            .description
            .unwrap_or_else(|| format!("A comprehensive course about {topic}")),
        lessons,
        quizzes,
    })
}

/// Strings, numbers and booleans as text; nested values and nulls are dropped.
fn scalar_text(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(text) => Some(text),
        serde_json::Value::Number(number) => Some(number.to_string()),
        serde_json::Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn scalar_texts(values: Option<Vec<serde_json::Value>>) -> Vec<String> {
    values
        .unwrap_or_default()
        .into_iter()
        .filter_map(scalar_text)
        .collect()
}

fn code_text(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(text) => Some(text),
        serde_json::Value::Array(items) => {
            let snippets: Vec<String> = items
                .into_iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect();
            (!snippets.is_empty()).then(|| snippets.join("\n\n"))
        }
        _ => None,
    }
}

/// Placeholder video pointing at search results for `query`.
pub fn video_for_query(query: &str) -> Video {
    let url = Url::parse_with_params(VIDEO_SEARCH_URL, &[("search_query", query)])
        .map(String::from)
        .unwrap_or_else(|_| format!("{VIDEO_SEARCH_URL}?search_query={}", query.replace(' ', "+")));

    Video {
        title: format!("Video: {query}"),
        url,
        thumbnail: Some(VIDEO_THUMBNAIL_URL.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Returns a canned response and remembers the prompt it was given.
    struct CannedGenerator {
        response: Result<String, ()>,
        last_prompt: Mutex<Option<String>>,
    }

    impl CannedGenerator {
        fn ok(text: &str) -> Arc<Self> {
            Arc::new(Self {
                response: Ok(text.to_string()),
                last_prompt: Mutex::new(None),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                response: Err(()),
                last_prompt: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        async fn generate_json(&self, prompt: &str) -> Result<String, LlmError> {
            *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
            self.response.clone().map_err(|_| LlmError::Status {
                status: 503,
                message: "overloaded".to_string(),
            })
        }
    }

    const FULL_COURSE: &str = r#"{
        "title": "Rust Ownership",
        "description": "Move semantics and borrowing",
        "lessons": [
            {
                "title": "Moves",
                "content": "Values have one owner.",
                "code_examples": "let a = String::new();",
                "video_queries": ["rust ownership explained", "rust move semantics"]
            }
        ],
        "quizzes": [
            {
                "question": "How many owners can a value have?",
                "options": ["One", "Two"],
                "correct_answer": "One",
                "explanation": "Ownership is unique."
            }
        ]
    }"#;

    fn generator(stub: Arc<CannedGenerator>) -> CourseGenerator {
        CourseGenerator::new(stub, GenerationSettings::default())
    }

    #[tokio::test]
    async fn well_formed_json_becomes_course_content() {
        let content = generator(CannedGenerator::ok(FULL_COURSE))
            .generate("Rust")
            .await
            .unwrap();

        assert_eq!(content.title, "Rust Ownership");
        assert_eq!(content.lessons.len(), 1);
        let lesson = &content.lessons[0];
        assert_eq!(lesson.code_examples.as_deref(), Some("let a = String::new();"));
        assert_eq!(lesson.videos.len(), 2);
        assert_eq!(lesson.videos[0].title, "Video: rust ownership explained");
        assert_eq!(
            lesson.videos[0].url,
            "https://www.youtube.com/results?search_query=rust+ownership+explained"
        );
        assert_eq!(lesson.videos[0].thumbnail.as_deref(), Some(VIDEO_THUMBNAIL_URL));
        assert_eq!(content.quizzes[0].correct_answer, "One");
        assert!(!content.quizzes[0].id.is_empty());
    }

    #[tokio::test]
    async fn fenced_json_is_accepted() {
        let fenced = format!("```json\n{}\n```", FULL_COURSE);
        let content = generator(CannedGenerator::ok(&fenced))
            .generate("Rust")
            .await
            .unwrap();
        assert_eq!(content.title, "Rust Ownership");

        let bare_fence = format!("```\n{}```", FULL_COURSE);
        assert!(parse_course("Rust", &bare_fence).is_ok());
    }

    #[tokio::test]
    async fn prose_wrapped_json_is_a_generation_error() {
        let prose = format!("Here is your course:\n{}", FULL_COURSE);
        let err = generator(CannedGenerator::ok(&prose))
            .generate("Rust")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::GenerationError(_)));
    }

    #[tokio::test]
    async fn truncated_json_is_a_generation_error() {
        let truncated = &FULL_COURSE[..FULL_COURSE.len() / 2];
        let err = generator(CannedGenerator::ok(truncated))
            .generate("Rust")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::GenerationError(_)));
    }

    #[tokio::test]
    async fn failed_call_is_a_generation_error() {
        let err = generator(CannedGenerator::failing())
            .generate("Rust")
            .await
            .unwrap_err();
        match err {
            AppError::GenerationError(msg) => assert!(msg.contains("503")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let content = parse_course(
            "Sourdough",
            r#"{"lessons": [{"content": "Feed the starter."}, {}], "quizzes": [{"question": "Flour?"}]}"#,
        )
        .unwrap();

        assert_eq!(content.title, "Course: Sourdough");
        assert_eq!(content.description, "A comprehensive course about Sourdough");
        assert_eq!(content.lessons[0].title, "Untitled Lesson");
        assert!(content.lessons[0].videos.is_empty());
        assert!(content.lessons[1].content.is_empty());
        assert!(content.lessons[1].code_examples.is_none());
        assert!(content.quizzes[0].options.is_empty());
        assert!(content.quizzes[0].correct_answer.is_empty());
    }

    #[test]
    fn null_fields_are_treated_as_missing() {
        let content = parse_course(
            "Go",
            r#"{"title": null, "lessons": [{"title": "L1", "video_queries": null}], "quizzes": null}"#,
        )
        .unwrap();
        assert_eq!(content.title, "Course: Go");
        assert!(content.lessons[0].videos.is_empty());
        assert!(content.quizzes.is_empty());
    }

    #[test]
    fn code_examples_array_is_joined() {
        let content = parse_course(
            "Python",
            r#"{"lessons": [{"title": "L1", "code_examples": ["print(1)", "print(2)"]}]}"#,
        )
        .unwrap();
        assert_eq!(
            content.lessons[0].code_examples.as_deref(),
            Some("print(1)\n\nprint(2)")
        );
    }

    #[test]
    fn non_string_options_and_queries_are_coerced() {
        let content = parse_course(
            "Arithmetic",
            r#"{
                "lessons": [{"title": "Sums", "video_queries": ["adding numbers", 42, null, {"q": 1}]}],
                "quizzes": [{"question": "1 + 1?", "options": [1, 2, "three", true], "correct_answer": "2"}]
            }"#,
        )
        .unwrap();

        let videos = &content.lessons[0].videos;
        assert_eq!(videos.len(), 2);
        assert_eq!(videos[1].title, "Video: 42");
        assert_eq!(content.quizzes[0].options, vec!["1", "2", "three", "true"]);
        assert_eq!(content.quizzes[0].correct_answer, "2");
    }

    #[test]
    fn empty_object_yields_empty_course() {
        let content = parse_course("Chess", "{}").unwrap();
        assert!(content.lessons.is_empty());
        assert!(content.quizzes.is_empty());
    }

    #[test]
    fn fence_stripping_leaves_plain_json_alone() {
        assert_eq!(strip_code_fences("  {\"a\": 1}\n"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```{\"a\": 1}```"), "{\"a\": 1}");
    }

    #[test]
    fn video_query_is_form_encoded() {
        let video = video_for_query("c++ smart pointers");
        assert_eq!(
            video.url,
            "https://www.youtube.com/results?search_query=c%2B%2B+smart+pointers"
        );
        assert_eq!(video.title, "Video: c++ smart pointers");
    }

    #[tokio::test]
    async fn prompt_carries_topic_and_counts() {
        let stub = CannedGenerator::ok(FULL_COURSE);
        let settings = GenerationSettings {
            lessons: crate::config::CountRange { min: 3, max: 4 },
            quizzes: crate::config::CountRange { min: 6, max: 8 },
        };
        CourseGenerator::new(stub.clone(), settings)
            .generate("Kubernetes")
            .await
            .unwrap();

        let prompt = stub.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("'Kubernetes'"));
        assert!(prompt.contains("3-4 detailed lessons"));
        assert!(prompt.contains("6-8 quiz questions"));
        assert!(prompt.contains("\"video_queries\""));
    }
}
