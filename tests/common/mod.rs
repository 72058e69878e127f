// tests/common/mod.rs

#![allow(dead_code)]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use course_backend::{
    config::{Config, GenerationSettings, LlmConfig, LlmProvider},
    error::AppError,
    llm::{LlmError, TextGenerator},
    models::{course::Course, quiz_result::QuizResult, user::User},
    repository::Store,
    routes,
    services::course_generator::CourseGenerator,
    state::AppState,
};

pub const JWT_SECRET: &str = "test_secret_for_integration_tests";

/// Vec-backed store; keeps insertion order like a document collection scan.
#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<User>>,
    courses: Mutex<Vec<Course>>,
    results: Mutex<Vec<QuizResult>>,
    pub calls: AtomicUsize,
}

impl MemoryStore {
    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    pub fn course_count(&self) -> usize {
        self.courses.lock().unwrap().len()
    }

    pub fn result_count(&self) -> usize {
        self.results.lock().unwrap().len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        self.touch();
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.username == user.username) {
            return Err(AppError::Conflict(format!(
                "Username '{}' already exists",
                user.username
            )));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        self.touch();
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn insert_course(&self, course: &Course) -> Result<(), AppError> {
        self.touch();
        let mut courses = self.courses.lock().unwrap();
        if courses.iter().any(|c| c.id == course.id) {
            return Err(AppError::Conflict(format!(
                "Course '{}' is already saved",
                course.id
            )));
        }
        courses.push(course.clone());
        Ok(())
    }

    async fn list_courses(&self, user_id: &str) -> Result<Vec<Course>, AppError> {
        self.touch();
        let courses = self.courses.lock().unwrap();
        Ok(courses.iter().filter(|c| c.user_id == user_id).cloned().collect())
    }

    async fn find_course(&self, course_id: &str) -> Result<Option<Course>, AppError> {
        self.touch();
        let courses = self.courses.lock().unwrap();
        Ok(courses.iter().find(|c| c.id == course_id).cloned())
    }

    async fn find_user_course(
        &self,
        course_id: &str,
        user_id: &str,
    ) -> Result<Option<Course>, AppError> {
        self.touch();
        let courses = self.courses.lock().unwrap();
        Ok(courses
            .iter()
            .find(|c| c.id == course_id && c.user_id == user_id)
            .cloned())
    }

    async fn insert_quiz_result(&self, result: &QuizResult) -> Result<(), AppError> {
        self.touch();
        self.results.lock().unwrap().push(result.clone());
        Ok(())
    }

    async fn list_quiz_results(
        &self,
        course_id: &str,
        user_id: &str,
    ) -> Result<Vec<QuizResult>, AppError> {
        self.touch();
        let results = self.results.lock().unwrap();
        Ok(results
            .iter()
            .filter(|r| r.course_id == course_id && r.user_id == user_id)
            .cloned()
            .collect())
    }
}

/// Text generator that always answers with the same text.
pub struct StubGenerator {
    response: String,
    pub calls: AtomicUsize,
}

impl StubGenerator {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    async fn generate_json(&self, _prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }
}

/// Course JSON as a model would return it: three questions with answers A, B, C.
pub const GENERATED_COURSE: &str = r#"```json
{
    "title": "Intro to Rust",
    "description": "Ownership, borrowing and lifetimes",
    "lessons": [
        {
            "title": "Ownership",
            "content": "Every value has a single owner.",
            "code_examples": "let s = String::from(\"hi\");",
            "video_queries": ["rust ownership"]
        },
        {
            "title": "Borrowing",
            "content": "References borrow without taking ownership."
        }
    ],
    "quizzes": [
        {"question": "Q1", "options": ["A", "X"], "correct_answer": "A", "explanation": "A"},
        {"question": "Q2", "options": ["B", "X"], "correct_answer": "B"},
        {"question": "Q3", "options": ["C", "X"], "correct_answer": "C"}
    ]
}
```"#;

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub store: Arc<MemoryStore>,
    pub generator: Arc<StubGenerator>,
}

fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        database_name: None,
        jwt_secret: JWT_SECRET.to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        llm: LlmConfig {
            provider: LlmProvider::Gemini,
            api_key: "unused".to_string(),
            model: "stub".to_string(),
            base_url: "http://127.0.0.1:9".to_string(),
        },
        generation: GenerationSettings::default(),
        cors_origins: vec!["*".to_string()],
        port: 0,
        rust_log: "error".to_string(),
    }
}

/// Spawns the app on a random port, backed by memory and a canned generator.
pub async fn spawn_app(generator_response: &str) -> TestApp {
    let store = Arc::new(MemoryStore::default());
    let generator = Arc::new(StubGenerator::new(generator_response));

    let state = AppState {
        store: store.clone(),
        generator: CourseGenerator::new(generator.clone(), GenerationSettings::default()),
        config: test_config(),
    };

    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    // Spawn the server in the background
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address,
        client: reqwest::Client::new(),
        store,
        generator,
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.address, path)
    }

    /// Registers a user and returns `(token, user_id)`.
    pub async fn register(&self, username: &str) -> (String, String) {
        let body: serde_json::Value = self
            .client
            .post(self.url("/auth/register"))
            .json(&serde_json::json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "password": "password123"
            }))
            .send()
            .await
            .expect("Register failed")
            .json()
            .await
            .expect("Failed to parse register json");

        let token = body["token"].as_str().expect("Token not found").to_string();
        let id = body["user"]["id"].as_str().expect("User id not found").to_string();
        (token, id)
    }

    /// Generates a course and saves it, returning the saved course JSON.
    pub async fn generate_and_save(&self, token: &str, topic: &str) -> serde_json::Value {
        let course: serde_json::Value = self
            .client
            .post(self.url("/courses/generate"))
            .bearer_auth(token)
            .json(&serde_json::json!({ "topic": topic }))
            .send()
            .await
            .expect("Generate failed")
            .json()
            .await
            .expect("Failed to parse course json");

        let saved = self
            .client
            .post(self.url("/courses/save"))
            .bearer_auth(token)
            .json(&course)
            .send()
            .await
            .expect("Save failed");
        assert_eq!(saved.status().as_u16(), 200);

        course
    }
}

pub fn unique_name(prefix: &str) -> String {
    format!("{}_{}", prefix, &uuid::Uuid::new_v4().to_string()[..8])
}
