// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{config::Config, repository::Store, services::course_generator::CourseGenerator};

/// Process-wide context, built once at startup and shared by all requests.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub generator: CourseGenerator,
    pub config: Config,
}

impl FromRef<AppState> for Arc<dyn Store> {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for CourseGenerator {
    fn from_ref(state: &AppState) -> Self {
        state.generator.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
