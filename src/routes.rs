// src/routes.rs

use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::{auth, course, health, quiz},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Builds the CORS policy from the configured origins.
///
/// `*` allows any origin without credentials. An explicit list allows those
/// origins with credentials and mirrors the requested methods and headers.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|origin| origin == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, courses, quiz).
/// * Course and quiz routes require a bearer token.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);
    let require_auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let course_routes = Router::new()
        .route("/", get(course::list_courses))
        .route("/generate", post(course::generate_course))
        .route("/save", post(course::save_course))
        .route("/{id}", get(course::get_course))
        .route_layer(require_auth.clone());

    let quiz_routes = Router::new()
        .route("/submit", post(quiz::submit_quiz))
        .route("/results/{course_id}", get(quiz::get_results))
        .route_layer(require_auth);

    Router::new()
        .route("/api", get(health::root))
        .route("/api/", get(health::root))
        .nest("/api/auth", auth_routes)
        .nest("/api/courses", course_routes)
        .nest("/api/quiz", quiz_routes)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
