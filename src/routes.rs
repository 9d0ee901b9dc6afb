// src/routes.rs

use axum::{
    Router,
    http::Method,
    middleware,
    routing::{get, patch, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::AppError,
    handlers::{admin, auth, calculator, quiz},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Public quiz-step and calculator routes.
/// * Admin routes, all behind `auth_middleware` except login.
/// * Global middleware (Trace, CORS) and a JSON 404 fallback.
pub fn create_router(state: AppState) -> Router {
    // Calculator pages are embedded on partner sites, so any origin may call in.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let calculator_routes = Router::new()
        .route("/emi", get(calculator::emi))
        .route("/sip", get(calculator::sip))
        .route("/swp", get(calculator::swp));

    let admin_routes = Router::new()
        .route("/quizzes", get(admin::list_quizzes))
        .route("/quiz", get(admin::list_quizzes).post(admin::create_quiz))
        .route(
            "/quiz/{id}",
            get(admin::get_quiz)
                .put(admin::update_quiz)
                .delete(admin::delete_quiz),
        )
        .route("/quiz/{id}/toggle", patch(admin::toggle_quiz))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        // Login stays outside the auth layer
        .route("/login", post(auth::login));

    Router::new()
        .route("/api/quiz", get(quiz::list_active))
        .route("/api/quiz/{step_id}", get(quiz::get_step))
        .nest("/api/calc", calculator_routes)
        .nest("/api/admin", admin_routes)
        .fallback(|| async { AppError::NotFound("Route not found".to_string()) })
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
