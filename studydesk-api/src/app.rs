/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.

use crate::config::Config;
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use studydesk_shared::auth::{jwt, middleware::AuthContext};
use studydesk_shared::calendar::CalendarProvider;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Calendar backend (Google in production, mock in tests)
    pub calendar: Arc<dyn CalendarProvider>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config, calendar: Arc<dyn CalendarProvider>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            calendar,
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// The router is organized as follows:
/// ```text
/// /
/// ├── /health                     # Health check (public)
/// ├── /v1/                        # API v1 (versioned)
/// │   ├── /auth/                  # Authentication (public)
/// │   │   ├── POST /register
/// │   │   ├── POST /login
/// │   │   └── POST /refresh
/// │   ├── /tasks/                 # Task manager (authenticated)
/// │   │   ├── GET    /            # List (optionally by status)
/// │   │   ├── POST   /            # Create
/// │   │   ├── GET    /board       # Kanban board grouping
/// │   │   ├── GET    /:id
/// │   │   ├── PUT    /:id
/// │   │   ├── DELETE /:id
/// │   │   ├── POST   /:id/status
/// │   │   └── POST   /:id/complete
/// │   ├── /categories/            # Categories (authenticated)
/// │   ├── /flashcards/            # Flashcards (authenticated)
/// │   ├── /summaries/             # Summaries (authenticated)
/// │   └── /calendar/              # Calendar connection + schedule
/// │       ├── PUT    /connection
/// │       ├── DELETE /connection
/// │       └── GET    /schedule
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Authentication (per-route basis)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public, no auth required)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    // Task routes (require JWT authentication)
    let task_routes = Router::new()
        .route("/", get(routes::tasks::list_tasks).post(routes::tasks::create_task))
        .route("/board", get(routes::tasks::board))
        .route(
            "/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route("/:id/status", post(routes::tasks::set_status))
        .route("/:id/complete", post(routes::tasks::toggle_complete));

    let category_routes = Router::new()
        .route(
            "/",
            get(routes::categories::list_categories).post(routes::categories::create_category),
        )
        .route(
            "/:id",
            get(routes::categories::get_category).delete(routes::categories::delete_category),
        );

    let flashcard_routes = Router::new()
        .route(
            "/",
            get(routes::flashcards::list_flashcards).post(routes::flashcards::create_flashcard),
        )
        .route(
            "/:id",
            get(routes::flashcards::get_flashcard)
                .put(routes::flashcards::update_flashcard)
                .delete(routes::flashcards::delete_flashcard),
        );

    let summary_routes = Router::new()
        .route(
            "/",
            get(routes::summaries::list_summaries).post(routes::summaries::create_summary),
        )
        .route(
            "/:id",
            get(routes::summaries::get_summary).delete(routes::summaries::delete_summary),
        );

    let calendar_routes = Router::new()
        .route("/connection", put(routes::calendar::connect))
        .route("/connection", delete(routes::calendar::disconnect))
        .route("/schedule", get(routes::calendar::schedule));

    // Everything but health and auth sits behind the JWT layer
    let protected_routes = Router::new()
        .nest("/tasks", task_routes)
        .nest("/categories", category_routes)
        .nest("/flashcards", flashcard_routes)
        .nest("/summaries", summary_routes)
        .nest("/calendar", calendar_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let v1_routes = Router::new().nest("/auth", auth_routes).merge(protected_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        // Production mode: configure allowed origins
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    // Combine all routes with middleware stack
    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Extracts and validates JWT token from Authorization header,
/// then injects AuthContext into request extensions.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    // Extract Authorization header
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            crate::error::ApiError::Unauthorized("Missing authorization header".to_string())
        })?;

    // Parse Bearer token
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| crate::error::ApiError::BadRequest("Expected Bearer token".to_string()))?;

    // Validate token
    let claims = jwt::validate_access_token(token, state.jwt_secret())?;

    // Insert into request extensions
    req.extensions_mut().insert(AuthContext::from_jwt(claims.sub));

    Ok(next.run(req).await)
}
