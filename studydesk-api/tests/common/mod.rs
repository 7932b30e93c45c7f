/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup and cleanup
/// - Test user creation and JWT token generation
/// - A mock calendar wired into the app state, so calendar sync paths can
///   be exercised without a network
///
/// Integration tests need a PostgreSQL instance; they skip themselves when
/// `DATABASE_URL` is not set.

use sqlx::PgPool;
use std::sync::Arc;
use studydesk_api::app::{build_router, AppState};
use studydesk_api::config::{ApiConfig, CalendarConfig, Config, DatabaseConfig, JwtConfig};
use studydesk_shared::auth::jwt::{create_token, Claims, TokenType};
use studydesk_shared::calendar::MockCalendar;
use studydesk_shared::models::user::{CreateUser, User};
use uuid::Uuid;

/// JWT secret used by all integration tests
pub const TEST_JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub calendar: Arc<MockCalendar>,
    pub user: User,
    pub jwt_token: String,
}

impl TestContext {
    /// Creates a new test context, or None when no database is configured
    pub async fn try_new() -> anyhow::Result<Option<Self>> {
        let Ok(database_url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set, skipping integration test");
            return Ok(None);
        };

        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
            },
            database: DatabaseConfig {
                url: database_url.clone(),
                max_connections: 5,
            },
            jwt: JwtConfig {
                secret: TEST_JWT_SECRET.to_string(),
            },
            calendar: CalendarConfig {
                base_url: None,
                max_upcoming: 20,
            },
        };

        let db = PgPool::connect(&database_url).await?;

        // Run migrations (path relative to Cargo.toml, not this file)
        sqlx::migrate!("../studydesk-shared/migrations").run(&db).await?;

        // Create test user
        let user = User::create(
            &db,
            CreateUser {
                username: format!("testuser-{}", Uuid::new_v4()),
                email: format!("test-{}@example.com", Uuid::new_v4()),
                password_hash: "test_hash".to_string(), // Not used in tests
            },
        )
        .await?;

        // Generate JWT token
        let claims = Claims::new(user.id, TokenType::Access);
        let jwt_token = create_token(&claims, TEST_JWT_SECRET)?;

        // Build app with a mock calendar
        let calendar = Arc::new(MockCalendar::new());
        let state = AppState::new(db.clone(), config, calendar.clone());
        let app = build_router(state);

        Ok(Some(TestContext {
            db,
            app,
            calendar,
            user,
            jwt_token,
        }))
    }

    /// Returns authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.jwt_token)
    }

    /// Connects the test user's calendar with a well-formed token blob
    pub async fn connect_calendar(&self) -> anyhow::Result<()> {
        User::connect_calendar(&self.db, self.user.id, r#"{"token":"test-token"}"#, None).await?;
        Ok(())
    }

    /// Cleans up test data (cascades to tasks, categories, etc.)
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(self.user.id)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}

/// Sends a JSON request to the app and returns (status, parsed body)
pub async fn send_json(
    app: &mut axum::Router,
    method: &str,
    uri: &str,
    auth: Option<&str>,
    body: Option<serde_json::Value>,
) -> anyhow::Result<(axum::http::StatusCode, serde_json::Value)> {
    use axum::body::Body;
    use axum::http::Request;
    use tower::Service as _;

    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }

    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))?,
        None => builder.body(Body::empty())?,
    };

    let response = app.call(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };

    Ok((status, json))
}
