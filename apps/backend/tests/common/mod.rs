//! Common test utilities and fixtures for integration tests.
//!
//! Tests built on [`TestContext::new`] need a PostgreSQL database
//! (set DATABASE_URL). [`TestContext::offline`] uses a lazily connected
//! pool so routing and auth rejections can be checked without one.

#![allow(dead_code)]

pub mod fixtures;

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use uuid::Uuid;

use studydeck_backend::db::Database;
use studydeck_backend::{build_router, AppState};

/// Test context containing database connection and router.
pub struct TestContext {
    pub db: Arc<Database>,
    app: Router,
}

impl TestContext {
    /// Create a new test context with a migrated database.
    ///
    /// # Panics
    /// Panics if DATABASE_URL is not set or database connection fails.
    pub async fn new() -> Self {
        dotenvy::dotenv().ok();

        let database_url =
            std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");

        let db = Database::connect(&database_url, 5)
            .await
            .expect("Failed to connect to test database");

        db.run_migrations()
            .await
            .expect("Failed to run migrations");

        Self::with_database(db)
    }

    /// Create a context whose pool never connects unless a handler queries it.
    pub fn offline() -> Self {
        let db = Database::connect_lazy("postgres://studydeck@127.0.0.1:1/unused")
            .expect("Failed to build lazy pool");
        Self::with_database(db)
    }

    fn with_database(db: Database) -> Self {
        let db = Arc::new(db);
        let app = build_router(AppState { db: db.clone() });
        Self { db, app }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    /// Create a test user and return its ID and token.
    pub async fn create_test_user(&self, name: Option<&str>) -> (Uuid, String) {
        let user = self
            .db
            .create_user(name)
            .await
            .expect("Failed to create test user");
        (user.id, user.token)
    }

    /// Authorization header value for a token.
    pub fn auth_header_value(token: &str) -> HeaderValue {
        HeaderValue::from_str(&format!("Bearer {}", token)).expect("token is a valid header value")
    }

    /// Clean up test data for a user.
    ///
    /// Decks owned by the user cascade to their cards and to every user's
    /// progress on them.
    pub async fn cleanup_user(&self, user_id: Uuid) {
        let _ = sqlx::query("DELETE FROM decks WHERE owner_id = $1")
            .bind(user_id)
            .execute(self.db.pool())
            .await;

        let _ = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(self.db.pool())
            .await;
    }
}
