//! # Vidly API
//!
//! REST server for the rental store.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           API Routes                                    │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  /api/genres   │  │  /api/movies   │  │  /api/customers            ││
//! │  │  CRUD          │  │  CRUD          │  │  CRUD by owning user       ││
//! │  │                │  │                │  │  POST /change (bulk)       ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  /api/users    │  │  /api/auth     │  │  /api/rentals              ││
//! │  │  register, me  │  │  sign in       │  │  checkout, return, list    ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      Infrastructure                               │  │
//! │  │  AppState { Database, JwtManager, RentalCoordinator }            │  │
//! │  │  extract: AuthUser / AdminUser (x-auth-token), ValidId, Payload  │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `HTTP_PORT` - HTTP server port (default: 3000)
//! - `BIND_ADDR` - Interface to bind (default: 0.0.0.0)
//! - `DATABASE_PATH` - SQLite file (default: ./vidly.db)
//! - `DB_MAX_CONNECTIONS` - Pool size (default: 5)
//! - `JWT_SECRET` - Secret for JWT signing
//! - `JWT_LIFETIME_SECS` - Token lifetime (default: 86400)
//! - `ALLOW_DUPLICATE_RENTALS` - Allow a second copy per user (default: true)

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Router};

// Re-exports
pub use auth::JwtManager;
pub use config::ApiConfig;
pub use error::ApiError;

use vidly_db::{Database, DuplicateRentalPolicy, RentalCoordinator};

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtManager>,
    pub coordinator: RentalCoordinator,
}

impl AppState {
    pub fn new(db: Database, jwt: JwtManager, policy: DuplicateRentalPolicy) -> Self {
        AppState {
            coordinator: db.coordinator(policy),
            db,
            jwt: Arc::new(jwt),
        }
    }
}

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api/genres", routes::genres::router())
        .nest("/api/movies", routes::movies::router())
        .nest("/api/customers", routes::customers::router())
        .nest("/api/users", routes::users::router())
        .nest("/api/auth", routes::auth::router())
        .nest("/api/rentals", routes::rentals::router())
        .route("/health", get(health_handler))
        .with_state(state)
}

async fn health_handler(State(state): State<AppState>) -> StatusCode {
    if state.db.health_check().await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

// =============================================================================
// Test Support
// =============================================================================

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use axum::body::Body;
    use axum::http::{header::CONTENT_TYPE, Method, Request};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;
    use vidly_core::{new_id, Customer, Genre, GenreRef, Movie, User};
    use vidly_db::DbConfig;

    use crate::auth::AUTH_HEADER;

    pub async fn state() -> AppState {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        AppState::new(
            db,
            JwtManager::new("test-secret".to_string(), 3600),
            DuplicateRentalPolicy::Allow,
        )
    }

    /// Inserts a user with a customer record and returns it with a token.
    pub async fn add_user(state: &AppState, name: &str, is_admin: bool) -> (User, String) {
        let user = User {
            id: new_id(),
            name: name.to_string(),
            email: format!("{name}@gmail.com"),
            password_hash: "hash".to_string(),
            is_admin,
        };
        state.db.users().insert(&user).await.unwrap();
        state
            .db
            .customers()
            .insert(&Customer::new_for_user(&user.id, Some(name.to_string())))
            .await
            .unwrap();

        let token = state.jwt.generate_token(&user).unwrap();
        (user, token)
    }

    pub async fn add_movie(state: &AppState, title: &str, stock: i64) -> Movie {
        let genre = state
            .db
            .genres()
            .insert(&Genre {
                id: new_id(),
                name: "Comedy".to_string(),
            })
            .await
            .unwrap();

        state
            .db
            .movies()
            .insert(&Movie {
                id: new_id(),
                title: title.to_string(),
                number_in_stock: stock,
                daily_rental_rate_cents: 200,
                genre: GenreRef::from(&genre),
            })
            .await
            .unwrap()
    }

    /// Drives one request through the router. Non-JSON bodies come back as
    /// `Value::String`.
    pub async fn send(
        state: &AppState,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTH_HEADER, token);
        }
        let request = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        (status, value)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use axum::http::{Method, StatusCode};

    #[tokio::test]
    async fn test_health() {
        let state = state().await;
        let (status, _) = send(&state, Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let state = state().await;
        let (status, _) = send(&state, Method::GET, "/api/nothing", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
