//! `/api/auth`: exchange email and password for a token.

use axum::{extract::State, routing::post, Router};
use serde::Deserialize;
use tracing::info;

use crate::error::ApiError;
use crate::extract::Payload;
use crate::AppState;
use vidly_core::validation::{validate_email, validate_password};

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(login))
}

/// Responds with the bare token as the body.
async fn login(State(state): State<AppState>, Payload(body): Payload<LoginPayload>) -> Result<String, ApiError> {
    let email = validate_email(&body.email)?;
    validate_password(&body.password)?;

    let user = state
        .db
        .accounts()
        .authenticate(&email, &body.password)
        .await?
        .ok_or_else(|| ApiError::bad_request("Invalid email or password."))?;

    info!(user_id = %user.id, "User signed in");
    state.jwt.generate_token(&user)
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use vidly_db::NewAccount;

    #[tokio::test]
    async fn test_login() {
        let state = state().await;
        let user = state
            .db
            .accounts()
            .register(NewAccount {
                name: "client1".to_string(),
                email: "client1@gmail.com".to_string(),
                password: "password".to_string(),
                is_admin: true,
            })
            .await
            .unwrap();

        let (status, body) = send(&state, Method::POST, "/api/auth", None, Some(json!({ "email": "client1@gmail.com", "password": "password" }))).await;
        assert_eq!(status, StatusCode::OK);
        let claims = state.jwt.validate_token(body.as_str().unwrap()).unwrap();
        assert_eq!(claims.sub, user.id);
        assert!(claims.is_admin);

        let (status, body) = send(&state, Method::POST, "/api/auth", None, Some(json!({ "email": "client1@gmail.com", "password": "wrong1" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid email or password.");

        let (status, body) = send(&state, Method::POST, "/api/auth", None, Some(json!({ "email": "nobody@gmail.com", "password": "password" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid email or password.");
    }

    #[tokio::test]
    async fn test_login_validation() {
        let state = state().await;
        let (status, body) = send(&state, Method::POST, "/api/auth", None, Some(json!({ "email": "a@b", "password": "pw" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }
}
