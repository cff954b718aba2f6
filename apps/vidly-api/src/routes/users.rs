//! `/api/users`

use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::auth::AUTH_HEADER;
use crate::error::ApiError;
use crate::extract::{AuthUser, Payload};
use crate::AppState;
use vidly_core::validation::{validate_email, validate_password, validate_user_name};
use vidly_core::User;
use vidly_db::NewAccount;

#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// What a freshly registered user gets back.
#[derive(Debug, Serialize)]
pub struct RegisteredUser {
    pub id: String,
    pub name: String,
    pub email: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(register))
        .route("/me", get(me))
}

async fn register(
    State(state): State<AppState>,
    Payload(body): Payload<RegisterPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let account = NewAccount {
        name: validate_user_name(&body.name)?,
        email: validate_email(&body.email)?,
        password: {
            validate_password(&body.password)?;
            body.password
        },
        is_admin: false,
    };

    let user = state.db.accounts().register(account).await?;
    let token = state.jwt.generate_token(&user)?;

    let headers = [
        (AUTH_HEADER, token),
        ("access-control-expose-headers", AUTH_HEADER.to_string()),
    ];
    let body = RegisteredUser {
        id: user.id,
        name: user.name,
        email: user.email,
    };
    Ok((headers, Json(body)))
}

async fn me(State(state): State<AppState>, AuthUser(claims): AuthUser) -> Result<Json<User>, ApiError> {
    let user = state
        .db
        .users()
        .get_by_id(&claims.sub)
        .await?
        .ok_or_else(|| ApiError::missing("user"))?;
    Ok(Json(user))
}
