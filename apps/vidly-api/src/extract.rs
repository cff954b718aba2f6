//! Custom Axum extractors.
//!
//! - `AuthUser`: claims of a valid `x-auth-token` (401 otherwise)
//! - `AdminUser`: same, and the token must carry `isAdmin` (403 otherwise)
//! - `ValidId` / `ValidIds`: UUID path segments (404 `Invalid ID.` otherwise)
//! - `Payload`: JSON body whose rejections become 400 with the JSON error
//!   body instead of axum's plain-text 422
//!
//! # Examples
//!
//! ```ignore
//! async fn handler(
//!     State(state): State<AppState>,
//!     AdminUser(claims): AdminUser,
//!     ValidId(id): ValidId,
//! ) -> Result<Json<Genre>, ApiError> {
//!     tracing::info!(admin = %claims.sub, genre_id = %id, "Deleting genre");
//!     ...
//! }
//! ```

use axum::{
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

use crate::auth::{Claims, AUTH_HEADER};
use crate::error::ApiError;
use crate::AppState;
use vidly_core::validation::validate_id;

/// Caller authenticated by `x-auth-token`.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTH_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::unauthorized("Access denied. No token provided."))?;

        Ok(AuthUser(state.jwt.validate_token(token)?))
    }
}

/// Authenticated caller with the admin flag set.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Claims);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthUser(claims) = AuthUser::from_request_parts(parts, state).await?;

        if !claims.is_admin {
            tracing::debug!(user_id = %claims.sub, "Admin route refused");
            return Err(ApiError::forbidden("Access denied."));
        }

        Ok(AdminUser(claims))
    }
}

/// A single `/{id}` path segment that parses as a UUID.
#[derive(Debug, Clone)]
pub struct ValidId(pub String);

impl<S> FromRequestParts<S> for ValidId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::invalid_id())?;

        validate_id("id", &id).map_err(|_| ApiError::invalid_id())?;
        Ok(ValidId(id))
    }
}

/// Two UUID path segments, e.g. `/{id}/{movie_id}`.
#[derive(Debug, Clone)]
pub struct ValidIds(pub String, pub String);

impl<S> FromRequestParts<S> for ValidIds
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path((first, second)) = Path::<(String, String)>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::invalid_id())?;

        for id in [&first, &second] {
            validate_id("id", id).map_err(|_| ApiError::invalid_id())?;
        }
        Ok(ValidIds(first, second))
    }
}

/// JSON request body.
#[derive(Debug, Clone)]
pub struct Payload<T>(pub T);

impl<S, T> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
        Ok(Payload(value))
    }
}
