//! `/api/rentals`
//!
//! Checkout and both return paths go through the [`RentalCoordinator`];
//! the response is written only after its unit of work has committed.
//!
//! [`RentalCoordinator`]: vidly_db::RentalCoordinator

use axum::{
    extract::State,
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;

use crate::error::ApiError;
use crate::extract::{AdminUser, AuthUser, Payload, ValidId, ValidIds};
use crate::AppState;
use vidly_core::validation::validate_id;
use vidly_core::Rental;
use vidly_db::RentalError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalPayload {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub movie_id: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(checkout))
        .route("/{id}", get(list_for_user).delete(return_by_rental_id))
        .route("/{id}/{movie_id}", delete(return_by_user_and_movie))
}

async fn list(State(state): State<AppState>, _admin: AdminUser) -> Result<Json<Vec<Rental>>, ApiError> {
    Ok(Json(state.db.rentals().list().await?))
}

async fn list_for_user(
    State(state): State<AppState>,
    _user: AuthUser,
    ValidId(user_id): ValidId,
) -> Result<Json<Vec<Rental>>, ApiError> {
    let rentals = state.db.rentals().list_for_user(&user_id).await?;
    if rentals.is_empty() {
        return Err(ApiError::not_found("This user does not have any rentals."));
    }
    Ok(Json(rentals))
}

async fn checkout(
    State(state): State<AppState>,
    _user: AuthUser,
    Payload(body): Payload<RentalPayload>,
) -> Result<Json<Rental>, ApiError> {
    validate_id("userId", &body.user_id)?;
    validate_id("movieId", &body.movie_id)?;

    let rental = state.coordinator.checkout(&body.user_id, &body.movie_id).await?;
    Ok(Json(rental))
}

async fn return_by_user_and_movie(
    State(state): State<AppState>,
    _user: AuthUser,
    ValidIds(user_id, movie_id): ValidIds,
) -> Result<Json<Rental>, ApiError> {
    let rental = state
        .coordinator
        .return_by_user_and_movie(&user_id, &movie_id)
        .await
        .map_err(|err| match err {
            RentalError::NotFound(_) => ApiError::bad_request("You don't have this movie"),
            other => other.into(),
        })?;
    Ok(Json(rental))
}

async fn return_by_rental_id(
    State(state): State<AppState>,
    _user: AuthUser,
    ValidId(rental_id): ValidId,
) -> Result<Json<Rental>, ApiError> {
    let rental = state
        .coordinator
        .return_by_rental_id(&rental_id)
        .await
        .map_err(|err| match err {
            RentalError::NotFound(_) => ApiError::bad_request("can not find this rental id"),
            RentalError::InvalidReference { entity: "movie", .. } => {
                ApiError::bad_request("can not find this movie id.")
            }
            other => other.into(),
        })?;
    Ok(Json(rental))
}
