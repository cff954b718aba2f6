//! `/api/movies`
//!
//! `dailyRentalRate` is accepted in currency units (`2.5`) and stored as
//! cents; responses carry `dailyRentalRateCents`.

use axum::{extract::State, routing::get, Json, Router};
use serde::Deserialize;
use tracing::info;

use crate::error::ApiError;
use crate::extract::{AdminUser, AuthUser, Payload, ValidId};
use crate::AppState;
use vidly_core::validation::{validate_daily_rental_rate_cents, validate_id, validate_number_in_stock, validate_title};
use vidly_core::{new_id, GenreRef, Movie, ValidationError, MAX_DAILY_RENTAL_RATE};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoviePayload {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub genre_id: String,
    pub number_in_stock: Option<i64>,
    pub daily_rental_rate: Option<f64>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(fetch).put(update).delete(remove))
}

/// Validates the payload and resolves its genre into a movie with `id`.
async fn build_movie(state: &AppState, id: String, body: MoviePayload) -> Result<Movie, ApiError> {
    let title = validate_title(&body.title)?;
    validate_id("genreId", &body.genre_id)?;

    let number_in_stock = body.number_in_stock.ok_or_else(|| ValidationError::Required {
        field: "numberInStock".to_string(),
    })?;
    validate_number_in_stock(number_in_stock)?;

    let rate = body.daily_rental_rate.ok_or_else(|| ValidationError::Required {
        field: "dailyRentalRate".to_string(),
    })?;
    if !rate.is_finite() {
        return Err(ValidationError::OutOfRange {
            field: "dailyRentalRate".to_string(),
            min: 0,
            max: MAX_DAILY_RENTAL_RATE,
        }
        .into());
    }
    let daily_rental_rate_cents = (rate * 100.0).round() as i64;
    validate_daily_rental_rate_cents(daily_rental_rate_cents)?;

    let genre = state
        .db
        .genres()
        .get_by_id(&body.genre_id)
        .await?
        .ok_or_else(|| ApiError::bad_request("Invalid genre."))?;

    Ok(Movie {
        id,
        title,
        number_in_stock,
        daily_rental_rate_cents,
        genre: GenreRef::from(&genre),
    })
}

async fn list(State(state): State<AppState>) -> Result<Json<Vec<Movie>>, ApiError> {
    Ok(Json(state.db.movies().list().await?))
}

async fn fetch(State(state): State<AppState>, ValidId(id): ValidId) -> Result<Json<Movie>, ApiError> {
    let movie = state
        .db
        .movies()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::missing("movie"))?;
    Ok(Json(movie))
}

async fn create(
    State(state): State<AppState>,
    _user: AuthUser,
    Payload(body): Payload<MoviePayload>,
) -> Result<Json<Movie>, ApiError> {
    let movie = build_movie(&state, new_id(), body).await?;
    let movie = state.db.movies().insert(&movie).await?;
    info!(movie_id = %movie.id, stock = movie.number_in_stock, "Movie created");
    Ok(Json(movie))
}

async fn update(
    State(state): State<AppState>,
    _user: AuthUser,
    ValidId(id): ValidId,
    Payload(body): Payload<MoviePayload>,
) -> Result<Json<Movie>, ApiError> {
    let movie = build_movie(&state, id, body).await?;
    state.db.movies().update(&movie).await?;
    Ok(Json(movie))
}

async fn remove(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ValidId(id): ValidId,
) -> Result<Json<Movie>, ApiError> {
    let movie = state
        .db
        .movies()
        .delete(&id)
        .await?
        .ok_or_else(|| ApiError::missing("movie"))?;
    info!(movie_id = %movie.id, admin = %admin.sub, "Movie deleted");
    Ok(Json(movie))
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use axum::http::{Method, StatusCode};
    use serde_json::{json, Value};
    use vidly_core::new_id;

    async fn genre_id(state: &crate::AppState, token: &str) -> String {
        let (_, genre) = send(state, Method::POST, "/api/genres", Some(token), Some(json!({ "name": "Comedy" }))).await;
        genre["id"].as_str().unwrap().to_string()
    }

    fn payload(genre_id: &str, stock: i64, rate: f64) -> Value {
        json!({
            "title": "Airplane",
            "genreId": genre_id,
            "numberInStock": stock,
            "dailyRentalRate": rate,
        })
    }

    #[tokio::test]
    async fn test_create_movie() {
        let state = state().await;
        let (_, token) = add_user(&state, "client1", false).await;
        let genre_id = genre_id(&state, &token).await;

        let (status, body) = send(&state, Method::POST, "/api/movies", Some(&token), Some(payload(&genre_id, 5, 2.5))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "Airplane");
        assert_eq!(body["numberInStock"], 5);
        assert_eq!(body["dailyRentalRateCents"], 250);
        assert_eq!(body["genre"]["name"], "Comedy");
    }

    #[tokio::test]
    async fn test_unknown_genre() {
        let state = state().await;
        let (_, token) = add_user(&state, "client1", false).await;

        let (status, body) = send(&state, Method::POST, "/api/movies", Some(&token), Some(payload(&new_id(), 5, 2.0))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid genre.");
    }

    #[tokio::test]
    async fn test_range_checks() {
        let state = state().await;
        let (_, token) = add_user(&state, "client1", false).await;
        let genre_id = genre_id(&state, &token).await;

        for body in [payload(&genre_id, 256, 2.0), payload(&genre_id, -1, 2.0), payload(&genre_id, 5, 255.01)] {
            let (status, _) = send(&state, Method::POST, "/api/movies", Some(&token), Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }

        let (status, body) = send(&state, Method::POST, "/api/movies", Some(&token), Some(json!({ "title": "Airplane", "genreId": genre_id }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "numberInStock is required");

        assert_eq!(state.db.movies().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let state = state().await;
        let (_, token) = add_user(&state, "client1", false).await;
        let (_, admin) = add_user(&state, "admin", true).await;
        let movie = add_movie(&state, "Airplane", 5).await;
        let uri = format!("/api/movies/{}", movie.id);

        let (status, body) = send(&state, Method::PUT, &uri, Some(&token), Some(payload(&movie.genre.id, 7, 3.0))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["numberInStock"], 7);

        let (status, body) = send(&state, Method::GET, &uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["dailyRentalRateCents"], 300);

        let (status, _) = send(&state, Method::DELETE, &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&state, Method::GET, &uri, None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "The movie with the given ID was not found.");
    }
}
