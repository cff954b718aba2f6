//! `/api/genres`

use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::info;

use crate::error::ApiError;
use crate::extract::{AdminUser, AuthUser, Payload, ValidId};
use crate::AppState;
use vidly_core::validation::validate_genre_name;
use vidly_core::{new_id, Genre};

#[derive(Debug, Deserialize)]
pub struct GenrePayload {
    #[serde(default)]
    pub name: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(fetch).put(update).delete(remove))
}

async fn list(State(state): State<AppState>) -> Result<Json<Vec<Genre>>, ApiError> {
    Ok(Json(state.db.genres().list().await?))
}

async fn fetch(State(state): State<AppState>, ValidId(id): ValidId) -> Result<Json<Genre>, ApiError> {
    let genre = state
        .db
        .genres()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::missing("genre"))?;
    Ok(Json(genre))
}

async fn create(
    State(state): State<AppState>,
    _user: AuthUser,
    Payload(body): Payload<GenrePayload>,
) -> Result<Json<Genre>, ApiError> {
    let genre = Genre {
        id: new_id(),
        name: validate_genre_name(&body.name)?,
    };
    let genre = state.db.genres().insert(&genre).await?;
    info!(genre_id = %genre.id, "Genre created");
    Ok(Json(genre))
}

async fn update(
    State(state): State<AppState>,
    _user: AuthUser,
    ValidId(id): ValidId,
    Payload(body): Payload<GenrePayload>,
) -> Result<Json<Genre>, ApiError> {
    let genre = Genre {
        id,
        name: validate_genre_name(&body.name)?,
    };
    state.db.genres().update(&genre).await?;
    Ok(Json(genre))
}

async fn remove(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ValidId(id): ValidId,
) -> Result<Json<Genre>, ApiError> {
    let genre = state
        .db
        .genres()
        .delete(&id)
        .await?
        .ok_or_else(|| ApiError::missing("genre"))?;
    info!(genre_id = %genre.id, admin = %admin.sub, "Genre deleted");
    Ok(Json(genre))
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use vidly_core::new_id;

    #[tokio::test]
    async fn test_list_sorted_by_name() {
        let state = state().await;
        let (_, token) = add_user(&state, "client1", false).await;
        for name in ["Thriller", "Action"] {
            let (status, _) = send(&state, Method::POST, "/api/genres", Some(&token), Some(json!({ "name": name }))).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, body) = send(&state, Method::GET, "/api/genres", None, None).await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<_> = body.as_array().unwrap().iter().map(|g| g["name"].clone()).collect();
        assert_eq!(names, vec![json!("Action"), json!("Thriller")]);
    }

    #[tokio::test]
    async fn test_create_requires_token_and_valid_name() {
        let state = state().await;
        let (_, token) = add_user(&state, "client1", false).await;

        let (status, _) = send(&state, Method::POST, "/api/genres", None, Some(json!({ "name": "Action" }))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(&state, Method::POST, "/api/genres", Some(&token), Some(json!({ "name": "ab" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_get_update_delete() {
        let state = state().await;
        let (_, token) = add_user(&state, "client1", false).await;
        let (_, admin) = add_user(&state, "admin", true).await;

        let (_, created) = send(&state, Method::POST, "/api/genres", Some(&token), Some(json!({ "name": "Action" }))).await;
        let uri = format!("/api/genres/{}", created["id"].as_str().unwrap());

        let (status, body) = send(&state, Method::PUT, &uri, Some(&token), Some(json!({ "name": "Drama" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Drama");

        let (status, _) = send(&state, Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(&state, Method::DELETE, &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&state, Method::GET, &uri, None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "The genre with the given ID was not found.");
    }

    #[tokio::test]
    async fn test_unknown_and_invalid_ids() {
        let state = state().await;
        let (_, token) = add_user(&state, "client1", false).await;

        let (status, body) = send(&state, Method::GET, "/api/genres/1", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Invalid ID.");

        let uri = format!("/api/genres/{}", new_id());
        let (status, _) = send(&state, Method::PUT, &uri, Some(&token), Some(json!({ "name": "Drama" }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
