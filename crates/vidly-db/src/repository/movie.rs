//! # Movie Repository
//!
//! Database operations for movies.
//!
//! ## Key Operations
//! - Catalog CRUD
//! - Stock adjustment (shared with [`UnitOfWork`](crate::UnitOfWork))
//!
//! ## Stock Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                                │
//! │                                                                         │
//! │  ❌ WRONG: read, check, write                                          │
//! │     SELECT number_in_stock ...        (both requests see 1)            │
//! │     UPDATE movies SET number_in_stock = 0                              │
//! │                                                                         │
//! │  ✅ CORRECT: guarded delta in one statement                            │
//! │     UPDATE movies                                                      │
//! │        SET number_in_stock = number_in_stock + ?2                      │
//! │      WHERE id = ?1 AND number_in_stock + ?2 >= 0                       │
//! │     RETURNING ...                                                      │
//! │                                                                         │
//! │  Two requests for the last copy: the first matches the row, the        │
//! │  second matches nothing and learns the movie is out of stock.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{FromRow, SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use vidly_core::{GenreRef, Movie};

// =============================================================================
// Row Mapping
// =============================================================================

/// A `movies` row. The genre copy is stored flat.
#[derive(Debug, FromRow)]
pub(crate) struct MovieRow {
    id: String,
    title: String,
    genre_id: String,
    genre_name: String,
    number_in_stock: i64,
    daily_rental_rate_cents: i64,
}

impl From<MovieRow> for Movie {
    fn from(row: MovieRow) -> Self {
        Movie {
            id: row.id,
            title: row.title,
            number_in_stock: row.number_in_stock,
            daily_rental_rate_cents: row.daily_rental_rate_cents,
            genre: GenreRef {
                id: row.genre_id,
                name: row.genre_name,
            },
        }
    }
}

// =============================================================================
// Executor-Generic Queries
// =============================================================================
// Used by both the pool-backed repository and UnitOfWork.

pub(crate) async fn fetch_by_id<'e, E>(executor: E, id: &str) -> DbResult<Option<Movie>>
where
    E: SqliteExecutor<'e>,
{
    let row = sqlx::query_as::<_, MovieRow>(
        r#"
        SELECT id, title, genre_id, genre_name, number_in_stock, daily_rental_rate_cents
        FROM movies
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(row.map(Movie::from))
}

/// Adds `delta` to the movie's stock.
///
/// The update only matches when the result stays non-negative, so a
/// decrement of a movie with no copies left returns `Ok(None)` exactly like
/// a missing movie. Increments are unbounded.
pub(crate) async fn adjust_stock<'e, E>(executor: E, id: &str, delta: i64) -> DbResult<Option<Movie>>
where
    E: SqliteExecutor<'e>,
{
    debug!(movie_id = %id, delta = %delta, "Adjusting stock");

    let row = sqlx::query_as::<_, MovieRow>(
        r#"
        UPDATE movies
        SET number_in_stock = number_in_stock + ?2
        WHERE id = ?1 AND number_in_stock + ?2 >= 0
        RETURNING id, title, genre_id, genre_name, number_in_stock, daily_rental_rate_cents
        "#,
    )
    .bind(id)
    .bind(delta)
    .fetch_optional(executor)
    .await?;

    Ok(row.map(Movie::from))
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for movie database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.movies();
/// let all = repo.list().await?;
/// let movie = repo.get_by_id("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct MovieRepository {
    pool: SqlitePool,
}

impl MovieRepository {
    /// Creates a new MovieRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MovieRepository { pool }
    }

    /// Lists all movies sorted by title.
    pub async fn list(&self) -> DbResult<Vec<Movie>> {
        let rows = sqlx::query_as::<_, MovieRow>(
            r#"
            SELECT id, title, genre_id, genre_name, number_in_stock, daily_rental_rate_cents
            FROM movies
            ORDER BY title
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Movie::from).collect())
    }

    /// Gets a movie by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Movie))` - Movie found
    /// * `Ok(None)` - Movie not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Movie>> {
        fetch_by_id(&self.pool, id).await
    }

    /// Inserts a new movie (id generated beforehand).
    pub async fn insert(&self, movie: &Movie) -> DbResult<Movie> {
        debug!(title = %movie.title, "Inserting movie");

        sqlx::query(
            r#"
            INSERT INTO movies (
                id, title, genre_id, genre_name, number_in_stock, daily_rental_rate_cents
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&movie.id)
        .bind(&movie.title)
        .bind(&movie.genre.id)
        .bind(&movie.genre.name)
        .bind(movie.number_in_stock)
        .bind(movie.daily_rental_rate_cents)
        .execute(&self.pool)
        .await?;

        Ok(movie.clone())
    }

    /// Replaces every field of an existing movie.
    ///
    /// ## Returns
    /// * `Ok(())` - Update successful
    /// * `Err(DbError::NotFound)` - Movie doesn't exist
    pub async fn update(&self, movie: &Movie) -> DbResult<()> {
        debug!(id = %movie.id, "Updating movie");

        let result = sqlx::query(
            r#"
            UPDATE movies SET
                title = ?2,
                genre_id = ?3,
                genre_name = ?4,
                number_in_stock = ?5,
                daily_rental_rate_cents = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&movie.id)
        .bind(&movie.title)
        .bind(&movie.genre.id)
        .bind(&movie.genre.name)
        .bind(movie.number_in_stock)
        .bind(movie.daily_rental_rate_cents)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Movie", &movie.id));
        }

        Ok(())
    }

    /// Deletes a movie, returning it as it was.
    ///
    /// Active rentals of the movie are left alone; returning them later
    /// fails with an invalid movie reference.
    pub async fn delete(&self, id: &str) -> DbResult<Option<Movie>> {
        debug!(id = %id, "Deleting movie");

        let row = sqlx::query_as::<_, MovieRow>(
            r#"
            DELETE FROM movies
            WHERE id = ?1
            RETURNING id, title, genre_id, genre_name, number_in_stock, daily_rental_rate_cents
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Movie::from))
    }

    /// Adjusts stock outside any unit of work (restocking).
    ///
    /// See [`adjust_stock`] for the guard.
    pub async fn adjust_stock(&self, id: &str, delta: i64) -> DbResult<Option<Movie>> {
        adjust_stock(&self.pool, id, delta).await
    }

    /// Counts movies.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM movies")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
