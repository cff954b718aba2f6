//! # Genre Repository
//!
//! Database operations for genres.
//!
//! Movies hold their own copy of the genre name, so nothing here touches the
//! `movies` table.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use vidly_core::Genre;

/// Repository for genre database operations.
#[derive(Debug, Clone)]
pub struct GenreRepository {
    pool: SqlitePool,
}

impl GenreRepository {
    /// Creates a new GenreRepository.
    pub fn new(pool: SqlitePool) -> Self {
        GenreRepository { pool }
    }

    /// Lists all genres sorted by name.
    pub async fn list(&self) -> DbResult<Vec<Genre>> {
        let genres = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(genres)
    }

    /// Gets a genre by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Genre>> {
        let genre = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(genre)
    }

    /// Inserts a new genre.
    pub async fn insert(&self, genre: &Genre) -> DbResult<Genre> {
        debug!(name = %genre.name, "Inserting genre");

        sqlx::query("INSERT INTO genres (id, name) VALUES (?1, ?2)")
            .bind(&genre.id)
            .bind(&genre.name)
            .execute(&self.pool)
            .await?;

        Ok(genre.clone())
    }

    /// Renames a genre.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Genre doesn't exist
    pub async fn update(&self, genre: &Genre) -> DbResult<()> {
        debug!(id = %genre.id, "Updating genre");

        let result = sqlx::query("UPDATE genres SET name = ?2 WHERE id = ?1")
            .bind(&genre.id)
            .bind(&genre.name)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Genre", &genre.id));
        }

        Ok(())
    }

    /// Deletes a genre, returning it as it was.
    pub async fn delete(&self, id: &str) -> DbResult<Option<Genre>> {
        debug!(id = %id, "Deleting genre");

        let genre = sqlx::query_as::<_, Genre>("DELETE FROM genres WHERE id = ?1 RETURNING id, name")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(genre)
    }
}
