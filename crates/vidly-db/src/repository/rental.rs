//! # Rental Repository
//!
//! Database operations for rentals.
//!
//! ## Snapshot Storage
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  rentals row                                                            │
//! │  ┌──────────────────────────────┬──────────────────────────────────┐   │
//! │  │ customer_id                  │                                  │   │
//! │  │ customer_user_id             │  copied from customers at        │   │
//! │  │ customer_name                │  checkout                        │   │
//! │  │ customer_is_gold             │                                  │   │
//! │  ├──────────────────────────────┼──────────────────────────────────┤   │
//! │  │ movie_id                     │  copied from the movie row the   │   │
//! │  │ movie_title                  │  stock decrement returned        │   │
//! │  │ movie_daily_rental_rate_cents│                                  │   │
//! │  ├──────────────────────────────┼──────────────────────────────────┤   │
//! │  │ date_out, rental_fee_cents   │                                  │   │
//! │  └──────────────────────────────┴──────────────────────────────────┘   │
//! │  No foreign keys: the movie may be deleted while the copy is out.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only reads are exposed on [`RentalRepository`]. Creating and deleting
//! rentals always pairs with a stock change, so those go through
//! [`UnitOfWork`](crate::UnitOfWork).

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteExecutor, SqlitePool};

use crate::error::DbResult;
use vidly_core::{Rental, RentalCustomer, RentalMovie};

// =============================================================================
// Row Mapping
// =============================================================================

#[derive(Debug, FromRow)]
pub(crate) struct RentalRow {
    id: String,
    customer_id: String,
    customer_user_id: String,
    customer_name: String,
    customer_is_gold: bool,
    movie_id: String,
    movie_title: String,
    movie_daily_rental_rate_cents: i64,
    date_out: DateTime<Utc>,
    rental_fee_cents: Option<i64>,
}

impl From<RentalRow> for Rental {
    fn from(row: RentalRow) -> Self {
        Rental {
            id: row.id,
            customer: RentalCustomer {
                id: row.customer_id,
                user_id: row.customer_user_id,
                name: row.customer_name,
                is_gold: row.customer_is_gold,
            },
            movie: RentalMovie {
                id: row.movie_id,
                title: row.movie_title,
                daily_rental_rate_cents: row.movie_daily_rental_rate_cents,
            },
            date_out: row.date_out,
            rental_fee_cents: row.rental_fee_cents,
        }
    }
}

// =============================================================================
// Executor-Generic Queries
// =============================================================================

pub(crate) async fn fetch_by_id<'e, E>(executor: E, id: &str) -> DbResult<Option<Rental>>
where
    E: SqliteExecutor<'e>,
{
    let row = sqlx::query_as::<_, RentalRow>(
        r#"
        SELECT id, customer_id, customer_user_id, customer_name, customer_is_gold,
               movie_id, movie_title, movie_daily_rental_rate_cents,
               date_out, rental_fee_cents
        FROM rentals
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(row.map(Rental::from))
}

/// Oldest active rental of `movie_id` held by `user_id`.
pub(crate) async fn fetch_by_user_and_movie<'e, E>(
    executor: E,
    user_id: &str,
    movie_id: &str,
) -> DbResult<Option<Rental>>
where
    E: SqliteExecutor<'e>,
{
    let row = sqlx::query_as::<_, RentalRow>(
        r#"
        SELECT id, customer_id, customer_user_id, customer_name, customer_is_gold,
               movie_id, movie_title, movie_daily_rental_rate_cents,
               date_out, rental_fee_cents
        FROM rentals
        WHERE customer_user_id = ?1 AND movie_id = ?2
        ORDER BY date_out
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .bind(movie_id)
    .fetch_optional(executor)
    .await?;

    Ok(row.map(Rental::from))
}

pub(crate) async fn insert<'e, E>(executor: E, rental: &Rental) -> DbResult<()>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO rentals (
            id, customer_id, customer_user_id, customer_name, customer_is_gold,
            movie_id, movie_title, movie_daily_rental_rate_cents,
            date_out, rental_fee_cents
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&rental.id)
    .bind(&rental.customer.id)
    .bind(&rental.customer.user_id)
    .bind(&rental.customer.name)
    .bind(rental.customer.is_gold)
    .bind(&rental.movie.id)
    .bind(&rental.movie.title)
    .bind(rental.movie.daily_rental_rate_cents)
    .bind(rental.date_out)
    .bind(rental.rental_fee_cents)
    .execute(executor)
    .await?;

    Ok(())
}

/// Returns true if a row was deleted.
pub(crate) async fn delete<'e, E>(executor: E, id: &str) -> DbResult<bool>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM rentals WHERE id = ?1")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() == 1)
}

// =============================================================================
// Repository
// =============================================================================

/// Read access to active rentals.
#[derive(Debug, Clone)]
pub struct RentalRepository {
    pool: SqlitePool,
}

impl RentalRepository {
    /// Creates a new RentalRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RentalRepository { pool }
    }

    /// Lists every active rental, oldest first.
    pub async fn list(&self) -> DbResult<Vec<Rental>> {
        let rows = sqlx::query_as::<_, RentalRow>(
            r#"
            SELECT id, customer_id, customer_user_id, customer_name, customer_is_gold,
                   movie_id, movie_title, movie_daily_rental_rate_cents,
                   date_out, rental_fee_cents
            FROM rentals
            ORDER BY date_out
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Rental::from).collect())
    }

    /// Lists the active rentals held by a user, oldest first.
    pub async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<Rental>> {
        let rows = sqlx::query_as::<_, RentalRow>(
            r#"
            SELECT id, customer_id, customer_user_id, customer_name, customer_is_gold,
                   movie_id, movie_title, movie_daily_rental_rate_cents,
                   date_out, rental_fee_cents
            FROM rentals
            WHERE customer_user_id = ?1
            ORDER BY date_out
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Rental::from).collect())
    }

    /// Gets a rental by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Rental>> {
        fetch_by_id(&self.pool, id).await
    }

    /// Gets the oldest rental of a movie held by a user.
    pub async fn get_by_user_and_movie(&self, user_id: &str, movie_id: &str) -> DbResult<Option<Rental>> {
        fetch_by_user_and_movie(&self.pool, user_id, movie_id).await
    }

    /// Counts active rentals.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rentals")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Counts active rentals of one movie.
    pub async fn count_for_movie(&self, movie_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rentals WHERE movie_id = ?1")
            .bind(movie_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
