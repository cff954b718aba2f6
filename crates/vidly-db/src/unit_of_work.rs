//! # Unit of Work
//!
//! One SQLite transaction, passed explicitly to every mutation that must
//! commit together.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   db.begin("checkout")                                                 │
//! │        │   BEGIN (holds one pool connection)                           │
//! │        ▼                                                                │
//! │   uow.adjust_movie_stock(id, -1)   ── first write takes the lock       │
//! │   uow.create_rental(&rental)                                           │
//! │        │                                                                │
//! │        ├── uow.commit()    → COMMIT, both changes visible              │
//! │        ├── uow.rollback()  → ROLLBACK, nothing visible                 │
//! │        └── drop(uow)       → ROLLBACK (e.g. early return on `?`)       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//! - Never acquire another pool connection while a unit is open. With the
//!   single-connection in-memory pool that would wait forever.
//! - Start with a write when the unit must not race: SQLite takes its write
//!   lock at the first write statement, and a deferred transaction that
//!   reads first can fail to upgrade after a concurrent commit.

use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{customer, movie, rental, user};
use vidly_core::{Customer, Movie, Rental, User};

/// An open database transaction.
///
/// Every method runs on the transaction's connection. Dropping the value
/// without calling [`commit`](Self::commit) rolls the transaction back.
pub struct UnitOfWork {
    tx: Transaction<'static, Sqlite>,
    label: &'static str,
}

impl std::fmt::Debug for UnitOfWork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnitOfWork").field("label", &self.label).finish()
    }
}

impl UnitOfWork {
    pub(crate) async fn begin(pool: &SqlitePool, label: &'static str) -> DbResult<Self> {
        let tx = pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(format!("{label}: begin: {e}")))?;

        debug!(unit = label, "Unit of work started");
        Ok(UnitOfWork { tx, label })
    }

    /// Name given when the unit was opened, used in logs.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Commits every change made through this unit.
    pub async fn commit(self) -> DbResult<()> {
        let label = self.label;
        self.tx
            .commit()
            .await
            .map_err(|e| DbError::TransactionFailed(format!("{label}: commit: {e}")))?;

        debug!(unit = label, "Unit of work committed");
        Ok(())
    }

    /// Discards every change made through this unit.
    pub async fn rollback(self) -> DbResult<()> {
        let label = self.label;
        self.tx
            .rollback()
            .await
            .map_err(|e| DbError::TransactionFailed(format!("{label}: rollback: {e}")))?;

        debug!(unit = label, "Unit of work rolled back");
        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Customer owned by `user_id`.
    pub async fn find_customer_by_user(&mut self, user_id: &str) -> DbResult<Option<Customer>> {
        customer::fetch_by_user(&mut *self.tx, user_id).await
    }

    pub async fn find_movie_by_id(&mut self, movie_id: &str) -> DbResult<Option<Movie>> {
        movie::fetch_by_id(&mut *self.tx, movie_id).await
    }

    pub async fn find_rental_by_id(&mut self, rental_id: &str) -> DbResult<Option<Rental>> {
        rental::fetch_by_id(&mut *self.tx, rental_id).await
    }

    pub async fn find_rental_by_user_and_movie(
        &mut self,
        user_id: &str,
        movie_id: &str,
    ) -> DbResult<Option<Rental>> {
        rental::fetch_by_user_and_movie(&mut *self.tx, user_id, movie_id).await
    }

    // =========================================================================
    // Rentals and Stock
    // =========================================================================

    /// Adds `delta` to a movie's stock; a decrement is refused (`Ok(None)`)
    /// when it would go below zero.
    pub async fn adjust_movie_stock(&mut self, movie_id: &str, delta: i64) -> DbResult<Option<Movie>> {
        movie::adjust_stock(&mut *self.tx, movie_id, delta).await
    }

    pub async fn create_rental(&mut self, rental: &Rental) -> DbResult<Rental> {
        rental::insert(&mut *self.tx, rental).await?;
        Ok(rental.clone())
    }

    /// Returns false when no rental with this id exists.
    pub async fn delete_rental(&mut self, rental_id: &str) -> DbResult<bool> {
        rental::delete(&mut *self.tx, rental_id).await
    }

    // =========================================================================
    // Customers and Users
    // =========================================================================

    pub async fn create_user(&mut self, user: &User) -> DbResult<()> {
        user::insert(&mut *self.tx, user).await
    }

    pub async fn create_customer(&mut self, customer: &Customer) -> DbResult<()> {
        customer::insert(&mut *self.tx, customer).await
    }

    /// Returns the number of rows matched (0 or 1).
    pub async fn set_customer_gold(&mut self, customer_id: &str, is_gold: bool) -> DbResult<u64> {
        customer::set_gold(&mut *self.tx, customer_id, is_gold).await
    }

    /// Deletes the customer only if it belongs to `user_id`.
    pub async fn delete_customer_of_user(&mut self, customer_id: &str, user_id: &str) -> DbResult<u64> {
        customer::delete_owned(&mut *self.tx, customer_id, user_id).await
    }

    pub async fn delete_user(&mut self, user_id: &str) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(user_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use vidly_core::{new_id, GenreRef};

    async fn setup_movie(db: &Database, stock: i64) -> Movie {
        let movie = Movie {
            id: new_id(),
            title: "Airplane".to_string(),
            number_in_stock: stock,
            daily_rental_rate_cents: 200,
            genre: GenreRef {
                id: new_id(),
                name: "Comedy".to_string(),
            },
        };
        db.movies().insert(&movie).await.unwrap()
    }

    #[tokio::test]
    async fn test_commit_applies_changes() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let movie = setup_movie(&db, 3).await;

        let mut uow = db.begin("test").await.unwrap();
        assert_eq!(uow.label(), "test");
        let after = uow.adjust_movie_stock(&movie.id, -1).await.unwrap().unwrap();
        assert_eq!(after.number_in_stock, 2);
        uow.commit().await.unwrap();

        let stored = db.movies().get_by_id(&movie.id).await.unwrap().unwrap();
        assert_eq!(stored.number_in_stock, 2);
    }

    #[tokio::test]
    async fn test_rollback_discards_changes() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let movie = setup_movie(&db, 3).await;

        let mut uow = db.begin("test").await.unwrap();
        uow.adjust_movie_stock(&movie.id, -1).await.unwrap();
        // Reads inside the unit see its own writes.
        let inside = uow.find_movie_by_id(&movie.id).await.unwrap().unwrap();
        assert_eq!(inside.number_in_stock, 2);
        uow.rollback().await.unwrap();

        let stored = db.movies().get_by_id(&movie.id).await.unwrap().unwrap();
        assert_eq!(stored.number_in_stock, 3);
    }

    #[tokio::test]
    async fn test_drop_rolls_back() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let movie = setup_movie(&db, 3).await;

        {
            let mut uow = db.begin("test").await.unwrap();
            uow.adjust_movie_stock(&movie.id, 5).await.unwrap();
        }

        let stored = db.movies().get_by_id(&movie.id).await.unwrap().unwrap();
        assert_eq!(stored.number_in_stock, 3);
    }
}
