//! # Rental Coordinator
//!
//! Checkout and return of movie copies. Each operation pairs a rental
//! insert/delete with a stock change inside one [`UnitOfWork`], so the two
//! either both happen or neither does.
//!
//! ## Checkout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  checkout(user_id, movie_id)                                           │
//! │                                                                         │
//! │  Pre-checks (pool, no transaction open)                                │
//! │  ├── customer owned by user?   no → InvalidReference(customer)         │
//! │  ├── movie exists?             no → InvalidReference(movie)            │
//! │  └── number_in_stock > 0?      no → OutOfStock                         │
//! │                                                                         │
//! │  Unit of work "checkout"                                               │
//! │  ├── 1. guarded decrement ─── no row? → rollback                       │
//! │  │                                 ├── movie still there → OutOfStock  │
//! │  │                                 └── movie gone → InvalidReference   │
//! │  ├── 2. customer re-read ─── gone? → rollback → InvalidReference       │
//! │  ├── 3. duplicate check (Reject policy only)                           │
//! │  ├── 4. insert rental snapshot (customer and movie as read in-unit)    │
//! │  └── 5. commit                                                          │
//! │                                                                         │
//! │  Any store error inside the unit → rollback → TransactionFailed        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Return
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  return_by_user_and_movie / return_by_rental_id                        │
//! │                                                                         │
//! │  Pre-checks: rental exists (NotFound), its movie exists                │
//! │  (InvalidReference, rental untouched)                                  │
//! │                                                                         │
//! │  Unit of work "return"                                                 │
//! │  ├── 1. delete rental ─── 0 rows? returned concurrently → NotFound     │
//! │  ├── 2. stock + 1 (no upper bound)                                     │
//! │  └── 3. commit                                                          │
//! │                                                                         │
//! │  Result: the deleted rental with its fee settled                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::error::DbError;
use crate::pool::Database;
use crate::unit_of_work::UnitOfWork;
use vidly_core::Rental;

// =============================================================================
// Errors
// =============================================================================

/// Why a checkout or return did not happen.
///
/// Every variant means the store is unchanged.
#[derive(Debug, Error)]
pub enum RentalError {
    /// A referenced customer or movie does not exist.
    #[error("Invalid {entity}: {id}")]
    InvalidReference { entity: &'static str, id: String },

    /// The movie has no copies left.
    #[error("Movie not in stock: {movie_id}")]
    OutOfStock { movie_id: String },

    /// The rental to return does not exist.
    #[error("Rental not found: {0}")]
    NotFound(String),

    /// The user already holds a copy and duplicates are rejected.
    #[error("User {user_id} already rents movie {movie_id}")]
    DuplicateRental { user_id: String, movie_id: String },

    /// The store failed; the unit of work was rolled back.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),
}

impl RentalError {
    fn invalid(entity: &'static str, id: impl Into<String>) -> Self {
        RentalError::InvalidReference {
            entity,
            id: id.into(),
        }
    }
}

impl From<DbError> for RentalError {
    fn from(err: DbError) -> Self {
        RentalError::TransactionFailed(err.to_string())
    }
}

// =============================================================================
// Policy
// =============================================================================

/// Whether a user may hold more than one copy of the same movie.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateRentalPolicy {
    /// Every checkout with stock available succeeds.
    #[default]
    Allow,
    /// A second active rental of the same movie by the same user fails with
    /// [`RentalError::DuplicateRental`].
    Reject,
}

// =============================================================================
// Coordinator
// =============================================================================

/// Runs checkouts and returns as units of work.
///
/// ## Usage
/// ```rust,ignore
/// let coordinator = db.coordinator(DuplicateRentalPolicy::Allow);
/// let rental = coordinator.checkout(&user_id, &movie_id).await?;
/// let returned = coordinator.return_by_rental_id(&rental.id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct RentalCoordinator {
    db: Database,
    policy: DuplicateRentalPolicy,
}

impl RentalCoordinator {
    pub fn new(db: Database, policy: DuplicateRentalPolicy) -> Self {
        RentalCoordinator { db, policy }
    }

    pub fn policy(&self) -> DuplicateRentalPolicy {
        self.policy
    }

    /// Rents one copy of `movie_id` to the customer owned by `user_id`.
    ///
    /// On success the movie's stock is one lower and exactly one new rental
    /// exists, holding a snapshot of the customer and the movie.
    pub async fn checkout(&self, user_id: &str, movie_id: &str) -> Result<Rental, RentalError> {
        if self.db.customers().get_by_user(user_id).await?.is_none() {
            return Err(RentalError::invalid("customer", user_id));
        }

        let movie = self
            .db
            .movies()
            .get_by_id(movie_id)
            .await?
            .ok_or_else(|| RentalError::invalid("movie", movie_id))?;

        if movie.ensure_in_stock().is_err() {
            warn!(movie_id = %movie_id, "Checkout refused: out of stock");
            return Err(RentalError::OutOfStock {
                movie_id: movie_id.to_string(),
            });
        }

        let mut uow = self.db.begin("checkout").await?;

        // First statement of the unit: takes the write lock.
        let Some(movie) = uow.adjust_movie_stock(movie_id, -1).await? else {
            return Err(Self::refused_decrement(uow, movie_id).await);
        };

        // Re-read under the lock; a removal may have committed since the pre-check.
        let Some(customer) = uow.find_customer_by_user(user_id).await? else {
            uow.rollback().await?;
            warn!(user_id = %user_id, "Checkout refused: customer removed concurrently");
            return Err(RentalError::invalid("customer", user_id));
        };

        if self.policy == DuplicateRentalPolicy::Reject
            && uow
                .find_rental_by_user_and_movie(user_id, movie_id)
                .await?
                .is_some()
        {
            uow.rollback().await?;
            warn!(user_id = %user_id, movie_id = %movie_id, "Checkout refused: duplicate rental");
            return Err(RentalError::DuplicateRental {
                user_id: user_id.to_string(),
                movie_id: movie_id.to_string(),
            });
        }

        let rental = uow
            .create_rental(&Rental::snapshot(&customer, &movie, Utc::now()))
            .await?;
        uow.commit().await?;

        info!(
            rental_id = %rental.id,
            user_id = %user_id,
            movie_id = %movie_id,
            number_in_stock = movie.number_in_stock,
            "Movie checked out"
        );
        Ok(rental)
    }

    /// Returns the oldest copy of `movie_id` rented by `user_id`.
    pub async fn return_by_user_and_movie(&self, user_id: &str, movie_id: &str) -> Result<Rental, RentalError> {
        let rental = self
            .db
            .rentals()
            .get_by_user_and_movie(user_id, movie_id)
            .await?
            .ok_or_else(|| RentalError::NotFound(format!("user {user_id} has no rental of movie {movie_id}")))?;

        self.settle(rental).await
    }

    /// Returns a rental by its id.
    pub async fn return_by_rental_id(&self, rental_id: &str) -> Result<Rental, RentalError> {
        let rental = self
            .db
            .rentals()
            .get_by_id(rental_id)
            .await?
            .ok_or_else(|| RentalError::NotFound(rental_id.to_string()))?;

        self.settle(rental).await
    }

    /// Deletes the rental and restores one copy to stock.
    async fn settle(&self, rental: Rental) -> Result<Rental, RentalError> {
        let movie_id = rental.movie.id.clone();

        if self.db.movies().get_by_id(&movie_id).await?.is_none() {
            warn!(rental_id = %rental.id, movie_id = %movie_id, "Return refused: movie no longer exists");
            return Err(RentalError::invalid("movie", movie_id));
        }

        let mut uow = self.db.begin("return").await?;

        if !uow.delete_rental(&rental.id).await? {
            uow.rollback().await?;
            return Err(RentalError::NotFound(rental.id));
        }

        let Some(movie) = uow.adjust_movie_stock(&movie_id, 1).await? else {
            uow.rollback().await?;
            return Err(RentalError::invalid("movie", movie_id));
        };

        uow.commit().await?;

        let returned = rental.settled(Utc::now());
        info!(
            rental_id = %returned.id,
            movie_id = %movie_id,
            number_in_stock = movie.number_in_stock,
            rental_fee_cents = returned.rental_fee_cents.unwrap_or_default(),
            "Movie returned"
        );
        Ok(returned)
    }

    /// Classifies a guarded decrement that matched no row, then rolls the
    /// unit back.
    async fn refused_decrement(mut uow: UnitOfWork, movie_id: &str) -> RentalError {
        let exists = match uow.find_movie_by_id(movie_id).await {
            Ok(movie) => movie.is_some(),
            Err(e) => return e.into(),
        };

        if let Err(e) = uow.rollback().await {
            return e.into();
        }

        if exists {
            warn!(movie_id = %movie_id, "Checkout refused: last copy taken concurrently");
            RentalError::OutOfStock {
                movie_id: movie_id.to_string(),
            }
        } else {
            RentalError::invalid("movie", movie_id)
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DbConfig;
    use chrono::Duration;
    use vidly_core::{new_id, Customer, GenreRef, Movie, User};

    struct Fixture {
        db: Database,
        user_id: String,
        movie_id: String,
    }

    async fn fixture_on(db: Database, stock: i64) -> Fixture {
        let user = User {
            id: new_id(),
            name: "client1".to_string(),
            email: format!("{}@gmail.com", new_id()),
            password_hash: "hash".to_string(),
            is_admin: false,
        };
        db.users().insert(&user).await.unwrap();
        db.customers()
            .insert(&Customer::new_for_user(&user.id, Some("client1".to_string())))
            .await
            .unwrap();

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
        db.movies().insert(&movie).await.unwrap();

        Fixture {
            db,
            user_id: user.id,
            movie_id: movie.id,
        }
    }

    async fn fixture(stock: i64) -> Fixture {
        fixture_on(Database::new(DbConfig::in_memory()).await.unwrap(), stock).await
    }

    impl Fixture {
        fn coordinator(&self) -> RentalCoordinator {
            self.db.coordinator(DuplicateRentalPolicy::Allow)
        }

        async fn stock(&self) -> i64 {
            self.db
                .movies()
                .get_by_id(&self.movie_id)
                .await
                .unwrap()
                .unwrap()
                .number_in_stock
        }

        async fn rentals(&self) -> i64 {
            self.db.rentals().count().await.unwrap()
        }
    }

    // -------------------------------------------------------------------------
    // Checkout
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_checkout_decrements_stock_and_creates_rental() {
        let f = fixture(5).await;

        let rental = f.coordinator().checkout(&f.user_id, &f.movie_id).await.unwrap();

        assert_eq!(f.stock().await, 4);
        assert_eq!(f.rentals().await, 1);
        assert_eq!(rental.customer.user_id, f.user_id);
        assert_eq!(rental.customer.name, "client1");
        assert_eq!(rental.movie.id, f.movie_id);
        assert_eq!(rental.movie.title, "Airplane");
        assert_eq!(rental.movie.daily_rental_rate_cents, 200);
        assert!(rental.rental_fee_cents.is_none());
    }

    #[tokio::test]
    async fn test_checkout_out_of_stock_leaves_store_unchanged() {
        let f = fixture(0).await;

        let err = f.coordinator().checkout(&f.user_id, &f.movie_id).await.unwrap_err();

        assert!(matches!(err, RentalError::OutOfStock { .. }));
        assert_eq!(f.stock().await, 0);
        assert_eq!(f.rentals().await, 0);
    }

    #[tokio::test]
    async fn test_last_copy_then_out_of_stock() {
        let f = fixture(1).await;
        let coordinator = f.coordinator();

        coordinator.checkout(&f.user_id, &f.movie_id).await.unwrap();
        assert_eq!(f.stock().await, 0);

        let err = coordinator.checkout(&f.user_id, &f.movie_id).await.unwrap_err();
        assert!(matches!(err, RentalError::OutOfStock { .. }));
        assert_eq!(f.stock().await, 0);
        assert_eq!(f.rentals().await, 1);
    }

    #[tokio::test]
    async fn test_checkout_unknown_customer_or_movie() {
        let f = fixture(5).await;

        let err = f.coordinator().checkout(&new_id(), &f.movie_id).await.unwrap_err();
        assert!(matches!(err, RentalError::InvalidReference { entity: "customer", .. }));

        let err = f.coordinator().checkout(&f.user_id, &new_id()).await.unwrap_err();
        assert!(matches!(err, RentalError::InvalidReference { entity: "movie", .. }));

        assert_eq!(f.stock().await, 5);
        assert_eq!(f.rentals().await, 0);
    }

    #[tokio::test]
    async fn test_duplicate_policy() {
        let f = fixture(5).await;

        let allow = f.db.coordinator(DuplicateRentalPolicy::Allow);
        allow.checkout(&f.user_id, &f.movie_id).await.unwrap();
        allow.checkout(&f.user_id, &f.movie_id).await.unwrap();
        assert_eq!(f.rentals().await, 2);

        let reject = f.db.coordinator(DuplicateRentalPolicy::Reject);
        let err = reject.checkout(&f.user_id, &f.movie_id).await.unwrap_err();
        assert!(matches!(err, RentalError::DuplicateRental { .. }));
        assert_eq!(f.stock().await, 3);
        assert_eq!(f.rentals().await, 2);
    }

    #[tokio::test]
    async fn test_failed_rental_insert_rolls_back_decrement() {
        let f = fixture(5).await;
        sqlx::query(
            "CREATE TRIGGER fail_rental_insert BEFORE INSERT ON rentals
             BEGIN SELECT RAISE(ABORT, 'injected failure'); END;",
        )
        .execute(f.db.pool())
        .await
        .unwrap();

        let err = f.coordinator().checkout(&f.user_id, &f.movie_id).await.unwrap_err();

        assert!(matches!(err, RentalError::TransactionFailed(_)));
        assert_eq!(f.stock().await, 5);
        assert_eq!(f.rentals().await, 0);
    }

    // -------------------------------------------------------------------------
    // Return
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_round_trip_restores_stock() {
        let f = fixture(5).await;
        let coordinator = f.coordinator();

        let rental = coordinator.checkout(&f.user_id, &f.movie_id).await.unwrap();
        assert_eq!(f.stock().await, 4);

        let returned = coordinator
            .return_by_user_and_movie(&f.user_id, &f.movie_id)
            .await
            .unwrap();

        assert_eq!(returned.id, rental.id);
        assert_eq!(returned.rental_fee_cents, Some(200));
        assert_eq!(f.stock().await, 5);
        assert_eq!(f.rentals().await, 0);
    }

    #[tokio::test]
    async fn test_return_by_rental_id_charges_elapsed_days() {
        let f = fixture(5).await;
        let coordinator = f.coordinator();
        let rental = coordinator.checkout(&f.user_id, &f.movie_id).await.unwrap();

        sqlx::query("UPDATE rentals SET date_out = ?2 WHERE id = ?1")
            .bind(&rental.id)
            .bind(Utc::now() - Duration::days(3) - Duration::hours(1))
            .execute(f.db.pool())
            .await
            .unwrap();

        let returned = coordinator.return_by_rental_id(&rental.id).await.unwrap();
        assert_eq!(returned.rental_fee_cents, Some(600));
        assert_eq!(f.stock().await, 5);
    }

    #[tokio::test]
    async fn test_return_unknown_rental() {
        let f = fixture(5).await;

        let err = f
            .coordinator()
            .return_by_user_and_movie(&f.user_id, &f.movie_id)
            .await
            .unwrap_err();
        assert!(matches!(err, RentalError::NotFound(_)));

        let err = f.coordinator().return_by_rental_id(&new_id()).await.unwrap_err();
        assert!(matches!(err, RentalError::NotFound(_)));
        assert_eq!(f.stock().await, 5);
    }

    #[tokio::test]
    async fn test_return_with_deleted_movie_keeps_rental() {
        let f = fixture(5).await;
        let coordinator = f.coordinator();
        let rental = coordinator.checkout(&f.user_id, &f.movie_id).await.unwrap();

        f.db.movies().delete(&f.movie_id).await.unwrap();

        let err = coordinator.return_by_rental_id(&rental.id).await.unwrap_err();
        assert!(matches!(err, RentalError::InvalidReference { entity: "movie", .. }));
        assert!(f.db.rentals().get_by_id(&rental.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_return_increment_is_unbounded() {
        let f = fixture(1).await;
        let coordinator = f.coordinator();
        let rental = coordinator.checkout(&f.user_id, &f.movie_id).await.unwrap();

        // Restocked to the catalog maximum while the copy was out.
        let movie = f.db.movies().get_by_id(&f.movie_id).await.unwrap().unwrap();
        f.db.movies()
            .update(&Movie {
                number_in_stock: 255,
                ..movie
            })
            .await
            .unwrap();

        coordinator.return_by_rental_id(&rental.id).await.unwrap();
        assert_eq!(f.stock().await, 256);
    }

    #[tokio::test]
    async fn test_failed_stock_increment_rolls_back_delete() {
        let f = fixture(5).await;
        let coordinator = f.coordinator();
        let rental = coordinator.checkout(&f.user_id, &f.movie_id).await.unwrap();

        sqlx::query(
            "CREATE TRIGGER fail_stock_update BEFORE UPDATE ON movies
             BEGIN SELECT RAISE(ABORT, 'injected failure'); END;",
        )
        .execute(f.db.pool())
        .await
        .unwrap();

        let err = coordinator.return_by_rental_id(&rental.id).await.unwrap_err();

        assert!(matches!(err, RentalError::TransactionFailed(_)));
        assert!(f.db.rentals().get_by_id(&rental.id).await.unwrap().is_some());
        assert_eq!(f.stock().await, 4);
    }

    // -------------------------------------------------------------------------
    // Concurrency
    // -------------------------------------------------------------------------

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_checkouts_for_last_copy() {
        let path = std::env::temp_dir().join(format!("vidly-race-{}.db", new_id()));
        let db = Database::new(DbConfig::new(&path).max_connections(4))
            .await
            .unwrap();
        let f = fixture_on(db, 1).await;

        let first = {
            let c = f.coordinator();
            let (u, m) = (f.user_id.clone(), f.movie_id.clone());
            tokio::spawn(async move { c.checkout(&u, &m).await })
        };
        let second = {
            let c = f.coordinator();
            let (u, m) = (f.user_id.clone(), f.movie_id.clone());
            tokio::spawn(async move { c.checkout(&u, &m).await })
        };

        let results = [first.await.unwrap(), second.await.unwrap()];
        let ok = results.iter().filter(|r| r.is_ok()).count();
        let out_of_stock = results
            .iter()
            .filter(|r| matches!(r, Err(RentalError::OutOfStock { .. })))
            .count();

        assert_eq!(ok, 1);
        assert_eq!(out_of_stock, 1);
        assert_eq!(f.stock().await, 0);
        assert_eq!(f.rentals().await, 1);

        f.db.close().await;
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_checkout_racing_customer_removal() {
        let path = std::env::temp_dir().join(format!("vidly-removal-{}.db", new_id()));
        let db = Database::new(DbConfig::new(&path).max_connections(4))
            .await
            .unwrap();
        let f = fixture_on(db, 5).await;
        let customer = f.db.customers().get_by_user(&f.user_id).await.unwrap().unwrap();

        // Removal holds the write lock but has not committed yet.
        let mut removal = f.db.begin("remove customer").await.unwrap();
        assert_eq!(removal.delete_customer_of_user(&customer.id, &f.user_id).await.unwrap(), 1);
        assert_eq!(removal.delete_user(&f.user_id).await.unwrap(), 1);

        let checkout = {
            let c = f.coordinator();
            let (u, m) = (f.user_id.clone(), f.movie_id.clone());
            tokio::spawn(async move { c.checkout(&u, &m).await })
        };

        // Let the checkout pass its pre-check and block on the lock.
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        removal.commit().await.unwrap();

        let err = checkout.await.unwrap().unwrap_err();
        assert!(matches!(err, RentalError::InvalidReference { entity: "customer", .. }));
        assert!(f.db.customers().get_by_id(&customer.id).await.unwrap().is_none());
        assert_eq!(f.stock().await, 5);
        assert_eq!(f.rentals().await, 0);

        f.db.close().await;
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
    }

    #[tokio::test]
    async fn test_snapshot_reflects_customer_at_commit() {
        let f = fixture(5).await;
        let customer = f.db.customers().get_by_user(&f.user_id).await.unwrap().unwrap();
        f.db.customers()
            .update_for_user(&Customer {
                name: "Jane".to_string(),
                is_gold: true,
                ..customer
            })
            .await
            .unwrap();

        let rental = f.coordinator().checkout(&f.user_id, &f.movie_id).await.unwrap();
        assert_eq!(rental.customer.name, "Jane");
        assert!(rental.customer.is_gold);
    }
}
