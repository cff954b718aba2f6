//! # vidly-db: Database Layer for Vidly
//!
//! SQLite storage for the rental store, plus every operation that must
//! change more than one row atomically.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Vidly Data Flow                                  │
//! │                                                                         │
//! │  HTTP handler (POST /api/rentals)                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     vidly-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐  ┌────────────────┐  ┌──────────────────┐  │   │
//! │  │   │ Coordinator   │  │ Reconciler     │  │ AccountService   │  │   │
//! │  │   │ checkout      │  │ bulk customer  │  │ register         │  │   │
//! │  │   │ return        │  │ changes        │  │ authenticate     │  │   │
//! │  │   └───────┬───────┘  └───────┬────────┘  └────────┬─────────┘  │   │
//! │  │           └──────────────────┼────────────────────┘            │   │
//! │  │                              ▼                                  │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐   │   │
//! │  │   │   Database    │    │  UnitOfWork   │    │ Repositories │   │   │
//! │  │   │   (pool.rs)   │───►│  (one tx)     │    │ genre, movie │   │   │
//! │  │   │  SqlitePool   │    │               │    │ customer ... │   │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (migrations/sqlite embedded)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//! - [`unit_of_work`] - Explicit transaction scope
//! - [`coordinator`] - Rental checkout and return
//! - [`reconcile`] - Bulk customer reconciliation
//! - [`accounts`] - Registration, sign-in, password hashing
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vidly_db::{Database, DbConfig, DuplicateRentalPolicy};
//!
//! let db = Database::new(DbConfig::new("./vidly.db")).await?;
//!
//! let movies = db.movies().list().await?;
//! let rental = db
//!     .coordinator(DuplicateRentalPolicy::Allow)
//!     .checkout(&user_id, &movies[0].id)
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod accounts;
pub mod coordinator;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod reconcile;
pub mod repository;
pub mod unit_of_work;

// =============================================================================
// Re-exports
// =============================================================================

pub use accounts::{AccountError, AccountService, NewAccount};
pub use coordinator::{DuplicateRentalPolicy, RentalCoordinator, RentalError};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use reconcile::{CustomerReconciler, ReconcileError};
pub use unit_of_work::UnitOfWork;

// Repository re-exports for convenience
pub use repository::customer::CustomerRepository;
pub use repository::genre::GenreRepository;
pub use repository::movie::MovieRepository;
pub use repository::rental::RentalRepository;
pub use repository::user::UserRepository;
