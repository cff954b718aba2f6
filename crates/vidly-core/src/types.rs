//! # Domain Types
//!
//! Core domain types used throughout Vidly.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────┐    ┌─────────────────┐    ┌─────────────────┐          │
//! │  │   Genre     │◄── │     Movie       │    │      User       │          │
//! │  │  id, name   │copy│ number_in_stock │    │  email (unique) │          │
//! │  └─────────────┘    │ daily rate      │    │  is_admin       │          │
//! │                     └────────┬────────┘    └────────┬────────┘          │
//! │                              │ snapshot             │ owns 0..1         │
//! │                              ▼                      ▼                   │
//! │                     ┌─────────────────┐    ┌─────────────────┐          │
//! │                     │     Rental      │◄───│    Customer     │          │
//! │                     │ customer + movie│snap│  is_gold        │          │
//! │                     │ date_out, fee   │    │  contact fields │          │
//! │                     └─────────────────┘    └─────────────────┘          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A rental copies the customer and movie fields it needs at checkout time.
//! Later edits to the customer or movie are not reflected in the rental, and
//! deleting the movie leaves the rental intact.
//!
//! All types serialize with camelCase field names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::DEFAULT_CUSTOMER_NAME;

/// Generates a new entity ID (UUID v4).
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Genre
// =============================================================================

/// A movie genre.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Genre {
    pub id: String,
    pub name: String,
}

/// Denormalized copy of a genre embedded in a movie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenreRef {
    pub id: String,
    pub name: String,
}

impl From<&Genre> for GenreRef {
    fn from(genre: &Genre) -> Self {
        GenreRef {
            id: genre.id.clone(),
            name: genre.name.clone(),
        }
    }
}

// =============================================================================
// Movie
// =============================================================================

/// A title in the rental catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: String,
    pub title: String,
    /// Copies available to rent. Never negative.
    pub number_in_stock: i64,
    /// Daily rental rate in cents.
    pub daily_rental_rate_cents: i64,
    pub genre: GenreRef,
}

impl Movie {
    /// Returns the daily rental rate as Money.
    #[inline]
    pub fn daily_rental_rate(&self) -> Money {
        Money::from_cents(self.daily_rental_rate_cents)
    }

    /// Checks that at least one copy can be rented.
    pub fn ensure_in_stock(&self) -> CoreResult<()> {
        if self.number_in_stock <= 0 {
            return Err(CoreError::OutOfStock {
                movie_id: self.id.clone(),
                title: self.title.clone(),
            });
        }
        Ok(())
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A store customer. Belongs to exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    /// Owning user.
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub province: String,
    pub zip: String,
    pub phone: String,
    pub is_gold: bool,
}

impl Customer {
    /// A customer with every optional field at its default.
    pub fn new_for_user(user_id: impl Into<String>, name: Option<String>) -> Self {
        Customer {
            id: new_id(),
            user_id: user_id.into(),
            name: name.unwrap_or_else(|| DEFAULT_CUSTOMER_NAME.to_string()),
            email: String::new(),
            address: String::new(),
            city: String::new(),
            province: String::new(),
            zip: String::new(),
            phone: String::new(),
            is_gold: false,
        }
    }
}

// =============================================================================
// User
// =============================================================================

/// An account that can sign in.
///
/// The password hash never leaves the server: it is skipped on
/// serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub is_admin: bool,
}

// =============================================================================
// Rental
// =============================================================================

/// Customer fields frozen into a rental at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalCustomer {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub is_gold: bool,
}

/// Movie fields frozen into a rental at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalMovie {
    pub id: String,
    pub title: String,
    pub daily_rental_rate_cents: i64,
}

/// An active rental: one copy of a movie out with one customer.
///
/// Immutable once created; the only lifecycle event after checkout is
/// deletion on return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rental {
    pub id: String,
    pub customer: RentalCustomer,
    pub movie: RentalMovie,
    pub date_out: DateTime<Utc>,
    pub rental_fee_cents: Option<i64>,
}

impl Rental {
    /// Builds a new rental from the current customer and movie state.
    pub fn snapshot(customer: &Customer, movie: &Movie, date_out: DateTime<Utc>) -> Self {
        Rental {
            id: new_id(),
            customer: RentalCustomer {
                id: customer.id.clone(),
                user_id: customer.user_id.clone(),
                name: customer.name.clone(),
                is_gold: customer.is_gold,
            },
            movie: RentalMovie {
                id: movie.id.clone(),
                title: movie.title.clone(),
                daily_rental_rate_cents: movie.daily_rental_rate_cents,
            },
            date_out,
            rental_fee_cents: None,
        }
    }

    /// Fee owed if the rental were returned at `at`.
    pub fn accrued_fee(&self, at: DateTime<Utc>) -> Money {
        let days = (at - self.date_out).num_days();
        Money::from_cents(self.movie.daily_rental_rate_cents).rental_fee(days)
    }

    /// Returns this rental with its fee settled as of `at`.
    pub fn settled(mut self, at: DateTime<Utc>) -> Self {
        self.rental_fee_cents = Some(self.accrued_fee(at).cents());
        self
    }
}

// =============================================================================
// Bulk Customer Reconciliation
// =============================================================================

/// A gold-status change for one customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerChange {
    pub customer_id: String,
    pub is_gold: bool,
}

/// A customer to delete together with its owning user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRemoval {
    pub customer_id: String,
    pub user_id: String,
}

/// Row counts applied by a successful reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileSummary {
    pub updated: u64,
    pub customers_deleted: u64,
    pub users_deleted: u64,
}

/// Phases of a bulk reconciliation, in execution order.
///
/// `Begin` and `Commit` bracket the three row phases: a failure there
/// touched no phase's rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcilePhase {
    Begin,
    UpdateCustomers,
    DeleteCustomers,
    DeleteUsers,
    Commit,
}

impl std::fmt::Display for ReconcilePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ReconcilePhase::Begin => "begin",
            ReconcilePhase::UpdateCustomers => "update customers",
            ReconcilePhase::DeleteCustomers => "delete customers",
            ReconcilePhase::DeleteUsers => "delete users",
            ReconcilePhase::Commit => "commit",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
