//! # vidly-core: Pure Domain Logic for Vidly
//!
//! This crate holds the entity types, the rental snapshot, the money type
//! used for rental rates and fees, and the payload validators. It has zero
//! I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Vidly Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    vidly-api (REST, axum)                       │   │
//! │  │    /api/genres  /api/movies  /api/customers  /api/rentals       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ vidly-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                  │   │
//! │  │   │   types   │  │   money   │  │ validation│                  │   │
//! │  │   │  Movie    │  │   Money   │  │   rules   │                  │   │
//! │  │   │  Rental   │  │ fee math  │  │  checks   │                  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘                  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    vidly-db (Database Layer)                    │   │
//! │  │       SQLite repositories, unit of work, rental coordinator     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Movie, Customer, Rental, etc.)
//! - [`money`] - Money type with integer arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Payload validation
//!
//! ## Example Usage
//!
//! ```rust
//! use vidly_core::money::Money;
//!
//! let daily_rate = Money::from_cents(200); // 2.00 per day
//! let fee = daily_rate.rental_fee(3);
//! assert_eq!(fee.cents(), 600);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Upper bound for `numberInStock` accepted by catalog management.
///
/// The bound is checked when a movie is created or edited. Returning a
/// rental increments stock without consulting it.
pub const MAX_NUMBER_IN_STOCK: i64 = 255;

/// Upper bound for the daily rental rate, in whole currency units.
pub const MAX_DAILY_RENTAL_RATE: i64 = 255;

/// Maximum length of a movie title.
pub const MAX_TITLE_LEN: usize = 255;

/// Default name given to a customer record created without one.
pub const DEFAULT_CUSTOMER_NAME: &str = "customer";
