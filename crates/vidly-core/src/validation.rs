//! # Validation Module
//!
//! Payload validation for Vidly.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP handler (vidly-api)                                     │
//! │  ├── Type validation (serde deserialization)                           │
//! │  └── THIS MODULE: shape and range rules                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Coordinator (vidly-db)                                       │
//! │  └── Reference resolution, stock guard                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (number_in_stock >= 0)                                      │
//! │  ├── UNIQUE (users.email), UNIQUE (customers.user_id)                  │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use vidly_core::validation::{validate_title, validate_number_in_stock};
//!
//! assert_eq!(validate_title("  Airplane ").unwrap(), "Airplane");
//! assert!(validate_number_in_stock(256).is_err());
//! ```

use crate::error::ValidationError;
use crate::{MAX_DAILY_RENTAL_RATE, MAX_NUMBER_IN_STOCK, MAX_TITLE_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Checks that a trimmed string is within `min..=max` characters and
/// returns it trimmed.
fn bounded_text(field: &str, value: &str, min: usize, max: usize) -> ValidationResult<String> {
    let value = value.trim();
    let len = value.chars().count();

    if len == 0 && min > 0 {
        return Err(ValidationError::required(field));
    }
    if len < min {
        return Err(ValidationError::TooShort {
            field: field.to_string(),
            min,
        });
    }
    if len > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

/// Validates a movie title: 1 to 255 characters after trimming.
pub fn validate_title(title: &str) -> ValidationResult<String> {
    bounded_text("title", title, 1, MAX_TITLE_LEN)
}

/// Validates a genre name: 3 to 50 characters.
pub fn validate_genre_name(name: &str) -> ValidationResult<String> {
    bounded_text("name", name, 3, 50)
}

/// Validates a user's display name: 2 to 50 characters.
pub fn validate_user_name(name: &str) -> ValidationResult<String> {
    bounded_text("name", name, 2, 50)
}

/// Validates a password: 5 to 255 characters. Not trimmed.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    let len = password.chars().count();
    if len == 0 {
        return Err(ValidationError::required("password"));
    }
    if len < 5 {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: 5,
        });
    }
    if len > 255 {
        return Err(ValidationError::TooLong {
            field: "password".to_string(),
            max: 255,
        });
    }
    Ok(())
}

/// Validates an email address and returns it trimmed and lowercased.
///
/// ## Rules
/// - 5 to 255 characters
/// - exactly one `@` with a non-empty local part
/// - a domain containing a dot that is neither first nor last
///
/// ```rust
/// use vidly_core::validation::validate_email;
///
/// assert_eq!(validate_email("Client1@Gmail.com").unwrap(), "client1@gmail.com");
/// assert!(validate_email("client1").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = bounded_text("email", email, 5, 255)?.to_lowercase();

    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must be a valid email address".to_string(),
    };

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') || email.contains(char::is_whitespace) {
        return Err(invalid());
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid());
    }

    Ok(email)
}

/// Normalizes an optional contact field: absent or null becomes `""`.
pub fn optional_text(field: &str, value: Option<&str>) -> ValidationResult<String> {
    match value {
        None => Ok(String::new()),
        Some(value) => bounded_text(field, value, 0, 255),
    }
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a stock count entered through catalog management (0-255).
pub fn validate_number_in_stock(stock: i64) -> ValidationResult<()> {
    if !(0..=MAX_NUMBER_IN_STOCK).contains(&stock) {
        return Err(ValidationError::OutOfRange {
            field: "numberInStock".to_string(),
            min: 0,
            max: MAX_NUMBER_IN_STOCK,
        });
    }
    Ok(())
}

/// Validates a daily rental rate in cents (0.00-255.00).
pub fn validate_daily_rental_rate_cents(cents: i64) -> ValidationResult<()> {
    let max = MAX_DAILY_RENTAL_RATE * 100;
    if !(0..=max).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: "dailyRentalRateCents".to_string(),
            min: 0,
            max,
        });
    }
    Ok(())
}

// =============================================================================
// ID Validators
// =============================================================================

/// Validates that `id` is a UUID, naming `field` in the error.
///
/// ```rust
/// use vidly_core::validation::validate_id;
///
/// assert!(validate_id("movieId", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_id("movieId", "1").is_err());
/// ```
pub fn validate_id(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::required(field));
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
