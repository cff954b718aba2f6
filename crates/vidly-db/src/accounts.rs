//! # Accounts
//!
//! User registration and sign-in.
//!
//! ## Registration
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  register(name, email, password)                                       │
//! │                                                                         │
//! │  email already registered? ─── yes → EmailTaken                        │
//! │       │                                                                 │
//! │  argon2 hash (random salt)                                             │
//! │       │                                                                 │
//! │  Unit of work "register"                                               │
//! │  ├── insert user                                                       │
//! │  ├── insert customer { user_id, name = user name, defaults }           │
//! │  └── commit                                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Passwords are stored as argon2 PHC strings
//! (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`).

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use thiserror::Error;
use tracing::{debug, info};

use crate::error::DbError;
use crate::pool::Database;
use vidly_core::{new_id, Customer, User};

// =============================================================================
// Password Hashing
// =============================================================================

/// Hashes a password for storage.
pub fn hash_password(password: &str) -> Result<String, AccountError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AccountError::Hashing(e.to_string()))?;

    Ok(hash.to_string())
}

/// Checks a password against a stored hash. A malformed hash never matches.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("User already registered: {0}")]
    EmailTaken(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error(transparent)]
    Db(#[from] DbError),
}

// =============================================================================
// Service
// =============================================================================

/// Registration payload after validation.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    /// Lowercased.
    pub email: String,
    pub password: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone)]
pub struct AccountService {
    db: Database,
}

impl AccountService {
    pub fn new(db: Database) -> Self {
        AccountService { db }
    }

    /// Creates a user and its customer record in one unit of work.
    pub async fn register(&self, account: NewAccount) -> Result<User, AccountError> {
        if self.db.users().get_by_email(&account.email).await?.is_some() {
            return Err(AccountError::EmailTaken(account.email));
        }

        let user = User {
            id: new_id(),
            name: account.name,
            email: account.email,
            password_hash: hash_password(&account.password)?,
            is_admin: account.is_admin,
        };
        let customer = Customer::new_for_user(&user.id, Some(user.name.clone()));

        let mut uow = self.db.begin("register").await?;
        match uow.create_user(&user).await {
            Err(e) if e.is_unique_violation_on("users.email") => {
                return Err(AccountError::EmailTaken(user.email));
            }
            other => other?,
        }
        uow.create_customer(&customer).await?;
        uow.commit().await?;

        info!(user_id = %user.id, customer_id = %customer.id, "User registered");
        Ok(user)
    }

    /// Returns the user when `email` and `password` match a stored account.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>, AccountError> {
        let Some(user) = self.db.users().get_by_email(email).await? else {
            debug!("Sign-in for unknown email");
            return Ok(None);
        };

        if !verify_password(password, &user.password_hash) {
            debug!(user_id = %user.id, "Sign-in with wrong password");
            return Ok(None);
        }

        Ok(Some(user))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
