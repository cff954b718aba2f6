//! HTTP route handlers, one module per resource.
//!
//! Each module exposes `router()` returning a `Router<AppState>` that
//! [`crate::router`] nests under `/api/<resource>`.

pub mod auth;
pub mod customers;
pub mod genres;
pub mod movies;
pub mod rentals;
pub mod users;
