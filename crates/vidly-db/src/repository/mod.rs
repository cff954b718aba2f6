//! # Repository Module
//!
//! Database repository implementations for Vidly.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  db.movies().list()                                            │
//! │       ▼                                                                 │
//! │  MovieRepository                       UnitOfWork                      │
//! │  ├── list / get_by_id                  ├── adjust_movie_stock          │
//! │  ├── insert / update / delete          ├── create_rental               │
//! │  └── adjust_stock                      └── delete_rental ...           │
//! │       │                                      │                          │
//! │       └──────────┬───────────────────────────┘                          │
//! │                  ▼                                                      │
//! │   executor-generic query fns (one SQL text per operation)              │
//! │                  │                                                      │
//! │                  ▼                                                      │
//! │  SQLite Database (pool connection or open transaction)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`GenreRepository`](genre::GenreRepository) - Genre CRUD
//! - [`MovieRepository`](movie::MovieRepository) - Movie CRUD and restocking
//! - [`CustomerRepository`](customer::CustomerRepository) - Customer CRUD by owning user
//! - [`UserRepository`](user::UserRepository) - User lookup
//! - [`RentalRepository`](rental::RentalRepository) - Active rental reads

pub mod customer;
pub mod genre;
pub mod movie;
pub mod rental;
pub mod user;
