//! # Seed Data Generator
//!
//! Populates the database with the standard fixture set for development.
//!
//! ## Usage
//! ```bash
//! cargo run -p vidly-db --bin seed
//!
//! # Specify database path
//! cargo run -p vidly-db --bin seed -- --db ./data/vidly.db
//! ```
//!
//! ## Generated Data
//! - 4 genres with 3 movies each (stock 5 / 10 / 15, rate 2.00 per day)
//! - 3 client users (`client{N}@gmail.com` / `password`), each with a
//!   customer record
//! - 10 rentals spread round-robin over customers and movies, checked out
//!   through the rental coordinator so stock reflects them

use std::env;
use vidly_core::{new_id, Genre, GenreRef, Money, Movie};
use vidly_db::{Database, DbConfig, DuplicateRentalPolicy, NewAccount};

/// Genres and their movie titles.
const CATALOG: &[(&str, [&str; 3])] = &[
    ("Comedy", ["Airplane", "The Hangover", "Wedding Crashers"]),
    ("Action", ["Die Hard", "Terminator", "The Avengers"]),
    ("Romance", ["The Notebook", "When Harry Met Sally", "Pretty Woman"]),
    ("Thriller", ["The Sixth Sense", "Gone Girl", "The Others"]),
];

/// Stock for the first, second and third movie of each genre.
const STOCK: [i64; 3] = [5, 10, 15];

const CLIENTS: &[&str] = &["client1", "client2", "client3"];

const RENTALS: usize = 10;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./vidly.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Vidly Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./vidly.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Vidly Seed Data Generator");
    println!("===========================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.movies().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} movies", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Catalog
    let mut movies = Vec::new();
    for (genre_name, titles) in CATALOG {
        let genre = db
            .genres()
            .insert(&Genre {
                id: new_id(),
                name: genre_name.to_string(),
            })
            .await?;

        for (title, stock) in titles.iter().zip(STOCK) {
            let movie = Movie {
                id: new_id(),
                title: title.to_string(),
                number_in_stock: stock,
                daily_rental_rate_cents: Money::from_units(2).cents(),
                genre: GenreRef::from(&genre),
            };
            movies.push(db.movies().insert(&movie).await?);
        }
    }
    println!("✓ {} genres, {} movies", CATALOG.len(), movies.len());

    // Clients
    let mut users = Vec::new();
    for name in CLIENTS {
        let user = db
            .accounts()
            .register(NewAccount {
                name: name.to_string(),
                email: format!("{}@gmail.com", name),
                password: "password".to_string(),
                is_admin: false,
            })
            .await?;
        users.push(user);
    }
    println!("✓ {} users with customers", users.len());

    // Rentals
    let coordinator = db.coordinator(DuplicateRentalPolicy::Allow);
    for i in 0..RENTALS {
        let user = &users[i % users.len()];
        let movie = &movies[i % movies.len()];
        coordinator.checkout(&user.id, &movie.id).await?;
    }
    println!("✓ {} rentals", db.rentals().count().await?);

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}
