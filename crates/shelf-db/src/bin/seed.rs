//! # Seed Data Generator
//!
//! Populates the database with sample books for development.
//!
//! ## Usage
//! ```bash
//! # Register 200 copies (default)
//! cargo run -p shelf-db --bin seed
//!
//! # Custom amount and database path
//! cargo run -p shelf-db --bin seed -- --count 1000 --db ./data/shelf.db
//! ```
//!
//! ## Generated Data
//! Copies are registered round-robin over a fixed catalogue, so once the
//! catalogue is exhausted every further copy lands on an existing ISBN and
//! exercises the add-copy path. Every third title then has one copy lent out.

use clap::Parser;
use shelf_db::{Database, DbConfig};

/// Sample catalogue: (title, author).
const CATALOGUE: &[(&str, &str)] = &[
    ("Dune", "Frank Herbert"),
    ("Emma", "Jane Austen"),
    ("Persuasion", "Jane Austen"),
    ("Middlemarch", "George Eliot"),
    ("The Left Hand of Darkness", "Ursula K. Le Guin"),
    ("A Wizard of Earthsea", "Ursula K. Le Guin"),
    ("Beloved", "Toni Morrison"),
    ("Invisible Cities", "Italo Calvino"),
    ("The Master and Margarita", "Mikhail Bulgakov"),
    ("Things Fall Apart", "Chinua Achebe"),
    ("One Hundred Years of Solitude", "Gabriel García Márquez"),
    ("The Remains of the Day", "Kazuo Ishiguro"),
    ("Neuromancer", "William Gibson"),
    ("Frankenstein", "Mary Shelley"),
    ("Moby-Dick", "Herman Melville"),
    ("The Name of the Rose", "Umberto Eco"),
    ("Solaris", "Stanisław Lem"),
    ("Kindred", "Octavia E. Butler"),
    ("Pale Fire", "Vladimir Nabokov"),
    ("The Dispossessed", "Ursula K. Le Guin"),
];

/// Shelf seed data generator.
#[derive(Debug, Parser)]
#[command(name = "seed", about = "Populate a Shelf database with sample books")]
struct Args {
    /// Number of copies to register.
    #[arg(short, long, default_value_t = 200)]
    count: usize,

    /// Database file path.
    #[arg(short, long, default_value = "./shelf_dev.db")]
    db: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    println!("🌱 Shelf Seed Data Generator");
    println!("============================");
    println!("Database: {}", args.db);
    println!("Copies:   {}", args.count);
    println!();

    let db = Database::new(DbConfig::new(&args.db)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.books().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} books", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Registering copies...");

    let start = std::time::Instant::now();
    let mut created = 0;
    let mut copies = 0;

    for seed in 0..args.count {
        let index = seed % CATALOGUE.len();
        let (title, author) = CATALOGUE[index];
        let isbn = sample_isbn(index);

        match db.books().add_or_add_copy(title, author, &isbn).await {
            Ok(result) if result.is_created() => created += 1,
            Ok(_) => copies += 1,
            Err(e) => eprintln!("Failed to add {}: {}", isbn, e),
        }
    }

    // Lend out one copy of every third title.
    let mut lent = 0;
    for book in db.books().list_all().await?.iter().step_by(3) {
        if db.books().borrow(book.id).await.is_ok() {
            lent += 1;
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ {} books created, {} extra copies in {:?}", created, copies, elapsed);
    println!("✓ {} copies lent out", lent);

    let stats = db.books().stats().await?;
    println!(
        "  Totals: {} titles, {} copies, {} available, {} on loan",
        stats.titles, stats.total_copies, stats.available_copies, stats.on_loan
    );

    println!();
    let hits = db.books().search("guin").await?;
    println!("  Search 'guin': {} results", hits.len());

    db.close().await;
    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Deterministic ISBN-13-shaped identifier for catalogue entry `index`.
/// The check digit is not valid.
fn sample_isbn(index: usize) -> String {
    format!("978-0-00-{:06}-0", index)
}
