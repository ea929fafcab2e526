//! # Seed Data Generator
//!
//! Loads the demo catalogue into a database for development.
//!
//! ## Usage
//! ```bash
//! cargo run -p pdv-db --bin seed
//!
//! # Specify database path
//! cargo run -p pdv-db --bin seed -- --db ./data/db.sqlite
//! ```
//!
//! Every product gets `{sku, category}` metadata. Seeding is skipped when
//! the catalogue already has rows.

use std::env;

use pdv_core::{product_metadata, NewProduct};
use pdv_db::{Database, DbConfig};

/// (sku, name, price, stock) per category.
const CATALOGUE: &[(&str, &[(&str, &str, f64, i64)])] = &[
    (
        "Bebidas",
        &[
            ("CC600", "Coca Cola 600ml", 15.0, 50),
            ("CC1L", "Coca Cola 1L", 20.0, 40),
            ("AG1L", "Agua Natural 1L", 12.0, 60),
            ("JN500", "Jugo de Naranja 500ml", 18.0, 25),
        ],
    ),
    (
        "Snacks",
        &[
            ("SB45", "Sabritas Original 45g", 18.0, 30),
            ("DR62", "Doritos Nacho 62g", 19.0, 30),
            ("GC100", "Galletas de Chocolate", 16.5, 20),
        ],
    ),
    (
        "Abarrotes",
        &[
            ("AR1K", "Arroz 1kg", 32.0, 15),
            ("FR900", "Frijol Negro 900g", 38.0, 15),
            ("AC1L", "Aceite Vegetal 1L", 45.0, 10),
            ("AZ1K", "Azúcar 1kg", 29.0, 20),
        ],
    ),
    (
        "Lácteos",
        &[
            ("LE1L", "Leche Entera 1L", 26.0, 24),
            ("YN1K", "Yogurt Natural 1kg", 42.0, 12),
            ("QF400", "Queso Fresco 400g", 65.0, 8),
        ],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./data/db.sqlite");

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
                println!("PDV Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./data/db.sqlite)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 PDV Seed Data Generator");
    println!("==========================");
    println!("Database: {}", db_path);
    println!();

    if let Some(parent) = std::path::Path::new(&db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        return Ok(());
    }

    let mut generated = 0;
    for (category, products) in CATALOGUE {
        for (sku, name, price, stock) in products.iter() {
            let product = NewProduct::new(*name)
                .price(*price)
                .stock(*stock)
                .metadata(product_metadata(sku, category));

            if let Err(e) = db.products().create(&product).await {
                eprintln!("Failed to insert {}: {}", sku, e);
                continue;
            }
            generated += 1;
        }
        println!("  {}: {} products", category, products.len());
    }

    println!();
    println!("✓ Seed complete! {} products", generated);

    db.close().await;
    Ok(())
}
