//! # Seed Data Generator
//!
//! Populates a store database with a neighborhood grocery catalog for
//! development.
//!
//! ## Usage
//! ```bash
//! # Full catalog
//! cargo run -p sari-db --bin seed
//!
//! # First N products only
//! cargo run -p sari-db --bin seed -- --count 20
//!
//! # Specify database path
//! cargo run -p sari-db --bin seed -- --db ./data/sari.db
//! ```
//!
//! Each product is priced from its supplier lot: unit cost is the lot
//! price over its volume, and the selling price is unit cost plus markup
//! rounded up to a whole peso.

use std::env;

use sari_core::money::Money;
use sari_core::pricing;
use sari_core::NewProduct;
use sari_db::{Database, DbConfig};

/// (code, name, unit, lot price in cents, units per lot, markup in cents)
const CATALOG: &[(&str, &str, &str, i64, i64, i64)] = &[
    ("BEV-001", "Coke Mismo 290ml", "bottle", 36_000, 24, 300),
    ("BEV-002", "Royal Tru-Orange 290ml", "bottle", 34_800, 24, 300),
    ("BEV-003", "Nescafe 3-in-1 Sachet", "sachet", 28_000, 36, 200),
    ("BEV-004", "Milo Sachet 24g", "sachet", 16_500, 20, 200),
    ("BEV-005", "Bottled Water 500ml", "bottle", 22_800, 24, 500),
    ("SNK-001", "Piattos Cheese 40g", "pack", 38_400, 24, 300),
    ("SNK-002", "Nova Country Cheddar", "pack", 38_400, 24, 300),
    ("SNK-003", "Skyflakes Crackers", "pack", 14_000, 20, 150),
    ("SNK-004", "Boy Bawang Cornick", "pack", 18_000, 20, 200),
    ("GRO-001", "Lucky Me Pancit Canton", "pack", 41_400, 36, 300),
    ("GRO-002", "Lucky Me Beef Noodles", "pack", 34_200, 36, 200),
    ("GRO-003", "Argentina Corned Beef 150g", "can", 172_800, 48, 500),
    ("GRO-004", "555 Sardines 155g", "can", 115_200, 48, 400),
    ("GRO-005", "Rice 1kg", "kg", 250_000, 50, 500),
    ("GRO-006", "White Sugar 1/4kg", "pack", 40_000, 20, 300),
    ("GRO-007", "Cooking Oil 250ml", "bottle", 60_000, 24, 500),
    ("GRO-008", "Datu Puti Vinegar 200ml", "pouch", 32_400, 36, 200),
    ("GRO-009", "Silver Swan Soy Sauce 200ml", "pouch", 36_000, 36, 200),
    ("HHD-001", "Surf Powder Sachet", "sachet", 26_400, 24, 200),
    ("HHD-002", "Safeguard Soap 60g", "bar", 108_000, 48, 300),
    ("HHD-003", "Palmolive Shampoo Sachet", "sachet", 8_400, 12, 100),
    ("HHD-004", "Colgate Toothpaste 25ml", "tube", 60_000, 24, 400),
    ("HHD-005", "Candle Small", "piece", 5_000, 20, 100),
    ("HHD-006", "Match Box", "box", 6_000, 12, 200),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = CATALOG.len();
    let mut db_path = String::from("./sari_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(CATALOG.len());
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Sari POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to add (default: whole catalog)");
                println!("  -d, --db <PATH>    Database file path (default: ./sari_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Sari POS Seed Data Generator");
    println!("============================");
    println!("Database: {}", db_path);
    println!("Products: {}", count.min(CATALOG.len()));
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let inventory = db.inventory();

    let existing = inventory.list(true).await?.len();
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Adding products...");

    let start = std::time::Instant::now();
    let mut added = 0;

    for (seed, entry) in CATALOG.iter().take(count).enumerate() {
        let product = catalog_product(entry, seed);
        match inventory.add_product(&product).await {
            Ok(p) => {
                added += 1;
                println!("  {:<8} {:<30} ₱{:>8}  stock {}", p.item_code, p.name, p.sell_price(), p.current_stock);
            }
            Err(e) => eprintln!("Failed to add {}: {}", product.item_code, e),
        }
    }

    println!();
    println!("✓ Added {} products in {:?}", added, start.elapsed());

    let valuation = inventory.valuation().await?;
    println!("  Retail value: ₱{}", valuation.retail_value);
    println!("  Cost value:   ₱{}", valuation.cost_value);
    println!("  Reorder alerts: {}", inventory.reorder_alerts().await?.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Builds one product from a catalog row. Stock varies with `seed` so a
/// few items start under their reorder threshold.
fn catalog_product(entry: &(&str, &str, &str, i64, i64, i64), seed: usize) -> NewProduct {
    let (code, name, unit, lot_cents, volume, markup_cents) = *entry;

    let unit_cost = pricing::unit_cost(Money::from_cents(lot_cents), volume);
    let price = pricing::suggested_price(unit_cost, Money::from_cents(markup_cents));
    let stock = ((seed * 7) % 40) as i64;

    NewProduct::new(code, name, price.cents())
        .with_unit(unit)
        .with_supplier_cost(lot_cents, volume)
        .with_markup(markup_cents)
        .with_stock(stock)
        .with_reorder(5, volume)
}
