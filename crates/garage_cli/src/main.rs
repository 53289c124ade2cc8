//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `garage_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use garage_core::{contract, Car, CarColor, CarQuery, GarageStore};

fn main() {
    println!("garage_core ping={}", garage_core::ping());
    println!("garage_core version={}", garage_core::core_version());

    // In-memory round trip keeps the probe side-effect free.
    match smoke() {
        Ok(summary) => println!("{summary}"),
        Err(err) => {
            eprintln!("garage_core smoke failed: {err}");
            std::process::exit(1);
        }
    }
}

fn smoke() -> Result<String, Box<dyn std::error::Error>> {
    let store = GarageStore::open_in_memory()?;
    let draft = Car::draft("Ford", "F150", "2015", CarColor::Red, "ABC123");
    let id = store.insert(&contract::collection_uri(), &draft)?;

    let rows = store.list(&contract::item_uri(id), &CarQuery::default())?;
    let cars = Car::from_row_set(&rows)?;

    Ok(format!(
        "garage_core smoke inserted id={id} listed={}",
        cars.len()
    ))
}
