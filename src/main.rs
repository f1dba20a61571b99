use std::path::PathBuf;

use tracing::info;
use tracing_subscriber::EnvFilter;

use roombook::Registry;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let data_file = PathBuf::from(
        std::env::var("ROOMBOOK_DATA_FILE").unwrap_or_else(|_| "./data/buildings.json".into()),
    );

    // Ensure data directory exists
    if let Some(dir) = data_file.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }

    // A data file that does not parse aborts startup.
    let registry = Registry::open(&data_file)?;

    info!("roombook data file: {}", data_file.display());
    for building in registry.buildings() {
        let reservations: usize = building.rooms.iter().map(|r| r.reservations.len()).sum();
        info!(
            "  {} ({}): {} rooms, {} reservations",
            building.name,
            building.id(),
            building.rooms.len(),
            reservations
        );
        for room in &building.rooms {
            if let Some(active) = room.active_reservation() {
                info!("    {} in use: {} until {}", room.name, active.name, active.end);
            }
        }
    }
    match registry.upcoming() {
        Some(next) => info!("next reservation: {} [{}, {})", next.name, next.start, next.end),
        None => info!("no upcoming reservations"),
    }
    Ok(())
}
