use std::time::{Duration, Instant};

use chrono::{NaiveDate, TimeDelta};
use ulid::Ulid;

use roombook::{Registry, Reservation, Room};

const BUILDINGS: usize = 10;
const ROOMS_PER_BUILDING: usize = 10;
const RESERVATIONS_PER_ROOM: usize = 20;

fn percentile(sorted: &[Duration], p: f64) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let idx = ((sorted.len() as f64) * p / 100.0) as usize;
    sorted[idx.min(sorted.len() - 1)]
}

fn print_latency(label: &str, latencies: &mut [Duration]) {
    latencies.sort();
    let total: Duration = latencies.iter().sum();
    let avg = total / latencies.len() as u32;
    println!("  {label}:");
    println!(
        "    n={}, avg={:.2}ms, p50={:.2}ms, p95={:.2}ms, p99={:.2}ms, max={:.2}ms",
        latencies.len(),
        avg.as_secs_f64() * 1000.0,
        percentile(latencies, 50.0).as_secs_f64() * 1000.0,
        percentile(latencies, 95.0).as_secs_f64() * 1000.0,
        percentile(latencies, 99.0).as_secs_f64() * 1000.0,
        latencies.last().unwrap().as_secs_f64() * 1000.0,
    );
}

fn main() {
    let dir = std::env::temp_dir().join(format!("roombook_bench_{}", Ulid::new()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("buildings.json");
    let mut reg = Registry::open(&path).unwrap();

    println!("roombook persist bench ({})", path.display());

    let mut rooms = Vec::new();
    let mut setup = Vec::new();
    for b in 0..BUILDINGS {
        let started = Instant::now();
        let building_id = reg.add_building(format!("Building {b}")).unwrap().id();
        setup.push(started.elapsed());
        for r in 0..ROOMS_PER_BUILDING {
            let started = Instant::now();
            let room_id = reg
                .add_room(Room::new(building_id, format!("Room {b}.{r}")))
                .unwrap()
                .id();
            setup.push(started.elapsed());
            rooms.push((building_id, room_id));
        }
    }
    print_latency("add building/room", &mut setup);

    // One hour slots back to back, so every add runs the full overlap scan.
    let base = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap();
    let mut adds = Vec::new();
    for slot in 0..RESERVATIONS_PER_ROOM {
        let start = base + TimeDelta::hours(slot as i64);
        let end = start + TimeDelta::hours(1);
        for &(building_id, room_id) in &rooms {
            let started = Instant::now();
            reg.add_reservation(Reservation::new(building_id, room_id, "bench", start, end))
                .unwrap();
            adds.push(started.elapsed());
        }
    }
    print_latency("add reservation", &mut adds);

    let mut conflicts = Vec::new();
    for &(building_id, room_id) in &rooms {
        let started = Instant::now();
        let result = reg.add_reservation(Reservation::new(
            building_id,
            room_id,
            "clash",
            base,
            base + TimeDelta::minutes(30),
        ));
        conflicts.push(started.elapsed());
        assert!(result.is_err());
    }
    print_latency("rejected reservation", &mut conflicts);

    let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
    println!(
        "  final dataset: {} reservations, {} bytes on disk",
        reg.reservations().count(),
        size
    );

    let _ = std::fs::remove_dir_all(&dir);
}
