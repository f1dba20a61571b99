use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use ulid::Ulid;

use roombook::{Registry, Reservation, Room, StoreError, Timestamp};

// ── Test infrastructure ──────────────────────────────────────

fn data_file() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("roombook_int_test_{}", Ulid::new()));
    fs::create_dir_all(&dir).unwrap();
    dir.join("buildings.json")
}

fn at(day: u32, h: u32, m: u32) -> Timestamp {
    NaiveDate::from_ymd_opt(2024, 5, day)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

/// Two buildings, three rooms, a handful of reservations.
fn populate(reg: &mut Registry) {
    let hq = reg.add_building("HQ").unwrap().id();
    let annex = reg.add_building("Annex").unwrap().id();
    let lobby = reg.add_room(Room::new(hq, "Lobby")).unwrap().id();
    let board = reg.add_room(Room::new(hq, "Boardroom")).unwrap().id();
    let hall = reg.add_room(Room::new(annex, "Hall")).unwrap().id();

    for (building, room, name, start, end) in [
        (hq, lobby, "Standup", at(1, 9, 0), at(1, 9, 30)),
        (hq, lobby, "Sync", at(1, 9, 30), at(1, 10, 0)),
        (hq, board, "Review", at(2, 14, 0), at(2, 16, 0)),
        (annex, hall, "All hands", at(3, 10, 0), at(3, 12, 0)),
    ] {
        reg.add_reservation(Reservation::new(building, room, name, start, end))
            .unwrap();
    }
}

// ── Round trip ───────────────────────────────────────────────

#[test]
fn persist_and_reload_is_structurally_equal() {
    let path = data_file();
    let mut reg = Registry::open(&path).unwrap();
    populate(&mut reg);
    reg.persist().unwrap();

    let reloaded = Registry::open(&path).unwrap();
    assert_eq!(reloaded.buildings(), reg.buildings());

    for building in reloaded.buildings() {
        for room in &building.rooms {
            assert_eq!(room.building_id, building.id());
            for reservation in &room.reservations {
                assert_eq!(reservation.building_id, building.id());
                assert_eq!(reservation.room_id, room.id());
            }
        }
    }
}

#[test]
fn every_mutation_reaches_the_file() {
    let path = data_file();
    let mut reg = Registry::open(&path).unwrap();
    populate(&mut reg);

    let hq = reg.buildings()[0].id();
    let lobby = reg.buildings()[0].rooms[0].id();
    let standup = reg.buildings()[0].rooms[0].reservations[0].id();
    reg.edit_building(hq, "Headquarters").unwrap();
    reg.remove_reservation(hq, lobby, standup).unwrap();

    let reloaded = Registry::open(&path).unwrap();
    assert_eq!(reloaded.find_building(hq).unwrap().name, "Headquarters");
    assert!(reloaded.find_reservation(hq, lobby, standup).is_none());
    assert_eq!(reloaded.list_reservations().len(), 3);
}

#[test]
fn scenario_overlapping_sync_rejected() {
    let path = data_file();
    let mut reg = Registry::open(&path).unwrap();
    let hq = reg.add_building("HQ").unwrap().id();
    let lobby = reg.add_room(Room::new(hq, "Lobby")).unwrap().id();
    reg.add_reservation(Reservation::new(hq, lobby, "Standup", at(1, 9, 0), at(1, 9, 30)))
        .unwrap();

    let result =
        reg.add_reservation(Reservation::new(hq, lobby, "Sync", at(1, 9, 15), at(1, 9, 45)));
    assert!(matches!(result, Err(StoreError::Conflict(_))));

    let reloaded = Registry::open(&path).unwrap();
    assert_eq!(reloaded.list_reservations().len(), 1);
}

// ── Loading edge cases ───────────────────────────────────────

#[test]
fn empty_file_starts_empty() {
    let path = data_file();
    fs::write(&path, "").unwrap();
    let reg = Registry::open(&path).unwrap();
    assert!(reg.buildings().is_empty());
}

#[test]
fn corrupt_file_is_fatal() {
    let path = data_file();
    fs::write(&path, "this is not json").unwrap();
    let result = Registry::open(&path);
    assert!(matches!(result, Err(StoreError::Format(_))));
}

#[test]
fn hand_edited_parent_ids_are_repaired_on_disk() {
    let path = data_file();
    let mut reg = Registry::open(&path).unwrap();
    populate(&mut reg);
    let hq = reg.buildings()[0].id();
    drop(reg);

    // Point every back-reference at some other building.
    let bogus = Ulid::new().to_string();
    let text = fs::read_to_string(&path).unwrap();
    let mut doc: serde_json::Value = serde_json::from_str(&text).unwrap();
    for building in doc.as_array_mut().unwrap() {
        for room in building["rooms"].as_array_mut().unwrap() {
            room["building_id"] = bogus.clone().into();
            for reservation in room["reservations"].as_array_mut().unwrap() {
                reservation["building_id"] = bogus.clone().into();
            }
        }
    }
    fs::write(&path, serde_json::to_string(&doc).unwrap()).unwrap();

    let reg = Registry::open(&path).unwrap();
    assert!(reg.rooms().all(|r| reg.find_building(r.building_id).is_some()));
    assert!(reg.find_building(hq).unwrap().rooms.iter().all(|r| r.building_id == hq));

    // The repaired dataset was written back.
    let text = fs::read_to_string(&path).unwrap();
    assert!(!text.contains(&bogus));
}
