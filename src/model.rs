//! Buildings, rooms and reservations as stored in the data file.
//!
//! The file is a JSON array of buildings with snake_case field names and ULID
//! identifiers. It is deliberately not compatible with older `Buildings.json`
//! files that use PascalCase fields and GUIDs; those must be converted first.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Local wall-clock time without offset. The only time type.
pub type Timestamp = NaiveDateTime;

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl TimeRange {
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    pub fn is_valid(&self) -> bool {
        self.start < self.end
    }

    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, t: Timestamp) -> bool {
        self.start <= t && t < self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    id: Ulid,
    pub name: String,
    #[serde(default)]
    pub rooms: Vec<Room>,
}

impl Building {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Ulid::new(),
            name: name.into(),
            rooms: Vec::new(),
        }
    }

    pub fn id(&self) -> Ulid {
        self.id
    }

    pub(crate) fn room(&self, room_id: Ulid) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == room_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    id: Ulid,
    /// Owning building. Overwritten by the repair pass after every load.
    pub building_id: Ulid,
    pub name: String,
    #[serde(default)]
    pub reservations: Vec<Reservation>,
}

impl Room {
    pub fn new(building_id: Ulid, name: impl Into<String>) -> Self {
        Self {
            id: Ulid::new(),
            building_id,
            name: name.into(),
            reservations: Vec::new(),
        }
    }

    pub fn id(&self) -> Ulid {
        self.id
    }

    /// First reservation in collection order whose range contains `now`.
    pub fn active_reservation_at(&self, now: Timestamp) -> Option<&Reservation> {
        self.reservations.iter().find(|r| r.range().contains(now))
    }

    pub fn active_reservation(&self) -> Option<&Reservation> {
        self.active_reservation_at(crate::registry::now())
    }

    pub(crate) fn reservation(&self, reservation_id: Ulid) -> Option<&Reservation> {
        self.reservations.iter().find(|r| r.id == reservation_id)
    }

    /// Reservations whose range overlaps `range`.
    pub fn overlapping<'a>(&'a self, range: &'a TimeRange) -> impl Iterator<Item = &'a Reservation> {
        self.reservations.iter().filter(move |r| r.range().overlaps(range))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    id: Ulid,
    pub building_id: Ulid,
    pub room_id: Ulid,
    pub name: String,
    pub start: Timestamp,
    pub end: Timestamp,
}

impl Reservation {
    pub fn new(
        building_id: Ulid,
        room_id: Ulid,
        name: impl Into<String>,
        start: Timestamp,
        end: Timestamp,
    ) -> Self {
        Self {
            id: Ulid::new(),
            building_id,
            room_id,
            name: name.into(),
            start,
            end,
        }
    }

    pub fn id(&self) -> Ulid {
        self.id
    }

    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start, self.end)
    }
}

/// Partial update for a reservation. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservationEdit {
    pub name: Option<String>,
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
}
