use tracing::{info, warn};
use ulid::Ulid;

use crate::model::*;
use crate::observability::{record_mutation, Entity, Op};
use crate::persist::Backend;

use super::conflict::{check_no_conflict, now, validate_range};
use super::{Registry, StoreError};

/// Count and log a turned-away reservation, passing the error through.
fn rejected(e: StoreError) -> StoreError {
    metrics::counter!(crate::observability::RESERVATIONS_REJECTED_TOTAL, "reason" => e.reason())
        .increment(1);
    warn!("reservation rejected: {e}");
    e
}

impl<B: Backend> Registry<B> {
    /// Every reservation, building by building and room by room.
    pub fn reservations(&self) -> impl Iterator<Item = &Reservation> + '_ {
        self.rooms().flat_map(|r| r.reservations.iter())
    }

    pub fn list_reservations(&self) -> Vec<&Reservation> {
        self.reservations().collect()
    }

    pub fn find_reservation(
        &self,
        building_id: Ulid,
        room_id: Ulid,
        reservation_id: Ulid,
    ) -> Option<&Reservation> {
        self.find_room(building_id, room_id)?
            .reservation(reservation_id)
    }

    /// The not-yet-finished reservation that starts first, as of now.
    pub fn upcoming(&self) -> Option<&Reservation> {
        self.upcoming_at(now())
    }

    /// Among reservations with `end >= now`, the one with the earliest start.
    /// On equal starts the one seen last in listing order wins.
    pub fn upcoming_at(&self, now: Timestamp) -> Option<&Reservation> {
        let mut upcoming: Option<&Reservation> = None;
        for reservation in self.reservations() {
            if reservation.end < now {
                continue;
            }
            if upcoming.is_none_or(|u| reservation.start <= u.start) {
                upcoming = Some(reservation);
            }
        }
        upcoming
    }

    /// IDs of the reservations in a room that overlap `range`.
    pub fn reservation_conflicts(
        &self,
        building_id: Ulid,
        room_id: Ulid,
        range: &TimeRange,
    ) -> Result<Vec<Ulid>, StoreError> {
        let (bi, ri) = self.locate_room(building_id, room_id)?;
        Ok(self.buildings[bi].rooms[ri]
            .overlapping(range)
            .map(|r| r.id())
            .collect())
    }

    /// Book `reservation` in the room named by its building/room IDs.
    ///
    /// Fails with `NotFound` for an unknown building or room, `AlreadyExists`
    /// when its ID is already booked anywhere, `InvalidRange` when start is not
    /// before end, and `Conflict` when it overlaps an existing reservation in
    /// that room. Nothing is written on failure.
    pub fn add_reservation(&mut self, reservation: Reservation) -> Result<&Reservation, StoreError> {
        let (bi, ri) = self
            .locate_room(reservation.building_id, reservation.room_id)
            .map_err(rejected)?;
        if self.reservations().any(|r| r.id() == reservation.id()) {
            return Err(rejected(StoreError::AlreadyExists(reservation.id())));
        }
        let range = reservation.range();
        validate_range(&range).map_err(rejected)?;
        check_no_conflict(&self.buildings[bi].rooms[ri], &range).map_err(rejected)?;

        let reservations = &mut self.buildings[bi].rooms[ri].reservations;
        let xi = reservations.len();
        reservations.push(reservation);
        self.persist_or_undo(move |b| {
            b[bi].rooms[ri].reservations.pop();
        })?;
        record_mutation(Entity::Reservation, Op::Add);

        let reservation = &self.buildings[bi].rooms[ri].reservations[xi];
        info!(
            "reservation {} booked in room {} [{}, {})",
            reservation.id(),
            reservation.room_id,
            reservation.start,
            reservation.end
        );
        Ok(reservation)
    }

    /// Apply the `Some` fields of `edit`. Overlap with other reservations is
    /// not re-checked; the resulting range must still have start before end.
    pub fn edit_reservation(
        &mut self,
        building_id: Ulid,
        room_id: Ulid,
        reservation_id: Ulid,
        edit: ReservationEdit,
    ) -> Result<&Reservation, StoreError> {
        let (bi, ri, xi) = self.locate_reservation(building_id, room_id, reservation_id)?;
        let slot = &self.buildings[bi].rooms[ri].reservations[xi];
        let range = TimeRange::new(
            edit.start.unwrap_or(slot.start),
            edit.end.unwrap_or(slot.end),
        );
        validate_range(&range).map_err(rejected)?;

        let slot = &mut self.buildings[bi].rooms[ri].reservations[xi];
        let previous = slot.clone();
        if let Some(name) = edit.name {
            slot.name = name;
        }
        slot.start = range.start;
        slot.end = range.end;
        self.persist_or_undo(move |b| b[bi].rooms[ri].reservations[xi] = previous)?;
        record_mutation(Entity::Reservation, Op::Edit);
        Ok(&self.buildings[bi].rooms[ri].reservations[xi])
    }

    /// `Ok(false)` if the building, room or reservation does not exist.
    pub fn remove_reservation(
        &mut self,
        building_id: Ulid,
        room_id: Ulid,
        reservation_id: Ulid,
    ) -> Result<bool, StoreError> {
        let Ok((bi, ri, xi)) = self.locate_reservation(building_id, room_id, reservation_id) else {
            return Ok(false);
        };
        let removed = self.buildings[bi].rooms[ri].reservations.remove(xi);
        self.persist_or_undo(move |b| b[bi].rooms[ri].reservations.insert(xi, removed))?;
        record_mutation(Entity::Reservation, Op::Remove);
        info!("reservation {reservation_id} removed from room {room_id}");
        Ok(true)
    }

    /// Remove from a room the caller already holds, addressed by the room's
    /// own back-reference instead of a separate ID path.
    pub fn remove_reservation_in(
        &mut self,
        room: &Room,
        reservation_id: Ulid,
    ) -> Result<bool, StoreError> {
        self.remove_reservation(room.building_id, room.id(), reservation_id)
    }
}
