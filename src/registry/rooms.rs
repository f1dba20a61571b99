use tracing::{info, warn};
use ulid::Ulid;

use crate::model::*;
use crate::observability::{record_mutation, Entity, Op};
use crate::persist::Backend;

use super::conflict::validate_range;
use super::{Registry, StoreError};

impl<B: Backend> Registry<B> {
    /// Every room, building by building.
    pub fn rooms(&self) -> impl Iterator<Item = &Room> + '_ {
        self.buildings.iter().flat_map(|b| b.rooms.iter())
    }

    pub fn list_rooms(&self) -> Vec<&Room> {
        self.rooms().collect()
    }

    pub fn find_room(&self, building_id: Ulid, room_id: Ulid) -> Option<&Room> {
        self.find_building(building_id)?.room(room_id)
    }

    /// Append `room` to the building named by its `building_id`.
    ///
    /// An unknown building is reported as `NotFound` and a room ID already in
    /// the dataset as `AlreadyExists`. Reservations the room arrives with are
    /// pointed at it and checked like `add_reservation` checks a booking.
    /// Nothing is written on failure.
    pub fn add_room(&mut self, mut room: Room) -> Result<&Room, StoreError> {
        let building_id = room.building_id;
        let Some(bi) = self.building_index(building_id) else {
            warn!("room add for unknown building {building_id}");
            return Err(StoreError::NotFound(building_id));
        };
        if self.rooms().any(|r| r.id() == room.id()) {
            warn!("room add with existing id {}", room.id());
            return Err(StoreError::AlreadyExists(room.id()));
        }
        if let Err(e) = self.adopt_reservations(&mut room) {
            warn!("room {} rejected: {e}", room.id());
            return Err(e);
        }

        let rooms = &mut self.buildings[bi].rooms;
        let ri = rooms.len();
        rooms.push(room);
        self.persist_or_undo(move |b| {
            b[bi].rooms.pop();
        })?;
        record_mutation(Entity::Room, Op::Add);

        let room = &self.buildings[bi].rooms[ri];
        info!("room {} added to building {building_id}", room.id());
        Ok(room)
    }

    /// Rewrite the back-references of a new room's reservations, then require
    /// fresh IDs, valid ranges and no overlap among them.
    fn adopt_reservations(&self, room: &mut Room) -> Result<(), StoreError> {
        let (building_id, room_id) = (room.building_id, room.id());
        for reservation in &mut room.reservations {
            reservation.building_id = building_id;
            reservation.room_id = room_id;
        }
        for (i, reservation) in room.reservations.iter().enumerate() {
            let earlier = &room.reservations[..i];
            let id = reservation.id();
            if earlier.iter().any(|r| r.id() == id) || self.reservations().any(|r| r.id() == id) {
                return Err(StoreError::AlreadyExists(id));
            }
            let range = reservation.range();
            validate_range(&range)?;
            if let Some(existing) = earlier.iter().find(|r| r.range().overlaps(&range)) {
                return Err(StoreError::Conflict(existing.id()));
            }
        }
        Ok(())
    }

    pub fn edit_room(
        &mut self,
        building_id: Ulid,
        room_id: Ulid,
        new_name: impl Into<String>,
    ) -> Result<&Room, StoreError> {
        let (bi, ri) = self.locate_room(building_id, room_id)?;
        let old = std::mem::replace(&mut self.buildings[bi].rooms[ri].name, new_name.into());
        self.persist_or_undo(move |b| b[bi].rooms[ri].name = old)?;
        record_mutation(Entity::Room, Op::Edit);
        Ok(&self.buildings[bi].rooms[ri])
    }

    /// Rename using a room the caller already holds. Its building and the
    /// room itself are looked up again, so a stale copy yields `NotFound`.
    pub fn rename_room(
        &mut self,
        room: &Room,
        new_name: impl Into<String>,
    ) -> Result<&Room, StoreError> {
        self.edit_room(room.building_id, room.id(), new_name)
    }

    /// `Ok(false)` if the building or the room does not exist.
    pub fn remove_room(&mut self, building_id: Ulid, room_id: Ulid) -> Result<bool, StoreError> {
        let Ok((bi, ri)) = self.locate_room(building_id, room_id) else {
            return Ok(false);
        };
        let removed = self.buildings[bi].rooms.remove(ri);
        self.persist_or_undo(move |b| b[bi].rooms.insert(ri, removed))?;
        record_mutation(Entity::Room, Op::Remove);
        info!("room {room_id} removed from building {building_id}");
        Ok(true)
    }
}
