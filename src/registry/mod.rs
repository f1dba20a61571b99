mod buildings;
mod conflict;
mod error;
mod reservations;
mod rooms;

pub use conflict::now;
pub use error::StoreError;

use std::path::PathBuf;

use tracing::warn;
use ulid::Ulid;

use crate::model::*;
use crate::persist::{Backend, JsonFile};

/// The whole dataset plus the backend it is persisted to.
///
/// Buildings own rooms, rooms own reservations. Every successful mutation
/// rewrites the full dataset through the backend; if that write fails the
/// in-memory change is undone before the error is returned.
pub struct Registry<B: Backend = JsonFile> {
    buildings: Vec<Building>,
    backend: B,
}

impl Registry<JsonFile> {
    /// Load (or start) the dataset stored in the JSON file at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Self::initiate(JsonFile::new(path))
    }
}

impl<B: Backend> Registry<B> {
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Overwrite the backing store with the complete dataset.
    pub fn persist(&mut self) -> Result<(), StoreError> {
        self.backend.save(&self.buildings)
    }

    /// Persist, or run `undo` against the in-memory dataset and return the error.
    pub(super) fn persist_or_undo(
        &mut self,
        undo: impl FnOnce(&mut Vec<Building>),
    ) -> Result<(), StoreError> {
        if let Err(e) = self.persist() {
            warn!("persist failed, rolling back in-memory change: {e}");
            undo(&mut self.buildings);
            return Err(e);
        }
        Ok(())
    }

    // ── Index resolution ─────────────────────────────────────

    pub(super) fn building_index(&self, building_id: Ulid) -> Option<usize> {
        self.buildings.iter().position(|b| b.id() == building_id)
    }

    /// Resolve building then room, reporting the first id that is missing.
    pub(super) fn locate_room(
        &self,
        building_id: Ulid,
        room_id: Ulid,
    ) -> Result<(usize, usize), StoreError> {
        let bi = self
            .building_index(building_id)
            .ok_or(StoreError::NotFound(building_id))?;
        let ri = self.buildings[bi]
            .rooms
            .iter()
            .position(|r| r.id() == room_id)
            .ok_or(StoreError::NotFound(room_id))?;
        Ok((bi, ri))
    }

    pub(super) fn locate_reservation(
        &self,
        building_id: Ulid,
        room_id: Ulid,
        reservation_id: Ulid,
    ) -> Result<(usize, usize, usize), StoreError> {
        let (bi, ri) = self.locate_room(building_id, room_id)?;
        let xi = self.buildings[bi].rooms[ri]
            .reservations
            .iter()
            .position(|r| r.id() == reservation_id)
            .ok_or(StoreError::NotFound(reservation_id))?;
        Ok((bi, ri, xi))
    }
}
