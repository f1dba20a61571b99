use tracing::{info, warn};
use ulid::Ulid;

use crate::model::*;
use crate::observability::{record_mutation, Entity, Op};
use crate::persist::Backend;

use super::{Registry, StoreError};

impl<B: Backend> Registry<B> {
    /// Load the dataset from `backend` and repair parent-ID back-references.
    ///
    /// An empty or absent source starts an empty dataset. A source that does
    /// not parse fails with [`StoreError::Format`]; the registry cannot run
    /// without its data, so callers should treat that as fatal. Failing to
    /// write back the repaired dataset is only logged.
    pub fn initiate(backend: B) -> Result<Self, StoreError> {
        let buildings = backend.load()?;
        let mut registry = Self { buildings, backend };

        // A read-only source still loads; the repair is redone on the next start.
        if registry.repair_ids() > 0 {
            if let Err(e) = registry.persist() {
                warn!("repaired dataset not written back, keeping it in memory: {e}");
            }
        }

        info!(
            "dataset loaded: {} buildings, {} rooms, {} reservations",
            registry.buildings.len(),
            registry.rooms().count(),
            registry.reservations().count()
        );
        Ok(registry)
    }

    /// Force every room's and reservation's stored parent IDs to match the
    /// building/room it actually sits in. Returns the number of fields changed.
    pub fn repair_ids(&mut self) -> usize {
        let mut fixed = 0usize;
        for building in &mut self.buildings {
            let building_id = building.id();
            for room in &mut building.rooms {
                if room.building_id != building_id {
                    room.building_id = building_id;
                    fixed += 1;
                }
                let room_id = room.id();
                for reservation in &mut room.reservations {
                    if reservation.building_id != building_id {
                        reservation.building_id = building_id;
                        fixed += 1;
                    }
                    if reservation.room_id != room_id {
                        reservation.room_id = room_id;
                        fixed += 1;
                    }
                }
            }
        }
        if fixed > 0 {
            warn!("repaired {fixed} parent-ID back-references");
            metrics::counter!(crate::observability::IDS_REPAIRED_TOTAL).increment(fixed as u64);
        }
        fixed
    }

    /// All buildings in insertion order.
    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    pub fn find_building(&self, id: Ulid) -> Option<&Building> {
        self.buildings.iter().find(|b| b.id() == id)
    }

    pub fn add_building(&mut self, name: impl Into<String>) -> Result<&Building, StoreError> {
        self.buildings.push(Building::new(name));
        self.persist_or_undo(|b| {
            b.pop();
        })?;
        record_mutation(Entity::Building, Op::Add);

        let pos = self.buildings.len() - 1;
        let building = &self.buildings[pos];
        info!("building {} added", building.id());
        Ok(building)
    }

    pub fn edit_building(
        &mut self,
        id: Ulid,
        new_name: impl Into<String>,
    ) -> Result<&Building, StoreError> {
        let pos = self.building_index(id).ok_or(StoreError::NotFound(id))?;
        let old = std::mem::replace(&mut self.buildings[pos].name, new_name.into());
        self.persist_or_undo(move |b| b[pos].name = old)?;
        record_mutation(Entity::Building, Op::Edit);
        Ok(&self.buildings[pos])
    }

    /// Remove the first building with `id` together with its rooms and
    /// reservations. `Ok(false)` if there is no such building.
    pub fn remove_building(&mut self, id: Ulid) -> Result<bool, StoreError> {
        let Some(pos) = self.building_index(id) else {
            return Ok(false);
        };
        let removed = self.buildings.remove(pos);
        self.persist_or_undo(move |b| b.insert(pos, removed))?;
        record_mutation(Entity::Building, Op::Remove);
        info!("building {id} removed");
        Ok(true)
    }
}
