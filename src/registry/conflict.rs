use crate::model::*;

use super::StoreError;

/// Local wall-clock time, the reference for "active" and "upcoming".
pub fn now() -> Timestamp {
    chrono::Local::now().naive_local()
}

pub(crate) fn validate_range(range: &TimeRange) -> Result<(), StoreError> {
    if !range.is_valid() {
        return Err(StoreError::InvalidRange {
            start: range.start,
            end: range.end,
        });
    }
    Ok(())
}

/// Any reservation in the room overlapping `range` is a conflict.
/// Ranges are half-open, so back-to-back bookings pass.
pub(crate) fn check_no_conflict(room: &Room, range: &TimeRange) -> Result<(), StoreError> {
    match room.overlapping(range).next() {
        Some(existing) => Err(StoreError::Conflict(existing.id())),
        None => Ok(()),
    }
}
