pub mod model;
pub mod observability;
pub mod persist;
pub mod registry;

pub use model::{Building, Reservation, ReservationEdit, Room, TimeRange, Timestamp};
pub use persist::{Backend, JsonFile, MemoryBackend};
pub use registry::{Registry, StoreError};
