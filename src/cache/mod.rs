//! In-memory player state and the admission gate guarding fetches into it.

pub mod gate;
pub mod record;
pub mod store;

pub use gate::{FetchGate, FetchPermit};
pub use record::{PersistedRecord, UserRecord};
pub use store::UserCache;
