//! Durable player data: the JSON document on disk and the write-back
//! scheduler that batches changes into it.

pub mod store;
pub mod writeback;

pub use store::{DurableDocument, DurableStore};
pub use writeback::{WriteBack, WriteBackState};
