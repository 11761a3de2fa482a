//! Outbound FACEIT lookups: URL building, the configured client, and
//! normalization of every response into a plain skill level.

pub mod api;
pub mod models;

pub use api::RatingFetcher;
pub use models::{FaceitPlayer, GameStats};
