//! FACEIT level cache for game servers
//!
//! Keeps each player's FACEIT skill level in memory, refreshes it from the
//! FACEIT Data API when it goes stale (with a bounded number of requests in
//! flight), and batches changes into a JSON file in the background.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use faceit_scoreboard::{Config, RatingService, TracingSink};
//! use faceit_scoreboard::error::AppError;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), AppError> {
//!     let config = Config::load(None).await?;
//!     let service = RatingService::start(&config, Arc::new(TracingSink)).await?;
//!
//!     // Host callbacks
//!     service.on_user_active(76561198000000001);
//!     let shown = service.toggle_display(76561198000000001);
//!     println!("display on: {shown}, level: {}", service.current_rating(76561198000000001));
//!
//!     service.on_user_inactive(76561198000000001);
//!     service.shutdown().await?;
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod constants;
pub mod display;
pub mod error;
pub mod persistence;
pub mod rating;
pub mod service;

// Re-export commonly used types for convenience
pub use cache::{UserCache, UserRecord};
pub use config::Config;
pub use display::{DisplaySink, TracingSink, coin_for_level};
pub use error::AppError;
pub use service::RatingService;

/// Current version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
