//! Scoreboard overlay seam
//!
//! The host owns the live player objects; this crate only decides *what* should
//! be shown and hands that to a [`DisplaySink`].

use tracing::info;

/// Receives display updates for connected players.
///
/// Called from the service's background tasks, so implementations must be
/// cheap and must not block; a host bound to a single game thread should queue
/// the update and apply it on its next frame.
pub trait DisplaySink: Send + Sync + 'static {
    /// Show `rating` for the player.
    fn apply_display(&self, steam_id: u64, rating: i32);

    /// Remove any rating shown for the player.
    fn clear_display(&self, steam_id: u64);
}

/// Scoreboard coin id for a FACEIT level, `0` for no coin.
pub fn coin_for_level(level: i32) -> u32 {
    match level {
        1 => 1088,
        2 => 1087,
        3 => 1032,
        4 => 1055,
        5 => 1041,
        6 => 1074,
        7 => 1039,
        8 => 1067,
        9 => 1061,
        10 => 1017,
        _ => 0,
    }
}

/// Sink that only logs the coin it would set. Used by the standalone binary.
#[derive(Debug, Default)]
pub struct TracingSink;

impl DisplaySink for TracingSink {
    fn apply_display(&self, steam_id: u64, rating: i32) {
        info!(
            "Display level {rating} (coin {}) for Steam ID {steam_id}",
            coin_for_level(rating)
        );
    }

    fn clear_display(&self, steam_id: u64) {
        info!("Clear display (coin 0) for Steam ID {steam_id}");
    }
}
