//! URL building utilities for API endpoints

/// Builds the player lookup URL for a game and a SteamID64.
///
/// # Example
/// ```
/// use faceit_scoreboard::rating::api::build_player_url;
///
/// let url = build_player_url("https://open.faceit.com/data/v4", "cs2", 76561198000000001);
/// assert_eq!(
///     url,
///     "https://open.faceit.com/data/v4/players?game=cs2&game_player_id=76561198000000001"
/// );
/// ```
pub fn build_player_url(api_base_url: &str, game: &str, steam_id: u64) -> String {
    let base = api_base_url.trim_end_matches('/');
    format!("{base}/players?game={game}&game_player_id={steam_id}")
}
