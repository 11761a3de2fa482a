//! Player level lookups against the FACEIT Data API

use reqwest::Client;
use tracing::{debug, error, instrument, warn};

use super::http_client::create_faceit_client;
use super::urls::build_player_url;
use crate::config::Config;
use crate::constants::games;
use crate::error::AppError;
use crate::rating::models::FaceitPlayer;

/// Fetches FACEIT skill levels for SteamID64s.
///
/// The only shared state is the `reqwest::Client`, which is internally
/// reference counted, so one fetcher can serve any number of concurrent lookups.
#[derive(Debug, Clone)]
pub struct RatingFetcher {
    client: Client,
    api_base_url: String,
    use_csgo: bool,
}

impl RatingFetcher {
    /// Builds a fetcher with its own client from the service configuration.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let client = create_faceit_client(&config.faceit_api_key, config.request_timeout_seconds)?;
        Ok(Self::new(client, config.api_base_url.clone(), config.use_csgo))
    }

    pub fn new(client: Client, api_base_url: impl Into<String>, use_csgo: bool) -> Self {
        Self {
            client,
            api_base_url: api_base_url.into(),
            use_csgo,
        }
    }

    /// Game variants queried, in order.
    fn games(&self) -> &'static [&'static str] {
        if self.use_csgo {
            &[games::PRIMARY, games::LEGACY]
        } else {
            &[games::PRIMARY]
        }
    }

    /// Returns the player's skill level, or `0` when it is unknown.
    ///
    /// CS2 is queried first; the CS:GO profile is only consulted when enabled
    /// and CS2 produced nothing. Every failure is logged and treated as "no level".
    #[instrument(skip(self))]
    pub async fn fetch_rating(&self, steam_id: u64) -> i32 {
        for game in self.games() {
            match self.fetch_game_level(steam_id, game).await {
                Ok(Some(level)) => {
                    debug!("Fetched FaceIT level {level} ({game}) for Steam ID {steam_id}");
                    return level;
                }
                Ok(None) => {
                    debug!("No {game} level for Steam ID {steam_id}");
                }
                Err(e) if e.is_not_found() => {
                    debug!("No FaceIT {game} profile for Steam ID {steam_id}");
                }
                Err(e) if e.is_transport() => {
                    warn!("FaceIT request failed for Steam ID {steam_id}: {e}");
                }
                Err(e) if e.is_malformed_payload() => {
                    error!("Invalid FaceIT response for Steam ID {steam_id}: {e}");
                }
                Err(e) => {
                    error!("Unexpected error fetching level for Steam ID {steam_id}: {e}");
                }
            }
        }
        0
    }

    /// Performs one lookup for a single game variant.
    ///
    /// # Returns
    /// * `Ok(Some(level))` - The profile has a positive level for `game`
    /// * `Ok(None)` - The profile exists but has no level for `game`
    /// * `Err(AppError)` - Transport failure, non-success status, empty or undecodable body
    #[instrument(skip(self))]
    pub async fn fetch_game_level(&self, steam_id: u64, game: &str) -> Result<Option<i32>, AppError> {
        let url = build_player_url(&self.api_base_url, game, steam_id);
        debug!("Fetching data from URL: {url}");

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::network_timeout(&url)
            } else if e.is_connect() {
                AppError::network_connection(&url, e.to_string())
            } else {
                AppError::ApiFetch(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let status_code = status.as_u16();
            let reason = status.canonical_reason().unwrap_or("Unknown error");

            return Err(match status_code {
                404 => AppError::api_not_found(url),
                429 => AppError::api_rate_limit(reason, url),
                400..=499 => AppError::api_client_error(status_code, reason, url),
                _ => AppError::api_server_error(status_code, reason, url),
            });
        }

        let response_text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                AppError::network_timeout(&url)
            } else {
                AppError::ApiFetch(e)
            }
        })?;

        if response_text.trim().is_empty() {
            return Err(AppError::api_no_data("Response body is empty", url));
        }

        match serde_json::from_str::<FaceitPlayer>(&response_text) {
            Ok(player) => Ok(player.skill_level(game)),
            Err(e) => {
                let preview: String = response_text.chars().take(200).collect();
                debug!("Response text (first 200 chars): {preview}");

                if !response_text.trim_start().starts_with('{') {
                    Err(AppError::api_malformed_json("Response is not valid JSON", url))
                } else {
                    Err(AppError::api_unexpected_structure(e.to_string(), url))
                }
            }
        }
    }
}
