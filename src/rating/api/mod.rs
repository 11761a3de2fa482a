pub mod fetcher;
pub mod http_client;
pub mod urls;

pub use fetcher::RatingFetcher;
pub use http_client::create_faceit_client;
pub use urls::build_player_url;
