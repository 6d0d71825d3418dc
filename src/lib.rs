pub mod classify;
pub mod error;
pub mod fake_feed;
pub mod feed;
pub mod game_state;
pub mod http_cache;
pub mod http_client;
pub mod ledger;
pub mod run_exp;
pub mod scorecard;
pub mod state;
pub mod zone;
