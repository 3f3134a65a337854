pub mod app;
pub mod color;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod ledger;
pub mod models;
pub mod seed;
pub mod state;
pub mod stats;
pub mod storage;
pub mod sync;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use ledger::AssistLedger;
pub use state::AppState;
