pub mod api;
pub mod config;
pub mod error;
pub mod main_lib;
pub mod models;

pub use api::app_router;
pub use config::Config;
pub use main_lib::{build_state, build_state_with, init_tracing, AppState};
