//! Plotmap application shell: configuration, CLI and the session loop that
//! connects the pure core to the engine and the map.
pub mod cli;
pub mod config;
pub mod platform;

pub use cli::Cli;
pub use config::AppConfig;
pub use platform::app::run_app;
pub use platform::effects::Session;
