pub mod config;
pub mod core;
pub mod handlers;
pub mod routes;
pub mod state;

// Re-export commonly used items for convenience
pub use config::ServerConfig;
pub use self::core::live::{
    LiveConnection, LiveError, LiveEvent, LiveEvents, LiveResult, LiveSink, SessionHandle,
};
pub use state::AppState;
