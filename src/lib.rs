pub mod app;
pub mod attendance;
pub mod calendar;
pub mod config;
pub mod errors;
pub mod groups;
pub mod handlers;
pub mod models;
pub mod roster;
pub mod state;
pub mod stats;
pub mod storage;
pub mod workspace;

pub use app::router;
pub use config::AppConfig;
pub use state::AppState;
pub use storage::{load_store, persist_store};
pub use workspace::Workspace;
