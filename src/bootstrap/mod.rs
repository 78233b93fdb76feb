pub mod config;
pub mod run;
pub mod tracing;
pub mod wiring;

pub use config::{load_app_config, resolve_config_path};
pub use run::{run_headless, SessionReport};
pub use wiring::{wire_session, SessionRuntime};
