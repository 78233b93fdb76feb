pub mod backend;
pub mod config;
pub mod events;
pub mod identity;
pub mod time;

pub use backend::LoopbackConnectionFactory;
pub use config::load_config;
pub use events::TracingReadinessEmitter;
pub use identity::StaticIdentityProvider;
pub use time::Timer;
