//! # Configuration DTO
//!
//! Maps TOML into [`AppConfig`]. Missing values take the documented
//! defaults; no other validation happens here.

mod app_config;

pub use app_config::{
    AppConfig, DEFAULT_CONNECT_RETRY_LIMIT, DEFAULT_INIT_TIMEOUT_MS, DEFAULT_RETRY_BASE_DELAY_MS,
};
