//! Tracing subscriber setup for the binary.
//!
//! `RUST_LOG` overrides the default directives entirely.

use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

/// Check if running in development environment
fn is_development() -> bool {
    cfg!(debug_assertions)
}

/// Default filter directives: debug in development, info otherwise.
fn build_filter_directives(is_dev: bool) -> Vec<String> {
    let level = if is_dev { "debug" } else { "info" };
    vec![
        level.to_string(),
        format!("lm_app={level}"),
        format!("lm_infra={level}"),
        format!("leasemarket_lib={level}"),
    ]
}

/// Registers the global subscriber. Call once, before anything logs.
///
/// # Errors
///
/// Returns `Err` if a global subscriber is already registered.
pub fn init_tracing_subscriber() -> anyhow::Result<()> {
    let filter_directives = build_filter_directives(is_development());
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives.join(",")));

    // "2025-01-15 10:30:45.123 INFO [file.rs:42] [target] message"
    let stdout_layer = fmt::layer()
        .with_timer(fmt::time::ChronoUtc::new(
            "%Y-%m-%d %H:%M:%S%.3f".to_string(),
        ))
        .with_level(true)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_ansi(cfg!(not(test)));

    registry().with(env_filter).with(stdout_layer).try_init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_directives() {
        let dev_directives = build_filter_directives(true);
        assert!(dev_directives.contains(&"debug".to_string()));
        assert!(dev_directives.contains(&"lm_app=debug".to_string()));
        assert!(dev_directives.contains(&"lm_infra=debug".to_string()));
        assert!(dev_directives.contains(&"leasemarket_lib=debug".to_string()));

        let prod_directives = build_filter_directives(false);
        assert!(prod_directives.contains(&"info".to_string()));
        assert!(prod_directives.contains(&"lm_app=info".to_string()));
        assert!(prod_directives.contains(&"leasemarket_lib=info".to_string()));
        assert!(EnvFilter::try_new(prod_directives.join(",")).is_ok());
    }
}
