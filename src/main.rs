use leasemarket_lib::bootstrap::{
    load_app_config, resolve_config_path, run_headless, tracing::init_tracing_subscriber,
    wire_session,
};
use tracing::error;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // `.env` is optional.
    let _ = dotenvy::dotenv();
    init_tracing_subscriber()?;

    let config = load_app_config(&resolve_config_path())?;
    let runtime = wire_session(&config)?;

    let result = run_headless(&runtime).await;
    runtime.session.logout().await;
    runtime.session.shutdown().await;

    match result {
        Ok(report) => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Err(err) => {
            error!(error = %err, "headless session failed");
            Err(err)
        }
    }
}
