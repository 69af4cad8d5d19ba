use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use evervault_core::{
    CoreConfig, HospitalService, ReleasePolicy,
    constants::{DEFAULT_REST_ADDR, EQUIPMENT_FILE_ENV, RELEASE_POLICY_ENV, REST_ADDR_ENV},
    release_policy_from_env_value,
};

/// Main entry point for the EverVault application
///
/// Starts the REST server and keeps it running until interrupted.
///
/// # Environment Variables
/// - `EVERVAULT_REST_ADDR`: REST server address (default: "0.0.0.0:8080")
/// - `EVERVAULT_EQUIPMENT_FILE`: equipment catalogue YAML (default: built-in demo units)
/// - `EVERVAULT_RELEASE`: `manual`, `buffer` or a number of seconds (default: `buffer`)
///
/// # Returns
/// * `Ok(())` - If the server starts and shuts down cleanly
/// * `Err(anyhow::Error)` - If configuration, binding or serving fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("evervault_run=info".parse()?)
                .add_directive("evervault_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var(REST_ADDR_ENV).unwrap_or_else(|_| DEFAULT_REST_ADDR.into());
    let equipment_file = std::env::var(EQUIPMENT_FILE_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from);
    let release_policy = release_policy_from_env_value(std::env::var(RELEASE_POLICY_ENV).ok())?;

    let cfg = Arc::new(CoreConfig::new(equipment_file, release_policy)?);
    match cfg.equipment_file() {
        Some(path) => tracing::info!("loading equipment catalogue from {}", path.display()),
        None => tracing::info!("using the built-in demo equipment catalogue"),
    }
    let service = HospitalService::new(cfg)?;

    match release_policy {
        ReleasePolicy::Manual => tracing::info!("equipment is released manually"),
        ReleasePolicy::AfterBufferTime => {
            tracing::info!("equipment is released after its buffer time")
        }
        ReleasePolicy::After(delay) => {
            tracing::info!("equipment is released after {}s", delay.as_secs())
        }
    }
    tracing::info!(
        "++ Starting EverVault REST on {} with {} equipment units",
        rest_addr,
        service.equipment_overview().len()
    );

    let app = api_rest::router(service);
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("-- Shutting down EverVault REST");
        })
        .await?;

    Ok(())
}
