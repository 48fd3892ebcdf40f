use std::sync::Arc;

use anyhow::Context;

use medsupply_infra::config::AppConfig;
use medsupply_observability::LogFormat;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    medsupply_observability::init(LogFormat::from_env());

    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::info!(stage = %config.stage, use_postgres = config.use_postgres, "starting");

    let services = medsupply_api::app::services::build_services(&config).await?;
    let app = medsupply_api::app::build_app(Arc::new(services));

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
