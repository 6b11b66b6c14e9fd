use anyhow::Context;

use facturas_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    facturas_observability::init(&config.log_filter);
    if config.uses_dev_secret() {
        tracing::warn!("jwt_secret not configured; using insecure dev default");
    }

    let app = facturas_api::app::build_app(config.jwt_secret.clone()).await;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
