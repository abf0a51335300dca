use std::sync::Arc;

use anyhow::Context;

use stockflow_api::app::{self, services};
use stockflow_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stockflow_observability::init();

    let config = ApiConfig::from_env().context("failed to load configuration")?;
    let services = Arc::new(services::build_services(&config.engine));

    if config.seed_demo {
        let demo = services.seed_demo().context("failed to seed demo data")?;
        tracing::info!(
            customer_id = %demo.customer_id,
            address_id = %demo.address_id,
            products = ?demo.products,
            "demo data seeded"
        );
    }

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app::build_app(services))
        .await
        .context("server error")?;
    Ok(())
}
