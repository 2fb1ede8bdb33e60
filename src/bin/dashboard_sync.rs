// Headless dashboard driver
//
// Reads line commands from stdin, feeds them to the sync coordinator and
// renders every view as log events.
// Usage: cargo run --features http --bin dashboard_sync < session.txt

use std::sync::Arc;

use mobility_dashboard::command::parse_command;
use mobility_dashboard::{DashboardConfig, HttpDataClient, SyncCoordinator, TracingRenderer};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mobility_dashboard=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = DashboardConfig::from_env()?;
    tracing::info!("Configuration:");
    tracing::info!("  MOBILITY_API_BASE: {}", config.api_base);
    tracing::info!("  DASHBOARD_DEBOUNCE_MS: {}", config.debounce.as_millis());
    tracing::info!("  DASHBOARD_REQUEST_TIMEOUT_MS: {}", config.request_timeout.as_millis());
    tracing::info!("  DASHBOARD_SEARCH_LIMIT: {}", config.search_limit);

    let client = Arc::new(HttpDataClient::new(&config)?);
    let mut coordinator = SyncCoordinator::new(client, TracingRenderer, config);

    let (tx, rx) = mpsc::channel(64);
    let reader = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            match parse_command(&line) {
                Ok(Some(event)) => {
                    if tx.send(event).await.is_err() {
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => tracing::warn!(error = %e, "ignoring command"),
            }
        }
        Ok::<_, std::io::Error>(())
    });

    coordinator.run(rx).await;
    reader.await??;
    tracing::info!("session finished");
    Ok(())
}
