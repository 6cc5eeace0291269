//! Rigtune binary
//!
//! Runs one optimization cycle, or cycles continuously until Ctrl+C when
//! `runner.continuous` is set.

use anyhow::Result;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rigtune_common::VERSION;
use rigtune_optimizer::{build_sample_source, Optimizer, RigtuneConfig, Runner, TracingAuditSink};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Rigtune v{}", VERSION);

    // Load configuration
    let config = RigtuneConfig::load()?;
    info!("Loaded configuration: {:?}", config);

    let source = build_sample_source(&config.source)?;
    let mut optimizer = Optimizer::new(&config, source)?;
    optimizer.add_audit_sink(Box::new(TracingAuditSink));

    // Install the handler up front so Ctrl+C is only acted on between cycles
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received shutdown signal");
                let _ = shutdown_tx.send(());
            }
            Err(e) => {
                warn!("Failed to install Ctrl+C handler: {}", e);
                // Keep the sender alive so the runner is not stopped
                std::future::pending::<()>().await;
                drop(shutdown_tx);
            }
        }
    });

    let mut runner = Runner::from_settings(optimizer, &config.runner);
    let summary = runner
        .run_until(async {
            let _ = shutdown_rx.await;
        })
        .await;

    let optimizer = runner.into_optimizer();
    optimizer.audit_log().flush();

    info!(
        cycles = optimizer.cycles(),
        completed = summary.completed,
        skipped = summary.skipped,
        audit_evicted = optimizer.audit_log().evicted(),
        "Final configuration: {}",
        optimizer.control_state()
    );
    debug!("Metrics:\n{}", optimizer.metrics().encode()?);

    Ok(())
}
