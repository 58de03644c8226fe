//! Faultline demo: runs the process-wide engine against a few sample
//! errors and exports them through the error channel.

use std::time::Duration;

use futures::StreamExt;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, fmt};

use faultline_core::config::EngineConfig;
use faultline_core::error::EngineError;
use faultline_engine::{ErrorEngine, FromMessage, Raised, error_lineage};

#[derive(Debug, Error)]
#[error("storage failure: {0}")]
struct StorageFault(String);

#[derive(Debug, Error)]
#[error("disk full on {0}")]
struct DiskFull(String);

#[derive(Debug, Error)]
#[error("{message}")]
struct ParseFault {
    message: String,
    #[source]
    cause: Option<Raised>,
}

impl FromMessage for ParseFault {
    fn from_message(message: String) -> Self {
        Self {
            message,
            cause: None,
        }
    }

    fn from_message_with_cause(message: String, cause: Raised) -> Self {
        Self {
            message,
            cause: Some(cause),
        }
    }
}

error_lineage! {
    StorageFault,
    DiskFull => StorageFault,
    ParseFault,
}

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Demo error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<EngineConfig, EngineError> {
    let config_path =
        std::env::var("FAULTLINE_CONFIG").unwrap_or_else(|_| "config/faultline".to_string());
    EngineConfig::load(&config_path)
}

/// Initialize tracing/logging
fn init_logging(config: &EngineConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn run(config: EngineConfig) -> Result<(), Raised> {
    let engine = ErrorEngine::global();
    engine.apply_config(&config.hooks);

    // ── Policies ─────────────────────────────────────────────────
    let _ = engine
        .policy::<StorageFault>()
        .with_action(|e| format!("cached copy (after: {e})"));
    let _ = engine
        .policy::<ParseFault>()
        .with_message("input could not be parsed");

    // ── Consumer ─────────────────────────────────────────────────
    let cancel = CancellationToken::new();
    let consumer = {
        let mut errors = Box::pin(engine.read_exceptions(cancel.clone()));
        tokio::spawn(async move {
            while let Some(item) = errors.next().await {
                match item {
                    Ok(error) => tracing::info!(
                        error_type = %error.error_type(),
                        error = %error,
                        "Exported error"
                    ),
                    Err(e) => tracing::debug!("Consumer stopped: {}", e),
                }
            }
        })
    };

    // ── Dispatch ─────────────────────────────────────────────────
    let recovered: String = engine.run(|| Err::<String, _>(DiskFull("/var".into())))?;
    tracing::info!("Recovered value: {}", recovered);

    let rewritten = engine.handle::<()>(Raised::new(ParseFault::from_message("bad byte".into())));
    if let Err(e) = rewritten {
        tracing::info!(error = %e, "Parse error rewritten");
    }

    let fallback = engine.execute(|| Err::<u64, _>(ParseFault::from_message("eof".into())), 0);
    tracing::info!("Fallback value: {}", fallback);

    let _ = engine
        .spawn_detached(async { Err::<(), _>(DiskFull("/tmp".into())) })
        .await;

    tokio::time::sleep(Duration::from_millis(100)).await;
    cancel.cancel();
    let _ = consumer.await;

    engine.shutdown();
    Ok(())
}
