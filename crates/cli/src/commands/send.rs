//! `send` command implementation.

use anyhow::{Context, Result};
use config_loader::ConfigLoader;
use contracts::{SenderConfig, SimpleMetric};
use dispatcher::{CancellationToken, Client};
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, warn};

use crate::cli::SendArgs;
use crate::error::CliError;

/// Execute the `send` command
pub async fn run_send(args: &SendArgs) -> Result<()> {
    let config = resolve_config(args)?;

    info!(
        endpoint = %config.endpoint,
        batch_size = config.batch_size,
        batch_timeout_ms = config.batch_timeout_ms,
        queue_capacity = config.queue_capacity,
        "Configuration loaded"
    );

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    let token = CancellationToken::new();
    let client = Client::new(config, token.clone()).context("Failed to create client")?;

    let signal_token = token.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        warn!("Received shutdown signal, discarding pending metrics");
        signal_token.cancel();
    });

    let reader = open_input(&args.input).await?;

    tokio::select! {
        result = produce(&client, reader) => {
            let summary = result?;
            info!(
                sent = summary.sent,
                skipped = summary.skipped,
                "Input exhausted, flushing"
            );
        }
        () = token.cancelled() => {}
    }

    let stats = client.close().await;
    println!("\n{stats}");

    info!("Line Sender finished");
    Ok(())
}

/// Config file (if any) plus CLI overrides, validated
fn resolve_config(args: &SendArgs) -> Result<SenderConfig> {
    let mut config = match &args.config {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::config_not_found(path.display().to_string()).into());
            }
            ConfigLoader::load_from_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?
        }
        None => {
            let endpoint = args.endpoint.clone().ok_or(CliError::MissingEndpoint)?;
            SenderConfig::new(endpoint)
        }
    };

    if let Some(ref endpoint) = args.endpoint {
        debug!(endpoint = %endpoint, "Overriding endpoint from CLI");
        config.endpoint = endpoint.clone();
    }
    if let Some(batch_size) = args.batch_size {
        config.batch_size = batch_size;
    }
    if let Some(batch_timeout_ms) = args.batch_timeout_ms {
        config.batch_timeout_ms = batch_timeout_ms;
    }

    ConfigLoader::validate(&config).map_err(|e| CliError::config_validation(e.to_string()))?;
    Ok(config)
}

async fn open_input(path: &Path) -> Result<Box<dyn AsyncBufRead + Unpin + Send>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufReader::new(tokio::io::stdin())));
    }
    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("Failed to open input {}", path.display()))?;
    Ok(Box::new(BufReader::new(file)))
}

#[derive(Debug, Default, PartialEq, Eq)]
struct ProduceSummary {
    sent: u64,
    skipped: u64,
}

/// Send every metric in `reader`; malformed lines are logged and skipped
async fn produce<R>(client: &Client, reader: R) -> Result<ProduceSummary>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut summary = ProduceSummary::default();
    let mut line_no = 0usize;

    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        line_no += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_metric(line, line_no) {
            Ok(metric) => {
                client.send(metric).await;
                summary.sent += 1;
            }
            Err(e) => {
                warn!(error = %e, "Skipping input line");
                summary.skipped += 1;
            }
        }
    }

    Ok(summary)
}

fn parse_metric(line: &str, line_no: usize) -> Result<SimpleMetric, CliError> {
    serde_json::from_str(line).map_err(|e| CliError::invalid_metric(line_no, e.to_string()))
}

/// Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
