//! Documentation Enhancer - Main Entry Point
//!
//! Reads JSON-lines documentation records on stdin and writes enhanced
//! records on stdout, in input order.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use doc_enhancer::{DocumentationRecord, Enhancer, EnhancerSettings};

/// Records buffered between stages
const CHANNEL_CAPACITY: usize = 64;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing; stdout carries the records
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "doc_enhancer=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let settings = EnhancerSettings::from_env().context("Invalid enhancer settings")?;
    let enhancer = Enhancer::from_settings(&settings)?;

    info!("Starting Documentation Enhancer v{}", env!("CARGO_PKG_VERSION"));
    info!(
        backend = %settings.backend,
        discard = settings.discard,
        errors = settings.errors,
        "Loaded settings"
    );

    let (record_tx, record_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (output_tx, mut output_rx) = mpsc::channel(CHANNEL_CAPACITY);

    let reader = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut line_no = 0usize;
        while let Some(line) = lines.next_line().await? {
            line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            match DocumentationRecord::from_json(&line) {
                Ok(record) => {
                    if record_tx.send(record).await.is_err() {
                        break;
                    }
                }
                Err(e) => warn!(line = line_no, error = %e, "Skipping malformed record"),
            }
        }
        Ok::<_, doc_enhancer::EnhanceError>(line_no)
    });

    let worker = tokio::spawn(async move { enhancer.pipe(record_rx, output_tx).await });

    let mut stdout = tokio::io::stdout();
    let mut failures = 0usize;
    while let Some(item) = output_rx.recv().await {
        match item {
            Ok(record) => {
                let mut line = serde_json::to_vec(&record)?;
                line.push(b'\n');
                stdout.write_all(&line).await?;
            }
            Err(e) => {
                failures += 1;
                error!(error = %e, "Failed to enhance record");
            }
        }
    }
    stdout.flush().await?;

    let lines = reader.await??;
    let written = worker.await?;
    info!(lines, written, failures, "Done");

    if failures > 0 {
        anyhow::bail!("{} record(s) could not be enhanced", failures);
    }
    Ok(())
}
