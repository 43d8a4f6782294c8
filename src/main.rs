//! storage-batch - submit Azure Blob batch requests from the command line
//!
//! Deletes and tier changes given on the command line are sent as one batch;
//! one line (or JSON object) per sub-operation is printed in submission order.

#![allow(missing_docs)]

use anyhow::{Context as _, bail};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use storage_batch::utils::init_logging;
use storage_batch::{
    AccessTier, BatchConfig, BatchOutcome, BlobBatch, Context, DeleteBlobOptions,
    SetBlobAccessTierOptions, SubOperationResult,
};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "storage-batch", version, about = "Submit Azure Blob batch requests")]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, env = "STORAGE_BATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Delete a blob (repeatable)
    #[arg(long = "delete", value_name = "CONTAINER/BLOB")]
    deletes: Vec<String>,

    /// Change a blob's access tier (repeatable)
    #[arg(long = "set-tier", value_name = "CONTAINER/BLOB=TIER")]
    set_tiers: Vec<String>,

    /// Print outcomes as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct OutcomeReport<'a> {
    index: usize,
    kind: String,
    container: &'a str,
    blob: &'a str,
    succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<&'a SubOperationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = BatchConfig::load(cli.config.as_deref()).await?;
    init_logging(&config.log_level, config.log_json)?;

    let batch = build_batch(&cli.deletes, &cli.set_tiers)?;
    if batch.is_empty() {
        bail!("nothing to submit; pass --delete or --set-tier");
    }

    let client = config.build_client()?;
    let ctx = Context::new();
    let interrupt = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling batch");
            interrupt.cancel();
        }
    });

    info!("Submitting {} sub-operations to {}", batch.len(), client.service_url());
    let result = client
        .submit_batch(&ctx, &batch)
        .await
        .context("batch submission failed")?;

    for (outcome, operation) in result.outcomes.iter().zip(batch.iter()) {
        let report = report(outcome, operation.container(), operation.blob());
        if cli.json {
            println!("{}", serde_json::to_string(&report)?);
        } else {
            print_line(&report);
        }
    }

    Ok(if result.failed() > 0 {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    })
}

fn build_batch(deletes: &[String], set_tiers: &[String]) -> anyhow::Result<BlobBatch> {
    let mut batch = BlobBatch::new();
    for target in deletes {
        let (container, blob) = split_target(target)?;
        batch.delete_blob(container, blob, DeleteBlobOptions::default());
    }
    for spec in set_tiers {
        let (target, tier) = spec
            .rsplit_once('=')
            .with_context(|| format!("expected CONTAINER/BLOB=TIER, got '{}'", spec))?;
        let (container, blob) = split_target(target)?;
        let tier: AccessTier = tier.parse()?;
        batch.set_blob_access_tier(container, blob, tier, SetBlobAccessTierOptions::default());
    }
    Ok(batch)
}

fn split_target(target: &str) -> anyhow::Result<(&str, &str)> {
    match target.split_once('/') {
        Some((container, blob)) if !container.is_empty() && !blob.is_empty() => {
            Ok((container, blob))
        }
        _ => bail!("expected CONTAINER/BLOB, got '{}'", target),
    }
}

fn report<'a>(outcome: &'a BatchOutcome, container: &'a str, blob: &'a str) -> OutcomeReport<'a> {
    let (result, status, error_code, error) = match &outcome.result {
        Ok(result) => (Some(result), None, None, None),
        Err(e) => (
            None,
            Some(e.status.as_u16()),
            e.error_code.as_deref(),
            Some(e.message.clone().unwrap_or_else(|| e.reason.clone())),
        ),
    };
    OutcomeReport {
        index: outcome.index,
        kind: outcome.kind.to_string(),
        container,
        blob,
        succeeded: outcome.is_success(),
        result,
        status,
        error_code,
        error,
    }
}

fn print_line(report: &OutcomeReport<'_>) {
    if report.succeeded {
        println!(
            "#{} {} {}/{}: ok",
            report.index, report.kind, report.container, report.blob
        );
    } else {
        println!(
            "#{} {} {}/{}: failed ({} {}) {}",
            report.index,
            report.kind,
            report.container,
            report.blob,
            report.status.unwrap_or_default(),
            report.error_code.unwrap_or("UnknownError"),
            report.error.as_deref().unwrap_or_default()
        );
    }
}
