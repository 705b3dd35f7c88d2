//! Replay command - re-drive fulfillment from an exported order list.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use decal_core::{Config, ObjectStore, S3Store};
use decal_flow::{
    Fulfillment, FulfillmentSettings, OrderDisposition, ReplayRunner, ReplaySummary, RunOptions,
    parse_order_names,
};
use decal_orders::{AdminClient, OrdersGateway};
use decal_render::{Compositor, OverlayStyle};

use crate::OutputFormat;

/// Arguments for the replay command.
#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Path to the exported order list (header row is discarded).
    #[arg(long, short = 'i')]
    pub input: PathBuf,

    /// Maximum line items rendered concurrently within one order.
    #[arg(long, default_value = "1")]
    pub parallelism: usize,

    /// Reprocess orders that already carry the marker tag.
    #[arg(long)]
    pub reprocess: bool,
}

/// Execute the replay command.
///
/// # Errors
///
/// Returns an error if configuration is incomplete, the input file
/// cannot be read, or it contains no order names. Per-order failures do
/// not error; they are part of the summary.
pub async fn execute(args: ReplayArgs, format: &OutputFormat) -> Result<()> {
    let config = Config::from_env()?;
    config.validate_for_admin_api()?;

    let input = std::fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let names = parse_order_names(&input);
    if names.is_empty() {
        anyhow::bail!("no order names found in {}", args.input.display());
    }
    tracing::info!(orders = names.len(), "starting replay");

    let store: Arc<dyn ObjectStore> = Arc::new(S3Store::new(&config.storage)?);
    let orders: Arc<dyn OrdersGateway> = Arc::new(AdminClient::new(&config.admin)?);
    let compositor = Compositor::new(OverlayStyle::default())?;
    let settings = FulfillmentSettings {
        annotate_processed: args.reprocess,
        ..FulfillmentSettings::default()
    };

    let fulfillment = Arc::new(Fulfillment::new(
        store,
        Arc::clone(&orders),
        compositor,
        settings,
    ));
    let runner = ReplayRunner::new(fulfillment, orders);
    let options = RunOptions {
        item_parallelism: args.parallelism,
        ..RunOptions::default()
    };

    let summary = runner.run(&names, &options).await;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Text => print_summary(&summary),
    }
    Ok(())
}

fn print_summary(summary: &ReplaySummary) {
    for report in &summary.processed {
        match report.disposition {
            OrderDisposition::Annotated => println!(
                "{}: annotated ({} fulfilled, {} failed)",
                report.order_name,
                report.fulfilled_count(),
                report.failed_count()
            ),
            disposition => println!("{}: {}", report.order_name, disposition.label()),
        }
    }
    for name in &summary.not_found {
        println!("{name}: not found");
    }
    for failure in &summary.query_failures {
        println!("{}: query failed ({})", failure.order_name, failure.reason);
    }
    println!(
        "replayed {} orders: {} processed, {} not found, {} query failures",
        summary.total(),
        summary.processed.len(),
        summary.not_found.len(),
        summary.query_failures.len()
    );
}
