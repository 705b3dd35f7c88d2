//! Batch replay: re-drives the fulfillment pipeline from an exported
//! list of order display names.
//!
//! Replay is the recovery path for orders the live webhook missed or
//! failed. It queries each order back from the platform, reshapes it
//! into the shared payload contract, and hands it to the same
//! orchestrator the webhook uses. Orders are processed strictly
//! sequentially so a partial run has a clean prefix.

use std::sync::Arc;

use serde::Serialize;

use decal_orders::OrdersGateway;

use crate::orchestrator::{Fulfillment, RunOptions};
use crate::report::OrderReport;

/// Tag appended to every order annotated through replay, so recovered
/// orders are distinguishable from live-fulfilled ones.
pub const REPLAY_TAG: &str = "design_replay";

/// One order whose query failed; the run continued past it.
#[derive(Debug, Clone, Serialize)]
pub struct QueryFailure {
    /// The order name that could not be queried.
    pub order_name: String,
    /// Transport or platform failure description.
    pub reason: String,
}

/// Aggregate outcome of one replay run.
#[derive(Debug, Default, Serialize)]
pub struct ReplaySummary {
    /// Reports for orders that were found and handed to the pipeline,
    /// in input order. Includes marker-skipped orders.
    pub processed: Vec<OrderReport>,
    /// Order names the platform has no order for.
    pub not_found: Vec<String>,
    /// Orders whose query failed outright.
    pub query_failures: Vec<QueryFailure>,
}

impl ReplaySummary {
    /// Total input orders accounted for.
    #[must_use]
    pub fn total(&self) -> usize {
        self.processed.len() + self.not_found.len() + self.query_failures.len()
    }
}

/// Sequential replay runner over the shared fulfillment pipeline.
pub struct ReplayRunner {
    fulfillment: Arc<Fulfillment>,
    orders: Arc<dyn OrdersGateway>,
}

impl ReplayRunner {
    /// Builds a runner over an existing pipeline and order gateway.
    pub fn new(fulfillment: Arc<Fulfillment>, orders: Arc<dyn OrdersGateway>) -> Self {
        Self {
            fulfillment,
            orders,
        }
    }

    /// Replays the given order names, one at a time.
    ///
    /// Every annotation applied through this path carries [`REPLAY_TAG`]
    /// in addition to the caller's extra tags. Query failures and
    /// missing orders are recorded and skipped; they never abort the run.
    pub async fn run(&self, names: &[String], options: &RunOptions) -> ReplaySummary {
        let mut options = options.clone();
        if !options
            .extra_tags
            .iter()
            .any(|tag| tag.eq_ignore_ascii_case(REPLAY_TAG))
        {
            options.extra_tags.push(REPLAY_TAG.to_string());
        }

        let mut summary = ReplaySummary::default();
        for name in names {
            match self.orders.order_by_name(name).await {
                Ok(Some(payload)) => {
                    summary
                        .processed
                        .push(self.fulfillment.process(&payload, &options).await);
                }
                Ok(None) => {
                    tracing::warn!(order = %name, "order not found, skipping");
                    summary.not_found.push(name.clone());
                }
                Err(err) => {
                    tracing::warn!(order = %name, error = %err, "order query failed, skipping");
                    summary.query_failures.push(QueryFailure {
                        order_name: name.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            processed = summary.processed.len(),
            not_found = summary.not_found.len(),
            query_failures = summary.query_failures.len(),
            "replay run complete"
        );
        summary
    }
}

/// Parses an exported order list into order names.
///
/// The export format is line-delimited with a header row: the first line
/// is discarded, each remaining line contributes its first comma-separated
/// column with surrounding whitespace and quotes stripped, and blank
/// lines are skipped.
#[must_use]
pub fn parse_order_names(input: &str) -> Vec<String> {
    input
        .lines()
        .skip(1)
        .filter_map(|line| {
            let name = line
                .split(',')
                .next()
                .unwrap_or("")
                .trim()
                .trim_matches('"')
                .trim();
            if name.is_empty() {
                None
            } else {
                Some(name.to_string())
            }
        })
        .collect()
}
