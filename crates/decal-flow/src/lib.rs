//! # decal-flow
//!
//! The fulfillment pipeline proper: the per-order orchestrator that turns
//! an inbound order payload into stored design artifacts and a single
//! annotation, plus the batch replay runner that re-drives the same
//! orchestrator from an exported list of order names.
//!
//! Both ingestion paths share one idempotency rule, enforced here: an
//! order already carrying the marker tag is skipped before any rendering
//! or storage work happens.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod metrics;
pub mod orchestrator;
pub mod replay;
pub mod report;

pub use orchestrator::{Fulfillment, FulfillmentSettings, RunOptions};
pub use replay::{QueryFailure, REPLAY_TAG, ReplayRunner, ReplaySummary, parse_order_names};
pub use report::{
    AnnotationOutcome, ItemOutcome, ItemReport, ItemStage, OrderDisposition, OrderReport,
};
