//! Structured run reports.
//!
//! Every orchestrator run produces an [`OrderReport`] regardless of
//! outcome. The webhook handler serializes it back to the caller and the
//! replay runner aggregates them, so the shapes here are the external
//! vocabulary of the pipeline.

use serde::Serialize;

use decal_orders::{AnnotationReport, ResultLink};

/// The pipeline stage an item failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStage {
    /// Template key resolution.
    Resolve,
    /// Template bundle retrieval.
    Fetch,
    /// Call-sign overlay rendering.
    Compose,
    /// Bundle repackaging.
    Repack,
    /// Artifact write.
    Store,
}

impl ItemStage {
    /// Stable label used in logs and metrics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Resolve => "resolve",
            Self::Fetch => "fetch",
            Self::Compose => "compose",
            Self::Repack => "repack",
            Self::Store => "store",
        }
    }
}

/// Terminal state of one line item within a run.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemOutcome {
    /// An artifact was stored; the link feeds the order annotation.
    Fulfilled {
        /// The stored artifact, positioned within its order.
        link: ResultLink,
    },
    /// The item failed and was contained; siblings were unaffected.
    Failed {
        /// Stage the failure occurred in.
        stage: ItemStage,
        /// Human-readable failure description.
        reason: String,
    },
}

/// Per-item slice of an order report.
#[derive(Debug, Clone, Serialize)]
pub struct ItemReport {
    /// The originating line-item id.
    pub line_item_id: u64,
    /// The call sign that was (or would have been) overlaid.
    pub call_sign: String,
    /// The resolved template bundle key.
    pub template_key: String,
    /// How the item ended.
    pub outcome: ItemOutcome,
}

/// How the order as a whole was disposed of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderDisposition {
    /// No line item carried a call sign; the order was left untouched.
    NoCustomItems,
    /// The marker tag was already present; skipped before any work.
    AlreadyFulfilled,
    /// Custom items existed but none produced an artifact. The order is
    /// left unannotated so a later replay picks it up.
    NothingFulfilled,
    /// At least one artifact was stored and annotation was attempted.
    Annotated,
}

impl OrderDisposition {
    /// Stable label used in logs and metrics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NoCustomItems => "no_custom_items",
            Self::AlreadyFulfilled => "already_fulfilled",
            Self::NothingFulfilled => "nothing_fulfilled",
            Self::Annotated => "annotated",
        }
    }
}

/// Outcome of the single annotation attempt for an order.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnnotationOutcome {
    /// The mutation went through; field-level results inside.
    Applied {
        /// Per-field application report.
        report: AnnotationReport,
    },
    /// The mutation never reached the platform. Artifacts are already
    /// stored, so a replay of the order completes the annotation.
    TransportFailed {
        /// Transport-level failure description.
        reason: String,
    },
}

/// Full outcome of one orchestrator run over one order.
#[derive(Debug, Clone, Serialize)]
pub struct OrderReport {
    /// Human order number.
    pub order_name: String,
    /// Order-level disposition.
    pub disposition: OrderDisposition,
    /// Per-item outcomes, in original line-item order. Empty when the
    /// order was skipped before item processing.
    pub items: Vec<ItemReport>,
    /// The annotation attempt, present only for `Annotated` orders.
    pub annotation: Option<AnnotationOutcome>,
}

impl OrderReport {
    /// A report for an order skipped before any item work.
    #[must_use]
    pub fn skipped(order_name: &str, disposition: OrderDisposition) -> Self {
        Self {
            order_name: order_name.to_string(),
            disposition,
            items: Vec::new(),
            annotation: None,
        }
    }

    /// Links produced by fulfilled items, in item order.
    #[must_use]
    pub fn links(&self) -> Vec<ResultLink> {
        self.items
            .iter()
            .filter_map(|item| match &item.outcome {
                ItemOutcome::Fulfilled { link } => Some(link.clone()),
                ItemOutcome::Failed { .. } => None,
            })
            .collect()
    }

    /// Number of fulfilled items.
    #[must_use]
    pub fn fulfilled_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| matches!(item.outcome, ItemOutcome::Fulfilled { .. }))
            .count()
    }

    /// Number of failed items.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.items.len() - self.fulfilled_count()
    }
}
