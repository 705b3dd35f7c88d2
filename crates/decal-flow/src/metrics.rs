//! Pipeline metrics.
//!
//! Provides counters and histograms for order and item throughput.
//! These metrics complement the structured logging approach already in place.

use metrics::{counter, describe_counter, describe_histogram, histogram};

/// Orders processed counter, labeled by disposition.
pub const ORDERS_PROCESSED: &str = "decal_orders_processed_total";

/// Items fulfilled counter.
pub const ITEMS_FULFILLED: &str = "decal_items_fulfilled_total";

/// Item failures counter, labeled by stage.
pub const ITEM_FAILURES: &str = "decal_item_failures_total";

/// Annotation failures counter, labeled by kind.
pub const ANNOTATION_FAILURES: &str = "decal_annotation_failures_total";

/// Stored artifact size histogram.
pub const ARTIFACT_BYTES: &str = "decal_artifact_bytes";

/// Registers all pipeline metric descriptions.
///
/// Call this once at application startup after initializing the metrics recorder.
pub fn register_metrics() {
    describe_counter!(ORDERS_PROCESSED, "Total orders processed, by disposition");
    describe_counter!(ITEMS_FULFILLED, "Total line items fulfilled");
    describe_counter!(ITEM_FAILURES, "Total contained line-item failures, by stage");
    describe_counter!(
        ANNOTATION_FAILURES,
        "Total annotation failures, by kind (transport or field)"
    );
    describe_histogram!(ARTIFACT_BYTES, "Size of stored design artifacts in bytes");
}

/// Records the disposition of one processed order.
pub fn record_order(disposition: &'static str) {
    counter!(ORDERS_PROCESSED, "disposition" => disposition).increment(1);
}

/// Records one fulfilled line item and its artifact size.
pub fn record_item_fulfilled(artifact_bytes: usize) {
    counter!(ITEMS_FULFILLED).increment(1);
    #[allow(clippy::cast_precision_loss)]
    histogram!(ARTIFACT_BYTES).record(artifact_bytes as f64);
}

/// Records one contained line-item failure.
pub fn record_item_failure(stage: &'static str) {
    counter!(ITEM_FAILURES, "stage" => stage).increment(1);
}

/// Records one annotation failure.
pub fn record_annotation_failure(kind: &'static str) {
    counter!(ANNOTATION_FAILURES, "kind" => kind).increment(1);
}
