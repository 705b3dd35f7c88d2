//! Observability infrastructure for Decal.
//!
//! Structured logging with consistent spans: every order processed by the
//! pipeline runs inside an order span, and every line item inside an item
//! span, so partial failures are attributable without retries.

use std::sync::Once;
use tracing::Span;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Log output format.
#[derive(Debug, Clone, Copy, Default)]
pub enum LogFormat {
    /// JSON structured logs (for production).
    Json,
    /// Pretty-printed logs (for development).
    #[default]
    Pretty,
}

/// Initializes the logging subsystem.
///
/// Call once at application startup. Safe to call multiple times;
/// subsequent calls are no-ops.
///
/// # Environment Variables
///
/// - `RUST_LOG`: Controls log levels (e.g., `info`, `decal_flow=debug`)
pub fn init_logging(format: LogFormat) {
    INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        match format {
            LogFormat::Json => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().json())
                    .init();
            }
            LogFormat::Pretty => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().pretty())
                    .init();
            }
        }
    });
}

/// Creates a span for processing one order.
#[must_use]
pub fn order_span(operation: &str, order_name: &str) -> Span {
    tracing::info_span!(
        "order",
        op = operation,
        order_name = order_name,
    )
}

/// Creates a span for processing one customizable line item.
#[must_use]
pub fn item_span(order_name: &str, line_item_id: u64) -> Span {
    tracing::info_span!(
        "line_item",
        order_name = order_name,
        line_item_id = line_item_id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_logging_is_idempotent() {
        init_logging(LogFormat::Pretty);
        init_logging(LogFormat::Pretty);
    }

    #[test]
    fn span_helpers_create_enterable_spans() {
        let span = order_span("fulfill", "#1001");
        let _guard = span.enter();
        tracing::info!("inside order span");

        let span = item_span("#1001", 42);
        let _guard = span.enter();
        tracing::info!("inside item span");
    }
}
