//! Error types and result aliases for Decal.
//!
//! This module defines the shared error taxonomy used across all pipeline
//! components. Variants are structured for programmatic handling: the
//! orchestrator maps them onto per-item stage outcomes, and callers can
//! distinguish retryable store failures from operator-intervention cases
//! such as a missing template upload.

/// The result type used throughout Decal.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Decal pipeline operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A template key was not present in the addressed bucket.
    ///
    /// Not retryable without operator intervention: it means the template
    /// bundle was never uploaded under the expected naming convention.
    #[error("asset not found: {key} in {bucket} bucket")]
    AssetNotFound {
        /// Bucket class the key was looked up in.
        bucket: &'static str,
        /// The object key that was absent.
        key: String,
    },

    /// A raster or archive could not be decoded.
    #[error("asset corrupt: {message}")]
    AssetCorrupt {
        /// Description of what failed to decode.
        message: String,
    },

    /// A template bundle lacks the expected templatable entry.
    #[error("template bundle has no entry matching `{pattern}`")]
    TemplateAssetMissing {
        /// The entry pattern that matched nothing.
        pattern: String,
    },

    /// A write to the design store failed.
    ///
    /// Transient and safe to retry: artifact writes are idempotent by
    /// construction (unique keys, unconditional overwrite).
    #[error("store write failed: {message}")]
    StoreWriteFailed {
        /// Description of the write failure.
        message: String,
        /// The underlying cause, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The order platform rejected or failed an order query.
    #[error("order query failed: {message}")]
    OrderQueryFailed {
        /// Description of the query failure.
        message: String,
    },

    /// The order platform rejected or failed an order mutation at the
    /// transport level.
    ///
    /// Field-level user errors are not represented here; they are carried
    /// in the annotation report so partial application stays visible.
    #[error("order mutation failed: {message}")]
    OrderMutationFailed {
        /// Description of the mutation failure.
        message: String,
    },

    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A serialization or deserialization error occurred.
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of the serialization failure.
        message: String,
    },

    /// An internal error occurred that should not happen in normal operation.
    #[error("internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl Error {
    /// Creates an asset-corrupt error with the given message.
    #[must_use]
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::AssetCorrupt {
            message: message.into(),
        }
    }

    /// Creates a store-write error with a source cause.
    #[must_use]
    pub fn store_write(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::StoreWriteFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates an internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns the pipeline stage label used in logs and metrics.
    #[must_use]
    pub fn stage_label(&self) -> &'static str {
        match self {
            Self::AssetNotFound { .. } => "asset_not_found",
            Self::AssetCorrupt { .. } => "asset_corrupt",
            Self::TemplateAssetMissing { .. } => "template_asset_missing",
            Self::StoreWriteFailed { .. } => "store_write_failed",
            Self::OrderQueryFailed { .. } => "order_query_failed",
            Self::OrderMutationFailed { .. } => "order_mutation_failed",
            Self::InvalidInput(_) => "invalid_input",
            Self::Serialization { .. } => "serialization",
            Self::Internal { .. } => "internal",
        }
    }
}
