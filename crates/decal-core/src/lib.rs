//! # decal-core
//!
//! Core abstractions for the Decal customization fulfillment pipeline.
//!
//! This crate provides the foundational types shared by all Decal components:
//!
//! - **Error Types**: The pipeline-wide error taxonomy and result alias
//! - **Configuration**: Environment-driven runtime configuration
//! - **Storage Gateway**: The object-store trait plus memory and S3 backends
//! - **Artifact Addressing**: Design artifact keys and public URLs
//! - **Observability**: Logging initialization and span helpers
//!
//! ## Crate Boundary
//!
//! `decal-core` is the only crate allowed to define shared primitives. The
//! rendering, order-platform, and orchestration crates all depend on it and
//! never on each other's internals.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod artifact;
pub mod config;
pub mod error;
pub mod observability;
pub mod storage;

pub use artifact::{ArtifactLocation, design_artifact_key};
pub use config::Config;
pub use error::{Error, Result};
pub use observability::{LogFormat, init_logging};
pub use storage::{BucketClass, Buckets, MemoryStore, ObjectStore, S3Store};
