//! # decal-api
//!
//! The live ingestion surface: an HTTP server receiving order-creation
//! webhooks, authenticating them by HMAC signature over the raw body,
//! and handing authenticated payloads to the shared fulfillment
//! pipeline. The response is the full order report, returned with 200
//! even when individual items failed; the report carries the failures.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod server;
pub mod signature;

pub use error::{ApiError, ApiResult};
pub use server::{AppState, Server};
pub use signature::{SIGNATURE_HEADER, verify_signature};
