//! # decal-orders
//!
//! Order-platform integration for the fulfillment pipeline:
//!
//! - **Contract**: the inbound order payload shape shared by the live
//!   webhook and the replay path, plus customization extraction
//! - **Client**: the admin GraphQL gateway (order query, combined
//!   tag-add/note-update mutation) behind an injectable trait
//! - **Annotator**: note composition, tag derivation, and the marker-tag
//!   idempotency predicate
//!
//! The platform owns orders; this crate only reads them and appends.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod annotate;
pub mod client;
pub mod contract;

pub use annotate::{
    AnnotationReport, AnnotationUpdate, MARKER_TAG, ResultLink, compose_note, derive_tags,
    has_marker,
};
pub use client::{AdminClient, OrdersGateway};
pub use contract::{
    CALL_SIGN_PROPERTY, CustomizationRequest, LineItemPayload, LineItemProperty, OrderPayload,
};
