//! # decal-render
//!
//! The graphic half of the fulfillment pipeline:
//!
//! - **Resolver**: maps a product title and variant descriptor onto a
//!   template bundle key per the versioned naming convention
//! - **Compositor**: overlays a call sign onto a template raster with a
//!   fixed style, centered on both axes
//! - **Repackager**: swaps the templatable raster inside a bundle for the
//!   composited one, carrying every sibling file through unchanged
//!
//! All three are pure with respect to external services: they take bytes
//! and return bytes, so the orchestrator owns all storage interaction.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod compositor;
pub mod repack;
pub mod resolver;

pub use compositor::{Compositor, OverlayStyle};
pub use repack::RepackConfig;
pub use resolver::TemplateNaming;
