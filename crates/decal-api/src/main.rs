//! `decal-api` binary entrypoint.
//!
//! Loads configuration from environment variables, assembles the
//! fulfillment pipeline over S3-backed storage, and starts the webhook
//! server.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

use std::sync::Arc;

use anyhow::Result;

use decal_api::server::Server;
use decal_core::{Config, ObjectStore, S3Store, init_logging};
use decal_flow::{Fulfillment, FulfillmentSettings};
use decal_orders::AdminClient;
use decal_render::{Compositor, OverlayStyle};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    config.validate_for_server()?;
    config.validate_for_admin_api()?;

    init_logging(config.log_format);

    let store: Arc<dyn ObjectStore> = Arc::new(S3Store::new(&config.storage)?);
    let orders = Arc::new(AdminClient::new(&config.admin)?);
    let compositor = Compositor::new(OverlayStyle::default())?;

    let fulfillment = Arc::new(Fulfillment::new(
        Arc::clone(&store),
        orders,
        compositor,
        FulfillmentSettings::default(),
    ));

    let server = Server::new(config, fulfillment, store);
    server.serve().await?;
    Ok(())
}
