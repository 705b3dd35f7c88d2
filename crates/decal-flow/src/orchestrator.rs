//! The fulfillment orchestrator: one order in, one report out.
//!
//! The orchestrator never returns an error for an order it was able to
//! look at. Item failures are contained to the item, annotation failures
//! are contained to the order, and everything that happened is carried
//! out through the [`OrderReport`].
//!
//! Idempotency lives here, not in the ingestion adapters: any order that
//! already carries the marker tag is skipped before rendering or storage
//! work starts, so webhook redelivery and replay overlap are both safe.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use futures::StreamExt;
use tracing::Instrument;

use decal_core::observability::{item_span, order_span};
use decal_core::storage::BucketClass;
use decal_core::{Error, ObjectStore, design_artifact_key};
use decal_orders::contract::CustomizationRequest;
use decal_orders::{
    AnnotationUpdate, OrderPayload, OrdersGateway, ResultLink, compose_note, derive_tags,
    has_marker,
};
use decal_render::{Compositor, RepackConfig, TemplateNaming};

use crate::metrics;
use crate::report::{
    AnnotationOutcome, ItemOutcome, ItemReport, ItemStage, OrderDisposition, OrderReport,
};

/// Content type stored alongside every design artifact.
const ARTIFACT_CONTENT_TYPE: &str = "application/zip";

/// Fixed pipeline policy, set once at startup.
#[derive(Debug, Clone, Default)]
pub struct FulfillmentSettings {
    /// Template key naming convention.
    pub naming: TemplateNaming,
    /// Bundle repackaging convention.
    pub repack: RepackConfig,
    /// When true, the marker-tag idempotency check is bypassed and
    /// already-fulfilled orders are processed again. Operator escape
    /// hatch for regenerating artifacts; off by default.
    pub annotate_processed: bool,
}

/// Per-run options supplied by the ingestion adapter.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Extra tags appended to the derived tag set (e.g. the replay tag).
    pub extra_tags: Vec<String>,
    /// Maximum line items rendered concurrently. `1` (the default) is
    /// strictly sequential; higher values overlap item work while still
    /// reporting results in original line-item order.
    pub item_parallelism: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            extra_tags: Vec::new(),
            item_parallelism: 1,
        }
    }
}

/// The per-order fulfillment pipeline.
///
/// Shared by the live webhook and the batch replay runner; both hand it
/// the same payload contract and receive the same report shape.
pub struct Fulfillment {
    store: Arc<dyn ObjectStore>,
    orders: Arc<dyn OrdersGateway>,
    compositor: Compositor,
    settings: FulfillmentSettings,
}

impl std::fmt::Debug for Fulfillment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fulfillment")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Fulfillment {
    /// Assembles the pipeline from its collaborators.
    pub fn new(
        store: Arc<dyn ObjectStore>,
        orders: Arc<dyn OrdersGateway>,
        compositor: Compositor,
        settings: FulfillmentSettings,
    ) -> Self {
        Self {
            store,
            orders,
            compositor,
            settings,
        }
    }

    /// Runs the pipeline over one order.
    ///
    /// Always returns a report; failures are contained and recorded
    /// rather than propagated.
    pub async fn process(&self, payload: &OrderPayload, options: &RunOptions) -> OrderReport {
        self.process_inner(payload, options)
            .instrument(order_span("fulfill", &payload.name))
            .await
    }

    async fn process_inner(&self, payload: &OrderPayload, options: &RunOptions) -> OrderReport {
        if !self.settings.annotate_processed && has_marker(&payload.tag_list()) {
            tracing::info!("order already carries the marker tag, skipping");
            metrics::record_order(OrderDisposition::AlreadyFulfilled.label());
            return OrderReport::skipped(&payload.name, OrderDisposition::AlreadyFulfilled);
        }

        let customizations = payload.customizations();
        if customizations.is_empty() {
            tracing::info!("order has no customizable items, leaving untouched");
            metrics::record_order(OrderDisposition::NoCustomItems.label());
            return OrderReport::skipped(&payload.name, OrderDisposition::NoCustomItems);
        }

        let items = self
            .process_items(&payload.name, customizations.clone(), options.item_parallelism)
            .await;

        let links: Vec<ResultLink> = items
            .iter()
            .filter_map(|item| match &item.outcome {
                ItemOutcome::Fulfilled { link } => Some(link.clone()),
                ItemOutcome::Failed { .. } => None,
            })
            .collect();

        if links.is_empty() {
            tracing::warn!(
                items = items.len(),
                "no artifacts produced, order left unannotated for replay"
            );
            metrics::record_order(OrderDisposition::NothingFulfilled.label());
            return OrderReport {
                order_name: payload.name.clone(),
                disposition: OrderDisposition::NothingFulfilled,
                items,
                annotation: None,
            };
        }

        let annotation = self
            .annotate(payload, &customizations, &items, &links, &options.extra_tags)
            .await;

        tracing::info!(
            fulfilled = links.len(),
            failed = items.len() - links.len(),
            "order fulfilled"
        );
        metrics::record_order(OrderDisposition::Annotated.label());
        OrderReport {
            order_name: payload.name.clone(),
            disposition: OrderDisposition::Annotated,
            items,
            annotation: Some(annotation),
        }
    }

    /// Runs item fulfillment, reporting results in original item order
    /// regardless of the configured parallelism.
    async fn process_items(
        &self,
        order_name: &str,
        requests: Vec<CustomizationRequest>,
        parallelism: usize,
    ) -> Vec<ItemReport> {
        let total = requests.len();

        if parallelism <= 1 {
            let mut reports = Vec::with_capacity(total);
            for (position, request) in requests.into_iter().enumerate() {
                reports.push(
                    self.process_item(order_name, position + 1, total, request)
                        .await,
                );
            }
            return reports;
        }

        // `buffered` polls up to `parallelism` item futures at once and
        // yields results in submission order, which is line-item order.
        futures::stream::iter(
            requests
                .into_iter()
                .enumerate()
                .map(|(position, request)| {
                    self.process_item(order_name, position + 1, total, request)
                }),
        )
        .buffered(parallelism)
        .collect()
        .await
    }

    async fn process_item(
        &self,
        order_name: &str,
        index: usize,
        total: usize,
        request: CustomizationRequest,
    ) -> ItemReport {
        let span = item_span(order_name, request.line_item_id);
        self.process_item_inner(order_name, index, total, request)
            .instrument(span)
            .await
    }

    async fn process_item_inner(
        &self,
        order_name: &str,
        index: usize,
        total: usize,
        request: CustomizationRequest,
    ) -> ItemReport {
        let template_key = self
            .settings
            .naming
            .resolve(&request.title, request.variant_title.as_deref());

        let bundle = match self.store.fetch(BucketClass::Templates, &template_key).await {
            Ok(bundle) => bundle,
            Err(err) => return Self::item_failed(&request, &template_key, ItemStage::Fetch, &err),
        };

        let template_raster = match self.settings.repack.extract_template(&bundle) {
            Ok(raster) => raster,
            Err(err) => return Self::item_failed(&request, &template_key, ItemStage::Repack, &err),
        };

        let composited = match self.compositor.compose(&template_raster, &request.call_sign) {
            Ok(raster) => raster,
            Err(err) => {
                return Self::item_failed(&request, &template_key, ItemStage::Compose, &err);
            }
        };

        let repacked = match self.settings.repack.repack(&bundle, &composited) {
            Ok(archive) => archive,
            Err(err) => return Self::item_failed(&request, &template_key, ItemStage::Repack, &err),
        };

        let artifact_key = design_artifact_key(order_name, request.line_item_id, Utc::now());
        let artifact_len = repacked.len();
        let url = match self
            .store
            .put(
                BucketClass::Designs,
                &artifact_key,
                Bytes::from(repacked),
                ARTIFACT_CONTENT_TYPE,
            )
            .await
        {
            Ok(url) => url,
            Err(err) => return Self::item_failed(&request, &template_key, ItemStage::Store, &err),
        };

        tracing::info!(
            template_key = %template_key,
            artifact_key = %artifact_key,
            bytes = artifact_len,
            "item fulfilled"
        );
        metrics::record_item_fulfilled(artifact_len);

        ItemReport {
            line_item_id: request.line_item_id,
            call_sign: request.call_sign,
            template_key,
            outcome: ItemOutcome::Fulfilled {
                link: ResultLink {
                    order_name: order_name.to_string(),
                    item_index: index,
                    total_items: total,
                    url,
                },
            },
        }
    }

    fn item_failed(
        request: &CustomizationRequest,
        template_key: &str,
        stage: ItemStage,
        err: &Error,
    ) -> ItemReport {
        tracing::warn!(
            template_key = %template_key,
            stage = stage.label(),
            error = %err,
            "item failed, continuing with siblings"
        );
        metrics::record_item_failure(stage.label());
        ItemReport {
            line_item_id: request.line_item_id,
            call_sign: request.call_sign.clone(),
            template_key: template_key.to_string(),
            outcome: ItemOutcome::Failed {
                stage,
                reason: err.to_string(),
            },
        }
    }

    /// Applies the single combined annotation for an order.
    ///
    /// Tags are derived from the customizations that actually produced an
    /// artifact, so a partially fulfilled order is tagged only for what
    /// shipped.
    async fn annotate(
        &self,
        payload: &OrderPayload,
        customizations: &[CustomizationRequest],
        items: &[ItemReport],
        links: &[ResultLink],
        extra_tags: &[String],
    ) -> AnnotationOutcome {
        let fulfilled: Vec<CustomizationRequest> = customizations
            .iter()
            .zip(items)
            .filter(|(_, item)| matches!(item.outcome, ItemOutcome::Fulfilled { .. }))
            .map(|(customization, _)| customization.clone())
            .collect();

        let update = AnnotationUpdate {
            order_id: payload.admin_graphql_api_id.clone(),
            tags_to_add: derive_tags(&fulfilled, extra_tags),
            note: compose_note(payload.note.as_deref(), links),
        };

        match self.orders.apply_annotation(&update).await {
            Ok(report) => {
                if !report.tags_applied {
                    tracing::warn!(errors = ?report.tag_errors, "tag annotation rejected");
                    metrics::record_annotation_failure("field");
                }
                if !report.note_applied {
                    tracing::warn!(errors = ?report.note_errors, "note annotation rejected");
                    metrics::record_annotation_failure("field");
                }
                AnnotationOutcome::Applied { report }
            }
            Err(err) => {
                tracing::warn!(error = %err, "annotation mutation failed at transport level");
                metrics::record_annotation_failure("transport");
                AnnotationOutcome::TransportFailed {
                    reason: err.to_string(),
                }
            }
        }
    }
}
