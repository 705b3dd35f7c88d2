//! Webhook endpoint tests over an in-memory pipeline.

use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use bytes::Bytes;
use tower::ServiceExt;

use decal_api::server::Server;
use decal_api::signature::{SIGNATURE_HEADER, sign};
use decal_core::config::StorageConfig;
use decal_core::storage::{BucketClass, Buckets, MemoryStore};
use decal_core::{Config, Result};
use decal_flow::{Fulfillment, FulfillmentSettings};
use decal_orders::{AnnotationReport, AnnotationUpdate, OrderPayload, OrdersGateway};
use decal_render::{Compositor, OverlayStyle};

const SECRET: &str = "test-webhook-secret";

#[derive(Default)]
struct RecordingOrders {
    orders: Mutex<HashMap<String, OrderPayload>>,
    updates: Mutex<Vec<AnnotationUpdate>>,
}

#[async_trait]
impl OrdersGateway for RecordingOrders {
    async fn order_by_name(&self, name: &str) -> Result<Option<OrderPayload>> {
        Ok(self.orders.lock().expect("orders lock").get(name).cloned())
    }

    async fn apply_annotation(&self, update: &AnnotationUpdate) -> Result<AnnotationReport> {
        self.updates.lock().expect("updates lock").push(update.clone());
        Ok(AnnotationReport {
            tags_applied: true,
            note_applied: true,
            ..AnnotationReport::default()
        })
    }
}

fn template_bundle() -> Bytes {
    let img = image::RgbaImage::from_pixel(512, 256, image::Rgba([255, 255, 255, 255]));
    let mut raster = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut raster, image::ImageFormat::Png)
        .expect("encode template raster");

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    writer
        .start_file("template.png", options)
        .expect("start template entry");
    writer
        .write_all(&raster.into_inner())
        .expect("write template entry");
    Bytes::from(writer.finish().expect("finish bundle").into_inner())
}

fn test_server() -> (Server, Arc<MemoryStore>, Arc<RecordingOrders>) {
    let store = Arc::new(MemoryStore::new(Buckets::new(&StorageConfig::default())));
    store.seed(
        BucketClass::Templates,
        "CLASSIC_CAP_FOR_LIGHT.zip",
        template_bundle(),
    );
    let orders = Arc::new(RecordingOrders::default());

    let fulfillment = Arc::new(Fulfillment::new(
        store.clone(),
        orders.clone(),
        Compositor::new(OverlayStyle::default()).expect("built-in font should parse"),
        FulfillmentSettings::default(),
    ));

    let config = Config {
        webhook_secret: Some(SECRET.to_string()),
        ..Config::default()
    };
    (
        Server::new(config, fulfillment, store.clone()),
        store,
        orders,
    )
}

fn order_body() -> Vec<u8> {
    serde_json::json!({
        "name": "#1001",
        "admin_graphql_api_id": "gid://platform/Order/987",
        "line_items": [{
            "id": 447_783,
            "title": "Classic Cap",
            "variant_title": "White / L",
            "properties": [{"name": "call_sign", "value": "N1ABC"}]
        }]
    })
    .to_string()
    .into_bytes()
}

fn delivery(body: Vec<u8>, signature: Option<String>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/webhooks/orders/create")
        .header("content-type", "application/json");
    if let Some(signature) = signature {
        builder = builder.header(SIGNATURE_HEADER, signature);
    }
    builder.body(Body::from(body)).expect("build request")
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

#[tokio::test]
async fn signed_delivery_is_fulfilled_and_reported() {
    let (server, store, orders) = test_server();
    let body = order_body();
    let signature = sign(SECRET, &body);

    let response = server
        .test_router()
        .oneshot(delivery(body, Some(signature)))
        .await
        .expect("request should complete");

    assert_eq!(response.status(), StatusCode::OK);
    let report = json_body(response).await;
    assert_eq!(report["disposition"], "annotated");
    assert_eq!(report["order_name"], "#1001");

    assert_eq!(store.keys(BucketClass::Designs).len(), 1);
    assert_eq!(orders.updates.lock().expect("updates lock").len(), 1);
}

#[tokio::test]
async fn missing_signature_is_unauthorized() {
    let (server, store, _) = test_server();

    let response = server
        .test_router()
        .oneshot(delivery(order_body(), None))
        .await
        .expect("request should complete");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["code"], "MISSING_SIGNATURE");
    assert!(store.keys(BucketClass::Designs).is_empty());
}

#[tokio::test]
async fn tampered_body_is_unauthorized() {
    let (server, store, _) = test_server();
    let signature = sign(SECRET, &order_body());
    let mut tampered = order_body();
    tampered[0] = b' ';

    let response = server
        .test_router()
        .oneshot(delivery(tampered, Some(signature)))
        .await
        .expect("request should complete");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["code"], "INVALID_SIGNATURE");
    assert!(store.keys(BucketClass::Designs).is_empty());
}

#[tokio::test]
async fn signed_but_malformed_payload_is_bad_request() {
    let (server, _, _) = test_server();
    let body = b"not json at all".to_vec();
    let signature = sign(SECRET, &body);

    let response = server
        .test_router()
        .oneshot(delivery(body, Some(signature)))
        .await
        .expect("request should complete");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn contained_item_failures_still_return_ok() {
    let (server, store, orders) = test_server();
    // An order whose template bundle was never uploaded.
    let body = serde_json::json!({
        "name": "#1002",
        "admin_graphql_api_id": "gid://platform/Order/988",
        "line_items": [{
            "id": 1,
            "title": "Unstocked Cap",
            "variant_title": "White / L",
            "properties": [{"name": "call_sign", "value": "N1ABC"}]
        }]
    })
    .to_string()
    .into_bytes();
    let signature = sign(SECRET, &body);

    let response = server
        .test_router()
        .oneshot(delivery(body, Some(signature)))
        .await
        .expect("request should complete");

    assert_eq!(response.status(), StatusCode::OK);
    let report = json_body(response).await;
    assert_eq!(report["disposition"], "nothing_fulfilled");
    assert!(store.keys(BucketClass::Designs).is_empty());
    assert!(orders.updates.lock().expect("updates lock").is_empty());
}

#[tokio::test]
async fn health_and_ready_respond() {
    let (server, _, _) = test_server();
    let router = server.test_router();

    let health = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("health request");
    assert_eq!(health.status(), StatusCode::OK);

    let ready = router
        .oneshot(
            Request::builder()
                .uri("/ready")
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("ready request");
    assert_eq!(ready.status(), StatusCode::OK);
    let body = json_body(ready).await;
    assert_eq!(body["ready"], true);
}
