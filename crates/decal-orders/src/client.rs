//! Admin GraphQL client for the order platform.
//!
//! The gateway is a trait so the orchestrator and its tests never touch
//! HTTP: production injects [`AdminClient`], tests inject fakes. Response
//! parsing is split from transport so the mapping onto the inbound
//! contract is unit-testable against fixture JSON.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use decal_core::config::AdminApiConfig;
use decal_core::{Error, Result};

use crate::annotate::{AnnotationReport, AnnotationUpdate};
use crate::contract::{LineItemPayload, LineItemProperty, OrderPayload, numeric_id_tail};

/// Upper bound on line items fetched per order query.
const LINE_ITEM_PAGE_SIZE: u32 = 250;

const ORDER_QUERY: &str = r"
query OrderByName($search: String!, $lineItems: Int!) {
  orders(first: 1, query: $search) {
    edges {
      node {
        id
        name
        note
        tags
        lineItems(first: $lineItems) {
          edges {
            node {
              id
              title
              variantTitle
              customAttributes { key value }
            }
          }
        }
      }
    }
  }
}";

const ANNOTATE_MUTATION: &str = r"
mutation AnnotateOrder($id: ID!, $tags: [String!]!, $input: OrderInput!) {
  tagsAdd(id: $id, tags: $tags) {
    userErrors { field message }
  }
  orderUpdate(input: $input) {
    userErrors { field message }
  }
}";

/// Order-platform operations the pipeline depends on.
#[async_trait]
pub trait OrdersGateway: Send + Sync + 'static {
    /// Looks an order up by its display name (e.g. `#1001`), reshaped
    /// onto the inbound payload contract. `None` if no order matches.
    async fn order_by_name(&self, name: &str) -> Result<Option<OrderPayload>>;

    /// Applies the combined tag-add / note-update mutation.
    ///
    /// Field-level user errors land in the report; only transport-level
    /// failures are returned as errors.
    async fn apply_annotation(&self, update: &AnnotationUpdate) -> Result<AnnotationReport>;
}

/// Production gateway speaking GraphQL to the platform admin endpoint.
pub struct AdminClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
}

impl std::fmt::Debug for AdminClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminClient")
            .field("endpoint", &self.endpoint)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl AdminClient {
    /// Creates a client from admin API configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &AdminApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| Error::internal(format!("building admin HTTP client: {e}")))?;
        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            token: config.token.clone(),
        })
    }

    async fn post_graphql(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> std::result::Result<serde_json::Value, String> {
        let response = self
            .http
            .post(&self.endpoint)
            .header("X-Admin-Access-Token", &self.token)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(|e| format!("sending admin API request: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("admin API returned {status}: {body}"));
        }

        response
            .json()
            .await
            .map_err(|e| format!("parsing admin API response: {e}"))
    }
}

#[async_trait]
impl OrdersGateway for AdminClient {
    async fn order_by_name(&self, name: &str) -> Result<Option<OrderPayload>> {
        let variables = json!({
            "search": format!("name:{name}"),
            "lineItems": LINE_ITEM_PAGE_SIZE,
        });
        let body = self
            .post_graphql(ORDER_QUERY, variables)
            .await
            .map_err(|message| Error::OrderQueryFailed { message })?;
        parse_order_query(&body)
    }

    async fn apply_annotation(&self, update: &AnnotationUpdate) -> Result<AnnotationReport> {
        let variables = json!({
            "id": update.order_id,
            "tags": update.tags_to_add,
            "input": { "id": update.order_id, "note": update.note },
        });
        let body = self
            .post_graphql(ANNOTATE_MUTATION, variables)
            .await
            .map_err(|message| Error::OrderMutationFailed { message })?;
        parse_annotation_response(&body)
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct Connection<T> {
    #[serde(default = "Vec::new")]
    edges: Vec<Edge<T>>,
}

#[derive(Debug, Deserialize)]
struct Edge<T> {
    node: T,
}

#[derive(Debug, Deserialize)]
struct OrdersData {
    orders: Connection<OrderNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderNode {
    id: String,
    name: String,
    note: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    line_items: Connection<LineItemNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LineItemNode {
    id: String,
    title: String,
    variant_title: Option<String>,
    #[serde(default)]
    custom_attributes: Vec<AttributeNode>,
}

#[derive(Debug, Deserialize)]
struct AttributeNode {
    key: String,
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MutationData {
    tags_add: Option<UserErrorsPayload>,
    order_update: Option<UserErrorsPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserErrorsPayload {
    #[serde(default)]
    user_errors: Vec<UserError>,
}

#[derive(Debug, Deserialize)]
struct UserError {
    message: String,
}

fn envelope_data(body: &serde_json::Value, failure: &str) -> std::result::Result<serde_json::Value, String> {
    let envelope: Envelope = serde_json::from_value(body.clone())
        .map_err(|e| format!("{failure}: malformed response envelope: {e}"))?;
    if !envelope.errors.is_empty() {
        let messages: Vec<String> = envelope.errors.into_iter().map(|e| e.message).collect();
        return Err(format!("{failure}: {}", messages.join("; ")));
    }
    envelope
        .data
        .ok_or_else(|| format!("{failure}: response carried no data"))
}

/// Maps an order-query response body onto the inbound payload contract.
///
/// # Errors
///
/// Returns [`Error::OrderQueryFailed`] for GraphQL errors or a malformed
/// response shape.
pub fn parse_order_query(body: &serde_json::Value) -> Result<Option<OrderPayload>> {
    let data = envelope_data(body, "order query")
        .map_err(|message| Error::OrderQueryFailed { message })?;
    let orders: OrdersData =
        serde_json::from_value(data).map_err(|e| Error::OrderQueryFailed {
            message: format!("order query: malformed orders payload: {e}"),
        })?;

    let Some(edge) = orders.orders.edges.into_iter().next() else {
        return Ok(None);
    };
    Ok(Some(order_from_node(edge.node)))
}

fn order_from_node(node: OrderNode) -> OrderPayload {
    let line_items = node
        .line_items
        .edges
        .into_iter()
        .filter_map(|edge| {
            let item = edge.node;
            let Some(id) = numeric_id_tail(&item.id) else {
                tracing::warn!(line_item_gid = %item.id, "line item id has no numeric tail; skipping");
                return None;
            };
            Some(LineItemPayload {
                id,
                title: item.title,
                variant_title: item.variant_title,
                properties: item
                    .custom_attributes
                    .into_iter()
                    .map(|attribute| LineItemProperty {
                        name: attribute.key,
                        value: attribute.value,
                    })
                    .collect(),
            })
        })
        .collect();

    OrderPayload {
        name: node.name,
        note: node.note,
        admin_graphql_api_id: node.id,
        tags: if node.tags.is_empty() {
            None
        } else {
            Some(node.tags.join(", "))
        },
        line_items,
    }
}

/// Maps an annotation-mutation response body onto a field-level report.
///
/// # Errors
///
/// Returns [`Error::OrderMutationFailed`] for GraphQL errors, a malformed
/// response, or an absent mutation field (the platform rejected the
/// operation wholesale).
pub fn parse_annotation_response(body: &serde_json::Value) -> Result<AnnotationReport> {
    let data = envelope_data(body, "order mutation")
        .map_err(|message| Error::OrderMutationFailed { message })?;
    let mutation: MutationData =
        serde_json::from_value(data).map_err(|e| Error::OrderMutationFailed {
            message: format!("order mutation: malformed payload: {e}"),
        })?;

    let tags = mutation.tags_add.ok_or_else(|| Error::OrderMutationFailed {
        message: "order mutation: tagsAdd field absent from response".to_string(),
    })?;
    let note = mutation
        .order_update
        .ok_or_else(|| Error::OrderMutationFailed {
            message: "order mutation: orderUpdate field absent from response".to_string(),
        })?;

    let tag_errors: Vec<String> = tags.user_errors.into_iter().map(|e| e.message).collect();
    let note_errors: Vec<String> = note.user_errors.into_iter().map(|e| e.message).collect();

    Ok(AnnotationReport {
        tags_applied: tag_errors.is_empty(),
        note_applied: note_errors.is_empty(),
        tag_errors,
        note_errors,
    })
}
