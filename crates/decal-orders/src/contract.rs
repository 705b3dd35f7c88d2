//! The inbound order payload contract.
//!
//! This is the shape the live webhook delivers; the replay path reshapes
//! order-query results into the same contract before reuse, so the
//! orchestrator only ever sees one input type.

use serde::{Deserialize, Serialize};

/// Line-item property key marking a customizable item.
pub const CALL_SIGN_PROPERTY: &str = "call_sign";

/// One order as delivered by the event source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPayload {
    /// Human order number (e.g. `#1001`).
    pub name: String,
    /// Free-text note currently on the order.
    #[serde(default)]
    pub note: Option<String>,
    /// Admin API identifier used for mutations.
    pub admin_graphql_api_id: String,
    /// Comma-separated tag list as delivered by the event source.
    #[serde(default)]
    pub tags: Option<String>,
    /// Purchased line items, in the order the customer sees.
    #[serde(default)]
    pub line_items: Vec<LineItemPayload>,
}

/// One purchased line item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItemPayload {
    /// Numeric line-item identifier.
    pub id: u64,
    /// Product title.
    pub title: String,
    /// Variant descriptor (e.g. `White / L`).
    #[serde(default)]
    pub variant_title: Option<String>,
    /// Customer-facing key/value properties.
    #[serde(default)]
    pub properties: Vec<LineItemProperty>,
}

/// A line-item key/value property.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItemProperty {
    /// Property key.
    pub name: String,
    /// Property value; absent and empty are equivalent.
    #[serde(default)]
    pub value: Option<String>,
}

/// A customization extracted from one line item.
///
/// Derived, never stored: one per customizable line item per order,
/// scoped to a single pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomizationRequest {
    /// The originating line-item id.
    pub line_item_id: u64,
    /// Product title, input to template resolution.
    pub title: String,
    /// Variant descriptor, input to light/dark selection.
    pub variant_title: Option<String>,
    /// The customer-supplied call sign to overlay.
    pub call_sign: String,
}

impl LineItemPayload {
    /// Returns the call sign if this item is customizable.
    ///
    /// An item is customizable iff it carries a `call_sign` property with
    /// a non-empty value.
    #[must_use]
    pub fn call_sign(&self) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.name == CALL_SIGN_PROPERTY)
            .and_then(|p| p.value.as_deref())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

impl OrderPayload {
    /// Extracts all customization requests, preserving line-item order.
    #[must_use]
    pub fn customizations(&self) -> Vec<CustomizationRequest> {
        self.line_items
            .iter()
            .filter_map(|item| {
                item.call_sign().map(|call_sign| CustomizationRequest {
                    line_item_id: item.id,
                    title: item.title.clone(),
                    variant_title: item.variant_title.clone(),
                    call_sign: call_sign.to_string(),
                })
            })
            .collect()
    }

    /// Parses the comma-separated tag field into individual tags.
    #[must_use]
    pub fn tag_list(&self) -> Vec<String> {
        self.tags
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Extracts the trailing numeric segment of an opaque admin identifier
/// (e.g. `gid://platform/LineItem/447783` → `447783`).
#[must_use]
pub fn numeric_id_tail(gid: &str) -> Option<u64> {
    let digits: String = gid
        .chars()
        .rev()
        .take_while(char::is_ascii_digit)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if digits.is_empty() {
        None
    } else {
        digits.parse().ok()
    }
}
