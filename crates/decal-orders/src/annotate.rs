//! Order annotation: note composition, tag derivation, marker gating.
//!
//! Annotation is the only mutation this system performs against the order
//! platform. The marker tag (`has_custom_design`) doubles as the
//! idempotency guard: a tagged order is considered fulfilled and is
//! skipped by anything honoring the guard.

use serde::{Deserialize, Serialize};

use crate::contract::CustomizationRequest;

/// Tag signifying "already fulfilled by this pipeline".
pub const MARKER_TAG: &str = "has_custom_design";

/// One finished artifact, positioned within its order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultLink {
    /// Human order number.
    pub order_name: String,
    /// 1-based index among the order's customizable items, in original
    /// line-item order.
    pub item_index: usize,
    /// Total customizable items in the order.
    pub total_items: usize,
    /// Public artifact URL, byte-for-byte as stored.
    pub url: String,
}

impl ResultLink {
    /// Formats the note line for this link.
    ///
    /// Single-item orders omit the redundant `index/total` counter; this
    /// asymmetry is intentional and relied on by operators reading notes.
    #[must_use]
    pub fn note_line(&self) -> String {
        if self.total_items > 1 {
            format!(
                "{}-{}/{}-{};",
                self.order_name, self.item_index, self.total_items, self.url
            )
        } else {
            format!("{}-{};", self.order_name, self.url)
        }
    }
}

/// The combined mutation applied to one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationUpdate {
    /// Admin API order identifier.
    pub order_id: String,
    /// Tags to add (marker, derived classification, caller extras).
    pub tags_to_add: Vec<String>,
    /// Full replacement note (existing note plus appendix).
    pub note: String,
}

/// Field-level outcome of one annotation mutation.
///
/// Partial application (tags succeed, note fails, or vice versa) is
/// surfaced here rather than merged into a single success/failure, so
/// callers and tests can see exactly what landed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationReport {
    /// Whether the tag-add field applied cleanly.
    pub tags_applied: bool,
    /// Whether the note-update field applied cleanly.
    pub note_applied: bool,
    /// User errors reported for the tag-add field.
    pub tag_errors: Vec<String>,
    /// User errors reported for the note-update field.
    pub note_errors: Vec<String>,
}

impl AnnotationReport {
    /// True when both fields applied without user errors.
    #[must_use]
    pub fn fully_applied(&self) -> bool {
        self.tags_applied && self.note_applied
    }
}

/// Composes the replacement note: the existing note (if any), a newline
/// separator, then one line per result link in item order.
#[must_use]
pub fn compose_note(existing: Option<&str>, links: &[ResultLink]) -> String {
    let appendix = links
        .iter()
        .map(ResultLink::note_line)
        .collect::<Vec<_>>()
        .join("\n");

    match existing.map(str::trim).filter(|n| !n.is_empty()) {
        Some(note) => format!("{note}\n{appendix}"),
        None => appendix,
    }
}

/// Derives the tag set for an order: the marker tag, one classification
/// tag per customization, and any caller-supplied extras. Deduplicated,
/// marker first, the rest in derivation order.
#[must_use]
pub fn derive_tags(customizations: &[CustomizationRequest], extra_tags: &[String]) -> Vec<String> {
    let mut tags = vec![MARKER_TAG.to_string()];
    for customization in customizations {
        tags.push(classification_tag(customization));
    }
    tags.extend(extra_tags.iter().cloned());

    let mut seen = std::collections::HashSet::new();
    tags.retain(|tag| seen.insert(tag.to_ascii_lowercase()));
    tags
}

/// Returns true if the marker tag is present (case-insensitive, as the
/// order platform treats tags).
#[must_use]
pub fn has_marker(tags: &[String]) -> bool {
    tags.iter().any(|tag| tag.eq_ignore_ascii_case(MARKER_TAG))
}

/// One tag per customization, encoding call sign and variant descriptor
/// (e.g. `N1ABC-White-L`).
fn classification_tag(customization: &CustomizationRequest) -> String {
    match customization.variant_title.as_deref() {
        Some(variant) => {
            let variant_part = variant
                .split('/')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .collect::<Vec<_>>()
                .join("-");
            format!("{}-{variant_part}", customization.call_sign)
        }
        None => customization.call_sign.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(index: usize, total: usize) -> ResultLink {
        ResultLink {
            order_name: "#1001".to_string(),
            item_index: index,
            total_items: total,
            url: format!("https://designs.example/{index}.zip"),
        }
    }

    fn customization(call_sign: &str, variant: Option<&str>) -> CustomizationRequest {
        CustomizationRequest {
            line_item_id: 1,
            title: "Classic Cap".to_string(),
            variant_title: variant.map(str::to_string),
            call_sign: call_sign.to_string(),
        }
    }

    #[test]
    fn single_item_line_omits_counter() {
        assert_eq!(
            link(1, 1).note_line(),
            "#1001-https://designs.example/1.zip;"
        );
    }

    #[test]
    fn multi_item_lines_carry_index_over_total() {
        assert_eq!(
            link(2, 3).note_line(),
            "#1001-2/3-https://designs.example/2.zip;"
        );
    }

    #[test]
    fn compose_note_appends_to_existing_note() {
        let note = compose_note(Some("leave at door"), &[link(1, 1)]);
        assert_eq!(
            note,
            "leave at door\n#1001-https://designs.example/1.zip;"
        );
    }

    #[test]
    fn compose_note_without_existing_note_is_just_the_appendix() {
        let note = compose_note(None, &[link(1, 2), link(2, 2)]);
        assert_eq!(
            note,
            "#1001-1/2-https://designs.example/1.zip;\n#1001-2/2-https://designs.example/2.zip;"
        );
    }

    #[test]
    fn blank_existing_note_is_treated_as_absent() {
        let note = compose_note(Some("   "), &[link(1, 1)]);
        assert_eq!(note, "#1001-https://designs.example/1.zip;");
    }

    #[test]
    fn derived_tags_start_with_marker_and_encode_customizations() {
        let tags = derive_tags(
            &[
                customization("N1ABC", Some("White / L")),
                customization("N2XYZ", None),
            ],
            &[],
        );
        assert_eq!(tags, vec!["has_custom_design", "N1ABC-White-L", "N2XYZ"]);
    }

    #[test]
    fn extra_tags_are_appended_and_deduplicated() {
        let tags = derive_tags(
            &[customization("N1ABC", Some("White / L"))],
            &["design_replay".to_string(), "HAS_CUSTOM_DESIGN".to_string()],
        );
        assert_eq!(
            tags,
            vec!["has_custom_design", "N1ABC-White-L", "design_replay"]
        );
    }

    #[test]
    fn marker_detection_is_case_insensitive() {
        assert!(has_marker(&["Has_Custom_Design".to_string()]));
        assert!(!has_marker(&["vip".to_string()]));
        assert!(!has_marker(&[]));
    }

    #[test]
    fn partial_application_is_not_fully_applied() {
        let report = AnnotationReport {
            tags_applied: true,
            note_applied: false,
            tag_errors: vec![],
            note_errors: vec!["note too long".to_string()],
        };
        assert!(!report.fully_applied());
    }
}
