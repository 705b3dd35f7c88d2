//! Design artifact addressing.
//!
//! Artifact keys embed the order name, line-item id, and a creation
//! timestamp so that redelivered events can never collide with an earlier
//! write. The public URL is deterministic and byte-for-byte reconstructible
//! from bucket, region, and key, matching exactly what gets recorded in the
//! order note.

use chrono::{DateTime, Utc};

/// A fully-addressed stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLocation {
    /// Bucket name.
    pub bucket: String,
    /// Storage region.
    pub region: String,
    /// Object key within the bucket.
    pub key: String,
}

impl ArtifactLocation {
    /// Returns the deterministic public URL for this location.
    #[must_use]
    pub fn url(&self) -> String {
        format!(
            "https://{}.s3.{}.amazonaws.com/{}",
            self.bucket, self.region, self.key
        )
    }
}

/// Computes the store key for one design artifact.
///
/// The leading `#` of the display order name is dropped (it is not a
/// valid first character for a path segment in every store). The
/// timestamp guarantees key uniqueness under at-least-once delivery.
#[must_use]
pub fn design_artifact_key(
    order_name: &str,
    line_item_id: u64,
    created_at: DateTime<Utc>,
) -> String {
    let order_segment = order_name.trim_start_matches('#');
    format!(
        "{order_segment}/{line_item_id}-{}.zip",
        created_at.timestamp_millis()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn url_is_reconstructible_byte_for_byte() {
        let location = ArtifactLocation {
            bucket: "decal-designs".to_string(),
            region: "us-east-1".to_string(),
            key: "1001/42-1700000000000.zip".to_string(),
        };
        assert_eq!(
            location.url(),
            "https://decal-designs.s3.us-east-1.amazonaws.com/1001/42-1700000000000.zip"
        );
    }

    #[test]
    fn key_strips_leading_hash_and_embeds_timestamp() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        assert_eq!(
            design_artifact_key("#1001", 42, at),
            "1001/42-1700000000000.zip"
        );
    }

    #[test]
    fn keys_differ_across_retries_with_new_timestamps() {
        let first = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let second = Utc.timestamp_millis_opt(1_700_000_000_001).unwrap();
        assert_ne!(
            design_artifact_key("#1001", 42, first),
            design_artifact_key("#1001", 42, second)
        );
    }
}
