//! Webhook signature verification.
//!
//! The event source signs every delivery with HMAC-SHA256 over the raw
//! request body, base64-encoded into a header. Verification runs on the
//! exact bytes received, before any JSON parsing, and uses a
//! constant-time comparison.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the base64-encoded HMAC-SHA256 digest of the body.
pub const SIGNATURE_HEADER: &str = "x-webhook-hmac-sha256";

/// Verifies a webhook delivery signature.
///
/// Returns `false` for malformed signatures rather than erroring; the
/// caller treats every non-verifying delivery the same way (reject with
/// 401 and no body detail).
#[must_use]
pub fn verify_signature(secret: &str, body: &[u8], signature: &str) -> bool {
    let Ok(provided) = BASE64.decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&provided).is_ok()
}

/// Computes the signature the event source would attach to `body`.
///
/// Used by tests and the local delivery tool; production only verifies.
#[must_use]
pub fn sign(secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(body);
    BASE64.encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_signature_verifies() {
        let body = br##"{"name":"#1001"}"##;
        let signature = sign("secret", body);
        assert!(verify_signature("secret", body, &signature));
    }

    #[test]
    fn signature_over_different_body_is_rejected() {
        let signature = sign("secret", b"original body");
        assert!(!verify_signature("secret", b"tampered body", &signature));
    }

    #[test]
    fn signature_with_wrong_secret_is_rejected() {
        let body = b"body";
        let signature = sign("other-secret", body);
        assert!(!verify_signature("secret", body, &signature));
    }

    #[test]
    fn malformed_base64_is_rejected() {
        assert!(!verify_signature("secret", b"body", "not base64!!!"));
    }

    #[test]
    fn surrounding_whitespace_in_header_is_tolerated() {
        let body = b"body";
        let signature = format!("  {}  ", sign("secret", body));
        assert!(verify_signature("secret", body, &signature));
    }
}
