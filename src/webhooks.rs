//! Storefront webhook signature verification.
//!
//! The platform signs each webhook with an HMAC-SHA256 over the exact raw
//! request body, base64-encoded, carried in the X-Shopify-Hmac-Sha256
//! header. Verification failures are indistinguishable to the caller:
//! missing header, missing configured secret and digest mismatch all yield
//! `false`, and the comparison is constant-time.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

/// Verify a webhook signature over the raw body bytes.
pub fn verify_signature(body: &[u8], signature: Option<&str>, secret: Option<&str>) -> bool {
    let Some(signature) = signature else {
        warn!("webhook received without signature header");
        return false;
    };
    let Some(secret) = secret.filter(|s| !s.is_empty()) else {
        warn!("webhook secret not configured");
        return false;
    };

    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(body);
    let computed = BASE64.encode(mac.finalize().into_bytes());

    secure_eq(computed.as_bytes(), signature.trim().as_bytes())
}

/// Constant-time byte comparison; never short-circuits on the first
/// differing byte.
pub fn secure_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter()
        .zip(b.iter())
        .fold(0_u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(body: &[u8], secret: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac accepts any key");
        mac.update(body);
        BASE64.encode(mac.finalize().into_bytes())
    }

    #[test]
    fn correct_signature_over_exact_bytes_verifies() {
        let body = br#"{"shop_domain":"acme.example-shops.com"}"#;
        let signature = sign(body, "shhh");
        assert!(verify_signature(body, Some(&signature), Some("shhh")));
    }

    #[test]
    fn mutated_body_fails_verification() {
        let body = br#"{"shop_domain":"acme.example-shops.com"}"#;
        let signature = sign(body, "shhh");
        let mut mutated = body.to_vec();
        mutated[0] ^= 0x01;
        assert!(!verify_signature(&mutated, Some(&signature), Some("shhh")));
    }

    #[test]
    fn mutated_signature_fails_verification() {
        let body = br#"{"shop_domain":"acme.example-shops.com"}"#;
        let mut signature = sign(body, "shhh").into_bytes();
        signature[0] = if signature[0] == b'A' { b'B' } else { b'A' };
        let signature = String::from_utf8(signature).expect("still utf8");
        assert!(!verify_signature(body, Some(&signature), Some("shhh")));
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let body = br#"{"shop_domain":"acme.example-shops.com"}"#;
        let signature = sign(body, "shhh");
        assert!(!verify_signature(body, Some(&signature), Some("hhhs")));
    }

    #[test]
    fn missing_signature_header_is_false() {
        assert!(!verify_signature(b"body", None, Some("shhh")));
    }

    #[test]
    fn missing_or_empty_secret_is_false() {
        let body = b"body";
        let signature = sign(body, "shhh");
        assert!(!verify_signature(body, Some(&signature), None));
        assert!(!verify_signature(body, Some(&signature), Some("")));
    }

    #[test]
    fn secure_eq_behaves_correctly() {
        assert!(secure_eq(b"abc", b"abc"));
        assert!(!secure_eq(b"abc", b"abd"));
        assert!(!secure_eq(b"abc", b"ab"));
    }
}
