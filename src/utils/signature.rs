// Webhook payload signing and verification (HMAC-SHA256, lowercase hex).

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Signs a raw payload with the webhook secret.
///
/// Returns the MAC as lowercase hex, the exact value carried in the
/// `X-Signature` header on outbound deliveries.
pub fn sign(payload: &[u8], secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Verifies a received signature against the raw payload bytes.
///
/// The comparison runs in constant time. Any malformed input (non-hex
/// signature, wrong length) fails verification instead of erroring.
pub fn verify(payload: &[u8], secret: &str, signature: &str) -> bool {
    let expected = match hex::decode(signature) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return false,
    };
    mac.update(payload);

    mac.verify_slice(&expected).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sign_produces_lowercase_hex() {
        let signature = sign(b"{\"event\":\"transaction.created\"}", "secret-key");
        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(signature, signature.to_lowercase());
    }

    #[test]
    fn test_known_vector() {
        // HMAC-SHA256("key", "The quick brown fox jumps over the lazy dog")
        let signature = sign(b"The quick brown fox jumps over the lazy dog", "key");
        assert_eq!(
            signature,
            "f7bc83f430538424b13298e6aa6fb143ef4d59a14946175997479dbc2d1a3cd8"
        );
    }

    #[test]
    fn test_verify_rejects_garbage() {
        assert!(!verify(b"payload", "secret", "not hex at all"));
        assert!(!verify(b"payload", "secret", "deadbeef"));
        assert!(!verify(b"payload", "secret", ""));
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let signature = sign(b"payload", "secret-a");
        assert!(!verify(b"payload", "secret-b", &signature));
    }

    proptest! {
        #[test]
        fn prop_sign_verify_round_trip(payload in proptest::collection::vec(any::<u8>(), 0..512),
                                       secret in "[a-f0-9]{64}") {
            let signature = sign(&payload, &secret);
            prop_assert!(verify(&payload, &secret, &signature));
        }

        #[test]
        fn prop_modified_payload_fails(payload in proptest::collection::vec(any::<u8>(), 1..512),
                                       secret in "[a-f0-9]{64}",
                                       flip in 0usize..512) {
            let signature = sign(&payload, &secret);
            let mut tampered = payload.clone();
            let idx = flip % tampered.len();
            tampered[idx] ^= 0x01;
            prop_assert!(!verify(&tampered, &secret, &signature));
        }
    }
}
