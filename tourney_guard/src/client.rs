//! Client identification from connection metadata.
//!
//! Handlers fingerprint a requester by hashing the forwarded IP and the
//! User-Agent header into a short opaque token. The guard never looks inside
//! the token; any stable string works as a map key.

use sha2::{Digest, Sha256};

/// Length of the derived identifier in hex characters.
const CLIENT_ID_LEN: usize = 16;

/// Derive an opaque client identifier from an IP and a User-Agent value.
///
/// Absent headers arrive as empty strings and still hash to a stable token.
pub fn derive_client_id(ip: &str, user_agent: &str) -> String {
    let digest = Sha256::digest(format!("{}:{}", ip, user_agent).as_bytes());
    let mut id = hex::encode(digest);
    id.truncate(CLIENT_ID_LEN);
    id
}

/// First hop of an `X-Forwarded-For` header value.
///
/// Intermediate proxies append their own address to the right; the left-most
/// entry names the client.
pub fn forwarded_client_ip(forwarded_for: &str) -> &str {
    forwarded_for.split(',').next().unwrap_or_default().trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_id_is_stable_and_short() {
        let id = derive_client_id("203.0.113.7", "Mozilla/5.0");
        assert_eq!(id.len(), CLIENT_ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(id, derive_client_id("203.0.113.7", "Mozilla/5.0"));
    }

    #[test]
    fn test_client_id_varies_with_inputs() {
        let base = derive_client_id("203.0.113.7", "Mozilla/5.0");
        assert_ne!(base, derive_client_id("203.0.113.8", "Mozilla/5.0"));
        assert_ne!(base, derive_client_id("203.0.113.7", "curl/8.0"));
    }

    #[test]
    fn test_client_id_tolerates_missing_headers() {
        let id = derive_client_id("", "");
        assert_eq!(id.len(), CLIENT_ID_LEN);
    }

    #[test]
    fn test_forwarded_client_ip_takes_first_hop() {
        assert_eq!(
            forwarded_client_ip("203.0.113.7, 198.51.100.2, 10.0.0.1"),
            "203.0.113.7"
        );
        assert_eq!(forwarded_client_ip(" 203.0.113.7 "), "203.0.113.7");
        assert_eq!(forwarded_client_ip(""), "");
    }
}
