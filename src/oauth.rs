//! OAuth 1.0a request signing (HMAC-SHA1, user context).
//!
//! Only what the posting client needs: a JSON-bodied request with no query
//! string, so the signature base covers the `oauth_*` parameters alone.

use crate::credentials::Credentials;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use itertools::Itertools;
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use sha1::Sha1;
use urlencoding::encode;

/// HMAC-SHA1 of `message` under `key`.
pub fn hmac_sha1(key: &[u8], message: &[u8]) -> Vec<u8> {
    let mut mac = match Hmac::<Sha1>::new_from_slice(key) {
        Ok(m) => m,
        Err(_) => unreachable!("HMAC takes keys of any length"),
    };
    mac.update(message);
    mac.finalize().into_bytes().to_vec()
}

/// Random alphanumeric nonce.
pub fn nonce() -> String {
    rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Build the signature base string from already-collected parameters.
fn signature_base(method: &str, url: &str, params: &[(&str, String)]) -> String {
    let param_string = params
        .iter()
        .map(|(k, v)| (encode(k).into_owned(), encode(v).into_owned()))
        .sorted()
        .map(|(k, v)| format!("{}={}", k, v))
        .join("&");
    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        encode(url),
        encode(&param_string)
    )
}

/// Compute the `Authorization` header value for one request.
pub fn authorization_header(
    method: &str,
    url: &str,
    credentials: &Credentials,
    nonce: &str,
    timestamp: i64,
) -> String {
    let mut params: Vec<(&str, String)> = vec![
        ("oauth_consumer_key", credentials.consumer_key.clone()),
        ("oauth_nonce", nonce.to_string()),
        ("oauth_signature_method", "HMAC-SHA1".to_string()),
        ("oauth_timestamp", timestamp.to_string()),
        ("oauth_token", credentials.access_token.clone()),
        ("oauth_version", "1.0".to_string()),
    ];

    let base = signature_base(method, url, &params);
    let signing_key = format!(
        "{}&{}",
        encode(&credentials.consumer_secret),
        encode(&credentials.access_token_secret)
    );
    let signature = STANDARD.encode(hmac_sha1(signing_key.as_bytes(), base.as_bytes()));
    params.push(("oauth_signature", signature));

    let fields = params
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
        .join(", ");
    format!("OAuth {}", fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }

    #[test]
    fn test_hmac_sha1_rfc2202_case_2() {
        let mac = hmac_sha1(b"Jefe", b"what do ya want for nothing?");
        assert_eq!(hex(&mac), "effcdf6ae5eb2fa2d27416d5f184df9c259a7c79");
    }

    #[test]
    fn test_hmac_sha1_rfc2202_long_key() {
        let key = [0xaau8; 80];
        let mac = hmac_sha1(&key, b"Test Using Larger Than Block-Size Key - Hash Key First");
        assert_eq!(hex(&mac), "aa4ae5e15272d00e95705637ce8a3b55ed402112");
    }

    #[test]
    fn test_signature_base_sorts_and_encodes() {
        let params = vec![
            ("oauth_token", "t k".to_string()),
            ("oauth_consumer_key", "ck".to_string()),
        ];
        let base = signature_base("post", "https://api.x.com/2/tweets", &params);
        assert_eq!(
            base,
            "POST&https%3A%2F%2Fapi.x.com%2F2%2Ftweets&oauth_consumer_key%3Dck%26oauth_token%3Dt%2520k"
        );
    }

    #[test]
    fn test_authorization_header_shape() {
        let creds = Credentials {
            consumer_key: "ck".into(),
            consumer_secret: "cs".into(),
            access_token: "at".into(),
            access_token_secret: "ats".into(),
        };
        let url = "https://api.x.com/2/tweets";
        let header = authorization_header("POST", url, &creds, "n0nce", 1700000000);
        assert!(header.starts_with("OAuth oauth_consumer_key=\"ck\", oauth_nonce=\"n0nce\""));
        assert!(header.contains("oauth_timestamp=\"1700000000\""));
        assert!(header.contains("oauth_token=\"at\""));
        assert!(header.contains("oauth_signature=\""));

        let again = authorization_header("POST", url, &creds, "n0nce", 1700000000);
        assert_eq!(header, again);
    }

    #[test]
    fn test_hmac_sha1_empty_key() {
        let mac = hmac_sha1(b"", b"");
        assert_eq!(hex(&mac), "fbdb1d1b18aa6c08324b7d64b71fb76370690e1d");
    }

    #[test]
    fn test_nonce_is_alphanumeric() {
        let n = nonce();
        assert_eq!(n.len(), 32);
        assert!(n.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
