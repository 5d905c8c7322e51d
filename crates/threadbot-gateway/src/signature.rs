//! Slack request signing (`v0`).
//!
//! `X-Slack-Signature` = `v0=` + hex(HMAC-SHA256(secret, `v0:{timestamp}:{body}`)).
//! The timestamp must be within [`REPLAY_WINDOW_SECS`] of now, in either
//! direction.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-slack-signature";
pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";
pub const REPLAY_WINDOW_SECS: i64 = 300;

const VERSION: &str = "v0";

#[derive(Clone)]
pub struct SignatureVerifier {
    secret: String,
}

impl SignatureVerifier {
    /// `None` for an empty secret: verification is switched off.
    pub fn from_secret(secret: &str) -> Option<Self> {
        if secret.is_empty() {
            return None;
        }
        Some(Self {
            secret: secret.to_string(),
        })
    }

    pub fn verify(&self, signature: Option<&str>, timestamp: Option<&str>, body: &[u8]) -> bool {
        self.verify_at(signature, timestamp, body, chrono::Utc::now().timestamp())
    }

    /// [`verify`](Self::verify) against an explicit clock.
    pub fn verify_at(
        &self,
        signature: Option<&str>,
        timestamp: Option<&str>,
        body: &[u8],
        now: i64,
    ) -> bool {
        let (Some(signature), Some(timestamp)) = (signature, timestamp) else {
            warn!("missing signature headers");
            return false;
        };

        let Ok(ts) = timestamp.trim().parse::<i64>() else {
            warn!(timestamp, "unparsable request timestamp");
            return false;
        };
        if now.abs_diff(ts) > REPLAY_WINDOW_SECS.unsigned_abs() {
            warn!(timestamp, now, "request timestamp outside replay window");
            return false;
        }

        let expected = self.expected_signature(timestamp, body);
        let valid = constant_time_eq(signature.as_bytes(), expected.as_bytes());
        if !valid {
            warn!("signature mismatch");
        }
        valid
    }

    /// The signature Slack would send for this timestamp and body.
    pub fn expected_signature(&self, timestamp: &str, body: &[u8]) -> String {
        let mut mac =
            HmacSha256::new_from_slice(self.secret.as_bytes()).expect("HMAC accepts any key size");
        mac.update(VERSION.as_bytes());
        mac.update(b":");
        mac.update(timestamp.as_bytes());
        mac.update(b":");
        mac.update(body);
        format!("{VERSION}={}", hex::encode(mac.finalize().into_bytes()))
    }
}

/// Length check, then XOR-accumulate over every byte.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    // Published example from Slack's request-verification guide.
    const SECRET: &str = "8f742231b10e8888abcd99yyyzzz85a5";
    const TIMESTAMP: &str = "1531420618";
    const BODY: &str = "token=xyzz0WbapA4vBCDEFasx0q6G&team_id=T1DC2JH3J&team_domain=testteamnow&channel_id=G8PSS9T3V&channel_name=foobar&user_id=U2CERLKJA&user_name=roadrunner&command=%2Fwebhook-collect&text=&response_url=https%3A%2F%2Fhooks.slack.com%2Fcommands%2FT1DC2JH3J%2F397700885554%2F96rGlfmibIGlgcZRskXaIFfN&trigger_id=398738663015.47445629121.803a0bc887a14d10d2c447fce8b6703c";
    const SIGNATURE: &str = "v0=a2114d57b48eac39b9ad189dd8316235a7b4a8d21a10bd27519666489c69b503";

    fn verifier() -> SignatureVerifier {
        SignatureVerifier::from_secret(SECRET).unwrap()
    }

    #[test]
    fn accepts_published_example() {
        let now = TIMESTAMP.parse::<i64>().unwrap() + 10;
        assert!(verifier().verify_at(Some(SIGNATURE), Some(TIMESTAMP), BODY.as_bytes(), now));
    }

    #[test]
    fn expected_signature_matches_published_example() {
        assert_eq!(verifier().expected_signature(TIMESTAMP, BODY.as_bytes()), SIGNATURE);
    }

    #[test]
    fn rejects_tampered_body() {
        let now = TIMESTAMP.parse::<i64>().unwrap();
        let body = BODY.replace("roadrunner", "coyote");
        assert!(!verifier().verify_at(Some(SIGNATURE), Some(TIMESTAMP), body.as_bytes(), now));
    }

    #[test]
    fn replay_window_is_symmetric() {
        let v = verifier();
        let ts = 1_700_000_000i64;
        let body = br#"{"type":"event_callback"}"#;
        let sig = v.expected_signature(&ts.to_string(), body);
        let ts_str = ts.to_string();

        assert!(v.verify_at(Some(&sig), Some(&ts_str), body, ts + 300));
        assert!(v.verify_at(Some(&sig), Some(&ts_str), body, ts - 300));
        assert!(!v.verify_at(Some(&sig), Some(&ts_str), body, ts + 301));
        assert!(!v.verify_at(Some(&sig), Some(&ts_str), body, ts - 301));
    }

    #[test]
    fn missing_headers_fail() {
        let v = verifier();
        assert!(!v.verify_at(None, Some(TIMESTAMP), BODY.as_bytes(), 1531420618));
        assert!(!v.verify_at(Some(SIGNATURE), None, BODY.as_bytes(), 1531420618));
    }

    #[test]
    fn non_numeric_timestamp_fails() {
        assert!(!verifier().verify_at(Some(SIGNATURE), Some("yesterday"), BODY.as_bytes(), 0));
    }

    #[test]
    fn extreme_timestamps_are_rejected_without_overflow() {
        let v = verifier();
        let body = b"{}";
        for ts in [i64::MIN, i64::MAX] {
            let ts = ts.to_string();
            let sig = v.expected_signature(&ts, body);
            assert!(!v.verify_at(Some(&sig), Some(&ts), body, 1_700_000_000));
            assert!(!v.verify_at(Some("v0=00"), Some(&ts), body, 1_700_000_000));
        }
        assert!(!v.verify_at(Some("v0=00"), Some("0"), body, i64::MIN));
    }

    #[test]
    fn empty_secret_disables_verification() {
        assert!(SignatureVerifier::from_secret("").is_none());
    }

    #[test]
    fn constant_time_eq_checks_length_and_content() {
        assert!(constant_time_eq(b"v0=abc", b"v0=abc"));
        assert!(!constant_time_eq(b"v0=abc", b"v0=abd"));
        assert!(!constant_time_eq(b"v0=abc", b"v0=abcd"));
    }
}
