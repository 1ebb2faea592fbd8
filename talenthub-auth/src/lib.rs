//! Request authentication for the job dispatch service.
//!
//! Provides:
//! - HMAC-SHA256 webhook signature verification with signing-key rotation
//! - Signature header parsing and signing helpers
//! - Bearer token check for the internal enqueue API

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use talenthub_config::{ApiConfig, Environment, SigningConfig};
use thiserror::Error;
use tracing::{debug, warn};

type HmacSha256 = Hmac<Sha256>;

/// Name of the header carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "x-signature";

// ============================================================================
// Errors
// ============================================================================

/// Authentication errors that can surface during request processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("authentication failed")]
    AuthenticationFailed,
    #[error("malformed signature header: {0}")]
    MalformedSignature(&'static str),
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

// ============================================================================
// Signing keys
// ============================================================================

/// The pair of HMAC keys accepted during a rotation window.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SigningKeys {
    pub current: Option<String>,
    pub next: Option<String>,
}

impl std::fmt::Debug for SigningKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKeys")
            .field("current", &self.current.as_ref().map(|_| "<redacted>"))
            .field("next", &self.next.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl SigningKeys {
    pub fn new(current: impl Into<String>, next: Option<String>) -> Self {
        Self {
            current: Some(current.into()),
            next,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.current.is_none() && self.next.is_none()
    }

    /// Keys in the order they are tried: current first, then next.
    fn in_order(&self) -> impl Iterator<Item = &str> {
        self.current
            .as_deref()
            .into_iter()
            .chain(self.next.as_deref())
    }
}

// ============================================================================
// Signature header
// ============================================================================

/// Parsed form of `signature=<base64>,timestamp=<unix-seconds>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    pub signature: String,
    pub timestamp: String,
}

impl SignatureHeader {
    /// Split on `,`, then on the first `=` of each segment. Unknown segments are ignored.
    pub fn parse(header: &str) -> Result<Self, AuthError> {
        let mut signature = None;
        let mut timestamp = None;

        for segment in header.split(',') {
            let Some((name, value)) = segment.trim().split_once('=') else {
                continue;
            };
            match name.trim() {
                "signature" => signature = Some(value.trim().to_string()),
                "timestamp" => timestamp = Some(value.trim().to_string()),
                _ => {}
            }
        }

        let signature = signature
            .filter(|s| !s.is_empty())
            .ok_or(AuthError::MalformedSignature("missing signature"))?;
        let timestamp = timestamp
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MalformedSignature("missing timestamp"))?;

        Ok(Self {
            signature,
            timestamp,
        })
    }

    pub fn to_header_value(&self) -> String {
        format!("signature={},timestamp={}", self.signature, self.timestamp)
    }
}

/// Base64 of `HMAC-SHA256(key, timestamp || body)`.
pub fn sign(key: &str, timestamp: &str, body: &[u8]) -> String {
    let mut mac = mac_for(key);
    mac.update(timestamp.as_bytes());
    mac.update(body);
    BASE64.encode(mac.finalize().into_bytes())
}

/// Build a complete signature header value for `body` at `timestamp`.
pub fn sign_header(key: &str, timestamp: i64, body: &[u8]) -> String {
    let timestamp = timestamp.to_string();
    SignatureHeader {
        signature: sign(key, &timestamp, body),
        timestamp,
    }
    .to_header_value()
}

#[inline]
fn mac_for(key: &str) -> HmacSha256 {
    // HMAC accepts keys of any length, so this cannot fail.
    <HmacSha256 as Mac>::new_from_slice(key.as_bytes())
        .unwrap_or_else(|_| unreachable!("HMAC accepts keys of any length"))
}

// ============================================================================
// Signature verifier
// ============================================================================

/// Verifies that inbound dispatch requests were signed by the queue provider.
#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    keys: SigningKeys,
    environment: Environment,
    max_age_secs: Option<u64>,
}

impl SignatureVerifier {
    pub fn new(keys: SigningKeys, environment: Environment) -> Self {
        Self {
            keys,
            environment,
            max_age_secs: None,
        }
    }

    pub fn from_config(cfg: &SigningConfig, environment: Environment) -> Self {
        let keys = SigningKeys {
            current: cfg.current_key.clone(),
            next: cfg.next_key.clone(),
        };
        let verifier = Self::new(keys, environment);
        match cfg.max_age_secs {
            Some(secs) => verifier.with_max_age(secs),
            None => verifier,
        }
    }

    /// Reject signatures whose timestamp is further than `secs` from now.
    pub fn with_max_age(mut self, secs: u64) -> Self {
        self.max_age_secs = Some(secs);
        self
    }

    #[inline]
    pub fn environment(&self) -> Environment {
        self.environment
    }

    #[inline]
    pub fn has_keys(&self) -> bool {
        !self.keys.is_empty()
    }

    /// Outside development, running without signing keys is a configuration error.
    pub fn ensure_configured(&self) -> Result<(), AuthError> {
        if self.has_keys() || self.environment.is_development() {
            Ok(())
        } else {
            Err(AuthError::NotConfigured("signing key"))
        }
    }

    /// Check `header` against `body`. Never panics on malformed input.
    pub fn verify(&self, header: &str, body: &[u8]) -> bool {
        self.verify_at(header, body, chrono::Utc::now().timestamp())
    }

    /// Same as [`verify`](Self::verify) with an explicit clock, in unix seconds.
    pub fn verify_at(&self, header: &str, body: &[u8], now: i64) -> bool {
        if self.keys.is_empty() {
            if self.environment.is_development() {
                debug!("no signing keys configured; accepting request in development mode");
                return true;
            }
            warn!("no signing keys configured; rejecting signed request");
            return false;
        }

        let parsed = match SignatureHeader::parse(header) {
            Ok(parsed) => parsed,
            Err(error) => {
                debug!(%error, "rejecting request with malformed signature header");
                return false;
            }
        };

        if let Some(max_age) = self.max_age_secs {
            let Ok(ts) = parsed.timestamp.parse::<i64>() else {
                debug!("rejecting request with non-numeric signature timestamp");
                return false;
            };
            if now.abs_diff(ts) > max_age {
                debug!(timestamp = ts, now, max_age, "signature timestamp outside tolerance");
                return false;
            }
        }

        let Ok(tag) = BASE64.decode(parsed.signature.as_bytes()) else {
            debug!("rejecting request with non-base64 signature");
            return false;
        };

        for (index, key) in self.keys.in_order().enumerate() {
            let mut mac = mac_for(key);
            mac.update(parsed.timestamp.as_bytes());
            mac.update(body);
            if mac.verify_slice(&tag).is_ok() {
                if index > 0 {
                    debug!("signature verified with next signing key");
                }
                return true;
            }
        }
        false
    }
}

// ============================================================================
// API token
// ============================================================================

/// Shared bearer token guarding internal endpoints.
#[derive(Clone, Default)]
pub struct ApiToken(Option<String>);

impl std::fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ApiToken")
            .field(&self.0.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ApiToken {
    pub fn new(token: Option<String>) -> Self {
        Self(token)
    }

    pub fn from_config(cfg: &ApiConfig) -> Self {
        Self::new(cfg.token.clone())
    }

    #[inline]
    pub fn is_configured(&self) -> bool {
        self.0.is_some()
    }

    /// Validate an `Authorization` header value.
    pub fn check(&self, authorization: Option<&str>) -> Result<(), AuthError> {
        let expected = self
            .0
            .as_deref()
            .ok_or(AuthError::NotConfigured("api token"))?;
        let provided = authorization
            .map(strip_bearer)
            .ok_or(AuthError::AuthenticationFailed)?;
        if bool::from(provided.as_bytes().ct_eq(expected.as_bytes())) {
            Ok(())
        } else {
            Err(AuthError::AuthenticationFailed)
        }
    }
}

fn strip_bearer(token: &str) -> &str {
    let token = token.trim();
    if token.len() > 7 && token[..7].eq_ignore_ascii_case("bearer ") {
        &token[7..]
    } else {
        token
    }
}

// ============================================================================
// Tests
// ============================================================================
