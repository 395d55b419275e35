//! Stateless session credentials.
//!
//! A credential is `base64(payload_json) + "." + hex(hmac_sha256(base64_payload))`.
//! Nothing is stored server side: any instance holding the same secret can
//! verify a credential issued by any other instance.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::Duration;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

// Signed payload
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
    pub id: String,
    pub created_at: i64,
}

/// Issuer and verifier of session credentials.
///
/// The stateless [`SessionCodec`] is the only implementation today; a
/// storage-backed one can sit behind the same contract.
pub trait SessionStore: Send + Sync {
    fn verify_access_code(&self, candidate: &str) -> bool;
    fn create_session(&self) -> String;
    fn verify_session(&self, credential: &str) -> bool;
    fn invalidate_session(&self, credential: &str);
}

pub struct SessionCodec {
    access_code: String,
    secret: Vec<u8>,
    ttl_ms: i64,
}

impl SessionCodec {
    pub fn new(access_code: impl Into<String>, secret: impl AsRef<[u8]>, ttl: Duration) -> Self {
        Self {
            access_code: access_code.into(),
            secret: secret.as_ref().to_vec(),
            ttl_ms: i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX),
        }
    }

    /// Exact, case-sensitive comparison with the configured access code.
    pub fn verify_access_code(&self, candidate: &str) -> bool {
        candidate == self.access_code
    }

    pub fn create_session(&self) -> String {
        self.create_session_at(now_ms())
    }

    pub fn create_session_at(&self, now_ms: i64) -> String {
        let payload = SessionPayload {
            id: Uuid::new_v4().to_string(),
            created_at: now_ms,
        };
        self.seal(&payload)
    }

    /// Returns false for anything that is not a live credential signed with
    /// our secret. Never panics on malformed input.
    pub fn verify_session(&self, credential: &str) -> bool {
        self.verify_session_at(credential, now_ms())
    }

    pub fn verify_session_at(&self, credential: &str, now_ms: i64) -> bool {
        match self.open(credential) {
            Some(payload) => now_ms.saturating_sub(payload.created_at) <= self.ttl_ms,
            None => false,
        }
    }

    /// No-op. A stateless credential stays valid until it expires; revoking
    /// one early would need a denylist shared by every instance.
    pub fn invalidate_session(&self, _credential: &str) {
        tracing::debug!("session invalidation requested, credential stays valid until expiry");
    }

    pub(crate) fn seal(&self, payload: &SessionPayload) -> String {
        // serializing two plain fields cannot fail
        let json = serde_json::to_string(payload).unwrap_or_default();
        let encoded = STANDARD.encode(json);
        let signature = hex::encode(self.sign(&encoded));
        format!("{}.{}", encoded, signature)
    }

    // Signature check first, payload parsing only for authentic tokens
    fn open(&self, credential: &str) -> Option<SessionPayload> {
        let mut parts = credential.split('.');
        let encoded = parts.next()?;
        let signature = parts.next()?;
        if parts.next().is_some() || encoded.is_empty() || signature.is_empty() {
            return None;
        }

        // only our own lowercase encoding counts as a match
        if !signature.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return None;
        }
        let signature = hex::decode(signature).ok()?;
        let mut mac = self.mac();
        mac.update(encoded.as_bytes());
        mac.verify_slice(&signature).ok()?;

        let json = STANDARD.decode(encoded).ok()?;
        serde_json::from_slice(&json).ok()
    }

    fn sign(&self, encoded: &str) -> Vec<u8> {
        let mut mac = self.mac();
        mac.update(encoded.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }

    fn mac(&self) -> HmacSha256 {
        // HMAC takes keys of any length
        <HmacSha256 as Mac>::new_from_slice(&self.secret).expect("HMAC accepts any key size")
    }
}

// Inherent methods take precedence, so these forward rather than recurse
impl SessionStore for SessionCodec {
    fn verify_access_code(&self, candidate: &str) -> bool {
        SessionCodec::verify_access_code(self, candidate)
    }

    fn create_session(&self) -> String {
        SessionCodec::create_session(self)
    }

    fn verify_session(&self, credential: &str) -> bool {
        SessionCodec::verify_session(self, credential)
    }

    fn invalidate_session(&self, credential: &str) {
        SessionCodec::invalidate_session(self, credential)
    }
}

pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
