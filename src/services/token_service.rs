use chrono::{Duration, Utc};
use jsonwebtoken::{errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

/// Discriminator stored in the `type` claim so one kind of token can never
/// be replayed as another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenPurpose {
    MagicLink,
    MagicLinkSession,
}

impl TokenPurpose {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenPurpose::MagicLink => "magicLink",
            TokenPurpose::MagicLinkSession => "magicLinkSession",
        }
    }

    pub fn lifetime(self) -> Duration {
        match self {
            TokenPurpose::MagicLink => Duration::hours(24),
            TokenPurpose::MagicLinkSession => Duration::hours(1),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Token signature or format is invalid")]
    Invalid,
    #[error("Token has expired")]
    Expired,
    #[error("Token purpose mismatch: expected {expected}, found {found:?}")]
    WrongPurpose {
        expected: &'static str,
        found: Option<String>,
    },
    #[error("Token signing failed: {0}")]
    Signing(String),
}

/// Claims minted when a link is issued and emailed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MagicLinkClaims {
    pub email: String,
    pub board_id: Uuid,
    #[serde(rename = "type")]
    pub purpose: TokenPurpose,
}

/// Claims of the short-lived bearer credential handed out on validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MagicLinkSessionClaims {
    pub email: String,
    pub board_id: Uuid,
    pub magic_link_id: Uuid,
    #[serde(rename = "type")]
    pub purpose: TokenPurpose,
}

#[derive(Debug, Serialize, Deserialize)]
struct JwtEnvelope {
    #[serde(flatten)]
    payload: serde_json::Value,
    iat: i64,
    exp: i64,
    jti: String,
}

/// HS256 signer/verifier shared by link and session tokens.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenCodec {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn sign<T: Serialize>(&self, payload: &T, lifetime: Duration) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let envelope = JwtEnvelope {
            payload: serde_json::to_value(payload)
                .map_err(|e| TokenError::Signing(format!("Failed to serialize claims: {}", e)))?,
            iat: now,
            exp: now + lifetime.num_seconds(),
            jti: Uuid::new_v4().to_string(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &envelope, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    pub fn sign_magic_link(&self, claims: &MagicLinkClaims) -> Result<String, TokenError> {
        self.sign(claims, TokenPurpose::MagicLink.lifetime())
    }

    pub fn sign_session(&self, claims: &MagicLinkSessionClaims) -> Result<String, TokenError> {
        self.sign(claims, TokenPurpose::MagicLinkSession.lifetime())
    }

    /// Checks signature and expiry, then the purpose tag, then decodes the
    /// claims. A token whose claims do not fit `T` is reported as invalid.
    pub fn verify<T: DeserializeOwned>(
        &self,
        token: &str,
        purpose: TokenPurpose,
    ) -> Result<T, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = jsonwebtoken::decode::<JwtEnvelope>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })?;

        let found = data
            .claims
            .payload
            .get("type")
            .and_then(|value| value.as_str());
        if found != Some(purpose.as_str()) {
            return Err(TokenError::WrongPurpose {
                expected: purpose.as_str(),
                found: found.map(str::to_string),
            });
        }

        serde_json::from_value(data.claims.payload).map_err(|_| TokenError::Invalid)
    }

    pub fn verify_session(&self, token: &str) -> Result<MagicLinkSessionClaims, TokenError> {
        self.verify(token, TokenPurpose::MagicLinkSession)
    }
}
