use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{AuthError, AuthResult};

pub const DEFAULT_HEADER_PREFIX: &str = "JWT";

/// Claims carried by every issued token
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    pub email: String,
    pub exp: i64,
    #[serde(rename = "origIat")]
    pub orig_iat: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub payload: TokenPayload,
    /// Unix timestamp after which the token can no longer be refreshed
    pub refresh_expires_in: i64,
}

#[derive(Clone, Debug)]
pub struct TokenSettings {
    pub secret: String,
    pub expiration: Duration,
    pub refresh_expiration: Duration,
    pub header_prefix: String,
}

impl TokenSettings {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            expiration: Duration::seconds(300),
            refresh_expiration: Duration::days(7),
            header_prefix: DEFAULT_HEADER_PREFIX.to_string(),
        }
    }
}

/// Issues and checks HS256 tokens
#[derive(Clone)]
pub struct TokenService {
    settings: TokenSettings,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenService {
    pub fn new(settings: TokenSettings) -> Self {
        let encoding_key = EncodingKey::from_secret(settings.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(settings.secret.as_bytes());
        Self {
            settings,
            encoding_key,
            decoding_key,
        }
    }

    pub fn settings(&self) -> &TokenSettings {
        &self.settings
    }

    pub fn issue(&self, email: &str) -> AuthResult<IssuedToken> {
        self.issue_with_origin(email, Utc::now().timestamp())
    }

    fn issue_with_origin(&self, email: &str, orig_iat: i64) -> AuthResult<IssuedToken> {
        let payload = TokenPayload {
            email: email.to_string(),
            exp: (Utc::now() + self.settings.expiration).timestamp(),
            orig_iat,
        };
        let token = encode(&Header::new(Algorithm::HS256), &payload, &self.encoding_key)
            .map_err(|_| AuthError::InvalidPayload)?;
        Ok(IssuedToken {
            token,
            refresh_expires_in: orig_iat + self.settings.refresh_expiration.num_seconds(),
            payload,
        })
    }

    pub fn verify(&self, token: &str) -> AuthResult<TokenPayload> {
        self.decode_payload(token, true)
    }

    /// New token for the same subject, keeping the original issue time
    pub fn refresh(&self, token: &str) -> AuthResult<IssuedToken> {
        let payload = self.decode_payload(token, false)?;
        let refresh_deadline = payload.orig_iat + self.settings.refresh_expiration.num_seconds();
        if Utc::now().timestamp() > refresh_deadline {
            return Err(AuthError::RefreshExpired);
        }
        self.issue_with_origin(&payload.email, payload.orig_iat)
    }

    fn decode_payload(&self, token: &str, check_expiry: bool) -> AuthResult<TokenPayload> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = check_expiry;

        decode::<TokenPayload>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::SignatureExpired,
                other => {
                    debug!("Rejected token: {:?}", other);
                    AuthError::DecodeFailed
                }
            })
    }

    /// Extract the token from an `Authorization` header value.
    ///
    /// Accepts the configured prefix and `Bearer`.
    pub fn token_from_header<'a>(&self, value: &'a str) -> Option<&'a str> {
        let (prefix, token) = value.trim().split_once(' ')?;
        let accepted = prefix.eq_ignore_ascii_case(&self.settings.header_prefix)
            || prefix.eq_ignore_ascii_case("Bearer");
        let token = token.trim();
        (accepted && !token.is_empty()).then_some(token)
    }
}
