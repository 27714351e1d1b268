use crate::services::supabase::{SupabaseClient, SupabaseError};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while authenticating a request
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingHeader,

    #[error("Authorization header is not a bearer token")]
    MalformedHeader,

    #[error("Invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("Token subject is not a user id")]
    InvalidSubject,

    #[error("Token rejected by auth service")]
    Rejected,

    #[error("Auth service unavailable: {0}")]
    Upstream(SupabaseError),
}

impl From<SupabaseError> for AuthError {
    fn from(value: SupabaseError) -> Self {
        match value {
            SupabaseError::Unauthorized => AuthError::Rejected,
            other => AuthError::Upstream(other),
        }
    }
}

/// Claims issued by the hosted auth service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    #[serde(default)]
    pub aud: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Extract the token from an `Authorization: Bearer <token>` header value
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MissingHeader)?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::MalformedHeader)?
        .trim();
    if token.is_empty() {
        return Err(AuthError::MalformedHeader);
    }
    Ok(token)
}

/// Resolves bearer tokens to matchmaker ids
///
/// With a JWT secret configured tokens are verified locally, otherwise the
/// hosted auth endpoint is asked. Verified tokens are cached for a short TTL.
pub struct Authenticator {
    decoding_key: Option<DecodingKey>,
    validation: Validation,
    supabase: Arc<SupabaseClient>,
    verified: moka::future::Cache<String, Uuid>,
}

impl Authenticator {
    pub fn new(
        supabase: Arc<SupabaseClient>,
        jwt_secret: Option<&str>,
        cache_size: u64,
        cache_ttl_secs: u64,
    ) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&["authenticated"]);

        let verified = moka::future::CacheBuilder::new(cache_size)
            .time_to_live(Duration::from_secs(cache_ttl_secs))
            .build();

        Self {
            decoding_key: jwt_secret
                .filter(|s| !s.is_empty())
                .map(|s| DecodingKey::from_secret(s.as_bytes())),
            validation,
            supabase,
            verified,
        }
    }

    pub fn verifies_locally(&self) -> bool {
        self.decoding_key.is_some()
    }

    /// Verify a token and return the matchmaker id it belongs to
    pub async fn verify(&self, token: &str) -> Result<Uuid, AuthError> {
        if let Some(user_id) = self.verified.get(token).await {
            tracing::trace!("Token cache hit");
            return Ok(user_id);
        }

        let user_id = match &self.decoding_key {
            Some(key) => {
                let data = decode::<Claims>(token, key, &self.validation)?;
                Uuid::parse_str(&data.claims.sub).map_err(|_| AuthError::InvalidSubject)?
            }
            None => self.supabase.get_user(token).await?,
        };

        self.verified.insert(token.to_string(), user_id).await;
        Ok(user_id)
    }
}
