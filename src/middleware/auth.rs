use std::str::FromStr;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::routes::AppState;

/// Claims read from tokens issued by the upstream auth service
#[derive(Debug, Deserialize)]
struct Claims {
    /// Member id; some issuers encode it as a number
    #[serde(default)]
    sub: Option<Value>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    role: Option<String>,
}

/// Identity resolved from a valid bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub username: Option<String>,
    pub role: Option<String>,
}

/// Verifies shared-secret signed JWTs
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Creates a verifier for `algorithm`, which must be one of HS256/384/512
    pub fn new(secret: &str, algorithm: &str) -> anyhow::Result<Self> {
        let algorithm = Algorithm::from_str(algorithm)
            .map_err(|e| anyhow::anyhow!("Unsupported JWT algorithm '{}': {}", algorithm, e))?;

        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            anyhow::bail!(
                "JWT algorithm {:?} needs a key pair; only HS256, HS384 and HS512 are supported",
                algorithm
            );
        }

        let mut validation = Validation::new(algorithm);
        validation.validate_exp = true;
        validation.validate_aud = false;

        Ok(Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    /// Validates `token` and extracts the caller's identity
    pub fn verify(&self, token: &str) -> AppResult<AuthenticatedUser> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            if is_rejected_token(e.kind()) {
                tracing::warn!(error = %e, "Token validation failed");
                AppError::Unauthorized("Invalid or expired token".to_string())
            } else {
                tracing::error!(error = %e, "Unexpected error while decoding token");
                AppError::Internal("Failed to process authentication".to_string())
            }
        })?;

        let claims = data.claims;
        let user_id = claims
            .sub
            .and_then(subject_to_user_id)
            .ok_or_else(|| AppError::Unauthorized("Token has no user id".to_string()))?;

        tracing::debug!(user_id = %user_id, username = ?claims.username, "Token accepted");

        Ok(AuthenticatedUser {
            user_id,
            username: claims.username,
            role: claims.role,
        })
    }
}

/// Errors caused by the token itself rather than by our key or crypto setup
fn is_rejected_token(kind: &ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::InvalidToken
            | ErrorKind::InvalidSignature
            | ErrorKind::ExpiredSignature
            | ErrorKind::ImmatureSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::MissingRequiredClaim(_)
            | ErrorKind::InvalidIssuer
            | ErrorKind::InvalidAudience
            | ErrorKind::InvalidSubject
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_)
    )
}

fn subject_to_user_id(sub: Value) -> Option<String> {
    match sub {
        Value::String(id) if !id.is_empty() => Some(id),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let verifier = state
            .token_verifier
            .as_ref()
            .ok_or_else(|| AppError::Internal("Token verification is not configured".to_string()))?;

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::Unauthorized("Invalid authorization format".to_string()))?;

        verifier.verify(token)
    }
}
