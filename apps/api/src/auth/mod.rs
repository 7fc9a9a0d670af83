//! Caller identity: bearer-token parsing plus verification against the Supabase
//! auth service.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::errors::AppError;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Missing Supabase environment variables")]
    NotConfigured,

    #[error("Unauthorized")]
    Rejected,

    #[error("Identity service unreachable: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<IdentityError> for AppError {
    fn from(e: IdentityError) -> Self {
        match e {
            IdentityError::NotConfigured => AppError::Configuration(e.to_string()),
            IdentityError::Rejected => AppError::Unauthorized,
            IdentityError::Http(inner) => {
                warn!("Identity lookup failed: {inner}");
                AppError::Unauthorized
            }
        }
    }
}

/// The authenticated principal behind a bearer token.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Principal {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Fails with `NotConfigured` before any I/O when the service is not set up.
    fn ensure_configured(&self) -> Result<(), IdentityError>;

    /// Resolves the principal for an `Authorization` header value.
    async fn verify(&self, authorization: &str) -> Result<Principal, IdentityError>;
}

/// Returns the token of a `Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Calls `GET {url}/auth/v1/user` with the caller's own authorization header.
#[derive(Clone)]
pub struct SupabaseVerifier {
    client: Client,
    base_url: Option<String>,
    anon_key: Option<String>,
}

impl SupabaseVerifier {
    pub fn new(base_url: Option<String>, anon_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.map(|u| u.trim_end_matches('/').to_string()),
            anon_key,
        }
    }
}

#[async_trait]
impl IdentityVerifier for SupabaseVerifier {
    fn ensure_configured(&self) -> Result<(), IdentityError> {
        match (&self.base_url, &self.anon_key) {
            (Some(_), Some(_)) => Ok(()),
            _ => Err(IdentityError::NotConfigured),
        }
    }

    async fn verify(&self, authorization: &str) -> Result<Principal, IdentityError> {
        let (Some(base_url), Some(anon_key)) = (&self.base_url, &self.anon_key) else {
            return Err(IdentityError::NotConfigured);
        };

        let response = self
            .client
            .get(format!("{base_url}/auth/v1/user"))
            .header("apikey", anon_key)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(IdentityError::Rejected);
        }

        response
            .json::<Principal>()
            .await
            .ok()
            .filter(|p| !p.id.is_empty())
            .ok_or(IdentityError::Rejected)
    }
}
