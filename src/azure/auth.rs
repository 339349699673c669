//! Azure Authentication
//!
//! Supplies bearer tokens for management API calls, either from a
//! pre-acquired access token or through the OAuth2 client-credentials
//! flow against Microsoft Entra ID.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Default authority host for the client-credentials flow
pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";

/// Token expiry buffer - refresh tokens this much before they actually expire
/// This prevents using tokens that are about to expire during a request
const TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// TTL assumed for static tokens (the caller owns their lifetime)
const STATIC_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Where tokens come from
#[derive(Clone)]
pub enum CredentialSource {
    /// A token acquired elsewhere, e.g. `az account get-access-token`
    AccessToken(String),
    /// Service principal with a client secret
    ClientSecret {
        authority: String,
        tenant_id: String,
        client_id: String,
        client_secret: String,
    },
}

impl std::fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AccessToken(_) => f.write_str("AccessToken(***)"),
            Self::ClientSecret {
                tenant_id,
                client_id,
                ..
            } => f
                .debug_struct("ClientSecret")
                .field("tenant_id", tenant_id)
                .field("client_id", client_id)
                .finish_non_exhaustive(),
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Azure credentials holder with token caching
#[derive(Clone)]
pub struct ArmCredentials {
    source: CredentialSource,
    /// Audience the token is requested for, e.g. `https://management.azure.com`
    resource: String,
    http: Client,
    token_cache: Arc<RwLock<Option<CachedToken>>>,
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    /// When this token expires (with buffer applied)
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

impl ArmCredentials {
    pub fn new(source: CredentialSource, resource: &str) -> Self {
        Self {
            source,
            resource: resource.trim_end_matches('/').to_string(),
            http: Client::new(),
            token_cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Get an access token for API calls
    pub async fn get_token(&self) -> Result<String> {
        {
            let cache = self.token_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid() {
                    return Ok(cached.token.clone());
                }
                tracing::debug!("Cached token expired, fetching new token");
            }
        }

        let (token, ttl) = match &self.source {
            CredentialSource::AccessToken(token) => (token.clone(), STATIC_TOKEN_TTL),
            CredentialSource::ClientSecret {
                authority,
                tenant_id,
                client_id,
                client_secret,
            } => {
                self.request_client_credentials_token(authority, tenant_id, client_id, client_secret)
                    .await?
            },
        };

        let expires_at = Instant::now() + ttl.saturating_sub(TOKEN_EXPIRY_BUFFER);

        {
            let mut cache = self.token_cache.write().await;
            *cache = Some(CachedToken {
                token: token.clone(),
                expires_at,
            });
        }

        tracing::debug!(
            "New token cached, expires in ~{} minutes",
            ttl.saturating_sub(TOKEN_EXPIRY_BUFFER).as_secs() / 60
        );

        Ok(token)
    }

    /// Force refresh the token
    pub async fn refresh_token(&self) -> Result<String> {
        {
            let mut cache = self.token_cache.write().await;
            *cache = None;
        }

        self.get_token().await
    }

    async fn request_client_credentials_token(
        &self,
        authority: &str,
        tenant_id: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<(String, Duration)> {
        let url = format!(
            "{}/{}/oauth2/v2.0/token",
            authority.trim_end_matches('/'),
            urlencoding::encode(tenant_id)
        );
        let scope = format!("{}/.default", self.resource);
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("scope", scope.as_str()),
        ]
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

        tracing::debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body(form)
            .send()
            .await
            .context("Failed to reach the token endpoint")?;

        let status = response.status();
        if !status.is_success() {
            // The body may echo request details, so only the status is surfaced
            return Err(anyhow::anyhow!(
                "Failed to get access token: token endpoint returned {}",
                status
            ));
        }

        let token: TokenResponse = response
            .json()
            .await
            .context("Failed to parse token response")?;
        let ttl = Duration::from_secs(token.expires_in.unwrap_or(60 * 60));

        Ok((token.access_token, ttl))
    }
}
