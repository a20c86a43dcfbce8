use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, instrument};

use crate::config::GoogleConfig;
use crate::error::ApiError;

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v1/userinfo";

/// Identity claims obtained from the provider after a code exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct FederatedIdentity {
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Seam for the external identity provider, so handlers and tests can swap
/// the real Google client for a canned one.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn exchange_code(&self, code: &str) -> Result<FederatedIdentity, ApiError>;
}

pub struct GoogleProvider {
    http: Client,
    client_id: String,
    client_secret: String,
}

impl GoogleProvider {
    pub fn new(cfg: &GoogleConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            client_id: cfg.client_id.clone(),
            client_secret: cfg.client_secret.clone(),
        })
    }
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    /// Exchange the authorization code for an access token, then fetch the
    /// userinfo claims. Every failure, including a timeout, collapses into
    /// the same opaque error; the detail goes to the log only.
    #[instrument(skip(self, code))]
    async fn exchange_code(&self, code: &str) -> Result<FederatedIdentity, ApiError> {
        let token: TokenResponse = self
            .http
            .post(TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", "postmessage"),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "google token exchange failed");
                ApiError::Upstream
            })?
            .error_for_status()
            .map_err(|e| {
                error!(error = %e, "google token exchange rejected");
                ApiError::Upstream
            })?
            .json()
            .await
            .map_err(|e| {
                error!(error = %e, "google token response malformed");
                ApiError::Upstream
            })?;

        let identity: FederatedIdentity = self
            .http
            .get(USERINFO_URL)
            .query(&[("alt", "json"), ("access_token", token.access_token.as_str())])
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "google userinfo fetch failed");
                ApiError::Upstream
            })?
            .error_for_status()
            .map_err(|e| {
                error!(error = %e, "google userinfo rejected");
                ApiError::Upstream
            })?
            .json()
            .await
            .map_err(|e| {
                error!(error = %e, "google userinfo malformed");
                ApiError::Upstream
            })?;

        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn userinfo_deserializes_with_picture() {
        let identity: FederatedIdentity = serde_json::from_str(
            r#"{"email":"ada@example.com","name":"Ada Lovelace","picture":"https://lh3.example/p.jpg","id":"123","verified_email":true}"#,
        )
        .unwrap();
        assert_eq!(identity.email, "ada@example.com");
        assert_eq!(identity.name, "Ada Lovelace");
        assert_eq!(identity.picture.as_deref(), Some("https://lh3.example/p.jpg"));
    }

    #[test]
    fn userinfo_picture_is_optional() {
        let identity: FederatedIdentity =
            serde_json::from_str(r#"{"email":"a@b.co","name":"A"}"#).unwrap();
        assert!(identity.picture.is_none());
    }

    #[tokio::test]
    async fn fake_provider_roundtrips_through_the_trait_object() {
        let state = crate::state::AppState::fake();
        let identity = state.google.exchange_code("fake-code").await.unwrap();
        assert_eq!(identity.email, "fake@example.com");
    }
}
