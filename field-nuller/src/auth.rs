use crate::config::Config;
use crate::traits::TokenAcquirer;
use crate::types::{NullerError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use tracing::{debug, info};

#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .finish()
    }
}

#[derive(Clone)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// OAuth token exchange against the configured token endpoint.
pub struct OAuthTokenAcquirer {
    client: Client,
    token_url: String,
    flow: String,
    scope: String,
}

impl OAuthTokenAcquirer {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            token_url: config.token_url.clone(),
            flow: config.flow.clone(),
            scope: config.scope.clone(),
        }
    }
}

#[async_trait]
impl TokenAcquirer for OAuthTokenAcquirer {
    async fn acquire_token(&self, credentials: &Credentials) -> Result<BearerToken> {
        debug!("Requesting {} token from {}", self.flow, self.token_url);

        let form = [
            ("grant_type", self.flow.as_str()),
            ("scope", self.scope.as_str()),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
        ];

        let response = self
            .client
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| NullerError::Auth(format!("token request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| NullerError::Auth(format!("could not read token response: {}", e)))?;

        if !status.is_success() {
            return Err(NullerError::Auth(format!(
                "token endpoint returned status: {}, body: {}",
                status.as_u16(),
                body
            )));
        }

        let parsed: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| NullerError::Auth(format!("malformed token response: {}", e)))?;

        match parsed.access_token.filter(|token| !token.is_empty()) {
            Some(token) => {
                info!("Obtained access token for client {}", credentials.client_id);
                Ok(BearerToken::new(token))
            }
            None => Err(NullerError::Auth("token response has no access_token".to_string())),
        }
    }
}
