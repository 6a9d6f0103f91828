//! Docker Hub client

use async_trait::async_trait;
use reqwest::{Client, header::HeaderMap};
use serde::Deserialize;
use std::fmt::Display;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::ClientError;
use crate::limits::{RateLimitSample, parse_limit_headers};
use crate::source::LimitSource;

/// Default Docker Hub token service
pub const DEFAULT_AUTH_URL: &str = "https://auth.docker.io";

/// Default Docker Hub registry
pub const DEFAULT_REGISTRY_URL: &str = "https://registry-1.docker.io";

/// Service name the token is requested for
const REGISTRY_SERVICE: &str = "registry.docker.io";

/// Manifest reference probed for rate-limit headers
const MANIFEST_REFERENCE: &str = "latest";

/// Docker Hub client configuration
#[derive(Clone, Debug)]
pub struct DockerHubClientConfig {
    /// Base URL of the token service
    pub auth_url: String,
    /// Base URL of the registry
    pub registry_url: String,
    /// Repository to probe, e.g. `library/alpine`
    pub repository: String,
    /// Username for authentication
    pub username: Option<String>,
    /// Password or access token for authentication
    pub password: Option<String>,
    /// Log raw token responses and registry headers
    pub verbose: bool,
    /// Timeout applied to each outbound request
    pub timeout: Duration,
}

impl DockerHubClientConfig {
    /// Configuration against the public Docker Hub endpoints
    pub fn new(repository: impl Into<String>) -> Self {
        Self {
            auth_url: DEFAULT_AUTH_URL.to_string(),
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            repository: repository.into(),
            username: None,
            password: None,
            verbose: false,
            timeout: Duration::from_secs(10),
        }
    }

    /// Credentials, only when both username and password are non-empty
    fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => Some((user, pass)),
            _ => None,
        }
    }
}

/// Token response from the Docker Hub token service
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    #[allow(dead_code)]
    expires_in: Option<u64>,
}

/// Extract the bearer token from a token service response body
pub(crate) fn parse_token(body: &str) -> Result<String, ClientError> {
    let response: TokenResponse = serde_json::from_str(body)
        .map_err(|e| ClientError::Auth(format!("invalid token response: {}", e)))?;

    match response.token {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(ClientError::Auth(
            "response did not contain a token".to_string(),
        )),
    }
}

/// Docker Hub API client
///
/// Tokens are fetched fresh for every collection and never cached.
pub struct DockerHubClient {
    config: DockerHubClientConfig,
    client: Client,
}

impl DockerHubClient {
    /// Create a new Docker Hub client
    pub fn new(config: DockerHubClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(config.timeout).build()?;

        info!(
            "Created Docker Hub client for repository {}",
            config.repository
        );

        Ok(Self { config, client })
    }

    fn token_url(&self) -> String {
        format!(
            "{}/token?service={}&scope=repository:{}:pull",
            self.config.auth_url.trim_end_matches('/'),
            REGISTRY_SERVICE,
            self.config.repository
        )
    }

    fn manifest_url(&self) -> String {
        format!(
            "{}/v2/{}/manifests/{}",
            self.config.registry_url.trim_end_matches('/'),
            self.config.repository,
            MANIFEST_REFERENCE
        )
    }

    /// Diagnostic output, promoted to info level in verbose mode
    fn notice(&self, message: impl Display) {
        if self.config.verbose {
            info!("{}", message);
        } else {
            debug!("{}", message);
        }
    }

    fn log_headers(&self, headers: &HeaderMap) {
        if !self.config.verbose {
            return;
        }

        info!("HTTP headers start");
        for (name, value) in headers {
            info!("{}: {}", name, value.to_str().unwrap_or("<binary>"));
        }
        info!("HTTP headers end");
    }

    /// Exchange the configured credentials for a pull token
    pub async fn fetch_token(&self) -> Result<String, ClientError> {
        let url = self.token_url();
        let mut request = self.client.get(&url);

        if let Some((username, password)) = self.config.credentials() {
            self.notice(format!("Using Docker Hub credentials for '{}'", username));
            request = request.basic_auth(username, Some(password));
        } else {
            self.notice("Using anonymous Docker Hub token");
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(ClientError::Auth(format!(
                "token service returned status {}",
                status.as_u16()
            )));
        }

        let body = response.text().await?;
        self.notice(format!("Response token: '{}'", body));

        parse_token(&body)
    }

    /// Probe the manifest endpoint and read its rate-limit headers
    pub async fn fetch_limits(&self, token: &str) -> Result<RateLimitSample, ClientError> {
        let url = self.manifest_url();

        debug!("Checking rate limits: {}", url);

        let response = self.client.head(&url).bearer_auth(token).send().await?;
        let status = response.status();

        self.log_headers(response.headers());

        if !status.is_success() {
            return Err(ClientError::Registry {
                status: status.as_u16(),
            });
        }

        Ok(parse_limit_headers(response.headers()))
    }
}

#[async_trait]
impl LimitSource for DockerHubClient {
    async fn collect(&self) -> Result<RateLimitSample, ClientError> {
        let token = self.fetch_token().await?;
        self.fetch_limits(&token).await
    }
}
