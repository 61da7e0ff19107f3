//! Credential configuration and per-request resolution.
//!
//! A request authenticates through exactly one strategy, selected in fixed
//! priority order: an explicit API key, then service-account credentials
//! exchanged for a bearer token, then the host environment's ambient
//! identity. Resolution fails closed: if the selected strategy cannot
//! produce a credential, the request is never sent.

pub mod service_account;

pub use service_account::{ServiceAccountCredentials, ServiceAccountTokenProvider};

use crate::errors::{Error, Result};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Header name for API key authentication.
///
/// Header-based keys stay out of server logs, proxy logs, and error
/// messages containing URLs.
pub const API_KEY_HEADER: &str = "X-Goog-Api-Key";

/// A bearer token provider.
///
/// Implementations may cache internally and refresh tokens when necessary.
/// The crate ships [`ServiceAccountTokenProvider`] for the JWT bearer grant
/// and [`StaticTokenProvider`] for externally-managed tokens; host
/// environments supply their own ambient-identity implementation.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns an access token suitable for `Authorization: Bearer <token>`.
    async fn token(&self) -> Result<String>;
}

/// A token provider returning a fixed token, for tests and scenarios where
/// the token is managed externally.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}

/// Credential configuration for a client.
///
/// Several strategies may be configured at once; resolution picks the
/// highest-priority one present.
#[derive(Default)]
pub struct AuthConfig {
    pub(crate) api_key: Option<String>,
    pub(crate) service_account: Option<ServiceAccountCredentials>,
    pub(crate) service_account_assertion: Option<String>,
    pub(crate) host_identity: Option<Arc<dyn TokenProvider>>,
}

impl AuthConfig {
    /// Authenticate with an explicit API key.
    #[must_use]
    pub fn api_key(key: impl Into<String>) -> Self {
        Self::default().with_api_key(key)
    }

    /// Authenticate with service-account credentials.
    #[must_use]
    pub fn service_account(creds: ServiceAccountCredentials) -> Self {
        Self::default().with_service_account(creds)
    }

    /// Authenticate with the host environment's ambient identity.
    #[must_use]
    pub fn host_identity(provider: Arc<dyn TokenProvider>) -> Self {
        Self::default().with_host_identity(provider)
    }

    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn with_service_account(mut self, creds: ServiceAccountCredentials) -> Self {
        self.service_account = Some(creds);
        self
    }

    /// Injects a prebuilt JWT assertion, bypassing RSA signing. Primarily
    /// for tests exercising the token-exchange flow.
    #[must_use]
    pub fn with_service_account_assertion(mut self, assertion: impl Into<String>) -> Self {
        self.service_account_assertion = Some(assertion.into());
        self
    }

    #[must_use]
    pub fn with_host_identity(mut self, provider: Arc<dyn TokenProvider>) -> Self {
        self.host_identity = Some(provider);
        self
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print key material.
        f.debug_struct("AuthConfig")
            .field("api_key", &self.api_key.is_some())
            .field("service_account", &self.service_account.is_some())
            .field("host_identity", &self.host_identity.is_some())
            .finish()
    }
}

/// The credential selected for one request.
#[derive(Debug)]
pub(crate) enum Credential {
    ApiKey(String),
    Bearer(String),
}

impl Credential {
    /// Attaches this credential to an outgoing request.
    pub(crate) fn apply(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Self::ApiKey(key) => request.header(API_KEY_HEADER, key),
            Self::Bearer(token) => request.bearer_auth(token),
        }
    }
}

/// Resolves the configured strategies into a concrete credential, building
/// the service-account provider (and its token cache) once per client.
pub(crate) struct AuthResolver {
    api_key: Option<String>,
    service_account: Option<ServiceAccountTokenProvider>,
    host_identity: Option<Arc<dyn TokenProvider>>,
}

impl AuthResolver {
    pub(crate) fn new(config: AuthConfig, http: reqwest::Client) -> Self {
        let AuthConfig {
            api_key,
            service_account,
            service_account_assertion,
            host_identity,
        } = config;
        let service_account = service_account.map(|creds| match service_account_assertion {
            Some(assertion) => {
                ServiceAccountTokenProvider::new_with_assertion_override(creds, http, assertion)
            }
            None => ServiceAccountTokenProvider::new(creds, http),
        });
        Self {
            api_key,
            service_account,
            host_identity,
        }
    }

    /// Selects exactly one credential-attachment strategy in priority order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Credential`] when no strategy is configured or the
    /// selected strategy fails to produce a token.
    pub(crate) async fn resolve(&self) -> Result<Credential> {
        if let Some(key) = &self.api_key {
            return Ok(Credential::ApiKey(key.clone()));
        }
        if let Some(provider) = &self.service_account {
            return Ok(Credential::Bearer(provider.token().await?));
        }
        if let Some(provider) = &self.host_identity {
            return Ok(Credential::Bearer(provider.token().await?));
        }
        Err(Error::Credential(
            "no credential configured: set an API key, service account, or host identity provider"
                .to_string(),
        ))
    }
}
