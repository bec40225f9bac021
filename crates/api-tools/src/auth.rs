//! Credential derivation for outbound API calls.

use crate::config::CredentialConfig;
use base64::Engine as _;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Derives authentication headers and query parameters from static
/// credential configuration.
///
/// Construction captures the config; every derivation is a pure function of
/// it. Secret values (tokens, passwords, key values) are never logged.
#[derive(Debug, Clone, Default)]
pub struct CredentialProvider {
    config: CredentialConfig,
}

impl CredentialProvider {
    #[must_use]
    pub fn new(config: CredentialConfig) -> Self {
        debug!(
            auth_type = config.auth_type.as_deref().unwrap_or("none"),
            "initialized credential provider"
        );
        Self { config }
    }

    /// Headers to attach to every outbound request.
    ///
    /// Empty for query-delivered API keys (see [`Self::query_params`]) and
    /// for unset or unknown auth types; the latter only logs a warning.
    #[must_use]
    pub fn headers(&self) -> BTreeMap<String, String> {
        let Some(auth_type) = self.config.auth_type.as_deref() else {
            return BTreeMap::new();
        };

        match auth_type {
            "apiKey" => self.api_key_header(),
            "http" => self.http_auth_header(),
            "oauth2" => self.oauth2_header(),
            other => {
                warn!(auth_type = other, "unknown auth type; sending requests unauthenticated");
                BTreeMap::new()
            }
        }
    }

    /// Query parameters to attach to every outbound request.
    ///
    /// Non-empty only for API keys delivered in the query string.
    #[must_use]
    pub fn query_params(&self) -> BTreeMap<String, String> {
        let creds = &self.config.credentials;
        if self.config.auth_type.as_deref() == Some("apiKey")
            && creds.location.as_deref() == Some("query")
        {
            let name = creds.name.clone().unwrap_or_else(|| "api_key".to_string());
            let value = creds.value.clone().unwrap_or_default();
            return BTreeMap::from([(name, value)]);
        }
        BTreeMap::new()
    }

    /// True iff an auth type is selected and at least one credential field
    /// is set.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.config.auth_type.is_some() && !self.config.credentials.is_empty()
    }

    fn api_key_header(&self) -> BTreeMap<String, String> {
        let creds = &self.config.credentials;
        if creds.location.as_deref().unwrap_or("header") != "header" {
            // Query-string keys are handled by `query_params`.
            return BTreeMap::new();
        }

        let name = creds.name.clone().unwrap_or_else(|| "X-API-Key".to_string());
        let value = creds.value.clone().unwrap_or_default();
        debug!(header = %name, "using API key in header");
        BTreeMap::from([(name, value)])
    }

    fn http_auth_header(&self) -> BTreeMap<String, String> {
        let creds = &self.config.credentials;
        let scheme = creds
            .scheme
            .as_deref()
            .unwrap_or("bearer")
            .to_ascii_lowercase();

        match scheme.as_str() {
            "bearer" => {
                let token = creds.token.as_deref().unwrap_or_default();
                debug!("using Bearer authentication");
                authorization(format!("Bearer {token}"))
            }
            "basic" => {
                let username = creds.username.as_deref().unwrap_or_default();
                let password = creds.password.as_deref().unwrap_or_default();
                let encoded = base64::engine::general_purpose::STANDARD
                    .encode(format!("{username}:{password}"));
                debug!("using Basic authentication");
                authorization(format!("Basic {encoded}"))
            }
            other => {
                warn!(scheme = other, "unknown HTTP auth scheme");
                BTreeMap::new()
            }
        }
    }

    fn oauth2_header(&self) -> BTreeMap<String, String> {
        match self.config.credentials.access_token.as_deref() {
            Some(token) if !token.is_empty() => {
                debug!("using OAuth2 access token");
                authorization(format!("Bearer {token}"))
            }
            _ => {
                warn!("oauth2 access_token not provided; sending requests unauthenticated");
                BTreeMap::new()
            }
        }
    }
}

fn authorization(value: String) -> BTreeMap<String, String> {
    BTreeMap::from([("Authorization".to_string(), value)])
}
