//! Consul key/value source

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use crate::error::{Result, SourceError};
use crate::traits::StateSource;

/// Default Consul HTTP address
pub const DEFAULT_CONSUL_ADDRESS: &str = "http://127.0.0.1:8500";

/// Header carrying the ACL token
const TOKEN_HEADER: &str = "X-Consul-Token";

/// One entry of a KV read response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct KvPair {
    key: String,
    /// Base64 encoded value, `null` for an empty key
    value: Option<String>,
}

/// Reads a state document stored under `<prefix>:<project>` in Consul KV
#[derive(Debug, Clone)]
pub struct ConsulSource {
    client: Client,
    base_url: Url,
    prefix: String,
    project: String,
    datacenter: Option<String>,
    token: Option<String>,
}

impl ConsulSource {
    /// Create a source reading `<prefix>:<project>` from the agent at `address`
    ///
    /// # Errors
    /// Returns an error if the address is not a valid URL.
    ///
    /// # Example
    /// ```no_run
    /// use tfinv_source::{ConsulSource, StateSource};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let source = ConsulSource::new("http://127.0.0.1:8500", "tfstate", "demo")?
    ///     .with_datacenter("infra1");
    /// let bytes = source.fetch().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(
        address: impl AsRef<str>,
        prefix: impl Into<String>,
        project: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            client: Client::new(),
            base_url: Url::parse(address.as_ref())?,
            prefix: prefix.into(),
            project: project.into(),
            datacenter: None,
            token: None,
        })
    }

    /// Use a custom `reqwest::Client`
    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Query a specific datacenter
    #[must_use]
    pub fn with_datacenter(mut self, datacenter: impl Into<String>) -> Self {
        self.datacenter = Some(datacenter.into());
        self
    }

    /// Authenticate with an ACL token
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Key the state is stored under
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}:{}", self.prefix, self.project)
    }

    /// Build the KV read URL
    fn url(&self) -> Result<Url> {
        let mut url = self.base_url.clone();
        let key = self.key();

        url.path_segments_mut()
            .map_err(|()| SourceError::InvalidAddress(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["v1", "kv"])
            .extend(key.split('/'));

        if let Some(dc) = &self.datacenter {
            url.query_pairs_mut().append_pair("dc", dc);
        }

        Ok(url)
    }
}

/// Decode the stored value of the first KV entry
fn decode_value(key: &str, pairs: Vec<KvPair>) -> Result<Vec<u8>> {
    let pair = pairs
        .into_iter()
        .next()
        .ok_or_else(|| SourceError::NotFound(key.to_string()))?;

    match pair.value {
        Some(encoded) => Ok(STANDARD.decode(encoded)?),
        None => Err(SourceError::NotFound(pair.key)),
    }
}

#[async_trait]
impl StateSource for ConsulSource {
    #[instrument(skip(self), fields(key = %self.key()))]
    async fn fetch(&self) -> Result<Vec<u8>> {
        let url = self.url()?;
        debug!(url = %url, "reading state from consul");

        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.header(TOKEN_HEADER, token);
        }

        let response = request.send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound(self.key()));
        }

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(SourceError::Api { status, message });
        }

        let pairs: Vec<KvPair> = response.json().await?;
        let bytes = decode_value(&self.key(), pairs)?;

        debug!(bytes = bytes.len(), "read state document");
        Ok(bytes)
    }

    fn describe(&self) -> String {
        format!("consul {} key {}", self.base_url, self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_creation() {
        assert!(ConsulSource::new(DEFAULT_CONSUL_ADDRESS, "tfstate", "demo").is_ok());
        assert!(ConsulSource::new("not a url", "tfstate", "demo").is_err());
    }

    #[test]
    fn test_key_joins_prefix_and_project() {
        let source = ConsulSource::new(DEFAULT_CONSUL_ADDRESS, "cluster-tfstate", "demo").unwrap();
        assert_eq!(source.key(), "cluster-tfstate:demo");
    }

    #[test]
    fn test_url_building() {
        let source = ConsulSource::new("http://consul.local:8500", "tfstate", "demo")
            .unwrap()
            .with_datacenter("infra1");

        let url = source.url().unwrap();
        assert_eq!(
            url.as_str(),
            "http://consul.local:8500/v1/kv/tfstate:demo?dc=infra1"
        );
    }

    #[test]
    fn test_url_keeps_key_hierarchy() {
        let source = ConsulSource::new("http://consul.local:8500/", "infra/tfstate", "demo").unwrap();

        let url = source.url().unwrap();
        assert_eq!(url.path(), "/v1/kv/infra/tfstate:demo");
        assert!(url.query().is_none());
    }

    #[test]
    fn test_decode_value() {
        let pairs: Vec<KvPair> = serde_json::from_str(
            r#"[{"LockIndex": 0, "Key": "tfstate:demo", "Flags": 0,
                 "Value": "eyJtb2R1bGVzIjogW119", "CreateIndex": 10, "ModifyIndex": 12}]"#,
        )
        .unwrap();

        let bytes = decode_value("tfstate:demo", pairs).unwrap();
        assert_eq!(bytes, br#"{"modules": []}"#);
    }

    #[test]
    fn test_decode_empty_value() {
        let pairs: Vec<KvPair> =
            serde_json::from_str(r#"[{"Key": "tfstate:demo", "Value": null}]"#).unwrap();
        let err = decode_value("tfstate:demo", pairs).unwrap_err();
        assert!(matches!(err, SourceError::NotFound(ref key) if key == "tfstate:demo"));

        let err = decode_value("tfstate:demo", Vec::new()).unwrap_err();
        assert!(matches!(err, SourceError::NotFound(_)));
    }

    #[test]
    fn test_invalid_base64() {
        let pairs = vec![KvPair {
            key: "k".to_string(),
            value: Some("%%%".to_string()),
        }];
        assert!(matches!(
            decode_value("k", pairs),
            Err(SourceError::Base64(_))
        ));
    }
}
