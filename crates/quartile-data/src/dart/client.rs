//! HTTP client for the OpenDART API.

use crate::error::{DataError, Result};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// OpenDART API base URL
const DART_BASE_URL: &str = "https://opendart.fss.or.kr/api";

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// User agent sent with every request
const USER_AGENT: &str = "quartile/0.1 (+https://github.com/quartile-rs/quartile)";

/// DART status code for a successful response.
pub(crate) const STATUS_OK: &str = "000";

/// DART status code for "no data for this period".
pub(crate) const STATUS_NO_DATA: &str = "013";

/// OpenDART API client.
///
/// Every endpoint requires the caller's API key as the `crtfc_key` query
/// parameter; the client appends it on each request so the key never
/// appears at call sites.
pub struct DartClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl DartClient {
    /// Create a new client with the default timeout.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_timeout(api_key, DEFAULT_TIMEOUT)
    }

    /// Create a new client with a custom request timeout.
    pub fn with_timeout(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(DataError::Network)?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: DART_BASE_URL.to_string(),
        })
    }

    /// GET a JSON endpoint, deserializing the response body.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("crtfc_key", self.api_key.as_str())])
            .send()
            .await
            .map_err(DataError::Network)?;

        if !response.status().is_success() {
            return Err(DataError::Http(format!(
                "{endpoint}: HTTP {}",
                response.status()
            )));
        }

        response.json().await.map_err(DataError::Network)
    }

    /// GET a binary endpoint, returning the raw body.
    pub(crate) async fn get_bytes(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Vec<u8>> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("crtfc_key", self.api_key.as_str())])
            .send()
            .await
            .map_err(DataError::Network)?;

        if !response.status().is_success() {
            return Err(DataError::Http(format!(
                "{endpoint}: HTTP {}",
                response.status()
            )));
        }

        Ok(response.bytes().await.map_err(DataError::Network)?.to_vec())
    }
}

impl std::fmt::Debug for DartClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DartClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
