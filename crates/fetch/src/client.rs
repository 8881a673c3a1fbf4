use crate::error::{ErrorKind, Result};
use crate::wire::VolumesResponse;
use crate::{MetadataSource, Records};
use async_trait::async_trait;
use exn::ResultExt;
use reqwest::Url;
use std::time::Duration;
use tracing::instrument;

pub const DEFAULT_ENDPOINT: &str = "https://www.googleapis.com/books/v1/volumes";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Google Books `volumes` search client.
#[derive(Clone, Debug)]
pub struct GoogleBooks {
    client: reqwest::Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl GoogleBooks {
    /// Every request made by this client is bounded by `timeout`.
    pub fn new(endpoint: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let endpoint = Url::parse(endpoint).or_raise(|| ErrorKind::InvalidEndpoint(endpoint.to_string()))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .or_raise(|| ErrorKind::Client)?;
        let api_key = api_key.filter(|key| !key.is_empty());
        Ok(Self { client, endpoint, api_key })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl MetadataSource for GoogleBooks {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn search(&self, query: &str) -> Result<Records> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Records::empty());
        }
        let mut request = self.client.get(self.endpoint.clone()).query(&[("q", query)]);
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key.as_str())]);
        }
        let response = request.send().await.or_raise(|| ErrorKind::RemoteUnavailable)?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, "metadata search rejected");
            exn::bail!(ErrorKind::RemoteUnavailable);
        }
        let body: VolumesResponse = response.json().await.or_raise(|| ErrorKind::RemoteUnavailable)?;
        let volumes = body.items.unwrap_or_default();
        tracing::debug!(volumes = volumes.len(), "metadata search answered");
        Ok(Records::from_volumes(volumes))
    }
}
