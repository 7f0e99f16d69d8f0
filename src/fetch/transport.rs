//! Transport Module
//!
//! The remote read seam consumed by the message manager, plus the
//! reqwest-backed implementation of the three message endpoints.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{ChannelId, FetchQuery, MessageId, RawMessage};

// == Transport Trait ==
/// Remote reads against the message service.
///
/// The manager is generic over this trait; tests substitute an in-memory
/// implementation. No retries, rate limiting, or timeouts are expected
/// here beyond what the implementation itself provides.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Reads a single message by id.
    async fn message(&self, channel: &ChannelId, id: &MessageId) -> Result<RawMessage>;

    /// Reads a page of messages matching the query, in service order.
    async fn messages(&self, channel: &ChannelId, query: &FetchQuery) -> Result<Vec<RawMessage>>;

    /// Reads the channel's pinned messages, in service order.
    async fn pinned_messages(&self, channel: &ChannelId) -> Result<Vec<RawMessage>>;
}

// == HTTP Transport ==
/// reqwest-backed transport against the message service's REST API.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpTransport {
    // == Constructor ==
    /// Creates a transport from configuration.
    ///
    /// Fails with [`Error::InvalidBaseUrl`] if the configured base URL
    /// does not parse as an absolute URL.
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        reqwest::Url::parse(&base_url)
            .map_err(|e| Error::InvalidBaseUrl(format!("{base_url}: {e}")))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url,
            auth_token: config.auth_token.clone(),
        })
    }

    // == Request Helper ==
    /// Issues a GET and decodes the JSON body.
    ///
    /// Non-2xx statuses become [`Error::Api`]; callers specialize 404
    /// where a NotFound makes sense.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
        params: &[(&str, String)],
    ) -> Result<T> {
        let mut request = self.client.get(&url).query(params);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn message(&self, channel: &ChannelId, id: &MessageId) -> Result<RawMessage> {
        let url = format!("{}/channels/{}/messages/{}", self.base_url, channel, id);
        debug!(%channel, %id, "fetching message");

        match self.get_json(url, &[]).await {
            Err(Error::Api { status: 404, .. }) => Err(Error::NotFound {
                channel: channel.clone(),
                message: id.clone(),
            }),
            other => other,
        }
    }

    async fn messages(&self, channel: &ChannelId, query: &FetchQuery) -> Result<Vec<RawMessage>> {
        let url = format!("{}/channels/{}/messages", self.base_url, channel);

        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(limit) = query.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(before) = &query.before {
            params.push(("before", before.to_string()));
        }
        if let Some(after) = &query.after {
            params.push(("after", after.to_string()));
        }
        if let Some(around) = &query.around {
            params.push(("around", around.to_string()));
        }
        debug!(%channel, ?query, "fetching message page");

        self.get_json(url, &params).await
    }

    async fn pinned_messages(&self, channel: &ChannelId) -> Result<Vec<RawMessage>> {
        let url = format!("{}/channels/{}/pins", self.base_url, channel);
        debug!(%channel, "fetching pinned messages");

        self.get_json(url, &[]).await
    }
}
