use std::fmt;

use async_trait::async_trait;
use reqwest::{header::ACCEPT, Client, Response};
use shared::{
    domain::SubscriptionId,
    error::ClientError,
    protocol::{
        DeleteSubscriptionQuery, GoogleErrorResponse, ListSubscriptionsQuery,
        SubscriptionListResponse,
    },
};
use tracing::{debug, warn};

pub mod consumer;
pub mod fetcher;
pub mod images;

pub use consumer::{swipe_shared, PendingRemoval, SwipeOutcome, SwipePhase, SwipeSession};
pub use fetcher::{fetch_subscriptions, normalize_item, sort_subscriptions, PAGE_SIZE};
pub use images::ImageOptions;

pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";
const TOKEN_LOG_PREFIX_LEN: usize = 10;

/// OAuth bearer token issued by the identity provider. Opaque to this crate.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(raw: impl Into<String>) -> Result<Self, ClientError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(ClientError::MissingCredential);
        }
        Ok(Self(raw))
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(TOKEN_LOG_PREFIX_LEN).collect();
        write!(f, "AccessToken({prefix}...)")
    }
}

/// Remote operations the fetcher and the swipe session depend on.
#[async_trait]
pub trait SubscriptionsApi: Send + Sync {
    async fn list_page(
        &self,
        token: &AccessToken,
        page_token: Option<&str>,
    ) -> Result<SubscriptionListResponse, ClientError>;

    async fn delete_subscription(
        &self,
        token: &AccessToken,
        id: &SubscriptionId,
    ) -> Result<(), ClientError>;
}

pub struct YouTubeClient {
    http: Client,
    api_base_url: String,
}

impl Default for YouTubeClient {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}

impl YouTubeClient {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self::with_http(Client::new(), api_base_url)
    }

    pub fn with_http(http: Client, api_base_url: impl Into<String>) -> Self {
        Self {
            http,
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    fn subscriptions_url(&self) -> String {
        format!("{}/subscriptions", self.api_base_url)
    }
}

#[async_trait]
impl SubscriptionsApi for YouTubeClient {
    async fn list_page(
        &self,
        token: &AccessToken,
        page_token: Option<&str>,
    ) -> Result<SubscriptionListResponse, ClientError> {
        let res = self
            .http
            .get(self.subscriptions_url())
            .bearer_auth(token.secret())
            .header(ACCEPT, "application/json")
            .query(&ListSubscriptionsQuery::mine(PAGE_SIZE, page_token))
            .send()
            .await
            .map_err(network)?;
        debug!(status = res.status().as_u16(), ?token, "subscriptions list response");

        let res = ensure_success(res).await?;
        let status = res.status().as_u16();
        res.json::<SubscriptionListResponse>()
            .await
            .map_err(|err| ClientError::remote(status, format!("malformed response: {err}")))
    }

    async fn delete_subscription(
        &self,
        token: &AccessToken,
        id: &SubscriptionId,
    ) -> Result<(), ClientError> {
        let res = self
            .http
            .delete(self.subscriptions_url())
            .bearer_auth(token.secret())
            .header(ACCEPT, "application/json")
            .query(&DeleteSubscriptionQuery {
                id: id.0.clone(),
            })
            .send()
            .await
            .map_err(network)?;
        debug!(status = res.status().as_u16(), subscription_id = %id, "subscription delete response");

        ensure_success(res).await?;
        Ok(())
    }
}

async fn ensure_success(res: Response) -> Result<Response, ClientError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let body = res.text().await.unwrap_or_default();
    let message = serde_json::from_str::<GoogleErrorResponse>(&body)
        .ok()
        .and_then(|parsed| parsed.message().map(str::to_string))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });
    warn!(status = status.as_u16(), %message, "YouTube API rejected request");
    Err(ClientError::remote(status.as_u16(), message))
}

fn network(err: reqwest::Error) -> ClientError {
    ClientError::Network(err.to_string())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
