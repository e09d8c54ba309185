//! Discord-style webhook channel.
//!
//! Messages are posted with `POST {url}?wait=true` (so the created message,
//! and its id, come back in the response) and addressed afterwards through
//! `{url}/messages/{id}`. Query parameters of the configured URL, such as
//! `thread_id`, are carried on every request.
//!
//! Requests through one channel go out one at a time. The client honors the
//! `X-RateLimit-*` headers by holding the next request until the bucket
//! resets, and answers a `429` by waiting out `Retry-After` and re-issuing
//! the same request. Any other failure is returned as is.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, ClientBuilder, Method, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::Instant;

use docmirror_core::{Message, MessageId};

use crate::error::{ChannelError, Result};
use crate::traits::{Channel, MessageOptions};

const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";
const RATE_LIMIT_RESET_AFTER: &str = "x-ratelimit-reset-after";
const RETRY_AFTER: &str = "retry-after";

/// Times one request is re-issued after a `429` before the `429` is returned.
const MAX_RATE_LIMITED_ATTEMPTS: u32 = 5;

/// Wait used when a `429` carries no usable delay.
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(1);

/// Configuration for a webhook channel.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Full webhook URL, including the token.
    pub url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl WebhookConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Channel backed by a webhook REST endpoint.
pub struct WebhookChannel {
    base_url: String,
    /// Query pairs of the configured URL, minus `wait`.
    query: Vec<(String, String)>,
    http: Client,
    /// Earliest instant the next request may go out. Held for the whole of
    /// each request.
    gate: Mutex<Option<Instant>>,
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    allowed_mentions: Option<AllowedMentions>,
}

#[derive(Debug, Serialize)]
struct AllowedMentions {
    parse: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct WebhookMessage {
    id: String,
    #[serde(default)]
    content: String,
}

impl WebhookPayload<'_> {
    fn new(content: &str, options: MessageOptions) -> WebhookPayload<'_> {
        WebhookPayload {
            content,
            allowed_mentions: options
                .suppress_mentions
                .then(|| AllowedMentions { parse: Vec::new() }),
        }
    }
}

impl WebhookChannel {
    /// Create a channel for `url` with default settings.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::with_config(WebhookConfig::new(url))
    }

    pub fn with_config(config: WebhookConfig) -> Result<Self> {
        Self::with_client_builder(config, Client::builder())
    }

    fn with_client_builder(config: WebhookConfig, builder: ClientBuilder) -> Result<Self> {
        let (base_url, query) = parse_url(&config.url)?;
        let http = builder.timeout(config.timeout).build()?;
        Ok(Self {
            base_url,
            query,
            http,
            gate: Mutex::new(None),
        })
    }

    fn create_request(&self) -> RequestBuilder {
        self.http
            .post(&self.base_url)
            .query(&[("wait", "true")])
            .query(&self.query)
    }

    fn message_request(&self, method: Method, id: &MessageId) -> RequestBuilder {
        let url = format!("{}/messages/{}", self.base_url, id);
        self.http.request(method, url).query(&self.query)
    }

    /// Send a request once the rate limit allows it.
    async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let mut request = request.build()?;
        let mut gate = self.gate.lock().await;
        let mut rate_limited = 0;

        loop {
            if let Some(at) = *gate {
                let now = Instant::now();
                if at > now {
                    tracing::debug!("waiting {:?} for webhook rate limit", at - now);
                    tokio::time::sleep_until(at).await;
                }
            }

            let retry = request.try_clone();
            let response = self.http.execute(request).await?;
            *gate = bucket_reset(response.headers());

            if response.status() != StatusCode::TOO_MANY_REQUESTS {
                return Ok(response);
            }
            match retry {
                Some(next) if rate_limited < MAX_RATE_LIMITED_ATTEMPTS => {
                    let wait = retry_after(response.headers());
                    rate_limited += 1;
                    tracing::warn!(
                        attempt = rate_limited,
                        "webhook rate limited, retrying in {:?}",
                        wait
                    );
                    *gate = Some(Instant::now() + wait);
                    request = next;
                }
                _ => return Ok(response),
            }
        }
    }

    async fn write_message(
        &self,
        request: RequestBuilder,
        content: &str,
        options: MessageOptions,
    ) -> Result<MessageId> {
        let request = request.json(&WebhookPayload::new(content, options));
        let response = check_status(self.execute(request).await?, None).await?;

        let message: WebhookMessage = response
            .json()
            .await
            .map_err(|e| ChannelError::Decode(e.to_string()))?;
        Ok(MessageId::new(message.id))
    }
}

#[async_trait]
impl Channel for WebhookChannel {
    async fn fetch(&self, id: &MessageId) -> Result<Message> {
        let request = self.message_request(Method::GET, id);
        let response = check_status(self.execute(request).await?, Some(id)).await?;

        let message: WebhookMessage = response
            .json()
            .await
            .map_err(|e| ChannelError::Decode(e.to_string()))?;
        Ok(Message::new(message.id, message.content))
    }

    async fn send(&self, content: &str, options: MessageOptions) -> Result<MessageId> {
        self.write_message(self.create_request(), content, options)
            .await
    }

    async fn edit(
        &self,
        id: &MessageId,
        content: &str,
        options: MessageOptions,
    ) -> Result<MessageId> {
        let request = self.message_request(Method::PATCH, id);
        self.write_message(request, content, options).await
    }

    async fn delete(&self, id: &MessageId) -> Result<()> {
        let request = self.message_request(Method::DELETE, id);
        check_status(self.execute(request).await?, Some(id)).await?;
        Ok(())
    }
}

fn header_secs(headers: &HeaderMap, name: &str) -> Option<Duration> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|secs| secs.is_finite() && *secs > 0.0)
        .map(Duration::from_secs_f64)
}

/// When the bucket refills, if this response emptied it.
fn bucket_reset(headers: &HeaderMap) -> Option<Instant> {
    let remaining = headers
        .get(RATE_LIMIT_REMAINING)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());
    match remaining {
        Some(0) => header_secs(headers, RATE_LIMIT_RESET_AFTER).map(|wait| Instant::now() + wait),
        _ => None,
    }
}

/// Delay asked for by a `429`.
fn retry_after(headers: &HeaderMap) -> Duration {
    header_secs(headers, RETRY_AFTER)
        .or_else(|| header_secs(headers, RATE_LIMIT_RESET_AFTER))
        .unwrap_or(DEFAULT_RETRY_AFTER)
}

/// Map non-success responses to errors.
async fn check_status(response: Response, id: Option<&MessageId>) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if let (StatusCode::NOT_FOUND, Some(id)) = (status, id) {
        return Err(ChannelError::NotFound(id.clone()));
    }

    let body = response.text().await.unwrap_or_default();
    Err(ChannelError::Http {
        status: status.as_u16(),
        body,
    })
}

/// Split a webhook URL into its base, without trailing slashes, and its
/// query pairs.
fn parse_url(url: &str) -> Result<(String, Vec<(String, String)>)> {
    let mut parsed =
        Url::parse(url.trim()).map_err(|e| ChannelError::InvalidUrl(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ChannelError::InvalidUrl("expected an http(s) url".into()));
    }

    let query = parsed
        .query_pairs()
        .filter(|(key, _)| key != "wait")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    parsed.set_query(None);
    parsed.set_fragment(None);

    Ok((parsed.as_str().trim_end_matches('/').to_string(), query))
}
