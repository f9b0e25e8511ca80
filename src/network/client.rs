//! HTTP client for the PDF search service

use crate::config::{OutgoingSettings, Settings};
use crate::error::ServiceError;
use crate::query::QueryDescriptor;
use crate::search::{SearchService, ServiceReply};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// HTTP client bound to one search endpoint
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    endpoint: Url,
}

impl HttpClient {
    /// Create a client for the endpoint described by the settings
    pub fn with_settings(settings: &Settings) -> Result<Self> {
        Self::with_endpoint(settings.endpoint()?, &settings.outgoing)
    }

    /// Create a client for an explicit endpoint
    pub fn with_endpoint(endpoint: Url, settings: &OutgoingSettings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let timeout = Duration::try_from_secs_f64(settings.request_timeout).with_context(|| {
            format!("invalid request timeout {}", settings.request_timeout)
        })?;

        let mut builder = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent(settings.useragent_suffix.as_deref()))
            .default_headers(headers)
            .gzip(true)
            .brotli(true);

        // SSL verification
        if !settings.verify_ssl {
            builder = builder.danger_accept_invalid_certs(true);
        }

        // Proxy settings
        if let Some(ref proxy_url) = settings.proxies.all {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        } else {
            if let Some(ref http) = settings.proxies.http {
                builder = builder.proxy(reqwest::Proxy::http(http)?);
            }
            if let Some(ref https) = settings.proxies.https {
                builder = builder.proxy(reqwest::Proxy::https(https)?);
            }
        }

        let client = builder.build()?;

        Ok(Self { client, endpoint })
    }

    /// Search endpoint this client talks to
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl SearchService for HttpClient {
    async fn search(&self, query: &QueryDescriptor) -> Result<ServiceReply, ServiceError> {
        debug!("GET {} with {:?}", self.endpoint, query);

        let response = self
            .client
            .get(self.endpoint.clone())
            .query(query)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        debug!("Service answered {} ({} bytes)", status, body.len());

        if !status.is_success() {
            return Err(ServiceError::Http {
                status: status.as_u16(),
                detail: error_detail(&body),
            });
        }

        Ok(serde_json::from_slice(&body)?)
    }
}

fn user_agent(suffix: Option<&str>) -> String {
    let base = format!("pdf-search/{}", crate::VERSION);
    match suffix {
        Some(suffix) if !suffix.trim().is_empty() => format!("{} {}", base, suffix.trim()),
        _ => base,
    }
}

/// Error body returned with non-success statuses
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<Detail>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Detail {
    Text(String),
    /// Request validation errors, one entry per offending parameter
    Items(Vec<DetailItem>),
    Other(serde_json::Value),
}

#[derive(Debug, Deserialize)]
struct DetailItem {
    msg: String,
}

/// Pull a human-readable detail out of an error body, if there is one
fn error_detail(body: &[u8]) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_slice(body).ok()?;
    let detail = match parsed.detail? {
        Detail::Text(text) => text,
        Detail::Items(items) => items
            .into_iter()
            .map(|item| item.msg)
            .filter(|msg| !msg.is_empty())
            .collect::<Vec<_>>()
            .join("; "),
        Detail::Other(_) => return None,
    };

    (!detail.trim().is_empty()).then_some(detail)
}
