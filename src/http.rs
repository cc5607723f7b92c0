use crate::config::DownloadConfig;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use url::Url;

/// Retrieves raw playlist bodies over the network.
///
/// Implementations are shared between download workers and must tolerate
/// concurrent calls.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// GETs `url` and returns the body of a 2xx response.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// [`HttpClient`] backed by a single shared `reqwest::Client`.
///
/// # Examples
///
/// ```no_run
/// use iptv_manager::{Config, ReqwestClient};
/// use iptv_manager::http::HttpClient;
///
/// async fn example() {
///     let config = Config::default();
///     let client = ReqwestClient::new(&config.download).unwrap();
///     let body = client.fetch("https://example.com/list.m3u").await;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Builds a client with the configured User-Agent and request timeout.
    pub fn new(settings: &DownloadConfig) -> Result<Self> {
        Self::from_builder(Self::builder(settings))
    }

    /// Client builder preloaded with the download settings.
    pub fn builder(settings: &DownloadConfig) -> reqwest::ClientBuilder {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));

        reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(settings.timeout_duration())
            .default_headers(headers)
    }

    pub fn from_builder(builder: reqwest::ClientBuilder) -> Result<Self> {
        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let url = Url::parse(url)?;

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        Ok(body.to_vec())
    }
}
