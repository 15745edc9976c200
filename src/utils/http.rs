use std::sync::Arc;
use std::time::Duration;

use log::debug;
use reqwest::{Client, Proxy, StatusCode};

use crate::error::FetchError;
use crate::settings::Settings;
use crate::sync::Fetcher;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyConfig {
    pub proxy: Option<String>,
}

/// Interprets the `proxy` setting: `"NONE"` or empty means a direct
/// connection, anything else is handed to the HTTP client as a proxy URL.
pub fn parse_proxy(proxy_str: &str) -> ProxyConfig {
    let proxy_str = proxy_str.trim();
    if proxy_str.is_empty() || proxy_str.eq_ignore_ascii_case("NONE") {
        return ProxyConfig { proxy: None };
    }
    ProxyConfig {
        proxy: Some(proxy_str.to_string()),
    }
}

/// Makes an HTTP GET request to the specified URL
///
/// # Returns
/// * `Ok(String)` - The response body as a string
/// * `Err(FetchError)` - if the request failed, the status is not 200 or the
///   body is larger than `max_download_size`
pub async fn web_get_async(url: &str, settings: &Settings) -> Result<String, FetchError> {
    let mut client_builder = Client::builder()
        .timeout(Duration::from_secs(settings.fetch_timeout))
        .user_agent(settings.user_agent.as_str());

    if let Some(proxy) = parse_proxy(&settings.proxy).proxy {
        let proxy = Proxy::all(proxy.as_str()).map_err(|e| FetchError::Proxy(e.to_string()))?;
        client_builder = client_builder.proxy(proxy);
    }

    let client = client_builder
        .build()
        .map_err(|e| FetchError::Client(e.to_string()))?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| FetchError::Request(e.to_string()))?;

    if response.status() != StatusCode::OK {
        return Err(FetchError::Status(response.status().as_u16()));
    }

    if let Some(length) = response.content_length() {
        check_size(length, settings.max_download_size)?;
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| FetchError::Body(e.to_string()))?;
    check_size(body.len() as u64, settings.max_download_size)?;

    debug!("Fetched {} bytes from {}", body.len(), url);
    Ok(String::from_utf8_lossy(&body).into_owned())
}

/// Rejects bodies larger than `limit` bytes.
fn check_size(length: u64, limit: u64) -> Result<(), FetchError> {
    if length > limit {
        return Err(FetchError::TooLarge(limit));
    }
    Ok(())
}

/// Synchronous version of web_get_async, driven on a current-thread tokio
/// runtime. Must not be called from inside another runtime.
pub fn web_get(url: &str, settings: &Settings) -> Result<String, FetchError> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    rt.block_on(web_get_async(url, settings))
}

/// Network fetch collaborator backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    settings: Arc<Settings>,
}

impl HttpFetcher {
    pub fn new(settings: Arc<Settings>) -> Self {
        HttpFetcher { settings }
    }
}

impl Fetcher for HttpFetcher {
    fn http_get(&self, url: &str) -> Result<String, FetchError> {
        web_get(url, &self.settings)
    }
}
