// src/utils/http.rs

//! HTTP client utilities.
//!
//! Business failures from the roster service arrive as HTTP 200 with a flag
//! in the body; anything other than 2xx is a transport failure and is never
//! decoded.

use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{AppError, Result};
use crate::models::CrawlerConfig;

/// Create a configured asynchronous HTTP client.
///
/// Default headers mimic the vendor's own web client.
pub fn create_client(config: &CrawlerConfig) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.5"),
    );
    headers.insert(
        "X-Requested-With",
        HeaderValue::from_static("XMLHttpRequest"),
    );

    let client = Client::builder()
        .user_agent(&config.user_agent)
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Create a plain client for third-party APIs such as the vision model.
///
/// Carries none of the vendor-mimicking headers from `create_client`.
pub fn create_api_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// GET `url` and decode the JSON body.
pub async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    referer: Option<&str>,
) -> Result<T> {
    let request = with_referer(client.get(url), referer);
    send_json(request, url).await
}

/// POST `body` as JSON to `url` and decode the JSON response.
pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
    client: &Client,
    url: &str,
    body: &B,
    referer: Option<&str>,
) -> Result<T> {
    let request = client
        .post(url)
        .header(header::CONTENT_TYPE, "application/json; charset=utf-8")
        .json(body);
    let request = with_referer(request, referer);
    send_json(request, url).await
}

fn with_referer(request: RequestBuilder, referer: Option<&str>) -> RequestBuilder {
    match referer {
        Some(referer) => request.header(header::REFERER, referer),
        None => request,
    }
}

async fn send_json<T: DeserializeOwned>(request: RequestBuilder, url: &str) -> Result<T> {
    let response = request.send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let bytes = response.bytes().await?;
    decode_body(url, &bytes)
}

/// Decode a response body, attributing failures to `url`.
pub fn decode_body<T: DeserializeOwned>(url: &str, bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|source| AppError::Decode {
        url: url.to_string(),
        source,
    })
}
