//! Admin REST transport.
//!
//! Thin JSON client with bearer authentication. It only forwards requests: no
//! retries and no backoff. Non-2xx responses become [`AdminError::Api`], with
//! the message taken from the body's `message` or `error` field when present.

use crate::config::AdminConfig;
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing configuration: {0}")]
    MissingConfig(&'static str),

    #[error("{message}")]
    Api { status: u16, message: String },
}

/// Builds the error message for a failed response.
pub fn extract_error_message(status: StatusCode, body: &str) -> String {
    let from_body = serde_json::from_str::<Value>(body).ok().and_then(|json| {
        ["message", "error"].iter().find_map(|field| {
            json.get(field)
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string)
        })
    });

    from_body.unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()))
}

#[derive(Debug, Clone)]
pub struct AdminClient {
    base_url: Url,
    api_token: String,
    client: Client,
}

impl AdminClient {
    pub fn new(config: AdminConfig) -> Result<Self, AdminError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            base_url: config.base_url,
            api_token: config.api_token,
            client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, AdminError> {
        let json = self.send(Method::GET, path, None::<&()>).await?;
        Ok(serde_json::from_value(json)?)
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, AdminError> {
        let json = self.send(Method::POST, path, Some(body)).await?;
        Ok(serde_json::from_value(json)?)
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, AdminError> {
        let json = self.send(Method::PUT, path, Some(body)).await?;
        Ok(serde_json::from_value(json)?)
    }

    pub async fn delete(&self, path: &str) -> Result<(), AdminError> {
        self.send(Method::DELETE, path, None::<&()>).await?;
        Ok(())
    }

    async fn send<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Value, AdminError> {
        let url = self.base_url.join(path)?;
        debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method, url)
            .bearer_auth(&self.api_token)
            .header("Accept", "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            if text.trim().is_empty() {
                Ok(Value::Null)
            } else {
                Ok(serde_json::from_str(&text)?)
            }
        } else {
            warn!("admin API error: {} - {}", status, text);
            Err(AdminError::Api {
                status: status.as_u16(),
                message: extract_error_message(status, &text),
            })
        }
    }
}
