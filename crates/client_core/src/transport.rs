use std::{error::Error as _, time::Duration};

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::error::FetchError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// `Err` only for transport failures; any response that arrived is `Ok`.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &Url) -> Result<HttpResponse, FetchError>;
}

pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }

    pub fn with_timeout(timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("failed to build http client")?;
        Ok(Self { http })
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &Url) -> Result<HttpResponse, FetchError> {
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|err| FetchError::Transport(transport_error_text(&err)))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            // The body of a failed response is never read.
            return Ok(HttpResponse::new(status, Vec::new()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| FetchError::Transport(transport_error_text(&err)))?;
        Ok(HttpResponse::new(status, body.to_vec()))
    }
}

fn transport_error_text(err: &reqwest::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}
