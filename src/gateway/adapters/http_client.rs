//! HTTP transport backed by `reqwest`.

use crate::gateway::domain::{GatewayConfig, HttpMethod};
use crate::gateway::ports::{HttpTransport, TransportError, TransportRequest, TransportResponse};
use async_trait::async_trait;
use reqwest::{Client, Method};
use std::collections::BTreeMap;

/// [`HttpTransport`] over a shared, pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Builds a client configured from the gateway settings.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Io`] when the TLS backend cannot be
    /// initialized.
    pub fn new(config: &GatewayConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|err| TransportError::Io(err.to_string()))?;
        Ok(Self { client })
    }

    /// Wraps an existing client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let mut builder = self
            .client
            .request(method(request.method), &request.url)
            .timeout(request.timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let headers: BTreeMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|text| (name.as_str().to_ascii_lowercase(), text.to_owned()))
            })
            .collect();
        let body = response.text().await.map_err(classify)?;
        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

const fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_builder() {
        TransportError::InvalidRequest(err.to_string())
    } else if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else {
        TransportError::Io(err.to_string())
    }
}
