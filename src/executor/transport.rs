//! Native HTTP transport using reqwest.
//!
//! One [`HttpTransport`] wraps a `reqwest::Client`; clones share its
//! connection pool, so a single transport serves the whole run.

use crate::executor::error::ExecuteError;
use crate::models::{HttpMethod, ResponseDescriptor};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Sends fully resolved requests and captures the response.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport with its own connection pool.
    pub fn new() -> Result<Self, ExecuteError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ExecuteError::BuildError(e.to_string()))?;
        Ok(Self { client })
    }

    /// Wraps an existing client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Performs one HTTP attempt.
    ///
    /// `timeout` bounds the whole attempt, body read included. Repeated
    /// response headers are joined with `;`.
    pub async fn send(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<&str>,
        headers: &HashMap<String, String>,
        timeout: Duration,
    ) -> Result<ResponseDescriptor, ExecuteError> {
        let start_time = Instant::now();

        let method = match method {
            HttpMethod::GET => reqwest::Method::GET,
            HttpMethod::POST => reqwest::Method::POST,
            HttpMethod::PUT => reqwest::Method::PUT,
            HttpMethod::DELETE => reqwest::Method::DELETE,
            HttpMethod::PATCH => reqwest::Method::PATCH,
        };

        let mut req_builder = self.client.request(method, url).timeout(timeout);

        for (name, value) in headers {
            req_builder = req_builder.header(name.as_str(), value.as_str());
        }

        if let Some(body) = body {
            req_builder = req_builder.body(body.to_string());
        }

        let response = req_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ExecuteError::Timeout
            } else if e.is_connect() {
                ExecuteError::NetworkError(format!("Connection failed: {}", e))
            } else {
                ExecuteError::from(e)
            }
        })?;

        let status_code = response.status().as_u16();

        let mut response_headers = HashMap::new();
        for name in response.headers().keys() {
            let joined = response
                .headers()
                .get_all(name)
                .iter()
                .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
                .collect::<Vec<_>>()
                .join(";");
            response_headers.insert(name.as_str().to_string(), joined);
        }

        let body = response.text().await?;

        Ok(ResponseDescriptor {
            status_code,
            body,
            headers: response_headers,
            duration_ms: start_time.elapsed().as_millis() as u64,
        })
    }
}
