//! Request execution with credential refresh.
//!
//! [`RequestExecutor::execute`] resolves placeholders, attaches the stored
//! credential, sends the request and, when the server signals the credential
//! is no longer accepted, refreshes it and sends the request exactly once more.
//! It never validates business fields; that is left to the caller.

pub mod error;
pub mod transport;

pub use error::ExecuteError;
pub use transport::HttpTransport;

use crate::auth::scheme::{authorization_value, AUTHORIZATION_HEADER};
use crate::auth::CredentialManager;
use crate::context::RunContext;
use crate::models::{find_header, parse_raw_headers, RequestDescriptor, ResponseDescriptor};
use crate::variables::{ParameterResolver, ResolveScope};
use std::collections::HashMap;
use std::sync::Arc;

const CONTENT_TYPE_HEADER: &str = "Content-Type";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Whether a response says the current credential is no longer accepted.
///
/// Only the body is inspected: a non-empty marker anywhere in it, or a JSON
/// object body whose top-level `code` is 401. The HTTP status is left alone
/// so rows can expect a plain 401.
pub fn is_credential_invalid(response: &ResponseDescriptor, markers: &[String]) -> bool {
    if markers
        .iter()
        .any(|marker| !marker.is_empty() && response.body.contains(marker.as_str()))
    {
        return true;
    }

    response.body_code() == Some(401)
}

/// Executes requests for one run.
#[derive(Debug, Clone)]
pub struct RequestExecutor {
    ctx: RunContext,
    transport: HttpTransport,
    credentials: Arc<CredentialManager>,
}

impl RequestExecutor {
    /// Creates an executor with its own transport and credential manager.
    pub fn new(ctx: RunContext) -> Result<Self, ExecuteError> {
        let transport = HttpTransport::new()?;
        let credentials = Arc::new(CredentialManager::new(ctx.clone(), transport.clone()));
        Ok(Self::with_parts(ctx, transport, credentials))
    }

    /// Creates an executor sharing an existing transport and credential manager.
    pub fn with_parts(
        ctx: RunContext,
        transport: HttpTransport,
        credentials: Arc<CredentialManager>,
    ) -> Self {
        Self {
            ctx,
            transport,
            credentials,
        }
    }

    pub fn context(&self) -> &RunContext {
        &self.ctx
    }

    pub fn credentials(&self) -> &Arc<CredentialManager> {
        &self.credentials
    }

    /// Sends `request` and returns the final response.
    ///
    /// At most one refresh-and-retry happens per call. The retry re-resolves
    /// headers and body so placeholders see the refreshed variables.
    ///
    /// # Errors
    ///
    /// - [`ExecuteError::ResourceNotFound`] on a 404 from either attempt
    /// - [`ExecuteError::CredentialInvalid`] when the retry is still rejected
    /// - [`ExecuteError::Auth`] when the refresh itself fails
    /// - transport variants for network, timeout and URL problems
    pub async fn execute(
        &self,
        request: &RequestDescriptor,
    ) -> Result<ResponseDescriptor, ExecuteError> {
        let resolver = self.ctx.resolver();
        let url = self.resolve_url(&resolver, &request.url)?;

        let (first, sent_token) = self.attempt(&resolver, request, &url, None).await?;
        self.check_not_found(&url, request, &first)?;

        if !is_credential_invalid(&first, &self.ctx.config.invalid_markers) {
            return Ok(first);
        }

        log::info!(
            "{} {} rejected the credential (status {}), refreshing",
            request.method,
            url,
            first.status_code
        );
        let refreshed = self.credentials.refresh_after(sent_token.as_deref()).await?;

        let (retry, _) = self
            .attempt(&resolver, request, &url, Some(refreshed.as_str()))
            .await?;
        self.check_not_found(&url, request, &retry)?;

        if is_credential_invalid(&retry, &self.ctx.config.invalid_markers) {
            log::error!("{} {} still rejected after refresh", request.method, url);
            return Err(ExecuteError::CredentialInvalid {
                url,
                response: retry,
            });
        }

        Ok(retry)
    }

    fn resolve_url(&self, resolver: &ParameterResolver, raw: &str) -> Result<String, ExecuteError> {
        let resolved = resolver.resolve(raw, ResolveScope::Dynamic);
        let absolute = self.ctx.config.absolute_url(resolved.trim());

        let parsed = url::Url::parse(&absolute)?;
        match parsed.scheme() {
            "http" | "https" => Ok(absolute),
            other => Err(ExecuteError::InvalidUrl(format!(
                "unsupported scheme '{}' in {}",
                other, absolute
            ))),
        }
    }

    fn check_not_found(
        &self,
        url: &str,
        request: &RequestDescriptor,
        response: &ResponseDescriptor,
    ) -> Result<(), ExecuteError> {
        if response.status_code == 404 {
            log::warn!("{} {} returned 404", request.method, url);
            return Err(ExecuteError::ResourceNotFound {
                url: url.to_string(),
                response: response.clone(),
            });
        }
        Ok(())
    }

    /// Sends one attempt and returns the response with the stored token that
    /// was current when the request was built.
    ///
    /// `refreshed` overwrites any `Authorization` header, explicit or not.
    async fn attempt(
        &self,
        resolver: &ParameterResolver,
        request: &RequestDescriptor,
        url: &str,
        refreshed: Option<&str>,
    ) -> Result<(ResponseDescriptor, Option<String>), ExecuteError> {
        let config = &self.ctx.config;

        let stored = self.credentials.token();
        let raw_headers = resolver.resolve(&request.raw_headers, ResolveScope::Dynamic);
        let headers = self.assemble_headers(
            parse_raw_headers(&raw_headers),
            request,
            refreshed.or(stored.as_deref()),
            refreshed.is_some(),
        );

        let body = if request.method.sends_body() {
            Some(resolver.resolve(request.body.as_deref().unwrap_or(""), ResolveScope::Dynamic))
        } else {
            None
        };

        let response = self
            .transport
            .send(
                request.method,
                url,
                body.as_deref(),
                &headers,
                config.timeout_duration(),
            )
            .await
            .map_err(|e| {
                log::warn!("{} {} failed: {}", request.method, url, e);
                e
            })?;

        log::debug!(
            "{} {} -> {} in {}ms: {}",
            request.method,
            url,
            response.status_code,
            response.duration_ms,
            response.body_preview()
        );

        Ok((response, stored))
    }

    fn assemble_headers(
        &self,
        mut headers: HashMap<String, String>,
        request: &RequestDescriptor,
        token: Option<&str>,
        replace_authorization: bool,
    ) -> HashMap<String, String> {
        let config = &self.ctx.config;

        for (name, value) in &config.default_headers {
            if find_header(&headers, name).is_none() {
                headers.insert(name.clone(), value.clone());
            }
        }

        if replace_authorization {
            headers.retain(|name, _| !name.eq_ignore_ascii_case(AUTHORIZATION_HEADER));
        }
        if find_header(&headers, AUTHORIZATION_HEADER).is_none() {
            if let Some(token) = token {
                headers.insert(
                    AUTHORIZATION_HEADER.to_string(),
                    authorization_value(config.token_scheme, token),
                );
            }
        }

        if request.method.sends_body() && find_header(&headers, CONTENT_TYPE_HEADER).is_none() {
            headers.insert(
                CONTENT_TYPE_HEADER.to_string(),
                JSON_CONTENT_TYPE.to_string(),
            );
        }

        headers
    }
}
