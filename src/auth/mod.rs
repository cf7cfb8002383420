//! Credential lifecycle.
//!
//! The [`CredentialManager`] logs in with the configured static credentials,
//! checks that the configured token field is present and writes the token into
//! the run's variable store. Refreshes are single-flight: concurrent callers
//! that were rejected with the same token share one login call.

pub mod scheme;

use crate::context::RunContext;
use crate::executor::transport::HttpTransport;
use crate::failure::FailureClass;
use crate::models::HttpMethod;
use crate::validator::node_text;
use crate::variables::ResolveScope;
use scheme::mask_token;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

/// Errors that can occur while logging in. All are fatal to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The login endpoint answered with a status other than 200.
    LoginRejected { status: u16, body: String },
    /// The response lacks the token field, or it is null or empty.
    MissingToken { field: String },
    /// The login call itself failed to complete.
    Transport(String),
}

impl AuthError {
    pub fn class(&self) -> FailureClass {
        FailureClass::AuthBootstrapFailure
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::LoginRejected { status, body } => {
                write!(f, "Login rejected with status {}: {}", status, body)
            }
            AuthError::MissingToken { field } => {
                write!(f, "Login response has no value at '{}'", field)
            }
            AuthError::Transport(msg) => write!(f, "Login request failed: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

/// Performs login and refresh calls for one run.
#[derive(Debug)]
pub struct CredentialManager {
    ctx: RunContext,
    transport: HttpTransport,
    refresh_lock: Mutex<()>,
    generation: AtomicU64,
}

impl CredentialManager {
    pub fn new(ctx: RunContext, transport: HttpTransport) -> Self {
        Self {
            ctx,
            transport,
            refresh_lock: Mutex::new(()),
            generation: AtomicU64::new(0),
        }
    }

    /// Number of successful logins so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// The current token, if one is stored and non-empty.
    pub fn token(&self) -> Option<String> {
        self.ctx
            .store
            .get(&self.ctx.config.token_key)
            .filter(|token| !token.is_empty())
    }

    /// Logs in and stores the token.
    pub async fn login(&self) -> Result<String, AuthError> {
        let _guard = self.refresh_lock.lock().await;
        self.perform_login().await
    }

    /// Re-authenticates from the same static credentials.
    pub async fn refresh(&self) -> Result<String, AuthError> {
        self.login().await
    }

    /// Refreshes unless the stored token has already moved past `rejected`.
    ///
    /// `rejected` is the stored token the caller sent, or `None` if it sent
    /// none. Refreshes are serialised. A caller that finds a different token
    /// stored by the time it holds the lock reuses that token.
    pub async fn refresh_after(&self, rejected: Option<&str>) -> Result<String, AuthError> {
        let _guard = self.refresh_lock.lock().await;

        if let Some(token) = self.token() {
            if rejected != Some(token.as_str()) {
                log::debug!("credential already refreshed, reusing {}", mask_token(&token));
                return Ok(token);
            }
        }

        self.perform_login().await
    }

    async fn perform_login(&self) -> Result<String, AuthError> {
        let config = &self.ctx.config;
        let resolver = self.ctx.resolver();

        let body = serde_json::json!({
            "account": resolver.resolve(&config.account, ResolveScope::StaticOnly),
            "password": resolver.resolve(&config.password, ResolveScope::StaticOnly),
        })
        .to_string();

        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());

        let url = config.login_url();
        log::info!("logging in at {}", url);

        let response = self
            .transport
            .send(
                HttpMethod::POST,
                &url,
                Some(&body),
                &headers,
                config.timeout_duration(),
            )
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        if response.status_code != 200 {
            log::error!("login failed with status {}", response.status_code);
            return Err(AuthError::LoginRejected {
                status: response.status_code,
                body: response.body_preview(),
            });
        }

        let missing = || AuthError::MissingToken {
            field: config.token_field.clone(),
        };
        let node = self
            .ctx
            .accessor()
            .navigate(&response.body, &config.token_field)
            .map_err(|_| missing())?;
        let token = node_text(&node)
            .filter(|token| !token.is_empty())
            .ok_or_else(missing)?;

        self.ctx.store.put(config.token_key.clone(), token.clone());
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        log::info!(
            "login succeeded, token {} stored as '{}' (generation {})",
            mask_token(&token),
            config.token_key,
            generation
        );

        Ok(token)
    }
}
