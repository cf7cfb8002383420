//! REST Case Runner
//!
//! Data-driven HTTP API test execution. Test cases are flat rows (method, URL,
//! body, headers, expected status and fields) fed through a common pipeline
//! that sends the request, validates the response and chains extracted values
//! into later requests through a shared variable store. Expired credentials are
//! refreshed automatically, once per request.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - **models**: Request and response descriptors, raw header parsing
//! - **config**: Static run configuration (base URL, credentials, timeouts)
//! - **environment**: Static properties with profile layering
//! - **variables**: The shared variable store and `${name}` placeholder resolution
//! - **validator**: JSON field navigation, validation directives and extraction
//! - **auth**: Login/refresh with single-flight deduplication
//! - **executor**: Request dispatch with one refresh-and-retry on credential rejection
//! - **runner**: Test-case rows, result sinks, notifiers and the suite lifecycle
//!
//! # Request Flow
//!
//! 1. Placeholders in URL, headers and body are resolved (store first, then
//!    static properties, then the empty string)
//! 2. The stored token is attached unless the row sets `Authorization` itself
//! 3. The request is sent with a per-attempt timeout
//! 4. A 404 fails immediately; a rejected credential triggers one refresh and
//!    one resend
//! 5. The caller validates and extracts fields from the returned body
//!
//! # Usage
//!
//! ```no_run
//! use rest_case_runner::config::RunnerConfig;
//! use rest_case_runner::context::RunContext;
//! use rest_case_runner::executor::RequestExecutor;
//! use rest_case_runner::models::{HttpMethod, RequestDescriptor};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let ctx = RunContext::with_config(RunnerConfig::default());
//! let executor = RequestExecutor::new(ctx.clone())?;
//! executor.credentials().login().await?;
//!
//! let response = executor
//!     .execute(&RequestDescriptor::new(HttpMethod::GET, "/orders/${order_id}"))
//!     .await?;
//! ctx.accessor().validate(&response.body, "code", "0")?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod context;
pub mod environment;
pub mod executor;
pub mod failure;
pub mod models;
pub mod runner;
pub mod validator;
pub mod variables;

pub use context::RunContext;
pub use failure::FailureClass;
