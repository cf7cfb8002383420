//! Data models for HTTP requests and responses.
//!
//! This module contains the descriptors exchanged between test-case rows, the
//! request executor, and the response validator.

pub mod request;
pub mod response;

pub use request::{find_header, parse_raw_headers, HttpMethod, RequestDescriptor};
pub use response::ResponseDescriptor;
