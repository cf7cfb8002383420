//! Test-case rows.
//!
//! A row is a flat string-keyed map supplied by a [`RowSource`]. Recognised
//! keys: `rowIndex`, `method`, `url`, `body`, `headers`, `expectedStatus`,
//! `checkField`, `expectedValue`, `checkFields`, `expectedValues`,
//! `extractField`, `storeAs` and `skip`. Unknown keys are ignored.
//!
//! [`RowSource`]: super::collaborators::RowSource

use crate::executor::ExecuteError;
use crate::failure::FailureClass;
use crate::models::{HttpMethod, RequestDescriptor, ResponseDescriptor};
use crate::validator::FieldError;
use std::collections::HashMap;
use std::fmt;

/// One row of test parameters.
pub type Row = HashMap<String, String>;

/// Errors that fail a single test case.
#[derive(Debug)]
pub enum CaseError {
    /// The row cannot be turned into a test case.
    InvalidCase(String),

    /// The request could not be completed.
    Execute(ExecuteError),

    /// The actual status code differs from `expectedStatus`.
    StatusMismatch { expected: u16, actual: u16 },

    /// A field check or extraction failed.
    Field(FieldError),
}

impl CaseError {
    pub fn class(&self) -> FailureClass {
        match self {
            CaseError::InvalidCase(_) => FailureClass::InvalidCase,
            CaseError::Execute(err) => err.class(),
            CaseError::StatusMismatch { .. } => FailureClass::ValidationFailure,
            CaseError::Field(err) => err.class(),
        }
    }
}

impl fmt::Display for CaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseError::InvalidCase(msg) => write!(f, "Invalid test case: {}", msg),
            CaseError::Execute(err) => write!(f, "{}", err),
            CaseError::StatusMismatch { expected, actual } => write!(
                f,
                "Status code mismatch: expected {} but was {}",
                expected, actual
            ),
            CaseError::Field(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for CaseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CaseError::Execute(err) => Some(err),
            CaseError::Field(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ExecuteError> for CaseError {
    fn from(err: ExecuteError) -> Self {
        CaseError::Execute(err)
    }
}

impl From<FieldError> for CaseError {
    fn from(err: FieldError) -> Self {
        CaseError::Field(err)
    }
}

/// A `(path, expected)` or `(path, key)` pair that is only active when both
/// sides are non-blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPair {
    pub path: String,
    pub value: String,
}

/// A parsed test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    /// Result row in the sink; results are only written when > 0.
    pub row_index: i64,
    pub request: RequestDescriptor,
    pub expected_status: u16,
    pub check: Option<FieldPair>,
    pub multi_check: Option<FieldPair>,
    pub extract: Option<FieldPair>,
    pub skip: bool,
}

impl TestCase {
    /// Builds a test case from a row.
    ///
    /// `method` defaults to POST, `expectedStatus` to 200 and `rowIndex` to -1.
    /// `url` is required.
    pub fn from_row(row: &Row) -> Result<Self, CaseError> {
        let field = |key: &str| row.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        let row_index = match field("rowIndex") {
            Some(raw) => raw
                .parse::<i64>()
                .map_err(|_| CaseError::InvalidCase(format!("rowIndex '{}' is not a number", raw)))?,
            None => -1,
        };

        let method = match field("method") {
            Some(raw) => HttpMethod::parse(raw)
                .ok_or_else(|| CaseError::InvalidCase(format!("unsupported method '{}'", raw)))?,
            None => HttpMethod::POST,
        };

        let url = field("url")
            .ok_or_else(|| CaseError::InvalidCase("url is required".to_string()))?;

        let expected_status = match field("expectedStatus") {
            Some(raw) => raw.parse::<u16>().map_err(|_| {
                CaseError::InvalidCase(format!("expectedStatus '{}' is not a status code", raw))
            })?,
            None => 200,
        };

        let mut request = RequestDescriptor::new(method, url);
        if let Some(body) = row.get("body").filter(|b| !b.is_empty()) {
            request = request.with_body(body.clone());
        }
        if let Some(headers) = row.get("headers") {
            request = request.with_headers(headers.clone());
        }

        let pair = |path_key: &str, value_key: &str| match (field(path_key), field(value_key)) {
            (Some(path), Some(value)) => Some(FieldPair {
                path: path.to_string(),
                value: value.to_string(),
            }),
            _ => None,
        };

        Ok(Self {
            row_index,
            request,
            expected_status,
            check: pair("checkField", "expectedValue"),
            multi_check: pair("checkFields", "expectedValues"),
            extract: pair("extractField", "storeAs"),
            skip: field("skip").map_or(false, |s| s.eq_ignore_ascii_case("true")),
        })
    }

    /// Short human-readable label, e.g. `row 3 GET /users/${id}`.
    pub fn label(&self) -> String {
        format!(
            "row {} {} {}",
            self.row_index, self.request.method, self.request.url
        )
    }
}

/// The result of running one test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseOutcome {
    Passed {
        response: ResponseDescriptor,
    },
    Skipped,
    Failed {
        class: FailureClass,
        /// `"<prefix>: <message>"`
        reason: String,
        /// Final response body, empty when no response was received.
        body: String,
    },
}

impl CaseOutcome {
    /// Builds the failed outcome for an error, labelling it by class.
    pub fn from_error(err: &CaseError, response: Option<&ResponseDescriptor>) -> Self {
        let class = err.class();
        let response = response.or(match err {
            CaseError::Execute(inner) => inner.response(),
            _ => None,
        });

        CaseOutcome::Failed {
            class,
            reason: class.reason(&err.to_string(), response),
            body: response.map(|r| r.body.clone()).unwrap_or_default(),
        }
    }

    /// Label written to the result sink.
    pub fn status_label(&self) -> &str {
        match self {
            CaseOutcome::Passed { .. } => "PASS",
            CaseOutcome::Skipped => "SKIP",
            CaseOutcome::Failed { reason, .. } => reason,
        }
    }

    /// Response body to persist alongside the label.
    pub fn body(&self) -> &str {
        match self {
            CaseOutcome::Passed { response } => &response.body,
            CaseOutcome::Skipped => "",
            CaseOutcome::Failed { body, .. } => body,
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, CaseOutcome::Passed { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, CaseOutcome::Failed { .. })
    }

    /// Whether an outer retry may re-run the case.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CaseOutcome::Failed { class, .. } if class.is_retryable())
    }
}
