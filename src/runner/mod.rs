//! Test-case pipeline.
//!
//! [`CaseRunner`] drives one row through request, status check, field checks
//! and extraction, then reports the outcome. [`Suite`] bootstraps the run and
//! fans rows out to workers.

pub mod case;
pub mod collaborators;
pub mod suite;

pub use case::{CaseError, CaseOutcome, FieldPair, Row, TestCase};
pub use collaborators::{
    JsonLinesResultSink, JsonRowSource, LogNotifier, MemoryNotifier, MemoryResultSink, Notifier,
    ResultRecord, ResultSink, RowSource, SourceError,
};
pub use suite::{CaseReport, Suite, SuiteError, SuiteReport};

use crate::executor::RequestExecutor;
use crate::models::ResponseDescriptor;
use std::sync::Arc;

/// Runs single test cases and reports their results.
pub struct CaseRunner {
    executor: RequestExecutor,
    sink: Arc<dyn ResultSink>,
    notifier: Arc<dyn Notifier>,
}

impl CaseRunner {
    pub fn new(
        executor: RequestExecutor,
        sink: Arc<dyn ResultSink>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            executor,
            sink,
            notifier,
        }
    }

    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    /// Runs `case`, retrying validation-type failures, and reports the result.
    ///
    /// Skipped cases are neither executed nor reported. Results go to the sink
    /// only for `row_index > 0`; failures go to the notifier when enabled.
    pub async fn run_case(&self, case: &TestCase) -> CaseOutcome {
        if case.skip {
            log::info!("{} skipped", case.label());
            return CaseOutcome::Skipped;
        }

        let max_retries = self.executor.context().config.max_case_retries;
        let mut retries = 0;
        let outcome = loop {
            let outcome = self.run_once(case).await;
            if outcome.is_retryable() && retries < max_retries {
                retries += 1;
                log::warn!(
                    "{} failed ({}), retry {}/{}",
                    case.label(),
                    outcome.status_label(),
                    retries,
                    max_retries
                );
                continue;
            }
            break outcome;
        };

        self.report(case.row_index, &case.label(), &outcome);
        outcome
    }

    async fn run_once(&self, case: &TestCase) -> CaseOutcome {
        let response = match self.executor.execute(&case.request).await {
            Ok(response) => response,
            Err(err) => return CaseOutcome::from_error(&CaseError::from(err), None),
        };

        match self.verify(case, &response) {
            Ok(()) => CaseOutcome::Passed { response },
            Err(err) => CaseOutcome::from_error(&err, Some(&response)),
        }
    }

    /// Status check, single-field check, multi-field check, then extraction.
    fn verify(&self, case: &TestCase, response: &ResponseDescriptor) -> Result<(), CaseError> {
        if response.status_code != case.expected_status {
            return Err(CaseError::StatusMismatch {
                expected: case.expected_status,
                actual: response.status_code,
            });
        }

        let accessor = self.executor.context().accessor();

        if let Some(check) = &case.check {
            accessor.validate(&response.body, &check.path, &check.value)?;
        }

        if let Some(check) = &case.multi_check {
            accessor.validate_multiple(&response.body, &check.path, &check.value)?;
        }

        if let Some(extract) = &case.extract {
            accessor.extract(&response.body, &extract.path, &extract.value)?;
            log::info!("{} stored '{}' as ${{{}}}", case.label(), extract.path, extract.value);
        }

        Ok(())
    }

    /// Writes the outcome back for `row_index > 0` and notifies on failure.
    ///
    /// Also used for rows rejected before they became a [`TestCase`].
    fn report(&self, row_index: i64, label: &str, outcome: &CaseOutcome) {
        match outcome {
            CaseOutcome::Passed { .. } => log::info!("{} passed", label),
            CaseOutcome::Failed { reason, .. } => log::warn!("{} failed: {}", label, reason),
            CaseOutcome::Skipped => {}
        }

        if row_index > 0 {
            if let Err(e) = self
                .sink
                .write_result(row_index, outcome.body(), outcome.status_label())
            {
                log::error!("failed to write result for {}: {}", label, e);
            }
        }

        if let CaseOutcome::Failed { reason, .. } = outcome {
            if self.executor.context().config.notify_enabled {
                self.notifier.notify(&format!("{}: {}", label, reason));
            }
        }
    }
}
