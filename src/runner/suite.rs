//! Suite lifecycle.
//!
//! A suite owns one [`RunContext`]. [`Suite::bootstrap`] resets the variable
//! store and logs in; [`Suite::run_all`] runs every row and collects a
//! [`SuiteReport`]. With `parallelism` 1 rows run strictly in source order,
//! which chained rows (extract in one, `${var}` in a later one) rely on.

use super::case::{CaseOutcome, TestCase};
use super::collaborators::{Notifier, ResultSink, RowSource, SourceError};
use super::CaseRunner;
use crate::auth::AuthError;
use crate::context::RunContext;
use crate::executor::{ExecuteError, RequestExecutor};
use crate::failure::FailureClass;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use uuid::Uuid;

/// Errors that abort a whole suite.
#[derive(Debug)]
pub enum SuiteError {
    /// The transport could not be created.
    Setup(ExecuteError),
    /// The bootstrap login failed.
    Bootstrap(AuthError),
    /// Rows could not be read.
    Source(SourceError),
    /// A worker task panicked or was cancelled.
    Worker(String),
}

impl fmt::Display for SuiteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuiteError::Setup(e) => write!(f, "Suite setup failed: {}", e),
            SuiteError::Bootstrap(e) => write!(f, "Suite bootstrap failed: {}", e),
            SuiteError::Source(e) => write!(f, "{}", e),
            SuiteError::Worker(msg) => write!(f, "Worker failed: {}", msg),
        }
    }
}

impl std::error::Error for SuiteError {}

impl From<AuthError> for SuiteError {
    fn from(err: AuthError) -> Self {
        SuiteError::Bootstrap(err)
    }
}

impl From<SourceError> for SuiteError {
    fn from(err: SourceError) -> Self {
        SuiteError::Source(err)
    }
}

impl From<ExecuteError> for SuiteError {
    fn from(err: ExecuteError) -> Self {
        SuiteError::Setup(err)
    }
}

/// Outcome of one row.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseReport {
    pub row_index: i64,
    pub label: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<FailureClass>,
    #[serde(skip)]
    pub outcome: CaseOutcome,
}

impl CaseReport {
    fn new(row_index: i64, label: String, outcome: CaseOutcome) -> Self {
        let class = match &outcome {
            CaseOutcome::Failed { class, .. } => Some(*class),
            _ => None,
        };
        Self {
            row_index,
            label,
            status: outcome.status_label().to_string(),
            class,
            outcome,
        }
    }
}

/// Result of a whole run, in source order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub cases: Vec<CaseReport>,
}

impl SuiteReport {
    pub fn passed(&self) -> usize {
        self.cases.iter().filter(|c| c.outcome.is_passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.cases.iter().filter(|c| c.outcome.is_failed()).count()
    }

    pub fn skipped(&self) -> usize {
        self.cases
            .iter()
            .filter(|c| matches!(c.outcome, CaseOutcome::Skipped))
            .count()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// One-line summary, e.g. `run 1b4e...: 3 passed, 1 failed, 0 skipped`.
    pub fn summary(&self) -> String {
        format!(
            "run {}: {} passed, {} failed, {} skipped",
            self.run_id,
            self.passed(),
            self.failed(),
            self.skipped()
        )
    }
}

/// One test run over one context.
pub struct Suite {
    runner: Arc<CaseRunner>,
    run_id: Uuid,
}

impl Suite {
    pub fn new(
        ctx: RunContext,
        sink: Arc<dyn ResultSink>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, SuiteError> {
        let executor = RequestExecutor::new(ctx)?;
        Ok(Self::with_executor(executor, sink, notifier))
    }

    pub fn with_executor(
        executor: RequestExecutor,
        sink: Arc<dyn ResultSink>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            runner: Arc::new(CaseRunner::new(executor, sink, notifier)),
            run_id: Uuid::new_v4(),
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn context(&self) -> &RunContext {
        self.runner.executor().context()
    }

    /// Clears the variable store and, when `autoLogin` is set, logs in.
    pub async fn bootstrap(&self) -> Result<(), SuiteError> {
        let ctx = self.context();
        ctx.store.clear();
        log::info!("run {}: variable store cleared", self.run_id);

        if ctx.config.auto_login {
            self.runner.executor().credentials().login().await?;
        }
        Ok(())
    }

    /// Runs every row from `source`.
    ///
    /// Rows that do not parse are reported as `InvalidCase` failures without
    /// being sent, through the same sink and notifier as executed cases. At
    /// most `parallelism` cases are in flight at once.
    pub async fn run_all(&self, source: &dyn RowSource) -> Result<SuiteReport, SuiteError> {
        let started_at = Utc::now();
        let rows = source.rows()?;
        log::info!("run {}: {} rows", self.run_id, rows.len());

        let entries: Vec<Result<TestCase, CaseReport>> = rows
            .iter()
            .enumerate()
            .map(|(position, row)| {
                TestCase::from_row(row).map_err(|err| {
                    let row_index = row
                        .get("rowIndex")
                        .and_then(|raw| raw.trim().parse().ok())
                        .unwrap_or(-1);
                    let label = if row_index > 0 {
                        format!("row {}", row_index)
                    } else {
                        format!("row #{}", position + 1)
                    };
                    log::warn!("{} rejected: {}", label, err);
                    CaseReport::new(row_index, label, CaseOutcome::from_error(&err, None))
                })
            })
            .collect();

        let mut slots: Vec<Option<CaseReport>> = Vec::with_capacity(entries.len());
        let parallelism = self.context().config.parallelism.max(1);
        if parallelism == 1 {
            for entry in entries {
                let report = match entry {
                    Ok(case) => {
                        let outcome = self.runner.run_case(&case).await;
                        CaseReport::new(case.row_index, case.label(), outcome)
                    }
                    Err(rejected) => self.reject(rejected),
                };
                slots.push(Some(report));
            }
        } else {
            let semaphore = Arc::new(Semaphore::new(parallelism));
            let mut workers = JoinSet::new();

            for (position, entry) in entries.into_iter().enumerate() {
                match entry {
                    Ok(case) => {
                        slots.push(None);
                        let runner = Arc::clone(&self.runner);
                        let semaphore = Arc::clone(&semaphore);
                        workers.spawn(async move {
                            let _permit = semaphore.acquire_owned().await;
                            let outcome = runner.run_case(&case).await;
                            (position, CaseReport::new(case.row_index, case.label(), outcome))
                        });
                    }
                    Err(rejected) => slots.push(Some(self.reject(rejected))),
                }
            }

            while let Some(joined) = workers.join_next().await {
                let (position, report) = joined.map_err(|e| SuiteError::Worker(e.to_string()))?;
                slots[position] = Some(report);
            }
        }

        let report = SuiteReport {
            run_id: self.run_id,
            started_at,
            finished_at: Utc::now(),
            cases: slots.into_iter().flatten().collect(),
        };
        log::info!("{}", report.summary());
        Ok(report)
    }

    fn reject(&self, report: CaseReport) -> CaseReport {
        self.runner
            .report(report.row_index, &report.label, &report.outcome);
        report
    }
}
