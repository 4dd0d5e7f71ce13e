//! Submission of solver jobs to the scheduling backend.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::IndexUrl;

/// Path of the solver endpoint relative to the scheduler base URL.
pub const SOLVER_ENDPOINT: &str = "/api/v1/solvers";

/// Failure to hand a solver request to the backend.
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// Transport-level failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend refused the request.
    #[error("Scheduler rejected request for {packages}: HTTP {status}: {body}")]
    Rejected {
        /// The `name==version` that was submitted.
        packages: String,
        /// Status returned by the backend.
        status: reqwest::StatusCode,
        /// Response body, for diagnostics.
        body: String,
    },
}

/// One solver submission: a pinned package resolved against a set of indexes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SolverRequest {
    /// Requirement in `name==version` form.
    pub packages: String,
    /// Every index the solver may use.
    pub indexes: Vec<IndexUrl>,
    /// Where solver results should be submitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Dispatch through the backend's workflow engine.
    pub use_workflow: bool,
}

impl SolverRequest {
    /// Build a request for `package` pinned to `version`.
    pub fn pinned(package: &str, version: &str, indexes: &[IndexUrl]) -> Self {
        Self {
            packages: format!("{package}=={version}"),
            indexes: indexes.to_vec(),
            output: None,
            use_workflow: false,
        }
    }

    /// Set the result destination.
    pub fn with_output(mut self, output: Option<&str>) -> Self {
        self.output = output.map(str::to_string);
        self
    }

    /// Route the request through the workflow engine.
    pub fn with_workflow(mut self, use_workflow: bool) -> Self {
        self.use_workflow = use_workflow;
        self
    }
}

#[derive(Debug, Deserialize)]
struct ScheduleResponse {
    #[serde(default)]
    scheduled: Vec<String>,
}

/// A backend that turns solver requests into scheduled units of work.
#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Submit one request and return how many units the backend scheduled.
    async fn schedule_solver(&self, request: &SolverRequest) -> Result<usize, SchedulerError>;
}

/// Scheduler reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpScheduler {
    client: Client,
    endpoint: String,
}

impl HttpScheduler {
    /// Create a scheduler for the backend at `base_url`.
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}{SOLVER_ENDPOINT}", base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl Scheduler for HttpScheduler {
    async fn schedule_solver(&self, request: &SolverRequest) -> Result<usize, SchedulerError> {
        tracing::info!(
            "Running solver jobs for {} against {} indexes",
            request.packages,
            request.indexes.len()
        );

        let resp = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SchedulerError::Rejected {
                packages: request.packages.clone(),
                status,
                body,
            });
        }

        let response: ScheduleResponse = resp.json().await?;
        tracing::debug!("Response when running solver jobs: {:?}", response.scheduled);
        Ok(response.scheduled.len())
    }
}

/// Scheduler used in dry-run mode: logs what would be submitted and schedules nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunScheduler;

#[async_trait]
impl Scheduler for DryRunScheduler {
    async fn schedule_solver(&self, request: &SolverRequest) -> Result<usize, SchedulerError> {
        tracing::info!(
            "Dry run: would schedule solver for {} against {} indexes",
            request.packages,
            request.indexes.len()
        );
        Ok(0)
    }
}
