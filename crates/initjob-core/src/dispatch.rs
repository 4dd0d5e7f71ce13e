//! Fan-out of solver jobs over packages, indexes and versions.

use crate::scheduler::{Scheduler, SchedulerError, SolverRequest};
use crate::types::IndexUrl;
use crate::versions::VersionSource;

/// Request for a dispatch run.
pub struct DispatchRequest<'a> {
    /// Where published versions are looked up.
    pub versions: &'a dyn VersionSource,
    /// Where solver requests are submitted.
    pub scheduler: &'a dyn Scheduler,
    /// Packages to solve.
    pub packages: &'a [String],
    /// Registered indexes; each is enumerated, and all of them are handed to every solver.
    pub indexes: &'a [IndexUrl],
    /// Result destination passed through to the solver.
    pub output: Option<&'a str>,
    /// Route submissions through the workflow engine.
    pub use_workflow: bool,
}

impl std::fmt::Debug for DispatchRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchRequest")
            .field("packages", &self.packages)
            .field("indexes", &self.indexes)
            .field("output", &self.output)
            .field("use_workflow", &self.use_workflow)
            .finish_non_exhaustive()
    }
}

impl<'a> DispatchRequest<'a> {
    /// Create a request with no output and direct scheduling.
    pub fn new(
        versions: &'a dyn VersionSource,
        scheduler: &'a dyn Scheduler,
        packages: &'a [String],
        indexes: &'a [IndexUrl],
    ) -> Self {
        Self {
            versions,
            scheduler,
            packages,
            indexes,
            output: None,
            use_workflow: false,
        }
    }

    /// Set the result destination.
    pub fn with_output(mut self, output: Option<&'a str>) -> Self {
        self.output = output;
        self
    }

    /// Route submissions through the workflow engine.
    pub fn with_workflow(mut self, use_workflow: bool) -> Self {
        self.use_workflow = use_workflow;
        self
    }

    /// Schedule one solver per (index, package, version) and return the
    /// number of units the scheduler reported.
    ///
    /// Version lookups that fail are logged and count as zero versions.
    ///
    /// # Errors
    ///
    /// Returns the first scheduler failure; nothing after it is submitted.
    pub async fn execute(self) -> Result<usize, SchedulerError> {
        let mut scheduled = 0;

        for index in self.indexes {
            for package in self.packages {
                let versions = match self.versions.package_versions(index, package).await {
                    Ok(versions) => versions,
                    Err(e) => {
                        tracing::error!(
                            "Failed to obtain versions of {package} from {index}, skipping: {e}"
                        );
                        continue;
                    }
                };

                tracing::debug!("{package} has {} versions on {index}", versions.len());
                for version in &versions {
                    let request = SolverRequest::pinned(package, version, self.indexes)
                        .with_output(self.output)
                        .with_workflow(self.use_workflow);
                    scheduled += self.scheduler.schedule_solver(&request).await?;
                }
            }
        }

        tracing::info!(
            "Scheduled {scheduled} solver jobs for {} packages across {} indexes",
            self.packages.len(),
            self.indexes.len()
        );
        Ok(scheduled)
    }
}
