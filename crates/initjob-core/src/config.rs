//! Resolved job configuration.
//!
//! The CLI layer turns flags and environment variables into an
//! [`InitConfig`]; everything below it takes its settings from here.

use std::path::PathBuf;

use thiserror::Error;

use crate::discovery::ensure_trailing_slash;
use crate::paths::default_database_path;

/// Default discovery root for the AICoE index listings.
pub const DEFAULT_INDEX_BASE_URL: &str = "https://tensorflow.pypi.thoth-station.ninja/index/";

/// Default location of the data science package list.
pub const DEFAULT_DATA_SCIENCE_PACKAGES_FILE: &str = "data-science-packages.txt";

/// Path of the solver result endpoint relative to the result API.
pub const SOLVER_RESULT_ENDPOINT: &str = "/api/v1/solver-result";

/// Invalid combination of settings.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Solving was requested outside dry-run without a scheduler.
    #[error(
        "A scheduler URL is required to solve packages (set --scheduler-url or THOTH_SCHEDULER_URL)"
    )]
    MissingScheduler,
}

/// Everything the job needs to know to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitConfig {
    /// Perform discovery and logging only.
    pub dry_run: bool,
    /// Root of the directory listings to crawl, always ending in `/`.
    pub index_base_url: String,
    /// Directory levels below the base at which `simple/` may appear.
    pub discovery_depth: usize,
    /// Initialize the store schema.
    pub initialize_schema: bool,
    /// Discover and register indexes.
    pub register_indexes: bool,
    /// Solve the core package set.
    pub solve_core_packages: bool,
    /// Solve the data science package list.
    pub solve_data_science_packages: bool,
    /// File holding the data science package list.
    pub data_science_packages_file: PathBuf,
    /// Metadata store location.
    pub database_path: PathBuf,
    /// Scheduling backend base URL.
    pub scheduler_url: Option<String>,
    /// Result API base URL.
    pub result_api: Option<String>,
    /// Dispatch through the workflow engine.
    pub use_workflow: bool,
}

impl Default for InitConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            index_base_url: DEFAULT_INDEX_BASE_URL.to_string(),
            discovery_depth: 1,
            initialize_schema: false,
            register_indexes: false,
            solve_core_packages: false,
            solve_data_science_packages: false,
            data_science_packages_file: PathBuf::from(DEFAULT_DATA_SCIENCE_PACKAGES_FILE),
            database_path: default_database_path(),
            scheduler_url: None,
            result_api: None,
            use_workflow: false,
        }
    }
}

impl InitConfig {
    /// Normalize and check the configuration.
    ///
    /// Enforces the trailing slash on the index base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if solving is requested outside dry-run without a
    /// scheduler URL.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        self.index_base_url = ensure_trailing_slash(&self.index_base_url);
        if self.solves_packages() && !self.dry_run && self.scheduler_url.is_none() {
            return Err(ConfigError::MissingScheduler);
        }
        Ok(self)
    }

    /// Whether any solver dispatch was requested.
    pub fn solves_packages(&self) -> bool {
        self.solve_core_packages || self.solve_data_science_packages
    }

    /// Whether the run writes to the store.
    pub fn mutates_store(&self) -> bool {
        !self.dry_run && (self.initialize_schema || self.register_indexes)
    }

    /// Where solvers should submit their results, if a result API is configured.
    pub fn solver_output(&self) -> Option<String> {
        self.result_api
            .as_deref()
            .map(|api| format!("{}{SOLVER_RESULT_ENDPOINT}", api.trim_end_matches('/')))
    }
}
