//! Errors that end the job

use initjob_core::config::ConfigError;
use initjob_core::packages::PackageListError;
use initjob_core::scheduler::SchedulerError;
use initjob_core::store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InitError {
    #[error(
        "No Python package indexes registered in the metadata store, run with --register-indexes first"
    )]
    NoIndexesRegistered,

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Metadata store error: {0}")]
    Store(#[from] StoreError),

    #[error("Scheduling failed: {0}")]
    Scheduler(#[from] SchedulerError),

    #[error(transparent)]
    PackageList(#[from] PackageListError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{context}: {message}")]
    Context {
        context: &'static str,
        message: String,
    },
}

impl InitError {
    /// Create an error with context for better debugging.
    pub fn context(ctx: &'static str, msg: impl std::fmt::Display) -> Self {
        Self::Context {
            context: ctx,
            message: msg.to_string(),
        }
    }
}
