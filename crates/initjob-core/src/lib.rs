//! initjob core - index discovery, version lookup, metadata store and solver dispatch.
//!
//! The collaborators the job talks to sit behind traits
//! ([`MetadataStore`], [`Scheduler`], [`VersionSource`]) so the control flow
//! can be exercised without a live deployment.

pub mod config;
pub mod discovery;
pub mod dispatch;
pub mod listing;
pub mod packages;
pub mod paths;
pub mod scheduler;
pub mod store;
pub mod types;
pub mod versions;

pub use config::InitConfig;
pub use discovery::{ComplianceIssue, DiscoveryReport, discover_indexes};
pub use dispatch::DispatchRequest;
pub use paths::*;
pub use scheduler::{DryRunScheduler, HttpScheduler, Scheduler, SolverRequest};
pub use store::{MetadataStore, SqliteStore};
pub use types::{IndexRegistration, IndexUrl};
pub use versions::{SimpleIndexClient, VersionSource};

/// User Agent string for core operations
pub const USER_AGENT: &str = concat!("initjob/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by discovery, version lookup and scheduling.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialized.
pub fn http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().user_agent(USER_AGENT).build()
}
