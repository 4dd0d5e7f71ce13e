//! Shared job context.
//!
//! Groups the configuration and the collaborators every step of the job
//! talks to, so the steps can be driven against fakes in tests.

use initjob_core::{
    DryRunScheduler, HttpScheduler, InitConfig, MetadataStore, Scheduler, SimpleIndexClient,
    SqliteStore, VersionSource,
};
use std::fmt;

use crate::ops::InitError;

/// Groups common state used by the job steps.
pub struct Context {
    pub config: InitConfig,
    pub client: reqwest::Client,
    pub store: Option<Box<dyn MetadataStore>>,
    pub versions: Box<dyn VersionSource>,
    pub scheduler: Box<dyn Scheduler>,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .field("store", &self.store.is_some())
            .finish_non_exhaustive()
    }
}

impl Context {
    pub fn new(
        config: InitConfig,
        client: reqwest::Client,
        store: Option<Box<dyn MetadataStore>>,
        versions: Box<dyn VersionSource>,
        scheduler: Box<dyn Scheduler>,
    ) -> Self {
        Self {
            config,
            client,
            store,
            versions,
            scheduler,
        }
    }

    /// Validate `config` and wire up the real collaborators for it.
    ///
    /// The store is only opened when a step needs it, and read-only in dry
    /// runs. Dry runs never get an HTTP scheduler.
    pub fn from_config(config: InitConfig) -> Result<Self, InitError> {
        let config = config.validated()?;
        let client = initjob_core::http_client()?;

        let store: Option<Box<dyn MetadataStore>> = if config.mutates_store() {
            Some(Box::new(SqliteStore::open(&config.database_path)?))
        } else if config.solves_packages() {
            Some(Box::new(SqliteStore::open_read_only(&config.database_path)?))
        } else {
            None
        };

        let scheduler: Box<dyn Scheduler> = match (&config.scheduler_url, config.dry_run) {
            (Some(url), false) => Box::new(HttpScheduler::new(client.clone(), url)),
            _ => Box::new(DryRunScheduler),
        };

        let versions = Box::new(SimpleIndexClient::new(client.clone()));

        Ok(Self::new(config, client, store, versions, scheduler))
    }

    /// The metadata store, for steps that need one.
    pub fn store(&self) -> Result<&dyn MetadataStore, InitError> {
        self.store.as_deref().ok_or_else(|| {
            InitError::context(
                "Metadata store",
                format!("not opened for {}", self.config.database_path.display()),
            )
        })
    }
}
