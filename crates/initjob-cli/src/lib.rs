//! initjob - seed a package-analysis deployment
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
//!
//! One-shot job run when a deployment comes up.
//!
//! # Overview
//!
//! Depending on the flags given, the job:
//!
//! 1. initializes the metadata store schema,
//! 2. crawls the AICoE directory listings for PEP-503 simple indexes and
//!    registers them together with PyPI,
//! 3. schedules solver jobs for every version of the core packaging tools
//!    and/or a data science package list, on every registered index.
//!
//! `--dry-run` keeps the crawl and the logging but skips every write.

pub mod ops;

pub use initjob_core::config::{DEFAULT_DATA_SCIENCE_PACKAGES_FILE, DEFAULT_INDEX_BASE_URL};
pub use initjob_core::InitConfig;

use clap::Parser;
use clap::builder::FalseyValueParser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "initjob")]
#[command(author, version, about = "Register package indexes and schedule solver jobs")]
pub struct Cli {
    /// Be verbose about what's going on
    #[arg(short, long, env = "THOTH_VERBOSE_INIT_JOB", value_parser = FalseyValueParser::new())]
    pub verbose: bool,

    /// Discover and log only; do not initialize, register or schedule anything
    #[arg(long, env = "THOTH_INIT_JOB_DRY_RUN", value_parser = FalseyValueParser::new())]
    pub dry_run: bool,

    /// Base URL of the directory listings to crawl for indexes
    #[arg(
        short,
        long,
        env = "THOTH_INIT_JOB_INDEX_BASE_URL",
        default_value = DEFAULT_INDEX_BASE_URL
    )]
    pub index_base_url: String,

    /// Directory levels below the base URL at which a simple/ index may sit
    #[arg(long, env = "THOTH_INIT_JOB_DISCOVERY_DEPTH", default_value_t = 1)]
    pub discovery_depth: usize,

    /// Initialize the metadata store schema
    #[arg(long, env = "THOTH_INIT_JOB_INITIALIZE_SCHEMA", value_parser = FalseyValueParser::new())]
    pub initialize_schema: bool,

    /// Register PyPI and every index discovered under the base URL
    #[arg(long, env = "THOTH_INIT_JOB_REGISTER_INDEXES", value_parser = FalseyValueParser::new())]
    pub register_indexes: bool,

    /// Schedule solver jobs for the core packaging tools
    #[arg(long, env = "THOTH_INIT_JOB_SOLVE_CORE", value_parser = FalseyValueParser::new())]
    pub solve_core_packages: bool,

    /// Schedule solver jobs for the data science package list
    #[arg(
        long,
        env = "THOTH_INIT_JOB_SOLVE_DATA_SCIENCE",
        value_parser = FalseyValueParser::new()
    )]
    pub solve_data_science_packages: bool,

    /// File with one data science package name per line
    #[arg(
        long,
        env = "THOTH_INIT_JOB_DATA_SCIENCE_PACKAGES",
        default_value = DEFAULT_DATA_SCIENCE_PACKAGES_FILE
    )]
    pub data_science_packages_file: PathBuf,

    /// Metadata store database (defaults to the user data directory)
    #[arg(long, env = "THOTH_DATABASE_PATH")]
    pub database_path: Option<PathBuf>,

    /// Base URL of the scheduling backend
    #[arg(long, env = "THOTH_SCHEDULER_URL")]
    pub scheduler_url: Option<String>,

    /// Base URL of the result API solvers submit to
    #[arg(long, env = "THOTH_RESULT_API_URL")]
    pub result_api: Option<String>,

    /// Ask the backend to dispatch solvers through its workflow engine
    #[arg(long, env = "THOTH_INIT_JOB_USE_WORKFLOW", value_parser = FalseyValueParser::new())]
    pub use_workflow: bool,
}

impl Cli {
    /// Turn parsed flags into the job configuration.
    pub fn into_config(self) -> InitConfig {
        let defaults = InitConfig::default();
        InitConfig {
            dry_run: self.dry_run,
            index_base_url: self.index_base_url,
            discovery_depth: self.discovery_depth,
            initialize_schema: self.initialize_schema,
            register_indexes: self.register_indexes,
            solve_core_packages: self.solve_core_packages,
            solve_data_science_packages: self.solve_data_science_packages,
            data_science_packages_file: self.data_science_packages_file,
            database_path: self.database_path.unwrap_or(defaults.database_path),
            scheduler_url: self.scheduler_url,
            result_api: self.result_api,
            use_workflow: self.use_workflow,
        }
    }
}

/// Log directives used when `RUST_LOG` is not set.
pub fn default_log_directives(verbose: bool) -> &'static str {
    if verbose {
        "info,initjob=debug,initjob_cli=debug,initjob_core=debug"
    } else {
        "info"
    }
}
