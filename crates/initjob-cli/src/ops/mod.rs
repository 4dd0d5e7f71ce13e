//! Job steps and the sequence that runs them.

pub mod context;
pub mod error;
pub mod register;
pub mod solve;

pub use context::Context;
pub use error::InitError;

/// What a run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub schema_initialized: bool,
    pub indexes_registered: usize,
    pub solvers_scheduled: usize,
}

/// Initialize the metadata store schema (skipped in dry runs).
pub fn initialize_schema(ctx: &Context) -> Result<bool, InitError> {
    if ctx.config.dry_run {
        tracing::info!("Dry run: skipping schema initialization");
        return Ok(false);
    }
    ctx.store()?.initialize_schema()?;
    Ok(true)
}

/// Run every step enabled in the configuration, in order.
pub async fn run(ctx: &Context) -> Result<RunSummary, InitError> {
    let config = &ctx.config;
    let mut summary = RunSummary::default();

    if config.initialize_schema {
        summary.schema_initialized = initialize_schema(ctx)?;
    }

    if config.register_indexes {
        summary.indexes_registered = register::register_indexes(ctx).await?;
    }

    if config.solve_core_packages {
        summary.solvers_scheduled += solve::solve_core_packages(ctx).await?;
    }

    if config.solve_data_science_packages {
        summary.solvers_scheduled += solve::solve_data_science_packages(ctx).await?;
    }

    tracing::info!(
        "Done: {} indexes registered, {} solver jobs scheduled",
        summary.indexes_registered,
        summary.solvers_scheduled
    );
    Ok(summary)
}
