//! Solver scheduling steps

use initjob_core::DispatchRequest;
use initjob_core::packages::{core_packages, load_package_list};

use crate::ops::{Context, InitError};

/// Schedule solvers for every version of `packages` on every registered index.
///
/// Fails if the store has no registered index.
pub async fn solve_packages(ctx: &Context, packages: &[String]) -> Result<usize, InitError> {
    let indexes = ctx.store()?.index_urls()?;
    if indexes.is_empty() {
        return Err(InitError::NoIndexesRegistered);
    }

    let output = ctx.config.solver_output();
    let scheduled = DispatchRequest::new(
        ctx.versions.as_ref(),
        ctx.scheduler.as_ref(),
        packages,
        &indexes,
    )
    .with_output(output.as_deref())
    .with_workflow(ctx.config.use_workflow)
    .execute()
    .await?;
    Ok(scheduled)
}

/// Schedule solvers for the core packaging tools.
pub async fn solve_core_packages(ctx: &Context) -> Result<usize, InitError> {
    let packages = core_packages();
    tracing::info!("Scheduling solver jobs for core packages: {}", packages.join(", "));
    solve_packages(ctx, &packages).await
}

/// Schedule solvers for the configured data science package list.
pub async fn solve_data_science_packages(ctx: &Context) -> Result<usize, InitError> {
    let packages = load_package_list(&ctx.config.data_science_packages_file)?;
    tracing::info!(
        "Scheduling solver jobs for {} data science packages from {}",
        packages.len(),
        ctx.config.data_science_packages_file.display()
    );
    solve_packages(ctx, &packages).await
}
