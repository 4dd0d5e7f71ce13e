//! Index registration step

use initjob_core::{DiscoveryReport, IndexRegistration, discover_indexes};

use crate::ops::{Context, InitError};

/// Register PyPI and every index discovered under the configured base URL.
///
/// A failing base listing is logged and leaves PyPI as the only index.
/// Returns the number of registrations written (zero in dry runs).
pub async fn register_indexes(ctx: &Context) -> Result<usize, InitError> {
    let config = &ctx.config;
    let mut registrations = vec![IndexRegistration::pypi()];

    let report =
        match discover_indexes(&ctx.client, &config.index_base_url, config.discovery_depth).await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!("Index discovery on {} failed: {e}", config.index_base_url);
                DiscoveryReport::default()
            }
        };
    if !report.issues.is_empty() {
        tracing::warn!(
            "{} issues found while discovering indexes on {}",
            report.issues.len(),
            config.index_base_url
        );
    }
    registrations.extend(report.indexes.into_iter().map(IndexRegistration::discovered));

    if config.dry_run {
        for registration in &registrations {
            tracing::info!("Dry run: would register index {}", registration.url);
        }
        return Ok(0);
    }

    let store = ctx.store()?;
    for registration in &registrations {
        tracing::info!("Registering index {}", registration.url);
        store.register_index(registration)?;
    }
    Ok(registrations.len())
}
