//! Discovery of PEP-503 simple indexes exposed through directory listings.
//!
//! The expected layout is `<base>/<child>/simple/`, where every `<child>`
//! listed on the base page is one index. With a larger depth the walk also
//! accepts the nested `<base>/<os>/<os-version>/<build>/simple/` layout.

use std::fmt;

use reqwest::Client;
use thiserror::Error;

use crate::listing::{ListingEntry, join_url, parse_listing};
use crate::types::IndexUrl;

/// Name of the directory that holds the simple index inside a listing.
pub const SIMPLE_DIR: &str = "simple";

/// Failure to read the base listing.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// Transport-level failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The listing answered with a non-success status.
    #[error("Failed to fetch listing {url}: HTTP {status}")]
    Status {
        /// Listing URL.
        url: String,
        /// Status returned by the server.
        status: reqwest::StatusCode,
    },

    /// The base URL is not an http(s) URL.
    #[error("Invalid index base URL: {0}")]
    InvalidBaseUrl(String),
}

/// A problem found while validating a listing. None of these stop discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComplianceIssue {
    /// A listing page had no linked entries.
    EmptyListing {
        /// Listing URL.
        url: String,
    },
    /// A listing that holds `simple/` also holds something else.
    UnexpectedEntry {
        /// Listing URL.
        url: String,
        /// The extra entry, in directory form.
        entry: String,
    },
    /// A leaf listing has no `simple/` directory.
    MissingSimple {
        /// Listing URL.
        url: String,
    },
    /// A child listing could not be fetched.
    Unreachable {
        /// Listing URL.
        url: String,
        /// Why the fetch failed.
        reason: String,
    },
}

impl ComplianceIssue {
    /// Whether the issue drops a branch from the result (as opposed to a
    /// warning about an index that was still accepted).
    pub fn is_error(&self) -> bool {
        matches!(self, Self::MissingSimple { .. } | Self::Unreachable { .. })
    }

    fn log(&self) {
        if self.is_error() {
            tracing::error!("{self}");
        } else {
            tracing::warn!("{self}");
        }
    }
}

impl fmt::Display for ComplianceIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyListing { url } => write!(f, "No entries found in listing {url}"),
            Self::UnexpectedEntry { url, entry } => write!(
                f,
                "Index {url} is not PEP-503 compliant: unexpected entry {entry:?} next to {SIMPLE_DIR}/"
            ),
            Self::MissingSimple { url } => {
                write!(f, "No {SIMPLE_DIR}/ directory found in {url}, skipping")
            }
            Self::Unreachable { url, reason } => {
                write!(f, "Failed to list {url}, skipping: {reason}")
            }
        }
    }
}

/// Outcome of a discovery run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    /// Simple index URLs in listing order.
    pub indexes: Vec<IndexUrl>,
    /// Everything that was logged as a warning or error along the way.
    pub issues: Vec<ComplianceIssue>,
}

impl DiscoveryReport {
    fn record(&mut self, issue: ComplianceIssue) {
        issue.log();
        self.issues.push(issue);
    }

    /// Number of issues that dropped a branch.
    pub fn error_count(&self) -> usize {
        self.issues.iter().filter(|i| i.is_error()).count()
    }
}

/// Ensure `url` ends with exactly one `/`.
///
/// # Example
///
/// ```
/// use initjob_core::discovery::ensure_trailing_slash;
///
/// assert_eq!(ensure_trailing_slash("https://idx/index"), "https://idx/index/");
/// assert_eq!(ensure_trailing_slash("https://idx/index//"), "https://idx/index/");
/// ```
pub fn ensure_trailing_slash(url: &str) -> String {
    format!("{}/", url.trim_end_matches('/'))
}

/// Fetch a listing page and return its entries.
///
/// # Errors
///
/// Returns an error if the request fails or the server answers with a
/// non-success status.
pub async fn fetch_listing(
    client: &Client,
    url: &str,
) -> Result<Vec<ListingEntry>, DiscoveryError> {
    tracing::debug!("Fetching listing {url}");
    let resp = client.get(url).send().await?;
    if !resp.status().is_success() {
        return Err(DiscoveryError::Status {
            url: url.to_string(),
            status: resp.status(),
        });
    }
    let body = resp.text().await?;
    Ok(parse_listing(&body))
}

/// Walk the listing rooted at `base_url` and collect every simple index.
///
/// `max_depth` is the number of directory levels below the base at which a
/// `simple/` directory may appear; `1` is the flat layout. Values below `1`
/// are treated as `1`. Directories are visited in listing order, one request
/// at a time.
///
/// # Errors
///
/// Returns an error if `base_url` is not an http(s) URL or the base listing
/// cannot be fetched. Failures below the base page are recorded in the report
/// instead.
pub async fn discover_indexes(
    client: &Client,
    base_url: &str,
    max_depth: usize,
) -> Result<DiscoveryReport, DiscoveryError> {
    IndexUrl::new(base_url).map_err(DiscoveryError::InvalidBaseUrl)?;
    let root = ensure_trailing_slash(base_url);
    let max_depth = max_depth.max(1);

    tracing::info!("Listing available indexes on {root}");
    let entries = fetch_listing(client, &root).await?;

    let mut report = DiscoveryReport::default();
    if entries.is_empty() {
        report.record(ComplianceIssue::EmptyListing { url: root });
        return Ok(report);
    }

    // Reversed so that popping visits entries in listing order.
    let mut pending: Vec<(String, usize)> = entries
        .iter()
        .rev()
        .map(|e| (join_url(&root, &e.dir_name()), 1))
        .collect();

    while let Some((url, depth)) = pending.pop() {
        let entries = match fetch_listing(client, &url).await {
            Ok(entries) => entries,
            Err(e) => {
                report.record(ComplianceIssue::Unreachable {
                    url,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        if entries.is_empty() {
            report.record(ComplianceIssue::EmptyListing { url });
            continue;
        }

        if entries.iter().any(|e| e.name == SIMPLE_DIR) {
            for extra in entries.iter().filter(|e| e.name != SIMPLE_DIR) {
                report.record(ComplianceIssue::UnexpectedEntry {
                    url: url.clone(),
                    entry: extra.dir_name(),
                });
            }
            match IndexUrl::new(&join_url(&url, SIMPLE_DIR)) {
                Ok(index) => {
                    tracing::info!("Found index {index}");
                    report.indexes.push(index);
                }
                Err(reason) => report.record(ComplianceIssue::Unreachable { url, reason }),
            }
        } else if depth < max_depth {
            // Bare names are directories here too, same as on the base page.
            pending.extend(
                entries
                    .iter()
                    .rev()
                    .map(|e| (join_url(&url, &e.dir_name()), depth + 1)),
            );
        } else {
            report.record(ComplianceIssue::MissingSimple { url });
        }
    }

    tracing::info!(
        "Discovered {} indexes ({} branches skipped)",
        report.indexes.len(),
        report.error_count()
    );
    Ok(report)
}
