//! Package sets solved by the job.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Core Python packaging tools, solved on every deployment.
pub const CORE_PACKAGES: &[&str] = &["pip", "setuptools", "wheel"];

/// Failure to read a package list file.
#[derive(Error, Debug)]
pub enum PackageListError {
    /// The file could not be read.
    #[error("Failed to read package list {path}: {source}")]
    Io {
        /// Path of the list file.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
}

/// The core package set as owned names.
pub fn core_packages() -> Vec<String> {
    CORE_PACKAGES.iter().map(ToString::to_string).collect()
}

/// Parse a package list: one name per line.
///
/// Blank lines and `#` comments are ignored, and anything after the name
/// (version specifiers, extras, environment markers) is dropped.
///
/// # Example
///
/// ```
/// use initjob_core::packages::parse_package_list;
///
/// let list = parse_package_list("# data science\nnumpy>=1.16\n\npandas  # frames\n");
/// assert_eq!(list, vec!["numpy", "pandas"]);
/// ```
pub fn parse_package_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.split('#').next().unwrap_or("").trim())
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let end = line
                .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
                .unwrap_or(line.len());
            let name = &line[..end];
            (!name.is_empty()).then(|| name.to_string())
        })
        .collect()
}

/// Read and parse a package list file.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn load_package_list(path: &Path) -> Result<Vec<String>, PackageListError> {
    let content = std::fs::read_to_string(path).map_err(|source| PackageListError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let packages = parse_package_list(&content);
    tracing::debug!(
        "Loaded {} packages from {}",
        packages.len(),
        path.display()
    );
    Ok(packages)
}
