//! Domain newtypes shared across discovery, the store and dispatch.

use serde::Serialize;

/// URL of the public PyPI simple index.
pub const PYPI_SIMPLE_URL: &str = "https://pypi.org/simple";

/// URL of the public PyPI warehouse JSON API.
pub const PYPI_WAREHOUSE_API_URL: &str = "https://pypi.org/pypi";

/// A validated URL of a PEP-503 simple package index.
///
/// # Example
///
/// ```
/// use initjob_core::types::IndexUrl;
///
/// let url = IndexUrl::new("https://pypi.org/simple").unwrap();
/// assert_eq!(url.as_str(), "https://pypi.org/simple");
/// assert!(IndexUrl::new("pypi.org/simple").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct IndexUrl(String);

impl IndexUrl {
    /// Create a new `IndexUrl`, validating that it is an absolute http(s) URL.
    ///
    /// A single trailing slash is dropped so `…/simple/` and `…/simple`
    /// compare equal.
    ///
    /// # Errors
    ///
    /// Returns an error string if `s` has no `http://` or `https://` scheme
    /// or no host part.
    pub fn new(s: &str) -> Result<Self, String> {
        let s = s.trim();
        let rest = s
            .strip_prefix("https://")
            .or_else(|| s.strip_prefix("http://"))
            .ok_or_else(|| format!("Invalid index URL: expected http(s) scheme, got '{s}'"))?;
        if rest.is_empty() || rest.starts_with('/') {
            return Err(format!("Invalid index URL: missing host in '{s}'"));
        }
        Ok(Self(s.strip_suffix('/').unwrap_or(s).to_string()))
    }

    /// Return the raw URL string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// URL of the project page for `package` on this index (PEP-503 layout).
    pub fn project_url(&self, package: &str) -> String {
        format!("{}/{}/", self.0, normalize_package_name(package))
    }
}

impl std::fmt::Display for IndexUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for IndexUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// An index together with the metadata the store keeps about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexRegistration {
    /// The simple index URL.
    pub url: IndexUrl,
    /// JSON API root when the index is served by warehouse.
    pub warehouse_api_url: Option<String>,
    /// Whether TLS certificates should be verified when talking to the index.
    pub verify_ssl: bool,
    /// Whether the index is a warehouse deployment.
    pub warehouse: bool,
}

impl IndexRegistration {
    /// Registration for an index found by crawling a listing.
    pub fn discovered(url: IndexUrl) -> Self {
        Self {
            url,
            warehouse_api_url: None,
            verify_ssl: true,
            warehouse: false,
        }
    }

    /// Registration for the public PyPI index.
    pub fn pypi() -> Self {
        Self {
            url: IndexUrl(PYPI_SIMPLE_URL.to_string()),
            warehouse_api_url: Some(PYPI_WAREHOUSE_API_URL.to_string()),
            verify_ssl: true,
            warehouse: true,
        }
    }
}

/// Normalize a project name as PEP 503 does: lowercase, with every run of
/// `-`, `_` and `.` collapsed to a single `-`.
///
/// # Example
///
/// ```
/// use initjob_core::types::normalize_package_name;
///
/// assert_eq!(normalize_package_name("Zope.Interface"), "zope-interface");
/// assert_eq!(normalize_package_name("typing__extensions"), "typing-extensions");
/// ```
pub fn normalize_package_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_separator = false;
    for c in name.trim().chars() {
        if matches!(c, '-' | '_' | '.') {
            if !in_separator {
                out.push('-');
            }
            in_separator = true;
        } else {
            out.extend(c.to_lowercase());
            in_separator = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_url_drops_trailing_slash() {
        let a = IndexUrl::new("https://idx.example.com/simple/").unwrap();
        let b = IndexUrl::new("https://idx.example.com/simple").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_index_url_rejects_missing_host() {
        assert!(IndexUrl::new("https://").is_err());
        assert!(IndexUrl::new("http:///simple").is_err());
        assert!(IndexUrl::new("ftp://idx/simple").is_err());
    }

    #[test]
    fn test_project_url_is_normalized() {
        let url = IndexUrl::new("https://idx/simple").unwrap();
        assert_eq!(url.project_url("Foo_Bar"), "https://idx/simple/foo-bar/");
    }

    #[test]
    fn test_pypi_registration() {
        let pypi = IndexRegistration::pypi();
        assert_eq!(pypi.url.as_str(), PYPI_SIMPLE_URL);
        assert!(pypi.warehouse);
        assert!(pypi.verify_ssl);
        assert_eq!(
            pypi.warehouse_api_url.as_deref(),
            Some(PYPI_WAREHOUSE_API_URL)
        );
    }
}
