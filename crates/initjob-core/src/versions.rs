//! Enumeration of published package versions on a simple index.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use thiserror::Error;

use crate::types::IndexUrl;

static LINK_TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<a\b[^>]*>(.*?)</a>").expect("valid regex"));

const SDIST_EXTENSIONS: &[&str] = &[".tar.gz", ".tgz", ".tar.bz2", ".tar.xz", ".zip"];

/// Failure to enumerate versions of one package on one index.
#[derive(Error, Debug)]
pub enum VersionError {
    /// Transport-level failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The project page answered with a non-success status.
    #[error("Failed to fetch {url}: HTTP {status}")]
    Status {
        /// Project page URL.
        url: String,
        /// Status returned by the server.
        status: reqwest::StatusCode,
    },
}

/// Something that can list the versions of a package published on an index.
#[async_trait]
pub trait VersionSource: Send + Sync {
    /// All versions of `package` published on `index`, oldest listing first.
    async fn package_versions(
        &self,
        index: &IndexUrl,
        package: &str,
    ) -> Result<Vec<String>, VersionError>;
}

/// Reads versions from PEP-503 project pages (`<index>/<project>/`).
#[derive(Debug, Clone)]
pub struct SimpleIndexClient {
    client: Client,
}

impl SimpleIndexClient {
    /// Create a client sharing the given HTTP client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl VersionSource for SimpleIndexClient {
    async fn package_versions(
        &self,
        index: &IndexUrl,
        package: &str,
    ) -> Result<Vec<String>, VersionError> {
        let url = index.project_url(package);
        tracing::debug!("Obtaining {package} versions from {url}");

        let resp = self.client.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(VersionError::Status {
                url,
                status: resp.status(),
            });
        }
        let body = resp.text().await?;
        Ok(versions_from_project_page(&body))
    }
}

/// Collect distinct versions from the links on a project page, keeping the
/// order in which they first appear.
pub fn versions_from_project_page(html: &str) -> Vec<String> {
    let mut versions: Vec<String> = Vec::new();
    for cap in LINK_TEXT_RE.captures_iter(html) {
        if let Some(version) = version_from_filename(cap[1].trim()) {
            if !versions.contains(&version) {
                versions.push(version);
            }
        }
    }
    versions
}

/// Extract the version from a distribution filename.
///
/// Wheels and eggs carry the version as the second dash-separated field;
/// source distributions carry it after the last dash of the stem. Anything
/// else yields `None`.
///
/// # Example
///
/// ```
/// use initjob_core::versions::version_from_filename;
///
/// assert_eq!(version_from_filename("six-1.16.0-py2.py3-none-any.whl").as_deref(), Some("1.16.0"));
/// assert_eq!(version_from_filename("python-dateutil-2.8.2.tar.gz").as_deref(), Some("2.8.2"));
/// assert_eq!(version_from_filename("README.md"), None);
/// ```
pub fn version_from_filename(filename: &str) -> Option<String> {
    let version = if let Some(stem) = filename
        .strip_suffix(".whl")
        .or_else(|| filename.strip_suffix(".egg"))
    {
        stem.split('-').nth(1)?
    } else {
        let stem = SDIST_EXTENSIONS
            .iter()
            .find_map(|ext| filename.strip_suffix(ext))?;
        stem.rsplit_once('-')?.1
    };

    if version.is_empty() || !version.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    Some(version.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    const SIX_PAGE: &str = r#"<!DOCTYPE html>
<html>
  <head><title>Links for six</title></head>
  <body>
    <h1>Links for six</h1>
    <a href="https://files.example/six-1.0.0.tar.gz#sha256=aa">six-1.0.0.tar.gz</a><br/>
    <a href="https://files.example/six-1.1.0.tar.gz#sha256=bb">six-1.1.0.tar.gz</a><br/>
    <a href="https://files.example/six-1.1.0-py2.py3-none-any.whl#sha256=cc">six-1.1.0-py2.py3-none-any.whl</a><br/>
    <a href="https://files.example/six-1.2.0-py2.7.egg#sha256=dd">six-1.2.0-py2.7.egg</a><br/>
  </body>
</html>"#;

    #[test]
    fn test_versions_from_page_are_deduplicated_in_order() {
        assert_eq!(
            versions_from_project_page(SIX_PAGE),
            vec!["1.0.0", "1.1.0", "1.2.0"]
        );
    }

    #[test]
    fn test_version_from_filename_variants() {
        assert_eq!(
            version_from_filename("tensorflow-1.13.1-cp36-cp36m-linux_x86_64.whl").as_deref(),
            Some("1.13.1")
        );
        assert_eq!(version_from_filename("pip-19.0.tgz").as_deref(), Some("19.0"));
        assert_eq!(
            version_from_filename("setuptools-40.8.0.zip").as_deref(),
            Some("40.8.0")
        );
        assert_eq!(version_from_filename("noversion.tar.gz"), None);
        assert_eq!(version_from_filename("pkg-latest.tar.gz"), None);
        assert_eq!(version_from_filename("pkg-1.0.exe"), None);
    }

    #[tokio::test]
    async fn test_simple_index_client_fetches_normalized_project() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/simple/six/")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(SIX_PAGE)
            .create_async()
            .await;

        let index = IndexUrl::new(&format!("{}/simple", server.url())).unwrap();
        let source = SimpleIndexClient::new(Client::new());
        let versions = source.package_versions(&index, "Six").await.unwrap();
        assert_eq!(versions, vec!["1.0.0", "1.1.0", "1.2.0"]);
    }

    #[tokio::test]
    async fn test_missing_project_is_an_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/simple/nope/")
            .with_status(404)
            .create_async()
            .await;

        let index = IndexUrl::new(&format!("{}/simple", server.url())).unwrap();
        let source = SimpleIndexClient::new(Client::new());
        let err = source.package_versions(&index, "nope").await.unwrap_err();
        assert!(matches!(err, VersionError::Status { status, .. } if status.as_u16() == 404));
    }
}
