//! Parsing of HTML directory listings (Apache/nginx "fancy index" pages).
//!
//! Only the first `<table>` of a page is considered. Each `<td>` holding an
//! anchor contributes one entry named after the anchor text.

use std::sync::LazyLock;

use regex::Regex;

static TABLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<table\b[^>]*>(.*?)</table>").expect("valid regex"));
static ROW_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<tr\b[^>]*>(.*?)</tr>").expect("valid regex"));
static CELL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<td\b[^>]*>(.*?)</td>").expect("valid regex"));
static ANCHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<a\b[^>]*>(.*?)</a>").expect("valid regex"));
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"));

/// Anchor text Apache uses for the link back to the enclosing directory.
pub const PARENT_DIRECTORY: &str = "Parent Directory";

/// One linked entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// Entry name without any trailing `/`.
    pub name: String,
    /// Whether the listing marked the entry as a directory (trailing `/`).
    pub is_dir: bool,
}

impl ListingEntry {
    fn from_link_text(text: &str) -> Self {
        match text.strip_suffix('/') {
            Some(name) => Self {
                name: name.to_string(),
                is_dir: true,
            },
            None => Self {
                name: text.to_string(),
                is_dir: false,
            },
        }
    }

    /// Directory form of the entry (`name/`), whether or not the listing
    /// marked it as one.
    pub fn dir_name(&self) -> String {
        format!("{}/", self.name)
    }
}

/// Extract the linked entries of a directory listing page.
///
/// A page without a table yields no entries. Links back to the parent
/// directory are skipped.
///
/// # Example
///
/// ```
/// use initjob_core::listing::parse_listing;
///
/// let html = r#"<table>
///   <tr><td><a href="/">Parent Directory</a></td></tr>
///   <tr><td><a href="fedora/">fedora/</a></td><td>-</td></tr>
/// </table>"#;
/// let entries = parse_listing(html);
/// assert_eq!(entries.len(), 1);
/// assert_eq!(entries[0].name, "fedora");
/// assert!(entries[0].is_dir);
/// ```
pub fn parse_listing(html: &str) -> Vec<ListingEntry> {
    let Some(table) = TABLE_RE.captures(html).and_then(|c| c.get(1)) else {
        return Vec::new();
    };

    let mut entries = Vec::new();
    for row in ROW_RE.captures_iter(table.as_str()) {
        for cell in CELL_RE.captures_iter(&row[1]) {
            let Some(anchor) = ANCHOR_RE.captures(&cell[1]) else {
                continue;
            };
            let text = decode_entities(TAG_RE.replace_all(&anchor[1], "").trim());
            if text.is_empty() || is_parent_link(&text) {
                continue;
            }
            entries.push(ListingEntry::from_link_text(&text));
        }
    }
    entries
}

fn is_parent_link(text: &str) -> bool {
    text == PARENT_DIRECTORY || text == ".." || text == "../"
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Resolve a listing entry against the URL of the page it was found on.
///
/// Absolute links are returned unchanged; relative ones are appended to the
/// page URL, which is treated as a directory.
///
/// # Example
///
/// ```
/// use initjob_core::listing::join_url;
///
/// assert_eq!(join_url("https://idx/index", "fedora/"), "https://idx/index/fedora/");
/// assert_eq!(join_url("https://idx/index/", "/rhel/"), "https://idx/index/rhel/");
/// assert_eq!(join_url("https://idx/index/", "https://other/x/"), "https://other/x/");
/// ```
pub fn join_url(page_url: &str, link: &str) -> String {
    if link.starts_with("http://") || link.starts_with("https://") {
        return link.to_string();
    }
    format!(
        "{}/{}",
        page_url.trim_end_matches('/'),
        link.trim_start_matches('/')
    )
}
