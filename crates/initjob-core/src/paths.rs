//! Default filesystem locations.

use dirs::data_local_dir;
use std::path::PathBuf;

/// Directory holding the metadata store, or None if no data directory can be resolved.
pub fn try_data_home() -> Option<PathBuf> {
    data_local_dir().map(|d| d.join("thoth"))
}

/// Default metadata store location: `<data dir>/thoth/initjob.db`.
///
/// Falls back to the working directory when the platform has no data
/// directory (e.g. a container without `HOME`).
pub fn default_database_path() -> PathBuf {
    try_data_home()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("initjob.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_database_path_file_name() {
        assert_eq!(
            default_database_path().file_name().and_then(|n| n.to_str()),
            Some("initjob.db")
        );
    }
}
