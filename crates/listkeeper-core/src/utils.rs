//! Utility helpers — path resolution and filename sanitization.

use std::path::PathBuf;

/// Get the Listkeeper data directory (e.g. `~/.listkeeper/`).
pub fn get_data_path() -> PathBuf {
    let home = home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".listkeeper")
}

/// Get the records directory (e.g. `~/.listkeeper/records/`).
pub fn get_records_path() -> PathBuf {
    get_data_path().join("records")
}

/// Sanitize a string for use as a filename.
pub fn safe_filename(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| std::env::var("USERPROFILE").ok().map(PathBuf::from))
}
