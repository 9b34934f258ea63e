//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with mock implementations.

use std::io::{self, Read};
use std::path::Path;

use tracing::debug;

use crate::domain::expand_env_vars;

/// Location value that reads the dataset from standard input.
pub const STDIN_LOCATION: &str = "-";

/// Source of raw dataset text.
pub trait DatasetReader: Send + Sync {
    /// Read the full dataset at `location` (path, URL or `-`).
    fn read(&self, location: &str) -> io::Result<String>;
}

/// True for `http://` and `https://` locations.
pub fn is_remote(location: &str) -> bool {
    let lower = location.trim().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Reads local files, standard input, or fetches over HTTP(S).
#[derive(Debug, Default)]
pub struct RealDatasetReader;

impl RealDatasetReader {
    fn fetch(&self, url: &str) -> io::Result<String> {
        debug!("fetch: url={}", url);
        reqwest::blocking::get(url)
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .map_err(io::Error::other)
    }

    fn read_stdin(&self) -> io::Result<String> {
        let mut content = String::new();
        io::stdin().read_to_string(&mut content)?;
        Ok(content)
    }
}

impl DatasetReader for RealDatasetReader {
    fn read(&self, location: &str) -> io::Result<String> {
        if location == STDIN_LOCATION {
            self.read_stdin()
        } else if is_remote(location) {
            self.fetch(location.trim())
        } else {
            let path = expand_env_vars(location);
            debug!("read: path={}", path);
            std::fs::read_to_string(Path::new(&path))
        }
    }
}
