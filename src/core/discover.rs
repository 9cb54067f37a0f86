use anyhow::{Context, Result};
use glob::glob;
use std::path::{Path, PathBuf};
use tracing::warn;

const SOURCE_EXTENSION: &str = "clj";

pub struct FileDiscovery;

impl FileDiscovery {
    /// Returns the candidate files under `path`. A lone file is returned only
    /// when it carries the `.clj` extension; a directory yields its direct
    /// `*.clj` children, or every depth with `recursive`. No match is an
    /// empty list, not an error.
    pub fn find_clojure_files(path: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
        if path.is_file() {
            if path.extension().map_or(false, |ext| ext == SOURCE_EXTENSION) {
                return Ok(vec![path.to_path_buf()]);
            }
            return Ok(Vec::new());
        }

        let pattern = if recursive {
            path.join("**").join(format!("*.{}", SOURCE_EXTENSION))
        } else {
            path.join(format!("*.{}", SOURCE_EXTENSION))
        };
        let pattern = pattern.to_string_lossy().into_owned();

        let mut files = Vec::new();
        for entry in
            glob(&pattern).with_context(|| format!("invalid glob pattern: {}", pattern))?
        {
            match entry {
                Ok(candidate) if candidate.is_file() => files.push(candidate),
                Ok(_) => {}
                Err(err) => warn!("Skipping unreadable entry: {}", err),
            }
        }

        Ok(files)
    }
}
