use crate::core::config::DiscoveryConfig;
use crate::core::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// Recursively discovers source files under a directory
pub struct SourceWalker {
    root: PathBuf,
    extension: String,
    exclude: Vec<String>,
}

impl SourceWalker {
    pub fn new(root: &Path, config: &DiscoveryConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            extension: config.extension.trim_start_matches('.').to_lowercase(),
            exclude: config.exclude.clone(),
        }
    }

    /// Walk all source files below the root, sorted by path
    pub fn walk(&self) -> Result<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Err(Error::DirectoryNotFound {
                path: self.root.clone(),
            });
        }

        let mut files = Vec::new();

        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !self.is_excluded(entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            // Skip directories
            if !entry.file_type().is_file() {
                continue;
            }

            if self.is_source_file(entry.path()) {
                files.push(entry.into_path());
            }
        }

        files.sort();
        Ok(files)
    }

    /// Check if a file has the configured source extension
    pub fn is_source_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase() == self.extension)
            .unwrap_or(false)
    }

    fn is_excluded(&self, entry: &walkdir::DirEntry) -> bool {
        entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .map(|name| self.exclude.iter().any(|ex| ex == name))
                .unwrap_or(false)
    }
}
