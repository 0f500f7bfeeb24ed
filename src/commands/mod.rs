//! Command handlers behind the `axal` and `axal-index` binaries

pub mod index;
pub mod instrument;

use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::output;
use crate::parse::SourceWalker;
use std::path::{Path, PathBuf};

/// Collect the source files under `dir`; finding none is an error
pub fn discover(dir: &Path, config: &Config) -> Result<Vec<PathBuf>> {
    if dir.as_os_str().is_empty() {
        return Err(Error::InvalidArguments {
            message: "DIRECTORY must not be empty".to_string(),
        });
    }
    let files = SourceWalker::new(dir, &config.discovery).walk()?;
    if files.is_empty() {
        return Err(Error::NoSourceFiles {
            path: dir.to_path_buf(),
            extension: config.discovery.extension.clone(),
        });
    }
    println!(
        "{}",
        output::format_found(files.len(), &config.discovery.extension, dir)
    );
    for file in &files {
        println!("  {}", file.display());
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_empty_dir_is_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();
        let err = discover(dir.path(), &Config::default()).unwrap_err();
        assert!(matches!(err, Error::NoSourceFiles { .. }));
    }

    #[test]
    fn test_discover_empty_argument_is_invalid() {
        let err = discover(Path::new(""), &Config::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidArguments { .. }));
    }

    #[test]
    fn test_discover_missing_dir_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover(&dir.path().join("missing"), &Config::default()).unwrap_err();
        assert!(matches!(err, Error::DirectoryNotFound { .. }));
    }
}
