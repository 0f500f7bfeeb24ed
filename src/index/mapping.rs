//! Type-to-file mapping and its builder

use super::extract::extract_types;
use crate::core::config::IndexConfig;
use crate::core::error::{Error, Result};
use crate::output;
use crate::parse::{Language, SourceParser};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Fully-qualified type name to absolute source path, sorted by name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeIndex {
    types: BTreeMap<String, String>,
}

impl TypeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `name`; the first path seen for a name is kept
    pub fn insert(&mut self, name: String, path: &Path) -> bool {
        if let Some(existing) = self.types.get(&name) {
            debug!(name = %name, kept = %existing, ignored = %path.display(), "Duplicate type");
            return false;
        }
        self.types.insert(name, path.to_string_lossy().into_owned());
        true
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.types.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the mapping into `dir`, returning the written path
    pub fn write(&self, dir: &Path, config: &IndexConfig) -> Result<PathBuf> {
        let path = dir.join(&config.output_file);
        std::fs::write(&path, self.to_json()?)?;
        info!(path = %path.display(), types = self.len(), "Wrote type mapping");
        Ok(path)
    }
}

/// Outcome of indexing a batch of files
#[derive(Debug, Default)]
pub struct IndexReport {
    pub index: TypeIndex,
    pub files_indexed: usize,
    pub failed: Vec<(PathBuf, Error)>,
}

pub struct TypeIndexer {
    parser: SourceParser,
}

impl TypeIndexer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            parser: SourceParser::new(Language::CSharp)?,
        })
    }

    /// Index every file, skipping those that cannot be read or parsed
    pub fn build(&mut self, files: &[PathBuf]) -> Result<IndexReport> {
        let mut report = IndexReport::default();
        for path in files {
            match self.index_file(path, &mut report.index) {
                Ok(count) => {
                    debug!(path = %path.display(), types = count, "Indexed file");
                    report.files_indexed += 1;
                }
                Err(e) if e.is_per_file() => {
                    warn!(path = %path.display(), error = %e, "Skipping file");
                    println!("{}", output::format_file_failed(path, &e));
                    report.failed.push((path.clone(), e));
                }
                Err(e) => return Err(e),
            }
        }
        Ok(report)
    }

    fn index_file(&mut self, path: &Path, index: &mut TypeIndex) -> Result<usize> {
        let source = std::fs::read_to_string(path).map_err(|source| Error::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let tree = self.parser.parse_tree(&source, path)?;
        let absolute = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());

        let names = extract_types(&tree, &source);
        let count = names.len();
        for name in names {
            index.insert(name, &absolute);
        }
        Ok(count)
    }
}
