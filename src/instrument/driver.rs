//! File Driver
//!
//! Runs the whole pipeline for one file: read, parse, make sure the trace
//! call resolves, rewrite every method, format and write back in place.
//! A batch keeps going when a single file fails.
//!
//! @module instrument/driver

use super::context::ScopeTracker;
use super::function::{FunctionRewriter, RewriteStats};
use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::output;
use crate::parse::{Language, SourceParser};
use crate::syntax::{
    CanonicalFormatter, Declaration, Formatter, NamespaceDecl, SyntaxTree, TypeDecl,
    UsingDirective,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Result of instrumenting source text in memory
#[derive(Debug, Clone)]
pub struct Instrumented {
    pub text: String,
    pub stats: RewriteStats,
    /// Whether a `using` for the trace namespace had to be added
    pub import_added: bool,
}

#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub stats: RewriteStats,
}

/// Outcome of a batch run
#[derive(Debug, Default)]
pub struct RunReport {
    pub instrumented: Vec<FileOutcome>,
    pub failed: Vec<(PathBuf, Error)>,
}

impl RunReport {
    pub fn total(&self) -> RewriteStats {
        let mut total = RewriteStats::default();
        for outcome in &self.instrumented {
            total += outcome.stats;
        }
        total
    }
}

pub struct FileDriver<F: Formatter = CanonicalFormatter> {
    parser: SourceParser,
    rewriter: FunctionRewriter,
    formatter: F,
    import: String,
}

impl FileDriver<CanonicalFormatter> {
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_formatter(config, CanonicalFormatter::new(&config.format))
    }
}

impl<F: Formatter> FileDriver<F> {
    pub fn with_formatter(config: &Config, formatter: F) -> Result<Self> {
        Ok(Self {
            parser: SourceParser::new(Language::CSharp)?,
            rewriter: FunctionRewriter::new(&config.trace),
            formatter,
            import: config.trace.import.clone(),
        })
    }

    /// Instrument `source` without touching the filesystem; `path` only
    /// labels parse errors
    pub fn instrument_source(&mut self, source: &str, path: &Path) -> Result<Instrumented> {
        let tree = self.parser.parse(source, path)?;
        let (tree, import_added) = ensure_import(tree, &self.import);

        let mut scope = ScopeTracker::new();
        let mut stats = RewriteStats::default();
        let items = self.rewrite_items(tree.items, &mut scope, &mut stats);
        let tree = SyntaxTree {
            items,
            line_ending: tree.line_ending,
        };

        Ok(Instrumented {
            text: self.formatter.format(&tree),
            stats,
            import_added,
        })
    }

    /// Instrument one file in place
    pub fn process_file(&mut self, path: &Path) -> Result<FileOutcome> {
        let source = std::fs::read_to_string(path).map_err(|source| Error::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        let instrumented = self.instrument_source(&source, path)?;

        std::fs::write(path, &instrumented.text).map_err(|source| Error::FileWrite {
            path: path.to_path_buf(),
            source,
        })?;

        info!(
            path = %path.display(),
            functions = instrumented.stats.functions_instrumented,
            returns = instrumented.stats.returns_rewritten,
            import_added = instrumented.import_added,
            "Instrumented file"
        );

        Ok(FileOutcome {
            path: path.to_path_buf(),
            stats: instrumented.stats,
        })
    }

    /// Process every file in order, printing one progress line per file
    ///
    /// Read, parse and write failures are recorded and the run moves on;
    /// any other error ends the run.
    pub fn process_all(&mut self, files: &[PathBuf]) -> Result<RunReport> {
        let mut report = RunReport::default();
        for path in files {
            match self.process_file(path) {
                Ok(outcome) => {
                    println!("{}", output::format_file_done(&outcome));
                    report.instrumented.push(outcome);
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

    fn rewrite_items(
        &self,
        items: Vec<Declaration>,
        scope: &mut ScopeTracker,
        stats: &mut RewriteStats,
    ) -> Vec<Declaration> {
        items
            .into_iter()
            .map(|item| self.rewrite_item(item, scope, stats))
            .collect()
    }

    fn rewrite_item(
        &self,
        item: Declaration,
        scope: &mut ScopeTracker,
        stats: &mut RewriteStats,
    ) -> Declaration {
        match item {
            Declaration::Namespace(ns) => {
                scope.enter_namespace(&ns.name);
                let members = self.rewrite_items(ns.members, scope, stats);
                scope.exit_namespace();
                Declaration::Namespace(NamespaceDecl { members, ..ns })
            }
            Declaration::Type(ty) => {
                scope.enter_type(&ty.name);
                let members = self.rewrite_items(ty.members, scope, stats);
                scope.exit_type();
                Declaration::Type(TypeDecl { members, ..ty })
            }
            other => {
                let (decl, item_stats) = self
                    .rewriter
                    .rewrite_declaration(other, &scope.current_scope_path());
                *stats += item_stats;
                decl
            }
        }
    }
}

/// Add `using <namespace>;` at the root unless a plain import already exists
///
/// The directive goes after the last top-level `using` or `extern alias`
/// outside any `#if` region. Without one, it goes after leading comments and
/// `#define`/`#undef` lines, which must precede every other token.
pub fn ensure_import(tree: SyntaxTree, namespace: &str) -> (SyntaxTree, bool) {
    let usings = unconditional_usings(&tree.items);
    if usings.iter().any(|(_, using)| using.imports(namespace)) {
        return (tree, false);
    }
    let last_using = usings.last().map(|(index, _)| *index);

    let SyntaxTree {
        mut items,
        line_ending,
    } = tree;

    let position = match last_using {
        Some(last) => last + 1,
        None => items
            .iter()
            .take_while(|item| matches!(item, Declaration::Trivia(text) if is_header_trivia(text)))
            .count(),
    };
    debug!(namespace, position, "Adding import");
    items.insert(position, Declaration::Using(UsingDirective::import(namespace)));

    (SyntaxTree { items, line_ending }, true)
}

/// Top-level using directives that are not guarded by `#if`, with their
/// positions
fn unconditional_usings(items: &[Declaration]) -> Vec<(usize, &UsingDirective)> {
    let mut depth = 0usize;
    let mut usings = Vec::new();
    for (index, item) in items.iter().enumerate() {
        match item {
            Declaration::Trivia(text) => match directive_name(text) {
                Some("if") => depth += 1,
                Some("endif") => depth = depth.saturating_sub(1),
                _ => {}
            },
            Declaration::Using(using) if depth == 0 => usings.push((index, using)),
            _ => {}
        }
    }
    usings
}

/// `if` for `#if DEBUG`, `define` for `# define X`
fn directive_name(text: &str) -> Option<&str> {
    let rest = text.trim_start().strip_prefix('#')?.trim_start();
    rest.split(|c: char| !c.is_ascii_alphabetic()).next()
}

fn is_header_trivia(text: &str) -> bool {
    if let Some(name) = directive_name(text) {
        return matches!(name, "define" | "undef");
    }
    let text = text.trim_start();
    text.starts_with("//") || text.starts_with("/*")
}
