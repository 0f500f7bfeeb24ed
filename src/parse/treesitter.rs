use crate::core::error::{Error, Result};
use crate::parse::languages::Language;
use crate::parse::lower::lower;
use crate::syntax::SyntaxTree;
use std::path::Path;
use tree_sitter::{Node, Parser, Tree};

/// Parses source text into a [`SyntaxTree`], rejecting files with syntax errors
pub struct SourceParser {
    parser: Parser,
}

impl SourceParser {
    pub fn new(language: Language) -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&language.tree_sitter_language())
            .map_err(|e| Error::Language {
                message: format!("Cannot load {} grammar: {}", language, e),
            })?;
        Ok(Self { parser })
    }

    /// Parse to a raw tree-sitter tree; `path` is only used in error reports
    pub fn parse_tree(&mut self, source: &str, path: &Path) -> Result<Tree> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| Error::Parse {
                path: path.to_path_buf(),
                line: 1,
                column: 1,
                message: "parser returned no tree".to_string(),
            })?;

        let root = tree.root_node();
        if root.has_error() {
            let (line, column, message) = match first_error(root) {
                Some(node) => describe_error(node, source),
                None => (1, 1, "syntax error".to_string()),
            };
            return Err(Error::Parse {
                path: path.to_path_buf(),
                line,
                column,
                message,
            });
        }

        Ok(tree)
    }

    /// Parse and lower into the owned syntax model
    pub fn parse(&mut self, source: &str, path: &Path) -> Result<SyntaxTree> {
        let tree = self.parse_tree(source, path)?;
        Ok(lower(&tree, source))
    }
}

/// Depth-first search for the first ERROR or MISSING node
fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find_map(first_error);
    found
}

fn describe_error(node: Node, source: &str) -> (usize, usize, String) {
    let position = node.start_position();
    let message = if node.is_missing() {
        format!("missing '{}'", node.kind())
    } else {
        let snippet: String = source[node.byte_range()]
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        let snippet: String = snippet.chars().take(40).collect();
        format!("unexpected '{}'", snippet)
    };
    (position.row + 1, position.column + 1, message)
}
