//! Canonical Formatter
//!
//! Lays a [`SyntaxTree`] out as source text: one statement or member per
//! line, braces on their own lines, fixed indentation. Verbatim text carried
//! by the tree is emitted as-is apart from its leading and trailing
//! whitespace; continuation lines inside it are never re-indented, which
//! keeps multi-line string literals intact.
//!
//! @module syntax/printer

use super::tree::{
    Block, Body, Declaration, Fragment, FunctionDecl, LineEnding, NamespaceDecl, Statement,
    SyntaxTree, TypeDecl,
};
use crate::core::config::{FormatConfig, DEFAULT_INDENT_WIDTH};

/// Turns a rewritten tree into persisted text
pub trait Formatter {
    fn format(&self, tree: &SyntaxTree) -> String;
}

/// Fixed-layout formatter used before writing files back
#[derive(Debug, Clone)]
pub struct CanonicalFormatter {
    indent: String,
}

impl CanonicalFormatter {
    pub fn new(config: &FormatConfig) -> Self {
        Self {
            indent: " ".repeat(config.indent_width.max(1)),
        }
    }
}

impl Default for CanonicalFormatter {
    fn default() -> Self {
        Self {
            indent: " ".repeat(DEFAULT_INDENT_WIDTH),
        }
    }
}

impl Formatter for CanonicalFormatter {
    fn format(&self, tree: &SyntaxTree) -> String {
        let mut printer = Printer::new(&self.indent, tree.line_ending);
        printer.declarations(&tree.items);
        printer.finish()
    }
}

// =============================================================================
// PRINTER
// =============================================================================

struct Printer<'a> {
    out: String,
    /// Pending line content, without indentation
    line: String,
    depth: usize,
    indent: &'a str,
    newline: &'static str,
}

impl<'a> Printer<'a> {
    fn new(indent: &'a str, line_ending: LineEnding) -> Self {
        Self {
            out: String::new(),
            line: String::new(),
            depth: 0,
            indent,
            newline: line_ending.as_str(),
        }
    }

    fn finish(mut self) -> String {
        self.flush();
        self.out
    }

    /// Append a token run to the pending line, space-separated
    fn push(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        if !self.line.is_empty() {
            self.line.push(' ');
        }
        self.line.push_str(text);
    }

    /// Append directly, without a separating space
    fn attach(&mut self, text: &str) {
        self.line.push_str(text);
    }

    fn flush(&mut self) {
        if self.line.is_empty() {
            return;
        }
        for _ in 0..self.depth {
            self.out.push_str(self.indent);
        }
        self.out.push_str(&self.line);
        self.out.push_str(self.newline);
        self.line.clear();
    }

    fn blank_line(&mut self) {
        self.flush();
        let double = format!("{0}{0}", self.newline);
        if !self.out.is_empty() && !self.out.ends_with(&double) {
            self.out.push_str(self.newline);
        }
    }

    fn open_brace(&mut self) {
        self.flush();
        self.push("{");
        self.flush();
        self.depth += 1;
    }

    fn close_brace(&mut self) {
        self.flush();
        self.depth = self.depth.saturating_sub(1);
        self.push("}");
    }

    // -------------------------------------------------------------------------
    // Declarations
    // -------------------------------------------------------------------------

    fn declarations(&mut self, items: &[Declaration]) {
        let mut prev: Option<&Declaration> = None;
        for item in items {
            if let Some(prev) = prev {
                if needs_blank_line(prev, item) {
                    self.blank_line();
                }
            }
            self.declaration(item);
            prev = Some(item);
        }
    }

    fn declaration(&mut self, item: &Declaration) {
        match item {
            Declaration::Using(using) => {
                self.push(&using.text);
                self.flush();
            }
            Declaration::Namespace(ns) => self.namespace(ns),
            Declaration::Type(ty) => self.type_decl(ty),
            Declaration::Function(func) | Declaration::Constructor(func) => self.function(func),
            Declaration::Other(text) | Declaration::Trivia(text) => {
                self.push(text);
                self.flush();
            }
        }
    }

    fn namespace(&mut self, ns: &NamespaceDecl) {
        if ns.file_scoped {
            self.push(&format!("namespace {};", ns.name));
            if !ns.members.is_empty() {
                self.blank_line();
            }
            self.declarations(&ns.members);
            return;
        }
        self.push(&format!("namespace {}", ns.name));
        self.open_brace();
        self.declarations(&ns.members);
        self.close_brace();
        self.flush();
    }

    fn type_decl(&mut self, ty: &TypeDecl) {
        self.attributes(&ty.attributes);
        self.push(&ty.header);
        self.open_brace();
        self.declarations(&ty.members);
        self.close_brace();
        if let Some(trailer) = &ty.trailer {
            self.attach(trailer.trim());
        }
        self.flush();
    }

    fn function(&mut self, func: &FunctionDecl) {
        self.attributes(&func.attributes);
        self.push(&func.header);
        match &func.body {
            Body::Block(block) => self.block(block),
            Body::Expression(expr) => {
                self.push("=>");
                self.push(expr.as_str());
                self.attach(";");
                self.flush();
            }
            Body::None => {
                self.attach(";");
                self.flush();
            }
        }
    }

    fn attributes(&mut self, attributes: &[String]) {
        for attribute in attributes {
            self.push(attribute);
            self.flush();
        }
    }

    // -------------------------------------------------------------------------
    // Statements
    // -------------------------------------------------------------------------

    fn block(&mut self, block: &Block) {
        self.open_brace();
        for statement in &block.statements {
            self.statement(statement);
        }
        self.close_brace();
        self.flush();
    }

    fn statement(&mut self, statement: &Statement) {
        self.flush();
        match statement {
            Statement::Block(block) => self.block(block),
            Statement::Return(None) => self.push("return;"),
            Statement::Return(Some(expr)) => self.push(&format!("return {};", expr.as_str().trim())),
            Statement::Expression(expr) => self.push(&format!("{};", expr.as_str().trim())),
            Statement::Local(local) => self.push(&format!(
                "{} {} = {};",
                local.ty.trim(),
                local.name,
                local.init.as_str().trim()
            )),
            Statement::LocalFunction(text) | Statement::Other(text) | Statement::Trivia(text) => {
                self.push(text)
            }
            Statement::Compound(compound) => self.fragments(&compound.fragments),
        }
        self.flush();
    }

    fn fragments(&mut self, fragments: &[Fragment]) {
        for fragment in fragments {
            match fragment {
                Fragment::Text(text) => self.push(text),
                Fragment::Comment(comment) => {
                    let comment = comment.trim();
                    if comment.starts_with('#') {
                        self.flush();
                    }
                    self.push(comment);
                    if comment.starts_with("//") || comment.starts_with('#') {
                        self.flush();
                    }
                }
                Fragment::Open => self.open_brace(),
                Fragment::Close => {
                    self.close_brace();
                    self.flush();
                }
                Fragment::Statement(Statement::Block(block)) => {
                    self.flush();
                    self.block(block);
                }
                // `else if` stays on one line
                Fragment::Statement(Statement::Compound(nested)) if ends_with_else(&self.line) => {
                    self.fragments(&nested.fragments);
                }
                Fragment::Statement(statement) => {
                    self.flush();
                    self.depth += 1;
                    self.statement(statement);
                    self.depth -= 1;
                }
            }
        }
    }
}

/// Whether the pending line ends in the `else` keyword rather than an
/// identifier such as `something_else`
fn ends_with_else(line: &str) -> bool {
    line.strip_suffix("else").is_some_and(|rest| {
        !rest.ends_with(|c: char| c.is_alphanumeric() || c == '_' || c == '@')
    })
}

fn needs_blank_line(prev: &Declaration, next: &Declaration) -> bool {
    let is_large = |decl: &Declaration| {
        matches!(
            decl,
            Declaration::Namespace(_)
                | Declaration::Type(_)
                | Declaration::Function(_)
                | Declaration::Constructor(_)
        )
    };
    match (prev, next) {
        (Declaration::Trivia(_), _) => false,
        (Declaration::Using(_), Declaration::Using(_)) => false,
        (Declaration::Using(_), _) => true,
        _ => is_large(prev) || is_large(next),
    }
}
