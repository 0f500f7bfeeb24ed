//! Lowering from tree-sitter C# nodes to the owned syntax model
//!
//! Declarations and statements the rewriter needs to see are broken out into
//! their own variants; everything else is captured as the exact source slice
//! it came from. Conditional preprocessor regions are flattened into their
//! directive lines and the lowered members or statements they guard.
//!
//! @module parse/lower

use crate::syntax::{
    Block, Body, Compound, Declaration, Expr, Fragment, FunctionDecl, LineEnding, NamespaceDecl,
    Statement, SyntaxTree, TypeDecl, UsingDirective,
};
use tree_sitter::{Node, Tree};

/// Lower a parsed C# file
pub fn lower(tree: &Tree, source: &str) -> SyntaxTree {
    let lowerer = Lowerer { source };
    SyntaxTree {
        items: lowerer.compilation_unit(tree.root_node()),
        line_ending: LineEnding::detect(source),
    }
}

// =============================================================================
// NODE CLASSIFICATION
// =============================================================================

fn is_trivia(kind: &str) -> bool {
    kind == "comment" || (kind.starts_with("preproc") && !is_conditional(kind))
}

/// `#if` regions and their `#elif`/`#else` branches, which hold whole
/// members or statements
fn is_conditional(kind: &str) -> bool {
    matches!(kind, "preproc_if" | "preproc_elif" | "preproc_else")
}

fn is_statement(kind: &str) -> bool {
    kind == "block" || (kind.ends_with("_statement") && kind != "global_statement")
}

/// Non-statement nodes that hold statements of their enclosing construct
fn is_statement_container(kind: &str) -> bool {
    matches!(
        kind,
        "switch_body" | "switch_section" | "catch_clause" | "finally_clause" | "else_clause"
    )
}

fn is_type_declaration(kind: &str) -> bool {
    matches!(
        kind,
        "class_declaration"
            | "struct_declaration"
            | "interface_declaration"
            | "record_declaration"
            | "record_struct_declaration"
    )
}

fn children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

/// One line of a conditional region, in source order
enum Guarded<'t> {
    /// `#if X`, `#elif Y`, `#else` or `#endif`
    Directive(String),
    Item(Node<'t>),
}

/// Pieces of a declaration that precede its body
struct Header {
    attributes: Vec<String>,
    text: String,
    /// Comments found between header tokens, emitted ahead of the declaration
    comments: Vec<String>,
}

/// Operand of a `return` or expression statement and the comments on
/// either side of it
#[derive(Default)]
struct Operand {
    before: Vec<String>,
    expr: Option<Expr>,
    after: Vec<String>,
}

struct Lowerer<'s> {
    source: &'s str,
}

impl<'s> Lowerer<'s> {
    fn text(&self, node: Node<'_>) -> &'s str {
        &self.source[node.byte_range()]
    }

    fn span(&self, start: usize, end: usize) -> &'s str {
        &self.source[start..end]
    }

    // -------------------------------------------------------------------------
    // Declarations
    // -------------------------------------------------------------------------

    fn compilation_unit(&self, root: Node<'_>) -> Vec<Declaration> {
        let mut items = Vec::new();
        // `namespace X;` owns every item after it
        let mut file_namespace: Option<NamespaceDecl> = None;

        for child in children(root) {
            if !child.is_named() {
                continue;
            }
            if child.kind() == "file_scoped_namespace_declaration" {
                if let Some(previous) = file_namespace.take() {
                    items.push(Declaration::Namespace(previous));
                }
                file_namespace = Some(self.file_scoped_namespace(child));
                continue;
            }
            match file_namespace.as_mut() {
                Some(ns) => self.member(child, &mut ns.members),
                None => self.member(child, &mut items),
            }
        }

        if let Some(ns) = file_namespace {
            items.push(Declaration::Namespace(ns));
        }
        items
    }

    fn member(&self, node: Node<'_>, out: &mut Vec<Declaration>) {
        let kind = node.kind();
        match kind {
            _ if is_trivia(kind) => out.push(Declaration::Trivia(self.text(node).to_string())),
            _ if is_conditional(kind) => {
                for guarded in self.conditional(node) {
                    match guarded {
                        Guarded::Directive(line) => out.push(Declaration::Trivia(line)),
                        Guarded::Item(child) => self.member(child, out),
                    }
                }
            }
            "using_directive" | "extern_alias_directive" => {
                out.push(Declaration::Using(UsingDirective::parse(self.text(node))))
            }
            "namespace_declaration" => self.namespace(node, out),
            _ if is_type_declaration(kind) => self.type_declaration(node, out),
            "method_declaration" => self.function(node, out, false),
            "constructor_declaration" | "destructor_declaration" => self.function(node, out, true),
            _ => out.push(Declaration::Other(self.text(node).to_string())),
        }
    }

    fn namespace_name(&self, node: Node<'_>) -> String {
        node.child_by_field_name("name")
            .map(|name| self.text(name).split_whitespace().collect::<String>())
            .unwrap_or_default()
    }

    fn namespace(&self, node: Node<'_>, out: &mut Vec<Declaration>) {
        let Some(body) = find_child(node, "declaration_list") else {
            out.push(Declaration::Other(self.text(node).to_string()));
            return;
        };

        let header = self.header(node, body.start_byte());
        out.extend(header.comments.into_iter().map(Declaration::Trivia));
        out.push(Declaration::Namespace(NamespaceDecl {
            name: self.namespace_name(node),
            file_scoped: false,
            members: self.declaration_list(body),
        }));
    }

    fn file_scoped_namespace(&self, node: Node<'_>) -> NamespaceDecl {
        let name_id = node.child_by_field_name("name").map(|n| n.id());
        let mut members = Vec::new();
        // Some grammar revisions nest the following members inside this node
        for child in children(node) {
            if child.is_named() && Some(child.id()) != name_id {
                self.member(child, &mut members);
            }
        }
        NamespaceDecl {
            name: self.namespace_name(node),
            file_scoped: true,
            members,
        }
    }

    fn type_declaration(&self, node: Node<'_>, out: &mut Vec<Declaration>) {
        let Some(body) = find_child(node, "declaration_list") else {
            out.push(Declaration::Other(self.text(node).to_string()));
            return;
        };

        let header = self.header(node, body.start_byte());
        let trailer = self.span(body.end_byte(), node.end_byte()).trim();
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();

        out.extend(header.comments.into_iter().map(Declaration::Trivia));
        out.push(Declaration::Type(TypeDecl {
            name,
            attributes: header.attributes,
            header: header.text,
            members: self.declaration_list(body),
            trailer: (!trailer.is_empty()).then(|| trailer.to_string()),
        }));
    }

    fn declaration_list(&self, node: Node<'_>) -> Vec<Declaration> {
        let mut members = Vec::new();
        for child in children(node) {
            if child.is_named() {
                self.member(child, &mut members);
            }
        }
        members
    }

    fn function(&self, node: Node<'_>, out: &mut Vec<Declaration>, constructor: bool) {
        let nodes = children(node);
        let body_node = nodes
            .iter()
            .find(|c| matches!(c.kind(), "block" | "arrow_expression_clause"))
            .copied();

        // Comments inside an expression body or ahead of its `;`
        let mut body_comments = Vec::new();
        let (body, header_end) = match body_node {
            Some(b) if b.kind() == "block" => (Body::Block(self.block(b)), b.start_byte()),
            Some(b) => {
                let (expr, comments) = self.arrow_expression(b);
                body_comments = comments;
                body_comments.extend(
                    nodes
                        .iter()
                        .filter(|c| c.start_byte() >= b.end_byte() && is_trivia(c.kind()))
                        .map(|c| self.text(*c).to_string()),
                );
                (Body::Expression(expr), b.start_byte())
            }
            None => {
                let end = nodes
                    .last()
                    .filter(|last| last.kind() == ";")
                    .map(|last| last.start_byte())
                    .unwrap_or_else(|| node.end_byte());
                (Body::None, end)
            }
        };

        let header = self.header(node, header_end);
        let name_node = node.child_by_field_name("name");
        let name = name_node
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();
        let return_type = if constructor {
            String::new()
        } else {
            self.return_type(node, name_node)
        };
        let is_async = nodes
            .iter()
            .take_while(|c| Some(c.id()) != name_node.map(|n| n.id()))
            .filter(|c| c.kind() != "attribute_list")
            .any(|c| self.text(*c).split_whitespace().any(|word| word == "async"));

        out.extend(
            header
                .comments
                .into_iter()
                .chain(body_comments)
                .map(Declaration::Trivia),
        );
        let decl = FunctionDecl {
            name,
            attributes: header.attributes,
            header: header.text,
            return_type,
            is_async,
            body,
        };
        out.push(if constructor {
            Declaration::Constructor(decl)
        } else {
            Declaration::Function(decl)
        });
    }

    fn return_type(&self, node: Node<'_>, name: Option<Node<'_>>) -> String {
        if let Some(ty) = node
            .child_by_field_name("returns")
            .or_else(|| node.child_by_field_name("type"))
        {
            return self.text(ty).to_string();
        }

        // Fall back to the last type-like node ahead of the name
        let name_start = name.map(|n| n.start_byte()).unwrap_or_else(|| node.end_byte());
        children(node)
            .into_iter()
            .filter(|c| c.is_named() && c.end_byte() <= name_start)
            .filter(|c| {
                !matches!(
                    c.kind(),
                    "attribute_list" | "modifier" | "explicit_interface_specifier"
                ) && !is_trivia(c.kind())
            })
            .last()
            .map(|ty| self.text(ty).to_string())
            .unwrap_or_default()
    }

    /// The expression after `=>`, and the comments beside it
    fn arrow_expression(&self, node: Node<'_>) -> (Expr, Vec<String>) {
        let nodes = children(node);
        let comments = nodes
            .iter()
            .filter(|c| is_trivia(c.kind()))
            .map(|c| self.text(*c).to_string())
            .collect();
        let expr = match nodes.iter().find(|c| c.is_named() && !is_trivia(c.kind())) {
            Some(e) => Expr::new(self.text(*e)),
            None => Expr::new(self.text(node).trim_start_matches("=>").trim()),
        };
        (expr, comments)
    }

    /// Collect attributes, header text and stray comments ahead of `end`
    ///
    /// The header text is the token runs between comments joined by a space,
    /// so a hoisted comment never stays behind in it.
    fn header(&self, node: Node<'_>, end: usize) -> Header {
        let mut attributes = Vec::new();
        let mut comments = Vec::new();
        let mut runs: Vec<&str> = Vec::new();
        let mut run: Option<(usize, usize)> = None;

        for child in children(node) {
            if child.start_byte() >= end {
                break;
            }
            let kind = child.kind();
            if kind == "attribute_list" || is_trivia(kind) {
                if let Some((s, e)) = run.take() {
                    runs.push(self.span(s, e));
                }
                if kind == "attribute_list" {
                    attributes.push(self.text(child).to_string());
                } else {
                    comments.push(self.text(child).to_string());
                }
            } else {
                let start = run.map(|(s, _)| s).unwrap_or_else(|| child.start_byte());
                run = Some((start, child.end_byte()));
            }
        }
        if let Some((s, e)) = run {
            runs.push(self.span(s, e));
        }

        Header {
            attributes,
            text: runs.join(" "),
            comments,
        }
    }

    // -------------------------------------------------------------------------
    // Statements
    // -------------------------------------------------------------------------

    fn block(&self, node: Node<'_>) -> Block {
        let mut statements = Vec::new();
        for child in children(node) {
            if child.is_named() {
                self.statement(child, &mut statements);
            }
        }
        Block::new(statements)
    }

    /// Lower one statement node into `out`
    ///
    /// Conditional regions are flattened into their directive lines and the
    /// statements they guard. Comments beside the operand of a `return` or
    /// expression statement come out as trivia around it.
    fn statement(&self, node: Node<'_>, out: &mut Vec<Statement>) {
        let kind = node.kind();
        match kind {
            "block" => out.push(Statement::Block(self.block(node))),
            "return_statement" => {
                let operand = self.operand(node);
                out.extend(operand.before.into_iter().map(Statement::Trivia));
                out.push(Statement::Return(operand.expr));
                out.extend(operand.after.into_iter().map(Statement::Trivia));
            }
            "expression_statement" => {
                let operand = self.operand(node);
                let Some(expr) = operand.expr else {
                    out.push(Statement::Other(self.text(node).to_string()));
                    return;
                };
                out.extend(operand.before.into_iter().map(Statement::Trivia));
                out.push(Statement::Expression(expr));
                out.extend(operand.after.into_iter().map(Statement::Trivia));
            }
            "local_function_statement" => {
                out.push(Statement::LocalFunction(self.text(node).to_string()))
            }
            _ if is_trivia(kind) => out.push(Statement::Trivia(self.text(node).to_string())),
            _ if is_conditional(kind) => {
                for guarded in self.conditional(node) {
                    match guarded {
                        Guarded::Directive(line) => out.push(Statement::Trivia(line)),
                        Guarded::Item(child) => self.statement(child, out),
                    }
                }
            }
            _ if has_nested_statements(node) => out.push(Statement::Compound(Compound {
                fragments: self.fragments(node),
            })),
            _ => out.push(Statement::Other(self.text(node).to_string())),
        }
    }

    fn operand(&self, node: Node<'_>) -> Operand {
        let mut operand = Operand::default();
        for child in children(node) {
            let kind = child.kind();
            if is_trivia(kind) {
                let comment = self.text(child).to_string();
                if operand.expr.is_none() {
                    operand.before.push(comment);
                } else {
                    operand.after.push(comment);
                }
            } else if child.is_named() && operand.expr.is_none() {
                operand.expr = Some(Expr::new(self.text(child)));
            }
        }
        operand
    }

    /// Split a conditional region into directive lines and guarded nodes;
    /// `#elif` and `#else` branches are inlined in order
    fn conditional<'t>(&self, node: Node<'t>) -> Vec<Guarded<'t>> {
        let mut out = Vec::new();
        self.collect_conditional(node, &mut out);
        out
    }

    fn collect_conditional<'t>(&self, node: Node<'t>, out: &mut Vec<Guarded<'t>>) {
        let condition = node.child_by_field_name("condition").map(|c| c.id());
        let alternative = node.child_by_field_name("alternative").map(|c| c.id());
        let mut directive: Option<(usize, usize)> = None;

        for child in children(node) {
            let text = self.text(child);
            if !child.is_named() && text.trim().is_empty() {
                continue;
            }
            if !child.is_named() && text.starts_with('#') {
                if let Some((s, e)) = directive.take() {
                    out.push(Guarded::Directive(self.span(s, e).trim().to_string()));
                }
                directive = Some((child.start_byte(), child.end_byte()));
                continue;
            }
            if Some(child.id()) == condition {
                let start = directive.map(|(s, _)| s).unwrap_or_else(|| child.start_byte());
                directive = Some((start, child.end_byte()));
                continue;
            }

            if let Some((s, e)) = directive.take() {
                out.push(Guarded::Directive(self.span(s, e).trim().to_string()));
            }
            if Some(child.id()) == alternative {
                self.collect_conditional(child, out);
            } else if child.is_named() {
                out.push(Guarded::Item(child));
            }
        }

        if let Some((s, e)) = directive {
            out.push(Guarded::Directive(self.span(s, e).trim().to_string()));
        }
    }

    fn fragments(&self, node: Node<'_>) -> Vec<Fragment> {
        let mut fragments = Vec::new();
        self.collect_fragments(node, &mut fragments);
        fragments
    }

    fn collect_fragments(&self, node: Node<'_>, out: &mut Vec<Fragment>) {
        let mut run: Option<(usize, usize)> = None;

        for child in children(node) {
            let kind = child.kind();
            let broken_out = is_statement(kind)
                || is_statement_container(kind)
                || is_conditional(kind)
                || is_trivia(kind)
                || (!child.is_named() && matches!(kind, "{" | "}"));

            if !broken_out {
                let start = run.map(|(s, _)| s).unwrap_or_else(|| child.start_byte());
                run = Some((start, child.end_byte()));
                continue;
            }

            if let Some((s, e)) = run.take() {
                out.push(Fragment::Text(self.span(s, e).to_string()));
            }

            match kind {
                "{" => out.push(Fragment::Open),
                "}" => out.push(Fragment::Close),
                _ if is_trivia(kind) => out.push(Fragment::Comment(self.text(child).to_string())),
                _ if is_statement_container(kind) => self.collect_fragments(child, out),
                _ => {
                    let mut statements = Vec::new();
                    self.statement(child, &mut statements);
                    out.extend(statements.into_iter().map(|statement| match statement {
                        Statement::Trivia(text) => Fragment::Comment(text),
                        other => Fragment::Statement(other),
                    }));
                }
            }
        }

        if let Some((s, e)) = run {
            out.push(Fragment::Text(self.span(s, e).to_string()));
        }
    }
}

fn find_child<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    children(node).into_iter().find(|c| c.kind() == kind)
}

fn has_nested_statements(node: Node<'_>) -> bool {
    children(node).into_iter().any(|c| {
        let kind = c.kind();
        is_statement(kind)
            || ((is_statement_container(kind) || is_conditional(kind)) && has_nested_statements(c))
    })
}
