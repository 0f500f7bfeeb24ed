//! Owned Syntax Model
//!
//! The rewriter never works on tree-sitter nodes directly. Files are lowered
//! into these plain enums and structs, every rewrite consumes a node and
//! builds a new one, and the printer turns the result back into text.
//!
//! Only the shapes the instrumentation cares about are modelled. Everything
//! else (expressions, fields, properties, local declarations, ...) is carried
//! as verbatim source text so it round-trips untouched.
//!
//! @module syntax/tree

// =============================================================================
// ROOT
// =============================================================================

/// Line terminator style of a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    /// Detect the style used by `source` (CRLF wins if present at all)
    pub fn detect(source: &str) -> Self {
        if source.contains("\r\n") {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// A parsed source file
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyntaxTree {
    /// Top-level items in document order
    pub items: Vec<Declaration>,
    pub line_ending: LineEnding,
}

// =============================================================================
// DECLARATIONS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Using(UsingDirective),
    Namespace(NamespaceDecl),
    Type(TypeDecl),
    Function(FunctionDecl),
    /// Constructors and finalizers
    Constructor(FunctionDecl),
    /// Any other member, verbatim
    Other(String),
    /// Comments and preprocessor directives
    Trivia(String),
}

/// A `using` or `extern alias` directive at the top of a file or namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsingDirective {
    /// Source text, including the trailing `;`
    pub text: String,
    /// Imported name, e.g. `System.Text` (the target for aliases)
    pub target: String,
    pub alias: Option<String>,
    pub is_global: bool,
    pub is_static: bool,
    pub is_extern_alias: bool,
}

impl UsingDirective {
    /// Build a plain `using <namespace>;`
    pub fn import(namespace: &str) -> Self {
        Self {
            text: format!("using {};", namespace),
            target: namespace.to_string(),
            alias: None,
            is_global: false,
            is_static: false,
            is_extern_alias: false,
        }
    }

    /// Parse a directive from its source text
    pub fn parse(text: &str) -> Self {
        let text = text.trim().to_string();
        let body = text.trim_end_matches(';').trim();
        let mut words: Vec<&str> = body.split_whitespace().collect();

        let is_extern_alias = words.first() == Some(&"extern");
        if is_extern_alias {
            return Self {
                target: words.last().map(|w| w.to_string()).unwrap_or_default(),
                text,
                alias: None,
                is_global: false,
                is_static: false,
                is_extern_alias,
            };
        }
        let is_global = words.first() == Some(&"global");
        if is_global {
            words.remove(0);
        }
        if words.first() == Some(&"using") {
            words.remove(0);
        }
        let is_static = words.first() == Some(&"static");
        if is_static || words.first() == Some(&"unsafe") {
            words.remove(0);
        }

        let rest: String = words.join(" ");
        let (alias, target) = match rest.split_once('=') {
            Some((alias, target)) => (Some(compact(alias)), compact(target)),
            None => (None, compact(&rest)),
        };

        Self {
            text,
            target,
            alias,
            is_global,
            is_static,
            is_extern_alias,
        }
    }

    /// Whether this directive brings every type of `namespace` into scope
    pub fn imports(&self, namespace: &str) -> bool {
        !self.is_extern_alias && !self.is_static && self.alias.is_none() && self.target == namespace
    }
}

fn compact(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDecl {
    /// Dotted name as written, e.g. `App.Core`
    pub name: String,
    /// `namespace X;` form: members follow without braces
    pub file_scoped: bool,
    pub members: Vec<Declaration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub name: String,
    pub attributes: Vec<String>,
    /// Everything between the attributes and the opening brace
    pub header: String,
    pub members: Vec<Declaration>,
    /// Tokens after the closing brace (a stray `;`)
    pub trailer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDecl {
    pub name: String,
    pub attributes: Vec<String>,
    /// Modifiers, return type, name, parameters and constraints, verbatim
    pub header: String,
    /// Textual return type; empty for constructors
    pub return_type: String,
    pub is_async: bool,
    pub body: Body,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Block(Block),
    /// `=> expr;`
    Expression(Expr),
    /// Abstract, extern, partial and interface members
    None,
}

// =============================================================================
// STATEMENTS
// =============================================================================

/// Expression source text, never interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr(pub String);

impl Expr {
    pub fn new(text: impl Into<String>) -> Self {
        Expr(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Block {
    pub statements: Vec<Statement>,
}

impl Block {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Block(Block),
    Return(Option<Expr>),
    /// `expr;`
    Expression(Expr),
    Local(LocalDecl),
    /// Nested function, verbatim; never instrumented
    LocalFunction(String),
    /// Control-flow container whose nested statements are reachable
    Compound(Compound),
    /// Leaf statement, verbatim
    Other(String),
    Trivia(String),
}

/// `type name = init;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalDecl {
    pub ty: String,
    pub name: String,
    pub init: Expr,
}

/// An opaque statement such as `if`, `while` or `try`, kept as the ordered
/// sequence of its tokens with the nested statements broken out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compound {
    pub fragments: Vec<Fragment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Run of tokens, verbatim
    Text(String),
    Comment(String),
    /// `{` of a container that is not itself a block (switch bodies)
    Open,
    Close,
    Statement(Statement),
}
