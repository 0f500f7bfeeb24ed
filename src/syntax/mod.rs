//! Syntax model and formatter shared by the rewriter and the driver

mod printer;
mod tree;

pub use printer::{CanonicalFormatter, Formatter};
pub use tree::{
    Block, Body, Compound, Declaration, Expr, Fragment, FunctionDecl, LineEnding, LocalDecl,
    NamespaceDecl, Statement, SyntaxTree, TypeDecl, UsingDirective,
};
