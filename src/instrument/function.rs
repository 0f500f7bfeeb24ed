//! Function Body Rewriting
//!
//! Turns one method declaration into its instrumented form:
//!
//! - block bodies get an ENTER trace first, an EXIT trace last and an EXIT
//!   trace in front of every `return`
//! - expression bodies are normalized into blocks first, binding the value
//!   to a fresh local when the method returns one
//! - constructors, finalizers and bodiless members are returned as-is
//!
//! @module instrument/function

use super::returns::rewrite_returns;
use super::trace::{TraceKind, TraceSynthesizer};
use crate::core::config::TraceConfig;
use crate::syntax::{Block, Body, Declaration, Expr, FunctionDecl, LocalDecl, Statement};
use tracing::debug;

/// Counters reported back to the driver
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteStats {
    pub functions_instrumented: usize,
    pub returns_rewritten: usize,
}

impl std::ops::AddAssign for RewriteStats {
    fn add_assign(&mut self, other: Self) {
        self.functions_instrumented += other.functions_instrumented;
        self.returns_rewritten += other.returns_rewritten;
    }
}

/// How an expression body must be turned into statements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExpressionShape {
    /// `=> throw ...;`
    Throw,
    /// The value is discarded
    NoValue,
    /// The value is bound and returned after the EXIT trace
    Value,
}

pub struct FunctionRewriter {
    synth: TraceSynthesizer,
    result_binding: String,
    no_value_keyword: String,
}

impl FunctionRewriter {
    pub fn new(config: &TraceConfig) -> Self {
        Self {
            synth: TraceSynthesizer::new(config),
            result_binding: config.result_binding.clone(),
            no_value_keyword: config.no_value_keyword.clone(),
        }
    }

    pub fn synthesizer(&self) -> &TraceSynthesizer {
        &self.synth
    }

    /// Rewrite a single declaration. Only `Declaration::Function` with a body
    /// changes; namespaces and types are walked by the caller.
    pub fn rewrite_declaration(
        &self,
        decl: Declaration,
        scope_path: &str,
    ) -> (Declaration, RewriteStats) {
        match decl {
            Declaration::Function(func) => {
                let (func, stats) = self.rewrite_function(func, scope_path);
                (Declaration::Function(func), stats)
            }
            Declaration::Constructor(ctor) => {
                debug!(name = %ctor.name, "Skipping constructor");
                (Declaration::Constructor(ctor), RewriteStats::default())
            }
            Declaration::Using(_)
            | Declaration::Namespace(_)
            | Declaration::Type(_)
            | Declaration::Other(_)
            | Declaration::Trivia(_) => (decl, RewriteStats::default()),
        }
    }

    pub fn rewrite_function(
        &self,
        func: FunctionDecl,
        scope_path: &str,
    ) -> (FunctionDecl, RewriteStats) {
        let FunctionDecl {
            name,
            attributes,
            header,
            return_type,
            is_async,
            body,
        } = func;

        let (statements, tail, returns_rewritten) = match body {
            Body::Block(block) => {
                debug!(scope = scope_path, name = %name, "Instrumenting block body");
                let (block, count) = rewrite_returns(&self.synth, block, scope_path, &name);
                (block.statements, None, count)
            }
            Body::Expression(expr) => {
                let shape = self.classify(&expr, &return_type, is_async);
                debug!(scope = scope_path, name = %name, ?shape, "Instrumenting expression body");
                let (statements, tail) =
                    self.normalize(expr, shape, &header, &return_type, is_async);
                (statements, tail, 0)
            }
            Body::None => {
                debug!(scope = scope_path, name = %name, "Skipping bodiless member");
                let func = FunctionDecl {
                    name,
                    attributes,
                    header,
                    return_type,
                    is_async,
                    body: Body::None,
                };
                return (func, RewriteStats::default());
            }
        };

        let mut body = Vec::with_capacity(statements.len() + 3);
        body.push(self.synth.make_trace(TraceKind::Enter, scope_path, &name));
        body.extend(statements);
        body.push(self.synth.make_trace(TraceKind::Exit, scope_path, &name));
        body.extend(tail);

        let func = FunctionDecl {
            name,
            attributes,
            header,
            return_type,
            is_async,
            body: Body::Block(Block::new(body)),
        };
        let stats = RewriteStats {
            functions_instrumented: 1,
            returns_rewritten,
        };
        (func, stats)
    }

    fn classify(&self, expr: &Expr, return_type: &str, is_async: bool) -> ExpressionShape {
        if is_throw(expr.as_str()) {
            ExpressionShape::Throw
        } else if self.is_no_value(return_type, is_async) {
            ExpressionShape::NoValue
        } else {
            ExpressionShape::Value
        }
    }

    /// `void`, or a bare `Task`/`ValueTask` on an async method
    fn is_no_value(&self, return_type: &str, is_async: bool) -> bool {
        let return_type = return_type.trim();
        if return_type.eq_ignore_ascii_case(&self.no_value_keyword) {
            return true;
        }
        if !is_async || return_type.contains('<') {
            return false;
        }
        let simple = return_type.rsplit('.').next().unwrap_or(return_type);
        simple == "Task" || simple == "ValueTask"
    }

    /// Statements equivalent to the expression body, without traces, and the
    /// `return` that has to follow the EXIT trace
    fn normalize(
        &self,
        expr: Expr,
        shape: ExpressionShape,
        header: &str,
        return_type: &str,
        is_async: bool,
    ) -> (Vec<Statement>, Option<Statement>) {
        match shape {
            ExpressionShape::Throw => (
                vec![Statement::Other(format!("{};", expr.as_str().trim()))],
                None,
            ),
            ExpressionShape::NoValue => (vec![Statement::Expression(expr)], None),
            ExpressionShape::Value => {
                let name = fresh_name(&self.result_binding, &[header, expr.as_str()]);
                let return_type = return_type.trim();
                let is_ref = !is_async && is_ref_type(return_type);

                let (ty, init, returned) = if is_async {
                    ("var".to_string(), expr, name.clone())
                } else if is_ref {
                    let value = expr.as_str().trim();
                    let init = if is_ref_type(value) {
                        expr
                    } else {
                        Expr::new(format!("ref {}", value))
                    };
                    (return_type.to_string(), init, format!("ref {}", name))
                } else {
                    (return_type.to_string(), expr, name.clone())
                };

                (
                    vec![Statement::Local(LocalDecl { ty, name, init })],
                    Some(Statement::Return(Some(Expr::new(returned)))),
                )
            }
        }
    }
}

impl Default for FunctionRewriter {
    fn default() -> Self {
        Self::new(&TraceConfig::default())
    }
}

fn is_throw(text: &str) -> bool {
    let text = text.trim_start();
    text.strip_prefix("throw")
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(|c: char| c.is_whitespace() || c == ';'))
}

fn is_ref_type(text: &str) -> bool {
    text.strip_prefix("ref")
        .is_some_and(|rest| rest.starts_with(char::is_whitespace))
}

/// `base`, or `base` with the smallest numeric suffix that appears in none
/// of `texts`
fn fresh_name(base: &str, texts: &[&str]) -> String {
    let taken = |candidate: &str| texts.iter().any(|text| contains_identifier(text, candidate));
    if !taken(base) {
        return base.to_string();
    }
    (1..)
        .map(|n| format!("{}{}", base, n))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| base.to_string())
}

fn contains_identifier(text: &str, ident: &str) -> bool {
    let is_ident_char = |c: char| c.is_alphanumeric() || c == '_';
    text.match_indices(ident).any(|(start, _)| {
        let before = text[..start].chars().next_back();
        let after = text[start + ident.len()..].chars().next();
        !before.is_some_and(is_ident_char) && !after.is_some_and(is_ident_char)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn function(header: &str, return_type: &str, is_async: bool, body: Body) -> FunctionDecl {
        FunctionDecl {
            name: "Bar".to_string(),
            attributes: vec![],
            header: header.to_string(),
            return_type: return_type.to_string(),
            is_async,
            body,
        }
    }

    fn statements(func: &FunctionDecl) -> &[Statement] {
        match &func.body {
            Body::Block(block) => &block.statements,
            other => panic!("expected block body, got {:?}", other),
        }
    }

    #[test]
    fn test_block_body_gets_enter_and_exit() {
        let rewriter = FunctionRewriter::default();
        let synth = rewriter.synthesizer();
        let func = function(
            "public void Bar()",
            "void",
            false,
            Body::Block(Block::new(vec![Statement::Expression(Expr::new("Work()"))])),
        );

        let (func, stats) = rewriter.rewrite_function(func, "App.Core.Foo");
        let body = statements(&func);

        assert_eq!(body.len(), 3);
        assert!(synth.is_trace(&body[0], TraceKind::Enter));
        assert_eq!(body[1], Statement::Expression(Expr::new("Work()")));
        assert!(synth.is_trace(&body[2], TraceKind::Exit));
        assert_eq!(
            stats,
            RewriteStats {
                functions_instrumented: 1,
                returns_rewritten: 0
            }
        );
    }

    #[test]
    fn test_empty_block_body() {
        let rewriter = FunctionRewriter::default();
        let func = function("void Bar()", "void", false, Body::Block(Block::default()));
        let (func, _) = rewriter.rewrite_function(func, "Foo");
        let body = statements(&func);
        assert_eq!(body.len(), 2);
        assert!(rewriter.synthesizer().is_trace(&body[0], TraceKind::Enter));
        assert!(rewriter.synthesizer().is_trace(&body[1], TraceKind::Exit));
    }

    #[test]
    fn test_block_body_returns_counted() {
        let rewriter = FunctionRewriter::default();
        let func = function(
            "int Bar(int x)",
            "int",
            false,
            Body::Block(Block::new(vec![Statement::Return(Some(Expr::new("x")))])),
        );
        let (func, stats) = rewriter.rewrite_function(func, "Foo");
        let body = statements(&func);

        assert_eq!(stats.returns_rewritten, 1);
        // ENTER, { EXIT; return x; }, EXIT
        assert_eq!(body.len(), 3);
        let Statement::Block(wrapped) = &body[1] else {
            panic!("return must be wrapped");
        };
        assert!(rewriter.synthesizer().is_trace(&wrapped.statements[0], TraceKind::Exit));
        assert_eq!(wrapped.statements[1], Statement::Return(Some(Expr::new("x"))));
    }

    #[test]
    fn test_void_expression_body() {
        let rewriter = FunctionRewriter::default();
        let func = function("void Bar()", "void", false, Body::Expression(Expr::new("G()")));
        let (func, _) = rewriter.rewrite_function(func, "Foo");
        let body = statements(&func);

        assert_eq!(body.len(), 3);
        assert_eq!(body[1], Statement::Expression(Expr::new("G()")));
        assert!(rewriter.synthesizer().is_trace(&body[2], TraceKind::Exit));
        assert!(!body.iter().any(|s| matches!(s, Statement::Return(_))));
    }

    #[test]
    fn test_void_keyword_case_insensitive() {
        let rewriter = FunctionRewriter::default();
        let func = function("Void Bar()", "Void", false, Body::Expression(Expr::new("G()")));
        let (func, _) = rewriter.rewrite_function(func, "Foo");
        assert!(!statements(&func).iter().any(|s| matches!(s, Statement::Return(_))));
    }

    #[test]
    fn test_value_expression_body() {
        let rewriter = FunctionRewriter::default();
        let func = function("int Bar(int x)", "int", false, Body::Expression(Expr::new("x + 1")));
        let (func, stats) = rewriter.rewrite_function(func, "Foo");
        let body = statements(&func);

        assert_eq!(stats.functions_instrumented, 1);
        assert_eq!(body.len(), 4);
        assert!(rewriter.synthesizer().is_trace(&body[0], TraceKind::Enter));
        assert_eq!(
            body[1],
            Statement::Local(LocalDecl {
                ty: "int".to_string(),
                name: "__axal_result".to_string(),
                init: Expr::new("x + 1"),
            })
        );
        assert!(rewriter.synthesizer().is_trace(&body[2], TraceKind::Exit));
        assert_eq!(body[3], Statement::Return(Some(Expr::new("__axal_result"))));
    }

    #[test]
    fn test_async_task_is_no_value() {
        let rewriter = FunctionRewriter::default();
        let func = function(
            "async Task Bar()",
            "Task",
            true,
            Body::Expression(Expr::new("await G()")),
        );
        let (func, _) = rewriter.rewrite_function(func, "Foo");
        let body = statements(&func);
        assert_eq!(body[1], Statement::Expression(Expr::new("await G()")));
        assert_eq!(body.len(), 3);
    }

    #[test]
    fn test_async_value_uses_var() {
        let rewriter = FunctionRewriter::default();
        let func = function(
            "async Task<int> Bar()",
            "Task<int>",
            true,
            Body::Expression(Expr::new("await G()")),
        );
        let (func, _) = rewriter.rewrite_function(func, "Foo");
        let Statement::Local(local) = &statements(&func)[1] else {
            panic!("value must be bound");
        };
        assert_eq!(local.ty, "var");
    }

    #[test]
    fn test_non_async_task_returns_value() {
        let rewriter = FunctionRewriter::default();
        let func = function("Task Bar()", "Task", false, Body::Expression(Expr::new("G()")));
        let (func, _) = rewriter.rewrite_function(func, "Foo");
        assert_eq!(
            statements(&func).last(),
            Some(&Statement::Return(Some(Expr::new("__axal_result"))))
        );
    }

    #[test]
    fn test_throw_expression_body() {
        let rewriter = FunctionRewriter::default();
        let func = function(
            "int Bar()",
            "int",
            false,
            Body::Expression(Expr::new("throw new NotImplementedException()")),
        );
        let (func, _) = rewriter.rewrite_function(func, "Foo");
        let body = statements(&func);
        assert_eq!(body.len(), 3);
        assert_eq!(
            body[1],
            Statement::Other("throw new NotImplementedException();".to_string())
        );
    }

    #[test]
    fn test_ref_return_binds_ref_local() {
        let rewriter = FunctionRewriter::default();
        let func = function("ref int Bar()", "ref int", false, Body::Expression(Expr::new("ref _x")));
        let (func, _) = rewriter.rewrite_function(func, "Foo");
        let body = statements(&func);
        assert_eq!(
            body[1],
            Statement::Local(LocalDecl {
                ty: "ref int".to_string(),
                name: "__axal_result".to_string(),
                init: Expr::new("ref _x"),
            })
        );
        assert_eq!(body[3], Statement::Return(Some(Expr::new("ref __axal_result"))));
    }

    #[test]
    fn test_binding_name_avoids_collisions() {
        let rewriter = FunctionRewriter::default();
        let func = function(
            "int Bar(int __axal_result)",
            "int",
            false,
            Body::Expression(Expr::new("__axal_result + __axal_result1")),
        );
        let (func, _) = rewriter.rewrite_function(func, "Foo");
        let Statement::Local(local) = &statements(&func)[1] else {
            panic!("value must be bound");
        };
        assert_eq!(local.name, "__axal_result2");
    }

    #[test]
    fn test_constructor_and_bodiless_untouched() {
        let rewriter = FunctionRewriter::default();
        let ctor = Declaration::Constructor(function(
            "public Foo()",
            "",
            false,
            Body::Block(Block::new(vec![Statement::Return(None)])),
        ));
        let (out, stats) = rewriter.rewrite_declaration(ctor.clone(), "Foo");
        assert_eq!(out, ctor);
        assert_eq!(stats, RewriteStats::default());

        let abstract_method = Declaration::Function(function("abstract int Bar();", "int", false, Body::None));
        let (out, stats) = rewriter.rewrite_declaration(abstract_method.clone(), "Foo");
        assert_eq!(out, abstract_method);
        assert_eq!(stats.functions_instrumented, 0);
    }

    #[test]
    fn test_contains_identifier_boundaries() {
        assert!(contains_identifier("a + __r", "__r"));
        assert!(!contains_identifier("a + __r1", "__r"));
        assert!(!contains_identifier("x__r", "__r"));
    }
}
