//! Trace Statement Synthesis
//!
//! Builds the statements that print `AXAL_ENTER <scope> <name> <timestamp>`
//! and `AXAL_EXIT ...` lines. The timestamp is an expression in the emitted
//! code, so it is evaluated when the instrumented program runs.
//!
//! @module instrument/trace

use crate::core::config::TraceConfig;
use crate::syntax::{Expr, Statement};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceKind {
    Enter,
    Exit,
}

impl TraceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TraceKind::Enter => "ENTER",
            TraceKind::Exit => "EXIT",
        }
    }
}

impl std::fmt::Display for TraceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry or exit event, lowered straight into a statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceEvent<'a> {
    pub kind: TraceKind,
    pub scope_path: &'a str,
    pub function_name: &'a str,
}

#[derive(Debug, Clone)]
pub struct TraceSynthesizer {
    tag: String,
    writer: String,
    clock: String,
    timestamp_format: String,
}

impl TraceSynthesizer {
    pub fn new(config: &TraceConfig) -> Self {
        Self {
            tag: config.tag.clone(),
            writer: config.writer.clone(),
            clock: config.clock.clone(),
            timestamp_format: config.timestamp_format.clone(),
        }
    }

    /// Expression statement printing the trace line for `kind`
    pub fn make_trace(&self, kind: TraceKind, scope_path: &str, function_name: &str) -> Statement {
        Statement::Expression(self.render(TraceEvent {
            kind,
            scope_path,
            function_name,
        }))
    }

    pub fn render(&self, event: TraceEvent<'_>) -> Expr {
        let prefix = format!(
            "{}_{} {} {} ",
            self.tag, event.kind, event.scope_path, event.function_name
        );
        Expr::new(format!(
            "{}({} + {}.ToString({}))",
            self.writer,
            string_literal(&prefix),
            self.clock,
            string_literal(&self.timestamp_format)
        ))
    }

    /// Whether `statement` is a trace of `kind` produced by this synthesizer
    pub fn is_trace(&self, statement: &Statement, kind: TraceKind) -> bool {
        let marker = format!("{}(\"{}_{} ", self.writer, self.tag, kind);
        matches!(statement, Statement::Expression(expr) if expr.as_str().starts_with(&marker))
    }
}

impl Default for TraceSynthesizer {
    fn default() -> Self {
        Self::new(&TraceConfig::default())
    }
}

/// Quote `text` as a regular C# string literal
fn string_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_trace_text() {
        let synth = TraceSynthesizer::default();
        let stmt = synth.make_trace(TraceKind::Enter, "App.Core.Foo", "Bar");
        assert_eq!(
            stmt,
            Statement::Expression(Expr::new(
                "Console.WriteLine(\"AXAL_ENTER App.Core.Foo Bar \" + DateTime.Now.ToString(\"yyyy-MM-dd HH:mm:ss.ffffff\"))"
            ))
        );
        assert!(synth.is_trace(&stmt, TraceKind::Enter));
        assert!(!synth.is_trace(&stmt, TraceKind::Exit));
    }

    #[test]
    fn test_exit_trace_text() {
        let synth = TraceSynthesizer::default();
        let Statement::Expression(expr) = synth.make_trace(TraceKind::Exit, "Program", "Main")
        else {
            panic!("trace must be an expression statement");
        };
        assert!(expr
            .as_str()
            .starts_with("Console.WriteLine(\"AXAL_EXIT Program Main \" + "));
    }

    #[test]
    fn test_configured_tag_and_writer() {
        let config = TraceConfig {
            tag: "PROBE".to_string(),
            writer: "Debug.WriteLine".to_string(),
            ..TraceConfig::default()
        };
        let synth = TraceSynthesizer::new(&config);
        let stmt = synth.make_trace(TraceKind::Enter, "A", "B");
        assert!(synth.is_trace(&stmt, TraceKind::Enter));
        let Statement::Expression(expr) = stmt else {
            panic!("trace must be an expression statement");
        };
        assert!(expr.as_str().starts_with("Debug.WriteLine(\"PROBE_ENTER A B \""));
    }

    #[test]
    fn test_string_literal_escaping() {
        assert_eq!(string_literal(r#"a"b\c"#), r#""a\"b\\c""#);
        assert_eq!(string_literal("x\ny"), r#""x\ny""#);
    }
}
