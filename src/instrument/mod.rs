//! Entry/exit trace instrumentation
//!
//! Leaf-first: [`context`] tracks the enclosing scope, [`trace`] builds trace
//! statements, [`returns`] and [`function`] rewrite method bodies, and
//! [`driver`] runs the pipeline over files.

pub mod context;
pub mod driver;
pub mod function;
pub mod returns;
pub mod trace;

pub use context::ScopeTracker;
pub use driver::{ensure_import, FileDriver, FileOutcome, Instrumented, RunReport};
pub use function::{FunctionRewriter, RewriteStats};
pub use returns::{rewrite_returns, ReturnRewriter};
pub use trace::{TraceEvent, TraceKind, TraceSynthesizer};
