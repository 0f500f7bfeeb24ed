//! axal - entry/exit trace instrumentation for C# sources
//!
//! Parses every `.cs` file under a directory, adds a trace line at the start
//! of each method and before each of its exits, and writes the result back
//! through a canonical formatter.

pub mod cli;
pub mod commands;
pub mod core;
pub mod index;
pub mod instrument;
pub mod output;
pub mod parse;
pub mod syntax;

pub use core::config::Config;
pub use core::error::{Error, Result};
