//! Type index: maps declared C# types to the files that declare them

mod extract;
mod mapping;

pub use extract::extract_types;
pub use mapping::{IndexReport, TypeIndex, TypeIndexer};
