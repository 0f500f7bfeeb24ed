mod languages;
mod lower;
mod treesitter;
mod walker;

pub use languages::Language;
pub use lower::lower;
pub use treesitter::SourceParser;
pub use walker::SourceWalker;
