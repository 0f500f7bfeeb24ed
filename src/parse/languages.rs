//! Language identification and tree-sitter grammar loading

/// Source languages the instrumenter can rewrite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    CSharp,
}

impl Language {
    /// Get the language name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::CSharp => "csharp",
        }
    }

    /// Get the tree-sitter language for this language
    pub fn tree_sitter_language(&self) -> tree_sitter::Language {
        match self {
            Language::CSharp => tree_sitter_c_sharp::LANGUAGE.into(),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_name() {
        assert_eq!(Language::CSharp.as_str(), "csharp");
        assert_eq!(Language::CSharp.to_string(), "csharp");
    }

    #[test]
    fn test_grammar_has_csharp_nodes() {
        let language = Language::CSharp.tree_sitter_language();
        assert!(language.id_for_node_kind("method_declaration", true) != 0);
        assert!(language.id_for_node_kind("preproc_if", true) != 0);
    }
}
