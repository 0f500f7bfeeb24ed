//! Scope Tracking
//!
//! Keeps the enclosing namespace and type names while a file is walked.
//! One tracker is created per file and passed down the traversal by `&mut`.
//!
//! @module instrument/context

/// Namespace and type stacks for the declaration currently being visited
#[derive(Debug, Clone, Default)]
pub struct ScopeTracker {
    namespaces: Vec<String>,
    types: Vec<String>,
}

impl ScopeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a namespace; dotted names such as `App.Core` are one entry
    pub fn enter_namespace(&mut self, name: &str) {
        self.namespaces.push(name.to_string());
    }

    pub fn exit_namespace(&mut self) {
        self.namespaces.pop();
    }

    pub fn enter_type(&mut self, name: &str) {
        self.types.push(name.to_string());
    }

    pub fn exit_type(&mut self) {
        self.types.pop();
    }

    /// Dotted path of every enclosing namespace followed by the innermost type
    pub fn current_scope_path(&self) -> String {
        self.namespaces
            .iter()
            .map(String::as_str)
            .chain(self.types.last().map(String::as_str))
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_and_type() {
        let mut scope = ScopeTracker::new();
        assert_eq!(scope.current_scope_path(), "");

        scope.enter_namespace("App.Core");
        scope.enter_type("Foo");
        assert_eq!(scope.current_scope_path(), "App.Core.Foo");

        scope.exit_type();
        assert_eq!(scope.current_scope_path(), "App.Core");
        scope.exit_namespace();
        assert_eq!(scope.current_scope_path(), "");
    }

    #[test]
    fn test_nested_namespaces() {
        let mut scope = ScopeTracker::new();
        scope.enter_namespace("App");
        scope.enter_namespace("Core");
        scope.enter_type("Foo");
        assert_eq!(scope.current_scope_path(), "App.Core.Foo");

        scope.exit_type();
        scope.exit_namespace();
        scope.enter_type("Bar");
        assert_eq!(scope.current_scope_path(), "App.Bar");
    }

    #[test]
    fn test_innermost_type_wins_and_reverts() {
        let mut scope = ScopeTracker::new();
        scope.enter_namespace("App");
        scope.enter_type("Outer");
        scope.enter_type("Inner");
        assert_eq!(scope.current_scope_path(), "App.Inner");

        scope.exit_type();
        assert_eq!(scope.current_scope_path(), "App.Outer");
    }

    #[test]
    fn test_type_without_namespace() {
        let mut scope = ScopeTracker::new();
        scope.enter_type("Program");
        assert_eq!(scope.current_scope_path(), "Program");
    }

    #[test]
    fn test_exit_on_empty_is_noop() {
        let mut scope = ScopeTracker::new();
        scope.exit_type();
        scope.exit_namespace();
        assert_eq!(scope.current_scope_path(), "");
    }
}
