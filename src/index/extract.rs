//! Type declaration extraction
//!
//! Walks the raw tree-sitter tree (no lowering) and returns the qualified name
//! of every type declared in a file.
//!
//! @module index/extract

use tree_sitter::{Node, Tree};

fn is_indexed_type(kind: &str) -> bool {
    matches!(
        kind,
        "class_declaration"
            | "struct_declaration"
            | "interface_declaration"
            | "record_declaration"
            | "record_struct_declaration"
            | "enum_declaration"
            | "delegate_declaration"
    )
}

/// Qualified names (`Namespace.Outer.Inner`) in document order
pub fn extract_types(tree: &Tree, source: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut prefix = Vec::new();
    walk(tree.root_node(), source, &mut prefix, &mut names);
    names
}

fn walk(node: Node<'_>, source: &str, prefix: &mut Vec<String>, names: &mut Vec<String>) {
    // `namespace X;` applies to every following sibling
    let mut file_scoped = 0;

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        let kind = child.kind();
        match kind {
            "namespace_declaration" => {
                prefix.push(name_of(child, source));
                walk(child, source, prefix, names);
                prefix.pop();
            }
            "file_scoped_namespace_declaration" => {
                prefix.push(name_of(child, source));
                file_scoped += 1;
                walk(child, source, prefix, names);
            }
            _ if is_indexed_type(kind) => {
                let name = name_of(child, source);
                if !name.is_empty() {
                    names.push(qualify(prefix, &name));
                }
                prefix.push(name);
                walk(child, source, prefix, names);
                prefix.pop();
            }
            _ if child.child_count() > 0 => walk(child, source, prefix, names),
            _ => {}
        }
    }

    for _ in 0..file_scoped {
        prefix.pop();
    }
}

fn name_of(node: Node<'_>, source: &str) -> String {
    node.child_by_field_name("name")
        .and_then(|name| name.utf8_text(source.as_bytes()).ok())
        .map(|text| text.split_whitespace().collect())
        .unwrap_or_default()
}

fn qualify(prefix: &[String], name: &str) -> String {
    prefix
        .iter()
        .map(String::as_str)
        .filter(|part| !part.is_empty())
        .chain(std::iter::once(name))
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{Language, SourceParser};
    use std::path::Path;

    fn types_of(source: &str) -> Vec<String> {
        let mut parser = SourceParser::new(Language::CSharp).unwrap();
        let tree = parser.parse_tree(source, Path::new("Test.cs")).unwrap();
        extract_types(&tree, source)
    }

    #[test]
    fn test_block_namespace_and_nesting() {
        let names = types_of(
            "namespace App.Core\n{\n    public class Foo\n    {\n        private struct Inner { }\n        enum Mode { A, B }\n    }\n    interface IBar { }\n}\n",
        );
        assert_eq!(
            names,
            vec![
                "App.Core.Foo",
                "App.Core.Foo.Inner",
                "App.Core.Foo.Mode",
                "App.Core.IBar"
            ]
        );
    }

    #[test]
    fn test_file_scoped_namespace() {
        let names = types_of("namespace App;\n\npublic record Point(int X, int Y);\npublic delegate void Handler();\n");
        assert_eq!(names, vec!["App.Point", "App.Handler"]);
    }

    #[test]
    fn test_global_namespace_and_generics() {
        let names = types_of("class Box<T> { }\nnamespace A { namespace B { class C { } } }\n");
        assert_eq!(names, vec!["Box", "A.B.C"]);
    }
}
