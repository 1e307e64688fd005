//! Helper functions for tree-sitter AST navigation.

use tree_sitter::Node;

use crate::parser::syntax::Span;

/// Get the text content of a node.
pub fn get_node_text<'a>(node: &Node, source: &'a str) -> &'a str {
    let start = node.start_byte();
    let end = node.end_byte();
    if start < source.len() && end <= source.len() && start < end {
        &source[start..end]
    } else {
        ""
    }
}

/// Named children of a node, skipping comments.
pub fn named_children<'a>(node: &Node<'a>) -> Vec<Node<'a>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

/// Find the first child of a specific type.
pub fn find_child_by_type<'a>(node: &Node<'a>, type_name: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|child| child.kind() == type_name);
    found
}

/// Get line number (1-indexed) from a node.
pub fn get_start_line(node: &Node) -> u32 {
    node.start_position().row as u32 + 1
}

/// Get end line number (1-indexed) from a node.
pub fn get_end_line(node: &Node) -> u32 {
    node.end_position().row as u32 + 1
}

/// Line span of a node.
pub fn span_of(node: &Node) -> Span {
    Span {
        start_line: get_start_line(node),
        end_line: get_end_line(node),
    }
}

/// First ERROR or MISSING node in document order, if any.
pub fn first_error<'a>(node: &Node<'a>) -> Option<Node<'a>> {
    if node.is_error() || node.is_missing() {
        return Some(*node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children.iter().find_map(first_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_sitter::Parser;

    fn parse(source: &str) -> tree_sitter::Tree {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .unwrap();
        parser.parse(source, None).unwrap()
    }

    #[test]
    fn test_first_error_on_valid_source() {
        let tree = parse("x = 1\n");
        assert!(first_error(&tree.root_node()).is_none());
    }

    #[test]
    fn test_first_error_reports_line() {
        let tree = parse("x = 1\ndef broken(:\n    pass\n");
        let err = first_error(&tree.root_node()).unwrap();
        assert_eq!(get_start_line(&err), 2);
    }

    #[test]
    fn test_named_children_skip_comments() {
        let source = "# leading\nx = 1\n";
        let tree = parse(source);
        let children = named_children(&tree.root_node());
        assert_eq!(children.len(), 1);
        assert_eq!(get_node_text(&children[0], source), "x = 1");
    }
}
