//! Python source adapter using tree-sitter.
//!
//! Lowers the tree-sitter concrete tree into the [`syntax`](super::syntax)
//! model. Expressions are rendered to canonical text here, so the rest of the
//! crate never touches tree-sitter types.

use std::borrow::Cow;
use std::collections::HashSet;

use tree_sitter::{Node, Parser};

use super::helpers::{
    find_child_by_type, first_error, get_node_text, get_start_line, named_children, span_of,
};
use super::syntax::{
    AnnAssign, Arg, Arguments, Assign, ClassDef, Expr, FunctionDef, Module, Stmt, Target,
};
use super::SourceParser;
use crate::error::{DiffError, Result};

/// tree-sitter backed Python parser.
#[derive(Clone, Copy, Debug, Default)]
pub struct PythonParser;

impl SourceParser for PythonParser {
    fn parse(&self, source: &str) -> Result<Module> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| DiffError::Language(format!("Failed to set Python language: {}", e)))?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| DiffError::Language("Failed to parse Python source".to_string()))?;
        let root = tree.root_node();

        if let Some(bad) = first_error(&root) {
            return Err(DiffError::Syntax {
                line: get_start_line(&bad),
                column: bad.start_position().column as u32 + 1,
                message: describe_error(&bad, source),
            });
        }

        Ok(Module {
            body: lower_body(&root, source)?,
        })
    }
}

fn describe_error(node: &Node, source: &str) -> String {
    if node.is_missing() {
        return format!("missing `{}`", node.kind());
    }
    let text = get_node_text(node, source);
    let first_line = text.lines().next().unwrap_or_default();
    if first_line.is_empty() {
        "invalid syntax".to_string()
    } else {
        format!("invalid syntax near `{}`", first_line.trim())
    }
}

/// Lower the direct children of a module or class body.
fn lower_body(node: &Node, source: &str) -> Result<Vec<Stmt>> {
    let mut body = Vec::new();

    for child in named_children(node) {
        match child.kind() {
            "class_definition" => {
                body.push(Stmt::ClassDef(lower_class(&child, source, Vec::new())?));
            }
            "function_definition" => {
                body.push(Stmt::FunctionDef(lower_function(&child, source, Vec::new())?));
            }
            "decorated_definition" => body.extend(lower_decorated(&child, source)?),
            "expression_statement" => {
                for inner in named_children(&child) {
                    if inner.kind() == "assignment" {
                        body.extend(lower_assignment(&inner, source));
                    }
                }
            }
            _ => {}
        }
    }

    Ok(body)
}

fn field_text(node: &Node, field: &str, source: &str) -> String {
    node.child_by_field_name(field)
        .map(|n| get_node_text(&n, source).to_string())
        .unwrap_or_default()
}

fn expr(node: &Node, source: &str) -> Expr {
    Expr::new(render_expr(node, source))
}

/// Extract decorated class or function.
fn lower_decorated(node: &Node, source: &str) -> Result<Option<Stmt>> {
    let mut decorators = Vec::new();

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "decorator" {
            // The `@` is anonymous; the decorated expression is the only named child.
            if let Some(expression) = named_children(&child).first() {
                decorators.push(expr(expression, source));
            }
        }
    }

    let Some(definition) = node.child_by_field_name("definition") else {
        return Ok(None);
    };
    let stmt = match definition.kind() {
        "class_definition" => Stmt::ClassDef(lower_class(&definition, source, decorators)?),
        "function_definition" => {
            Stmt::FunctionDef(lower_function(&definition, source, decorators)?)
        }
        _ => return Ok(None),
    };
    Ok(Some(stmt))
}

fn lower_class(node: &Node, source: &str, decorators: Vec<Expr>) -> Result<ClassDef> {
    // Keyword arguments (`metaclass=...`) and `**kwargs` are not bases.
    let bases = node
        .child_by_field_name("superclasses")
        .map(|args| {
            named_children(&args)
                .iter()
                .filter(|arg| !matches!(arg.kind(), "keyword_argument" | "dictionary_splat"))
                .map(|arg| expr(arg, source))
                .collect()
        })
        .unwrap_or_default();

    let body = match node.child_by_field_name("body") {
        Some(block) => lower_body(&block, source)?,
        None => Vec::new(),
    };

    Ok(ClassDef {
        name: field_text(node, "name", source),
        bases,
        decorators,
        body,
        span: span_of(node),
    })
}

fn lower_function(node: &Node, source: &str, decorators: Vec<Expr>) -> Result<FunctionDef> {
    let arguments = match node.child_by_field_name("parameters") {
        Some(params) => lower_parameters(&params, source)?,
        None => Arguments::default(),
    };

    Ok(FunctionDef {
        name: field_text(node, "name", source),
        is_async: find_child_by_type(node, "async").is_some(),
        arguments,
        returns: node
            .child_by_field_name("return_type")
            .map(|ty| expr(&ty, source)),
        decorators,
        span: span_of(node),
    })
}

fn invalid_parameter(param: &Node, message: String) -> DiffError {
    DiffError::Syntax {
        line: get_start_line(param),
        column: param.start_position().column as u32 + 1,
        message,
    }
}

/// Name bound by a `*args` / `**kwargs` pattern.
fn splat_name(node: &Node, source: &str) -> String {
    named_children(node)
        .first()
        .map(|inner| get_node_text(inner, source).to_string())
        .unwrap_or_default()
}

/// Group parameters by calling convention.
///
/// tree-sitter attaches defaults to each parameter; they are collected into the
/// right-aligned `defaults` list and the index-aligned `kw_defaults` list.
///
/// The grammar accepts parameter lists Python rejects: a positional parameter
/// without a default after one with a default, and repeated names. Both are
/// reported as syntax errors.
fn lower_parameters(node: &Node, source: &str) -> Result<Arguments> {
    let mut arguments = Arguments::default();
    let mut keyword_only = false;
    let mut seen_default = false;
    let mut names: HashSet<String> = HashSet::new();

    for param in named_children(node) {
        let (arg, default) = match param.kind() {
            "identifier" => (Arg::new(get_node_text(&param, source), None), None),
            "typed_parameter" => {
                let annotation = param.child_by_field_name("type").map(|t| expr(&t, source));
                let Some(inner) = named_children(&param).into_iter().next() else {
                    continue;
                };
                match inner.kind() {
                    "list_splat_pattern" => {
                        let name = splat_name(&inner, source);
                        check_unique(&mut names, &name, &param)?;
                        arguments.vararg = Some(Arg::new(name, annotation));
                        keyword_only = true;
                        continue;
                    }
                    "dictionary_splat_pattern" => {
                        let name = splat_name(&inner, source);
                        check_unique(&mut names, &name, &param)?;
                        arguments.kwarg = Some(Arg::new(name, annotation));
                        continue;
                    }
                    _ => (Arg::new(get_node_text(&inner, source), annotation), None),
                }
            }
            "default_parameter" => (
                Arg::new(field_text(&param, "name", source), None),
                param.child_by_field_name("value").map(|v| expr(&v, source)),
            ),
            "typed_default_parameter" => (
                Arg::new(
                    field_text(&param, "name", source),
                    param.child_by_field_name("type").map(|t| expr(&t, source)),
                ),
                param.child_by_field_name("value").map(|v| expr(&v, source)),
            ),
            "list_splat_pattern" => {
                let name = splat_name(&param, source);
                check_unique(&mut names, &name, &param)?;
                arguments.vararg = Some(Arg::new(name, None));
                keyword_only = true;
                continue;
            }
            "dictionary_splat_pattern" => {
                let name = splat_name(&param, source);
                check_unique(&mut names, &name, &param)?;
                arguments.kwarg = Some(Arg::new(name, None));
                continue;
            }
            "keyword_separator" => {
                keyword_only = true;
                continue;
            }
            "positional_separator" => {
                // Everything declared so far is positional-only.
                let promoted: Vec<Arg> = arguments.args.drain(..).collect();
                arguments.posonly.extend(promoted);
                continue;
            }
            _ => continue,
        };

        check_unique(&mut names, &arg.name, &param)?;

        if keyword_only {
            arguments.kwonly.push(arg);
            arguments.kw_defaults.push(default);
        } else {
            match default {
                Some(default) => {
                    seen_default = true;
                    arguments.defaults.push(default);
                }
                None if seen_default => {
                    return Err(invalid_parameter(
                        &param,
                        format!("parameter `{}` without a default follows a default", arg.name),
                    ));
                }
                None => {}
            }
            arguments.args.push(arg);
        }
    }

    Ok(arguments)
}

fn check_unique(names: &mut HashSet<String>, name: &str, param: &Node) -> Result<()> {
    if names.insert(name.to_string()) {
        Ok(())
    } else {
        Err(invalid_parameter(
            param,
            format!("duplicate parameter `{}`", name),
        ))
    }
}

fn lower_assignment(node: &Node, source: &str) -> Option<Stmt> {
    let left = node.child_by_field_name("left")?;

    if let Some(annotation) = node.child_by_field_name("type") {
        return Some(Stmt::AnnAssign(AnnAssign {
            target: lower_target(&left, source),
            annotation: expr(&annotation, source),
            value: node
                .child_by_field_name("right")
                .map(|value| expr(&value, source)),
            span: span_of(node),
        }));
    }

    // `a = b = 1` nests the second assignment as the right-hand side.
    let mut targets = vec![lower_target(&left, source)];
    let mut value = node.child_by_field_name("right")?;
    while value.kind() == "assignment" && value.child_by_field_name("type").is_none() {
        let (Some(next_left), Some(next_right)) = (
            value.child_by_field_name("left"),
            value.child_by_field_name("right"),
        ) else {
            break;
        };
        targets.push(lower_target(&next_left, source));
        value = next_right;
    }

    Some(Stmt::Assign(Assign {
        targets,
        value: expr(&value, source),
        span: span_of(node),
    }))
}

fn lower_target(node: &Node, source: &str) -> Target {
    match node.kind() {
        "identifier" => Target::Name(get_node_text(node, source).to_string()),
        "pattern_list" | "tuple_pattern" | "list_pattern" | "expression_list" | "tuple"
        | "list" => Target::Tuple(
            named_children(node)
                .iter()
                .map(|item| lower_target(item, source))
                .collect(),
        ),
        "list_splat_pattern" | "list_splat" => match named_children(node).first() {
            Some(inner) => Target::Starred(Box::new(lower_target(inner, source))),
            None => Target::Other(expr(node, source)),
        },
        "parenthesized_expression" => match named_children(node).first() {
            Some(inner) => lower_target(inner, source),
            None => Target::Other(expr(node, source)),
        },
        _ => Target::Other(expr(node, source)),
    }
}

// ============================================================================
// Canonical expression rendering
// ============================================================================

struct Token<'a> {
    text: Cow<'a, str>,
    kind: &'static str,
    parent: &'static str,
    grandparent: &'static str,
}

/// Render an expression subtree to canonical text.
///
/// Layout, comments and line continuations are dropped and the tokens are
/// re-joined with fixed spacing rules, so `f( a ,b )` and `f(a, b)` render the
/// same. Trailing commas and parentheses that do not change meaning are
/// removed as well, so a black-style exploded call renders like its one-line
/// form.
pub fn render_expr(node: &Node, source: &str) -> String {
    let mut node = *node;
    loop {
        let inner = match node.kind() {
            "type" => named_children(&node).into_iter().next(),
            _ => parenthesized_inner(&node),
        };
        match inner {
            Some(inner) => node = inner,
            None => break,
        }
    }

    let mut tokens = Vec::new();
    collect_tokens(&node, source, &mut tokens);

    let mut out = String::new();
    let mut prev: Option<&Token> = None;
    for token in &tokens {
        if let Some(prev) = prev {
            if needs_space(prev, token) {
                out.push(' ');
            }
        }
        out.push_str(&token.text);
        prev = Some(token);
    }
    out
}

fn collect_tokens<'a>(node: &Node, source: &'a str, out: &mut Vec<Token<'a>>) {
    match node.kind() {
        "comment" | "line_continuation" => return,
        "string" => {
            out.push(make_token(node, normalize_string(get_node_text(node, source))));
            return;
        }
        _ => {}
    }

    if node.child_count() == 0 {
        let text = get_node_text(node, source);
        if !text.is_empty() {
            out.push(make_token(node, Cow::Borrowed(text)));
        }
        return;
    }

    if is_element_position(node) {
        if let Some(inner) = parenthesized_inner(node) {
            collect_tokens(&inner, source, out);
            return;
        }
    }

    let mut cursor = node.walk();
    let children: Vec<Node> = node
        .children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect();
    let drop_trailing_comma = trailing_comma_optional(node);

    for (i, child) in children.iter().enumerate() {
        if child.kind() == "," && drop_trailing_comma {
            let closes = children
                .get(i + 1)
                .map_or(true, |next| matches!(next.kind(), ")" | "]" | "}"));
            if closes {
                continue;
            }
        }
        collect_tokens(child, source, out);
    }
}

/// The wrapped expression of `( expr )`, unless the parentheses are needed.
fn parenthesized_inner<'a>(node: &Node<'a>) -> Option<Node<'a>> {
    if node.kind() != "parenthesized_expression" {
        return None;
    }
    match named_children(node).as_slice() {
        [inner] if !matches!(inner.kind(), "yield" | "named_expression") => Some(*inner),
        _ => None,
    }
}

/// Whether `node` sits in a comma-separated slot where precedence cannot
/// change its meaning.
fn is_element_position(node: &Node) -> bool {
    node.parent().is_some_and(|parent| match parent.kind() {
        "argument_list" | "list" | "set" | "tuple" | "expression_list" => true,
        "keyword_argument" => parent
            .child_by_field_name("value")
            .is_some_and(|value| value.id() == node.id()),
        _ => false,
    })
}

/// A trailing comma is noise unless it is what makes a one-element tuple.
fn trailing_comma_optional(node: &Node) -> bool {
    let elements = named_children(node).len();
    match node.kind() {
        "argument_list" | "list" | "set" | "dictionary" => true,
        "tuple" | "expression_list" => elements > 1,
        _ => false,
    }
}

fn make_token<'a>(node: &Node, text: Cow<'a, str>) -> Token<'a> {
    let parent = node.parent();
    Token {
        text,
        kind: node.kind(),
        parent: parent.map(|p| p.kind()).unwrap_or_default(),
        grandparent: parent
            .and_then(|p| p.parent())
            .map(|g| g.kind())
            .unwrap_or_default(),
    }
}

/// `"abc"` becomes `'abc'` when that needs no escaping.
fn normalize_string(text: &str) -> Cow<'_, str> {
    if text.len() >= 2 && text.starts_with('"') && !text.starts_with("\"\"\"") && text.ends_with('"')
    {
        let inner = &text[1..text.len() - 1];
        if !inner.contains(['\'', '"', '\\']) {
            return Cow::Owned(format!("'{}'", inner));
        }
    }
    Cow::Borrowed(text)
}

fn needs_space(prev: &Token, next: &Token) -> bool {
    if matches!(prev.kind, "(" | "[" | "{") || matches!(next.kind, ")" | "]" | "}" | "," | ":") {
        return false;
    }
    if prev.kind == "." || next.kind == "." {
        return false;
    }
    if prev.kind == ":" && prev.parent == "slice" {
        return false;
    }
    if (prev.kind == "=" && prev.parent == "keyword_argument")
        || (next.kind == "=" && next.parent == "keyword_argument")
    {
        return false;
    }
    if matches!(prev.kind, "*" | "**")
        && matches!(
            prev.parent,
            "list_splat"
                | "dictionary_splat"
                | "list_splat_pattern"
                | "dictionary_splat_pattern"
                | "parenthesized_list_splat"
                | "splat_type"
        )
    {
        return false;
    }
    if matches!(prev.kind, "-" | "+" | "~") && prev.parent == "unary_operator" {
        return false;
    }

    match next.kind {
        "(" => !(next.parent == "argument_list"
            || (next.parent == "generator_expression" && next.grandparent == "call")),
        "[" => !matches!(next.parent, "subscript" | "type_parameter" | "generic_type"),
        _ => true,
    }
}
