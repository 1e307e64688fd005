//! Parser-independent syntax model consumed by the member builder.
//!
//! An adapter lowers its concrete tree into these types. Only the node kinds
//! that can declare API members are represented; everything else at namespace
//! scope is dropped during lowering.

/// 1-indexed, inclusive line span of a statement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    pub start_line: u32,
    pub end_line: u32,
}

/// An expression subtree, carried as its canonical source rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expr {
    source: String,
}

impl Expr {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Canonical source text of the expression.
    pub fn render(&self) -> &str {
        &self.source
    }
}

/// A parsed module.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Module {
    pub body: Vec<Stmt>,
}

/// A namespace-level statement that can declare members.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Stmt {
    ClassDef(ClassDef),
    FunctionDef(FunctionDef),
    Assign(Assign),
    AnnAssign(AnnAssign),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassDef {
    pub name: String,
    pub bases: Vec<Expr>,
    pub decorators: Vec<Expr>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionDef {
    pub name: String,
    pub is_async: bool,
    pub arguments: Arguments,
    pub returns: Option<Expr>,
    pub decorators: Vec<Expr>,
    pub span: Span,
}

/// A single parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Arg {
    pub name: String,
    pub annotation: Option<Expr>,
}

impl Arg {
    pub fn new(name: impl Into<String>, annotation: Option<Expr>) -> Self {
        Self {
            name: name.into(),
            annotation,
        }
    }
}

/// Parameters grouped by calling convention.
///
/// `defaults` is right-aligned against `posonly` followed by `args`.
/// `kw_defaults` is index-aligned with `kwonly`, `None` meaning no default.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Arguments {
    pub posonly: Vec<Arg>,
    pub args: Vec<Arg>,
    pub defaults: Vec<Expr>,
    pub vararg: Option<Arg>,
    pub kwonly: Vec<Arg>,
    pub kw_defaults: Vec<Option<Expr>>,
    pub kwarg: Option<Arg>,
}

/// Left-hand side of an assignment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    Name(String),
    /// `a, b` / `(a, b)` / `[a, b]`
    Tuple(Vec<Target>),
    /// `*rest` inside a tuple target
    Starred(Box<Target>),
    /// Attribute or subscript targets such as `obj.attr` or `table[0]`.
    Other(Expr),
}

impl Target {
    /// Names bound by this target, in source order.
    ///
    /// Attribute and subscript targets are named by their canonical text.
    pub fn names(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names(&self, out: &mut Vec<String>) {
        match self {
            Target::Name(name) => out.push(name.clone()),
            Target::Tuple(items) => items.iter().for_each(|t| t.collect_names(out)),
            Target::Starred(inner) => inner.collect_names(out),
            Target::Other(expr) => out.push(expr.render().to_string()),
        }
    }
}

/// `a = 1`, `a = b = 1`, `a, b = 1, 2`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assign {
    pub targets: Vec<Target>,
    pub value: Expr,
    pub span: Span,
}

/// `a: int` or `a: int = 1`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnAssign {
    pub target: Target,
    pub annotation: Expr,
    pub value: Option<Expr>,
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_names_flatten_nested_tuples() {
        let target = Target::Tuple(vec![
            Target::Name("a".to_string()),
            Target::Tuple(vec![
                Target::Name("b".to_string()),
                Target::Starred(Box::new(Target::Name("rest".to_string()))),
            ]),
            Target::Other(Expr::new("obj.attr")),
        ]);

        assert_eq!(target.names(), vec!["a", "b", "rest", "obj.attr"]);
    }
}
