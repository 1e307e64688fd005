//! Builds member trees from the syntax model.

use indexmap::IndexMap;
use tracing::debug;

use super::{
    is_public, Argument, ArgumentKind, AttributeMember, FunctionMember, LineRange, Member,
    MemberPath, Namespace, NamespaceKind,
};
use crate::error::Result;
use crate::parser::syntax::{Arguments, ClassDef, Expr, FunctionDef, Module, Span, Stmt};
use crate::parser::{PythonParser, SourceParser};

/// Build the member tree of a module using the default visibility.
pub fn build_module(module: &Module) -> Namespace {
    build_module_with(module, &is_public)
}

/// Build the member tree of a module.
///
/// `filter` receives the path of the enclosing namespace and the candidate
/// name; members it rejects are left out together with everything nested
/// under them. Arguments are never filtered.
pub fn build_module_with(module: &Module, filter: &dyn Fn(&MemberPath, &str) -> bool) -> Namespace {
    let mut namespace = Namespace::module();
    populate(&mut namespace, &module.body, filter);
    debug!(members = namespace.member_count(), "Built module member tree");
    namespace
}

/// Parse Python source and build its member tree.
pub fn build_from_source(
    source: &str,
    filter: &dyn Fn(&MemberPath, &str) -> bool,
) -> Result<Namespace> {
    let module = PythonParser.parse(source)?;
    Ok(build_module_with(&module, filter))
}

fn lines(span: Span) -> Option<LineRange> {
    Some(LineRange {
        start: span.start_line,
        end: span.end_line,
    })
}

fn render_all(exprs: &[Expr]) -> Vec<String> {
    exprs.iter().map(|e| e.render().to_string()).collect()
}

fn render_opt(expr: Option<&Expr>) -> String {
    expr.map(|e| e.render().to_string()).unwrap_or_default()
}

/// Insert the members declared by `body` into `namespace`.
///
/// Rebinding a name replaces the earlier member in place.
fn populate(namespace: &mut Namespace, body: &[Stmt], filter: &dyn Fn(&MemberPath, &str) -> bool) {
    for stmt in body {
        match stmt {
            Stmt::ClassDef(class) => {
                if filter(&namespace.path, &class.name) {
                    let child = build_class(class, namespace.path.child(&class.name), filter);
                    namespace
                        .members
                        .insert(class.name.clone(), Member::Namespace(child));
                }
            }
            Stmt::FunctionDef(func) => {
                if filter(&namespace.path, &func.name) {
                    let child = build_function(func, namespace.path.child(&func.name));
                    namespace
                        .members
                        .insert(func.name.clone(), Member::Function(child));
                }
            }
            Stmt::Assign(assign) => {
                let value = assign.value.render();
                for name in assign.targets.iter().flat_map(|t| t.names()) {
                    add_attribute(namespace, name, "", value, assign.span, filter);
                }
            }
            Stmt::AnnAssign(assign) => {
                let value = render_opt(assign.value.as_ref());
                for name in assign.target.names() {
                    add_attribute(
                        namespace,
                        name,
                        assign.annotation.render(),
                        &value,
                        assign.span,
                        filter,
                    );
                }
            }
        }
    }
}

fn add_attribute(
    namespace: &mut Namespace,
    name: String,
    annotation: &str,
    value: &str,
    span: Span,
    filter: &dyn Fn(&MemberPath, &str) -> bool,
) {
    if !filter(&namespace.path, &name) {
        return;
    }
    let attribute = AttributeMember {
        path: namespace.path.child(&name),
        lines: lines(span),
        annotation: annotation.to_string(),
        value: value.to_string(),
    };
    namespace.members.insert(name, Member::Attribute(attribute));
}

fn build_class(
    class: &ClassDef,
    path: MemberPath,
    filter: &dyn Fn(&MemberPath, &str) -> bool,
) -> Namespace {
    let mut namespace = Namespace {
        path,
        lines: lines(class.span),
        kind: NamespaceKind::Class,
        members: IndexMap::new(),
        decorators: render_all(&class.decorators),
        bases: render_all(&class.bases),
    };
    populate(&mut namespace, &class.body, filter);
    namespace
}

fn build_function(func: &FunctionDef, path: MemberPath) -> FunctionMember {
    FunctionMember {
        arguments: build_arguments(&path, &func.arguments),
        path,
        lines: lines(func.span),
        returns: render_opt(func.returns.as_ref()),
        is_async: func.is_async,
        decorators: render_all(&func.decorators),
    }
}

/// Flatten a parameter list into named arguments in declaration order.
fn build_arguments(function: &MemberPath, args: &Arguments) -> IndexMap<String, Argument> {
    let mut arguments = IndexMap::new();
    let mut add = |name: &str, annotation: Option<&Expr>, kind: ArgumentKind| {
        arguments.insert(
            name.to_string(),
            Argument {
                path: function.child(name),
                annotation: render_opt(annotation),
                kind,
            },
        );
    };

    // Defaults are right-aligned over positional-only + positional-or-keyword.
    let positional_count = args.posonly.len() + args.args.len();
    let padding = positional_count.saturating_sub(args.defaults.len());

    for (position, arg) in args.posonly.iter().chain(&args.args).enumerate() {
        let default = position
            .checked_sub(padding)
            .and_then(|i| args.defaults.get(i));
        let default = render_opt(default);
        let kind = if position < args.posonly.len() {
            ArgumentKind::PositionalOnly { position, default }
        } else {
            ArgumentKind::PositionalOrKeyword { position, default }
        };
        add(&arg.name, arg.annotation.as_ref(), kind);
    }

    if let Some(vararg) = &args.vararg {
        add(&vararg.name, vararg.annotation.as_ref(), ArgumentKind::VarPositional);
    }

    for (i, arg) in args.kwonly.iter().enumerate() {
        let default = args.kw_defaults.get(i).and_then(Option::as_ref);
        add(
            &arg.name,
            arg.annotation.as_ref(),
            ArgumentKind::KeywordOnly {
                default: render_opt(default),
            },
        );
    }

    if let Some(kwarg) = &args.kwarg {
        add(&kwarg.name, kwarg.annotation.as_ref(), ArgumentKind::VarKeyword);
    }

    arguments
}
