//! API member model.
//!
//! A member tree is the addressable public surface of one module: namespaces
//! (the module itself and its classes), functions with their arguments, and
//! attributes. Every member and argument carries a [`MemberPath`] that is
//! unique within its tree.
//!
//! Trees are built once by [`build_module`] / [`build_from_source`] and never
//! mutated afterwards.

mod builder;

use std::fmt;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

pub use builder::{build_from_source, build_module, build_module_with};

/// Ordered names from the tree root to a member or argument.
///
/// The module itself has the empty path.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberPath(Vec<String>);

impl MemberPath {
    /// Path of the module namespace.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Path of a direct child.
    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(name.to_string());
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Last segment, `None` for the root.
    pub fn name(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Path of the owning namespace or function, `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        self.0
            .split_last()
            .map(|(_, rest)| Self(rest.to_vec()))
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Dotted name with `name` appended, e.g. `Foo.bar`.
    pub fn qualified(&self, name: &str) -> String {
        if self.0.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self, name)
        }
    }
}

impl fmt::Display for MemberPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl Serialize for MemberPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// 1-indexed, inclusive source lines of a declaration. Diagnostic only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LineRange {
    pub start: u32,
    pub end: u32,
}

/// What kind of thing a member (or argument) is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum MemberKind {
    #[serde(rename = "module")]
    Module,
    #[serde(rename = "class")]
    Class,
    #[serde(rename = "function")]
    Function,
    #[serde(rename = "attribute")]
    Attribute,
    #[serde(rename = "positional-only argument")]
    PositionalOnlyArgument,
    #[serde(rename = "positional or keyword argument")]
    PositionalOrKeywordArgument,
    #[serde(rename = "var positional argument")]
    VarPositionalArgument,
    #[serde(rename = "keyword-only argument")]
    KeywordOnlyArgument,
    #[serde(rename = "var keyword argument")]
    VarKeywordArgument,
}

impl MemberKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberKind::Module => "module",
            MemberKind::Class => "class",
            MemberKind::Function => "function",
            MemberKind::Attribute => "attribute",
            MemberKind::PositionalOnlyArgument => "positional-only argument",
            MemberKind::PositionalOrKeywordArgument => "positional or keyword argument",
            MemberKind::VarPositionalArgument => "var positional argument",
            MemberKind::KeywordOnlyArgument => "keyword-only argument",
            MemberKind::VarKeywordArgument => "var keyword argument",
        }
    }

    /// Inverse of [`MemberKind::as_str`].
    pub fn parse(tag: &str) -> Option<Self> {
        Some(match tag {
            "module" => MemberKind::Module,
            "class" => MemberKind::Class,
            "function" => MemberKind::Function,
            "attribute" => MemberKind::Attribute,
            "positional-only argument" => MemberKind::PositionalOnlyArgument,
            "positional or keyword argument" => MemberKind::PositionalOrKeywordArgument,
            "var positional argument" => MemberKind::VarPositionalArgument,
            "keyword-only argument" => MemberKind::KeywordOnlyArgument,
            "var keyword argument" => MemberKind::VarKeywordArgument,
            _ => return None,
        })
    }

    pub fn is_argument(&self) -> bool {
        matches!(
            self,
            MemberKind::PositionalOnlyArgument
                | MemberKind::PositionalOrKeywordArgument
                | MemberKind::VarPositionalArgument
                | MemberKind::KeywordOnlyArgument
                | MemberKind::VarKeywordArgument
        )
    }
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A module-level or class-level declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Member {
    Namespace(Namespace),
    Function(FunctionMember),
    Attribute(AttributeMember),
}

impl Member {
    pub fn path(&self) -> &MemberPath {
        match self {
            Member::Namespace(ns) => &ns.path,
            Member::Function(func) => &func.path,
            Member::Attribute(attr) => &attr.path,
        }
    }

    pub fn lines(&self) -> Option<LineRange> {
        match self {
            Member::Namespace(ns) => ns.lines,
            Member::Function(func) => func.lines,
            Member::Attribute(attr) => attr.lines,
        }
    }

    pub fn kind(&self) -> MemberKind {
        match self {
            Member::Namespace(ns) => ns.kind.member_kind(),
            Member::Function(_) => MemberKind::Function,
            Member::Attribute(_) => MemberKind::Attribute,
        }
    }

    pub fn as_namespace(&self) -> Option<&Namespace> {
        match self {
            Member::Namespace(ns) => Some(ns),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionMember> {
        match self {
            Member::Function(func) => Some(func),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NamespaceKind {
    Module,
    Class,
}

impl NamespaceKind {
    pub fn member_kind(&self) -> MemberKind {
        match self {
            NamespaceKind::Module => MemberKind::Module,
            NamespaceKind::Class => MemberKind::Class,
        }
    }
}

/// A module or class.
///
/// Nested classes, functions and attributes share one name mapping, so a later
/// declaration replaces an earlier one of any kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Namespace {
    pub path: MemberPath,
    pub lines: Option<LineRange>,
    pub kind: NamespaceKind,
    pub members: IndexMap<String, Member>,
    /// Canonical decorator expressions in source order. Empty for modules.
    pub decorators: Vec<String>,
    /// Canonical base class expressions in source order. Empty for modules.
    pub bases: Vec<String>,
}

impl Namespace {
    /// An empty module namespace.
    pub fn module() -> Self {
        Self {
            path: MemberPath::root(),
            lines: None,
            kind: NamespaceKind::Module,
            members: IndexMap::new(),
            decorators: Vec::new(),
            bases: Vec::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Member> {
        self.members.get(name)
    }

    /// Number of members in this namespace and all nested namespaces.
    pub fn member_count(&self) -> usize {
        self.members
            .values()
            .map(|member| match member {
                Member::Namespace(ns) => 1 + ns.member_count(),
                _ => 1,
            })
            .sum()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionMember {
    pub path: MemberPath,
    pub lines: Option<LineRange>,
    /// Arguments in declaration order.
    pub arguments: IndexMap<String, Argument>,
    /// Canonical return annotation, empty when absent.
    pub returns: String,
    pub is_async: bool,
    pub decorators: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeMember {
    pub path: MemberPath,
    pub lines: Option<LineRange>,
    /// Canonical annotation, empty when absent.
    pub annotation: String,
    /// Canonical assigned value, empty when absent.
    pub value: String,
}

/// A function parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Argument {
    pub path: MemberPath,
    /// Canonical annotation, empty when absent.
    pub annotation: String,
    pub kind: ArgumentKind,
}

/// Calling convention of an argument.
///
/// `position` is dense over positional-only followed by positional-or-keyword
/// arguments. Defaults are canonical text, empty when absent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArgumentKind {
    PositionalOnly { position: usize, default: String },
    PositionalOrKeyword { position: usize, default: String },
    VarPositional,
    KeywordOnly { default: String },
    VarKeyword,
}

impl Argument {
    pub fn member_kind(&self) -> MemberKind {
        match self.kind {
            ArgumentKind::PositionalOnly { .. } => MemberKind::PositionalOnlyArgument,
            ArgumentKind::PositionalOrKeyword { .. } => MemberKind::PositionalOrKeywordArgument,
            ArgumentKind::VarPositional => MemberKind::VarPositionalArgument,
            ArgumentKind::KeywordOnly { .. } => MemberKind::KeywordOnlyArgument,
            ArgumentKind::VarKeyword => MemberKind::VarKeywordArgument,
        }
    }

    pub fn position(&self) -> Option<usize> {
        match self.kind {
            ArgumentKind::PositionalOnly { position, .. }
            | ArgumentKind::PositionalOrKeyword { position, .. } => Some(position),
            _ => None,
        }
    }

    /// Default value text; `None` for `*args` / `**kwargs`.
    pub fn default(&self) -> Option<&str> {
        match &self.kind {
            ArgumentKind::PositionalOnly { default, .. }
            | ArgumentKind::PositionalOrKeyword { default, .. }
            | ArgumentKind::KeywordOnly { default } => Some(default),
            _ => None,
        }
    }
}

/// Default visibility: drop `_private` and `__mangled` names, keep `__dunder__`.
pub fn is_public(_path: &MemberPath, name: &str) -> bool {
    !(name.starts_with('_') && (name == "_" || !name.ends_with('_')))
}

/// Visibility that keeps every name.
pub fn include_all(_path: &MemberPath, _name: &str) -> bool {
    true
}
