//! Generic value tree that member trees are projected into before diffing.
//!
//! The projection keeps only semantic fields. Paths and line ranges are
//! dropped, so two members that differ only in position compare equal.

use indexmap::IndexMap;
use serde::Serialize;

use crate::members::{
    Argument, ArgumentKind, AttributeMember, FunctionMember, Member, Namespace, NamespaceKind,
};

/// A node in the projected tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// A record whose shape is fixed by `tag`.
    Object {
        tag: String,
        fields: IndexMap<String, Value>,
    },
    /// A keyed collection such as a namespace's members.
    Map(IndexMap<String, Value>),
    List(Vec<Value>),
    Text(String),
    Int(i64),
    Bool(bool),
}

impl Value {
    pub fn tag(&self) -> Option<&str> {
        match self {
            Value::Object { tag, .. } => Some(tag),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Short name of the variant, used in diagnostics.
    pub fn type_name(&self) -> &str {
        match self {
            Value::Object { tag, .. } => tag,
            Value::Map(_) => "map",
            Value::List(_) => "list",
            Value::Text(_) => "text",
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
        }
    }
}

struct ObjectBuilder {
    tag: String,
    fields: IndexMap<String, Value>,
}

impl ObjectBuilder {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            fields: IndexMap::new(),
        }
    }

    fn field(mut self, name: &str, value: Value) -> Self {
        self.fields.insert(name.to_string(), value);
        self
    }

    fn build(self) -> Value {
        Value::Object {
            tag: self.tag,
            fields: self.fields,
        }
    }
}

fn texts(items: &[String]) -> Value {
    Value::List(items.iter().cloned().map(Value::Text).collect())
}

pub fn project_namespace(namespace: &Namespace) -> Value {
    let members = namespace
        .members
        .iter()
        .map(|(name, member)| (name.clone(), project_member(member)))
        .collect();

    let object = ObjectBuilder::new(namespace.kind.member_kind().as_str())
        .field("members", Value::Map(members))
        .field("decorators", texts(&namespace.decorators));

    match namespace.kind {
        NamespaceKind::Class => object.field("bases", texts(&namespace.bases)),
        NamespaceKind::Module => object,
    }
    .build()
}

pub fn project_member(member: &Member) -> Value {
    match member {
        Member::Namespace(ns) => project_namespace(ns),
        Member::Function(func) => project_function(func),
        Member::Attribute(attr) => project_attribute(attr),
    }
}

fn project_function(func: &FunctionMember) -> Value {
    let arguments = func
        .arguments
        .iter()
        .map(|(name, arg)| (name.clone(), project_argument(arg)))
        .collect();

    ObjectBuilder::new("function")
        .field("arguments", Value::Map(arguments))
        .field("returns", Value::Text(func.returns.clone()))
        .field("is_async", Value::Bool(func.is_async))
        .field("decorators", texts(&func.decorators))
        .build()
}

fn project_attribute(attr: &AttributeMember) -> Value {
    ObjectBuilder::new("attribute")
        .field("annotation", Value::Text(attr.annotation.clone()))
        .field("value", Value::Text(attr.value.clone()))
        .build()
}

fn project_argument(arg: &Argument) -> Value {
    let object = ObjectBuilder::new(arg.member_kind().as_str())
        .field("annotation", Value::Text(arg.annotation.clone()));

    match &arg.kind {
        ArgumentKind::PositionalOnly { position, default }
        | ArgumentKind::PositionalOrKeyword { position, default } => object
            .field("default", Value::Text(default.clone()))
            .field("position", Value::Int(*position as i64)),
        ArgumentKind::KeywordOnly { default } => {
            object.field("default", Value::Text(default.clone()))
        }
        ArgumentKind::VarPositional | ArgumentKind::VarKeyword => object,
    }
    .build()
}
