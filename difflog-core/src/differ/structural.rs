//! Generic structural diff over projected value trees.
//!
//! The walker knows nothing about API members. It compares two [`Value`]
//! trees and reports path-addressed elementary edits; the classifier gives
//! those edits meaning.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use super::tree::Value;

/// What happened at an edit's path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditAction {
    /// A key present only in the new map or object.
    ItemAdded,
    /// A key present only in the old map or object.
    ItemRemoved,
    /// Both sides exist but are different kinds of value.
    TypeChanged,
    /// Both sides are scalars of the same kind with different values.
    ValueChanged,
    /// An index present only in the new list.
    ListItemAdded,
    /// An index present only in the old list.
    ListItemRemoved,
    /// Two non-empty maps with no keys in common.
    CollectionReplaced,
}

impl EditAction {
    /// The action seen when diffing in the opposite direction.
    pub fn inverse(self) -> Self {
        match self {
            EditAction::ItemAdded => EditAction::ItemRemoved,
            EditAction::ItemRemoved => EditAction::ItemAdded,
            EditAction::ListItemAdded => EditAction::ListItemRemoved,
            EditAction::ListItemRemoved => EditAction::ListItemAdded,
            other => other,
        }
    }
}

/// One step into a value tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl PathSegment {
    pub fn key(&self) -> Option<&str> {
        match self {
            PathSegment::Key(key) => Some(key),
            PathSegment::Index(_) => None,
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => f.write_str(key),
            PathSegment::Index(index) => write!(f, "{}", index),
        }
    }
}

/// Render a path with `/` separators, e.g. `members/Foo/bases/0`.
pub fn format_path(path: &[PathSegment]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("/")
}

/// One atomic difference between two value trees.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ElementaryEdit {
    pub action: EditAction,
    pub path: Vec<PathSegment>,
    /// Value on the old side; `None` for additions.
    pub old: Option<Value>,
    /// Value on the new side; `None` for removals.
    pub new: Option<Value>,
}

impl ElementaryEdit {
    /// The same edit as seen from the other direction.
    pub fn inverse(&self) -> Self {
        Self {
            action: self.action.inverse(),
            path: self.path.clone(),
            old: self.new.clone(),
            new: self.old.clone(),
        }
    }
}

impl fmt::Display for ElementaryEdit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} at {}", self.action, format_path(&self.path))
    }
}

/// Compare two value trees.
///
/// Lists are compared index by index, so a reorder shows up as value changes
/// at each moved index.
pub fn diff_values(old: &Value, new: &Value) -> Vec<ElementaryEdit> {
    let mut edits = Vec::new();
    let mut path = Vec::new();
    walk(old, new, &mut path, &mut edits);
    edits
}

fn push(
    out: &mut Vec<ElementaryEdit>,
    action: EditAction,
    path: &[PathSegment],
    old: Option<&Value>,
    new: Option<&Value>,
) {
    out.push(ElementaryEdit {
        action,
        path: path.to_vec(),
        old: old.cloned(),
        new: new.cloned(),
    });
}

fn walk(old: &Value, new: &Value, path: &mut Vec<PathSegment>, out: &mut Vec<ElementaryEdit>) {
    if old == new {
        return;
    }

    match (old, new) {
        (
            Value::Object {
                tag: old_tag,
                fields: old_fields,
            },
            Value::Object {
                tag: new_tag,
                fields: new_fields,
            },
        ) if old_tag == new_tag => walk_keyed(old_fields, new_fields, path, out),
        (Value::Map(old_map), Value::Map(new_map)) => {
            let disjoint = !old_map.is_empty()
                && !new_map.is_empty()
                && old_map.keys().all(|key| !new_map.contains_key(key));
            if disjoint {
                push(out, EditAction::CollectionReplaced, path, Some(old), Some(new));
            } else {
                walk_keyed(old_map, new_map, path, out);
            }
        }
        (Value::List(old_items), Value::List(new_items)) => {
            for (index, (old_item, new_item)) in old_items.iter().zip(new_items).enumerate() {
                path.push(PathSegment::Index(index));
                walk(old_item, new_item, path, out);
                path.pop();
            }
            for (index, item) in old_items.iter().enumerate().skip(new_items.len()) {
                path.push(PathSegment::Index(index));
                push(out, EditAction::ListItemRemoved, path, Some(item), None);
                path.pop();
            }
            for (index, item) in new_items.iter().enumerate().skip(old_items.len()) {
                path.push(PathSegment::Index(index));
                push(out, EditAction::ListItemAdded, path, None, Some(item));
                path.pop();
            }
        }
        (Value::Text(_), Value::Text(_))
        | (Value::Int(_), Value::Int(_))
        | (Value::Bool(_), Value::Bool(_)) => {
            push(out, EditAction::ValueChanged, path, Some(old), Some(new));
        }
        _ => push(out, EditAction::TypeChanged, path, Some(old), Some(new)),
    }
}

fn walk_keyed(
    old: &IndexMap<String, Value>,
    new: &IndexMap<String, Value>,
    path: &mut Vec<PathSegment>,
    out: &mut Vec<ElementaryEdit>,
) {
    for (key, old_value) in old {
        path.push(PathSegment::Key(key.clone()));
        match new.get(key) {
            Some(new_value) => walk(old_value, new_value, path, out),
            None => push(out, EditAction::ItemRemoved, path, Some(old_value), None),
        }
        path.pop();
    }
    for (key, new_value) in new {
        if !old.contains_key(key) {
            path.push(PathSegment::Key(key.clone()));
            push(out, EditAction::ItemAdded, path, None, Some(new_value));
            path.pop();
        }
    }
}
