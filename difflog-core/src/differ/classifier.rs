//! Turns elementary edits back into API change events.
//!
//! Edit paths interleave member names with field names, e.g.
//! `members/Foo/members/bar/arguments/b/default`. Resolution walks
//! `members/<name>` and `arguments/<name>` pairs through the member tree; the
//! node reached last owns the edit and the remaining segments name the field
//! that changed.

use tracing::error;

use super::changes::{ApiChange, ChangeKind, Scalar};
use super::structural::{format_path, EditAction, ElementaryEdit, PathSegment};
use super::tree::Value;
use crate::error::{DiffError, Result};
use crate::members::{Argument, Member, MemberKind, MemberPath, Namespace};

/// Classified events plus the edits nothing matched.
#[derive(Debug, Default)]
pub struct Classification {
    pub changes: Vec<ApiChange>,
    pub unclassified: Vec<ElementaryEdit>,
}

/// A node reachable by an edit path.
#[derive(Clone, Copy, Debug)]
enum Owner<'a> {
    Namespace(&'a Namespace),
    Member(&'a Member),
    Argument(&'a Argument),
}

impl<'a> Owner<'a> {
    fn path(&self) -> &'a MemberPath {
        match self {
            Owner::Namespace(ns) => &ns.path,
            Owner::Member(member) => member.path(),
            Owner::Argument(arg) => &arg.path,
        }
    }

    fn kind(&self) -> MemberKind {
        match self {
            Owner::Namespace(ns) => ns.kind.member_kind(),
            Owner::Member(member) => member.kind(),
            Owner::Argument(arg) => arg.member_kind(),
        }
    }

    /// `(owning path, name)` an event about this node is filed under.
    fn address(&self) -> (MemberPath, String) {
        let path = self.path();
        (
            path.parent().unwrap_or_default(),
            path.name().unwrap_or_default().to_string(),
        )
    }
}

struct Resolved<'a, 'p> {
    owner: Owner<'a>,
    fields: &'p [PathSegment],
}

/// Walk `path` from `root`, stopping at the first segment that is not a
/// member or argument name.
fn resolve<'a, 'p>(root: &'a Namespace, path: &'p [PathSegment]) -> Result<Resolved<'a, 'p>> {
    let mut owner = Owner::Namespace(root);
    let mut index = 0;

    loop {
        let (Some(PathSegment::Key(field)), Some(PathSegment::Key(name))) =
            (path.get(index), path.get(index + 1))
        else {
            break;
        };

        let next = match (owner, field.as_str()) {
            (Owner::Namespace(ns), "members") => ns.get(name).map(|member| match member {
                Member::Namespace(child) => Owner::Namespace(child),
                other => Owner::Member(other),
            }),
            (Owner::Member(Member::Function(func)), "arguments") => {
                func.arguments.get(name).map(Owner::Argument)
            }
            _ => break,
        };

        owner = next.ok_or_else(|| DiffError::PathResolution {
            path: format_path(&path[..index + 2]),
        })?;
        index += 2;
    }

    Ok(Resolved {
        owner,
        fields: &path[index..],
    })
}

fn scalar(value: Option<&Value>) -> Option<Scalar> {
    match value? {
        Value::Text(text) => Some(Scalar::Text(text.clone())),
        Value::Int(n) => Some(Scalar::Int(*n)),
        Value::Bool(b) => Some(Scalar::Bool(*b)),
        _ => None,
    }
}

fn text(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_text).map(str::to_string)
}

fn kind_of(value: Option<&Value>) -> Option<MemberKind> {
    value.and_then(Value::tag).and_then(MemberKind::parse)
}

/// Classify every edit.
///
/// Additions resolve against `new`, everything else against `old`. An edit
/// that resolves but has no known shape is logged and returned in
/// [`Classification::unclassified`]; a path that does not resolve at all is
/// an internal error.
pub fn classify(edits: &[ElementaryEdit], old: &Namespace, new: &Namespace) -> Result<Classification> {
    let mut result = Classification::default();

    for edit in edits {
        let root = match edit.action {
            EditAction::ItemAdded | EditAction::ListItemAdded => new,
            _ => old,
        };
        let resolved = resolve(root, &edit.path)?;

        match classify_edit(edit, &resolved) {
            Some(changes) => result.changes.extend(changes),
            None => {
                error!(
                    action = ?edit.action,
                    path = %format_path(&edit.path),
                    "Unclassified edit"
                );
                result.unclassified.push(edit.clone());
            }
        }
    }

    Ok(result)
}

fn classify_edit(edit: &ElementaryEdit, resolved: &Resolved) -> Option<Vec<ApiChange>> {
    let owner = resolved.owner;
    let (path, name) = owner.address();

    match (edit.action, resolved.fields) {
        (EditAction::ItemAdded, []) => Some(vec![ApiChange::new(
            path,
            name,
            ChangeKind::MemberAdded { kind: owner.kind() },
        )]),
        (EditAction::ItemRemoved, []) => Some(vec![ApiChange::new(
            path,
            name,
            ChangeKind::MemberRemoved { kind: owner.kind() },
        )]),
        (EditAction::TypeChanged, []) => Some(vec![ApiChange::new(
            path,
            name,
            ChangeKind::MemberKindChanged {
                from: kind_of(edit.old.as_ref())?,
                to: kind_of(edit.new.as_ref())?,
            },
        )]),
        (EditAction::CollectionReplaced, [PathSegment::Key(field)])
            if matches!(field.as_str(), "members" | "arguments") =>
        {
            expand_replacement(edit, owner.path())
        }
        (action, [PathSegment::Key(field), PathSegment::Index(position)]) => {
            classify_list_edit(action, field, *position, edit, owner, path, name)
        }
        (EditAction::ValueChanged, [PathSegment::Key(field)]) => {
            classify_property(field, edit, owner, path, name).map(|change| vec![change])
        }
        _ => None,
    }
}

/// One removal per old entry and one addition per new entry.
fn expand_replacement(edit: &ElementaryEdit, owner: &MemberPath) -> Option<Vec<ApiChange>> {
    let old = edit.old.as_ref()?.as_map()?;
    let new = edit.new.as_ref()?.as_map()?;

    let mut changes = Vec::with_capacity(old.len() + new.len());
    for (name, value) in old {
        let kind = kind_of(Some(value))?;
        changes.push(ApiChange::new(
            owner.clone(),
            name.clone(),
            ChangeKind::MemberRemoved { kind },
        ));
    }
    for (name, value) in new {
        let kind = kind_of(Some(value))?;
        changes.push(ApiChange::new(
            owner.clone(),
            name.clone(),
            ChangeKind::MemberAdded { kind },
        ));
    }
    Some(changes)
}

fn classify_list_edit(
    action: EditAction,
    field: &str,
    position: usize,
    edit: &ElementaryEdit,
    owner: Owner,
    path: MemberPath,
    name: String,
) -> Option<Vec<ApiChange>> {
    let old = edit.old.as_ref();
    let new = edit.new.as_ref();

    let kind = match (field, action) {
        ("bases", EditAction::ListItemAdded) => ChangeKind::BaseClassAdded {
            value: text(new)?,
            position,
        },
        ("bases", EditAction::ListItemRemoved) => ChangeKind::BaseClassRemoved {
            value: text(old)?,
            position,
        },
        ("bases", EditAction::ValueChanged) => ChangeKind::BaseClassModified {
            position,
            from: text(old)?,
            to: text(new)?,
        },
        ("decorators", EditAction::ListItemAdded) => ChangeKind::DecoratorAdded {
            kind: owner.kind(),
            value: text(new)?,
            position,
        },
        ("decorators", EditAction::ListItemRemoved) => ChangeKind::DecoratorRemoved {
            kind: owner.kind(),
            value: text(old)?,
            position,
        },
        ("decorators", EditAction::ValueChanged) => ChangeKind::DecoratorModified {
            kind: owner.kind(),
            position,
            from: text(old)?,
            to: text(new)?,
        },
        _ => return None,
    };

    Some(vec![ApiChange::new(path, name, kind)])
}

fn classify_property(
    field: &str,
    edit: &ElementaryEdit,
    owner: Owner,
    path: MemberPath,
    name: String,
) -> Option<ApiChange> {
    let old = edit.old.as_ref();
    let new = edit.new.as_ref();

    // Argument properties are filed under the owning function.
    if let Owner::Argument(arg) = owner {
        let function = arg.path.parent()?;
        let (function_path, function_name) = (
            function.parent().unwrap_or_default(),
            function.name()?.to_string(),
        );
        let kind = match (field, old?, new?) {
            ("default", Value::Text(from), Value::Text(to)) => ChangeKind::ArgumentDefaultModified {
                argument: name,
                from: from.clone(),
                to: to.clone(),
            },
            ("annotation", Value::Text(from), Value::Text(to)) => {
                ChangeKind::ArgumentAnnotationModified {
                    argument: Some(name),
                    from: from.clone(),
                    to: to.clone(),
                }
            }
            ("position", Value::Int(from), Value::Int(to)) => {
                ChangeKind::ArgumentPositionModified {
                    argument: name,
                    from: usize::try_from(*from).ok()?,
                    to: usize::try_from(*to).ok()?,
                }
            }
            _ => ChangeKind::GenericPropertyModified {
                kind: owner.kind(),
                property: field.to_string(),
                from: scalar(old)?,
                to: scalar(new)?,
            },
        };
        return Some(ApiChange::new(function_path, function_name, kind));
    }

    let kind = match (owner.kind(), field, old?, new?) {
        (MemberKind::Function, "returns", Value::Text(from), Value::Text(to)) => {
            ChangeKind::ReturnTypeModified {
                from: from.clone(),
                to: to.clone(),
            }
        }
        (MemberKind::Function, "is_async", Value::Bool(from), Value::Bool(to)) => {
            ChangeKind::AsyncnessModified {
                from: *from,
                to: *to,
            }
        }
        (MemberKind::Attribute, "value", Value::Text(from), Value::Text(to)) => {
            ChangeKind::AssignmentValueModified {
                from: from.clone(),
                to: to.clone(),
            }
        }
        (MemberKind::Attribute, "annotation", Value::Text(from), Value::Text(to)) => {
            ChangeKind::ArgumentAnnotationModified {
                argument: None,
                from: from.clone(),
                to: to.clone(),
            }
        }
        (kind, _, _, _) => ChangeKind::GenericPropertyModified {
            kind,
            property: field.to_string(),
            from: scalar(old)?,
            to: scalar(new)?,
        },
    };

    Some(ApiChange::new(path, name, kind))
}
