//! Change event types and result structures for API diffs.

use std::fmt;

use serde::Serialize;

use super::structural::ElementaryEdit;
use crate::members::{MemberKind, MemberPath};

/// Broad class of a change, used for summaries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeCategory {
    Added,
    Removed,
    Modified,
}

impl ChangeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeCategory::Added => "added",
            ChangeCategory::Removed => "removed",
            ChangeCategory::Modified => "modified",
        }
    }
}

/// A scalar property value carried by [`ChangeKind::GenericPropertyModified`].
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Int(i64),
    Bool(bool),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(text) => f.write_str(shown(text)),
            Scalar::Int(value) => write!(f, "{}", value),
            Scalar::Bool(value) => write!(f, "{}", value),
        }
    }
}

/// What changed about the member named by an [`ApiChange`].
///
/// Positions are 0-based indices into the decorator, base or positional
/// argument list. Text values are canonical source, empty meaning absent.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum ChangeKind {
    MemberAdded {
        kind: MemberKind,
    },
    MemberRemoved {
        kind: MemberKind,
    },
    MemberKindChanged {
        from: MemberKind,
        to: MemberKind,
    },
    BaseClassAdded {
        value: String,
        position: usize,
    },
    BaseClassRemoved {
        value: String,
        position: usize,
    },
    BaseClassModified {
        position: usize,
        from: String,
        to: String,
    },
    DecoratorAdded {
        kind: MemberKind,
        value: String,
        position: usize,
    },
    DecoratorRemoved {
        kind: MemberKind,
        value: String,
        position: usize,
    },
    DecoratorModified {
        kind: MemberKind,
        position: usize,
        from: String,
        to: String,
    },
    ArgumentDefaultModified {
        argument: String,
        from: String,
        to: String,
    },
    /// `argument` is `None` when the annotation belongs to an attribute.
    ArgumentAnnotationModified {
        argument: Option<String>,
        from: String,
        to: String,
    },
    ArgumentPositionModified {
        argument: String,
        from: usize,
        to: usize,
    },
    ReturnTypeModified {
        from: String,
        to: String,
    },
    AsyncnessModified {
        from: bool,
        to: bool,
    },
    AssignmentValueModified {
        from: String,
        to: String,
    },
    GenericPropertyModified {
        kind: MemberKind,
        property: String,
        from: Scalar,
        to: Scalar,
    },
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::MemberAdded { .. } => "member_added",
            ChangeKind::MemberRemoved { .. } => "member_removed",
            ChangeKind::MemberKindChanged { .. } => "member_kind_changed",
            ChangeKind::BaseClassAdded { .. } => "base_class_added",
            ChangeKind::BaseClassRemoved { .. } => "base_class_removed",
            ChangeKind::BaseClassModified { .. } => "base_class_modified",
            ChangeKind::DecoratorAdded { .. } => "decorator_added",
            ChangeKind::DecoratorRemoved { .. } => "decorator_removed",
            ChangeKind::DecoratorModified { .. } => "decorator_modified",
            ChangeKind::ArgumentDefaultModified { .. } => "argument_default_modified",
            ChangeKind::ArgumentAnnotationModified { .. } => "argument_annotation_modified",
            ChangeKind::ArgumentPositionModified { .. } => "argument_position_modified",
            ChangeKind::ReturnTypeModified { .. } => "return_type_modified",
            ChangeKind::AsyncnessModified { .. } => "asyncness_modified",
            ChangeKind::AssignmentValueModified { .. } => "assignment_value_modified",
            ChangeKind::GenericPropertyModified { .. } => "generic_property_modified",
        }
    }

    pub fn category(&self) -> ChangeCategory {
        match self {
            ChangeKind::MemberAdded { .. }
            | ChangeKind::BaseClassAdded { .. }
            | ChangeKind::DecoratorAdded { .. } => ChangeCategory::Added,
            ChangeKind::MemberRemoved { .. }
            | ChangeKind::BaseClassRemoved { .. }
            | ChangeKind::DecoratorRemoved { .. } => ChangeCategory::Removed,
            _ => ChangeCategory::Modified,
        }
    }

    /// The change seen when diffing in the opposite direction.
    pub fn inverse(&self) -> Self {
        match self.clone() {
            ChangeKind::MemberAdded { kind } => ChangeKind::MemberRemoved { kind },
            ChangeKind::MemberRemoved { kind } => ChangeKind::MemberAdded { kind },
            ChangeKind::MemberKindChanged { from, to } => {
                ChangeKind::MemberKindChanged { from: to, to: from }
            }
            ChangeKind::BaseClassAdded { value, position } => {
                ChangeKind::BaseClassRemoved { value, position }
            }
            ChangeKind::BaseClassRemoved { value, position } => {
                ChangeKind::BaseClassAdded { value, position }
            }
            ChangeKind::BaseClassModified { position, from, to } => ChangeKind::BaseClassModified {
                position,
                from: to,
                to: from,
            },
            ChangeKind::DecoratorAdded {
                kind,
                value,
                position,
            } => ChangeKind::DecoratorRemoved {
                kind,
                value,
                position,
            },
            ChangeKind::DecoratorRemoved {
                kind,
                value,
                position,
            } => ChangeKind::DecoratorAdded {
                kind,
                value,
                position,
            },
            ChangeKind::DecoratorModified {
                kind,
                position,
                from,
                to,
            } => ChangeKind::DecoratorModified {
                kind,
                position,
                from: to,
                to: from,
            },
            ChangeKind::ArgumentDefaultModified { argument, from, to } => {
                ChangeKind::ArgumentDefaultModified {
                    argument,
                    from: to,
                    to: from,
                }
            }
            ChangeKind::ArgumentAnnotationModified { argument, from, to } => {
                ChangeKind::ArgumentAnnotationModified {
                    argument,
                    from: to,
                    to: from,
                }
            }
            ChangeKind::ArgumentPositionModified { argument, from, to } => {
                ChangeKind::ArgumentPositionModified {
                    argument,
                    from: to,
                    to: from,
                }
            }
            ChangeKind::ReturnTypeModified { from, to } => {
                ChangeKind::ReturnTypeModified { from: to, to: from }
            }
            ChangeKind::AsyncnessModified { from, to } => {
                ChangeKind::AsyncnessModified { from: to, to: from }
            }
            ChangeKind::AssignmentValueModified { from, to } => {
                ChangeKind::AssignmentValueModified { from: to, to: from }
            }
            ChangeKind::GenericPropertyModified {
                kind,
                property,
                from,
                to,
            } => ChangeKind::GenericPropertyModified {
                kind,
                property,
                from: to,
                to: from,
            },
        }
    }
}

/// A single classified API change.
///
/// `path` is the owning namespace (or function, for arguments) and `name` the
/// member the change is about. Events order by `(path, name, kind)`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ApiChange {
    pub path: MemberPath,
    pub name: String,
    #[serde(flatten)]
    pub kind: ChangeKind,
}

impl ApiChange {
    pub fn new(path: MemberPath, name: impl Into<String>, kind: ChangeKind) -> Self {
        Self {
            path,
            name: name.into(),
            kind,
        }
    }

    /// Dotted name of the member, e.g. `Foo.bar`.
    pub fn full_name(&self) -> String {
        self.path.qualified(&self.name)
    }

    pub fn inverse(&self) -> Self {
        Self {
            path: self.path.clone(),
            name: self.name.clone(),
            kind: self.kind.inverse(),
        }
    }

    /// Whether existing callers or subclasses may break.
    pub fn is_breaking(&self) -> bool {
        matches!(
            self.kind,
            ChangeKind::MemberRemoved { .. }
                | ChangeKind::MemberKindChanged { .. }
                | ChangeKind::BaseClassRemoved { .. }
                | ChangeKind::ArgumentPositionModified { .. }
                | ChangeKind::AsyncnessModified { .. }
        )
    }
}

fn shown(text: &str) -> &str {
    if text.is_empty() {
        "(none)"
    } else {
        text
    }
}

impl fmt::Display for ApiChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.full_name();
        match &self.kind {
            ChangeKind::MemberAdded { kind } => write!(f, "Added {} `{}`", kind, name),
            ChangeKind::MemberRemoved { kind } => write!(f, "Removed {} `{}`", kind, name),
            ChangeKind::MemberKindChanged { from, to } => {
                write!(f, "Changed `{}` from {} to {}", name, from, to)
            }
            ChangeKind::BaseClassAdded { value, position } => write!(
                f,
                "Added base class `{}` to `{}` at position {}",
                value, name, position
            ),
            ChangeKind::BaseClassRemoved { value, position } => write!(
                f,
                "Removed base class `{}` from `{}` at position {}",
                value, name, position
            ),
            ChangeKind::BaseClassModified { position, from, to } => write!(
                f,
                "Changed base class of `{}` at position {} from `{}` to `{}`",
                name, position, from, to
            ),
            ChangeKind::DecoratorAdded {
                kind,
                value,
                position,
            } => write!(
                f,
                "Added decorator `@{}` to {} `{}` at position {}",
                value, kind, name, position
            ),
            ChangeKind::DecoratorRemoved {
                kind,
                value,
                position,
            } => write!(
                f,
                "Removed decorator `@{}` from {} `{}` at position {}",
                value, kind, name, position
            ),
            ChangeKind::DecoratorModified {
                kind,
                position,
                from,
                to,
            } => write!(
                f,
                "Changed decorator of {} `{}` at position {} from `@{}` to `@{}`",
                kind, name, position, from, to
            ),
            ChangeKind::ArgumentDefaultModified { argument, from, to } => write!(
                f,
                "Changed default of argument `{}` of `{}` from `{}` to `{}`",
                argument,
                name,
                shown(from),
                shown(to)
            ),
            ChangeKind::ArgumentAnnotationModified {
                argument: Some(argument),
                from,
                to,
            } => write!(
                f,
                "Changed annotation of argument `{}` of `{}` from `{}` to `{}`",
                argument,
                name,
                shown(from),
                shown(to)
            ),
            ChangeKind::ArgumentAnnotationModified {
                argument: None,
                from,
                to,
            } => write!(
                f,
                "Changed annotation of `{}` from `{}` to `{}`",
                name,
                shown(from),
                shown(to)
            ),
            ChangeKind::ArgumentPositionModified { argument, from, to } => write!(
                f,
                "Moved argument `{}` of `{}` from position {} to {}",
                argument, name, from, to
            ),
            ChangeKind::ReturnTypeModified { from, to } => write!(
                f,
                "Changed return type of `{}` from `{}` to `{}`",
                name,
                shown(from),
                shown(to)
            ),
            ChangeKind::AsyncnessModified { to, .. } => {
                if *to {
                    write!(f, "Made `{}` async", name)
                } else {
                    write!(f, "Made `{}` synchronous", name)
                }
            }
            ChangeKind::AssignmentValueModified { from, to } => write!(
                f,
                "Changed value of `{}` from `{}` to `{}`",
                name,
                shown(from),
                shown(to)
            ),
            ChangeKind::GenericPropertyModified {
                kind,
                property,
                from,
                to,
            } => write!(
                f,
                "Changed {} of {} `{}` from `{}` to `{}`",
                property, kind, name, from, to
            ),
        }
    }
}

/// Summary statistics for a diff.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    pub added: u32,
    pub removed: u32,
    pub modified: u32,
    pub breaking: u32,
}

impl DiffSummary {
    pub fn record(&mut self, change: &ApiChange) {
        match change.kind.category() {
            ChangeCategory::Added => self.added += 1,
            ChangeCategory::Removed => self.removed += 1,
            ChangeCategory::Modified => self.modified += 1,
        }
        if change.is_breaking() {
            self.breaking += 1;
        }
    }

    pub fn merge(&mut self, other: &DiffSummary) {
        self.added += other.added;
        self.removed += other.removed;
        self.modified += other.modified;
        self.breaking += other.breaking;
    }

    pub fn total(&self) -> u32 {
        self.added + self.removed + self.modified
    }

    /// Generate human-readable summary string.
    pub fn text(&self) -> String {
        let mut parts = Vec::new();
        if self.added > 0 {
            parts.push(format!("{} added", self.added));
        }
        if self.removed > 0 {
            parts.push(format!("{} removed", self.removed));
        }
        if self.modified > 0 {
            parts.push(format!("{} modified", self.modified));
        }

        if parts.is_empty() {
            return "No changes".to_string();
        }

        let mut text = parts.join(", ");
        if self.breaking > 0 {
            text.push_str(&format!(" ({} breaking)", self.breaking));
        }
        text
    }
}

/// Complete result of diffing two member trees.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ApiDiff {
    /// Classified changes, sorted.
    pub changes: Vec<ApiChange>,

    /// Edits that matched no known change shape.
    pub unclassified: Vec<ElementaryEdit>,

    pub summary: DiffSummary,

    /// Duration of the diff in milliseconds
    pub duration_ms: f64,
}

impl ApiDiff {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a change and update summary.
    pub fn add_change(&mut self, change: ApiChange) {
        self.summary.record(&change);
        self.changes.push(change);
    }

    /// Sort changes and record timing.
    pub fn finalize(&mut self, duration_ms: f64) {
        self.changes.sort();
        self.duration_ms = duration_ms;
    }

    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    pub fn has_breaking_changes(&self) -> bool {
        self.summary.breaking > 0
    }

    pub fn breaking_changes(&self) -> impl Iterator<Item = &ApiChange> {
        self.changes.iter().filter(|c| c.is_breaking())
    }

    /// Keep only the breaking changes, recomputing the summary.
    pub fn retain_breaking(&mut self) {
        self.changes.retain(ApiChange::is_breaking);
        self.summary = DiffSummary::default();
        for change in &self.changes {
            self.summary.record(change);
        }
    }
}
