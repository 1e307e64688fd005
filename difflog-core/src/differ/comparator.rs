//! Entry points that run the full diff pipeline.

use std::time::Instant;

use rayon::prelude::*;
use tracing::debug;

use super::changes::ApiDiff;
use super::classifier::classify;
use super::structural::diff_values;
use super::tree::project_namespace;
use crate::error::Result;
use crate::members::{build_from_source, is_public, MemberPath, Namespace};

/// Diff two member trees.
pub fn diff_trees(old: &Namespace, new: &Namespace) -> Result<ApiDiff> {
    let start = Instant::now();

    let edits = diff_values(&project_namespace(old), &project_namespace(new));
    debug!(edits = edits.len(), "Structural diff complete");

    let classification = classify(&edits, old, new)?;
    let mut result = ApiDiff::new();
    for change in classification.changes {
        result.add_change(change);
    }
    result.unclassified = classification.unclassified;

    result.finalize(start.elapsed().as_secs_f64() * 1000.0);
    debug!(
        changes = result.changes.len(),
        unclassified = result.unclassified.len(),
        "Classified edits"
    );
    Ok(result)
}

/// Diff two Python sources using the default visibility.
pub fn diff_sources(old: &str, new: &str) -> Result<ApiDiff> {
    diff_sources_with(old, new, &is_public)
}

/// Diff two Python sources with a caller-supplied visibility filter.
///
/// The same filter is applied to both sides.
pub fn diff_sources_with(
    old: &str,
    new: &str,
    filter: &dyn Fn(&MemberPath, &str) -> bool,
) -> Result<ApiDiff> {
    let old_tree = build_from_source(old, filter)?;
    let new_tree = build_from_source(new, filter)?;
    diff_trees(&old_tree, &new_tree)
}

/// Old and new source of one module.
#[derive(Clone, Debug, Default)]
pub struct ModulePair {
    /// Display name, usually the file path.
    pub name: String,
    pub old: String,
    pub new: String,
}

impl ModulePair {
    pub fn new(name: impl Into<String>, old: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            old: old.into(),
            new: new.into(),
        }
    }
}

/// Diff many independent module pairs in parallel.
///
/// Results come back in input order. A syntax error in one pair does not
/// affect the others.
pub fn diff_modules_parallel(
    pairs: &[ModulePair],
    filter: &(dyn Fn(&MemberPath, &str) -> bool + Sync),
    num_threads: Option<usize>,
) -> Vec<Result<ApiDiff>> {
    // Configure thread pool if specified
    let pool = match num_threads {
        Some(n) if n > 0 => rayon::ThreadPoolBuilder::new().num_threads(n).build().ok(),
        _ => None,
    };

    let diff_fn = |pair: &ModulePair| -> Result<ApiDiff> {
        debug!(module = %pair.name, "Diffing module");
        diff_sources_with(&pair.old, &pair.new, filter)
    };

    match pool {
        Some(pool) => pool.install(|| pairs.par_iter().map(diff_fn).collect()),
        None => pairs.par_iter().map(diff_fn).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::differ::changes::{ApiChange, ChangeKind};
    use crate::members::{include_all, MemberKind};
    use crate::DiffError;

    fn diff(old: &str, new: &str) -> ApiDiff {
        diff_sources(old, new).unwrap()
    }

    fn root(name: &str, kind: ChangeKind) -> ApiChange {
        ApiChange::new(MemberPath::root(), name, kind)
    }

    const SAMPLE: &str = r#"
import os

VERSION: str = "1.0"
a, (b, *rest) = 1, (2, 3)

@decorator(arg=1)
class Service(Base, metaclass=Meta):
    timeout: float = 2.5
    _secret = 1

    def __init__(self, name: str, /, retries: int = 3, *args, flag=False, **kwargs) -> None:
        pass

    @property
    async def status(self) -> "Status":
        pass

    class Config:
        debug = False

def helper(x, y=None):
    inner = 1
"#;

    #[test]
    fn test_reflexivity() {
        for source in [SAMPLE, "", "x = 1\n", "class A:\n    pass\n"] {
            let result = diff(source, source);
            assert!(!result.has_changes(), "{:?}", result.changes);
            assert!(result.unclassified.is_empty());
        }
    }

    #[test]
    fn test_scenario_attribute_type_and_value() {
        let result = diff("x: int = 2\n", "x: float = 2.0\n");
        assert_eq!(
            result.changes,
            vec![
                root(
                    "x",
                    ChangeKind::ArgumentAnnotationModified {
                        argument: None,
                        from: "int".to_string(),
                        to: "float".to_string(),
                    }
                ),
                root(
                    "x",
                    ChangeKind::AssignmentValueModified {
                        from: "2".to_string(),
                        to: "2.0".to_string(),
                    }
                ),
            ]
        );
        assert_eq!(result.summary.modified, 2);
    }

    #[test]
    fn test_scenario_default_value() {
        let result = diff(
            "def bar(a: int, b: int = 1, *args, **kwargs) -> str:\n    pass\n",
            "def bar(a: int, b: int = 2, *args, **kwargs) -> str:\n    pass\n",
        );
        assert_eq!(
            result.changes,
            vec![root(
                "bar",
                ChangeKind::ArgumentDefaultModified {
                    argument: "b".to_string(),
                    from: "1".to_string(),
                    to: "2".to_string(),
                }
            )]
        );
    }

    #[test]
    fn test_scenario_decorator_reorder() {
        let result = diff(
            "@d1\n@d2\ndef f():\n    pass\n",
            "@d2\n@d1\ndef f():\n    pass\n",
        );
        assert_eq!(
            result.changes,
            vec![
                root(
                    "f",
                    ChangeKind::DecoratorModified {
                        kind: MemberKind::Function,
                        position: 0,
                        from: "d1".to_string(),
                        to: "d2".to_string(),
                    }
                ),
                root(
                    "f",
                    ChangeKind::DecoratorModified {
                        kind: MemberKind::Function,
                        position: 1,
                        from: "d2".to_string(),
                        to: "d1".to_string(),
                    }
                ),
            ]
        );
    }

    #[test]
    fn test_scenario_wholesale_replacement() {
        let result = diff(
            "x = 1\n\ndef bar(a):\n    pass\n",
            "y = 1\n\ndef foo(a):\n    pass\n",
        );
        assert_eq!(
            result.changes,
            vec![
                root(
                    "bar",
                    ChangeKind::MemberRemoved {
                        kind: MemberKind::Function
                    }
                ),
                root(
                    "foo",
                    ChangeKind::MemberAdded {
                        kind: MemberKind::Function
                    }
                ),
                root(
                    "x",
                    ChangeKind::MemberRemoved {
                        kind: MemberKind::Attribute
                    }
                ),
                root(
                    "y",
                    ChangeKind::MemberAdded {
                        kind: MemberKind::Attribute
                    }
                ),
            ]
        );
        assert_eq!(result.summary.modified, 0);
    }

    #[test]
    fn test_scenario_base_class_added() {
        let result = diff("class Foo:\n    pass\n", "class Foo(Base):\n    pass\n");
        assert_eq!(
            result.changes,
            vec![root(
                "Foo",
                ChangeKind::BaseClassAdded {
                    value: "Base".to_string(),
                    position: 0,
                }
            )]
        );
    }

    #[test]
    fn test_symmetry() {
        let cases = [
            (SAMPLE, ""),
            (SAMPLE, "VERSION = 2\nclass Service(Base):\n    def __init__(self, retries=3):\n        pass\n"),
            ("x: int = 2\n", "x: float = 2.0\n"),
            ("@d1\n@d2\ndef f(a, b=1):\n    pass\n", "@d2\ndef f(b, a, *c):\n    pass\n"),
            ("def f():\n    pass\nclass C(A, B):\n    pass\n", "f = 1\nclass C(B):\n    x = 1\n"),
        ];
        for (a, b) in cases {
            let forward = diff(a, b);
            let backward = diff(b, a);
            let mut inverted: Vec<_> = forward.changes.iter().map(ApiChange::inverse).collect();
            inverted.sort();
            assert_eq!(inverted, backward.changes);
            assert_eq!(forward.summary.added, backward.summary.removed);
        }
    }

    #[test]
    fn test_rename_is_remove_plus_add() {
        let result = diff(
            "def keep():\n    pass\ndef old_name(a):\n    pass\n",
            "def keep():\n    pass\ndef new_name(a):\n    pass\n",
        );
        let kinds: Vec<_> = result.changes.iter().map(|c| c.kind.as_str()).collect();
        assert_eq!(kinds, vec!["member_added", "member_removed"]);
        assert_eq!(result.changes[0].name, "new_name");
    }

    #[test]
    fn test_nested_member_changes() {
        let result = diff(SAMPLE, &SAMPLE.replace("debug = False", "debug = True"));
        assert_eq!(result.changes.len(), 1);
        assert_eq!(result.changes[0].full_name(), "Service.Config.debug");
    }

    #[test]
    fn test_private_members_ignored_by_default() {
        let old = "_hidden = 1\nshown = 1\n";
        let new = "_hidden = 2\nshown = 1\n";
        assert!(!diff(old, new).has_changes());

        let result = diff_sources_with(old, new, &include_all).unwrap();
        assert_eq!(result.changes.len(), 1);
    }

    #[test]
    fn test_diff_trees_ignores_line_moves() {
        let old = build_from_source("x = 1\n\ndef f():\n    pass\n", &is_public).unwrap();
        let new = build_from_source("def f():\n    pass\n\n\nx = 1\n", &is_public).unwrap();
        assert!(!diff_trees(&old, &new).unwrap().has_changes());
    }

    #[test]
    fn test_reformatting_is_not_a_change() {
        let old = r#"
SIZES = [1, 2]
TOTAL = 1 + 2

@route("/items", methods=["GET"])
def items(limit=10, fields=("id", "name")):
    pass
"#;
        let new = r#"
SIZES = [
    1,
    2,
]
TOTAL = (
    1 + 2
)

@route(
    "/items",
    methods=["GET"],
)
def items(
    limit=(10),
    fields=(
        "id",
        "name",
    ),
):
    pass
"#;
        let result = diff(old, new);
        assert!(!result.has_changes(), "{:?}", result.changes);
    }

    #[test]
    fn test_syntax_error_propagates() {
        let err = diff_sources("def ok():\n    pass\n", "def broken(:\n").unwrap_err();
        assert!(matches!(err, DiffError::Syntax { .. }));

        let err = diff_sources("def f(a=1, b):\n    pass\n", "def f(a, b=1):\n    pass\n")
            .unwrap_err();
        assert!(matches!(err, DiffError::Syntax { line: 1, .. }));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let pairs = vec![
            ModulePair::new("a.py", "x = 1\n", "x = 2\n"),
            ModulePair::new("b.py", "", "def f():\n    pass\n"),
            ModulePair::new("c.py", "def (:\n", "x = 1\n"),
        ];
        let results = diff_modules_parallel(&pairs, &is_public, Some(2));
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().changes.len(), 1);
        assert_eq!(
            results[1].as_ref().unwrap().changes,
            vec![root(
                "f",
                ChangeKind::MemberAdded {
                    kind: MemberKind::Function
                }
            )]
        );
        assert!(results[2].is_err());
    }
}
