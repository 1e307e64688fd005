//! Benchmarks for member tree building and diffing.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use difflog_core::{build_from_source, diff_modules_parallel, diff_sources, is_public, ModulePair};

const OLD: &str = r#"
import os
from pathlib import Path

VERSION: str = "1.0"

class MyClass(BaseClass):
    """A test class with various methods."""

    retries: int = 3

    def __init__(self, name: str, value: int = 0):
        self.name = name
        self.value = value

    def process(self, data: list[str]) -> dict[str, int]:
        result = {}
        for item in data:
            result[item] = len(item)
        return result

    @staticmethod
    def helper() -> None:
        pass

    @property
    def info(self) -> str:
        return f"{self.name}: {self.value}"

def main(argv=None, *, verbose=False):
    obj = MyClass("test", 42)
    print(obj.info)
"#;

const NEW: &str = r#"
import os
from pathlib import Path

VERSION: str = "2.0"

class MyClass(BaseClass, Mixin):
    """A test class with various methods."""

    retries: int = 5

    def __init__(self, name: str, /, value: int = 1):
        self.name = name
        self.value = value

    async def process(self, data: list[str], strict: bool = False) -> dict[str, int]:
        return {}

    @classmethod
    def helper(cls) -> None:
        pass

def main(argv=None, *, verbose=True, quiet=False):
    pass
"#;

fn bench_build_tree(c: &mut Criterion) {
    c.bench_function("build_member_tree", |b| {
        b.iter(|| build_from_source(black_box(OLD), &is_public))
    });
}

fn bench_diff_sources(c: &mut Criterion) {
    c.bench_function("diff_sources", |b| {
        b.iter(|| diff_sources(black_box(OLD), black_box(NEW)))
    });
}

fn bench_diff_many_modules(c: &mut Criterion) {
    let pairs: Vec<ModulePair> = (0..200)
        .map(|i| ModulePair::new(format!("module_{}.py", i), OLD, NEW))
        .collect();

    c.bench_function("diff_200_modules_parallel", |b| {
        b.iter(|| diff_modules_parallel(black_box(&pairs), &is_public, None))
    });
}

criterion_group!(benches, bench_build_tree, bench_diff_sources, bench_diff_many_modules);
criterion_main!(benches);
