//! Benchmark: read, write, and pattern derivation over a representative
//! message tree (fixed markers, free runs, alternatives, repetitions),
//! flat-wide and nested-deep variants.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vargram::{Memory, ProcessingToken, ReadingToken, Variable, WritingToken};

/// Wide tree: one aggregate over many leaf pairs.
fn wide_tree(pairs: usize) -> Variable {
    let mut children = Vec::with_capacity(pairs * 2);
    for i in 0..pairs {
        children.push(Variable::fixed(format!("tag{}", i), vec![i as u8, 0x2d]));
        children.push(Variable::bytes(format!("body{}", i), 4, 4));
    }
    Variable::agg("wide", children)
}

/// Deep tree: aggregates of alternatives of repetitions, several levels down.
fn deep_tree(depth: usize) -> Variable {
    let mut node = Variable::agg(
        "leafpair",
        vec![Variable::fixed("tag", *b"T"), Variable::bytes("body", 2, 2)],
    );
    for level in 0..depth {
        let alt = Variable::alt(
            format!("alt{}", level),
            vec![node.clone(), Variable::fixed("fallback", *b"FB")],
        );
        node = Variable::agg(
            format!("level{}", level),
            vec![
                Variable::fixed("mark", vec![level as u8]),
                Variable::repeat(format!("rep{}", level), alt, 1, 2),
            ],
        );
    }
    node
}

fn produce(tree: &Variable) -> Vec<u8> {
    let memory = Memory::shared();
    let mut writing = WritingToken::with_seed(memory, 0xfeed);
    tree.write(&mut writing);
    assert!(writing.is_ok());
    writing.into_value()
}

fn bench_write(c: &mut Criterion) {
    let wide = wide_tree(32);
    let deep = deep_tree(8);
    c.bench_function("write_wide", |bench| {
        bench.iter(|| {
            let mut token = WritingToken::with_seed(Memory::shared(), 0xfeed);
            wide.write(&mut token);
            black_box(token.into_value())
        })
    });
    c.bench_function("write_deep", |bench| {
        bench.iter(|| {
            let mut token = WritingToken::with_seed(Memory::shared(), 0xfeed);
            deep.write(&mut token);
            black_box(token.into_value())
        })
    });
}

fn bench_read(c: &mut Criterion) {
    let wide = wide_tree(32);
    let bytes = produce(&wide);
    c.bench_function("read_wide", |bench| {
        bench.iter(|| {
            let mut token = ReadingToken::new(black_box(&bytes), Memory::shared());
            wide.read(&mut token);
            assert!(token.is_ok());
            black_box(token.index())
        })
    });
}

fn bench_pattern(c: &mut Criterion) {
    let deep = deep_tree(8);
    c.bench_function("pattern_deep", |bench| {
        bench.iter(|| black_box(deep.build_pattern()))
    });
}

criterion_group!(benches, bench_write, bench_read, bench_pattern);
criterion_main!(benches);
