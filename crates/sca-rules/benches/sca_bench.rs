// Criterion benchmarks for sca-rules.
//
// Uses a small inline rule file with contexts, categories, a group copy,
// an epenthesis and a constraint, so that compilation exercises every
// kind of transition the determinizer handles.
//
// Run:
//   cargo bench -p sca-rules

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use sca_rules::{Direction, compile};

const RULES: &str = "\
%suffix ʰ ː
V = a e i o u
S = p t k
Z = b d g
C = S Z m n s h
[aspiration-loss] pʰ > p
[voicing] S > Z / V _ V
[h-copy] h > V:1 / V:1 _
[final-loss] h > 0 / _ #
[epenthesis] 0 > e / S _ S
[syncope] e > 0 / V C _ C V ; sporadic
[no-triple] ! C C C
";

const WORDS: &[&str] = &[
    "pataka", "kepʰo", "ahat", "aptk", "mesenot", "uhuh", "sakta", "bodega", "tiktak",
    "aːkapa", "hemisoka", "ptpt",
];

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_compile(c: &mut Criterion) {
    c.bench_function("compile_rules", |b| {
        b.iter(|| compile(black_box(RULES), Direction::Forward))
    });
    c.bench_function("compile_rules_reverse", |b| {
        b.iter(|| compile(black_box(RULES), Direction::Reverse))
    });
}

fn bench_apply(c: &mut Criterion) {
    let (set, _) = compile(RULES, Direction::Forward).expect("bench rules compile");
    c.bench_function("apply_words", |b| {
        b.iter(|| {
            for word in WORDS {
                let _ = black_box(set.apply(black_box(word)));
            }
        })
    });
}

criterion_group!(benches, bench_compile, bench_apply);
criterion_main!(benches);
