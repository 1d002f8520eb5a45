use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use termsweeper_core::*;

fn bench_generate(c: &mut Criterion) {
    let config = Difficulty::Hard.config();
    c.bench_function("generate hard", |b| {
        let mut seed = 0;
        b.iter(|| {
            seed += 1;
            black_box(Round::generate(config, seed))
        })
    });
}

fn bench_flood(c: &mut Criterion) {
    // a single mine in the corner makes one reveal flood the whole board
    let minefield = Minefield::with_mines(24, 24, &[(0, 0)]).expect("valid board");
    c.bench_function("flood 24x24", |b| {
        b.iter(|| {
            let mut minefield = minefield.clone();
            black_box(minefield.reveal((23, 23)))
        })
    });
}

criterion_group!(benches, bench_generate, bench_flood);
criterion_main!(benches);
