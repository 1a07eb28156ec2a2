use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use team_timers::color::{color_for, name_hash};

fn benchmark_color_for(c: &mut Criterion) {
    let names = ["Pizza", "Standup", "Deploy window", "Coffee ☕", ""];
    let long_name = "Quarterly planning retrospective ".repeat(32);

    let mut group = c.benchmark_group("color_assignment");

    group.bench_function("short_names", |b| {
        b.iter(|| {
            for name in names {
                black_box(color_for(black_box(name)));
            }
        })
    });

    group.bench_function("long_name_hash", |b| {
        b.iter(|| name_hash(black_box(&long_name)))
    });

    group.finish();
}

criterion_group!(benches, benchmark_color_for);
criterion_main!(benches);
