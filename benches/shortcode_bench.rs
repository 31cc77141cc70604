//! Benchmarks for short code normalization and resolution.

use bbforum::board::{normalize, resolve_short_code, BoardStore, Category, Forum, MemoryStore};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");

    let short = "General Chat";
    let noisy = "   ___Mixed_Case-123 -- with !!! lots -- of  noise   ";
    let long = "Forum Title ".repeat(64);

    group.throughput(Throughput::Bytes(short.len() as u64));
    group.bench_function("short", |b| b.iter(|| normalize(black_box(short))));

    group.throughput(Throughput::Bytes(noisy.len() as u64));
    group.bench_function("noisy", |b| b.iter(|| normalize(black_box(noisy))));

    group.throughput(Throughput::Bytes(long.len() as u64));
    group.bench_function("long", |b| b.iter(|| normalize(black_box(&long))));

    group.finish();
}

/// A store where `taken` forums already hold `music_general`,
/// `music_general_1`, ... so resolution checks that many suffixes.
fn crowded_store(taken: usize) -> (MemoryStore, Category) {
    let store = MemoryStore::new();
    let gaming = Category::new("Gaming", None, 0).unwrap();
    let music = Category::new("Music", None, 0).unwrap();
    store.insert_category(&gaming).unwrap();
    store.insert_category(&music).unwrap();

    let mut codes = vec!["general".to_string(), "music_general".to_string()];
    codes.extend((1..taken).map(|i| format!("music_general_{}", i)));
    for code in codes {
        let mut forum = Forum::new(gaming.id, "General", None, 0).unwrap();
        forum.short_code = Some(code);
        store.insert_forum(&forum).unwrap();
    }
    (store, music)
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_short_code");

    for taken in [0usize, 1, 10, 100] {
        let (store, music) = if taken == 0 {
            let store = MemoryStore::new();
            let music = Category::new("Music", None, 0).unwrap();
            store.insert_category(&music).unwrap();
            (store, music)
        } else {
            crowded_store(taken)
        };

        group.bench_with_input(BenchmarkId::from_parameter(taken), &taken, |b, _| {
            b.iter(|| resolve_short_code(&store, black_box("General"), &music.id, None))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_normalize, bench_resolve);
criterion_main!(benches);
