use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use leaderboard::simulation::generate_with_ties;
use leaderboard::RankedStore;
use rand::rngs::StdRng;
use rand::SeedableRng;

const POPULATION: usize = 10_000;

fn seeded_store() -> RankedStore {
    let store = RankedStore::new();
    store.bulk_insert(generate_with_ties(POPULATION, &mut StdRng::seed_from_u64(17)));
    store.refresh();
    store
}

fn criterion_benchmark(c: &mut Criterion) {
    let store = seeded_store();
    let names: Vec<String> = (0..1024).filter_map(|i| store.pick(i * 7)).map(|p| p.name).collect();

    c.bench_function("bulk_insert_10k", |b| {
        b.iter_batched(
            || generate_with_ties(POPULATION, &mut StdRng::seed_from_u64(3)),
            |players| black_box(RankedStore::new().bulk_insert(players)),
            BatchSize::LargeInput,
        )
    });

    c.bench_function("update_score", |b| {
        let mut i = 0usize;
        b.iter(|| {
            i = i.wrapping_add(1);
            let name = &names[i % names.len()];
            black_box(store.update_score(name, 100 + (i % 4900) as u32))
        })
    });

    c.bench_function("page_fresh", |b| {
        store.refresh();
        b.iter(|| black_box(store.page(50, 0)))
    });

    c.bench_function("page_after_write", |b| {
        let mut i = 0usize;
        b.iter(|| {
            i = i.wrapping_add(1);
            store.update_score(&names[i % names.len()], 100 + (i % 4900) as u32);
            black_box(store.page(50, 0))
        })
    });

    c.bench_function("search_prefix", |b| {
        store.refresh();
        b.iter(|| black_box(store.search("ra", 50)))
    });

    c.bench_function("search_substring", |b| {
        store.refresh();
        b.iter(|| black_box(store.search("sharma", 50)))
    });

    c.bench_function("rank_of", |b| {
        store.refresh();
        let mut i = 0usize;
        b.iter(|| {
            i = i.wrapping_add(1);
            black_box(store.rank_of(&names[i % names.len()]))
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
