use brain_core::search::{rank, Query};
use brain_core::tokenizer::meaningful_tokens;
use brain_core::Memory;
use criterion::{criterion_group, criterion_main, Criterion};

const BODIES: &[&str] = &[
    "Covers machine learning basics and linear models for the reading group.",
    "Sourdough starter notes: hydration at 75 percent, fed twice daily.",
    "Gardening log: tomatoes staked, basil pinched back, peppers slow.",
    "Meeting notes about the quarterly planning and hiring pipeline.",
    "Bike maintenance checklist, chain wear and brake pad thickness.",
];

fn corpus(n: usize) -> Vec<Memory> {
    (0..n)
        .map(|i| Memory {
            id: format!("m{i}"),
            user_id: "bench".into(),
            title: format!("note {i}"),
            full_text: BODIES[i % BODIES.len()].into(),
            created_at: "2024-01-01T00:00:00Z".into(),
        })
        .collect()
}

fn bench_tokenize(c: &mut Criterion) {
    let text = BODIES.join(" ");
    c.bench_function("meaningful_tokens", |b| b.iter(|| meaningful_tokens(&text)));
}

fn bench_rank(c: &mut Criterion) {
    let memories = corpus(200);
    c.bench_function("rank_200_memories", |b| {
        b.iter(|| {
            let query = Query::parse("machine learning basics");
            rank(&query, &memories)
        })
    });
}

criterion_group!(benches, bench_tokenize, bench_rank);
criterion_main!(benches);
