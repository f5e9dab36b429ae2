//! Calculator and session throughput.
//!
//! Run with: `cargo bench`

use std::sync::Arc;

use bearhunt::rally::{compute, Roster, RosterSpec, SelectionSession};
use bearhunt::{HeroCatalog, JoinerSkillRule, RallyConfig};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

fn full_roster(catalog: &HeroCatalog) -> Roster {
    let spec: RosterSpec = serde_json::from_str(
        r#"{
            "captains": [{"hero": "Jabel", "skill": "Hero's Domain", "level": 5}],
            "joiners": [
                {"hero": "Amadeus", "level": 5},
                {"hero": "Amane", "level": 5},
                {"hero": "Saul", "level": 4},
                {"hero": "Fahd", "level": 3}
            ]
        }"#,
    )
    .expect("bench roster should parse");
    Roster::from_spec(catalog, JoinerSkillRule::FirstSkill, &spec).expect("bench roster resolves")
}

fn bench_calculator(c: &mut Criterion) {
    let catalog = HeroCatalog::builtin().expect("built-in catalog");
    let config = RallyConfig::default();
    let capped = RallyConfig {
        joiner_cap: Some(2),
        ..RallyConfig::default()
    };
    let roster = full_roster(&catalog);

    let mut group = c.benchmark_group("calculator");
    group.bench_function("compute_five_heroes", |b| {
        b.iter(|| compute(black_box(&catalog), black_box(&config), black_box(&roster)))
    });
    group.bench_function("compute_five_heroes_capped", |b| {
        b.iter(|| compute(black_box(&catalog), black_box(&capped), black_box(&roster)))
    });
    group.finish();
}

fn bench_session(c: &mut Criterion) {
    let catalog = Arc::new(HeroCatalog::builtin().expect("built-in catalog"));
    let choices = [
        "Jabel",
        "Hero's Domain",
        "5",
        "4",
        "Amadeus",
        "5",
        "Amane",
        "5",
        "Saul",
        "4",
        "Fahd",
        "3",
    ];

    let mut group = c.benchmark_group("session");
    group.bench_function("full_flow", |b| {
        b.iter_batched(
            || SelectionSession::new(Arc::clone(&catalog), RallyConfig::default()),
            |mut session| {
                for choice in choices {
                    session.choose(choice).expect("bench choice accepted");
                }
                black_box(session.finalize())
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(benches, bench_calculator, bench_session);
criterion_main!(benches);
