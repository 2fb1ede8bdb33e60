//! Criterion benchmarks for map style computation.
//!
//! Benchmarks a full restyle over a 263-zone catalog (the size of the taxi
//! zone map) under the common input combinations:
//!   - citywide, no quick filter
//!   - single borough with an applied underserved highlight
//!   - quick filter "underserved"
//!
//! Run with: cargo bench --bench highlight_styles

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use mobility_dashboard::highlight::{HighlightEngine, HighlightInputs, HighlightState};
use mobility_dashboard::{BoroughScope, GapRecord, GapSet, QuickFilter, ZoneCatalog, ZoneId, ZoneRecord};

const BOROUGHS: [&str; 5] = ["Manhattan", "Brooklyn", "Queens", "Bronx", "Staten Island"];
const ZONES: u32 = 263;

fn fixture() -> (ZoneCatalog, GapSet) {
    let zones = (1..=ZONES)
        .map(|id| ZoneRecord {
            id: ZoneId(id),
            borough: BOROUGHS[id as usize % BOROUGHS.len()].to_string(),
            zone_name: format!("Zone {}", id),
            geometry: None,
        })
        .collect();
    // Roughly one zone in seven underserved
    let gaps = (1..=ZONES)
        .filter(|id| id % 7 == 0)
        .map(|id| GapRecord {
            zone_name: format!("Zone {}", id),
            borough: None,
            ratio: 2.0 + (id % 5) as f64 * 0.3,
        })
        .collect();
    (ZoneCatalog::from_records(zones), GapSet::from_records(gaps))
}

fn bench_restyle(c: &mut Criterion) {
    let mut group = c.benchmark_group("highlight_restyle");
    let (catalog, gaps) = fixture();

    let none = HighlightState::default();
    let all = BoroughScope::All;
    group.bench_function("citywide", |b| {
        b.iter(|| {
            black_box(HighlightEngine::compute(&HighlightInputs {
                catalog: &catalog,
                gaps: &gaps,
                scope: &all,
                highlight: &none,
                quick_filter: QuickFilter::All,
            }))
        });
    });

    let brooklyn = BoroughScope::named("Brooklyn");
    let mut highlight = HighlightState::default();
    highlight.apply(brooklyn.clone(), (1..=ZONES).filter(|id| id % 7 == 0).map(ZoneId));
    group.bench_function("borough_with_highlight", |b| {
        b.iter(|| {
            black_box(HighlightEngine::compute(&HighlightInputs {
                catalog: &catalog,
                gaps: &gaps,
                scope: &brooklyn,
                highlight: &highlight,
                quick_filter: QuickFilter::All,
            }))
        });
    });

    group.bench_function("quick_filter_underserved", |b| {
        b.iter(|| {
            black_box(HighlightEngine::compute(&HighlightInputs {
                catalog: &catalog,
                gaps: &gaps,
                scope: &all,
                highlight: &none,
                quick_filter: QuickFilter::Underserved,
            }))
        });
    });

    group.finish();
}

criterion_group!(benches, bench_restyle);
criterion_main!(benches);
