use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use geo::Point;
use walkability_core::Entity;
use walkability_core::prelude::*;
use walkability_core::scoring::metrics::crossing_density;

const CENTER_LAT: f64 = 52.2297;
const CENTER_LON: f64 = 21.0122;

/// Grid of streets, crossings and POIs spread over roughly one square km
#[allow(clippy::cast_precision_loss)]
fn dense_snapshot(side: usize) -> InfrastructureSnapshot {
    let step = 0.01 / side as f64;
    let mut entities = Vec::with_capacity(side * side * 3);
    let mut id = 0;

    for row in 0..side {
        for col in 0..side {
            let lat = CENTER_LAT - 0.005 + row as f64 * step;
            let lon = CENTER_LON - 0.005 + col as f64 * step;
            id += 1;
            entities.push(Entity::node(id, lat, lon, [("highway", "crossing")]));
            id += 1;
            entities.push(
                Entity::way(id, [("highway", "residential")]).with_position(lat, lon),
            );
            id += 1;
            let tags = match (row + col) % 4 {
                0 => [("amenity", "school")],
                1 => [("shop", "bakery")],
                2 => [("leisure", "park")],
                _ => [("railway", "tram_stop")],
            };
            entities.push(Entity::node(id, lat + step / 2.0, lon, tags));
        }
    }

    InfrastructureSnapshot::from_entities(entities)
}

fn bench_base_metrics(c: &mut Criterion) {
    let center = Point::new(CENTER_LON, CENTER_LAT);
    let mut group = c.benchmark_group("base_metrics");

    for side in [10, 30, 60] {
        let snapshot = dense_snapshot(side);
        group.throughput(Throughput::Elements((side * side) as u64));
        group.bench_with_input(BenchmarkId::new("calculate", side), &snapshot, |b, snapshot| {
            b.iter(|| black_box(BaseMetrics::calculate(snapshot, center)));
        });
        group.bench_with_input(
            BenchmarkId::new("crossing_density", side),
            &snapshot,
            |b, snapshot| b.iter(|| black_box(crossing_density(snapshot, center))),
        );
    }

    group.finish();
}

fn bench_fusion(c: &mut Criterion) {
    let base = BaseMetrics {
        crossing_density: 7.5,
        sidewalk_coverage: 4.2,
        network_efficiency: 8.0,
        destination_access: 6.7,
        green_space_access: 3.3,
    };
    let partial = SignalScores {
        slope: Some(8.0),
        air_quality: Some(6.0),
        ..SignalScores::default()
    };
    let complete = SignalScores {
        slope: Some(8.0),
        tree_canopy: Some(5.0),
        surface_temp: Some(7.0),
        air_quality: Some(6.0),
        heat_island: Some(8.0),
    };
    let options = FusionOptions::default();

    let mut group = c.benchmark_group("fusion");
    for (name, signals) in [
        ("infrastructure_only", SignalScores::default()),
        ("partial", partial),
        ("complete", complete),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(name), &signals, |b, signals| {
            b.iter(|| black_box(fuse(&base, signals, &options)));
        });
    }
    group.finish();
}

fn bench_assess_many(c: &mut Criterion) {
    let inputs: Vec<_> = (0..16)
        .map(|_| (dense_snapshot(20), Point::new(CENTER_LON, CENTER_LAT)))
        .collect();

    c.bench_function("assess_many_16", |b| {
        b.iter(|| black_box(assess_many(&inputs)));
    });
}

criterion_group!(benches, bench_base_metrics, bench_fusion, bench_assess_many);
criterion_main!(benches);
