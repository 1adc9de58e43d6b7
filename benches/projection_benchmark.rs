use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gnss_survey::measure::DistanceCalculator;
use gnss_survey::models::{SortColumn, SurveyPoint, SurveyPointCollection};
use gnss_survey::projection::{CoordinateTransformer, ProjectionMode};
use gnss_survey::utils::packed_dms_to_decimal;

// A walk of survey points around Aomori, 10 m apart
fn create_test_points(count: usize) -> Vec<SurveyPoint> {
    (0..count)
        .map(|i| {
            let step = i as f64 * 1e-4;
            let mut point = SurveyPoint {
                point_number: Some(i as u32),
                altitude: Some(100.0 + (i % 7) as f64),
                ..Default::default()
            };
            point.set_position(Some(gnss_survey::GeodeticPosition::new(
                140.74 + step,
                40.82 + step * 0.5,
            )));
            point
        })
        .collect()
}

fn benchmark_plane_projection(c: &mut Criterion) {
    let points = create_test_points(100);
    let transformer = CoordinateTransformer::new();

    c.bench_function("plane_rectangular_projection", |b| {
        b.iter(|| {
            let mut sum = 0.0;
            for point in &points {
                if let Ok(projected) =
                    transformer.project(point, "JGD2011", ProjectionMode::PlaneRectangular)
                {
                    sum += projected.easting;
                }
            }
            black_box(sum)
        })
    });
}

fn benchmark_round_trip(c: &mut Criterion) {
    let points = create_test_points(100);
    let transformer = CoordinateTransformer::new();

    c.bench_function("utm_round_trip", |b| {
        b.iter(|| {
            let mut count = 0;
            for point in &points {
                if let Ok(projected) = transformer.project(point, "JGD2011", ProjectionMode::Utm) {
                    let back = transformer.unproject(&projected);
                    if back.latitude.is_finite() {
                        count += 1;
                    }
                }
            }
            black_box(count)
        })
    });
}

fn benchmark_packed_dms(c: &mut Criterion) {
    let packed = [1404452.123, 404910.5, 1391200.0, 355959.999];

    c.bench_function("packed_dms_conversion", |b| {
        b.iter(|| {
            let mut results = Vec::new();
            for value in &packed {
                if let Ok(decimal) = packed_dms_to_decimal(*value) {
                    results.push(decimal);
                }
            }
            black_box(results.len())
        })
    });
}

fn benchmark_distance_tables(c: &mut Criterion) {
    let mut group = c.benchmark_group("distance_table_by_size");
    let calculator = DistanceCalculator::default();

    for &size in &[10, 50, 100] {
        group.bench_with_input(BenchmarkId::new("points", size), &size, |b, &count| {
            let points = create_test_points(count);
            b.iter(|| {
                let mut total = 0.0;
                for a in &points {
                    for other in &points {
                        total += calculator.horizontal_distance(a, other).unwrap_or(0.0);
                    }
                }
                black_box(total)
            })
        });
    }

    group.finish();
}

fn benchmark_collection_geometry(c: &mut Criterion) {
    let collection = SurveyPointCollection::new(create_test_points(200), SortColumn::PointNumber, false);

    c.bench_function("collection_area_and_length", |b| {
        b.iter(|| {
            let area = collection.area_ha().unwrap_or(0.0);
            let length = collection.length_m().unwrap_or(0.0);
            black_box(area + length)
        })
    });
}

criterion_group!(
    benches,
    benchmark_plane_projection,
    benchmark_round_trip,
    benchmark_packed_dms,
    benchmark_distance_tables,
    benchmark_collection_geometry
);
criterion_main!(benches);
