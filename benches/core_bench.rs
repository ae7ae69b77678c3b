use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;
use rail_map_overlay::core::{AlwaysVisible, BoundingSphere, TrackNode};
use rail_map_overlay::{LocationResolver, TrackGraph, VisibilityIndex};
use std::hint::black_box;

/// Gitter aus geraden Segmenten mit `columns` Segmenten pro Reihe.
fn build_synthetic_graph(segment_count: usize) -> TrackGraph {
    let columns = 1000usize;
    let mut graph = TrackGraph::new();

    for index in 0..=segment_count {
        let column = (index % columns) as f32;
        let row = (index / columns) as f32;
        let position = Vec3::new(
            column * 10.0 + row * 0.001,
            row * 0.01,
            row * 25.0 + column * 0.001,
        );
        graph.add_node(TrackNode::new(index as u64, position));
    }
    for index in 0..segment_count {
        if (index + 1) % columns == 0 {
            continue;
        }
        graph.connect(index as u64, index as u64, index as u64 + 1);
    }

    graph
}

fn build_query_points(count: usize) -> Vec<Vec3> {
    (0..count)
        .map(|i| {
            let x = ((i * 37) % 10_000) as f32 + 0.37;
            let z = ((i * 7) % 100) as f32 * 25.0 + 3.1;
            Vec3::new(x, 0.0, z)
        })
        .collect()
}

fn bench_location_resolver(c: &mut Criterion) {
    let mut group = c.benchmark_group("location_resolver");

    for &segment_count in &[10_000usize, 50_000usize] {
        let graph = build_synthetic_graph(segment_count);
        let resolver = LocationResolver::from_graph(&graph);
        let query_points = build_query_points(256);

        group.bench_with_input(
            BenchmarkId::new("indexed_batch", segment_count),
            &resolver,
            |b, resolver| {
                b.iter(|| {
                    let mut hits = 0usize;
                    for point in &query_points {
                        if resolver
                            .find_nearest(&graph, black_box(*point), 50.0)
                            .is_some()
                        {
                            hits += 1;
                        }
                    }
                    black_box(hits)
                })
            },
        );

        group.bench_with_input(
            BenchmarkId::new("linear_single", segment_count),
            &graph,
            |b, graph| {
                b.iter(|| {
                    black_box(LocationResolver::find_nearest_linear(
                        graph,
                        black_box(query_points[0]),
                        50.0,
                    ))
                })
            },
        );
    }

    group.finish();
}

fn bench_visibility_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("visibility_index");

    for &marker_count in &[10_000usize, 100_000usize] {
        let spheres: Vec<BoundingSphere> = (0..marker_count)
            .map(|i| {
                let x = (i % 1000) as f32 * 10.0 + (i / 1000) as f32 * 0.001;
                let z = (i / 1000) as f32 * 10.0 + (i % 1000) as f32 * 0.001;
                BoundingSphere::new(Vec3::new(x, 0.0, z), 1.0)
            })
            .collect();

        let mut index = VisibilityIndex::new(Some(500.0));
        index.rebuild(spheres, &AlwaysVisible);
        index.update_reference_point(Vec3::ZERO, &AlwaysVisible);
        index.poll();

        group.bench_function(BenchmarkId::new("camera_pan", marker_count), |b| {
            let mut step = 0usize;
            b.iter(|| {
                step = (step + 1) % 100;
                let position = Vec3::new(step as f32 * 50.0, 5000.0, step as f32 * 5.0);
                index.update_reference_point(black_box(position), &AlwaysVisible);
                black_box(index.poll().len())
            })
        });
    }

    group.finish();
}

criterion_group!(core_benches, bench_location_resolver, bench_visibility_index);
criterion_main!(core_benches);
