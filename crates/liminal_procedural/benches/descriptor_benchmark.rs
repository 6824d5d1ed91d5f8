//! Benchmark for descriptor generation and streaming.
//!
//! Run with: cargo bench --package liminal_procedural --bench descriptor_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use liminal_procedural::{AreaBounds, ChunkCoord, DescriptorGenerator, WorldManager, WorldManagerConfig};
use liminal_shared::Vec3;

fn benchmark_describe(c: &mut Criterion) {
    let gen = DescriptorGenerator::default();

    c.bench_function("describe_single", |b| {
        let mut coord = 0i32;
        b.iter(|| {
            coord = coord.wrapping_add(1);
            black_box(gen.describe(ChunkCoord::new(coord, coord / 2)))
        });
    });
}

fn benchmark_layout_grid(c: &mut Criterion) {
    let gen = DescriptorGenerator::default();

    let mut group = c.benchmark_group("layout_grid");
    group.throughput(Throughput::Elements(32 * 32));
    group.bench_function("32x32_chunks", |b| {
        b.iter(|| {
            for z in 0..32 {
                for x in 0..32 {
                    let coord = ChunkCoord::new(x, z);
                    black_box(gen.generate(coord, AreaBounds::for_chunk(coord, 30.0)));
                }
            }
        });
    });
    group.finish();
}

fn benchmark_streaming_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("streaming");
    group.sample_size(20);
    group.bench_function("walk_100_chunks_east", |b| {
        b.iter(|| {
            let mut manager = WorldManager::new(WorldManagerConfig::production());
            for step in 0..100u16 {
                let x = f32::from(step) * 30.0 + 15.0;
                black_box(manager.update(Vec3::new(x, 1.7, 15.0)));
            }
            manager.clear();
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_describe,
    benchmark_layout_grid,
    benchmark_streaming_walk
);
criterion_main!(benches);
