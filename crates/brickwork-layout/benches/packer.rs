//! Benchmarks for the grid packer

use brickwork_core::geometry::Size;
use brickwork_layout::{Packer, PackerSettings};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

fn mixed_boxes(count: usize) -> Vec<Size<f32>> {
    (0..count)
        .map(|i| {
            let w = 50.0 + ((i * 37) % 4) as f32 * 50.0;
            let h = 50.0 + ((i * 53) % 3) as f32 * 50.0;
            Size::new(w, h)
        })
        .collect()
}

fn bench_pack(c: &mut Criterion) {
    let mut group = c.benchmark_group("pack");

    for count in [10, 100, 500, 1000] {
        let boxes = mixed_boxes(count);
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("vertical", count), &boxes, |b, boxes| {
            let mut packer = Packer::new();
            let settings = PackerSettings::default();
            b.iter(|| black_box(packer.pack(boxes, Size::new(1200.0, 0.0), &settings)));
        });

        group.bench_with_input(BenchmarkId::new("fill_gaps", count), &boxes, |b, boxes| {
            let mut packer = Packer::new();
            let settings = PackerSettings::default().fill_gaps(true);
            b.iter(|| black_box(packer.pack(boxes, Size::new(1200.0, 0.0), &settings)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pack);
criterion_main!(benches);
