use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use lidarview_core::{BoundingBox, ColorMode, Point3d, PointCloudDataset};
use rand::Rng;

const POINT_COUNT: usize = 1_000_000;

fn synthetic_dataset() -> PointCloudDataset {
    let mut rng = rand::thread_rng();
    let mut positions = Vec::with_capacity(POINT_COUNT * 3);
    let mut bounds = BoundingBox::empty();
    for _ in 0..POINT_COUNT {
        let p = Point3d::new(
            rng.gen_range(0.0..2000.0),
            rng.gen_range(0.0..150.0),
            rng.gen_range(0.0..2000.0),
        );
        bounds.extend(&p);
        positions.extend_from_slice(&[p.x as f32, p.y as f32, p.z as f32]);
    }
    let intensity = (0..POINT_COUNT).map(|_| rng.gen()).collect();
    let rgb = (0..POINT_COUNT * 3).map(|_| rng.gen()).collect();
    PointCloudDataset::new(positions, Some(intensity), Some(rgb), bounds, ColorMode::Elevation).unwrap()
}

fn color_modes(c: &mut Criterion) {
    let mut dataset = synthetic_dataset();

    let mut g = c.benchmark_group("set color mode");
    g.sample_size(10);

    for mode in ColorMode::ALL {
        g.bench_with_input(BenchmarkId::from_parameter(mode), &mode, |b, &mode| {
            b.iter(|| dataset.set_color_mode(std::hint::black_box(mode)));
        });
    }

    g.finish();
}

criterion_group!(benches, color_modes);
criterion_main!(benches);
