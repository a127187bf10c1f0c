use criterion::{criterion_group, criterion_main, Criterion, black_box};

use fastvoxel::raster::overlap::tri_box_overlap;
use fastvoxel::raster::shapes;
use fastvoxel::{DVec3, GridConfig, Voxelizer};

fn voxelize_rooms(rooms: usize, voxel: f64, config: &GridConfig) -> Voxelizer {
    let size = 3.0;
    let mut vox = Voxelizer::new(config.clone()).unwrap();
    vox.configure(DVec3::ZERO, DVec3::new(rooms as f64 * size, size, size), voxel)
        .unwrap();
    vox.push_triangles(&shapes::room_row(DVec3::ZERO, rooms, size, 1))
        .unwrap();
    vox.segment().unwrap();
    vox
}

fn bench_tri_box_overlap(c: &mut Criterion) {
    let tri = [
        DVec3::new(0.1, 0.2, 0.3),
        DVec3::new(0.9, 0.1, 0.7),
        DVec3::new(0.4, 0.8, 0.2),
    ];

    c.bench_function("tri_box_overlap", |b| {
        b.iter(|| tri_box_overlap(black_box(DVec3::splat(0.5)), DVec3::splat(0.5), black_box(&tri)));
    });
}

fn bench_voxelize_rooms(c: &mut Criterion) {
    let config = GridConfig::default();

    c.bench_function("voxelize_4_rooms_0.1", |b| {
        b.iter(|| voxelize_rooms(black_box(4), 0.1, &config));
    });
}

fn bench_voxelize_rooms_paged(c: &mut Criterion) {
    let config = GridConfig {
        chunk_edge: 16,
        memory_budget_bytes: 16 * 16 * 16 * 2 * 8,
        spill_dir: None,
    };

    c.bench_function("voxelize_4_rooms_0.1_paged", |b| {
        b.iter(|| voxelize_rooms(black_box(4), 0.1, &config));
    });
}

fn bench_extract_region(c: &mut Criterion) {
    let vox = voxelize_rooms(4, 0.1, &GridConfig::default());
    let dims = vox.dims().unwrap();
    let shape = [dims.x as usize, dims.y as usize, dims.z as usize];
    let mut dest = vec![0i16; shape.iter().product()];

    c.bench_function("copy_region_full", |b| {
        b.iter(|| vox.copy_region(black_box(&mut dest), shape, fastvoxel::IVec3::ZERO).unwrap());
    });
}

criterion_group!(
    benches,
    bench_tri_box_overlap,
    bench_voxelize_rooms,
    bench_voxelize_rooms_paged,
    bench_extract_region,
);
criterion_main!(benches);
