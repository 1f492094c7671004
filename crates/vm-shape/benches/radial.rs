use criterion::{Criterion, black_box, criterion_group, criterion_main};
use vm_contour::Contour;
use vm_shape::{
    PropertySelection, RadialConfig, compare_profiles, orientation_normalized_profile, outline,
    radial_profile, region_properties,
};

fn wobbly_ring(n: usize, phase: f64) -> Contour {
    let xy: Vec<(f64, f64)> = (0..n)
        .map(|i| {
            let t = i as f64 * core::f64::consts::TAU / n as f64;
            let r = 200.0 + 25.0 * (5.0 * t + phase).sin() + 60.0 * t.cos();
            (512.0 + r * t.cos(), 384.0 + 0.6 * r * t.sin())
        })
        .collect();
    Contour::from_xy(&xy)
}

fn bench_radial(c: &mut Criterion) {
    let a = wobbly_ring(2000, 0.0);
    let b = wobbly_ring(2000, 0.4);

    c.bench_function("vm_shape_radial_2000pts", |bench| {
        bench.iter(|| {
            let p = radial_profile(black_box(&a), 0.0);
            black_box(p.map(|p| p.center.x).unwrap_or(0.0));
        });
    });

    let cfg = RadialConfig::default();
    let pa = orientation_normalized_profile(&a, &cfg);
    let pb = orientation_normalized_profile(&b, &cfg);
    if let (Ok(pa), Ok(pb)) = (pa, pb) {
        c.bench_function("vm_shape_compare_profiles", |bench| {
            bench.iter(|| black_box(compare_profiles(black_box(&pa), black_box(&pb))));
        });
    }

    c.bench_function("vm_shape_props_and_outline", |bench| {
        bench.iter(|| {
            let props = region_properties(black_box(&a), &PropertySelection::All);
            let o = outline(black_box(&a), 20);
            black_box((props.map(|p| p.len()), o.map(|o| o.len())));
        });
    });
}

criterion_group!(benches, bench_radial);
criterion_main!(benches);
