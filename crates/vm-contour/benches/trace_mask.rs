use criterion::{Criterion, black_box, criterion_group, criterion_main};
use vm_contour::{ApproxMode, RetrievalMode, TraceConfig, largest, trace_contours};
use vm_core::Image;

fn synthetic_mask(width: usize, height: usize) -> Image<u8> {
    let (cx, cy) = (width as f64 / 2.0, height as f64 / 2.0);
    let (rx, ry) = (width as f64 * 0.4, height as f64 * 0.3);
    Image::mask_from_fn(width, height, |x, y| {
        let dx = (x as f64 - cx) / rx;
        let dy = (y as f64 - cy) / ry;
        let body = dx * dx + dy * dy <= 1.0;
        let speck = x % 97 == 5 && y % 89 == 7;
        body || speck
    })
}

fn bench_trace(c: &mut Criterion) {
    let mask = synthetic_mask(1280, 1024);
    let cfg = TraceConfig {
        retrieval: RetrievalMode::External,
        approx: ApproxMode::Full,
    };

    c.bench_function("vm_contour_trace_1280x1024", |b| {
        b.iter(|| {
            let set = trace_contours(black_box(&mask.as_view()), black_box(&cfg));
            black_box(set.len());
        });
    });

    let set = trace_contours(&mask.as_view(), &cfg);
    c.bench_function("vm_contour_largest", |b| {
        b.iter(|| {
            let got = largest(black_box(&set), RetrievalMode::External, ApproxMode::Simple);
            black_box(got.map(|c| c.len()).unwrap_or(0));
        });
    });
}

criterion_group!(benches, bench_trace);
criterion_main!(benches);
