use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use stereomatch::{
    DisparityParams, DisparityRange, ExecutionBackend, ImageView, SequentialBackend,
    ThreadPoolBackend, WindowSpec,
};

fn make_pair(width: usize, height: usize) -> (Vec<u8>, Vec<u8>) {
    let mut left = Vec::with_capacity(width * height);
    let mut right = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            left.push((((x * 13) ^ (y * 7)) + x * y) as u8);
            right.push(((((x + 4) * 13) ^ (y * 7)) + (x + 4) * y) as u8);
        }
    }
    (left, right)
}

fn bench_disparity(c: &mut Criterion) {
    let width = 96;
    let height = 72;
    let (left, right) = make_pair(width, height);
    let left_view = ImageView::from_slice(&left, width, height).unwrap();
    let right_view = ImageView::from_slice(&right, width, height).unwrap();

    let params = DisparityParams {
        window: WindowSpec {
            height: 9,
            width: 9,
        },
        range: DisparityRange { min: 0, max: 16 },
    };

    c.bench_function("disparity_sequential", |b| {
        b.iter(|| {
            black_box(
                SequentialBackend
                    .compute_disparity(left_view, right_view, &params)
                    .unwrap(),
            )
        });
    });

    let threaded = ThreadPoolBackend::new();
    c.bench_function("disparity_thread_pool", |b| {
        b.iter(|| {
            black_box(
                threaded
                    .compute_disparity(left_view, right_view, &params)
                    .unwrap(),
            )
        });
    });

    #[cfg(feature = "rayon")]
    {
        use stereomatch::DataParallelBackend;
        c.bench_function("disparity_data_parallel", |b| {
            b.iter(|| {
                black_box(
                    DataParallelBackend
                        .compute_disparity(left_view, right_view, &params)
                        .unwrap(),
                )
            });
        });
    }
}

criterion_group!(benches, bench_disparity);
criterion_main!(benches);
