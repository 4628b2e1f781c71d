use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mmr_core::{cutoff_angle, Convention, PhaseSample};
use mmr_libration::{classify, find_circulation_breaks, ClassifierSettings};

fn series() -> Vec<PhaseSample> {
    (0..100_000)
        .map(|idx| {
            let time = idx as f64;
            PhaseSample::new(time, cutoff_angle(0.002 * time + 2.5 * (time / 700.0).sin()))
        })
        .collect()
}

fn bench_circulation(c: &mut Criterion) {
    let samples = series();
    let settings = ClassifierSettings::default();
    c.bench_function("circulation_breaks", |b| {
        b.iter(|| {
            for convention in Convention::ALL {
                let breaks =
                    find_circulation_breaks(black_box(&samples), convention).expect("breaks");
                black_box(classify(&breaks, convention, &settings));
            }
        });
    });
}

criterion_group!(benches, bench_circulation);
criterion_main!(benches);
