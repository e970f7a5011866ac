use criterion::{black_box, criterion_group, criterion_main, Criterion};

use traj_lib::{
    commit::commit,
    params::Params,
    points::RawPoint,
    sampler::{DrawSession, PathSampler},
};

/// Draw a lap of a circular track, one pointer sample per pixel of arc.
fn draw_circle(params: &Params) -> DrawSession {
    let sampler = PathSampler::new(params);
    let mut session = DrawSession::new();
    let track = |x: i32, y: i32| {
        let r = (((x - 300) * (x - 300) + (y - 300) * (y - 300)) as f64).sqrt();
        r > 100.0 && r < 250.0
    };

    let radius_px = 175.0;
    let num_samples = (2.0 * std::f64::consts::PI * radius_px) as usize;

    for i in 0..num_samples {
        let t = i as f64 / radius_px;
        let p = RawPoint::new(
            (300.0 + radius_px * t.cos()).round() as i32,
            (300.0 - radius_px * t.sin()).round() as i32,
        );
        sampler.on_point(&mut session, &track, p, i == 0);
    }

    session
}

fn bench_commit(c: &mut Criterion) {
    let params = Params::default();

    c.bench_function("sample circle", |b| b.iter(|| draw_circle(black_box(&params))));

    let session = draw_circle(&params);
    c.bench_function("commit circle", |b| {
        b.iter(|| commit(black_box(&session), black_box(&params)))
    });
}

criterion_group!(benches, bench_commit);
criterion_main!(benches);
