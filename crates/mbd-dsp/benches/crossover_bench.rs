// SPDX-License-Identifier: LGPL-3.0-or-later

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use mbd_dsp::crossover::CrossoverNetwork;
use mbd_dsp::dynamics::compressor::Compressor;

const BUF_SIZE: usize = 1024;
const SR: f32 = 48000.0;

fn white_noise(len: usize) -> Vec<f32> {
    let mut state = 0x12345678u32;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(1664525).wrapping_add(1013904223);
            (state >> 8) as f32 / (1u32 << 23) as f32 - 1.0
        })
        .collect()
}

fn bench_crossover(c: &mut Criterion) {
    let input = white_noise(BUF_SIZE);

    let mut group = c.benchmark_group("crossover");
    for &bands in &[2usize, 3] {
        let mut xover = CrossoverNetwork::new(bands, SR);
        xover.set_frequencies(&[400.0, 2000.0][..bands - 1]);
        let mut out = vec![vec![0.0f32; BUF_SIZE]; bands];

        group.bench_function(format!("{bands}band_{BUF_SIZE}"), |b| {
            b.iter(|| {
                let mut refs: Vec<&mut [f32]> =
                    out.iter_mut().map(|o| o.as_mut_slice()).collect();
                xover.process(black_box(&input), &mut refs);
            })
        });
    }
    group.finish();
}

fn bench_compressor(c: &mut Criterion) {
    let input = white_noise(BUF_SIZE);
    let mut comp = Compressor::new();
    comp.set_sample_rate(SR)
        .set_threshold(-20.0)
        .set_attack(5.0)
        .set_release(250.0)
        .set_ratio(4.0);

    c.bench_function("compressor_1024", |b| {
        let mut buf = input.clone();
        b.iter(|| {
            buf.copy_from_slice(&input);
            comp.process_inplace(black_box(&mut buf));
        })
    });
}

criterion_group!(benches, bench_crossover, bench_compressor);
criterion_main!(benches);
