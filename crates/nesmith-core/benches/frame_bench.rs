//! Frame-loop benchmarks.

use criterion::{criterion_group, criterion_main, Criterion};
use nesmith_core::System;

/// A rendering-enabled NROM cartridge for a realistic frame workload.
fn bench_rom() -> Vec<u8> {
    let program = [
        0xA9, 0x80, 0x8D, 0x00, 0x20, // LDA #$80; STA $2000
        0xA9, 0x1E, 0x8D, 0x01, 0x20, // LDA #$1E; STA $2001
        0x4C, 0x0A, 0x80, // JMP $800A
    ];
    let mut image = vec![0x4E, 0x45, 0x53, 0x1A, 2, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
    let mut prg = vec![0xEA; 32 * 1024];
    prg[..program.len()].copy_from_slice(&program);
    prg[0x7FFA] = 0x00;
    prg[0x7FFB] = 0x90;
    prg[0x1000] = 0x40; // RTI at $9000
    prg[0x7FFC] = 0x00;
    prg[0x7FFD] = 0x80;
    image.extend_from_slice(&prg);
    image.extend_from_slice(&[0x55; 8 * 1024]);
    image
}

fn bench_run_frame(c: &mut Criterion) {
    let rom = bench_rom();
    c.bench_function("run_frame_rendering", |b| {
        let mut system = System::new();
        system.load_rom(&rom).unwrap();
        b.iter(|| {
            system.run_frame();
            std::hint::black_box(system.frame_buffer()[0]);
        });
    });
}

fn bench_save_state(c: &mut Criterion) {
    let rom = bench_rom();
    c.bench_function("save_state", |b| {
        let mut system = System::new();
        system.load_rom(&rom).unwrap();
        system.run_frame();
        b.iter(|| std::hint::black_box(system.save_state()));
    });
}

criterion_group!(benches, bench_run_frame, bench_save_state);
criterion_main!(benches);
