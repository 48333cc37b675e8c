//! Diff-render benchmarks — `TerminalBackend::present` over changing frames
//! of increasing size (spec.md §4.4, §8: diff rendering is the hot path
//! every frame runs through).

#![allow(missing_docs)]

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use tstorie_core::buffer::CellBuffer;
use tstorie_core::color::Rgb;
use tstorie_core::style::Style;
use tstorie_core::terminal::{TerminalBackend, TestBackend};

fn checkerboard(w: u16, h: u16, parity: u16, ch: &str, style: Style) -> CellBuffer {
    let mut buf = CellBuffer::new(w, h);
    for y in 0..h {
        for x in 0..w {
            if (x + y) % 2 == parity {
                buf.write(x, y, ch, style);
            }
        }
    }
    buf
}

fn bench_full_frame_diff(c: &mut Criterion, w: u16, h: u16) {
    let style = Style::default().fg(Rgb::new(220, 40, 40));
    c.bench_function(&format!("diff_full_frame_{w}x{h}"), |b| {
        b.iter(|| {
            let mut backend = TerminalBackend::new(w, h);
            let mut terminal = TestBackend::new(w, h);
            let frame = checkerboard(w, h, 0, "#", style);
            backend.present(&frame, &mut terminal).expect("present succeeds");
            black_box(terminal.buffer().len())
        })
    });
}

fn bench_idempotent_present(c: &mut Criterion, w: u16, h: u16) {
    let style = Style::default().fg(Rgb::new(40, 200, 40));
    c.bench_function(&format!("diff_idempotent_present_{w}x{h}"), |b| {
        let mut backend = TerminalBackend::new(w, h);
        let mut terminal = TestBackend::new(w, h);
        let frame = checkerboard(w, h, 1, "@", style);
        backend.present(&frame, &mut terminal).expect("first present succeeds");
        b.iter(|| {
            terminal.clear_buffer();
            backend.present(&frame, &mut terminal).expect("repeat present succeeds");
            black_box(terminal.buffer().len())
        })
    });
}

fn diff_80x24(c: &mut Criterion) {
    bench_full_frame_diff(c, 80, 24);
}

fn diff_200x60(c: &mut Criterion) {
    bench_full_frame_diff(c, 200, 60);
}

fn diff_idempotent_80x24(c: &mut Criterion) {
    bench_idempotent_present(c, 80, 24);
}

criterion_group!(benches, diff_80x24, diff_200x60, diff_idempotent_80x24);
criterion_main!(benches);
