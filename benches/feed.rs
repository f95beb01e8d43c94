//! Benchmarks for the hot byte-feed path.
//!
//! Models realistic remote-program output: plain text filling the screen,
//! linefeed-driven scroll storms, SGR-heavy colored output, and full-screen
//! serialization. Sizes match real deployments of the firmware:
//!
//! - **26x10**: factory default screen.
//! - **80x25**: the hard upper bound.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use netterm_core::{ScreenCursor, Serialized, TermConfig, Terminal, VoidListener};

/// Terminal sizes that represent real usage.
const SIZES: [(u32, u32); 2] = [
    (26, 10), // Factory default.
    (80, 25), // Hard upper bound.
];

fn term(cols: u32, lines: u32) -> Terminal<VoidListener> {
    let mut config = TermConfig::default();
    config.width = cols;
    config.height = lines;
    Terminal::new(config, VoidListener)
}

/// A screenful of plain ASCII with linefeeds — `cat`, compiler output, logs.
fn ascii_screen(cols: u32, lines: u32) -> Vec<u8> {
    let mut out = Vec::new();
    for line in 0..lines * 2 {
        for i in 0..cols.saturating_sub(1) {
            out.push(b'a' + ((line + i) % 26) as u8);
        }
        out.extend_from_slice(b"\r\n");
    }
    out
}

/// Color-heavy output — `ls --color`, build systems, TUI redraws.
fn sgr_screen(cols: u32, lines: u32) -> Vec<u8> {
    let mut out = Vec::new();
    for line in 0..lines {
        for i in 0..cols.saturating_sub(1) {
            out.extend_from_slice(format!("\x1b[{};4{}m", 31 + (line + i) % 7, i % 8).as_bytes());
            out.push(b'x');
        }
        out.extend_from_slice(b"\x1b[0m\r\n");
    }
    out
}

/// Feeding plain text: the single hottest path.
fn bench_feed_ascii(c: &mut Criterion) {
    let mut group = c.benchmark_group("feed/ascii");
    for &(cols, lines) in &SIZES {
        let input = ascii_screen(cols, lines);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{cols}x{lines}")),
            &input,
            |b, input| {
                let mut t = term(cols, lines);
                b.iter(|| t.feed(black_box(input)));
            },
        );
    }
    group.finish();
}

/// Feeding SGR-laden text: parser dispatch plus template churn.
fn bench_feed_sgr(c: &mut Criterion) {
    let mut group = c.benchmark_group("feed/sgr");
    for &(cols, lines) in &SIZES {
        let input = sgr_screen(cols, lines);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{cols}x{lines}")),
            &input,
            |b, input| {
                let mut t = term(cols, lines);
                b.iter(|| t.feed(black_box(input)));
            },
        );
    }
    group.finish();
}

/// Scroll storm: every linefeed at the bottom rotates the region.
fn bench_scroll(c: &mut Criterion) {
    let mut group = c.benchmark_group("feed/scroll");
    for &(cols, lines) in &SIZES {
        let input: Vec<u8> = b"x\r\n".repeat(lines as usize * 4);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{cols}x{lines}")),
            &input,
            |b, input| {
                let mut t = term(cols, lines);
                // Park the cursor at the bottom so every linefeed scrolls.
                t.feed(format!("\x1b[{};1H", lines).as_bytes());
                b.iter(|| t.feed(black_box(input)));
            },
        );
    }
    group.finish();
}

/// Full-screen serialization into a transport-sized buffer.
fn bench_serialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize/screen");
    for &(cols, lines) in &SIZES {
        let mut t = term(cols, lines);
        t.feed(&sgr_screen(cols, lines));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{cols}x{lines}")),
            &t,
            |b, t| {
                let mut buf = [0u8; 1024];
                b.iter(|| {
                    let mut cursor = ScreenCursor::new();
                    let mut total = 0;
                    loop {
                        match t.serialize_screen(black_box(&mut buf), &mut cursor) {
                            Serialized::Done(n) => {
                                total += n;
                                break;
                            }
                            Serialized::More(n) => total += n,
                        }
                    }
                    total
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_feed_ascii,
    bench_feed_sgr,
    bench_scroll,
    bench_serialize
);
criterion_main!(benches);
