//! Benchmarks for the in-process parts of the pipeline.
//!
//! Run with: cargo bench
//!
//! External tools (tesseract, tabula, Camelot, the completion API) are not
//! exercised; these cover chunking, OCR row grouping and table layout.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use docsift::ocr::{group_into_lines, WordBox};
use docsift::parser::TextSpan;
use docsift::tables::{format, TableDetector};
use docsift::{chunk_text, is_pdf_bytes};

/// Synthetic OCR output: `rows` lines of `cols` words with jittered tops.
fn synthetic_words(rows: i32, cols: i32) -> Vec<WordBox> {
    let mut words = Vec::new();
    for r in 0..rows {
        for c in (0..cols).rev() {
            let jitter = (r * 7 + c * 3) % 6;
            let confidence = if (r + c) % 9 == 0 { 12.0 } else { 88.0 };
            words.push(WordBox::new(
                format!("w{}_{}", r, c),
                c * 90,
                r * 24 + jitter,
                confidence,
            ));
        }
    }
    words
}

/// Synthetic page spans: a paragraph followed by an aligned table.
fn synthetic_spans(rows: usize) -> Vec<TextSpan> {
    let mut spans = vec![TextSpan::new("Summary of results", 72.0, 760.0, 12.0)];
    for r in 0..rows {
        let y = 720.0 - r as f32 * 16.0;
        spans.push(TextSpan::new(format!("Item {}", r), 72.0, y, 10.0));
        spans.push(TextSpan::new(format!("{}", r * 40), 220.0, y, 10.0));
        spans.push(TextSpan::new(format!("{}.00", r * 3), 340.0, y, 10.0));
    }
    spans
}

/// Benchmark character chunking at various text sizes.
fn bench_chunking(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunk_text");

    for size in [10_000usize, 100_000, 1_000_000].iter() {
        let text: String = "Résumé of quarterly figures. "
            .chars()
            .cycle()
            .take(*size)
            .collect();

        group.bench_function(format!("{}_chars", size), |b| {
            b.iter(|| chunk_text(black_box(&text), 4000).len());
        });
    }

    group.finish();
}

/// Benchmark OCR row reconstruction.
fn bench_group_into_lines(c: &mut Criterion) {
    let mut group = c.benchmark_group("group_into_lines");

    for (rows, cols) in [(20, 5), (200, 8)].iter() {
        let words = synthetic_words(*rows, *cols);
        group.bench_function(format!("{}x{}", rows, cols), |b| {
            b.iter(|| group_into_lines(black_box(&words)).len());
        });
    }

    group.finish();
}

/// Benchmark positional table detection and grid rendering.
fn bench_table_detection(c: &mut Criterion) {
    let detector = TableDetector::new();
    let spans = synthetic_spans(40);

    c.bench_function("detect_and_render_table", |b| {
        b.iter(|| {
            detector
                .detect(black_box(&spans))
                .iter()
                .map(|t| format::grid_or_pipes(&t.to_grid()).len())
                .sum::<usize>()
        });
    });
}

/// Benchmark PDF magic detection.
fn bench_format_detection(c: &mut Criterion) {
    let pdf_data = b"%PDF-1.7\n%\xe2\xe3\xcf\xd3\n";
    let non_pdf_data = b"Not a PDF file at all, just random text content";

    c.bench_function("detect_valid_pdf", |b| {
        b.iter(|| is_pdf_bytes(black_box(pdf_data)));
    });

    c.bench_function("detect_non_pdf", |b| {
        b.iter(|| is_pdf_bytes(black_box(non_pdf_data)));
    });
}

criterion_group!(
    benches,
    bench_chunking,
    bench_group_into_lines,
    bench_table_detection,
    bench_format_detection,
);
criterion_main!(benches);
