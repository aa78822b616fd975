//! Benchmarks for pdf-outline extraction performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks use synthetic layouts with a heading every few blocks.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use pdf_outline::layout::SpanCollector;
use pdf_outline::ml::LabeledExample;
use pdf_outline::{
    BBox, DocumentLayout, ExtractOptions, FeatureExtractor, HeadingModel, Label, LayoutBlock,
    LayoutLine, LayoutSpan, OutlineExtractor, PageLayout, TrainOptions,
};

/// Creates a synthetic layout with the given number of pages.
fn create_test_layout(page_count: usize) -> DocumentLayout {
    let mut layout = DocumentLayout::new();

    for p in 0..page_count {
        let mut page = PageLayout::letter();
        if p == 0 {
            page.add_block(LayoutBlock::single(
                "Benchmark Report",
                26.0,
                BBox::new(72.0, 40.0, 400.0, 66.0),
            ));
        }

        let mut y = 100.0;
        for section in 0..6 {
            let size = if section % 3 == 0 { 18.0 } else { 14.0 };
            page.add_block(LayoutBlock::single(
                format!("Section {}.{}", p + 1, section + 1),
                size,
                BBox::new(72.0, y, 300.0, y + size),
            ));
            y += size + 8.0;

            let lines = (0..5)
                .map(|i| {
                    let top = y + i as f32 * 13.0;
                    LayoutLine::new(vec![LayoutSpan::new(
                        "Body text for outline extraction performance measurement.",
                        10.0,
                        BBox::new(72.0, top, 520.0, top + 10.0),
                    )])
                })
                .collect();
            page.add_block(LayoutBlock::from_lines(lines));
            y += 5.0 * 13.0 + 12.0;
        }

        layout.add_page(page);
    }

    layout
}

fn train_test_model(layout: &DocumentLayout) -> HeadingModel {
    let doc = SpanCollector::new(&ExtractOptions::default()).collect(layout);
    let examples: Vec<LabeledExample> = FeatureExtractor::new()
        .extract(&doc)
        .into_iter()
        .map(|line| {
            let label = match line.features.font_size as u32 {
                26 => Label::Title,
                18 => Label::H1,
                14 => Label::H2,
                _ => Label::Body,
            };
            LabeledExample::new(line.features, label)
        })
        .collect();

    HeadingModel::fit(&examples, &TrainOptions::new().with_trees(25))
        .unwrap_or_else(|e| panic!("benchmark model training failed: {}", e))
}

/// Benchmark the rank heuristic at various sizes.
fn bench_heuristic_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("heuristic_extraction");
    let extractor = OutlineExtractor::heuristic();

    for page_count in [1, 10, 50].iter() {
        let layout = create_test_layout(*page_count);

        group.bench_function(format!("{}_pages", page_count), |b| {
            b.iter(|| extractor.extract(black_box(&layout)));
        });
    }

    group.finish();
}

/// Benchmark the learned classifier.
fn bench_learned_extraction(c: &mut Criterion) {
    let layout = create_test_layout(10);
    let model = Arc::new(train_test_model(&layout));
    let extractor = OutlineExtractor::learned(ExtractOptions::default(), model);

    c.bench_function("learned_extraction_10_pages", |b| {
        b.iter(|| extractor.extract(black_box(&layout)));
    });
}

/// Benchmark parallel batch extraction.
fn bench_batch_extraction(c: &mut Criterion) {
    let layouts: Vec<DocumentLayout> = (0..16).map(|_| create_test_layout(5)).collect();
    let extractor = OutlineExtractor::heuristic();

    c.bench_function("batch_16_documents", |b| {
        b.iter(|| extractor.extract_batch(black_box(&layouts)));
    });
}

/// Benchmark forest training.
fn bench_training(c: &mut Criterion) {
    let layout = create_test_layout(5);

    c.bench_function("train_25_trees", |b| {
        b.iter(|| train_test_model(black_box(&layout)));
    });
}

criterion_group!(
    benches,
    bench_heuristic_extraction,
    bench_learned_extraction,
    bench_batch_extraction,
    bench_training,
);
criterion_main!(benches);
