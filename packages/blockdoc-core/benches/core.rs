use std::hint::black_box;

use blockdoc_core::{Block, BlockProps, BlockStore, BlockType, Document, Editor, EditorConfig, SequentialIds};
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};

const SIZES: &[usize] = &[10, 100, 1_000];

fn text() -> Block {
    Block::new(BlockType::Text)
}

/// Root with `count` containers, each holding one text block.
fn wide_document(count: usize) -> Document {
    let mut store = BlockStore::with_ids(Document::new(), SequentialIds::default());
    for _ in 0..count {
        let Some(id) = store
            .add_block(Block::new(BlockType::Container).with_props(BlockProps::linear()), "root", None)
            .applied()
        else {
            continue;
        };
        let _ = store.add_block(text(), id.as_str(), None);
    }
    store.document().clone()
}

fn bench_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("add");
    for &count in SIZES {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter_batched(
                || BlockStore::with_ids(Document::new(), SequentialIds::default()),
                |mut store| {
                    for _ in 0..count {
                        let _ = black_box(store.add_block(text(), "root", Some(0)));
                    }
                    store
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_move(c: &mut Criterion) {
    let mut group = c.benchmark_group("move-to-front");
    for &count in SIZES {
        let doc = wide_document(count);
        let last = format!("block-{}", count * 2 - 1);
        group.bench_with_input(BenchmarkId::from_parameter(count), &doc, |b, doc| {
            b.iter_batched(
                || BlockStore::with_ids(doc.clone(), SequentialIds::with_prefix("n")),
                |mut store| black_box(store.move_block(&last, "root", "root", 0, None)),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_duplicate(c: &mut Criterion) {
    let mut group = c.benchmark_group("duplicate");
    for &count in SIZES {
        let doc = wide_document(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &doc, |b, doc| {
            b.iter_batched(
                || BlockStore::with_ids(doc.clone(), SequentialIds::with_prefix("n")),
                |mut store| black_box(store.duplicate_block("block-1")),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_edit_undo(c: &mut Criterion) {
    let mut group = c.benchmark_group("edit-undo");
    for &count in SIZES {
        let doc = wide_document(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &doc, |b, doc| {
            b.iter_batched(
                || Editor::with_ids(doc.clone(), &EditorConfig::default(), SequentialIds::with_prefix("n")),
                |mut editor| {
                    let _ = editor.delete_block("block-1");
                    black_box(editor.undo())
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_add, bench_move, bench_duplicate, bench_edit_undo);
criterion_main!(benches);
