use criterion::{Criterion, criterion_group, criterion_main};
use runblock_lib::fence::{parse_blocks, pick_block};
use std::hint::black_box;

fn generate_document(block_count: usize) -> String {
    let mut doc = String::new();
    for i in 0..block_count {
        doc.push_str(&format!("## Section {i}\n\nSome prose about step {i}.\n\n"));
        if i % 3 == 0 {
            doc.push_str("~~~json\n{\"step\": ");
            doc.push_str(&i.to_string());
            doc.push_str("}\n~~~\n\n");
        } else {
            doc.push_str(&format!("```sh\necho step {i}\nls -la\n```\n\n"));
        }
    }
    doc
}

fn bench_parse_blocks(c: &mut Criterion) {
    let small = generate_document(10);
    let large = generate_document(1000);
    // Unterminated fences force a full look-ahead once per family
    let unterminated = format!("{}```sh\nnever closed\n", generate_document(200)).repeat(5);

    let mut group = c.benchmark_group("parse_blocks");
    group.bench_function("10 blocks", |b| b.iter(|| parse_blocks(black_box(&small))));
    group.bench_function("1000 blocks", |b| b.iter(|| parse_blocks(black_box(&large))));
    group.bench_function("unterminated", |b| b.iter(|| parse_blocks(black_box(&unterminated))));
    group.finish();
}

fn bench_pick_block(c: &mut Criterion) {
    let doc = generate_document(1000);
    let blocks = parse_blocks(&doc);
    let cursor = doc.len() / 2;

    c.bench_function("pick_block middle of 1000", |b| {
        b.iter(|| pick_block(black_box(&blocks), black_box(cursor)))
    });
}

criterion_group!(benches, bench_parse_blocks, bench_pick_block);
criterion_main!(benches);
