/// Benchmarks for twin chunking performance
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use doctwin::chunker::DocumentChunker;
use doctwin::types::{
    ExtractionMetadata, TwinDocument, TwinMetadata, TwinPage, TwinTable, SCHEMA_VERSION,
};

const WORDS_PER_PAGE: usize = 250;

/// Build a synthetic twin with the given number of words spread over pages
fn make_twin(word_count: usize) -> TwinDocument {
    let mut pages = Vec::new();
    let mut emitted = 0usize;
    while emitted < word_count {
        let page_words = WORDS_PER_PAGE.min(word_count - emitted);
        let text = (emitted..emitted + page_words)
            .map(|i| format!("word{i}"))
            .collect::<Vec<_>>()
            .join(" ");
        pages.push(TwinPage {
            page_number: pages.len() as u32 + 1,
            text,
        });
        emitted += page_words;
    }

    let extracted_text = pages
        .iter()
        .map(|p| p.text.clone())
        .collect::<Vec<_>>()
        .join("\n\n");

    TwinDocument {
        schema_version: SCHEMA_VERSION.to_string(),
        document_id: "bench-doc".to_string(),
        source_key: "source/Acme/Bench/large.pdf".to_string(),
        source_url: String::new(),
        filename: "large.pdf".to_string(),
        file_type: ".pdf".to_string(),
        content_type: "application/pdf".to_string(),
        metadata: TwinMetadata {
            library: "Bench".to_string(),
            path: "/Bench/large.pdf".to_string(),
            item_id: "bench-001".to_string(),
            last_modified: "2025-06-01T10:00:00Z".to_string(),
            size_bytes: (word_count * 6) as u64,
            ..TwinMetadata::default()
        },
        extracted_text,
        pages,
        tables: vec![TwinTable {
            table_index: 1,
            rows: (0..20)
                .map(|r| (0..5).map(|c| format!("cell-{r}-{c}")).collect())
                .collect(),
        }],
        extraction_metadata: ExtractionMetadata {
            method: "document-analysis".to_string(),
            job_id: Some("bench-job".to_string()),
            confidence: Some(99.0),
            timestamp: "2025-06-01T10:05:00Z".to_string(),
            block_count: Some(word_count),
        },
    }
}

fn bench_chunk_document(c: &mut Criterion) {
    let chunker = DocumentChunker::new(512, 50).expect("valid chunker parameters");

    let mut group = c.benchmark_group("chunk_document");
    for word_count in [1_000, 10_000, 50_000] {
        let twin = make_twin(word_count);
        group.bench_with_input(
            BenchmarkId::from_parameter(word_count),
            &twin,
            |b, twin| {
                b.iter(|| {
                    chunker
                        .chunk_document(black_box(twin))
                        .expect("chunking succeeds")
                });
            },
        );
    }
    group.finish();
}

fn bench_small_chunks(c: &mut Criterion) {
    // Small budgets force the word-window fallback on every page
    let chunker = DocumentChunker::new(64, 8).expect("valid chunker parameters");
    let twin = make_twin(10_000);

    c.bench_function("chunk_document_small_budget", |b| {
        b.iter(|| {
            chunker
                .chunk_document(black_box(&twin))
                .expect("chunking succeeds")
        });
    });
}

criterion_group!(benches, bench_chunk_document, bench_small_chunks);
criterion_main!(benches);
