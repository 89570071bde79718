//! Break twin documents into chunks suitable for vector embedding.
//!
//! This module bridges the ingestion core and the retrieval pipeline: it
//! consumes [`TwinDocument`]s (one at a time or streamed from an object
//! store) and yields [`ChunkRecord`]s ready for embedding and indexing.
//!
//! ```no_run
//! use doctwin::chunker::DocumentChunker;
//! # fn demo(twin: doctwin::types::TwinDocument) -> anyhow::Result<()> {
//! let chunker = DocumentChunker::new(512, 50)?;
//! let chunks = chunker.chunk_document(&twin)?;
//! # Ok(())
//! # }
//! ```

mod splitter;

use crate::error::{ChunkingError, ExportError, IngestError};
use crate::store::{parse_store_url, ObjectStore, STORE_URL_SCHEME};
use crate::types::{ChunkMetadata, ChunkRecord, TwinDocument, TwinPage};
use futures::{Stream, StreamExt};
use splitter::split_text;
use std::collections::{BTreeSet, VecDeque};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

/// Approximate ratio: 1 token is about 0.75 words
const TOKENS_TO_WORDS: f64 = 0.75;

pub const DEFAULT_CHUNK_SIZE: usize = 512;
pub const DEFAULT_CHUNK_OVERLAP: usize = 50;

/// Splits twin documents into overlapping, page-attributed chunks.
///
/// `chunk_size` and `chunk_overlap` are expressed in tokens and converted
/// to word budgets at roughly 0.75 words per token. Construction rejects an
/// overlap that would consume an entire chunk.
#[derive(Debug, Clone)]
pub struct DocumentChunker {
    chunk_size: usize,
    chunk_overlap: usize,
    target_words: usize,
    overlap_words: usize,
}

impl DocumentChunker {
    /// Create a chunker with the given token budget and overlap.
    ///
    /// Fails fast when `chunk_overlap >= chunk_size`: that configuration can
    /// never make progress and must not be discovered later during splitting.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, ChunkingError> {
        if chunk_size == 0 {
            return Err(ChunkingError::ZeroChunkSize);
        }
        if chunk_overlap >= chunk_size {
            return Err(ChunkingError::InvalidOverlap {
                size: chunk_size,
                overlap: chunk_overlap,
            });
        }
        Ok(Self::from_params(chunk_size, chunk_overlap))
    }

    fn from_params(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            // A word budget of 0 would emit empty windows forever
            target_words: ((chunk_size as f64 * TOKENS_TO_WORDS) as usize).max(1),
            overlap_words: (chunk_overlap as f64 * TOKENS_TO_WORDS) as usize,
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Chunk a single twin into embedding-ready records.
    ///
    /// Text chunks come first (split from pages when the twin has page
    /// structure, otherwise from the flat extracted text), followed by one
    /// chunk per non-empty table. `total_chunks` is back-filled on every
    /// record once the final count is known.
    pub fn chunk_document(&self, twin: &TwinDocument) -> Result<Vec<ChunkRecord>, IngestError> {
        let base_metadata = ChunkMetadata {
            site: twin.metadata.site.clone(),
            library: twin.metadata.library.clone(),
            path: twin.metadata.path.clone(),
            access_tags: twin.metadata.access_tags.clone(),
            author: twin.metadata.author.clone(),
            last_modified: twin.metadata.last_modified.clone(),
            file_type: twin.file_type.clone(),
            page_numbers: Vec::new(),
        };

        let text_chunks = if !twin.pages.is_empty() {
            self.chunk_pages(&twin.pages)
        } else if !twin.extracted_text.is_empty() {
            self.chunk_flat_text(&twin.extracted_text)
        } else {
            Vec::new()
        };

        let mut chunks: Vec<ChunkRecord> = Vec::new();

        for (text, page_numbers) in text_chunks {
            let metadata = ChunkMetadata {
                page_numbers,
                ..base_metadata.clone()
            };
            chunks.push(build_chunk(twin, chunks.len(), text, metadata));
        }

        // Each table is its own chunk; the payload is the JSON row grid so a
        // downstream embedder can index it as structured text.
        for table in &twin.tables {
            if table.rows.is_empty() {
                continue;
            }
            let text = serde_json::to_string(&table.rows)?;
            chunks.push(build_chunk(twin, chunks.len(), text, base_metadata.clone()));
        }

        // Back-fill total_chunks now that the final count is known
        let total = chunks.len();
        for chunk in &mut chunks {
            chunk.total_chunks = total;
        }

        Ok(chunks)
    }

    /// Lazily chunk every stored twin under a key prefix.
    ///
    /// Lists `.json` objects under `prefix`, fetches and chunks them one
    /// document at a time, and yields the concatenation of their chunk
    /// sequences. A twin that fails to fetch or parse is logged with its key
    /// and skipped; it never aborts the remainder of the stream.
    /// Cancellation is honored between documents only, so a document's
    /// chunk sequence is always complete.
    pub async fn chunk_all_documents<'a>(
        &'a self,
        store: &'a dyn ObjectStore,
        bucket: &'a str,
        prefix: &'a str,
        cancel: CancellationToken,
    ) -> Result<impl Stream<Item = ChunkRecord> + 'a, IngestError> {
        let keys: VecDeque<String> = store
            .list_keys(bucket, prefix)
            .await?
            .into_iter()
            .filter(|key| key.ends_with(".json"))
            .collect();

        tracing::info!(documents = keys.len(), prefix, "streaming chunks from stored twins");

        let state = StreamState {
            chunker: self,
            store,
            bucket: bucket.to_string(),
            keys,
            buffered: VecDeque::new(),
            cancel,
        };

        Ok(futures::stream::unfold(state, |mut state| async move {
            loop {
                if let Some(chunk) = state.buffered.pop_front() {
                    return Some((chunk, state));
                }
                if state.cancel.is_cancelled() {
                    tracing::info!("chunk streaming cancelled");
                    return None;
                }
                let key = state.keys.pop_front()?;
                match state.fetch_and_chunk(&key).await {
                    Ok(chunks) => state.buffered = chunks.into(),
                    Err(err) => {
                        tracing::warn!(key = %key, error = %err, "skipping twin that failed to chunk");
                    }
                }
            }
        }))
    }

    /// Write chunks as JSONL (one JSON object per line) to a local file
    /// path or a `store://bucket/key` target.
    ///
    /// Returns the number of chunks written. An empty input produces a
    /// zero-length output.
    pub async fn export_chunks_to_jsonl(
        chunks: &[ChunkRecord],
        target: &str,
        store: Option<&dyn ObjectStore>,
    ) -> Result<usize, IngestError> {
        Self::export_chunk_stream_to_jsonl(futures::stream::iter(chunks.iter().cloned()), target, store)
            .await
    }

    /// Stream variant of [`Self::export_chunks_to_jsonl`], for use with
    /// [`Self::chunk_all_documents`] without materializing the corpus.
    pub async fn export_chunk_stream_to_jsonl<S>(
        chunks: S,
        target: &str,
        store: Option<&dyn ObjectStore>,
    ) -> Result<usize, IngestError>
    where
        S: Stream<Item = ChunkRecord>,
    {
        if target.starts_with(STORE_URL_SCHEME) {
            let (bucket, key) = parse_store_url(target)?;
            let Some(store) = store else {
                return Err(ExportError::StoreRequired(target.to_string()).into());
            };
            write_jsonl_store(chunks, store, &bucket, &key).await
        } else {
            write_jsonl_local(chunks, target).await
        }
    }

    /// Chunk text from structured pages, tracking page provenance.
    ///
    /// Pages are concatenated with blank-line separators while a parallel
    /// array maps every word position to its page; each emitted chunk then
    /// reports the sorted, de-duplicated pages its word range spans.
    fn chunk_pages(&self, pages: &[TwinPage]) -> Vec<(String, Vec<u32>)> {
        let mut full_text = String::new();
        let mut word_page_map: Vec<u32> = Vec::new();

        for page in pages {
            let text = page.text.trim();
            if text.is_empty() {
                continue;
            }
            if !full_text.is_empty() {
                full_text.push_str("\n\n");
            }
            let word_count = text.split_whitespace().count();
            word_page_map.extend(std::iter::repeat(page.page_number).take(word_count));
            full_text.push_str(text);
        }

        if full_text.is_empty() {
            return Vec::new();
        }

        let raw_chunks = split_text(&full_text, self.target_words, self.overlap_words);

        let mut result = Vec::with_capacity(raw_chunks.len());
        let mut word_offset = 0usize;

        for chunk_text in raw_chunks {
            let chunk_len = chunk_text.split_whitespace().count();

            let page_numbers = if !word_page_map.is_empty() && chunk_len > 0 {
                let start = word_offset.min(word_page_map.len() - 1);
                let end = (word_offset + chunk_len - 1).min(word_page_map.len() - 1);
                if start <= end {
                    let pages: BTreeSet<u32> = word_page_map[start..=end].iter().copied().collect();
                    pages.into_iter().collect()
                } else {
                    Vec::new()
                }
            } else {
                Vec::new()
            };

            // Advance past this chunk, minus the words the next chunk re-uses
            word_offset += chunk_len.saturating_sub(self.overlap_words);

            result.push((chunk_text, page_numbers));
        }

        result
    }

    /// Chunk flat text with no page structure
    fn chunk_flat_text(&self, text: &str) -> Vec<(String, Vec<u32>)> {
        split_text(text, self.target_words, self.overlap_words)
            .into_iter()
            .map(|chunk| (chunk, Vec::new()))
            .collect()
    }
}

impl Default for DocumentChunker {
    fn default() -> Self {
        // 512/50 always satisfies the construction invariants
        Self::from_params(DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP)
    }
}

struct StreamState<'a> {
    chunker: &'a DocumentChunker,
    store: &'a dyn ObjectStore,
    bucket: String,
    keys: VecDeque<String>,
    buffered: VecDeque<ChunkRecord>,
    cancel: CancellationToken,
}

impl StreamState<'_> {
    async fn fetch_and_chunk(&self, key: &str) -> Result<Vec<ChunkRecord>, IngestError> {
        let body = self.store.get_object(&self.bucket, key).await?;
        let twin: TwinDocument = serde_json::from_slice(&body)?;
        self.chunker.chunk_document(&twin)
    }
}

fn build_chunk(
    twin: &TwinDocument,
    chunk_index: usize,
    text: String,
    metadata: ChunkMetadata,
) -> ChunkRecord {
    ChunkRecord {
        chunk_id: format!("{}_{}", twin.document_id, chunk_index),
        document_id: twin.document_id.clone(),
        source_key: twin.source_key.clone(),
        filename: twin.filename.clone(),
        chunk_index,
        total_chunks: 0, // back-filled once all chunks for the document exist
        text,
        metadata,
    }
}

async fn write_jsonl_local<S>(chunks: S, path: &str) -> Result<usize, IngestError>
where
    S: Stream<Item = ChunkRecord>,
{
    let file = tokio::fs::File::create(path).await?;
    let mut writer = tokio::io::BufWriter::new(file);
    let mut count = 0usize;

    futures::pin_mut!(chunks);
    while let Some(chunk) = chunks.next().await {
        let line = serde_json::to_string(&chunk)?;
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        count += 1;
    }
    writer.flush().await?;

    tracing::info!(count, path, "wrote chunks to local JSONL file");
    Ok(count)
}

async fn write_jsonl_store<S>(
    chunks: S,
    store: &dyn ObjectStore,
    bucket: &str,
    key: &str,
) -> Result<usize, IngestError>
where
    S: Stream<Item = ChunkRecord>,
{
    let mut lines: Vec<String> = Vec::new();
    futures::pin_mut!(chunks);
    while let Some(chunk) = chunks.next().await {
        lines.push(serde_json::to_string(&chunk)?);
    }

    let count = lines.len();
    let body = if lines.is_empty() {
        String::new()
    } else {
        lines.join("\n") + "\n"
    };
    store
        .put_object(bucket, key, body.into_bytes(), "application/x-ndjson")
        .await?;

    tracing::info!(count, bucket, key, "wrote chunks to object store");
    Ok(count)
}
