use serde::{Deserialize, Serialize};

/// Current schema version written into every twin document
pub const SCHEMA_VERSION: &str = "2.0";

/// Canonical, versioned representation of one source document's content.
///
/// A twin captures the full extracted content of a remote document (text,
/// tables, metadata) in a normalized JSON schema persisted alongside the
/// source file in the object store. Constructed once per extraction event
/// and immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwinDocument {
    /// Twin schema version, always [`SCHEMA_VERSION`]
    pub schema_version: String,
    /// Deterministic identifier: SHA-256 hex of the source storage key
    pub document_id: String,
    /// Storage key of the source document
    pub source_key: String,
    /// URL of the document in the remote content store, if known
    #[serde(default)]
    pub source_url: String,
    /// Filename derived from the source path
    pub filename: String,
    /// File extension including the leading dot (e.g. ".pdf")
    pub file_type: String,
    /// MIME content type of the source
    pub content_type: String,
    /// Source-side metadata carried through from the content store
    pub metadata: TwinMetadata,
    /// Concatenation of all page text
    pub extracted_text: String,
    /// Ordered pages, numbered contiguously from 1
    pub pages: Vec<TwinPage>,
    /// Tables in first-seen order, indexed from 1
    pub tables: Vec<TwinTable>,
    /// How and when the content was extracted
    pub extraction_metadata: ExtractionMetadata,
}

/// Source-side metadata block stored inside a twin
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TwinMetadata {
    /// Document library the source lives in
    pub library: String,
    /// Relative path of the document inside the library
    pub path: String,
    /// Item identifier assigned by the content store
    pub item_id: String,
    /// Last-modified timestamp reported by the content store
    pub last_modified: String,
    /// Source size in bytes
    pub size_bytes: u64,
    /// Site name, when the producer records one
    #[serde(default)]
    pub site: String,
    /// Document author, when the producer records one
    #[serde(default)]
    pub author: String,
    /// Access tags controlling downstream visibility
    #[serde(default)]
    pub access_tags: Vec<String>,
}

/// One page of extracted text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwinPage {
    pub page_number: u32,
    pub text: String,
}

/// One extracted table as a rectangular grid of cell strings.
///
/// Missing cells are empty strings, never omitted; ragged rows are a bug.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwinTable {
    /// 1-based index in first-seen order
    pub table_index: usize,
    pub rows: Vec<Vec<String>>,
}

/// Provenance of the extraction that produced a twin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionMetadata {
    /// Fixed label identifying the extraction path (e.g. "document-analysis")
    pub method: String,
    /// Analysis-service job identifier, absent for in-process extraction
    #[serde(default)]
    pub job_id: Option<String>,
    /// Mean confidence over all blocks reporting one, absent when none do
    #[serde(default)]
    pub confidence: Option<f64>,
    /// RFC 3339 timestamp of the extraction
    pub timestamp: String,
    /// Number of blocks in the analysis response, absent for in-process extraction
    #[serde(default)]
    pub block_count: Option<usize>,
}

/// Metadata describing the source document, supplied by the caller of the
/// twin builder (registry entry / store tags).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// Storage key of the source document
    pub source_key: String,
    /// URL in the remote content store
    #[serde(default)]
    pub source_url: String,
    /// Relative path inside the library
    pub path: String,
    /// Library name
    pub library: String,
    /// Item identifier in the content store
    pub item_id: String,
    /// Last-modified timestamp
    pub last_modified: String,
    /// File extension including the leading dot
    pub file_type: String,
    /// MIME content type
    pub content_type: String,
    /// Size in bytes
    #[serde(default)]
    pub size_bytes: u64,
}

/// One retrieval-ready unit produced by the chunker.
///
/// Chunks carry enough denormalized data to be embedded and indexed
/// independently of the twin they came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// `{document_id}_{chunk_index}`
    pub chunk_id: String,
    /// Identifier of the twin this chunk came from
    pub document_id: String,
    /// Storage key of the source document
    pub source_key: String,
    pub filename: String,
    /// 0-based, sequential within the document
    pub chunk_index: usize,
    /// Final chunk count for the document, identical on every chunk
    pub total_chunks: usize,
    /// Text payload ready for embedding
    pub text: String,
    pub metadata: ChunkMetadata,
}

/// Denormalized metadata attached to every chunk
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChunkMetadata {
    pub site: String,
    pub library: String,
    pub path: String,
    pub access_tags: Vec<String>,
    pub author: String,
    pub last_modified: String,
    pub file_type: String,
    /// Pages this chunk's text was drawn from: sorted and de-duplicated for
    /// text chunks, always empty for table chunks
    pub page_numbers: Vec<u32>,
}
