//! # doctwin - Digital-Twin Normalization and Chunking
//!
//! doctwin turns raw, heterogeneous document-extraction output into the two
//! artifacts a retrieval pipeline consumes: a normalized, versioned "digital
//! twin" JSON document describing a source file's full content, and a
//! sequence of bounded, overlapping chunks ready for embedding and indexing.
//!
//! ## Overview
//!
//! Extraction output arrives from one of two structurally different sources:
//! a consolidated analysis-service result (a flat graph of typed blocks) or
//! an in-process parser (plain text plus raw tables). Both converge on one
//! canonical twin shape, which the chunker then splits with multi-level
//! fallback (paragraphs, sentences, word windows), overlap carry-over, and
//! page attribution.
//!
//! ## Key Features
//!
//! - **Two extraction paths, one schema**: block-graph reconstruction and
//!   direct-extract normalization produce identical twin records
//! - **Table recovery**: flat TABLE/CELL/WORD graphs become rectangular
//!   string grids, preserved verbatim as JSON table chunks
//! - **Overlap-aware splitting**: consecutive chunks share a configurable
//!   word tail/head, with guaranteed termination on pathological input
//! - **Page provenance**: every text chunk reports the pages it spans
//! - **Partial-failure streaming**: corpus-wide chunk streams skip corrupt
//!   twins without aborting
//!
//! ## Architecture
//!
//! ```text
//! analysis result ──┐
//!                   ├─> TwinBuilder ──> TwinDocument ──> object store
//! parser output ────┘                                        │
//!                                                            v
//!                    embedding/indexing <── chunks <── DocumentChunker
//! ```
//!
//! ## Usage Example
//!
//! ```no_run
//! use doctwin::chunker::DocumentChunker;
//! use doctwin::twin::{AnalysisResult, TwinBuilder};
//! use doctwin::types::SourceMetadata;
//!
//! fn main() -> anyhow::Result<()> {
//!     let result: AnalysisResult = serde_json::from_str("{}")?;
//!     let source = SourceMetadata::default();
//!
//!     let twin = TwinBuilder::from_analysis(&result, &source);
//!
//!     let chunker = DocumentChunker::new(512, 50)?;
//!     let chunks = chunker.chunk_document(&twin)?;
//!     println!("{} chunks", chunks.len());
//!     Ok(())
//! }
//! ```

/// Twin chunking, multi-document streaming, and JSONL export
pub mod chunker;

/// Configuration management with environment variable overrides
pub mod config;

/// Error types and utilities
pub mod error;

/// Storage-key sanitization and source/extracted key mapping
pub mod paths;

/// Object-store trait boundary and in-memory implementation
pub mod store;

/// Twin building from analysis-service block graphs and direct extraction
pub mod twin;

/// Twin and chunk record types shared across the crate
pub mod types;
