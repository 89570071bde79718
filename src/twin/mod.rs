//! Twin building: normalize raw extraction output into [`TwinDocument`]s.
//!
//! Two entry points, converging on one assembly step:
//!
//! * [`TwinBuilder::from_analysis`] — from a consolidated analysis-service
//!   result (a flat block graph).
//! * [`TwinBuilder::from_direct_extract`] — from in-process parser output
//!   (plain text plus raw tables).
//!
//! Malformed or empty extraction input is not an error: it yields a valid
//! twin with empty text, pages, and tables.

mod blocks;

pub use blocks::{AnalysisResult, Block, BlockIndex, BlockKind, Relationship};

use crate::types::{
    ExtractionMetadata, SourceMetadata, TwinDocument, TwinMetadata, TwinPage, TwinTable,
    SCHEMA_VERSION,
};
use regex::Regex;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Method label for the analysis-service extraction path
pub const METHOD_DOCUMENT_ANALYSIS: &str = "document-analysis";

/// Section-header markers (`--- <label> ---` on their own line) used by the
/// in-process parsers to separate slides/sheets in the flat text.
static SECTION_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^---\s+.+?\s+---$").expect("valid section marker regex"));

/// Assembles normalized twin documents
pub struct TwinBuilder;

impl TwinBuilder {
    /// Build a twin from a consolidated analysis-service result.
    ///
    /// LINE blocks become pages, TABLE blocks are reconstructed into
    /// rectangular grids through their CELL and WORD children, and the
    /// confidence score is the mean over every block that reports one.
    pub fn from_analysis(result: &AnalysisResult, source: &SourceMetadata) -> TwinDocument {
        let index = BlockIndex::new(&result.blocks);

        let page_lines = group_lines_by_page(&result.blocks);
        let tables = extract_tables(&result.blocks, &index);

        let full_text = page_lines
            .values()
            .filter(|lines| !lines.is_empty())
            .map(|lines| lines.join("\n"))
            .collect::<Vec<_>>()
            .join("\n\n");

        let pages = page_lines
            .iter()
            .map(|(&page_number, lines)| TwinPage {
                page_number,
                text: lines.join("\n"),
            })
            .collect();

        assemble_twin(
            source,
            full_text,
            pages,
            tables,
            ExtractionMetadata {
                method: METHOD_DOCUMENT_ANALYSIS.to_string(),
                job_id: result.job_id.clone(),
                confidence: average_confidence(&result.blocks),
                timestamp: chrono::Utc::now().to_rfc3339(),
                block_count: Some(result.blocks.len()),
            },
        )
    }

    /// Build a twin from in-process parser output: plain extracted text plus
    /// raw tables (already rectangular).
    pub fn from_direct_extract(
        text: &str,
        tables: Vec<Vec<Vec<String>>>,
        source: &SourceMetadata,
    ) -> TwinDocument {
        let method = direct_method_label(&source.file_type);
        let pages = pages_from_markers(text);

        let formatted_tables = tables
            .into_iter()
            .enumerate()
            .map(|(idx, rows)| TwinTable {
                table_index: idx + 1,
                rows,
            })
            .collect();

        assemble_twin(
            source,
            text.to_string(),
            pages,
            formatted_tables,
            ExtractionMetadata {
                method,
                job_id: None,
                confidence: None,
                timestamp: chrono::Utc::now().to_rfc3339(),
                block_count: None,
            },
        )
    }
}

/// Derive the deterministic document identifier from a storage key
pub fn document_id_for_key(source_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source_key.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn assemble_twin(
    source: &SourceMetadata,
    extracted_text: String,
    pages: Vec<TwinPage>,
    tables: Vec<TwinTable>,
    extraction_metadata: ExtractionMetadata,
) -> TwinDocument {
    let filename = match source.path.rsplit('/').next() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => source
            .source_key
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string(),
    };

    TwinDocument {
        schema_version: SCHEMA_VERSION.to_string(),
        document_id: document_id_for_key(&source.source_key),
        source_key: source.source_key.clone(),
        source_url: source.source_url.clone(),
        filename,
        file_type: source.file_type.clone(),
        content_type: source.content_type.clone(),
        metadata: TwinMetadata {
            library: source.library.clone(),
            path: source.path.clone(),
            item_id: source.item_id.clone(),
            last_modified: source.last_modified.clone(),
            size_bytes: source.size_bytes,
            ..TwinMetadata::default()
        },
        extracted_text,
        pages,
        tables,
        extraction_metadata,
    }
}

/// Group LINE block texts by page number, defaulting to page 1 and
/// preserving block order within a page.
fn group_lines_by_page(blocks: &[Block]) -> BTreeMap<u32, Vec<String>> {
    let mut pages: BTreeMap<u32, Vec<String>> = BTreeMap::new();
    for block in blocks {
        if !block.is_kind(BlockKind::Line) {
            continue;
        }
        let page = block.page.unwrap_or(1);
        pages
            .entry(page)
            .or_default()
            .push(block.text.clone().unwrap_or_default());
    }
    pages
}

/// Reconstruct tables from TABLE blocks via their CELL and WORD children.
///
/// Grid dimensions are `max(row_index) x max(column_index)` over the cells
/// (1-based); unfilled positions stay empty strings. A table with no
/// resolvable cells is dropped, though it still consumes an index number.
fn extract_tables(blocks: &[Block], index: &BlockIndex<'_>) -> Vec<TwinTable> {
    let mut tables = Vec::new();
    let mut table_index = 0usize;

    for block in blocks {
        if !block.is_kind(BlockKind::Table) {
            continue;
        }
        table_index += 1;

        let cells = index.children_of_kind(block, BlockKind::Cell);
        if cells.is_empty() {
            continue;
        }

        let max_row = cells
            .iter()
            .map(|c| c.row_index.unwrap_or(1))
            .max()
            .unwrap_or(1) as usize;
        let max_col = cells
            .iter()
            .map(|c| c.column_index.unwrap_or(1))
            .max()
            .unwrap_or(1) as usize;

        let mut grid = vec![vec![String::new(); max_col]; max_row];
        for cell in cells {
            let r = cell.row_index.unwrap_or(1) as usize - 1;
            let c = cell.column_index.unwrap_or(1) as usize - 1;
            grid[r][c] = cell_text(cell, index);
        }

        tables.push(TwinTable {
            table_index,
            rows: grid,
        });
    }

    tables
}

/// Space-join the WORD block texts inside a CELL
fn cell_text(cell: &Block, index: &BlockIndex<'_>) -> String {
    index
        .children_of_kind(cell, BlockKind::Word)
        .iter()
        .map(|word| word.text.clone().unwrap_or_default())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Mean confidence across all blocks that report one, rounded to two
/// decimals. Absent (not zero) when no block carries a score.
fn average_confidence(blocks: &[Block]) -> Option<f64> {
    let scores: Vec<f64> = blocks.iter().filter_map(|b| b.confidence).collect();
    if scores.is_empty() {
        return None;
    }
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    Some((mean * 100.0).round() / 100.0)
}

fn direct_method_label(file_type: &str) -> String {
    match file_type.to_lowercase().as_str() {
        ".pptx" | ".ppt" => "direct-presentation".to_string(),
        ".xlsx" | ".xls" => "direct-spreadsheet".to_string(),
        other => format!("direct-{}", other.trim_start_matches('.')),
    }
}

/// Split direct-extract text into pages on section-header markers.
///
/// With no markers the whole text is a single page; empty sections are
/// dropped and the survivors renumbered sequentially from 1.
fn pages_from_markers(text: &str) -> Vec<TwinPage> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let parts: Vec<&str> = SECTION_MARKER.split(text).collect();
    if parts.len() <= 1 {
        return vec![TwinPage {
            page_number: 1,
            text: text.trim().to_string(),
        }];
    }

    parts
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .enumerate()
        .map(|(idx, part)| TwinPage {
            page_number: idx as u32 + 1,
            text: part.to_string(),
        })
        .collect()
}
