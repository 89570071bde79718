//! Typed wire shapes for the analysis-service block graph.
//!
//! The analysis service returns a consolidated result: a flat array of typed
//! blocks connected by CHILD relationships. `BlockIndex` turns the id-based
//! relationship graph into O(1) lookups built once per twin.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Consolidated analysis-service result for one document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Identifier of the analysis job that produced this result
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

/// Block type tags emitted by the analysis service.
///
/// Unknown tags deserialize to [`BlockKind::Other`] so that new block types
/// in the service response do not break twin building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    #[serde(rename = "LINE")]
    Line,
    #[serde(rename = "WORD")]
    Word,
    #[serde(rename = "TABLE")]
    Table,
    #[serde(rename = "CELL")]
    Cell,
    #[serde(other)]
    Other,
}

/// One typed node of the block graph
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub block_type: Option<BlockKind>,
    /// Page the block appears on; absent on single-page responses
    #[serde(default)]
    pub page: Option<u32>,
    /// Recognition confidence, 0-100
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub text: Option<String>,
    /// 1-based grid row, present on CELL blocks
    #[serde(default)]
    pub row_index: Option<u32>,
    /// 1-based grid column, present on CELL blocks
    #[serde(default)]
    pub column_index: Option<u32>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

/// Relationship edge from one block to others, referenced by id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Relationship {
    /// Relationship kind; only "CHILD" edges are traversed
    #[serde(rename = "type")]
    pub rel_type: String,
    #[serde(default)]
    pub ids: Vec<String>,
}

pub const CHILD_RELATIONSHIP: &str = "CHILD";

impl Block {
    pub fn is_kind(&self, kind: BlockKind) -> bool {
        self.block_type == Some(kind)
    }
}

/// Id -> block lookup built once per analysis result
pub struct BlockIndex<'a> {
    by_id: HashMap<&'a str, &'a Block>,
}

impl<'a> BlockIndex<'a> {
    pub fn new(blocks: &'a [Block]) -> Self {
        let by_id = blocks
            .iter()
            .filter_map(|b| b.id.as_deref().map(|id| (id, b)))
            .collect();
        Self { by_id }
    }

    pub fn get(&self, id: &str) -> Option<&'a Block> {
        self.by_id.get(id).copied()
    }

    /// Resolve the CHILD blocks of *block* that carry the given type tag,
    /// in relationship order. Ids that resolve to nothing are skipped.
    pub fn children_of_kind(&self, block: &Block, kind: BlockKind) -> Vec<&'a Block> {
        block
            .relationships
            .iter()
            .filter(|rel| rel.rel_type == CHILD_RELATIONSHIP)
            .flat_map(|rel| rel.ids.iter())
            .filter_map(|id| self.get(id))
            .filter(|child| child.is_kind(kind))
            .collect()
    }
}
