use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub file_path: String,
    pub file_name: String,
    pub file_type: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
    pub file_size: u64,
    pub created_at: Option<DateTime<Utc>>,
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub chunk_id: String,
    pub text: String,
    pub metadata: ChunkMetadata,
}

/// One similarity hit in the store's own ranking; lower distance is closer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub text: String,
    pub metadata: Value,
    pub distance: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub total_documents: u64,
    pub collection_name: String,
}

/// Filesystem facts about a source file. A failed stat yields the
/// zeroed default instead of an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileStats {
    pub file_size: u64,
    pub created_at: Option<DateTime<Utc>>,
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy)]
pub struct IngestionOptions {
    pub chunk_chars: usize,
    pub overlap_chars: usize,
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            chunk_chars: 1_000,
            overlap_chars: 200,
        }
    }
}
