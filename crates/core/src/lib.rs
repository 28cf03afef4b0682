pub mod chunking;
pub mod cleaning;
pub mod embeddings;
pub mod error;
pub mod extractor;
pub mod ingest;
pub mod models;
pub mod orchestrator;
pub mod stores;
pub mod traits;

pub use chunking::{build_chunk_records, chunk_identifier, file_identifier, split_text, ChunkingConfig};
pub use cleaning::clean_text;
pub use embeddings::{Embedder, HashedFeatureEmbedder, DEFAULT_EMBEDDING_DIMENSIONS};
pub use error::{IngestError, StoreError};
pub use extractor::{extract_text, FileKind};
pub use ingest::{
    discover_supported_files, file_stats, process_file, IngestionReport, SkippedFile,
    SUPPORTED_EXTENSIONS,
};
pub use models::{
    ChunkMetadata, ChunkRecord, CollectionInfo, FileStats, IngestionOptions, SearchHit,
};
pub use orchestrator::KnowledgeBase;
pub use stores::ChromaStore;
pub use traits::VectorStore;
