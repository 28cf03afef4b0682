use crate::error::StoreError;
use crate::models::{ChunkRecord, SearchHit};
use async_trait::async_trait;

/// The persistence seam: an external collection that owns the index and
/// is consumed only through add / query / count.
#[async_trait]
pub trait VectorStore {
    async fn add_records(
        &self,
        records: &[ChunkRecord],
        embeddings: &[Vec<f32>],
    ) -> Result<(), StoreError>;

    /// Nearest neighbors for one query embedding, in the store's own
    /// ascending-distance order.
    async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<SearchHit>, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;

    fn collection_name(&self) -> &str;
}
