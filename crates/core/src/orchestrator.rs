use crate::embeddings::{Embedder, HashedFeatureEmbedder};
use crate::ingest::{discover_supported_files, process_file, IngestionReport, SkippedFile};
use crate::models::{CollectionInfo, IngestionOptions, SearchHit};
use crate::traits::VectorStore;
use crate::IngestError;
use std::path::Path;
use tracing::{error, info, warn};

/// Façade over the pipeline and the store. Ingestion and search never
/// fail loudly: per-file problems are recorded as skips, store
/// problems are logged and surface as empty results.
pub struct KnowledgeBase<S>
where
    S: VectorStore,
{
    store: S,
    embedder: HashedFeatureEmbedder,
    options: IngestionOptions,
}

impl<S> KnowledgeBase<S>
where
    S: VectorStore + Send + Sync,
{
    pub fn new(store: S) -> Self {
        Self::with_options(store, IngestionOptions::default())
    }

    pub fn with_options(store: S, options: IngestionOptions) -> Self {
        Self {
            store,
            embedder: HashedFeatureEmbedder::default(),
            options,
        }
    }

    /// Walks `root` and ingests every supported file, one at a time.
    /// Each file gets one store add; a failed add skips that file and
    /// the walk continues. Errors only on an unusable root.
    pub async fn ingest_directory(&self, root: &Path) -> Result<IngestionReport, IngestError> {
        if !root.is_dir() {
            return Err(IngestError::InvalidRoot(
                root.to_string_lossy().to_string(),
            ));
        }

        let files = discover_supported_files(root);
        let mut report = IngestionReport::default();

        for path in files {
            info!(path = %path.display(), "processing file");

            let records = match process_file(&path, self.options).await {
                Ok(records) => records,
                Err(reason) => {
                    warn!(path = %path.display(), %reason, "skipping file");
                    report.skipped.push(SkippedFile {
                        path,
                        reason: reason.to_string(),
                    });
                    continue;
                }
            };

            if records.is_empty() {
                continue;
            }

            let texts: Vec<String> = records.iter().map(|record| record.text.clone()).collect();
            let embeddings = self.embedder.embed_batch(&texts);

            match self.store.add_records(&records, &embeddings).await {
                Ok(()) => {
                    report.files_processed += 1;
                    report.chunks_ingested += records.len();
                }
                Err(reason) => {
                    error!(path = %path.display(), %reason, "store add failed");
                    report.skipped.push(SkippedFile {
                        path,
                        reason: reason.to_string(),
                    });
                }
            }
        }

        info!(
            files = report.files_processed,
            chunks = report.chunks_ingested,
            skipped = report.skipped.len(),
            "ingestion finished"
        );
        Ok(report)
    }

    /// Up to `top_k` hits in the store's own ascending-distance order.
    /// A store failure is logged and comes back as no hits.
    pub async fn search(&self, query: &str, top_k: usize) -> Vec<SearchHit> {
        let embedding = self.embedder.embed(query);

        match self.store.query(&embedding, top_k).await {
            Ok(hits) => hits,
            Err(reason) => {
                error!(%reason, "search failed");
                Vec::new()
            }
        }
    }

    /// Runs the search and writes the hits as a pretty-printed UTF-8
    /// JSON array (non-ASCII preserved literally). Returns whether the
    /// file was written; zero hits still write a valid `[]`.
    pub async fn export_search_results(&self, query: &str, top_k: usize, output: &Path) -> bool {
        let hits = self.search(query, top_k).await;

        let serialized = match serde_json::to_string_pretty(&hits) {
            Ok(serialized) => serialized,
            Err(reason) => {
                error!(%reason, "could not serialize search results");
                return false;
            }
        };

        match tokio::fs::write(output, serialized).await {
            Ok(()) => {
                info!(path = %output.display(), hits = hits.len(), "search results exported");
                true
            }
            Err(reason) => {
                error!(path = %output.display(), %reason, "export write failed");
                false
            }
        }
    }

    /// Document count and collection name; a store failure is logged
    /// and comes back zeroed.
    pub async fn collection_info(&self) -> CollectionInfo {
        match self.store.count().await {
            Ok(total_documents) => CollectionInfo {
                total_documents,
                collection_name: self.store.collection_name().to_string(),
            },
            Err(reason) => {
                error!(%reason, "could not read collection info");
                CollectionInfo::default()
            }
        }
    }
}
