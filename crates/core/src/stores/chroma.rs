use crate::error::StoreError;
use crate::models::{ChunkRecord, SearchHit};
use crate::traits::VectorStore;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use url::Url;
use uuid::Uuid;

/// Client for a Chroma-compatible HTTP server. The collection is
/// resolved once at connect time and addressed by its id afterwards.
pub struct ChromaStore {
    client: Client,
    base_url: String,
    collection_id: Uuid,
    collection_name: String,
}

impl ChromaStore {
    /// Resolves (or creates) the named collection. This is the only
    /// store operation whose failure is meant to abort startup.
    pub async fn connect(
        base_url: impl Into<String>,
        collection_name: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let base_url = base_url.into();
        let collection_name = collection_name.into();
        Url::parse(&base_url)?;

        let client = Client::new();
        let base_url = base_url.trim_end_matches('/').to_string();

        let response = client
            .post(format!("{}/api/v1/collections", base_url))
            .json(&json!({
                "name": collection_name,
                "get_or_create": true,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::BackendResponse {
                backend: "chroma".to_string(),
                details: response.status().to_string(),
            });
        }

        let parsed: Value = response.json().await?;
        let collection_id = parsed
            .pointer("/id")
            .and_then(Value::as_str)
            .and_then(|id| Uuid::parse_str(id).ok())
            .ok_or_else(|| StoreError::BackendResponse {
                backend: "chroma".to_string(),
                details: "collection response has no id".to_string(),
            })?;

        Ok(Self {
            client,
            base_url,
            collection_id,
            collection_name,
        })
    }

    fn collection_url(&self, suffix: &str) -> String {
        format!(
            "{}/api/v1/collections/{}/{}",
            self.base_url, self.collection_id, suffix
        )
    }
}

#[async_trait]
impl VectorStore for ChromaStore {
    async fn add_records(
        &self,
        records: &[ChunkRecord],
        embeddings: &[Vec<f32>],
    ) -> Result<(), StoreError> {
        if records.is_empty() {
            return Ok(());
        }

        if records.len() != embeddings.len() {
            return Err(StoreError::Request(format!(
                "embedding count {} doesn't match record count {}",
                embeddings.len(),
                records.len()
            )));
        }

        let payload = add_payload(records, embeddings)?;
        let response = self
            .client
            .post(self.collection_url("add"))
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::BackendResponse {
                backend: "chroma".to_string(),
                details: response.status().to_string(),
            });
        }

        Ok(())
    }

    async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<SearchHit>, StoreError> {
        let response = self
            .client
            .post(self.collection_url("query"))
            .json(&json!({
                "query_embeddings": [embedding],
                "n_results": top_k,
                "include": ["documents", "metadatas", "distances"],
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::BackendResponse {
                backend: "chroma".to_string(),
                details: response.status().to_string(),
            });
        }

        let parsed: Value = response.json().await?;
        Ok(parse_query_response(&parsed))
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let response = self
            .client
            .get(self.collection_url("count"))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::BackendResponse {
                backend: "chroma".to_string(),
                details: response.status().to_string(),
            });
        }

        let parsed: Value = response.json().await?;
        parsed.as_u64().ok_or_else(|| StoreError::BackendResponse {
            backend: "chroma".to_string(),
            details: "count response is not an integer".to_string(),
        })
    }

    fn collection_name(&self) -> &str {
        &self.collection_name
    }
}

/// Builds the parallel-array add body: ids, embeddings, documents and
/// metadatas all indexed the same way.
fn add_payload(records: &[ChunkRecord], embeddings: &[Vec<f32>]) -> Result<Value, StoreError> {
    let ids: Vec<&str> = records.iter().map(|record| record.chunk_id.as_str()).collect();
    let documents: Vec<&str> = records.iter().map(|record| record.text.as_str()).collect();
    let metadatas = records
        .iter()
        .map(|record| serde_json::to_value(&record.metadata))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(json!({
        "ids": ids,
        "embeddings": embeddings,
        "documents": documents,
        "metadatas": metadatas,
    }))
}

/// Unpacks the lists-of-lists query response. Everything is keyed by
/// query index; this client always sends exactly one query, so only
/// row zero is read. Missing or ragged rows degrade to empty hits.
fn parse_query_response(parsed: &Value) -> Vec<SearchHit> {
    let documents = parsed
        .pointer("/documents/0")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    let metadatas = parsed
        .pointer("/metadatas/0")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    let distances = parsed
        .pointer("/distances/0")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    documents
        .iter()
        .enumerate()
        .map(|(index, document)| SearchHit {
            text: document.as_str().unwrap_or_default().to_string(),
            metadata: metadatas.get(index).cloned().unwrap_or(Value::Null),
            distance: distances.get(index).and_then(Value::as_f64),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{add_payload, parse_query_response};
    use crate::models::{ChunkMetadata, ChunkRecord};
    use serde_json::json;

    fn record(id: &str, text: &str) -> ChunkRecord {
        ChunkRecord {
            chunk_id: id.to_string(),
            text: text.to_string(),
            metadata: ChunkMetadata {
                file_path: "/docs/a.txt".to_string(),
                file_name: "a.txt".to_string(),
                file_type: ".txt".to_string(),
                chunk_index: 0,
                total_chunks: 1,
                file_size: 12,
                created_at: None,
                modified_at: None,
            },
        }
    }

    #[test]
    fn add_payload_keeps_arrays_parallel() {
        let records = vec![record("id-0", "first"), record("id-1", "second")];
        let embeddings = vec![vec![0.1, 0.2], vec![0.3, 0.4]];

        let payload = add_payload(&records, &embeddings).expect("payload builds");

        assert_eq!(payload["ids"], json!(["id-0", "id-1"]));
        assert_eq!(payload["documents"], json!(["first", "second"]));
        assert_eq!(payload["embeddings"][1][0], json!(0.3f32));
        assert_eq!(payload["metadatas"][0]["file_name"], json!("a.txt"));
        assert_eq!(payload["metadatas"][1]["chunk_index"], json!(0));
    }

    #[test]
    fn query_response_rows_become_hits_in_order() {
        let response = json!({
            "documents": [["closest text", "farther text"]],
            "metadatas": [[{"file_name": "a.txt"}, {"file_name": "b.txt"}]],
            "distances": [[0.12, 0.57]],
        });

        let hits = parse_query_response(&response);

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].text, "closest text");
        assert_eq!(hits[0].metadata["file_name"], json!("a.txt"));
        assert_eq!(hits[0].distance, Some(0.12));
        assert_eq!(hits[1].distance, Some(0.57));
    }

    #[test]
    fn query_response_without_distances_still_parses() {
        let response = json!({
            "documents": [["only text"]],
            "metadatas": [[{"file_name": "a.txt"}]],
        });

        let hits = parse_query_response(&response);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].distance, None);
    }

    #[test]
    fn empty_query_response_yields_no_hits() {
        let response = json!({
            "documents": [[]],
            "metadatas": [[]],
            "distances": [[]],
        });
        assert!(parse_query_response(&response).is_empty());
    }
}
