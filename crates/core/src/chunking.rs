use crate::models::{ChunkMetadata, ChunkRecord, FileStats, IngestionOptions};
use sha2::{Digest, Sha256};
use std::path::Path;

#[derive(Debug, Clone, Copy)]
pub struct ChunkingConfig {
    pub chunk_chars: usize,
    pub overlap_chars: usize,
}

impl From<IngestionOptions> for ChunkingConfig {
    fn from(value: IngestionOptions) -> Self {
        Self {
            chunk_chars: value.chunk_chars,
            overlap_chars: value.overlap_chars,
        }
    }
}

/// Splits text into fixed-size character windows with overlap.
///
/// Text at or below the window size comes back as a single unchanged
/// chunk. Otherwise windows advance by `chunk_chars - overlap_chars`,
/// clamped to at least one character so an overlap at or above the
/// window size cannot stall the walk. The final window may run short;
/// no padding is applied. Indexing is by char, so multi-byte code
/// points are never split.
pub fn split_text(text: &str, config: ChunkingConfig) -> Vec<String> {
    let window = config.chunk_chars.max(1);
    let chars: Vec<char> = text.chars().collect();

    if chars.len() <= window {
        return vec![text.to_string()];
    }

    let advance = window.saturating_sub(config.overlap_chars).max(1);
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = (start + window).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        start += advance;
    }

    chunks
}

/// Hash of the source path, not the content: re-ingesting a modified
/// file reuses the same identifiers, overwriting its chunks in place.
/// If the new pass yields fewer chunks than before, the trailing ids
/// from the earlier pass stay behind in the store.
pub fn file_identifier(path: &Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.to_string_lossy().as_bytes());
    format!("{:x}", hasher.finalize())
}

pub fn chunk_identifier(file_id: &str, ordinal: usize) -> String {
    format!("{file_id}_chunk_{ordinal}")
}

/// Builds one record per non-blank chunk of the cleaned text.
///
/// Blank chunks are dropped but keep their ordinal: identifiers and
/// `chunk_index` always reflect the position in the full split, and
/// `total_chunks` counts the full split too.
pub fn build_chunk_records(
    path: &Path,
    cleaned_text: &str,
    stats: FileStats,
    options: IngestionOptions,
) -> Vec<ChunkRecord> {
    let file_id = file_identifier(path);
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    let file_type = path
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default();

    let chunks = split_text(cleaned_text, ChunkingConfig::from(options));
    let total_chunks = chunks.len();

    chunks
        .into_iter()
        .enumerate()
        .filter(|(_, chunk)| !chunk.trim().is_empty())
        .map(|(ordinal, chunk)| ChunkRecord {
            chunk_id: chunk_identifier(&file_id, ordinal),
            text: chunk,
            metadata: ChunkMetadata {
                file_path: path.to_string_lossy().to_string(),
                file_name: file_name.clone(),
                file_type: file_type.clone(),
                chunk_index: ordinal,
                total_chunks,
                file_size: stats.file_size,
                created_at: stats.created_at,
                modified_at: stats.modified_at,
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(chunk_chars: usize, overlap_chars: usize) -> ChunkingConfig {
        ChunkingConfig {
            chunk_chars,
            overlap_chars,
        }
    }

    #[test]
    fn short_text_is_a_single_unchanged_chunk() {
        let text = "a".repeat(1_000);
        let chunks = split_text(&text, config(1_000, 200));
        assert_eq!(chunks, vec![text]);
    }

    #[test]
    fn windows_advance_by_size_minus_overlap() {
        let text: String = ('a'..='z').cycle().take(1_500).collect();
        let chunks = split_text(&text, config(1_000, 200));

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), 1_000);
        assert_eq!(chunks[1].chars().count(), 700);

        let tail_of_first: String = chunks[0].chars().skip(800).collect();
        let head_of_second: String = chunks[1].chars().take(200).collect();
        assert_eq!(tail_of_first, head_of_second);
    }

    #[test]
    fn overlap_at_or_above_window_still_terminates() {
        let text = "x".repeat(50);
        let chunks = split_text(&text, config(10, 10));
        // advance floor of one char: one window starting at every offset
        assert_eq!(chunks.len(), 50);
        assert_eq!(chunks[0].len(), 10);
        assert_eq!(chunks[49].len(), 1);

        let runaway = split_text(&text, config(10, 25));
        assert_eq!(runaway.len(), 50);
    }

    #[test]
    fn splitting_never_breaks_code_points() {
        let text = "停机时间分析".repeat(300);
        let chunks = split_text(&text, config(1_000, 200));
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 1_000);
        }
    }

    #[test]
    fn identifiers_are_deterministic_for_a_path() {
        let path = Path::new("/data/docs/report.txt");
        let stats = FileStats::default();
        let options = IngestionOptions::default();

        let first = build_chunk_records(path, "some cleaned text", stats, options);
        let second = build_chunk_records(path, "some cleaned text", stats, options);

        assert_eq!(first.len(), 1);
        assert_eq!(first[0].chunk_id, second[0].chunk_id);
        assert!(first[0].chunk_id.ends_with("_chunk_0"));
    }

    #[test]
    fn different_paths_get_different_identifiers() {
        let stats = FileStats::default();
        let options = IngestionOptions::default();
        let left = build_chunk_records(Path::new("/a.txt"), "text", stats, options);
        let right = build_chunk_records(Path::new("/b.txt"), "text", stats, options);
        assert_ne!(left[0].chunk_id, right[0].chunk_id);
    }

    #[test]
    fn records_carry_file_metadata_and_chunk_counts() {
        let text: String = "word ".repeat(500);
        let options = IngestionOptions {
            chunk_chars: 1_000,
            overlap_chars: 200,
        };
        let stats = FileStats {
            file_size: 2_500,
            created_at: None,
            modified_at: None,
        };

        let records = build_chunk_records(Path::new("/docs/notes.TXT"), &text, stats, options);

        assert!(records.len() > 1);
        let total = records[0].metadata.total_chunks;
        for (index, record) in records.iter().enumerate() {
            assert_eq!(record.metadata.chunk_index, index);
            assert_eq!(record.metadata.total_chunks, total);
            assert_eq!(record.metadata.file_name, "notes.TXT");
            assert_eq!(record.metadata.file_type, ".txt");
            assert_eq!(record.metadata.file_size, 2_500);
        }
    }

    #[test]
    fn blank_chunks_are_dropped() {
        let records = build_chunk_records(
            Path::new("/docs/empty.txt"),
            "   ",
            FileStats::default(),
            IngestionOptions::default(),
        );
        assert!(records.is_empty());
    }
}
