use crate::chunking::build_chunk_records;
use crate::cleaning::clean_text;
use crate::error::IngestError;
use crate::extractor::{extract_text, FileKind};
use crate::models::{ChunkRecord, FileStats, IngestionOptions};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::warn;
use walkdir::WalkDir;

pub const SUPPORTED_EXTENSIONS: [&str; 9] = [
    "txt", "pdf", "docx", "jpg", "jpeg", "png", "bmp", "tiff", "gif",
];

/// Recursively finds every file with a supported extension
/// (case-insensitive), in deterministic sorted order.
pub fn discover_supported_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for item in WalkDir::new(root) {
        let entry = match item {
            Ok(entry) => entry,
            Err(error) => {
                warn!(%error, "directory walk error, skipping entry");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let supported = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                SUPPORTED_EXTENSIONS
                    .iter()
                    .any(|candidate| ext.eq_ignore_ascii_case(candidate))
            });

        if supported {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort_unstable();
    files
}

/// Best-effort stat: a failure yields the zeroed default, never an
/// error, mirroring how little the rest of the pipeline depends on it.
pub fn file_stats(path: &Path) -> FileStats {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(error) => {
            warn!(path = %path.display(), %error, "could not stat file");
            return FileStats::default();
        }
    };

    FileStats {
        file_size: metadata.len(),
        created_at: metadata.created().ok().map(to_utc),
        modified_at: metadata.modified().ok().map(to_utc),
    }
}

fn to_utc(time: SystemTime) -> DateTime<Utc> {
    DateTime::<Utc>::from(time)
}

/// Runs one file through extract → clean → chunk → assemble.
///
/// Unsupported extensions and files with no extractable text come back
/// as an empty vec with a logged notice; only a hard extraction error
/// (unreadable plain-text file, nameless path) surfaces as `Err` for
/// the caller to record as a skip.
pub async fn process_file(
    path: &Path,
    options: IngestionOptions,
) -> Result<Vec<ChunkRecord>, IngestError> {
    if path.file_name().is_none() {
        return Err(IngestError::MissingFileName(
            path.to_string_lossy().to_string(),
        ));
    }

    let Some(kind) = FileKind::from_path(path) else {
        warn!(path = %path.display(), "unsupported file type, skipping");
        return Ok(Vec::new());
    };

    let raw_text = extract_text(path, kind).await?;
    let cleaned = clean_text(&raw_text);

    if cleaned.is_empty() {
        warn!(path = %path.display(), "no text extracted, skipping");
        return Ok(Vec::new());
    }

    let stats = file_stats(path);
    Ok(build_chunk_records(path, &cleaned, stats, options))
}

#[derive(Debug)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct IngestionReport {
    pub files_processed: usize,
    pub chunks_ingested: usize,
    pub skipped: Vec<SkippedFile>,
}

#[cfg(test)]
mod tests {
    use super::{discover_supported_files, file_stats, process_file};
    use crate::models::IngestionOptions;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    #[test]
    fn discovery_is_recursive_and_sorted() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let base = dir.path();
        let nested = base.join("nested");
        fs::create_dir(&nested)?;

        fs::write(base.join("b.txt"), "beta")?;
        fs::write(nested.join("a.txt"), "alpha")?;
        fs::write(base.join("photo.JPG"), [0u8; 4])?;

        let files = discover_supported_files(base);
        assert_eq!(files.len(), 3);
        assert!(files.windows(2).all(|pair| pair[0] < pair[1]));
        Ok(())
    }

    #[test]
    fn discovery_skips_unsupported_extensions() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::write(dir.path().join("notes.md"), "markdown")?;
        fs::write(dir.path().join("archive.tar"), "tar")?;
        fs::write(dir.path().join("real.txt"), "text")?;

        let files = discover_supported_files(dir.path());
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("real.txt"));
        Ok(())
    }

    #[test]
    #[cfg(unix)]
    fn discovery_continues_past_unreadable_subdirectories() -> Result<(), Box<dyn std::error::Error>>
    {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir()?;
        let base = dir.path();
        let locked = base.join("locked");
        fs::create_dir(&locked)?;
        fs::write(locked.join("hidden.txt"), "unreachable")?;
        fs::write(base.join("visible.txt"), "reachable")?;

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000))?;
        let files = discover_supported_files(base);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755))?;

        // processes running as root can still read the locked directory;
        // either way the accessible file must survive the walk
        assert!(files.iter().any(|path| path.ends_with("visible.txt")));
        Ok(())
    }

    #[test]
    fn stats_on_missing_file_are_zeroed() {
        let stats = file_stats(Path::new("/definitely/not/here.txt"));
        assert_eq!(stats.file_size, 0);
        assert!(stats.created_at.is_none());
        assert!(stats.modified_at.is_none());
    }

    #[tokio::test]
    async fn text_file_becomes_chunk_records() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("report.txt");
        fs::write(&path, "Downtime   analysis for the   coil line.\n")?;

        let records = process_file(&path, IngestionOptions::default()).await?;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "Downtime analysis for the coil line.");
        assert_eq!(records[0].metadata.file_type, ".txt");
        assert_eq!(records[0].metadata.total_chunks, 1);
        assert!(records[0].metadata.file_size > 0);
        assert!(records[0].chunk_id.ends_with("_chunk_0"));
        Ok(())
    }

    #[tokio::test]
    async fn unsupported_file_yields_no_records() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("notes.md");
        fs::write(&path, "markdown body")?;

        let records = process_file(&path, IngestionOptions::default()).await?;
        assert!(records.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn empty_file_yields_no_records() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("empty.txt");
        fs::write(&path, "")?;

        let records = process_file(&path, IngestionOptions::default()).await?;
        assert!(records.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn long_text_is_split_with_overlap() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("long.txt");
        let body: String = ('a'..='z').cycle().take(1_500).collect();
        fs::write(&path, &body)?;

        let records = process_file(&path, IngestionOptions::default()).await?;

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text.chars().count(), 1_000);
        assert_eq!(records[1].text.chars().count(), 700);
        assert_eq!(records[1].metadata.chunk_index, 1);
        Ok(())
    }
}
