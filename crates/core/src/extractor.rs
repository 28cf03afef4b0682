use crate::error::IngestError;
use lopdf::Document;
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;
use tracing::{error, warn};

/// Upper bound on external extraction subprocesses.
const SUBPROCESS_TIMEOUT: Duration = Duration::from_secs(30);

const OCR_LANGUAGES: &str = "chi_sim+eng";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Text,
    Pdf,
    Docx,
    Image,
}

impl FileKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "txt" => Some(Self::Text),
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "jpg" | "jpeg" | "png" | "bmp" | "tiff" | "gif" => Some(Self::Image),
            _ => None,
        }
    }
}

/// Extracts raw text for a file of a known kind.
///
/// Missing optional tooling and broken documents come back as a
/// diagnostic placeholder string that flows through the pipeline as
/// ordinary text; only an unreadable plain-text file surfaces an error.
pub async fn extract_text(path: &Path, kind: FileKind) -> Result<String, IngestError> {
    match kind {
        FileKind::Text => extract_plain_text(path).await,
        FileKind::Pdf => Ok(extract_pdf(path).await),
        FileKind::Docx => Ok(extract_docx(path)),
        FileKind::Image => Ok(extract_image(path).await),
    }
}

async fn extract_plain_text(path: &Path) -> Result<String, IngestError> {
    let bytes = tokio::fs::read(path).await?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(invalid) => {
            warn!(path = %path.display(), "text file is not valid utf-8, decoding lossily");
            Ok(String::from_utf8_lossy(invalid.as_bytes()).to_string())
        }
    }
}

async fn extract_pdf(path: &Path) -> String {
    if let Some(text) = pdf_via_pdftotext(path).await {
        return text;
    }

    if let Some(text) = pdf_via_lopdf(path) {
        return text;
    }

    error!(path = %path.display(), "pdf text extraction failed on every strategy");
    format!("[PDF file: {} - text extraction failed]", file_label(path))
}

#[derive(Debug)]
enum Capture {
    Completed(std::process::Output),
    Failed(std::io::Error),
    TimedOut,
}

/// Runs a command with a hard time bound. `kill_on_drop` makes sure a
/// child that outlives the timeout is reaped instead of leaking.
async fn capture_with_timeout(mut command: Command, limit: Duration) -> Capture {
    command.kill_on_drop(true);

    match tokio::time::timeout(limit, command.output()).await {
        Ok(Ok(output)) => Capture::Completed(output),
        Ok(Err(error)) => Capture::Failed(error),
        Err(_) => Capture::TimedOut,
    }
}

async fn pdf_via_pdftotext(path: &Path) -> Option<String> {
    let mut command = Command::new("pdftotext");
    command.arg(path).arg("-");

    match capture_with_timeout(command, SUBPROCESS_TIMEOUT).await {
        Capture::Completed(output) if output.status.success() => {
            let text = String::from_utf8_lossy(&output.stdout).to_string();
            if text.trim().is_empty() {
                None
            } else {
                Some(text)
            }
        }
        Capture::Completed(output) => {
            warn!(
                path = %path.display(),
                status = %output.status,
                "pdftotext failed, falling back to in-process parser"
            );
            None
        }
        Capture::Failed(error) => {
            warn!(
                path = %path.display(),
                %error,
                "pdftotext unavailable, falling back to in-process parser"
            );
            None
        }
        Capture::TimedOut => {
            warn!(path = %path.display(), "pdftotext timed out, falling back to in-process parser");
            None
        }
    }
}

fn pdf_via_lopdf(path: &Path) -> Option<String> {
    let document = Document::load(path).ok()?;
    let mut text = String::new();

    for (page_no, _page_id) in document.get_pages() {
        if let Ok(page_text) = document.extract_text(&[page_no]) {
            text.push_str(&page_text);
            text.push('\n');
        }
    }

    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

fn extract_docx(path: &Path) -> String {
    match read_docx_document_xml(path) {
        Ok(xml) => {
            let text = docx_xml_to_text(&xml);
            if text.trim().is_empty() {
                format!("[DOCX file: {} - no text detected]", file_label(path))
            } else {
                text
            }
        }
        Err(error) => {
            error!(path = %path.display(), %error, "docx extraction failed");
            format!("[DOCX file: {} - processing failed]", file_label(path))
        }
    }
}

fn read_docx_document_xml(path: &Path) -> Result<String, IngestError> {
    let file = std::fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|error| IngestError::ExtractionFailed(error.to_string()))?;
    let mut entry = archive
        .by_name("word/document.xml")
        .map_err(|error| IngestError::ExtractionFailed(error.to_string()))?;

    let mut xml = String::new();
    entry.read_to_string(&mut xml)?;
    Ok(xml)
}

static DOCX_TEXT_RUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<w:t(?:\s[^>]*)?>(.*?)</w:t>").expect("docx text-run pattern compiles")
});

/// Scrapes the visible text runs out of a `word/document.xml` payload,
/// one line per `<w:p>` paragraph.
fn docx_xml_to_text(xml: &str) -> String {
    let mut paragraphs = Vec::new();

    for paragraph in xml.split("</w:p>") {
        let runs: String = DOCX_TEXT_RUN
            .captures_iter(paragraph)
            .map(|capture| decode_xml_entities(&capture[1]))
            .collect();

        if !runs.trim().is_empty() {
            paragraphs.push(runs);
        }
    }

    paragraphs.join("\n")
}

fn decode_xml_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

async fn extract_image(path: &Path) -> String {
    let mut command = Command::new("tesseract");
    command.arg(path).arg("stdout").arg("-l").arg(OCR_LANGUAGES);

    match capture_with_timeout(command, SUBPROCESS_TIMEOUT).await {
        Capture::Completed(output) if output.status.success() => {
            let text = String::from_utf8_lossy(&output.stdout).to_string();
            if text.trim().is_empty() {
                format!("[Image file: {} - no text detected]", file_label(path))
            } else {
                text
            }
        }
        Capture::Completed(output) => {
            error!(path = %path.display(), status = %output.status, "tesseract failed");
            format!("[Image file: {} - processing failed]", file_label(path))
        }
        Capture::Failed(error) => {
            warn!(path = %path.display(), %error, "tesseract unavailable");
            format!(
                "[Image file: {} - requires the tesseract OCR tool]",
                file_label(path)
            )
        }
        Capture::TimedOut => {
            error!(path = %path.display(), "tesseract timed out");
            format!("[Image file: {} - processing failed]", file_label(path))
        }
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}
