use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Writes a small demo corpus (one English, one mixed Chinese/English
/// document) so the pipeline can be tried without real data.
pub fn seed_samples(dir: &Path) -> io::Result<Vec<PathBuf>> {
    const SAMPLES: [(&str, &str); 2] = [
        (
            "coil_line_downtime.txt",
            "Coil production line downtime study.\n\
             This study looks at downtime on the coil production line for automotive parts.\n\
             Analysis of production data shows that downtime mainly comes from equipment\n\
             failures, scheduled maintenance and operator handling.\n\
             Proposed countermeasures:\n\
             1. Regular preventive maintenance\n\
             2. Operator skill training\n\
             3. Production flow optimization\n\
             4. Spare parts inventory management\n\
             Together these measures are expected to cut downtime by more than 30 percent.\n",
        ),
        (
            "知识库介绍.txt",
            "向量知识库系统介绍。\n\
             本系统支持多种文档格式，包括文本、PDF、DOCX 和图片（OCR）。\n\
             主要功能包括：文档切分、文本清理、向量检索和结果导出。\n\
             The system splits documents into overlapping chunks and serves\n\
             semantic search over the stored embeddings.\n",
        ),
    ];

    fs::create_dir_all(dir)?;

    let mut written = Vec::new();
    for (name, content) in SAMPLES {
        let path = dir.join(name);
        fs::write(&path, content)?;
        written.push(path);
    }

    Ok(written)
}
