const DEFAULT: usize = 384;

pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = DEFAULT;

pub trait Embedder {
    fn dimensions(&self) -> usize;
    fn embed(&self, text: &str) -> Vec<f32>;

    fn embed_batch(&self, texts: &[String]) -> Vec<Vec<f32>> {
        texts.iter().map(|text| self.embed(text)).collect()
    }
}

/// Deterministic local embedding via signed feature hashing,
/// L2-normalized. Stands in for a hosted model so the pipeline stays
/// reproducible and testable offline.
///
/// Features are chosen for the mixed corpora this pipeline ingests:
/// alphanumeric runs become lowercased word tokens, CJK runs
/// contribute each ideograph plus adjacent bigrams (CJK carries
/// meaning per character, so word tokens alone would be too coarse).
/// Each feature flips the sign of its bucket from the low hash bit,
/// which keeps colliding features from only ever reinforcing each
/// other.
#[derive(Debug, Clone, Copy)]
pub struct HashedFeatureEmbedder {
    pub dimensions: usize,
}

impl Default for HashedFeatureEmbedder {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
        }
    }
}

impl Embedder for HashedFeatureEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0f32; self.dimensions.max(1)];

        for feature in text_features(text) {
            let (bucket, sign) = feature_slot(&feature, vector.len());
            vector[bucket] += sign;
        }

        let magnitude = vector.iter().map(|value| value * value).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut vector {
                *value /= magnitude;
            }
        }

        vector
    }
}

fn is_cjk(character: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&character)
}

/// Tokenizes text into hashable features: `w:` word tokens for
/// alphanumeric runs, `c:`/`b:` ideographs and bigrams for CJK runs.
/// Everything else only separates runs.
fn text_features(text: &str) -> Vec<String> {
    let mut features = Vec::new();
    let mut word = String::new();
    let mut cjk_run: Vec<char> = Vec::new();

    let flush_word = |word: &mut String, features: &mut Vec<String>| {
        if !word.is_empty() {
            features.push(format!("w:{word}"));
            word.clear();
        }
    };
    let flush_cjk = |run: &mut Vec<char>, features: &mut Vec<String>| {
        for character in run.iter() {
            features.push(format!("c:{character}"));
        }
        for pair in run.windows(2) {
            features.push(format!("b:{}{}", pair[0], pair[1]));
        }
        run.clear();
    };

    for character in text.chars() {
        if is_cjk(character) {
            flush_word(&mut word, &mut features);
            cjk_run.push(character);
        } else if character.is_alphanumeric() {
            flush_cjk(&mut cjk_run, &mut features);
            word.extend(character.to_lowercase());
        } else {
            flush_word(&mut word, &mut features);
            flush_cjk(&mut cjk_run, &mut features);
        }
    }

    flush_word(&mut word, &mut features);
    flush_cjk(&mut cjk_run, &mut features);
    features
}

/// djb2-style hash; high bits pick the bucket, the low bit the sign.
fn feature_slot(feature: &str, dimensions: usize) -> (usize, f32) {
    let mut hash: u64 = 5381;
    for byte in feature.bytes() {
        hash = hash.wrapping_mul(33) ^ u64::from(byte);
    }

    let bucket = ((hash >> 1) % dimensions as u64) as usize;
    let sign = if hash & 1 == 0 { 1.0 } else { -1.0 };
    (bucket, sign)
}
