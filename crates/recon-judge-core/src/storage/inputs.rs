use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tokio::fs;
use tracing::debug;

use super::json_stems;
use crate::error::{InputKind, JudgeError, JudgeResult};
use crate::model::{ClaimsRecord, ReconstructionRecord};

/// Reads upstream records by document id.
#[derive(Debug, Clone)]
pub struct InputLoader {
    claims_dir: PathBuf,
    reconstruction_dir: PathBuf,
}

impl InputLoader {
    pub fn new(claims_dir: impl Into<PathBuf>, reconstruction_dir: impl Into<PathBuf>) -> Self {
        Self {
            claims_dir: claims_dir.into(),
            reconstruction_dir: reconstruction_dir.into(),
        }
    }

    pub fn claims_dir(&self) -> &Path {
        &self.claims_dir
    }

    pub fn reconstruction_dir(&self) -> &Path {
        &self.reconstruction_dir
    }

    pub async fn load_claims(&self, doc_id: &str) -> JudgeResult<ClaimsRecord> {
        let path = self.claims_dir.join(format!("{}.json", doc_id));
        let record: ClaimsRecord = read_record(doc_id, InputKind::Claims, &path).await?;
        debug!(doc_id, claims = record.claims.len(), "loaded claims");
        Ok(record)
    }

    pub async fn load_reconstruction(&self, doc_id: &str) -> JudgeResult<ReconstructionRecord> {
        let path = self.reconstruction_dir.join(format!("{}.json", doc_id));
        let record: ReconstructionRecord =
            read_record(doc_id, InputKind::Reconstruction, &path).await?;
        debug!(
            doc_id,
            answers = record.answered_questions.len(),
            "loaded reconstruction"
        );
        Ok(record)
    }

    /// Every document with a reconstruction on disk, sorted by id.
    pub async fn available_doc_ids(&self) -> JudgeResult<Vec<String>> {
        json_stems(&self.reconstruction_dir, &[]).await
    }
}

async fn read_record<T: DeserializeOwned>(
    doc_id: &str,
    kind: InputKind,
    path: &Path,
) -> JudgeResult<T> {
    let content = match fs::read_to_string(path).await {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(JudgeError::InputNotFound {
                doc_id: doc_id.to_string(),
                kind,
                path: path.to_path_buf(),
            })
        }
        Err(e) => {
            return Err(JudgeError::InvalidInput {
                kind,
                path: path.to_path_buf(),
                message: e.to_string(),
            })
        }
    };

    serde_json::from_str(&content).map_err(|e| JudgeError::InvalidInput {
        kind,
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
