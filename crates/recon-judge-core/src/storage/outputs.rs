use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, warn};

use super::{json_stems, write_atomic};
use crate::error::{JudgeError, JudgeResult};
use crate::model::{AggregateStats, JudgeOutput};

pub const EVALUATIONS_FILE: &str = "evaluations.jsonl";
pub const AGGREGATE_STATS_FILE: &str = "aggregate-stats.json";
pub const AGGREGATE_REPORT_FILE: &str = "aggregate-report.md";

/// Writes and reads judge outputs under one directory.
#[derive(Debug, Clone)]
pub struct OutputStore {
    dir: PathBuf,
}

impl OutputStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn ensure_dir(&self) -> JudgeResult<()> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| JudgeError::io(&self.dir, e))
    }

    /// Write `<doc_id>.json` and `<doc_id>.md`.
    pub async fn write_document(&self, output: &JudgeOutput, report_md: &str) -> JudgeResult<()> {
        let json_path = self.dir.join(format!("{}.json", output.doc_id));
        write_atomic(&json_path, &to_pretty(output, &json_path)?).await?;

        let md_path = self.dir.join(format!("{}.md", output.doc_id));
        write_atomic(&md_path, report_md).await?;

        debug!(doc_id = %output.doc_id, "saved judgment");
        Ok(())
    }

    /// Write every output as one JSON line, replacing any previous log.
    pub async fn write_jsonl(&self, outputs: &[JudgeOutput]) -> JudgeResult<PathBuf> {
        let path = self.dir.join(EVALUATIONS_FILE);
        let mut content = String::new();
        for output in outputs {
            let line = serde_json::to_string(output).map_err(|e| {
                JudgeError::io(&path, std::io::Error::new(std::io::ErrorKind::InvalidData, e))
            })?;
            content.push_str(&line);
            content.push('\n');
        }
        write_atomic(&path, &content).await?;
        Ok(path)
    }

    pub async fn write_aggregate(
        &self,
        stats: &AggregateStats,
        report_md: &str,
    ) -> JudgeResult<(PathBuf, PathBuf)> {
        let stats_path = self.dir.join(AGGREGATE_STATS_FILE);
        write_atomic(&stats_path, &to_pretty(stats, &stats_path)?).await?;

        let report_path = self.dir.join(AGGREGATE_REPORT_FILE);
        write_atomic(&report_path, report_md).await?;

        Ok((stats_path, report_path))
    }

    /// Load every stored judgment, sorted by document id. Files that do not
    /// parse as judgments are skipped with a warning.
    pub async fn load_judge_outputs(&self) -> JudgeResult<Vec<JudgeOutput>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut outputs = Vec::new();
        for stem in json_stems(&self.dir, &[AGGREGATE_STATS_FILE]).await? {
            let path = self.dir.join(format!("{}.json", stem));
            let content = match fs::read_to_string(&path).await {
                Ok(c) => c,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable output");
                    continue;
                }
            };
            match serde_json::from_str::<JudgeOutput>(&content) {
                Ok(output) => outputs.push(output),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping file that is not a judgment");
                }
            }
        }
        Ok(outputs)
    }

    /// Read back the combined log written by `write_jsonl`.
    pub async fn load_jsonl(&self) -> JudgeResult<Vec<JudgeOutput>> {
        let path = self.dir.join(EVALUATIONS_FILE);
        let content = fs::read_to_string(&path)
            .await
            .map_err(|e| JudgeError::io(&path, e))?;

        content
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| {
                serde_json::from_str(l).map_err(|e| {
                    JudgeError::io(&path, std::io::Error::new(std::io::ErrorKind::InvalidData, e))
                })
            })
            .collect()
    }
}

fn to_pretty<T: serde::Serialize>(value: &T, path: &Path) -> JudgeResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| JudgeError::io(path, std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}
