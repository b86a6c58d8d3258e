//! File-system layout for inputs and outputs.
//!
//! ```text
//! <claims-dir>/<doc_id>.json           claims record
//! <reconstruction-dir>/<doc_id>.json   reconstruction record
//! <output>/<doc_id>.json               judgment
//! <output>/<doc_id>.md                 judgment report
//! <output>/evaluations.jsonl           judgments of one run, one per line
//! <output>/aggregate-stats.json
//! <output>/aggregate-report.md
//! ```

mod inputs;
mod outputs;

pub use inputs::InputLoader;
pub use outputs::{OutputStore, AGGREGATE_REPORT_FILE, AGGREGATE_STATS_FILE, EVALUATIONS_FILE};

use std::ffi::OsStr;
use std::path::Path;

use tokio::fs;

use crate::error::{JudgeError, JudgeResult};

/// Sorted stems of `*.json` files directly under `dir`, minus `exclude`.
pub(crate) async fn json_stems(dir: &Path, exclude: &[&str]) -> JudgeResult<Vec<String>> {
    let mut entries = fs::read_dir(dir)
        .await
        .map_err(|e| JudgeError::io(dir, e))?;

    let mut stems = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| JudgeError::io(dir, e))?
    {
        let path = entry.path();
        if path.extension() != Some(OsStr::new("json")) {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if exclude.contains(&name.as_str()) {
            continue;
        }
        if let Some(stem) = path.file_stem() {
            stems.push(stem.to_string_lossy().to_string());
        }
    }

    stems.sort();
    Ok(stems)
}

pub(crate) async fn write_atomic(path: &Path, content: &str) -> JudgeResult<()> {
    let temp_path = path.with_extension("tmp");

    fs::write(&temp_path, content)
        .await
        .map_err(|e| JudgeError::io(&temp_path, e))?;

    fs::rename(&temp_path, path)
        .await
        .map_err(|e| JudgeError::io(path, e))
}
