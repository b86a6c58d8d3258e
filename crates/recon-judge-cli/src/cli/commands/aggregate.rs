use chrono::Utc;
use recon_judge_core::{aggregate, render_aggregate, OutputStore};

use super::super::args::AggregateArgs;
use crate::exit_codes::{EXIT_RUN_FAILED, EXIT_SUCCESS};

pub async fn run(args: AggregateArgs) -> anyhow::Result<i32> {
    let store = OutputStore::new(&args.output);
    let outputs = match store.load_judge_outputs().await {
        Ok(o) => o,
        Err(e) => {
            eprintln!("error: {}", e);
            return Ok(e.exit_code());
        }
    };

    if outputs.is_empty() {
        eprintln!(
            "error: nothing to aggregate: no judgments found in {}",
            args.output.display()
        );
        return Ok(EXIT_RUN_FAILED);
    }

    let stats = aggregate(&outputs);
    let (stats_path, report_path) = match store
        .write_aggregate(&stats, &render_aggregate(&stats, Utc::now()))
        .await
    {
        Ok(paths) => paths,
        Err(e) => {
            eprintln!("error: {}", e);
            return Ok(e.exit_code());
        }
    };

    println!("Aggregated {} document(s)", outputs.len());
    println!("  - {}", stats_path.display());
    println!("  - {}", report_path.display());
    Ok(EXIT_SUCCESS)
}
