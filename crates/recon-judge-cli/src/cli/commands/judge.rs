use std::sync::Arc;

use chrono::Utc;
use recon_judge_core::{
    aggregate, render_aggregate, run_batch, BatchSummary, GeminiClient, InputLoader, JudgeConfig,
    JudgeError, JudgeService, OutputStore,
};

use super::super::args::JudgeArgs;
use crate::exit_codes::{EXIT_RUN_FAILED, EXIT_SUCCESS};

pub async fn run(args: JudgeArgs) -> anyhow::Result<i32> {
    match judge(args).await {
        Ok(code) => Ok(code),
        Err(e) => {
            eprintln!("error: {}", e);
            Ok(e.exit_code())
        }
    }
}

async fn judge(args: JudgeArgs) -> Result<i32, JudgeError> {
    let config = match &args.config {
        Some(path) => JudgeConfig::load(path)?,
        None => JudgeConfig::from_env(),
    };
    // Credential problems surface before any document is read.
    let client = Arc::new(GeminiClient::new(&config)?);
    let service = JudgeService::new(client).with_unmatched_policy(config.unmatched_claims);

    let loader = InputLoader::new(&args.claims_dir, &args.reconstruction_dir);
    let doc_ids = if args.all {
        loader.available_doc_ids().await?
    } else {
        args.doc_id.clone()
    };

    let store = OutputStore::new(&args.output);
    store.ensure_dir().await?;

    eprintln!("Reconstructions: {}", args.reconstruction_dir.display());
    eprintln!("Claims:          {}", args.claims_dir.display());
    eprintln!("Output:          {}", args.output.display());
    eprintln!("Documents:       {}", doc_ids.len());

    let summary = run_batch(&service, &loader, &doc_ids, &store).await?;

    if !summary.outputs.is_empty() {
        store.write_jsonl(&summary.outputs).await?;
        let stats = aggregate(&summary.outputs);
        store
            .write_aggregate(&stats, &render_aggregate(&stats, Utc::now()))
            .await?;
        print_summary(&summary, &stats);
    }

    for failure in &summary.failures {
        eprintln!("  failed {}: {}", failure.doc_id, failure.error);
    }

    if summary.all_failed() {
        eprintln!("error: all {} document(s) failed", summary.failures.len());
        return Ok(EXIT_RUN_FAILED);
    }
    Ok(EXIT_SUCCESS)
}

fn print_summary(summary: &BatchSummary, stats: &recon_judge_core::AggregateStats) {
    let o = &stats.overall;
    println!("Evaluated:               {} document(s)", summary.outputs.len());
    println!("Failed:                  {}", summary.failures.len());
    println!("Total claims:            {}", stats.total_claims);
    println!("Overall avg score:       {:.2}/10", o.average_score);
    println!("Weighted avg score:      {:.2}/10", o.weighted_average_score);
    println!("Fully reconstructed:     {:.1}%", o.pct_fully_reconstructed);
    println!("Partially reconstructed: {:.1}%", o.pct_partially_reconstructed);
    println!("Not reconstructed:       {:.1}%", o.pct_not_reconstructed);
    println!("Total tokens:            {}", summary.total_tokens);
    println!("Total cost:              ${:.4}", summary.total_cost_usd);
}
