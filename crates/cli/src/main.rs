mod synthetic;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use review_core::Review;
use review_engine::{ReviewAnalyzer, ReviewService};
use review_ml::ModelStack;
use review_observability::{init_tracing, AppMetrics};
use review_storage::{
    read_records, write_results_csv, write_reviews_csv, write_reviews_jsonl, InputFormat, Store,
};
use serde_json::json;

use crate::synthetic::{generate_reviews, DEFAULT_HOTEL_ID, DEFAULT_REVIEW_COUNT};

#[derive(Debug, Parser)]
#[command(name = "review-moderator")]
#[command(about = "Hotel review moderation CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Analyze a single review text without persisting it.
    Analyze {
        #[arg(long)]
        text: String,
        #[arg(long, default_value = DEFAULT_HOTEL_ID)]
        hotel_id: String,
        #[arg(long, default_value_t = 3)]
        rating: i32,
    },
    /// Moderate a file of reviews and persist the results.
    Batch {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value = "jsonl")]
        format: String,
        #[arg(long)]
        hotel_id: String,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Decision and sentiment counts for a hotel. Needs REVIEW_DATABASE_URL to see earlier runs.
    Summary {
        #[arg(long)]
        hotel_id: String,
    },
    /// Write a synthetic review corpus as JSONL and CSV.
    Generate {
        #[arg(long, default_value_t = DEFAULT_REVIEW_COUNT)]
        count: usize,
        #[arg(long, default_value = DEFAULT_HOTEL_ID)]
        hotel_id: String,
        #[arg(long, default_value = "data")]
        out_dir: PathBuf,
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("review_cli");
    let cli = Cli::parse();

    match cli.command {
        Command::Analyze {
            text,
            hotel_id,
            rating,
        } => {
            let service = build_service().await?;
            let result = service
                .analyze_one(&Review::new(hotel_id, rating, text))
                .context("invalid review")?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Batch {
            input,
            format,
            hotel_id,
            output,
        } => {
            let format = format.parse::<InputFormat>()?;
            let records = read_records(&input, format)
                .with_context(|| format!("failed reading {}", input.display()))?;

            let service = build_service().await?;
            let report = service.analyze_batch(&hotel_id, records).await?;

            if let Some(path) = &output {
                write_results_csv(path, &report.results)
                    .with_context(|| format!("failed writing {}", path.display()))?;
            }

            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Summary { hotel_id } => {
            let service = build_service().await?;
            let summary = service.summary(&hotel_id).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Generate {
            count,
            hotel_id,
            out_dir,
            seed,
        } => {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let reviews = generate_reviews(&mut rng, count, &hotel_id, Utc::now());

            let jsonl = out_dir.join("reviews_raw.jsonl");
            let csv = out_dir.join("reviews_raw.csv");
            write_reviews_jsonl(&jsonl, &reviews)
                .with_context(|| format!("failed writing {}", jsonl.display()))?;
            write_reviews_csv(&csv, &reviews)
                .with_context(|| format!("failed writing {}", csv.display()))?;

            tracing::info!(count = reviews.len(), hotel_id = %hotel_id, "synthetic reviews generated");
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "generated": reviews.len(),
                    "jsonl": jsonl.display().to_string(),
                    "csv": csv.display().to_string(),
                }))?
            );
        }
    }

    Ok(())
}

async fn build_service() -> Result<ReviewService<Store>> {
    let stack = ModelStack::load_default()?;
    let analyzer =
        ReviewAnalyzer::from_stack(&stack).context("failed to compile moderation patterns")?;
    let store = Store::from_env().await?;

    Ok(ReviewService::new(
        Arc::new(analyzer),
        Arc::new(store),
        AppMetrics::shared(),
    ))
}
