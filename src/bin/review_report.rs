// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Compute a review view offline from a JSON export of activity records

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde_json::Value;
use std::fs;
use tracing::info;
use year_in_review::{
    aggregation::{build_wrapped, facts, highlights, summarize, trends},
    config::ReviewConfig,
    logging,
    models::{Activity, ActivityRecord},
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum View {
    Summary,
    Trends,
    Highlights,
    Facts,
    Wrapped,
}

#[derive(Parser)]
#[command(name = "review-report")]
#[command(about = "Print a year-in-review view for a JSON file of Strava activities")]
struct Args {
    /// JSON array of activity records, as returned by the Strava API
    input: String,

    /// View to compute
    #[arg(short, long, value_enum, default_value = "summary")]
    view: View,

    /// Only include activities of this type ("All" keeps everything)
    #[arg(short = 't', long, default_value = "All")]
    activity_type: String,

    /// Aggregation rules file (TOML)
    #[arg(short, long)]
    review_config: Option<String>,

    /// Length of each highlight list (overrides the rules file)
    #[arg(long)]
    top_n: Option<usize>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_from_env()?;

    let args = Args::parse();
    let review = ReviewConfig::load(args.review_config.clone())?;

    let raw = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read activities file: {}", args.input))?;
    let records: Vec<ActivityRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse activities file: {}", args.input))?;
    let activities = Activity::from_records(&records);
    info!(count = activities.len(), view = ?args.view, "Loaded activities");

    let output = compute_view(&activities, &args, &review).await?;
    let rendered = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", rendered);

    Ok(())
}

async fn compute_view(activities: &[Activity], args: &Args, review: &ReviewConfig) -> Result<Value> {
    let activity_type = args.activity_type.as_str();

    let value = match args.view {
        View::Summary => serde_json::to_value(summarize(activities, activity_type, &review.summary))?,
        View::Trends => serde_json::to_value(trends(activities, activity_type))?,
        View::Highlights => {
            let top_n = args.top_n.unwrap_or(review.highlights.top_n);
            serde_json::to_value(highlights(activities, top_n, activity_type, &review.highlights))?
        }
        View::Facts => {
            let summary = summarize(activities, activity_type, &review.summary);
            serde_json::to_value(facts(&summary))?
        }
        // No kudos source offline: giver lists stay empty
        View::Wrapped => serde_json::to_value(
            build_wrapped(activities, activity_type, &review.enrichment, None).await,
        )?,
    };

    Ok(value)
}
