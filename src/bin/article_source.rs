//! article-source: print merged article batches or their schema
//!
//! Usage:
//!   # Print articles two per batch with their review status
//!   article-source --articles api_response.json \
//!       --status-table review_status.csv --dates-table date_completed.csv
//!
//!   # Print the sampled schema
//!   article-source --articles api_response.json \
//!       --status-table review_status.csv --dates-table date_completed.csv --schema

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use article_source::{
    ArticleSource, ColumnRange, CsvReferenceFiles, DuplicatePolicy, FlatRecord, JsonDocumentFile,
    SourceConfig,
};
use clap::{Parser, ValueEnum};
use serde_json::Value;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "article-source")]
#[command(about = "Flatten articles and join their review status and completion date", long_about = None)]
struct Args {
    /// JSON API response holding the articles
    #[arg(long, default_value = "api_response.json")]
    articles: PathBuf,

    /// JSON pointer to the article list inside the response
    #[arg(long, default_value = "/response/docs")]
    pointer: String,

    /// CSV export of the review_status sheet
    #[arg(long, default_value = "review_status.csv")]
    status_table: PathBuf,

    /// CSV export of the date_completed sheet
    #[arg(long, default_value = "date_completed.csv")]
    dates_table: PathBuf,

    /// Rows to skip before the review_status header
    #[arg(long, default_value_t = 2)]
    status_header_row: usize,

    /// Review_status columns to keep, e.g. B:E
    #[arg(long, default_value = "B:E")]
    status_columns: String,

    /// Records per batch
    #[arg(long, default_value_t = 2, allow_negative_numbers = true)]
    batch_size: i64,

    /// How several status rows for one article are reported
    #[arg(long, value_enum, default_value_t = Policy::Count)]
    policy: Policy,

    /// Field holding the article identifier
    #[arg(long, default_value = "_id")]
    id_field: String,

    /// Print the schema sampled from the first batch instead of the articles
    #[arg(long)]
    schema: bool,

    /// Print the schema of every article instead of the articles
    #[arg(long, conflicts_with = "schema")]
    full_schema: bool,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: tracing::Level,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Policy {
    /// Duplicate count plus the last match
    Count,
    /// One review entry per match
    Reviews,
}

impl From<Policy> for DuplicatePolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Count => DuplicatePolicy::CountAndLast,
            Policy::Reviews => DuplicatePolicy::Reviews,
        }
    }
}

fn init_logging(level: tracing::Level) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("article_source={}", level))),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_level);

    let config = SourceConfig {
        id_field: args.id_field.clone(),
        duplicate_policy: args.policy.into(),
        ..SourceConfig::default()
    };

    let documents = JsonDocumentFile::new(&args.articles).with_pointer(&args.pointer);

    let mut references = CsvReferenceFiles::new(&args.status_table, &args.dates_table);
    references.status_layout.header_row = args.status_header_row;
    references.status_layout.columns = Some(
        args.status_columns
            .parse::<ColumnRange>()
            .context("Invalid --status-columns")?,
    );

    let mut source = ArticleSource::new(documents, references, config);
    source.connect(None, None);

    if args.schema || args.full_schema {
        let fields = if args.full_schema {
            source.get_full_schema()
        } else {
            source.get_schema()
        }
        .context("Failed to infer schema")?;

        for field in fields {
            println!("{}", field);
        }
    } else {
        let batches = source.get_data_batch(args.batch_size).context("Failed to start batching")?;
        for (idx, batch) in batches.enumerate() {
            let batch = batch.with_context(|| format!("Failed to build batch {}", idx))?;
            println!("{} Batch of {} items", idx, batch.len());
            for item in batch.iter() {
                print_item(item, &source.config().id_field);
            }
        }
    }

    source.disconnect();
    Ok(())
}

fn print_item(item: &FlatRecord, id_field: &str) {
    println!("{} - {}", display(item.get(id_field)), display(item.get("headline.main")));
    println!(" --> {} - {}", display(item.get("status")), display(item.get("date_completed")));
}

fn display(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "None".to_string(),
    }
}
