use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mtexts::config::Config;
use mtexts::drive::{load_access_token, DriveClient};
use mtexts::llm::LlmSummarizer;
use mtexts::processing::{ContentExtractor, Pipeline};

#[derive(Parser)]
#[command(name = "mtexts")]
#[command(about = "Extract text from Google Drive and create a knowledge base")]
struct Args {
    /// Path to Google API credentials JSON file
    #[arg(long, default_value = "credentials.json")]
    credentials: PathBuf,

    /// Path to the stored OAuth token file
    #[arg(long, default_value = "token.json")]
    token: PathBuf,

    /// Output file path for the knowledge base
    #[arg(long, default_value = "knowledge_base.md")]
    output: PathBuf,

    /// Drive folder ID to process (default: whole Drive)
    #[arg(long)]
    folder_id: Option<String>,

    /// Path to configuration file
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    init_tracing(args.json_logs);

    let config = Config::load(&args.config)?;

    let access_token = load_access_token(&args.token, &args.credentials).await?;
    let fetcher = Arc::new(DriveClient::new(&config.drive, access_token)?);
    let summarizer = Arc::new(LlmSummarizer::new(&config.llm)?);
    let extractor = ContentExtractor::new(config.extraction.capabilities());

    let pipeline = Pipeline::new(fetcher, summarizer, extractor, config.llm.input_token_limit);
    let written = pipeline
        .run_to_file(args.folder_id.as_deref(), &args.output)
        .await?;

    tracing::info!(
        "Knowledge base created at: {} ({} documents)",
        args.output.display(),
        written
    );

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "mtexts=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
