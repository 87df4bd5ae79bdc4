//! Run the full pipeline once against the live providers and print the post as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use common::Config;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "generate_once", about = "Generate a single post and print it")]
struct Args {
    /// Topic to write about
    #[arg(long)]
    topic: String,

    /// Path to config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    dotenv::dotenv().ok();
    let args = Args::parse();

    let config = Config::discover(Path::new("."), args.config.as_deref()).await?;
    let credentials = config.resolve_credentials()?;
    let generator = newspost::build_generator(&config, &credentials)?;

    eprintln!("Generating post about {:?} with {}", args.topic, config.llm_model());

    let post = generator
        .generate_post(&args.topic)
        .await
        .with_context(|| format!("generation failed for topic {:?}", args.topic))?;

    println!("{}", serde_json::to_string_pretty(&post)?);
    Ok(())
}
