mod adapters;
mod config;
mod core;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::adapters::llm::{LLMAdapter, LLMRequest, ModelConfig};
use crate::core::{FileDiscovery, OutputWriter, PromptTemplate, ResponseParser};

#[derive(Parser)]
#[command(name = "clj-refactor")]
#[command(about = "Batch-refactor Clojure files with Claude on AWS Bedrock", long_about = None)]
#[command(version)]
struct Cli {
    /// File or directory to refactor
    path: PathBuf,

    /// Output directory for refactored files
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Recursively process directories
    #[arg(short, long)]
    recursive: bool,

    /// Show what would be processed without making changes
    #[arg(long)]
    dry_run: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Bedrock model ID
    #[arg(long)]
    model: Option<String>,

    /// AWS region
    #[arg(long, env = "AWS_REGION")]
    region: Option<String>,

    /// AWS profile to use
    #[arg(long, env = "AWS_PROFILE")]
    profile: Option<String>,

    /// Path to the prompt template
    #[arg(long)]
    template: Option<PathBuf>,

    /// Maximum output tokens per request
    #[arg(long)]
    max_tokens: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = config::Config::load().unwrap_or_default();
    config.merge_with_cli(
        cli.model,
        cli.region,
        cli.profile,
        cli.template,
        cli.output,
        cli.max_tokens,
    );

    run(&cli.path, cli.recursive, cli.dry_run, config).await
}

async fn run(path: &Path, recursive: bool, dry_run: bool, config: config::Config) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("Path does not exist: {}", path.display());
    }
    if !config.template.exists() {
        anyhow::bail!("Prompt template not found: {}", config.template.display());
    }

    let files = FileDiscovery::find_clojure_files(path, recursive)?;
    if files.is_empty() {
        println!("No .clj files found in: {}", path.display());
        return Ok(());
    }

    println!("Found {} Clojure file(s) to process", files.len());

    if dry_run {
        println!("\nDry run - files that would be processed:");
        for file in &files {
            println!("  {}", file.display());
        }
        return Ok(());
    }

    let template = PromptTemplate::load(&config.template)?;
    debug!("Loaded template: {}", config.template.display());

    std::fs::create_dir_all(&config.output)
        .with_context(|| format!("failed to create {}", config.output.display()))?;
    println!("Output directory: {}", config.output.display());

    println!("Connecting to AWS Bedrock ({})...", config.region);
    let model_config = ModelConfig {
        model_id: config.model.clone(),
        region: config.region.clone(),
        profile: config.profile.clone(),
        max_tokens: config.max_tokens,
    };
    let adapter = adapters::llm::create_adapter(&model_config).await?;

    let writer = OutputWriter::new(config.output.clone());
    let delay = Duration::from_secs_f64(config.request_delay_secs);

    let mut success_count = 0usize;
    let mut error_count = 0usize;

    for (i, file_path) in files.iter().enumerate() {
        println!("\n[{}/{}] Processing: {}", i + 1, files.len(), file_path.display());

        match refactor_file(adapter.as_ref(), &template, file_path, &writer).await {
            Ok(true) => success_count += 1,
            Ok(false) => error_count += 1,
            Err(err) => {
                println!("  ERROR processing {}: {:#}", file_path.display(), err);
                error_count += 1;
            }
        }

        // Rate limiting between requests, skipped after the last file.
        if i + 1 < files.len() {
            debug!("Waiting {:.1}s between requests", delay.as_secs_f64());
            tokio::time::sleep(delay).await;
        }
    }

    println!("\n{}", "=".repeat(50));
    println!("Refactoring complete!");
    println!("  Successful: {}", success_count);
    println!("  Errors: {}", error_count);
    println!("  Output directory: {}", config.output.display());

    if success_count > 0 {
        println!("\nNext steps:");
        println!("  1. Review changes in {}/", config.output.display());
        println!("  2. Compare with originals using diff or git diff --no-index");
        println!("  3. Copy approved changes back to source");
    }

    Ok(())
}

/// One file through build -> call -> parse & write. `Ok(false)` means the
/// reply held no extractable code block; the raw reply was saved for
/// inspection and the file counts as failed.
async fn refactor_file(
    adapter: &dyn LLMAdapter,
    template: &PromptTemplate,
    file_path: &Path,
    writer: &OutputWriter,
) -> Result<bool> {
    let content = std::fs::read_to_string(file_path)
        .with_context(|| format!("failed to read {}", file_path.display()))?;
    debug!("Read {} ({} chars)", file_path.display(), content.len());

    let prompt = template.build(&file_path.to_string_lossy(), &content);
    debug!("Prompt size: {} chars", prompt.len());

    debug!("Calling Bedrock...");
    let response = adapter
        .complete(LLMRequest {
            prompt,
            max_tokens: None,
        })
        .await?;
    if let Some(usage) = &response.usage {
        debug!("Token usage: {} in / {} out", usage.input_tokens, usage.output_tokens);
    }

    let Some(code) = ResponseParser::extract_code(&response.content) else {
        println!(
            "  WARNING: Could not extract code from response for {}",
            file_path.display()
        );
        let debug_path = writer.write_debug(file_path, &response.content)?;
        println!("  Saved debug output to: {}", debug_path.display());
        return Ok(false);
    };

    let output_path = writer.write_refactored(file_path, &code)?;

    let summary = ResponseParser::extract_summary(&response.content);
    if !summary.is_empty() {
        writer.write_summary(&output_path, file_path, &summary)?;
    }

    debug!("Saved to: {}", output_path.display());
    Ok(true)
}
