use anyhow::Context;
use clap::Parser;
use prompt_manifest::{Config, Pipeline};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    name = "prompt-manifest",
    version,
    about = "Build metadata.json for an image/prompt dataset",
    long_about = "Build metadata.json for an image/prompt dataset.\n\n\
    Every image in <ROOT>/images is joined with <ROOT>/prompts/<base>_prompt.txt and \
    <ROOT>/recon_prompts/<base>_reconstructed.txt. Images missing either prompt are \
    skipped with a warning. The manifest is written to <ROOT>/metadata.json, replacing \
    any previous one.\n\n\
    USAGE EXAMPLES:\n  \
      # Use the default dataset root (./AI_IMG_GPT)\n  \
      prompt-manifest\n\n  \
      # Index another dataset and show a summary\n  \
      prompt-manifest ./datasets/run-42 --summary"
)]
struct Cli {
    /// Dataset root containing images/, prompts/ and recon_prompts/
    #[arg(default_value = "AI_IMG_GPT", value_name = "ROOT")]
    root: PathBuf,

    /// Build and report without writing metadata.json
    #[arg(long)]
    dry_run: bool,

    /// Print a statistics table after the run
    #[arg(long)]
    summary: bool,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose);

    let config = Config::builder()
        .root_dir(&cli.root)
        .dry_run(cli.dry_run)
        .build()
        .with_context(|| format!("Failed to configure dataset root {}", cli.root.display()))?;

    let stats = Pipeline::new(config)
        .context("Failed to create pipeline")?
        .run()
        .context("Manifest build failed")?;

    if cli.summary {
        stats.print_summary();
    }

    if stats.written {
        println!(
            "Metadata for {} items saved to {}",
            stats.records, stats.output_path
        );
    } else {
        println!(
            "Metadata for {} items not saved (dry run): {}",
            stats.records, stats.output_path
        );
    }

    Ok(())
}

fn setup_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => EnvFilter::new("prompt_manifest=info"),
        1 => EnvFilter::new("prompt_manifest=debug"),
        _ => EnvFilter::new("prompt_manifest=trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
