//! Basic example of using prompt-manifest as a library
//!
//! Builds `metadata.json` for a dataset root and prints what was skipped.

use prompt_manifest::{Config, Pipeline};

fn main() -> anyhow::Result<()> {
    let root = std::env::args().nth(1).unwrap_or_else(|| "AI_IMG_GPT".to_string());

    let config = Config::builder().root_dir(root).build()?;

    let stats = Pipeline::new(config)?.run()?;
    stats.print_summary();

    for name in &stats.skipped_names {
        println!("  skipped: {name}");
    }

    println!(
        "\n✓ Metadata for {} items saved to {}",
        stats.records, stats.output_path
    );

    Ok(())
}
