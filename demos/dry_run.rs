//! Dry run example
//!
//! Builds the manifest in memory and previews it without touching
//! `metadata.json`.

use prompt_manifest::{Config, Pipeline};

fn main() -> anyhow::Result<()> {
    let root = std::env::args().nth(1).unwrap_or_else(|| "AI_IMG_GPT".to_string());

    let config = Config::builder().root_dir(root).dry_run(true).build()?;

    let pipeline = Pipeline::new(config)?;
    let manifest = pipeline.build_manifest()?;

    for record in manifest.records.iter().take(5) {
        println!("{:<24} {}", record.id, record.original_prompt);
    }

    for skipped in &manifest.skipped {
        println!("  {skipped}");
    }

    let stats = pipeline.run()?;
    println!(
        "\n⚠ Dry run: {} records would be written to {}",
        stats.records, stats.output_path
    );

    Ok(())
}
