//! # prompt-manifest
//!
//! Builds a JSON manifest for an image/prompt dataset by joining every
//! image with its original and reconstructed prompt files.
//!
//! ## Dataset layout
//!
//! ```text
//! <root>/images/<base>.<ext>                      png, jpg, jpeg, webp
//! <root>/prompts/<base>_prompt.txt
//! <root>/recon_prompts/<base>_reconstructed.txt
//! ```
//!
//! The result is written to `<root>/metadata.json` as an indented JSON array
//! of `{ id, image_path, original_prompt, reconstructed_prompt }` objects,
//! ordered by image file name. Images missing either prompt are skipped with
//! a warning.
//!
//! ## Quick Start
//!
//! ```no_run
//! use prompt_manifest::{Config, Pipeline};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::builder()
//!     .root_dir("./AI_IMG_GPT")
//!     .build()?;
//!
//! let stats = Pipeline::new(config)?.run()?;
//! println!("{} records, {} skipped", stats.records, stats.skipped);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! 1. **Scanner**: Lists the images directory in sorted order
//! 2. **Manifest**: Joins each image with its companion prompts
//! 3. **Writer**: Serializes and atomically replaces the manifest file

#![warn(
    missing_docs,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(clippy::module_name_repetitions)]

mod config;
mod error;
mod file;
mod manifest;
mod pipeline;
mod scanner;
mod writer;

pub use config::{Config, ConfigBuilder, DatasetLayout};
pub use error::{Error, Result};
pub use file::ImageCandidate;
pub use manifest::{Manifest, MissingCompanion, Record, SkippedImage};
pub use pipeline::{Pipeline, PipelineStats};

/// Runs the complete manifest pipeline with the given configuration.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration is invalid
/// - The images directory doesn't exist or cannot be listed
/// - A prompt file cannot be read or is not valid UTF-8
/// - The manifest file cannot be written
///
/// # Examples
///
/// ```no_run
/// use prompt_manifest::{Config, run};
///
/// # fn main() -> anyhow::Result<()> {
/// let config = Config::builder()
///     .root_dir("AI_IMG_GPT")
///     .build()?;
///
/// run(config)?;
/// # Ok(())
/// # }
/// ```
pub fn run(config: Config) -> Result<PipelineStats> {
    Pipeline::new(config)?.run()
}
