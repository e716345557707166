use crate::{
    config::{Config, DatasetLayout},
    error::Result,
    file::{ImageCandidate, read_prompt},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, warn};

/// One manifest entry: an image joined with both of its prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Image file name without extension
    pub id: String,

    /// Image path relative to the dataset root, `/`-separated
    pub image_path: String,

    /// Trimmed text of the original prompt
    pub original_prompt: String,

    /// Trimmed text of the reconstructed prompt
    pub reconstructed_prompt: String,
}

/// Which companion prompt files were absent for a skipped image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingCompanion {
    /// Only the original prompt is missing
    Prompt,
    /// Only the reconstructed prompt is missing
    Reconstructed,
    /// Neither prompt file exists
    Both,
}

impl fmt::Display for MissingCompanion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prompt => f.write_str("original prompt"),
            Self::Reconstructed => f.write_str("reconstructed prompt"),
            Self::Both => f.write_str("original and reconstructed prompts"),
        }
    }
}

/// An image left out of the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedImage {
    /// Base name shared with the missing companion files
    pub base_name: String,

    /// What was missing
    pub missing: MissingCompanion,
}

impl fmt::Display for SkippedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Missing {} for {}", self.missing, self.base_name)
    }
}

/// The ordered dataset index produced by a run.
///
/// Only [`Manifest::records`] is serialized; skipped images are kept for
/// reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    /// Records in scan order
    pub records: Vec<Record>,

    /// Images dropped because a companion prompt file was absent
    pub skipped: Vec<SkippedImage>,
}

impl Manifest {
    /// Number of records that will be written.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no record was assembled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Base names of skipped images, in scan order.
    pub fn skipped_names(&self) -> impl Iterator<Item = &str> {
        self.skipped.iter().map(|s| s.base_name.as_str())
    }
}

/// Joins image candidates with their companion prompt files.
pub(crate) struct ManifestBuilder {
    root_dir: PathBuf,
    layout: DatasetLayout,
}

impl ManifestBuilder {
    /// Creates a new builder from configuration.
    pub(crate) fn new(config: &Config) -> Self {
        Self {
            root_dir: config.root_dir.clone(),
            layout: config.layout.clone(),
        }
    }

    /// Builds the manifest from candidates already in output order.
    ///
    /// Candidates missing either companion are skipped with a warning;
    /// the remaining records keep their relative order.
    ///
    /// # Errors
    ///
    /// Returns an error if a companion file exists but cannot be read or is
    /// not valid UTF-8.
    pub(crate) fn build(&self, candidates: &[ImageCandidate]) -> Result<Manifest> {
        let mut manifest = Manifest::default();

        for candidate in candidates {
            match self.join(candidate)? {
                Ok(record) => {
                    debug!("Added record {}", record.id);
                    manifest.records.push(record);
                }
                Err(skipped) => {
                    warn!("{skipped}, skipping");
                    manifest.skipped.push(skipped);
                }
            }
        }

        Ok(manifest)
    }

    /// Resolves one candidate. The outer `Result` carries fatal read errors,
    /// the inner one distinguishes a record from a skip.
    fn join(
        &self,
        candidate: &ImageCandidate,
    ) -> Result<std::result::Result<Record, SkippedImage>> {
        let base = &candidate.base_name;
        let prompt_path = self.layout.prompt_path(&self.root_dir, base);
        let recon_path = self.layout.recon_path(&self.root_dir, base);

        let missing = match (prompt_path.exists(), recon_path.exists()) {
            (true, true) => None,
            (false, true) => Some(MissingCompanion::Prompt),
            (true, false) => Some(MissingCompanion::Reconstructed),
            (false, false) => Some(MissingCompanion::Both),
        };

        if let Some(missing) = missing {
            return Ok(Err(SkippedImage {
                base_name: base.clone(),
                missing,
            }));
        }

        let original_prompt = read_prompt(&prompt_path)?;
        let reconstructed_prompt = read_prompt(&recon_path)?;

        Ok(Ok(Record {
            id: base.clone(),
            image_path: self.layout.relative_image_path(&candidate.file_name),
            original_prompt,
            reconstructed_prompt,
        }))
    }
}
