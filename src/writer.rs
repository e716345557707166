use crate::{
    config::Config,
    error::{Error, Result},
    manifest::Manifest,
};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

/// Persists a manifest as pretty-printed JSON.
pub(crate) struct Writer {
    output_path: PathBuf,
}

impl Writer {
    /// Creates a new writer from configuration.
    pub(crate) fn new(config: &Config) -> Self {
        Self {
            output_path: config.output_path(),
        }
    }

    /// Path the manifest is written to.
    pub(crate) fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Renders the manifest records as a JSON array with 2-space
    /// indentation. Non-ASCII text is emitted as-is.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub(crate) fn render(manifest: &Manifest) -> Result<Vec<u8>> {
        let bytes = serde_json::to_vec_pretty(&manifest.records)?;
        Ok(bytes)
    }

    /// Writes the manifest, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The output directory cannot be created
    /// - Serialization fails
    /// - File write operations fail
    pub(crate) fn write(&self, manifest: &Manifest) -> Result<()> {
        let content = Self::render(manifest)?;

        if let Some(parent) = self.output_path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        Self::write_file_atomic(&self.output_path, &content)?;

        info!(
            "Wrote {} records to {}",
            manifest.len(),
            self.output_path.display()
        );
        Ok(())
    }

    /// Writes a file atomically.
    ///
    /// # Process
    ///
    /// 1. Writes content to a temporary sibling file
    /// 2. Syncs the temporary file to disk
    /// 3. Renames it over the target path
    fn write_file_atomic(path: &Path, content: &[u8]) -> Result<()> {
        let temp_path = temp_path_for(path);
        let mut temp_file =
            fs::File::create(&temp_path).map_err(|e| Error::io(&temp_path, e))?;

        temp_file
            .write_all(content)
            .map_err(|e| Error::io(&temp_path, e))?;

        temp_file
            .sync_all()
            .map_err(|e| Error::io(&temp_path, e))?;
        drop(temp_file);

        if let Err(e) = fs::rename(&temp_path, path) {
            let _ = fs::remove_file(&temp_path);
            return Err(Error::io(path, e));
        }

        debug!("Renamed {} -> {}", temp_path.display(), path.display());
        Ok(())
    }
}

/// `metadata.json` -> `.metadata.json.<pid>.tmp`
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = std::ffi::OsString::from(".");
    name.push(path.file_name().unwrap_or_default());
    name.push(format!(".{}.tmp", std::process::id()));
    path.with_file_name(name)
}
