use crate::error::{Error, Result};
use std::path::{Component, Path, PathBuf};

const DEFAULT_ROOT_DIR: &str = "AI_IMG_GPT";
const DEFAULT_OUTPUT_FILE: &str = "metadata.json";
const DEFAULT_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Naming convention that ties an image to its two companion prompt files.
///
/// For base name `B` the defaults resolve to:
///
/// ```text
/// <root>/images/B.<ext>
/// <root>/prompts/B_prompt.txt
/// <root>/recon_prompts/B_reconstructed.txt
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetLayout {
    /// Directory holding the images, relative to the root
    pub images_dir: String,

    /// Directory holding the original prompts, relative to the root
    pub prompts_dir: String,

    /// Directory holding the reconstructed prompts, relative to the root
    pub recon_prompts_dir: String,

    /// Suffix appended to the base name for the original prompt file
    pub prompt_suffix: String,

    /// Suffix appended to the base name for the reconstructed prompt file
    pub recon_suffix: String,
}

impl Default for DatasetLayout {
    fn default() -> Self {
        Self {
            images_dir: "images".to_string(),
            prompts_dir: "prompts".to_string(),
            recon_prompts_dir: "recon_prompts".to_string(),
            prompt_suffix: "_prompt.txt".to_string(),
            recon_suffix: "_reconstructed.txt".to_string(),
        }
    }
}

impl DatasetLayout {
    /// Path of the original prompt file for `base`.
    #[must_use]
    pub fn prompt_path(&self, root: &Path, base: &str) -> PathBuf {
        root.join(&self.prompts_dir)
            .join(format!("{base}{}", self.prompt_suffix))
    }

    /// Path of the reconstructed prompt file for `base`.
    #[must_use]
    pub fn recon_path(&self, root: &Path, base: &str) -> PathBuf {
        root.join(&self.recon_prompts_dir)
            .join(format!("{base}{}", self.recon_suffix))
    }

    /// Path of the image as stored in the manifest: always `/`-separated
    /// and relative to the root.
    #[must_use]
    pub fn relative_image_path(&self, file_name: &str) -> String {
        format!("{}/{file_name}", self.images_dir)
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("images_dir", &self.images_dir),
            ("prompts_dir", &self.prompts_dir),
            ("recon_prompts_dir", &self.recon_prompts_dir),
        ] {
            let mut components = Path::new(value).components();
            let single_normal = matches!(
                (components.next(), components.next()),
                (Some(Component::Normal(_)), None)
            );
            if !single_normal {
                return Err(Error::config(format!(
                    "{name} must be a single directory name, got '{value}'"
                )));
            }
        }

        if self.prompt_suffix.is_empty() || self.recon_suffix.is_empty() {
            return Err(Error::config("prompt file suffixes must not be empty"));
        }

        if self.prompts_dir == self.recon_prompts_dir && self.prompt_suffix == self.recon_suffix {
            return Err(Error::config(
                "original and reconstructed prompts resolve to the same file",
            ));
        }

        Ok(())
    }
}

/// Configuration for the manifest pipeline.
///
/// Use [`Config::builder()`] to construct a new configuration.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Config {
    /// Dataset root containing the image and prompt directories
    pub root_dir: PathBuf,

    /// Directory and file naming convention
    pub layout: DatasetLayout,

    /// Recognized image extensions, lowercase and without the leading dot
    pub image_extensions: Vec<String>,

    /// Manifest file name, relative to the root
    pub output_file: PathBuf,

    /// Dry run mode (build and report, no file writes)
    pub dry_run: bool,
}

impl Config {
    /// Creates a new configuration builder.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use prompt_manifest::Config;
    ///
    /// let config = Config::builder()
    ///     .root_dir("./AI_IMG_GPT")
    ///     .build()
    ///     .expect("valid configuration");
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Root directory doesn't exist or is not a directory
    /// - The extension list is empty or holds an empty entry
    /// - The layout is malformed
    /// - The output file is not a relative file path
    pub fn validate(&self) -> Result<()> {
        if !self.root_dir.exists() {
            return Err(Error::config(format!(
                "Root directory does not exist: {}",
                self.root_dir.display()
            )));
        }

        if !self.root_dir.is_dir() {
            return Err(Error::config(format!(
                "Root path is not a directory: {}",
                self.root_dir.display()
            )));
        }

        if self.image_extensions.is_empty() {
            return Err(Error::config("at least one image extension is required"));
        }

        if self.image_extensions.iter().any(String::is_empty) {
            return Err(Error::config("image extensions must not be empty"));
        }

        self.layout.validate()?;

        if self.output_file.is_absolute() || self.output_file.file_name().is_none() {
            return Err(Error::config(format!(
                "output_file must be a relative file path, got '{}'",
                self.output_file.display()
            )));
        }

        Ok(())
    }

    /// Absolute (root-joined) path of the images directory.
    #[must_use]
    pub fn images_dir(&self) -> PathBuf {
        self.root_dir.join(&self.layout.images_dir)
    }

    /// Root-joined path the manifest is written to.
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.root_dir.join(&self.output_file)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from(DEFAULT_ROOT_DIR),
            layout: DatasetLayout::default(),
            image_extensions: default_extensions(),
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
            dry_run: false,
        }
    }
}

fn default_extensions() -> Vec<String> {
    DEFAULT_IMAGE_EXTENSIONS
        .iter()
        .map(|ext| (*ext).to_string())
        .collect()
}

fn normalize_extension(ext: &str) -> String {
    ext.trim_start_matches('.').to_ascii_lowercase()
}

/// Builder for creating a [`Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    root_dir: Option<PathBuf>,
    layout: Option<DatasetLayout>,
    image_extensions: Option<Vec<String>>,
    output_file: Option<PathBuf>,
    dry_run: bool,
}

impl ConfigBuilder {
    /// Sets the dataset root directory.
    #[must_use]
    pub fn root_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.root_dir = Some(path.into());
        self
    }

    /// Sets the directory and file naming convention.
    #[must_use]
    pub fn layout(mut self, layout: DatasetLayout) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Replaces the recognized image extensions.
    ///
    /// Extensions are matched case-insensitively; a leading dot is accepted
    /// and dropped.
    #[must_use]
    pub fn image_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.image_extensions = Some(
            extensions
                .into_iter()
                .map(|ext| normalize_extension(ext.as_ref()))
                .collect(),
        );
        self
    }

    /// Sets the manifest file name, relative to the root.
    #[must_use]
    pub fn output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_file = Some(path.into());
        self
    }

    /// Enables dry run mode (no file writes).
    #[must_use]
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn build(self) -> Result<Config> {
        let config = Config {
            root_dir: self
                .root_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ROOT_DIR)),
            layout: self.layout.unwrap_or_default(),
            image_extensions: self.image_extensions.unwrap_or_else(default_extensions),
            output_file: self
                .output_file
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE)),
            dry_run: self.dry_run,
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let temp = assert_fs::TempDir::new().unwrap();
        let config = Config::builder().root_dir(temp.path()).build().unwrap();

        assert_eq!(config.image_extensions, vec!["png", "jpg", "jpeg", "webp"]);
        assert_eq!(config.output_path(), temp.path().join("metadata.json"));
        assert_eq!(config.images_dir(), temp.path().join("images"));
        assert!(!config.dry_run);
    }

    #[test]
    fn test_default_root_is_conventional_name() {
        assert_eq!(Config::default().root_dir, PathBuf::from("AI_IMG_GPT"));
    }

    #[test]
    fn test_invalid_root_dir() {
        let result = Config::builder()
            .root_dir("/nonexistent/path/that/should/not/exist")
            .build();

        assert!(result.unwrap_err().is_config());
    }

    #[test]
    fn test_root_must_be_directory() {
        use assert_fs::prelude::*;

        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("not_a_dir");
        file.write_str("x").unwrap();

        let result = Config::builder().root_dir(file.path()).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_extensions_are_normalized() {
        let temp = assert_fs::TempDir::new().unwrap();
        let config = Config::builder()
            .root_dir(temp.path())
            .image_extensions([".PNG", "Tiff"])
            .build()
            .unwrap();

        assert_eq!(config.image_extensions, vec!["png", "tiff"]);
    }

    #[test]
    fn test_empty_extensions_rejected() {
        let temp = assert_fs::TempDir::new().unwrap();

        let none: [&str; 0] = [];
        assert!(
            Config::builder()
                .root_dir(temp.path())
                .image_extensions(none)
                .build()
                .is_err()
        );
        assert!(
            Config::builder()
                .root_dir(temp.path())
                .image_extensions(["png", "."])
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_layout_rejects_nested_dirs() {
        let temp = assert_fs::TempDir::new().unwrap();
        let layout = DatasetLayout {
            images_dir: "../images".to_string(),
            ..DatasetLayout::default()
        };

        let result = Config::builder().root_dir(temp.path()).layout(layout).build();
        assert!(result.unwrap_err().is_config());
    }

    #[test]
    fn test_layout_rejects_colliding_companions() {
        let temp = assert_fs::TempDir::new().unwrap();
        let layout = DatasetLayout {
            recon_prompts_dir: "prompts".to_string(),
            recon_suffix: "_prompt.txt".to_string(),
            ..DatasetLayout::default()
        };

        let result = Config::builder().root_dir(temp.path()).layout(layout).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_output_file_must_be_relative() {
        let temp = assert_fs::TempDir::new().unwrap();
        let result = Config::builder()
            .root_dir(temp.path())
            .output_file(temp.path().join("metadata.json"))
            .build();

        assert!(result.is_err());
    }

    #[test]
    fn test_layout_paths() {
        let layout = DatasetLayout::default();
        let root = Path::new("/data");

        assert_eq!(
            layout.prompt_path(root, "img1"),
            PathBuf::from("/data/prompts/img1_prompt.txt")
        );
        assert_eq!(
            layout.recon_path(root, "img1"),
            PathBuf::from("/data/recon_prompts/img1_reconstructed.txt")
        );
        assert_eq!(layout.relative_image_path("img1.png"), "images/img1.png");
    }
}
