use crate::{
    config::Config,
    error::Result,
    manifest::{Manifest, ManifestBuilder},
    scanner::Scanner,
    writer::Writer,
};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

/// Statistics collected during pipeline execution.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineStats {
    /// Entries listed in the images directory
    pub total_entries: usize,

    /// Entries recognized as images
    pub images_found: usize,

    /// Entries ignored by the scanner
    pub ignored_entries: usize,

    /// Records in the manifest
    pub records: usize,

    /// Images skipped for a missing companion prompt
    pub skipped: usize,

    /// Base names of skipped images, in scan order
    pub skipped_names: Vec<String>,

    /// Manifest path
    pub output_path: String,

    /// Whether the manifest file was written (false in dry run)
    pub written: bool,

    /// Total execution time
    pub duration: Duration,

    /// Time spent listing the images directory
    pub scan_duration: Duration,

    /// Time spent joining images with prompts
    pub build_duration: Duration,

    /// Time spent writing
    pub write_duration: Duration,
}

impl PipelineStats {
    /// Prints a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n╔═══════════════════════════════════════════════════════╗");
        println!("║               Manifest Build Summary                  ║");
        println!("╠═══════════════════════════════════════════════════════╣");
        println!(
            "║ Entries Listed:       {:>8}                        ║",
            self.total_entries
        );
        println!(
            "║   - Images:           {:>8}                        ║",
            self.images_found
        );
        println!(
            "║   - Ignored:          {:>8}                        ║",
            self.ignored_entries
        );
        println!("║                                                       ║");
        println!(
            "║ Records:              {:>8}                        ║",
            self.records
        );
        println!(
            "║ Skipped:              {:>8}                        ║",
            self.skipped
        );
        println!("║                                                       ║");
        let status = if self.written { "written" } else { "dry run" };
        println!("║ {:<54}║", format!("Output ({status}):"));
        println!("║   {:<52}║", fit_width(&self.output_path, 52));
        println!("║                                                       ║");
        println!("║ Timing Breakdown:                                     ║");
        println!(
            "║   - Scanning:         {:>8.2}s                     ║",
            self.scan_duration.as_secs_f64()
        );
        println!(
            "║   - Joining:          {:>8.2}s                     ║",
            self.build_duration.as_secs_f64()
        );
        println!(
            "║   - Writing:          {:>8.2}s                     ║",
            self.write_duration.as_secs_f64()
        );
        println!(
            "║   - Total:            {:>8.2}s                     ║",
            self.duration.as_secs_f64()
        );
        println!("╚═══════════════════════════════════════════════════════╝\n");
    }
}

/// Shortens `text` to at most `width` characters, keeping its tail.
fn fit_width(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len <= width {
        return text.to_string();
    }
    let tail: String = text.chars().skip(len - width + 3).collect();
    format!("...{tail}")
}

/// Scans, joins and writes a dataset manifest.
pub struct Pipeline {
    config: Config,
    scanner: Scanner,
    builder: ManifestBuilder,
    writer: Writer,
}

impl Pipeline {
    /// Creates a new pipeline with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration validation fails.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let scanner = Scanner::new(&config);
        let builder = ManifestBuilder::new(&config);
        let writer = Writer::new(&config);

        Ok(Self {
            config,
            scanner,
            builder,
            writer,
        })
    }

    /// Builds the manifest in memory without writing it.
    ///
    /// # Errors
    ///
    /// Returns an error if the images directory cannot be listed or a
    /// prompt file cannot be read.
    pub fn build_manifest(&self) -> Result<Manifest> {
        let scan = self.scanner.scan()?;
        self.builder.build(&scan.candidates)
    }

    /// Executes the complete pipeline and returns statistics.
    ///
    /// # Process
    ///
    /// 1. **Scan**: Lists the images directory in sorted order
    /// 2. **Join**: Pairs each image with its prompts, skipping incomplete ones
    /// 3. **Write**: Replaces the manifest file
    ///
    /// # Errors
    ///
    /// Returns an error if any stage fails critically. Missing companion
    /// files are not errors.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use prompt_manifest::{Config, Pipeline};
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let config = Config::builder()
    ///     .root_dir("./AI_IMG_GPT")
    ///     .build()?;
    ///
    /// let stats = Pipeline::new(config)?.run()?;
    /// println!("{} records", stats.records);
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip(self), fields(root_dir = %self.config.root_dir.display()))]
    pub fn run(self) -> Result<PipelineStats> {
        let start_time = Instant::now();

        info!("Stage 1/3: Scanning images...");
        let scan_start = Instant::now();
        let scan = self.scanner.scan()?;
        let scan_duration = scan_start.elapsed();

        info!(
            "✓ Found {} images ({} other entries ignored) in {:.2}s",
            scan.stats.images,
            scan.stats.ignored,
            scan_duration.as_secs_f64()
        );

        info!("Stage 2/3: Joining prompts...");
        let build_start = Instant::now();
        let manifest = self.builder.build(&scan.candidates)?;
        let build_duration = build_start.elapsed();

        if manifest.skipped.is_empty() {
            info!("✓ Assembled {} records", manifest.len());
        } else {
            warn!(
                "Assembled {} records, skipped {} with missing prompt files",
                manifest.len(),
                manifest.skipped.len()
            );
        }

        let write_start = Instant::now();
        let written = if self.config.dry_run {
            warn!("Dry run mode enabled - skipping manifest write");
            false
        } else {
            info!("Stage 3/3: Writing manifest...");
            self.writer.write(&manifest)?;
            true
        };
        let write_duration = write_start.elapsed();

        let stats = PipelineStats {
            total_entries: scan.stats.total_entries,
            images_found: scan.stats.images,
            ignored_entries: scan.stats.ignored,
            records: manifest.len(),
            skipped: manifest.skipped.len(),
            skipped_names: manifest.skipped_names().map(String::from).collect(),
            output_path: self.writer.output_path().display().to_string(),
            written,
            duration: start_time.elapsed(),
            scan_duration,
            build_duration,
            write_duration,
        };

        info!(
            "✓ Pipeline completed in {:.2}s",
            stats.duration.as_secs_f64()
        );

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Record;
    use assert_fs::prelude::*;
    use std::path::Path;

    fn create_test_config(root: &Path) -> Config {
        Config::builder().root_dir(root).build().unwrap()
    }

    fn add_entry(temp: &assert_fs::TempDir, image: &str, prompt: Option<&str>, recon: Option<&str>) {
        let base = image.rsplit_once('.').map_or(image, |(base, _)| base);
        temp.child(format!("images/{image}")).write_binary(b"img").unwrap();
        if let Some(text) = prompt {
            temp.child(format!("prompts/{base}_prompt.txt"))
                .write_str(text)
                .unwrap();
        }
        if let Some(text) = recon {
            temp.child(format!("recon_prompts/{base}_reconstructed.txt"))
                .write_str(text)
                .unwrap();
        }
    }

    fn read_output(temp: &assert_fs::TempDir) -> Vec<Record> {
        let text = std::fs::read_to_string(temp.child("metadata.json").path()).unwrap();
        serde_json::from_str(&text).unwrap()
    }

    #[test]
    fn test_pipeline_single_record() {
        let temp = assert_fs::TempDir::new().unwrap();
        add_entry(&temp, "img1.png", Some("a cat"), Some("a feline"));

        let stats = Pipeline::new(create_test_config(temp.path()))
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(stats.records, 1);
        assert!(stats.written);

        let text = std::fs::read_to_string(temp.child("metadata.json").path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{
                "id": "img1",
                "image_path": "images/img1.png",
                "original_prompt": "a cat",
                "reconstructed_prompt": "a feline"
            }])
        );
    }

    #[test]
    fn test_pipeline_skips_incomplete_entry() {
        let temp = assert_fs::TempDir::new().unwrap();
        add_entry(&temp, "img1.png", Some("a cat"), Some("a feline"));
        add_entry(&temp, "img2.jpg", Some("a dog"), None);

        let stats = Pipeline::new(create_test_config(temp.path()))
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(stats.records, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.skipped_names, vec!["img2"]);

        let records = read_output(&temp);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "img1");
    }

    #[test]
    fn test_pipeline_ignores_non_images() {
        let temp = assert_fs::TempDir::new().unwrap();
        add_entry(&temp, "img1.png", Some("a cat"), Some("a feline"));
        temp.child("images/readme.txt").write_str("docs").unwrap();

        let stats = Pipeline::new(create_test_config(temp.path()))
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(stats.records, 1);
        assert_eq!(stats.skipped, 0);
        assert_eq!(stats.ignored_entries, 1);
        assert!(read_output(&temp).iter().all(|r| r.id != "readme"));
    }

    #[test]
    fn test_pipeline_order_and_id_invariants() {
        let temp = assert_fs::TempDir::new().unwrap();
        for image in ["zeta.webp", "Alpha.PNG", "beta.jpeg", "gamma.jpg", "delta.png"] {
            add_entry(&temp, image, Some("p"), Some("r"));
        }
        add_entry(&temp, "epsilon.png", None, Some("r"));

        Pipeline::new(create_test_config(temp.path()))
            .unwrap()
            .run()
            .unwrap();

        let records = read_output(&temp);
        let files: Vec<_> = records
            .iter()
            .map(|r| r.image_path.trim_start_matches("images/").to_string())
            .collect();

        let mut sorted = files.clone();
        sorted.sort();
        assert_eq!(files, sorted);
        assert_eq!(files.len(), 5);

        for record in &records {
            let file_name = Path::new(&record.image_path).file_name().unwrap();
            let stem = Path::new(file_name).file_stem().unwrap().to_str().unwrap();
            assert_eq!(record.id, stem);
            assert!(temp.path().join(&record.image_path).exists());
        }
    }

    #[test]
    fn test_pipeline_is_idempotent() {
        let temp = assert_fs::TempDir::new().unwrap();
        add_entry(&temp, "img1.png", Some("a cat\n"), Some("a feline\n"));
        add_entry(&temp, "img2.png", Some("日本の庭"), Some("a garden"));

        Pipeline::new(create_test_config(temp.path()))
            .unwrap()
            .run()
            .unwrap();
        let first = std::fs::read(temp.child("metadata.json").path()).unwrap();

        Pipeline::new(create_test_config(temp.path()))
            .unwrap()
            .run()
            .unwrap();
        let second = std::fs::read(temp.child("metadata.json").path()).unwrap();

        assert_eq!(first, second);
    }

    #[cfg(unix)]
    #[test]
    fn test_pipeline_survives_dangling_link() {
        let temp = assert_fs::TempDir::new().unwrap();
        add_entry(&temp, "img1.png", Some("a cat"), Some("a feline"));
        let images = temp.child("images");
        std::os::unix::fs::symlink(images.path().join("gone.txt"), images.path().join("readme.txt"))
            .unwrap();

        let stats = Pipeline::new(create_test_config(temp.path()))
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(stats.records, 1);
        assert_eq!(stats.ignored_entries, 1);
        assert_eq!(read_output(&temp)[0].id, "img1");
    }

    #[test]
    fn test_pipeline_dry_run() {
        let temp = assert_fs::TempDir::new().unwrap();
        add_entry(&temp, "img1.png", Some("a cat"), Some("a feline"));

        let config = Config::builder()
            .root_dir(temp.path())
            .dry_run(true)
            .build()
            .unwrap();

        let stats = Pipeline::new(config).unwrap().run().unwrap();

        assert_eq!(stats.records, 1);
        assert!(!stats.written);
        assert!(!temp.child("metadata.json").exists());
    }

    #[test]
    fn test_pipeline_missing_images_dir_is_fatal() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("prompts").create_dir_all().unwrap();

        let result = Pipeline::new(create_test_config(temp.path()))
            .unwrap()
            .run();

        assert!(result.unwrap_err().is_io());
        assert!(!temp.child("metadata.json").exists());
    }

    #[test]
    fn test_pipeline_invalid_utf8_leaves_no_output() {
        let temp = assert_fs::TempDir::new().unwrap();
        add_entry(&temp, "img1.png", None, Some("ok"));
        temp.child("prompts/img1_prompt.txt")
            .write_binary(&[0xff, 0xfe, 0xfd])
            .unwrap();

        let result = Pipeline::new(create_test_config(temp.path()))
            .unwrap()
            .run();

        assert!(result.unwrap_err().is_invalid_utf8());
        assert!(!temp.child("metadata.json").exists());
    }

    #[test]
    fn test_fit_width_keeps_path_tail() {
        assert_eq!(fit_width("/data/metadata.json", 52), "/data/metadata.json");

        let long = format!("/{}/metadata.json", "a".repeat(80));
        let fitted = fit_width(&long, 52);
        assert_eq!(fitted.chars().count(), 52);
        assert!(fitted.starts_with("..."));
        assert!(fitted.ends_with("/metadata.json"));
    }

    #[test]
    fn test_build_manifest_does_not_write() {
        let temp = assert_fs::TempDir::new().unwrap();
        add_entry(&temp, "img1.png", Some("a cat"), Some("a feline"));

        let pipeline = Pipeline::new(create_test_config(temp.path())).unwrap();
        let manifest = pipeline.build_manifest().unwrap();

        assert_eq!(manifest.len(), 1);
        assert!(!temp.child("metadata.json").exists());
    }
}
