use crate::{
    config::Config,
    error::{Error, Result},
    file::ImageCandidate,
};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;

/// Statistics collected during scanning.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct ScanStats {
    /// Entries listed in the images directory
    pub total_entries: usize,

    /// Entries recognized as images
    pub images: usize,

    /// Entries ignored (other extensions, directories, dangling links, non-UTF-8 names)
    pub ignored: usize,
}

/// Output of a scan: image candidates in sorted file-name order.
#[derive(Debug, Clone)]
pub(crate) struct ScanResult {
    pub candidates: Vec<ImageCandidate>,
    pub stats: ScanStats,
}

/// Lists the images directory and keeps recognized image files.
pub(crate) struct Scanner {
    images_dir: PathBuf,
    image_extensions: Vec<String>,
}

impl Scanner {
    /// Creates a new scanner from configuration.
    pub(crate) fn new(config: &Config) -> Self {
        Self {
            images_dir: config.images_dir(),
            image_extensions: config.image_extensions.clone(),
        }
    }

    /// Scans the images directory, one level deep, in ascending
    /// byte-wise file-name order.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The images directory is missing or not a directory
    /// - The directory or one of its entries cannot be read
    pub(crate) fn scan(&self) -> Result<ScanResult> {
        let metadata =
            std::fs::metadata(&self.images_dir).map_err(|e| Error::io(&self.images_dir, e))?;
        if !metadata.is_dir() {
            return Err(Error::io(
                &self.images_dir,
                std::io::Error::new(std::io::ErrorKind::NotADirectory, "not a directory"),
            ));
        }

        debug!("Scanning {}", self.images_dir.display());

        let walker = WalkDir::new(&self.images_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name();

        let mut candidates = Vec::new();
        let mut stats = ScanStats::default();

        for entry in walker {
            // Only failures to read the directory itself surface here.
            let entry = entry?;
            stats.total_entries += 1;

            if entry.file_name().to_str().is_none() {
                debug!(
                    "Ignoring entry with non UTF-8 name: {}",
                    entry.path().display()
                );
                stats.ignored += 1;
                continue;
            }

            let Some(candidate) = ImageCandidate::from_path(entry.path(), &self.image_extensions)
            else {
                trace!("Ignoring non-image entry: {}", entry.path().display());
                stats.ignored += 1;
                continue;
            };

            if !Self::is_image_file(entry.path()) {
                stats.ignored += 1;
                continue;
            }

            trace!("Found image: {}", candidate.file_name);
            stats.images += 1;
            candidates.push(candidate);
        }

        debug!(
            "Scan complete: {} entries, {} images, {} ignored",
            stats.total_entries, stats.images, stats.ignored
        );

        Ok(ScanResult { candidates, stats })
    }

    /// Resolves symlinks and rejects directories and dangling links.
    /// Any other metadata failure keeps the entry.
    fn is_image_file(path: &Path) -> bool {
        match std::fs::metadata(path) {
            Ok(metadata) if metadata.is_dir() => {
                trace!("Ignoring directory: {}", path.display());
                false
            }
            Ok(_) => true,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Ignoring dangling link: {}", path.display());
                false
            }
            Err(e) => {
                debug!("Keeping {} despite metadata error: {}", path.display(), e);
                true
            }
        }
    }
}
