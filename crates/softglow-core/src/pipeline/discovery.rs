//! Finds input photos under a file or directory path.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ProcessingConfig;

/// Discovers image files in directories.
pub struct FileDiscovery {
    config: ProcessingConfig,
    skip_suffix: Option<String>,
}

/// Information about a discovered file.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

impl FileDiscovery {
    pub fn new(config: ProcessingConfig) -> Self {
        Self {
            config,
            skip_suffix: None,
        }
    }

    /// Ignore files whose stem ends with `suffix`, so earlier outputs
    /// written next to their inputs are not enhanced a second time.
    pub fn skipping_suffix(mut self, suffix: impl Into<String>) -> Self {
        let suffix = suffix.into();
        self.skip_suffix = (!suffix.is_empty()).then_some(suffix);
        self
    }

    /// A file path is returned as-is when supported; directories are walked
    /// recursively and sorted by path.
    pub fn discover(&self, path: &Path) -> Vec<DiscoveredFile> {
        if path.is_file() {
            if self.is_supported(path) {
                if let Ok(meta) = std::fs::metadata(path) {
                    return vec![DiscoveredFile {
                        path: path.to_path_buf(),
                        size: meta.len(),
                    }];
                }
            }
            return vec![];
        }

        let mut files: Vec<DiscoveredFile> = WalkDir::new(path)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| self.is_supported(e.path()) && !self.is_previous_output(e.path()))
            .filter_map(|e| {
                let size = e.metadata().ok()?.len();
                Some(DiscoveredFile {
                    path: e.into_path(),
                    size,
                })
            })
            .collect();

        files.sort_by(|a, b| a.path.cmp(&b.path));
        files
    }

    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.config
                    .supported_formats
                    .iter()
                    .any(|fmt| fmt.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }

    fn is_previous_output(&self, path: &Path) -> bool {
        match (&self.skip_suffix, path.file_stem().and_then(|s| s.to_str())) {
            (Some(suffix), Some(stem)) => stem.ends_with(suffix.as_str()),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_supported() {
        let discovery = FileDiscovery::new(ProcessingConfig::default());

        assert!(discovery.is_supported(Path::new("test.jpg")));
        assert!(discovery.is_supported(Path::new("test.JPG")));
        assert!(discovery.is_supported(Path::new("test.tiff")));
        assert!(!discovery.is_supported(Path::new("test.txt")));
        assert!(!discovery.is_supported(Path::new("README")));
    }

    #[test]
    fn test_discover_directory_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("b.jpg"), [0u8; 10]).unwrap();
        std::fs::write(dir.path().join("a.png"), [0u8; 5]).unwrap();
        std::fs::write(dir.path().join("a_enhanced.jpg"), [0u8; 7]).unwrap();
        std::fs::write(dir.path().join("notes.txt"), [0u8; 3]).unwrap();
        std::fs::write(dir.path().join("nested").join("c.jpeg"), [0u8; 1]).unwrap();

        let files = FileDiscovery::new(ProcessingConfig::default())
            .skipping_suffix("_enhanced")
            .discover(dir.path());
        let names: Vec<_> = files
            .iter()
            .map(|f| f.path.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            names,
            vec![
                PathBuf::from("a.png"),
                PathBuf::from("b.jpg"),
                PathBuf::from("nested/c.jpeg"),
            ]
        );
        let sizes: Vec<u64> = files.iter().map(|f| f.size).collect();
        assert_eq!(sizes, vec![5, 10, 1]);
    }

    #[test]
    fn test_discover_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x_enhanced.jpg");
        std::fs::write(&path, [0u8; 4]).unwrap();

        // An explicitly named file is never skipped.
        let files = FileDiscovery::new(ProcessingConfig::default())
            .skipping_suffix("_enhanced")
            .discover(&path);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].size, 4);
    }
}
