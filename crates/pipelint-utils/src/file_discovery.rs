use anyhow::Result;
use std::path::{Path, PathBuf};

/// Finds manifest files under a root path.
///
/// Results are sorted so reports come out in a stable order. Hidden
/// directories (such as `.git`) are never entered.
pub struct FileDiscovery {
    root_path: PathBuf,
    supported_extensions: Vec<String>,
    excludes: Vec<String>,
}

impl FileDiscovery {
    /// Default manifest extensions
    const DEFAULT_EXTENSIONS: &'static [&'static str] = &["yaml", "yml"];

    /// Create a new FileDiscovery with default extensions
    pub fn new(root_path: PathBuf) -> Self {
        Self {
            root_path,
            supported_extensions: Self::DEFAULT_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            excludes: Vec::new(),
        }
    }

    /// Create a new FileDiscovery with custom extensions
    pub fn with_extensions(root_path: PathBuf, extensions: Vec<String>) -> Self {
        Self {
            root_path,
            supported_extensions: extensions.into_iter().map(|e| e.to_lowercase()).collect(),
            excludes: Vec::new(),
        }
    }

    /// Skip any path whose string form contains one of `excludes`
    pub fn with_excludes(mut self, excludes: Vec<String>) -> Self {
        self.excludes = excludes;
        self
    }

    pub fn is_supported_extension(&self, ext: &str) -> bool {
        self.supported_extensions.contains(&ext.to_lowercase())
    }

    /// Get all manifest files in the root path
    pub fn get_files(&self) -> Result<Vec<PathBuf>> {
        self.get_files_in_path(&self.root_path)
    }

    /// Get all manifest files in a specific path
    pub fn get_files_in_path(&self, path: &Path) -> Result<Vec<PathBuf>> {
        if path.is_file() {
            // An explicitly named file is taken as-is, whatever its extension.
            return Ok(vec![path.to_path_buf()]);
        }

        if !path.is_dir() {
            anyhow::bail!("Path does not exist: {}", path.display());
        }

        let mut files = Vec::new();
        self.visit_dirs(path, &mut |p: &Path| {
            if self.is_manifest(p) {
                files.push(p.to_path_buf());
            }
        })?;
        files.sort();

        log::debug!("Discovered {} manifest(s) under {}", files.len(), path.display());
        Ok(files)
    }

    fn is_manifest(&self, path: &Path) -> bool {
        if self.is_excluded(path) {
            log::debug!("Excluded {}", path.display());
            return false;
        }
        path.extension()
            .map(|ext| self.is_supported_extension(&ext.to_string_lossy()))
            .unwrap_or(false)
    }

    fn is_excluded(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        self.excludes
            .iter()
            .any(|pattern| !pattern.is_empty() && path_str.contains(pattern.as_str()))
    }

    /// Recursively visit directories and call callback for each file
    pub fn visit_dirs<F>(&self, dir: &Path, cb: &mut F) -> std::io::Result<()>
    where
        F: FnMut(&Path),
    {
        if dir.is_dir() {
            for entry in std::fs::read_dir(dir)? {
                let entry = entry?;
                let path = entry.path();
                if path.is_dir() {
                    let hidden = path
                        .file_name()
                        .map(|name| name.to_string_lossy().starts_with('.'))
                        .unwrap_or(false);
                    if !hidden {
                        self.visit_dirs(&path, cb)?;
                    }
                } else {
                    cb(&path);
                }
            }
        }
        Ok(())
    }
}
