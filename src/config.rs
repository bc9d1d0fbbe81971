/// Default media extensions recognized on camera cards.
const DEFAULT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "cr2", "mov", "mpg", "mpeg", "avi", "mp4"];

/// Default path substrings that prune a directory subtree from scanning.
/// Aperture libraries look like plain folders full of JPEGs but are managed
/// storage that must never be treated as loose photos.
const DEFAULT_EXCLUDES: &[&str] = &["aplibrary"];

/// Which files a scan considers, passed explicitly to the scanner and copier.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Lowercase extensions without the leading dot.
    extensions: Vec<String>,
    /// Any directory whose path contains one of these is skipped entirely.
    excludes: Vec<String>,
}

impl ScanConfig {
    pub fn new<S: AsRef<str>>(extensions: &[S], excludes: &[S]) -> Self {
        Self {
            extensions: extensions.iter().map(normalize_extension).collect(),
            excludes: excludes.iter().map(|e| e.as_ref().to_string()).collect(),
        }
    }

    /// Apply CLI overrides on top of the defaults; an empty list keeps the
    /// corresponding default.
    pub fn with_overrides(extensions: &[String], excludes: &[String]) -> Self {
        let mut config = Self::default();
        if !extensions.is_empty() {
            config.extensions = extensions.iter().map(normalize_extension).collect();
        }
        if !excludes.is_empty() {
            config.excludes = excludes.to_vec();
        }
        config
    }

    /// Check a file extension (without dot) against the allow-list.
    pub fn matches_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| ext.eq_ignore_ascii_case(e))
    }

    /// Check whether a path string contains any excluded substring.
    pub fn is_excluded(&self, path: &str) -> bool {
        self.excludes.iter().any(|ex| path.contains(ex.as_str()))
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS, DEFAULT_EXCLUDES)
    }
}

fn normalize_extension<S: AsRef<str>>(ext: S) -> String {
    ext.as_ref().trim_start_matches('.').to_ascii_lowercase()
}
