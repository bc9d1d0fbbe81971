use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::config::ScanConfig;
use crate::fingerprint::{self, FileEntry};

/// Walk a directory tree and fingerprint every matching media file.
///
/// Directories whose path contains an excluded substring are pruned, not
/// enumerated-then-filtered, so a large Aperture library never gets walked.
/// Fingerprinting runs in parallel over the collected paths; the returned
/// index keeps enumeration order. Any unreadable file aborts the scan.
pub fn build_index(root: &Path, config: &ScanConfig) -> anyhow::Result<Vec<FileEntry>> {
    let mut paths = Vec::new();

    let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
        !config.is_excluded(&entry.path().to_string_lossy())
    });

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .map_or(false, |ext| config.matches_extension(ext));
        if matches {
            paths.push(entry.into_path());
        }
    }

    if paths.is_empty() {
        return Ok(Vec::new());
    }

    let pb = ProgressBar::new(paths.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40}] {pos}/{len} fingerprinting")
            .unwrap(),
    );

    let entries: Vec<FileEntry> = paths
        .into_par_iter()
        .map(|path| -> anyhow::Result<FileEntry> {
            let fp = fingerprint::fingerprint(&path)?;
            pb.inc(1);
            Ok(FileEntry {
                fingerprint: fp,
                path,
            })
        })
        .collect::<anyhow::Result<_>>()?;

    pb.finish_and_clear();

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::tempdir;

    fn write_file(path: &Path, data: &[u8]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        File::create(path).unwrap().write_all(data).unwrap();
    }

    #[test]
    fn test_extension_filtering() {
        let dir = tempdir().unwrap();
        write_file(&dir.path().join("IMG_0001.JPG"), &[1u8; 100]);
        write_file(&dir.path().join("IMG_0002.jpeg"), &[2u8; 100]);
        write_file(&dir.path().join("notes.txt"), b"not a photo");
        write_file(&dir.path().join("clip.PNG"), &[3u8; 100]);

        let index = build_index(dir.path(), &ScanConfig::default()).unwrap();
        let mut names: Vec<String> = index
            .iter()
            .map(|e| e.path.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["IMG_0001.JPG", "IMG_0002.jpeg"]);
    }

    #[test]
    fn test_recursive_walk() {
        let dir = tempdir().unwrap();
        write_file(&dir.path().join("100CANON/IMG_0001.JPG"), &[1u8; 100]);
        write_file(&dir.path().join("101CANON/movies/MVI_0001.MOV"), &[2u8; 100]);

        let index = build_index(dir.path(), &ScanConfig::default()).unwrap();
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_exclusion_prunes_subtree() {
        let dir = tempdir().unwrap();
        write_file(&dir.path().join("keep/IMG_0001.JPG"), &[1u8; 100]);
        write_file(
            &dir.path().join("Work.aplibrary/Masters/IMG_0002.JPG"),
            &[2u8; 100],
        );
        write_file(
            &dir.path().join("Work.aplibrary/Masters/deep/IMG_0003.JPG"),
            &[3u8; 100],
        );

        let index = build_index(dir.path(), &ScanConfig::default()).unwrap();
        assert_eq!(index.len(), 1);
        assert!(index[0].path.ends_with("keep/IMG_0001.JPG"));
    }

    #[test]
    fn test_empty_tree() {
        let dir = tempdir().unwrap();
        let index = build_index(dir.path(), &ScanConfig::default()).unwrap();
        assert!(index.is_empty());
    }
}
