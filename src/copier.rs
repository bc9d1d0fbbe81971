use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use indicatif::{ProgressBar, ProgressStyle};

use crate::fingerprint;

/// Upper bound on rename attempts before giving up on a destination name.
/// The original recursed without limit; a bound surfaces pathological
/// destinations instead of looping silently.
const MAX_RENAME_ATTEMPTS: u32 = 4096;

#[derive(Debug, Default, Clone, Copy)]
pub struct CopyStats {
    /// Files written into the destination (including renamed ones).
    pub copied: u64,
    /// Files skipped because an identical fingerprint already sat at the
    /// colliding name.
    pub skipped: u64,
    /// Subset of `copied` that needed a numeric rename suffix.
    pub renamed: u64,
}

enum Outcome {
    Copied,
    Renamed,
    DuplicateSkipped,
}

/// Copy each file into `dest_dir`, renaming on name collisions and skipping
/// true duplicates. Stops at the first copy error; files already written
/// stay in place.
pub fn copy_files(files: &[PathBuf], dest_dir: &Path) -> anyhow::Result<CopyStats> {
    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40}] {pos}/{len} copying {msg}")
            .unwrap(),
    );

    let mut stats = CopyStats::default();
    for path in files {
        pb.set_message(
            path.file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("")
                .to_string(),
        );
        match copy_file(path, dest_dir, &pb)? {
            Outcome::Copied => stats.copied += 1,
            Outcome::Renamed => {
                stats.copied += 1;
                stats.renamed += 1;
            }
            Outcome::DuplicateSkipped => stats.skipped += 1,
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    Ok(stats)
}

/// Place one file into the destination directory.
///
/// Attempt 0 keeps the original name. On a collision the existing file and
/// the source are fingerprinted: equal means the file is already there and
/// the copy is skipped; different means an unrelated file owns the name, so
/// the next attempt tries `<stem>-<n>.<ext>` starting at `-2`. The loop is
/// bounded, and the duplicate check runs at every candidate name, so a copy
/// staged under a suffixed name on an earlier run is still recognized.
fn copy_file(source: &Path, dest_dir: &Path, pb: &ProgressBar) -> anyhow::Result<Outcome> {
    let file_name = source
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("source has no usable file name: {}", source.display()))?;
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);
    let ext = Path::new(file_name)
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("");

    for attempt in 0..MAX_RENAME_ATTEMPTS {
        let target_name = if attempt == 0 {
            file_name.to_string()
        } else if ext.is_empty() {
            format!("{}-{}", stem, attempt + 1)
        } else {
            format!("{}-{}.{}", stem, attempt + 1, ext)
        };
        let target = dest_dir.join(&target_name);

        if target.exists() {
            let existing = fingerprint::fingerprint(&target)?;
            let incoming = fingerprint::fingerprint(source)?;
            if existing == incoming {
                pb.println(format!(
                    "duplicate file found in destination - skipping {}",
                    file_name
                ));
                return Ok(Outcome::DuplicateSkipped);
            }
            continue;
        }

        copy_into_place(source, &target)?;
        if attempt > 0 {
            pb.println(format!(
                "duplicate file name found - renamed {} to {}",
                file_name, target_name
            ));
            return Ok(Outcome::Renamed);
        }
        return Ok(Outcome::Copied);
    }

    bail!(
        "destination exhausted: no free name for {} after {} attempts",
        file_name,
        MAX_RENAME_ATTEMPTS
    );
}

/// Copy via a `.part` temp file and rename, so a failed transfer never
/// leaves a half-written file under the final name. Carries the source
/// mtime onto the copy.
fn copy_into_place(source: &Path, target: &Path) -> anyhow::Result<()> {
    let mut part_name = target
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("copy")
        .to_string();
    part_name.push_str(".part");
    let part = target.with_file_name(part_name);

    if let Err(e) = fs::copy(source, &part) {
        let _ = fs::remove_file(&part);
        return Err(e).with_context(|| {
            format!("copying {} to {}", source.display(), part.display())
        });
    }

    if let Ok(meta) = fs::metadata(source) {
        let mtime = filetime::FileTime::from_last_modification_time(&meta);
        filetime::set_file_mtime(&part, mtime).ok();
    }

    fs::rename(&part, target).with_context(|| {
        format!("moving {} into place at {}", part.display(), target.display())
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_file(path: &Path, data: &[u8]) {
        File::create(path).unwrap().write_all(data).unwrap();
    }

    fn progress() -> ProgressBar {
        ProgressBar::hidden()
    }

    #[test]
    fn test_plain_copy() {
        let src = tempdir().unwrap();
        let dst = tempdir().unwrap();
        let source = src.path().join("IMG_0001.JPG");
        write_file(&source, &[1u8; 5000]);

        let stats = copy_files(&[source], dst.path()).unwrap();
        assert_eq!(stats.copied, 1);
        assert_eq!(stats.skipped, 0);
        assert_eq!(stats.renamed, 0);
        assert_eq!(fs::read(dst.path().join("IMG_0001.JPG")).unwrap(), vec![1u8; 5000]);
    }

    #[test]
    fn test_collision_renames_without_touching_original() {
        let src = tempdir().unwrap();
        let dst = tempdir().unwrap();
        let source = src.path().join("IMG_0001.JPG");
        write_file(&source, &[1u8; 5000]);
        // Unrelated file already owns the name.
        write_file(&dst.path().join("IMG_0001.JPG"), &[9u8; 3000]);

        let outcome = copy_file(&source, dst.path(), &progress()).unwrap();
        assert!(matches!(outcome, Outcome::Renamed));
        assert_eq!(fs::read(dst.path().join("IMG_0001.JPG")).unwrap(), vec![9u8; 3000]);
        assert_eq!(fs::read(dst.path().join("IMG_0001-2.JPG")).unwrap(), vec![1u8; 5000]);
    }

    #[test]
    fn test_second_collision_takes_next_suffix() {
        let src = tempdir().unwrap();
        let dst = tempdir().unwrap();
        let source = src.path().join("IMG_0001.JPG");
        write_file(&source, &[1u8; 5000]);
        write_file(&dst.path().join("IMG_0001.JPG"), &[8u8; 3000]);
        write_file(&dst.path().join("IMG_0001-2.JPG"), &[9u8; 4000]);

        let outcome = copy_file(&source, dst.path(), &progress()).unwrap();
        assert!(matches!(outcome, Outcome::Renamed));
        assert_eq!(fs::read(dst.path().join("IMG_0001-3.JPG")).unwrap(), vec![1u8; 5000]);
    }

    #[test]
    fn test_true_duplicate_skipped() {
        let src = tempdir().unwrap();
        let dst = tempdir().unwrap();
        let source = src.path().join("IMG_0001.JPG");
        write_file(&source, &[1u8; 5000]);
        write_file(&dst.path().join("IMG_0001.JPG"), &[1u8; 5000]);

        let outcome = copy_file(&source, dst.path(), &progress()).unwrap();
        assert!(matches!(outcome, Outcome::DuplicateSkipped));
        // No renamed copy appeared.
        assert!(!dst.path().join("IMG_0001-2.JPG").exists());
    }

    #[test]
    fn test_duplicate_found_under_suffixed_name() {
        let src = tempdir().unwrap();
        let dst = tempdir().unwrap();
        let source = src.path().join("IMG_0001.JPG");
        write_file(&source, &[1u8; 5000]);
        // Name taken by an unrelated file, but a prior run already staged
        // this photo under the -2 suffix.
        write_file(&dst.path().join("IMG_0001.JPG"), &[9u8; 3000]);
        write_file(&dst.path().join("IMG_0001-2.JPG"), &[1u8; 5000]);

        let outcome = copy_file(&source, dst.path(), &progress()).unwrap();
        assert!(matches!(outcome, Outcome::DuplicateSkipped));
        assert!(!dst.path().join("IMG_0001-3.JPG").exists());
    }

    #[test]
    fn test_no_part_files_left_behind() {
        let src = tempdir().unwrap();
        let dst = tempdir().unwrap();
        let source = src.path().join("IMG_0001.JPG");
        write_file(&source, &[1u8; 5000]);

        copy_files(&[source], dst.path()).unwrap();
        let leftovers: Vec<_> = fs::read_dir(dst.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".part"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_mtime_preserved() {
        let src = tempdir().unwrap();
        let dst = tempdir().unwrap();
        let source = src.path().join("IMG_0001.JPG");
        write_file(&source, &[1u8; 5000]);
        let old = filetime::FileTime::from_unix_time(946684800, 0); // 2000-01-01
        filetime::set_file_mtime(&source, old).unwrap();

        copy_files(&[source], dst.path()).unwrap();
        let meta = fs::metadata(dst.path().join("IMG_0001.JPG")).unwrap();
        assert_eq!(filetime::FileTime::from_last_modification_time(&meta), old);
    }
}
