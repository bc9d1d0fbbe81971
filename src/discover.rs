use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};

/// Find a mounted camera card: the first subdirectory of `mount_dir` that
/// contains a `DCIM` folder. Falls back to `fallback_dir` if given and
/// present (covers photos already copied off the card by hand).
pub fn find_card_dir(
    mount_dir: &Path,
    fallback_dir: Option<&Path>,
) -> anyhow::Result<PathBuf> {
    if mount_dir.is_dir() {
        let entries = fs::read_dir(mount_dir)
            .with_context(|| format!("reading mount directory {}", mount_dir.display()))?;
        for entry in entries {
            let dcim = entry?.path().join("DCIM");
            if dcim.is_dir() {
                return Ok(dcim);
            }
        }
    }

    if let Some(fallback) = fallback_dir {
        if fallback.is_dir() {
            eprintln!(
                "no card found, using fallback import location {}",
                fallback.display()
            );
            return Ok(fallback.to_path_buf());
        }
    }

    bail!("no camera card found under {}", mount_dir.display());
}

/// Create the staging directory if it does not exist yet (auto mode only;
/// explicit paths are validated, not created).
pub fn ensure_staging_dir(staging_dir: &Path) -> anyhow::Result<()> {
    if !staging_dir.exists() {
        eprintln!("creating staging directory {}", staging_dir.display());
        fs::create_dir_all(staging_dir)
            .with_context(|| format!("creating {}", staging_dir.display()))?;
    }
    Ok(())
}
