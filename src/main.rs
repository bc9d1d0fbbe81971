mod config;
mod copier;
mod diff;
mod discover;
mod fingerprint;
mod scan;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::bail;
use clap::Parser;

use config::ScanConfig;
use copier::CopyStats;

#[derive(Parser)]
#[command(
    name = "photostage",
    version,
    about = "Copy new photos from a camera card into a staging directory, skipping files already in your library"
)]
struct Cli {
    /// CARD_DIR PHOTOS_DIR STAGING_DIR, or PHOTOS_DIR STAGING_DIR with --auto
    dirs: Vec<PathBuf>,

    /// Report what would be copied without writing anything
    #[arg(short, long)]
    dry_run: bool,

    /// Discover the camera card automatically under the mount directory
    #[arg(short, long)]
    auto: bool,

    /// Mount root searched for a DCIM folder in auto mode
    #[arg(long, default_value = "/Volumes")]
    mount_dir: PathBuf,

    /// Import directory used in auto mode when no card is mounted
    #[arg(long)]
    fallback_dir: Option<PathBuf>,

    /// Media extension to look for (repeatable; default jpg jpeg cr2 mov mpg mpeg avi mp4)
    #[arg(long = "ext")]
    extensions: Vec<String>,

    /// Path substring that prunes a directory from scanning (repeatable; default "aplibrary")
    #[arg(long = "exclude")]
    excludes: Vec<String>,
}

struct RunSummary {
    on_card: usize,
    to_copy: usize,
    stats: CopyStats,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let t_total = Instant::now();

    let (card_dir, photos_dir, staging_dir) = resolve_dirs(&cli)?;

    if !card_dir.is_dir() {
        bail!("cannot find card directory: {}", card_dir.display());
    }
    if !photos_dir.is_dir() {
        bail!("cannot find photos directory: {}", photos_dir.display());
    }
    if !staging_dir.is_dir() {
        bail!("cannot find staging directory: {}", staging_dir.display());
    }

    eprintln!("using card directory: {}", card_dir.display());
    eprintln!("    photos directory: {}", photos_dir.display());
    eprintln!("   staging directory: {}", staging_dir.display());

    let config = build_config(&cli);
    let summary = run(&card_dir, &photos_dir, &staging_dir, &config, cli.dry_run)?;

    if summary.to_copy == 0 {
        eprintln!("no files to copy ({} on card, all already present)", summary.on_card);
    } else if cli.dry_run {
        eprintln!("dry run - {} files would be copied", summary.to_copy);
    } else {
        eprintln!(
            "Done! {} files copied ({} renamed), {} duplicates skipped ({:.2}s)",
            summary.stats.copied,
            summary.stats.renamed,
            summary.stats.skipped,
            t_total.elapsed().as_secs_f64()
        );
    }

    Ok(())
}

/// Turn CLI positionals (and auto mode) into the three directories.
fn resolve_dirs(cli: &Cli) -> anyhow::Result<(PathBuf, PathBuf, PathBuf)> {
    if cli.auto {
        let [photos, staging] = cli.dirs.as_slice() else {
            bail!("--auto takes exactly two directories: PHOTOS_DIR STAGING_DIR");
        };
        eprintln!("searching for camera card under {}", cli.mount_dir.display());
        let card = discover::find_card_dir(&cli.mount_dir, cli.fallback_dir.as_deref())?;
        discover::ensure_staging_dir(staging)?;
        Ok((card, photos.clone(), staging.clone()))
    } else {
        let [card, photos, staging] = cli.dirs.as_slice() else {
            bail!("expected three directories: CARD_DIR PHOTOS_DIR STAGING_DIR");
        };
        Ok((card.clone(), photos.clone(), staging.clone()))
    }
}

fn build_config(cli: &Cli) -> ScanConfig {
    ScanConfig::with_overrides(&cli.extensions, &cli.excludes)
}

/// Scan all three trees, diff the card against library + staging, and copy
/// whatever is new into the staging directory.
fn run(
    card_dir: &Path,
    photos_dir: &Path,
    staging_dir: &Path,
    config: &ScanConfig,
    dry_run: bool,
) -> anyhow::Result<RunSummary> {
    eprintln!("=== Stage 1: Scanning camera card ===");
    let t = Instant::now();
    let card_index = scan::build_index(card_dir, config)?;
    eprintln!(
        "  {} media files on card ({:.2}s)",
        card_index.len(),
        t.elapsed().as_secs_f64()
    );

    eprintln!("=== Stage 2: Scanning photo library ===");
    let t = Instant::now();
    let mut reference = scan::build_index(photos_dir, config)?;
    eprintln!(
        "  {} media files in library ({:.2}s)",
        reference.len(),
        t.elapsed().as_secs_f64()
    );

    eprintln!("=== Stage 3: Scanning staging directory ===");
    let t = Instant::now();
    let staging_index = scan::build_index(staging_dir, config)?;
    eprintln!(
        "  {} media files already staged ({:.2}s)",
        staging_index.len(),
        t.elapsed().as_secs_f64()
    );
    reference.extend(staging_index);

    eprintln!("=== Stage 4: Computing files to copy ===");
    let to_copy = diff::missing_from(&card_index, &reference);
    eprintln!("  {} new files", to_copy.len());

    let stats = if to_copy.is_empty() || dry_run {
        CopyStats::default()
    } else {
        eprintln!("=== Stage 5: Copying ===");
        copier::copy_files(&to_copy, staging_dir)?
    };

    Ok(RunSummary {
        on_card: card_index.len(),
        to_copy: to_copy.len(),
        stats,
    })
}
