use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use anyhow::Context;

/// How far before end-of-file the tail sample starts.
const TAIL_OFFSET: u64 = 1024;

/// How many bytes of the tail sample to read.
const TAIL_LEN: u64 = 16;

/// Heuristic file identity: base name, exact size, and a small sample of
/// bytes near the end of the file. Much cheaper than a checksum and good
/// enough to recognize the same shot across a card, a library and a staging
/// folder. Not a cryptographic guarantee in either direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    /// File name truncated at the first `-`, then at the first `.`, so
    /// rename suffixes like `IMG_0001-2.JPG` fold back to `IMG_0001`.
    pub name: String,
    /// Size in bytes from filesystem metadata.
    pub size: u64,
    /// Up to 16 bytes read starting 1024 bytes before end-of-file. For files
    /// shorter than 1024 bytes the read is clamped to the start of the file,
    /// so it holds min(16, size) bytes.
    pub tail: Vec<u8>,
}

/// One scanned file: its fingerprint plus where it lives.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub fingerprint: Fingerprint,
    pub path: PathBuf,
}

/// Compute the fingerprint of a single file.
pub fn fingerprint(path: &Path) -> anyhow::Result<Fingerprint> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let name = base_name(file_name).to_string();

    let meta = std::fs::metadata(path)
        .with_context(|| format!("reading metadata for {}", path.display()))?;
    let size = meta.len();

    let mut file =
        File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let start = size.saturating_sub(TAIL_OFFSET);
    file.seek(SeekFrom::Start(start))
        .with_context(|| format!("seeking in {}", path.display()))?;
    let mut tail = Vec::with_capacity(TAIL_LEN as usize);
    file.take(TAIL_LEN)
        .read_to_end(&mut tail)
        .with_context(|| format!("sampling {}", path.display()))?;

    Ok(Fingerprint { name, size, tail })
}

/// Strip a numeric/duplicate suffix and the extension from a file name.
fn base_name(file_name: &str) -> &str {
    let before_dash = file_name.split('-').next().unwrap_or(file_name);
    before_dash.split('.').next().unwrap_or(before_dash)
}
