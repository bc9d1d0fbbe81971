use std::collections::HashSet;
use std::path::PathBuf;

use crate::fingerprint::{FileEntry, Fingerprint};

/// Return the paths from `source` whose fingerprint never appears in
/// `reference`, preserving source order.
///
/// The reference side is collected into a hash set keyed by the whole
/// fingerprint tuple, so membership is still exact equality (name, size and
/// tail sample all match) with no partial matching.
pub fn missing_from(source: &[FileEntry], reference: &[FileEntry]) -> Vec<PathBuf> {
    let have: HashSet<&Fingerprint> = reference.iter().map(|e| &e.fingerprint).collect();
    source
        .iter()
        .filter(|e| !have.contains(&e.fingerprint))
        .map(|e| e.path.clone())
        .collect()
}
