//! Untracked-path audit over managed directories

use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::utils::real_path;

/// Lists entries of managed directories that no target owns
///
/// A directory that disappeared is skipped; any other read failure is
/// reported. Results are sorted.
pub fn find_untracked(
    expected_children: &BTreeMap<PathBuf, BTreeSet<OsString>>,
    ignore: &BTreeSet<PathBuf>,
) -> std::io::Result<Vec<PathBuf>> {
    let per_dir: Vec<std::io::Result<Vec<PathBuf>>> = expected_children
        .par_iter()
        .map(|(dir, owned)| untracked_in(dir, owned, ignore))
        .collect();

    let mut untracked = Vec::new();
    for result in per_dir {
        untracked.extend(result?);
    }
    untracked.par_sort();
    Ok(untracked)
}

fn untracked_in(
    dir: &Path,
    owned: &BTreeSet<OsString>,
    ignore: &BTreeSet<PathBuf>,
) -> std::io::Result<Vec<PathBuf>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(dir = %dir.display(), "managed directory missing, skipped");
            return Ok(Vec::new());
        }
        Err(err) => return Err(err),
    };

    let mut found = Vec::new();
    for entry in entries {
        let entry = entry?;
        if owned.contains(&entry.file_name()) {
            continue;
        }
        let path = entry.path();
        if ignore.contains(&path) || ignore.contains(&real_path(&path)) {
            continue;
        }
        found.push(path);
    }
    Ok(found)
}
