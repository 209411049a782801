use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Lists every regular file under `root`, depth first, in directory-listing order.
///
/// A `root` that is itself a file yields just that file. Symbolic links are followed.
pub fn list_files(root: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();
    if !root.exists() {
        bail!("Input path does not exist: {}", root.display());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry =
            entry.with_context(|| format!("Failed to walk input tree: {}", root.display()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    debug!(root = %root.display(), files = files.len(), "Enumerated input files");
    Ok(files)
}

/// Enumerates several roots in order. Every root is checked before any is walked.
pub fn list_inputs<P: AsRef<Path>>(roots: &[P]) -> Result<Vec<PathBuf>> {
    if let Some(missing) = roots.iter().find(|r| !r.as_ref().exists()) {
        bail!("Input path does not exist: {}", missing.as_ref().display());
    }

    let mut files = Vec::new();
    for root in roots {
        files.extend(list_files(root)?);
    }
    Ok(files)
}
