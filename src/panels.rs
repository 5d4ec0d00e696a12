use crate::error::{ArchiveError, Result};
use std::{fs, path::Path};

/// Guesses which entries of `dir` are comic panels: those whose name, minus
/// the extension, is all decimal digits. Sorted as strings, so `10.jpg` comes
/// before `2.jpg`; numerically named non-images are picked up too.
pub fn guess_panel_files(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| ArchiveError::io(dir, e))? {
        let entry = entry.map_err(|e| ArchiveError::io(dir, e))?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    names.retain(|name| is_panel_name(name));
    Ok(names)
}

fn is_panel_name(name: &str) -> bool {
    let stem = Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    !stem.is_empty() && stem.chars().all(|c| c.is_ascii_digit())
}
