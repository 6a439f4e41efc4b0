//! Writing generated files to the output directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::core::types::GameFiles;

/// Write every present canonical file into `dir`, creating it if needed.
///
/// Each file is written to a temp path and renamed into place. Existing
/// files with the same names are replaced; other files in `dir` are left
/// alone. Returns the written paths in canonical order.
pub fn write_game_files(dir: &Path, files: &GameFiles) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("create directory {}", dir.display()))?;

    let mut written = Vec::with_capacity(files.len());
    for (file, contents) in files.iter() {
        let path = dir.join(file.name());
        let tmp_path = dir.join(format!(".{}.tmp", file.name()));
        fs::write(&tmp_path, contents)
            .with_context(|| format!("write temp file {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &path).with_context(|| format!("replace {}", path.display()))?;
        written.push(path);
    }
    info!(dir = %dir.display(), count = written.len(), "wrote game files");
    Ok(written)
}
