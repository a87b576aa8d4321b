//! File system utilities.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Writes content to a file atomically using a temp file and rename.
///
/// The temp file lives next to the target so the rename stays on one
/// filesystem. On Unix it is created owner-only, since the config file can
/// hold an API key. The temp file is removed if any step fails.
pub fn atomic_write(path: &Path, content: &str) -> Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path.file_name().unwrap_or_default().to_string_lossy();
    let temp_path = parent.join(format!(".{file_name}.tmp"));

    // Leftover from an interrupted write; may carry looser permissions.
    match fs::remove_file(&temp_path) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => {
            return Err(err)
                .with_context(|| format!("Failed to remove stale temp file: {}", temp_path.display()));
        }
        _ => {}
    }

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let file = options
        .open(&temp_path)
        .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

    let written = write_and_sync(file, content)
        .with_context(|| format!("Failed to write temp file: {}", temp_path.display()))
        .and_then(|()| {
            fs::rename(&temp_path, path)
                .with_context(|| format!("Failed to replace file: {}", path.display()))
        });

    if written.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    written
}

fn write_and_sync(mut file: File, content: &str) -> io::Result<()> {
    file.write_all(content.as_bytes())?;
    file.sync_all()
}
