// In: src/bridge/dest_dir.rs

use std::fs;
use std::path::Path;

use crate::error::CsvTileError;

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

/// Makes sure `dest` exists and holds no visible entries.
///
/// A missing directory is created. Hidden entries are tolerated with a
/// warning; any other entry fails with `DestinationNotEmpty`.
pub fn prepare_destination(dest: &Path) -> Result<(), CsvTileError> {
    if !dest.exists() {
        log::info!("output directory {:?} does not exist, creating it", dest);
        fs::create_dir_all(dest)?;
        return Ok(());
    }

    let mut hidden = 0usize;
    let mut visible = 0usize;
    for entry in fs::read_dir(dest)? {
        let entry = entry?;
        let name = entry.file_name();
        if is_hidden(&name) {
            hidden += 1;
            continue;
        }
        visible += 1;
        let kind = match entry.file_type() {
            Ok(t) if t.is_dir() => "a directory",
            Ok(t) if t.is_symlink() => "a symlink",
            Ok(t) if t.is_file() => "a regular file",
            _ => "a special file",
        };
        log::error!("output directory contains {:?}, {}", name, kind);
    }

    if visible > 0 {
        return Err(CsvTileError::DestinationNotEmpty {
            path: dest.to_path_buf(),
            entries: visible,
        });
    }
    if hidden > 0 {
        log::warn!(
            "output directory {:?} contains {} hidden entries, continuing",
            dest,
            hidden
        );
    }
    Ok(())
}
