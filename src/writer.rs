//! Patched executable writer.
//!
//! Splices the original file's prefix, the mutated data region, and the
//! unchanged overlay suffix (offsets struct, trailer, total byte count) into
//! a temporary file, copies the original permission bits onto it, and renames
//! it over the destination. The destination is never observed partially
//! written; the temporary file is removed on any failure.

use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{PatchError, Result};
use crate::overlay::OverlayLayout;

// errno values for a target executable that is currently running
const ETXTBSY: i32 = 26;
const EBUSY: i32 = 16;

/// Write the patched executable to `output`.
///
/// `original` is the complete input file, `data` the mutated data region.
/// The data region length is invariant under patching, so everything outside
/// `[layout.data_start, layout.data_end())` is copied verbatim and the output
/// has the same total size as the input.
pub fn write_patched(
    input: &Path,
    output: &Path,
    original: &[u8],
    layout: &OverlayLayout,
    data: &[u8],
) -> Result<()> {
    debug_assert_eq!(data.len(), layout.data_len);

    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(&original[..layout.data_start])?;
    tmp.write_all(data)?;
    tmp.write_all(&original[layout.data_end()..])?;
    tmp.flush()?;

    let permissions = fs::metadata(input)?.permissions();
    tracing::debug!(
        output = %output.display(),
        total_len = original.len(),
        mode = permissions.mode(),
        "renaming patched executable into place"
    );
    fs::set_permissions(tmp.path(), permissions)?;

    // Dropping the PersistError also removes the temporary file.
    tmp.persist(output)
        .map_err(|err| classify_persist_failure(err.error, output))?;
    Ok(())
}

fn classify_persist_failure(err: std::io::Error, output: &Path) -> PatchError {
    match err.raw_os_error() {
        Some(ETXTBSY) | Some(EBUSY) => PatchError::ResourceBusy {
            path: output.to_path_buf(),
            source: err,
        },
        _ => PatchError::Io(err),
    }
}
