//! In-place module content replacement.
//!
//! The overlay stores overlapping string regions at fixed offsets, so a
//! module's content can only be rewritten where it already lives. Growth
//! would require relocating every subsequent string and rewriting the whole
//! table, so it is rejected outright; shrinkage pads the vacated tail with
//! spaces, which is harmless whitespace for the textual content this format
//! carries. The data region's length is invariant under this operation.

use crate::error::{PatchError, Result};
use crate::modules::{ModuleRecord, CONTENTS_LEN_FIELD, MODULE_RECORD_LEN};
use crate::overlay::Offsets;

/// Overwrite the content bytes of the module at `index` and patch the stored
/// content length in its table record.
pub fn replace_content(
    data: &mut [u8],
    offsets: &Offsets,
    index: usize,
    record: &ModuleRecord,
    name: &str,
    new_contents: &[u8],
) -> Result<()> {
    let original_len = record.contents.length as usize;
    let new_len = new_contents.len();
    if new_len > original_len {
        return Err(PatchError::Capacity {
            name: name.to_string(),
            original_len,
            new_len,
        });
    }

    let start = record.contents.offset as usize;
    let end = start + original_len;
    if end > data.len() {
        return Err(PatchError::Format(format!(
            "module {name:?} content {start}+{original_len} overruns data region"
        )));
    }

    data[start..start + new_len].copy_from_slice(new_contents);
    data[start + new_len..end].fill(b' ');

    let record_start = offsets.modules_ptr.offset as usize + index * MODULE_RECORD_LEN;
    let len_field = record_start + CONTENTS_LEN_FIELD;
    data[len_field..len_field + 4].copy_from_slice(&(new_len as u32).to_le_bytes());

    tracing::debug!(
        module = name,
        original_len,
        new_len,
        padded = original_len - new_len,
        "replaced module content in place"
    );
    Ok(())
}
