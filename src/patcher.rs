//! High-level patching operations.
//!
//! Ties the pipeline together: parse the executable, decode the overlay
//! layout, walk the module table, locate the target module, and either hand
//! its content back (extract) or rewrite it in place and re-emit the file
//! (repack). Every structure is re-derived from the file on each call; the
//! only durable artifact is the rewritten executable.

use std::path::Path;

use crate::error::Result;
use crate::executable::{self, Executable};
use crate::modules::{ModuleMatcher, ModuleTable};
use crate::overlay::OverlayLayout;
use crate::replace::replace_content;
use crate::writer;

/// Extract the raw script content of the named module.
pub fn extract(path: &Path, module: &str) -> Result<Vec<u8>> {
    let exe = Executable::open(path)?;
    let layout = OverlayLayout::decode(exe.data(), exe.overlay_start())?;
    let region = layout.data_region(exe.data());
    let table = ModuleTable::new(region, &layout.offsets)?;
    let entry = table.find(&ModuleMatcher::new(module))?;
    let contents = entry.record.contents.resolve(region)?;
    tracing::info!(
        module = entry.name,
        len = contents.len(),
        "extracted module content"
    );
    Ok(contents.to_vec())
}

/// Names of every module embedded in the executable, in table order.
pub fn list_modules(path: &Path) -> Result<Vec<String>> {
    let exe = Executable::open(path)?;
    let layout = OverlayLayout::decode(exe.data(), exe.overlay_start())?;
    let region = layout.data_region(exe.data());
    ModuleTable::new(region, &layout.offsets)?.names()
}

/// Replace the named module's content with `new_contents` and write the
/// result to `output` (which may equal `input`).
pub fn replace_module(input: &Path, output: &Path, module: &str, new_contents: &[u8]) -> Result<()> {
    repack_with(input, output, module, |_| new_contents.to_vec())
}

/// Repack `input` into `output`, passing the target module's current content
/// through `transform`. The transform's output is treated as opaque bytes,
/// subject only to the not-larger-than-original constraint.
///
/// On success the output is a valid executable with the same total size as
/// the input; on failure the destination is left untouched.
pub fn repack_with<F>(input: &Path, output: &Path, module: &str, transform: F) -> Result<()>
where
    F: FnOnce(&[u8]) -> Vec<u8>,
{
    let exe = Executable::open(input)?;
    let layout = OverlayLayout::decode(exe.data(), exe.overlay_start())?;
    let region = layout.data_region(exe.data());
    let table = ModuleTable::new(region, &layout.offsets)?;
    let entry = table.find(&ModuleMatcher::new(module))?;
    let (index, record) = (entry.index, entry.record);
    let name = entry.name.to_string();

    let new_contents = transform(record.contents.resolve(region)?);
    let mut data = region.to_vec();
    replace_content(&mut data, &layout.offsets, index, &record, &name, &new_contents)?;
    writer::write_patched(input, output, exe.data(), &layout, &data)?;
    drop(exe);

    executable::validate(output)?;
    tracing::info!(
        module = %name,
        output = %output.display(),
        "repacked executable"
    );
    Ok(())
}
