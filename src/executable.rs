//! Executable parsing.
//!
//! Finds where the ELF structural content ends and the appended overlay
//! begins, and provides the cheap post-write magic check. Only the ELF
//! header, program header table, and section header table are read; nothing
//! here interprets the sections themselves.

use memmap2::Mmap;
use object::elf;
use object::read::elf::{FileHeader, ProgramHeader, SectionHeader};
use object::Endianness;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{PatchError, Result};
use crate::overlay::MIN_OVERLAY_LEN;

/// A memory-mapped candidate executable with its overlay boundary resolved.
pub struct Executable {
    mmap: Mmap,
    overlay_start: usize,
}

impl Executable {
    /// Open and map the file read-only, then locate the overlay boundary.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        let overlay_start = find_overlay_start(&mmap)?;
        if mmap.len() - overlay_start < MIN_OVERLAY_LEN {
            return Err(PatchError::Format(
                "no module data appended after the ELF content".into(),
            ));
        }
        tracing::debug!(
            overlay_start,
            overlay_len = mmap.len() - overlay_start,
            "located overlay"
        );
        Ok(Self {
            mmap,
            overlay_start,
        })
    }

    /// The complete file bytes.
    pub fn data(&self) -> &[u8] {
        &self.mmap
    }

    /// Absolute file offset where the trailing overlay begins.
    pub fn overlay_start(&self) -> usize {
        self.overlay_start
    }
}

/// Compute the end of the ELF structural content: the highest file offset
/// covered by the header tables, any segment's file range, or any section's
/// data (SHT_NOBITS sections occupy no file bytes and are skipped).
fn find_overlay_start(data: &[u8]) -> Result<usize> {
    let header = elf::FileHeader64::<Endianness>::parse(data).map_err(format_err)?;
    let endian = header.endian().map_err(format_err)?;
    let sections = header.section_headers(endian, data).map_err(format_err)?;
    let segments = header.program_headers(endian, data).map_err(format_err)?;

    let mut end = header.e_ehsize.get(endian) as u64;
    if !segments.is_empty() {
        end = end.max(
            header.e_phoff.get(endian)
                + segments.len() as u64 * header.e_phentsize.get(endian) as u64,
        );
    }
    if !sections.is_empty() {
        end = end.max(
            header.e_shoff.get(endian)
                + sections.len() as u64 * header.e_shentsize.get(endian) as u64,
        );
    }
    for segment in segments {
        let (offset, size) = segment.file_range(endian);
        end = end.max(offset + size);
    }
    for section in sections {
        if let Some((offset, size)) = section.file_range(endian) {
            end = end.max(offset + size);
        }
    }

    if end as usize > data.len() {
        return Err(PatchError::Format(format!(
            "ELF structures claim {end} bytes but the file holds {}",
            data.len()
        )));
    }
    Ok(end as usize)
}

fn format_err(err: object::read::Error) -> PatchError {
    PatchError::Format(err.to_string())
}

/// Post-write check: the output must still start with the ELF magic.
///
/// Deliberately not a full re-parse; this catches gross splicing mistakes
/// immediately instead of producing a silently broken executable.
pub fn validate(path: &Path) -> Result<()> {
    let mut magic = [0u8; 4];
    File::open(path)?.read_exact(&mut magic)?;
    if magic != elf::ELFMAG {
        return Err(PatchError::Corruption {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}
