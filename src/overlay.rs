//! Overlay layout decoding.
//!
//! A standalone executable ends with an overlay appended after the ELF
//! structural content. Reading backwards from the end of the file:
//!
//! ```text
//! [ data region (byte_count bytes) ][ Offsets (32) ][ trailer (16) ][ total (8) ]
//! ```
//!
//! The data region holds module names, contents, and the module table itself,
//! all addressed by offset+length pairs relative to the region start. String
//! regions may overlap; nothing here assumes they are disjoint.

use crate::error::{PatchError, Result};

/// Magic sequence terminating the overlay's structured data.
pub const TRAILER: [u8; 16] = *b"\n---- Bun! ----\n";

/// On-disk size of the [`Offsets`] struct.
pub const OFFSETS_LEN: usize = 32;

/// Size of the trailing total-byte-count field.
pub const SIZE_FIELD_LEN: usize = 8;

/// Smallest overlay that can hold the bookkeeping structures alone.
pub const MIN_OVERLAY_LEN: usize = OFFSETS_LEN + TRAILER.len() + SIZE_FIELD_LEN;

/// Sanity cap on the stored total byte count.
const MAX_TOTAL_BYTES: u64 = 4 * 1024 * 1024 * 1024;

/// An offset+length pair addressing a byte range within the data region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringPointer {
    pub offset: u32,
    pub length: u32,
}

impl StringPointer {
    pub const LEN: usize = 8;

    /// Decode from 8 little-endian bytes. Panics if `bytes` is shorter.
    pub fn parse(bytes: &[u8]) -> Self {
        Self {
            offset: u32::from_le_bytes(bytes[0..4].try_into().unwrap()),
            length: u32::from_le_bytes(bytes[4..8].try_into().unwrap()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Resolve against the data region, checking bounds.
    pub fn resolve<'a>(&self, data: &'a [u8]) -> Result<&'a [u8]> {
        let start = self.offset as usize;
        let end = start + self.length as usize;
        if end > data.len() {
            return Err(PatchError::Format(format!(
                "string pointer {}+{} overruns data region of {} bytes",
                self.offset,
                self.length,
                data.len()
            )));
        }
        Ok(&data[start..end])
    }
}

/// The fixed bookkeeping struct stored between the data region and the trailer.
///
/// On disk: byte_count (u64), modules_ptr (8), entry_point_id (u32),
/// argv (8), 4 bytes padding. All little-endian.
#[derive(Debug, Clone, Copy)]
pub struct Offsets {
    /// Size of the data region in bytes.
    pub byte_count: u64,
    /// Location of the packed module table within the data region.
    pub modules_ptr: StringPointer,
    /// Index of the entry-point module (unused by the patcher, preserved verbatim).
    pub entry_point_id: u32,
    /// Serialized exec argv, if any (preserved verbatim).
    pub argv: StringPointer,
}

impl Offsets {
    fn parse(bytes: &[u8]) -> Self {
        Self {
            byte_count: u64::from_le_bytes(bytes[0..8].try_into().unwrap()),
            modules_ptr: StringPointer::parse(&bytes[8..16]),
            entry_point_id: u32::from_le_bytes(bytes[16..20].try_into().unwrap()),
            argv: StringPointer::parse(&bytes[20..28]),
        }
    }
}

/// Decoded positions of the overlay structures, as absolute file offsets.
///
/// The suffix (offsets struct, trailer, total byte count) is re-emitted
/// byte-for-byte from the original file, so only the data region's position
/// needs tracking.
#[derive(Debug)]
pub struct OverlayLayout {
    /// Absolute file offset where the data region begins.
    pub data_start: usize,
    /// Data region length (`offsets.byte_count`).
    pub data_len: usize,
    pub offsets: Offsets,
    /// Stored total overlay size, trailing u64 of the file.
    pub total_byte_count: u64,
}

impl OverlayLayout {
    /// Decode the overlay structures from the tail of `file`.
    ///
    /// `overlay_start` is the end of the ELF structural content; the stored
    /// total byte count then selects the overlay proper from within the
    /// trailing region, tolerating producer padding in between. Deterministic
    /// and side-effect-free.
    pub fn decode(file: &[u8], overlay_start: usize) -> Result<Self> {
        let trailing = file.len() - overlay_start;
        if trailing < MIN_OVERLAY_LEN {
            return Err(PatchError::Format(format!(
                "only {trailing} bytes follow the ELF content, too small for an overlay"
            )));
        }

        let total = u64::from_le_bytes(file[file.len() - SIZE_FIELD_LEN..].try_into().unwrap());
        if total < MIN_OVERLAY_LEN as u64 || total > MAX_TOTAL_BYTES {
            return Err(PatchError::Format(format!(
                "stored overlay size {total} is outside the plausible range"
            )));
        }
        if total > trailing as u64 {
            return Err(PatchError::Format(format!(
                "stored overlay size {total} exceeds the {trailing} trailing bytes present"
            )));
        }

        let trailer_start = file.len() - SIZE_FIELD_LEN - TRAILER.len();
        if file[trailer_start..trailer_start + TRAILER.len()] != TRAILER {
            return Err(PatchError::Format("trailer not found".into()));
        }

        let offsets_start = trailer_start - OFFSETS_LEN;
        let offsets = Offsets::parse(&file[offsets_start..trailer_start]);
        if offsets.byte_count >= total {
            return Err(PatchError::Format(format!(
                "data region size {} is not smaller than overlay size {total}",
                offsets.byte_count
            )));
        }
        if offsets.byte_count + MIN_OVERLAY_LEN as u64 > total {
            return Err(PatchError::Format(format!(
                "data region size {} overruns overlay of {total} bytes",
                offsets.byte_count
            )));
        }

        let data_len = offsets.byte_count as usize;
        let data_start = offsets_start - data_len;
        tracing::debug!(
            data_start,
            data_len,
            total_byte_count = total,
            "decoded overlay layout"
        );
        Ok(Self {
            data_start,
            data_len,
            offsets,
            total_byte_count: total,
        })
    }

    pub fn data_end(&self) -> usize {
        self.data_start + self.data_len
    }

    /// The data region slice within the original file bytes.
    pub fn data_region<'a>(&self, file: &'a [u8]) -> &'a [u8] {
        &file[self.data_start..self.data_end()]
    }
}
