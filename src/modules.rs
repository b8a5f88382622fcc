//! Module table reading and target-module location.
//!
//! The module table is a contiguous array of fixed-size records inside the
//! data region. Each record names one embedded script module and points at
//! its content, source map, and bytecode byte ranges.

use crate::error::{PatchError, Result};
use crate::overlay::{Offsets, StringPointer};

/// On-disk size of one module record: four string pointers plus four flag bytes.
pub const MODULE_RECORD_LEN: usize = 4 * StringPointer::LEN + 4;

/// Byte offset of the contents pointer's length sub-field within a record.
/// Contents is the second pointer; the length follows the 4-byte offset.
pub const CONTENTS_LEN_FIELD: usize = StringPointer::LEN + 4;

/// One fixed-size entry of the module table.
#[derive(Debug, Clone, Copy)]
pub struct ModuleRecord {
    pub name: StringPointer,
    pub contents: StringPointer,
    pub sourcemap: StringPointer,
    pub bytecode: StringPointer,
    /// Content encoding tag (binary / latin1 / utf8).
    pub encoding: u8,
    /// Loader kind the runtime applies to this module.
    pub loader: u8,
    pub module_format: u8,
    pub side: u8,
}

impl ModuleRecord {
    /// Decode from [`MODULE_RECORD_LEN`] bytes. Panics if `bytes` is shorter.
    pub fn parse(bytes: &[u8]) -> Self {
        Self {
            name: StringPointer::parse(&bytes[0..8]),
            contents: StringPointer::parse(&bytes[8..16]),
            sourcemap: StringPointer::parse(&bytes[16..24]),
            bytecode: StringPointer::parse(&bytes[24..32]),
            encoding: bytes[32],
            loader: bytes[33],
            module_format: bytes[34],
            side: bytes[35],
        }
    }
}

/// A decoded record together with its table index and resolved name.
#[derive(Debug, Clone, Copy)]
pub struct ModuleEntry<'a> {
    pub index: usize,
    pub record: ModuleRecord,
    pub name: &'a str,
}

/// Lazy view over the packed module table within a data region.
pub struct ModuleTable<'a> {
    data: &'a [u8],
    table_offset: usize,
    count: usize,
}

impl<'a> ModuleTable<'a> {
    pub fn new(data: &'a [u8], offsets: &Offsets) -> Result<Self> {
        let table = offsets.modules_ptr.resolve(data)?;
        if table.len() % MODULE_RECORD_LEN != 0 {
            return Err(PatchError::Format(format!(
                "module table length {} is not a multiple of the {MODULE_RECORD_LEN}-byte record size",
                table.len()
            )));
        }
        Ok(Self {
            data,
            table_offset: offsets.modules_ptr.offset as usize,
            count: table.len() / MODULE_RECORD_LEN,
        })
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Iterate records in table order. Restartable; consumers may stop early.
    pub fn iter(&self) -> impl Iterator<Item = Result<ModuleEntry<'a>>> + '_ {
        let data = self.data;
        let table_offset = self.table_offset;
        (0..self.count).map(move |index| {
            let start = table_offset + index * MODULE_RECORD_LEN;
            let record = ModuleRecord::parse(&data[start..start + MODULE_RECORD_LEN]);
            let name = std::str::from_utf8(record.name.resolve(data)?).map_err(|_| {
                PatchError::Format(format!("module {index} has a non-UTF-8 name"))
            })?;
            Ok(ModuleEntry {
                index,
                record,
                name,
            })
        })
    }

    /// All module names, in table order.
    pub fn names(&self) -> Result<Vec<String>> {
        self.iter()
            .map(|entry| entry.map(|e| e.name.to_string()))
            .collect()
    }

    /// First record accepted by the matcher, or `NotFound` listing every
    /// name discovered.
    pub fn find(&self, matcher: &ModuleMatcher) -> Result<ModuleEntry<'a>> {
        for entry in self.iter() {
            let entry = entry?;
            if matcher.matches(entry.name) {
                tracing::debug!(
                    name = entry.name,
                    index = entry.index,
                    contents_len = entry.record.contents.length,
                    "matched target module"
                );
                return Ok(entry);
            }
        }
        Err(PatchError::NotFound {
            target: matcher.target().to_string(),
            found: self.names()?,
        })
    }
}

/// Accepts the module names under which one logical entry point may be
/// recorded. Depending on build configuration the runtime stores either the
/// bare name or a virtual-filesystem path ending in it (for example
/// `/$bunfs/root/claude`), and on Windows builds an `.exe` suffix appears.
pub struct ModuleMatcher {
    target: String,
    exact: Vec<String>,
    suffixes: Vec<String>,
}

impl ModuleMatcher {
    pub fn new(target: &str) -> Self {
        let mut exact = vec![target.to_string()];
        if !target.ends_with(".exe") {
            exact.push(format!("{target}.exe"));
        }
        let suffixes = exact.iter().map(|alias| format!("/{alias}")).collect();
        Self {
            target: target.to_string(),
            exact,
            suffixes,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn matches(&self, name: &str) -> bool {
        self.exact.iter().any(|alias| name == alias)
            || self.suffixes.iter().any(|suffix| name.ends_with(suffix))
    }
}
