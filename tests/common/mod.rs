//! Synthetic standalone-executable fixtures.
//!
//! Builds a minimal but structurally valid ELF64 prefix (header, two section
//! headers, 16 bytes of section data) and appends an overlay holding the
//! given modules, their table, the offsets struct, trailer, and total size.

use object::elf;
use object::endian::{U16, U32, U64};
use object::pod::bytes_of;
use object::Endianness;

pub const TRAILER: [u8; 16] = *b"\n---- Bun! ----\n";

pub struct ModuleSpec<'a> {
    pub name: &'a str,
    pub contents: &'a [u8],
}

fn u16v(v: u16) -> U16<Endianness> {
    U16::new(Endianness::Little, v)
}
fn u32v(v: u32) -> U32<Endianness> {
    U32::new(Endianness::Little, v)
}
fn u64v(v: u64) -> U64<Endianness> {
    U64::new(Endianness::Little, v)
}

/// A complete fixture executable: ELF prefix plus module overlay.
pub fn build_fixture(modules: &[ModuleSpec]) -> Vec<u8> {
    let mut buffer = elf_prefix();
    build_overlay(modules, &mut buffer);
    buffer
}

/// 208-byte ELF64 prefix: header at 0, section headers at 64, section data
/// at 192. The structural end (and overlay start) is byte 208.
fn elf_prefix() -> Vec<u8> {
    let mut buffer = Vec::new();

    let file_header = elf::FileHeader64::<Endianness> {
        e_ident: elf::Ident {
            magic: elf::ELFMAG,
            class: elf::ELFCLASS64,
            data: elf::ELFDATA2LSB,
            version: elf::EV_CURRENT,
            os_abi: elf::ELFOSABI_SYSV,
            abi_version: 0,
            padding: [0; 7],
        },
        e_type: u16v(elf::ET_EXEC),
        e_machine: u16v(elf::EM_X86_64),
        e_version: u32v(elf::EV_CURRENT as u32),
        e_entry: u64v(0x400000),
        e_phoff: u64v(0),
        e_shoff: u64v(64),
        e_flags: u32v(0),
        e_ehsize: u16v(64),
        e_phentsize: u16v(56),
        e_phnum: u16v(0),
        e_shentsize: u16v(64),
        e_shnum: u16v(2),
        e_shstrndx: u16v(0),
    };
    buffer.extend_from_slice(bytes_of(&file_header));

    let null_section = elf::SectionHeader64::<Endianness> {
        sh_name: u32v(0),
        sh_type: u32v(elf::SHT_NULL),
        sh_flags: u64v(0),
        sh_addr: u64v(0),
        sh_offset: u64v(0),
        sh_size: u64v(0),
        sh_link: u32v(0),
        sh_info: u32v(0),
        sh_addralign: u64v(0),
        sh_entsize: u64v(0),
    };
    buffer.extend_from_slice(bytes_of(&null_section));

    let text_section = elf::SectionHeader64::<Endianness> {
        sh_name: u32v(0),
        sh_type: u32v(elf::SHT_PROGBITS),
        sh_flags: u64v((elf::SHF_ALLOC | elf::SHF_EXECINSTR) as u64),
        sh_addr: u64v(0x400000),
        sh_offset: u64v(192),
        sh_size: u64v(16),
        sh_link: u32v(0),
        sh_info: u32v(0),
        sh_addralign: u64v(16),
        sh_entsize: u64v(0),
    };
    buffer.extend_from_slice(bytes_of(&text_section));

    // Section data: 16 nops standing in for real code.
    buffer.extend_from_slice(&[0x90; 16]);
    buffer
}

fn push_ptr(out: &mut Vec<u8>, offset: u32, length: u32) {
    out.extend_from_slice(&offset.to_le_bytes());
    out.extend_from_slice(&length.to_le_bytes());
}

fn build_overlay(modules: &[ModuleSpec], buffer: &mut Vec<u8>) {
    let mut data = Vec::new();
    let mut pointers = Vec::new();
    for module in modules {
        let name_off = data.len() as u32;
        data.extend_from_slice(module.name.as_bytes());
        let contents_off = data.len() as u32;
        data.extend_from_slice(module.contents);
        pointers.push((
            name_off,
            module.name.len() as u32,
            contents_off,
            module.contents.len() as u32,
        ));
    }

    let table_off = data.len() as u32;
    for (name_off, name_len, contents_off, contents_len) in pointers {
        push_ptr(&mut data, name_off, name_len);
        push_ptr(&mut data, contents_off, contents_len);
        push_ptr(&mut data, 0, 0); // sourcemap
        push_ptr(&mut data, 0, 0); // bytecode
        data.extend_from_slice(&[1, 0, 0, 0]); // utf8 encoding, default flags
    }
    let table_len = (modules.len() * 36) as u32;
    let byte_count = data.len() as u64;

    buffer.extend_from_slice(&data);
    buffer.extend_from_slice(&byte_count.to_le_bytes());
    push_ptr(buffer, table_off, table_len);
    buffer.extend_from_slice(&0u32.to_le_bytes()); // entry_point_id
    push_ptr(buffer, 0, 0); // argv
    buffer.extend_from_slice(&[0u8; 4]); // padding
    buffer.extend_from_slice(&TRAILER);
    buffer.extend_from_slice(&(byte_count + 56).to_le_bytes());
}
