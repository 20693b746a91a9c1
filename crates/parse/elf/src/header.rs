//! ELF64 file header parsing and validation.
//!
//! Checks the identification bytes and decodes the fixed 64-byte file
//! header. Table bounds are not checked here: the program and section
//! header walkers validate their own tables before yielding entries, so a
//! broken section table does not prevent reporting the header itself.

use core::fmt;

use crate::bytes::{le_u16, le_u32, le_u64};

/// ELF magic bytes: `\x7fELF`.
pub const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];

/// ELF class: 64-bit.
pub const ELFCLASS64: u8 = 2;

/// ELF data encoding: little-endian.
pub const ELFDATA2LSB: u8 = 1;

/// Size of an ELF64 file header (64 bytes).
pub const ELF64_EHDR_SIZE: usize = 64;

/// Size of an ELF64 program header entry (56 bytes).
pub const ELF64_PHDR_SIZE: usize = 56;

/// Size of an ELF64 section header entry (64 bytes).
pub const ELF64_SHDR_SIZE: usize = 64;

/// Part of the image a bounds failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// The program header table.
    ProgramHeaders,
    /// The section header table.
    SectionHeaders,
    /// The section-name string table (`e_shstrndx`).
    SectionNames,
    /// The payload of a section.
    SectionData,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ProgramHeaders => "program header table",
            Self::SectionHeaders => "section header table",
            Self::SectionNames => "section name string table",
            Self::SectionData => "section data",
        })
    }
}

/// Errors that can occur when parsing an ELF file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElfError {
    /// The image is shorter than the ELF64 file header.
    TruncatedFile,
    /// The image does not start with the ELF magic bytes.
    NotElf,
    /// The image is not a 64-bit little-endian ELF file.
    UnsupportedFormat {
        /// Raw `EI_CLASS` byte.
        class: u8,
        /// Raw `EI_DATA` byte.
        encoding: u8,
    },
    /// A table, name, or payload would extend past the end of the image.
    OutOfBounds(Region),
    /// A header table declares entries smaller than the ELF64 record size.
    EntryTooSmall(Region),
    /// A section name is not terminated inside the string table.
    CorruptStringTable,
    /// No section with the requested name exists.
    SectionNotFound,
}

impl fmt::Display for ElfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TruncatedFile => write!(f, "file too small for an ELF64 header"),
            Self::NotElf => write!(f, "not an ELF file (bad magic)"),
            Self::UnsupportedFormat { class, encoding } => write!(
                f,
                "unsupported ELF format (class {class}, encoding {encoding}; \
                 expected 64-bit little-endian)"
            ),
            Self::OutOfBounds(region) => write!(f, "{region} extends past end of file"),
            Self::EntryTooSmall(region) => write!(f, "{region} entry size too small"),
            Self::CorruptStringTable => write!(f, "unterminated or invalid section name"),
            Self::SectionNotFound => write!(f, "section not found"),
        }
    }
}

impl core::error::Error for ElfError {}

/// ELF object file type (`e_type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    /// `ET_NONE`
    None,
    /// `ET_REL`
    Relocatable,
    /// `ET_EXEC`
    Executable,
    /// `ET_DYN`
    Shared,
    /// `ET_CORE`
    Core,
    /// Any other value, including OS and processor specific ranges.
    Other(u16),
}

impl From<u16> for ObjectType {
    fn from(raw: u16) -> Self {
        match raw {
            0 => Self::None,
            1 => Self::Relocatable,
            2 => Self::Executable,
            3 => Self::Shared,
            4 => Self::Core,
            other => Self::Other(other),
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("NONE (No file type)"),
            Self::Relocatable => f.write_str("REL (Relocatable file)"),
            Self::Executable => f.write_str("EXEC (Executable file)"),
            Self::Shared => f.write_str("DYN (Shared object file)"),
            Self::Core => f.write_str("CORE (Core file)"),
            Self::Other(raw) => write!(f, "<unknown>: {raw:#x}"),
        }
    }
}

/// Target architecture (`e_machine`), for the handful worth naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Machine {
    /// `EM_X86_64`
    X86_64,
    /// `EM_AARCH64`
    AArch64,
    /// `EM_RISCV`
    RiscV,
    /// Anything else.
    Other(u16),
}

impl From<u16> for Machine {
    fn from(raw: u16) -> Self {
        match raw {
            62 => Self::X86_64,
            183 => Self::AArch64,
            243 => Self::RiscV,
            other => Self::Other(other),
        }
    }
}

impl fmt::Display for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X86_64 => f.write_str("Advanced Micro Devices X86-64"),
            Self::AArch64 => f.write_str("AArch64"),
            Self::RiscV => f.write_str("RISC-V"),
            Self::Other(raw) => write!(f, "<unknown>: {raw:#x}"),
        }
    }
}

/// Parsed ELF64 file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elf64Header {
    /// Object file type.
    pub e_type: u16,
    /// Target machine architecture.
    pub e_machine: u16,
    /// Object file version.
    pub e_version: u32,
    /// Virtual address of the entry point.
    pub e_entry: u64,
    /// Offset of the program header table in the file.
    pub e_phoff: u64,
    /// Offset of the section header table in the file.
    pub e_shoff: u64,
    /// Processor-specific flags.
    pub e_flags: u32,
    /// Size of this header as recorded in the file.
    pub e_ehsize: u16,
    /// Size of each program header entry.
    pub e_phentsize: u16,
    /// Number of program header entries.
    pub e_phnum: u16,
    /// Size of each section header entry.
    pub e_shentsize: u16,
    /// Number of section header entries.
    pub e_shnum: u16,
    /// Section header string table index.
    pub e_shstrndx: u16,
}

impl Elf64Header {
    /// Parse an ELF64 file header from raw bytes.
    ///
    /// Validates the length, magic, class and data encoding. Machine and
    /// object type are decoded but not restricted.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::TruncatedFile`], [`ElfError::NotElf`] or
    /// [`ElfError::UnsupportedFormat`], checked in that order.
    pub fn parse(data: &[u8]) -> Result<Self, ElfError> {
        let b: &[u8; ELF64_EHDR_SIZE] = data.first_chunk().ok_or(ElfError::TruncatedFile)?;

        if b[..4] != ELF_MAGIC {
            return Err(ElfError::NotElf);
        }

        let class = b[4];
        let encoding = b[5];
        if class != ELFCLASS64 || encoding != ELFDATA2LSB {
            return Err(ElfError::UnsupportedFormat { class, encoding });
        }

        Ok(Self {
            e_type: le_u16(b, 16),
            e_machine: le_u16(b, 18),
            e_version: le_u32(b, 20),
            e_entry: le_u64(b, 24),
            e_phoff: le_u64(b, 32),
            e_shoff: le_u64(b, 40),
            e_flags: le_u32(b, 48),
            e_ehsize: le_u16(b, 52),
            e_phentsize: le_u16(b, 54),
            e_phnum: le_u16(b, 56),
            e_shentsize: le_u16(b, 58),
            e_shnum: le_u16(b, 60),
            e_shstrndx: le_u16(b, 62),
        })
    }

    /// Returns the decoded object file type.
    #[must_use]
    pub fn object_type(&self) -> ObjectType {
        ObjectType::from(self.e_type)
    }

    /// Returns the decoded target machine.
    #[must_use]
    pub fn machine(&self) -> Machine {
        Machine::from(self.e_machine)
    }
}
