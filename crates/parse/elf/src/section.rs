//! ELF64 section header and section name parsing.
//!
//! Provides zero-copy, zero-allocation parsing of ELF64 section headers and
//! the section-name string table (`.shstrtab`) from raw byte slices.

use core::fmt;

use crate::bytes::{ByteView, le_u32, le_u64};
use crate::display::{pad_hex, pad_with};
use crate::header::{ELF64_SHDR_SIZE, ElfError, Region};
use crate::segment::ElfFile;

/// Special section index: undefined.
pub const SHN_UNDEF: u16 = 0;

/// Section type: occupies no space in the file.
pub const SHT_NOBITS: u32 = 8;

/// Section type (`sh_type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionType {
    /// `SHT_NULL`
    Null,
    /// `SHT_PROGBITS`
    ProgBits,
    /// `SHT_SYMTAB`
    SymTab,
    /// `SHT_STRTAB`
    StrTab,
    /// `SHT_RELA`
    Rela,
    /// `SHT_HASH`
    Hash,
    /// `SHT_DYNAMIC`
    Dynamic,
    /// `SHT_NOTE`
    Note,
    /// `SHT_NOBITS`
    NoBits,
    /// `SHT_REL`
    Rel,
    /// `SHT_SHLIB`
    Shlib,
    /// `SHT_DYNSYM`
    DynSym,
    /// `SHT_INIT_ARRAY`
    InitArray,
    /// `SHT_FINI_ARRAY`
    FiniArray,
    /// `SHT_PREINIT_ARRAY`
    PreinitArray,
    /// `SHT_GROUP`
    Group,
    /// `SHT_SYMTAB_SHNDX`
    SymTabShndx,
    /// Unrecognized code (OS, processor or vendor specific).
    Other(u32),
}

impl From<u32> for SectionType {
    fn from(raw: u32) -> Self {
        match raw {
            0 => Self::Null,
            1 => Self::ProgBits,
            2 => Self::SymTab,
            3 => Self::StrTab,
            4 => Self::Rela,
            5 => Self::Hash,
            6 => Self::Dynamic,
            7 => Self::Note,
            SHT_NOBITS => Self::NoBits,
            9 => Self::Rel,
            10 => Self::Shlib,
            11 => Self::DynSym,
            14 => Self::InitArray,
            15 => Self::FiniArray,
            16 => Self::PreinitArray,
            17 => Self::Group,
            18 => Self::SymTabShndx,
            other => Self::Other(other),
        }
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "NULL",
            Self::ProgBits => "PROGBITS",
            Self::SymTab => "SYMTAB",
            Self::StrTab => "STRTAB",
            Self::Rela => "RELA",
            Self::Hash => "HASH",
            Self::Dynamic => "DYNAMIC",
            Self::Note => "NOTE",
            Self::NoBits => "NOBITS",
            Self::Rel => "REL",
            Self::Shlib => "SHLIB",
            Self::DynSym => "DYNSYM",
            Self::InitArray => "INIT_ARRAY",
            Self::FiniArray => "FINI_ARRAY",
            Self::PreinitArray => "PREINIT_ARRAY",
            Self::Group => "GROUP",
            Self::SymTabShndx => "SYMTAB_SHNDX",
            Self::Other(raw) => return pad_hex(f, *raw),
        };
        f.pad(name)
    }
}

/// Parsed ELF64 section header entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elf64SectionHeader {
    /// Offset into the section header string table for this section's name.
    pub sh_name: u32,
    /// Raw section type.
    pub sh_type: u32,
    /// Section flags.
    pub sh_flags: u64,
    /// Virtual address of the section in memory (0 for non-loaded sections).
    pub sh_addr: u64,
    /// File offset of the section data.
    pub sh_offset: u64,
    /// Size of the section data in bytes.
    pub sh_size: u64,
    /// Associated section index.
    pub sh_link: u32,
    /// Extra info (interpretation depends on section type).
    pub sh_info: u32,
    /// Required alignment of the section.
    pub sh_addralign: u64,
    /// Size of each entry (for sections with fixed-size entries).
    pub sh_entsize: u64,
}

impl Elf64SectionHeader {
    fn parse(b: &[u8; ELF64_SHDR_SIZE]) -> Self {
        Self {
            sh_name: le_u32(b, 0),
            sh_type: le_u32(b, 4),
            sh_flags: le_u64(b, 8),
            sh_addr: le_u64(b, 16),
            sh_offset: le_u64(b, 24),
            sh_size: le_u64(b, 32),
            sh_link: le_u32(b, 40),
            sh_info: le_u32(b, 44),
            sh_addralign: le_u64(b, 48),
            sh_entsize: le_u64(b, 56),
        }
    }

    /// Returns the decoded section type.
    #[must_use]
    pub fn section_type(&self) -> SectionType {
        SectionType::from(self.sh_type)
    }
}

/// A zero-copy wrapper around a NUL-terminated string table section.
#[derive(Debug, Clone, Copy)]
pub struct StringTable<'a> {
    data: &'a [u8],
}

impl<'a> StringTable<'a> {
    /// Creates a new string table from the raw section data.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Size of the table in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the table holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Looks up a NUL-terminated string at the given byte offset.
    ///
    /// The scan for the terminator never leaves the table. Returns `None`
    /// if the offset is out of bounds or no NUL follows it inside the table.
    /// The returned bytes exclude the terminator and need not be UTF-8.
    #[must_use]
    pub fn get(&self, offset: u32) -> Option<&'a [u8]> {
        let start = usize::try_from(offset).ok()?;
        let remaining = self.data.get(start..)?;
        let nul_pos = remaining.iter().position(|&b| b == 0)?;
        Some(&remaining[..nul_pos])
    }
}

/// A section name as stored in the file.
///
/// ELF names are arbitrary bytes. `Display` renders invalid UTF-8 as
/// U+FFFD and honours width and alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionName<'a>(&'a [u8]);

impl<'a> SectionName<'a> {
    /// The name of every section in a file without a name table.
    pub const EMPTY: SectionName<'static> = SectionName(b"");

    /// Wraps raw name bytes (without the NUL terminator).
    #[must_use]
    pub fn new(bytes: &'a [u8]) -> Self {
        Self(bytes)
    }

    /// The raw bytes of the name.
    #[must_use]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.0
    }

    /// The name as `&str`, if it is valid UTF-8.
    #[must_use]
    pub fn to_str(&self) -> Option<&'a str> {
        core::str::from_utf8(self.0).ok()
    }

    /// Length of the name in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` for the empty name.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq<str> for SectionName<'_> {
    fn eq(&self, other: &str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl PartialEq<&str> for SectionName<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl fmt::Display for SectionName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = self.to_str() {
            return f.pad(name);
        }
        let chars = self
            .0
            .utf8_chunks()
            .map(|chunk| {
                chunk.valid().chars().count() + usize::from(!chunk.invalid().is_empty())
            })
            .sum();
        pad_with(f, chars, |f| {
            for chunk in self.0.utf8_chunks() {
                f.write_str(chunk.valid())?;
                if !chunk.invalid().is_empty() {
                    f.write_str("\u{FFFD}")?;
                }
            }
            Ok(())
        })
    }
}

/// An iterator over ELF64 section headers.
///
/// Yields exactly `e_shnum` entries; the table was bounds checked when the
/// owning [`SectionTable`] was created.
#[derive(Debug, Clone)]
pub struct SectionIter<'a> {
    view: ByteView<'a>,
    shoff: u64,
    shentsize: u64,
    index: u16,
    count: u16,
}

impl Iterator for SectionIter<'_> {
    type Item = Elf64SectionHeader;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.count {
            return None;
        }
        let offset = self.shoff + u64::from(self.index) * self.shentsize;
        let record = self.view.array_at(offset, Region::SectionHeaders).ok()?;
        self.index += 1;
        Some(Elf64SectionHeader::parse(record))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::from(self.count.saturating_sub(self.index));
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SectionIter<'_> {}

/// A validated section header table together with its name table.
#[derive(Debug, Clone, Copy)]
pub struct SectionTable<'a> {
    view: ByteView<'a>,
    shoff: u64,
    shentsize: u64,
    count: u16,
    names: Option<StringTable<'a>>,
}

impl<'a> SectionTable<'a> {
    /// Returns an iterator over all section headers, in table order.
    #[must_use]
    pub fn iter(&self) -> SectionIter<'a> {
        SectionIter {
            view: self.view,
            shoff: self.shoff,
            shentsize: self.shentsize,
            index: 0,
            count: self.count,
        }
    }

    /// Number of entries in the table (`e_shnum`).
    #[must_use]
    pub fn len(&self) -> usize {
        usize::from(self.count)
    }

    /// Returns `true` if the file has no section headers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns the section header at the given 0-based index.
    #[must_use]
    pub fn get(&self, index: u16) -> Option<Elf64SectionHeader> {
        if index >= self.count {
            return None;
        }
        let offset = self.shoff + u64::from(index) * self.shentsize;
        let record = self.view.array_at(offset, Region::SectionHeaders).ok()?;
        Some(Elf64SectionHeader::parse(record))
    }

    /// Returns the section-name string table, if the file has one.
    #[must_use]
    pub fn names(&self) -> Option<StringTable<'a>> {
        self.names
    }

    /// Resolves the name of a section.
    ///
    /// Files without a name table (`e_shstrndx == SHN_UNDEF`) have only
    /// empty names.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::CorruptStringTable`] if `sh_name` points past the
    /// string table or the name is unterminated.
    pub fn name_of(&self, shdr: &Elf64SectionHeader) -> Result<SectionName<'a>, ElfError> {
        match self.names {
            None => Ok(SectionName::EMPTY),
            Some(names) => names
                .get(shdr.sh_name)
                .map(SectionName::new)
                .ok_or(ElfError::CorruptStringTable),
        }
    }

    /// Finds the first section whose name equals `name`, in table order.
    ///
    /// Names are compared byte for byte.
    ///
    /// # Errors
    ///
    /// Propagates name resolution failures met before a match is found.
    pub fn find(&self, name: &str) -> Result<Option<(u16, Elf64SectionHeader)>, ElfError> {
        for (index, shdr) in (0..self.count).zip(self.iter()) {
            if self.name_of(&shdr)?.as_bytes() == name.as_bytes() {
                return Ok(Some((index, shdr)));
            }
        }
        Ok(None)
    }
}

impl<'a> ElfFile<'a> {
    /// Validates the section header table and resolves its name table.
    ///
    /// # Errors
    ///
    /// - [`ElfError::EntryTooSmall`] if `e_shentsize` is smaller than an
    ///   ELF64 section header.
    /// - [`ElfError::OutOfBounds`] with [`Region::SectionHeaders`] if the
    ///   table extends past the end of the image.
    /// - [`ElfError::OutOfBounds`] with [`Region::SectionNames`] if
    ///   `e_shstrndx` is not a valid index or the name table's data lies
    ///   outside the image.
    pub fn sections(&self) -> Result<SectionTable<'a>, ElfError> {
        let hdr = self.header();
        if hdr.e_shnum > 0 && usize::from(hdr.e_shentsize) < ELF64_SHDR_SIZE {
            return Err(ElfError::EntryTooSmall(Region::SectionHeaders));
        }
        self.view.check_table(
            hdr.e_shoff,
            hdr.e_shnum,
            hdr.e_shentsize,
            Region::SectionHeaders,
        )?;

        let mut table = SectionTable {
            view: self.view,
            shoff: hdr.e_shoff,
            shentsize: u64::from(hdr.e_shentsize),
            count: hdr.e_shnum,
            names: None,
        };

        if hdr.e_shnum == 0 || hdr.e_shstrndx == SHN_UNDEF {
            return Ok(table);
        }
        let strtab = table
            .get(hdr.e_shstrndx)
            .ok_or(ElfError::OutOfBounds(Region::SectionNames))?;
        let data = self
            .view
            .slice(strtab.sh_offset, strtab.sh_size, Region::SectionNames)?;
        table.names = Some(StringTable::new(data));
        Ok(table)
    }

    /// Returns the file contents of a section.
    ///
    /// `SHT_NOBITS` sections occupy no file space and yield an empty slice.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::OutOfBounds`] with [`Region::SectionData`] if
    /// `sh_offset + sh_size` exceeds the image.
    pub fn section_data(&self, shdr: &Elf64SectionHeader) -> Result<&'a [u8], ElfError> {
        if shdr.sh_type == SHT_NOBITS {
            return Ok(&[]);
        }
        self.view
            .slice(shdr.sh_offset, shdr.sh_size, Region::SectionData)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
