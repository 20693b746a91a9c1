//! ELF64 segment (program header) iteration.
//!
//! Provides [`ElfFile`] as the main entry point for parsing an ELF64 binary,
//! and [`SegmentIter`] for walking the program header table.

use core::fmt;

use crate::bytes::{ByteView, le_u32, le_u64};
use crate::display::pad_hex;
use crate::header::{ELF64_PHDR_SIZE, Elf64Header, ElfError, Region};

/// A parsed ELF64 file, holding a view of the raw data and the parsed header.
#[derive(Debug, Clone, Copy)]
pub struct ElfFile<'a> {
    pub(crate) view: ByteView<'a>,
    header: Elf64Header,
}

/// Segment type (`p_type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentType {
    /// `PT_NULL`
    Null,
    /// `PT_LOAD`
    Load,
    /// `PT_DYNAMIC`
    Dynamic,
    /// `PT_INTERP`
    Interp,
    /// `PT_NOTE`
    Note,
    /// `PT_SHLIB`
    Shlib,
    /// `PT_PHDR`
    Phdr,
    /// `PT_TLS`
    Tls,
    /// `PT_GNU_EH_FRAME`
    GnuEhFrame,
    /// `PT_GNU_STACK`
    GnuStack,
    /// `PT_GNU_RELRO`
    GnuRelro,
    /// `PT_GNU_PROPERTY`
    GnuProperty,
    /// Unrecognized code (OS, processor or vendor specific).
    Other(u32),
}

impl From<u32> for SegmentType {
    fn from(raw: u32) -> Self {
        match raw {
            0 => Self::Null,
            1 => Self::Load,
            2 => Self::Dynamic,
            3 => Self::Interp,
            4 => Self::Note,
            5 => Self::Shlib,
            6 => Self::Phdr,
            7 => Self::Tls,
            0x6474_e550 => Self::GnuEhFrame,
            0x6474_e551 => Self::GnuStack,
            0x6474_e552 => Self::GnuRelro,
            0x6474_e553 => Self::GnuProperty,
            other => Self::Other(other),
        }
    }
}

impl fmt::Display for SegmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "NULL",
            Self::Load => "LOAD",
            Self::Dynamic => "DYNAMIC",
            Self::Interp => "INTERP",
            Self::Note => "NOTE",
            Self::Shlib => "SHLIB",
            Self::Phdr => "PHDR",
            Self::Tls => "TLS",
            Self::GnuEhFrame => "GNU_EH_FRAME",
            Self::GnuStack => "GNU_STACK",
            Self::GnuRelro => "GNU_RELRO",
            Self::GnuProperty => "GNU_PROPERTY",
            Self::Other(raw) => return pad_hex(f, *raw),
        };
        // Pad through the formatter so `{:<14}` works in tables.
        f.pad(name)
    }
}

/// Segment permission flags (`PF_R = 4`, `PF_W = 2`, `PF_X = 1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentFlags(pub u32);

impl fmt::Display for SegmentFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bit = |mask: u32, c: char| if self.0 & mask != 0 { c } else { '-' };
        write!(f, "{}{}{}", bit(4, 'R'), bit(2, 'W'), bit(1, 'X'))
    }
}

/// Parsed ELF64 program header entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elf64ProgramHeader {
    /// Raw segment type.
    pub p_type: u32,
    /// Segment flags (read/write/execute).
    pub p_flags: u32,
    /// Offset of the segment data in the file.
    pub p_offset: u64,
    /// Virtual address of the segment.
    pub p_vaddr: u64,
    /// Physical address of the segment, where relevant.
    pub p_paddr: u64,
    /// Size of the segment data in the file.
    pub p_filesz: u64,
    /// Size of the segment in memory.
    pub p_memsz: u64,
    /// Segment alignment.
    pub p_align: u64,
}

impl Elf64ProgramHeader {
    fn parse(b: &[u8; ELF64_PHDR_SIZE]) -> Self {
        Self {
            p_type: le_u32(b, 0),
            p_flags: le_u32(b, 4),
            p_offset: le_u64(b, 8),
            p_vaddr: le_u64(b, 16),
            p_paddr: le_u64(b, 24),
            p_filesz: le_u64(b, 32),
            p_memsz: le_u64(b, 40),
            p_align: le_u64(b, 48),
        }
    }

    /// Returns the decoded segment type.
    #[must_use]
    pub fn segment_type(&self) -> SegmentType {
        SegmentType::from(self.p_type)
    }

    /// Returns the segment permission flags.
    #[must_use]
    pub fn flags(&self) -> SegmentFlags {
        SegmentFlags(self.p_flags)
    }
}

/// An iterator over ELF64 program headers.
///
/// Created by [`ElfFile::segments`] after the whole table has been bounds
/// checked, so it yields exactly `e_phnum` entries.
#[derive(Debug, Clone)]
pub struct SegmentIter<'a> {
    view: ByteView<'a>,
    phoff: u64,
    phentsize: u64,
    index: u16,
    count: u16,
}

impl Iterator for SegmentIter<'_> {
    type Item = Elf64ProgramHeader;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.count {
            return None;
        }
        let offset = self.phoff + u64::from(self.index) * self.phentsize;
        let record = self.view.array_at(offset, Region::ProgramHeaders).ok()?;
        self.index += 1;
        Some(Elf64ProgramHeader::parse(record))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::from(self.count.saturating_sub(self.index));
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SegmentIter<'_> {}

impl<'a> ElfFile<'a> {
    /// Parse an ELF64 file from raw bytes.
    ///
    /// Only the file header is validated here; each table is checked when
    /// it is walked.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError`] if the header is invalid or the data is too short.
    pub fn parse(data: &'a [u8]) -> Result<Self, ElfError> {
        let header = Elf64Header::parse(data)?;
        Ok(Self {
            view: ByteView::new(data),
            header,
        })
    }

    /// Returns the virtual address of the entry point.
    #[must_use]
    pub fn entry_point(&self) -> u64 {
        self.header.e_entry
    }

    /// Returns the parsed ELF64 file header.
    #[must_use]
    pub fn header(&self) -> &Elf64Header {
        &self.header
    }

    /// Returns the bounds-checked view of the underlying image.
    #[must_use]
    pub fn view(&self) -> ByteView<'a> {
        self.view
    }

    /// Returns an iterator over all program headers.
    ///
    /// The whole table is checked before anything is yielded; a table that
    /// does not fit fails the walk instead of producing a partial list.
    /// Calling this again restarts from the first entry.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::EntryTooSmall`] if `e_phentsize` is smaller than
    /// an ELF64 program header, or [`ElfError::OutOfBounds`] if the table
    /// extends past the end of the image.
    pub fn segments(&self) -> Result<SegmentIter<'a>, ElfError> {
        let hdr = &self.header;
        if hdr.e_phnum > 0 && usize::from(hdr.e_phentsize) < ELF64_PHDR_SIZE {
            return Err(ElfError::EntryTooSmall(Region::ProgramHeaders));
        }
        self.view.check_table(
            hdr.e_phoff,
            hdr.e_phnum,
            hdr.e_phentsize,
            Region::ProgramHeaders,
        )?;
        Ok(SegmentIter {
            view: self.view,
            phoff: hdr.e_phoff,
            phentsize: u64::from(hdr.e_phentsize),
            index: 0,
            count: hdr.e_phnum,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::tests::{append_phdr, make_elf_header};

    const PT_LOAD: u32 = 1;
    const PT_NOTE: u32 = 4;
    const PT_GNU_STACK: u32 = 0x6474_e551;

    #[test]
    fn parse_valid_elf_file() {
        let buf = make_elf_header();
        let elf = ElfFile::parse(&buf).expect("valid ELF");
        assert_eq!(elf.entry_point(), 0x0040_1000);
        assert_eq!(elf.view().len(), buf.len());
    }

    #[test]
    fn entry_point_matches_header() {
        let mut buf = make_elf_header();
        buf[24..32].copy_from_slice(&0xDEAD_BEEFu64.to_le_bytes());
        let elf = ElfFile::parse(&buf).expect("valid ELF");
        assert_eq!(elf.entry_point(), 0xDEAD_BEEF);
        assert_eq!(elf.header().e_entry, 0xDEAD_BEEF);
    }

    #[test]
    fn no_segments_yields_empty_iterator() {
        let buf = make_elf_header();
        let elf = ElfFile::parse(&buf).expect("valid ELF");
        assert_eq!(elf.segments().unwrap().count(), 0);
    }

    #[test]
    fn yields_exactly_phnum_entries() {
        let mut buf = make_elf_header();
        append_phdr(&mut buf, PT_LOAD, 4 | 1, 0, 0x40_0000, 0x200, 0x200);
        append_phdr(&mut buf, PT_NOTE, 4, 0x1c8, 0x40_01c8, 0x20, 0x20);
        append_phdr(&mut buf, PT_GNU_STACK, 4 | 2, 0, 0, 0, 0);
        buf.resize(0x200, 0);

        let elf = ElfFile::parse(&buf).expect("valid ELF");
        let iter = elf.segments().expect("table in bounds");
        assert_eq!(iter.len(), 3);

        let segments: Vec<_> = iter.collect();
        assert_eq!(segments.len(), usize::from(elf.header().e_phnum));
        assert_eq!(segments[0].segment_type(), SegmentType::Load);
        assert_eq!(segments[0].p_vaddr, 0x40_0000);
        assert_eq!(segments[0].p_filesz, 0x200);
        assert_eq!(segments[1].segment_type(), SegmentType::Note);
        assert_eq!(segments[1].p_offset, 0x1c8);
        assert_eq!(segments[2].segment_type(), SegmentType::GnuStack);
        assert_eq!(format!("{}", segments[2].flags()), "RW-");
    }

    #[test]
    fn walk_is_restartable() {
        let mut buf = make_elf_header();
        append_phdr(&mut buf, PT_LOAD, 4, 0, 0x1000, 0x10, 0x10);
        append_phdr(&mut buf, PT_LOAD, 6, 0, 0x2000, 0x10, 0x20);
        let elf = ElfFile::parse(&buf).expect("valid ELF");

        let first: Vec<_> = elf.segments().unwrap().collect();
        let second: Vec<_> = elf.segments().unwrap().collect();
        assert_eq!(first, second);

        let mut iter = elf.segments().unwrap();
        let copy = iter.clone();
        iter.next();
        assert_eq!(copy.count(), 2);
        assert_eq!(iter.count(), 1);
    }

    #[test]
    fn unknown_segment_type_is_not_an_error() {
        let mut buf = make_elf_header();
        append_phdr(&mut buf, 0x7000_0001, 0, 0, 0, 0, 0);
        let elf = ElfFile::parse(&buf).expect("valid ELF");
        let seg = elf.segments().unwrap().next().unwrap();
        assert_eq!(seg.segment_type(), SegmentType::Other(0x7000_0001));
        assert_eq!(format!("{}", seg.segment_type()), "0x70000001");
    }

    #[test]
    fn table_past_end_fails_whole_walk() {
        let mut buf = make_elf_header();
        append_phdr(&mut buf, PT_LOAD, 4, 0, 0, 0, 0);
        // Claim a second entry that is not there.
        buf[56..58].copy_from_slice(&2u16.to_le_bytes());
        let elf = ElfFile::parse(&buf).expect("header itself is fine");
        assert_eq!(
            elf.segments().unwrap_err(),
            ElfError::OutOfBounds(Region::ProgramHeaders)
        );
    }

    #[test]
    fn huge_phoff_is_out_of_bounds() {
        let mut buf = make_elf_header();
        append_phdr(&mut buf, PT_LOAD, 4, 0, 0, 0, 0);
        buf[32..40].copy_from_slice(&u64::MAX.to_le_bytes());
        let elf = ElfFile::parse(&buf).expect("valid header");
        assert_eq!(
            elf.segments().unwrap_err(),
            ElfError::OutOfBounds(Region::ProgramHeaders)
        );
    }

    #[test]
    fn small_entry_size_is_rejected() {
        let mut buf = make_elf_header();
        append_phdr(&mut buf, PT_LOAD, 4, 0, 0, 0, 0);
        buf[54..56].copy_from_slice(&32u16.to_le_bytes());
        let elf = ElfFile::parse(&buf).expect("valid header");
        assert_eq!(
            elf.segments().unwrap_err(),
            ElfError::EntryTooSmall(Region::ProgramHeaders)
        );
    }

    #[test]
    fn larger_entry_size_is_strided() {
        let mut buf = make_elf_header();
        // Two 64-byte slots, each holding a 56-byte header plus padding.
        buf[54..56].copy_from_slice(&64u16.to_le_bytes());
        append_phdr(&mut buf, PT_LOAD, 4, 0, 0x1000, 0, 0);
        buf.resize(buf.len() + 8, 0);
        append_phdr(&mut buf, PT_NOTE, 4, 0, 0x2000, 0, 0);
        buf.resize(buf.len() + 8, 0);

        let elf = ElfFile::parse(&buf).expect("valid ELF");
        let segments: Vec<_> = elf.segments().unwrap().collect();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].p_vaddr, 0x2000);
        assert_eq!(segments[1].segment_type(), SegmentType::Note);
    }

    #[test]
    fn flags_display() {
        assert_eq!(format!("{}", SegmentFlags(4 | 1)), "R-X");
        assert_eq!(format!("{}", SegmentFlags(0)), "---");
        assert_eq!(format!("{}", SegmentFlags(7)), "RWX");
    }

    #[test]
    fn type_display_pads() {
        assert_eq!(format!("{:<8}|", SegmentType::Load), "LOAD    |");
        assert_eq!(format!("{:<12}|", SegmentType::Other(0x7000_0001)), "0x70000001  |");
        assert_eq!(format!("{:>8}|", SegmentType::Other(0x7)), "     0x7|");
    }

    #[test]
    fn parse_rejects_invalid_data() {
        assert!(ElfFile::parse(&[]).is_err());
        assert!(ElfFile::parse(&[0u8; 32]).is_err());
    }
}
