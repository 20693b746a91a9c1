//! Hex and ASCII rendering of a section's payload.
//!
//! Output mirrors the classic `hexdump -C` style: an offset column, sixteen
//! hex bytes, then the printable characters of those bytes.

use core::fmt;

use crate::header::ElfError;
use crate::section::{Elf64SectionHeader, SectionName, SectionTable};
use crate::segment::ElfFile;

/// Number of bytes rendered per row.
pub const ROW_WIDTH: usize = 16;

/// The payload of one named section, ready to be rendered as rows.
#[derive(Debug, Clone, Copy)]
pub struct HexDump<'a> {
    name: SectionName<'a>,
    index: u16,
    header: Elf64SectionHeader,
    data: &'a [u8],
}

impl<'a> HexDump<'a> {
    /// Name of the dumped section.
    #[must_use]
    pub fn name(&self) -> SectionName<'a> {
        self.name
    }

    /// Index of the dumped section in the section header table.
    #[must_use]
    pub fn index(&self) -> u16 {
        self.index
    }

    /// Header of the dumped section.
    #[must_use]
    pub fn header(&self) -> &Elf64SectionHeader {
        &self.header
    }

    /// Raw bytes being dumped.
    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Number of rows [`rows`](Self::rows) will yield.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.data.len().div_ceil(ROW_WIDTH)
    }

    /// Returns the rows of the dump, 16 bytes each; the last may be short.
    #[must_use]
    pub fn rows(&self) -> HexRows<'a> {
        HexRows {
            chunks: self.data.chunks(ROW_WIDTH),
            offset: 0,
        }
    }
}

/// Iterator over the rows of a [`HexDump`].
#[derive(Debug, Clone)]
pub struct HexRows<'a> {
    chunks: core::slice::Chunks<'a, u8>,
    offset: usize,
}

impl<'a> Iterator for HexRows<'a> {
    type Item = HexRow<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.chunks.next()?;
        let row = HexRow {
            offset: self.offset,
            bytes,
        };
        self.offset += ROW_WIDTH;
        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

impl ExactSizeIterator for HexRows<'_> {}

/// One rendered line of a [`HexDump`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexRow<'a> {
    /// Offset of the first byte, relative to the start of the section.
    pub offset: usize,
    /// Between 1 and 16 bytes.
    pub bytes: &'a [u8],
}

impl fmt::Display for HexRow<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}  ", self.offset)?;
        for slot in 0..ROW_WIDTH {
            match self.bytes.get(slot) {
                Some(b) => write!(f, "{b:02x} ")?,
                None => f.write_str("   ")?,
            }
        }
        f.write_str(" ")?;
        for &b in self.bytes {
            let c = if b.is_ascii_graphic() || b == b' ' {
                char::from(b)
            } else {
                '.'
            };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl<'a> ElfFile<'a> {
    /// Locates the first section named `name` and prepares its payload for
    /// dumping.
    ///
    /// # Errors
    ///
    /// - [`ElfError::SectionNotFound`] if no section has that name.
    /// - [`ElfError::CorruptStringTable`] if a name met during the scan
    ///   cannot be resolved.
    /// - [`ElfError::OutOfBounds`] if the section's data lies outside the
    ///   image.
    pub fn dump_section(
        &self,
        sections: &SectionTable<'a>,
        name: &str,
    ) -> Result<HexDump<'a>, ElfError> {
        let (index, header) = sections.find(name)?.ok_or(ElfError::SectionNotFound)?;
        let data = self.section_data(&header)?;
        Ok(HexDump {
            name: sections.name_of(&header)?,
            index,
            header,
            data,
        })
    }
}
