//! Bounds-checked view over the raw image bytes.
//!
//! Every structural read in the parser goes through [`ByteView`]. Offsets
//! and lengths come from file content, so all arithmetic is overflow-checked
//! and a failed check yields [`ElfError::OutOfBounds`] instead of a panic.

use crate::header::{ElfError, Region};

/// A borrowed, read-only window over an ELF image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteView<'a> {
    data: &'a [u8],
}

impl<'a> ByteView<'a> {
    /// Wraps a byte slice.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Total length of the view in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the view holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Returns `len` bytes starting at `offset`.
    ///
    /// Offsets are `u64` because that is how ELF64 stores them; values that
    /// do not fit in `usize` are treated as out of bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::OutOfBounds`] tagged with `region` if
    /// `offset + len` overflows or exceeds the view length.
    pub fn slice(&self, offset: u64, len: u64, region: Region) -> Result<&'a [u8], ElfError> {
        let end = offset
            .checked_add(len)
            .ok_or(ElfError::OutOfBounds(region))?;
        if end > self.data.len() as u64 {
            return Err(ElfError::OutOfBounds(region));
        }
        // Both bounds are <= data.len(), so they fit in usize.
        let start = usize::try_from(offset).map_err(|_| ElfError::OutOfBounds(region))?;
        let end = usize::try_from(end).map_err(|_| ElfError::OutOfBounds(region))?;
        self.data
            .get(start..end)
            .ok_or(ElfError::OutOfBounds(region))
    }

    /// Returns a fixed-size record of `N` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`slice`](Self::slice).
    pub fn array_at<const N: usize>(
        &self,
        offset: u64,
        region: Region,
    ) -> Result<&'a [u8; N], ElfError> {
        self.slice(offset, N as u64, region)?
            .first_chunk::<N>()
            .ok_or(ElfError::OutOfBounds(region))
    }

    /// Checks that a table of `count` entries, each `entsize` bytes wide,
    /// starting at `offset` lies entirely within the view.
    ///
    /// An empty table is always in bounds, whatever its offset.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::OutOfBounds`] if the table would extend past the
    /// end of the view.
    pub fn check_table(
        &self,
        offset: u64,
        count: u16,
        entsize: u16,
        region: Region,
    ) -> Result<(), ElfError> {
        if count == 0 {
            return Ok(());
        }
        let table_len = u64::from(count) * u64::from(entsize);
        self.slice(offset, table_len, region).map(|_| ())
    }
}

/// Reads a little-endian `u16` at byte offset `off` of a fixed record.
///
/// `off` is always a compile-time field offset inside the record.
pub(crate) fn le_u16<const N: usize>(b: &[u8; N], off: usize) -> u16 {
    let mut raw = [0u8; 2];
    raw.copy_from_slice(&b[off..off + 2]);
    u16::from_le_bytes(raw)
}

/// Reads a little-endian `u32` at byte offset `off` of a fixed record.
pub(crate) fn le_u32<const N: usize>(b: &[u8; N], off: usize) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&b[off..off + 4]);
    u32::from_le_bytes(raw)
}

/// Reads a little-endian `u64` at byte offset `off` of a fixed record.
pub(crate) fn le_u64<const N: usize>(b: &[u8; N], off: usize) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&b[off..off + 8]);
    u64::from_le_bytes(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_within_bounds() {
        let data = [1u8, 2, 3, 4, 5];
        let view = ByteView::new(&data);
        assert_eq!(view.slice(1, 3, Region::SectionData), Ok(&data[1..4]));
        assert_eq!(view.slice(5, 0, Region::SectionData), Ok(&data[5..5]));
    }

    #[test]
    fn slice_past_end_is_rejected() {
        let data = [0u8; 8];
        let view = ByteView::new(&data);
        assert_eq!(
            view.slice(4, 5, Region::SectionData),
            Err(ElfError::OutOfBounds(Region::SectionData))
        );
        assert_eq!(
            view.slice(9, 0, Region::SectionHeaders),
            Err(ElfError::OutOfBounds(Region::SectionHeaders))
        );
    }

    #[test]
    fn slice_overflow_is_rejected() {
        let data = [0u8; 8];
        let view = ByteView::new(&data);
        assert_eq!(
            view.slice(u64::MAX, 2, Region::ProgramHeaders),
            Err(ElfError::OutOfBounds(Region::ProgramHeaders))
        );
    }

    #[test]
    fn array_at_reads_fixed_record() {
        let data = [0xAAu8, 0xBB, 0xCC, 0xDD];
        let view = ByteView::new(&data);
        let rec: &[u8; 2] = view.array_at(2, Region::SectionData).unwrap();
        assert_eq!(rec, &[0xCC, 0xDD]);
        assert!(view.array_at::<4>(1, Region::SectionData).is_err());
    }

    #[test]
    fn check_table_bounds() {
        let data = [0u8; 128];
        let view = ByteView::new(&data);
        assert!(view.check_table(64, 1, 64, Region::SectionHeaders).is_ok());
        assert!(view.check_table(64, 2, 64, Region::SectionHeaders).is_err());
        assert!(view.check_table(u64::MAX, 0, 64, Region::SectionHeaders).is_ok());
    }

    #[test]
    fn little_endian_helpers() {
        let rec = [0x01u8, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
        assert_eq!(le_u16(&rec, 0), 0x0201);
        assert_eq!(le_u32(&rec, 4), 0x0807_0605);
        assert_eq!(le_u64(&rec, 0), 0x0807_0605_0403_0201);
    }
}
