//! Bounds-checked ELF64 structural parser.
//!
//! Interprets a raw byte slice as an ELF64 image: file header, program
//! header table, section header table, section names, and section payloads.
//! Every offset and count taken from the file is checked against the slice
//! before use. No unsafe code, no allocations.
//!
//! # Usage
//!
//! ```
//! use elfscope_elf::{ElfError, ElfFile};
//!
//! fn list(data: &[u8]) -> Result<(), ElfError> {
//!     let elf = ElfFile::parse(data)?;
//!     for seg in elf.segments()? {
//!         let _ = (seg.segment_type(), seg.p_vaddr);
//!     }
//!     let sections = elf.sections()?;
//!     for shdr in sections.iter() {
//!         let _name = sections.name_of(&shdr)?;
//!     }
//!     let dump = elf.dump_section(&sections, ".text")?;
//!     for _row in dump.rows() {}
//!     Ok(())
//! }
//! ```

#![cfg_attr(not(test), no_std)]
#![forbid(unsafe_code)]

pub mod bytes;
mod display;
pub mod dump;
pub mod header;
pub mod section;
pub mod segment;

pub use bytes::ByteView;
pub use dump::{HexDump, HexRow, HexRows, ROW_WIDTH};
pub use header::{Elf64Header, ElfError, Machine, ObjectType, Region};
pub use section::{
    Elf64SectionHeader, SHN_UNDEF, SHT_NOBITS, SectionIter, SectionName, SectionTable,
    SectionType, StringTable,
};
pub use segment::{Elf64ProgramHeader, ElfFile, SegmentFlags, SegmentIter, SegmentType};
