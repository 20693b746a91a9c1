//! Human-readable reports over a parsed ELF file.
//!
//! Each report writes to any [`Write`] sink so the layout can be checked
//! without a terminal.

use std::io::Write;

use anyhow::{Context, Result, bail};
use elfscope_elf::{ElfError, ElfFile, SectionType};
use log::debug;

/// Print the file header summary.
pub fn write_info(out: &mut impl Write, elf: &ElfFile<'_>) -> Result<()> {
    let hdr = elf.header();
    writeln!(out, "ELF Header:")?;
    writeln!(out, "  Type:                              {}", hdr.object_type())?;
    writeln!(out, "  Machine:                           {}", hdr.machine())?;
    writeln!(out, "  Entry point address:               {:#x}", hdr.e_entry)?;
    writeln!(
        out,
        "  Start of program headers:          {:#x} (bytes into file)",
        hdr.e_phoff
    )?;
    writeln!(out, "  Size of program headers:           {} (bytes)", hdr.e_phentsize)?;
    writeln!(out, "  Number of program headers:         {}", hdr.e_phnum)?;
    writeln!(
        out,
        "  Start of section headers:          {:#x} (bytes into file)",
        hdr.e_shoff
    )?;
    writeln!(out, "  Size of section headers:           {} (bytes)", hdr.e_shentsize)?;
    writeln!(out, "  Number of section headers:         {}", hdr.e_shnum)?;
    writeln!(out, "  Section header string table index: {}", hdr.e_shstrndx)?;
    Ok(())
}

/// Print one line per program header.
pub fn write_segments(out: &mut impl Write, elf: &ElfFile<'_>) -> Result<()> {
    let segments = elf.segments().context("cannot read program headers")?;
    debug!(
        "{} program headers at {:#x}",
        segments.len(),
        elf.header().e_phoff
    );

    writeln!(out, "Program Headers:")?;
    if segments.len() == 0 {
        writeln!(out, "  There are no program headers in this file.")?;
        return Ok(());
    }
    for (i, seg) in segments.enumerate() {
        writeln!(
            out,
            "Segment {i}: type={} offset={:#x} vaddr={:#x} filesz={:#x} memsz={:#x} flags={}",
            seg.segment_type(),
            seg.p_offset,
            seg.p_vaddr,
            seg.p_filesz,
            seg.p_memsz,
            seg.flags(),
        )?;
    }
    Ok(())
}

/// Print one line per section header.
pub fn write_sections(out: &mut impl Write, elf: &ElfFile<'_>) -> Result<()> {
    let sections = elf.sections().context("cannot read section headers")?;
    debug!(
        "{} section headers at {:#x}, names in section {}",
        sections.len(),
        elf.header().e_shoff,
        elf.header().e_shstrndx
    );

    writeln!(out, "Section Headers:")?;
    if sections.is_empty() {
        writeln!(out, "  There are no sections in this file.")?;
        return Ok(());
    }
    for (i, shdr) in sections.iter().enumerate() {
        let name = sections
            .name_of(&shdr)
            .with_context(|| format!("cannot resolve name of section {i}"))?;
        writeln!(
            out,
            "[{i:2}] {name:<20} type={} addr={:#x} offset={:#x} size={:#x}",
            shdr.section_type(),
            shdr.sh_addr,
            shdr.sh_offset,
            shdr.sh_size,
        )?;
    }
    Ok(())
}

/// Print a hex and ASCII dump of the first section called `name`.
pub fn write_dump(out: &mut impl Write, elf: &ElfFile<'_>, name: &str) -> Result<()> {
    let sections = elf.sections().context("cannot read section headers")?;
    let dump = match elf.dump_section(&sections, name) {
        Ok(dump) => dump,
        Err(ElfError::SectionNotFound) => bail!("section '{name}' not found"),
        Err(err) => return Err(err).with_context(|| format!("cannot dump section '{name}'")),
    };
    debug!(
        "dumping section {} at {:#x}, {} rows",
        dump.index(),
        dump.header().sh_offset,
        dump.row_count()
    );

    writeln!(out)?;
    writeln!(
        out,
        "Hex dump of section '{}' (size {}):",
        dump.name(),
        dump.header().sh_size
    )?;
    if dump.header().section_type() == SectionType::NoBits {
        writeln!(out, "  Section has no data in the file.")?;
        return Ok(());
    }
    for row in dump.rows() {
        writeln!(out, "{row}")?;
    }
    Ok(())
}
