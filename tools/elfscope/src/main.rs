//! elfscope: a small `readelf`-style inspector for ELF64 files.
//!
//! Pipeline: parse flags → map the file → validate the header → print the
//! requested reports (info → segments → sections → dump). Any failure is
//! reported on stderr and turns into a non-zero exit status; the mapping is
//! released on every path.

mod cli;
mod image;
mod report;

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use elfscope_elf::ElfFile;
use log::{debug, error, info};

use crate::image::Image;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .format_timestamp(None)
        .format_target(false)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &cli::Cli) -> Result<()> {
    let image = Image::open(&cli.file)?;
    let elf = ElfFile::parse(image.bytes())
        .with_context(|| format!("{}", image.path().display()))?;
    let header = elf.header();
    info!(
        "{}: {}, {}, {} program headers, {} section headers",
        image.path().display(),
        header.object_type(),
        header.machine(),
        header.e_phnum,
        header.e_shnum
    );
    debug!("{}: {} bytes", image.path().display(), image.len());

    let mut out = BufWriter::new(io::stdout().lock());
    if cli.wants_info() {
        report::write_info(&mut out, &elf)?;
    }
    if cli.segments {
        report::write_segments(&mut out, &elf)?;
    }
    if cli.sections {
        report::write_sections(&mut out, &elf)?;
    }
    if let Some(name) = cli.dump.as_deref() {
        report::write_dump(&mut out, &elf, name)?;
    }
    out.flush()?;
    Ok(())
}
