//! Command-line interface definitions for elfscope.

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use log::LevelFilter;

/// Inspect the headers, segments and sections of an ELF64 file.
///
/// Reports are printed in a fixed order: header info, segments, sections,
/// then the section dump. With no report flag, the header info is shown.
#[derive(Parser, Debug)]
#[command(name = "elfscope", version, about)]
pub struct Cli {
    /// Print the ELF file header summary.
    #[arg(short = 'i', long = "info")]
    pub info: bool,

    /// Print one line per program header (segment).
    #[arg(short = 'p', long = "segments")]
    pub segments: bool,

    /// Print one line per section header.
    #[arg(short = 's', long = "sections")]
    pub sections: bool,

    /// Hex dump the contents of the named section.
    #[arg(short = 'x', long = "dump", value_name = "SECTION")]
    pub dump: Option<String>,

    /// Log more detail to stderr (repeat for more).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Log errors only.
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    pub quiet: bool,

    /// ELF file to inspect.
    pub file: PathBuf,
}

impl Cli {
    /// Returns `true` if the header summary should be printed.
    pub fn wants_info(&self) -> bool {
        self.info || (!self.segments && !self.sections && self.dump.is_none())
    }

    /// Log level selected by `-q` / `-v`.
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Error;
        }
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}
