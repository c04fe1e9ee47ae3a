use std::fmt::Display;
use std::io::{self, Write};

use colored::Colorize as _;

use crate::report::ActivityReport;

/// Write the report as JSON followed by a newline
pub fn write_report(mut out: impl Write, report: &ActivityReport, compact: bool) -> io::Result<()> {
    if compact {
        serde_json::to_writer(&mut out, report)?;
    } else {
        serde_json::to_writer_pretty(&mut out, report)?;
    }
    writeln!(out)?;
    out.flush()
}

/// Report a fatal error on stderr and exit with status 1
pub fn fatal(err: impl Display) -> ! {
    eprintln!("{} {err}", "error:".red().bold());
    std::process::exit(1);
}
