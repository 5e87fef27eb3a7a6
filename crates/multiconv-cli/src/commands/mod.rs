pub mod run;
pub mod suite;

use std::io::{self, Write};
use std::str::FromStr;

use multiconv::harness::{format_timings, RunReport};

/// Report format shared by the `run` and `suite` subcommands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown format '{other}': expected text or json")),
        }
    }
}

/// Run `f` on a dedicated rayon pool of `threads` workers, or on the
/// global pool when no count is given.
pub fn install<T: Send>(
    threads: Option<usize>,
    f: impl FnOnce() -> T + Send,
) -> Result<T, Box<dyn std::error::Error>> {
    match threads {
        Some(0) => Err("--threads must be at least 1".into()),
        Some(n) => {
            let pool = rayon::ThreadPoolBuilder::new().num_threads(n).build()?;
            tracing::debug!(threads = n, "using dedicated thread pool");
            Ok(pool.install(f))
        }
        None => Ok(f()),
    }
}

/// Write the text report: timings and an acceptable verdict to `out`, a
/// suspect verdict to `err`.
pub fn write_text<O: Write, E: Write>(
    out: &mut O,
    err: &mut E,
    report: &RunReport,
) -> io::Result<()> {
    write!(out, "{}", format_timings(report))?;
    if report.equivalence.is_acceptable() {
        writeln!(out, "{}", report.equivalence)
    } else {
        out.flush()?;
        writeln!(err, "{}", report.equivalence)
    }
}

pub fn print_text(report: &RunReport) -> io::Result<()> {
    write_text(&mut io::stdout().lock(), &mut io::stderr().lock(), report)
}
