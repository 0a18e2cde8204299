// File: ./src/cli.rs
//! Shared command-line interface logic: argument handling and help text.
use anyhow::{Result, bail};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
}

impl Verbosity {
    pub fn level_filter(self) -> log::LevelFilter {
        match self {
            Verbosity::Quiet => log::LevelFilter::Warn,
            Verbosity::Normal => log::LevelFilter::Info,
            Verbosity::Verbose => log::LevelFilter::Debug,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CliArgs {
    pub root: Option<PathBuf>,
    pub cast: Option<PathBuf>,
    pub groups: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub source: Option<PathBuf>,
    pub dry_run: bool,
    pub verbosity: Verbosity,
    pub help: bool,
}

impl CliArgs {
    /// Parses everything after the binary name.
    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut parsed = CliArgs::default();
        let mut iter = args.into_iter().map(Into::into);

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "-h" | "--help" | "help" => parsed.help = true,
                "-r" | "--root" => parsed.root = Some(Self::value(&arg, iter.next())?),
                "--cast" => parsed.cast = Some(Self::value(&arg, iter.next())?),
                "--groups" => parsed.groups = Some(Self::value(&arg, iter.next())?),
                "-o" | "--output" => parsed.output = Some(Self::value(&arg, iter.next())?),
                "-n" | "--dry-run" => parsed.dry_run = true,
                "-v" | "--verbose" => parsed.verbosity = Verbosity::Verbose,
                "-q" | "--quiet" => parsed.verbosity = Verbosity::Quiet,
                other if other.starts_with('-') => bail!("Unknown option '{}'", other),
                _ => {
                    if parsed.source.is_some() {
                        bail!("Only one schedule file can be given (extra: '{}')", arg);
                    }
                    parsed.source = Some(PathBuf::from(arg));
                }
            }
        }
        Ok(parsed)
    }

    fn value(flag: &str, next: Option<String>) -> Result<PathBuf> {
        match next {
            Some(v) if !v.starts_with('-') => Ok(PathBuf::from(v)),
            _ => bail!("'{}' needs a path", flag),
        }
    }
}

pub fn print_help(binary_name: &str) {
    println!(
        "Callsheet v{} - Turns rehearsal call schedules into normalized JSON",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("USAGE:");
    println!("    {} [OPTIONS] <schedule.txt>", binary_name);
    println!("    {} --help", binary_name);
    println!();
    println!("OPTIONS:");
    println!("    -r, --root <path>     Use a different directory for config and data.");
    println!("    --cast <file>         Cast roster (default: cast.json in the data dir).");
    println!("    --groups <file>       Group mappings (default: group_mappings.json).");
    println!("    -o, --output <file>   Schedule output (default: schedules.json).");
    println!("    -n, --dry-run         Print the schedule, write nothing.");
    println!("    -v, --verbose         Log every recognized line.");
    println!("    -q, --quiet           Only log warnings and errors.");
    println!("    -h, --help            Show this help message.");
    println!();
    println!("SCHEDULE SYNTAX:");
    println!("    Friday, September 5, 2025     Date header (year optional)");
    println!("    5:30-9:00 PIRATES, MERMAIDS   Time block with attendees");
    println!("    9:30am-2:00pm                 Time block, attendees on following lines");
    println!("    Full Cast (optional)          Everyone; default call if no block yet");
    println!();
    println!("UNRECOGNIZED NAMES:");
    println!("    a1            New role for that actor");
    println!("    a1,a3         New group with those actors");
    println!("    r2 / g4       Same as an existing role / group");
    println!("    f / i         Full cast / ignore");
}
