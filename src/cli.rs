// src/cli.rs
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser};

use crate::config::{
    consts::{EXIT_OK, SAMPLE_ROWS},
    options::{ExportFormat, RunOptions},
    profile::{BUILTIN_PROFILES, FeedProfile, TypeConvention},
};
use crate::error::FlattenError;
use crate::progress::Progress;

/// Flatten car-configurator option trees (JSON) into one CSV schema.
#[derive(Debug, Parser)]
#[command(name = "optflat", version, about)]
pub struct Args {
    /// Input JSON feeds, processed in order. Defaults to the profile's input file.
    #[arg(value_name = "INPUT")]
    pub inputs: Vec<PathBuf>,

    /// Output file. Defaults to the profile's output file, or the first input renamed.
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Built-in feed profile (see --list-profiles).
    #[arg(short, long, value_name = "NAME", conflicts_with = "profile_file")]
    pub profile: Option<String>,

    /// Feed profile read from a JSON file; missing fields use `generic`.
    #[arg(long, value_name = "PATH")]
    pub profile_file: Option<PathBuf>,

    #[arg(long, default_value = "csv", value_name = "csv|tsv")]
    pub format: ExportFormat,

    /// Override the profile's `type` convention.
    #[arg(long, value_name = "group-path|category-path")]
    pub type_convention: Option<TypeConvention>,

    /// Override the profile's zero-price sentinel.
    #[arg(long, value_name = "TEXT")]
    pub zero_price: Option<String>,

    /// Write only the 15 core columns.
    #[arg(long)]
    pub core_columns: bool,

    /// Sample rows shown in the summary.
    #[arg(long, default_value_t = SAMPLE_ROWS, value_name = "N")]
    pub sample: usize,

    /// Retry unparseable input after stripping stray backslashes.
    #[arg(long)]
    pub repair: bool,

    /// More log output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Errors only.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print the built-in profiles and exit.
    #[arg(long)]
    pub list_profiles: bool,
}

impl Args {
    pub fn into_options(self) -> Result<RunOptions, FlattenError> {
        let mut profile = match (&self.profile_file, &self.profile) {
            (Some(path), _) => FeedProfile::from_file(path)?,
            (None, Some(name)) => FeedProfile::resolve(name)?,
            (None, None) => FeedProfile::default(),
        };
        if let Some(tc) = self.type_convention {
            profile.type_convention = tc;
        }
        if let Some(zero) = self.zero_price {
            profile.zero_price = zero;
        }

        Ok(RunOptions {
            inputs: self.inputs,
            output: self.output,
            profile,
            format: self.format,
            core_columns: self.core_columns,
            sample_rows: self.sample,
            repair: self.repair,
        })
    }
}

/// Prints `[i/n] path: N rows` per input on stderr.
#[derive(Default)]
struct ConsoleProgress {
    total: usize,
}

impl Progress for ConsoleProgress {
    fn begin(&mut self, total: usize) {
        self.total = total;
    }

    fn log(&mut self, msg: &str) {
        eprintln!("{msg}");
    }

    fn item_done(&mut self, index: usize, path: &Path, rows: usize) {
        eprintln!("[{}/{}] {}: {rows} rows", index + 1, self.total, path.display());
    }

    fn item_failed(&mut self, index: usize, path: &Path, err: &FlattenError) {
        eprintln!("[{}/{}] {}: failed ({})", index + 1, self.total, path.display(), err.kind());
    }
}

/// Parse args, run, print the summary. Returns the process exit code.
pub fn run() -> color_eyre::Result<i32> {
    let args = Args::parse();
    crate::log::init(args.verbose, args.quiet);

    if args.list_profiles {
        for name in BUILTIN_PROFILES {
            let p = FeedProfile::resolve(name)?;
            println!("{name}\t{} -> {}", p.default_input, p.default_output);
        }
        return Ok(EXIT_OK);
    }

    let opts = match args.into_options() {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("Error: {e}");
            return Ok(e.exit_code());
        }
    };

    let mut progress = ConsoleProgress::default();
    match crate::runner::run(&opts, Some(&mut progress)) {
        Ok(summary) => {
            println!("{summary}");
            Ok(summary.exit_code())
        }
        Err(e) => {
            eprintln!("Error: {e}");
            Ok(e.exit_code())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn flags_layer_over_profile() {
        let args = Args::parse_from([
            "optflat", "a.json", "b.json", "-p", "mclaren", "--format", "tsv",
            "--type-convention", "category-path", "--zero-price", "Included", "--core-columns",
        ]);
        let opts = args.into_options().unwrap();
        assert_eq!(opts.inputs.len(), 2);
        assert_eq!(opts.profile.name, "mclaren");
        assert_eq!(opts.profile.type_convention, TypeConvention::CategoryPath);
        assert_eq!(opts.profile.zero_price, "Included");
        assert_eq!(opts.format, ExportFormat::Tsv);
        assert_eq!(opts.out_path(), PathBuf::from("a.tsv"));
        assert_eq!(opts.schema().columns().len(), 15);
    }

    #[test]
    fn unknown_profile_is_config_error() {
        let err = Args::parse_from(["optflat", "--profile", "tesla"]).into_options().unwrap_err();
        assert_eq!(err.exit_code(), crate::config::consts::EXIT_CONFIG);
    }

    #[test]
    fn profile_and_profile_file_conflict() {
        assert!(Args::try_parse_from(["optflat", "-p", "mini", "--profile-file", "x.json"]).is_err());
    }
}
