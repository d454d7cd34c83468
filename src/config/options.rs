// src/config/options.rs
use std::{
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use super::consts::SAMPLE_ROWS;
use super::profile::FeedProfile;
use crate::error::FlattenError;
use crate::schema::Schema;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Csv,
    Tsv,
}

impl ExportFormat {
    pub fn ext(self) -> &'static str {
        match self { ExportFormat::Csv => "csv", ExportFormat::Tsv => "tsv" }
    }
    pub fn delim(self) -> u8 {
        match self { ExportFormat::Csv => b',', ExportFormat::Tsv => b'\t' }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "tsv" => Ok(ExportFormat::Tsv),
            other => Err(format!("unknown format: {other} (csv | tsv)")),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ext())
    }
}

/// Everything one run needs. Built by the CLI or by library callers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunOptions {
    /// Processed in this order. Empty means the profile's default input.
    pub inputs: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub profile: FeedProfile,
    pub format: ExportFormat,
    /// Force the 15 core columns even when the profile adds extras.
    pub core_columns: bool,
    pub sample_rows: usize,
    pub repair: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            output: None,
            profile: FeedProfile::default(),
            format: ExportFormat::Csv,
            core_columns: false,
            sample_rows: SAMPLE_ROWS,
            repair: false,
        }
    }
}

impl RunOptions {
    pub fn resolved_inputs(&self) -> Vec<PathBuf> {
        if self.inputs.is_empty() {
            vec![PathBuf::from(&self.profile.default_input)]
        } else {
            self.inputs.clone()
        }
    }

    /// Explicit output, else the profile default (for default inputs) or
    /// the first input with the format's extension.
    pub fn out_path(&self) -> PathBuf {
        if let Some(out) = &self.output {
            return out.clone();
        }
        let base = match self.inputs.first() {
            Some(first) => first.clone(),
            None => PathBuf::from(&self.profile.default_output),
        };
        base.with_extension(self.format.ext())
    }

    /// [`out_path`](Self::out_path), refused when it names one of the inputs.
    pub fn checked_out_path(&self) -> Result<PathBuf, FlattenError> {
        let out = self.out_path();
        match self.resolved_inputs().iter().find(|input| same_file(input, &out)) {
            Some(input) => Err(FlattenError::Config(format!(
                "output {} would overwrite input {}; pass --output",
                out.display(),
                input.display()
            ))),
            None => Ok(out),
        }
    }

    pub fn schema(&self) -> Schema {
        Schema::for_profile(&self.profile, self.core_columns)
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_come_from_profile() {
        let opts = RunOptions { profile: FeedProfile::resolve("rolls-royce").unwrap(), ..RunOptions::default() };
        assert_eq!(opts.resolved_inputs(), [PathBuf::from("RR.json")]);
        assert_eq!(opts.out_path(), PathBuf::from("RR.csv"));

        let tsv = RunOptions { format: ExportFormat::Tsv, ..opts };
        assert_eq!(tsv.out_path(), PathBuf::from("RR.tsv"));
    }

    #[test]
    fn output_follows_first_input() {
        let opts = RunOptions {
            inputs: vec![PathBuf::from("feeds/ferrari.json"), PathBuf::from("mini.json")],
            ..RunOptions::default()
        };
        assert_eq!(opts.out_path(), PathBuf::from("feeds/ferrari.csv"));

        let explicit = RunOptions { output: Some(PathBuf::from("all.txt")), ..opts };
        assert_eq!(explicit.out_path(), PathBuf::from("all.txt"));
    }

    #[test]
    fn output_may_not_replace_an_input() {
        let opts = RunOptions { inputs: vec![PathBuf::from("feeds/mini.csv")], ..RunOptions::default() };
        let err = opts.checked_out_path().unwrap_err();
        assert!(matches!(err, FlattenError::Config(_)));

        let explicit = RunOptions { output: Some(PathBuf::from("feeds/mini.json")), ..opts.clone() };
        assert!(explicit.checked_out_path().is_ok());

        let ok = RunOptions { inputs: vec![PathBuf::from("feeds/mini.json")], ..RunOptions::default() };
        assert_eq!(ok.checked_out_path().unwrap(), PathBuf::from("feeds/mini.csv"));
    }

    #[test]
    fn format_parses() {
        assert_eq!("TSV".parse::<ExportFormat>().unwrap(), ExportFormat::Tsv);
        assert!("json".parse::<ExportFormat>().is_err());
        assert_eq!(ExportFormat::Tsv.delim(), b'\t');
    }
}
