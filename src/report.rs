// src/report.rs
use std::{
    collections::BTreeMap,
    fmt,
    path::{Path, PathBuf},
};

use crate::config::consts::EXIT_OK;
use crate::error::FlattenError;
use crate::flatten::{FlatRow, Flattened};

/// Summary of what was produced.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Inputs that loaded, with their row counts.
    pub loaded: Vec<(PathBuf, usize)>,
    pub failed: Vec<FlattenError>,
    /// Set once the output file has been written.
    pub output: Option<PathBuf>,
    pub total_rows: usize,
    /// First-seen order.
    pub per_model: Vec<(String, usize)>,
    pub per_category: BTreeMap<String, usize>,
    pub skipped: usize,
    pub filtered: usize,
    pub sample: Vec<FlatRow>,
    sample_limit: usize,
}

impl RunSummary {
    pub fn new(sample_limit: usize) -> Self {
        Self { sample_limit, ..Self::default() }
    }

    pub fn record_loaded(&mut self, path: &Path, flat: &Flattened) {
        self.loaded.push((path.to_path_buf(), flat.rows.len()));
        self.skipped += flat.skipped.len();
        self.filtered += flat.filtered;
        self.tally(&flat.rows);
    }

    pub fn record_failed(&mut self, err: FlattenError) {
        self.failed.push(err);
    }

    fn tally(&mut self, rows: &[FlatRow]) {
        self.total_rows += rows.len();
        for row in rows {
            match self.per_model.iter_mut().find(|(m, _)| *m == row.model) {
                Some((_, n)) => *n += 1,
                None => self.per_model.push((row.model.clone(), 1)),
            }
            *self.per_category.entry(row.category.clone()).or_insert(0) += 1;
        }
        let room = self.sample_limit.saturating_sub(self.sample.len());
        self.sample.extend(rows.iter().take(room).cloned());
    }

    /// 0 when every input loaded, else the code of the first failure.
    pub fn exit_code(&self) -> i32 {
        self.failed.first().map_or(EXIT_OK, FlattenError::exit_code)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Inputs: {} loaded, {} failed", self.loaded.len(), self.failed.len())?;
        for (path, rows) in &self.loaded {
            writeln!(f, "  {}: {rows} rows", path.display())?;
        }
        for err in &self.failed {
            writeln!(f, "  [{}] {err}", err.kind())?;
        }
        match &self.output {
            Some(path) => writeln!(f, "Output: {}", path.display())?,
            None => writeln!(f, "Output: not written")?,
        }
        writeln!(f, "Total rows: {}", self.total_rows)?;
        if self.total_rows == 0 {
            return write!(f, "No rows produced.");
        }

        writeln!(f, "Rows per model:")?;
        for (model, n) in &self.per_model {
            writeln!(f, "  {model}: {n}")?;
        }
        writeln!(f, "Rows per category:")?;
        for (category, n) in &self.per_category {
            writeln!(f, "  {category}: {n}")?;
        }
        writeln!(f, "Skipped: {}, filtered: {}", self.skipped, self.filtered)?;

        if !self.sample.is_empty() {
            write!(f, "Sample (first {}):", self.sample.len())?;
            for r in &self.sample {
                write!(f, "\n  {} | {} | {} | {} | {}", r.model, r.type_label, r.category, r.sub_category, r.price)?;
            }
        }
        Ok(())
    }
}
