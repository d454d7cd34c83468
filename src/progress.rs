// src/progress.rs
use std::path::Path;

use crate::error::FlattenError;

/// Lightweight progress reporting for a batch of input files.
/// Frontends implement this to surface status to users.
pub trait Progress {
    /// Called at the start with the number of inputs.
    fn begin(&mut self, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// One input loaded and flattened (`index` is 0-based).
    fn item_done(&mut self, _index: usize, _path: &Path, _rows: usize) {}

    /// One input could not be loaded; the run goes on.
    fn item_failed(&mut self, _index: usize, _path: &Path, _err: &FlattenError) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}
