// src/runner.rs
use tracing::{error, info, warn};

use crate::{
    config::options::RunOptions,
    error::FlattenError,
    file::write_rows,
    flatten::flatten_feed,
    loader::load_path,
    progress::Progress,
    report::RunSummary,
};

/// Load → flatten each input in order, then write one output file.
///
/// Input failures are recorded in the summary and the batch continues.
/// Output is written when at least one input loaded. An output path that
/// names an input is refused before anything is read; apart from that, a
/// failure to write the output is the only error returned.
pub fn run(
    opts: &RunOptions,
    mut progress: Option<&mut dyn Progress>,
) -> Result<RunSummary, FlattenError> {
    let inputs = opts.resolved_inputs();
    let out = opts.checked_out_path()?;
    let profile = &opts.profile;
    let mut summary = RunSummary::new(opts.sample_rows);
    let mut rows = Vec::new();

    if let Some(p) = progress.as_deref_mut() {
        p.begin(inputs.len());
    }
    info!("profile {}: {} input(s)", profile.name, inputs.len());

    for (i, path) in inputs.iter().enumerate() {
        match load_path(path, profile, opts.repair) {
            Ok(feed) => {
                let mut flat = flatten_feed(&feed, profile);
                if let Some(p) = progress.as_deref_mut() {
                    p.item_done(i, path, flat.rows.len());
                }
                summary.record_loaded(path, &flat);
                rows.append(&mut flat.rows);
            }
            Err(e) => {
                error!("{e}");
                if let Some(p) = progress.as_deref_mut() {
                    p.item_failed(i, path, &e);
                }
                summary.record_failed(e);
            }
        }
    }

    if summary.loaded.is_empty() {
        if let Some(p) = progress.as_deref_mut() {
            p.log("No input could be loaded; nothing written.");
            p.finish();
        }
        return Ok(summary);
    }

    if rows.is_empty() {
        warn!("no rows produced");
    }

    let written = write_rows(&out, &opts.schema(), &rows, opts.format);
    if let Some(p) = progress.as_deref_mut() {
        p.finish();
    }
    written?;

    info!("wrote {} rows to {}", rows.len(), out.display());
    summary.output = Some(out);
    Ok(summary)
}
