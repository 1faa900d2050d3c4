//! Parallel batch driver.
//!
//! Per-source searches share nothing but the immutable network, so the
//! batch fans out over a rayon pool and each worker writes its own
//! `{source}.json` pattern file. A failed source is recorded and the rest
//! of the batch carries on.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::network::{Network, StopId};
use crate::search::{PatternSearch, SearchConfig};

/// Parameters for one batch run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Directory receiving one pattern file per source stop.
    pub output_dir: PathBuf,

    /// Worker threads; zero means one per core.
    pub threads: usize,

    /// Source stops to process; `None` means every stop in the network.
    pub sources: Option<Vec<StopId>>,
}

/// Error setting a batch up. Per-source errors are collected in the
/// report instead.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// A source whose search or output write failed.
#[derive(Debug, Clone)]
pub struct SourceFailure {
    pub source: StopId,
    pub reason: String,
}

/// Outcome of a batch run.
#[derive(Debug)]
pub struct BatchReport {
    pub completed: usize,
    pub failed: Vec<SourceFailure>,
    pub elapsed: std::time::Duration,
}

/// Run the pattern search from every requested source and write the
/// results to disk.
pub fn run_batch(
    network: &Network,
    search: SearchConfig,
    batch: &BatchConfig,
) -> Result<BatchReport, BatchError> {
    std::fs::create_dir_all(&batch.output_dir).map_err(|source| BatchError::CreateDir {
        path: batch.output_dir.clone(),
        source,
    })?;

    let sources: Vec<StopId> = match &batch.sources {
        Some(sources) => sources.clone(),
        None => network.stops().to_vec(),
    };
    info!(
        sources = sources.len(),
        threads = batch.threads,
        output = %batch.output_dir.display(),
        "starting batch"
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(batch.threads)
        .build()?;

    let started = Instant::now();
    let outcomes: Vec<Option<SourceFailure>> = pool.install(|| {
        sources
            .par_iter()
            .map(|&source| process_source(network, &search, batch, source))
            .collect()
    });

    let failed: Vec<SourceFailure> = outcomes.into_iter().flatten().collect();
    let completed = sources.len() - failed.len();
    let elapsed = started.elapsed();

    if failed.is_empty() {
        info!(completed, ?elapsed, "batch finished");
    } else {
        warn!(completed, failed = failed.len(), ?elapsed, "batch finished with failures");
    }

    Ok(BatchReport {
        completed,
        failed,
        elapsed,
    })
}

/// Search one source and write its pattern set; `None` on success.
fn process_source(
    network: &Network,
    search: &SearchConfig,
    batch: &BatchConfig,
    source: StopId,
) -> Option<SourceFailure> {
    let engine = PatternSearch::new(network, search.clone());
    let result = match engine.run(source) {
        Ok(result) => result,
        Err(err) => {
            return Some(SourceFailure {
                source,
                reason: err.to_string(),
            });
        }
    };

    let path = batch.output_dir.join(format!("{source}.json"));
    let file = match File::create(&path) {
        Ok(file) => file,
        Err(err) => {
            return Some(SourceFailure {
                source,
                reason: format!("failed to create {}: {err}", path.display()),
            });
        }
    };
    if let Err(err) = serde_json::to_writer_pretty(BufWriter::new(file), &result) {
        return Some(SourceFailure {
            source,
            reason: format!("failed to write {}: {err}", path.display()),
        });
    }

    info!(
        %source,
        patterns = result.patterns.len(),
        failures = result.failures.len(),
        "source done"
    );
    None
}
