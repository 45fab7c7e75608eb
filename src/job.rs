//! Local execution of a whole anagram job.
//!
//! The job runs in two phases. The map phase processes every partition on
//! the blocking pool, at most `workers` at a time, emitting into one shared
//! [`Shuffle`]. Only when every partition has finished does the reduce phase
//! split the shuffle into `reducers` key-disjoint buckets and write one
//! `part-r-NNNNN` file per bucket.
//!
//! Output is written under `<output>/_temporary` and moved into place once
//! every reducer succeeded; `_SUCCESS` marks a completed job.

use std::fs::{self, File};
use std::io::{self, BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anagram_core::{
    Batch, PartitionProcessor, PartitionStats, ProcessorOptions, Shuffle, aggregate,
};
use anagram_corpus::{
    FsResources, Partition, ResourceCache, ResourceLoader, discover_partitions,
};
use anyhow::{Context, Result, anyhow, bail};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::{JobConfig, OutputFormat};

pub const SUCCESS_MARKER: &str = "_SUCCESS";
const TEMPORARY_DIR: &str = "_temporary";
const CACHE_DIR: &str = "cache";

/// What a finished job did.
#[derive(Clone, Debug, Default)]
pub struct JobSummary {
    pub partitions: usize,
    pub stats: PartitionStats,
    /// Distinct keys that reached the reduce phase.
    pub keys: usize,
    /// Records written across all output files.
    pub records: u64,
    pub files: Vec<PathBuf>,
}

/// Run a job to completion. Any error leaves no `_SUCCESS` marker behind.
pub async fn run_job(config: JobConfig) -> Result<JobSummary> {
    config.validate()?;
    if config.case_sensitive {
        warn!("case-sensitive matching is not supported; words are compared lowercased");
    }
    if config.output.exists() {
        bail!("output directory {} already exists", config.output.display());
    }

    let inputs = if config.reads_stdin() {
        Vec::new()
    } else {
        let inputs = discover_partitions(&config.input)?;
        if inputs.is_empty() {
            warn!("no partitions found under {}", config.input.display());
        }
        inputs
    };

    fs::create_dir_all(&config.output)
        .with_context(|| format!("create output directory {}", config.output.display()))?;
    let temporary = config.output.join(TEMPORARY_DIR);

    let result = execute(&config, inputs, &temporary).await;
    if temporary.exists() {
        if let Err(err) = fs::remove_dir_all(&temporary) {
            warn!("failed to remove {}: {err}", temporary.display());
        }
    }
    let summary = result?;

    File::create(config.output.join(SUCCESS_MARKER))
        .with_context(|| format!("write {SUCCESS_MARKER} marker"))?;
    Ok(summary)
}

async fn execute(config: &JobConfig, inputs: Vec<PathBuf>, temporary: &Path) -> Result<JobSummary> {
    let cache = ResourceCache::create(temporary.join(CACHE_DIR))?;
    let (skip_locator, loader) = stage_skip_file(config, cache);
    let options = Arc::new(config.processor_options(skip_locator));

    let map_start = Instant::now();
    let shuffle = Arc::new(Shuffle::new());
    let (partitions, stats) = if config.reads_stdin() {
        let open = || io::stdin().lock();
        map_stream(open, Arc::clone(&options), Arc::clone(&loader), Arc::clone(&shuffle)).await?
    } else {
        map_partitions(config, inputs, options, loader, Arc::clone(&shuffle)).await?
    };
    let shuffle = Arc::try_unwrap(shuffle)
        .map_err(|_| anyhow!("shuffle still shared after the map phase"))?;
    let keys = shuffle.key_count();
    info!(
        "map phase: {partitions} partitions, {} lines, {} pairs, {} skipped, {} numeric, {keys} keys in {} ms",
        stats.lines,
        stats.pairs,
        stats.skipped,
        stats.numeric,
        map_start.elapsed().as_millis()
    );

    let reduce_start = Instant::now();
    let outputs = reduce(config, shuffle, temporary).await?;
    let records: u64 = outputs.iter().map(|(_, count)| count).sum();
    let files = commit(&config.output, outputs)?;
    info!(
        "reduce phase: {records} records in {} files in {} ms",
        files.len(),
        reduce_start.elapsed().as_millis()
    );

    Ok(JobSummary {
        partitions,
        stats,
        keys,
        records,
        files,
    })
}

/// Copy the skip file into the job's resource cache.
///
/// Returns the locator processors load the skip list by, and the loader that
/// resolves it. A file that cannot be staged is read from its own path
/// instead; if that fails too, processors carry on without skip words.
fn stage_skip_file(config: &JobConfig, cache: ResourceCache) -> (Option<String>, Arc<dyn ResourceLoader>) {
    let path = match &config.skip_file {
        Some(path) if config.skip_patterns => path,
        _ => return (None, Arc::new(cache)),
    };
    match cache.stage(path) {
        Ok(locator) => {
            debug!("staged {} into {}", path.display(), cache.dir().display());
            (Some(locator), Arc::new(cache))
        }
        Err(err) => {
            warn!("failed to stage skip file: {err:#}; reading it in place");
            let locator = path.to_string_lossy().into_owned();
            (Some(locator), Arc::new(FsResources::new()))
        }
    }
}

async fn map_partitions(
    config: &JobConfig,
    inputs: Vec<PathBuf>,
    options: Arc<ProcessorOptions>,
    loader: Arc<dyn ResourceLoader>,
    shuffle: Arc<Shuffle>,
) -> Result<(usize, PartitionStats)> {
    let limit = Arc::new(Semaphore::new(config.workers));
    let mut tasks = JoinSet::new();
    let count = inputs.len();
    for path in inputs {
        let permit = Arc::clone(&limit)
            .acquire_owned()
            .await
            .context("worker limit closed")?;
        let options = Arc::clone(&options);
        let loader = Arc::clone(&loader);
        let shuffle = Arc::clone(&shuffle);
        let mode = config.load_mode;
        tasks.spawn_blocking(move || {
            let _permit = permit;
            let partition = Partition::load(&path, mode)?;
            let processor = PartitionProcessor::setup(&options, loader.as_ref());
            let stats = processor.run(partition.lines(), |pair| shuffle.emit(pair));
            debug!("processed {} ({} pairs)", partition.path().display(), stats.pairs);
            Ok::<_, anyhow::Error>(stats)
        });
    }

    let mut total = PartitionStats::default();
    while let Some(joined) = tasks.join_next().await {
        total += joined.context("map task panicked")??;
    }
    Ok((count, total))
}

/// Process one streamed partition, opened on the blocking pool by `open`.
async fn map_stream<O, R>(
    open: O,
    options: Arc<ProcessorOptions>,
    loader: Arc<dyn ResourceLoader>,
    shuffle: Arc<Shuffle>,
) -> Result<(usize, PartitionStats)>
where
    O: FnOnce() -> R + Send + 'static,
    R: BufRead,
{
    let stats = tokio::task::spawn_blocking(move || {
        let processor = PartitionProcessor::setup(&options, loader.as_ref());
        processor
            .run_reader(open(), |pair| shuffle.emit(pair))
            .context("read streamed partition")
    })
    .await
    .context("map task panicked")??;
    Ok((1, stats))
}

async fn reduce(config: &JobConfig, shuffle: Shuffle, temporary: &Path) -> Result<Vec<(PathBuf, u64)>> {
    let mut tasks = JoinSet::new();
    for (idx, bucket) in shuffle.into_partitioned(config.reducers).into_iter().enumerate() {
        let path = temporary.join(part_name(idx));
        let format = config.format;
        let separator = config.separator.clone();
        tasks.spawn_blocking(move || {
            let written = write_part(&path, bucket, format, &separator)
                .with_context(|| format!("write {}", path.display()))?;
            Ok::<_, anyhow::Error>((idx, path, written))
        });
    }

    let mut outputs = Vec::with_capacity(config.reducers);
    while let Some(joined) = tasks.join_next().await {
        outputs.push(joined.context("reduce task panicked")??);
    }
    outputs.sort_unstable_by_key(|(idx, _, _)| *idx);
    Ok(outputs
        .into_iter()
        .map(|(_, path, written)| (path, written))
        .collect())
}

fn write_part(path: &Path, batches: Vec<Batch>, format: OutputFormat, separator: &str) -> Result<u64> {
    let mut out = BufWriter::new(File::create(path)?);
    let mut written = 0u64;
    for batch in batches {
        let Some(record) = aggregate(batch.key, batch.words) else {
            continue;
        };
        match format {
            OutputFormat::Text => writeln!(out, "{}", record.delimited(separator))?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut out, &record)?;
                out.write_all(b"\n")?;
            }
        }
        written += 1;
    }
    out.flush()?;
    Ok(written)
}

/// Move finished part files from the temporary directory into `output`.
fn commit(output: &Path, outputs: Vec<(PathBuf, u64)>) -> Result<Vec<PathBuf>> {
    let mut files = Vec::with_capacity(outputs.len());
    for (path, _) in outputs {
        let name = path
            .file_name()
            .with_context(|| format!("part file {} has no name", path.display()))?;
        let target = output.join(name);
        fs::rename(&path, &target)
            .with_context(|| format!("move {} to {}", path.display(), target.display()))?;
        files.push(target);
    }
    Ok(files)
}

/// `part-r-00000`, `part-r-00001`, ...
pub fn part_name(reducer: usize) -> String {
    format!("part-r-{reducer:05}")
}
