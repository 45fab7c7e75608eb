use std::io::BufRead;
use std::ops::AddAssign;

use anagram_corpus::ResourceLoader;
use anagram_types::Pair;
use tracing::{debug, warn};

use crate::error::ClassifyError;
use crate::key::anagram_key;
use crate::normalize::{Normalized, contains_digit};
use crate::skip::SkipSet;

/// Settings that shape how a partition is processed.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ProcessorOptions {
    /// Accepted for compatibility; tokens are always lowercased.
    pub case_sensitive: bool,
    /// Load the skip list named by `skip_locator`.
    pub skip_patterns: bool,
    pub skip_locator: Option<String>,
}

/// Per-partition counters.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PartitionStats {
    pub lines: u64,
    /// Tokens produced by normalization, before any filter.
    pub tokens: u64,
    /// Tokens dropped because they are in the skip set.
    pub skipped: u64,
    /// Tokens dropped because they contain a digit.
    pub numeric: u64,
    pub pairs: u64,
}

impl AddAssign for PartitionStats {
    fn add_assign(&mut self, other: Self) {
        self.lines += other.lines;
        self.tokens += other.tokens;
        self.skipped += other.skipped;
        self.numeric += other.numeric;
        self.pairs += other.pairs;
    }
}

/// Turns the lines of one partition into keyed pairs.
///
/// Created in its setup state (skip set loaded) and consumed by one of the
/// `run` methods, so a processor handles exactly one partition.
#[derive(Debug)]
pub struct PartitionProcessor {
    skip: SkipSet,
}

impl PartitionProcessor {
    pub fn new(skip: SkipSet) -> Self {
        Self { skip }
    }

    /// Load the skip set according to `options` and get ready to stream.
    pub fn setup(options: &ProcessorOptions, loader: &dyn ResourceLoader) -> Self {
        if options.case_sensitive {
            debug!("case_sensitive is set but tokens are always lowercased");
        }
        let skip = if options.skip_patterns {
            if options.skip_locator.is_none() {
                warn!("skip filtering enabled without a skip list; nothing will be skipped");
            }
            SkipSet::load(loader, options.skip_locator.as_deref())
        } else {
            SkipSet::empty()
        };
        Self::new(skip)
    }

    pub fn skip_set(&self) -> &SkipSet {
        &self.skip
    }

    /// Process every line, handing each pair to `emit` as it is produced.
    pub fn run<I, S, F>(self, lines: I, mut emit: F) -> PartitionStats
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: FnMut(Pair),
    {
        let mut stats = PartitionStats::default();
        for line in lines {
            self.process_line(line.as_ref(), &mut stats, &mut emit);
        }
        log_stats(&stats);
        stats
    }

    /// Like [`run`](Self::run) over a reader.
    ///
    /// Lines are split the same way as partition files: on `\n`, with a
    /// trailing `\r` dropped and invalid UTF-8 replaced. Only read failures
    /// abort the partition.
    pub fn run_reader<R, F>(self, mut reader: R, mut emit: F) -> Result<PartitionStats, ClassifyError>
    where
        R: BufRead,
        F: FnMut(Pair),
    {
        let mut stats = PartitionStats::default();
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let mut line = buf.as_slice();
            if let Some(rest) = line.strip_suffix(b"\n") {
                line = rest;
            }
            if let Some(rest) = line.strip_suffix(b"\r") {
                line = rest;
            }
            self.process_line(&String::from_utf8_lossy(line), &mut stats, &mut emit);
        }
        log_stats(&stats);
        Ok(stats)
    }

    fn process_line<F: FnMut(Pair)>(&self, line: &str, stats: &mut PartitionStats, emit: &mut F) {
        stats.lines += 1;
        let normalized = Normalized::new(line);
        for token in normalized.candidates() {
            stats.tokens += 1;
            if self.skip.contains(token) {
                stats.skipped += 1;
                continue;
            }
            if contains_digit(token) {
                stats.numeric += 1;
                continue;
            }
            stats.pairs += 1;
            emit(Pair::new(anagram_key(token), token));
        }
    }
}

fn log_stats(stats: &PartitionStats) {
    debug!(
        "partition done: {} lines, {} tokens, {} skipped, {} numeric, {} pairs",
        stats.lines, stats.tokens, stats.skipped, stats.numeric, stats.pairs
    );
}
