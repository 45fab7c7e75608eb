//! In-memory grouping of pairs by key.
//!
//! Partitions emit concurrently into a [`Shuffle`]; nothing is read back until
//! every partition has finished, at which point the shuffle is consumed into
//! complete per-key [`Batch`]es.

use anagram_types::{AnagramKey, Pair};
use dashmap::DashMap;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Every word emitted under one key, in arrival order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Batch {
    pub key: AnagramKey,
    pub words: Vec<String>,
}

#[derive(Debug, Default)]
pub struct Shuffle {
    groups: DashMap<AnagramKey, Vec<String>>,
}

impl Shuffle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the pair's word to its key's list. Safe to call from many threads.
    pub fn emit(&self, pair: Pair) {
        self.groups.entry(pair.key).or_default().push(pair.word);
    }

    /// Number of distinct keys seen so far.
    pub fn key_count(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// All batches in ascending key order.
    pub fn into_batches(self) -> Vec<Batch> {
        let mut batches: Vec<Batch> = self
            .groups
            .into_iter()
            .map(|(key, words)| Batch { key, words })
            .collect();
        batches.sort_unstable_by(|a, b| a.key.cmp(&b.key));
        batches
    }

    /// Split batches across `reducers` buckets by key hash; each bucket is in key order.
    pub fn into_partitioned(self, reducers: usize) -> Vec<Vec<Batch>> {
        let reducers = reducers.max(1);
        let mut buckets: Vec<Vec<Batch>> = vec![Vec::new(); reducers];
        for batch in self.into_batches() {
            let idx = reducer_for(&batch.key, reducers);
            buckets[idx].push(batch);
        }
        buckets
    }
}

/// Stable reducer assignment for a key (FNV-1a over the key's bytes).
pub fn reducer_for(key: &AnagramKey, reducers: usize) -> usize {
    if reducers <= 1 {
        return 0;
    }
    let mut hash = FNV_OFFSET;
    for byte in key.as_str().bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    (hash % reducers as u64) as usize
}
