use anagram_corpus::ResourceLoader;
use anagram_types::OutputRecord;

use crate::aggregate::aggregate;
use crate::partition::{PartitionProcessor, PartitionStats, ProcessorOptions};
use crate::shuffle::Shuffle;

/// Result of classifying a set of in-memory partitions.
#[derive(Clone, Debug, Default)]
pub struct Classification {
    /// Reported classes in ascending key order.
    pub records: Vec<OutputRecord>,
    /// Counters summed over every partition.
    pub stats: PartitionStats,
    /// Distinct keys seen, including those that did not produce a record.
    pub keys: usize,
}

/// Run both phases over texts held in memory, one partition per item.
///
/// Each partition gets its own processor (and its own skip set load); reduce
/// only starts after every partition has been emitted.
pub fn classify_partitions<I, P>(
    partitions: I,
    options: &ProcessorOptions,
    loader: &dyn ResourceLoader,
) -> Classification
where
    I: IntoIterator<Item = P>,
    P: AsRef<str>,
{
    let shuffle = Shuffle::new();
    let mut stats = PartitionStats::default();
    for text in partitions {
        let processor = PartitionProcessor::setup(options, loader);
        stats += processor.run(text.as_ref().lines(), |pair| shuffle.emit(pair));
    }

    let keys = shuffle.key_count();
    let records = shuffle
        .into_batches()
        .into_iter()
        .filter_map(|batch| aggregate(batch.key, batch.words))
        .collect();

    Classification {
        records,
        stats,
        keys,
    }
}
