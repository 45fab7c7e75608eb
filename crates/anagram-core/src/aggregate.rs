use std::collections::BTreeSet;

use anagram_types::{AnagramKey, OutputRecord};

/// Reduce every word seen under `key` to at most one record.
///
/// The batch must be complete: repeats collapse, and a class with fewer than
/// two distinct words is not reported. Words come out in ascending order
/// whatever order they arrived in.
pub fn aggregate<I, S>(key: AnagramKey, batch: I) -> Option<OutputRecord>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let distinct: BTreeSet<String> = batch.into_iter().map(Into::into).collect();
    if distinct.len() <= 1 {
        return None;
    }
    Some(OutputRecord::new(key, distinct.into_iter().collect()))
}
