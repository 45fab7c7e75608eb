//! Anagram class extraction: from raw text lines to reported classes.
//!
//! The pieces compose in two phases:
//!
//! 1. A [`PartitionProcessor`] is set up once per partition (loading its
//!    [`SkipSet`]) and turns each line into [`Pair`]s: the line is normalized,
//!    skip words and digit-bearing tokens are dropped, and every surviving
//!    token is keyed by [`anagram_key`].
//! 2. After every partition has emitted into a [`Shuffle`], each key's
//!    complete batch goes through [`aggregate`], which keeps only classes with
//!    more than one distinct word.
//!
//! [`classify_partitions`] runs both phases in memory.
//!
//! ```rust
//! use anagram_core::{ProcessorOptions, classify_partitions};
//! use anagram_corpus::MemoryResources;
//!
//! let result = classify_partitions(
//!     ["listen silent enlist cat"],
//!     &ProcessorOptions::default(),
//!     &MemoryResources::new(),
//! );
//! assert_eq!(result.records.len(), 1);
//! assert_eq!(result.records[0].to_string(), "eilnst\t[enlist, listen, silent]");
//! ```
//!
//! [`Pair`]: anagram_types::Pair

pub mod aggregate;
pub mod error;
pub mod key;
pub mod normalize;
pub mod partition;
pub mod pipeline;
pub mod shuffle;
pub mod skip;

pub use aggregate::aggregate;
pub use error::ClassifyError;
pub use key::{anagram_key, is_anagram};
pub use normalize::{Normalized, contains_digit, normalize_line};
pub use partition::{PartitionProcessor, PartitionStats, ProcessorOptions};
pub use pipeline::{Classification, classify_partitions};
pub use shuffle::{Batch, Shuffle, reducer_for};
pub use skip::SkipSet;
