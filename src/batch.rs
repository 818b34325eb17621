//! Row-to-columnar batch assembly.
//!
//! [`BatchAssembler`] drives an [`Extractor`] over every row of a batch and
//! flattens the results into [`BatchOutput`]: one flat key sequence, one flat
//! value sequence, and per-row offsets. When the extractor uses
//! [`DeferredUnescaping`](crate::DeferredUnescaping), the escape character is
//! deleted from each flat sequence in one bulk pass during [`finish`].
//!
//! Rows are independent of each other, so a batch can also be sharded across
//! worker threads with [`Extractor::extract_batch_parallel`]; the merged
//! output is byte-identical to sequential assembly.
//!
//! ## Examples
//!
//! ```rust
//! use kv_extract::ExtractorBuilder;
//!
//! let extractor = ExtractorBuilder::new().build().unwrap();
//! let batch = extractor.extract_batch(["a:1,b:2", "", "c:3"]);
//!
//! assert_eq!(batch.keys(), ["a", "b", "c"]);
//! assert_eq!(batch.row_offsets(), [2, 2, 3]);
//! ```
//!
//! [`finish`]: BatchAssembler::finish

use rayon::prelude::*;

use crate::escape::EscapingProcessor;
use crate::extractor::Extractor;
use crate::replace::bulk_replace_all;

/// Columnar output of one batch: flat keys, flat values, row offsets.
///
/// `keys` and `values` are index-aligned. `row_offsets` holds one entry per
/// input row, each the running pair count after that row, so
/// `row_offsets[i] - row_offsets[i - 1]` is row `i`'s pair count and the last
/// offset equals the total pair count. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutput {
    keys: Vec<String>,
    values: Vec<String>,
    row_offsets: Vec<u64>,
}

impl BatchOutput {
    /// All extracted keys, in row order then source order within each row.
    #[must_use]
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// All extracted values, index-aligned with [`keys`](Self::keys).
    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Running pair counts, one entry per input row.
    #[must_use]
    pub fn row_offsets(&self) -> &[u64] {
        &self.row_offsets
    }

    /// Number of input rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.row_offsets.len()
    }

    /// Total number of extracted pairs.
    #[must_use]
    pub fn pair_count(&self) -> usize {
        self.keys.len()
    }

    /// The pairs of one row, or `None` if `index` is out of range.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kv_extract::ExtractorBuilder;
    ///
    /// let extractor = ExtractorBuilder::new().build().unwrap();
    /// let batch = extractor.extract_batch(["a:1", "b:2,c:3"]);
    ///
    /// let row: Vec<_> = batch.row(1).unwrap().collect();
    /// assert_eq!(row, vec![("b", "2"), ("c", "3")]);
    /// ```
    pub fn row(&self, index: usize) -> Option<impl Iterator<Item = (&str, &str)>> {
        let end = *self.row_offsets.get(index)? as usize;
        let start = match index {
            0 => 0,
            _ => self.row_offsets[index - 1] as usize,
        };
        Some(
            self.keys[start..end]
                .iter()
                .zip(&self.values[start..end])
                .map(|(k, v)| (k.as_str(), v.as_str())),
        )
    }
}

/// Accumulates rows into columnar output.
///
/// Feed rows with [`push_row`](Self::push_row) and call
/// [`finish`](Self::finish) once; a malformed row never aborts the batch, it
/// just contributes fewer pairs. The two flat sequences grow incrementally —
/// the total pair count is not known up front.
pub struct BatchAssembler<'e, P: EscapingProcessor> {
    extractor: &'e Extractor<P>,
    keys: Vec<String>,
    values: Vec<String>,
    row_offsets: Vec<u64>,
}

impl<'e, P: EscapingProcessor> BatchAssembler<'e, P> {
    /// Creates an empty assembler driving the given extractor.
    #[must_use]
    pub fn new(extractor: &'e Extractor<P>) -> Self {
        BatchAssembler {
            extractor,
            keys: Vec::new(),
            values: Vec::new(),
            row_offsets: Vec::new(),
        }
    }

    /// Extracts one row and appends its pairs and offset entry.
    pub fn push_row(&mut self, row: &str) {
        for pair in self.extractor.extract(row) {
            self.keys.push(pair.key);
            self.values.push(pair.value);
        }
        self.row_offsets.push(self.keys.len() as u64);
    }

    /// Finalizes the batch.
    ///
    /// Runs the bulk unescape pass over each flat sequence exactly once when
    /// the extractor's processor defers escape resolution.
    #[must_use]
    pub fn finish(self) -> BatchOutput {
        finish_parts::<P>(
            self.extractor,
            self.keys,
            self.values,
            self.row_offsets,
        )
    }

    fn into_parts(self) -> (Vec<String>, Vec<String>, Vec<u64>) {
        (self.keys, self.values, self.row_offsets)
    }
}

fn finish_parts<P: EscapingProcessor>(
    extractor: &Extractor<P>,
    mut keys: Vec<String>,
    mut values: Vec<String>,
    row_offsets: Vec<u64>,
) -> BatchOutput {
    if P::DEFERS_UNESCAPING {
        if let Some(escape) = extractor.config().escape_character() {
            let pattern = escape.to_string();
            bulk_replace_all(&mut keys, &pattern, "");
            bulk_replace_all(&mut values, &pattern, "");
        }
    }
    BatchOutput {
        keys,
        values,
        row_offsets,
    }
}

impl<P: EscapingProcessor> Extractor<P> {
    /// Extracts a whole batch sequentially.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kv_extract::ExtractorBuilder;
    ///
    /// let extractor = ExtractorBuilder::new().with_key_value_delimiter('=').build().unwrap();
    /// let batch = extractor.extract_batch(["a=1", "garbage", "b=2"]);
    ///
    /// assert_eq!(batch.row_offsets(), [1, 1, 2]);
    /// ```
    pub fn extract_batch<I, S>(&self, rows: I) -> BatchOutput
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut assembler = BatchAssembler::new(self);
        for row in rows {
            assembler.push_row(row.as_ref());
        }
        assembler.finish()
    }

    /// Extracts a whole batch sharded across the rayon thread pool.
    ///
    /// Each shard assembles independently; shards are then concatenated in
    /// order with offsets renumbered by the running pair total, and the bulk
    /// unescape pass (if any) runs once over the merged sequences. The result
    /// is byte-identical to [`extract_batch`](Self::extract_batch).
    pub fn extract_batch_parallel<S>(&self, rows: &[S]) -> BatchOutput
    where
        S: AsRef<str> + Sync,
        P: Sync,
    {
        let shard_len = (rows.len() / rayon::current_num_threads().max(1)).max(1);

        let shards: Vec<_> = rows
            .par_chunks(shard_len)
            .map(|shard| {
                let mut assembler = BatchAssembler::new(self);
                for row in shard {
                    assembler.push_row(row.as_ref());
                }
                assembler.into_parts()
            })
            .collect();

        let mut keys = Vec::new();
        let mut values = Vec::new();
        let mut row_offsets = Vec::with_capacity(rows.len());
        for (shard_keys, shard_values, shard_offsets) in shards {
            let base = keys.len() as u64;
            keys.extend(shard_keys);
            values.extend(shard_values);
            row_offsets.extend(shard_offsets.into_iter().map(|offset| offset + base));
        }

        finish_parts::<P>(self, keys, values, row_offsets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractorBuilder;
    use crate::escape::{DeferredUnescaping, InlineUnescaping};

    #[test]
    fn empty_batch() {
        let extractor = Extractor::<InlineUnescaping>::default();
        let batch = extractor.extract_batch(Vec::<&str>::new());
        assert_eq!(batch.row_count(), 0);
        assert_eq!(batch.pair_count(), 0);
        assert!(batch.row_offsets().is_empty());
    }

    #[test]
    fn malformed_rows_yield_zero_pairs_without_aborting() {
        let extractor = ExtractorBuilder::new()
            .with_key_value_delimiter('=')
            .build()
            .unwrap();
        let batch = extractor.extract_batch(["a=1", "garbage", "b=2"]);

        assert_eq!(batch.keys(), ["a", "b"]);
        assert_eq!(batch.values(), ["1", "2"]);
        assert_eq!(batch.row_offsets(), [1, 1, 2]);
    }

    #[test]
    fn offsets_are_monotone_and_end_at_pair_count() {
        let extractor = Extractor::<InlineUnescaping>::default();
        let batch = extractor.extract_batch(["a:1,b:2", "", "c:3,d:4,e:5"]);

        assert_eq!(batch.row_offsets(), [2, 2, 5]);
        assert!(batch.row_offsets().windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(
            *batch.row_offsets().last().unwrap() as usize,
            batch.pair_count()
        );
        assert_eq!(batch.keys().len(), batch.values().len());
    }

    #[test]
    fn row_access() {
        let extractor = Extractor::<InlineUnescaping>::default();
        let batch = extractor.extract_batch(["a:1", "b:2,c:3", ""]);

        let row0: Vec<_> = batch.row(0).unwrap().collect();
        assert_eq!(row0, vec![("a", "1")]);
        let row1: Vec<_> = batch.row(1).unwrap().collect();
        assert_eq!(row1, vec![("b", "2"), ("c", "3")]);
        assert_eq!(batch.row(2).unwrap().count(), 0);
        assert!(batch.row(3).is_none());
    }

    #[test]
    fn deferred_processor_resolves_escapes_in_finish() {
        let extractor = ExtractorBuilder::new()
            .with_escaping_processor::<DeferredUnescaping>()
            .build()
            .unwrap();
        let batch = extractor.extract_batch([r"a\:b:1\,2", r"c:3"]);

        assert_eq!(batch.keys(), ["a:b", "c"]);
        assert_eq!(batch.values(), ["1,2", "3"]);
    }

    #[test]
    fn incremental_assembly_matches_batch_call() {
        let extractor = Extractor::<InlineUnescaping>::default();
        let rows = ["a:1,b:2", "junk", "c:3"];

        let mut assembler = BatchAssembler::new(&extractor);
        for row in rows {
            assembler.push_row(row);
        }
        assert_eq!(assembler.finish(), extractor.extract_batch(rows));
    }

    #[test]
    fn parallel_output_is_byte_identical_to_sequential() {
        let extractor = ExtractorBuilder::new()
            .with_enclosing_character('"')
            .build()
            .unwrap();
        let rows: Vec<String> = (0..257)
            .map(|i| match i % 4 {
                0 => format!("a:{i},b:\"x,{i}\""),
                1 => String::new(),
                2 => format!("garbage {i}"),
                _ => format!("k\\:{i}:v\\,{i}"),
            })
            .collect();

        assert_eq!(
            extractor.extract_batch_parallel(&rows),
            extractor.extract_batch(&rows)
        );
    }

    #[test]
    fn parallel_deferred_runs_bulk_pass_once_after_merge() {
        let extractor = ExtractorBuilder::new()
            .with_escaping_processor::<DeferredUnescaping>()
            .build()
            .unwrap();
        let rows: Vec<String> = (0..64).map(|i| format!(r"k\:{i}:v\,{i}")).collect();

        let parallel = extractor.extract_batch_parallel(&rows);
        assert_eq!(parallel, extractor.extract_batch(&rows));
        assert_eq!(parallel.keys()[0], "k:0");
        assert_eq!(parallel.values()[0], "v,0");
    }
}
