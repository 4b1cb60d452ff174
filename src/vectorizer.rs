//! Vocabulary learning and projection of word counts onto sparse vectors

use crate::error::{Error, Result};
use crate::tokenizer::WordCount;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Most a single message may add to a token's total when ranking the vocabulary
pub const PER_MESSAGE_CAP: u32 = 10;

/// Feature column collecting every out-of-vocabulary token
pub const OOV_INDEX: usize = 0;

/// Learns a bounded vocabulary from word counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vectorizer {
    vocabulary_size: usize,
}

impl Default for Vectorizer {
    fn default() -> Self {
        Self {
            vocabulary_size: 1000,
        }
    }
}

impl Vectorizer {
    /// Fails when `vocabulary_size + 1` columns cannot be addressed
    pub fn new(vocabulary_size: usize) -> Result<Self> {
        check_vocabulary_size(vocabulary_size)?;
        Ok(Self { vocabulary_size })
    }

    /// Same size bound as an already validated vocabulary
    pub(crate) const fn from_vocabulary(vocabulary: &Vocabulary) -> Self {
        Self {
            vocabulary_size: vocabulary.vocabulary_size,
        }
    }

    /// Most tokens a fitted vocabulary may hold
    #[must_use]
    pub const fn vocabulary_size(&self) -> usize {
        self.vocabulary_size
    }

    /// Select the `vocabulary_size` most frequent tokens of a batch
    ///
    /// Each message adds at most [`PER_MESSAGE_CAP`] to a token's total.
    /// Tokens are ranked by total, ties going to the token encountered
    /// first, and numbered from 1 in rank order.
    #[must_use]
    pub fn fit(&self, batch: &[WordCount]) -> Vocabulary {
        let totals = batch
            .par_iter()
            .enumerate()
            .fold(TokenTotals::default, |totals, (row, counts)| {
                totals.absorb(row, counts)
            })
            .reduce(TokenTotals::default, TokenTotals::merge);

        let distinct = totals.tokens.len();
        let vocabulary = totals.into_vocabulary(self.vocabulary_size);

        debug!(
            "Fitted vocabulary of {} tokens ({} distinct) from {} messages",
            vocabulary.len(),
            distinct,
            batch.len()
        );

        vocabulary
    }

    /// Fit on `batch`, then project the same batch
    #[must_use]
    pub fn fit_transform(&self, batch: &[WordCount]) -> (Vocabulary, FeatureMatrix) {
        let vocabulary = self.fit(batch);
        let matrix = vocabulary.transform(batch);
        (vocabulary, matrix)
    }
}

/// Vectors carry one column per token plus the out-of-vocabulary column
pub(crate) fn check_vocabulary_size(vocabulary_size: usize) -> Result<()> {
    if vocabulary_size.checked_add(1).is_none() {
        return Err(Error::Config(format!(
            "vocabulary size {vocabulary_size} leaves no room for the out-of-vocabulary column"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
struct Tally {
    total: u64,
    first_seen: (usize, usize),
}

/// Capped per-token totals, only ever alive inside [`Vectorizer::fit`]
#[derive(Debug, Default)]
struct TokenTotals {
    tokens: HashMap<String, Tally>,
}

impl TokenTotals {
    fn absorb(mut self, row: usize, counts: &WordCount) -> Self {
        for (col, (token, count)) in counts.iter().enumerate() {
            let capped = u64::from(count.min(PER_MESSAGE_CAP));
            let seen = (row, col);
            self.tokens
                .entry(token.to_string())
                .and_modify(|tally| {
                    tally.total += capped;
                    tally.first_seen = tally.first_seen.min(seen);
                })
                .or_insert(Tally {
                    total: capped,
                    first_seen: seen,
                });
        }
        self
    }

    fn merge(self, other: Self) -> Self {
        let (mut into, from) = if self.tokens.len() >= other.tokens.len() {
            (self, other)
        } else {
            (other, self)
        };

        for (token, tally) in from.tokens {
            into.tokens
                .entry(token)
                .and_modify(|existing| {
                    existing.total += tally.total;
                    existing.first_seen = existing.first_seen.min(tally.first_seen);
                })
                .or_insert(tally);
        }
        into
    }

    fn into_vocabulary(self, vocabulary_size: usize) -> Vocabulary {
        let mut ranked: Vec<(String, Tally)> = self.tokens.into_iter().collect();
        ranked.sort_unstable_by(|(_, a), (_, b)| {
            b.total
                .cmp(&a.total)
                .then_with(|| a.first_seen.cmp(&b.first_seen))
        });
        ranked.truncate(vocabulary_size);

        Vocabulary::from_ranked(
            vocabulary_size,
            ranked.into_iter().map(|(token, _)| token).collect(),
        )
    }
}

/// Fitted token to column mapping
///
/// Column 0 is reserved for out-of-vocabulary tokens; vocabulary tokens
/// occupy columns `1..=len()` in rank order. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "VocabularyDocument", into = "VocabularyDocument")]
pub struct Vocabulary {
    vocabulary_size: usize,
    tokens: Vec<String>,
    index: HashMap<String, usize>,
}

#[derive(Serialize, Deserialize)]
struct VocabularyDocument {
    vocabulary_size: usize,
    tokens: Vec<String>,
}

impl From<Vocabulary> for VocabularyDocument {
    fn from(vocabulary: Vocabulary) -> Self {
        Self {
            vocabulary_size: vocabulary.vocabulary_size,
            tokens: vocabulary.tokens,
        }
    }
}

impl TryFrom<VocabularyDocument> for Vocabulary {
    type Error = Error;

    fn try_from(doc: VocabularyDocument) -> Result<Self> {
        check_vocabulary_size(doc.vocabulary_size)?;
        if doc.tokens.len() > doc.vocabulary_size {
            return Err(Error::Config(format!(
                "{} tokens exceed vocabulary size {}",
                doc.tokens.len(),
                doc.vocabulary_size
            )));
        }

        let vocabulary = Self::from_ranked(doc.vocabulary_size, doc.tokens);
        if vocabulary.index.len() != vocabulary.tokens.len() {
            return Err(Error::Config("duplicate vocabulary token".into()));
        }
        Ok(vocabulary)
    }
}

impl Vocabulary {
    fn from_ranked(vocabulary_size: usize, tokens: Vec<String>) -> Self {
        let index = tokens
            .iter()
            .enumerate()
            .map(|(rank, token)| (token.clone(), rank + 1))
            .collect();

        Self {
            vocabulary_size,
            tokens,
            index,
        }
    }

    /// Load a vocabulary saved with [`Vocabulary::to_json`]
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Configured upper bound on the number of tokens
    #[must_use]
    pub const fn vocabulary_size(&self) -> usize {
        self.vocabulary_size
    }

    /// Length of every feature vector: `vocabulary_size + 1`
    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.vocabulary_size + 1
    }

    /// Number of tokens actually learned
    #[must_use]
    pub const fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Column of `token`, `None` when out of vocabulary
    #[must_use]
    pub fn index_of(&self, token: &str) -> Option<usize> {
        self.index.get(token).copied()
    }

    /// Token at column `index`
    #[must_use]
    pub fn token(&self, index: usize) -> Option<&str> {
        index
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(String::as_str)
    }

    /// `(token, column)` pairs in rank order
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.tokens
            .iter()
            .enumerate()
            .map(|(rank, token)| (token.as_str(), rank + 1))
    }

    /// Project one message's word counts onto a feature vector
    #[must_use]
    pub fn vectorize(&self, counts: &WordCount) -> SparseVector {
        let mut columns: BTreeMap<usize, u32> = BTreeMap::new();
        for (token, count) in counts.iter() {
            let col = self.index_of(token).unwrap_or(OOV_INDEX);
            let slot = columns.entry(col).or_insert(0);
            *slot = slot.saturating_add(count);
        }

        SparseVector {
            dimension: self.dimension(),
            entries: columns.into_iter().filter(|&(_, v)| v != 0).collect(),
        }
    }

    /// Project a batch, one row per message in input order
    #[must_use]
    pub fn transform(&self, batch: &[WordCount]) -> FeatureMatrix {
        let rows: Vec<SparseVector> = batch
            .par_iter()
            .map(|counts| self.vectorize(counts))
            .collect();

        let matrix = FeatureMatrix::from_rows(self.dimension(), &rows);
        debug!(
            "Transformed {} messages, {} non-zero entries, {} out-of-vocabulary occurrences",
            matrix.n_rows(),
            matrix.nnz(),
            rows.iter().map(|row| u64::from(row.get(OOV_INDEX))).sum::<u64>()
        );
        matrix
    }
}

/// Fixed-length sparse count vector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparseVector {
    dimension: usize,
    entries: Vec<(usize, u32)>,
}

impl SparseVector {
    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    /// Value at column `col`
    #[must_use]
    pub fn get(&self, col: usize) -> u32 {
        self.entries
            .binary_search_by_key(&col, |&(c, _)| c)
            .map_or(0, |pos| self.entries[pos].1)
    }

    /// Non-zero `(column, value)` pairs in column order
    pub fn iter(&self) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.entries.iter().copied()
    }

    #[must_use]
    pub const fn nnz(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn to_dense(&self) -> Vec<u32> {
        let mut dense = vec![0; self.dimension];
        for &(col, value) in &self.entries {
            dense[col] = value;
        }
        dense
    }
}

/// Compressed sparse row matrix, one row per message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureMatrix {
    n_cols: usize,
    indptr: Vec<usize>,
    indices: Vec<usize>,
    data: Vec<u32>,
}

impl FeatureMatrix {
    /// Stack rows of width `n_cols`
    #[must_use]
    pub fn from_rows(n_cols: usize, rows: &[SparseVector]) -> Self {
        let nnz = rows.iter().map(SparseVector::nnz).sum();
        let mut indptr = Vec::with_capacity(rows.len() + 1);
        let mut indices = Vec::with_capacity(nnz);
        let mut data = Vec::with_capacity(nnz);

        indptr.push(0);
        for row in rows {
            for (col, value) in row.iter() {
                indices.push(col);
                data.push(value);
            }
            indptr.push(indices.len());
        }

        Self {
            n_cols,
            indptr,
            indices,
            data,
        }
    }

    #[must_use]
    pub const fn n_rows(&self) -> usize {
        self.indptr.len().saturating_sub(1)
    }

    #[must_use]
    pub const fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Number of stored non-zero entries
    #[must_use]
    pub const fn nnz(&self) -> usize {
        self.data.len()
    }

    /// Row `i` as a sparse vector
    #[must_use]
    pub fn row(&self, i: usize) -> Option<SparseVector> {
        let start = *self.indptr.get(i)?;
        let end = *self.indptr.get(i + 1)?;

        Some(SparseVector {
            dimension: self.n_cols,
            entries: self.indices[start..end]
                .iter()
                .copied()
                .zip(self.data[start..end].iter().copied())
                .collect(),
        })
    }

    /// Value at `(row, col)`, zero outside the stored entries
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> u32 {
        self.row(row).map_or(0, |r| r.get(col))
    }

    #[must_use]
    pub fn to_dense(&self) -> Vec<Vec<u32>> {
        (0..self.n_rows())
            .filter_map(|i| self.row(i))
            .map(|row| row.to_dense())
            .collect()
    }
}
