//! Word counting and vectorization composed into one fit/transform unit

use crate::error::{Error, Result};
use crate::message::Message;
use crate::tokenizer::{WordCount, WordCounter, WordCounterConfig};
use crate::vectorizer::{FeatureMatrix, Vectorizer, Vocabulary, check_vocabulary_size};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Class of a training message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Label {
    Ham = 0,
    Spam = 1,
}

impl From<Label> for u8 {
    fn from(label: Label) -> Self {
        label as Self
    }
}

impl TryFrom<u8> for Label {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Ham),
            1 => Ok(Self::Spam),
            other => Err(Error::Config(format!("Unknown label: {other}"))),
        }
    }
}

/// Settings for both pipeline stages
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PipelineConfig {
    pub word_counter: WordCounterConfig,
    pub vocabulary_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            word_counter: WordCounterConfig::default(),
            vocabulary_size: Vectorizer::default().vocabulary_size(),
        }
    }
}

impl PipelineConfig {
    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no pipeline can be built from
    pub fn validate(&self) -> Result<()> {
        check_vocabulary_size(self.vocabulary_size)
    }
}

/// Messages in, feature matrix out
///
/// The vocabulary is learned by [`Pipeline::fit`] from training data only
/// and reused unchanged by every later [`Pipeline::transform`].
#[derive(Debug, Clone)]
pub struct Pipeline {
    word_counter: WordCounter,
    vectorizer: Vectorizer,
    vocabulary: Option<Vocabulary>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self {
            word_counter: WordCounter::default(),
            vectorizer: Vectorizer::default(),
            vocabulary: None,
        }
    }
}

impl Pipeline {
    /// Fails when the configured vocabulary size is unusable
    pub fn new(config: PipelineConfig) -> Result<Self> {
        Ok(Self {
            word_counter: WordCounter::new(config.word_counter),
            vectorizer: Vectorizer::new(config.vocabulary_size)?,
            vocabulary: None,
        })
    }

    /// A pipeline already fitted with a previously learned vocabulary
    #[must_use]
    pub fn with_vocabulary(word_counter: WordCounterConfig, vocabulary: Vocabulary) -> Self {
        Self {
            word_counter: WordCounter::new(word_counter),
            vectorizer: Vectorizer::from_vocabulary(&vocabulary),
            vocabulary: Some(vocabulary),
        }
    }

    #[must_use]
    pub const fn word_counter(&self) -> &WordCounter {
        &self.word_counter
    }

    /// Fitted vocabulary, `None` before the first fit
    #[must_use]
    pub const fn vocabulary(&self) -> Option<&Vocabulary> {
        self.vocabulary.as_ref()
    }

    /// Learn the vocabulary from a labelled training batch
    pub fn fit(&mut self, messages: &[Message], labels: &[Label]) -> Result<&Vocabulary> {
        let counts = self.count(messages, labels)?;
        Ok(self.vocabulary.insert(self.vectorizer.fit(&counts)))
    }

    /// Project messages with the fitted vocabulary
    pub fn transform(&self, messages: &[Message]) -> Result<FeatureMatrix> {
        let vocabulary = self.vocabulary.as_ref().ok_or(Error::NotFitted)?;
        let counts = self.word_counter.transform(messages);
        Ok(vocabulary.transform(&counts))
    }

    /// Fit on a batch and project that same batch
    pub fn fit_transform(&mut self, messages: &[Message], labels: &[Label]) -> Result<FeatureMatrix> {
        let counts = self.count(messages, labels)?;
        let vocabulary = self.vocabulary.insert(self.vectorizer.fit(&counts));
        Ok(vocabulary.transform(&counts))
    }

    fn count(&self, messages: &[Message], labels: &[Label]) -> Result<Vec<WordCount>> {
        if messages.len() != labels.len() {
            return Err(Error::LabelMismatch {
                messages: messages.len(),
                labels: labels.len(),
            });
        }

        let spam = labels.iter().filter(|&&label| label == Label::Spam).count();
        debug!(
            "Fitting on {} messages ({} spam, {} ham)",
            messages.len(),
            spam,
            messages.len() - spam
        );

        Ok(self.word_counter.fit(messages).transform(messages))
    }
}
