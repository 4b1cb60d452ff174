// Enforce at crate level
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! Spam Features
//!
//! Turns parsed email messages into fixed-width bag-of-words count vectors
//! for a spam/ham classifier.
//!
//! # Stages
//!
//! - Text extraction: plain text parts win, HTML is converted otherwise
//! - Normalization: lower-casing, URL and number placeholders,
//!   punctuation removal, English stemming
//! - Word counting per message
//! - Vocabulary learning with a per-message contribution cap
//! - Projection onto sparse vectors with an out-of-vocabulary column
//!
//! # Example
//!
//! ```rust
//! use spam_features::{Label, Message, Pipeline, PipelineConfig};
//!
//! let train = vec![
//!     Message::leaf("text/plain", "free money now"),
//!     Message::leaf("text/plain", "hello friend"),
//! ];
//! let labels = [Label::Spam, Label::Ham];
//!
//! let mut pipeline = Pipeline::new(PipelineConfig {
//!     vocabulary_size: 5,
//!     ..PipelineConfig::default()
//! })
//! .unwrap();
//! let features = pipeline.fit_transform(&train, &labels).unwrap();
//!
//! assert_eq!(features.n_rows(), 2);
//! assert_eq!(features.n_cols(), 6);
//! ```

mod error;
mod html;
mod message;
mod pipeline;
mod structure;
mod text;
mod tokenizer;
mod vectorizer;

pub use error::{Error, Result};
pub use html::{decode_entities, html_to_text};
pub use message::{Content, Message, Parts};
pub use pipeline::{Label, Pipeline, PipelineConfig};
pub use structure::{StructureLabel, structure_counts, structure_of};
pub use text::message_to_text;
pub use tokenizer::{
    WordCount, WordCounter, WordCounterConfig, remove_punctuation, replace_numbers, replace_urls,
};
pub use vectorizer::{FeatureMatrix, OOV_INDEX, PER_MESSAGE_CAP, SparseVector, Vectorizer, Vocabulary};
