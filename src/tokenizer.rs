//! Text normalization and per-message word counting

use crate::message::Message;
use crate::text::message_to_text;
use rayon::prelude::*;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;
use tracing::debug;

// Bare hostnames are only URLs when their top-level domain is a known public suffix.
static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)\b(?:(?:https?|ftp)://[^\s<>"'`]+|(?P<host>(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z]{2,63})\b(?::\d{1,5})?(?:[/?#][^\s<>"'`]*)?)"#,
    )
    .unwrap()
});

static NUMBER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d*)?(?:[eE][+-]?\d+)?").unwrap());

static PUNCTUATION_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\W+").unwrap());

const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?'];

const BRACKETS: &[(char, char)] = &[('(', ')'), ('[', ']'), ('{', '}')];

/// Normalization switches, all enabled by default
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WordCounterConfig {
    /// Leave headers out of the counted text. Body extraction never
    /// includes headers, so this is always effectively on.
    pub strip_headers: bool,
    /// Lower-case the text before any other rewrite
    pub lower_case: bool,
    /// Collapse runs of non-word characters into single spaces
    pub remove_punctuation: bool,
    /// Replace URLs and bare hostnames with `URL`
    pub replace_urls: bool,
    /// Replace numbers with `NUMBER`
    pub replace_numbers: bool,
    /// Reduce every token to its English stem
    pub stemming: bool,
}

impl Default for WordCounterConfig {
    fn default() -> Self {
        Self {
            strip_headers: true,
            lower_case: true,
            remove_punctuation: true,
            replace_urls: true,
            replace_numbers: true,
            stemming: true,
        }
    }
}

/// Token occurrence counts for one message
///
/// Tokens iterate in the order they were first counted.
#[derive(Debug, Clone, Default)]
pub struct WordCount {
    entries: Vec<(String, u32)>,
    positions: HashMap<String, usize>,
}

impl WordCount {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` occurrences of `token`
    pub fn add(&mut self, token: &str, count: u32) {
        if let Some(&pos) = self.positions.get(token) {
            let entry = &mut self.entries[pos].1;
            *entry = entry.saturating_add(count);
        } else {
            self.positions.insert(token.to_string(), self.entries.len());
            self.entries.push((token.to_string(), count));
        }
    }

    /// Occurrences of `token`, zero when absent
    #[must_use]
    pub fn get(&self, token: &str) -> u32 {
        self.positions
            .get(token)
            .map_or(0, |&pos| self.entries[pos].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries
            .iter()
            .map(|(token, count)| (token.as_str(), *count))
    }

    /// Number of distinct tokens
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all occurrences
    #[must_use]
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, count)| u64::from(*count)).sum()
    }
}

impl PartialEq for WordCount {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(token, count)| other.get(token) == count)
    }
}

impl Eq for WordCount {}

impl<'a> FromIterator<&'a str> for WordCount {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut counts = Self::new();
        for token in iter {
            counts.add(token, 1);
        }
        counts
    }
}

/// Replace every detected URL or bare hostname with ` URL `
///
/// Longer URLs are replaced first so a URL that is a substring of another
/// never clobbers it.
#[must_use]
pub fn replace_urls(text: &str) -> String {
    let mut urls: Vec<&str> = URL_REGEX
        .captures_iter(text)
        .filter_map(|caps| {
            let url = caps.get(0)?;
            if text[..url.start()].ends_with('@') {
                return None;
            }
            if let Some(host) = caps.name("host")
                && !has_public_suffix(host.as_str())
            {
                return None;
            }
            Some(trim_url_end(url.as_str()))
        })
        .filter(|url| !url.is_empty())
        .collect();

    urls.sort_unstable_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    urls.dedup();

    urls.iter()
        .fold(text.to_string(), |acc, url| acc.replace(url, " URL "))
}

fn has_public_suffix(host: &str) -> bool {
    let host = host.to_lowercase();
    psl::suffix(host.as_bytes()).is_some_and(|suffix| suffix.is_known())
}

/// Drop sentence punctuation and unbalanced closing brackets from the end of a URL
fn trim_url_end(mut url: &str) -> &str {
    loop {
        let trimmed = url.trim_end_matches(TRAILING_PUNCTUATION);
        let trimmed = BRACKETS
            .iter()
            .find(|&&(open, close)| {
                trimmed.ends_with(close)
                    && trimmed.matches(close).count() > trimmed.matches(open).count()
            })
            .map_or(trimmed, |&(_, close)| {
                &trimmed[..trimmed.len() - close.len_utf8()]
            });

        if trimmed.len() == url.len() {
            return url;
        }
        url = trimmed;
    }
}

/// Replace every integer or decimal number, with optional exponent, by `NUMBER`
#[must_use]
pub fn replace_numbers(text: &str) -> String {
    NUMBER_REGEX.replace_all(text, "NUMBER").into_owned()
}

/// Collapse every run of non-word characters into a single space
#[must_use]
pub fn remove_punctuation(text: &str) -> String {
    PUNCTUATION_REGEX.replace_all(text, " ").into_owned()
}

/// Turns messages into [`WordCount`]s
///
/// Stateless: fitting does nothing and every message is processed on its own.
pub struct WordCounter {
    config: WordCounterConfig,
    stemmer: Stemmer,
}

impl WordCounter {
    #[must_use]
    pub fn new(config: WordCounterConfig) -> Self {
        Self {
            config,
            stemmer: Stemmer::create(Algorithm::English),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &WordCounterConfig {
        &self.config
    }

    /// No-op, there is nothing to learn
    #[must_use]
    pub const fn fit(&self, _messages: &[Message]) -> &Self {
        self
    }

    /// One word count per message, in input order
    #[must_use]
    pub fn transform(&self, messages: &[Message]) -> Vec<WordCount> {
        let counts: Vec<WordCount> = messages
            .par_iter()
            .map(|message| self.count_message(message))
            .collect();

        debug!("Counted words in {} messages", counts.len());
        counts
    }

    /// Word counts of a single message; no text counts as empty text
    #[must_use]
    pub fn count_message(&self, message: &Message) -> WordCount {
        let text = message_to_text(message).unwrap_or_default();
        self.count_words(&text)
    }

    /// Normalize `text`, split it on whitespace and count tokens
    #[must_use]
    pub fn count_words(&self, text: &str) -> WordCount {
        let normalized = self.normalize(text);
        let counts: WordCount = normalized.split_whitespace().collect();

        if !self.config.stemming {
            return counts;
        }

        let mut stemmed = WordCount::new();
        for (word, count) in counts.iter() {
            stemmed.add(&self.stem(word), count);
        }
        stemmed
    }

    /// Apply the enabled text rewrites, in order
    #[must_use]
    pub fn normalize(&self, text: &str) -> String {
        let mut text = if self.config.lower_case {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        if self.config.replace_urls {
            text = replace_urls(&text);
        }
        if self.config.replace_numbers {
            text = replace_numbers(&text);
        }
        if self.config.remove_punctuation {
            text = remove_punctuation(&text);
        }

        text
    }

    /// Stem a single word
    ///
    /// The word is lower-cased first, so the `NUMBER` and `URL`
    /// placeholders come out as `number` and `url`.
    #[must_use]
    pub fn stem(&self, word: &str) -> String {
        self.stemmer.stem(&word.to_lowercase()).into_owned()
    }
}

impl Default for WordCounter {
    fn default() -> Self {
        Self::new(WordCounterConfig::default())
    }
}

impl Clone for WordCounter {
    fn clone(&self) -> Self {
        Self::new(self.config)
    }
}

impl fmt::Debug for WordCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WordCounter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
