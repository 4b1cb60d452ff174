//! Parsed message model

use crate::error::{Error, Result};
use mailparse::ParsedMail;
use mailparse::body::Body;
use std::borrow::Cow;
use tracing::{trace, warn};

/// Deepest part nesting accepted from raw input
const MAX_DEPTH: usize = 64;

/// Payload of a leaf part
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// Payload decoded per its transfer encoding and charset
    Decoded(String),

    /// Payload that failed to decode, kept in its still-encoded form
    Undecodable { raw: Vec<u8>, reason: String },
}

impl Content {
    /// The decoded text, or the decoding failure
    pub fn decoded(&self) -> Result<&str> {
        match self {
            Self::Decoded(text) => Ok(text),
            Self::Undecodable { reason, .. } => Err(Error::Decode(reason.clone())),
        }
    }

    /// The payload as text whether or not it decoded
    #[must_use]
    pub fn raw_text(&self) -> Cow<'_, str> {
        match self {
            Self::Decoded(text) => Cow::Borrowed(text),
            Self::Undecodable { raw, .. } => String::from_utf8_lossy(raw),
        }
    }
}

/// A message or one of its MIME parts
///
/// Every part is either a leaf carrying content or a composite carrying
/// ordered child parts, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// A single part with a payload
    Leaf {
        content_type: String,
        content: Content,
    },
    /// A multipart or embedded message holding ordered child parts
    Composite {
        content_type: String,
        parts: Vec<Self>,
    },
}

impl Message {
    /// Build a leaf part with already decoded content
    pub fn leaf(content_type: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Leaf {
            content_type: content_type.into(),
            content: Content::Decoded(content.into()),
        }
    }

    /// Build a composite part from its children
    pub fn composite(content_type: impl Into<String>, parts: Vec<Self>) -> Self {
        Self::Composite {
            content_type: content_type.into(),
            parts,
        }
    }

    /// Parse raw RFC 5322 bytes into a part tree
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let parsed = mailparse::parse_mail(raw).map_err(|e| Error::Structure(e.to_string()))?;
        Self::from_parsed(&parsed, 0)
    }

    fn from_parsed(parsed: &ParsedMail<'_>, depth: usize) -> Result<Self> {
        if depth > MAX_DEPTH {
            return Err(Error::Structure(format!(
                "part nesting exceeds {MAX_DEPTH} levels"
            )));
        }

        let content_type = parsed.ctype.mimetype.to_lowercase();

        if !parsed.subparts.is_empty() {
            let parts = parsed
                .subparts
                .iter()
                .map(|part| Self::from_parsed(part, depth + 1))
                .collect::<Result<Vec<_>>>()?;
            return Ok(Self::Composite {
                content_type,
                parts,
            });
        }

        if content_type == "message/rfc822"
            && let Some(inner) = embedded_message(parsed, depth)?
        {
            return Ok(Self::Composite {
                content_type,
                parts: vec![inner],
            });
        }

        let content = match parsed.get_body() {
            Ok(body) => Content::Decoded(body),
            Err(err) => {
                warn!("Undecodable {content_type} part, keeping raw payload: {err}");
                Content::Undecodable {
                    raw: encoded_payload(parsed),
                    reason: err.to_string(),
                }
            }
        };

        Ok(Self::Leaf {
            content_type,
            content,
        })
    }

    /// MIME content type, e.g. `text/plain` or `multipart/alternative`
    #[must_use]
    pub fn content_type(&self) -> &str {
        match self {
            Self::Leaf { content_type, .. } | Self::Composite { content_type, .. } => content_type,
        }
    }

    /// Leaf content, `None` for composites
    #[must_use]
    pub const fn content(&self) -> Option<&Content> {
        match self {
            Self::Leaf { content, .. } => Some(content),
            Self::Composite { .. } => None,
        }
    }

    /// Direct children, empty for leaves
    #[must_use]
    pub fn parts(&self) -> &[Self] {
        match self {
            Self::Leaf { .. } => &[],
            Self::Composite { parts, .. } => parts.as_slice(),
        }
    }

    #[must_use]
    pub const fn is_composite(&self) -> bool {
        matches!(self, Self::Composite { .. })
    }

    /// Depth-first, pre-order traversal of this part and every nested part
    #[must_use]
    pub fn walk(&self) -> Parts<'_> {
        Parts { stack: vec![self] }
    }
}

/// Iterator returned by [`Message::walk`]
#[derive(Debug, Clone)]
pub struct Parts<'a> {
    stack: Vec<&'a Message>,
}

impl<'a> Iterator for Parts<'a> {
    type Item = &'a Message;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        if let Message::Composite { parts, .. } = next {
            self.stack.extend(parts.iter().rev());
        }
        Some(next)
    }
}

/// An attached `message/rfc822` part, parsed as a message of its own
fn embedded_message(parsed: &ParsedMail<'_>, depth: usize) -> Result<Option<Message>> {
    let Ok(bytes) = parsed.get_body_raw() else {
        return Ok(None);
    };

    match mailparse::parse_mail(&bytes) {
        Ok(inner) => Message::from_parsed(&inner, depth + 1).map(Some),
        Err(err) => {
            trace!("Embedded message is not parseable, keeping as leaf: {err}");
            Ok(None)
        }
    }
}

fn encoded_payload(parsed: &ParsedMail<'_>) -> Vec<u8> {
    match parsed.get_body_encoded() {
        Body::Base64(body) | Body::QuotedPrintable(body) => body.get_raw().to_vec(),
        Body::SevenBit(body) | Body::EightBit(body) => body.get_raw().to_vec(),
        Body::Binary(body) => body.get_raw().to_vec(),
    }
}
