//! Plain text extraction from a message's part tree

use crate::html::html_to_text;
use crate::message::{Content, Message};
use std::borrow::Cow;
use tracing::{debug, trace};

/// Extract the text of a message, preferring plain text over HTML
///
/// The first `text/plain` part in document order wins. Without one, the
/// last `text/html` part is converted with [`html_to_text`]. Parts whose
/// payload did not decode contribute their raw payload instead. Returns
/// `None` when the message has no text part at all.
#[must_use]
pub fn message_to_text(message: &Message) -> Option<String> {
    let mut html: Option<Cow<'_, str>> = None;

    for part in message.walk() {
        let Message::Leaf {
            content_type,
            content,
        } = part
        else {
            continue;
        };

        match content_type.as_str() {
            "text/plain" => {
                trace!("Using text/plain part");
                return Some(part_text(content).into_owned());
            }
            "text/html" => html = Some(part_text(content)),
            _ => {}
        }
    }

    html.filter(|h| !h.is_empty()).map(|h| {
        trace!("No text/plain part, converting text/html");
        html_to_text(&h)
    })
}

fn part_text(content: &Content) -> Cow<'_, str> {
    match content.decoded() {
        Ok(text) => Cow::Borrowed(text),
        Err(err) => {
            debug!("{err}, falling back to raw payload");
            content.raw_text()
        }
    }
}
