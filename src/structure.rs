//! MIME structure labels for corpus exploration

use crate::message::Message;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Description of a message's shape, e.g. `multipart(text/plain, image/png)`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct StructureLabel(pub String);

impl StructureLabel {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StructureLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Label a message by its part tree
///
/// Leaves yield their content type verbatim; composites yield
/// `multipart(...)` around their children's labels joined with `", "`.
#[must_use]
pub fn structure_of(message: &Message) -> StructureLabel {
    StructureLabel(label(message))
}

fn label(message: &Message) -> String {
    match message {
        Message::Leaf { content_type, .. } => content_type.clone(),
        Message::Composite { parts, .. } => {
            let children: Vec<String> = parts.iter().map(label).collect();
            format!("multipart({})", children.join(", "))
        }
    }
}

/// Count structure labels across a batch, most common first
///
/// Labels with equal counts keep the order in which they were first seen.
#[must_use]
pub fn structure_counts(messages: &[Message]) -> Vec<(StructureLabel, usize)> {
    let mut positions: HashMap<StructureLabel, usize> = HashMap::new();
    let mut counts: Vec<(StructureLabel, usize)> = Vec::new();

    for message in messages {
        let structure = structure_of(message);
        if let Some(&pos) = positions.get(&structure) {
            counts[pos].1 += 1;
        } else {
            positions.insert(structure.clone(), counts.len());
            counts.push((structure, 1));
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}
