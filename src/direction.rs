//! Stage-direction data model.
//!
//! A direction arrives from the morphological analyzer as an ordered list of
//! tokens, each one a lemma joined to a coarse part-of-speech tag with an
//! underscore (`входить_VERB`, `дверь_NOUN`). This module holds the
//! [`Direction`] wrapper around such a list and the [`DirectionLabel`] the
//! classifier assigns to it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RemarkaError, Result};

/// Suffix marking verb tokens.
pub const VERB_MARKER: &str = "_VERB";

/// Returns `true` if the token carries the verb part-of-speech marker.
pub fn is_verb(token: &str) -> bool {
    token.ends_with(VERB_MARKER)
}

/// One stage direction as an ordered sequence of lemma+POS tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Direction(Vec<String>);

impl Direction {
    /// Create a direction from already tagged tokens.
    pub fn new(tokens: Vec<String>) -> Self {
        Self(tokens)
    }

    /// All tokens, in order.
    pub fn tokens(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Tokens ending in [`VERB_MARKER`], in order.
    pub fn verbs(&self) -> Vec<&str> {
        self.verbs_with_marker(VERB_MARKER)
    }

    /// Tokens ending in `marker`, in order.
    pub fn verbs_with_marker(&self, marker: &str) -> Vec<&str> {
        self.0
            .iter()
            .map(String::as_str)
            .filter(|token| token.ends_with(marker))
            .collect()
    }

    /// Consume the direction and return its tokens.
    pub fn into_tokens(self) -> Vec<String> {
        self.0
    }
}

impl From<Vec<String>> for Direction {
    fn from(tokens: Vec<String>) -> Self {
        Self(tokens)
    }
}

impl From<Vec<&str>> for Direction {
    fn from(tokens: Vec<&str>) -> Self {
        Self(tokens.into_iter().map(str::to_string).collect())
    }
}

impl<S: Into<String>> FromIterator<S> for Direction {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// The event a direction denotes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectionLabel {
    /// A character enters the stage.
    Entrance,
    /// A character leaves the stage.
    Exit,
    /// No decision could be made.
    #[default]
    Unresolved,
}

impl DirectionLabel {
    /// The label as used in the annotated corpus. `Unresolved` is the empty string.
    pub fn as_str(&self) -> &'static str {
        match self {
            DirectionLabel::Entrance => "entrance",
            DirectionLabel::Exit => "exit",
            DirectionLabel::Unresolved => "",
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, DirectionLabel::Unresolved)
    }
}

impl fmt::Display for DirectionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectionLabel::Unresolved => write!(f, "unresolved"),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

impl FromStr for DirectionLabel {
    type Err = RemarkaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "entrance" => Ok(DirectionLabel::Entrance),
            "exit" => Ok(DirectionLabel::Exit),
            "" | "unresolved" => Ok(DirectionLabel::Unresolved),
            other => Err(RemarkaError::invalid_argument(format!(
                "Unknown direction label: {other}"
            ))),
        }
    }
}

/// Parse a stringified token list such as `['входить_VERB', 'дверь_S']`.
///
/// Elements are separated by `", "`; quotes, brackets, commas and spaces are
/// stripped from both ends of each element. Elements left empty are dropped.
pub fn parse_token_list(raw: &str) -> Vec<String> {
    const STRIP: &[char] = &[',', ' ', '\'', ']', '['];

    raw.split(", ")
        .map(|item| item.trim_matches(STRIP))
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
