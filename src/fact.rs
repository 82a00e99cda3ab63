//! Fact values and the result type published to observers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single cat fact.
///
/// Two facts are equal when their text is equal; there is no other identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fact {
    text: String,
}

impl Fact {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// State published to the session's observer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactResult {
    /// Most recent fact, from the remote service or the local fallback.
    Success(Fact),
    /// The subscription terminated; carries a human-readable message.
    Error(String),
    /// Reserved terminal marker. The fetch loop never produces it.
    ServerError,
}

impl FactResult {
    /// Whether this result ends the subscription.
    pub fn is_terminal(&self) -> bool {
        matches!(self, FactResult::Error(_) | FactResult::ServerError)
    }

    pub fn fact(&self) -> Option<&Fact> {
        match self {
            FactResult::Success(fact) => Some(fact),
            FactResult::Error(_) | FactResult::ServerError => None,
        }
    }
}
