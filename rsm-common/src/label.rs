//! Canonical sentiment labels and normalization of raw model output
//!
//! Every label that leaves this crate is one of exactly three canonical
//! strings: `negative`, `neutral`, `positive`. Free-form model completions are
//! mapped onto that vocabulary by [`parse_label`], which never fails.
//!
//! # Matching precedence
//!
//! Candidate tokens can overlap ("not positive, rather negative"), so the
//! order is fixed:
//!
//! 1. Canonical tokens, matched as case-insensitive substrings, checked in
//!    the order negative, neutral, positive.
//! 2. Short forms and Spanish forms, matched as whole words, checked in the
//!    same class order.
//! 3. Anything else resolves to [`Label::Neutral`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Sentiment class
///
/// Ordering follows [`Label::ALL`] and exists for display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Negative,
    Neutral,
    Positive,
}

impl Label {
    /// All labels in fixed matrix/report order
    pub const ALL: [Label; 3] = [Label::Negative, Label::Neutral, Label::Positive];

    /// Canonical string form
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Negative => "negative",
            Label::Neutral => "neutral",
            Label::Positive => "positive",
        }
    }

    /// Position in [`Label::ALL`]
    pub fn index(&self) -> usize {
        match self {
            Label::Negative => 0,
            Label::Neutral => 1,
            Label::Positive => 2,
        }
    }

    fn aliases(&self) -> &'static [&'static str] {
        match self {
            Label::Negative => &["neg", "negativo", "negativa"],
            Label::Neutral => &["neu", "neutro", "neutra"],
            Label::Positive => &["pos", "positivo", "positiva"],
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strict parse: accepts only the canonical strings (any case, surrounding
/// whitespace ignored). Use [`parse_label`] for free-form text.
impl FromStr for Label {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Label::ALL
            .into_iter()
            .find(|label| trimmed.eq_ignore_ascii_case(label.as_str()))
            .ok_or_else(|| Error::InvalidInput(format!("not a canonical label: {:?}", s)))
    }
}

/// Map arbitrary model output onto a canonical label.
///
/// Absent, empty and unrecognized input all yield [`Label::Neutral`].
///
/// # Examples
///
/// ```
/// use rsm_common::{parse_label, Label};
///
/// assert_eq!(parse_label(Some("POSITIVE!!!")), Label::Positive);
/// assert_eq!(parse_label(Some("Etiqueta: neutral")), Label::Neutral);
/// assert_eq!(parse_label(Some("neg")), Label::Negative);
/// assert_eq!(parse_label(None), Label::Neutral);
/// ```
pub fn parse_label(raw: Option<&str>) -> Label {
    let Some(raw) = raw else {
        return Label::Neutral;
    };
    let normalized = raw.to_lowercase();
    if normalized.trim().is_empty() {
        return Label::Neutral;
    }

    if let Some(label) = Label::ALL
        .into_iter()
        .find(|label| normalized.contains(label.as_str()))
    {
        return label;
    }

    let words: Vec<&str> = normalized
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    Label::ALL
        .into_iter()
        .find(|label| label.aliases().iter().any(|alias| words.contains(alias)))
        .unwrap_or(Label::Neutral)
}
