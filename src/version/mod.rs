//! generic version ordering and version ranges
//!
//! versions are split into items at `.`, `-`, `_`, `+` and at every
//! transition between digits and letters. numbers compare numerically,
//! well-known qualifiers by rank and anything else lexically:
//!
//! `alpha < beta < milestone < rc = cr < snapshot < "" = ga = final = release < sp < other text < numbers`
//!
//! when one version runs out of items it is padded with `0` (if the other
//! side holds a number) or the release qualifier, so `1.0 == 1` and
//! `1.0-alpha < 1.0`.

mod range;

pub use range::{Bound, Restriction, VersionRange};

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;
use thiserror::Error;

lazy_static! {
    /// rank of well-known qualifiers, release is 0
    static ref QUALIFIERS: HashMap<&'static str, i32> = {
        let mut m = HashMap::new();
        m.insert("alpha", -5);
        m.insert("beta", -4);
        m.insert("milestone", -3);
        m.insert("cr", -2);
        m.insert("rc", -2);
        m.insert("snapshot", -1);
        m.insert("", 0);
        m.insert("ga", 0);
        m.insert("final", 0);
        m.insert("release", 0);
        m.insert("sp", 1);
        m
    };
}

/// errors from parsing versions and ranges
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("invalid version '{0}'")]
    InvalidVersion(String),
    #[error("invalid version range '{range}': {reason}")]
    InvalidRange { range: String, reason: String },
}

impl VersionError {
    pub(crate) fn range(range: &str, reason: impl Into<String>) -> Self {
        VersionError::InvalidRange {
            range: range.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Item {
    /// decimal digits without leading zeros ("0" for zero)
    Number(String),
    /// well-known qualifier rank
    Qualifier(i32),
    /// any other text, lowercased
    Text(String),
}

impl Item {
    fn kind(&self) -> u8 {
        match self {
            Item::Number(_) => 2,
            Item::Text(_) => 1,
            Item::Qualifier(_) => 0,
        }
    }

    fn padding_for(other: &Item) -> Item {
        match other {
            Item::Number(_) => Item::Number("0".to_string()),
            _ => Item::Qualifier(0),
        }
    }

    fn compare(&self, other: &Item) -> Ordering {
        match (self, other) {
            (Item::Number(a), Item::Number(b)) => a.len().cmp(&b.len()).then_with(|| a.cmp(b)),
            (Item::Qualifier(a), Item::Qualifier(b)) => a.cmp(b),
            (Item::Text(a), Item::Text(b)) => a.cmp(b),
            _ => self.kind().cmp(&other.kind()),
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::Number(n) => write!(f, "{}", n),
            Item::Qualifier(rank) => {
                let name = match rank {
                    -5 => "alpha",
                    -4 => "beta",
                    -3 => "milestone",
                    -2 => "rc",
                    -1 => "snapshot",
                    1 => "sp",
                    _ => "",
                };
                write!(f, "{}", name)
            }
            Item::Text(t) => write!(f, "{}", t),
        }
    }
}

/// a parsed version, compared item by item
#[derive(Debug, Clone)]
pub struct Version {
    original: String,
    items: Vec<Item>,
}

impl Version {
    /// parse a version string
    ///
    /// only ASCII letters, digits and the separators `. - _ +` are accepted;
    /// empty text is rejected.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let trimmed = input.trim();
        if trimmed.is_empty()
            || !trimmed
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || is_separator(c))
        {
            return Err(VersionError::InvalidVersion(input.to_string()));
        }

        let tokens = tokenize(&trimmed.to_ascii_lowercase());
        let mut items = Vec::with_capacity(tokens.len());
        for (i, token) in tokens.iter().enumerate() {
            let followed_by_number = tokens
                .get(i + 1)
                .map(|next| next.chars().all(|c| c.is_ascii_digit()) && !next.is_empty())
                .unwrap_or(false);
            items.push(parse_item(token, followed_by_number));
        }

        Ok(Self {
            original: trimmed.to_string(),
            items,
        })
    }

    /// text the version was parsed from
    pub fn as_str(&self) -> &str {
        &self.original
    }

    /// normalized form with trailing padding items removed
    pub fn canonical(&self) -> String {
        let mut end = self.items.len();
        while end > 1 && self.items[end - 1].compare(&Item::padding_for(&self.items[end - 1])) == Ordering::Equal {
            end -= 1;
        }
        self.items[..end]
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(".")
    }
}

fn is_separator(c: char) -> bool {
    matches!(c, '.' | '-' | '_' | '+')
}

fn tokenize(version: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut current_is_digit = false;

    for c in version.chars() {
        if is_separator(c) {
            tokens.push(std::mem::take(&mut current));
            continue;
        }

        let is_digit = c.is_ascii_digit();
        if !current.is_empty() && is_digit != current_is_digit {
            tokens.push(std::mem::take(&mut current));
        }
        current_is_digit = is_digit;
        current.push(c);
    }
    tokens.push(current);

    tokens
}

fn parse_item(token: &str, followed_by_number: bool) -> Item {
    if token.is_empty() {
        return Item::Number("0".to_string());
    }

    if token.chars().all(|c| c.is_ascii_digit()) {
        let stripped = token.trim_start_matches('0');
        let digits = if stripped.is_empty() { "0" } else { stripped };
        return Item::Number(digits.to_string());
    }

    let name = match (token, followed_by_number) {
        ("a", true) => "alpha",
        ("b", true) => "beta",
        ("m", true) => "milestone",
        _ => token,
    };

    match QUALIFIERS.get(name) {
        Some(rank) => Item::Qualifier(*rank),
        None => Item::Text(name.to_string()),
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.items.len().max(other.items.len());
        for i in 0..len {
            let ordering = match (self.items.get(i), other.items.get(i)) {
                (Some(a), Some(b)) => a.compare(b),
                (Some(a), None) => a.compare(&Item::padding_for(a)),
                (None, Some(b)) => Item::padding_for(b).compare(b),
                (None, None) => Ordering::Equal,
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.original)
    }
}

impl std::str::FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}
