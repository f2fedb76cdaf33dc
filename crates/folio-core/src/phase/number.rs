//! Phase numbers: `1`, `02`, `2.1`, `12A`, `3.1.2B`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// A normalized phase number.
///
/// Ordering compares the integer part, then the dot-separated sublevels,
/// then the letter suffix: `2 < 2.1 < 2.2 < 10` and `12 < 12A < 12B`.
/// Display zero-pads the integer part to two digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhaseNumber {
    major: u32,
    sublevels: Vec<u32>,
    suffix: Option<char>,
}

/// Error returned when a string is not a phase number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid phase number: {0:?}")]
pub struct PhaseNumberError(pub String);

impl PhaseNumber {
    pub fn new(major: u32) -> Self {
        Self {
            major,
            sublevels: Vec::new(),
            suffix: None,
        }
    }

    pub fn major(&self) -> u32 {
        self.major
    }

    pub fn sublevels(&self) -> &[u32] {
        &self.sublevels
    }

    pub fn suffix(&self) -> Option<char> {
        self.suffix
    }

    /// Read a phase number from the start of `s`.
    ///
    /// Returns the number and the bytes consumed. The token must end at a
    /// non-alphanumeric character, so `1abc` is rejected rather than read
    /// as `1`. A trailing `.` not followed by a digit is left unconsumed.
    pub fn scan(s: &str) -> Option<(Self, usize)> {
        let bytes = s.as_bytes();
        let digits = |from: usize| {
            bytes[from..]
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .count()
        };

        let mut pos = digits(0);
        if pos == 0 {
            return None;
        }
        let major = s[..pos].parse().ok()?;

        let mut sublevels = Vec::new();
        while bytes.get(pos) == Some(&b'.') {
            let len = digits(pos + 1);
            if len == 0 {
                break;
            }
            sublevels.push(s[pos + 1..pos + 1 + len].parse().ok()?);
            pos += 1 + len;
        }

        let mut suffix = None;
        if let Some(c) = bytes.get(pos).filter(|b| b.is_ascii_alphabetic()) {
            suffix = Some(c.to_ascii_uppercase() as char);
            pos += 1;
        }

        if bytes.get(pos).is_some_and(|b| b.is_ascii_alphanumeric()) {
            return None;
        }

        Some((
            Self {
                major,
                sublevels,
                suffix,
            },
            pos,
        ))
    }
}

impl FromStr for PhaseNumber {
    type Err = PhaseNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match Self::scan(trimmed) {
            Some((number, used)) if used == trimmed.len() => Ok(number),
            _ => Err(PhaseNumberError(s.to_owned())),
        }
    }
}

impl fmt::Display for PhaseNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.major)?;
        for sub in &self.sublevels {
            write!(f, ".{sub}")?;
        }
        if let Some(c) = self.suffix {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl Ord for PhaseNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then_with(|| self.sublevels.cmp(&other.sublevels))
            .then_with(|| self.suffix.cmp(&other.suffix))
    }
}

impl PartialOrd for PhaseNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for PhaseNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Every `Phase <number>` reference in `text`, in order of appearance.
///
/// "Phase" is matched as a whole word, ignoring ASCII case, and must be
/// followed by whitespace and a complete number token.
pub fn references(text: &str) -> Vec<(PhaseNumber, usize)> {
    const WORD: &str = "phase";
    let mut found = Vec::new();
    let mut from = 0;

    while let Some(rel) = text[from..].to_ascii_lowercase().find(WORD) {
        let at = from + rel;
        from = at + WORD.len();

        let word_start = text[..at]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
        if !word_start {
            continue;
        }

        let after = &text[from..];
        let token = after.trim_start();
        if token.len() == after.len() {
            continue;
        }
        if let Some((number, used)) = PhaseNumber::scan(token) {
            let end = from + (after.len() - token.len()) + used;
            found.push((number, end));
        }
    }
    found
}
