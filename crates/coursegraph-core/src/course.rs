//! Course codes.
//!
//! A [`Course`] is an opaque catalog code such as `"MATH 332"` or `"M332"`.
//! Codes compare and sort lexicographically; nothing else about their
//! structure is interpreted by the graph engine.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque course code.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Course(String);

impl Course {
    /// Build a course from a raw catalog string.
    ///
    /// Non-breaking spaces (as emitted by catalog HTML between subject and
    /// number) become plain spaces, runs of whitespace collapse to one space,
    /// and the result is rendered in the requested [`CodeStyle`].
    #[must_use]
    pub fn normalized(raw: &str, style: CodeStyle) -> Self {
        let cleaned = raw
            .replace('\u{a0}', " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");

        match style {
            CodeStyle::Full => Self(cleaned),
            CodeStyle::Short => Self(shorten(&cleaned)),
        }
    }

    /// Borrow the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Course {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Course {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Course {
    fn from(code: &str) -> Self {
        Self(code.to_string())
    }
}

impl From<String> for Course {
    fn from(code: String) -> Self {
        Self(code)
    }
}

impl From<&Course> for Course {
    fn from(course: &Course) -> Self {
        course.clone()
    }
}

/// How subject + number codes are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeStyle {
    /// `"MATH 332"`.
    #[default]
    Full,
    /// Subject initial followed by the number: `"M332"`.
    Short,
}

/// `"MATH 332"` → `"M332"`. Codes without a subject/number split are kept.
fn shorten(code: &str) -> String {
    let Some((subject, number)) = code.split_once(' ') else {
        return code.to_string();
    };
    let Some(initial) = subject.chars().next() else {
        return code.to_string();
    };
    format!("{initial}{}", number.replace(' ', ""))
}
