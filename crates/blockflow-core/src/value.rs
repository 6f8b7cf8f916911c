//! Values flowing along edges and stored as node results.
//!
//! [`Literal`] is what a user can type into a variable node. [`Value`] is
//! everything a node can produce during a run: numbers, text (file contents,
//! text literals) and images.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::image::ImageData;

/// A literal typed into a variable node or a condition operand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Number(f64),
    Text(String),
}

/// A value produced by evaluating a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum Value {
    Number(f64),
    Text(String),
    Image(ImageData),
}

impl Literal {
    /// Numeric reading of the literal; see [`parse_number`].
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Literal::Number(n) => Some(*n),
            Literal::Text(s) => parse_number(s),
        }
    }
}

impl Value {
    /// Converts a literal into a runtime value.
    pub fn from_literal(literal: &Literal) -> Value {
        match literal {
            Literal::Number(n) => Value::Number(*n),
            Literal::Text(s) => Value::Text(s.clone()),
        }
    }

    /// The single numeric view of a value used for every operand read.
    ///
    /// Numbers are returned as-is (including NaN from an earlier sqrt), text
    /// is parsed, images are never numeric.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(s) => parse_number(s),
            Value::Image(_) => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageData> {
        match self {
            Value::Image(img) => Some(img),
            _ => None,
        }
    }
}

/// Parses user-entered text as a finite number.
///
/// Blank and malformed text is not a number; it is never read as 0.
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Formats a number the way the console shows it: integral values without a
/// fractional part, `Infinity` / `NaN` spelled out, no negative zero.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(n) => f.write_str(&format_number(*n)),
            Literal::Text(s) => f.write_str(s),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::Text(s) => f.write_str(s),
            Value::Image(img) => write!(f, "<image {}x{}>", img.width(), img.height()),
        }
    }
}
