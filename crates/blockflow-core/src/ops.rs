//! Operation vocabulary for node kinds.
//!
//! These enums only name operations; their semantics live in the evaluator's
//! operation registry and in the pixel kernel library.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Scalar operations
// ---------------------------------------------------------------------------

/// Single-input numeric operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnaryOp {
    Square,
    Sqrt,
    Abs,
    /// Product of `2..=floor(x)`; 1 for anything below 2.
    Factorial,
    /// Identity. Exists for its console side effect.
    Print,
}

/// Two-input numeric operations, fed through `input1` and `input2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    /// Not computable when the divisor is exactly zero.
    Divide,
    Power,
    /// Truncating remainder; the sign follows the dividend.
    Modulo,
}

/// Comparison operators used by conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CmpOp {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<=")]
    Le,
}

/// Boolean connective between two consecutive conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Connective {
    And,
    Or,
}

// ---------------------------------------------------------------------------
// Image operations
// ---------------------------------------------------------------------------

/// Gradient kernel family used by edge detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeAlgorithm {
    #[default]
    Sobel,
    Prewitt,
    Roberts,
}

/// Pixel filters applied by filter nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "filter", rename_all = "kebab-case")]
pub enum ImageFilter {
    Grayscale,
    Brightness,
    Contrast,
    Blur,
    EdgeDetect {
        #[serde(default)]
        algorithm: EdgeAlgorithm,
    },
}

impl UnaryOp {
    pub fn name(&self) -> &'static str {
        match self {
            UnaryOp::Square => "square",
            UnaryOp::Sqrt => "sqrt",
            UnaryOp::Abs => "abs",
            UnaryOp::Factorial => "factorial",
            UnaryOp::Print => "print",
        }
    }
}

impl BinaryOp {
    pub fn name(&self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Subtract => "subtract",
            BinaryOp::Multiply => "multiply",
            BinaryOp::Divide => "divide",
            BinaryOp::Power => "power",
            BinaryOp::Modulo => "modulo",
        }
    }
}

impl ImageFilter {
    /// Name shown in `Operation: <name>` console lines.
    pub fn name(&self) -> &'static str {
        match self {
            ImageFilter::Grayscale => "grayscale",
            ImageFilter::Brightness => "brightness",
            ImageFilter::Contrast => "contrast",
            ImageFilter::Blur => "blur",
            ImageFilter::EdgeDetect { .. } => "edge-detect",
        }
    }

    /// Returns `true` if the filter reads a strength from its `intensity` port.
    pub fn takes_intensity(&self) -> bool {
        matches!(
            self,
            ImageFilter::Brightness | ImageFilter::Contrast | ImageFilter::Blur
        )
    }
}
