// ============================================================
// Layer 3 — Example Domain Type
// ============================================================
// A single labelled question. The classifier distinguishes two
// kinds of Arabic questions:
//   0 → textual    ("اذكر عاصمة فرنسا.")
//   1 → arithmetic ("ما هو ناتج ضرب 5 × 4؟")

use serde::{Deserialize, Serialize};
use std::fmt;

/// The two classes the model predicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Textual,
    Arithmetic,
}

impl Label {
    /// Number of output classes of the classification head.
    pub const COUNT: usize = 2;

    /// Map a class index (as produced by argmax) back to a label.
    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(Label::Textual),
            1 => Some(Label::Arithmetic),
            _ => None,
        }
    }

    pub fn index(self) -> i64 {
        match self {
            Label::Textual    => 0,
            Label::Arithmetic => 1,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Textual    => f.write_str("textual"),
            Label::Arithmetic => f.write_str("arithmetic"),
        }
    }
}

/// One labelled question.
///
/// `label` is kept as the raw integer so examples read from JSONL can
/// be validated with a useful message instead of a serde error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub text:  String,
    pub label: i64,
}

impl Example {
    pub fn new(text: impl Into<String>, label: Label) -> Self {
        Self { text: text.into(), label: label.index() }
    }

    /// The typed label, or `None` if the integer is not a known class.
    pub fn label(&self) -> Option<Label> {
        Label::from_index(self.label)
    }
}
