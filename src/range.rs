//! Column specification parsing.
//!
//! A column spec is a comma-separated list of tokens, each `N` or `N-M`
//! (1-based, inclusive), optionally followed by one lowercase letter that
//! hints how the column compares when used as a sort key:
//!
//! ```text
//! 1,3       fields one and three
//! 2-4       fields two through four
//! 5n,1      field five compared numerically, then field one as text
//! ```
//!
//! The parsed list keeps token order. For `csvcut` that order is the output
//! column order; for `csvsort` it is key precedence.

use tracing::warn;

use crate::error::{PipelineError, Result};
use crate::record::Record;

/// How a key field is compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TypeHint {
    /// Byte-wise lexicographic order.
    #[default]
    String,
    /// Floating-point order with a text fallback.
    Numeric,
}

impl TypeHint {
    /// Interpret a suffix letter. Only `n` has a meaning; other letters
    /// keep string order.
    pub fn from_suffix(c: char) -> Self {
        match c {
            'n' => TypeHint::Numeric,
            _ => TypeHint::String,
        }
    }
}

/// A selector over a record's fields.
///
/// `start` and `end` are 0-based and inclusive. `end == None` selects the
/// single field at `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRange {
    pub start: usize,
    pub end: Option<usize>,
    pub hint: TypeHint,
}

impl FieldRange {
    /// Single field at a 0-based index, compared as text.
    pub fn single(start: usize) -> Self {
        Self {
            start,
            end: None,
            hint: TypeHint::String,
        }
    }

    /// Inclusive span of 0-based indices, compared as text.
    pub fn span(start: usize, end: usize) -> Self {
        Self {
            start,
            end: Some(end),
            hint: TypeHint::String,
        }
    }

    #[must_use]
    pub fn with_hint(mut self, hint: TypeHint) -> Self {
        self.hint = hint;
        self
    }

    /// Last index this range touches.
    pub fn last(&self) -> usize {
        self.end.unwrap_or(self.start)
    }

    /// The selected fields of `record`, left to right.
    ///
    /// Fails when any selected index is past the end of the record.
    pub fn select<'r>(&self, record: &'r Record) -> Result<&'r [String]> {
        let fields = record.fields();
        if self.start >= fields.len() {
            return Err(PipelineError::field_index(self.start, fields.len()));
        }
        let last = self.last();
        if last >= fields.len() {
            return Err(PipelineError::field_index(last, fields.len()));
        }
        Ok(&fields[self.start..=last])
    }
}

/// Parse a column spec into field ranges.
///
/// An empty spec yields an empty list; callers decide what that means.
pub fn parse_field_ranges(spec: &str) -> Result<Vec<FieldRange>> {
    if spec.is_empty() {
        return Ok(Vec::new());
    }
    spec.split(',').map(parse_field_range).collect()
}

fn parse_field_range(token: &str) -> Result<FieldRange> {
    let (body, hint) = match token.chars().last() {
        Some(c) if c.is_ascii_lowercase() => {
            if c != 'n' {
                warn!(token = token, "unknown type hint '{c}', using string order");
            }
            (&token[..token.len() - 1], TypeHint::from_suffix(c))
        }
        _ => (token, TypeHint::String),
    };

    let (first, second) = match body.split_once('-') {
        Some((a, b)) => (a, Some(b)),
        None => (body, None),
    };

    let start = parse_field_number(token, first)?;
    let end = second.map(|s| parse_field_number(token, s)).transpose()?;

    if let Some(end) = end
        && end < start
    {
        return Err(PipelineError::ReversedRange {
            token: token.to_string(),
        });
    }

    Ok(FieldRange { start, end, hint })
}

/// Parse a 1-based field number into a 0-based index.
fn parse_field_number(token: &str, digits: &str) -> Result<usize> {
    let n: usize = digits.parse().map_err(|source| PipelineError::InvalidRange {
        token: token.to_string(),
        source,
    })?;
    n.checked_sub(1).ok_or_else(|| PipelineError::ZeroField {
        token: token.to_string(),
    })
}
