//! Error types for the record pipeline.
//!
//! Every failure is fatal for the run. [`PipelineError::category`] maps each
//! variant onto one of four kinds so callers can tell configuration mistakes
//! from bad input data.

use std::io;
use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;

/// Broad classification of a [`PipelineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad column spec, bad regex, bad option value. Raised before any I/O.
    Config,
    /// The codec rejected the input text or a record had the wrong width.
    Syntax,
    /// A range or rule referenced a field the record does not have.
    FieldIndex,
    /// Opening, reading, or writing a stream failed.
    Io,
}

/// Errors raised while configuring or running a pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    // === Configuration ===
    #[error("{token:?}: invalid field range: {source}")]
    InvalidRange {
        token: String,
        #[source]
        source: ParseIntError,
    },

    #[error("{token:?}: field numbers start at 1")]
    ZeroField { token: String },

    #[error("{token:?}: range end is before range start")]
    ReversedRange { token: String },

    #[error("invalid regular expression for field {field}: {source}")]
    InvalidPattern {
        field: usize,
        #[source]
        source: regex::Error,
    },

    #[error("{arg}: invalid rule argument, expected -rN=<regex> or -wN=<replacement>")]
    InvalidRuleArg { arg: String },

    #[error("{option} must be a single ASCII character, got {value:?}")]
    InvalidDelimiter { option: &'static str, value: String },

    #[error("{0}")]
    Incompatible(&'static str),

    // === Input syntax ===
    #[error("malformed input: {0}")]
    Syntax(#[from] csv::Error),

    #[error("malformed input: {0}")]
    Quote(#[from] QuoteError),

    #[error("record {record}: expected {expected} fields, found {found}")]
    FieldCount {
        record: u64,
        expected: usize,
        found: usize,
    },

    // === Field access ===
    #[error("{index}: no such field in record of length {len}")]
    FieldIndex { index: usize, len: usize },

    // === I/O ===
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("read failed: {0}")]
    Read(#[source] io::Error),

    #[error("write failed: {0}")]
    Write(#[source] io::Error),

    #[error("input ended after {skipped} of {requested} ignored leading lines")]
    ShortPrologue { skipped: usize, requested: usize },

    #[error(
        "entire input was ignored because of value of 'ignore end' ({ignore_end} > {records} records)"
    )]
    EntireInputIgnored { ignore_end: usize, records: usize },
}

impl PipelineError {
    /// Builds the out-of-range error for a 0-based `index`.
    pub fn field_index(index: usize, len: usize) -> Self {
        PipelineError::FieldIndex {
            index: index + 1,
            len,
        }
    }

    /// The taxonomy bucket this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            PipelineError::InvalidRange { .. }
            | PipelineError::ZeroField { .. }
            | PipelineError::ReversedRange { .. }
            | PipelineError::InvalidPattern { .. }
            | PipelineError::InvalidRuleArg { .. }
            | PipelineError::InvalidDelimiter { .. }
            | PipelineError::Incompatible(_) => ErrorCategory::Config,
            PipelineError::Syntax(e) if e.is_io_error() => ErrorCategory::Io,
            PipelineError::Syntax(_)
            | PipelineError::Quote(_)
            | PipelineError::FieldCount { .. } => ErrorCategory::Syntax,
            PipelineError::FieldIndex { .. } => ErrorCategory::FieldIndex,
            PipelineError::Open { .. }
            | PipelineError::Read(_)
            | PipelineError::Write(_)
            | PipelineError::ShortPrologue { .. }
            | PipelineError::EntireInputIgnored { .. } => ErrorCategory::Io,
        }
    }
}

/// Quoting violation found ahead of the decoder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}")]
pub struct QuoteError {
    pub line: u64,
    pub kind: QuoteErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QuoteErrorKind {
    #[error("bare \" in non-quoted field")]
    BareQuote,
    #[error("extraneous or missing \" in quoted field")]
    ExtraneousQuote,
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, PipelineError>;
