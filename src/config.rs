//! Run configuration.
//!
//! A [`Config`] is built once before the pipeline starts and is only read
//! afterwards. The binaries build it from command-line flags; tests build it
//! directly with the `with_*` helpers.

use crate::error::{PipelineError, Result};

/// Expected number of fields per decoded record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FieldCount {
    /// Records may have any width.
    #[default]
    Any,
    /// Every record must be as wide as the first one.
    FirstRecord,
    /// Every record must have exactly this many fields.
    Exactly(usize),
}

impl FieldCount {
    /// Negative means any width, zero means "same as the first record".
    pub fn from_flag(n: i64) -> Self {
        match usize::try_from(n) {
            Err(_) => FieldCount::Any,
            Ok(0) => FieldCount::FirstRecord,
            Ok(n) => FieldCount::Exactly(n),
        }
    }
}

/// Decoding options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderConfig {
    pub separator: u8,
    /// Lines starting with this byte are skipped by the codec.
    pub comment: Option<u8>,
    pub fields_per_record: FieldCount,
    pub lazy_quotes: bool,
    pub trailing_comma: bool,
    pub trim_leading_space: bool,
    /// Physical lines dropped before decoding starts.
    pub skip_lines: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            separator: b',',
            comment: None,
            fields_per_record: FieldCount::Any,
            lazy_quotes: false,
            trailing_comma: true,
            trim_leading_space: false,
            skip_lines: 0,
        }
    }
}

/// Encoding options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterConfig {
    pub separator: u8,
    pub crlf: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            separator: b',',
            crlf: false,
        }
    }
}

/// Everything a pipeline run needs to know besides its transform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub reader: ReaderConfig,
    pub writer: WriterConfig,
    /// Trailing records to suppress (streaming) or truncate (sort).
    pub ignore_end: usize,
    /// The first record is data; a `C1..Cn` header is synthesized.
    pub no_header: bool,
    pub line_numbers: bool,
    pub zero_based: bool,
    pub delete_empty: bool,
}

impl Config {
    /// Use `sep` for both input and output.
    #[must_use]
    pub fn with_separator(mut self, sep: u8) -> Self {
        self.reader.separator = sep;
        self.writer.separator = sep;
        self
    }

    #[must_use]
    pub fn with_ignore_end(mut self, n: usize) -> Self {
        self.ignore_end = n;
        self
    }

    #[must_use]
    pub fn with_skip_lines(mut self, n: usize) -> Self {
        self.reader.skip_lines = n;
        self
    }

    #[must_use]
    pub fn with_no_header(mut self, enable: bool) -> Self {
        self.no_header = enable;
        self
    }

    #[must_use]
    pub fn with_line_numbers(mut self, enable: bool) -> Self {
        self.line_numbers = enable;
        self
    }

    #[must_use]
    pub fn with_zero_based(mut self, enable: bool) -> Self {
        self.zero_based = enable;
        self
    }

    #[must_use]
    pub fn with_delete_empty(mut self, enable: bool) -> Self {
        self.delete_empty = enable;
        self
    }

    /// Number given to the first data record.
    pub fn first_line_number(&self) -> u64 {
        if self.zero_based { 0 } else { 1 }
    }
}

/// Validate a one-character delimiter option.
///
/// Empty input means "not set".
pub fn delimiter_byte(option: &'static str, value: &str) -> Result<Option<u8>> {
    match value.as_bytes() {
        [] => Ok(None),
        [b] if b.is_ascii() => Ok(Some(*b)),
        _ => Err(PipelineError::InvalidDelimiter {
            option,
            value: value.to_string(),
        }),
    }
}
