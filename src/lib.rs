//! # cursive-rs
//!
//! A record pipeline for separated-value (CSV/TSV) text streams, and the
//! `csvcut`, `csvgrep` and `csvsort` tools built on it.
//!
//! ## Overview
//!
//! Every tool runs the same shape of pipeline:
//! - **Decode**: the input is read one record at a time under the configured
//!   separator, comment and width rules
//! - **Header policy**: the first record is the header, or a `C1..Cn` header
//!   is synthesized for headerless input
//! - **Transform**: each record is projected, filtered/rewritten, or passed
//!   through unchanged
//! - **Tail trim**: the last N kept records can be held back and dropped
//! - **Emit**: records are encoded, optionally behind a line-number column
//!
//! The sort tool buffers the whole input instead and orders it with a
//! multi-key, type-aware comparator.
//!
//! ## Example
//!
//! ```
//! use cursive_rs::{Config, Projection, execute_streaming, parse_field_ranges};
//!
//! let input = "id,name,age\n1,ann,30\n2,bob,41\n";
//! let mut cut = Projection::new(parse_field_ranges("2,1").unwrap());
//!
//! let mut out = Vec::new();
//! execute_streaming(&Config::default(), &mut cut, input.as_bytes(), &mut out).unwrap();
//!
//! assert_eq!(String::from_utf8(out).unwrap(), "name,id\nann,1\nbob,2\n");
//! ```

pub mod cli;
pub mod codec;
pub mod compare;
pub mod config;
pub mod error;
pub mod executor;
pub mod grep;
pub mod header;
pub mod logging;
pub mod quoting;
pub mod range;
pub mod record;
pub mod sort;
pub mod tail_trim;
pub mod transform;

pub use codec::{RecordReader, RecordWriter};
pub use compare::{RecordComparator, compare_fields};
pub use config::{Config, FieldCount, ReaderConfig, WriterConfig};
pub use error::{ErrorCategory, PipelineError, QuoteError, QuoteErrorKind, Result};
pub use executor::{RunStats, execute_names, execute_streaming};
pub use grep::{GrepTransform, Rule, RuleSet, RuleSpec, extract_rule_args};
pub use header::{HeaderPolicy, synthesize_header, write_field_names};
pub use quoting::QuotingFilter;
pub use range::{FieldRange, TypeHint, parse_field_ranges};
pub use record::Record;
pub use sort::execute_sort;
pub use tail_trim::TailTrimBuffer;
pub use transform::{Identity, Projection, RecordTransform};
