//! Header handling.
//!
//! The first physical record is either the header itself or, with
//! `no_header`, the first data row. In the second case a `C1..Cn` header is
//! made up from its width and emitted ahead of it.

use std::io::Write;

use crate::error::{PipelineError, Result};
use crate::record::Record;

/// Header-policy state for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderState {
    AwaitingFirstRecord,
    Emitted,
}

/// What to do with a record, as decided by [`HeaderPolicy::admit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// The record is the header.
    Header,
    /// The record is data; emit this synthesized header ahead of it.
    SynthesizedHeader(Record),
    /// Ordinary data record.
    Data,
}

/// One-shot decision about the first record of a stream.
#[derive(Debug, Clone)]
pub struct HeaderPolicy {
    synthesize: bool,
    state: HeaderState,
}

impl HeaderPolicy {
    /// `synthesize` is the `no_header` option.
    pub fn new(synthesize: bool) -> Self {
        Self {
            synthesize,
            state: HeaderState::AwaitingFirstRecord,
        }
    }

    pub fn state(&self) -> HeaderState {
        self.state
    }

    /// Classify the next physical record.
    pub fn admit(&mut self, record: &Record) -> Admission {
        match self.state {
            HeaderState::Emitted => Admission::Data,
            HeaderState::AwaitingFirstRecord => {
                self.state = HeaderState::Emitted;
                if self.synthesize {
                    Admission::SynthesizedHeader(synthesize_header(record.len()))
                } else {
                    Admission::Header
                }
            }
        }
    }
}

/// `C1, C2, ... Cn`.
pub fn synthesize_header(width: usize) -> Record {
    Record::from_fields((1..=width).map(|i| format!("C{i}")))
}

/// Print `index: name` for every header field, numbering from 1 and
/// right-aligning the index.
pub fn write_field_names<W: Write>(out: &mut W, header: &Record) -> Result<()> {
    let width = header.len().to_string().len() + 1;
    for (i, name) in header.iter().enumerate() {
        writeln!(out, "{:>width$}: {}", i + 1, name).map_err(PipelineError::Write)?;
    }
    out.flush().map_err(PipelineError::Write)
}
