//! Per-record transforms.
//!
//! The streaming executor hands every record to a [`RecordTransform`] along
//! with its line number and whether it is the header. The transform returns
//! the record to emit, or `None` to drop it.

use crate::error::Result;
use crate::range::FieldRange;
use crate::record::Record;

/// A pluggable per-record step.
pub trait RecordTransform {
    /// Map one input record to zero or one output records.
    ///
    /// Header rows must not be filtered. A transform may reshape them (a
    /// projection does) but must not match or rewrite their content.
    fn transform(&mut self, record: Record, line: u64, is_header: bool) -> Result<Option<Record>>;

    /// The display name of this transform.
    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Transform implementations
// ---------------------------------------------------------------------------

/// Passes records through unchanged. The sort engine uses it to route its
/// buffered records past the header policy before ordering them.
pub struct Identity;

impl RecordTransform for Identity {
    fn transform(&mut self, record: Record, _line: u64, _is_header: bool) -> Result<Option<Record>> {
        Ok(Some(record))
    }

    fn name(&self) -> &str {
        "identity"
    }
}

/// Selects fields by range, in range order. Headers are projected like
/// any other record.
pub struct Projection {
    ranges: Vec<FieldRange>,
}

impl Projection {
    /// An empty range list keeps every field.
    pub fn new(ranges: Vec<FieldRange>) -> Self {
        Self { ranges }
    }
}

impl RecordTransform for Projection {
    fn transform(&mut self, record: Record, _line: u64, _is_header: bool) -> Result<Option<Record>> {
        if self.ranges.is_empty() {
            return Ok(Some(record));
        }
        let mut out = Record::with_capacity(record.len());
        for range in &self.ranges {
            out.extend_from_slice(range.select(&record)?);
        }
        Ok(Some(out))
    }

    fn name(&self) -> &str {
        "cut"
    }
}
