//! Record-at-a-time streaming executor.
//!
//! Each decoded record passes through the header policy and the transform,
//! then either goes straight to the writer or into the tail-trim buffer,
//! before the next record is read. Used by `csvcut` and `csvgrep`.

use std::io::{Read, Write};

use tracing::{debug, info, trace};

use crate::codec::{RecordReader, RecordWriter};
use crate::config::Config;
use crate::error::Result;
use crate::header::{Admission, HeaderPolicy, write_field_names};
use crate::record::Record;
use crate::tail_trim::TailTrimBuffer;
use crate::transform::RecordTransform;

/// Literal placed in the line-number column of header rows.
pub const LINE_NUMBER_HEADER: &str = "N";

/// Counts reported by a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Physical records decoded.
    pub records_read: u64,
    /// Records encoded to the output, header included.
    pub records_written: u64,
    /// Records removed by the transform or the delete-empty policy.
    pub records_dropped: u64,
    /// Kept records held back by the tail trim and discarded.
    pub records_trimmed: u64,
}

/// Mutable state of one streaming run.
struct RunState {
    header: HeaderPolicy,
    tail: TailTrimBuffer,
    next_line: u64,
    dropped: u64,
}

/// Stream `input` to `output` through `transform`.
///
/// The writer is flushed on every exit path, so output produced before an
/// error is not lost.
pub fn execute_streaming<R, W>(
    config: &Config,
    transform: &mut dyn RecordTransform,
    input: R,
    output: W,
) -> Result<RunStats>
where
    R: Read,
    W: Write,
{
    let mut reader = RecordReader::new(input, &config.reader)?;
    let mut writer = RecordWriter::new(output, &config.writer);
    let mut state = RunState {
        header: HeaderPolicy::new(config.no_header),
        tail: TailTrimBuffer::new(config.ignore_end),
        next_line: config.first_line_number(),
        dropped: 0,
    };

    debug!(
        transform = transform.name(),
        ignore_end = config.ignore_end,
        no_header = config.no_header,
        "starting streaming run"
    );

    let result = run(config, transform, &mut reader, &mut writer, &mut state);
    let flushed = writer.flush();
    result?;
    flushed?;

    let stats = RunStats {
        records_read: reader.records_read(),
        records_written: writer.records_written(),
        records_dropped: state.dropped,
        records_trimmed: state.tail.discard() as u64,
    };
    info!(
        read = stats.records_read,
        written = stats.records_written,
        dropped = stats.records_dropped,
        trimmed = stats.records_trimmed,
        "run complete"
    );
    Ok(stats)
}

fn run<R: Read, W: Write>(
    config: &Config,
    transform: &mut dyn RecordTransform,
    reader: &mut RecordReader<R>,
    writer: &mut RecordWriter<W>,
    state: &mut RunState,
) -> Result<()> {
    while let Some(record) = reader.read_record()? {
        let is_header = match state.header.admit(&record) {
            Admission::Header => true,
            Admission::SynthesizedHeader(header) => {
                // Synthesized headers bypass the tail trim.
                let line = state.next_line;
                if let Some(mut out) = transform.transform(header, line, true)? {
                    if config.line_numbers {
                        out.prepend(LINE_NUMBER_HEADER);
                    }
                    writer.write(&out)?;
                }
                false
            }
            Admission::Data => false,
        };

        let line = state.next_line;
        let output = transform.transform(record, line, is_header)?;
        if !is_header {
            state.next_line += 1;
        }

        let Some(mut out) = output else {
            state.dropped += 1;
            continue;
        };
        if config.line_numbers {
            if is_header {
                out.prepend(LINE_NUMBER_HEADER);
            } else {
                out.prepend(line.to_string());
            }
        }
        if config.delete_empty && out.is_blank(config.line_numbers) {
            trace!(line, "deleted empty record");
            state.dropped += 1;
            continue;
        }
        emit(writer, &mut state.tail, out)?;
    }
    Ok(())
}

fn emit<W: Write>(writer: &mut RecordWriter<W>, tail: &mut TailTrimBuffer, record: Record) -> Result<()> {
    if let Some(ready) = tail.push(record) {
        writer.write(&ready)?;
    }
    Ok(())
}

/// Print the header's field names instead of processing the stream.
pub fn execute_names<R, W>(config: &Config, input: R, mut output: W) -> Result<()>
where
    R: Read,
    W: Write,
{
    let mut reader = RecordReader::new(input, &config.reader)?;
    if let Some(header) = reader.read_record()? {
        write_field_names(&mut output, &header)?;
    }
    Ok(())
}
