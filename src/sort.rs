//! In-memory sort engine used by `csvsort`.
//!
//! Unlike the streaming executor this decodes the whole input up front,
//! drops the configured tail, orders the body and only then writes. Memory
//! use is proportional to the input.

use std::io::{Read, Write};

use tracing::{debug, info};

use crate::codec::{RecordReader, RecordWriter};
use crate::compare::RecordComparator;
use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::executor::{LINE_NUMBER_HEADER, RunStats};
use crate::header::{Admission, HeaderPolicy};
use crate::record::Record;
use crate::transform::{Identity, RecordTransform};

/// Sort `input` by `comparator` and write the result to `output`.
pub fn execute_sort<R, W>(
    config: &Config,
    comparator: &RecordComparator,
    input: R,
    output: W,
) -> Result<RunStats>
where
    R: Read,
    W: Write,
{
    let mut reader = RecordReader::new(input, &config.reader)?;
    let mut records = reader.read_all()?;
    let records_read = reader.records_read();
    let trimmed = truncate_tail(&mut records, config.ignore_end)?;

    let mut writer = RecordWriter::new(output, &config.writer);
    let result = sort_and_write(config, comparator, records, &mut writer);
    let flushed = writer.flush();
    result?;
    flushed?;

    let stats = RunStats {
        records_read,
        records_written: writer.records_written(),
        records_dropped: 0,
        records_trimmed: trimmed as u64,
    };
    info!(
        read = stats.records_read,
        written = stats.records_written,
        trimmed = stats.records_trimmed,
        "sort complete"
    );
    Ok(stats)
}

/// Drop the last `ignore_end` records.
fn truncate_tail(records: &mut Vec<Record>, ignore_end: usize) -> Result<usize> {
    if ignore_end > records.len() {
        return Err(PipelineError::EntireInputIgnored {
            ignore_end,
            records: records.len(),
        });
    }
    records.truncate(records.len() - ignore_end);
    Ok(ignore_end)
}

fn sort_and_write<W: Write>(
    config: &Config,
    comparator: &RecordComparator,
    records: Vec<Record>,
    writer: &mut RecordWriter<W>,
) -> Result<()> {
    let (header, mut body) = split_header(config.no_header, records)?;
    let Some(mut header) = header else {
        return Ok(());
    };

    for record in &body {
        comparator.check(record)?;
    }
    debug!(records = body.len(), keys = comparator.keys().len(), "sorting");
    body.sort_unstable_by(|a, b| comparator.compare(a, b));

    if config.line_numbers {
        header.prepend(LINE_NUMBER_HEADER);
    }
    writer.write(&header)?;

    let mut line = config.first_line_number();
    for mut record in body {
        if config.line_numbers {
            record.prepend(line.to_string());
        }
        writer.write(&record)?;
        line += 1;
    }
    Ok(())
}

/// Run the buffered records through the header policy and an [`Identity`]
/// pass, separating the header (physical or synthesized) from the body.
fn split_header(no_header: bool, records: Vec<Record>) -> Result<(Option<Record>, Vec<Record>)> {
    let mut policy = HeaderPolicy::new(no_header);
    let mut pass = Identity;
    let mut header = None;
    let mut body = Vec::with_capacity(records.len());

    for (i, record) in records.into_iter().enumerate() {
        let admission = policy.admit(&record);
        let is_header = admission == Admission::Header;
        if let Admission::SynthesizedHeader(synthesized) = admission {
            header = Some(synthesized);
        }
        let Some(record) = pass.transform(record, i as u64 + 1, is_header)? else {
            continue;
        };
        if is_header {
            header = Some(record);
        } else {
            body.push(record);
        }
    }
    Ok((header, body))
}
