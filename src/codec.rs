//! Record-at-a-time adapter over the `csv` crate.
//!
//! The codec owns the delimited-text rules (quoting, escaping, comment lines).
//! This module configures it from a [`ReaderConfig`]/[`WriterConfig`] and adds
//! the few behaviours it lacks: skipping raw leading lines, an exact width
//! check, and (through [`QuotingFilter`]) leading-space trimming and strict
//! quotes.

use std::io::{self, BufRead, BufReader, Read, Write};

use csv::{ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use tracing::{debug, trace};

use crate::config::{FieldCount, ReaderConfig, WriterConfig};
use crate::error::{PipelineError, QuoteError, Result};
use crate::quoting::QuotingFilter;
use crate::record::Record;

/// Decodes one [`Record`] at a time.
pub struct RecordReader<R: Read> {
    inner: csv::Reader<QuotingFilter<BufReader<R>>>,
    buf: StringRecord,
    expected: FieldCount,
    count: u64,
}

impl<R: Read> RecordReader<R> {
    /// Wrap `input`, consuming `config.skip_lines` physical lines first.
    pub fn new(input: R, config: &ReaderConfig) -> Result<Self> {
        let mut input = BufReader::new(input);
        skip_lines(&mut input, config.skip_lines)?;

        if config.lazy_quotes {
            debug!("lazy quotes: stray quotes accepted");
        }
        let input = QuotingFilter::new(
            input,
            config.separator,
            config.comment,
            config.lazy_quotes,
            config.trim_leading_space,
            config.skip_lines as u64 + 1,
        );

        let inner = ReaderBuilder::new()
            .has_headers(false)
            .delimiter(config.separator)
            .comment(config.comment)
            .flexible(config.fields_per_record != FieldCount::FirstRecord)
            .from_reader(input);

        Ok(Self {
            inner,
            buf: StringRecord::new(),
            expected: config.fields_per_record,
            count: 0,
        })
    }

    /// Next record, or `None` at end of stream.
    pub fn read_record(&mut self) -> Result<Option<Record>> {
        if !self.inner.read_record(&mut self.buf).map_err(decode_error)? {
            return Ok(None);
        }
        self.count += 1;

        if let FieldCount::Exactly(expected) = self.expected
            && self.buf.len() != expected
        {
            return Err(PipelineError::FieldCount {
                record: self.count,
                expected,
                found: self.buf.len(),
            });
        }

        let record = Record::from(&self.buf);
        trace!(record = self.count, fields = record.len(), "decoded");
        Ok(Some(record))
    }

    /// Decode the rest of the stream.
    pub fn read_all(&mut self) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        while let Some(record) = self.read_record()? {
            records.push(record);
        }
        Ok(records)
    }

    /// Records decoded so far.
    pub fn records_read(&self) -> u64 {
        self.count
    }
}

/// Surface quoting violations raised by the filter as their own error.
fn decode_error(err: csv::Error) -> PipelineError {
    let quote = match err.kind() {
        csv::ErrorKind::Io(e) => e
            .get_ref()
            .and_then(|inner| inner.downcast_ref::<QuoteError>())
            .cloned(),
        _ => None,
    };
    match quote {
        Some(quote) => PipelineError::Quote(quote),
        None => PipelineError::Syntax(err),
    }
}

fn skip_lines<R: BufRead>(input: &mut R, requested: usize) -> Result<()> {
    let mut line = Vec::new();
    for skipped in 0..requested {
        line.clear();
        let n = input
            .read_until(b'\n', &mut line)
            .map_err(PipelineError::Read)?;
        if n == 0 {
            return Err(PipelineError::ShortPrologue { skipped, requested });
        }
    }
    if requested > 0 {
        debug!(lines = requested, "skipped leading lines");
    }
    Ok(())
}

/// Encodes records to a byte sink.
pub struct RecordWriter<W: Write> {
    inner: csv::Writer<W>,
    count: u64,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(output: W, config: &WriterConfig) -> Self {
        let terminator = if config.crlf {
            Terminator::CRLF
        } else {
            Terminator::Any(b'\n')
        };
        let inner = WriterBuilder::new()
            .delimiter(config.separator)
            .terminator(terminator)
            .flexible(true)
            .from_writer(output);
        Self { inner, count: 0 }
    }

    pub fn write(&mut self, record: &Record) -> Result<()> {
        self.inner.write_record(record.fields()).map_err(write_error)?;
        self.count += 1;
        Ok(())
    }

    /// Push buffered output to the sink.
    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush().map_err(PipelineError::Write)
    }

    /// Records written so far.
    pub fn records_written(&self) -> u64 {
        self.count
    }
}

fn write_error(err: csv::Error) -> PipelineError {
    match err.into_kind() {
        csv::ErrorKind::Io(e) => PipelineError::Write(e),
        kind => PipelineError::Write(io::Error::other(format!("{kind:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;

    fn read(input: &str, config: &ReaderConfig) -> Result<Vec<Record>> {
        RecordReader::new(input.as_bytes(), config)?.read_all()
    }

    fn write(records: &[Record], config: &WriterConfig) -> String {
        let mut out = Vec::new();
        {
            let mut writer = RecordWriter::new(&mut out, config);
            for r in records {
                writer.write(r).unwrap();
            }
            writer.flush().unwrap();
        }
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_read_quoted() {
        let records = read("a,\"b,c\",d\n", &ReaderConfig::default()).unwrap();
        assert_eq!(records, vec![Record::from_fields(["a", "b,c", "d"])]);
    }

    #[test]
    fn test_read_separator_and_comment() {
        let config = ReaderConfig {
            separator: b';',
            comment: Some(b'#'),
            ..ReaderConfig::default()
        };
        let records = read("# note\na;b\n#x;y\nc;d\n", &config).unwrap();
        assert_eq!(
            records,
            vec![Record::from_fields(["a", "b"]), Record::from_fields(["c", "d"])]
        );
    }

    #[test]
    fn test_skip_lines() {
        let config = ReaderConfig {
            skip_lines: 2,
            ..ReaderConfig::default()
        };
        let records = read("junk\nmore junk, \"\nh1,h2\n", &config).unwrap();
        assert_eq!(records, vec![Record::from_fields(["h1", "h2"])]);
    }

    #[test]
    fn test_skip_past_end() {
        let config = ReaderConfig {
            skip_lines: 3,
            ..ReaderConfig::default()
        };
        let err = read("one\n", &config).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ShortPrologue {
                skipped: 1,
                requested: 3
            }
        ));
    }

    #[test]
    fn test_exact_width() {
        let config = ReaderConfig {
            fields_per_record: FieldCount::Exactly(2),
            ..ReaderConfig::default()
        };
        let err = read("a,b\nc,d,e\n", &config).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::FieldCount {
                record: 2,
                expected: 2,
                found: 3
            }
        ));
        assert_eq!(err.category(), ErrorCategory::Syntax);
    }

    #[test]
    fn test_first_record_width() {
        let config = ReaderConfig {
            fields_per_record: FieldCount::FirstRecord,
            ..ReaderConfig::default()
        };
        let err = read("a,b\nc\n", &config).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Syntax);
    }

    #[test]
    fn test_any_width() {
        let records = read("a,b\nc\n", &ReaderConfig::default()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].len(), 1);
    }

    #[test]
    fn test_trim_leading_space() {
        let config = ReaderConfig {
            trim_leading_space: true,
            ..ReaderConfig::default()
        };
        let records = read("a,  b ,\tc\n", &config).unwrap();
        assert_eq!(records, vec![Record::from_fields(["a", "b ", "c"])]);
    }

    #[test]
    fn test_trim_leading_space_before_quote() {
        let config = ReaderConfig {
            trim_leading_space: true,
            ..ReaderConfig::default()
        };
        let records = read("a, \"b,c\"\n", &config).unwrap();
        assert_eq!(records, vec![Record::from_fields(["a", "b,c"])]);
    }

    #[test]
    fn test_strict_quotes_reject_bare_quote() {
        let mut reader =
            RecordReader::new("h1,h2\na\"b,c\n".as_bytes(), &ReaderConfig::default()).unwrap();
        assert_eq!(
            reader.read_record().unwrap(),
            Some(Record::from_fields(["h1", "h2"]))
        );
        let err = reader.read_record().unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Quote(QuoteError {
                line: 2,
                kind: crate::error::QuoteErrorKind::BareQuote
            })
        ));
        assert_eq!(err.category(), ErrorCategory::Syntax);
    }

    #[test]
    fn test_strict_quotes_reject_text_after_quote() {
        let err = read("\"x\"y\",z\n", &ReaderConfig::default()).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Syntax);
        assert!(err.to_string().contains("extraneous or missing"));
    }

    #[test]
    fn test_strict_quotes_line_counts_skipped_lines() {
        let config = ReaderConfig {
            skip_lines: 2,
            ..ReaderConfig::default()
        };
        let err = read("x\ny\nok\nbad\"\n", &config).unwrap_err();
        assert!(matches!(err, PipelineError::Quote(QuoteError { line: 4, .. })));
    }

    #[test]
    fn test_lazy_quotes_accept_stray_quotes() {
        let config = ReaderConfig {
            lazy_quotes: true,
            ..ReaderConfig::default()
        };
        let records = read("a\"b,c\n", &config).unwrap();
        assert_eq!(records, vec![Record::from_fields(["a\"b", "c"])]);
    }

    #[test]
    fn test_write_separator_and_crlf() {
        let config = WriterConfig {
            separator: b'\t',
            crlf: true,
        };
        let out = write(
            &[Record::from_fields(["a", "b"]), Record::from_fields(["c"])],
            &config,
        );
        assert_eq!(out, "a\tb\r\nc\r\n");
    }

    #[test]
    fn test_write_quotes_when_needed() {
        let out = write(
            &[Record::from_fields(["x,y", "plain"])],
            &WriterConfig::default(),
        );
        assert_eq!(out, "\"x,y\",plain\n");
    }
}
