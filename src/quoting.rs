//! Byte-level quote policing in front of the `csv` decoder.
//!
//! The `csv` crate is always lenient about quotes and has no notion of
//! trimming before a field's opening quote. [`QuotingFilter`] tracks field
//! boundaries on the raw bytes so that
//!
//! - leading blanks of a field are dropped before the quote is recognised
//!   (`a, "b,c"` is two fields), and
//! - in strict mode, a quote inside an unquoted field, text after a closing
//!   quote, or an unterminated quoted field is a [`QuoteError`].
//!
//! Bytes ahead of an offending byte are still handed out, so records that
//! precede it decode normally and the error surfaces at the bad record.

use std::io::{self, BufRead, Read};

use crate::error::{QuoteError, QuoteErrorKind};

const QUOTE: u8 = b'"';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    LineStart,
    FieldStart,
    Unquoted,
    Quoted,
    /// A quote seen inside a quoted field: either the closing quote or the
    /// first half of a doubled one.
    QuotedQuote,
    Comment,
}

/// What to do with one input byte.
enum Step {
    Emit,
    Drop,
    Fail(QuoteErrorKind),
}

/// Field-boundary tracker. Kept apart from the reader so it can be driven
/// while the reader's buffer is borrowed.
#[derive(Debug, Clone)]
struct Scanner {
    separator: u8,
    comment: Option<u8>,
    lazy: bool,
    trim: bool,
    state: State,
    line: u64,
}

impl Scanner {
    fn step(&mut self, b: u8) -> Step {
        if b == b'\n' && self.state != State::Quoted {
            self.line += 1;
            self.state = State::LineStart;
            return Step::Emit;
        }
        if b == b'\n' {
            self.line += 1;
            return Step::Emit;
        }

        match self.state {
            State::Comment => Step::Emit,
            State::LineStart if Some(b) == self.comment => {
                self.state = State::Comment;
                Step::Emit
            }
            State::LineStart | State::FieldStart => self.field_start(b),
            State::Unquoted => {
                if b == self.separator {
                    self.state = State::FieldStart;
                } else if b == b'\r' {
                    self.state = State::LineStart;
                } else if b == QUOTE && !self.lazy {
                    return Step::Fail(QuoteErrorKind::BareQuote);
                }
                Step::Emit
            }
            State::Quoted => {
                if b == QUOTE {
                    self.state = State::QuotedQuote;
                }
                Step::Emit
            }
            State::QuotedQuote => {
                if b == QUOTE {
                    self.state = State::Quoted;
                } else if b == self.separator {
                    self.state = State::FieldStart;
                } else if b == b'\r' {
                    self.state = State::LineStart;
                } else if self.lazy {
                    self.state = State::Unquoted;
                } else {
                    return Step::Fail(QuoteErrorKind::ExtraneousQuote);
                }
                Step::Emit
            }
        }
    }

    fn field_start(&mut self, b: u8) -> Step {
        // Whitespace separators are trimmed too.
        if self.trim && matches!(b, b' ' | b'\t' | 0x0b | 0x0c) {
            return Step::Drop;
        }
        self.state = if b == self.separator {
            State::FieldStart
        } else if b == b'\r' {
            State::LineStart
        } else if b == QUOTE {
            State::Quoted
        } else {
            State::Unquoted
        };
        Step::Emit
    }

    /// Check the state once the input is exhausted.
    fn finish(&self) -> Option<QuoteErrorKind> {
        (self.state == State::Quoted && !self.lazy).then_some(QuoteErrorKind::ExtraneousQuote)
    }
}

/// A `Read` adapter that trims and polices quotes ahead of the decoder.
pub struct QuotingFilter<R: BufRead> {
    inner: R,
    scanner: Scanner,
    failed: Option<QuoteError>,
}

impl<R: BufRead> QuotingFilter<R> {
    /// `first_line` is the physical line number of the first byte of
    /// `inner`, used in error messages.
    pub fn new(
        inner: R,
        separator: u8,
        comment: Option<u8>,
        lazy_quotes: bool,
        trim_leading_space: bool,
        first_line: u64,
    ) -> Self {
        Self {
            inner,
            scanner: Scanner {
                separator,
                comment,
                lazy: lazy_quotes,
                trim: trim_leading_space,
                state: State::LineStart,
                line: first_line,
            },
            failed: None,
        }
    }

    fn fail(&mut self, kind: QuoteErrorKind) {
        self.failed = Some(QuoteError {
            line: self.scanner.line,
            kind,
        });
    }
}

impl<R: BufRead> Read for QuotingFilter<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let mut written = 0;
        while written < out.len() && self.failed.is_none() {
            let buf = self.inner.fill_buf()?;
            if buf.is_empty() {
                if let Some(kind) = self.scanner.finish() {
                    self.fail(kind);
                }
                break;
            }

            let mut consumed = 0;
            let mut failure = None;
            for &b in buf {
                if written == out.len() {
                    break;
                }
                match self.scanner.step(b) {
                    Step::Emit => {
                        out[written] = b;
                        written += 1;
                    }
                    Step::Drop => {}
                    Step::Fail(kind) => {
                        failure = Some(kind);
                        break;
                    }
                }
                consumed += 1;
            }
            self.inner.consume(consumed);
            if let Some(kind) = failure {
                self.fail(kind);
            }
        }

        match &self.failed {
            Some(err) if written == 0 => Err(io::Error::new(io::ErrorKind::InvalidData, err.clone())),
            _ => Ok(written),
        }
    }
}
