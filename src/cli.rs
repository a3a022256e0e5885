//! Command-line plumbing shared by the three tools.
//!
//! Each binary flattens [`CommonArgs`] into its own `Cli` struct, converts it
//! once into a [`Config`], and reports failures through [`exit_on_error`].

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;
use std::process;

use clap::{ArgAction, Args, Parser};
use tracing::debug;

use crate::config::{Config, FieldCount, ReaderConfig, WriterConfig, delimiter_byte};
use crate::error::{PipelineError, Result};
use crate::executor::execute_names;
use crate::logging::{LogConfig, init_logging};

/// Input decoding options.
#[derive(Args, Debug, Clone)]
pub struct ReaderArgs {
    /// Input field separator.
    #[arg(long = "input-separator", visible_alias = "is", default_value = ",")]
    pub input_separator: String,

    /// Use tab as the input separator.
    #[arg(long, visible_alias = "its")]
    pub tab: bool,

    /// Skip input lines starting with this character.
    #[arg(long, visible_alias = "ic", default_value = "")]
    pub comment: String,

    /// Fields per record: -1 any, 0 same as the first record, N exactly N.
    #[arg(
        long = "fields-per-line",
        visible_alias = "in",
        default_value_t = -1,
        allow_negative_numbers = true
    )]
    pub fields_per_line: i64,

    /// Accept stray quotes in unquoted fields.
    #[arg(long = "lazy-quotes", visible_alias = "iq")]
    pub lazy_quotes: bool,

    /// Accept a trailing separator at the end of a line.
    #[arg(long = "trailing-comma", visible_alias = "il")]
    pub trailing_comma: bool,

    /// Strip leading whitespace from every field.
    #[arg(long = "trim-leading-space", visible_alias = "it")]
    pub trim_leading_space: bool,

    /// Skip this many physical lines before decoding.
    #[arg(long = "ignore-beginning", visible_alias = "bi", default_value_t = 0)]
    pub ignore_beginning: usize,
}

/// Output encoding options.
#[derive(Args, Debug, Clone)]
pub struct WriterArgs {
    /// Output field separator; defaults to the input separator.
    #[arg(long = "output-separator", visible_alias = "os")]
    pub output_separator: Option<String>,

    /// Terminate output records with CRLF.
    #[arg(long, visible_alias = "oc")]
    pub crlf: bool,
}

/// Header, numbering and trimming options.
#[derive(Args, Debug, Clone)]
pub struct RecordArgs {
    /// Suppress this many trailing records.
    #[arg(long = "ignore-end", visible_alias = "ei", default_value_t = 0)]
    pub ignore_end: usize,

    /// The first record is data; emit a C1..Cn header instead.
    #[arg(short = 'H', long = "no-header")]
    pub no_header: bool,

    /// Prefix every record with a line number column.
    #[arg(short = 'l', long = "line-numbers")]
    pub line_numbers: bool,

    /// Number lines from 0 instead of 1.
    #[arg(short = 'z', long = "zero-based")]
    pub zero_based: bool,
}

#[derive(Args, Debug, Clone)]
pub struct LogArgs {
    /// Increase log verbosity (repeatable).
    #[arg(long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Options every tool accepts.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    #[command(flatten)]
    pub reader: ReaderArgs,

    #[command(flatten)]
    pub writer: WriterArgs,

    #[command(flatten)]
    pub records: RecordArgs,

    #[command(flatten)]
    pub log: LogArgs,
}

impl CommonArgs {
    /// Validate the flags and build the run configuration.
    pub fn config(&self) -> Result<Config> {
        let input_separator = if self.reader.tab {
            b'\t'
        } else {
            delimiter_byte("input separator", &self.reader.input_separator)?.unwrap_or(b',')
        };
        let output_separator = match &self.writer.output_separator {
            Some(value) => delimiter_byte("output separator", value)?.unwrap_or(input_separator),
            None => input_separator,
        };

        let reader = ReaderConfig {
            separator: input_separator,
            comment: delimiter_byte("comment", &self.reader.comment)?,
            fields_per_record: FieldCount::from_flag(self.reader.fields_per_line),
            lazy_quotes: self.reader.lazy_quotes,
            trailing_comma: self.reader.trailing_comma,
            trim_leading_space: self.reader.trim_leading_space,
            skip_lines: self.reader.ignore_beginning,
        };
        let writer = WriterConfig {
            separator: output_separator,
            crlf: self.writer.crlf,
        };

        Ok(Config {
            reader,
            writer,
            ignore_end: self.records.ignore_end,
            no_header: self.records.no_header,
            line_numbers: self.records.line_numbers,
            zero_based: self.records.zero_based,
            delete_empty: false,
        })
    }

    /// Start logging at the requested verbosity.
    pub fn init_logging(&self) {
        init_logging(&LogConfig::from_verbosity(self.log.verbose));
    }
}

/// Parse `args`, exiting 0 for help/version and 1 for usage errors.
pub fn parse_args<C, I>(args: I) -> C
where
    C: Parser,
    I: IntoIterator<Item = String>,
{
    match C::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            process::exit(code);
        }
    }
}

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// Open the input file, or stdin for `None` and `-`.
pub fn open_input(path: Option<&Path>) -> Result<Box<dyn Read>> {
    match path {
        Some(path) if !is_stdio(path) => {
            let file = File::open(path).map_err(|source| PipelineError::Open {
                path: path.to_path_buf(),
                source,
            })?;
            debug!(path = %path.display(), "opened input");
            Ok(Box::new(file))
        }
        _ => Ok(Box::new(io::stdin().lock())),
    }
}

/// Create the output file, or use stdout for `None` and `-`.
pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) if !is_stdio(path) => {
            let file = File::create(path).map_err(|source| PipelineError::Open {
                path: path.to_path_buf(),
                source,
            })?;
            debug!(path = %path.display(), "created output");
            Ok(Box::new(BufWriter::new(file)))
        }
        _ => Ok(Box::new(io::stdout().lock())),
    }
}

/// Print the header's field names to stdout.
pub fn run_names(config: &Config, input: Option<&Path>) -> Result<()> {
    if config.no_header {
        return Err(PipelineError::Incompatible(
            "--names cannot be combined with --no-header",
        ));
    }
    execute_names(config, open_input(input)?, io::stdout().lock())
}

/// Unwrap `result` or print the error and exit with status 1.
pub fn exit_on_error<T>(result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            debug!(category = ?err.category(), "run failed");
            eprintln!("error: {err}");
            process::exit(1);
        }
    }
}
