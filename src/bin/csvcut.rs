//! Select and reorder the fields of a separated-value stream.
//!
//! Usage:
//!   csvcut -c 1,3-5 [options] [input] [output]
//!   csvcut -n [input]
//!
//! Input defaults to stdin and output to stdout; `-` names either explicitly.

use std::env;
use std::path::PathBuf;

use clap::Parser;
use cursive_rs::cli::{CommonArgs, exit_on_error, open_input, open_output, parse_args, run_names};
use cursive_rs::{Projection, Result, execute_streaming, parse_field_ranges};

#[derive(Parser, Debug)]
#[command(
    name = "csvcut",
    version,
    about = "Select and reorder fields of a separated-value stream"
)]
struct Cli {
    /// Fields to keep, in output order (e.g. `3,1-2`). Empty keeps all.
    #[arg(short = 'c', long = "columns", default_value = "")]
    columns: String,

    /// Drop records whose selected fields are all empty.
    #[arg(short = 'd', long = "delete-empty")]
    delete_empty: bool,

    /// Print the header's field names and exit.
    #[arg(short = 'n', long = "names")]
    names: bool,

    #[command(flatten)]
    common: CommonArgs,

    /// Input file (stdin when omitted or `-`).
    input: Option<PathBuf>,

    /// Output file (stdout when omitted or `-`).
    output: Option<PathBuf>,
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = cli.common.config()?;
    config.delete_empty = cli.delete_empty;
    if cli.names {
        return run_names(&config, cli.input.as_deref());
    }

    let mut projection = Projection::new(parse_field_ranges(&cli.columns)?);
    let input = open_input(cli.input.as_deref())?;
    let output = open_output(cli.output.as_deref())?;
    execute_streaming(&config, &mut projection, input, output)?;
    Ok(())
}

fn main() {
    let cli: Cli = parse_args(env::args());
    cli.common.init_logging();
    exit_on_error(run(&cli));
}
