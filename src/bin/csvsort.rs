//! Sort a separated-value stream in memory by one or more key fields.
//!
//! Usage:
//!   csvsort -c 2n,1 [options] [input]
//!
//! A key suffixed with `n` compares numerically. Output always goes to
//! stdout.

use std::env;
use std::io;
use std::path::PathBuf;

use clap::Parser;
use cursive_rs::cli::{CommonArgs, exit_on_error, open_input, parse_args, run_names};
use cursive_rs::{RecordComparator, Result, execute_sort, parse_field_ranges};

#[derive(Parser, Debug)]
#[command(
    name = "csvsort",
    version,
    about = "Sort a separated-value stream by key fields"
)]
struct Cli {
    /// Sort keys in precedence order (e.g. `2n,1`). Empty compares whole records.
    #[arg(short = 'c', long = "columns", default_value = "")]
    columns: String,

    /// Sort in descending order.
    #[arg(short = 'r', long = "reverse")]
    reverse: bool,

    /// Print the header's field names and exit.
    #[arg(short = 'n', long = "names")]
    names: bool,

    #[command(flatten)]
    common: CommonArgs,

    /// Input file (stdin when omitted or `-`).
    input: Option<PathBuf>,
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.common.config()?;
    if cli.names {
        return run_names(&config, cli.input.as_deref());
    }

    let comparator =
        RecordComparator::new(parse_field_ranges(&cli.columns)?).reversed(cli.reverse);
    let input = open_input(cli.input.as_deref())?;
    execute_sort(&config, &comparator, input, io::stdout().lock())?;
    Ok(())
}

fn main() {
    let cli: Cli = parse_args(env::args());
    cli.common.init_logging();
    exit_on_error(run(&cli));
}
