//! Filter and rewrite records of a separated-value stream by per-field regex.
//!
//! Usage:
//!   csvgrep -r2=TOP [options] [input]
//!   csvgrep -r1='^(\w+)@' -w1='$1' --no-filter [input]
//!
//! `-rN=<regex>` keeps records whose field N matches; `-wN=<template>`
//! rewrites the matches in field N. Output always goes to stdout.

use std::env;
use std::io;
use std::path::PathBuf;

use clap::Parser;
use cursive_rs::cli::{CommonArgs, exit_on_error, open_input, parse_args};
use cursive_rs::{GrepTransform, Result, RuleSet, execute_streaming, extract_rule_args};

#[derive(Parser, Debug)]
#[command(
    name = "csvgrep",
    version,
    about = "Filter and rewrite fields of a separated-value stream",
    after_help = "Rules: -rN=<regex> matches field N, -wN=<template> rewrites its matches ($1, ${name})."
)]
struct Cli {
    /// Keep records that do not match.
    #[arg(short = 'v', long = "invert")]
    invert: bool,

    /// Only rewrite; keep every record.
    #[arg(long = "no-filter")]
    no_filter: bool,

    /// Drop records whose fields are all empty after rewriting.
    #[arg(short = 'd', long = "delete-empty")]
    delete_empty: bool,

    #[command(flatten)]
    common: CommonArgs,

    /// Input file (stdin when omitted or `-`).
    input: Option<PathBuf>,
}

fn run(cli: &Cli, rules: &RuleSet) -> Result<()> {
    let mut config = cli.common.config()?;
    config.delete_empty = cli.delete_empty;

    let mut grep = GrepTransform::new(rules.compile()?)
        .with_filter(!cli.no_filter)
        .with_invert(cli.invert);
    let input = open_input(cli.input.as_deref())?;
    execute_streaming(&config, &mut grep, input, io::stdout().lock())?;
    Ok(())
}

fn main() {
    let (rules, args) = exit_on_error(extract_rule_args(env::args()));
    let cli: Cli = parse_args(args);
    cli.common.init_logging();
    exit_on_error(run(&cli, &rules));
}
