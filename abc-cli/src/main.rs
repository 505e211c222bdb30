//! Command-line interface for ABC files
//!
//! Usage:
//!   abc check `<path>`                                - Print diagnostics, exit 1 on errors
//!   abc format `<path>`                               - Print the formatted file
//!   abc tokens `<path>` [--beams]                     - Print classified tokens (or beams) as JSON
//!   abc rhythm `<path>` --op `<op>` --range `<range>` - Print the rewritten range
//!
//! Every command accepts `--config <file>` to layer a TOML file over the built-in defaults.
//! Lines and columns on the command line are one-based.

mod commands;

use std::process::ExitCode;

use clap::{Arg, ArgAction, ArgMatches, Command};

use commands::{CliError, Outcome};

fn cli() -> Command {
    let path = Arg::new("path").help("Path to the ABC file").required(true).index(1);

    Command::new("abc")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Check, format and rewrite ABC music notation")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .help("TOML file layered over the built-in defaults"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log analysis details to stderr"),
        )
        .subcommand(
            Command::new("check")
                .about("Print diagnostics; exits with 1 when there are errors")
                .arg(path.clone()),
        )
        .subcommand(
            Command::new("format")
                .about("Print the formatted file; refuses files with errors")
                .arg(path.clone()),
        )
        .subcommand(
            Command::new("tokens")
                .about("Print the classified tokens as JSON")
                .arg(path.clone())
                .arg(
                    Arg::new("beams")
                        .long("beams")
                        .action(ArgAction::SetTrue)
                        .help("Print the beam groups of every music line instead"),
                ),
        )
        .subcommand(
            Command::new("rhythm")
                .about("Multiply or divide the rhythms in a range and print the replacement")
                .arg(path)
                .arg(
                    Arg::new("op")
                        .long("op")
                        .required(true)
                        .value_parser(["multiply", "divide"])
                        .help("Direction of the rewrite"),
                )
                .arg(
                    Arg::new("range")
                        .long("range")
                        .required(true)
                        .help("LINE:COL-LINE:COL, one-based, end exclusive"),
                ),
        )
}

fn run(matches: &ArgMatches) -> Result<Outcome, CliError> {
    let config = commands::load_config(matches.get_one::<String>("config"))?;
    let (name, sub) = matches.subcommand().ok_or(CliError::MissingCommand)?;
    let path = sub
        .get_one::<String>("path")
        .ok_or(CliError::MissingCommand)?;

    match name {
        "check" => commands::check(path, &config),
        "format" => commands::format(path, &config),
        "tokens" => commands::tokens(path, &config, sub.get_flag("beams")),
        "rhythm" => {
            let op = sub.get_one::<String>("op").ok_or(CliError::MissingCommand)?;
            let range = sub
                .get_one::<String>("range")
                .ok_or(CliError::MissingCommand)?;
            commands::rhythm(path, &config, op, range)
        }
        _ => Err(CliError::MissingCommand),
    }
}

fn main() -> ExitCode {
    let matches = cli().get_matches();
    let level = if matches.get_flag("verbose") { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&matches) {
        Ok(outcome) => {
            print!("{}", outcome.stdout);
            if outcome.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(error) => {
            eprintln!("abc: {error}");
            ExitCode::FAILURE
        }
    }
}
