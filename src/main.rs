mod cli_util;
mod commands;
mod config;
mod theme;

use std::env;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::commands::{ir::IrArgs, run::RunArgs, EXIT_OK, EXIT_USAGE};
use crate::config::Config;

fn print_top_usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run [OPTIONS] "<code>"       # Translate and run code (args are concatenated)
  {0} run [OPTIONS] --file <PATH>  # Translate and run code loaded from file
  {0} ir  [OPTIONS] --file <PATH>  # Print the translated program without running it

Global options:
  --config <PATH>  Read settings from PATH instead of $XDG_CONFIG_HOME/gbf.toml
  --verbose, -v    Log to stderr (-v info, -vv debug, -vvv every executed step)

Run "{0} <subcommand> --help" for more info.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}

#[derive(Parser, Debug)]
#[command(name = "gbf", disable_help_flag = true, disable_help_subcommand = true)]
struct Cli {
    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    help: bool,

    /// Log to stderr; repeat for more detail
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Read settings from PATH instead of $XDG_CONFIG_HOME/gbf.toml
    #[arg(long = "config", value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    Run(RunArgs),
    Ir(IrArgs),
}

/// Logs go to stderr so stdout carries nothing but the listing and program output.
/// `-v` flags override `RUST_LOG`.
fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gbf=warn")),
        1 => EnvFilter::new("gbf=info"),
        2 => EnvFilter::new("gbf=debug"),
        _ => EnvFilter::new("gbf=trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(io::stderr().is_terminal()),
        )
        .init();
}

fn main() {
    // Usage screens and error prefixes name the binary as it was invoked
    let program = env::args().next().unwrap_or_else(|| String::from("gbf"));

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            print_top_usage_and_exit(&program, EXIT_USAGE);
        }
    };

    let Some(command) = cli.command else {
        print_top_usage_and_exit(&program, if cli.help { EXIT_OK } else { EXIT_USAGE });
    };

    init_logging(cli.verbose);
    let config = Config::load(cli.config.as_deref());

    let code = match command {
        Command::Run(args) => commands::run::run(&program, args, &config),
        Command::Ir(args) => commands::ir::run(&program, args, &config),
    };

    std::process::exit(code);
}
