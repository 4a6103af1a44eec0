use std::io::{self, Write};

use clap::Args;
use gbf::{EofPolicy, Interpreter, Program};
use tracing::{info, warn};

use super::{resolve, EXIT_INTERRUPTED, EXIT_OK, EXIT_RUNTIME, EXIT_TRANSLATE, EXIT_USAGE};
use crate::cli_util::{print_runtime_error, print_translate_error, Source};
use crate::config::Config;
use crate::theme::{ColorChoice, ListingStyle};

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct RunArgs {
    /// Read program source from PATH instead of positional "<code>"
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub file: Option<String>,

    /// Concatenated program code parts
    #[arg(value_name = "code", trailing_var_arg = true, allow_hyphen_values = true)]
    pub code: Vec<String>,

    /// Print the translated program before its output
    #[arg(short = 'l', long = "listing")]
    pub listing: bool,

    /// What `,` does at end of input (fallback GBF_EOF; default zero)
    #[arg(long = "eof", value_name = "POLICY")]
    pub eof: Option<EofPolicy>,

    /// Color the listing and error headers (fallback GBF_COLOR; default auto)
    #[arg(long = "color", value_name = "WHEN", value_enum)]
    pub color: Option<ColorChoice>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

pub fn run(program: &str, args: RunArgs, config: &Config) -> i32 {
    if args.help {
        usage_and_exit(program, EXIT_OK);
    }

    let RunArgs {
        file,
        code,
        listing,
        eof,
        color,
        ..
    } = args;

    let Some(source) = Source::from_args(file, code) else {
        eprintln!("{program}: give either positional code or --file, not both or neither");
        usage_and_exit(program, EXIT_USAGE);
    };

    let bytes = match source.load() {
        Ok(b) => b,
        Err(e) => {
            eprintln!("{program}: unable to read source file: {e}");
            usage_and_exit(program, EXIT_USAGE);
        }
    };

    let eof = resolve(eof, "GBF_EOF", config.eof);
    let color = resolve(color, "GBF_COLOR", config.color);
    let listing = listing || config.listing;

    // Translate fully before anything runs; a malformed program never executes.
    let filtered = gbf::filter(&bytes);
    let program_ir = match gbf::translate(&filtered) {
        Ok(p) => p,
        Err(err) => {
            print_translate_error(Some(program), &filtered, &err, color.enabled_for(&io::stderr()));
            return EXIT_TRANSLATE;
        }
    };

    if listing {
        print_listing(&program_ir, color);
        println!();
        println!("Output:");
        let _ = io::stdout().flush();
    }

    // Programs may loop forever; ctrl+c flushes what was written and exits.
    if let Err(e) = ctrlc::set_handler(|| {
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();
        std::process::exit(EXIT_INTERRUPTED);
    }) {
        warn!(error = %e, "failed to set ctrl+c handler");
    }

    info!(ops = program_ir.len(), %eof, "executing");
    let interpreter = Interpreter::new(program_ir).with_eof_policy(eof);

    // Unlocked handles: the ctrl+c handler must be able to flush stdout.
    let result = interpreter.run(io::stdin(), io::stdout());

    // For readability, ensure output ends with a newline
    println!();
    let _ = io::stdout().flush();

    match result {
        Ok(machine) => {
            info!(ptr = machine.pointer(), cell = machine.current(), "halted");
            EXIT_OK
        }
        Err(err) => {
            print_runtime_error(Some(program), &err, color.enabled_for(&io::stderr()));
            EXIT_RUNTIME
        }
    }
}

/// Print the `Intermediate Representation:` header and one record per operation.
pub fn print_listing(program_ir: &Program, color: ColorChoice) {
    println!("Intermediate Representation:");
    if color.enabled_for(&io::stdout()) {
        print!("{}", ListingStyle::catppuccin_mocha().paint(program_ir));
    } else {
        print!("{}", program_ir.listing());
    }
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run [OPTIONS] "<code>"
  {0} run [OPTIONS] --file <PATH>

Options:
  --file,    -f <PATH>  Read program source from PATH instead of positional "<code>"
  --listing, -l         Print the translated program before its output
  --eof <POLICY>        What `,` does at end of input: zero, unchanged or error
  --color <WHEN>        Color the listing: auto, always or never
  --config <PATH>       Read settings from PATH instead of $XDG_CONFIG_HOME/gbf.toml
  --verbose, -v         Log to stderr; repeat for more detail
  --help,    -h         Show this help

Notes:
- Characters outside of +-<>[]., are comments and are ignored.
- Unbalanced brackets stop translation; nothing is executed (exit status 2).
- Input (`,`) reads a single byte from stdin; on EOF the current cell is set to 0
  unless --eof says otherwise.

Examples:
- Run a program from a file:
    {0} run --file ./hello.bf
- Feed a file to `,`:
    {0} run ",[.,]" < input.txt
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
