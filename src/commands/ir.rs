use std::io::{self, Write};

use clap::Args;

use super::{resolve, run::print_listing, EXIT_OK, EXIT_TRANSLATE, EXIT_USAGE};
use crate::cli_util::{print_translate_error, Source};
use crate::config::Config;
use crate::theme::ColorChoice;

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct IrArgs {
    /// Read program source from PATH instead of positional "<code>"
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub file: Option<String>,

    /// Concatenated program code parts
    #[arg(value_name = "code", trailing_var_arg = true, allow_hyphen_values = true)]
    pub code: Vec<String>,

    /// Color the listing (fallback GBF_COLOR; default auto)
    #[arg(long = "color", value_name = "WHEN", value_enum)]
    pub color: Option<ColorChoice>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

/// Translate and print the listing without executing anything.
pub fn run(program: &str, args: IrArgs, config: &Config) -> i32 {
    if args.help {
        usage_and_exit(program, EXIT_OK);
    }

    let IrArgs { file, code, color, .. } = args;

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

    let color = resolve(color, "GBF_COLOR", config.color);
    let filtered = gbf::filter(&bytes);

    match gbf::translate(&filtered) {
        Ok(program_ir) => {
            print_listing(&program_ir, color);
            let _ = io::stdout().flush();
            EXIT_OK
        }
        Err(err) => {
            print_translate_error(Some(program), &filtered, &err, color.enabled_for(&io::stderr()));
            EXIT_TRANSLATE
        }
    }
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} ir [--color <WHEN>] "<code>"
  {0} ir [--color <WHEN>] --file <PATH>

Options:
  --file, -f <PATH>  Read program source from PATH instead of positional "<code>"
  --color <WHEN>     Color the listing: auto, always or never
  --help, -h         Show this help

Description:
  Prints the translated program, one record per operation:
    {{BFOP-00003 cmd=[ repeat=1 target=7}}
  Runs of +-<>. are folded into one operation and [-] becomes `z` (clear).
  Nothing is executed.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
