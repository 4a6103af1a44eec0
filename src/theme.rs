use std::fmt;
use std::io::IsTerminal;
use std::str::FromStr;

use gbf::{Command, Op, Program};
use nu_ansi_term::Style;

pub mod catppuccin {
    use nu_ansi_term::Color;
    pub struct Mocha;
    impl Mocha {
        // Accents
        pub const RED: Color = Color::Rgb(243, 139, 168);
        pub const GREEN: Color = Color::Rgb(166, 227, 161);
        pub const YELLOW: Color = Color::Rgb(249, 226, 175);
        pub const MAUVE: Color = Color::Rgb(203, 166, 247);
        pub const PEACH: Color = Color::Rgb(250, 179, 135);
        pub const TEAL: Color = Color::Rgb(148, 226, 213);
        pub const SKY: Color = Color::Rgb(137, 220, 235);
        pub const BLUE: Color = Color::Rgb(137, 180, 250);
    }
}

/// When to color listings and error headers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ColorChoice {
    /// Color when the stream is a terminal
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    pub fn enabled_for(self, stream: &impl IsTerminal) -> bool {
        match self {
            ColorChoice::Auto => stream.is_terminal(),
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        }
    }
}

impl FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(ColorChoice::Auto),
            "always" | "true" => Ok(ColorChoice::Always),
            "never" | "false" => Ok(ColorChoice::Never),
            other => Err(format!("unknown color choice '{other}'")),
        }
    }
}

/// Per-command styles for the `cmd=` field of a listing record.
pub struct ListingStyle {
    inc: Style,
    dec: Style,
    left: Style,
    right: Style,
    output: Style,
    input: Style,
    bracket: Style,
    clear: Style,
}

impl ListingStyle {
    pub fn catppuccin_mocha() -> Self {
        use catppuccin::Mocha as P;
        Self {
            inc: Style::new().fg(P::GREEN).bold(),
            dec: Style::new().fg(P::RED).bold(),
            left: Style::new().fg(P::TEAL).bold(),
            right: Style::new().fg(P::SKY).bold(),
            output: Style::new().fg(P::YELLOW).bold(),
            input: Style::new().fg(P::PEACH).bold(),
            bracket: Style::new().fg(P::MAUVE).bold(),
            clear: Style::new().fg(P::BLUE).bold(),
        }
    }

    fn for_command(&self, command: Command) -> Style {
        match command {
            Command::Increment => self.inc,
            Command::Decrement => self.dec,
            Command::MoveLeft => self.left,
            Command::MoveRight => self.right,
            Command::Output => self.output,
            Command::Input => self.input,
            Command::LoopOpen | Command::LoopClose => self.bracket,
            Command::Clear => self.clear,
        }
    }

    /// A listing like [`Program::listing`] with the command symbol styled.
    pub fn paint<'a>(&'a self, program: &'a Program) -> StyledListing<'a> {
        StyledListing {
            style: self,
            program,
        }
    }
}

pub struct StyledListing<'a> {
    style: &'a ListingStyle,
    program: &'a Program,
}

impl fmt::Display for StyledListing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for op in self.program {
            writeln!(f, "\t{}", self.record(op))?;
        }
        Ok(())
    }
}

impl StyledListing<'_> {
    fn record(&self, op: &Op) -> String {
        let cmd = self.style.for_command(op.command);
        let target = op
            .target
            .map_or_else(|| "-".to_string(), |t| t.to_string());
        format!(
            "{{BFOP-{:05} cmd={} repeat={} target={}}}",
            op.index,
            cmd.paint(op.command.symbol().to_string()),
            op.repeat,
            target,
        )
    }
}
