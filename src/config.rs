use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use cross_xdg::BaseDirs;
use gbf::EofPolicy;
use tracing::{debug, warn};

use crate::theme::ColorChoice;

/// Settings read from `gbf.toml`. Command-line flags and environment
/// variables override these in `commands::*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub eof: EofPolicy,
    pub listing: bool,
    pub color: ColorChoice,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            eof: EofPolicy::Zero,
            listing: false,
            color: ColorChoice::Auto,
        }
    }
}

impl Config {
    /// Load from `path`, or from `$XDG_CONFIG_HOME/gbf.toml` when `path` is
    /// `None`. A missing or unreadable file yields the defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match default_path() {
                Some(p) => p,
                None => return Self::default(),
            },
        };

        match fs::read_to_string(&path) {
            Ok(content) => {
                debug!(path = %path.display(), "loaded config");
                Self::parse(&content)
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, "no config file, using defaults");
                Self::default()
            }
        }
    }

    /// Parse the small TOML subset we accept: `[section]` headers and
    /// `key = value` lines, values optionally double-quoted.
    pub fn parse(content: &str) -> Self {
        let sections = parse_sections(content);
        let mut cfg = Self::default();

        macro_rules! set {
            ($field:ident: $ty:ty, $section:literal, $key:literal) => {
                if let Some(raw) = sections.get(&($section, $key)) {
                    match raw.parse::<$ty>() {
                        Ok(v) => cfg.$field = v,
                        Err(_) => warn!(
                            section = $section,
                            key = $key,
                            value = %raw,
                            "ignoring invalid config value"
                        ),
                    }
                }
            };
        }

        set!(eof: EofPolicy, "run", "eof");
        set!(listing: bool, "run", "listing");
        set!(color: ColorChoice, "listing", "color");

        cfg
    }
}

fn default_path() -> Option<PathBuf> {
    // On Linux and macOS this is $XDG_CONFIG_HOME or ~/.config;
    // on Windows C:\Users\<user>\.config
    let base_dirs = BaseDirs::new().into_iter().next()?;
    let mut path = PathBuf::from(base_dirs.config_home());
    path.push("gbf.toml");
    Some(path)
}

fn parse_sections(content: &str) -> HashMap<(&str, &str), String> {
    let mut section = "";
    let mut map = HashMap::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            section = line[1..line.len() - 1].trim();
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = strip_comment(value.trim());
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(value);
        map.insert((section, key.trim()), value.to_string());
    }

    map
}

/// Drop a trailing `# comment` that sits outside quotes.
fn strip_comment(value: &str) -> &str {
    let mut in_quotes = false;
    for (i, ch) in value.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            '#' if !in_quotes => return value[..i].trim_end(),
            _ => {}
        }
    }
    value
}
