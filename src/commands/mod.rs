//! Subcommand handlers. Each returns the process exit status.

pub mod ir;
pub mod run;

use std::env;
use std::str::FromStr;

use tracing::warn;

pub const EXIT_OK: i32 = 0;
/// Bad invocation or unreadable source.
pub const EXIT_USAGE: i32 = 1;
/// Unbalanced brackets; nothing was executed.
pub const EXIT_TRANSLATE: i32 = 2;
/// Input/output failure while the program was running.
pub const EXIT_RUNTIME: i32 = 3;
/// Stopped by ctrl+c.
pub const EXIT_INTERRUPTED: i32 = 130;

/// Resolve a setting: flag -> environment variable -> config file value.
pub fn resolve<T: FromStr>(flag: Option<T>, env_key: &str, config: T) -> T {
    if let Some(v) = flag {
        return v;
    }
    match env::var(env_key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(var = env_key, value = %raw, "ignoring invalid environment value");
            config
        }),
        Err(_) => config,
    }
}
