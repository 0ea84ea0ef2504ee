use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// OS-level color-scheme hint, the stand-in for a
/// `prefers-color-scheme` media query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SystemScheme {
    Light,
    Dark,
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Input HTML page to enhance.
    #[arg(long, conflicts_with = "builtin_page")]
    pub input: Option<PathBuf>,

    /// Use the built-in sample page instead of `--input`.
    #[arg(long)]
    pub builtin_page: bool,

    /// Output path for the enhanced page. Defaults to `enhanced.html`
    /// next to the input (or in the current directory for `--builtin-page`).
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Preference store file (single key-value JSON document).
    #[arg(long, default_value = "theme-state.json")]
    pub state: PathBuf,

    /// System color scheme consumed when no preference is stored.
    #[arg(long, value_enum, default_value = "light")]
    pub system_scheme: SystemScheme,

    /// Number of toggle-control activations to simulate.
    #[arg(long, default_value_t = 0)]
    pub toggle: u32,

    /// Clear the stored preference (after any `--toggle` activations).
    #[arg(long)]
    pub reset: bool,

    /// Subtitle rotator cycles to run when the page has a
    /// `#live-subtitle` element.
    #[arg(long, default_value_t = 0)]
    pub rotate_cycles: u32,

    /// Milliseconds per rotator time unit. Lower values compress the
    /// animation schedule.
    #[arg(long, default_value_t = 1.0)]
    pub tick_ms: f64,
}
