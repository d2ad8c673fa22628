use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "shaderbox-view",
    author,
    version,
    about = "Preview a GLSL program on a full-window quad",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug, Default, Clone)]
pub struct RunArgs {
    /// Vertex shader source; the bundled pass-through shader is used when omitted.
    #[arg(long, value_name = "PATH")]
    pub vertex: Option<PathBuf>,

    /// Fragment shader source; the bundled demo shader is used when omitted.
    #[arg(long, value_name = "PATH")]
    pub fragment: Option<PathBuf>,

    /// TOML configuration file; can also be supplied via the `SHADERBOX_CONFIG` env var.
    #[arg(long, value_name = "FILE", env = "SHADERBOX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Initial window size in logical pixels (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<WindowSize>,

    /// Drawing-buffer pixels per logical pixel; defaults to the monitor's scale factor.
    #[arg(long, value_name = "FACTOR", value_parser = parse_scale)]
    pub scale: Option<f64>,

    /// Request a context without multisampling.
    #[arg(long)]
    pub no_antialias: bool,

    /// Declare an additional uniform (repeatable).
    #[arg(long = "uniform", value_name = "NAME")]
    pub uniforms: Vec<String>,

    /// Multiplier applied to elapsed seconds before they reach `iTime`.
    #[arg(long, value_name = "FACTOR")]
    pub time_scale: Option<f64>,

    /// Freeze animation at `iTime = 0`.
    #[arg(long)]
    pub reduced_motion: bool,

    /// Window title.
    #[arg(long)]
    pub title: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the resolved configuration as TOML and exit.
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_size(value: &str) -> Result<WindowSize, String> {
    let trimmed = value.trim();
    let (width, height) = trimmed
        .split_once(['x', 'X', '×'])
        .ok_or_else(|| "expected WIDTHxHEIGHT, e.g. 1280x720".to_string())?;
    let width = width
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid width '{}'", width.trim()))?;
    let height = height
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid height '{}'", height.trim()))?;
    if width == 0 || height == 0 {
        return Err("window dimensions must be greater than zero".into());
    }
    Ok(WindowSize { width, height })
}

pub fn parse_scale(value: &str) -> Result<f64, String> {
    let trimmed = value.trim();
    let scale: f64 = trimmed
        .parse()
        .map_err(|_| format!("invalid scale '{trimmed}'"))?;
    if !scale.is_finite() || scale <= 0.0 {
        return Err("scale must be a positive number".into());
    }
    Ok(scale)
}
