//! `l3p` – L3 perception replay tool
//!
//! Runs recorded camera, radar and localization messages through the
//! obstacle converters and prints the merged obstacle lists planning would
//! receive.
//!
//! ```text
//! l3p replay <messages.ndjson> [--config <path>]
//! l3p schema
//! l3p config [--config <path>]
//! ```
//!
//! Without `--config` the configuration is read from `L3P_CONFIG` or
//! `~/.l3p/config.toml`; a missing file means built-in defaults.

mod replay;

use colored::Colorize;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use tracing::{error, info};

use l3p_perception::config::{self, ConversionConfig};
use l3p_perception::PerceptionPipeline;
use l3p_types::PerceptionObstacles;

/// Parsed command line.
#[derive(Debug, Clone, PartialEq)]
enum Command {
    Replay { input: PathBuf, config: Option<PathBuf> },
    Schema,
    Config { config: Option<PathBuf> },
    Help,
}

fn main() {
    // ── Structured logging ────────────────────────────────────────────────
    // RUST_LOG filters (default "info"); L3P_LOG_FORMAT=json emits
    // newline-delimited JSON.  Logs go to stderr so stdout stays a clean
    // obstacle stream.
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if std::env::var("L3P_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(io::stderr)
            .compact()
            .init();
    }

    let command = match parse_args(std::env::args().skip(1)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}: {}", "Usage error".red(), e);
            print_usage();
            std::process::exit(2);
        }
    };

    let result = match command {
        Command::Replay { input, config } => cmd_replay(&input, config),
        Command::Schema => cmd_schema(),
        Command::Config { config } => cmd_config(config),
        Command::Help => {
            print_usage();
            Ok(())
        }
    };

    if let Err(e) = result {
        error!(error = %e, "l3p failed");
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Command handlers
// ─────────────────────────────────────────────────────────────────────────────

fn cmd_replay(input: &Path, config_path: Option<PathBuf>) -> Result<(), String> {
    let cfg = load_config(config_path)?;
    let file = File::open(input)
        .map_err(|e| format!("Failed to open {}: {}", input.display(), e))?;

    info!(input = %input.display(), "replaying sensor messages");
    let mut pipeline = PerceptionPipeline::new(cfg);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let stats = replay::replay(BufReader::new(file), &mut out, &mut pipeline)
        .map_err(|e| e.to_string())?;

    eprintln!();
    eprintln!("  {} {}", "✓".green().bold(), "Replay finished".bold());
    eprintln!("    localization : {}", stats.localization);
    eprintln!("    camera       : {}", stats.camera);
    eprintln!("    radar        : {}", stats.radar);
    eprintln!("    published    : {}", stats.published.to_string().green());
    if stats.skipped > 0 {
        eprintln!("    skipped      : {}", stats.skipped.to_string().yellow());
    }
    Ok(())
}

fn cmd_schema() -> Result<(), String> {
    let schema = schemars::schema_for!(PerceptionObstacles);
    let json = serde_json::to_string_pretty(&schema)
        .map_err(|e| format!("Failed to serialize schema: {}", e))?;
    println!("{json}");
    Ok(())
}

fn cmd_config(config_path: Option<PathBuf>) -> Result<(), String> {
    let cfg = load_config(config_path)?;
    print!("{}", config::to_toml(&cfg).map_err(|e| e.to_string())?);
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn load_config(explicit: Option<PathBuf>) -> Result<ConversionConfig, String> {
    let path = explicit.unwrap_or_else(default_config_path);
    match config::load(&path).map_err(|e| e.to_string())? {
        Some(cfg) => {
            info!(path = %path.display(), "config loaded");
            Ok(cfg)
        }
        None => {
            info!(path = %path.display(), "no config file; using defaults");
            let mut cfg = ConversionConfig::default();
            config::apply_env_overrides(&mut cfg);
            cfg.validate().map_err(|e| e.to_string())?;
            Ok(cfg)
        }
    }
}

/// `L3P_CONFIG` if set, otherwise `~/.l3p/config.toml`.
fn default_config_path() -> PathBuf {
    if let Ok(p) = std::env::var("L3P_CONFIG") {
        return PathBuf::from(p);
    }
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".l3p").join("config.toml")
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Command, String> {
    let mut args = args.into_iter();
    let Some(sub) = args.next() else {
        return Ok(Command::Help);
    };

    let mut positional = Vec::new();
    let mut config = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let value = args.next().ok_or("--config needs a path")?;
                config = Some(PathBuf::from(value));
            }
            flag if flag.starts_with('-') => return Err(format!("unknown flag '{flag}'")),
            _ => positional.push(arg),
        }
    }

    match sub.as_str() {
        "replay" => match positional.as_slice() {
            [input] => Ok(Command::Replay {
                input: PathBuf::from(input),
                config,
            }),
            [] => Err("replay needs an input file".to_string()),
            _ => Err("replay takes exactly one input file".to_string()),
        },
        "schema" => Ok(Command::Schema),
        "config" => Ok(Command::Config { config }),
        "help" | "--help" | "-h" => Ok(Command::Help),
        other => Err(format!("unknown command '{other}'")),
    }
}

fn print_usage() {
    eprintln!();
    eprintln!("{}", "l3p – L3 perception replay".bold().underline());
    eprintln!("  {} <messages.ndjson> [--config <path>]  – convert a recorded stream", "replay".bold().cyan());
    eprintln!("  {}                                      – print the obstacle JSON schema", "schema".bold().cyan());
    eprintln!("  {} [--config <path>]                    – print the effective config", "config".bold().cyan());
    eprintln!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_arguments_shows_help() {
        assert_eq!(parse_args(args(&[])), Ok(Command::Help));
    }

    #[test]
    fn replay_with_config() {
        let cmd = parse_args(args(&["replay", "run.ndjson", "--config", "cal.toml"])).unwrap();
        assert_eq!(
            cmd,
            Command::Replay {
                input: PathBuf::from("run.ndjson"),
                config: Some(PathBuf::from("cal.toml")),
            }
        );
    }

    #[test]
    fn replay_requires_one_input() {
        assert!(parse_args(args(&["replay"])).is_err());
        assert!(parse_args(args(&["replay", "a", "b"])).is_err());
    }

    #[test]
    fn unknown_command_and_flag_are_errors() {
        assert!(parse_args(args(&["fuse"])).is_err());
        assert!(parse_args(args(&["schema", "--verbose"])).is_err());
        assert!(parse_args(args(&["config", "--config"])).is_err());
    }

    #[test]
    fn config_path_points_to_l3p_dir() {
        let p = config_path_for_home("/home/testuser");
        assert!(p.to_string_lossy().contains(".l3p"));
        assert!(p.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn explicit_missing_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let cfg = load_config(Some(dir.path().join("absent.toml"))).expect("defaults");
        assert_eq!(cfg.dimensions, ConversionConfig::default().dimensions);
    }
}
