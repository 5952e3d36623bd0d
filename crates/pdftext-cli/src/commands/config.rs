//! Config command - inspect and seed the loader configuration.
//!
//! Library names resolve in three layers: the config file (explicit
//! `--config`, else the per-user default, else built-in names), then the
//! `PDFTEXT_PDFIUM_*` environment variables, then command-line flags.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;

use pdftext_core::LoaderConfig;
use pdftext_core::config::{FALLBACK_LIBRARY_ENV, PRIMARY_LIBRARY_ENV};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show the configured library names
    Show(ShowArgs),

    /// Write a configuration file, optionally seeded with library names
    Init(InitArgs),

    /// Show where the configuration comes from
    Path,
}

#[derive(Args)]
struct ShowArgs {
    /// Apply environment overrides, as the JNI library does at load time
    #[arg(long)]
    resolved: bool,
}

#[derive(Args)]
struct InitArgs {
    /// Output path for configuration file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Primary PDFium library to record
    #[arg(long)]
    library: Option<String>,

    /// Fallback PDFium library to record
    #[arg(long)]
    fallback: Option<String>,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,
}

/// Where the file layer of the configuration was read from.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    Explicit(PathBuf),
    UserFile(PathBuf),
    BuiltIn,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Explicit(path) => write!(f, "{} (--config)", path.display()),
            ConfigSource::UserFile(path) => write!(f, "{}", path.display()),
            ConfigSource::BuiltIn => write!(f, "built-in defaults"),
        }
    }
}

pub fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show(show_args) => show_config(show_args, config_path),
        ConfigCommand::Init(init_args) => init_config(init_args, config_path),
        ConfigCommand::Path => show_sources(config_path),
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pdftext")
        .join("config.json")
}

/// Load the file layer and report which source supplied it.
pub fn load(config_path: Option<&str>) -> anyhow::Result<(LoaderConfig, ConfigSource)> {
    if let Some(path) = config_path {
        let path = PathBuf::from(path);
        return Ok((LoaderConfig::from_file(&path)?, ConfigSource::Explicit(path)));
    }

    let path = default_config_path();
    if path.exists() {
        Ok((LoaderConfig::from_file(&path)?, ConfigSource::UserFile(path)))
    } else {
        Ok((LoaderConfig::default(), ConfigSource::BuiltIn))
    }
}

fn show_config(args: ShowArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let (mut config, _) = load(config_path)?;
    if args.resolved {
        config = config.with_env_overrides();
    }
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn init_config(args: InitArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let output_path = args
        .output
        .or_else(|| config_path.map(PathBuf::from))
        .unwrap_or_else(default_config_path);

    if output_path.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            output_path.display()
        );
    }

    let config = LoaderConfig::default().with_overrides(args.library, args.fallback);
    write_config(&config, &output_path)?;

    println!(
        "{} Wrote {} (primary {}, fallback {})",
        style("✓").green(),
        output_path.display(),
        config.primary_library,
        config.fallback_library
    );

    Ok(())
}

fn write_config(config: &LoaderConfig, path: &Path) -> anyhow::Result<()> {
    // Parent directory may not exist yet
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    config.save(path)?;
    Ok(())
}

fn show_sources(config_path: Option<&str>) -> anyhow::Result<()> {
    let (config, source) = load(config_path)?;

    println!("Config file: {}", source);
    if source == ConfigSource::BuiltIn {
        println!(
            "  {} run 'pdftext config init' to create {}",
            style("hint:").yellow(),
            default_config_path().display()
        );
    }

    for (var, configured) in [
        (PRIMARY_LIBRARY_ENV, &config.primary_library),
        (FALLBACK_LIBRARY_ENV, &config.fallback_library),
    ] {
        match std::env::var(var).ok().filter(|v| !v.is_empty()) {
            Some(value) => println!(
                "{}: {} (overrides {})",
                var,
                style(value).green(),
                configured
            ),
            None => println!("{}: {}", var, style("unset").dim()),
        }
    }

    let resolved = config.with_env_overrides();
    println!(
        "Resolved: {} then {}",
        resolved.primary_library, resolved.fallback_library
    );

    Ok(())
}
