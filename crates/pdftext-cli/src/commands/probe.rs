//! Probe command - load PDFium the way the bridge does and report the outcome.

use clap::Args;
use console::style;
use serde::Serialize;
use tracing::info;

use pdftext_core::pdfium::REQUIRED_SYMBOLS;
use pdftext_core::{DynamicSource, LoadError, Loader};

/// Arguments for the probe command.
#[derive(Args)]
pub struct ProbeArgs {
    /// Primary library name or path (overrides config and environment)
    #[arg(short, long)]
    library: Option<String>,

    /// Fallback library name or path (overrides config and environment)
    #[arg(short, long)]
    fallback: Option<String>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct ProbeReport {
    primary_library: String,
    fallback_library: String,
    loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    library: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    missing_symbols: Vec<&'static str>,
}

pub fn run(args: ProbeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let (config, _) = super::config::load(config_path)?;
    let config = config
        .with_env_overrides()
        .with_overrides(args.library, args.fallback);

    info!(
        "Probing {} (fallback {})",
        config.primary_library, config.fallback_library
    );

    let loader = Loader::new(DynamicSource::new(config.clone()));
    let mut report = ProbeReport {
        primary_library: config.primary_library,
        fallback_library: config.fallback_library,
        loaded: false,
        library: None,
        error: None,
        missing_symbols: Vec::new(),
    };

    match loader.status() {
        Ok(library) => {
            report.loaded = true;
            report.library = Some(library.name().to_string());
        }
        Err(e) => {
            report.error = Some(e.to_string());
            if let LoadError::MissingSymbols { missing, .. } = e {
                report.missing_symbols = missing.clone();
            }
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if !report.loaded {
        anyhow::bail!("PDFium text backend unavailable");
    }
    Ok(())
}

fn print_report(report: &ProbeReport) {
    println!("Primary:  {}", report.primary_library);
    println!("Fallback: {}", report.fallback_library);
    println!();

    if let Some(library) = &report.library {
        println!("{} Loaded {}", style("✓").green(), library);
        for symbol in REQUIRED_SYMBOLS {
            println!("  {} {}", style("✓").green(), symbol);
        }
        return;
    }

    if let Some(error) = &report.error {
        println!("{} {}", style("✗").red(), error);
    }
    for symbol in REQUIRED_SYMBOLS {
        if report.missing_symbols.contains(&symbol) {
            println!("  {} {}", style("✗").red(), symbol);
        }
    }
}
