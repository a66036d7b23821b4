//! Print the OpenAPI document.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use courseware::ApiDoc;
use utoipa::OpenApi;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum Format {
    #[default]
    Json,
    Yaml,
}

/// `openapi-dump` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(name = "openapi-dump", about = "Print the courseware OpenAPI document", version)]
struct CliArgs {
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,
    /// Write to this file instead of stdout.
    #[arg(long, value_name = "path")]
    output: Option<PathBuf>,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = CliArgs::parse();
    let document = ApiDoc::openapi();
    let rendered = match args.format {
        Format::Json => document.to_pretty_json()?,
        Format::Yaml => document.to_yaml()?,
    };
    match args.output {
        Some(path) => std::fs::write(path, format!("{rendered}\n"))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{rendered}")?;
        }
    }
    Ok(())
}
