//! openapi-migrate command line tool

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser};

use openapi_migrate::cli::commands::{ConvertOptions, handle_convert};
use openapi_migrate::{Dialect, TextFormat};

/// Convert API descriptions between Swagger 2.0, OpenAPI 3.0 and OpenAPI 3.1
#[derive(Parser, Debug)]
#[command(name = "openapi-migrate", author, version, about, long_about = None)]
struct Args {
    /// Input document (JSON or YAML); `-` reads stdin
    input: Option<String>,

    /// Write the result to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Target dialect: swagger, 3.0 or 3.1 [default: 3.1]
    #[arg(short, long, value_name = "VERSION")]
    target: Option<Dialect>,

    /// Output notation: json or yaml [default: json]
    #[arg(short, long, value_name = "FORMAT")]
    format: Option<TextFormat>,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn run(args: Args) -> Result<()> {
    let options = ConvertOptions {
        input: args.input,
        output: args.output,
        target: args.target,
        format: args.format,
        config: args.config,
    };
    handle_convert(&options)?;
    Ok(())
}

fn main() {
    let args = Args::parse();

    if args.input.is_none() && std::io::stdin().is_terminal() {
        let _ = Args::command().print_help();
        std::process::exit(1);
    }

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
