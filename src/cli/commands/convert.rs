//! Convert command implementation

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cli::error::CliError;
use crate::codec::TextFormat;
use crate::config::MigrationConfig;
use crate::dialect::Dialect;
use crate::migrate::Migrator;

/// Options gathered from the command line
///
/// `None` leaves the value from the config file (or its default) in place.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Input path, `-` or `None` for stdin
    pub input: Option<String>,
    /// Output path, `None` for stdout
    pub output: Option<PathBuf>,
    pub target: Option<Dialect>,
    pub format: Option<TextFormat>,
    /// TOML file holding a [`MigrationConfig`]
    pub config: Option<PathBuf>,
}

/// Load input content from file or stdin
pub fn load_input(input: &str) -> Result<Vec<u8>, CliError> {
    if input == "-" {
        let mut content = Vec::new();
        std::io::stdin()
            .read_to_end(&mut content)
            .map_err(|e| CliError::InvalidArgument(format!("Failed to read stdin: {}", e)))?;
        Ok(content)
    } else {
        let path = PathBuf::from(input);
        std::fs::read(&path).map_err(|e| CliError::FileReadError(path, e.to_string()))
    }
}

/// Load a migration config from a TOML file
pub fn load_config(path: &Path) -> Result<MigrationConfig, CliError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| CliError::FileReadError(path.to_path_buf(), e.to_string()))?;
    toml::from_str(&content).map_err(|e| CliError::ConfigError(path.to_path_buf(), e.to_string()))
}

/// Build the effective config: file values first, then command-line overrides
pub fn resolve_config(options: &ConvertOptions) -> Result<MigrationConfig, CliError> {
    let mut config = match &options.config {
        Some(path) => load_config(path)?,
        None => MigrationConfig::default(),
    };

    if let Some(target) = options.target {
        config.target = target;
    }
    if let Some(format) = options.format {
        config.output_format = format;
    }

    Ok(config)
}

/// Write converted content to a file, or to stdout when no path is given
pub fn write_output(output: Option<&Path>, content: &[u8]) -> Result<(), CliError> {
    match output {
        Some(path) => std::fs::write(path, content)
            .map_err(|e| CliError::FileWriteError(path.to_path_buf(), e.to_string())),
        None => {
            let mut stdout = std::io::stdout().lock();
            let result = stdout.write_all(content).and_then(|_| {
                if content.ends_with(b"\n") {
                    Ok(())
                } else {
                    stdout.write_all(b"\n")
                }
            });
            result
                .and_then(|_| stdout.flush())
                .map_err(|e| CliError::FileWriteError(PathBuf::from("-"), e.to_string()))
        }
    }
}

/// Handle the convert command
pub fn handle_convert(options: &ConvertOptions) -> Result<(), CliError> {
    let config = resolve_config(options)?;
    let migrator = Migrator::new(config)?;

    let input = options.input.as_deref().unwrap_or("-");
    let content = load_input(input)?;
    debug!("Read {} bytes from {}", content.len(), input);

    let converted = migrator.convert(&content)?;
    write_output(options.output.as_deref(), &converted)
}
