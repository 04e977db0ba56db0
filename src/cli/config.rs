use std::path::Path;

use collab::Config;
use tracing::instrument;

use super::{parse_date, terminal::Colorize};

const KEYS: &str = "reference_date\n  delimiter";

#[derive(Debug, clap::Parser)]
/// Show or modify configuration
///
/// Configuration is stored in collab.toml (or the file given with --config).
///
/// Available configuration keys:
///   `reference_date`  The date open-ended assignments run until (default:
/// today)
///   delimiter       Field separator of assignment files (default: ',')
pub struct Command {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Debug, clap::Parser)]
enum ConfigCommand {
    /// Show all configuration values
    Show,

    /// Get a specific configuration value
    Get {
        /// Configuration key to retrieve
        ///
        /// Available keys: `reference_date`, delimiter
        key: String,
    },

    /// Set a configuration value
    ///
    /// Examples:
    ///   collab config set `reference_date` 2024-12-31
    ///   collab config set delimiter ';'
    Set {
        /// Configuration key to set
        key: String,

        /// Value to set
        value: String,
    },

    /// Reset a configuration value to its default
    Unset {
        /// Configuration key to reset
        key: String,
    },
}

impl Command {
    #[instrument]
    pub fn run(self, config_path: &Path) -> anyhow::Result<()> {
        let mut config = Config::load_or_default(config_path).map_err(|e| anyhow::anyhow!("{e}"))?;

        match self.command {
            ConfigCommand::Show => Self::show_config(&config),
            ConfigCommand::Get { key } => Self::get_config(&config, &key)?,
            ConfigCommand::Set { key, value } => {
                Self::set_config(&mut config, &key, &value)?;
                config
                    .save(config_path)
                    .map_err(|e| anyhow::anyhow!("{e}"))?;
                println!("Set {key} = {value}");
            }
            ConfigCommand::Unset { key } => {
                Self::unset_config(&mut config, &key)?;
                config
                    .save(config_path)
                    .map_err(|e| anyhow::anyhow!("{e}"))?;
                println!("Reset {key} to its default");
            }
        }
        Ok(())
    }

    fn show_config(config: &Config) {
        println!("Configuration:");
        match config.reference_date() {
            Some(date) => println!("  reference_date: {date}"),
            None => println!("  reference_date: {}", "(today)".dim()),
        }
        println!("  delimiter: {:?}", config.delimiter());
    }

    fn get_config(config: &Config, key: &str) -> anyhow::Result<()> {
        match key {
            "reference_date" => match config.reference_date() {
                Some(date) => println!("{date}"),
                None => println!(),
            },
            "delimiter" => println!("{}", config.delimiter()),
            _ => anyhow::bail!("Unknown configuration key: '{key}'\n\nAvailable keys:\n  {KEYS}"),
        }
        Ok(())
    }

    fn set_config(config: &mut Config, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "reference_date" => {
                let date = parse_date(value).map_err(|e| anyhow::anyhow!("{e}"))?;
                config.set_reference_date(Some(date));
            }
            "delimiter" => {
                let delimiter = match value {
                    "\\t" | "tab" => '\t',
                    _ => {
                        let mut chars = value.chars();
                        match (chars.next(), chars.next()) {
                            (Some(c), None) => c,
                            _ => anyhow::bail!("Value must be a single character"),
                        }
                    }
                };
                config
                    .set_delimiter(delimiter)
                    .map_err(|e| anyhow::anyhow!("{e}"))?;
            }
            _ => anyhow::bail!("Unknown configuration key: '{key}'\n\nSettable keys:\n  {KEYS}"),
        }
        Ok(())
    }

    fn unset_config(config: &mut Config, key: &str) -> anyhow::Result<()> {
        match key {
            "reference_date" => config.set_reference_date(None),
            "delimiter" => config
                .set_delimiter(Config::default().delimiter())
                .map_err(|e| anyhow::anyhow!("{e}"))?,
            _ => anyhow::bail!("Unknown configuration key: '{key}'\n\nAvailable keys:\n  {KEYS}"),
        }
        Ok(())
    }
}
