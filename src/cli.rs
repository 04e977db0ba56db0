use std::path::{Path, PathBuf};

mod config;
mod longest;
mod report;
mod terminal;
mod validate;

use anyhow::Context as _;
use chrono::NaiveDate;
use clap::ArgAction;
use collab::{CollaborationReport, Config, DateParser, RawAssignment, SystemClock};
use longest::Longest;
use report::Report;
use tracing::{info, instrument};
use validate::Validate;

/// Parse a `YYYY-MM-DD` date given on the command line.
fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The path to the configuration file
    #[arg(long, default_value = "collab.toml", global = true)]
    config: PathBuf,

    /// The date open-ended assignments run until (YYYY-MM-DD)
    ///
    /// Overrides the configured reference date. Defaults to the current date.
    #[arg(long, value_parser = parse_date, global = true)]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command.run(&self.config, self.today)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Report every pair of employees who worked on a project together
    Report(Report),

    /// Show the pair who worked together the longest
    Longest(Longest),

    /// Check that every date in an assignment file can be read
    Validate(Validate),

    /// Show or modify configuration settings
    Config(config::Command),
}

impl Command {
    fn run(self, config_path: &Path, today: Option<NaiveDate>) -> anyhow::Result<()> {
        match self {
            Self::Report(command) => command.run(&Context::load(config_path, today)?)?,
            Self::Longest(command) => command.run(&Context::load(config_path, today)?)?,
            Self::Validate(command) => command.run(&Context::load(config_path, today)?)?,
            Self::Config(command) => command.run(config_path)?,
        }
        Ok(())
    }
}

/// Settings shared by the commands that read assignment files.
#[derive(Debug)]
pub struct Context {
    config: Config,
    today: Option<NaiveDate>,
}

impl Context {
    fn load(config_path: &Path, today: Option<NaiveDate>) -> anyhow::Result<Self> {
        let config = Config::load_or_default(config_path).map_err(|e| anyhow::anyhow!("{e}"))?;
        Ok(Self { config, today })
    }

    /// A date parser for one computation.
    ///
    /// "Today" comes from the `--today` flag, then the configured reference
    /// date, then the system clock.
    fn date_parser(&self) -> DateParser {
        match self.today.or_else(|| self.config.reference_date()) {
            Some(today) => {
                info!(%today, "using pinned reference date");
                DateParser::with_today(today)
            }
            None => DateParser::new(&SystemClock),
        }
    }

    fn read_assignments(&self, path: &Path) -> anyhow::Result<Vec<RawAssignment>> {
        collab::storage::load_assignments(path, self.config.delimiter_byte())
            .with_context(|| format!("failed to read assignments from {}", path.display()))
    }

    #[instrument(level = "debug", skip(self))]
    fn analyze(&self, path: &Path) -> anyhow::Result<CollaborationReport> {
        let rows = self.read_assignments(path)?;
        let parser = self.date_parser();
        collab::find_collaborations(&rows, &parser)
            .with_context(|| format!("failed to process {}", path.display()))
    }
}
