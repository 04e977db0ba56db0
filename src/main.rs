//! Command-line interface for finding the employees who worked together the
//! longest.

use clap::Parser;

mod cli;
use cli::Cli;

fn main() -> anyhow::Result<()> {
    Cli::parse().run()
}
