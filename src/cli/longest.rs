use std::{io, path::PathBuf};

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use collab::CollaborationRecord;
use tracing::instrument;

use super::{
    Context,
    terminal::{Colorize, print_heading, print_table},
};

#[derive(Debug, Parser)]
#[command(about = "Show the pair who worked together the longest")]
pub struct Longest {
    /// The assignment file to read.
    file: PathBuf,

    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Longest {
    #[instrument(level = "debug", skip(self, context), fields(file = %self.file.display()))]
    pub fn run(self, context: &Context) -> anyhow::Result<()> {
        let report = context.analyze(&self.file)?;

        match self.output {
            OutputFormat::Json => {
                serde_json::to_writer_pretty(io::stdout(), report.longest())
                    .context("failed to render json output")?;
                println!();
            }
            OutputFormat::Table if report.is_empty() => println!("No collaborations found."),
            OutputFormat::Table => print_longest(report.longest()),
        }

        Ok(())
    }
}

/// Prints a pair's summary and its per-project breakdown.
pub fn print_longest(record: &CollaborationRecord) {
    print_heading("Longest collaboration");
    println!(
        "Employee IDs: {}, {}",
        record.employee_a().as_str().info(),
        record.employee_b().as_str().info()
    );
    println!("Total days worked together: {}", record.total_days());
    println!();

    print_table(
        &["Employee ID #1", "Employee ID #2", "Project ID", "Days Worked"],
        &project_rows(record),
    );
}

fn project_rows(record: &CollaborationRecord) -> Vec<Vec<String>> {
    record
        .projects()
        .iter()
        .map(|project| {
            vec![
                record.employee_a().to_string(),
                record.employee_b().to_string(),
                project.project_id().to_string(),
                project.days_worked().to_string(),
            ]
        })
        .collect()
}
