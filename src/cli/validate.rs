use std::{collections::HashSet, path::PathBuf};

use anyhow::Context as _;
use clap::Parser;
use collab::{AggregateError, DateParser, RawAssignment, domain::parse_assignments};
use serde::Serialize;
use tracing::instrument;

use super::{
    Context,
    terminal::{Colorize, print_heading},
};

#[derive(Debug, Parser)]
#[command(about = "Check that every date in an assignment file can be read")]
pub struct Validate {
    /// The assignment file to read.
    file: PathBuf,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Suppress all output except errors
    #[arg(long, short)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// What a readable assignment file contains.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
struct Summary {
    rows: usize,
    employees: usize,
    projects: usize,
    open_ended: usize,
    inverted: usize,
}

impl Validate {
    #[instrument(level = "debug", skip(self, context), fields(file = %self.file.display()))]
    pub fn run(self, context: &Context) -> anyhow::Result<()> {
        let rows = context.read_assignments(&self.file)?;
        let summary = summarize(&rows, &context.date_parser())
            .with_context(|| format!("failed to process {}", self.file.display()))?;

        if self.quiet {
            return Ok(());
        }

        match self.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
            OutputFormat::Table => print_summary(&summary),
        }

        Ok(())
    }
}

/// Parses every date, without comparing anyone, and counts what was found.
fn summarize(rows: &[RawAssignment], parser: &DateParser) -> Result<Summary, AggregateError> {
    let assignments = parse_assignments(rows, parser)?;
    let mut employees = HashSet::new();
    let mut projects = HashSet::new();
    let mut summary = Summary {
        rows: rows.len(),
        open_ended: rows
            .iter()
            .filter(|row| DateParser::is_null(&row.date_to))
            .count(),
        ..Summary::default()
    };

    for assignment in assignments {
        if assignment.interval().is_none() {
            summary.inverted += 1;
        }
        employees.insert(assignment.employee_id);
        projects.insert(assignment.project_id);
    }

    summary.employees = employees.len();
    summary.projects = projects.len();
    Ok(summary)
}

fn print_summary(summary: &Summary) {
    print_heading("Assignment file");
    println!("{:<12} {}", "Rows", summary.rows);
    println!("{:<12} {}", "Employees", summary.employees);
    println!("{:<12} {}", "Projects", summary.projects);
    println!("{:<12} {}", "Open-ended", summary.open_ended);
    println!();

    if summary.inverted == 0 {
        println!("{} ✅", "All dates are valid".success());
    } else {
        println!(
            "Assignments ending before they start: {} ⚠️",
            summary.inverted.to_string().warning()
        );
        println!("{}", "These rows will be ignored.".dim());
    }
}
