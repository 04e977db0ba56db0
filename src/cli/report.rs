use std::{io, path::PathBuf};

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use collab::{CollaborationRecord, CollaborationReport};
use serde::Serialize;
use tracing::instrument;

use super::{
    Context,
    longest::print_longest,
    terminal::{Colorize, print_heading, print_table},
};

/// Command arguments for `collab report`.
#[derive(Debug, Parser)]
#[command(about = "Report every pair of employees who worked on a project together")]
pub struct Report {
    /// The assignment file to read.
    file: PathBuf,

    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,

    /// Order of the listed pairs (default: total).
    #[arg(long, value_enum, default_value_t)]
    sort: SortOrder,

    /// Only list pairs who shared at least this many days.
    #[arg(long, value_name = "DAYS")]
    min_days: Option<u64>,

    /// Limit number of pairs listed.
    #[arg(long)]
    limit: Option<usize>,

    /// Suppress headers and format rows for scripting.
    #[arg(long)]
    quiet: bool,
}

/// Supported output formats.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

/// Orders for the listed pairs.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum SortOrder {
    /// Most shared days first; ties keep input order.
    #[default]
    Total,
    /// The order pairs were found in.
    Input,
}

/// The report as written to JSON, with the listed pairs only.
#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    #[serde(rename = "longestCollaboration")]
    longest: &'a CollaborationRecord,

    #[serde(rename = "allCollaborations")]
    all: Vec<&'a CollaborationRecord>,
}

impl Report {
    #[instrument(level = "debug", skip(self, context), fields(file = %self.file.display()))]
    pub fn run(self, context: &Context) -> anyhow::Result<()> {
        let report = context.analyze(&self.file)?;
        let listed = self.listed(&report);

        match self.output {
            OutputFormat::Json => render_json(&report, listed)?,
            OutputFormat::Csv => render_csv(&listed, self.quiet)?,
            OutputFormat::Table if self.quiet => render_quiet(&listed),
            OutputFormat::Table => render_table(&report, &listed),
        }

        Ok(())
    }

    /// The pairs to list, after ordering, filtering and limiting.
    fn listed<'a>(&self, report: &'a CollaborationReport) -> Vec<&'a CollaborationRecord> {
        let ordered = match self.sort {
            SortOrder::Total => report.ranked(),
            SortOrder::Input => report.all().iter().collect(),
        };

        ordered
            .into_iter()
            .filter(|record| self.min_days.is_none_or(|min| record.total_days() >= min))
            .take(self.limit.unwrap_or(usize::MAX))
            .collect()
    }
}

fn render_json(report: &CollaborationReport, listed: Vec<&CollaborationRecord>) -> anyhow::Result<()> {
    let output = JsonReport {
        longest: report.longest(),
        all: listed,
    };
    serde_json::to_writer_pretty(io::stdout(), &output).context("failed to render json output")?;
    println!();
    Ok(())
}

fn render_csv(listed: &[&CollaborationRecord], quiet: bool) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(io::stdout());

    if !quiet {
        writer.write_record(["emp1", "emp2", "totalDays", "projectId", "daysWorked"])?;
    }

    for record in listed {
        let total_days = record.total_days().to_string();
        for project in record.projects() {
            let days_worked = project.days_worked().to_string();
            writer.write_record([
                record.employee_a().as_str(),
                record.employee_b().as_str(),
                total_days.as_str(),
                project.project_id().as_str(),
                days_worked.as_str(),
            ])?;
        }
    }

    writer.flush().context("failed to render csv output")?;
    Ok(())
}

fn render_quiet(listed: &[&CollaborationRecord]) {
    for record in listed {
        println!(
            "{}\t{}\t{}",
            record.employee_a(),
            record.employee_b(),
            record.total_days()
        );
    }
}

fn render_table(report: &CollaborationReport, listed: &[&CollaborationRecord]) {
    if report.is_empty() {
        println!("No collaborations found.");
        return;
    }

    print_longest(report.longest());
    if !shows_all_pairs(report) {
        return;
    }
    println!();

    print_heading("All collaborations");
    if listed.is_empty() {
        println!("{}", "No pairs match the given filters.".dim());
        return;
    }
    print_table(
        &["Employee ID #1", "Employee ID #2", "Total Days", "Projects"],
        &summary_rows(listed),
    );

    let hidden = report.all().len() - listed.len();
    if hidden > 0 {
        println!();
        println!("{}", format!("{hidden} more pairs not shown").dim());
    }
}

/// With a single pair the full listing would only repeat the longest.
fn shows_all_pairs(report: &CollaborationReport) -> bool {
    report.all().len() > 1
}

fn summary_rows(listed: &[&CollaborationRecord]) -> Vec<Vec<String>> {
    listed
        .iter()
        .map(|record| {
            vec![
                record.employee_a().to_string(),
                record.employee_b().to_string(),
                record.total_days().to_string(),
                record.projects().len().to_string(),
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use collab::{DateParser, RawAssignment};

    use super::*;

    fn report() -> CollaborationReport {
        let rows = [
            RawAssignment::new("A", "P1", "2024-01-01", "2024-01-03"),
            RawAssignment::new("B", "P1", "2024-01-01", "2024-01-31"),
            RawAssignment::new("C", "P1", "2024-01-01", "2024-01-10"),
            RawAssignment::new("C", "P2", "2024-02-01", "2024-02-05"),
            RawAssignment::new("B", "P2", "2024-02-01", "2024-02-29"),
        ];
        let parser = DateParser::with_today(chrono::NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        collab::find_collaborations(&rows, &parser).unwrap()
    }

    fn command(args: &[&str]) -> Report {
        let mut argv = vec!["report", "in.csv"];
        argv.extend_from_slice(args);
        Report::try_parse_from(argv).unwrap()
    }

    fn pairs<'a>(listed: &[&'a CollaborationRecord]) -> Vec<(&'a str, &'a str)> {
        listed
            .iter()
            .map(|r| (r.employee_a().as_str(), r.employee_b().as_str()))
            .collect()
    }

    #[test]
    fn single_pair_is_not_listed_twice() {
        let rows = [
            RawAssignment::new("A", "P1", "2024-01-01", "2024-01-03"),
            RawAssignment::new("B", "P1", "2024-01-01", "2024-01-31"),
        ];
        let parser = DateParser::with_today(chrono::NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        let single = collab::find_collaborations(&rows, &parser).unwrap();

        assert!(!shows_all_pairs(&single));
        assert!(shows_all_pairs(&report()));
    }

    #[test]
    fn lists_by_total_by_default() {
        let report = report();

        let listed = command(&[]).listed(&report);

        // B-C: 10 + 5, A-B: 3, A-C: 3
        assert_eq!(pairs(&listed), vec![("B", "C"), ("A", "B"), ("A", "C")]);
    }

    #[test]
    fn lists_in_input_order() {
        let report = report();

        let listed = command(&["--sort", "input"]).listed(&report);

        assert_eq!(pairs(&listed), vec![("A", "B"), ("A", "C"), ("B", "C")]);
    }

    #[test]
    fn filters_and_limits() {
        let report = report();

        assert_eq!(
            pairs(&command(&["--min-days", "4"]).listed(&report)),
            vec![("B", "C")]
        );
        assert_eq!(
            pairs(&command(&["--limit", "2"]).listed(&report)),
            vec![("B", "C"), ("A", "B")]
        );
    }

    #[test]
    fn filters_never_change_the_longest() {
        let report = report();

        let listed = command(&["--min-days", "100"]).listed(&report);

        assert!(listed.is_empty());
        assert_eq!(report.longest().total_days(), 15);
    }

    #[test]
    fn summary_rows_count_projects() {
        let report = report();

        let rows = summary_rows(&report.ranked());

        assert_eq!(rows[0], vec!["B", "C", "15", "2"]);
    }
}
