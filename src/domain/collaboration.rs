//! Pairwise aggregation of the time employees spent on shared projects.
//!
//! Every employee is compared against every employee seen after them in the
//! input, so each unordered pair is visited exactly once and reported in a
//! fixed orientation: `employee_a` is whichever of the two appeared first.

use std::{collections::HashMap, num::NonZeroU64};

use serde::Serialize;
use tracing::{debug, instrument, warn};

use super::{
    EmployeeId, ProjectId,
    assignment::{ParsedAssignment, ProjectInterval, RawAssignment},
    date::{self, DateParser, DateRole},
};

/// The days a pair of employees spent together on one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectContribution {
    project_id: ProjectId,
    days_worked: NonZeroU64,
}

impl ProjectContribution {
    /// Creates a contribution.
    #[must_use]
    pub const fn new(project_id: ProjectId, days_worked: NonZeroU64) -> Self {
        Self {
            project_id,
            days_worked,
        }
    }

    /// The shared project.
    #[must_use]
    pub const fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    /// The number of days both employees were assigned to the project.
    #[must_use]
    pub const fn days_worked(&self) -> u64 {
        self.days_worked.get()
    }
}

/// The combined overlap, across every shared project, of one pair of
/// employees.
///
/// Each project appears at most once in [`projects`](Self::projects), and
/// [`total_days`](Self::total_days) is always the sum of the per-project days.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollaborationRecord {
    #[serde(rename = "emp1")]
    employee_a: EmployeeId,

    #[serde(rename = "emp2")]
    employee_b: EmployeeId,

    #[serde(rename = "totalDays")]
    total_days: u64,

    projects: Vec<ProjectContribution>,
}

impl CollaborationRecord {
    /// Creates a record for a pair of employees with no shared days yet.
    #[must_use]
    pub const fn new(employee_a: EmployeeId, employee_b: EmployeeId) -> Self {
        Self {
            employee_a,
            employee_b,
            total_days: 0,
            projects: Vec::new(),
        }
    }

    /// The employee of the pair who appeared first in the input.
    #[must_use]
    pub const fn employee_a(&self) -> &EmployeeId {
        &self.employee_a
    }

    /// The employee of the pair who appeared second in the input.
    #[must_use]
    pub const fn employee_b(&self) -> &EmployeeId {
        &self.employee_b
    }

    /// The total number of days the pair worked together, across all projects.
    #[must_use]
    pub const fn total_days(&self) -> u64 {
        self.total_days
    }

    /// The per-project breakdown, in the order each project was first shared.
    #[must_use]
    pub fn projects(&self) -> &[ProjectContribution] {
        &self.projects
    }

    /// Returns `true` if the pair shares no days at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// The number of days the pair shared on a single project.
    #[must_use]
    pub fn days_on(&self, project_id: &str) -> u64 {
        self.projects
            .iter()
            .find(|p| p.project_id.as_str() == project_id)
            .map_or(0, ProjectContribution::days_worked)
    }

    /// Adds shared days on a project.
    ///
    /// Days on a project already in the record are added to its existing
    /// contribution rather than listed again.
    pub fn add_contribution(&mut self, project_id: &ProjectId, days: NonZeroU64) {
        if let Some(existing) = self
            .projects
            .iter_mut()
            .find(|p| &p.project_id == project_id)
        {
            existing.days_worked = existing.days_worked.saturating_add(days.get());
        } else {
            self.projects
                .push(ProjectContribution::new(project_id.clone(), days));
        }
        self.total_days = self.total_days.saturating_add(days.get());
    }
}

/// A date in the input could not be parsed.
///
/// Carries the position of the offending row and which of its date columns
/// failed.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("invalid {field} in record {record}")]
pub struct Error {
    record: usize,
    field: DateRole,
    #[source]
    source: date::Error,
}

impl Error {
    const fn new(record: usize, field: DateRole, source: date::Error) -> Self {
        Self {
            record,
            field,
            source,
        }
    }

    /// The 1-based position of the failing row in the input.
    #[must_use]
    pub const fn record(&self) -> usize {
        self.record
    }

    /// The column that failed to parse.
    #[must_use]
    pub const fn field(&self) -> DateRole {
        self.field
    }

    /// The underlying parse failure.
    #[must_use]
    pub const fn kind(&self) -> &date::Error {
        &self.source
    }
}

/// Resolves the dates of every row.
///
/// Fails on the first row with a missing start date or an unparseable date,
/// reporting its 1-based position.
///
/// # Errors
///
/// Returns an [`Error`] naming the failing record and column.
pub fn parse_assignments(
    rows: &[RawAssignment],
    parser: &DateParser,
) -> Result<Vec<ParsedAssignment>, Error> {
    rows.iter()
        .enumerate()
        .map(|(offset, row)| {
            let record = offset + 1;
            let start = parser
                .parse(&row.date_from, DateRole::From)
                .map_err(|source| Error::new(record, DateRole::From, source))?;
            let end = parser
                .parse(&row.date_to, DateRole::To)
                .map_err(|source| Error::new(record, DateRole::To, source))?;

            Ok(ParsedAssignment {
                employee_id: EmployeeId::new(&row.employee_id),
                project_id: ProjectId::new(&row.project_id),
                start,
                end,
            })
        })
        .collect()
}

/// Parsed intervals grouped by employee, in the order employees first appear.
#[derive(Debug, Default)]
struct EmployeeIndex {
    employees: Vec<(EmployeeId, Vec<ProjectInterval>)>,
    position: HashMap<EmployeeId, usize>,
}

impl EmployeeIndex {
    fn build(rows: &[RawAssignment], parser: &DateParser) -> Result<Self, Error> {
        let mut index = Self::default();

        for (offset, assignment) in parse_assignments(rows, parser)?.into_iter().enumerate() {
            match assignment.interval() {
                Some(interval) => index.intervals_mut(assignment.employee_id).push(interval),
                None => {
                    warn!(
                        record = offset + 1,
                        employee = %assignment.employee_id,
                        start = %assignment.start,
                        end = %assignment.end,
                        "assignment ends before it starts, ignoring"
                    );
                    index.intervals_mut(assignment.employee_id);
                }
            }
        }

        Ok(index)
    }

    fn intervals_mut(&mut self, employee: EmployeeId) -> &mut Vec<ProjectInterval> {
        let position = self.position.get(&employee).copied().unwrap_or_else(|| {
            let position = self.employees.len();
            self.position.insert(employee.clone(), position);
            self.employees.push((employee, Vec::new()));
            position
        });
        &mut self.employees[position].1
    }
}

/// Computes the shared project time of every pair of employees.
///
/// Returns one record per pair that shared at least one day, in pair
/// enumeration order: pairs are visited as `(i, j)` with `i < j` over the
/// employees in order of first appearance.
///
/// # Errors
///
/// Returns an error if any row has a missing start date or an unparseable
/// date. No records are produced in that case.
#[instrument(level = "debug", skip_all, fields(rows = rows.len()))]
pub fn aggregate(
    rows: &[RawAssignment],
    parser: &DateParser,
) -> Result<Vec<CollaborationRecord>, Error> {
    let index = EmployeeIndex::build(rows, parser)?;
    let employees = &index.employees;
    debug!(employees = employees.len(), "indexed assignments");

    let mut records = Vec::new();
    for (i, (employee_a, intervals_a)) in employees.iter().enumerate() {
        for (employee_b, intervals_b) in &employees[i + 1..] {
            if let Some(record) = collaborate(employee_a, intervals_a, employee_b, intervals_b) {
                records.push(record);
            }
        }
    }

    debug!(pairs = records.len(), "found collaborating pairs");
    Ok(records)
}

fn collaborate(
    employee_a: &EmployeeId,
    intervals_a: &[ProjectInterval],
    employee_b: &EmployeeId,
    intervals_b: &[ProjectInterval],
) -> Option<CollaborationRecord> {
    let mut record = CollaborationRecord::new(employee_a.clone(), employee_b.clone());

    for a in intervals_a {
        for b in intervals_b {
            if let Some(days) = NonZeroU64::new(a.shared_days(b)) {
                record.add_contribution(a.project_id(), days);
            }
        }
    }

    (!record.is_empty()).then_some(record)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn parser() -> DateParser {
        DateParser::with_today(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap())
    }

    fn row(employee: &str, project: &str, from: &str, to: &str) -> RawAssignment {
        RawAssignment::new(employee, project, from, to)
    }

    fn days(n: u64) -> NonZeroU64 {
        NonZeroU64::new(n).unwrap()
    }

    fn assert_totals_consistent(records: &[CollaborationRecord]) {
        for record in records {
            let sum: u64 = record.projects().iter().map(ProjectContribution::days_worked).sum();
            assert_eq!(record.total_days(), sum);
            assert_ne!(record.employee_a(), record.employee_b());
        }
    }

    #[test]
    fn contributions_to_same_project_are_summed() {
        let mut record = CollaborationRecord::new("E1".into(), "E2".into());
        record.add_contribution(&"P1".into(), days(4));
        record.add_contribution(&"P2".into(), days(2));
        record.add_contribution(&"P1".into(), days(3));

        assert_eq!(record.total_days(), 9);
        assert_eq!(record.projects().len(), 2);
        assert_eq!(record.days_on("P1"), 7);
        assert_eq!(record.days_on("P2"), 2);
        assert_eq!(record.days_on("P3"), 0);
    }

    #[test]
    fn two_employees_one_project() {
        let rows = [
            row("E1", "P1", "2023-01-01", "2023-01-10"),
            row("E2", "P1", "2023-01-05", "2023-01-15"),
        ];

        let records = aggregate(&rows, &parser()).unwrap();

        let mut expected = CollaborationRecord::new("E1".into(), "E2".into());
        expected.add_contribution(&"P1".into(), days(6));
        assert_eq!(records, vec![expected]);
    }

    #[test]
    fn projects_of_one_pair_merge_into_one_record() {
        let rows = [
            row("E1", "P1", "2023-01-01", "2023-01-10"),
            row("E2", "P1", "2023-01-05", "2023-01-15"),
            row("E1", "P2", "2023-02-01", "2023-02-05"),
            row("E2", "P2", "2023-02-03", "2023-02-10"),
        ];

        let records = aggregate(&rows, &parser()).unwrap();

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.employee_a().as_str(), "E1");
        assert_eq!(record.employee_b().as_str(), "E2");
        assert_eq!(record.total_days(), 9);
        let projects: Vec<_> = record
            .projects()
            .iter()
            .map(|p| (p.project_id().as_str(), p.days_worked()))
            .collect();
        assert_eq!(projects, vec![("P1", 6), ("P2", 3)]);
    }

    #[test]
    fn repeated_overlaps_on_one_project_are_not_duplicated() {
        // E1 was assigned to P1 twice; both stints overlap E2's single stint.
        let rows = [
            row("E1", "P1", "2024-01-01", "2024-01-10"),
            row("E1", "P1", "2024-01-20", "2024-01-31"),
            row("E2", "P1", "2024-01-05", "2024-01-25"),
        ];

        let records = aggregate(&rows, &parser()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].projects().len(), 1);
        assert_eq!(records[0].days_on("P1"), 12);
        assert_eq!(records[0].total_days(), 12);
    }

    #[test]
    fn duplicate_rows_are_counted_once_per_row() {
        let rows = [
            row("E1", "P1", "2024-01-01", "2024-01-10"),
            row("E1", "P1", "2024-01-01", "2024-01-10"),
            row("E2", "P1", "2024-01-01", "2024-01-10"),
        ];

        let records = aggregate(&rows, &parser()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].projects().len(), 1);
        assert_eq!(records[0].total_days(), 20);
    }

    #[test]
    fn pair_orientation_follows_first_appearance() {
        let rows = [
            row("E9", "P1", "2024-01-01", "2024-01-10"),
            row("E1", "P1", "2024-01-01", "2024-01-10"),
        ];

        let records = aggregate(&rows, &parser()).unwrap();

        assert_eq!(records[0].employee_a().as_str(), "E9");
        assert_eq!(records[0].employee_b().as_str(), "E1");
    }

    #[test]
    fn pairs_are_enumerated_in_order() {
        let rows = [
            row("A", "P", "2024-01-01", "2024-01-31"),
            row("B", "P", "2024-01-01", "2024-01-31"),
            row("C", "P", "2024-01-01", "2024-01-31"),
        ];

        let records = aggregate(&rows, &parser()).unwrap();

        let pairs: Vec<_> = records
            .iter()
            .map(|r| (r.employee_a().as_str(), r.employee_b().as_str()))
            .collect();
        assert_eq!(pairs, vec![("A", "B"), ("A", "C"), ("B", "C")]);
        assert_totals_consistent(&records);
    }

    #[test]
    fn an_employee_never_pairs_with_themself() {
        let rows = [
            row("E1", "P1", "2024-01-01", "2024-01-10"),
            row("E1", "P1", "2024-01-05", "2024-01-15"),
        ];

        assert!(aggregate(&rows, &parser()).unwrap().is_empty());
    }

    #[test]
    fn identifiers_are_trimmed_before_grouping() {
        let rows = [
            row(" E1", "P1 ", "2024-01-01", "2024-01-10"),
            row("E1 ", " P2", "2024-01-01", "2024-01-10"),
            row("E2", "P1", "2024-01-01", "2024-01-01"),
            row("E2", "P2", "2024-01-10", "2024-01-10"),
        ];

        let records = aggregate(&rows, &parser()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].total_days(), 2);
    }

    #[test]
    fn pairs_without_overlap_are_omitted() {
        let rows = [
            row("E1", "P1", "2024-01-01", "2024-01-05"),
            row("E2", "P1", "2024-01-06", "2024-01-10"),
            row("E3", "P2", "2024-01-01", "2024-01-10"),
        ];

        assert!(aggregate(&rows, &parser()).unwrap().is_empty());
    }

    #[test]
    fn null_end_runs_through_today() {
        let rows = [
            row("E1", "P1", "2024-06-01", "NULL"),
            row("E2", "P1", "2024-06-21", ""),
        ];

        let records = aggregate(&rows, &parser()).unwrap();

        // 21st to 30th of June inclusive.
        assert_eq!(records[0].total_days(), 10);
    }

    #[test]
    fn results_are_stable_with_a_frozen_clock() {
        let rows = [
            row("E1", "P1", "2024-06-01", "null"),
            row("E2", "P1", "2024-05-01", "null"),
        ];

        let first = aggregate(&rows, &parser()).unwrap();
        let second = aggregate(&rows, &parser()).unwrap();

        assert_eq!(first, second);
        assert_eq!(first[0].total_days(), 30);
    }

    #[test]
    fn inverted_assignment_is_ignored() {
        let rows = [
            row("E1", "P1", "2024-01-10", "2024-01-01"),
            row("E2", "P1", "2024-01-01", "2024-01-31"),
            row("E1", "P2", "2024-01-01", "2024-01-02"),
            row("E2", "P2", "2024-01-01", "2024-01-31"),
        ];

        let records = aggregate(&rows, &parser()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].days_on("P1"), 0);
        assert_eq!(records[0].total_days(), 2);
    }

    #[test]
    fn missing_start_aborts_the_batch() {
        let rows = [
            row("E1", "P1", "2023-01-01", "2023-01-10"),
            row("E2", "P1", "2023-01-05", "2023-01-15"),
            row("E3", "P1", "null", "2023-01-15"),
        ];

        let error = aggregate(&rows, &parser()).unwrap_err();

        assert_eq!(error.record(), 3);
        assert_eq!(error.field(), DateRole::From);
        assert_eq!(error.kind(), &date::Error::MissingStartDate);
    }

    #[test]
    fn invalid_end_reports_field_and_value() {
        let rows = [row("E1", "P1", "2023-01-01", "someday")];

        let error = aggregate(&rows, &parser()).unwrap_err();

        assert_eq!(error.record(), 1);
        assert_eq!(error.field(), DateRole::To);
        assert_eq!(
            error.kind(),
            &date::Error::InvalidDateFormat("someday".to_string())
        );
        assert_eq!(error.to_string(), "invalid DateTo in record 1");
    }

    #[test]
    fn parsed_rows_are_trimmed_and_resolved() {
        let rows = [row(" E1 ", "P1 ", "2024-01-05", "null")];

        let parsed = parse_assignments(&rows, &parser()).unwrap();

        assert_eq!(
            parsed,
            vec![ParsedAssignment {
                employee_id: "E1".into(),
                project_id: "P1".into(),
                start: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
                end: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
            }]
        );
    }

    #[test]
    fn empty_input_has_no_records() {
        assert!(aggregate(&[], &parser()).unwrap().is_empty());
    }

    #[test]
    fn totals_match_project_breakdown() {
        let rows = [
            row("E1", "P1", "2023-01-01", "2023-03-31"),
            row("E1", "P2", "2023-02-01", "2023-05-31"),
            row("E2", "P1", "2023-01-15", "2023-02-15"),
            row("E2", "P2", "2023-03-01", "2023-03-31"),
            row("E3", "P1", "2023-02-01", "2023-04-30"),
            row("E3", "P2", "2023-01-01", "2023-12-31"),
            row("E2", "P1", "2023-03-01", "2023-03-05"),
        ];

        let records = aggregate(&rows, &parser()).unwrap();

        assert_eq!(records.len(), 3);
        assert_totals_consistent(&records);
    }

    #[test]
    fn serializes_in_the_established_shape() {
        let mut record = CollaborationRecord::new("143".into(), "218".into());
        record.add_contribution(&"10".into(), days(12));

        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "emp1": "143",
                "emp2": "218",
                "totalDays": 12,
                "projects": [{ "projectId": "10", "daysWorked": 12 }],
            })
        );
    }
}
