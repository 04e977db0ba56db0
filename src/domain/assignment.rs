use chrono::NaiveDate;
use serde::Deserialize;

use super::{EmployeeId, ProjectId, overlap::overlap_days};

/// One input row: an employee's assignment to a project, with undecoded
/// dates.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawAssignment {
    /// The employee identifier.
    #[serde(rename = "EmpID")]
    pub employee_id: String,

    /// The project identifier.
    #[serde(rename = "ProjectID")]
    pub project_id: String,

    /// The first day of the assignment.
    #[serde(rename = "DateFrom")]
    pub date_from: String,

    /// The last day of the assignment, or NULL if it is still ongoing.
    #[serde(rename = "DateTo")]
    pub date_to: String,
}

impl RawAssignment {
    /// Creates a row from its four fields.
    #[must_use]
    pub fn new(
        employee_id: impl Into<String>,
        project_id: impl Into<String>,
        date_from: impl Into<String>,
        date_to: impl Into<String>,
    ) -> Self {
        Self {
            employee_id: employee_id.into(),
            project_id: project_id.into(),
            date_from: date_from.into(),
            date_to: date_to.into(),
        }
    }
}

/// An input row with its identifiers trimmed and both dates resolved.
///
/// The dates are as read, so `end` may come before `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAssignment {
    /// The employee identifier.
    pub employee_id: EmployeeId,

    /// The project identifier.
    pub project_id: ProjectId,

    /// The first day of the assignment.
    pub start: NaiveDate,

    /// The last day of the assignment.
    pub end: NaiveDate,
}

impl ParsedAssignment {
    /// The assignment as an interval, or `None` if it ends before it starts.
    #[must_use]
    pub fn interval(&self) -> Option<ProjectInterval> {
        ProjectInterval::new(self.project_id.clone(), self.start, self.end)
    }
}

/// A parsed assignment: a closed date range on one project.
///
/// The start never comes after the end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectInterval {
    project_id: ProjectId,
    start: NaiveDate,
    end: NaiveDate,
}

impl ProjectInterval {
    /// Creates an interval, or returns `None` if `end` is before `start`.
    #[must_use]
    pub fn new(project_id: ProjectId, start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self {
            project_id,
            start,
            end,
        })
    }

    /// The project worked on.
    #[must_use]
    pub const fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    /// The first day of the interval.
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// The last day of the interval.
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// The number of days both intervals spent on the same project.
    ///
    /// Intervals on different projects never share any days.
    #[must_use]
    pub fn shared_days(&self, other: &Self) -> u64 {
        if self.project_id != other.project_id {
            return 0;
        }
        overlap_days(self.start, self.end, other.start, other.end)
    }
}
