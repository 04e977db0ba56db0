//! Employee Collaboration Finder
//!
//! Given a record of which employees worked on which projects and when, finds
//! every pair of employees who were on the same project at the same time, how
//! many days they overlapped on each project, and the pair who overlapped
//! the longest.
//!
//! ```
//! use chrono::NaiveDate;
//! use collab::{DateParser, RawAssignment, find_collaborations};
//!
//! let rows = [
//!     RawAssignment::new("E1", "P1", "2023-01-01", "2023-01-10"),
//!     RawAssignment::new("E2", "P1", "2023-01-05", "2023-01-15"),
//! ];
//! let parser = DateParser::with_today(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
//!
//! let report = find_collaborations(&rows, &parser).unwrap();
//! assert_eq!(report.longest().total_days(), 6);
//! ```

pub mod domain;
pub use domain::{
    AggregateError, Clock, CollaborationRecord, CollaborationReport, Config, DateError,
    DateParser, DateRole, EmployeeId, FixedClock, ProjectContribution, ProjectId, RawAssignment,
    SystemClock,
};

/// Reading assignment records from files.
pub mod storage;

/// Computes every collaboration in a batch of assignments and picks the
/// longest.
///
/// This either succeeds on the whole batch or fails without a partial result.
///
/// # Errors
///
/// Returns an error if any row has a missing start date or an unparseable
/// date.
pub fn find_collaborations(
    rows: &[RawAssignment],
    parser: &DateParser,
) -> Result<CollaborationReport, AggregateError> {
    domain::aggregate(rows, parser).map(domain::select)
}
