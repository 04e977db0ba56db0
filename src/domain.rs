//! Domain models for finding collaborating employees.
//!
//! This module contains the core types and the computation itself: date
//! parsing, interval overlap, pairwise aggregation and selection of the
//! longest collaboration.

/// Employee and project identifiers.
pub mod identifier;
pub use identifier::{EmployeeId, ProjectId};

/// Input rows and parsed assignment intervals.
pub mod assignment;
pub use assignment::{ParsedAssignment, ProjectInterval, RawAssignment};

/// Sources of the current date.
pub mod clock;
pub use clock::{Clock, FixedClock, SystemClock};

pub mod date;
pub use date::{DateParser, DateRole, Error as DateError};

/// Overlap between closed date intervals.
pub mod overlap;
pub use overlap::overlap_days;

pub mod collaboration;
pub use collaboration::{
    CollaborationRecord, Error as AggregateError, ProjectContribution, aggregate,
    parse_assignments,
};

/// Selection of the longest collaboration.
pub mod report;
pub use report::{CollaborationReport, select};

mod config;
pub use config::Config;
