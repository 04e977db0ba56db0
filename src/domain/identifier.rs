use std::fmt;

use serde::Serialize;

/// The identifier of an employee, as found in the `EmpID` column.
///
/// Surrounding whitespace is stripped on construction, so `" 143"` and `"143"`
/// name the same employee.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct EmployeeId(String);

impl EmployeeId {
    /// Creates an employee identifier from a raw field value.
    #[must_use]
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_string())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EmployeeId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The identifier of a project, as found in the `ProjectID` column.
///
/// Surrounding whitespace is stripped on construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    /// Creates a project identifier from a raw field value.
    #[must_use]
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_string())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProjectId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}
