//! Delimited-text files of employee assignments.
//!
//! The first line is a header naming the columns. The four columns in
//! [`REQUIRED_COLUMNS`] must be present, in any order; any other columns are
//! ignored. Values are returned exactly as written, leaving trimming and date
//! interpretation to the computation.

use std::{
    fs::File,
    io,
    path::{Path, PathBuf},
};

use tracing::{debug, instrument};

use crate::RawAssignment;

/// The header names every assignment file must contain.
pub const REQUIRED_COLUMNS: [&str; 4] = ["EmpID", "ProjectID", "DateFrom", "DateTo"];

/// Errors that can occur while reading an assignment file.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The file could not be opened.
    #[error("failed to open {}", path.display())]
    Open {
        /// The path that was opened.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The header does not name one of the required columns.
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    /// The content is not well-formed delimited text.
    #[error("malformed assignment record")]
    Csv(#[from] csv::Error),
}

/// Reads assignment rows from delimited text.
///
/// Rows are returned in the order they appear. Blank lines are skipped.
///
/// # Errors
///
/// Returns an error if a required column is missing, or if the text cannot
/// be decoded (for example a row with the wrong number of fields).
pub fn read_assignments<R: io::Read>(
    reader: R,
    delimiter: u8,
) -> Result<Vec<RawAssignment>, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = reader.headers()?;
    if let Some(missing) = REQUIRED_COLUMNS
        .into_iter()
        .find(|column| !headers.iter().any(|header| header == *column))
    {
        return Err(Error::MissingColumn(missing));
    }

    let rows = reader
        .deserialize()
        .collect::<Result<Vec<RawAssignment>, _>>()?;
    debug!(rows = rows.len(), "read assignments");
    Ok(rows)
}

/// Reads assignment rows from a file.
///
/// # Errors
///
/// Returns an error if the file cannot be opened, or for any of the reasons
/// given by [`read_assignments`].
#[instrument(level = "debug", skip(delimiter))]
pub fn load_assignments(path: &Path, delimiter: u8) -> Result<Vec<RawAssignment>, Error> {
    let file = File::open(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })?;
    read_assignments(file, delimiter)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn reads_rows_in_order() {
        let input = "EmpID,ProjectID,DateFrom,DateTo\n\
                     143,12,2013-11-01,2014-01-05\n\
                     218,10,2012-05-16,NULL\n";

        let rows = read_assignments(input.as_bytes(), b',').unwrap();

        assert_eq!(
            rows,
            vec![
                RawAssignment::new("143", "12", "2013-11-01", "2014-01-05"),
                RawAssignment::new("218", "10", "2012-05-16", "NULL"),
            ]
        );
    }

    #[test]
    fn values_are_left_as_written() {
        let input = "EmpID,ProjectID,DateFrom,DateTo\n 143 , 12 , 2013-11-01 ,\n";

        let rows = read_assignments(input.as_bytes(), b',').unwrap();

        assert_eq!(
            rows,
            vec![RawAssignment::new(" 143 ", " 12 ", " 2013-11-01 ", "")]
        );
    }

    #[test]
    fn columns_may_be_padded_reordered_and_extended() {
        let input = "DateTo, Notes ,EmpID , DateFrom,ProjectID\n\
                     2024-01-31,kickoff,E1,2024-01-01,P1\n";

        let rows = read_assignments(input.as_bytes(), b',').unwrap();

        assert_eq!(
            rows,
            vec![RawAssignment::new("E1", "P1", "2024-01-01", "2024-01-31")]
        );
    }

    #[test]
    fn blank_lines_are_skipped() {
        let input = "EmpID,ProjectID,DateFrom,DateTo\n\nE1,P1,2024-01-01,\n\n";

        let rows = read_assignments(input.as_bytes(), b',').unwrap();

        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn custom_delimiter() {
        let input = "EmpID;ProjectID;DateFrom;DateTo\nE1;P1;01.02.2024;NULL\n";

        let rows = read_assignments(input.as_bytes(), b';').unwrap();

        assert_eq!(
            rows,
            vec![RawAssignment::new("E1", "P1", "01.02.2024", "NULL")]
        );
    }

    #[test]
    fn missing_column_is_reported() {
        let input = "EmpID,ProjectID,DateFrom\nE1,P1,2024-01-01\n";

        let error = read_assignments(input.as_bytes(), b',').unwrap_err();

        assert!(matches!(error, Error::MissingColumn("DateTo")));
    }

    #[test]
    fn empty_input_is_missing_columns() {
        let error = read_assignments("".as_bytes(), b',').unwrap_err();

        assert!(matches!(error, Error::MissingColumn("EmpID")));
    }

    #[test]
    fn ragged_row_is_rejected() {
        let input = "EmpID,ProjectID,DateFrom,DateTo\nE1,P1,2024-01-01\n";

        let error = read_assignments(input.as_bytes(), b',').unwrap_err();

        assert!(matches!(error, Error::Csv(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"EmpID,ProjectID,DateFrom,DateTo\nE1,P1,2024-01-01,2024-01-31\n")
            .unwrap();

        let rows = load_assignments(file.path(), b',').unwrap();

        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn missing_file_is_reported_with_path() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.csv");

        let error = load_assignments(&missing, b',').unwrap_err();

        assert!(matches!(error, Error::Open { .. }));
        assert!(error.to_string().contains("missing.csv"));
    }
}
