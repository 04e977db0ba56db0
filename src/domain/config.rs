use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Settings that control how assignment files are read and evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Versions", into = "Versions")]
pub struct Config {
    /// The date treated as "today" for assignments with no end date.
    ///
    /// When unset, the system clock is used. Pinning it makes reports over
    /// open-ended assignments reproducible.
    reference_date: Option<NaiveDate>,

    /// The field separator of input files. Always an ASCII character.
    delimiter: char,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reference_date: None,
            delimiter: default_delimiter(),
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Loads the configuration at the given path, or the defaults if there is
    /// no file there.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Self, String> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// Returns the pinned "today", if any.
    #[must_use]
    pub const fn reference_date(&self) -> Option<NaiveDate> {
        self.reference_date
    }

    /// Pins (or with `None`, unpins) the date used as "today".
    pub const fn set_reference_date(&mut self, date: Option<NaiveDate>) {
        self.reference_date = date;
    }

    /// Returns the input field separator.
    #[must_use]
    pub const fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Returns the input field separator as a byte, as CSV readers expect.
    #[must_use]
    pub const fn delimiter_byte(&self) -> u8 {
        // Always ASCII, checked on every way in.
        self.delimiter as u8
    }

    /// Sets the input field separator.
    ///
    /// # Errors
    ///
    /// Returns an error if `delimiter` is not a printable ASCII character or
    /// tab, or is the quote character.
    pub fn set_delimiter(&mut self, delimiter: char) -> Result<(), String> {
        validate_delimiter(delimiter)?;
        self.delimiter = delimiter;
        Ok(())
    }
}

const fn default_delimiter() -> char {
    ','
}

fn validate_delimiter(delimiter: char) -> Result<(), String> {
    if delimiter == '"' || !(delimiter == '\t' || delimiter.is_ascii_graphic() || delimiter == ' ')
    {
        return Err(format!(
            "Invalid delimiter {delimiter:?}: must be a printable ASCII character other than '\"'"
        ));
    }
    Ok(())
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reference_date: Option<NaiveDate>,

        #[serde(default = "default_delimiter")]
        delimiter: char,
    },
}

impl TryFrom<Versions> for Config {
    type Error = String;

    fn try_from(versions: Versions) -> Result<Self, Self::Error> {
        match versions {
            Versions::V1 {
                reference_date,
                delimiter,
            } => {
                validate_delimiter(delimiter)?;
                Ok(Self {
                    reference_date,
                    delimiter,
                })
            }
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            reference_date: config.reference_date,
            delimiter: config.delimiter,
        }
    }
}
