// src/error.rs

use std::fmt;

/// Why a single cell could not be converted to its column's type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// The file's header has no column with this name.
    MissingColumn { column: &'static str },
    InvalidInteger { column: &'static str, value: String },
    InvalidDate { column: &'static str, value: String },
    InvalidDateTime { column: &'static str, value: String },
}

impl ConversionError {
    pub fn column(&self) -> &'static str {
        match self {
            Self::MissingColumn { column }
            | Self::InvalidInteger { column, .. }
            | Self::InvalidDate { column, .. }
            | Self::InvalidDateTime { column, .. } => column,
        }
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingColumn { column } => write!(f, "column {column} not in header"),
            Self::InvalidInteger { column, value } => {
                write!(f, "column {column}: {value:?} is not an integer")
            }
            Self::InvalidDate { column, value } => {
                write!(f, "column {column}: {value:?} is not a recognised date")
            }
            Self::InvalidDateTime { column, value } => {
                write!(f, "column {column}: {value:?} is not a recognised date/time")
            }
        }
    }
}

impl std::error::Error for ConversionError {}

/// Everything that can stop a load run. Each variant names the file or
/// table that was being processed.
#[derive(Debug)]
pub enum Error {
    /// The raw file could not be opened or read.
    Io {
        file: String,
        source: std::io::Error,
    },
    /// A row's shape did not match the header (or the bytes were not UTF-8).
    Parse {
        file: String,
        line: Option<u64>,
        source: csv::Error,
    },
    /// Two header cells share a name.
    DuplicateHeader { file: String, column: String },
    /// A vote row ended with a member id and no vote value.
    MalformedRow {
        file: String,
        line: u64,
        ref_id: String,
        trailing: usize,
    },
    Conversion {
        table: &'static str,
        line: u64,
        source: ConversionError,
    },
    /// The sink rejected a statement: constraint violation, bad DDL, I/O.
    Load {
        table: &'static str,
        source: rusqlite::Error,
    },
}

impl Error {
    pub(crate) fn io(file: &str, source: std::io::Error) -> Self {
        Self::Io {
            file: file.to_string(),
            source,
        }
    }

    pub(crate) fn parse(file: &str, source: csv::Error) -> Self {
        let line = source.position().map(|p| p.line());
        Self::Parse {
            file: file.to_string(),
            line,
            source,
        }
    }

    pub(crate) fn load(table: &'static str) -> impl FnOnce(rusqlite::Error) -> Self {
        move |source| Self::Load { table, source }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { file, source } => write!(f, "{file}: {source}"),
            Self::Parse {
                file,
                line: Some(line),
                source,
            } => write!(f, "{file}:{line}: parse error: {source}"),
            Self::Parse {
                file,
                line: None,
                source,
            } => write!(f, "{file}: parse error: {source}"),
            Self::DuplicateHeader { file, column } => {
                write!(f, "{file}: header declares {column:?} more than once")
            }
            Self::MalformedRow {
                file,
                line,
                ref_id,
                trailing,
            } => write!(
                f,
                "{file}:{line}: vote row {ref_id:?} has {trailing} trailing fields, expected member/vote pairs"
            ),
            Self::Conversion {
                table,
                line,
                source,
            } => write!(f, "{table} (line {line}): {source}"),
            Self::Load { table, source } => write!(f, "{table}: sqlite: {source}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Conversion { source, .. } => Some(source),
            Self::Load { source, .. } => Some(source),
            Self::DuplicateHeader { .. } | Self::MalformedRow { .. } => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
