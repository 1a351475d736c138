use std::error::Error;
use std::fmt::{Display, Formatter};

/// Everything that can go wrong while turning input files into a `ProblemData`.
#[derive(Debug)]
pub enum DataError {
    Io(String, std::io::Error),
    Csv(String, csv::Error),
    MissingColumn { file: String, column: String },
    Parse { file: String, line: u64, column: String, value: String },
    Config(String),
}

impl Display for DataError {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            DataError::Io(path, e) => write!(f, "could not read {}: {}", path, e),
            DataError::Csv(path, e) => write!(f, "malformed csv in {}: {}", path, e),
            DataError::MissingColumn { file, column } => {
                write!(f, "{} has no column named '{}'", file, column)
            }
            DataError::Parse { file, line, column, value } => write!(
                f,
                "{} line {}: could not parse '{}' in column '{}'",
                file, line, value, column
            ),
            DataError::Config(msg) => write!(f, "invalid configuration: {}", msg),
        }
    }
}

impl Error for DataError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DataError::Io(_, e) => Some(e),
            DataError::Csv(_, e) => Some(e),
            _ => None,
        }
    }
}
