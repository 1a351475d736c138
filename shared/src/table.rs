use std::io::Read;

use csv::{Reader, ReaderBuilder, StringRecord, Trim};
use regex::Regex;

use crate::{get_reader, DataError};

/// Header row of an input table plus the file it came from, used to resolve
/// column names and to report bad cells.
pub(crate) struct Columns {
    pub path: String,
    pub headers: StringRecord,
}

impl Columns {
    pub fn column(&self, name: &str) -> Result<usize, DataError> {
        self.optional_column(name).ok_or_else(|| DataError::MissingColumn {
            file: self.path.clone(),
            column: name.to_string(),
        })
    }

    pub fn optional_column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|x| x == name)
    }

    pub fn parse_error(&self, record: &StringRecord, column: usize) -> DataError {
        DataError::Parse {
            file: self.path.clone(),
            line: record.position().map(|p| p.line()).unwrap_or_default(),
            column: self.headers.get(column).unwrap_or_default().to_string(),
            value: cell(record, column).to_string(),
        }
    }
}

/// Semicolon separated input table with named columns.
pub(crate) struct Table {
    pub columns: Columns,
    reader: Reader<Box<dyn Read>>,
}

impl Table {
    pub fn open(path: &str) -> Result<Table, DataError> {
        let mut reader = ReaderBuilder::new()
            .delimiter(b';')
            .trim(Trim::All)
            .from_reader(get_reader(path)?);
        let headers = reader
            .headers()
            .map_err(|e| DataError::Csv(path.to_string(), e))?
            .clone();

        Ok(Table {
            columns: Columns {
                path: path.to_string(),
                headers,
            },
            reader,
        })
    }

    pub fn rows(
        &mut self,
    ) -> (
        &Columns,
        impl Iterator<Item = Result<StringRecord, DataError>> + '_,
    ) {
        let columns = &self.columns;
        let rows = self
            .reader
            .records()
            .map(move |r| r.map_err(|e| DataError::Csv(columns.path.clone(), e)));
        (columns, rows)
    }
}

pub(crate) fn cell(record: &StringRecord, column: usize) -> &str {
    record.get(column).unwrap_or_default()
}

/// Pulls the first number out of cells like `"1,234.50 CHF"`; thousands
/// separators are dropped.
pub struct NumberParser {
    pattern: Regex,
}

impl Default for NumberParser {
    fn default() -> Self {
        NumberParser {
            pattern: Regex::new(r"[\d,]+(?:\.\d+)?").expect("number pattern is valid"),
        }
    }
}

impl NumberParser {
    pub fn extract(&self, value: &str) -> Option<f64> {
        self.pattern
            .find(value)
            .and_then(|m| m.as_str().replace(',', "").parse::<f64>().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::NumberParser;

    #[test]
    fn extracts_first_number() {
        let parser = NumberParser::default();
        assert_eq!(parser.extract("1,234.50 CHF"), Some(1234.5));
        assert_eq!(parser.extract("EUR 80"), Some(80.0));
        assert_eq!(parser.extract("12.5 / 14"), Some(12.5));
        assert_eq!(parser.extract("n/a"), None);
        assert_eq!(parser.extract(""), None);
    }
}
