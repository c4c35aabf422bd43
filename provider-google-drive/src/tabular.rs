//! In-memory table exchanged as comma-delimited UTF-8 CSV with a header row.

use std::io::Read;

use crate::error::{DriveError, Result};

/// Header row plus string cells
///
/// # Example
///
/// ```
/// use provider_google_drive::Table;
///
/// let mut table = Table::new(vec!["city".into(), "sales".into()]);
/// table.push_row(vec!["Gdansk".into(), "12".into()]).unwrap();
///
/// let csv = table.to_csv_bytes().unwrap();
/// assert_eq!(csv, b"city,sales\nGdansk,12\n");
/// assert_eq!(Table::from_csv_bytes(&csv).unwrap(), table);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Append a row; it must have one cell per header
    pub fn push_row(&mut self, row: Vec<String>) -> Result<()> {
        if row.len() != self.headers.len() {
            return Err(DriveError::InvalidInput(format!(
                "Row has {} cells but the table has {} columns",
                row.len(),
                self.headers.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cells of the column named `header`, top to bottom
    pub fn column(&self, header: &str) -> Option<Vec<&str>> {
        let index = self.headers.iter().position(|h| h == header)?;
        Some(self.rows.iter().map(|row| row[index].as_str()).collect())
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let headers = csv_reader
            .headers()?
            .iter()
            .map(str::to_string)
            .collect::<Vec<_>>();

        let mut table = Table::new(headers);
        for record in csv_reader.records() {
            let record = record?;
            table.rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(table)
    }

    pub fn from_csv_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_csv_reader(bytes)
    }

    pub fn to_csv_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer
            .into_inner()
            .map_err(|e| DriveError::Table(csv::Error::from(e.into_error())))
    }
}
