//! Semicolon-delimited street list reading and writing.

use std::fs::{self, File};
use std::path::Path;

use csv::{QuoteStyle, ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use tracing::{debug, info};

use crate::error::{ClipError, Result};

/// Column holding the street identifier
pub const JOIN_KEY_INDEX: usize = 2;

const DELIMITER: u8 = b';';

/// One positional row of the street list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreetRecord {
    fields: Vec<String>,
}

impl StreetRecord {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// The join key, if the row is wide enough to have one
    pub fn key(&self) -> Option<&str> {
        self.fields.get(JOIN_KEY_INDEX).map(String::as_str)
    }
}

impl From<&StringRecord> for StreetRecord {
    fn from(record: &StringRecord) -> Self {
        Self::new(record.iter())
    }
}

pub fn load_records(path: &Path) -> Result<Vec<StreetRecord>> {
    info!("Loading street list from {}", path.display());

    let file = File::open(path).map_err(|e| ClipError::io(path, e))?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(DELIMITER)
        .from_reader(file);

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| ClipError::csv(path, e))?;
        records.push(StreetRecord::from(&record));
    }

    if let Some(first) = records.first() {
        debug!("First record: {:?}", first.fields());
    }
    info!("Loaded {} street records", records.len());
    Ok(records)
}

/// Write rows `;`-delimited, one per `\n`-terminated line.
///
/// Fields are never quoted, so a row read from the list comes back out
/// byte for byte as long as none of its fields contains `;` or a newline.
pub fn write_records(path: &Path, records: &[StreetRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ClipError::io(parent, e))?;
    }

    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(DELIMITER)
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_path(path)
        .map_err(|e| ClipError::csv(path, e))?;

    for record in records {
        writer
            .write_record(record.fields())
            .map_err(|e| ClipError::csv(path, e))?;
    }
    writer.flush().map_err(|e| ClipError::io(path, e))?;

    info!("Wrote {} street records to {}", records.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_third_field() {
        let record = StreetRecord::new(["Calle", "Mujer", "42", "extra"]);
        assert_eq!(record.key(), Some("42"));
        assert_eq!(StreetRecord::new(["a", "b"]).key(), None);
    }

    #[test]
    fn test_load_and_write() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("list.csv");
        fs::write(&input, "Av. Uno;Ana;1\nJr. Dos;Bea;2;nota\n").unwrap();

        let records = load_records(&input).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].fields(), &["Jr. Dos", "Bea", "2", "nota"]);

        let output = dir.path().join("nested").join("out.csv");
        write_records(&output, &records).unwrap();
        let written = fs::read_to_string(&output).unwrap();
        assert_eq!(written, "Av. Uno;Ana;1\nJr. Dos;Bea;2;nota\n");
    }

    #[test]
    fn test_quotes_in_fields_pass_through() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.csv");
        let records = vec![StreetRecord::new(["Calle \"La Mujer\"", "Ana", "1"])];

        write_records(&output, &records).unwrap();
        assert_eq!(fs::read_to_string(&output).unwrap(), "Calle \"La Mujer\";Ana;1\n");
    }
}
