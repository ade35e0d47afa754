//! CSV-backed history file with a required header row.

use std::{
    fs,
    path::{Path, PathBuf},
};

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use tracing::{debug, info};

use crate::{
    calculation::{Calculation, CalculationRow},
    types::HISTORY_COLUMNS,
};

use super::{HistorySink, PersistError, PersistResult};

/// History stored as `operation,operand_a,operand_b,result,timestamp` rows.
#[derive(Debug, Clone)]
pub struct CsvHistoryFile {
    path: PathBuf,
}

impl CsvHistoryFile {
    /// History file at `path`; nothing is touched until the first save or load.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the history file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes every record, replacing the file atomically.
    ///
    /// Rows go to a sibling `.tmp` file that is renamed over the target once
    /// fully flushed, so a failed save leaves the previous file intact.
    pub fn write_all(&self, records: &[Calculation]) -> PersistResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.tmp_path();
        let written = write_rows(&tmp, records)
            .and_then(|()| fs::rename(&tmp, &self.path).map_err(PersistError::from));
        if let Err(err) = written {
            let _ = fs::remove_file(&tmp);
            return Err(err);
        }
        info!(path = %self.path.display(), records = records.len(), "history saved");
        Ok(())
    }

    /// Reads every record, or fails without returning any.
    pub fn read_all(&self) -> PersistResult<Vec<Calculation>> {
        if !self.path.is_file() {
            return Err(PersistError::NotFound(self.path.clone()));
        }
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_path(&self.path)?;

        let headers = reader.headers().map_err(|err| malformed(1, &err))?.clone();
        if let Some(column) = missing_column(&headers) {
            return Err(PersistError::MalformedRecord {
                line: 1,
                reason: format!("header row lacks column `{column}`"),
            });
        }

        let mut out = Vec::new();
        let mut record = StringRecord::new();
        loop {
            let more = reader.read_record(&mut record).map_err(|err| {
                let line = err.position().map(|p| p.line()).unwrap_or(0);
                malformed(line, &err)
            })?;
            if !more {
                break;
            }
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            let row: CalculationRow = record
                .deserialize(Some(&headers))
                .map_err(|err| malformed(line, &err))?;
            let calc = Calculation::from_row(&row).map_err(|err| malformed(line, &err))?;
            out.push(calc);
        }

        debug!(path = %self.path.display(), records = out.len(), "history read");
        Ok(out)
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl HistorySink for CsvHistoryFile {
    fn save(&mut self, records: &[Calculation]) -> PersistResult<()> {
        self.write_all(records)
    }

    fn load(&mut self) -> PersistResult<Vec<Calculation>> {
        self.read_all()
    }

    fn exists(&self) -> bool {
        self.path.is_file()
    }
}

fn write_rows(path: &Path, records: &[Calculation]) -> PersistResult<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(HISTORY_COLUMNS)?;
    for calc in records {
        writer.serialize(calc.to_row())?;
    }
    let file = writer.into_inner().map_err(|err| err.into_error())?;
    file.sync_all()?;
    Ok(())
}

fn missing_column(headers: &StringRecord) -> Option<&'static str> {
    HISTORY_COLUMNS.into_iter().find(|column| {
        let legacy = match *column {
            "operand_a" => Some("operand1"),
            "operand_b" => Some("operand2"),
            _ => None,
        };
        !headers
            .iter()
            .any(|h| h == *column || Some(h) == legacy)
    })
}

fn malformed(line: u64, err: &dyn std::fmt::Display) -> PersistError {
    PersistError::MalformedRecord {
        line,
        reason: err.to_string(),
    }
}
