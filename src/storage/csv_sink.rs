//! CSV implementation of the record sink

use crate::scrape::BusinessRecord;
use crate::storage::traits::{RecordSink, SinkError, SinkResult};
use csv::{ReaderBuilder, Writer, WriterBuilder};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Column headers, in column order
pub const HEADER: [&str; 9] = [
    "ID",
    "Company Name",
    "Domain",
    "Score",
    "Location",
    "Address",
    "Phone",
    "Email",
    "Website",
];

/// Append-only CSV file of business records
///
/// Every row is flushed as soon as it is written, so a run that dies midway
/// still leaves a readable file behind.
pub struct CsvSink {
    path: PathBuf,
    writer: Option<Writer<File>>,
    rows_appended: u64,
}

impl CsvSink {
    /// Opens `path` for appending, creating it with a header row if needed
    ///
    /// Rows already in the file are kept as they are; the existing header
    /// is not checked against `HEADER`. A last row without a line terminator
    /// is terminated before anything new is written.
    pub fn open(path: &Path) -> SinkResult<Self> {
        let has_content = std::fs::metadata(path)
            .map(|m| m.len() > 0)
            .unwrap_or(false);

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;
        if has_content && !ends_with_newline(&mut file)? {
            file.write_all(b"\n")?;
        }
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

        if has_content {
            tracing::info!("Appending to existing file {}", path.display());
        } else {
            writer.write_record(HEADER)?;
            writer.flush()?;
            tracing::info!("Created {} with header row", path.display());
        }

        Ok(Self {
            path: path.to_path_buf(),
            writer: Some(writer),
            rows_appended: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_closed(&self) -> bool {
        self.writer.is_none()
    }
}

impl RecordSink for CsvSink {
    fn append(&mut self, record: &BusinessRecord) -> SinkResult<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| SinkError::Closed(self.path.display().to_string()))?;

        writer.serialize(record)?;
        writer.flush()?;
        self.rows_appended += 1;
        Ok(())
    }

    fn close(&mut self) -> SinkResult<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
            tracing::debug!(
                "Closed {} after {} new row(s)",
                self.path.display(),
                self.rows_appended
            );
        }
        Ok(())
    }

    fn rows_appended(&self) -> u64 {
        self.rows_appended
    }
}

fn ends_with_newline(file: &mut File) -> std::io::Result<bool> {
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

/// Reads every record of a sink file, header excluded
pub fn read_records(path: &Path) -> SinkResult<Vec<BusinessRecord>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let records = reader
        .deserialize()
        .collect::<Result<Vec<BusinessRecord>, csv::Error>>()?;
    Ok(records)
}
