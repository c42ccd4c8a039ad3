//! Append-only CSV sink, one file per message kind.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use sbs_core::message::MessageKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write row: {0}")]
    Write(#[from] csv::Error),
    #[error("failed to flush row: {0}")]
    Flush(#[from] std::io::Error),
}

pub struct CsvSink {
    path: PathBuf,
    headers: &'static [&'static str],
}

impl CsvSink {
    pub fn new(dir: &Path, kind: MessageKind) -> Self {
        Self {
            path: dir.join(kind.csv_filename()),
            headers: kind.csv_headers(),
        }
    }

    /// Append one row, creating the file with its kind-specific header row
    /// first if it does not yet exist. Existing rows are never rewritten.
    pub fn append(&self, fields: &[String]) -> Result<(), SinkError> {
        let new_file = !self.path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| SinkError::Open {
                path: self.path.clone(),
                source,
            })?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if new_file {
            writer.write_record(self.headers)?;
        }
        writer.write_record(fields)?;
        writer.flush()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
