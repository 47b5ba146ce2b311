//! Export formats besides XLSX: JSON and CSV.
//! Both consume the collected records and write one file.

use crate::model::{render_list, BookRecord};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

/// Output format selector for the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Xlsx,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

/// Errors from the JSON and CSV writers.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Failed to write output: {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write output: {0}")]
    Write(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
}

fn create(path: &Path) -> Result<BufWriter<File>, FormatError> {
    let f = File::create(path).map_err(|e| FormatError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(BufWriter::new(f))
}

/// Write records as a pretty-printed JSON array.
pub fn write_json(records: &[BookRecord], path: &Path) -> Result<(), FormatError> {
    let mut f = create(path)?;
    serde_json::to_writer_pretty(&mut f, records)?;
    writeln!(f)?;
    f.flush()?;
    Ok(())
}

/// Write records as CSV with the same columns as the XLSX sheet (index column unnamed).
pub fn write_csv(records: &[BookRecord], path: &Path) -> Result<(), FormatError> {
    let f = create(path)?;
    let mut w = csv::Writer::from_writer(f);
    w.write_record(["", "book_name", "book_author", "book_genres", "book_rating"])?;
    for (i, r) in records.iter().enumerate() {
        w.write_record([
            i.to_string(),
            r.title.clone(),
            render_list(&r.authors),
            render_list(&r.genres),
            r.rating.clone(),
        ])?;
    }
    w.flush()?;
    Ok(())
}
