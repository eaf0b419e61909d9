// src/write.rs

use arrow::{csv::WriterBuilder, record_batch::RecordBatch};
use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};
use tracing::info;

use crate::error::{Result, ScrapeError};
use crate::position::PositionCode;
use crate::process::PositionDataset;

/// `<dir>/<POSITION>_stats.csv`
pub fn output_path(dir: &Path, position: PositionCode) -> PathBuf {
    dir.join(position.file_name())
}

/// Write `dataset` as CSV into `dir`, replacing any previous file for the position.
///
/// Header row of canonical names, then one line per record; no index column.
/// The file is written to a hidden temp file first and renamed into place.
pub fn write_dataset<P: AsRef<Path>>(dataset: &PositionDataset, dir: P) -> Result<PathBuf> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(ScrapeError::io(
            dir,
            io::Error::new(io::ErrorKind::NotFound, "output directory does not exist"),
        ));
    }

    let path = output_path(dir, dataset.position);
    let tmp_path = dir.join(format!(".{}.tmp", dataset.position.file_name()));

    let batch = dataset
        .to_record_batch()
        .map_err(|source| ScrapeError::Write {
            path: path.clone(),
            source,
        })?;

    if let Err(e) = write_csv(&batch, &tmp_path, &path) {
        if tmp_path.exists() {
            let _ = fs::remove_file(&tmp_path);
        }
        return Err(e);
    }

    info!(
        position = %dataset.position,
        rows = dataset.len(),
        path = %path.display(),
        "wrote dataset"
    );
    Ok(path)
}

/// Serialize `batch` into `tmp_path`, then move it over `path`.
fn write_csv(batch: &RecordBatch, tmp_path: &Path, path: &Path) -> Result<()> {
    let file = File::create(tmp_path).map_err(|e| ScrapeError::io(tmp_path, e))?;
    let mut writer = WriterBuilder::new()
        .with_header(true)
        .build(BufWriter::new(file));
    writer.write(batch).map_err(|source| ScrapeError::Write {
        path: tmp_path.to_path_buf(),
        source,
    })?;
    writer
        .into_inner()
        .flush()
        .map_err(|e| ScrapeError::io(tmp_path, e))?;

    fs::rename(tmp_path, path).map_err(|e| ScrapeError::io(path, e))
}
