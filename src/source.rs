use crate::dataset::Dataset;
use crate::error::{DatasetError, SourceError};
use memmap2::Mmap;
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;
use tracing::{debug, warn};

pub struct SourceData {
    pub dataset: Dataset,
    /// Rows dropped because they had more fields than the header.
    pub skipped: usize,
}

/// Reads a delimited text file into memory. Ragged rows are tolerated:
/// short ones are padded, over-long ones skipped with a warning.
pub fn read_dataset(path: &Path) -> Result<SourceData, DatasetError> {
    let file = File::open(path).map_err(|e| DatasetError::source_read(path, e))?;
    let len = file
        .metadata()
        .map_err(|e| DatasetError::source_read(path, e))?
        .len();
    if len == 0 {
        return Err(DatasetError::source_read(path, SourceError::Empty));
    }

    // SAFETY: the file is only read, and only for the duration of this call.
    let mmap = unsafe { Mmap::map(&file) }.map_err(|e| DatasetError::source_read(path, e))?;

    read_bytes(&mmap).map_err(|e| DatasetError::source_read(path, e))
}

pub(crate) fn read_bytes(bytes: &[u8]) -> Result<SourceData, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(SourceError::Empty);
    }
    let columns = dedupe_headers(headers.iter());
    let width = columns.len();

    let mut rows: Vec<Vec<Option<String>>> = Vec::new();
    let mut skipped = 0;
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() > width {
            // header is line 1
            warn!(
                line = i + 2,
                expected = width,
                found = record.len(),
                "skipping malformed row"
            );
            skipped += 1;
            continue;
        }
        rows.push(
            record
                .iter()
                .map(|field| (!field.is_empty()).then(|| field.to_string()))
                .collect(),
        );
    }

    debug!(rows = rows.len(), columns = width, "parsed csv");
    Ok(SourceData {
        dataset: Dataset::new(columns, rows),
        skipped,
    })
}

// Repeated names become `name.1`, `name.2`, ...
fn dedupe_headers<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for name in names {
        let mut candidate = name.to_string();
        let mut n = 0;
        while !seen.insert(candidate.clone()) {
            n += 1;
            candidate = format!("{name}.{n}");
        }
        out.push(candidate);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_rows_and_absent_values() {
        let data = read_bytes(b"id,time,msg\n1,1700000000,\"a, b\"\n2,,x\n").unwrap();
        assert_eq!(data.skipped, 0);
        assert_eq!(data.dataset.columns(), ["id", "time", "msg"]);
        assert_eq!(data.dataset.len(), 2);
        assert_eq!(data.dataset.rows()[0][2].as_deref(), Some("a, b"));
        assert_eq!(data.dataset.rows()[1][1], None);
    }

    #[test]
    fn ragged_rows() {
        let data = read_bytes(b"a,b\n1,2\n3\n4,5,6\n7,8\n").unwrap();
        assert_eq!(data.skipped, 1);
        assert_eq!(data.dataset.len(), 3);
        assert_eq!(data.dataset.rows()[1], vec![Some("3".to_string()), None]);
    }

    #[test]
    fn duplicate_headers_are_renamed() {
        let data = read_bytes(b"time,time,time.1\n1,2,3\n").unwrap();
        assert_eq!(data.dataset.columns(), ["time", "time.1", "time.1.1"]);
    }

    #[test]
    fn invalid_utf8_is_an_error() {
        assert!(read_bytes(b"a,b\n\xff\xfe,1\n").is_err());
    }

    #[test]
    fn empty_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        std::fs::write(&path, "").unwrap();
        let err = read_dataset(&path).err().unwrap();
        assert!(matches!(
            err,
            DatasetError::SourceRead {
                source: SourceError::Empty,
                ..
            }
        ));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = read_dataset(Path::new("/nonexistent/in.csv")).err().unwrap();
        assert!(matches!(err, DatasetError::SourceRead { .. }));
    }
}
