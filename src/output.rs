use crate::dataset::Dataset;
use crate::error::DatasetError;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

/// `<dest_dir>/<source stem><suffix>.csv`
pub fn output_path(source: &Path, dest_dir: &Path, suffix: &str) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    dest_dir.join(format!("{stem}{suffix}.csv"))
}

/// Writes header plus rows, absent values as empty fields.
/// Returns the number of data rows written.
pub fn write_dataset(dataset: &Dataset, path: &Path) -> Result<usize, DatasetError> {
    write_inner(dataset, path).map_err(|e| DatasetError::destination(path, e))
}

fn write_inner(dataset: &Dataset, path: &Path) -> io::Result<usize> {
    create_parent_dirs(path)?;
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(BufWriter::new(file));

    writer.write_record(dataset.columns())?;
    for row in dataset.rows() {
        writer.write_record(row.iter().map(|v| v.as_deref().unwrap_or("")))?;
    }
    writer.flush()?;
    Ok(dataset.len())
}

fn create_parent_dirs(file_path: &Path) -> io::Result<()> {
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_name_uses_suffix() {
        let p = output_path(
            Path::new("/logs/in/security.events.csv"),
            Path::new("/out"),
            "_processed",
        );
        assert_eq!(p, PathBuf::from("/out/security.events_processed.csv"));
    }

    #[test]
    fn writes_header_rows_and_quotes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");
        let ds = Dataset::new(
            vec!["timestamp".into(), "msg".into()],
            vec![
                vec![Some("2023-11-14T22:13:20Z".into()), Some("a, \"b\"".into())],
                vec![None, Some("c".into())],
            ],
        );

        let written = write_dataset(&ds, &path).unwrap();
        assert_eq!(written, 2);
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "timestamp,msg\n2023-11-14T22:13:20Z,\"a, \"\"b\"\"\"\n,c\n"
        );
    }

    #[test]
    fn unwritable_destination_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        let ds = Dataset::new(vec!["a".into()], vec![]);

        let err = write_dataset(&ds, &blocker.join("out.csv")).unwrap_err();
        assert!(matches!(err, DatasetError::Destination { .. }));
    }
}
