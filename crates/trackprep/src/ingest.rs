//! Loading raw tracking records from CSV files.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::frame::{Frame, Value};

/// Load every `*.csv` file in `dir` and concatenate them into one frame.
///
/// Files are read in path order. Columns are unioned across files; cells a
/// file does not provide are missing.
///
/// # Errors
///
/// Returns [`Error::NoInputFiles`] if the directory does not exist or holds no
/// CSV files, and [`Error::CsvRead`] if a file cannot be parsed.
pub fn load_data(dir: impl AsRef<Path>) -> Result<Frame> {
    let dir = dir.as_ref();
    let files = csv_files(dir)?;
    if files.is_empty() {
        return Err(Error::NoInputFiles {
            dir: dir.to_path_buf(),
        });
    }

    let frames = files
        .iter()
        .map(|path| read_csv(path))
        .collect::<Result<Vec<_>>>()?;
    let frame = Frame::concat(frames);

    info!(
        "Loaded {} rows and {} columns from {} file(s)",
        frame.height(),
        frame.width(),
        files.len()
    );
    Ok(frame)
}

/// Read one CSV file with a header row.
///
/// Repeated header names are made unique by appending `.1`, `.2`, ... to
/// later occurrences, so every column survives.
///
/// # Errors
///
/// Returns [`Error::CsvRead`] if the file cannot be opened or parsed.
pub fn read_csv(path: &Path) -> Result<Frame> {
    let wrap = |source| Error::CsvRead {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(wrap)?;

    let headers = unique_headers(reader.headers().map_err(wrap)?.iter());
    let mut frame = Frame::with_columns(headers);

    for record in reader.records() {
        let record = record.map_err(wrap)?;
        frame.push_row(record.iter().map(Value::from_raw).collect())?;
    }

    debug!("Read {} rows from {}", frame.height(), path.display());
    Ok(frame)
}

fn unique_headers<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let names: Vec<&str> = names.collect();
    let mut taken: HashSet<String> = names.iter().map(|n| (*n).to_string()).collect();
    let mut seen: HashSet<&str> = HashSet::new();

    names
        .iter()
        .map(|&name| {
            if seen.insert(name) {
                return name.to_string();
            }
            let mut suffix = 1;
            let mut renamed = format!("{name}.{suffix}");
            while !taken.insert(renamed.clone()) {
                suffix += 1;
                renamed = format!("{name}.{suffix}");
            }
            warn!("Repeated column '{name}' renamed to '{renamed}'");
            renamed
        })
        .collect()
}

/// List `*.csv` files directly inside `dir`, sorted.
fn csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "csv") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_load_single_file() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "birds.csv",
            "BirdId,Sex,Latitude\n1,female,-62.1\n2,NA,-62.3\n",
        );

        let frame = load_data(dir.path()).unwrap();
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.column_names(), vec!["BirdId", "Sex", "Latitude"]);
        assert!(frame.column("Sex").unwrap().values[1].is_missing());
    }

    #[test]
    fn test_load_concatenates_in_path_order() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.csv", "BirdId,Age\n2,adult\n");
        write(dir.path(), "a.csv", "BirdId,Sex\n1,male\n");
        write(dir.path(), "notes.txt", "ignored");

        let frame = load_data(dir.path()).unwrap();
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.column_names(), vec!["BirdId", "Sex", "Age"]);
        assert_eq!(
            frame.column("BirdId").unwrap().values[0],
            Value::Text("1".to_string())
        );
        assert!(frame.column("Age").unwrap().values[0].is_missing());
        assert!(frame.column("Sex").unwrap().values[1].is_missing());
    }

    #[test]
    fn test_header_with_spaces_is_preserved() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.csv", "Breed Stage , Sex\ncreche,male\n");

        let frame = load_data(dir.path()).unwrap();
        assert!(frame.has_column("Breed Stage"));
    }

    #[test]
    fn test_repeated_headers_keep_every_column() {
        crate::logging::init_test_logging();
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.csv", "Sex,Sex,Age,Sex\nmale,female,adult,unknown\n");

        let frame = load_data(dir.path()).unwrap();
        assert_eq!(frame.column_names(), vec!["Sex", "Sex.1", "Age", "Sex.2"]);
        let row = frame.row(0).unwrap();
        assert_eq!(*row[0], Value::Text("male".to_string()));
        assert_eq!(*row[1], Value::Text("female".to_string()));
        assert_eq!(*row[3], Value::Text("unknown".to_string()));
    }

    #[test]
    fn test_repeated_header_skips_existing_suffix() {
        let headers = unique_headers(["a", "a.1", "a"].into_iter());
        assert_eq!(headers, vec!["a", "a.1", "a.2"]);
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_data(dir.path()).unwrap_err();
        assert!(err.is_no_input());
    }

    #[test]
    fn test_nonexistent_directory() {
        let err = load_data("/nonexistent/trackprep/data").unwrap_err();
        assert!(err.is_no_input());
    }

    #[test]
    fn test_ragged_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "bad.csv", "a,b\n1,2,3\n");

        let err = load_data(dir.path()).unwrap_err();
        assert!(matches!(err, Error::CsvRead { .. }));
        assert!(err.to_string().contains("bad.csv"));
    }
}
