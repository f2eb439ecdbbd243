//! Whole-file JSON persistence for the store document.
//!
//! Reads classify failures into the `LoadError` kinds. Writes go to a staging
//! file next to the target, are flushed to disk, then renamed over the target
//! so a failed save never leaves a truncated document behind.

use serde::Serialize;
use serde_json::error::Category;
use serde_json::ser::PrettyFormatter;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::warn;

use crate::error::{LoadError, SaveError};
use crate::models::StoreDocument;

const INDENT: &[u8] = b"    ";

pub(crate) fn read_document(path: &Path) -> Result<StoreDocument, LoadError> {
    let bytes = fs::read(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound {
            path: path.to_path_buf(),
        },
        _ => LoadError::Unexpected {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let text = std::str::from_utf8(&bytes).map_err(|e| LoadError::Unexpected {
        path: path.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidData, e),
    })?;

    serde_json::from_str(text).map_err(|source| match source.classify() {
        Category::Syntax | Category::Eof => LoadError::Malformed {
            path: path.to_path_buf(),
            source,
        },
        Category::Data => LoadError::SchemaInvalid {
            path: path.to_path_buf(),
            reason: source.to_string(),
        },
        Category::Io => LoadError::Unexpected {
            path: path.to_path_buf(),
            source: source.into(),
        },
    })
}

pub(crate) fn write_document(path: &Path, document: &StoreDocument) -> Result<(), SaveError> {
    write_atomic(path, document).map_err(|source| SaveError {
        path: path.to_path_buf(),
        source,
    })
}

fn write_atomic(path: &Path, document: &StoreDocument) -> io::Result<()> {
    let mut bytes = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut bytes, PrettyFormatter::with_indent(INDENT));
    document.serialize(&mut serializer)?;
    bytes.push(b'\n');

    let dir = staging_dir(path);
    let mut staging = NamedTempFile::new_in(dir)?;
    staging.write_all(&bytes)?;
    staging.as_file().sync_all()?;
    // A failed rename drops the staging file, which deletes it.
    staging.persist(path).map_err(|e| e.error)?;
    // The new document is already in place; a failed directory sync only
    // weakens durability across a crash.
    if let Err(err) = fsync_dir(dir) {
        warn!(dir = %dir.display(), error = %err, "store directory sync failed after save");
    }
    Ok(())
}

fn staging_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn fsync_dir(path: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        let dir = OpenOptions::new().read(true).open(path)?;
        dir.sync_all()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Credential;
    use crate::models::LibraryRecord;
    use tempfile::tempdir;

    fn sample() -> StoreDocument {
        StoreDocument {
            libraries: vec![LibraryRecord::new("Central", "Metropolis", "1 Main St")],
            credential: Credential::from_encoded("00$11"),
        }
    }

    #[test]
    fn writes_four_space_indented_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("libs_data.json");
        write_document(&path, &sample()).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("{\n    \"libraries_data\": [\n        {"));
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn write_leaves_no_staging_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("libs_data.json");
        write_document(&path, &sample()).unwrap();
        write_document(&path, &sample()).unwrap();
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .map(|e| e.file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("libs_data.json")]);
    }

    #[test]
    fn write_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("libs_data.json");
        let err = write_document(&path, &sample()).unwrap_err();
        assert_eq!(err.path, path);
    }

    #[test]
    fn read_classifies_failures() {
        let dir = tempdir().unwrap();

        let missing = dir.path().join("nope.json");
        assert!(matches!(
            read_document(&missing),
            Err(LoadError::NotFound { .. })
        ));

        let garbage = dir.path().join("garbage.json");
        fs::write(&garbage, "not json at all").unwrap();
        assert!(matches!(
            read_document(&garbage),
            Err(LoadError::Malformed { .. })
        ));

        let truncated = dir.path().join("truncated.json");
        fs::write(&truncated, r#"{"libraries_data": ["#).unwrap();
        assert!(matches!(
            read_document(&truncated),
            Err(LoadError::Malformed { .. })
        ));

        let wrong_type = dir.path().join("wrong_type.json");
        fs::write(
            &wrong_type,
            r#"{"libraries_data": 5, "administrator_password": ""}"#,
        )
        .unwrap();
        assert!(matches!(
            read_document(&wrong_type),
            Err(LoadError::SchemaInvalid { .. })
        ));

        let latin1 = dir.path().join("latin1.json");
        fs::write(
            &latin1,
            b"{\"libraries_data\": [{\"name\": \"Caf\xe9\", \"city\": \"Paris\", \"address\": \"1 Rue\"}], \"administrator_password\": \"\"}",
        )
        .unwrap();
        match read_document(&latin1) {
            Err(LoadError::Unexpected { source, .. }) => {
                assert_eq!(source.kind(), io::ErrorKind::InvalidData)
            }
            other => panic!("expected Unexpected, got {other:?}"),
        }

        assert!(matches!(
            read_document(dir.path()),
            Err(LoadError::Unexpected { .. })
        ));
    }
}
