//! File I/O errors.
//!
//! Reading and writing the document are the only fallible operations the
//! editor has. Both are whole-file, synchronous and UTF-8.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("{}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FileError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Read { path, .. } | Self::Write { path, .. } => path,
        }
    }
}

/// Read a whole file as UTF-8. Invalid UTF-8 is an `InvalidData` read error.
///
/// # Errors
///
/// Returns [`FileError::Read`] if the file can't be read or isn't UTF-8.
pub fn read_text_file(path: &Path) -> Result<String, FileError> {
    fs::read_to_string(path).map_err(|source| FileError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `text` to `path`, creating or truncating the file.
///
/// # Errors
///
/// Returns [`FileError::Write`] if the file can't be created or written.
pub fn write_text_file(path: &Path, text: &str) -> Result<(), FileError> {
    fs::write(path, text).map_err(|source| FileError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.txt");
        write_text_file(&path, "héllo\n").unwrap();
        assert_eq!(read_text_file(&path).unwrap(), "héllo\n");
    }

    #[test]
    fn missing_file_is_read_error_naming_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.txt");
        let err = read_text_file(&path).unwrap_err();
        assert!(matches!(&err, FileError::Read { source, .. } if source.kind() == io::ErrorKind::NotFound));
        assert_eq!(err.path(), path);
        assert!(err.to_string().contains("missing.txt"));
    }

    #[test]
    fn invalid_utf8_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bin.dat");
        fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
        let err = read_text_file(&path).unwrap_err();
        assert!(matches!(err, FileError::Read { source, .. } if source.kind() == io::ErrorKind::InvalidData));
    }

    #[test]
    fn write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no/such/dir/out.txt");
        let err = write_text_file(&path, "x").unwrap_err();
        assert!(matches!(err, FileError::Write { .. }));
    }
}
