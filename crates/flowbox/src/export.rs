//! Writing rendered scenes to disk.

use std::{fs::File, io::Write, path::Path};

use log::{error, info};
use svg::Document;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
        }
    }
}

/// Writes an SVG document to `path`.
pub fn write_document(path: &Path, doc: &Document) -> Result<(), Error> {
    let file_name = path.display().to_string();
    info!(file_name = file_name; "Creating SVG file");
    let mut file = match File::create(path) {
        Ok(file) => file,
        Err(err) => {
            error!(file_name = file_name, err:err = err; "Failed to create SVG file");
            return Err(Error::Io(err));
        }
    };

    if let Err(err) = write!(file, "{doc}") {
        error!(file_name = file_name, err:err = err; "Failed to write SVG content");
        return Err(Error::Io(err));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_write_document_creates_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scene.svg");

        write_document(&path, &Document::new().set("width", 10)).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("<svg"));
    }

    #[test]
    fn test_write_document_reports_io_errors() {
        let path = Path::new("/nonexistent-flowbox-dir/scene.svg");
        let err = write_document(path, &Document::new()).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
