//! Document sink
//!
//! Writes an [`OutputDocument`] to disk atomically: the document is rendered
//! in full, written to a temporary file beside the destination, synced, then
//! renamed into place. On any failure the temporary file is removed and the
//! destination is left untouched.

use crate::emitter::{DocumentFormat, OutputDocument};
use crate::error::EmitError;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Destination for a synthesized document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSink {
    path: PathBuf,
    format: DocumentFormat,
}

impl DocumentSink {
    /// Sink writing `format` to `path`
    pub fn new(path: impl Into<PathBuf>, format: DocumentFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    /// Destination path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Output format
    #[inline]
    #[must_use]
    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    /// Write `document`, returning the number of bytes written
    pub fn write(&self, document: &OutputDocument) -> Result<usize, EmitError> {
        let rendered = document.render(self.format)?;
        let io_err = |e| EmitError::io_error(&self.path, e);

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        // Dropping `staged` on an early return deletes the temporary file.
        let mut staged = NamedTempFile::new_in(dir).map_err(io_err)?;
        staged.write_all(rendered.as_bytes()).map_err(io_err)?;
        staged.flush().map_err(io_err)?;
        staged.as_file().sync_all().map_err(io_err)?;
        staged
            .persist(&self.path)
            .map_err(|e| EmitError::io_error(&self.path, e.error))?;

        tracing::debug!(path = %self.path.display(), bytes = rendered.len(), "wrote document");
        Ok(rendered.len())
    }
}
