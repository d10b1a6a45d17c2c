//! Error types for the md2docx library.
//!
//! Every step of the pipeline reports failure through [`Md2DocxError`].
//! The variants group by the step that raised them:
//!
//! * **Input**: the source path is missing or unusable. The run stops before
//!   anything else happens.
//! * **Normalisation**: the source could not be read or the intermediate file
//!   could not be written. Conversion is skipped.
//! * **Engine**: pandoc is not installed and could not be acquired. The CLI
//!   treats acquisition failures as fatal.
//! * **Conversion**: pandoc ran and failed, or the output / cleanup step hit
//!   an I/O error. A partially written file may remain on disk.

use pandoc_auto::PandocAutoError;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// All errors returned by the md2docx library.
#[derive(Debug, Error)]
pub enum Md2DocxError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File {path} does not exist.")]
    FileNotFound { path: PathBuf },

    /// The user supplied an empty path.
    #[error("Invalid input '{input}': expected a path to a Markdown file")]
    InvalidInput { input: String },

    // ── Normalisation errors ──────────────────────────────────────────────
    /// Process does not have read permission on the source file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The source exists but could not be read as UTF-8 text.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write the normalised intermediate file.
    #[error("Failed to write intermediate file '{path}': {source}")]
    IntermediateWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Engine errors ─────────────────────────────────────────────────────
    /// No usable pandoc, and downloading was disabled.
    #[error(
        "pandoc is not available ('{program}'): {detail}\n\n\
Install pandoc from https://pandoc.org/installing.html, point --pandoc at an\n\
existing copy, or drop --no-download to fetch it automatically.\n"
    )]
    EngineNotFound { program: PathBuf, detail: String },

    /// pandoc could not be downloaded or the downloaded copy does not run.
    #[error("Failed to acquire pandoc: {0}")]
    EngineAcquisitionFailed(#[from] PandocAutoError),

    // ── Conversion errors ─────────────────────────────────────────────────
    /// The engine process could not be started.
    #[error("Failed to run '{program}': {source}")]
    EngineSpawnFailed {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// pandoc exited unsuccessfully.
    #[error("pandoc {status}: {stderr}")]
    ConversionFailed { status: ExitStatus, stderr: String },

    /// The intermediate file could not be removed after conversion.
    #[error("Failed to remove intermediate file '{path}': {source}")]
    CleanupFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_not_found_display() {
        let e = Md2DocxError::FileNotFound {
            path: PathBuf::from("notes.md"),
        };
        assert_eq!(e.to_string(), "File notes.md does not exist.");
    }

    #[test]
    fn engine_not_found_has_hint() {
        let e = Md2DocxError::EngineNotFound {
            program: PathBuf::from("pandoc"),
            detail: "No such file or directory".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("pandoc.org"), "got: {msg}");
        assert!(msg.contains("--pandoc"), "got: {msg}");
    }

    #[test]
    fn acquisition_wraps_pandoc_auto_error() {
        let e: Md2DocxError = PandocAutoError::Download("HTTP 404".into()).into();
        assert!(matches!(e, Md2DocxError::EngineAcquisitionFailed(_)));
        assert!(e.to_string().contains("HTTP 404"));
    }

    #[test]
    fn write_failure_keeps_source() {
        use std::error::Error as _;

        let e = Md2DocxError::IntermediateWriteFailed {
            path: PathBuf::from("/ro/notes_temp.md"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(e.source().is_some());
        assert!(e.to_string().contains("notes_temp.md"));
    }
}
