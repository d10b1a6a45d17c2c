//! Input resolution: turn what the user typed into a readable source file.
//!
//! Existence is checked up front so a typo stops the run before pandoc is
//! looked for or downloaded. Read errors are reported later, by the
//! normalisation step, which is where the file is actually opened.

use crate::error::Md2DocxError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Clean a path typed at the prompt.
///
/// Strips surrounding whitespace and one pair of matching quotes, which
/// terminals add when a file is dragged onto the window.
pub fn parse_input(raw: &str) -> Result<PathBuf, Md2DocxError> {
    let trimmed = raw.trim();
    let unquoted = ['"', '\'']
        .iter()
        .find_map(|&q| {
            trimmed
                .strip_prefix(q)
                .and_then(|s| s.strip_suffix(q))
        })
        .unwrap_or(trimmed);

    if unquoted.is_empty() {
        return Err(Md2DocxError::InvalidInput {
            input: raw.to_string(),
        });
    }
    Ok(PathBuf::from(unquoted))
}

/// Validate that the source path exists.
pub fn resolve_input(path: &Path) -> Result<PathBuf, Md2DocxError> {
    if !path.exists() {
        return Err(Md2DocxError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    debug!("Resolved local Markdown: {}", path.display());
    Ok(path.to_path_buf())
}

/// Read the full source text.
pub fn read_source(path: &Path) -> Result<String, Md2DocxError> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => Md2DocxError::PermissionDenied {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::NotFound => Md2DocxError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => Md2DocxError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_newline() {
        assert_eq!(parse_input("notes.md\n").unwrap(), PathBuf::from("notes.md"));
    }

    #[test]
    fn parse_strips_quotes() {
        assert_eq!(
            parse_input("'/tmp/my notes.md' ").unwrap(),
            PathBuf::from("/tmp/my notes.md")
        );
        assert_eq!(
            parse_input("\"/tmp/a.md\"").unwrap(),
            PathBuf::from("/tmp/a.md")
        );
    }

    #[test]
    fn parse_keeps_unbalanced_quote() {
        assert_eq!(parse_input("it's.md").unwrap(), PathBuf::from("it's.md"));
    }

    #[test]
    fn parse_rejects_empty() {
        assert!(matches!(
            parse_input("   \n"),
            Err(Md2DocxError::InvalidInput { .. })
        ));
        assert!(parse_input("\"\"").is_err());
    }

    #[test]
    fn resolve_missing_file() {
        let err = resolve_input(Path::new("/definitely/not/here.md")).unwrap_err();
        assert!(matches!(err, Md2DocxError::FileNotFound { .. }));
    }

    #[test]
    fn resolve_existing_file() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        assert_eq!(resolve_input(tmp.path()).unwrap(), tmp.path());
    }

    #[test]
    fn read_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_source(dir.path()).is_err());
    }

    #[test]
    fn read_invalid_utf8_fails() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), [0xff, 0xfe, 0x00, 0x23]).unwrap();
        assert!(matches!(
            read_source(tmp.path()),
            Err(Md2DocxError::ReadFailed { .. })
        ));
    }
}
