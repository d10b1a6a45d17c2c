//! File naming for the intermediate and output documents.
//!
//! Both files live next to the source: `notes.md` is normalised into
//! `notes_temp.md`, which pandoc turns into `notes.docx`.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Marker appended to the source stem to name the intermediate file.
pub const INTERMEDIATE_SUFFIX: &str = "_temp";

/// Extension of the intermediate file.
pub const MARKDOWN_EXTENSION: &str = "md";

/// Extension of the converted document.
pub const OUTPUT_EXTENSION: &str = "docx";

/// `dir/notes.md` → `dir/notes_temp.md`.
///
/// The source extension is replaced, so `README.markdown` also becomes
/// `README_temp.md`.
pub fn intermediate_path(source: &Path) -> PathBuf {
    let mut name = OsString::from(source.file_stem().unwrap_or_default());
    name.push(INTERMEDIATE_SUFFIX);
    name.push(".");
    name.push(MARKDOWN_EXTENSION);
    source.with_file_name(name)
}

/// `dir/notes_temp.md` → `dir/notes.docx`.
///
/// Only a trailing `_temp` on the file stem is removed; directory names and
/// inner occurrences are left alone.
pub fn output_path(intermediate: &Path) -> PathBuf {
    let stem = intermediate.file_stem().unwrap_or_default();
    let base = stem
        .to_str()
        .and_then(|s| s.strip_suffix(INTERMEDIATE_SUFFIX))
        .map(OsStr::new)
        .unwrap_or(stem);

    let mut name = OsString::from(base);
    name.push(".");
    name.push(OUTPUT_EXTENSION);
    intermediate.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intermediate_is_sibling() {
        assert_eq!(
            intermediate_path(Path::new("/docs/notes.md")),
            PathBuf::from("/docs/notes_temp.md")
        );
    }

    #[test]
    fn intermediate_for_bare_file_name() {
        assert_eq!(
            intermediate_path(Path::new("notes.md")),
            PathBuf::from("notes_temp.md")
        );
    }

    #[test]
    fn intermediate_replaces_other_extensions() {
        assert_eq!(
            intermediate_path(Path::new("a/README.markdown")),
            PathBuf::from("a/README_temp.md")
        );
        assert_eq!(
            intermediate_path(Path::new("a/CHANGELOG")),
            PathBuf::from("a/CHANGELOG_temp.md")
        );
    }

    #[test]
    fn output_strips_marker() {
        assert_eq!(
            output_path(Path::new("/docs/notes_temp.md")),
            PathBuf::from("/docs/notes.docx")
        );
    }

    #[test]
    fn output_keeps_marker_in_directories() {
        assert_eq!(
            output_path(Path::new("/home/my_temp_dir/notes_temp.md")),
            PathBuf::from("/home/my_temp_dir/notes.docx")
        );
    }

    #[test]
    fn output_keeps_inner_marker() {
        assert_eq!(
            output_path(Path::new("x/draft_temp_notes_temp.md")),
            PathBuf::from("x/draft_temp_notes.docx")
        );
    }

    #[test]
    fn output_without_marker_just_changes_extension() {
        assert_eq!(
            output_path(Path::new("report.md")),
            PathBuf::from("report.docx")
        );
    }

    #[test]
    fn round_trip_names() {
        let src = Path::new("/srv/book/chapter-1.md");
        assert_eq!(
            output_path(&intermediate_path(src)),
            PathBuf::from("/srv/book/chapter-1.docx")
        );
    }
}
