//! Result types returned by the one-shot conversion APIs.

use crate::pipeline::engine::Engine;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Everything a successful [`crate::convert`] run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// The Markdown file that was read.
    pub source: PathBuf,
    /// The `.docx` written by pandoc.
    pub output_path: PathBuf,
    /// The normalised `<stem>_temp.md`.
    pub intermediate_path: PathBuf,
    /// `true` when the intermediate file was kept on disk.
    pub intermediate_retained: bool,
    /// The pandoc that did the conversion.
    pub engine: Engine,
    pub stats: ConversionStats,
}

/// Sizes and timings for one conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Bytes of Markdown before normalisation.
    pub source_bytes: u64,
    /// Bytes of Markdown after normalisation.
    pub normalized_bytes: u64,
    /// Bytes of the `.docx` output.
    pub output_bytes: u64,
    pub normalize_duration_ms: u64,
    pub convert_duration_ms: u64,
    pub total_duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_serialises_to_json() {
        let out = ConversionOutput {
            source: PathBuf::from("notes.md"),
            output_path: PathBuf::from("notes.docx"),
            intermediate_path: PathBuf::from("notes_temp.md"),
            intermediate_retained: false,
            engine: Engine {
                path: PathBuf::from("pandoc"),
                version: "3.6.4".into(),
                downloaded: true,
            },
            stats: ConversionStats {
                source_bytes: 10,
                normalized_bytes: 12,
                ..Default::default()
            },
        };

        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["output_path"], "notes.docx");
        assert_eq!(json["engine"]["downloaded"], true);
        assert_eq!(json["stats"]["normalized_bytes"], 12);

        let back: ConversionOutput = serde_json::from_value(json).unwrap();
        assert_eq!(back.stats, out.stats);
    }
}
