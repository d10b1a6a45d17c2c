//! # md2docx
//!
//! Tidy the spacing of a Markdown document and convert it to Word (`.docx`)
//! with [pandoc](https://pandoc.org).
//!
//! ## Why this crate?
//!
//! pandoc is an excellent converter but a literal one: a heading glued to the
//! paragraph below it, or a `---` directly under a line of text, produces a
//! different document than the author intended. md2docx runs a handful of
//! deterministic spacing rules first, then hands the cleaned file to pandoc.
//! If pandoc is not installed, the pinned release is downloaded and cached on
//! first use.
//!
//! ## Pipeline Overview
//!
//! ```text
//! notes.md
//!  │
//!  ├─ 1. Input      check the file exists
//!  ├─ 2. Engine     find pandoc (PATH / cache) or download it
//!  ├─ 3. Normalise  5 spacing rules → notes_temp.md
//!  └─ 4. Convert    pandoc → notes.docx, delete notes_temp.md
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use md2docx::{convert, ConversionConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let output = convert("notes.md", &ConversionConfig::default())?;
//!     println!("{}", output.output_path.display());
//!     eprintln!("pandoc {}", output.engine.version);
//!     Ok(())
//! }
//! ```
//!
//! Only the spacing rules are wanted? [`normalize_markdown`] is a pure
//! `&str → String` function.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `md2docx` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! md2docx = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert, convert_str, convert_to_docx, format_markdown};
pub use error::Md2DocxError;
pub use output::{ConversionOutput, ConversionStats};
pub use pipeline::engine::{acquire_engine, ensure_engine, probe_engine, Engine};
pub use pipeline::normalize::normalize_markdown;
