//! Pipeline stages for Markdown-to-DOCX conversion.
//!
//! Each submodule implements exactly one step, so each can be tested without
//! the others (and without pandoc installed, except for [`engine`]).
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ normalize ──▶ paths ──▶ engine
//! (path)    (regex)      (_temp.md)  (pandoc → .docx)
//! ```
//!
//! 1. [`input`]     — validate the user-supplied path and read the source
//! 2. [`normalize`] — deterministic spacing rules around headings, fences
//!    and horizontal rules
//! 3. [`paths`]     — derive the intermediate `<stem>_temp.md` and the final
//!    `<stem>.docx` next to the source
//! 4. [`engine`]    — find, download and run pandoc

pub mod engine;
pub mod input;
pub mod normalize;
pub mod paths;
