//! Conversion entry points.
//!
//! The step functions ([`format_markdown`], [`convert_to_docx`]) mirror the
//! CLI's phases, so the binary can report each one as it happens. [`convert`]
//! chains them for library users who only want the result.

use crate::config::ConversionConfig;
use crate::error::Md2DocxError;
use crate::output::{ConversionOutput, ConversionStats};
use crate::pipeline::engine::{self, Engine};
use crate::pipeline::{input, normalize, paths};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Normalise a Markdown file and write the result next to it.
///
/// Reads `source`, applies [`normalize::normalize_markdown`], and writes
/// `<stem>_temp.md` in the same directory. The source is never modified.
///
/// # Errors
/// The source cannot be read, or the intermediate file cannot be written.
/// Nothing should be converted in that case.
pub fn format_markdown(source: impl AsRef<Path>) -> Result<PathBuf, Md2DocxError> {
    let source = source.as_ref();
    let content = input::read_source(source)?;
    let normalized = normalize::normalize_markdown(&content);

    let intermediate = paths::intermediate_path(source);
    std::fs::write(&intermediate, &normalized).map_err(|e| {
        Md2DocxError::IntermediateWriteFailed {
            path: intermediate.clone(),
            source: e,
        }
    })?;

    debug!(
        "Normalised {} ({} → {} bytes)",
        source.display(),
        content.len(),
        normalized.len()
    );
    info!("Wrote intermediate {}", intermediate.display());
    Ok(intermediate)
}

/// Convert a normalised intermediate file to `.docx`, then delete it.
///
/// The output goes next to the intermediate with the `_temp` marker removed.
/// When `config.keep_intermediate` is set the intermediate stays on disk.
///
/// # Errors
/// pandoc fails or cannot be started, or the intermediate cannot be removed.
/// If pandoc fails the intermediate is left behind.
pub fn convert_to_docx(
    intermediate: impl AsRef<Path>,
    engine: &Engine,
    config: &ConversionConfig,
) -> Result<PathBuf, Md2DocxError> {
    let intermediate = intermediate.as_ref();
    let output = paths::output_path(intermediate);

    engine::run_pandoc(engine, intermediate, &output, config)?;

    if !config.keep_intermediate {
        std::fs::remove_file(intermediate).map_err(|e| Md2DocxError::CleanupFailed {
            path: intermediate.to_path_buf(),
            source: e,
        })?;
        debug!("Removed {}", intermediate.display());
    }

    info!("Converted {} → {}", intermediate.display(), output.display());
    Ok(output)
}

/// Convert a Markdown file to `.docx` in one call.
///
/// Runs every step the CLI runs: existence check, engine check (downloading
/// pandoc silently if allowed), normalisation, conversion and cleanup.
///
/// # Example
/// ```rust,no_run
/// use md2docx::{convert, ConversionConfig};
///
/// let out = convert("notes.md", &ConversionConfig::default())?;
/// println!("wrote {}", out.output_path.display());
/// # Ok::<(), md2docx::Md2DocxError>(())
/// ```
pub fn convert(
    source: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Md2DocxError> {
    let total_start = Instant::now();
    let source = input::resolve_input(source.as_ref())?;
    info!("Starting conversion: {}", source.display());

    let engine = engine::ensure_engine(config, None)?;

    let normalize_start = Instant::now();
    let intermediate = format_markdown(&source)?;
    let normalize_duration_ms = normalize_start.elapsed().as_millis() as u64;

    let source_bytes = file_len(&source);
    let normalized_bytes = file_len(&intermediate);

    let convert_start = Instant::now();
    let output_path = convert_to_docx(&intermediate, &engine, config)?;
    let convert_duration_ms = convert_start.elapsed().as_millis() as u64;

    let stats = ConversionStats {
        source_bytes,
        normalized_bytes,
        output_bytes: file_len(&output_path),
        normalize_duration_ms,
        convert_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    Ok(ConversionOutput {
        source,
        output_path,
        intermediate_path: intermediate,
        intermediate_retained: config.keep_intermediate,
        engine,
        stats,
    })
}

/// Normalise in-memory Markdown and convert it to the `.docx` at `output_path`.
///
/// The normalised text is staged in a managed [`tempfile`] inside the output
/// directory and removed automatically on return, whatever the outcome.
/// `config.keep_intermediate` does not apply.
pub fn convert_str(
    markdown: &str,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionStats, Md2DocxError> {
    let total_start = Instant::now();
    let output_path = output_path.as_ref();
    let engine = engine::ensure_engine(config, None)?;

    let dir = match output_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(|e| Md2DocxError::IntermediateWriteFailed {
        path: dir.clone(),
        source: e,
    })?;

    let normalize_start = Instant::now();
    let normalized = normalize::normalize_markdown(markdown);
    let mut tmp = tempfile::Builder::new()
        .prefix(".md2docx-")
        .suffix(&format!(".{}", paths::MARKDOWN_EXTENSION))
        .tempfile_in(&dir)
        .map_err(|e| Md2DocxError::IntermediateWriteFailed {
            path: dir.clone(),
            source: e,
        })?;
    tmp.write_all(normalized.as_bytes())
        .and_then(|_| tmp.flush())
        .map_err(|e| Md2DocxError::IntermediateWriteFailed {
            path: tmp.path().to_path_buf(),
            source: e,
        })?;
    let normalize_duration_ms = normalize_start.elapsed().as_millis() as u64;

    let convert_start = Instant::now();
    engine::run_pandoc(&engine, tmp.path(), output_path, config)?;
    let convert_duration_ms = convert_start.elapsed().as_millis() as u64;

    Ok(ConversionStats {
        source_bytes: markdown.len() as u64,
        normalized_bytes: normalized.len() as u64,
        output_bytes: file_len(output_path),
        normalize_duration_ms,
        convert_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    })
}

fn file_len(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}
