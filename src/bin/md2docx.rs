//! CLI binary for md2docx.
//!
//! A thin shim over the library crate: resolves the input path (argument or
//! prompt), makes sure pandoc is available, then runs the normalise and
//! convert steps, printing one line per phase.
//!
//! Handled failures (missing file, unreadable source, pandoc error) are
//! reported on stdout and the process still exits 0. Only a failed pandoc
//! download is fatal.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use md2docx::pipeline::input;
use md2docx::{
    acquire_engine, convert_to_docx, format_markdown, probe_engine, ConversionConfig,
    ConversionOutput, ConversionStats, Engine,
};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert notes.md → notes.docx (same directory)
  md2docx notes.md

  # Prompt for the path
  md2docx

  # Use a specific pandoc and a Word styling template
  md2docx --pandoc /opt/pandoc/bin/pandoc --reference-doc house-style.docx notes.md

  # Keep the normalised notes_temp.md for inspection
  md2docx --keep-temp notes.md

NORMALISATION RULES (applied in order):
  1. Blank line after a heading followed by text
  2. Blank line before a heading preceded by text
  3. Runs of blank lines collapsed to one
  4. Blank line after a fenced code block followed by text
  5. Exactly one blank line around a --- rule

ENVIRONMENT VARIABLES:
  MD2DOCX_PANDOC          Path to the pandoc executable
  PANDOC_PATH             Checked before PATH when --pandoc is not given
  PANDOC_AUTO_CACHE_DIR   Override the pandoc download cache directory

SETUP:
  pandoc (~40 MB) is downloaded automatically on first run if it is not on
  PATH, and cached in ~/.cache/md2docx/pandoc-<version>/.
"#;

/// Convert a Markdown file to Word (.docx) via pandoc.
#[derive(Parser, Debug)]
#[command(
    name = "md2docx",
    version,
    about = "Tidy Markdown spacing and convert it to Word (.docx) via pandoc",
    long_about = "Normalise the spacing around headings, code fences and horizontal rules of a \
Markdown file, then convert it to a .docx next to the source using pandoc. pandoc is downloaded \
automatically when it is not installed.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Markdown file to convert. Prompted for when omitted.
    input: Option<String>,

    /// pandoc executable to use instead of searching PATH and the cache.
    #[arg(long, env = "MD2DOCX_PANDOC")]
    pandoc: Option<PathBuf>,

    /// Never download pandoc; fail if it is not installed.
    #[arg(long, env = "MD2DOCX_NO_DOWNLOAD")]
    no_download: bool,

    /// Word document whose styles are applied to the output.
    #[arg(long, env = "MD2DOCX_REFERENCE_DOC")]
    reference_doc: Option<PathBuf>,

    /// Keep the normalised <name>_temp.md after conversion.
    #[arg(long, env = "MD2DOCX_KEEP_TEMP")]
    keep_temp: bool,

    /// Print a JSON report of the run instead of the success line.
    #[arg(long, env = "MD2DOCX_JSON")]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MD2DOCX_VERBOSE")]
    verbose: bool,

    /// Hide the pandoc download progress bar.
    #[arg(short, long, env = "MD2DOCX_QUIET")]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Phase messages go to stdout; library logs stay on stderr and are
    // limited to warnings unless --verbose or RUST_LOG ask for more.
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Resolve input ────────────────────────────────────────────────────
    let raw = match cli.input {
        Some(ref s) => s.clone(),
        None => prompt_for_path().context("Failed to read the file path from stdin")?,
    };
    let source = match input::parse_input(&raw).and_then(|p| input::resolve_input(&p)) {
        Ok(p) => p,
        Err(e) => {
            println!("{} {e}", red("Error:"));
            return Ok(());
        }
    };

    let config = build_config(&cli)?;
    let started = Instant::now();

    // ── Ensure pandoc is available ───────────────────────────────────────
    let engine = ensure_engine_verbose(&config, cli.quiet)?;

    // ── Normalise ────────────────────────────────────────────────────────
    let normalize_start = Instant::now();
    let intermediate = match format_markdown(&source) {
        Ok(p) => {
            println!("{} Markdown formatting complete.", green("✔"));
            p
        }
        Err(e) => {
            println!("{} Error formatting markdown: {e}", red("✘"));
            return Ok(());
        }
    };
    let normalize_duration_ms = normalize_start.elapsed().as_millis() as u64;
    let source_bytes = file_len(&source);
    let normalized_bytes = file_len(&intermediate);

    // ── Convert ──────────────────────────────────────────────────────────
    let convert_start = Instant::now();
    let output_path = match convert_to_docx(&intermediate, &engine, &config) {
        Ok(p) => p,
        Err(e) => {
            println!("{} Error during conversion: {e}", red("✘"));
            return Ok(());
        }
    };

    if cli.json {
        let report = ConversionOutput {
            source,
            stats: ConversionStats {
                source_bytes,
                normalized_bytes,
                output_bytes: file_len(&output_path),
                normalize_duration_ms,
                convert_duration_ms: convert_start.elapsed().as_millis() as u64,
                total_duration_ms: started.elapsed().as_millis() as u64,
            },
            output_path,
            intermediate_path: intermediate,
            intermediate_retained: config.keep_intermediate,
            engine,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
    } else {
        println!(
            "{} Conversion successful! Output file: {}",
            green("✔"),
            bold(&output_path.display().to_string())
        );
    }

    Ok(())
}

/// Ask for the path on stdout and read one line from stdin.
fn prompt_for_path() -> io::Result<String> {
    print!("Enter the path to your markdown file: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}

/// Probe for pandoc; download it with a progress bar when missing.
///
/// A failed download is returned as an error and ends the process.
fn ensure_engine_verbose(config: &ConversionConfig, quiet: bool) -> Result<Engine> {
    match probe_engine(config) {
        Ok(engine) => {
            println!("{} pandoc {} found.", green("✔"), engine.version);
            return Ok(engine);
        }
        Err(e) if !config.auto_download => {
            return Err(e).context("pandoc is required");
        }
        Err(_) => {}
    }

    println!(
        "{} pandoc not found. Downloading pandoc {} automatically…",
        cyan("◆"),
        pandoc_auto::PANDOC_VERSION
    );

    let engine = if quiet {
        acquire_engine(None).context("Failed to download pandoc")?
    } else {
        let dl_bar = ProgressBar::new(0);
        dl_bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  \
                 [{bar:42.green/238}] {bytes}/{total_bytes}  ETA {eta_precise}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        dl_bar.set_prefix("pandoc");
        dl_bar.enable_steady_tick(Duration::from_millis(80));

        let bar = dl_bar.clone();
        let result = acquire_engine(Some(&|downloaded, total| {
            if let Some(t) = total {
                if bar.length().unwrap_or(0) != t {
                    bar.set_length(t);
                }
            }
            bar.set_position(downloaded);
        }));
        dl_bar.finish_and_clear();
        result.context("Failed to download pandoc")?
    };

    println!("{} pandoc download complete.", green("✔"));
    Ok(engine)
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .auto_download(!cli.no_download)
        .keep_intermediate(cli.keep_temp);

    if let Some(ref p) = cli.pandoc {
        builder = builder.pandoc_path(p);
    }
    if let Some(ref doc) = cli.reference_doc {
        builder = builder.reference_doc(doc);
    }

    builder.build().context("Invalid configuration")
}

fn file_len(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}
