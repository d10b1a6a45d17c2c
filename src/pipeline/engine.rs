//! Engine stage: make sure pandoc runs, then drive it.
//!
//! Availability is decided by a version query, not by looking for a file: a
//! `pandoc` on `PATH` that crashes on start counts as missing. When nothing
//! answers and downloading is allowed, the pinned release is fetched through
//! [`pandoc_auto`] and queried again before use.

use crate::config::ConversionConfig;
use crate::error::Md2DocxError;
use pandoc_auto::Pandoc;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

/// A pandoc executable that answered `--version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engine {
    /// Program to execute.
    pub path: PathBuf,
    /// Reported version, e.g. `"3.6.4"`.
    pub version: String,
    /// Whether this run downloaded it.
    pub downloaded: bool,
}

impl Engine {
    fn from_pandoc(p: Pandoc, downloaded: bool) -> Self {
        Self {
            path: p.path,
            version: p.version,
            downloaded,
        }
    }
}

/// Look for a working pandoc without touching the network.
///
/// Uses `config.pandoc_path` when set, otherwise [`pandoc_auto::locate_pandoc`].
pub fn probe_engine(config: &ConversionConfig) -> Result<Engine, Md2DocxError> {
    if let Some(ref program) = config.pandoc_path {
        return pandoc_auto::probe(program)
            .map(|p| Engine::from_pandoc(p, false))
            .map_err(|e| Md2DocxError::EngineNotFound {
                program: program.clone(),
                detail: e.to_string(),
            });
    }

    pandoc_auto::locate_pandoc()
        .map(|p| Engine::from_pandoc(p, false))
        .ok_or_else(|| Md2DocxError::EngineNotFound {
            program: PathBuf::from(pandoc_auto::PANDOC_BIN),
            detail: "not found via PANDOC_PATH, PATH, or the download cache".into(),
        })
}

/// Download the pinned pandoc release and verify it runs.
///
/// `on_progress` receives `(bytes_downloaded, total_bytes_option)`.
pub fn acquire_engine(
    on_progress: Option<&dyn Fn(u64, Option<u64>)>,
) -> Result<Engine, Md2DocxError> {
    info!(
        "Downloading pandoc {} into {}",
        pandoc_auto::PANDOC_VERSION,
        pandoc_auto::pandoc_cache_dir().display()
    );
    let path = pandoc_auto::download_pandoc(on_progress)?;
    let pandoc = pandoc_auto::probe(&path)?;
    info!("pandoc {} ready at {}", pandoc.version, pandoc.path.display());
    Ok(Engine::from_pandoc(pandoc, true))
}

/// Probe for pandoc and download it when missing (if allowed).
pub fn ensure_engine(
    config: &ConversionConfig,
    on_progress: Option<&dyn Fn(u64, Option<u64>)>,
) -> Result<Engine, Md2DocxError> {
    match probe_engine(config) {
        Ok(engine) => {
            debug!("Using pandoc {} at {}", engine.version, engine.path.display());
            Ok(engine)
        }
        Err(e) if config.auto_download => {
            warn!("{e}");
            acquire_engine(on_progress)
        }
        Err(e) => Err(e),
    }
}

/// Command-line arguments for one conversion, excluding the program itself.
pub fn pandoc_args(input: &Path, output: &Path, config: &ConversionConfig) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        format!("--from={}", config.reader).into(),
        "--to=docx".into(),
    ];

    let mut out = OsString::from("--output=");
    out.push(output);
    args.push(out);

    if let Some(ref doc) = config.reference_doc {
        let mut arg = OsString::from("--reference-doc=");
        arg.push(doc);
        args.push(arg);
    }

    args.extend(config.extra_args.iter().map(OsString::from));
    args.push(input.as_os_str().to_os_string());
    args
}

/// Run pandoc to convert `input` into the `.docx` at `output`.
pub fn run_pandoc(
    engine: &Engine,
    input: &Path,
    output: &Path,
    config: &ConversionConfig,
) -> Result<(), Md2DocxError> {
    let args = pandoc_args(input, output, config);
    debug!("Running {} {:?}", engine.path.display(), args);

    let result = Command::new(&engine.path)
        .args(&args)
        .output()
        .map_err(|e| Md2DocxError::EngineSpawnFailed {
            program: engine.path.clone(),
            source: e,
        })?;

    let stderr = String::from_utf8_lossy(&result.stderr);
    if !result.status.success() {
        return Err(Md2DocxError::ConversionFailed {
            status: result.status,
            stderr: stderr.trim().to_string(),
        });
    }
    for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
        warn!("pandoc: {line}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn default_args() {
        let args = pandoc_args(
            Path::new("/d/notes_temp.md"),
            Path::new("/d/notes.docx"),
            &ConversionConfig::default(),
        );
        assert_eq!(
            strings(&args),
            [
                "--from=markdown",
                "--to=docx",
                "--output=/d/notes.docx",
                "/d/notes_temp.md"
            ]
        );
    }

    #[test]
    fn args_with_options() {
        let mut config = ConversionConfig::default();
        config.reader = "gfm".into();
        config.reference_doc = Some(PathBuf::from("/styles/ref.docx"));
        config.extra_args = vec!["--toc".into()];

        let args = strings(&pandoc_args(
            Path::new("in_temp.md"),
            Path::new("in.docx"),
            &config,
        ));
        assert_eq!(args[0], "--from=gfm");
        assert!(args.contains(&"--reference-doc=/styles/ref.docx".to_string()));
        let toc = args.iter().position(|a| a == "--toc").unwrap();
        assert_eq!(toc, args.len() - 2, "extra args precede the input");
        assert_eq!(args.last().map(String::as_str), Some("in_temp.md"));
    }

    #[test]
    fn explicit_missing_engine_is_not_found() {
        let config = ConversionConfig::builder()
            .pandoc_path("/definitely/not/pandoc")
            .auto_download(false)
            .build()
            .unwrap();
        let err = probe_engine(&config).unwrap_err();
        match err {
            Md2DocxError::EngineNotFound { program, .. } => {
                assert_eq!(program, PathBuf::from("/definitely/not/pandoc"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn ensure_without_download_reports_missing_engine() {
        let config = ConversionConfig::builder()
            .pandoc_path("/definitely/not/pandoc")
            .auto_download(false)
            .build()
            .unwrap();
        assert!(matches!(
            ensure_engine(&config, None),
            Err(Md2DocxError::EngineNotFound { .. })
        ));
    }

    #[test]
    fn engine_serialises() {
        let engine = Engine {
            path: PathBuf::from("/usr/bin/pandoc"),
            version: "3.6.4".into(),
            downloaded: false,
        };
        let json = serde_json::to_string(&engine).unwrap();
        assert!(json.contains("\"version\":\"3.6.4\""));
    }
}
