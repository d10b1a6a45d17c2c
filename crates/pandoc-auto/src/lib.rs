//! # pandoc-auto
//!
//! Locate a working [pandoc](https://pandoc.org) executable, and when none is
//! installed, download and cache the official release binary so that callers
//! never have to ask users to install pandoc by hand.
//!
//! ## How it works
//!
//! 1. [`locate_pandoc`] tries `PANDOC_PATH`, then `pandoc` on `PATH`, then
//!    `~/.cache/md2docx/pandoc-{VERSION}/`. A candidate only counts when
//!    `<candidate> --version` succeeds.
//! 2. If nothing answers, [`download_pandoc`] fetches the platform archive
//!    from [jgm/pandoc releases](https://github.com/jgm/pandoc/releases),
//!    extracts the `pandoc` executable into the cache dir and marks it
//!    executable.
//! 3. [`probe`] version-queries the fresh copy before it is used.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pandoc_auto::{download_pandoc, locate_pandoc, probe};
//!
//! let pandoc = match locate_pandoc() {
//!     Some(p) => p,
//!     None => {
//!         let path = download_pandoc(Some(&|downloaded, total| {
//!             if let Some(t) = total {
//!                 eprint!("\rDownloading pandoc: {}/{} bytes", downloaded, t);
//!             }
//!         }))
//!         .expect("download failed");
//!         probe(&path).expect("downloaded pandoc does not run")
//!     }
//! };
//! println!("using pandoc {} at {}", pandoc.version, pandoc.path.display());
//! ```
//!
//! ## Platform support
//!
//! | OS      | Arch    | Release asset                          |
//! |---------|---------|----------------------------------------|
//! | Linux   | x86_64  | `pandoc-{VERSION}-linux-amd64.tar.gz`  |
//! | Linux   | aarch64 | `pandoc-{VERSION}-linux-arm64.tar.gz`  |
//! | macOS   | arm64   | `pandoc-{VERSION}-arm64-macOS.zip`     |
//! | macOS   | x86_64  | `pandoc-{VERSION}-x86_64-macOS.zip`    |
//! | Windows | x86_64  | `pandoc-{VERSION}-windows-x86_64.zip`  |
//!
//! ## Environment variable overrides
//!
//! - `PANDOC_PATH` — path to an existing pandoc executable; checked first.
//! - `PANDOC_AUTO_CACHE_DIR` — override the default cache directory.

use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

// ── Public constants ─────────────────────────────────────────────────────────

/// The pandoc release downloaded when no local copy is found.
pub const PANDOC_VERSION: &str = "3.6.4";

/// GitHub release base URL.
const BASE_URL: &str = "https://github.com/jgm/pandoc/releases/download";

/// Executable name on the current platform.
pub const PANDOC_BIN: &str = if cfg!(windows) {
    "pandoc.exe"
} else {
    "pandoc"
};

// ── Error type ───────────────────────────────────────────────────────────────

/// Errors returned by pandoc-auto operations.
#[derive(Error, Debug)]
pub enum PandocAutoError {
    /// No release asset exists for this OS/architecture combination.
    #[error("Unsupported platform: {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    /// Could not create or navigate the local cache directory.
    #[error("Cache directory error: {0}")]
    CacheDir(#[source] std::io::Error),

    /// Network download failed.
    #[error("Download failed: {0}")]
    Download(String),

    /// gzip/tar/zip extraction failed.
    #[error("Archive extraction failed: {0}")]
    Extract(String),

    /// `<program> --version` could not be run or did not succeed.
    #[error("'{program}' --version failed: {reason}")]
    VersionQuery { program: PathBuf, reason: String },
}

// ── A usable pandoc ──────────────────────────────────────────────────────────

/// A pandoc executable that answered a version query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pandoc {
    /// Program to execute (absolute path, or a bare name resolved via `PATH`).
    pub path: PathBuf,
    /// Version reported by `--version`, e.g. `"3.6.4"`.
    pub version: String,
}

/// Runs `<program> --version` and returns the reported version number.
pub fn pandoc_version(program: &Path) -> Result<String, PandocAutoError> {
    let output = Command::new(program)
        .arg("--version")
        .output()
        .map_err(|e| PandocAutoError::VersionQuery {
            program: program.to_path_buf(),
            reason: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(PandocAutoError::VersionQuery {
            program: program.to_path_buf(),
            reason: format!("exited with {}", output.status),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_version_output(&stdout).ok_or_else(|| PandocAutoError::VersionQuery {
        program: program.to_path_buf(),
        reason: format!(
            "unrecognised output: {:?}",
            stdout.lines().next().unwrap_or("")
        ),
    })
}

/// Version-queries `program`, returning it as a [`Pandoc`] on success.
pub fn probe(program: &Path) -> Result<Pandoc, PandocAutoError> {
    let version = pandoc_version(program)?;
    Ok(Pandoc {
        path: program.to_path_buf(),
        version,
    })
}

/// Extracts `3.6.4` from the first line of `pandoc --version` output
/// (`pandoc 3.6.4`, or `pandoc.exe 3.6.4` on Windows).
fn parse_version_output(stdout: &str) -> Option<String> {
    let first = stdout.lines().next()?;
    let mut parts = first.split_whitespace();
    let name = parts.next()?;
    if !name.starts_with("pandoc") {
        return None;
    }
    let version = parts.next()?;
    version
        .starts_with(|c: char| c.is_ascii_digit())
        .then(|| version.to_string())
}

// ── Internal: platform metadata ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArchiveKind {
    TarGz,
    Zip,
}

struct PlatformInfo {
    /// Asset filename suffix after `pandoc-{VERSION}-`, e.g. `linux-amd64.tar.gz`.
    asset_suffix: &'static str,
    kind: ArchiveKind,
}

impl PlatformInfo {
    fn archive_name(&self) -> String {
        format!("pandoc-{PANDOC_VERSION}-{}", self.asset_suffix)
    }
}

fn detect_platform() -> Result<PlatformInfo, PandocAutoError> {
    let os = std::env::consts::OS;
    let arch = std::env::consts::ARCH;

    match (os, arch) {
        ("linux", "x86_64") => Ok(PlatformInfo {
            asset_suffix: "linux-amd64.tar.gz",
            kind: ArchiveKind::TarGz,
        }),
        ("linux", "aarch64") => Ok(PlatformInfo {
            asset_suffix: "linux-arm64.tar.gz",
            kind: ArchiveKind::TarGz,
        }),
        ("macos", "aarch64") => Ok(PlatformInfo {
            asset_suffix: "arm64-macOS.zip",
            kind: ArchiveKind::Zip,
        }),
        ("macos", "x86_64") => Ok(PlatformInfo {
            asset_suffix: "x86_64-macOS.zip",
            kind: ArchiveKind::Zip,
        }),
        ("windows", "x86_64") => Ok(PlatformInfo {
            asset_suffix: "windows-x86_64.zip",
            kind: ArchiveKind::Zip,
        }),
        (os, arch) => Err(PandocAutoError::UnsupportedPlatform {
            os: os.to_string(),
            arch: arch.to_string(),
        }),
    }
}

// ── Cache directory resolution ───────────────────────────────────────────────

/// Returns the per-version cache directory for the downloaded pandoc.
///
/// Default locations:
/// - **macOS**: `~/Library/Caches/md2docx/pandoc-{VERSION}/`
/// - **Linux**: `~/.cache/md2docx/pandoc-{VERSION}/`
/// - **Windows**: `%LOCALAPPDATA%\md2docx\pandoc-{VERSION}\`
///
/// Override by setting `PANDOC_AUTO_CACHE_DIR`.
pub fn pandoc_cache_dir() -> PathBuf {
    cache_dir_from(std::env::var_os("PANDOC_AUTO_CACHE_DIR"))
}

fn cache_dir_from(override_dir: Option<OsString>) -> PathBuf {
    if let Some(dir) = override_dir.filter(|d| !d.is_empty()) {
        return PathBuf::from(dir).join(format!("pandoc-{PANDOC_VERSION}"));
    }

    let base = dirs::cache_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".cache")))
        .unwrap_or_else(std::env::temp_dir);

    base.join("md2docx").join(format!("pandoc-{PANDOC_VERSION}"))
}

/// Returns the cached pandoc executable, or `None` if it was never downloaded.
pub fn cached_pandoc_path() -> Option<PathBuf> {
    let p = pandoc_cache_dir().join(PANDOC_BIN);
    p.exists().then_some(p)
}

// ── Discovery ────────────────────────────────────────────────────────────────

/// Finds a pandoc that answers `--version`, without touching the network.
///
/// Candidates, first usable wins: `PANDOC_PATH`, `pandoc` on `PATH`, the
/// cached download.
pub fn locate_pandoc() -> Option<Pandoc> {
    let mut candidates: Vec<PathBuf> = Vec::with_capacity(3);

    if let Some(p) = std::env::var_os("PANDOC_PATH").filter(|p| !p.is_empty()) {
        let p = PathBuf::from(p);
        if p.exists() {
            candidates.push(p);
        } else {
            eprintln!(
                "pandoc-auto: PANDOC_PATH '{}' not found; searching PATH …",
                p.display()
            );
        }
    }
    candidates.push(PathBuf::from(PANDOC_BIN));
    if let Some(cached) = cached_pandoc_path() {
        candidates.push(cached);
    }

    candidates.iter().find_map(|c| probe(c).ok())
}

/// Downloads the pinned pandoc release into [`pandoc_cache_dir`] and returns
/// the path of the extracted executable.
///
/// Always hits the network; an existing cached copy is overwritten.
pub fn download_pandoc(
    on_progress: Option<&dyn Fn(u64, Option<u64>)>,
) -> Result<PathBuf, PandocAutoError> {
    let info = detect_platform()?;
    let cache_dir = pandoc_cache_dir();
    let dest = cache_dir.join(PANDOC_BIN);

    let url = format!("{}/{}/{}", BASE_URL, PANDOC_VERSION, info.archive_name());

    std::fs::create_dir_all(&cache_dir).map_err(PandocAutoError::CacheDir)?;

    let archive_bytes = download_bytes(&url, on_progress)?;
    match info.kind {
        ArchiveKind::TarGz => extract_from_tar_gz(&archive_bytes, PANDOC_BIN, &dest)?,
        ArchiveKind::Zip => extract_from_zip(&archive_bytes, PANDOC_BIN, &dest)?,
    }
    mark_executable(&dest)?;

    Ok(dest)
}

// ── Internal helpers ─────────────────────────────────────────────────────────

/// Streams a URL into a `Vec<u8>`, calling `on_progress` every 64 KiB.
fn download_bytes(
    url: &str,
    on_progress: Option<&dyn Fn(u64, Option<u64>)>,
) -> Result<Vec<u8>, PandocAutoError> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!("pandoc-auto/", env!("CARGO_PKG_VERSION")))
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(|e| PandocAutoError::Download(e.to_string()))?;

    let response = client
        .get(url)
        .send()
        .map_err(|e| PandocAutoError::Download(format!("GET {url}: {e}")))?;

    if !response.status().is_success() {
        return Err(PandocAutoError::Download(format!(
            "HTTP {} for {url}",
            response.status()
        )));
    }

    let total = response.content_length();
    let capacity = total.unwrap_or(40 * 1024 * 1024) as usize;
    let mut buf = Vec::with_capacity(capacity);

    let mut stream = response;
    let mut chunk = vec![0u8; 64 * 1024];
    let mut downloaded: u64 = 0;

    loop {
        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                downloaded += n as u64;
                if let Some(cb) = on_progress {
                    cb(downloaded, total);
                }
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(PandocAutoError::Download(format!("Read error: {e}")));
            }
        }
    }

    Ok(buf)
}

fn has_file_name(entry_path: &Path, bin_name: &str) -> bool {
    entry_path
        .file_name()
        .is_some_and(|n| n.to_string_lossy() == bin_name)
}

/// Extracts the first regular file named `bin_name` from a gzipped tarball.
///
/// Release tarballs nest the binary as `pandoc-{VERSION}/bin/pandoc`.
fn extract_from_tar_gz(
    archive_bytes: &[u8],
    bin_name: &str,
    dest_path: &Path,
) -> Result<(), PandocAutoError> {
    use flate2::read::GzDecoder;
    use tar::Archive;

    let mut archive = Archive::new(GzDecoder::new(archive_bytes));

    for entry in archive
        .entries()
        .map_err(|e| PandocAutoError::Extract(e.to_string()))?
    {
        let mut entry = entry.map_err(|e| PandocAutoError::Extract(e.to_string()))?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let entry_path = entry
            .path()
            .map_err(|e| PandocAutoError::Extract(e.to_string()))?
            .into_owned();

        if has_file_name(&entry_path, bin_name) {
            entry
                .unpack(dest_path)
                .map_err(|e| PandocAutoError::Extract(format!("Unpack failed: {e}")))?;
            return Ok(());
        }
    }

    Err(PandocAutoError::Extract(format!(
        "'{bin_name}' not found in archive"
    )))
}

/// Extracts the first regular file named `bin_name` from a zip archive.
fn extract_from_zip(
    archive_bytes: &[u8],
    bin_name: &str,
    dest_path: &Path,
) -> Result<(), PandocAutoError> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(archive_bytes))
        .map_err(|e| PandocAutoError::Extract(e.to_string()))?;

    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| PandocAutoError::Extract(e.to_string()))?;
        if !file.is_file() || !has_file_name(Path::new(file.name()), bin_name) {
            continue;
        }

        let mut out = std::fs::File::create(dest_path)
            .map_err(|e| PandocAutoError::Extract(format!("Create failed: {e}")))?;
        std::io::copy(&mut file, &mut out)
            .map_err(|e| PandocAutoError::Extract(format!("Unpack failed: {e}")))?;
        return Ok(());
    }

    Err(PandocAutoError::Extract(format!(
        "'{bin_name}' not found in archive"
    )))
}

#[cfg(unix)]
fn mark_executable(path: &Path) -> Result<(), PandocAutoError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .map_err(|e| PandocAutoError::Extract(format!("chmod failed: {e}")))
}

#[cfg(not(unix))]
fn mark_executable(_path: &Path) -> Result<(), PandocAutoError> {
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_unix_version_line() {
        let out = "pandoc 3.6.4\nFeatures: +server +lua\nScripting engine: Lua 5.4\n";
        assert_eq!(parse_version_output(out).as_deref(), Some("3.6.4"));
    }

    #[test]
    fn parses_windows_version_line() {
        assert_eq!(
            parse_version_output("pandoc.exe 2.19.2\r\n").as_deref(),
            Some("2.19.2")
        );
    }

    #[test]
    fn rejects_foreign_version_output() {
        assert_eq!(parse_version_output("cat (GNU coreutils) 9.4"), None);
        assert_eq!(parse_version_output("pandoc"), None);
        assert_eq!(parse_version_output(""), None);
    }

    #[test]
    fn missing_program_fails_version_query() {
        let err = pandoc_version(Path::new("/definitely/not/pandoc")).unwrap_err();
        assert!(matches!(err, PandocAutoError::VersionQuery { .. }));
        assert!(err.to_string().contains("/definitely/not/pandoc"));
    }

    #[test]
    #[cfg(any(
        all(target_os = "linux", any(target_arch = "x86_64", target_arch = "aarch64")),
        target_os = "macos",
        all(target_os = "windows", target_arch = "x86_64")
    ))]
    fn detect_platform_is_supported() {
        let info = detect_platform().expect("current platform should be supported");
        let name = info.archive_name();
        assert!(name.starts_with(&format!("pandoc-{PANDOC_VERSION}-")));
        assert!(name.ends_with(".tar.gz") || name.ends_with(".zip"));
    }

    #[test]
    fn cache_dir_is_deterministic() {
        let d1 = cache_dir_from(None);
        let d2 = cache_dir_from(None);
        assert_eq!(d1, d2);
        assert!(d1.to_string_lossy().contains("md2docx"));
        assert!(d1.to_string_lossy().contains(PANDOC_VERSION));
    }

    #[test]
    fn cache_dir_override() {
        let d = cache_dir_from(Some(OsString::from("/tmp/test_md2docx_override")));
        assert!(d.starts_with("/tmp/test_md2docx_override"));
        assert!(d.ends_with(format!("pandoc-{PANDOC_VERSION}")));
    }

    #[test]
    fn empty_override_falls_back_to_default() {
        assert_eq!(cache_dir_from(Some(OsString::new())), cache_dir_from(None));
    }

    fn tar_gz_with(entries: &[(&str, &[u8])]) -> Vec<u8> {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
        for (path, data) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            builder.append_data(&mut header, path, *data).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    fn zip_with(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();
        for (path, data) in entries {
            writer.start_file(*path, options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn extracts_nested_binary_from_tarball() {
        let archive = tar_gz_with(&[
            ("pandoc-3.6.4/share/man/man1/pandoc.1.gz", b"man"),
            ("pandoc-3.6.4/bin/pandoc", b"ELF-binary"),
        ]);
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("pandoc");

        extract_from_tar_gz(&archive, "pandoc", &dest).unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"ELF-binary");
    }

    #[test]
    fn tarball_without_binary_is_an_error() {
        let archive = tar_gz_with(&[("pandoc-3.6.4/README", b"readme")]);
        let dir = tempfile::tempdir().unwrap();
        let err = extract_from_tar_gz(&archive, "pandoc", &dir.path().join("pandoc")).unwrap_err();
        assert!(matches!(err, PandocAutoError::Extract(_)));
    }

    #[test]
    fn extracts_binary_from_zip() {
        let archive = zip_with(&[
            ("pandoc-3.6.4/COPYRIGHT.txt", b"c"),
            ("pandoc-3.6.4/pandoc.exe", b"MZ-binary"),
        ]);
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("pandoc.exe");

        extract_from_zip(&archive, "pandoc.exe", &dest).unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"MZ-binary");
    }

    #[test]
    fn garbage_is_not_a_zip() {
        let dir = tempfile::tempdir().unwrap();
        let err = extract_from_zip(b"not a zip", "pandoc", &dir.path().join("pandoc")).unwrap_err();
        assert!(matches!(err, PandocAutoError::Extract(_)));
    }

    #[test]
    #[cfg(unix)]
    fn mark_executable_sets_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("pandoc");
        std::fs::write(&p, b"x").unwrap();
        mark_executable(&p).unwrap();
        let mode = std::fs::metadata(&p).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}
