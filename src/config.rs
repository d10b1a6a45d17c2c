//! Configuration types for Markdown-to-DOCX conversion.
//!
//! Everything that changes how pandoc is found or invoked lives in
//! [`ConversionConfig`], built via its [`ConversionConfigBuilder`]. The
//! normalisation rules themselves are fixed and take no options.

use crate::error::Md2DocxError;
use std::path::PathBuf;

/// Configuration for a Markdown-to-DOCX conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use md2docx::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .auto_download(false)
///     .extra_arg("--toc")
///     .build()
///     .unwrap();
/// assert_eq!(config.extra_args, vec!["--toc".to_string()]);
/// ```
#[derive(Debug, Clone)]
pub struct ConversionConfig {
    /// Explicit pandoc executable. If None, discovery runs
    /// (`PANDOC_PATH`, `PATH`, then the download cache).
    pub pandoc_path: Option<PathBuf>,

    /// Download pandoc when no working copy is found. Default: true.
    pub auto_download: bool,

    /// pandoc reader passed as `--from`. Default: `"markdown"`.
    ///
    /// Use `"gfm"` for GitHub-flavoured input, or append extensions such as
    /// `"markdown+hard_line_breaks"`.
    pub reader: String,

    /// Styling template passed as `--reference-doc`.
    pub reference_doc: Option<PathBuf>,

    /// Extra arguments forwarded verbatim to pandoc, before the input path.
    pub extra_args: Vec<String>,

    /// Leave `<stem>_temp.md` on disk after a successful conversion. Default: false.
    pub keep_intermediate: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            pandoc_path: None,
            auto_download: true,
            reader: "markdown".to_string(),
            reference_doc: None,
            extra_args: Vec::new(),
            keep_intermediate: false,
        }
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn pandoc_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pandoc_path = Some(path.into());
        self
    }

    pub fn auto_download(mut self, v: bool) -> Self {
        self.config.auto_download = v;
        self
    }

    pub fn reader(mut self, reader: impl Into<String>) -> Self {
        self.config.reader = reader.into();
        self
    }

    pub fn reference_doc(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.reference_doc = Some(path.into());
        self
    }

    pub fn extra_arg(mut self, arg: impl Into<String>) -> Self {
        self.config.extra_args.push(arg.into());
        self
    }

    pub fn extra_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.extra_args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn keep_intermediate(mut self, v: bool) -> Self {
        self.config.keep_intermediate = v;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Md2DocxError> {
        let c = &self.config;
        if c.reader.trim().is_empty() {
            return Err(Md2DocxError::InvalidConfig(
                "pandoc reader must not be empty".into(),
            ));
        }
        if let Some(ref doc) = c.reference_doc {
            if !doc.is_file() {
                return Err(Md2DocxError::InvalidConfig(format!(
                    "reference document '{}' does not exist",
                    doc.display()
                )));
            }
        }
        Ok(self.config)
    }
}
