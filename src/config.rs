//! Server configuration module.
//!
//! Handles loading and validating `config.toml`, and layering command-line
//! overrides on top. Configuration is read once at startup and never changes
//! afterwards.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [gallery]
//! root = "."              # Directory to index (searched recursively)
//! prefix = "/gallery"     # Route prefix for gallery pages
//! page_size = 30          # Images per page
//! page_window = 1         # Page links shown on each side of the current page
//!
//! [thumbnails]
//! size = 80               # Edge length (crop) or width (fit) in pixels
//! policy = "crop"         # "crop" = centered square, "fit" = keep aspect ratio
//! quality = 85            # JPEG quality (1-100)
//!
//! [server]
//! bind = "0.0.0.0"
//! port = 8000
//!
//! [proxy]
//! upstream = "http://127.0.0.1:7860"   # Empty string disables the proxy
//!
//! [index]
//! refresh = "manual"      # "manual" = GET {prefix}/refresh/, "watch" = filesystem events
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse; override just the values you want:
//!
//! ```toml
//! [gallery]
//! root = "/srv/photos"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{MAX_THUMBNAIL_EDGE, Quality, ThumbnailConfig, ThumbnailPolicy};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Image directory does not exist: {0}")]
    NotFound(PathBuf),
    #[error("Image directory is not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Server configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// What to index and how to page through it.
    pub gallery: GalleryConfig,
    /// Thumbnail rendering settings.
    pub thumbnails: ThumbnailsConfig,
    /// Listen address.
    pub server: ListenConfig,
    /// Fallback reverse proxy for non-gallery paths.
    pub proxy: ProxyConfig,
    /// Index refresh strategy.
    pub index: IndexConfig,
}

impl ServerConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gallery.page_size == 0 {
            return Err(ConfigError::Validation(
                "gallery.page_size must be at least 1".into(),
            ));
        }
        if self.gallery.page_window > MAX_PAGE_WINDOW {
            return Err(ConfigError::Validation(format!(
                "gallery.page_window must be 0-{MAX_PAGE_WINDOW}"
            )));
        }
        let prefix = &self.gallery.prefix;
        if !prefix.starts_with('/') || prefix.len() < 2 || prefix.ends_with('/') {
            return Err(ConfigError::Validation(format!(
                "gallery.prefix must look like \"/name\", got {prefix:?}"
            )));
        }
        if self.thumbnails.size == 0 || self.thumbnails.size > MAX_THUMBNAIL_EDGE {
            return Err(ConfigError::Validation(format!(
                "thumbnails.size must be 1-{MAX_THUMBNAIL_EDGE}"
            )));
        }
        if !(1..=100).contains(&self.thumbnails.quality) {
            return Err(ConfigError::Validation(
                "thumbnails.quality must be 1-100".into(),
            ));
        }
        self.proxy.upstream_url()?;
        Ok(())
    }

    /// Apply command-line overrides; `None` fields keep the file value.
    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(root) = overrides.root {
            self.gallery.root = root;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(upstream) = overrides.upstream {
            self.proxy.upstream = upstream;
        }
        if let Some(page_size) = overrides.page_size {
            self.gallery.page_size = page_size;
        }
        if let Some(size) = overrides.thumb_size {
            self.thumbnails.size = size;
        }
        if overrides.watch {
            self.index.refresh = RefreshMode::Watch;
        }
    }

    pub fn thumbnail_config(&self) -> ThumbnailConfig {
        ThumbnailConfig {
            size: self.thumbnails.size,
            policy: self.thumbnails.policy,
            quality: Quality::new(self.thumbnails.quality),
        }
    }
}

const MAX_PAGE_WINDOW: usize = 1000;

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub root: Option<PathBuf>,
    pub port: Option<u16>,
    pub upstream: Option<String>,
    pub page_size: Option<usize>,
    pub thumb_size: Option<u32>,
    pub watch: bool,
}

/// What to index and how to page through it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Directory scanned for images.
    pub root: PathBuf,
    /// Route prefix, without a trailing slash.
    pub prefix: String,
    /// Images per page.
    pub page_size: usize,
    /// Page links on each side of the current page.
    pub page_window: usize,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            prefix: "/gallery".to_string(),
            page_size: 30,
            page_window: 1,
        }
    }
}

/// Thumbnail rendering settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailsConfig {
    /// Edge length for `crop`, width for `fit`.
    pub size: u32,
    pub policy: ThumbnailPolicy,
    /// JPEG quality (1 = worst, 100 = best).
    pub quality: u8,
}

impl Default for ThumbnailsConfig {
    fn default() -> Self {
        Self {
            size: 80,
            policy: ThumbnailPolicy::Crop,
            quality: Quality::default().value(),
        }
    }
}

/// Listen address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListenConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl ListenConfig {
    /// `bind:port`, ready for `TcpListener::bind`.
    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

/// Fallback reverse proxy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProxyConfig {
    /// Upstream origin. Empty disables proxying.
    pub upstream: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            upstream: "http://127.0.0.1:7860".to_string(),
        }
    }
}

impl ProxyConfig {
    /// The parsed upstream, or `None` when proxying is disabled.
    pub fn upstream_url(&self) -> Result<Option<Url>, ConfigError> {
        let raw = self.upstream.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        let url = Url::parse(raw)
            .map_err(|e| ConfigError::Validation(format!("proxy.upstream {raw:?}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Validation(format!(
                "proxy.upstream must be http or https, got {raw:?}"
            )));
        }
        Ok(Some(url))
    }
}

/// Which refresh strategy keeps the index current.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshMode {
    /// Rebuild on `GET {prefix}/refresh/`.
    #[default]
    Manual,
    /// Rebuild on every filesystem change under the root.
    Watch,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexConfig {
    pub refresh: RefreshMode,
}

/// Load and validate a config file.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: ServerConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Canonicalize the image root, rejecting anything that is not a directory.
pub fn resolve_root(root: &Path) -> Result<PathBuf, ConfigError> {
    let meta = match fs::metadata(root) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConfigError::NotFound(root.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };
    if !meta.is_dir() {
        return Err(ConfigError::NotADirectory(root.to_path_buf()));
    }
    Ok(fs::canonicalize(root)?)
}

/// A documented `config.toml` with every option at its default.
pub fn stock_config_toml() -> &'static str {
    r#"# image-browse configuration
# All options are optional; the values below are the defaults.

[gallery]
# Directory to index, searched recursively for .jpg .jpeg .png .gif .bmp
root = "."
# Route prefix for the gallery pages
prefix = "/gallery"
# Images per page
page_size = 30
# Page links shown on each side of the current page
page_window = 1

[thumbnails]
# Edge length (crop) or width (fit) in pixels
size = 80
# "crop" = centered square, "fit" = keep aspect ratio
policy = "crop"
# JPEG quality (1-100)
quality = 85

[server]
bind = "0.0.0.0"
port = 8000

[proxy]
# Every request outside the gallery prefix is forwarded here.
# Set to "" to disable proxying.
upstream = "http://127.0.0.1:7860"

[index]
# "manual" = rebuild on GET {prefix}/refresh/
# "watch"  = rebuild on every filesystem change under the root
refresh = "manual"
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(toml_src: &str) -> Result<ServerConfig, ConfigError> {
        let config: ServerConfig = toml::from_str(toml_src)?;
        config.validate()?;
        Ok(config)
    }

    #[test]
    fn stock_config_matches_defaults() {
        let parsed: ServerConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(parsed, ServerConfig::default());
        parsed.validate().unwrap();
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config.gallery.page_size, 30);
        assert_eq!(config.thumbnails.size, 80);
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.index.refresh, RefreshMode::Manual);
    }

    #[test]
    fn partial_config_overrides_only_given_keys() {
        let config = parse(
            r#"
            [gallery]
            page_size = 12

            [index]
            refresh = "watch"
            "#,
        )
        .unwrap();
        assert_eq!(config.gallery.page_size, 12);
        assert_eq!(config.gallery.prefix, "/gallery");
        assert_eq!(config.index.refresh, RefreshMode::Watch);
    }

    #[test]
    fn unknown_keys_rejected() {
        let result = parse("[gallery]\npage_sise = 10\n");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn zero_page_size_rejected() {
        let result = parse("[gallery]\npage_size = 0\n");
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn page_window_bounded() {
        assert!(parse("[gallery]\npage_window = 0\n").is_ok());
        assert!(parse("[gallery]\npage_window = 1000\n").is_ok());
        assert!(matches!(
            parse("[gallery]\npage_window = 1001\n"),
            Err(ConfigError::Validation(_))
        ));
        assert!(matches!(
            parse("[gallery]\npage_window = 9223372036854775807\n"),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn bad_prefixes_rejected() {
        for prefix in ["gallery", "/", "/gallery/", ""] {
            let result = parse(&format!("[gallery]\nprefix = {prefix:?}\n"));
            assert!(
                matches!(result, Err(ConfigError::Validation(_))),
                "{prefix:?} should be rejected"
            );
        }
    }

    #[test]
    fn thumbnail_bounds_validated() {
        assert!(parse("[thumbnails]\nsize = 0\n").is_err());
        assert!(parse("[thumbnails]\nsize = 5000\n").is_err());
        assert!(parse("[thumbnails]\nquality = 0\n").is_err());
        assert!(parse("[thumbnails]\nquality = 101\n").is_err());
        assert!(parse("[thumbnails]\nquality = 300\n").is_err());
        assert!(parse("[thumbnails]\npolicy = \"fit\"\nquality = 100\n").is_ok());
    }

    #[test]
    fn upstream_parsing() {
        let disabled = ProxyConfig {
            upstream: "  ".into(),
        };
        assert!(disabled.upstream_url().unwrap().is_none());

        let url = ProxyConfig::default().upstream_url().unwrap().unwrap();
        assert_eq!(url.host_str(), Some("127.0.0.1"));
        assert_eq!(url.port(), Some(7860));

        assert!(parse("[proxy]\nupstream = \"not a url\"\n").is_err());
        assert!(parse("[proxy]\nupstream = \"ftp://example.com\"\n").is_err());
    }

    #[test]
    fn overrides_take_precedence() {
        let mut config = ServerConfig::default();
        config.apply(Overrides {
            root: Some("/srv/photos".into()),
            port: Some(9000),
            upstream: Some(String::new()),
            page_size: Some(50),
            thumb_size: Some(120),
            watch: true,
        });
        assert_eq!(config.gallery.root, PathBuf::from("/srv/photos"));
        assert_eq!(config.server.port, 9000);
        assert!(config.proxy.upstream_url().unwrap().is_none());
        assert_eq!(config.gallery.page_size, 50);
        assert_eq!(config.thumbnails.size, 120);
        assert_eq!(config.index.refresh, RefreshMode::Watch);
    }

    #[test]
    fn empty_overrides_change_nothing() {
        let mut config = ServerConfig::default();
        config.apply(Overrides::default());
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn thumbnail_config_from_settings() {
        let config = parse("[thumbnails]\nsize = 64\npolicy = \"fit\"\nquality = 70\n").unwrap();
        let thumb = config.thumbnail_config();
        assert_eq!(thumb.size, 64);
        assert_eq!(thumb.policy, ThumbnailPolicy::Fit);
        assert_eq!(thumb.quality.value(), 70);
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[server]\nport = 8123\n").unwrap();
        assert_eq!(load_config(&path).unwrap().server.port, 8123);
    }

    #[test]
    fn load_config_missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let result = load_config(&tmp.path().join("nope.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn resolve_root_accepts_directory() {
        let tmp = TempDir::new().unwrap();
        let resolved = resolve_root(tmp.path()).unwrap();
        assert!(resolved.is_absolute());
        assert_eq!(resolved, fs::canonicalize(tmp.path()).unwrap());
    }

    #[test]
    fn resolve_root_rejects_missing_and_files() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("missing");
        assert!(matches!(
            resolve_root(&missing),
            Err(ConfigError::NotFound(_))
        ));

        let file = tmp.path().join("file.jpg");
        fs::write(&file, b"x").unwrap();
        assert!(matches!(
            resolve_root(&file),
            Err(ConfigError::NotADirectory(_))
        ));
    }

    #[test]
    fn listen_address_formats() {
        assert_eq!(ListenConfig::default().address(), "0.0.0.0:8000");
    }
}
