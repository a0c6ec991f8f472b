//! Configuration for vidshelf.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (VIDSHELF_HOME, VIDSHELF_MEDIA, VIDSHELF_OWNERSHIP)
//! 2. Config file (.vidshelf/config.yaml)
//! 3. Defaults (~/.vidshelf)
//!
//! Config file discovery:
//! - Searches current directory and parents for .vidshelf/config.yaml
//! - `paths.home` is relative to the .vidshelf/ directory, `paths.media` to
//!   the project root (the directory containing .vidshelf/)

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::adapters::{ytdlp, YtDlpFetcher};
use crate::library::OwnershipMode;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub ownership: Option<OwnershipConfig>,
    #[serde(default)]
    pub fetcher: Option<FetcherConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// Data directory (relative to .vidshelf/)
    pub home: Option<String>,
    /// Media storage area (relative to the project root)
    pub media: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwnershipConfig {
    pub mode: Option<OwnershipMode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    pub binary: Option<String>,
    pub format: Option<String>,
    pub timeout_seconds: Option<u64>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Data directory (videos.json, playlists.json, users.json)
    pub home: PathBuf,
    /// Media storage area
    pub media: PathBuf,
    /// Visibility rule for unowned records
    pub ownership: OwnershipMode,
    /// Downloader settings
    pub fetcher: FetcherSettings,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct FetcherSettings {
    pub binary: String,
    pub format: String,
    pub timeout_seconds: u64,
}

impl Default for FetcherSettings {
    fn default() -> Self {
        Self {
            binary: "yt-dlp".to_string(),
            format: ytdlp::DEFAULT_FORMAT.to_string(),
            timeout_seconds: ytdlp::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl FetcherSettings {
    /// Build the yt-dlp fetcher these settings describe
    pub fn build(&self) -> YtDlpFetcher {
        YtDlpFetcher::new()
            .with_binary_path(&self.binary)
            .with_format(&self.format)
            .with_timeout(Duration::from_secs(self.timeout_seconds))
    }
}

impl ResolvedConfig {
    pub fn videos_path(&self) -> PathBuf {
        self.home.join("videos.json")
    }

    pub fn playlists_path(&self) -> PathBuf {
        self.home.join("playlists.json")
    }

    pub fn users_path(&self) -> PathBuf {
        self.home.join("users.json")
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".vidshelf").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's parent
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Ownership mode from the environment, if set
fn ownership_from_env() -> Result<Option<OwnershipMode>> {
    match std::env::var("VIDSHELF_OWNERSHIP") {
        Ok(value) => value
            .parse()
            .map(Some)
            .context("Invalid VIDSHELF_OWNERSHIP"),
        Err(_) => Ok(None),
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    // Default home directory
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".vidshelf");

    // Check for config file
    let config_file = find_config_file();
    let env_ownership = ownership_from_env()?;

    let (home, media, ownership, fetcher) = if let Some(ref config_path) = config_file {
        let config = load_config_file(config_path)?;

        // .vidshelf/ and the project root that contains it
        let vidshelf_dir = config_path.parent().unwrap_or(Path::new("."));
        let base_dir = vidshelf_dir.parent().unwrap_or(Path::new("."));

        let home = if let Ok(env_home) = std::env::var("VIDSHELF_HOME") {
            PathBuf::from(env_home)
        } else if let Some(ref home_path) = config.paths.home {
            resolve_path(vidshelf_dir, home_path)
        } else {
            default_home.clone()
        };

        let media = if let Ok(env_media) = std::env::var("VIDSHELF_MEDIA") {
            PathBuf::from(env_media)
        } else if let Some(ref media_path) = config.paths.media {
            resolve_path(base_dir, media_path)
        } else {
            home.join("downloads")
        };

        let ownership = env_ownership
            .or_else(|| config.ownership.as_ref().and_then(|o| o.mode))
            .unwrap_or_default();

        let defaults = FetcherSettings::default();
        let fetcher = match config.fetcher {
            Some(f) => FetcherSettings {
                binary: f.binary.unwrap_or(defaults.binary),
                format: f.format.unwrap_or(defaults.format),
                timeout_seconds: f.timeout_seconds.unwrap_or(defaults.timeout_seconds),
            },
            None => defaults,
        };

        (home, media, ownership, fetcher)
    } else {
        // No config file - use env vars or defaults
        let home = std::env::var("VIDSHELF_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_home.clone());

        let media = std::env::var("VIDSHELF_MEDIA")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join("downloads"));

        (
            home,
            media,
            env_ownership.unwrap_or_default(),
            FetcherSettings::default(),
        )
    };

    Ok(ResolvedConfig {
        home,
        media,
        ownership,
        fetcher,
        config_file,
    })
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let vidshelf_dir = temp.path().join(".vidshelf");
        std::fs::create_dir_all(&vidshelf_dir).unwrap();

        let config_path = vidshelf_dir.join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
version: "1.0"
paths:
  home: ./data
  media: downloads
ownership:
  mode: legacy-open
fetcher:
  binary: /usr/local/bin/yt-dlp
  timeout_seconds: 60
"#
        )
        .unwrap();

        let config = load_config_file(&config_path).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.paths.home, Some("./data".to_string()));
        assert_eq!(config.paths.media, Some("downloads".to_string()));
        assert_eq!(
            config.ownership.unwrap().mode,
            Some(OwnershipMode::LegacyOpen)
        );

        let fetcher = config.fetcher.unwrap();
        assert_eq!(fetcher.binary.as_deref(), Some("/usr/local/bin/yt-dlp"));
        assert_eq!(fetcher.format, None);
        assert_eq!(fetcher.timeout_seconds, Some(60));
    }

    #[test]
    fn test_minimal_config_file() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.yaml");
        std::fs::write(&config_path, "version: \"1.0\"\n").unwrap();

        let config = load_config_file(&config_path).unwrap();
        assert!(config.paths.home.is_none());
        assert!(config.ownership.is_none());
        assert!(config.fetcher.is_none());
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = PathBuf::from("/home/user/project");

        assert_eq!(
            resolve_path(&base, "./subdir"),
            PathBuf::from("/home/user/project/subdir")
        );
        assert_eq!(
            resolve_path(&base, "/absolute/path"),
            PathBuf::from("/absolute/path")
        );
    }

    #[test]
    fn test_resolved_paths() {
        let config = ResolvedConfig {
            home: PathBuf::from("/test/.vidshelf"),
            media: PathBuf::from("/test/.vidshelf/downloads"),
            ownership: OwnershipMode::Strict,
            fetcher: FetcherSettings::default(),
            config_file: None,
        };

        assert_eq!(config.videos_path(), PathBuf::from("/test/.vidshelf/videos.json"));
        assert_eq!(
            config.playlists_path(),
            PathBuf::from("/test/.vidshelf/playlists.json")
        );
        assert_eq!(config.users_path(), PathBuf::from("/test/.vidshelf/users.json"));
    }

    #[test]
    fn test_fetcher_defaults() {
        let settings = FetcherSettings::default();
        assert_eq!(settings.binary, "yt-dlp");
        assert_eq!(settings.format, "bestvideo+bestaudio/best");
        assert_eq!(settings.timeout_seconds, 1800);
    }
}
