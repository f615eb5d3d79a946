//! lectern configuration: chunk sizes, pagination, and cache location.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::content::DEFAULT_PAGE_CHARS;
use crate::error::{LecternError, Result};
use crate::text::{DEFAULT_EMBEDDING_CHUNK_CHARS, DEFAULT_PLAYBACK_CHUNK_CHARS};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LecternConfig {
    /// Soft character limit for playback (text-to-speech) chunks
    #[serde(default = "default_playback_chunk_chars")]
    pub playback_chunk_chars: usize,

    /// Soft character limit for embedding chunks
    #[serde(default = "default_embedding_chunk_chars")]
    pub embedding_chunk_chars: usize,

    /// Characters per page when paginating fetched book text
    #[serde(default = "default_page_chars")]
    pub page_chars: usize,

    /// Embedding cache directory. Defaults to the platform data dir.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

fn default_playback_chunk_chars() -> usize {
    DEFAULT_PLAYBACK_CHUNK_CHARS
}

fn default_embedding_chunk_chars() -> usize {
    DEFAULT_EMBEDDING_CHUNK_CHARS
}

fn default_page_chars() -> usize {
    DEFAULT_PAGE_CHARS
}

impl Default for LecternConfig {
    fn default() -> Self {
        Self {
            playback_chunk_chars: default_playback_chunk_chars(),
            embedding_chunk_chars: default_embedding_chunk_chars(),
            page_chars: default_page_chars(),
            cache_dir: None,
        }
    }
}

impl LecternConfig {
    /// Get the config file path: ~/.config/lectern/lectern.toml
    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .map_err(|_| LecternError::Config("HOME not set".to_string()))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("lectern")
            .join("lectern.toml"))
    }

    /// Load config from file, returning defaults if the file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: LecternConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Resolve the embedding cache directory.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.cache_dir {
            return Ok(dir.clone());
        }

        dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .map(|d| d.join("lectern").join("embeddings"))
            .ok_or_else(|| LecternError::Config("could not determine data directory".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LecternConfig::default();
        assert_eq!(config.playback_chunk_chars, 1000);
        assert_eq!(config.embedding_chunk_chars, 1000);
        assert_eq!(config.page_chars, 3000);
        assert!(config.cache_dir.is_none());
    }

    #[test]
    fn test_parse_partial_config() {
        let toml_str = r#"
playback_chunk_chars = 280
cache_dir = "/tmp/lectern-cache"
"#;
        let config: LecternConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.playback_chunk_chars, 280);
        assert_eq!(config.embedding_chunk_chars, 1000);
        assert_eq!(config.cache_dir, Some(PathBuf::from("/tmp/lectern-cache")));
        assert_eq!(config.cache_dir().unwrap(), PathBuf::from("/tmp/lectern-cache"));
    }

    #[test]
    fn test_parse_empty_config() {
        let config: LecternConfig = toml::from_str("").unwrap();
        assert_eq!(config.playback_chunk_chars, 1000);
    }
}
