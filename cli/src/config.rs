use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

pub const DEFAULT_ANALYZER_URL: &str = "https://toolkit.rork.com/text/llm/";

pub struct Config {
    pub db_path: PathBuf,
    pub analyzer_url: String,
}

impl Config {
    /// Resolve paths from the platform data dir, honouring `PLATEWISE_DATA_DIR`
    /// and `PLATEWISE_ANALYZER_URL` when set.
    pub fn load() -> Result<Self> {
        let data_dir = match std::env::var_os("PLATEWISE_DATA_DIR") {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => ProjectDirs::from("", "", "platewise")
                .context("Could not determine home directory")?
                .data_dir()
                .to_path_buf(),
        };
        let analyzer_url = std::env::var("PLATEWISE_ANALYZER_URL")
            .ok()
            .filter(|u| !u.trim().is_empty());

        Self::from_data_dir(&data_dir, analyzer_url)
    }

    pub fn from_data_dir(data_dir: &Path, analyzer_url: Option<String>) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        Ok(Config {
            db_path: data_dir.join("platewise.db"),
            analyzer_url: analyzer_url.unwrap_or_else(|| DEFAULT_ANALYZER_URL.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_data_dir_creates_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("platewise");
        let config = Config::from_data_dir(&dir, None).unwrap();
        assert!(dir.is_dir());
        assert_eq!(config.db_path, dir.join("platewise.db"));
        assert_eq!(config.analyzer_url, DEFAULT_ANALYZER_URL);
    }

    #[test]
    fn test_from_data_dir_custom_url() {
        let tmp = tempfile::tempdir().unwrap();
        let config =
            Config::from_data_dir(tmp.path(), Some("http://localhost:9000/llm".to_string()))
                .unwrap();
        assert_eq!(config.analyzer_url, "http://localhost:9000/llm");
    }
}
