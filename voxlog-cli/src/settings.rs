use anyhow::{Context, Result};
use directories::BaseDirs;
use serde::Deserialize;
use std::{fs, path::PathBuf};

#[derive(Debug, Clone)]
pub struct Settings {
    /// Absolute path of the tab-separated journal file.
    pub journal_path: PathBuf,
    /// Locale the engine speaks in (e.g. `en-US`, `de-DE`).
    pub locale: String,
    /// Stable id the engine keys per-user preferences by.
    pub user_id: String,
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    journal_path: Option<PathBuf>,
    locale: Option<String>,
    user_id: Option<String>,
}

impl Settings {
    /// Loads `config.toml` from the platform config directory and applies
    /// defaults. A missing or unreadable file just means defaults.
    pub fn load() -> Result<Self> {
        let file = Self::read_file_settings().unwrap_or_default();
        Ok(Self {
            journal_path: match file.journal_path {
                Some(path) => path,
                None => Self::default_journal_path()?,
            },
            locale: file.locale.unwrap_or_else(|| "en-US".to_string()),
            user_id: file.user_id.unwrap_or_else(|| "local".to_string()),
        })
    }

    fn read_file_settings() -> Result<FileSettings> {
        let base = BaseDirs::new().context("could not determine home directory")?;
        let path = base.config_dir().join("voxlog").join("config.toml");
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
    }

    /// Default journal location: `{data_dir}/voxlog/journal.tsv`
    /// - Linux:   `$XDG_DATA_HOME/voxlog` or `~/.local/share/voxlog`
    /// - macOS:   `~/Library/Application Support/voxlog`
    /// - Windows: `%APPDATA%\voxlog`
    fn default_journal_path() -> Result<PathBuf> {
        let base = BaseDirs::new().context("could not determine home directory")?;
        Ok(base.data_dir().join("voxlog").join("journal.tsv"))
    }
}
