use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::agenda::DEFAULT_LOOKBACK_DAYS;
use crate::error::{Error, Result};
use crate::store::FsStorage;

/// Overrides `vault_path` when set.
pub const VAULT_ENV: &str = "DAYBOOK_VAULT";

fn default_vault_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("~/.local/share"))
        .join("daybook")
}

fn default_true() -> bool {
    true
}

fn default_lookback_days() -> u32 {
    DEFAULT_LOOKBACK_DAYS
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct DaybookConfig {
    /// Notes vault holding the `TODO` folder.
    #[serde(default)]
    pub vault_path: Option<PathBuf>,
    #[serde(default = "default_true", rename = "autoLaunch", alias = "auto_launch")]
    pub auto_launch: bool,
    #[serde(default)]
    pub debug_logging: bool,
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
}

impl Default for DaybookConfig {
    fn default() -> Self {
        Self {
            vault_path: None,
            auto_launch: true,
            debug_logging: false,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
        }
    }
}

impl DaybookConfig {
    /// Where the config lives: `<config dir>/daybook/config.json`.
    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("daybook").join("config.json"))
            .ok_or_else(|| Error::Config("no config directory on this platform".into()))
    }

    /// Load from the default path, applying the environment override.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::default_path()?)?;
        if let Some(vault) = std::env::var_os(VAULT_ENV) {
            config.vault_path = Some(PathBuf::from(vault));
        }
        Ok(config)
    }

    /// Load from `path`; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(data) => Ok(serde_json::from_str(&data)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(Error::io(path, e)),
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data).map_err(|e| Error::io(path, e))
    }

    pub fn vault_dir(&self) -> PathBuf {
        self.vault_path.clone().unwrap_or_else(default_vault_dir)
    }

    pub fn todo_dir(&self) -> PathBuf {
        self.vault_dir().join("TODO")
    }

    pub fn memo_dir(&self) -> PathBuf {
        self.todo_dir().join("memo")
    }

    /// Ensure the TODO and memo folders exist.
    pub fn ensure_folders(&self) -> Result<()> {
        let memo_dir = self.memo_dir();
        std::fs::create_dir_all(&memo_dir).map_err(|e| Error::io(&memo_dir, e))
    }

    /// Filesystem storage rooted at this config's TODO folder.
    pub fn storage(&self) -> FsStorage {
        FsStorage::new(self.todo_dir())
    }
}
