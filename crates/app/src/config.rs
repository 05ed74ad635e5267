use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tally_import::{SuggestionEngine, DEFAULT_AVATAR};

const CONFIG_FILE: &str = "config.toml";
const DATABASE_FILE: &str = "ledger.db";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Defaults to `ledger.db` in the data directory.
    pub database_path: Option<PathBuf>,
    pub default_avatar: String,
    /// TOML file of `[[rule]]` keyword entries checked before the built-in table.
    pub keywords_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            default_avatar: DEFAULT_AVATAR.to_string(),
            keywords_path: None,
        }
    }
}

impl AppConfig {
    /// An explicit path must exist; the default location is optional.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = data_dir()?.join(CONFIG_FILE);
                if !path.exists() {
                    tracing::debug!("no config at {}, using defaults", path.display());
                    return Ok(Self::default());
                }
                path
            }
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// `--db` wins over the config file, which wins over the data directory.
    pub fn database_path(&self, cli_override: Option<&Path>) -> anyhow::Result<PathBuf> {
        if let Some(path) = cli_override.or(self.database_path.as_deref()) {
            return Ok(path.to_path_buf());
        }
        let dir = data_dir()?;
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create data directory {}", dir.display()))?;
        Ok(dir.join(DATABASE_FILE))
    }

    pub fn suggestion_engine(&self) -> anyhow::Result<SuggestionEngine> {
        let Some(path) = &self.keywords_path else {
            return Ok(SuggestionEngine::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read keyword rules {}", path.display()))?;
        let custom = SuggestionEngine::from_toml(&content)
            .with_context(|| format!("Invalid keyword rules {}", path.display()))?;
        tracing::debug!(rules = custom.rules().len(), "loaded custom keyword rules");
        Ok(SuggestionEngine::with_defaults(custom.rules().to_vec()))
    }
}

fn data_dir() -> anyhow::Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("com", "tally", "Tally")
        .context("Failed to get app directory")?;
    Ok(dirs.data_dir().to_path_buf())
}
