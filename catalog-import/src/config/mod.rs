//! Configuration for import runs
//!
//! Settings come from three places, later ones winning:
//! 1. built-in defaults
//! 2. an optional TOML file (`--config`, or `<config dir>/catalog-import/config.toml`)
//! 3. command-line flags
//!
//! Access tokens are never read from the file; they come from the
//! environment (a `.env` file is honoured).

pub mod columns;

pub use columns::ColumnMap;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default Firestore collection for product documents
pub const DEFAULT_COLLECTION: &str = "produtos";

/// Firestore rejects commits with more writes than this
pub const MAX_BATCH_SIZE: usize = 500;

pub const DEFAULT_FIRESTORE_ENDPOINT: &str = "https://firestore.googleapis.com/v1";
pub const DEFAULT_DATABASE: &str = "(default)";

/// Environment variable holding the Realtime Database auth token
pub const RTDB_TOKEN_ENV: &str = "RTDB_AUTH_TOKEN";
/// Environment variable holding the OAuth access token for Firestore
pub const FIRESTORE_TOKEN_ENV: &str = "FIRESTORE_ACCESS_TOKEN";

/// Contents of the TOML configuration file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub columns: ColumnMap,
    pub realtime: RealtimeSection,
    pub firestore: FirestoreSection,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RealtimeSection {
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FirestoreSection {
    pub project_id: Option<String>,
    pub database: Option<String>,
    pub collection: Option<String>,
    pub batch_size: Option<usize>,
    pub endpoint: Option<String>,
}

impl FileConfig {
    /// Location of the per-user config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("catalog-import").join("config.toml"))
    }

    /// Load the config file
    ///
    /// An explicit path must exist. Without one, the default location is
    /// used when present and built-in defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => {
                    log::debug!("No config file found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        log::info!("Loaded config from {}", path.display());

        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Everything the pipelines need to know about one run
#[derive(Debug, Clone, PartialEq)]
pub struct ImportConfig {
    pub source_path: PathBuf,
    /// Sheet to read; the first sheet when `None`
    pub sheet: Option<String>,
    pub column_map: ColumnMap,
    /// Target collection (Firestore only)
    pub collection_name: String,
    /// Documents per atomic commit (Firestore only)
    pub batch_size: usize,
}

impl ImportConfig {
    pub fn new(source_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            sheet: None,
            column_map: ColumnMap::default(),
            collection_name: DEFAULT_COLLECTION.to_string(),
            batch_size: MAX_BATCH_SIZE,
        }
    }

    /// Defaults overlaid with the config file
    pub fn from_file(source_path: impl Into<PathBuf>, file: &FileConfig) -> Self {
        let mut config = Self::new(source_path);
        config.column_map = file.columns.clone();
        if let Some(collection) = &file.firestore.collection {
            config.collection_name = collection.clone();
        }
        if let Some(batch_size) = file.firestore.batch_size {
            config.batch_size = batch_size;
        }
        config
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            bail!(
                "Batch size must be between 1 and {} (got {})",
                MAX_BATCH_SIZE,
                self.batch_size
            );
        }

        let collection = self.collection_name.trim();
        if collection.is_empty() {
            bail!("Collection name cannot be empty");
        }
        if collection.contains('/') {
            bail!(
                "Collection name '{}' must be a single path segment",
                self.collection_name
            );
        }

        Ok(())
    }
}

/// Connection settings for the Realtime Database
#[derive(Debug, Clone, PartialEq)]
pub struct RealtimeSettings {
    /// Database root, e.g. `https://my-db-default-rtdb.firebaseio.com`
    pub base_url: String,
    pub auth_token: Option<String>,
}

impl RealtimeSettings {
    pub fn resolve(
        file: &FileConfig,
        base_url: Option<String>,
        auth_token: Option<String>,
    ) -> Result<Self> {
        let base_url = base_url
            .or_else(|| file.realtime.base_url.clone())
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .context(
                "No Realtime Database URL configured. Pass --base-url or set [realtime].base_url in the config file.",
            )?;

        if !base_url.starts_with("https://") && !base_url.starts_with("http://") {
            bail!("Realtime Database URL must start with http:// or https://: {}", base_url);
        }

        Ok(Self {
            base_url,
            auth_token,
        })
    }
}

/// Connection settings for Firestore
#[derive(Debug, Clone, PartialEq)]
pub struct FirestoreSettings {
    pub endpoint: String,
    pub project_id: String,
    pub database: String,
    pub access_token: Option<String>,
}

impl FirestoreSettings {
    pub fn resolve(
        file: &FileConfig,
        project_id: Option<String>,
        database: Option<String>,
        access_token: Option<String>,
    ) -> Result<Self> {
        let project_id = project_id
            .or_else(|| file.firestore.project_id.clone())
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .context(
                "No Firestore project configured. Pass --project or set [firestore].project_id in the config file.",
            )?;

        let database = database
            .or_else(|| file.firestore.database.clone())
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        let endpoint = file
            .firestore
            .endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_FIRESTORE_ENDPOINT.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            endpoint,
            project_id,
            database,
            access_token,
        })
    }
}

/// Read a token from the environment, ignoring blank values
pub fn env_token(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
