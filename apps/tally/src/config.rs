//! # Configuration
//!
//! Optional TOML configuration for the Tally binary.
//!
//! ## Lookup order
//!
//! 1. `--config PATH`
//! 2. `TALLY_CONFIG` environment variable
//! 3. `tally.toml` in the working directory, when present
//!
//! Values resolve as: CLI flag > config file > built-in default.
//!
//! ```toml
//! database = "finances.redb"
//! backend = "redb"          # redb | file | memory
//! recent_limit = 5
//! monthly_window = 12
//!
//! [server]
//! host = "127.0.0.1"
//! port = 8080
//!
//! [[categories]]
//! name = "Pets"
//! color = "#a16207"
//! icon = "PawPrint"
//! ```

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tally_core::{CategoryCatalog, Ledger, ReportSettings, TallyError, is_hex_color};

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "TALLY_CONFIG";

/// Config file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "tally.toml";

pub const DEFAULT_DATABASE: &str = "tally.redb";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;

// =============================================================================
// FILE FORMAT
// =============================================================================

/// Contents of a `tally.toml` file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TallyConfig {
    pub database: Option<PathBuf>,
    pub backend: Option<String>,
    pub recent_limit: Option<usize>,
    pub monthly_window: Option<usize>,
    pub server: ServerConfig,
    pub categories: Vec<CategoryConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// A user category added after the predefined ones.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryConfig {
    pub name: String,
    pub color: Option<String>,
    pub icon: Option<String>,
}

impl TallyConfig {
    /// Parse TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, TallyError> {
        toml::from_str(text)
            .map_err(|e| TallyError::SerializationError(format!("Invalid config: {}", e)))
    }

    /// Read and parse a config file.
    pub fn load(path: &Path) -> Result<Self, TallyError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            TallyError::IoError(format!("Read config {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Locate and load the config file, if any.
    ///
    /// An explicit or environment-named file must exist; the working
    /// directory default is skipped silently when absent.
    pub fn discover(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>), TallyError> {
        let named = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        if let Some(path) = named {
            let config = Self::load(&path)?;
            return Ok((config, Some(path)));
        }

        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            let config = Self::load(&local)?;
            return Ok((config, Some(local)));
        }

        Ok((Self::default(), None))
    }

    /// Predefined categories plus the configured ones.
    ///
    /// Entries whose name is already taken are skipped.
    #[must_use]
    pub fn catalog(&self) -> CategoryCatalog {
        let mut catalog = CategoryCatalog::predefined();
        for category in &self.categories {
            let color = category.color.as_deref();
            if let Some(bad) = color.filter(|c| !is_hex_color(c)) {
                tracing::warn!(
                    "Category '{}' has invalid color '{}'; using the default",
                    category.name,
                    bad
                );
            }
            if !catalog.add(&category.name, color, category.icon.as_deref()) {
                tracing::warn!("Ignoring duplicate category '{}' in config", category.name);
            }
        }
        catalog
    }

    #[must_use]
    pub fn report_settings(&self) -> ReportSettings {
        let defaults = ReportSettings::default();
        ReportSettings {
            recent_limit: self.recent_limit.unwrap_or(defaults.recent_limit),
            monthly_window: self.monthly_window.unwrap_or(defaults.monthly_window),
        }
    }
}

// =============================================================================
// BACKEND SELECTION
// =============================================================================

/// Which record store the ledger opens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackendKind {
    /// Embedded redb database.
    #[default]
    Redb,
    /// Single snapshot file.
    File,
    /// Nothing persisted.
    Memory,
}

impl BackendKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Redb => "redb",
            Self::File => "file",
            Self::Memory => "memory",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = TallyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redb" => Ok(Self::Redb),
            "file" => Ok(Self::File),
            "memory" => Ok(Self::Memory),
            other => Err(TallyError::InvalidInput(format!(
                "Unknown backend '{}'. Use: redb, file, memory",
                other
            ))),
        }
    }
}

// =============================================================================
// RESOLVED SETTINGS
// =============================================================================

/// Effective settings after merging flags, config and defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database: PathBuf,
    pub backend: BackendKind,
    pub report: ReportSettings,
    pub catalog: CategoryCatalog,
    pub host: String,
    pub port: u16,
}

impl Settings {
    /// Merge CLI flags over the config file.
    pub fn resolve(
        config: &TallyConfig,
        database: Option<PathBuf>,
        backend: Option<&str>,
    ) -> Result<Self, TallyError> {
        let backend = match backend.or(config.backend.as_deref()) {
            Some(name) => name.parse()?,
            None => BackendKind::default(),
        };

        Ok(Self {
            database: database
                .or_else(|| config.database.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE)),
            backend,
            report: config.report_settings(),
            catalog: config.catalog(),
            host: config
                .server
                .host
                .clone()
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: config.server.port.unwrap_or(DEFAULT_PORT),
        })
    }

    /// Open the ledger described by these settings.
    pub fn open_ledger(&self) -> Result<Ledger, TallyError> {
        tracing::debug!(
            "Opening {} ledger at {}",
            self.backend,
            self.database.display()
        );
        let ledger = match self.backend {
            BackendKind::Redb => Ledger::open_redb(&self.database)?,
            BackendKind::File => Ledger::open_file(&self.database)?,
            BackendKind::Memory => Ledger::new(),
        };
        Ok(ledger.with_catalog(self.catalog.clone()))
    }
}

// =============================================================================
// TESTS
// =============================================================================
