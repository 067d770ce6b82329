mod file_config;

pub use file_config::{FileConfig, LookupConfig, ViewportConfig};

use crate::artwork::ITUNES_API_BASE;
use crate::catalog::CatalogueSource;
use crate::viewport::ObservationRegion;
use anyhow::{bail, Result};

pub const DEFAULT_CATALOGUE: &str = "songs.json";
pub const DEFAULT_LOOKUP_TIMEOUT_SEC: u64 = 10;
pub const DEFAULT_VIEWPORT_ROWS: usize = 10;
pub const DEFAULT_MARGIN_ROWS: usize = 6;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub catalogue: Option<String>,
    pub lookup_base_url: String,
    pub lookup_timeout_sec: u64,
    pub viewport_rows: usize,
    pub margin_rows: usize,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub catalogue: CatalogueSource,
    pub lookup: LookupSettings,
    pub viewport: ViewportSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupSettings {
    pub base_url: String,
    pub timeout_sec: u64,
}

impl Default for LookupSettings {
    fn default() -> Self {
        Self {
            base_url: ITUNES_API_BASE.to_string(),
            timeout_sec: DEFAULT_LOOKUP_TIMEOUT_SEC,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewportSettings {
    pub rows: usize,
    pub margin_rows: usize,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            rows: DEFAULT_VIEWPORT_ROWS,
            margin_rows: DEFAULT_MARGIN_ROWS,
        }
    }
}

impl ViewportSettings {
    pub fn region(&self) -> ObservationRegion {
        ObservationRegion::new(self.rows, self.margin_rows)
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let catalogue = file
            .catalogue
            .or_else(|| cli.catalogue.clone())
            .unwrap_or_else(|| DEFAULT_CATALOGUE.to_string());
        if catalogue.trim().is_empty() {
            bail!("catalogue must not be empty");
        }
        let catalogue = CatalogueSource::parse(&catalogue);

        // Lookup settings - merge file config with CLI
        let lookup_file = file.lookup.unwrap_or_default();
        let base_url = lookup_file
            .base_url
            .unwrap_or_else(|| cli.lookup_base_url.clone());
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            bail!("Lookup base URL must be http(s): {:?}", base_url);
        }
        let timeout_sec = lookup_file.timeout_sec.unwrap_or(cli.lookup_timeout_sec);
        if timeout_sec == 0 {
            bail!("Lookup timeout must be at least 1 second");
        }

        let viewport_file = file.viewport.unwrap_or_default();
        let rows = viewport_file.rows.unwrap_or(cli.viewport_rows);
        if rows == 0 {
            bail!("Viewport must show at least one row");
        }
        let margin_rows = viewport_file.margin_rows.unwrap_or(cli.margin_rows);

        Ok(Self {
            catalogue,
            lookup: LookupSettings {
                base_url,
                timeout_sec,
            },
            viewport: ViewportSettings { rows, margin_rows },
        })
    }
}
