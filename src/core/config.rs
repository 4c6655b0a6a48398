use crate::core::datetime::{LinuxDateFormat, AUTOMATIC_DETECTION, LINUX_DATE_FORMATS};
use crate::core::parser::ParserOptions;
use crate::core::schema::SchemaRegistry;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

fn default_linux_date_format() -> String {
    AUTOMATIC_DETECTION.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// One of `LINUX_DATE_FORMATS`
    #[serde(default = "default_linux_date_format")]
    pub linux_date_format: String,
    /// User schema document loaded on top of the bundled one
    #[serde(default)]
    pub schema_overlay: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            linux_date_format: default_linux_date_format(),
            schema_overlay: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Missing, empty or unreadable documents give the defaults
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Config::default());
        }

        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        if data.trim().is_empty() {
            return Ok(Config::default());
        }

        Ok(serde_json::from_str(&data).unwrap_or_else(|e| {
            log::warn!("Ignoring corrupt config {:?}: {}", path, e);
            Config::default()
        }))
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let data = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, data)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().with_context(|| "Could not determine config directory")?;

        Ok(config_dir.join("sargraph").join("config.json"))
    }

    /// Store a Linux date format after checking it against the known list
    pub fn set_linux_date_format(&mut self, format: &str) -> Result<()> {
        let format = format.trim();
        if !LINUX_DATE_FORMATS.contains(&format) {
            bail!(
                "Unknown date format '{}', expected one of: {}",
                format,
                LINUX_DATE_FORMATS.join(", ")
            );
        }
        self.linux_date_format = format.to_string();
        Ok(())
    }

    pub fn linux_date_format(&self) -> Result<LinuxDateFormat> {
        self.linux_date_format
            .parse()
            .with_context(|| format!("Invalid Linux date format '{}'", self.linux_date_format))
    }

    pub fn set_schema_overlay(&mut self, path: PathBuf) {
        self.schema_overlay = Some(path);
    }

    pub fn clear_schema_overlay(&mut self) {
        self.schema_overlay = None;
    }

    pub fn parser_options(&self) -> Result<ParserOptions> {
        Ok(ParserOptions {
            linux_date_format: self.linux_date_format()?,
        })
    }

    /// Bundled schema plus the configured overlay, if any
    pub fn schema_registry(&self) -> Result<SchemaRegistry> {
        let mut registry = SchemaRegistry::bundled().context("Failed to load bundled schema")?;
        if let Some(overlay) = &self.schema_overlay {
            registry
                .load_file(overlay)
                .with_context(|| format!("Failed to load schema overlay {:?}", overlay))?;
        }
        Ok(registry)
    }
}
