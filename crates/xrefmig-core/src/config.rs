use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Run configuration, loaded from `~/.config/xrefmig/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MigratorConfig {
    pub registry: RegistryConfig,
    pub migration: MigrationConfig,
    pub depositor: DepositorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Sent with every request to get into the polite pool.
    pub contact_email: String,
    pub crossref_base_url: String,
    pub medra_base_url: String,
    pub min_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    pub old_prefix: String,
    pub new_prefix: String,
    pub input_dir: String,
    pub output_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DepositorConfig {
    pub name: String,
    /// Falls back to `registry.contact_email` when empty.
    pub email: String,
    pub registrant: String,
}

// ─── Defaults ──────────────────────────────────────────────

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            contact_email: "you@example.com".to_string(),
            crossref_base_url: "https://api.crossref.org".to_string(),
            medra_base_url: "https://api.medra.org".to_string(),
            min_interval_ms: 100,
        }
    }
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            old_prefix: "10.nnnnn".to_string(),
            new_prefix: "10.nnnnn".to_string(),
            input_dir: "input".to_string(),
            output_dir: "output".to_string(),
        }
    }
}

impl Default for DepositorConfig {
    fn default() -> Self {
        Self {
            name: "Your name".to_string(),
            email: String::new(),
            registrant: "Your organisation".to_string(),
        }
    }
}

// ─── Load / Save ───────────────────────────────────────────

impl MigratorConfig {
    /// Standard config file path: `~/.config/xrefmig/config.toml`
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("XREFMIG_CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("xrefmig")
            .join("config.toml")
    }

    /// Load config from disk, falling back to defaults if file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        validate_prefix("migration.old_prefix", &self.migration.old_prefix)?;
        validate_prefix("migration.new_prefix", &self.migration.new_prefix)?;

        if self.registry.contact_email.trim().is_empty() {
            return Err(CoreError::ConfigError(
                "registry.contact_email must be set".to_string(),
            ));
        }
        if self.depositor.name.trim().is_empty() {
            return Err(CoreError::ConfigError("depositor.name must be set".to_string()));
        }
        if self.depositor.registrant.trim().is_empty() {
            return Err(CoreError::ConfigError(
                "depositor.registrant must be set".to_string(),
            ));
        }
        Ok(())
    }

    // ─── Derived values ────────────────────────────────────

    pub fn depositor_email(&self) -> &str {
        if self.depositor.email.trim().is_empty() {
            &self.registry.contact_email
        } else {
            &self.depositor.email
        }
    }

    pub fn input_dir(&self) -> PathBuf {
        PathBuf::from(&self.migration.input_dir)
    }

    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(&self.migration.output_dir)
    }

    /// Polite-pool user agent shared by both registries.
    pub fn user_agent(&self) -> String {
        format!(
            "xrefmig/{} (mailto:{})",
            env!("CARGO_PKG_VERSION"),
            self.registry.contact_email
        )
    }
}

fn validate_prefix(field: &str, prefix: &str) -> Result<()> {
    if !prefix.starts_with("10.") || prefix.len() <= 3 || prefix.contains('/') {
        return Err(CoreError::ConfigError(format!(
            "{field} must look like `10.1234`, got `{prefix}`"
        )));
    }
    Ok(())
}
