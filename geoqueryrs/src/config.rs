//! Configuration for dialect loading and SQL generation.
//!
//! TOML-based, with global defaults and per-dialect overrides.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::dialect::{LiteralOverrides, LiteralStyle};
use crate::error::{GeoqueryError, Result};
use crate::visitor::DEFAULT_MAX_DEPTH;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GeoqueryConfig {
    /// Global defaults applied to every dialect unless overridden.
    pub defaults: GlobalDefaults,

    /// Where dialects come from.
    pub loader: LoaderConfig,

    /// Per-dialect overrides keyed by dialect name.
    pub dialects: HashMap<String, DialectConfig>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GlobalDefaults {
    pub render: RenderConfig,
}

/// SQL generation settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Maximum nesting of expressions and sub-selects (default: 256).
    pub max_depth: usize,
}

/// Dialect sources.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Directories scanned for dialect definition files.
    pub paths: Vec<PathBuf>,
    /// Register the dialects compiled into this build (default: true).
    pub include_builtin: bool,
}

/// Per-dialect overrides.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DialectConfig {
    pub render: Option<RenderConfig>,
    pub literals: Option<LiteralOverrides>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            include_builtin: true,
        }
    }
}

impl GeoqueryConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| GeoqueryError::Config(format!("failed to read config file: {e}")))?;
        Self::from_toml(&contents)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(toml_str)
            .map_err(|e| GeoqueryError::Config(format!("failed to parse config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from default locations (env var, cwd, user config dir, or defaults).
    ///
    /// Search order:
    /// 1. `GEOQUERY_CONFIG` environment variable
    /// 2. `./geoquery.toml` (current directory)
    /// 3. `~/.config/geoquery/config.toml` (user config dir)
    /// 4. Built-in defaults
    pub fn load_default() -> Self {
        if let Ok(path) = std::env::var("GEOQUERY_CONFIG") {
            match Self::from_file(&path) {
                Ok(cfg) => {
                    tracing::info!(path = %path, "loaded config from GEOQUERY_CONFIG");
                    return cfg;
                }
                Err(err) => tracing::warn!(path = %path, error = %err, "ignoring GEOQUERY_CONFIG"),
            }
        }

        if let Ok(cfg) = Self::from_file("geoquery.toml") {
            tracing::info!("loaded config from ./geoquery.toml");
            return cfg;
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("geoquery").join("config.toml");
            if let Ok(cfg) = Self::from_file(&user_config) {
                tracing::info!(path = %user_config.display(), "loaded config from user config dir");
                return cfg;
            }
        }

        tracing::debug!("no config file found, using defaults");
        Self::default()
    }

    /// Resolved settings for one dialect (overrides merged over defaults).
    pub fn for_dialect(&self, name: &str) -> ResolvedDialectConfig {
        ResolvedDialectConfig::merge(&self.defaults, self.dialects.get(name))
    }

    fn validate(&self) -> Result<()> {
        let zero_depth = self.defaults.render.max_depth == 0
            || self
                .dialects
                .values()
                .any(|d| d.render.as_ref().is_some_and(|r| r.max_depth == 0));
        if zero_depth {
            return Err(GeoqueryError::Config(
                "render.max_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Fully resolved configuration for a dialect.
#[derive(Debug, Clone, Default)]
pub struct ResolvedDialectConfig {
    pub render: RenderConfig,
    pub literals: LiteralOverrides,
}

impl ResolvedDialectConfig {
    fn merge(defaults: &GlobalDefaults, override_cfg: Option<&DialectConfig>) -> Self {
        match override_cfg {
            Some(dialect) => Self {
                render: dialect
                    .render
                    .clone()
                    .unwrap_or_else(|| defaults.render.clone()),
                literals: dialect.literals.clone().unwrap_or_default(),
            },
            None => Self {
                render: defaults.render.clone(),
                literals: LiteralOverrides::default(),
            },
        }
    }

    pub fn apply_literals(&self, style: &mut LiteralStyle) {
        self.literals.apply(style);
    }
}
