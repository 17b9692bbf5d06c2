use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use glob::glob;

use crate::config::GeoqueryConfig;
use crate::dialect::{builtin_dialects, SqlDialect};
use crate::error::{GeoqueryError, Result};

const DEFINITION_PATTERNS: [&str; 4] = ["*.yml", "*.yaml", "*.toml", "*.json"];

/// Named dialects, each shared behind an `Arc` once registered.
#[derive(Debug, Default, Clone)]
pub struct DialectRegistry {
    dialects: HashMap<String, Arc<SqlDialect>>,
}

impl DialectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every dialect compiled into this build.
    pub fn with_builtins() -> Result<Self> {
        let mut registry = DialectRegistry::new();
        for dialect in builtin_dialects()? {
            registry.insert(dialect)?;
        }
        Ok(registry)
    }

    /// Builds a registry from configuration: built-ins (unless disabled),
    /// every configured definition directory, then literal overrides.
    pub fn from_config(config: &GeoqueryConfig) -> Result<Self> {
        let mut pending = Vec::new();
        if config.loader.include_builtin {
            pending.extend(builtin_dialects()?);
        }
        for dir in &config.loader.paths {
            pending.extend(read_definitions(dir)?);
        }

        let mut registry = DialectRegistry::new();
        for mut dialect in pending {
            config
                .for_dialect(dialect.name())
                .apply_literals(dialect.literal_style_mut());
            registry.insert(dialect)?;
        }
        tracing::info!(dialects = ?registry.names(), "dialect registry ready");
        Ok(registry)
    }

    /// Loads every definition file in `dir`, keyed by its driver name.
    pub fn load_from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let mut registry = DialectRegistry::new();
        registry.load_dir(dir)?;
        Ok(registry)
    }

    pub fn load_dir<P: AsRef<Path>>(&mut self, dir: P) -> Result<()> {
        for dialect in read_definitions(dir.as_ref())? {
            self.insert(dialect)?;
        }
        Ok(())
    }

    pub fn insert(&mut self, dialect: SqlDialect) -> Result<Arc<SqlDialect>> {
        if self.dialects.contains_key(dialect.name()) {
            return Err(GeoqueryError::DuplicateDialect(dialect.name().to_string()));
        }
        let dialect = Arc::new(dialect);
        self.dialects
            .insert(dialect.name().to_string(), Arc::clone(&dialect));
        Ok(dialect)
    }

    pub fn get(&self, name: &str) -> Option<Arc<SqlDialect>> {
        self.dialects.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.dialects.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.dialects.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.dialects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dialects.is_empty()
    }
}

fn read_definitions(dir: &Path) -> Result<Vec<SqlDialect>> {
    if !dir.is_dir() {
        return Err(GeoqueryError::Config(format!(
            "dialect directory not found: {}",
            dir.display()
        )));
    }

    let mut dialects = Vec::new();
    for pattern in DEFINITION_PATTERNS {
        let mut paths: Vec<_> = glob(&format!("{}/{pattern}", dir.display()))
            .map_err(|e| GeoqueryError::Other(e.into()))?
            .flatten()
            .collect();
        paths.sort();
        for path in paths {
            let dialect = SqlDialect::from_file(&path)?;
            tracing::info!(
                path = %path.display(),
                dialect = %dialect.name(),
                functions = dialect.len(),
                "loaded dialect definition"
            );
            dialects.push(dialect);
        }
    }
    Ok(dialects)
}
