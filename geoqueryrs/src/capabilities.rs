//! What a dialect declares it can express.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Operator group a function name is registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorCategory {
    Spatial,
    Logical,
    Comparison,
    Arithmetic,
    Function,
}

/// Statement kinds the backend accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StatementSupport {
    pub select: bool,
    pub insert: bool,
    pub update: bool,
    pub delete: bool,
}

impl Default for StatementSupport {
    fn default() -> Self {
        Self {
            select: true,
            insert: true,
            update: true,
            delete: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryCapabilities {
    pub statements: StatementSupport,
    operators: BTreeMap<OperatorCategory, BTreeSet<String>>,
}

impl QueryCapabilities {
    pub fn new(statements: StatementSupport) -> Self {
        Self {
            statements,
            operators: BTreeMap::new(),
        }
    }

    pub fn add_operator(&mut self, category: OperatorCategory, name: impl Into<String>) {
        self.operators.entry(category).or_default().insert(name.into());
    }

    pub fn operators(&self, category: OperatorCategory) -> impl Iterator<Item = &str> {
        self.operators
            .get(&category)
            .into_iter()
            .flat_map(|names| names.iter().map(String::as_str))
    }

    pub fn supports_operator(&self, category: OperatorCategory, name: &str) -> bool {
        self.operators
            .get(&category)
            .is_some_and(|names| names.contains(name))
    }

    /// `kind` is the upper-case statement keyword, e.g. `"SELECT"`.
    pub fn supports_statement(&self, kind: &str) -> bool {
        match kind {
            "SELECT" => self.statements.select,
            "INSERT" => self.statements.insert,
            "UPDATE" => self.statements.update,
            "DELETE" => self.statements.delete,
            _ => false,
        }
    }
}
