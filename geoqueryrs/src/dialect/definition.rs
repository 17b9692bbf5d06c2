//! Declarative dialect files.
//!
//! A definition lists the operators a backend understands, grouped by
//! category, together with the encoder used to spell each one:
//!
//! ```yaml
//! driver: postgis
//! distinct_on: true
//! literals:
//!   boolean: keyword
//!   geometry: { from_text: ST_GeomFromText }
//! comparison_operators:
//!   - name: "="
//!     encoder: { type: binary_op, alias: "=" }
//! functions:
//!   - name: substring
//!     encoder: { type: template, alias: SUBSTRING, template: "($1 FROM $2 FOR $3)" }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{FunctionEncoder, LiteralStyle, SqlDialect};
use crate::capabilities::{OperatorCategory, StatementSupport};
use crate::error::{GeoqueryError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EncoderDefinition {
    Function { alias: String },
    NoArgs { alias: String },
    UnaryOp { alias: String },
    BinaryOp { alias: String },
    Template { alias: String, template: String },
}

impl EncoderDefinition {
    pub fn build(&self) -> Result<FunctionEncoder> {
        Ok(match self {
            EncoderDefinition::Function { alias } => FunctionEncoder::call(alias.clone()),
            EncoderDefinition::NoArgs { alias } => FunctionEncoder::no_args(alias.clone()),
            EncoderDefinition::UnaryOp { alias } => FunctionEncoder::unary_op(alias.clone()),
            EncoderDefinition::BinaryOp { alias } => FunctionEncoder::binary_op(alias.clone()),
            EncoderDefinition::Template { alias, template } => {
                FunctionEncoder::template(alias.clone(), template)?
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FunctionDefinition {
    pub name: String,
    pub encoder: EncoderDefinition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DialectDefinition {
    pub driver: String,
    #[serde(default)]
    pub identifier_quote: Option<char>,
    #[serde(default)]
    pub distinct_on: bool,
    #[serde(default)]
    pub unbounded_limit: Option<String>,
    #[serde(default)]
    pub literals: LiteralStyle,
    #[serde(default)]
    pub capabilities: StatementSupport,
    #[serde(default)]
    pub spatial_operators: Vec<FunctionDefinition>,
    #[serde(default)]
    pub logical_operators: Vec<FunctionDefinition>,
    #[serde(default)]
    pub comparison_operators: Vec<FunctionDefinition>,
    #[serde(default)]
    pub arithmetic_operators: Vec<FunctionDefinition>,
    #[serde(default)]
    pub functions: Vec<FunctionDefinition>,
}

impl DialectDefinition {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("yml") | Some("yaml") => Self::from_yaml_str(&contents),
            Some("toml") => Self::from_toml_str(&contents),
            Some("json") => Self::from_json_str(&contents),
            _ => Err(GeoqueryError::Config(format!(
                "unsupported dialect file format: {}",
                path.display()
            ))),
        }
    }

    pub fn from_yaml_str(source: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn from_json_str(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Builds the dialect, registering every operator under its category.
    pub fn into_dialect(self) -> Result<SqlDialect> {
        let mut dialect = SqlDialect::new(self.driver)
            .with_literal_style(self.literals)
            .with_distinct_on(self.distinct_on)
            .with_statement_support(self.capabilities);
        if let Some(quote) = self.identifier_quote {
            dialect = dialect.with_identifier_quote(quote);
        }
        if let Some(token) = self.unbounded_limit {
            dialect = dialect.with_unbounded_limit(token);
        }

        let groups = [
            (OperatorCategory::Spatial, self.spatial_operators),
            (OperatorCategory::Logical, self.logical_operators),
            (OperatorCategory::Comparison, self.comparison_operators),
            (OperatorCategory::Arithmetic, self.arithmetic_operators),
            (OperatorCategory::Function, self.functions),
        ];
        for (category, definitions) in groups {
            for def in definitions {
                dialect.register(category, def.name, def.encoder.build()?)?;
            }
        }

        tracing::debug!(
            dialect = %dialect.name(),
            functions = dialect.len(),
            "built dialect from definition"
        );
        Ok(dialect)
    }
}
