//! SQL dialects: per-backend function encoders plus literal conventions.
//!
//! A dialect is built once (from code or from a definition file) and is
//! read-only afterwards, so one instance can be shared by any number of
//! generating threads. Built-in dialects live in their own files and are
//! gated behind feature flags.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::capabilities::{OperatorCategory, QueryCapabilities, StatementSupport};
use crate::error::{DuplicateEncoder, Result};

mod definition;
mod encoder;

pub use definition::{DialectDefinition, EncoderDefinition, FunctionDefinition};
pub use encoder::{FunctionEncoder, TemplateEncoder};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BooleanStyle {
    /// `TRUE` / `FALSE`
    #[default]
    Keyword,
    /// `1` / `0`
    Numeric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BytesStyle {
    /// `'\x0a0b'`
    #[default]
    HexEscape,
    /// `X'0A0B'`
    HexLiteral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalStyle {
    /// `'2024-01-31'`
    #[default]
    Quoted,
    /// `DATE '2024-01-31'`
    Typed,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryStyle {
    /// `'POINT(1 2)'`
    #[default]
    Wkt,
    /// `<function>('POINT(1 2)', <srid>)`, srid omitted when unknown.
    FromText(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeStyle {
    /// Rendered as its polygon through the geometry style.
    #[default]
    Polygon,
    /// `<function>(minx, miny, maxx, maxy[, srid])`
    MakeEnvelope(String),
}

/// Textual conventions for literal values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LiteralStyle {
    pub boolean: BooleanStyle,
    pub bytes: BytesStyle,
    pub temporal: TemporalStyle,
    pub geometry: GeometryStyle,
    pub envelope: EnvelopeStyle,
    /// Fixed number of decimals for doubles; shortest round-trip text when unset.
    pub double_precision: Option<usize>,
    /// `\` starts an escape inside string literals and must be doubled (MySQL).
    pub backslash_escapes: bool,
}

/// Partial [`LiteralStyle`] used by configuration overrides.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LiteralOverrides {
    pub boolean: Option<BooleanStyle>,
    pub bytes: Option<BytesStyle>,
    pub temporal: Option<TemporalStyle>,
    pub geometry: Option<GeometryStyle>,
    pub envelope: Option<EnvelopeStyle>,
    pub double_precision: Option<usize>,
    pub backslash_escapes: Option<bool>,
}

impl LiteralOverrides {
    pub fn apply(&self, style: &mut LiteralStyle) {
        if let Some(boolean) = self.boolean {
            style.boolean = boolean;
        }
        if let Some(bytes) = self.bytes {
            style.bytes = bytes;
        }
        if let Some(temporal) = self.temporal {
            style.temporal = temporal;
        }
        if let Some(geometry) = &self.geometry {
            style.geometry = geometry.clone();
        }
        if let Some(envelope) = &self.envelope {
            style.envelope = envelope.clone();
        }
        if let Some(precision) = self.double_precision {
            style.double_precision = Some(precision);
        }
        if let Some(backslash_escapes) = self.backslash_escapes {
            style.backslash_escapes = backslash_escapes;
        }
    }
}

/// Function/operator registry for one backend family.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlDialect {
    name: String,
    encoders: HashMap<String, FunctionEncoder>,
    literals: LiteralStyle,
    identifier_quote: Option<char>,
    distinct_on: bool,
    unbounded_limit: Option<String>,
    capabilities: QueryCapabilities,
}

impl SqlDialect {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            encoders: HashMap::new(),
            literals: LiteralStyle::default(),
            identifier_quote: None,
            distinct_on: false,
            unbounded_limit: None,
            capabilities: QueryCapabilities::default(),
        }
    }

    pub fn with_literal_style(mut self, literals: LiteralStyle) -> Self {
        self.literals = literals;
        self
    }

    /// Quote identifiers with `quote`; identifiers are emitted verbatim otherwise.
    pub fn with_identifier_quote(mut self, quote: char) -> Self {
        self.identifier_quote = Some(quote);
        self
    }

    pub fn with_distinct_on(mut self, supported: bool) -> Self {
        self.distinct_on = supported;
        self
    }

    /// Token emitted as LIMIT when only an OFFSET is requested (`-1` in SQLite).
    pub fn with_unbounded_limit(mut self, token: impl Into<String>) -> Self {
        self.unbounded_limit = Some(token.into());
        self
    }

    pub fn with_statement_support(mut self, statements: StatementSupport) -> Self {
        self.capabilities.statements = statements;
        self
    }

    /// Registers `encoder` under `name`.
    ///
    /// On a duplicate the dialect is left untouched and the encoder is
    /// returned inside the error.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        encoder: FunctionEncoder,
    ) -> std::result::Result<(), DuplicateEncoder> {
        use std::collections::hash_map::Entry;

        match self.encoders.entry(name.into()) {
            Entry::Occupied(entry) => {
                tracing::warn!(
                    dialect = %self.name,
                    function = %entry.key(),
                    "rejected duplicate function registration"
                );
                Err(DuplicateEncoder {
                    name: entry.key().clone(),
                    encoder,
                })
            }
            Entry::Vacant(entry) => {
                entry.insert(encoder);
                Ok(())
            }
        }
    }

    /// [`SqlDialect::insert`] that also records the name under a capability category.
    pub fn register(
        &mut self,
        category: OperatorCategory,
        name: impl Into<String>,
        encoder: FunctionEncoder,
    ) -> Result<()> {
        let name = name.into();
        self.insert(name.clone(), encoder)?;
        self.capabilities.add_operator(category, name);
        Ok(())
    }

    pub fn find(&self, name: &str) -> Option<&FunctionEncoder> {
        self.encoders.get(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.encoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
    }

    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.encoders.keys().map(String::as_str)
    }

    pub fn literal_style(&self) -> &LiteralStyle {
        &self.literals
    }

    pub fn literal_style_mut(&mut self) -> &mut LiteralStyle {
        &mut self.literals
    }

    pub fn supports_distinct_on(&self) -> bool {
        self.distinct_on
    }

    pub fn unbounded_limit(&self) -> Option<&str> {
        self.unbounded_limit.as_deref()
    }

    pub fn capabilities(&self) -> &QueryCapabilities {
        &self.capabilities
    }

    /// Quotes each dot-separated part of `ident`; `*` is left alone.
    pub fn quote_identifier(&self, ident: &str) -> String {
        match self.identifier_quote {
            None => ident.to_string(),
            Some(q) => ident
                .split('.')
                .map(|part| {
                    if part == "*" {
                        part.to_string()
                    } else {
                        let doubled = format!("{q}{q}");
                        format!("{q}{}{q}", part.replace(q, &doubled))
                    }
                })
                .collect::<Vec<_>>()
                .join("."),
        }
    }

    /// Load a dialect definition; the format follows the file extension
    /// (`.yml`/`.yaml`, `.toml` or `.json`).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        DialectDefinition::from_file(path)?.into_dialect()
    }

    pub fn from_yaml_str(source: &str) -> Result<Self> {
        DialectDefinition::from_yaml_str(source)?.into_dialect()
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        DialectDefinition::from_toml_str(source)?.into_dialect()
    }

    pub fn from_json_str(source: &str) -> Result<Self> {
        DialectDefinition::from_json_str(source)?.into_dialect()
    }
}

/// Operators every built-in dialect spells the same way.
#[cfg(any(feature = "postgis", feature = "sqlite", feature = "mysql"))]
pub(crate) fn register_standard_operators(dialect: &mut SqlDialect) -> Result<()> {
    use crate::expr::names;
    use OperatorCategory::{Arithmetic, Comparison, Function, Logical};

    for op in [
        names::EQUAL_TO,
        names::NOT_EQUAL_TO,
        names::LESS_THAN,
        names::LESS_THAN_OR_EQUAL_TO,
        names::GREATER_THAN,
        names::GREATER_THAN_OR_EQUAL_TO,
    ] {
        dialect.register(Comparison, op, FunctionEncoder::binary_op(op))?;
    }
    dialect.register(Comparison, names::LIKE, FunctionEncoder::binary_op("LIKE"))?;
    dialect.register(
        Comparison,
        names::IS_NULL,
        FunctionEncoder::template("", "($1 IS NULL)")?,
    )?;
    dialect.register(
        Comparison,
        names::IS_NOT_NULL,
        FunctionEncoder::template("", "($1 IS NOT NULL)")?,
    )?;

    dialect.register(Logical, names::AND, FunctionEncoder::binary_op("AND"))?;
    dialect.register(Logical, names::OR, FunctionEncoder::binary_op("OR"))?;
    dialect.register(Logical, names::NOT, FunctionEncoder::unary_op("NOT "))?;

    for op in [names::ADD, names::SUB, names::MUL, names::DIV] {
        dialect.register(Arithmetic, op, FunctionEncoder::binary_op(op))?;
    }
    // The space keeps `- -5` from reading as a `--` comment.
    dialect.register(Arithmetic, names::NEGATE, FunctionEncoder::template("", "(- $1)")?)?;

    for (name, alias) in [
        (names::COUNT, "COUNT"),
        (names::SUM, "SUM"),
        (names::AVG, "AVG"),
        (names::MIN, "MIN"),
        (names::MAX, "MAX"),
        (names::UPPER, "UPPER"),
        (names::LOWER, "LOWER"),
    ] {
        dialect.register(Function, name, FunctionEncoder::call(alias))?;
    }
    dialect.register(
        Function,
        names::CURRENT_TIMESTAMP,
        FunctionEncoder::no_args("CURRENT_TIMESTAMP"),
    )?;
    Ok(())
}

/// Every dialect compiled into this build.
pub fn builtin_dialects() -> Result<Vec<SqlDialect>> {
    #[allow(unused_mut)]
    let mut dialects = Vec::new();
    #[cfg(feature = "postgis")]
    dialects.push(PostgisDialect::build()?);
    #[cfg(feature = "sqlite")]
    dialects.push(SqliteDialect::build()?);
    #[cfg(feature = "mysql")]
    dialects.push(MySqlDialect::build()?);
    Ok(dialects)
}

#[cfg(feature = "postgis")]
mod postgis;
#[cfg(feature = "postgis")]
pub use postgis::PostgisDialect;

#[cfg(feature = "sqlite")]
mod sqlite;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDialect;

#[cfg(feature = "mysql")]
mod mysql;
#[cfg(feature = "mysql")]
pub use mysql::MySqlDialect;
