//! Walks a statement tree and writes dialect-specific SQL.

use std::cell::Cell;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

use crate::clauses::{Fields, SortOrder};
use crate::config::RenderConfig;
use crate::dialect::{
    BooleanStyle, BytesStyle, EnvelopeStyle, GeometryStyle, SqlDialect, TemporalStyle,
};
use crate::error::{GeoqueryError, Result};
use crate::expr::{Envelope, Expression, Function, Geometry, Literal};
use crate::from_item::{DataSetName, FromItem, Join, JoinCondition};
use crate::select::Select;
use crate::statement::{Delete, Insert, InsertSource, Query, Update};

pub const DEFAULT_MAX_DEPTH: usize = 256;

/// SQL generator bound to one dialect.
///
/// Rendering is depth-first, left to right. Every function node is looked up
/// in the dialect and written by its encoder; nothing is written to a
/// caller's buffer unless the whole statement renders.
pub struct SqlVisitor<'d> {
    dialect: &'d SqlDialect,
    max_depth: usize,
    depth: Cell<usize>,
}

struct DepthGuard<'a> {
    depth: &'a Cell<usize>,
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

impl<'d> SqlVisitor<'d> {
    pub fn new(dialect: &'d SqlDialect) -> Self {
        Self {
            dialect,
            max_depth: DEFAULT_MAX_DEPTH,
            depth: Cell::new(0),
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn from_config(dialect: &'d SqlDialect, config: &RenderConfig) -> Self {
        Self::new(dialect).with_max_depth(config.max_depth)
    }

    pub fn dialect(&self) -> &SqlDialect {
        self.dialect
    }

    pub fn render(&self, query: &Query) -> Result<String> {
        let mut out = String::new();
        self.write_query(query, &mut out)?;
        Ok(out)
    }

    pub fn render_select(&self, select: &Select) -> Result<String> {
        self.check_statement("SELECT")?;
        let mut out = String::new();
        self.visit_select(select, &mut out)?;
        self.log_rendered("SELECT", &out);
        Ok(out)
    }

    pub fn render_insert(&self, insert: &Insert) -> Result<String> {
        self.check_statement("INSERT")?;
        let mut out = String::new();
        self.visit_insert(insert, &mut out)?;
        self.log_rendered("INSERT", &out);
        Ok(out)
    }

    pub fn render_update(&self, update: &Update) -> Result<String> {
        self.check_statement("UPDATE")?;
        let mut out = String::new();
        self.visit_update(update, &mut out)?;
        self.log_rendered("UPDATE", &out);
        Ok(out)
    }

    pub fn render_delete(&self, delete: &Delete) -> Result<String> {
        self.check_statement("DELETE")?;
        let mut out = String::new();
        self.visit_delete(delete, &mut out)?;
        self.log_rendered("DELETE", &out);
        Ok(out)
    }

    /// Appends the SQL for `query` to `out`. On error `out` is unchanged.
    pub fn write_query(&self, query: &Query, out: &mut String) -> Result<()> {
        let sql = match query {
            Query::Select(select) => self.render_select(select)?,
            Query::Insert(insert) => self.render_insert(insert)?,
            Query::Update(update) => self.render_update(update)?,
            Query::Delete(delete) => self.render_delete(delete)?,
        };
        out.push_str(&sql);
        Ok(())
    }

    /// Appends `expr` to `out`. Used by the function encoders for arguments.
    pub fn visit_expression(&self, expr: &Expression, out: &mut String) -> Result<()> {
        let _guard = self.enter()?;
        match expr {
            Expression::PropertyName(name) => {
                out.push_str(&self.dialect.quote_identifier(name));
                Ok(())
            }
            Expression::Literal(literal) => self.visit_literal(literal, out),
            Expression::Function(function) => self.visit_function(function, out),
            Expression::SubSelect(select) => {
                out.push('(');
                self.visit_select(select, out)?;
                out.push(')');
                Ok(())
            }
        }
    }

    fn visit_function(&self, function: &Function, out: &mut String) -> Result<()> {
        let encoder = self.dialect.find(function.name()).ok_or_else(|| {
            GeoqueryError::UnknownFunction {
                name: function.name().to_string(),
                dialect: self.dialect.name().to_string(),
            }
        })?;
        encoder.to_sql(function, out, self)
    }

    fn enter(&self) -> Result<DepthGuard<'_>> {
        let depth = self.depth.get() + 1;
        if depth > self.max_depth {
            return Err(GeoqueryError::DepthExceeded(self.max_depth));
        }
        self.depth.set(depth);
        Ok(DepthGuard { depth: &self.depth })
    }

    fn check_statement(&self, kind: &'static str) -> Result<()> {
        if self.dialect.capabilities().supports_statement(kind) {
            tracing::debug!(dialect = %self.dialect.name(), statement = kind, "rendering statement");
            Ok(())
        } else {
            Err(GeoqueryError::UnsupportedStatement {
                statement: kind,
                dialect: self.dialect.name().to_string(),
            })
        }
    }

    fn log_rendered(&self, kind: &'static str, sql: &str) {
        tracing::trace!(dialect = %self.dialect.name(), statement = kind, sql = %sql, "rendered statement");
    }

    fn visit_select(&self, select: &Select, out: &mut String) -> Result<()> {
        let _guard = self.enter()?;
        out.push_str("SELECT ");

        if let Some(distinct) = select.distinct() {
            if distinct.is_empty() {
                out.push_str("DISTINCT ");
            } else if self.dialect.supports_distinct_on() {
                out.push_str("DISTINCT ON (");
                self.visit_list(distinct.iter(), out, |expr, out| {
                    self.visit_expression(expr, out)
                })?;
                out.push_str(") ");
            } else {
                return Err(GeoqueryError::Unsupported(format!(
                    "DISTINCT ON is not available in dialect '{}'",
                    self.dialect.name()
                )));
            }
        }

        match select.fields() {
            Some(fields) if !fields.is_empty() => self.visit_fields(fields, out)?,
            _ => out.push('*'),
        }

        if let Some(from) = select.from_clause() {
            if !from.is_empty() {
                out.push_str(" FROM ");
                self.visit_list(from.iter(), out, |item, out| self.visit_from_item(item, out))?;
            }
        }

        if let Some(where_clause) = select.where_clause() {
            out.push_str(" WHERE ");
            self.visit_expression(where_clause.expression(), out)?;
        }

        if let Some(group_by) = select.group_by() {
            if !group_by.is_empty() {
                out.push_str(" GROUP BY ");
                self.visit_list(group_by.iter(), out, |item, out| {
                    self.visit_expression(&item.expr, out)
                })?;
            }
        }

        if let Some(having) = select.having() {
            out.push_str(" HAVING ");
            self.visit_expression(having.expression(), out)?;
        }

        if let Some(order_by) = select.order_by() {
            if !order_by.is_empty() {
                out.push_str(" ORDER BY ");
                self.visit_list(order_by.iter(), out, |item, out| {
                    self.visit_expression(&item.expr, out)?;
                    out.push_str(match item.order {
                        SortOrder::Asc => " ASC",
                        SortOrder::Desc => " DESC",
                    });
                    Ok(())
                })?;
            }
        }

        match (select.limit(), select.offset()) {
            (Some(limit), _) => out.push_str(&format!(" LIMIT {limit}")),
            (None, Some(_)) => {
                if let Some(token) = self.dialect.unbounded_limit() {
                    out.push_str(&format!(" LIMIT {token}"));
                }
            }
            (None, None) => {}
        }
        if let Some(offset) = select.offset() {
            out.push_str(&format!(" OFFSET {offset}"));
        }
        Ok(())
    }

    fn visit_fields(&self, fields: &Fields, out: &mut String) -> Result<()> {
        self.visit_list(fields.iter(), out, |field, out| {
            self.visit_expression(&field.expr, out)?;
            if let Some(alias) = &field.alias {
                out.push_str(" AS ");
                out.push_str(&self.dialect.quote_identifier(alias));
            }
            Ok(())
        })
    }

    fn visit_list<'a, T: 'a>(
        &self,
        items: impl Iterator<Item = &'a T>,
        out: &mut String,
        mut visit: impl FnMut(&'a T, &mut String) -> Result<()>,
    ) -> Result<()> {
        for (idx, item) in items.enumerate() {
            if idx > 0 {
                out.push_str(", ");
            }
            visit(item, out)?;
        }
        Ok(())
    }

    fn visit_from_item(&self, item: &FromItem, out: &mut String) -> Result<()> {
        match item {
            FromItem::DataSet(dataset) => {
                self.visit_dataset(dataset, out);
                Ok(())
            }
            FromItem::SubSelect(sub) => {
                out.push('(');
                self.visit_select(&sub.select, out)?;
                out.push(')');
                self.visit_alias(sub.alias.as_deref(), out);
                Ok(())
            }
            FromItem::Function(source) => {
                let _guard = self.enter()?;
                self.visit_function(&source.function, out)?;
                self.visit_alias(source.alias.as_deref(), out);
                Ok(())
            }
            FromItem::Join(join) => {
                if join.alias.is_some() {
                    out.push('(');
                    self.visit_join(join, out)?;
                    out.push(')');
                    self.visit_alias(join.alias.as_deref(), out);
                    Ok(())
                } else {
                    self.visit_join(join, out)
                }
            }
        }
    }

    fn visit_join(&self, join: &Join, out: &mut String) -> Result<()> {
        let _guard = self.enter()?;
        match (&join.condition, join.join_type.requires_condition()) {
            (None, true) => {
                return Err(GeoqueryError::InvalidQuery(format!(
                    "{} requires an ON or USING condition",
                    join.join_type.keyword()
                )))
            }
            (Some(_), false) => {
                return Err(GeoqueryError::InvalidQuery(format!(
                    "{} does not take a join condition",
                    join.join_type.keyword()
                )))
            }
            _ => {}
        }

        self.visit_from_item(&join.left, out)?;
        out.push(' ');
        out.push_str(join.join_type.keyword());
        out.push(' ');
        // Right-nested joins need parentheses to keep their grouping.
        if matches!(*join.right, FromItem::Join(ref right) if right.alias.is_none()) {
            out.push('(');
            self.visit_from_item(&join.right, out)?;
            out.push(')');
        } else {
            self.visit_from_item(&join.right, out)?;
        }

        match &join.condition {
            Some(JoinCondition::On(expr)) => {
                out.push_str(" ON ");
                self.visit_expression(expr, out)?;
            }
            Some(JoinCondition::Using(columns)) => {
                if columns.is_empty() {
                    return Err(GeoqueryError::InvalidQuery(
                        "USING needs at least one column".to_string(),
                    ));
                }
                out.push_str(" USING (");
                self.visit_list(columns.iter(), out, |column, out| {
                    out.push_str(&self.dialect.quote_identifier(column));
                    Ok(())
                })?;
                out.push(')');
            }
            None => {}
        }
        Ok(())
    }

    fn visit_dataset(&self, dataset: &DataSetName, out: &mut String) {
        out.push_str(&self.dialect.quote_identifier(&dataset.name));
        self.visit_alias(dataset.alias.as_deref(), out);
    }

    fn visit_alias(&self, alias: Option<&str>, out: &mut String) {
        if let Some(alias) = alias {
            out.push_str(" AS ");
            out.push_str(&self.dialect.quote_identifier(alias));
        }
    }

    fn visit_insert(&self, insert: &Insert, out: &mut String) -> Result<()> {
        out.push_str("INSERT INTO ");
        out.push_str(&self.dialect.quote_identifier(&insert.target.name));

        let columns = insert.columns.as_ref().filter(|c| !c.is_empty());
        if let Some(columns) = columns {
            out.push_str(" (");
            self.visit_list(columns.iter(), out, |field, out| {
                if let Some(alias) = &field.alias {
                    return Err(GeoqueryError::InvalidQuery(format!(
                        "INSERT target column cannot carry an alias ('{alias}')"
                    )));
                }
                self.visit_expression(&field.expr, out)
            })?;
            out.push(')');
        }

        match &insert.source {
            InsertSource::Select(select) => {
                out.push(' ');
                self.visit_select(select, out)
            }
            InsertSource::Values(rows) => {
                let width = match (columns, rows.first()) {
                    (_, None) => {
                        return Err(GeoqueryError::InvalidQuery(
                            "INSERT ... VALUES needs at least one row".to_string(),
                        ))
                    }
                    (Some(columns), Some(_)) => columns.len(),
                    (None, Some(first)) => first.len(),
                };
                out.push_str(" VALUES ");
                for (idx, row) in rows.iter().enumerate() {
                    if row.is_empty() || row.len() != width {
                        return Err(GeoqueryError::InvalidQuery(format!(
                            "VALUES row {idx} has {} value(s), expected {width}",
                            row.len()
                        )));
                    }
                    if idx > 0 {
                        out.push_str(", ");
                    }
                    out.push('(');
                    self.visit_list(row.iter(), out, |expr, out| self.visit_expression(expr, out))?;
                    out.push(')');
                }
                Ok(())
            }
        }
    }

    fn visit_update(&self, update: &Update, out: &mut String) -> Result<()> {
        if update.assignments.is_empty() {
            return Err(GeoqueryError::InvalidQuery(
                "UPDATE needs at least one assignment".to_string(),
            ));
        }
        out.push_str("UPDATE ");
        self.visit_dataset(&update.target, out);
        out.push_str(" SET ");
        self.visit_list(update.assignments.iter(), out, |assignment, out| {
            out.push_str(&self.dialect.quote_identifier(&assignment.column));
            out.push_str(" = ");
            self.visit_expression(&assignment.value, out)
        })?;
        if let Some(where_clause) = &update.where_clause {
            out.push_str(" WHERE ");
            self.visit_expression(where_clause.expression(), out)?;
        }
        Ok(())
    }

    fn visit_delete(&self, delete: &Delete, out: &mut String) -> Result<()> {
        out.push_str("DELETE FROM ");
        self.visit_dataset(&delete.target, out);
        if let Some(where_clause) = &delete.where_clause {
            out.push_str(" WHERE ");
            self.visit_expression(where_clause.expression(), out)?;
        }
        Ok(())
    }

    fn visit_literal(&self, literal: &Literal, out: &mut String) -> Result<()> {
        let style = self.dialect.literal_style();
        match literal {
            Literal::Null => out.push_str("NULL"),
            Literal::Bool(value) => out.push_str(match (style.boolean, *value) {
                (BooleanStyle::Keyword, true) => "TRUE",
                (BooleanStyle::Keyword, false) => "FALSE",
                (BooleanStyle::Numeric, true) => "1",
                (BooleanStyle::Numeric, false) => "0",
            }),
            Literal::Int16(value) => out.push_str(&value.to_string()),
            Literal::Int32(value) => out.push_str(&value.to_string()),
            Literal::Int64(value) => out.push_str(&value.to_string()),
            Literal::Double(value) => out.push_str(&self.format_double(*value)?),
            Literal::String(value) => self.push_quoted(value, out),
            Literal::Bytes(bytes) => match style.bytes {
                BytesStyle::HexEscape => {
                    out.push_str("'\\x");
                    out.push_str(&hex::encode(bytes));
                    out.push('\'');
                }
                BytesStyle::HexLiteral => {
                    out.push_str("X'");
                    out.push_str(&hex::encode_upper(bytes));
                    out.push('\'');
                }
            },
            Literal::Date(date) => self.push_temporal("DATE", &format_date(date), out),
            Literal::Time(time) => self.push_temporal("TIME", &format_time(time), out),
            Literal::DateTime(ts) => self.push_temporal("TIMESTAMP", &format_datetime(ts), out),
            Literal::DateTimeTz(ts) => {
                self.push_temporal("TIMESTAMP WITH TIME ZONE", &format_datetime_tz(ts), out)
            }
            Literal::Geometry(geometry) => self.visit_geometry(geometry, out),
            Literal::Envelope(envelope) => self.visit_envelope(envelope, out)?,
        }
        Ok(())
    }

    fn format_double(&self, value: f64) -> Result<String> {
        if !value.is_finite() {
            return Err(GeoqueryError::InvalidLiteral(format!(
                "{value} has no SQL representation"
            )));
        }
        Ok(match self.dialect.literal_style().double_precision {
            Some(precision) => format!("{value:.precision$}"),
            None => {
                let text = value.to_string();
                if text.contains('.') {
                    text
                } else {
                    format!("{text}.0")
                }
            }
        })
    }

    fn push_temporal(&self, keyword: &str, text: &str, out: &mut String) {
        if self.dialect.literal_style().temporal == TemporalStyle::Typed {
            out.push_str(keyword);
            out.push(' ');
        }
        self.push_quoted(text, out);
    }

    fn push_quoted(&self, text: &str, out: &mut String) {
        out.push('\'');
        for ch in text.chars() {
            match ch {
                '\'' => out.push_str("''"),
                '\\' if self.dialect.literal_style().backslash_escapes => out.push_str("\\\\"),
                _ => out.push(ch),
            }
        }
        out.push('\'');
    }

    fn visit_geometry(&self, geometry: &Geometry, out: &mut String) {
        match &self.dialect.literal_style().geometry {
            GeometryStyle::Wkt => self.push_quoted(geometry.wkt(), out),
            GeometryStyle::FromText(function) => {
                out.push_str(function);
                out.push('(');
                self.push_quoted(geometry.wkt(), out);
                if let Some(srid) = geometry.srid() {
                    out.push_str(&format!(", {srid}"));
                }
                out.push(')');
            }
        }
    }

    fn visit_envelope(&self, envelope: &Envelope, out: &mut String) -> Result<()> {
        let coords = [
            envelope.lower_x,
            envelope.lower_y,
            envelope.upper_x,
            envelope.upper_y,
        ]
        .into_iter()
        .map(|c| self.format_double(c))
        .collect::<Result<Vec<_>>>()?;
        match &self.dialect.literal_style().envelope {
            EnvelopeStyle::Polygon => {
                self.visit_geometry(&envelope.to_polygon(), out);
                Ok(())
            }
            EnvelopeStyle::MakeEnvelope(function) => {
                out.push_str(function);
                out.push('(');
                out.push_str(&coords.join(", "));
                if let Some(srid) = envelope.srid {
                    out.push_str(&format!(", {srid}"));
                }
                out.push(')');
                Ok(())
            }
        }
    }
}

fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn format_time(time: &NaiveTime) -> String {
    time.format("%H:%M:%S%.f").to_string()
}

fn format_datetime(ts: &NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M:%S%.f").to_string()
}

fn format_datetime_tz(ts: &DateTime<FixedOffset>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S%.f%:z").to_string()
}
