//! SELECT statement object.
//!
//! A `Select` can be assembled from complete clause containers through
//! [`Select::from_parts`] or grown step by step with the consuming `with_*`
//! builders. Absent clauses are meaningful: no FROM renders a scalar select and
//! no select list renders `*`.

use crate::clauses::{
    Distinct, Field, Fields, FromClause, GroupBy, GroupByItem, Having, OrderBy, OrderByItem,
    SortOrder, Where,
};
use crate::error::{GeoqueryError, Result};
use crate::expr::Expression;
use crate::from_item::{FromItem, Join, JoinCondition, JoinType};

/// Fully built clauses handed to [`Select::from_parts`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectParts {
    pub fields: Option<Fields>,
    pub from: Option<FromClause>,
    pub where_clause: Option<Where>,
    pub group_by: Option<GroupBy>,
    pub having: Option<Having>,
    pub order_by: Option<OrderBy>,
    pub distinct: Option<Distinct>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Select {
    fields: Option<Fields>,
    from: Option<FromClause>,
    where_clause: Option<Where>,
    group_by: Option<GroupBy>,
    having: Option<Having>,
    order_by: Option<OrderBy>,
    distinct: Option<Distinct>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl Select {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(parts: SelectParts) -> Self {
        Self {
            fields: parts.fields,
            from: parts.from,
            where_clause: parts.where_clause,
            group_by: parts.group_by,
            having: parts.having,
            order_by: parts.order_by,
            distinct: parts.distinct,
            limit: parts.limit,
            offset: parts.offset,
        }
    }

    pub fn with_fields(fields: Fields) -> Self {
        Self {
            fields: Some(fields),
            ..Self::default()
        }
    }

    /// `SELECT <name>`.
    pub fn property(name: impl Into<String>) -> Self {
        Self::new().with_column(name)
    }

    /// `SELECT <name> AS <alias>`.
    pub fn property_as(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self::new().with_column_as(name, alias)
    }

    pub fn into_parts(self) -> SelectParts {
        SelectParts {
            fields: self.fields,
            from: self.from,
            where_clause: self.where_clause,
            group_by: self.group_by,
            having: self.having,
            order_by: self.order_by,
            distinct: self.distinct,
            limit: self.limit,
            offset: self.offset,
        }
    }

    // === Select list ===

    /// Replaces the whole select list.
    pub fn with_field_list(mut self, fields: Fields) -> Self {
        self.fields = Some(fields);
        self
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.get_or_insert_with(Fields::new).push(field);
        self
    }

    pub fn with_column(self, name: impl Into<String>) -> Self {
        self.with_field(Field::property(name))
    }

    pub fn with_column_as(self, name: impl Into<String>, alias: impl Into<String>) -> Self {
        self.with_field(Field::with_alias(Expression::property(name), alias))
    }

    // === FROM ===

    /// Replaces the whole FROM clause.
    pub fn with_from(mut self, from: FromClause) -> Self {
        self.from = Some(from);
        self
    }

    pub fn with_from_item(mut self, item: impl Into<FromItem>) -> Self {
        self.from.get_or_insert_with(FromClause::new).push(item);
        self
    }

    pub fn with_dataset(self, name: impl Into<String>) -> Self {
        self.with_from_item(FromItem::dataset(name))
    }

    pub fn with_dataset_as(self, name: impl Into<String>, alias: impl Into<String>) -> Self {
        self.with_from_item(FromItem::dataset_as(name, alias))
    }

    /// Joins `right` onto the last FROM item, replacing it with the join.
    pub fn with_join(
        mut self,
        right: impl Into<FromItem>,
        join_type: JoinType,
        condition: Option<JoinCondition>,
    ) -> Result<Self> {
        let from = self.from.as_mut().ok_or(GeoqueryError::ClauseNotSet("FROM"))?;
        let left = from.pop().ok_or(GeoqueryError::ClauseNotSet("FROM"))?;
        from.push(Join::new(left, right.into(), join_type, condition));
        Ok(self)
    }

    pub fn with_inner_join(
        self,
        right: impl Into<FromItem>,
        condition: JoinCondition,
    ) -> Result<Self> {
        self.with_join(right, JoinType::Inner, Some(condition))
    }

    pub fn with_left_join(self, right: impl Into<FromItem>, condition: JoinCondition) -> Result<Self> {
        self.with_join(right, JoinType::Left, Some(condition))
    }

    pub fn with_right_join(
        self,
        right: impl Into<FromItem>,
        condition: JoinCondition,
    ) -> Result<Self> {
        self.with_join(right, JoinType::Right, Some(condition))
    }

    pub fn with_full_outer_join(
        self,
        right: impl Into<FromItem>,
        condition: JoinCondition,
    ) -> Result<Self> {
        self.with_join(right, JoinType::FullOuter, Some(condition))
    }

    pub fn with_cross_join(self, right: impl Into<FromItem>) -> Result<Self> {
        self.with_join(right, JoinType::Cross, None)
    }

    pub fn with_natural_join(self, right: impl Into<FromItem>) -> Result<Self> {
        self.with_join(right, JoinType::Natural, None)
    }

    // === WHERE / HAVING ===

    /// Sets the WHERE predicate. An existing predicate is replaced, not
    /// AND-combined; build the conjunction yourself when that is wanted.
    pub fn with_where(mut self, expr: Expression) -> Self {
        match self.where_clause.as_mut() {
            Some(w) => w.set_expression(expr),
            None => self.where_clause = Some(Where::new(expr)),
        }
        self
    }

    pub fn with_where_clause(mut self, where_clause: Where) -> Self {
        self.where_clause = Some(where_clause);
        self
    }

    /// Same replace semantics as [`Select::with_where`].
    pub fn with_having(mut self, expr: Expression) -> Self {
        match self.having.as_mut() {
            Some(h) => h.set_expression(expr),
            None => self.having = Some(Having::new(expr)),
        }
        self
    }

    pub fn with_having_clause(mut self, having: Having) -> Self {
        self.having = Some(having);
        self
    }

    // === GROUP BY ===

    pub fn with_group_by(mut self, expr: Expression) -> Self {
        self.group_by
            .get_or_insert_with(GroupBy::new)
            .push(GroupByItem { expr });
        self
    }

    pub fn with_group_by_property(self, name: impl Into<String>) -> Self {
        self.with_group_by(Expression::property(name))
    }

    pub fn with_group_by_clause(mut self, group_by: GroupBy) -> Self {
        self.group_by = Some(group_by);
        self
    }

    // === ORDER BY ===

    pub fn with_order_by(mut self, expr: Expression, order: SortOrder) -> Self {
        self.order_by
            .get_or_insert_with(OrderBy::new)
            .push(OrderByItem::new(expr, order));
        self
    }

    pub fn with_order_by_property(self, name: impl Into<String>, order: SortOrder) -> Self {
        self.with_order_by(Expression::property(name), order)
    }

    pub fn with_order_by_clause(mut self, order_by: OrderBy) -> Self {
        self.order_by = Some(order_by);
        self
    }

    // === DISTINCT ===

    pub fn with_distinct(mut self, expr: Expression) -> Self {
        self.distinct.get_or_insert_with(Distinct::new).push(expr);
        self
    }

    pub fn with_distinct_property(self, name: impl Into<String>) -> Self {
        self.with_distinct(Expression::property(name))
    }

    pub fn with_distinct_clause(mut self, distinct: Distinct) -> Self {
        self.distinct = Some(distinct);
        self
    }

    // === LIMIT / OFFSET ===

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    // === Setters ===

    pub fn set_fields(&mut self, fields: Option<Fields>) {
        self.fields = fields;
    }

    pub fn set_from(&mut self, from: Option<FromClause>) {
        self.from = from;
    }

    pub fn set_where(&mut self, where_clause: Option<Where>) {
        self.where_clause = where_clause;
    }

    pub fn set_group_by(&mut self, group_by: Option<GroupBy>) {
        self.group_by = group_by;
    }

    pub fn set_having(&mut self, having: Option<Having>) {
        self.having = having;
    }

    pub fn set_order_by(&mut self, order_by: Option<OrderBy>) {
        self.order_by = order_by;
    }

    pub fn set_distinct(&mut self, distinct: Option<Distinct>) {
        self.distinct = distinct;
    }

    pub fn set_limit(&mut self, limit: Option<u64>) {
        self.limit = limit;
    }

    pub fn set_offset(&mut self, offset: Option<u64>) {
        self.offset = offset;
    }

    // === Accessors ===

    pub fn fields(&self) -> Option<&Fields> {
        self.fields.as_ref()
    }

    pub fn fields_mut(&mut self) -> Result<&mut Fields> {
        self.fields
            .as_mut()
            .ok_or(GeoqueryError::ClauseNotSet("select list"))
    }

    pub fn from_clause(&self) -> Option<&FromClause> {
        self.from.as_ref()
    }

    pub fn from_clause_mut(&mut self) -> Result<&mut FromClause> {
        self.from.as_mut().ok_or(GeoqueryError::ClauseNotSet("FROM"))
    }

    pub fn where_clause(&self) -> Option<&Where> {
        self.where_clause.as_ref()
    }

    pub fn where_clause_mut(&mut self) -> Result<&mut Where> {
        self.where_clause
            .as_mut()
            .ok_or(GeoqueryError::ClauseNotSet("WHERE"))
    }

    pub fn group_by(&self) -> Option<&GroupBy> {
        self.group_by.as_ref()
    }

    pub fn group_by_mut(&mut self) -> Result<&mut GroupBy> {
        self.group_by
            .as_mut()
            .ok_or(GeoqueryError::ClauseNotSet("GROUP BY"))
    }

    pub fn having(&self) -> Option<&Having> {
        self.having.as_ref()
    }

    pub fn having_mut(&mut self) -> Result<&mut Having> {
        self.having
            .as_mut()
            .ok_or(GeoqueryError::ClauseNotSet("HAVING"))
    }

    pub fn order_by(&self) -> Option<&OrderBy> {
        self.order_by.as_ref()
    }

    pub fn order_by_mut(&mut self) -> Result<&mut OrderBy> {
        self.order_by
            .as_mut()
            .ok_or(GeoqueryError::ClauseNotSet("ORDER BY"))
    }

    pub fn distinct(&self) -> Option<&Distinct> {
        self.distinct.as_ref()
    }

    pub fn distinct_mut(&mut self) -> Result<&mut Distinct> {
        self.distinct
            .as_mut()
            .ok_or(GeoqueryError::ClauseNotSet("DISTINCT"))
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn offset(&self) -> Option<u64> {
        self.offset
    }
}
