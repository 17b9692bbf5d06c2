//! Clause containers composed into statements.

use crate::expr::Expression;
use crate::from_item::FromItem;

/// Generates an insertion-ordered container owning its items.
macro_rules! ordered_clause {
    ($(#[$meta:meta])* $name:ident, $item:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Default)]
        pub struct $name(Vec<$item>);

        impl $name {
            pub fn new() -> Self {
                Self(Vec::new())
            }

            pub fn push(&mut self, item: impl Into<$item>) {
                self.0.push(item.into());
            }

            pub fn iter(&self) -> std::slice::Iter<'_, $item> {
                self.0.iter()
            }

            pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, $item> {
                self.0.iter_mut()
            }

            pub fn get(&self, index: usize) -> Option<&$item> {
                self.0.get(index)
            }

            pub fn len(&self) -> usize {
                self.0.len()
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            pub fn into_inner(self) -> Vec<$item> {
                self.0
            }
        }

        impl From<Vec<$item>> for $name {
            fn from(items: Vec<$item>) -> Self {
                Self(items)
            }
        }

        impl FromIterator<$item> for $name {
            fn from_iter<I: IntoIterator<Item = $item>>(iter: I) -> Self {
                Self(iter.into_iter().collect())
            }
        }

        impl IntoIterator for $name {
            type Item = $item;
            type IntoIter = std::vec::IntoIter<$item>;

            fn into_iter(self) -> Self::IntoIter {
                self.0.into_iter()
            }
        }

        impl<'a> IntoIterator for &'a $name {
            type Item = &'a $item;
            type IntoIter = std::slice::Iter<'a, $item>;

            fn into_iter(self) -> Self::IntoIter {
                self.0.iter()
            }
        }
    };
}

/// One entry of the select list.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub expr: Expression,
    pub alias: Option<String>,
}

impl Field {
    pub fn new(expr: Expression) -> Self {
        Self { expr, alias: None }
    }

    pub fn with_alias(expr: Expression, alias: impl Into<String>) -> Self {
        Self {
            expr,
            alias: Some(alias.into()),
        }
    }

    pub fn property(name: impl Into<String>) -> Self {
        Self::new(Expression::PropertyName(name.into()))
    }
}

impl From<Expression> for Field {
    fn from(expr: Expression) -> Self {
        Field::new(expr)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupByItem {
    pub expr: Expression,
}

impl From<Expression> for GroupByItem {
    fn from(expr: Expression) -> Self {
        GroupByItem { expr }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByItem {
    pub expr: Expression,
    pub order: SortOrder,
}

impl OrderByItem {
    pub fn new(expr: Expression, order: SortOrder) -> Self {
        Self { expr, order }
    }
}

impl From<Expression> for OrderByItem {
    fn from(expr: Expression) -> Self {
        OrderByItem::new(expr, SortOrder::Asc)
    }
}

ordered_clause!(
    /// Select list.
    Fields,
    Field
);
ordered_clause!(
    /// FROM list; items are comma separated when rendered.
    FromClause,
    FromItem
);
ordered_clause!(GroupBy, GroupByItem);
ordered_clause!(OrderBy, OrderByItem);
ordered_clause!(
    /// Expressions for `DISTINCT ON (...)`; empty means a plain `DISTINCT`.
    Distinct,
    Expression
);

impl Fields {
    /// Builds a select list out of plain column names.
    pub fn properties<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names.into_iter().map(Field::property).collect()
    }
}

impl FromClause {
    pub fn last_mut(&mut self) -> Option<&mut FromItem> {
        self.0.last_mut()
    }

    pub fn pop(&mut self) -> Option<FromItem> {
        self.0.pop()
    }
}

/// Generates a single-expression clause wrapper.
macro_rules! predicate_clause {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            expr: Expression,
        }

        impl $name {
            pub fn new(expr: Expression) -> Self {
                Self { expr }
            }

            pub fn expression(&self) -> &Expression {
                &self.expr
            }

            pub fn expression_mut(&mut self) -> &mut Expression {
                &mut self.expr
            }

            /// Replaces the wrapped predicate; it is not combined with the old one.
            pub fn set_expression(&mut self, expr: Expression) {
                self.expr = expr;
            }

            pub fn into_expression(self) -> Expression {
                self.expr
            }
        }

        impl From<Expression> for $name {
            fn from(expr: Expression) -> Self {
                Self::new(expr)
            }
        }
    };
}

predicate_clause!(Where);
predicate_clause!(Having);
