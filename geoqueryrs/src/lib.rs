pub mod capabilities;
pub mod clauses;
pub mod config;
pub mod dialect;
pub mod error;
pub mod expr;
pub mod from_item;
pub mod registry;
pub mod select;
pub mod statement;
pub mod visitor;

use crate::error::Result;

/// Render `query` for `dialect` with default settings.
pub fn to_sql(query: &Query, dialect: &SqlDialect) -> Result<String> {
    SqlVisitor::new(dialect).render(query)
}

pub use capabilities::{OperatorCategory, QueryCapabilities, StatementSupport};
pub use clauses::{
    Distinct, Field, Fields, FromClause, GroupBy, GroupByItem, Having, OrderBy, OrderByItem,
    SortOrder, Where,
};
pub use config::{GeoqueryConfig, RenderConfig};
pub use dialect::{FunctionEncoder, LiteralStyle, SqlDialect, TemplateEncoder};
pub use error::GeoqueryError;
pub use expr::{Envelope, Expression, Function, Geometry, Literal};
pub use from_item::{
    DataSetName, FromItem, FunctionSource, Join, JoinCondition, JoinType, SubSelect,
};
pub use registry::DialectRegistry;
pub use select::{Select, SelectParts};
pub use statement::{Assignment, Delete, Insert, InsertSource, Query, Update};
pub use visitor::SqlVisitor;
