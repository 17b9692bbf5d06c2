//! Data-modifying statements and the [`Query`] sum type.

use crate::clauses::{Fields, Where};
use crate::expr::Expression;
use crate::from_item::DataSetName;
use crate::select::Select;

/// Where the inserted rows come from.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertSource {
    /// `VALUES (...), (...)`; one inner vector per row.
    Values(Vec<Vec<Expression>>),
    /// `INSERT ... SELECT`.
    Select(Box<Select>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub target: DataSetName,
    pub columns: Option<Fields>,
    pub source: InsertSource,
}

impl Insert {
    pub fn from_select(target: DataSetName, select: Select) -> Self {
        Self {
            target,
            columns: None,
            source: InsertSource::Select(Box::new(select)),
        }
    }

    pub fn from_select_with_fields(target: DataSetName, columns: Fields, select: Select) -> Self {
        Self {
            target,
            columns: Some(columns),
            source: InsertSource::Select(Box::new(select)),
        }
    }

    pub fn values(target: DataSetName, columns: Fields, rows: Vec<Vec<Expression>>) -> Self {
        Self {
            target,
            columns: Some(columns),
            source: InsertSource::Values(rows),
        }
    }

    /// Appends a row to a VALUES insert; returns false for INSERT ... SELECT.
    pub fn push_row(&mut self, row: Vec<Expression>) -> bool {
        match &mut self.source {
            InsertSource::Values(rows) => {
                rows.push(row);
                true
            }
            InsertSource::Select(_) => false,
        }
    }
}

/// `column = value` inside an UPDATE.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: String,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub target: DataSetName,
    pub assignments: Vec<Assignment>,
    pub where_clause: Option<Where>,
}

impl Update {
    pub fn new(target: DataSetName) -> Self {
        Self {
            target,
            assignments: Vec::new(),
            where_clause: None,
        }
    }

    pub fn set(mut self, column: impl Into<String>, value: Expression) -> Self {
        self.assignments.push(Assignment {
            column: column.into(),
            value,
        });
        self
    }

    /// Replaces any previous predicate.
    pub fn with_where(mut self, expr: Expression) -> Self {
        self.where_clause = Some(Where::new(expr));
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    pub target: DataSetName,
    pub where_clause: Option<Where>,
}

impl Delete {
    pub fn new(target: DataSetName) -> Self {
        Self {
            target,
            where_clause: None,
        }
    }

    /// Replaces any previous predicate.
    pub fn with_where(mut self, expr: Expression) -> Self {
        self.where_clause = Some(Where::new(expr));
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Select(Select),
    Insert(Insert),
    Update(Update),
    Delete(Delete),
}

impl Query {
    pub fn kind(&self) -> &'static str {
        match self {
            Query::Select(_) => "SELECT",
            Query::Insert(_) => "INSERT",
            Query::Update(_) => "UPDATE",
            Query::Delete(_) => "DELETE",
        }
    }
}

impl From<Select> for Query {
    fn from(value: Select) -> Self {
        Query::Select(value)
    }
}

impl From<Insert> for Query {
    fn from(value: Insert) -> Self {
        Query::Insert(value)
    }
}

impl From<Update> for Query {
    fn from(value: Update) -> Self {
        Query::Update(value)
    }
}

impl From<Delete> for Query {
    fn from(value: Delete) -> Self {
        Query::Delete(value)
    }
}
