//! Row sources for a FROM clause.

use crate::expr::{Expression, Function};
use crate::select::Select;

/// Named dataset (table or view) reference.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSetName {
    pub name: String,
    pub alias: Option<String>,
}

impl DataSetName {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }

    pub fn with_alias(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: Some(alias.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubSelect {
    pub select: Box<Select>,
    pub alias: Option<String>,
}

impl SubSelect {
    pub fn new(select: Select, alias: impl Into<String>) -> Self {
        Self {
            select: Box::new(select),
            alias: Some(alias.into()),
        }
    }
}

/// Set-returning function used as a row source, e.g. `ST_Dump(geom) AS d`.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSource {
    pub function: Function,
    pub alias: Option<String>,
}

impl FunctionSource {
    pub fn new(function: Function) -> Self {
        Self {
            function,
            alias: None,
        }
    }

    pub fn with_alias(function: Function, alias: impl Into<String>) -> Self {
        Self {
            function,
            alias: Some(alias.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    FullOuter,
    Cross,
    Natural,
}

impl JoinType {
    pub fn keyword(self) -> &'static str {
        match self {
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
            JoinType::Right => "RIGHT JOIN",
            JoinType::FullOuter => "FULL OUTER JOIN",
            JoinType::Cross => "CROSS JOIN",
            JoinType::Natural => "NATURAL JOIN",
        }
    }

    /// Cross and natural joins never take an ON/USING condition; the others must.
    pub fn requires_condition(self) -> bool {
        !matches!(self, JoinType::Cross | JoinType::Natural)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum JoinCondition {
    On(Expression),
    Using(Vec<String>),
}

impl JoinCondition {
    pub fn using<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        JoinCondition::Using(columns.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub left: Box<FromItem>,
    pub right: Box<FromItem>,
    pub join_type: JoinType,
    pub condition: Option<JoinCondition>,
    pub alias: Option<String>,
}

impl Join {
    pub fn new(
        left: FromItem,
        right: FromItem,
        join_type: JoinType,
        condition: Option<JoinCondition>,
    ) -> Self {
        Self {
            left: Box::new(left),
            right: Box::new(right),
            join_type,
            condition,
            alias: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FromItem {
    DataSet(DataSetName),
    SubSelect(SubSelect),
    Function(FunctionSource),
    Join(Join),
}

impl FromItem {
    pub fn dataset(name: impl Into<String>) -> Self {
        FromItem::DataSet(DataSetName::new(name))
    }

    pub fn dataset_as(name: impl Into<String>, alias: impl Into<String>) -> Self {
        FromItem::DataSet(DataSetName::with_alias(name, alias))
    }

    pub fn sub_select(select: Select, alias: impl Into<String>) -> Self {
        FromItem::SubSelect(SubSelect::new(select, alias))
    }

    pub fn function(function: Function) -> Self {
        FromItem::Function(FunctionSource::new(function))
    }

    pub fn function_as(function: Function, alias: impl Into<String>) -> Self {
        FromItem::Function(FunctionSource::with_alias(function, alias))
    }

    pub fn alias(&self) -> Option<&str> {
        match self {
            FromItem::DataSet(d) => d.alias.as_deref(),
            FromItem::SubSelect(s) => s.alias.as_deref(),
            FromItem::Function(f) => f.alias.as_deref(),
            FromItem::Join(j) => j.alias.as_deref(),
        }
    }

    pub fn set_alias(&mut self, alias: Option<String>) {
        match self {
            FromItem::DataSet(d) => d.alias = alias,
            FromItem::SubSelect(s) => s.alias = alias,
            FromItem::Function(f) => f.alias = alias,
            FromItem::Join(j) => j.alias = alias,
        }
    }
}

impl From<DataSetName> for FromItem {
    fn from(value: DataSetName) -> Self {
        FromItem::DataSet(value)
    }
}

impl From<SubSelect> for FromItem {
    fn from(value: SubSelect) -> Self {
        FromItem::SubSelect(value)
    }
}

impl From<FunctionSource> for FromItem {
    fn from(value: FunctionSource) -> Self {
        FromItem::Function(value)
    }
}

impl From<Join> for FromItem {
    fn from(value: Join) -> Self {
        FromItem::Join(value)
    }
}
