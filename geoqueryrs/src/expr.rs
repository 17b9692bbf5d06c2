//! Query expression tree.
//!
//! Operators are plain [`Function`] nodes identified by name; how a name is
//! spelled in SQL is decided by the dialect at generation time.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{GeoqueryError, Result};
use crate::select::Select;

/// Logical function and operator names understood by the built-in dialects.
pub mod names {
    pub const EQUAL_TO: &str = "=";
    pub const NOT_EQUAL_TO: &str = "<>";
    pub const LESS_THAN: &str = "<";
    pub const LESS_THAN_OR_EQUAL_TO: &str = "<=";
    pub const GREATER_THAN: &str = ">";
    pub const GREATER_THAN_OR_EQUAL_TO: &str = ">=";
    pub const AND: &str = "and";
    pub const OR: &str = "or";
    pub const NOT: &str = "not";
    pub const ADD: &str = "+";
    pub const SUB: &str = "-";
    pub const MUL: &str = "*";
    pub const DIV: &str = "/";
    pub const MOD: &str = "%";
    pub const NEGATE: &str = "negate";
    pub const LIKE: &str = "like";
    pub const IS_NULL: &str = "is_null";
    pub const IS_NOT_NULL: &str = "is_not_null";
    pub const ST_INTERSECTS: &str = "st_intersects";
    pub const ST_CONTAINS: &str = "st_contains";
    pub const ST_WITHIN: &str = "st_within";
    pub const ST_TOUCHES: &str = "st_touches";
    pub const ST_CROSSES: &str = "st_crosses";
    pub const ST_OVERLAPS: &str = "st_overlaps";
    pub const ST_DISJOINT: &str = "st_disjoint";
    pub const ST_EQUALS: &str = "st_equals";
    pub const ST_DWITHIN: &str = "st_dwithin";
    pub const ST_ENVELOPE: &str = "st_envelope";
    pub const ST_AREA: &str = "st_area";
    pub const ST_LENGTH: &str = "st_length";
    pub const ST_DISTANCE: &str = "st_distance";
    pub const ST_BBOX_INTERSECTS: &str = "st_bbox_intersects";
    pub const COUNT: &str = "count";
    pub const SUM: &str = "sum";
    pub const AVG: &str = "avg";
    pub const MIN: &str = "min";
    pub const MAX: &str = "max";
    pub const UPPER: &str = "upper";
    pub const LOWER: &str = "lower";
    pub const SUBSTRING: &str = "substring";
    pub const EXTRACT: &str = "extract";
    pub const CURRENT_TIMESTAMP: &str = "current_timestamp";
}

/// Geometry value carried opaquely as WKT text.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    wkt: String,
    srid: Option<i32>,
}

impl Geometry {
    pub fn from_wkt(wkt: impl Into<String>) -> Self {
        Self {
            wkt: wkt.into(),
            srid: None,
        }
    }

    pub fn with_srid(mut self, srid: i32) -> Self {
        self.srid = Some(srid);
        self
    }

    pub fn wkt(&self) -> &str {
        &self.wkt
    }

    pub fn srid(&self) -> Option<i32> {
        self.srid
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub lower_x: f64,
    pub lower_y: f64,
    pub upper_x: f64,
    pub upper_y: f64,
    pub srid: Option<i32>,
}

impl Envelope {
    pub fn new(lower_x: f64, lower_y: f64, upper_x: f64, upper_y: f64) -> Self {
        Self {
            lower_x,
            lower_y,
            upper_x,
            upper_y,
            srid: None,
        }
    }

    pub fn with_srid(mut self, srid: i32) -> Self {
        self.srid = Some(srid);
        self
    }

    /// Closed ring, counter-clockwise from the lower-left corner.
    pub fn to_polygon(&self) -> Geometry {
        let (x1, y1, x2, y2) = (self.lower_x, self.lower_y, self.upper_x, self.upper_y);
        let wkt = format!("POLYGON(({x1} {y1}, {x2} {y1}, {x2} {y2}, {x1} {y2}, {x1} {y1}))");
        Geometry {
            wkt,
            srid: self.srid,
        }
    }
}

/// Typed constant.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    DateTimeTz(DateTime<FixedOffset>),
    Geometry(Geometry),
    Envelope(Envelope),
}

macro_rules! literal_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Literal {
                fn from(value: $ty) -> Self {
                    Literal::$variant(value)
                }
            }
        )*
    };
}

literal_from! {
    bool => Bool,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    f64 => Double,
    String => String,
    Vec<u8> => Bytes,
    NaiveDate => Date,
    NaiveTime => Time,
    NaiveDateTime => DateTime,
    DateTime<FixedOffset> => DateTimeTz,
    Geometry => Geometry,
    Envelope => Envelope,
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::String(value.to_string())
    }
}

/// A named operation over ordered arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    name: String,
    args: Vec<Expression>,
}

impl Function {
    pub fn new(name: impl Into<String>, args: Vec<Expression>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn num_args(&self) -> usize {
        self.args.len()
    }

    pub fn args(&self) -> &[Expression] {
        &self.args
    }

    pub fn arg(&self, index: usize) -> Result<&Expression> {
        self.args.get(index).ok_or_else(|| GeoqueryError::ArgumentIndex {
            function: self.name.clone(),
            index,
            len: self.args.len(),
        })
    }

    pub fn arg_mut(&mut self, index: usize) -> Result<&mut Expression> {
        let len = self.args.len();
        let function = &self.name;
        self.args
            .get_mut(index)
            .ok_or_else(|| GeoqueryError::ArgumentIndex {
                function: function.clone(),
                index,
                len,
            })
    }

    pub fn push_arg(&mut self, arg: Expression) {
        self.args.push(arg);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Possibly qualified column reference, e.g. `c.name`.
    PropertyName(String),
    Literal(Literal),
    Function(Function),
    /// Scalar sub-query used as a value.
    SubSelect(Box<Select>),
}

impl From<Literal> for Expression {
    fn from(value: Literal) -> Self {
        Expression::Literal(value)
    }
}

impl From<Function> for Expression {
    fn from(value: Function) -> Self {
        Expression::Function(value)
    }
}

impl From<Select> for Expression {
    fn from(value: Select) -> Self {
        Expression::SubSelect(Box::new(value))
    }
}

fn binary(name: &str, left: Expression, right: Expression) -> Expression {
    Expression::Function(Function::new(name, vec![left, right]))
}

fn unary(name: &str, arg: Expression) -> Expression {
    Expression::Function(Function::new(name, vec![arg]))
}

impl Expression {
    pub fn property(name: impl Into<String>) -> Self {
        Expression::PropertyName(name.into())
    }

    pub fn literal(value: impl Into<Literal>) -> Self {
        Expression::Literal(value.into())
    }

    pub fn null() -> Self {
        Expression::Literal(Literal::Null)
    }

    pub fn function(name: impl Into<String>, args: Vec<Expression>) -> Self {
        Expression::Function(Function::new(name, args))
    }

    pub fn sub_select(select: Select) -> Self {
        Expression::SubSelect(Box::new(select))
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Expression::Function(f) => Some(f),
            _ => None,
        }
    }

    // === Comparison ===
    pub fn equal_to(left: Expression, right: Expression) -> Self {
        binary(names::EQUAL_TO, left, right)
    }

    pub fn not_equal_to(left: Expression, right: Expression) -> Self {
        binary(names::NOT_EQUAL_TO, left, right)
    }

    pub fn less_than(left: Expression, right: Expression) -> Self {
        binary(names::LESS_THAN, left, right)
    }

    pub fn less_than_or_equal_to(left: Expression, right: Expression) -> Self {
        binary(names::LESS_THAN_OR_EQUAL_TO, left, right)
    }

    pub fn greater_than(left: Expression, right: Expression) -> Self {
        binary(names::GREATER_THAN, left, right)
    }

    pub fn greater_than_or_equal_to(left: Expression, right: Expression) -> Self {
        binary(names::GREATER_THAN_OR_EQUAL_TO, left, right)
    }

    pub fn like(expr: Expression, pattern: Expression) -> Self {
        binary(names::LIKE, expr, pattern)
    }

    pub fn is_null(expr: Expression) -> Self {
        unary(names::IS_NULL, expr)
    }

    pub fn is_not_null(expr: Expression) -> Self {
        unary(names::IS_NOT_NULL, expr)
    }

    // === Logical ===
    pub fn and(left: Expression, right: Expression) -> Self {
        binary(names::AND, left, right)
    }

    pub fn or(left: Expression, right: Expression) -> Self {
        binary(names::OR, left, right)
    }

    pub fn not(expr: Expression) -> Self {
        unary(names::NOT, expr)
    }

    // === Arithmetic ===
    pub fn add(left: Expression, right: Expression) -> Self {
        binary(names::ADD, left, right)
    }

    pub fn sub(left: Expression, right: Expression) -> Self {
        binary(names::SUB, left, right)
    }

    pub fn mul(left: Expression, right: Expression) -> Self {
        binary(names::MUL, left, right)
    }

    pub fn div(left: Expression, right: Expression) -> Self {
        binary(names::DIV, left, right)
    }

    pub fn modulo(left: Expression, right: Expression) -> Self {
        binary(names::MOD, left, right)
    }

    pub fn negate(expr: Expression) -> Self {
        unary(names::NEGATE, expr)
    }

    // === Spatial predicates ===
    pub fn st_intersects(left: Expression, right: Expression) -> Self {
        binary(names::ST_INTERSECTS, left, right)
    }

    pub fn st_contains(left: Expression, right: Expression) -> Self {
        binary(names::ST_CONTAINS, left, right)
    }

    pub fn st_within(left: Expression, right: Expression) -> Self {
        binary(names::ST_WITHIN, left, right)
    }

    pub fn st_touches(left: Expression, right: Expression) -> Self {
        binary(names::ST_TOUCHES, left, right)
    }

    pub fn st_crosses(left: Expression, right: Expression) -> Self {
        binary(names::ST_CROSSES, left, right)
    }

    pub fn st_overlaps(left: Expression, right: Expression) -> Self {
        binary(names::ST_OVERLAPS, left, right)
    }

    pub fn st_disjoint(left: Expression, right: Expression) -> Self {
        binary(names::ST_DISJOINT, left, right)
    }

    pub fn st_equals(left: Expression, right: Expression) -> Self {
        binary(names::ST_EQUALS, left, right)
    }

    pub fn st_dwithin(left: Expression, right: Expression, distance: Expression) -> Self {
        Expression::function(names::ST_DWITHIN, vec![left, right, distance])
    }

    // === Aggregates ===
    pub fn count(expr: Expression) -> Self {
        unary(names::COUNT, expr)
    }

    pub fn sum(expr: Expression) -> Self {
        unary(names::SUM, expr)
    }

    pub fn avg(expr: Expression) -> Self {
        unary(names::AVG, expr)
    }

    pub fn min(expr: Expression) -> Self {
        unary(names::MIN, expr)
    }

    pub fn max(expr: Expression) -> Self {
        unary(names::MAX, expr)
    }
}
