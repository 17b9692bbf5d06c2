//! MySQL 8 spatial dialect.

use crate::capabilities::OperatorCategory::{Arithmetic, Function, Spatial};
use crate::error::Result;
use crate::expr::names;

use super::{
    register_standard_operators, BooleanStyle, BytesStyle, EnvelopeStyle, FunctionEncoder,
    GeometryStyle, LiteralStyle, SqlDialect, TemporalStyle,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlDialect;

impl MySqlDialect {
    pub const NAME: &'static str = "mysql";

    pub fn literal_style() -> LiteralStyle {
        LiteralStyle {
            boolean: BooleanStyle::Keyword,
            bytes: BytesStyle::HexLiteral,
            temporal: TemporalStyle::Quoted,
            geometry: GeometryStyle::FromText("ST_GeomFromText".to_string()),
            envelope: EnvelopeStyle::Polygon,
            double_precision: None,
            backslash_escapes: true,
        }
    }

    pub fn build() -> Result<SqlDialect> {
        let mut dialect = SqlDialect::new(Self::NAME)
            .with_literal_style(Self::literal_style())
            .with_unbounded_limit("18446744073709551615");
        register_standard_operators(&mut dialect)?;

        for (name, alias) in [
            (names::ST_INTERSECTS, "ST_Intersects"),
            (names::ST_CONTAINS, "ST_Contains"),
            (names::ST_WITHIN, "ST_Within"),
            (names::ST_TOUCHES, "ST_Touches"),
            (names::ST_CROSSES, "ST_Crosses"),
            (names::ST_OVERLAPS, "ST_Overlaps"),
            (names::ST_DISJOINT, "ST_Disjoint"),
            (names::ST_EQUALS, "ST_Equals"),
            (names::ST_ENVELOPE, "ST_Envelope"),
            (names::ST_AREA, "ST_Area"),
            (names::ST_LENGTH, "ST_Length"),
            (names::ST_DISTANCE, "ST_Distance"),
            (names::ST_BBOX_INTERSECTS, "MBRIntersects"),
        ] {
            dialect.register(Spatial, name, FunctionEncoder::call(alias))?;
        }
        dialect.register(
            Spatial,
            names::ST_DWITHIN,
            FunctionEncoder::template("", "(ST_Distance($1, $2) <= $3)")?,
        )?;

        dialect.register(Arithmetic, names::MOD, FunctionEncoder::binary_op("MOD"))?;

        dialect.register(Function, names::SUBSTRING, FunctionEncoder::call("SUBSTRING"))?;
        dialect.register(
            Function,
            names::EXTRACT,
            FunctionEncoder::template("EXTRACT", "($1 FROM $2)")?,
        )?;

        Ok(dialect)
    }
}
