//! SQLite with the SpatiaLite extension.

use crate::capabilities::OperatorCategory::{Arithmetic, Function, Spatial};
use crate::error::Result;
use crate::expr::names;

use super::{
    register_standard_operators, BooleanStyle, BytesStyle, EnvelopeStyle, FunctionEncoder,
    GeometryStyle, LiteralStyle, SqlDialect, TemporalStyle,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDialect;

impl SqliteDialect {
    pub const NAME: &'static str = "sqlite";

    pub fn literal_style() -> LiteralStyle {
        LiteralStyle {
            boolean: BooleanStyle::Numeric,
            bytes: BytesStyle::HexLiteral,
            temporal: TemporalStyle::Quoted,
            geometry: GeometryStyle::FromText("GeomFromText".to_string()),
            envelope: EnvelopeStyle::MakeEnvelope("BuildMbr".to_string()),
            double_precision: None,
            backslash_escapes: false,
        }
    }

    pub fn build() -> Result<SqlDialect> {
        // SQLite has no bare OFFSET; LIMIT -1 means "no limit".
        let mut dialect = SqlDialect::new(Self::NAME)
            .with_literal_style(Self::literal_style())
            .with_unbounded_limit("-1");
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
            (names::ST_BBOX_INTERSECTS, "MbrIntersects"),
        ] {
            dialect.register(Spatial, name, FunctionEncoder::call(alias))?;
        }
        dialect.register(
            Spatial,
            names::ST_DWITHIN,
            FunctionEncoder::template("", "(ST_Distance($1, $2) <= $3)")?,
        )?;

        dialect.register(Arithmetic, names::MOD, FunctionEncoder::binary_op("%"))?;

        dialect.register(Function, names::SUBSTRING, FunctionEncoder::call("substr"))?;
        dialect.register(
            Function,
            names::EXTRACT,
            FunctionEncoder::template("strftime", "($1, $2)")?,
        )?;

        Ok(dialect)
    }
}
