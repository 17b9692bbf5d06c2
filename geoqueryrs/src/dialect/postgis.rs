//! PostgreSQL with the PostGIS extension.

use crate::capabilities::OperatorCategory::{Arithmetic, Function, Spatial};
use crate::error::Result;
use crate::expr::names;

use super::{
    register_standard_operators, BooleanStyle, BytesStyle, EnvelopeStyle, FunctionEncoder,
    GeometryStyle, LiteralStyle, SqlDialect, TemporalStyle,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct PostgisDialect;

impl PostgisDialect {
    pub const NAME: &'static str = "postgis";

    pub fn literal_style() -> LiteralStyle {
        LiteralStyle {
            boolean: BooleanStyle::Keyword,
            bytes: BytesStyle::HexEscape,
            temporal: TemporalStyle::Typed,
            geometry: GeometryStyle::FromText("ST_GeomFromText".to_string()),
            envelope: EnvelopeStyle::MakeEnvelope("ST_MakeEnvelope".to_string()),
            double_precision: None,
            backslash_escapes: false,
        }
    }

    pub fn build() -> Result<SqlDialect> {
        let mut dialect = SqlDialect::new(Self::NAME)
            .with_literal_style(Self::literal_style())
            .with_distinct_on(true);
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
            (names::ST_DWITHIN, "ST_DWithin"),
            (names::ST_ENVELOPE, "ST_Envelope"),
            (names::ST_AREA, "ST_Area"),
            (names::ST_LENGTH, "ST_Length"),
            (names::ST_DISTANCE, "ST_Distance"),
        ] {
            dialect.register(Spatial, name, FunctionEncoder::call(alias))?;
        }
        // Index-assisted bounding box test.
        dialect.register(
            Spatial,
            names::ST_BBOX_INTERSECTS,
            FunctionEncoder::binary_op("&&"),
        )?;

        dialect.register(Arithmetic, names::MOD, FunctionEncoder::binary_op("%"))?;

        dialect.register(
            Function,
            names::SUBSTRING,
            FunctionEncoder::template("SUBSTRING", "($1 FROM $2 FOR $3)")?,
        )?;
        dialect.register(Function, names::EXTRACT, FunctionEncoder::call("date_part"))?;

        Ok(dialect)
    }
}
