//! Rendering with the dialects compiled into the crate.

use geoquery::expr::names;
use geoquery::{Envelope, Expression, Field, Geometry, Select, SqlDialect, SqlVisitor};

fn prop(name: &str) -> Expression {
    Expression::property(name)
}

fn select_expr(dialect: &SqlDialect, expr: Expression) -> String {
    let select = Select::new().with_field(Field::new(expr));
    SqlVisitor::new(dialect).render_select(&select).unwrap()
}

fn within_100m() -> Expression {
    Expression::st_dwithin(
        prop("geom"),
        Expression::literal(Geometry::from_wkt("POINT(1 2)").with_srid(4326)),
        Expression::literal(100.0),
    )
}

#[cfg(all(feature = "postgis", feature = "sqlite", feature = "mysql"))]
#[test]
fn builtins_are_registered_by_name() {
    let registry = geoquery::DialectRegistry::with_builtins().unwrap();
    assert_eq!(registry.names(), vec!["mysql", "postgis", "sqlite"]);
}

#[cfg(feature = "postgis")]
mod postgis {
    use super::*;
    use chrono::NaiveDate;
    use geoquery::capabilities::OperatorCategory;
    use geoquery::dialect::PostgisDialect;

    #[test]
    fn spatial_operators() {
        let dialect = PostgisDialect::build().unwrap();
        assert_eq!(
            select_expr(
                &dialect,
                Expression::function(names::ST_BBOX_INTERSECTS, vec![prop("a"), prop("b")])
            ),
            "SELECT (a && b)"
        );
        assert_eq!(
            select_expr(&dialect, within_100m()),
            "SELECT ST_DWithin(geom, ST_GeomFromText('POINT(1 2)', 4326), 100.0)"
        );
        assert!(dialect
            .capabilities()
            .supports_operator(OperatorCategory::Spatial, names::ST_INTERSECTS));
    }

    #[test]
    fn irregular_functions_and_literals() {
        let dialect = PostgisDialect::build().unwrap();
        let substring = Expression::function(
            names::SUBSTRING,
            vec![prop("name"), Expression::literal(1), Expression::literal(3)],
        );
        assert_eq!(
            select_expr(&dialect, substring),
            "SELECT SUBSTRING(name FROM 1 FOR 3)"
        );
        assert_eq!(
            select_expr(
                &dialect,
                Expression::literal(Envelope::new(0.0, 0.0, 1.0, 1.0).with_srid(4326))
            ),
            "SELECT ST_MakeEnvelope(0.0, 0.0, 1.0, 1.0, 4326)"
        );
        let date = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(
            select_expr(&dialect, Expression::literal(date)),
            "SELECT DATE '2024-01-31'"
        );
    }

    #[test]
    fn negation_never_forms_a_comment() {
        let dialect = PostgisDialect::build().unwrap();
        let select = Select::new()
            .with_field(Field::new(Expression::negate(Expression::literal(-5))))
            .with_dataset("t")
            .with_where(Expression::equal_to(prop("a"), Expression::literal(1)));
        assert_eq!(
            SqlVisitor::new(&dialect).render_select(&select).unwrap(),
            "SELECT (- -5) FROM t WHERE (a = 1)"
        );
        assert_eq!(
            select_expr(&dialect, Expression::negate(Expression::negate(prop("x")))),
            "SELECT (- (- x))"
        );
    }

    #[test]
    fn null_tests_keep_their_grouping() {
        let dialect = PostgisDialect::build().unwrap();
        assert_eq!(
            select_expr(
                &dialect,
                Expression::equal_to(Expression::is_null(prop("a")), Expression::literal(false))
            ),
            "SELECT ((a IS NULL) = FALSE)"
        );
        assert_eq!(
            select_expr(&dialect, Expression::not(Expression::is_not_null(prop("a")))),
            "SELECT NOT (a IS NOT NULL)"
        );
    }

    #[test]
    fn distinct_on_is_supported() {
        let dialect = PostgisDialect::build().unwrap();
        let select = Select::property("name")
            .with_dataset("parks")
            .with_distinct_property("city");
        assert_eq!(
            SqlVisitor::new(&dialect).render_select(&select).unwrap(),
            "SELECT DISTINCT ON (city) name FROM parks"
        );
    }
}

#[cfg(feature = "sqlite")]
mod sqlite {
    use super::*;
    use geoquery::dialect::SqliteDialect;
    use geoquery::error::GeoqueryError;

    #[test]
    fn distance_filter_uses_template() {
        let dialect = SqliteDialect::build().unwrap();
        assert_eq!(
            select_expr(&dialect, within_100m()),
            "SELECT (ST_Distance(geom, GeomFromText('POINT(1 2)', 4326)) <= 100.0)"
        );
    }

    #[test]
    fn literals_and_offset() {
        let dialect = SqliteDialect::build().unwrap();
        assert_eq!(select_expr(&dialect, Expression::literal(true)), "SELECT 1");
        assert_eq!(
            select_expr(
                &dialect,
                Expression::function(
                    names::SUBSTRING,
                    vec![prop("name"), Expression::literal(1), Expression::literal(3)]
                )
            ),
            "SELECT substr(name, 1, 3)"
        );

        let paged = Select::new().with_dataset("parks").with_offset(5);
        assert_eq!(
            SqlVisitor::new(&dialect).render_select(&paged).unwrap(),
            "SELECT * FROM parks LIMIT -1 OFFSET 5"
        );
    }

    #[test]
    fn distinct_on_is_unsupported() {
        let dialect = SqliteDialect::build().unwrap();
        let select = Select::property("name")
            .with_dataset("parks")
            .with_distinct_property("city");
        assert!(matches!(
            SqlVisitor::new(&dialect).render_select(&select),
            Err(GeoqueryError::Unsupported(_))
        ));
    }
}

#[cfg(feature = "mysql")]
mod mysql {
    use super::*;
    use geoquery::dialect::MySqlDialect;
    use geoquery::error::GeoqueryError;

    #[test]
    fn backslashes_in_strings_are_escaped() {
        let dialect = MySqlDialect::build().unwrap();
        let select = Select::new()
            .with_dataset("t")
            .with_where(Expression::equal_to(prop("path"), Expression::literal("C:\\")));
        assert_eq!(
            SqlVisitor::new(&dialect).render_select(&select).unwrap(),
            "SELECT * FROM t WHERE (path = 'C:\\\\')"
        );
        assert_eq!(
            select_expr(&dialect, Expression::literal("\\' OR 1=1 -- ")),
            "SELECT '\\\\'' OR 1=1 -- '"
        );
    }

    #[test]
    fn distance_filter_nests_under_comparison() {
        let dialect = MySqlDialect::build().unwrap();
        assert_eq!(
            select_expr(
                &dialect,
                Expression::equal_to(
                    Expression::literal(true),
                    Expression::st_dwithin(prop("a"), prop("b"), Expression::literal(3))
                )
            ),
            "SELECT (TRUE = (ST_Distance(a, b) <= 3))"
        );
    }

    #[test]
    fn non_finite_envelope_is_rejected() {
        let dialect = MySqlDialect::build().unwrap();
        let select = Select::new().with_field(Field::new(Expression::literal(Envelope::new(
            f64::NAN,
            0.0,
            1.0,
            1.0,
        ))));
        assert!(matches!(
            SqlVisitor::new(&dialect).render_select(&select),
            Err(GeoqueryError::InvalidLiteral(_))
        ));
    }

    #[test]
    fn modulo_and_envelope() {
        let dialect = MySqlDialect::build().unwrap();
        assert_eq!(
            select_expr(
                &dialect,
                Expression::modulo(prop("a"), Expression::literal(2))
            ),
            "SELECT (a MOD 2)"
        );
        assert_eq!(
            select_expr(
                &dialect,
                Expression::literal(Envelope::new(0.0, 0.0, 1.0, 1.0).with_srid(4326))
            ),
            "SELECT ST_GeomFromText('POLYGON((0 0, 1 0, 1 1, 0 1, 0 0))', 4326)"
        );
    }

    #[test]
    fn offset_without_limit() {
        let dialect = MySqlDialect::build().unwrap();
        let paged = Select::new().with_dataset("parks").with_offset(5);
        assert_eq!(
            SqlVisitor::new(&dialect).render_select(&paged).unwrap(),
            "SELECT * FROM parks LIMIT 18446744073709551615 OFFSET 5"
        );
    }
}
