//! Integration tests for SQL generation.
//!
//! These tests build statements through the public builders and render them
//! with small hand-assembled dialects.

use chrono::{DateTime, NaiveDate, NaiveTime};
use geoquery::dialect::{
    BooleanStyle, BytesStyle, EnvelopeStyle, GeometryStyle, LiteralStyle, TemporalStyle,
};
use geoquery::error::GeoqueryError;
use geoquery::expr::names;
use geoquery::{
    DataSetName, Delete, Distinct, Envelope, Expression, Field, Fields, FromItem, Function,
    FunctionEncoder, Geometry, Insert, JoinCondition, JoinType, Query, Select, SortOrder,
    SqlDialect, SqlVisitor, StatementSupport, Update,
};

fn prop(name: &str) -> Expression {
    Expression::property(name)
}

fn test_dialect() -> SqlDialect {
    let mut dialect = SqlDialect::new("test");
    for op in [
        names::EQUAL_TO,
        names::LESS_THAN,
        names::GREATER_THAN,
        names::ADD,
    ] {
        dialect.insert(op, FunctionEncoder::binary_op(op)).unwrap();
    }
    dialect
        .insert(names::AND, FunctionEncoder::binary_op("AND"))
        .unwrap();
    dialect
        .insert(names::COUNT, FunctionEncoder::call("COUNT"))
        .unwrap();
    dialect
        .insert(names::AVG, FunctionEncoder::call("AVG"))
        .unwrap();
    dialect
        .insert(
            names::IS_NULL,
            FunctionEncoder::template("", "$1 IS NULL").unwrap(),
        )
        .unwrap();
    dialect
        .insert(
            names::SUBSTRING,
            FunctionEncoder::template("SUBSTRING", "$1 FROM $2 FOR $3").unwrap(),
        )
        .unwrap();
    dialect
        .insert(
            names::EXTRACT,
            FunctionEncoder::template("EXTRACT", "($1 FROM $2)").unwrap(),
        )
        .unwrap();
    dialect
        .insert(names::ST_INTERSECTS, FunctionEncoder::call("ST_Intersects"))
        .unwrap();
    dialect
        .insert(
            names::CURRENT_TIMESTAMP,
            FunctionEncoder::no_args("CURRENT_TIMESTAMP"),
        )
        .unwrap();
    dialect
}

fn render(dialect: &SqlDialect, select: &Select) -> Result<String, GeoqueryError> {
    SqlVisitor::new(dialect).render_select(select)
}

fn render_literal(dialect: &SqlDialect, expr: Expression) -> String {
    let select = Select::new().with_field(Field::new(expr));
    let sql = render(dialect, &select).unwrap();
    sql.trim_start_matches("SELECT ").to_string()
}

#[test]
fn renders_simple_filtered_select() {
    let dialect = test_dialect();
    let select = Select::new()
        .with_dataset("cities")
        .with_where(Expression::equal_to(prop("pop"), Expression::literal(1000)));

    assert_eq!(
        render(&dialect, &select).unwrap(),
        "SELECT * FROM cities WHERE (pop = 1000)"
    );
}

#[test]
fn unknown_function_reports_name_and_dialect() {
    let dialect = test_dialect();
    let select = Select::new().with_dataset("cities").with_where(Expression::function(
        "ST_FooBar",
        vec![prop("geom"), prop("other")],
    ));

    let mut out = String::new();
    let err = SqlVisitor::new(&dialect)
        .write_query(&Query::Select(select), &mut out)
        .unwrap_err();
    match err {
        GeoqueryError::UnknownFunction { name, dialect } => {
            assert_eq!(name, "ST_FooBar");
            assert_eq!(dialect, "test");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(out.is_empty());
}

#[test]
fn insert_select_reuses_select_rendering() {
    let dialect = test_dialect();
    let select = Select::property("name")
        .with_dataset("staging")
        .with_where(Expression::greater_than(prop("pop"), Expression::literal(0)));
    let insert = Insert::from_select(DataSetName::new("cities"), select.clone());

    let visitor = SqlVisitor::new(&dialect);
    let select_sql = visitor.render_select(&select).unwrap();
    let insert_sql = visitor.render_insert(&insert).unwrap();
    assert_eq!(insert_sql, format!("INSERT INTO cities {select_sql}"));
    assert_eq!(
        insert_sql,
        "INSERT INTO cities SELECT name FROM staging WHERE (pop > 0)"
    );
}

#[test]
fn insert_select_with_columns() {
    let dialect = test_dialect();
    let insert = Insert::from_select_with_fields(
        DataSetName::new("cities"),
        Fields::properties(["name", "pop"]),
        Select::property("n").with_column("p").with_dataset("staging"),
    );
    assert_eq!(
        SqlVisitor::new(&dialect).render_insert(&insert).unwrap(),
        "INSERT INTO cities (name, pop) SELECT n, p FROM staging"
    );
}

#[test]
fn insert_values_rows() {
    let dialect = test_dialect();
    let insert = Insert::values(
        DataSetName::new("cities"),
        Fields::properties(["id", "name"]),
        vec![
            vec![Expression::literal(1), Expression::literal("Oslo")],
            vec![Expression::literal(2), Expression::literal("Bergen")],
        ],
    );
    assert_eq!(
        SqlVisitor::new(&dialect).render_insert(&insert).unwrap(),
        "INSERT INTO cities (id, name) VALUES (1, 'Oslo'), (2, 'Bergen')"
    );
}

#[test]
fn insert_target_columns_cannot_be_aliased() {
    let dialect = test_dialect();
    let columns: Fields = vec![Field::property("id"), Field::with_alias(prop("name"), "n")]
        .into_iter()
        .collect();
    let insert = Insert::values(
        DataSetName::new("cities"),
        columns,
        vec![vec![Expression::literal(1), Expression::literal("Oslo")]],
    );
    assert!(matches!(
        SqlVisitor::new(&dialect).render_insert(&insert),
        Err(GeoqueryError::InvalidQuery(msg)) if msg.contains("'n'")
    ));
}

#[test]
fn insert_values_validates_row_shape() {
    let dialect = test_dialect();
    let visitor = SqlVisitor::new(&dialect);

    let ragged = Insert::values(
        DataSetName::new("cities"),
        Fields::properties(["id", "name"]),
        vec![vec![Expression::literal(1)]],
    );
    assert!(matches!(
        visitor.render_insert(&ragged),
        Err(GeoqueryError::InvalidQuery(_))
    ));

    let empty = Insert::values(
        DataSetName::new("cities"),
        Fields::properties(["id"]),
        Vec::new(),
    );
    assert!(matches!(
        visitor.render_insert(&empty),
        Err(GeoqueryError::InvalidQuery(_))
    ));
}

#[test]
fn template_maps_placeholders_to_arguments() {
    let dialect = test_dialect();
    let substring = Expression::function(names::SUBSTRING, vec![prop("A"), prop("B"), prop("C")]);
    assert_eq!(render_literal(&dialect, substring), "SUBSTRING A FROM B FOR C");

    let extract = Expression::function(names::EXTRACT, vec![prop("YEAR"), prop("created_at")]);
    assert_eq!(render_literal(&dialect, extract), "EXTRACT(YEAR FROM created_at)");

    let is_null = Expression::is_null(prop("name"));
    assert_eq!(render_literal(&dialect, is_null), "name IS NULL");
}

#[test]
fn template_arity_is_checked() {
    let dialect = test_dialect();
    let select = Select::new().with_field(Field::new(Expression::function(
        names::SUBSTRING,
        vec![prop("A"), prop("B")],
    )));
    assert!(matches!(
        render(&dialect, &select),
        Err(GeoqueryError::ArityMismatch {
            expected: 3,
            found: 2,
            ..
        })
    ));
}

#[test]
fn binary_and_no_args_arity_is_checked() {
    let dialect = test_dialect();
    let three = Select::new().with_field(Field::new(Expression::function(
        names::ADD,
        vec![prop("a"), prop("b"), prop("c")],
    )));
    assert!(matches!(
        render(&dialect, &three),
        Err(GeoqueryError::ArityMismatch {
            expected: 2,
            found: 3,
            ..
        })
    ));

    let now = Expression::function(names::CURRENT_TIMESTAMP, vec![]);
    assert_eq!(render_literal(&dialect, now), "CURRENT_TIMESTAMP");
}

#[test]
fn same_tree_differs_between_dialects() {
    let mut infix = SqlDialect::new("infix");
    infix
        .insert(names::ADD, FunctionEncoder::binary_op("+"))
        .unwrap();
    let mut call = SqlDialect::new("call");
    call.insert(names::ADD, FunctionEncoder::call("PLUS"))
        .unwrap();

    let select = Select::new().with_field(Field::new(Expression::add(prop("a"), prop("b"))));
    assert_eq!(render(&infix, &select).unwrap(), "SELECT (a + b)");
    assert_eq!(render(&call, &select).unwrap(), "SELECT PLUS(a, b)");
}

#[test]
fn rendering_twice_is_identical() {
    let dialect = test_dialect();
    let select = Select::property("name")
        .with_dataset("cities")
        .with_where(Expression::and(
            Expression::function(names::ST_INTERSECTS, vec![prop("geom"), prop("area")]),
            Expression::less_than(prop("pop"), Expression::literal(5000)),
        ))
        .with_limit(5);
    let visitor = SqlVisitor::new(&dialect);
    let first = visitor.render_select(&select).unwrap();
    let second = visitor.render_select(&select).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        first,
        "SELECT name FROM cities WHERE (ST_Intersects(geom, area) AND (pop < 5000)) LIMIT 5"
    );
}

#[test]
fn write_query_appends_to_buffer() {
    let dialect = test_dialect();
    let mut out = String::from("EXPLAIN ");
    SqlVisitor::new(&dialect)
        .write_query(&Select::property("a").with_dataset("t").into(), &mut out)
        .unwrap();
    assert_eq!(out, "EXPLAIN SELECT a FROM t");
}

#[test]
fn renders_group_having_order() {
    let dialect = test_dialect();
    let select = Select::property("state")
        .with_field(Field::with_alias(Expression::count(prop("id")), "n"))
        .with_dataset("cities")
        .with_group_by_property("state")
        .with_having(Expression::greater_than(
            Expression::count(prop("id")),
            Expression::literal(5),
        ))
        .with_order_by_property("n", SortOrder::Desc)
        .with_order_by_property("state", SortOrder::Asc);

    assert_eq!(
        render(&dialect, &select).unwrap(),
        "SELECT state, COUNT(id) AS n FROM cities GROUP BY state \
         HAVING (COUNT(id) > 5) ORDER BY n DESC, state ASC"
    );
}

#[test]
fn renders_joins() {
    let dialect = test_dialect();
    let select = Select::property("c.name")
        .with_dataset_as("cities", "c")
        .with_inner_join(
            FromItem::dataset_as("states", "s"),
            JoinCondition::On(Expression::equal_to(prop("c.state_id"), prop("s.id"))),
        )
        .unwrap()
        .with_left_join(FromItem::dataset("census"), JoinCondition::using(["state_id"]))
        .unwrap()
        .with_cross_join(FromItem::dataset("years"))
        .unwrap();

    assert_eq!(
        render(&dialect, &select).unwrap(),
        "SELECT c.name FROM cities AS c INNER JOIN states AS s ON (c.state_id = s.id) \
         LEFT JOIN census USING (state_id) CROSS JOIN years"
    );
}

#[test]
fn join_condition_must_match_join_type() {
    let dialect = test_dialect();
    let missing = Select::new()
        .with_dataset("a")
        .with_join(FromItem::dataset("b"), JoinType::Inner, None)
        .unwrap();
    assert!(matches!(
        render(&dialect, &missing),
        Err(GeoqueryError::InvalidQuery(_))
    ));

    let extra = Select::new()
        .with_dataset("a")
        .with_join(
            FromItem::dataset("b"),
            JoinType::Natural,
            Some(JoinCondition::using(["id"])),
        )
        .unwrap();
    assert!(matches!(
        render(&dialect, &extra),
        Err(GeoqueryError::InvalidQuery(_))
    ));
}

#[test]
fn renders_sub_selects() {
    let dialect = test_dialect();
    let average = Select::new()
        .with_field(Field::new(Expression::avg(prop("pop"))))
        .with_dataset("cities");
    let select = Select::property("name")
        .with_dataset("cities")
        .with_where(Expression::greater_than(prop("pop"), average.into()));
    assert_eq!(
        render(&dialect, &select).unwrap(),
        "SELECT name FROM cities WHERE (pop > (SELECT AVG(pop) FROM cities))"
    );

    let nested = Select::new().with_from_item(FromItem::sub_select(
        Select::property("a").with_dataset("t"),
        "sub",
    ));
    assert_eq!(
        render(&dialect, &nested).unwrap(),
        "SELECT * FROM (SELECT a FROM t) AS sub"
    );
}

#[test]
fn renders_function_sources() {
    let mut dialect = test_dialect();
    dialect
        .insert("st_dump", FunctionEncoder::call("ST_Dump"))
        .unwrap();
    let dump = Function::new("st_dump", vec![prop("geom")]);

    let select = Select::property("d.path")
        .with_from_item(FromItem::function_as(dump.clone(), "d"))
        .with_where(Expression::greater_than(prop("d.path"), Expression::literal(0)));
    assert_eq!(
        render(&dialect, &select).unwrap(),
        "SELECT d.path FROM ST_Dump(geom) AS d WHERE (d.path > 0)"
    );

    let joined = Select::new()
        .with_dataset_as("parks", "p")
        .with_cross_join(FromItem::function(dump))
        .unwrap();
    assert_eq!(
        render(&dialect, &joined).unwrap(),
        "SELECT * FROM parks AS p CROSS JOIN ST_Dump(geom)"
    );

    let unknown = Select::new().with_from_item(FromItem::function(Function::new(
        "generate_series",
        vec![Expression::literal(1), Expression::literal(3)],
    )));
    assert!(matches!(
        render(&dialect, &unknown),
        Err(GeoqueryError::UnknownFunction { .. })
    ));
}

#[test]
fn limit_and_offset() {
    let dialect = test_dialect();
    let base = Select::new().with_dataset("t");

    assert_eq!(
        render(&dialect, &base.clone().with_limit(10).with_offset(20)).unwrap(),
        "SELECT * FROM t LIMIT 10 OFFSET 20"
    );
    assert_eq!(
        render(&dialect, &base.clone().with_limit(0)).unwrap(),
        "SELECT * FROM t LIMIT 0"
    );
    assert_eq!(
        render(&dialect, &base.clone().with_offset(20)).unwrap(),
        "SELECT * FROM t OFFSET 20"
    );

    let unbounded = test_dialect().with_unbounded_limit("-1");
    assert_eq!(
        render(&unbounded, &base.with_offset(20)).unwrap(),
        "SELECT * FROM t LIMIT -1 OFFSET 20"
    );
}

#[test]
fn distinct_and_distinct_on() {
    let dialect = test_dialect();
    let plain = Select::property("a")
        .with_dataset("t")
        .with_distinct_clause(Distinct::new());
    assert_eq!(render(&dialect, &plain).unwrap(), "SELECT DISTINCT a FROM t");

    let on = Select::property("a")
        .with_column("b")
        .with_dataset("t")
        .with_distinct_property("a");
    assert!(matches!(
        render(&dialect, &on),
        Err(GeoqueryError::Unsupported(_))
    ));

    let supporting = test_dialect().with_distinct_on(true);
    assert_eq!(
        render(&supporting, &on).unwrap(),
        "SELECT DISTINCT ON (a) a, b FROM t"
    );
}

#[test]
fn renders_update_and_delete() {
    let dialect = test_dialect();
    let visitor = SqlVisitor::new(&dialect);

    let update = Update::new(DataSetName::new("cities"))
        .set("pop", Expression::literal(0))
        .set("name", Expression::literal("unknown"))
        .with_where(Expression::is_null(prop("name")));
    assert_eq!(
        visitor.render_update(&update).unwrap(),
        "UPDATE cities SET pop = 0, name = 'unknown' WHERE name IS NULL"
    );

    let delete = Delete::new(DataSetName::new("cities"))
        .with_where(Expression::less_than(prop("pop"), Expression::literal(10)));
    assert_eq!(
        visitor.render_delete(&delete).unwrap(),
        "DELETE FROM cities WHERE (pop < 10)"
    );

    let empty = Update::new(DataSetName::new("cities"));
    assert!(matches!(
        visitor.render_update(&empty),
        Err(GeoqueryError::InvalidQuery(_))
    ));
}

#[test]
fn disabled_statement_kinds_are_rejected() {
    let dialect = test_dialect().with_statement_support(StatementSupport {
        delete: false,
        ..StatementSupport::default()
    });
    let delete: Query = Delete::new(DataSetName::new("cities")).into();
    let err = SqlVisitor::new(&dialect).render(&delete).unwrap_err();
    assert!(matches!(
        err,
        GeoqueryError::UnsupportedStatement {
            statement: "DELETE",
            ..
        }
    ));
}

#[test]
fn literal_default_style() {
    let dialect = test_dialect();
    assert_eq!(render_literal(&dialect, Expression::literal(true)), "TRUE");
    assert_eq!(render_literal(&dialect, Expression::null()), "NULL");
    assert_eq!(render_literal(&dialect, Expression::literal(-7i64)), "-7");
    assert_eq!(render_literal(&dialect, Expression::literal(1.5)), "1.5");
    assert_eq!(
        render_literal(&dialect, Expression::literal("it's")),
        "'it''s'"
    );
    assert_eq!(
        render_literal(&dialect, Expression::literal(vec![0x0a_u8, 0xff])),
        "'\\x0aff'"
    );
    let date = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
    assert_eq!(render_literal(&dialect, Expression::literal(date)), "'2024-01-31'");
    assert_eq!(
        render_literal(
            &dialect,
            Expression::literal(Geometry::from_wkt("POINT(1 2)").with_srid(4326))
        ),
        "'POINT(1 2)'"
    );
    assert_eq!(
        render_literal(&dialect, Expression::literal(Envelope::new(0.0, 0.0, 10.0, 5.0))),
        "'POLYGON((0 0, 10 0, 10 5, 0 5, 0 0))'"
    );
}

#[test]
fn backslashes_are_doubled_only_when_they_escape() {
    let path = Expression::literal("C:\\");
    let standard = test_dialect();
    assert_eq!(render_literal(&standard, path.clone()), "'C:\\'");

    let escaping = test_dialect().with_literal_style(LiteralStyle {
        backslash_escapes: true,
        ..LiteralStyle::default()
    });
    assert_eq!(render_literal(&escaping, path), "'C:\\\\'");
    assert_eq!(
        render_literal(&escaping, Expression::literal("\\' OR 1=1 -- ")),
        "'\\\\'' OR 1=1 -- '"
    );
}

#[test]
fn non_finite_envelopes_are_rejected() {
    let envelope = Envelope::new(0.0, 0.0, f64::INFINITY, 1.0);
    let polygon = test_dialect();
    let make = test_dialect().with_literal_style(LiteralStyle {
        envelope: EnvelopeStyle::MakeEnvelope("ST_MakeEnvelope".to_string()),
        ..LiteralStyle::default()
    });
    for dialect in [&polygon, &make] {
        let select = Select::new().with_field(Field::new(Expression::literal(envelope)));
        assert!(matches!(
            render(dialect, &select),
            Err(GeoqueryError::InvalidLiteral(_))
        ));
    }
}

#[test]
fn literal_custom_style() {
    let dialect = test_dialect().with_literal_style(LiteralStyle {
        boolean: BooleanStyle::Numeric,
        bytes: BytesStyle::HexLiteral,
        temporal: TemporalStyle::Typed,
        geometry: GeometryStyle::FromText("ST_GeomFromText".to_string()),
        envelope: EnvelopeStyle::MakeEnvelope("ST_MakeEnvelope".to_string()),
        double_precision: None,
        backslash_escapes: false,
    });

    assert_eq!(render_literal(&dialect, Expression::literal(false)), "0");
    assert_eq!(
        render_literal(&dialect, Expression::literal(vec![0x0a_u8, 0xff])),
        "X'0AFF'"
    );
    let date = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
    assert_eq!(
        render_literal(&dialect, Expression::literal(date)),
        "DATE '2024-01-31'"
    );
    let time = NaiveTime::from_hms_opt(12, 30, 0).unwrap();
    assert_eq!(
        render_literal(&dialect, Expression::literal(time)),
        "TIME '12:30:00'"
    );
    let ts = DateTime::parse_from_rfc3339("2024-01-31T10:00:00+02:00").unwrap();
    assert_eq!(
        render_literal(&dialect, Expression::literal(ts)),
        "TIMESTAMP WITH TIME ZONE '2024-01-31 10:00:00+02:00'"
    );
    assert_eq!(
        render_literal(
            &dialect,
            Expression::literal(Geometry::from_wkt("POINT(1 2)").with_srid(4326))
        ),
        "ST_GeomFromText('POINT(1 2)', 4326)"
    );
    assert_eq!(
        render_literal(&dialect, Expression::literal(Geometry::from_wkt("POINT(1 2)"))),
        "ST_GeomFromText('POINT(1 2)')"
    );
    assert_eq!(
        render_literal(
            &dialect,
            Expression::literal(Envelope::new(0.0, 0.0, 10.0, 5.5).with_srid(4326))
        ),
        "ST_MakeEnvelope(0.0, 0.0, 10.0, 5.5, 4326)"
    );
}

#[test]
fn identifiers_are_quoted_when_configured() {
    let dialect = test_dialect().with_identifier_quote('"');
    let select = Select::property_as("c.name", "city").with_dataset_as("cities", "c");
    assert_eq!(
        render(&dialect, &select).unwrap(),
        r#"SELECT "c"."name" AS "city" FROM "cities" AS "c""#
    );
}
