use std::env;

use geoquery::expr::names;
use geoquery::{
    config::GeoqueryConfig, DialectRegistry, Envelope, Expression, Geometry, JoinCondition, Query,
    Select, SortOrder, SqlVisitor,
};
use tracing_subscriber::EnvFilter;

fn usage() {
    eprintln!("Usage: print_sql [dialect ...]");
    eprintln!("Example: RUST_LOG=geoquery=debug cargo run --example print_sql -- postgis sqlite");
}

fn sample_query() -> anyhow::Result<Select> {
    let area = Envelope::new(-74.3, 40.5, -73.7, 40.9).with_srid(4326);
    let select = Select::new()
        .with_column_as("c.name", "city")
        .with_field(Expression::count(Expression::property("p.id")).into())
        .with_dataset_as("cities", "c")
        .with_left_join(
            geoquery::FromItem::dataset_as("parks", "p"),
            JoinCondition::On(Expression::st_contains(
                Expression::property("c.geom"),
                Expression::property("p.geom"),
            )),
        )?
        .with_where(Expression::and(
            Expression::function(
                names::ST_BBOX_INTERSECTS,
                vec![Expression::property("c.geom"), Expression::literal(area)],
            ),
            Expression::st_dwithin(
                Expression::property("c.geom"),
                Expression::literal(Geometry::from_wkt("POINT(-74.0 40.7)").with_srid(4326)),
                Expression::literal(5000.0),
            ),
        ))
        .with_group_by_property("c.name")
        .with_order_by_property("city", SortOrder::Asc)
        .with_limit(10);
    Ok(select)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let requested: Vec<String> = env::args().skip(1).collect();
    if requested.iter().any(|a| a == "-h" || a == "--help") {
        usage();
        return Ok(());
    }

    let config = GeoqueryConfig::load_default();
    let registry = DialectRegistry::from_config(&config)?;
    let names = if requested.is_empty() {
        registry.names()
    } else {
        requested
    };

    let query = Query::Select(sample_query()?);
    for name in names {
        let Some(dialect) = registry.get(&name) else {
            eprintln!("unknown dialect '{name}', available: {:?}", registry.names());
            continue;
        };
        let visitor = SqlVisitor::from_config(&dialect, &config.for_dialect(&name).render);
        println!("-- {name}");
        println!("{}", visitor.render(&query)?);
    }
    Ok(())
}
