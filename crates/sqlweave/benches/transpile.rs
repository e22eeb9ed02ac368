use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sqlweave::dialects::{Dialect, DialectType};
use sqlweave::{transpile, GenerateOptions};

const SIMPLE: &str = "SELECT a, b, c FROM t";

const HIVE_QUERY: &str = r#"
SELECT
    u.id,
    COLLECT_SET(o.sku) AS skus,
    PERCENTILE(o.total, 0.5) AS median_total,
    DATE_ADD(MAX(o.created_at), 7) AS follow_up,
    u.flags & 4 AS beta
FROM users u
LEFT JOIN orders o ON u.id = o.user_id
LATERAL VIEW EXPLODE(u.tags) tags AS tag
WHERE o.status RLIKE '^done' AND SIZE(u.tags) > 0
GROUP BY u.id, u.flags
HAVING COUNT(o.id) > 5
LIMIT 100
"#;

const WIDE_QUERY: &str = r#"
WITH recent AS (
    SELECT user_id, COUNT(*) AS n, SUM(total) AS spent
    FROM orders
    WHERE status = 'completed'
    GROUP BY user_id
)
SELECT
    r.user_id,
    COALESCE(r.n, 0) AS orders,
    CASE WHEN r.spent > 10000 THEN 'vip' WHEN r.spent > 1000 THEN 'premium' ELSE 'regular' END AS tier,
    ROW_NUMBER() OVER (PARTITION BY r.user_id ORDER BY r.spent DESC) AS rank
FROM recent r
WHERE r.user_id IN (SELECT id FROM users WHERE active)
UNION ALL
SELECT 0, 0, 'none', 0
"#;

fn bench_transpile_by_query_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("transpile_by_size");
    let options = GenerateOptions::default();

    for (name, sql) in [("simple", SIMPLE), ("hive", HIVE_QUERY), ("wide", WIDE_QUERY)] {
        group.bench_function(name, |b| {
            b.iter(|| transpile(black_box(sql), "hive", "presto", &options))
        });
    }

    group.finish();
}

fn bench_transpile_dialect_pairs(c: &mut Criterion) {
    let mut group = c.benchmark_group("transpile_dialect_pairs");
    let options = GenerateOptions::default();

    let pairs = [
        ("hive_to_presto", DialectType::Hive, DialectType::Presto),
        ("hive_to_duckdb", DialectType::Hive, DialectType::DuckDB),
        ("hive_to_snowflake", DialectType::Hive, DialectType::Snowflake),
        ("hive_to_bigquery", DialectType::Hive, DialectType::BigQuery),
        ("hive_to_tsql", DialectType::Hive, DialectType::TSQL),
        ("spark_to_postgres", DialectType::Spark, DialectType::Postgres),
    ];

    for (name, source, target) in pairs {
        let source = Dialect::get(source);
        let target = Dialect::get(target);
        group.bench_with_input(BenchmarkId::new("hive_query", name), &HIVE_QUERY, |b, sql| {
            b.iter(|| source.transpile_to(black_box(sql), &target, &options))
        });
    }

    group.finish();
}

fn bench_pretty(c: &mut Criterion) {
    let mut group = c.benchmark_group("pretty");
    let options = GenerateOptions::pretty();

    group.bench_function("wide_query", |b| {
        b.iter(|| transpile(black_box(WIDE_QUERY), "generic", "postgres", &options))
    });

    group.finish();
}

criterion_group!(benches, bench_transpile_by_query_size, bench_transpile_dialect_pairs, bench_pretty);
criterion_main!(benches);
