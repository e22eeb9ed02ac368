use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sqlweave::dialects::{Dialect, DialectType};

const SIMPLE: &str = "SELECT a, b, c FROM t";

const MEDIUM: &str = r#"
SELECT
    u.id,
    u.name,
    COUNT(o.id) AS order_count,
    SUM(o.total) AS total_spent
FROM users u
LEFT JOIN orders o ON u.id = o.user_id
WHERE u.created_at > '2024-01-01'
    AND u.status = 'active'
GROUP BY u.id, u.name
HAVING COUNT(o.id) > 5
ORDER BY total_spent DESC
LIMIT 100
"#;

fn wide_select(columns: usize) -> String {
    let items: Vec<String> = (0..columns).map(|i| format!("CAST(c{i} AS BIGINT) + {i} AS x{i}")).collect();
    format!("SELECT {} FROM t", items.join(", "))
}

fn bench_parsing_by_query_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing_by_size");
    let dialect = Dialect::get(DialectType::Generic);
    let wide = wide_select(500);

    group.bench_function("simple", |b| b.iter(|| dialect.parse(black_box(SIMPLE))));
    group.bench_function("medium", |b| b.iter(|| dialect.parse(black_box(MEDIUM))));
    group.bench_function("wide", |b| b.iter(|| dialect.parse(black_box(&wide))));

    group.finish();
}

fn bench_tokenizing(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenizing");
    let dialect = Dialect::get(DialectType::Hive);

    group.bench_function("medium", |b| b.iter(|| dialect.tokenize(black_box(MEDIUM))));

    group.finish();
}

fn bench_parsing_by_dialect(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing_by_dialect");

    let dialects = [
        DialectType::Generic,
        DialectType::Hive,
        DialectType::Postgres,
        DialectType::MySQL,
        DialectType::BigQuery,
        DialectType::TSQL,
    ];

    for dialect_type in dialects {
        let dialect = Dialect::get(dialect_type);
        group.bench_with_input(
            BenchmarkId::new("medium_query", dialect_type.name()),
            &MEDIUM,
            |b, sql| b.iter(|| dialect.parse(black_box(sql))),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_parsing_by_query_size, bench_tokenizing, bench_parsing_by_dialect);
criterion_main!(benches);
