//! Hive as a source dialect
//!
//! Hive is the reference source for the canonical node vocabulary: bitwise
//! operators, suffix literals, non-strict casts, table properties, LATERAL VIEW
//! and the date functions all map onto typed nodes that every target renders
//! in its own spelling.

use sqlweave::{parse_one, transpile_one, Error, GenerateOptions};

fn hive_to(sql: &str, write: &str) -> String {
    transpile_one(sql, "hive", write, &GenerateOptions::default())
        .unwrap_or_else(|e| panic!("hive -> {write} failed for {sql}: {e}"))
}

mod bitwise {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_and() {
        assert_eq!(hive_to("SELECT x & 1", "duckdb"), "SELECT x & 1");
        assert_eq!(hive_to("SELECT x & 1", "presto"), "SELECT BITWISE_AND(x, 1)");
    }

    #[test]
    fn test_not() {
        assert_eq!(hive_to("SELECT ~x", "presto"), "SELECT BITWISE_NOT(x)");
        assert_eq!(hive_to("SELECT ~x", "hive"), "SELECT ~x");
    }

    #[test]
    fn test_shift() {
        assert_eq!(
            hive_to("SELECT x << 1", "presto"),
            "SELECT BITWISE_ARITHMETIC_SHIFT_LEFT(x, 1)"
        );
        assert_eq!(hive_to("SELECT x << 1", "spark"), "SELECT SHIFTLEFT(x, 1)");
    }
}

mod literals {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_suffixes() {
        assert_eq!(hive_to("SELECT 1s", "hive"), "SELECT CAST(1 AS SMALLINT)");
        assert_eq!(hive_to("SELECT 1s", "spark"), "SELECT CAST(1 AS SHORT)");
        assert_eq!(hive_to("SELECT 1Y", "spark"), "SELECT CAST(1 AS BYTE)");
        assert_eq!(hive_to("SELECT 1L", "hive"), "SELECT CAST(1 AS BIGINT)");
        assert_eq!(hive_to("SELECT 1.0bd", "hive"), "SELECT CAST(1.0 AS DECIMAL)");
    }

    #[test]
    fn test_escaped_quote() {
        assert_eq!(hive_to(r"SELECT '\''", "duckdb"), "SELECT ''''");
        assert_eq!(hive_to(r"SELECT '\''", "hive"), r"SELECT '\''");
    }

    #[test]
    fn test_double_quoted_string() {
        assert_eq!(hive_to("SELECT \"a\"", "hive"), "SELECT 'a'");
        assert_eq!(hive_to("SELECT \"a\"", "duckdb"), "SELECT 'a'");
    }
}

mod casts {
    use super::*;
    use pretty_assertions::assert_eq;
    use sqlweave::Expression;

    #[test]
    fn test_cast_is_not_strict() {
        let ast = parse_one("SELECT CAST(x AS INT)", "hive").unwrap();
        let Expression::Select(select) = ast else {
            panic!("expected a SELECT");
        };
        assert!(matches!(select.expressions[0], Expression::TryCast(_)));
    }

    #[test]
    fn test_try_cast_by_target() {
        assert_eq!(hive_to("SELECT CAST(x AS INT)", "duckdb"), "SELECT TRY_CAST(x AS INT)");
        assert_eq!(hive_to("SELECT CAST(x AS INT)", "presto"), "SELECT TRY_CAST(x AS INTEGER)");
        assert_eq!(hive_to("SELECT CAST(x AS INT)", "hive"), "SELECT CAST(x AS INT)");
        assert_eq!(hive_to("SELECT CAST(x AS INT)", "spark"), "SELECT CAST(x AS INT)");
    }
}

mod ddl {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_table_properties_to_presto() {
        assert_eq!(
            hive_to(
                "CREATE TABLE t (x INT) PARTITIONED BY (y INT) STORED AS parquet TBLPROPERTIES ('k' = 'v')",
                "presto"
            ),
            "CREATE TABLE t (x INTEGER, y INTEGER) WITH (PARTITIONED_BY = ARRAY['y'], FORMAT = 'parquet', k = 'v')"
        );
    }

    #[test]
    fn test_properties_unsupported_in_sqlite() {
        let err = transpile_one(
            "CREATE TABLE t (x INT) STORED AS parquet",
            "hive",
            "sqlite",
            &GenerateOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Unsupported { .. }), "got {err:?}");
    }
}

mod lateral_view {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_explode_to_unnest() {
        assert_eq!(
            hive_to("SELECT a FROM x LATERAL VIEW EXPLODE(y) t AS a", "presto"),
            "SELECT a FROM x CROSS JOIN UNNEST(y) AS t(a)"
        );
    }

    #[test]
    fn test_posexplode_with_ordinality() {
        assert_eq!(
            hive_to("SELECT a FROM x LATERAL VIEW POSEXPLODE(y) t AS p, a", "presto"),
            "SELECT a FROM x CROSS JOIN UNNEST(y) WITH ORDINALITY AS t(a, p)"
        );
    }

    #[test]
    fn test_identity() {
        assert_eq!(
            hive_to("SELECT a FROM x LATERAL VIEW EXPLODE(y) t AS a", "hive"),
            "SELECT a FROM x LATERAL VIEW EXPLODE(y) t AS a"
        );
    }
}

mod sampling {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_alias_moves_before_sample() {
        assert_eq!(
            hive_to("SELECT * FROM x TABLESAMPLE(10) y", "presto"),
            "SELECT * FROM x AS y TABLESAMPLE(10)"
        );
        assert_eq!(
            hive_to("SELECT * FROM x TABLESAMPLE(10) y", "hive"),
            "SELECT * FROM x TABLESAMPLE(10) AS y"
        );
    }

    #[test]
    fn test_bucket_sample_unsupported_in_presto() {
        let err = transpile_one(
            "SELECT * FROM x TABLESAMPLE(BUCKET 1 OUT OF 4 ON rand()) y",
            "hive",
            "presto",
            &GenerateOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Unsupported { .. }), "got {err:?}");
    }
}

mod functions {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rlike() {
        assert_eq!(hive_to("SELECT a RLIKE 'x'", "duckdb"), "SELECT REGEXP_MATCHES(a, 'x')");
        assert_eq!(hive_to("SELECT a RLIKE 'x'", "presto"), "SELECT REGEXP_LIKE(a, 'x')");
    }

    #[test]
    fn test_aggregates() {
        assert_eq!(hive_to("SELECT PERCENTILE(x, 0.5)", "duckdb"), "SELECT QUANTILE(x, 0.5)");
        assert_eq!(
            hive_to("SELECT PERCENTILE(x, 0.5)", "presto"),
            "SELECT APPROX_PERCENTILE(x, 0.5)"
        );
        assert_eq!(
            hive_to("SELECT APPROX_COUNT_DISTINCT(x)", "presto"),
            "SELECT APPROX_DISTINCT(x)"
        );
        assert_eq!(hive_to("SELECT COLLECT_LIST(x)", "presto"), "SELECT ARRAY_AGG(x)");
        assert_eq!(hive_to("SELECT COLLECT_SET(x)", "presto"), "SELECT SET_AGG(x)");
    }

    #[test]
    fn test_arrays() {
        assert_eq!(hive_to("SELECT ARRAY_CONTAINS(x, 1)", "presto"), "SELECT CONTAINS(x, 1)");
        assert_eq!(hive_to("SELECT SIZE(x)", "duckdb"), "SELECT ARRAY_LENGTH(x)");
        assert_eq!(hive_to("SELECT SIZE(x)", "presto"), "SELECT CARDINALITY(x)");
        assert_eq!(hive_to("SELECT SORT_ARRAY(x, FALSE)", "duckdb"), "SELECT ARRAY_REVERSE_SORT(x)");
        assert_eq!(
            hive_to("SELECT SORT_ARRAY(x, FALSE)", "presto"),
            "SELECT ARRAY_SORT(x, (a, b) -> CASE WHEN a < b THEN 1 WHEN a > b THEN -1 ELSE 0 END)"
        );
    }

    #[test]
    fn test_locate() {
        assert_eq!(hive_to("SELECT LOCATE('a', x)", "presto"), "SELECT STRPOS(x, 'a')");
        assert_eq!(
            hive_to("SELECT LOCATE('a', x, 3)", "presto"),
            "SELECT STRPOS(SUBSTR(x, 3), 'a') + 3 - 1"
        );
        assert_eq!(hive_to("SELECT LOCATE('a', x, 3)", "hive"), "SELECT LOCATE('a', x, 3)");
    }

    #[test]
    fn test_initcap() {
        assert_eq!(
            hive_to("SELECT INITCAP('new york')", "presto"),
            r"SELECT REGEXP_REPLACE('new york', '(\w)(\w*)', x -> UPPER(x[1]) || LOWER(x[2]))"
        );
    }

    #[test]
    fn test_json() {
        assert_eq!(
            hive_to("SELECT GET_JSON_OBJECT(x, '$.name')", "presto"),
            "SELECT JSON_EXTRACT_SCALAR(x, '$.name')"
        );
    }

    #[test]
    fn test_map() {
        assert_eq!(
            hive_to("SELECT MAP(a, b, c, d)", "duckdb"),
            "SELECT MAP(LIST_VALUE(a, c), LIST_VALUE(b, d))"
        );
        assert_eq!(
            hive_to("SELECT MAP(a, b, c, d)", "presto"),
            "SELECT MAP(ARRAY[a, c], ARRAY[b, d])"
        );
        assert_eq!(
            hive_to("SELECT MAP(a, b, c, d)", "spark"),
            "SELECT MAP_FROM_ARRAYS(ARRAY(a, c), ARRAY(b, d))"
        );
    }

    #[test]
    fn test_math() {
        assert_eq!(hive_to("SELECT LOG(x)", "presto"), "SELECT LN(x)");
        assert_eq!(hive_to("SELECT x DIV y", "presto"), "SELECT CAST(x / y AS INTEGER)");
    }

    #[test]
    fn test_double_equals() {
        assert_eq!(hive_to("SELECT a FROM t WHERE x == 1", "presto"), "SELECT a FROM t WHERE x = 1");
    }
}

mod dates {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_date_add() {
        assert_eq!(
            hive_to("SELECT DATE_ADD('2020-01-01', 1)", "duckdb"),
            "SELECT CAST('2020-01-01' AS DATE) + INTERVAL 1 DAY"
        );
        assert_eq!(
            hive_to("SELECT DATE_ADD('2020-01-01', 1)", "presto"),
            "SELECT DATE_ADD('DAY', 1, DATE_PARSE(SUBSTR('2020-01-01', 1, 10), '%Y-%m-%d'))"
        );
    }

    #[test]
    fn test_canonical_generic_names() {
        assert_eq!(
            hive_to("SELECT DATE_ADD('2020-01-01', 1)", "generic"),
            "SELECT TS_OR_DS_ADD('2020-01-01', 1, 'DAY')"
        );
    }

    #[test]
    fn test_unix_timestamp() {
        assert_eq!(
            hive_to("SELECT UNIX_TIMESTAMP(x)", "duckdb"),
            "SELECT EPOCH(STRPTIME(x, '%Y-%m-%d %H:%M:%S'))"
        );
    }

    #[test]
    fn test_format_roundtrip_keeps_default_implicit() {
        assert_eq!(
            hive_to("SELECT FROM_UNIXTIME(x, 'yyyy-MM-dd HH:mm:ss')", "hive"),
            "SELECT FROM_UNIXTIME(x)"
        );
        assert_eq!(
            hive_to("SELECT DATE_FORMAT(x, 'yyyy-MM-dd')", "hive"),
            "SELECT DATE_FORMAT(x, 'yyyy-MM-dd')"
        );
    }

    #[test]
    fn test_to_date_not_wrapped_twice() {
        assert_eq!(
            hive_to("SELECT DATEDIFF(TO_DATE(y), x)", "hive"),
            "SELECT DATEDIFF(TO_DATE(y), TO_DATE(x))"
        );
    }
}

mod ordering {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_nulls_order_made_explicit_for_presto() {
        assert_eq!(
            hive_to(
                "SELECT fname FROM t ORDER BY age DESC NULLS FIRST, fname ASC NULLS LAST, lname",
                "presto"
            ),
            "SELECT fname FROM t ORDER BY age DESC NULLS FIRST, fname, lname NULLS FIRST"
        );
    }
}
