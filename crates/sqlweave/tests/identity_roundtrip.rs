//! Identity Roundtrip Tests
//!
//! Parsing then generating with the same dialect must reproduce the input,
//! and generating is idempotent: rendering the re-parsed output gives the
//! same text again.

use pretty_assertions::assert_eq;
use sqlweave::dialects::{Dialect, DialectType};
use sqlweave::generator::Generator;
use sqlweave::parser::Parser;
use sqlweave::{Error, Expression};

fn roundtrip(sql: &str) -> String {
    let ast = Parser::parse_sql(sql).unwrap_or_else(|e| panic!("Failed to parse {sql}: {e}"));
    Generator::sql(&ast[0]).unwrap_or_else(|e| panic!("Failed to generate {sql}: {e}"))
}

fn assert_exact_roundtrip(sql: &str) {
    assert_eq!(roundtrip(sql), sql, "Not an exact roundtrip");
}

/// Output may normalize the input, but must then be stable
fn assert_stable(sql: &str) {
    let first = roundtrip(sql);
    let second = roundtrip(&first);
    assert_eq!(first, second, "Roundtrip not stable for {sql}");
}

mod literals {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scalars() {
        for sql in [
            "SELECT 1",
            "SELECT 1.5",
            "SELECT 'a'",
            "SELECT 'it''s'",
            "SELECT TRUE",
            "SELECT FALSE",
            "SELECT NULL",
            "SELECT -1",
        ] {
            assert_exact_roundtrip(sql);
        }
    }

    #[test]
    fn test_identifiers() {
        for sql in ["SELECT a FROM t", "SELECT \"a b\" FROM t", "SELECT t.a FROM db.t", "SELECT \"select\" FROM t"] {
            assert_exact_roundtrip(sql);
        }
    }
}

mod operators {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_arithmetic() {
        for sql in [
            "SELECT a + b * c",
            "SELECT (a + b) * c",
            "SELECT a % 2",
            "SELECT a / b - c",
            "SELECT a || b",
            "SELECT x & 1",
            "SELECT x << 2",
        ] {
            assert_exact_roundtrip(sql);
        }
    }

    #[test]
    fn test_predicates() {
        for sql in [
            "SELECT a FROM t WHERE a IS NULL",
            "SELECT a FROM t WHERE a IS NOT NULL",
            "SELECT a FROM t WHERE a NOT IN (1, 2)",
            "SELECT a FROM t WHERE a IN (SELECT b FROM u)",
            "SELECT a FROM t WHERE a NOT BETWEEN 1 AND 2",
            "SELECT a FROM t WHERE a NOT LIKE 'x%'",
            "SELECT a FROM t WHERE NOT a",
            "SELECT a FROM t WHERE a <> 1 OR b >= 2",
            "SELECT a FROM t WHERE EXISTS (SELECT 1)",
        ] {
            assert_exact_roundtrip(sql);
        }
    }
}

mod expressions {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_case_and_cast() {
        for sql in [
            "SELECT CASE WHEN a = 1 THEN 'x' ELSE 'y' END",
            "SELECT CASE a WHEN 1 THEN 'x' END",
            "SELECT CAST(a AS INT)",
            "SELECT TRY_CAST(a AS VARCHAR(10))",
            "SELECT CAST(a AS DECIMAL(10, 2))",
            "SELECT CAST(x AS ARRAY<INT>)",
            "SELECT EXTRACT(YEAR FROM d)",
        ] {
            assert_exact_roundtrip(sql);
        }
    }

    #[test]
    fn test_functions() {
        for sql in [
            "SELECT COUNT(*) FROM t",
            "SELECT COUNT(DISTINCT a) FROM t",
            "SELECT my_udf(a, 1)",
            "SELECT COALESCE(a, b, c)",
            "SELECT TRANSFORM(xs, x -> x + 1)",
            "SELECT REDUCE(xs, 0, (acc, x) -> acc + x)",
            "SELECT x[1] FROM t",
        ] {
            assert_exact_roundtrip(sql);
        }
    }

    #[test]
    fn test_windows() {
        for sql in [
            "SELECT ROW_NUMBER() OVER (PARTITION BY a ORDER BY b) FROM t",
            "SELECT SUM(a) OVER (ORDER BY b ROWS BETWEEN UNBOUNDED PRECEDING AND CURRENT ROW) FROM t",
            "SELECT SUM(a) OVER (PARTITION BY c ROWS BETWEEN 1 PRECEDING AND 1 FOLLOWING) FROM t",
        ] {
            assert_exact_roundtrip(sql);
        }
    }

    #[test]
    fn test_canonical_date_nodes() {
        for sql in [
            "SELECT TS_OR_DS_ADD(x, 1, 'DAY')",
            "SELECT TS_OR_DS_TO_DATE(x)",
            "SELECT STR_TO_UNIX(x, '%Y-%m-%d')",
            "SELECT DATE_DIFF(a, b)",
        ] {
            assert_exact_roundtrip(sql);
        }
    }
}

mod queries {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_select_clauses() {
        for sql in [
            "SELECT DISTINCT a FROM t",
            "SELECT DISTINCT ON (a) a, b FROM t",
            "SELECT a, SUM(b) FROM t GROUP BY a HAVING SUM(b) > 1 ORDER BY a DESC LIMIT 10 OFFSET 5",
            "SELECT a FROM t QUALIFY ROW_NUMBER() OVER (ORDER BY a) = 1",
            "SELECT * FROM (SELECT a FROM t) AS s",
            "WITH a AS (SELECT 1 AS x) SELECT x FROM a",
        ] {
            assert_exact_roundtrip(sql);
        }
    }

    #[test]
    fn test_joins() {
        for sql in [
            "SELECT * FROM a LEFT JOIN b ON a.id = b.id CROSS JOIN c",
            "SELECT * FROM a JOIN b USING (id)",
            "SELECT * FROM a FULL JOIN b ON a.id = b.id",
        ] {
            assert_exact_roundtrip(sql);
        }
    }

    #[test]
    fn test_outer_keyword_dropped() {
        assert_eq!(
            roundtrip("SELECT * FROM a LEFT OUTER JOIN b ON a.id = b.id"),
            "SELECT * FROM a LEFT JOIN b ON a.id = b.id"
        );
    }

    #[test]
    fn test_set_operations() {
        for sql in [
            "SELECT a FROM x UNION ALL SELECT a FROM y",
            "SELECT a FROM x UNION SELECT a FROM y",
            "SELECT a FROM x INTERSECT SELECT a FROM y",
            "SELECT a FROM x EXCEPT SELECT a FROM y",
        ] {
            assert_exact_roundtrip(sql);
        }
    }
}

mod statements {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dml() {
        for sql in [
            "INSERT INTO t (a, b) VALUES (1, 2), (3, 4)",
            "INSERT INTO t SELECT * FROM s",
            "UPDATE t SET a = 1 WHERE b = 2",
            "DELETE FROM t WHERE a = 1",
        ] {
            assert_exact_roundtrip(sql);
        }
    }

    #[test]
    fn test_ddl() {
        for sql in [
            "CREATE TABLE t (a INT NOT NULL, b VARCHAR(10))",
            "CREATE TABLE IF NOT EXISTS t AS SELECT 1",
            "CREATE OR REPLACE VIEW v AS SELECT a FROM t",
            "DROP TABLE IF EXISTS t",
            "DROP VIEW v",
            "USE db",
        ] {
            assert_exact_roundtrip(sql);
        }
    }

    #[test]
    fn test_commands_kept_verbatim() {
        assert_exact_roundtrip("SHOW TABLES IN db");
    }
}

mod laws {
    use super::*;
    use pretty_assertions::assert_eq;

    const CORPUS: &[&str] = &[
        "SELECT a, b FROM t WHERE a > 1 AND b IS NOT NULL",
        "SELECT a, COUNT(*) AS n FROM t GROUP BY a ORDER BY n DESC LIMIT 3",
        "SELECT CASE WHEN a THEN 1 END FROM t",
        "SELECT t.a FROM t LEFT JOIN u ON t.id = u.id",
        "WITH c AS (SELECT 1 AS x) SELECT x FROM c UNION ALL SELECT 2",
        "SELECT CAST(a AS BIGINT), UPPER(b) FROM t",
    ];

    #[test]
    fn test_generic_is_stable() {
        for sql in CORPUS {
            assert_stable(sql);
        }
    }

    #[test]
    fn test_idempotent_in_every_dialect() {
        for dialect_type in DialectType::ALL {
            let dialect = Dialect::get(dialect_type);
            for sql in CORPUS {
                let ast = Parser::parse_sql(sql).unwrap();
                let once = dialect.generate(&ast[0]).unwrap_or_else(|e| panic!("{dialect_type}: {e}"));
                let reparsed = dialect.parse(&once).unwrap_or_else(|e| panic!("{dialect_type} re-parse of {once}: {e}"));
                let twice = dialect.generate(&reparsed[0]).unwrap();
                assert_eq!(once, twice, "{dialect_type} not idempotent for {sql}");
            }
        }
    }

    /// Hive input exercising the canonical function nodes each dialect renames
    const HIVE_CORPUS: &[&str] = &[
        "SELECT SUBSTR(a, 2, 3), LOCATE('x', a, 2) FROM t",
        "SELECT DATE_ADD('2020-01-01', 1), DATE_SUB(d, 2) FROM t",
        "SELECT ARRAY_CONTAINS(x, 1), SIZE(x) FROM t",
        "SELECT CAST(a AS BIGINT), CAST(b AS STRING) FROM t",
        "SELECT LENGTH(s) FROM t WHERE EXISTS (SELECT 1 FROM u)",
    ];

    #[test]
    fn test_hive_input_idempotent_in_every_dialect() {
        let hive = Dialect::get(DialectType::Hive);
        for dialect_type in DialectType::ALL {
            let dialect = Dialect::get(dialect_type);
            for sql in HIVE_CORPUS {
                let ast = hive.parse(sql).unwrap();
                let once = match dialect.generate(&ast[0]) {
                    Ok(once) => once,
                    Err(Error::Unsupported { .. }) => continue,
                    Err(e) => panic!("{dialect_type}: {e}"),
                };
                let reparsed = dialect.parse(&once).unwrap_or_else(|e| panic!("{dialect_type} re-parse of {once}: {e}"));
                let twice = dialect.generate(&reparsed[0]).unwrap();
                assert_eq!(once, twice, "{dialect_type} not idempotent for {sql}");
            }
        }
    }

    #[test]
    fn test_cast_roundtrips_in_strict_dialects() {
        for dialect_type in [DialectType::Databricks, DialectType::Snowflake, DialectType::Postgres] {
            let dialect = Dialect::get(dialect_type);
            let ast = dialect.parse("SELECT CAST(a AS INT)").unwrap();
            assert!(matches!(ast[0], Expression::Select(_)));
            assert_eq!(dialect.generate(&ast[0]).unwrap(), "SELECT CAST(a AS INT)", "{dialect_type}");
        }
    }

    #[test]
    fn test_ast_survives_json() {
        for sql in CORPUS {
            let ast = Parser::parse_sql(sql).unwrap();
            let json = serde_json::to_string(&ast[0]).unwrap();
            let back: Expression = serde_json::from_str(&json).unwrap();
            assert_eq!(back, ast[0]);
        }
    }

    #[test]
    fn test_reparse_gives_equal_tree() {
        for sql in CORPUS {
            let ast = Parser::parse_sql(sql).unwrap();
            let again = Parser::parse_sql(&Generator::sql(&ast[0]).unwrap()).unwrap();
            assert_eq!(again[0], ast[0], "tree changed for {sql}");
        }
    }
}
