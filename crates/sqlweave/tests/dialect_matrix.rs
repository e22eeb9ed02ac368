//! Dialect Matrix Transpilation Tests
//!
//! Every built-in dialect against every other: plain queries must survive any
//! pair unchanged, and target-specific rendering (quoting, row limits) must
//! follow the target no matter which dialect read the input.

use sqlweave::dialects::{Dialect, DialectType};
use sqlweave::GenerateOptions;

fn transpile(sql: &str, from: DialectType, to: DialectType) -> String {
    Dialect::get(from)
        .transpile_to(sql, &Dialect::get(to), &GenerateOptions::default())
        .unwrap_or_else(|e| panic!("{from} -> {to} failed for {sql}: {e}"))
        .remove(0)
}

mod portable_queries {
    use super::*;
    use pretty_assertions::assert_eq;

    const PORTABLE: &[&str] = &[
        "SELECT a, b FROM t WHERE a = 1",
        "SELECT a AS x FROM t WHERE b > 2 AND c < 3",
        "SELECT a, COUNT(*) FROM t GROUP BY a HAVING COUNT(*) > 1",
        "SELECT CASE WHEN a IS NULL THEN 0 ELSE a END FROM t",
        "SELECT a FROM t WHERE b IN (1, 2, 3) AND c BETWEEN 1 AND 5",
        "SELECT a FROM t WHERE EXISTS (SELECT 1 FROM u WHERE u.id = t.id)",
    ];

    #[test]
    fn test_every_pair_is_identity() {
        for sql in PORTABLE {
            for from in DialectType::ALL {
                for to in DialectType::ALL {
                    assert_eq!(transpile(sql, from, to), *sql, "{from} -> {to}");
                }
            }
        }
    }

    #[test]
    fn test_joins_every_pair() {
        let sql = "SELECT t.a, u.b FROM t JOIN u ON t.id = u.id LEFT JOIN v ON u.id = v.id";
        for from in DialectType::ALL {
            for to in DialectType::ALL {
                assert_eq!(transpile(sql, from, to), sql, "{from} -> {to}");
            }
        }
    }
}

mod quoting {
    use super::*;
    use pretty_assertions::assert_eq;

    fn quote_for(target: DialectType) -> (char, char) {
        match target {
            DialectType::Hive
            | DialectType::Spark
            | DialectType::Databricks
            | DialectType::MySQL
            | DialectType::StarRocks
            | DialectType::BigQuery
            | DialectType::Drill => ('`', '`'),
            DialectType::TSQL | DialectType::Tableau => ('[', ']'),
            _ => ('"', '"'),
        }
    }

    #[test]
    fn test_quoted_identifier_uses_target_quotes() {
        for to in DialectType::ALL {
            let (open, close) = quote_for(to);
            assert_eq!(
                transpile("SELECT \"a b\" FROM t", DialectType::Generic, to),
                format!("SELECT {open}a b{close} FROM t"),
                "generic -> {to}"
            );
        }
    }

    #[test]
    fn test_quoted_identifier_read_from_each_source() {
        for from in DialectType::ALL {
            let (open, close) = quote_for(from);
            let sql = format!("SELECT {open}a b{close} FROM t");
            assert_eq!(
                transpile(&sql, from, DialectType::Postgres),
                "SELECT \"a b\" FROM t",
                "{from} -> postgres"
            );
        }
    }
}

mod row_limits {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_limit_style_follows_target() {
        for to in DialectType::ALL {
            let expected = match to {
                DialectType::TSQL | DialectType::Teradata => "SELECT TOP 10 a FROM t",
                DialectType::Oracle => "SELECT a FROM t FETCH FIRST 10 ROWS ONLY",
                _ => "SELECT a FROM t LIMIT 10",
            };
            assert_eq!(transpile("SELECT a FROM t LIMIT 10", DialectType::Generic, to), expected, "generic -> {to}");
        }
    }

    #[test]
    fn test_top_and_fetch_read_back() {
        assert_eq!(
            transpile("SELECT TOP 10 a FROM t", DialectType::TSQL, DialectType::Postgres),
            "SELECT a FROM t LIMIT 10"
        );
        assert_eq!(
            transpile("SELECT a FROM t FETCH FIRST 10 ROWS ONLY", DialectType::Oracle, DialectType::DuckDB),
            "SELECT a FROM t LIMIT 10"
        );
    }
}

mod stability {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_output_reparses_in_target() {
        let sql = "SELECT a, COUNT(*) AS n FROM t WHERE b > 1 GROUP BY a ORDER BY n DESC LIMIT 5";
        for to in DialectType::ALL {
            let first = transpile(sql, DialectType::Generic, to);
            let second = transpile(&first, to, to);
            assert_eq!(first, second, "generic -> {to} not stable");
        }
    }
}

mod cross_pairs {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_coalesce_spellings() {
        assert_eq!(
            transpile("SELECT ISNULL(a, 0) FROM t", DialectType::TSQL, DialectType::Postgres),
            "SELECT COALESCE(a, 0) FROM t"
        );
        assert_eq!(
            transpile("SELECT NVL(a, 0) FROM t", DialectType::Oracle, DialectType::DuckDB),
            "SELECT COALESCE(a, 0) FROM t"
        );
        assert_eq!(
            transpile("SELECT COALESCE(x, y) FROM t", DialectType::Hive, DialectType::Tableau),
            "SELECT IFNULL(x, y) FROM t"
        );
    }

    #[test]
    fn test_string_position_spellings() {
        assert_eq!(
            transpile("SELECT CHARINDEX('a', s)", DialectType::TSQL, DialectType::Presto),
            "SELECT STRPOS(s, 'a')"
        );
        assert_eq!(
            transpile("SELECT STRPOS(s, 'a')", DialectType::Postgres, DialectType::MySQL),
            "SELECT LOCATE('a', s)"
        );
        assert_eq!(
            transpile("SELECT INSTR(s, 'a')", DialectType::SQLite, DialectType::Hive),
            "SELECT LOCATE('a', s)"
        );
    }

    #[test]
    fn test_modulo_spellings() {
        assert_eq!(
            transpile("SELECT a % 2 FROM t", DialectType::Postgres, DialectType::Teradata),
            "SELECT a MOD 2 FROM t"
        );
        assert_eq!(
            transpile("SELECT a MOD 2 FROM t", DialectType::Teradata, DialectType::DuckDB),
            "SELECT a % 2 FROM t"
        );
    }
}
