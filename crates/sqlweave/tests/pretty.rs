//! Pretty printing and formatting options.

use sqlweave::{parse, transpile_one, GenerateOptions, NormalizeCase};

fn format(sql: &str, options: &GenerateOptions) -> String {
    transpile_one(sql, "generic", "generic", options).unwrap_or_else(|e| panic!("{sql}: {e}"))
}

fn pretty(sql: &str) -> String {
    format(sql, &GenerateOptions::pretty())
}

mod layout {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_clauses_on_their_own_lines() {
        assert_eq!(
            pretty("SELECT a, b FROM t WHERE a = 1 ORDER BY a"),
            "SELECT\n  a,\n  b\nFROM t\nWHERE\n  a = 1\nORDER BY\n  a"
        );
    }

    #[test]
    fn test_joins_and_limit() {
        assert_eq!(
            pretty("SELECT a FROM t JOIN u ON t.id = u.id LIMIT 5"),
            "SELECT\n  a\nFROM t\nJOIN u ON t.id = u.id\nLIMIT 5"
        );
    }

    #[test]
    fn test_group_by_and_having() {
        assert_eq!(
            pretty("SELECT a, COUNT(*) FROM t GROUP BY a HAVING COUNT(*) > 1"),
            "SELECT\n  a,\n  COUNT(*)\nFROM t\nGROUP BY\n  a\nHAVING\n  COUNT(*) > 1"
        );
    }

    #[test]
    fn test_subquery_is_indented() {
        assert_eq!(
            pretty("SELECT * FROM (SELECT a FROM t) AS s"),
            "SELECT\n  *\nFROM (\n  SELECT\n    a\n  FROM t\n) AS s"
        );
    }

    #[test]
    fn test_cte() {
        assert_eq!(
            pretty("WITH c AS (SELECT 1) SELECT * FROM c"),
            "WITH c AS (\n  SELECT\n    1\n)\nSELECT\n  *\nFROM c"
        );
    }

    #[test]
    fn test_set_operation() {
        assert_eq!(
            pretty("SELECT a FROM x UNION ALL SELECT b FROM y"),
            "SELECT\n  a\nFROM x\nUNION ALL\nSELECT\n  b\nFROM y"
        );
    }

    #[test]
    fn test_pretty_output_parses_back_to_the_same_tree() {
        let sql = "WITH c AS (SELECT a, b FROM t WHERE a > 1) SELECT c.a, SUM(c.b) FROM c GROUP BY c.a ORDER BY c.a";
        let compact = parse(sql, "generic").unwrap();
        let reparsed = parse(&pretty(sql), "generic").unwrap();
        assert_eq!(reparsed, compact);
    }
}

mod options {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_leading_comma() {
        let options = GenerateOptions {
            pretty: true,
            leading_comma: true,
            ..GenerateOptions::default()
        };
        assert_eq!(format("SELECT a, b, c FROM t", &options), "SELECT\n  a\n  , b\n  , c\nFROM t");
    }

    #[test]
    fn test_leading_comma_ignored_when_compact() {
        let options = GenerateOptions {
            leading_comma: true,
            ..GenerateOptions::default()
        };
        assert_eq!(format("SELECT a, b FROM t", &options), "SELECT a, b FROM t");
    }

    #[test]
    fn test_indent_width() {
        let options = GenerateOptions {
            pretty: true,
            indent: 4,
            ..GenerateOptions::default()
        };
        assert_eq!(format("SELECT a FROM t", &options), "SELECT\n    a\nFROM t");
    }

    #[test]
    fn test_wide_arguments_break() {
        let options = GenerateOptions {
            pretty: true,
            max_width: 20,
            ..GenerateOptions::default()
        };
        assert_eq!(
            format("SELECT my_udf(first_column, second_column) FROM t", &options),
            "SELECT\n  my_udf(\n    first_column,\n    second_column\n  )\nFROM t"
        );
    }

    #[test]
    fn test_narrow_arguments_stay_inline() {
        assert_eq!(
            pretty("SELECT my_udf(first_column, second_column) FROM t"),
            "SELECT\n  my_udf(first_column, second_column)\nFROM t"
        );
    }

    #[test]
    fn test_identify_quotes_everything() {
        let options = GenerateOptions {
            identify: true,
            ..GenerateOptions::default()
        };
        assert_eq!(format("SELECT a FROM t", &options), "SELECT \"a\" FROM \"t\"");
        assert_eq!(
            transpile_one("SELECT a FROM t", "generic", "mysql", &options).unwrap(),
            "SELECT `a` FROM `t`"
        );
    }

    #[test]
    fn test_normalize_lower() {
        let options = GenerateOptions {
            normalize_case: NormalizeCase::Lower,
            ..GenerateOptions::default()
        };
        assert_eq!(
            format("SELECT Foo, MY_UDF(Bar), \"Keep\" FROM T", &options),
            "SELECT foo, my_udf(bar), \"Keep\" FROM t"
        );
    }

    #[test]
    fn test_normalize_upper() {
        let options = GenerateOptions {
            normalize_case: NormalizeCase::Upper,
            ..GenerateOptions::default()
        };
        assert_eq!(
            format("SELECT Foo, my_udf(Bar), \"Keep\" FROM t", &options),
            "SELECT FOO, MY_UDF(BAR), \"Keep\" FROM T"
        );
    }

    #[test]
    fn test_defaults() {
        let options = GenerateOptions::default();
        assert!(!options.pretty);
        assert!(!options.identify);
        assert_eq!(options.normalize_case, NormalizeCase::None);
        assert_eq!(options.max_width, 80);
        assert_eq!(options.indent, 2);
    }

    #[test]
    fn test_options_from_json() {
        let options: GenerateOptions = serde_json::from_str(r#"{"pretty": true, "indent": 3}"#).unwrap();
        assert!(options.pretty);
        assert_eq!(options.indent, 3);
        assert_eq!(options.max_width, 80);
    }
}
