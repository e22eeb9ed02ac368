//! Error Handling Tests
//!
//! Failures must be typed, carry the stage that raised them and, where the
//! input is at fault, point at the offending position.

use sqlweave::parser::Parser;
use sqlweave::{
    parse, parse_with_options, transpile, transpile_one, Error, Expression, GenerateOptions,
    ParseOptions, Stage,
};

// ============================================================================
// Lexical errors
// ============================================================================

mod lex_errors {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unterminated_string() {
        let err = Parser::parse_sql("SELECT 'abc").unwrap_err();
        assert_eq!(err.stage(), Stage::Lex);
        match err {
            Error::Tokenize {
                offset, line, column, ..
            } => {
                assert_eq!(offset, 7);
                assert_eq!(line, 1);
                assert_eq!(column, 8);
            }
            other => panic!("expected a tokenize error, got {other:?}"),
        }
    }

    #[test]
    fn test_unterminated_block_comment() {
        let err = Parser::parse_sql("SELECT 1 /* never closed").unwrap_err();
        assert!(matches!(err, Error::Tokenize { .. }), "got {err:?}");
    }

    #[test]
    fn test_unexpected_character() {
        let err = Parser::parse_sql("SELECT 1 €").unwrap_err();
        assert!(err.to_string().contains("Unexpected character"), "{err}");
    }

    #[test]
    fn test_position_on_later_line() {
        let err = Parser::parse_sql("SELECT a\nFROM t\nWHERE b = 'x").unwrap_err();
        let span = err.span().expect("tokenize errors carry a span");
        assert_eq!(span.line, 3);
    }

    #[test]
    fn test_unterminated_quoted_identifier() {
        let err = parse("SELECT `a FROM t", "hive").unwrap_err();
        assert_eq!(err.stage(), Stage::Lex);
    }
}

// ============================================================================
// Syntax errors
// ============================================================================

mod syntax_errors {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unbalanced_parentheses_open() {
        let err = Parser::parse_sql("SELECT (1 + 2").unwrap_err();
        assert_eq!(err.stage(), Stage::Parse);
    }

    #[test]
    fn test_unbalanced_parentheses_close() {
        let err = Parser::parse_sql("SELECT 1 + 2)").unwrap_err();
        match err {
            Error::Parse {
                expected, found, span, ..
            } => {
                assert!(expected.contains(&"';'".to_string()), "{expected:?}");
                assert_eq!(found, ")");
                assert_eq!(span.map(|s| s.start), Some(12));
            }
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_unbalanced_parentheses_nested() {
        assert!(Parser::parse_sql("SELECT ((1 + 2)").is_err());
    }

    #[test]
    fn test_incomplete_clauses() {
        for sql in [
            "SELECT * FROM users WHERE",
            "SELECT * FROM users WHERE a AND",
            "SELECT * FROM users WHERE a OR",
            "SELECT * FROM users JOIN",
            "SELECT * FROM users ORDER BY",
            "SELECT * FROM users GROUP BY",
        ] {
            let err = Parser::parse_sql(sql).unwrap_err();
            assert_eq!(err.stage(), Stage::Parse, "{sql}");
        }
    }

    #[test]
    fn test_end_of_input_reported() {
        let err = Parser::parse_sql("SELECT * FROM users WHERE").unwrap_err();
        assert!(matches!(err, Error::Parse { ref found, .. } if found == "end of input"), "got {err:?}");
    }

    #[test]
    fn test_end_of_input_column_follows_last_token() {
        let err = Parser::parse_sql("SELECT").unwrap_err();
        let span = err.span().expect("span");
        assert_eq!(span.start, 6);
        assert_eq!(span.line, 1);
        assert_eq!(span.column, 7);

        let err = Parser::parse_sql("SELECT a\nFROM").unwrap_err();
        let span = err.span().expect("span");
        assert_eq!((span.line, span.column), (2, 5));
    }

    #[test]
    fn test_function_arity_points_at_name() {
        let err = parse("SELECT MAP(a)", "hive").unwrap_err();
        match err {
            Error::Parse { message, found, span, .. } => {
                assert!(message.contains("MAP"), "{message}");
                assert_eq!(found, "MAP");
                let span = span.expect("span");
                assert_eq!((span.start, span.line, span.column), (7, 1, 8));
            }
            other => panic!("expected a parse error, got {other:?}"),
        }

        let err = parse("SELECT a FROM t WHERE DATEDIFF(a) > 1", "hive").unwrap_err();
        assert_eq!(err.span().map(|s| s.start), Some(22));
        assert!(matches!(err, Error::Parse { ref found, .. } if found == "DATEDIFF"), "got {err:?}");
    }

    #[test]
    fn test_double_comma() {
        assert!(Parser::parse_sql("SELECT a,, b FROM t").is_err());
    }

    #[test]
    fn test_message_names_position() {
        let err = Parser::parse_sql("SELECT 1 + 2)").unwrap_err();
        assert!(err.to_string().contains("line 1"), "{err}");
    }
}

// ============================================================================
// Empty input
// ============================================================================

mod empty_input {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_and_blank_inputs_have_no_statements() {
        for sql in ["", "   \n\t  ", ";", ";;;", "-- only a comment", "/* block */"] {
            let result = Parser::parse_sql(sql).unwrap();
            assert!(result.is_empty(), "{sql:?} gave {result:?}");
        }
    }

    #[test]
    fn test_transpile_empty_input() {
        let out = transpile("", "generic", "duckdb", &GenerateOptions::default()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_transpile_one_needs_a_statement() {
        assert!(transpile_one("", "generic", "duckdb", &GenerateOptions::default()).is_err());
    }
}

// ============================================================================
// Dialect lookup
// ============================================================================

mod dialect_lookup {
    use super::*;
    use pretty_assertions::assert_eq;
    use sqlweave::dialects::{Dialect, DialectType};

    #[test]
    fn test_unknown_dialect() {
        let err = transpile("SELECT 1", "notadialect", "duckdb", &GenerateOptions::default()).unwrap_err();
        assert!(matches!(err, Error::UnknownDialect { ref name } if name == "notadialect"));
        assert_eq!(err.stage(), Stage::Registry);
        assert!(err.span().is_none());
    }

    #[test]
    fn test_names_are_case_insensitive() {
        assert_eq!(Dialect::get_by_name("DuckDB").unwrap().dialect_type(), DialectType::DuckDB);
        assert_eq!(Dialect::get_by_name("HIVE").unwrap().dialect_type(), DialectType::Hive);
    }

    #[test]
    fn test_aliases() {
        assert_eq!(Dialect::get_by_name("postgresql").unwrap().dialect_type(), DialectType::Postgres);
        assert_eq!(Dialect::get_by_name("mssql").unwrap().dialect_type(), DialectType::TSQL);
        assert_eq!(Dialect::get_by_name("sqlserver").unwrap().dialect_type(), DialectType::TSQL);
        assert_eq!(Dialect::get_by_name("").unwrap().dialect_type(), DialectType::Generic);
    }

    #[test]
    fn test_from_str() {
        let parsed: DialectType = "trino".parse().unwrap();
        assert_eq!(parsed, DialectType::Trino);
        assert!("nope".parse::<DialectType>().is_err());
    }
}

// ============================================================================
// Unsupported constructs
// ============================================================================

mod unsupported {
    use super::*;
    use pretty_assertions::assert_eq;

    fn unsupported_in(sql: &str, read: &str, write: &str) -> Error {
        let err = transpile(sql, read, write, &GenerateOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Unsupported { .. }), "{read} -> {write}: got {err:?}");
        assert_eq!(err.stage(), Stage::Generate);
        err
    }

    #[test]
    fn test_qualify() {
        let err = unsupported_in(
            "SELECT a FROM t QUALIFY ROW_NUMBER() OVER (ORDER BY a) = 1",
            "snowflake",
            "mysql",
        );
        assert!(err.to_string().contains("QUALIFY"), "{err}");
    }

    #[test]
    fn test_distinct_on() {
        unsupported_in("SELECT DISTINCT ON (a) a, b FROM t", "postgres", "snowflake");
    }

    #[test]
    fn test_null_ordering_by_position() {
        unsupported_in("SELECT a FROM t ORDER BY 1 NULLS LAST", "postgres", "mysql");
    }

    #[test]
    fn test_all_or_nothing() {
        // The first statement is fine, the second cannot be rendered
        let err = transpile(
            "SELECT 1; SELECT a FROM t QUALIFY ROW_NUMBER() OVER (ORDER BY a) = 1",
            "snowflake",
            "mysql",
            &GenerateOptions::default(),
        );
        assert!(err.is_err());
    }
}

// ============================================================================
// Lenient parsing
// ============================================================================

mod lenient {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bad_statement_kept_as_text() {
        let out = parse_with_options("SELECT 1; SELECT FROM WHERE; SELECT 2", "generic", &ParseOptions::lenient())
            .unwrap();
        assert_eq!(out.len(), 3);
        match &out[1] {
            Expression::Unparsed(u) => assert_eq!(u.text, "SELECT FROM WHERE"),
            other => panic!("expected an unparsed leaf, got {other:?}"),
        }
    }

    #[test]
    fn test_unparsed_renders_verbatim() {
        let asts = parse_with_options("SELECT FROM WHERE", "generic", &ParseOptions::lenient()).unwrap();
        let sql = sqlweave::generate(&asts[0], "duckdb", &GenerateOptions::default()).unwrap();
        assert_eq!(sql, "SELECT FROM WHERE");
    }

    #[test]
    fn test_strict_is_default() {
        assert!(parse("SELECT 1; SELECT FROM WHERE", "generic").is_err());
    }

    #[test]
    fn test_lex_errors_stay_fatal() {
        assert!(parse_with_options("SELECT 'abc", "generic", &ParseOptions::lenient()).is_err());
    }
}

// ============================================================================
// Nesting and size
// ============================================================================

mod stress {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_deeply_nested_parentheses() {
        let depth = 50;
        let sql = format!("SELECT {}1{}", "(".repeat(depth), ")".repeat(depth));
        let ast = Parser::parse_sql(&sql).unwrap();
        assert_eq!(ast.len(), 1);
    }

    #[test]
    fn test_many_columns() {
        let columns: Vec<String> = (0..500).map(|i| format!("c{i}")).collect();
        let sql = format!("SELECT {} FROM t", columns.join(", "));
        let out = transpile_one(&sql, "generic", "postgres", &GenerateOptions::default()).unwrap();
        assert_eq!(out, sql);
    }

    #[test]
    fn test_many_unions() {
        let sql = (0..50).map(|i| format!("SELECT {i}")).collect::<Vec<_>>().join(" UNION ALL ");
        let out = transpile_one(&sql, "generic", "generic", &GenerateOptions::default()).unwrap();
        assert_eq!(out, sql);
    }

    #[test]
    fn test_unicode_literals() {
        let sql = "SELECT '日本語 🎉' AS \"列\"";
        let out = transpile_one(sql, "generic", "postgres", &GenerateOptions::default()).unwrap();
        assert_eq!(out, sql);
    }
}
