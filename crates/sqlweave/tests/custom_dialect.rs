//! Tests for custom dialect support.
//!
//! These cover the `CustomDialectBuilder` API, the registry's duplicate-name
//! policy, inheritance from built-in and custom bases, and name-based lookup
//! through the top-level API.

use pretty_assertions::assert_eq;
use sqlweave::dialects::{CustomDialectBuilder, Dialect, DialectType};
use sqlweave::expressions::{DataTypeKind, Expression, ExpressionKind};
use sqlweave::parser::unary;
use sqlweave::{parse_one, transpile_one, unregister_custom_dialect, Error, GenerateOptions, Stage, TokenType};

/// Unregisters on drop so a failing test does not leak into the others.
struct DialectGuard(&'static str);

impl Drop for DialectGuard {
    fn drop(&mut self) {
        unregister_custom_dialect(self.0);
    }
}

fn to(sql: &str, read: &str, write: &str) -> String {
    transpile_one(sql, read, write, &GenerateOptions::default())
        .unwrap_or_else(|e| panic!("{read} -> {write} failed for {sql}: {e}"))
}

#[test]
fn test_rename_on_top_of_builtin() {
    let _guard = DialectGuard("test_rename");

    CustomDialectBuilder::new("test_rename")
        .based_on(DialectType::Presto)
        .generator_config_modifier(|gc| gc.rename(ExpressionKind::ArraySize, "ARRAY_LEN"))
        .register()
        .unwrap();

    assert_eq!(to("SELECT SIZE(x)", "hive", "test_rename"), "SELECT ARRAY_LEN(x)");
    // Everything else is inherited from Presto
    assert_eq!(to("SELECT x & 1", "hive", "test_rename"), "SELECT BITWISE_AND(x, 1)");
}

#[test]
fn test_dialect_type_of_custom() {
    let _guard = DialectGuard("test_kind");

    CustomDialectBuilder::new("test_kind")
        .based_on(DialectType::Spark)
        .register()
        .unwrap();

    let dialect = Dialect::get_by_name("test_kind").unwrap();
    assert_eq!(dialect.name(), "test_kind");
    assert_eq!(dialect.dialect_type(), DialectType::Spark);
    assert_eq!(dialect.bundle().lineage, vec!["test_kind", "spark", "hive", "generic"]);
}

#[test]
fn test_tokenizer_and_parser_modifiers() {
    let _guard = DialectGuard("test_lexing");

    CustomDialectBuilder::new("test_lexing")
        .tokenizer_config_modifier(|tc| {
            tc.keywords.insert("FETCHALL".to_string(), TokenType::Command);
        })
        .parser_config_modifier(|pc| {
            pc.function("STRLEN", |args, _| unary(Expression::Length, "STRLEN", args));
            pc.type_names.insert("TXT".to_string(), DataTypeKind::Text);
        })
        .register()
        .unwrap();

    assert_eq!(to("SELECT STRLEN(s)", "test_lexing", "postgres"), "SELECT LENGTH(s)");
    assert_eq!(to("SELECT CAST(a AS TXT)", "test_lexing", "postgres"), "SELECT CAST(a AS TEXT)");
    assert!(matches!(parse_one("FETCHALL now", "test_lexing").unwrap(), Expression::Command(_)));
}

#[test]
fn test_custom_transform() {
    let _guard = DialectGuard("test_transform");

    CustomDialectBuilder::new("test_transform")
        .based_on(DialectType::DuckDB)
        .generator_config_modifier(|gc| {
            gc.transform(ExpressionKind::Upper, |g, e| {
                let Expression::Upper(f) = e else { return g.render_default(e) };
                g.render_function("TO_UPPER", &[&f.this])
            });
            gc.type_name(DataTypeKind::BigInt, "INT8");
        })
        .register()
        .unwrap();

    assert_eq!(
        to("SELECT UPPER(a), CAST(b AS BIGINT)", "generic", "test_transform"),
        "SELECT TO_UPPER(a), CAST(b AS INT8)"
    );
}

#[test]
fn test_based_on_custom_dialect() {
    let _parent = DialectGuard("test_parent");
    let _child = DialectGuard("test_child");

    CustomDialectBuilder::new("test_parent")
        .based_on(DialectType::Postgres)
        .generator_config_modifier(|gc| gc.rename(ExpressionKind::Length, "CHAR_LENGTH"))
        .register()
        .unwrap();
    CustomDialectBuilder::new("test_child")
        .based_on_name("test_parent")
        .generator_config_modifier(|gc| gc.set_identifier_quotes('[', ']'))
        .register()
        .unwrap();

    assert_eq!(
        to("SELECT LENGTH(\"a b\")", "generic", "test_child"),
        "SELECT CHAR_LENGTH([a b])"
    );
    assert_eq!(
        Dialect::get_by_name("test_child").unwrap().dialect_type(),
        DialectType::Postgres
    );
}

#[test]
fn test_builtin_names_rejected() {
    for name in ["duckdb", "Postgres", "postgresql", "mssql", "generic"] {
        let err = CustomDialectBuilder::new(name).register().unwrap_err();
        assert!(matches!(err, Error::Registry { .. }), "{name}: got {err:?}");
        assert_eq!(err.stage(), Stage::Registry);
    }
}

#[test]
fn test_empty_name_rejected() {
    let err = CustomDialectBuilder::new("  ").register().unwrap_err();
    assert!(matches!(err, Error::Registry { .. }), "got {err:?}");
}

#[test]
fn test_duplicate_rejected_without_override() {
    let _guard = DialectGuard("test_dup");

    CustomDialectBuilder::new("test_dup").register().unwrap();
    let err = CustomDialectBuilder::new("test_dup").register().unwrap_err();
    assert!(matches!(err, Error::Registry { .. }), "got {err:?}");
}

#[test]
fn test_override_replaces_and_invalidates() {
    let _guard = DialectGuard("test_override");
    let _child = DialectGuard("test_override_child");

    CustomDialectBuilder::new("test_override")
        .generator_config_modifier(|gc| gc.rename(ExpressionKind::Upper, "UP1"))
        .register()
        .unwrap();
    CustomDialectBuilder::new("test_override_child")
        .based_on_name("test_override")
        .register()
        .unwrap();
    assert_eq!(to("SELECT UPPER(a)", "generic", "test_override_child"), "SELECT UP1(a)");

    CustomDialectBuilder::new("test_override")
        .allow_override(true)
        .generator_config_modifier(|gc| gc.rename(ExpressionKind::Upper, "UP2"))
        .register()
        .unwrap();

    assert_eq!(to("SELECT UPPER(a)", "generic", "test_override"), "SELECT UP2(a)");
    // Cached bundles of dependants are rebuilt too
    assert_eq!(to("SELECT UPPER(a)", "generic", "test_override_child"), "SELECT UP2(a)");
}

#[test]
fn test_unknown_base() {
    let err = CustomDialectBuilder::new("test_orphan")
        .based_on_name("no_such_dialect")
        .register()
        .unwrap_err();
    assert!(matches!(err, Error::UnknownDialect { .. }), "got {err:?}");
}

#[test]
fn test_self_base_rejected() {
    let err = CustomDialectBuilder::new("test_self")
        .based_on_name("test_self")
        .register()
        .unwrap_err();
    assert!(matches!(err, Error::Registry { .. }), "got {err:?}");
}

#[test]
fn test_unregister() {
    CustomDialectBuilder::new("test_gone").register().unwrap();
    assert!(Dialect::get_by_name("test_gone").is_ok());

    assert!(unregister_custom_dialect("test_gone"));
    assert!(!unregister_custom_dialect("test_gone"));
    assert!(matches!(
        Dialect::get_by_name("test_gone").unwrap_err(),
        Error::UnknownDialect { .. }
    ));
}

#[test]
fn test_builtins_cannot_be_unregistered() {
    assert!(!unregister_custom_dialect("duckdb"));
    assert!(Dialect::get_by_name("duckdb").is_ok());
}

#[test]
fn test_names_are_case_insensitive() {
    let _guard = DialectGuard("test_case");

    CustomDialectBuilder::new("Test_Case").register().unwrap();
    assert_eq!(Dialect::get_by_name("TEST_CASE").unwrap().name(), "test_case");
}
