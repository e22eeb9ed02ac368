//! Snowflake Dialect
//!
//! Snowflake-specific function builders and render transforms.
//! Key differences:
//! - Unquoted identifiers resolve upper-case
//! - `$$dollar quoted$$` strings, backslash escapes, MINUS for EXCEPT
//! - IFF, ARRAY_CONSTRUCT, `ARRAY_CONTAINS(value, array)`
//! - Unit-first DATEADD / DATEDIFF with bare unit keywords
//! - TO_CHAR / TO_TIMESTAMP / TO_DATE with `YYYY-MM-DD HH24:MI:SS` templates
//! - Arrays are expanded with `TABLE(FLATTEN(INPUT => x))`
//! - QUALIFY and TRY_CAST, but no DISTINCT ON

use super::postgres::{as_date, render_percentile};
use super::{
    format_or_default, negated, operator_as_function, operator_from_function, render_formatted,
    render_locate, render_unit_first, unit_first, unit_first_diff, DialectImpl, DialectType,
    DEFAULT_TIME_FORMAT,
};
use crate::error::Result;
use crate::expressions::{
    BinaryFunc, DataType, DataTypeKind, Expression, ExpressionKind, Extract, FormatFunc, Identifier,
    Literal, Rand, UnaryFunc, UnaryOp, Unnest, VarArgFunc,
};
use crate::generator::{Generator, GeneratorConfig, NestedTypeStyle, PropertiesStyle, StringEscape};
use crate::parser::{
    binary, build_group_concat, build_if, build_locate, check_arity, format_func, take_args, ts_or_ds_to_date, unary, unit_name,
    NormalizationStrategy, NullOrdering, ParserConfig,
};
use crate::time::TimeMapping;
use crate::tokens::{TokenType, TokenizerConfig};

/// Snowflake format elements; lower-case spellings are accepted on input
const SNOWFLAKE_TIME_MAPPING: &[(&str, &str)] = &[
    ("yyyy", "%Y"),
    ("mm", "%m"),
    ("dd", "%d"),
    ("hh24", "%H"),
    ("mi", "%M"),
    ("ss", "%S"),
    ("YYYY", "%Y"),
    ("YY", "%y"),
    ("MMMM", "%B"),
    ("MON", "%b"),
    ("MM", "%m"),
    ("DD", "%d"),
    ("DY", "%a"),
    ("HH", "%H"),
    ("HH12", "%I"),
    ("HH24", "%H"),
    ("MI", "%M"),
    ("SS", "%S"),
    ("FF", "%f"),
    ("FF6", "%f"),
    ("PM", "%p"),
    ("AM", "%p"),
];

/// Snowflake dialect
pub struct SnowflakeDialect;

impl DialectImpl for SnowflakeDialect {
    fn dialect_type(&self) -> DialectType {
        DialectType::Snowflake
    }

    fn tokenizer_config(&self, config: &mut TokenizerConfig) {
        config.quotes.insert("$$".to_string(), "$$".to_string());
        config.string_escapes = vec!['\'', '\\'];
        config.nested_comments = false;
        config.keywords.insert("MINUS".to_string(), TokenType::Except);
    }

    fn parser_config(&self, config: &mut ParserConfig) {
        config.normalization = NormalizationStrategy::Uppercase;
        config.null_ordering = NullOrdering::NullsAreLarge;
        config.time_mapping = TimeMapping::new(SNOWFLAKE_TIME_MAPPING);
        config.time_format = Some(DEFAULT_TIME_FORMAT.to_string());
        for (name, kind) in [
            ("VARIANT", DataTypeKind::Variant),
            ("OBJECT", DataTypeKind::Map),
            ("NUMBER", DataTypeKind::Decimal),
            ("TIMESTAMP_NTZ", DataTypeKind::Timestamp),
            ("TIMESTAMP_TZ", DataTypeKind::TimestampTz),
            ("TIMESTAMP_LTZ", DataTypeKind::TimestampLtz),
        ] {
            config.type_names.insert(name.to_string(), kind);
        }

        config.function("IFF", build_if);
        config.function("ARRAY_CONSTRUCT", |args, _| {
            Ok(Expression::Array(Box::new(VarArgFunc::new(args))))
        });
        // ARRAY_CONTAINS(value, array)
        config.function("ARRAY_CONTAINS", |args, _| {
            let [value, array] = take_args("ARRAY_CONTAINS", args)?;
            Ok(Expression::ArrayContains(Box::new(BinaryFunc::new(array, value))))
        });
        for name in ["DATEADD", "TIMEADD", "TIMESTAMPADD"] {
            config.function(name, |args, _| unit_first("DATEADD", args, Expression::DateAdd));
        }
        for name in ["DATEDIFF", "TIMEDIFF", "TIMESTAMPDIFF"] {
            config.function(name, |args, _| unit_first_diff("DATEDIFF", args));
        }
        config.function("DATE_PART", |args, _| {
            let [unit, this] = take_args("DATE_PART", args)?;
            let field = unit_name(&unit).unwrap_or_else(|| "DAY".to_string());
            Ok(Expression::Extract(Box::new(Extract { field, this })))
        });
        config.function("TO_CHAR", |a, c| format_func(Expression::TimeToStr, "TO_CHAR", a, c));
        config.function("TO_VARCHAR", |a, c| format_func(Expression::TimeToStr, "TO_VARCHAR", a, c));
        config.function("TO_TIMESTAMP", |args, config| {
            check_arity("TO_TIMESTAMP", &args, 1, 2)?;
            let mut args = args.into_iter();
            let this = args.next().unwrap_or_else(Expression::null);
            match args.next() {
                Some(format) => Ok(Expression::StrToTime(Box::new(FormatFunc::new(
                    this,
                    Some(config.canonical_format(format)),
                )))),
                // An epoch number converts from seconds
                None if matches!(this, Expression::Literal(Literal::Number(_))) => {
                    Ok(Expression::UnixToTime(Box::new(UnaryFunc::new(this))))
                }
                None => Ok(Expression::cast(this, DataType::new(DataTypeKind::Timestamp))),
            }
        });
        config.function("TO_DATE", |args, config| {
            check_arity("TO_DATE", &args, 1, 2)?;
            let mut args = args.into_iter();
            let this = args.next().unwrap_or_else(Expression::null);
            match args.next() {
                Some(format) => Ok(Expression::StrToDate(Box::new(FormatFunc::new(
                    this,
                    Some(config.canonical_format(format)),
                )))),
                None => Ok(ts_or_ds_to_date(this)),
            }
        });
        config.function("CHARINDEX", build_locate);
        config.function("LISTAGG", build_group_concat);
        config.function("RLIKE", |a, _| binary(Expression::RegexpLike, "RLIKE", a));
        config.function("GET_PATH", |a, _| binary(Expression::JsonExtract, "GET_PATH", a));
        config.function("JSON_EXTRACT_PATH_TEXT", |a, _| {
            binary(Expression::JsonExtractScalar, "JSON_EXTRACT_PATH_TEXT", a)
        });
        config.function("APPROX_PERCENTILE", |a, _| {
            binary(Expression::ApproxQuantile, "APPROX_PERCENTILE", a)
        });
        config.function("BITAND", |a, _| operator_from_function("BITAND", a, Expression::BitwiseAnd));
        config.function("BITOR", |a, _| operator_from_function("BITOR", a, Expression::BitwiseOr));
        config.function("BITXOR", |a, _| operator_from_function("BITXOR", a, Expression::BitwiseXor));
        config.function("BITSHIFTLEFT", |a, _| {
            operator_from_function("BITSHIFTLEFT", a, Expression::ShiftLeft)
        });
        config.function("BITSHIFTRIGHT", |a, _| {
            operator_from_function("BITSHIFTRIGHT", a, Expression::ShiftRight)
        });
        config.function("BITNOT", |args, _| {
            let [this] = take_args("BITNOT", args)?;
            Ok(Expression::BitwiseNot(Box::new(UnaryOp::new(this))))
        });
        config.function("RANDOM", |args, _| {
            check_arity("RANDOM", &args, 0, 1)?;
            Ok(Expression::Rand(Rand))
        });
        config.function("LEN", |a, _| unary(Expression::Length, "LEN", a));
    }

    fn generator_config(&self, config: &mut GeneratorConfig) {
        use ExpressionKind as K;

        config.string_escape = StringEscape::Backslash;
        config.null_ordering = NullOrdering::NullsAreLarge;
        config.nested_type_style = NestedTypeStyle::Parens;
        config.supports_distinct_on = false;
        config.supports_bucket_sample = false;
        config.supports_hive_clauses = false;
        config.properties_style = PropertiesStyle::Unsupported;
        config.time_mapping = TimeMapping::new(SNOWFLAKE_TIME_MAPPING);
        config.time_format = Some(DEFAULT_TIME_FORMAT.to_string());

        config.type_name(DataTypeKind::Text, "VARCHAR");
        config.type_name(DataTypeKind::Struct, "OBJECT");
        config.type_name(DataTypeKind::Map, "OBJECT");
        config.type_name(DataTypeKind::Json, "VARIANT");
        config.type_name(DataTypeKind::DateTime, "TIMESTAMP_NTZ");
        config.type_name(DataTypeKind::TimestampTz, "TIMESTAMP_TZ");
        config.type_name(DataTypeKind::TimestampLtz, "TIMESTAMP_LTZ");
        config.type_name(DataTypeKind::Blob, "BINARY");
        config.type_name(DataTypeKind::VarBinary, "BINARY");

        operator_as_function(config, K::BitwiseAnd, "BITAND");
        operator_as_function(config, K::BitwiseOr, "BITOR");
        operator_as_function(config, K::BitwiseXor, "BITXOR");
        operator_as_function(config, K::ShiftLeft, "BITSHIFTLEFT");
        operator_as_function(config, K::ShiftRight, "BITSHIFTRIGHT");
        config.transform(K::BitwiseNot, |g, e| {
            let Expression::BitwiseNot(op) = e else { return g.render_default(e) };
            g.render_function("BITNOT", &[&op.this])
        });

        config.rename(K::If, "IFF");
        config.rename(K::Array, "ARRAY_CONSTRUCT");
        config.rename(K::GroupConcat, "LISTAGG");
        config.rename(K::Rand, "RANDOM");
        config.rename(K::TsOrDsToDate, "TO_DATE");
        config.rename(K::UnixToTime, "TO_TIMESTAMP");
        config.rename(K::ApproxDistinct, "APPROX_COUNT_DISTINCT");
        config.rename(K::ApproxQuantile, "APPROX_PERCENTILE");
        config.rename(K::Explode, "FLATTEN");

        config.transform(K::ArrayContains, |g, e| {
            let Expression::ArrayContains(f) = e else { return g.render_default(e) };
            g.render_function("ARRAY_CONTAINS", &[&f.expression, &f.this])
        });
        config.transform(K::SetAgg, |g, e| {
            let Expression::SetAgg(f) = e else { return g.render_default(e) };
            g.write("ARRAY_AGG(");
            g.keyword("DISTINCT ");
            g.render(&f.this)?;
            g.write(")");
            Ok(())
        });
        config.transform(K::Quantile, |g, e| {
            let Expression::Quantile(f) = e else { return g.render_default(e) };
            render_percentile(g, f)
        });
        config.transform(K::StrPosition, |g, e| {
            let Expression::StrPosition(f) = e else { return g.render_default(e) };
            render_locate(g, "CHARINDEX", f)
        });
        config.transform(K::JsonExtract, |g, e| {
            let Expression::JsonExtract(f) = e else { return g.render_default(e) };
            g.render_function("GET_PATH", &[&f.this, &json_path(&f.expression)])
        });
        config.transform(K::JsonExtractScalar, |g, e| {
            let Expression::JsonExtractScalar(f) = e else { return g.render_default(e) };
            g.render_function("JSON_EXTRACT_PATH_TEXT", &[&f.this, &json_path(&f.expression)])
        });

        config.transform(K::DateAdd, |g, e| {
            let Expression::DateAdd(f) = e else { return g.render_default(e) };
            render_unit_first(g, "DATEADD", f.unit_or_day(), &[&f.expression, &f.this])
        });
        config.transform(K::DateSub, |g, e| {
            let Expression::DateSub(f) = e else { return g.render_default(e) };
            render_unit_first(g, "DATEADD", f.unit_or_day(), &[&negated(&f.expression), &f.this])
        });
        config.transform(K::TsOrDsAdd, |g, e| {
            let Expression::TsOrDsAdd(f) = e else { return g.render_default(e) };
            render_unit_first(g, "DATEADD", f.unit_or_day(), &[&f.expression, &as_date(&f.this)])
        });
        config.transform(K::DateDiff, |g, e| {
            let Expression::DateDiff(f) = e else { return g.render_default(e) };
            render_unit_first(g, "DATEDIFF", f.unit_or_day(), &[&f.expression, &f.this])
        });
        config.transform(K::TimeToStr, |g, e| {
            let Expression::TimeToStr(f) = e else { return g.render_default(e) };
            let format = format_or_default(g, f.format.as_ref());
            render_formatted(g, "TO_CHAR", &f.this, &format)
        });
        config.transform(K::StrToTime, |g, e| {
            let Expression::StrToTime(f) = e else { return g.render_default(e) };
            let format = format_or_default(g, f.format.as_ref());
            render_formatted(g, "TO_TIMESTAMP", &f.this, &format)
        });
        config.transform(K::StrToDate, |g, e| {
            let Expression::StrToDate(f) = e else { return g.render_default(e) };
            let format = format_or_default(g, f.format.as_ref());
            render_formatted(g, "TO_DATE", &f.this, &format)
        });
        config.transform(K::TimeToUnix, |g, e| {
            let Expression::TimeToUnix(f) = e else { return g.render_default(e) };
            render_unit_first(g, "DATE_PART", "EPOCH_SECOND", &[&f.this])
        });
        config.transform(K::StrToUnix, |g, e| {
            let Expression::StrToUnix(f) = e else { return g.render_default(e) };
            let parsed = Expression::StrToTime(f.clone());
            render_unit_first(g, "DATE_PART", "EPOCH_SECOND", &[&parsed])
        });
        config.transform(K::UnixToStr, |g, e| {
            let Expression::UnixToStr(f) = e else { return g.render_default(e) };
            let time = Expression::UnixToTime(Box::new(UnaryFunc::new(f.this.clone())));
            let format = format_or_default(g, f.format.as_ref());
            render_formatted(g, "TO_CHAR", &time, &format)
        });
        config.transform(K::Unnest, |g, e| {
            let Expression::Unnest(unnest) = e else { return g.render_default(e) };
            render_flatten(g, unnest)
        });
    }
}

/// JSONPath `$.a.b` as a Snowflake path `a.b`
fn json_path(path: &Expression) -> Expression {
    match path.as_string() {
        Some(p) => match p.strip_prefix("$.") {
            Some(rest) => Expression::string(rest),
            None if p == "$" => Expression::string(""),
            None => path.clone(),
        },
        None => path.clone(),
    }
}

/// `TABLE(FLATTEN(INPUT => x)) AS t(seq, key, path, index, value, this)`
///
/// FLATTEN yields six columns; the alias names the element column `VALUE`
/// and, for positional expansion, the `INDEX` column.
fn render_flatten(g: &mut Generator<'_>, unnest: &Unnest) -> Result<()> {
    let [argument] = unnest.expressions.as_slice() else {
        return Err(g.unsupported("FLATTEN of several arrays"));
    };
    g.keyword("TABLE(");
    g.write("FLATTEN(");
    g.keyword("INPUT");
    g.write(" => ");
    g.render(argument)?;
    g.write("))");

    let Some(alias) = &unnest.alias else {
        return Ok(());
    };
    let mut columns: Vec<Identifier> = ["seq", "key", "path", "index", "value", "this"]
        .into_iter()
        .map(Identifier::new)
        .collect();
    match (unnest.ordinality, alias.columns.as_slice()) {
        (_, []) => {}
        (_, [value]) => columns[4] = value.clone(),
        (true, [value, position]) => {
            columns[3] = position.clone();
            columns[4] = value.clone();
        }
        _ => return Err(g.unsupported("FLATTEN alias with these columns")),
    }
    let mut renamed = alias.clone();
    renamed.columns = columns;
    g.render_table_alias(&renamed);
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::dialects::{Dialect, DialectType};
    use crate::error::Error;

    fn snowflake_from(sql: &str, source: DialectType) -> String {
        let result = Dialect::get(source)
            .transpile_to(sql, &Dialect::get(DialectType::Snowflake), &Default::default())
            .expect("Transpile failed");
        result[0].clone()
    }

    #[test]
    fn test_identity() {
        for sql in [
            "SELECT IFF(a > 1, 'x', 'y')",
            "SELECT ARRAY_CONSTRUCT(1, 2)",
            "SELECT DATEADD(DAY, 1, x)",
            "SELECT DATEDIFF(MONTH, a, b)",
            "SELECT TO_CHAR(x, 'YYYY-MM-DD HH24:MI:SS')",
            "SELECT TRY_CAST(x AS INT)",
            "SELECT a FROM t QUALIFY ROW_NUMBER() OVER (PARTITION BY b ORDER BY c) = 1",
            "SELECT LISTAGG(a, ',') FROM t",
            "SELECT ARRAY_CONTAINS(1, x)",
            "SELECT BITAND(a, b)",
            "SELECT CHARINDEX('a', x)",
        ] {
            assert_eq!(snowflake_from(sql, DialectType::Snowflake), sql);
        }
    }

    #[test]
    fn test_lexical_rules() {
        assert_eq!(snowflake_from("SELECT $$it's$$", DialectType::Snowflake), "SELECT 'it\\'s'");
        assert_eq!(
            snowflake_from("SELECT a FROM x MINUS SELECT a FROM y", DialectType::Snowflake),
            "SELECT a FROM x EXCEPT SELECT a FROM y"
        );
    }

    #[test]
    fn test_from_hive() {
        assert_eq!(snowflake_from("SELECT IF(c, 1, 2)", DialectType::Hive), "SELECT IFF(c, 1, 2)");
        assert_eq!(snowflake_from("SELECT LOCATE('a', x)", DialectType::Hive), "SELECT CHARINDEX('a', x)");
        assert_eq!(snowflake_from("SELECT ARRAY(1, 2)", DialectType::Hive), "SELECT ARRAY_CONSTRUCT(1, 2)");
        assert_eq!(
            snowflake_from("SELECT ARRAY_CONTAINS(x, 1)", DialectType::Hive),
            "SELECT ARRAY_CONTAINS(1, x)"
        );
        assert_eq!(
            snowflake_from("SELECT DATE_ADD('2020-01-01', 1)", DialectType::Hive),
            "SELECT DATEADD(DAY, 1, CAST('2020-01-01' AS DATE))"
        );
        assert_eq!(
            snowflake_from("SELECT DATE_FORMAT(x, 'yyyy-MM-dd HH:mm')", DialectType::Hive),
            "SELECT TO_CHAR(x, 'YYYY-MM-DD HH24:MI')"
        );
        assert_eq!(
            snowflake_from("SELECT x & 1", DialectType::Hive),
            "SELECT BITAND(x, 1)"
        );
        assert_eq!(
            snowflake_from("SELECT GET_JSON_OBJECT(j, '$.a.b')", DialectType::Hive),
            "SELECT JSON_EXTRACT_PATH_TEXT(j, 'a.b')"
        );
    }

    #[test]
    fn test_lateral_view_flattens() {
        assert_eq!(
            snowflake_from("SELECT a FROM x LATERAL VIEW EXPLODE(y) t AS a", DialectType::Hive),
            "SELECT a FROM x CROSS JOIN TABLE(FLATTEN(INPUT => y)) AS t(seq, key, path, index, a, this)"
        );
        assert_eq!(
            snowflake_from("SELECT a FROM x LATERAL VIEW POSEXPLODE(y) t AS p, a", DialectType::Hive),
            "SELECT a FROM x CROSS JOIN TABLE(FLATTEN(INPUT => y)) AS t(seq, key, path, p, a, this)"
        );
    }

    #[test]
    fn test_from_mysql() {
        assert_eq!(
            snowflake_from("SELECT DATE_SUB(x, INTERVAL 2 DAY)", DialectType::MySQL),
            "SELECT DATEADD(DAY, 2 * -1, x)"
        );
        assert_eq!(
            snowflake_from("SELECT TIMESTAMPDIFF(HOUR, a, b)", DialectType::Snowflake),
            "SELECT DATEDIFF(HOUR, a, b)"
        );
    }

    #[test]
    fn test_types() {
        assert_eq!(
            snowflake_from("SELECT CAST(x AS MAP<STRING, INT>)", DialectType::Hive),
            "SELECT TRY_CAST(x AS OBJECT(VARCHAR, INT))"
        );
        assert_eq!(
            snowflake_from("SELECT CAST(x AS VARIANT)", DialectType::Snowflake),
            "SELECT CAST(x AS VARIANT)"
        );
    }

    #[test]
    fn test_distinct_on_unsupported() {
        let postgres = Dialect::get(DialectType::Postgres);
        let ast = postgres.parse("SELECT DISTINCT ON (a) a FROM t").expect("Parse failed");
        let err = Dialect::get(DialectType::Snowflake).generate(&ast[0]).unwrap_err();
        assert!(matches!(err, Error::Unsupported { .. }), "got {err:?}");
    }
}
