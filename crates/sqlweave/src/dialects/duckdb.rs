//! DuckDB Dialect
//!
//! DuckDB-specific function names and render transforms.
//! Key differences:
//! - strftime-style time formats, so formats pass through unchanged
//! - STRFTIME / STRPTIME / EPOCH / TO_TIMESTAMP for time conversion
//! - Date arithmetic with `INTERVAL` expressions instead of DATE_ADD
//! - LIST_VALUE array constructor, ARRAY_LENGTH, REGEXP_MATCHES
//! - ARRAY_REVERSE_SORT for descending sorts; no comparator lambdas
//! - `INT[]` array types
//! - No table properties and no Hive distribution clauses

use super::{
    flag_value, format_or_default, render_formatted, render_interval, render_strpos, unit_first_diff,
    unit_string, DialectImpl, DialectType, DEFAULT_DATE_FORMAT, DEFAULT_TIME_FORMAT,
};
use crate::error::Result;
use crate::expressions::{
    ArraySort, DataType, DataTypeKind, DateArith, Expression, ExpressionKind, FormatFunc, Function,
    UnaryFunc, VarArgFunc,
};
use crate::generator::{Generator, GeneratorConfig, NestedTypeStyle, PropertiesStyle};
use crate::parser::{
    binary, build_group_concat, format_func, take_args, unary, NormalizationStrategy, ParserConfig,
};
use crate::tokens::{TokenType, TokenizerConfig};

/// DuckDB dialect
pub struct DuckDBDialect;

impl DialectImpl for DuckDBDialect {
    fn dialect_type(&self) -> DialectType {
        DialectType::DuckDB
    }

    fn tokenizer_config(&self, config: &mut TokenizerConfig) {
        config.keywords.insert("PRAGMA".to_string(), TokenType::Command);
        config.keywords.insert("INSTALL".to_string(), TokenType::Command);
        config.keywords.insert("LOAD".to_string(), TokenType::Command);
    }

    fn parser_config(&self, config: &mut ParserConfig) {
        config.normalization = NormalizationStrategy::CaseInsensitive;
        config.time_format = Some(DEFAULT_TIME_FORMAT.to_string());

        config.function("REGEXP_MATCHES", |a, _| binary(Expression::RegexpLike, "REGEXP_MATCHES", a));
        config.function("ARRAY_LENGTH", |a, _| unary(Expression::ArraySize, "ARRAY_LENGTH", a));
        config.function("LIST_VALUE", |a, _| Ok(Expression::Array(Box::new(VarArgFunc::new(a)))));
        config.function("STRFTIME", |a, c| format_func(Expression::TimeToStr, "STRFTIME", a, c));
        config.function("STRPTIME", |a, c| format_func(Expression::StrToTime, "STRPTIME", a, c));
        config.function("EPOCH", |a, _| unary(Expression::TimeToUnix, "EPOCH", a));
        config.function("TO_TIMESTAMP", |a, _| unary(Expression::UnixToTime, "TO_TIMESTAMP", a));
        config.function("ARRAY_REVERSE_SORT", |a, _| {
            let [this] = take_args("ARRAY_REVERSE_SORT", a)?;
            Ok(Expression::ArraySort(Box::new(ArraySort {
                this,
                asc: Some(Expression::boolean(false)),
                comparator: None,
            })))
        });
        config.function("DATE_DIFF", |args, _| unit_first_diff("DATE_DIFF", args));
        config.function("STRING_AGG", build_group_concat);
    }

    fn generator_config(&self, config: &mut GeneratorConfig) {
        use ExpressionKind as K;

        config.nested_type_style = NestedTypeStyle::Postfix;
        config.properties_style = PropertiesStyle::Unsupported;
        config.supports_bucket_sample = false;
        config.supports_hive_clauses = false;
        config.time_format = Some(DEFAULT_TIME_FORMAT.to_string());

        config.type_name(DataTypeKind::Float, "REAL");
        config.type_name(DataTypeKind::Binary, "BLOB");
        config.type_name(DataTypeKind::VarBinary, "BLOB");
        config.type_name(DataTypeKind::DateTime, "TIMESTAMP");
        config.type_name(DataTypeKind::Variant, "JSON");

        config.rename(K::RegexpLike, "REGEXP_MATCHES");
        config.rename(K::ArraySize, "ARRAY_LENGTH");
        config.rename(K::Array, "LIST_VALUE");
        config.rename(K::ApproxDistinct, "APPROX_COUNT_DISTINCT");
        config.rename(K::JsonExtractScalar, "JSON_EXTRACT_STRING");
        config.rename(K::GroupConcat, "STRING_AGG");
        config.rename(K::Explode, "UNNEST");
        config.rename(K::Rand, "RANDOM");
        config.rename(K::TimeToUnix, "EPOCH");

        config.transform(K::SetAgg, |g, e| {
            let Expression::SetAgg(f) = e else { return g.render_default(e) };
            let mut distinct = Function::new("ARRAY_AGG", vec![f.this.clone()]);
            distinct.distinct = true;
            g.render(&Expression::Function(Box::new(distinct)))
        });
        config.transform(K::StrPosition, |g, e| {
            let Expression::StrPosition(f) = e else { return g.render_default(e) };
            render_strpos(g, f)
        });
        config.transform(K::ArraySort, |g, e| {
            let Expression::ArraySort(f) = e else { return g.render_default(e) };
            if f.comparator.is_some() {
                return Err(g.unsupported("ARRAY_SORT with a comparator"));
            }
            match f.asc.as_ref().map(flag_value) {
                Some(Some(false)) => g.render_function("ARRAY_REVERSE_SORT", &[&f.this]),
                Some(None) => Err(g.unsupported("SORT_ARRAY with a non-literal direction")),
                _ => g.render_function("ARRAY_SORT", &[&f.this]),
            }
        });

        config.transform(K::TsOrDsToDate, |g, e| {
            let Expression::TsOrDsToDate(f) = e else { return g.render_default(e) };
            g.render(&as_date(&f.this))
        });
        config.transform(K::TsOrDsAdd, |g, e| {
            let Expression::TsOrDsAdd(f) = e else { return g.render_default(e) };
            render_interval_arith(g, &as_date(&f.this), "+", f)
        });
        config.transform(K::DateAdd, |g, e| {
            let Expression::DateAdd(f) = e else { return g.render_default(e) };
            render_interval_arith(g, &f.this, "+", f)
        });
        config.transform(K::DateSub, |g, e| {
            let Expression::DateSub(f) = e else { return g.render_default(e) };
            render_interval_arith(g, &f.this, "-", f)
        });
        config.transform(K::DateDiff, |g, e| {
            let Expression::DateDiff(f) = e else { return g.render_default(e) };
            let unit = unit_string(&f.unit_or_day().to_lowercase());
            g.render_function("DATE_DIFF", &[&unit, &f.expression, &f.this])
        });
        config.transform(K::TimeToStr, |g, e| {
            let Expression::TimeToStr(f) = e else { return g.render_default(e) };
            let format = format_or_default(g, f.format.as_ref());
            render_formatted(g, "STRFTIME", &f.this, &format)
        });
        config.transform(K::StrToTime, |g, e| {
            let Expression::StrToTime(f) = e else { return g.render_default(e) };
            let format = format_or_default(g, f.format.as_ref());
            render_formatted(g, "STRPTIME", &f.this, &format)
        });
        config.transform(K::StrToDate, |g, e| {
            let Expression::StrToDate(f) = e else { return g.render_default(e) };
            let format = f.format.clone().unwrap_or_else(|| Expression::string(DEFAULT_DATE_FORMAT));
            let parsed = Expression::StrToTime(Box::new(FormatFunc::new(f.this.clone(), Some(format))));
            g.render(&Expression::cast(parsed, DataType::new(DataTypeKind::Date)))
        });
        config.transform(K::StrToUnix, |g, e| {
            let Expression::StrToUnix(f) = e else { return g.render_default(e) };
            let parsed = Expression::StrToTime(f.clone());
            g.render_function("EPOCH", &[&parsed])
        });
        config.transform(K::UnixToTime, |g, e| {
            let Expression::UnixToTime(f) = e else { return g.render_default(e) };
            g.render_function("TO_TIMESTAMP", &[&as_bigint(&f.this)])
        });
        config.transform(K::UnixToStr, |g, e| {
            let Expression::UnixToStr(f) = e else { return g.render_default(e) };
            let time = Expression::UnixToTime(Box::new(UnaryFunc::new(f.this.clone())));
            let format = format_or_default(g, f.format.as_ref());
            render_formatted(g, "STRFTIME", &time, &format)
        });
    }
}

fn as_date(this: &Expression) -> Expression {
    Expression::cast(this.clone(), DataType::new(DataTypeKind::Date))
}

fn as_bigint(this: &Expression) -> Expression {
    Expression::cast(this.clone(), DataType::new(DataTypeKind::BigInt))
}

/// `this + INTERVAL n UNIT`
fn render_interval_arith(g: &mut Generator<'_>, this: &Expression, operator: &str, f: &DateArith) -> Result<()> {
    g.render(this)?;
    g.write(" ");
    g.write(operator);
    g.write(" ");
    render_interval(g, &f.expression, f.unit_or_day())
}

#[cfg(test)]
mod tests {
    use crate::dialects::{Dialect, DialectType};
    use crate::error::Error;

    fn duckdb_from(sql: &str, source: DialectType) -> String {
        let result = Dialect::get(source)
            .transpile_to(sql, &Dialect::get(DialectType::DuckDB), &Default::default())
            .expect("Transpile failed");
        result[0].clone()
    }

    #[test]
    fn test_identity() {
        for sql in [
            "SELECT STRFTIME(x, '%Y-%m-%d')",
            "SELECT STRPTIME(x, '%Y')",
            "SELECT EPOCH(x)",
            "SELECT ARRAY_LENGTH(x)",
            "SELECT REGEXP_MATCHES(a, 'x')",
            "SELECT ARRAY_REVERSE_SORT(x)",
            "SELECT DATE_DIFF('day', a, b)",
            "SELECT a FROM t QUALIFY ROW_NUMBER() OVER (ORDER BY a) = 1",
        ] {
            assert_eq!(duckdb_from(sql, DialectType::DuckDB), sql);
        }
    }

    #[test]
    fn test_hive_time_functions() {
        assert_eq!(
            duckdb_from("SELECT DATE_ADD('2020-01-01', 1)", DialectType::Hive),
            "SELECT CAST('2020-01-01' AS DATE) + INTERVAL 1 DAY"
        );
        assert_eq!(
            duckdb_from("SELECT DATE_SUB('2020-01-01', 1)", DialectType::Hive),
            "SELECT CAST('2020-01-01' AS DATE) + INTERVAL (1 * -1) DAY"
        );
        assert_eq!(
            duckdb_from("SELECT UNIX_TIMESTAMP(x)", DialectType::Hive),
            "SELECT EPOCH(STRPTIME(x, '%Y-%m-%d %H:%M:%S'))"
        );
        assert_eq!(
            duckdb_from("SELECT FROM_UNIXTIME(x, \"yyyy-MM-dd'T'HH\")", DialectType::Hive),
            "SELECT STRFTIME(TO_TIMESTAMP(CAST(x AS BIGINT)), '%Y-%m-%d''T''%H')"
        );
    }

    #[test]
    fn test_array_types_postfix() {
        assert_eq!(
            duckdb_from("SELECT CAST(x AS ARRAY<INT>)", DialectType::Generic),
            "SELECT CAST(x AS INT[])"
        );
    }

    #[test]
    fn test_set_agg_as_distinct_array_agg() {
        assert_eq!(
            duckdb_from("SELECT COLLECT_SET(x)", DialectType::Hive),
            "SELECT ARRAY_AGG(DISTINCT x)"
        );
    }

    #[test]
    fn test_comparator_sort_unsupported() {
        let presto = Dialect::get(DialectType::Presto);
        let ast = presto
            .parse("SELECT ARRAY_SORT(x, (a, b) -> 0)")
            .expect("Parse failed");
        let err = Dialect::get(DialectType::DuckDB).generate(&ast[0]).unwrap_err();
        assert!(matches!(err, Error::Unsupported { .. }), "got {err:?}");
    }
}
