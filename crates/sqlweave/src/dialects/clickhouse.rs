//! ClickHouse Dialect
//!
//! ClickHouse names are case-sensitive and most functions are camelCase.
//! Key differences:
//! - Int32 / Int64 / Float64 / String style type names, `Array(T)` nesting
//! - groupArray, groupUniqArray, uniq, has, length, arrayJoin
//! - Parametric aggregates: `quantile(0.5)(x)`
//! - `ARRAY JOIN x AS a` instead of lateral views
//! - formatDateTime with `%i` minutes, `dateDiff('unit', a, b)`
//! - NULLs sort last in both directions
//! - accurateCastOrNull for TRY_CAST

use super::{
    bracket_arrays, format_or_default, render_formatted, render_interleaved_map, render_unit_first,
    unit_first, unit_first_diff, unit_string, DialectImpl, DialectType, DEFAULT_TIME_FORMAT,
};
use crate::error::Result;
use crate::expressions::{
    BinaryFunc, DataTypeKind, Expression, ExpressionKind, FormatFunc, StrPosition, UnaryFunc,
};
use crate::generator::{Generator, GeneratorConfig, LateralStyle, NestedTypeStyle, PropertiesStyle};
use crate::parser::{
    binary, build_map_from_pairs, check_arity, format_func, ts_or_ds_to_date, unary,
    NormalizationStrategy, NullOrdering, ParserConfig,
};
use crate::time::TimeMapping;
use crate::tokens::TokenizerConfig;

/// formatDateTime uses `%i` for minutes and `%M` for the month name
const CLICKHOUSE_TIME_MAPPING: &[(&str, &str)] = &[("%i", "%M"), ("%M", "%B")];

/// ClickHouse dialect
pub struct ClickHouseDialect;

impl DialectImpl for ClickHouseDialect {
    fn dialect_type(&self) -> DialectType {
        DialectType::ClickHouse
    }

    fn tokenizer_config(&self, config: &mut TokenizerConfig) {
        config.identifiers.insert('`', '`');
        config.string_escapes = vec!['\'', '\\'];
    }

    fn parser_config(&self, config: &mut ParserConfig) {
        config.normalization = NormalizationStrategy::CaseSensitive;
        config.null_ordering = NullOrdering::NullsAreLast;
        config.log_defaults_to_ln = true;
        config.time_mapping = TimeMapping::new(CLICKHOUSE_TIME_MAPPING);
        config.time_format = Some(DEFAULT_TIME_FORMAT.to_string());
        for (name, kind) in [
            ("INT8", DataTypeKind::TinyInt),
            ("INT16", DataTypeKind::SmallInt),
            ("INT32", DataTypeKind::Int),
            ("INT64", DataTypeKind::BigInt),
            ("FLOAT32", DataTypeKind::Float),
            ("FLOAT64", DataTypeKind::Double),
            ("STRING", DataTypeKind::Text),
            ("FIXEDSTRING", DataTypeKind::Char),
            ("BOOL", DataTypeKind::Boolean),
            ("DATETIME", DataTypeKind::DateTime),
            ("DATETIME64", DataTypeKind::Timestamp),
            ("TUPLE", DataTypeKind::Struct),
        ] {
            config.type_names.insert(name.to_string(), kind);
        }

        config.function("groupArray", |a, _| unary(Expression::ArrayAgg, "groupArray", a));
        config.function("groupUniqArray", |a, _| unary(Expression::SetAgg, "groupUniqArray", a));
        config.function("uniq", |a, _| unary(Expression::ApproxDistinct, "uniq", a));
        config.function("has", |a, _| binary(Expression::ArrayContains, "has", a));
        config.function("arrayJoin", |a, _| unary(Expression::Explode, "arrayJoin", a));
        config.function("match", |a, _| binary(Expression::RegexpLike, "match", a));
        // Parametric forms arrive as (args..., params...)
        config.function("quantile", |a, _| binary(Expression::ApproxQuantile, "quantile", a));
        config.function("quantileExact", |a, _| binary(Expression::Quantile, "quantileExact", a));
        config.function("map", build_map_from_pairs);
        config.function("toDate", |args, _| {
            check_arity("toDate", &args, 1, 1)?;
            Ok(ts_or_ds_to_date(args.into_iter().next().unwrap_or_else(Expression::null)))
        });
        config.function("toUnixTimestamp", |a, _| unary(Expression::TimeToUnix, "toUnixTimestamp", a));
        config.function("fromUnixTimestamp", |a, _| {
            unary(Expression::UnixToTime, "fromUnixTimestamp", a)
        });
        config.function("formatDateTime", |a, c| format_func(Expression::TimeToStr, "formatDateTime", a, c));
        config.function("parseDateTime", |a, c| format_func(Expression::StrToTime, "parseDateTime", a, c));
        config.function("toDayOfMonth", |a, _| unary(Expression::Day, "toDayOfMonth", a));
        config.function("toMonth", |a, _| unary(Expression::Month, "toMonth", a));
        config.function("toYear", |a, _| unary(Expression::Year, "toYear", a));
        config.function("dateDiff", |a, _| unit_first_diff("dateDiff", a));
        config.function("dateAdd", |a, _| unit_first("dateAdd", a, Expression::DateAdd));
        config.function("dateSub", |a, _| unit_first("dateSub", a, Expression::DateSub));
    }

    fn generator_config(&self, config: &mut GeneratorConfig) {
        use ExpressionKind as K;

        config.null_ordering = NullOrdering::NullsAreLast;
        config.nested_type_style = NestedTypeStyle::Parens;
        config.lateral_style = LateralStyle::ArrayJoin;
        config.supports_qualify = false;
        config.supports_try_cast = true;
        config.supports_bucket_sample = false;
        config.supports_hive_clauses = false;
        config.properties_style = PropertiesStyle::Unsupported;
        config.time_mapping = TimeMapping::new(CLICKHOUSE_TIME_MAPPING);
        config.time_format = Some(DEFAULT_TIME_FORMAT.to_string());

        for (kind, name) in [
            (DataTypeKind::Boolean, "Bool"),
            (DataTypeKind::TinyInt, "Int8"),
            (DataTypeKind::SmallInt, "Int16"),
            (DataTypeKind::Int, "Int32"),
            (DataTypeKind::BigInt, "Int64"),
            (DataTypeKind::Float, "Float32"),
            (DataTypeKind::Double, "Float64"),
            (DataTypeKind::Decimal, "Decimal"),
            (DataTypeKind::Char, "FixedString"),
            (DataTypeKind::VarChar, "String"),
            (DataTypeKind::NChar, "FixedString"),
            (DataTypeKind::NVarChar, "String"),
            (DataTypeKind::Text, "String"),
            (DataTypeKind::Binary, "String"),
            (DataTypeKind::VarBinary, "String"),
            (DataTypeKind::Blob, "String"),
            (DataTypeKind::Json, "JSON"),
            (DataTypeKind::Uuid, "UUID"),
            (DataTypeKind::Date, "Date"),
            (DataTypeKind::DateTime, "DateTime"),
            (DataTypeKind::Timestamp, "DateTime64"),
            (DataTypeKind::TimestampTz, "DateTime64"),
            (DataTypeKind::TimestampLtz, "DateTime64"),
            (DataTypeKind::Array, "Array"),
            (DataTypeKind::Map, "Map"),
            (DataTypeKind::Struct, "Tuple"),
        ] {
            config.type_name(kind, name);
        }

        bracket_arrays(config, "");
        config.rename(K::ArrayAgg, "groupArray");
        config.rename(K::SetAgg, "groupUniqArray");
        config.rename(K::ApproxDistinct, "uniq");
        config.rename(K::ArrayContains, "has");
        config.rename(K::ArraySize, "length");
        config.rename(K::Length, "length");
        config.rename(K::Explode, "arrayJoin");
        config.rename(K::RegexpLike, "match");
        config.rename(K::Rand, "rand");
        config.rename(K::TsOrDsToDate, "toDate");
        config.rename(K::TimeToUnix, "toUnixTimestamp");
        config.rename(K::UnixToTime, "fromUnixTimestamp");
        config.rename(K::Day, "toDayOfMonth");
        config.rename(K::Month, "toMonth");
        config.rename(K::Year, "toYear");

        config.transform(K::Map, |g, e| {
            let Expression::Map(map) = e else { return g.render_default(e) };
            render_interleaved_map(g, "map", map)
        });
        config.transform(K::TryCast, |g, e| {
            let Expression::TryCast(cast) = e else { return g.render_default(e) };
            g.write("accurateCastOrNull(");
            g.render(&cast.this)?;
            g.write(", '");
            g.render_data_type(&cast.to)?;
            g.write("')");
            Ok(())
        });
        config.transform(K::Quantile, |g, e| {
            let Expression::Quantile(f) = e else { return g.render_default(e) };
            render_parametric(g, "quantileExact", f)
        });
        config.transform(K::ApproxQuantile, |g, e| {
            let Expression::ApproxQuantile(f) = e else { return g.render_default(e) };
            render_parametric(g, "quantile", f)
        });
        config.transform(K::GroupConcat, |g, e| {
            let Expression::GroupConcat(f) = e else { return g.render_default(e) };
            let name = if f.distinct { "groupUniqArray" } else { "groupArray" };
            let collected = Expression::func(name, vec![f.this.clone()]);
            let mut args = vec![&collected];
            args.extend(f.separator.as_ref());
            g.render_function("arrayStringConcat", &args)
        });
        config.transform(K::StrPosition, |g, e| {
            let Expression::StrPosition(f) = e else { return g.render_default(e) };
            render_position(g, f)
        });

        config.transform(K::DateAdd, |g, e| {
            let Expression::DateAdd(f) = e else { return g.render_default(e) };
            render_unit_first(g, "dateAdd", f.unit_or_day(), &[&f.expression, &f.this])
        });
        config.transform(K::DateSub, |g, e| {
            let Expression::DateSub(f) = e else { return g.render_default(e) };
            render_unit_first(g, "dateSub", f.unit_or_day(), &[&f.expression, &f.this])
        });
        config.transform(K::TsOrDsAdd, |g, e| {
            let Expression::TsOrDsAdd(f) = e else { return g.render_default(e) };
            let date = ts_or_ds_to_date(f.this.clone());
            render_unit_first(g, "dateAdd", f.unit_or_day(), &[&f.expression, &date])
        });
        config.transform(K::DateDiff, |g, e| {
            let Expression::DateDiff(f) = e else { return g.render_default(e) };
            let unit = unit_string(&f.unit_or_day().to_lowercase());
            g.render_function("dateDiff", &[&unit, &f.expression, &f.this])
        });
        config.transform(K::TimeToStr, |g, e| {
            let Expression::TimeToStr(f) = e else { return g.render_default(e) };
            let format = format_or_default(g, f.format.as_ref());
            render_formatted(g, "formatDateTime", &f.this, &format)
        });
        config.transform(K::StrToTime, |g, e| {
            let Expression::StrToTime(f) = e else { return g.render_default(e) };
            let format = format_or_default(g, f.format.as_ref());
            render_formatted(g, "parseDateTime", &f.this, &format)
        });
        config.transform(K::StrToDate, |g, e| {
            let Expression::StrToDate(f) = e else { return g.render_default(e) };
            let parsed = Expression::StrToTime(f.clone());
            g.render_function("toDate", &[&parsed])
        });
        config.transform(K::StrToUnix, |g, e| {
            let Expression::StrToUnix(f) = e else { return g.render_default(e) };
            let parsed = Expression::StrToTime(f.clone());
            g.render_function("toUnixTimestamp", &[&parsed])
        });
        config.transform(K::UnixToStr, |g, e| {
            let Expression::UnixToStr(f) = e else { return g.render_default(e) };
            let time = Expression::UnixToTime(Box::new(UnaryFunc::new(f.this.clone())));
            let parsed = FormatFunc::new(time, f.format.clone());
            let format = format_or_default(g, parsed.format.as_ref());
            render_formatted(g, "formatDateTime", &parsed.this, &format)
        });
    }
}

/// `name(param)(x)`
fn render_parametric(g: &mut Generator<'_>, name: &str, f: &BinaryFunc) -> Result<()> {
    g.render_function(name, &[&f.expression])?;
    g.write("(");
    g.render(&f.this)?;
    g.write(")");
    Ok(())
}

/// `position(haystack, needle[, start])`
fn render_position(g: &mut Generator<'_>, f: &StrPosition) -> Result<()> {
    let mut args = vec![&f.this, &f.substr];
    args.extend(f.position.as_ref());
    g.render_function("position", &args)
}

#[cfg(test)]
mod tests {
    use crate::dialects::{Dialect, DialectType};
    use crate::error::Error;

    fn clickhouse_from(sql: &str, source: DialectType) -> String {
        let result = Dialect::get(source)
            .transpile_to(sql, &Dialect::get(DialectType::ClickHouse), &Default::default())
            .expect("Transpile failed");
        result[0].clone()
    }

    #[test]
    fn test_identity() {
        for sql in [
            "SELECT groupArray(a) FROM t",
            "SELECT uniq(a) FROM t",
            "SELECT has([1, 2], x)",
            "SELECT quantile(0.5)(x) FROM t",
            "SELECT formatDateTime(x, '%Y-%m-%d %H:%i:%S')",
            "SELECT toUnixTimestamp(x)",
            "SELECT dateDiff('hour', a, b)",
            "SELECT position(x, 'a')",
            "SELECT CAST(x AS Int32)",
        ] {
            assert_eq!(clickhouse_from(sql, DialectType::ClickHouse), sql);
        }
    }

    #[test]
    fn test_from_hive() {
        assert_eq!(
            clickhouse_from("SELECT COLLECT_SET(a) FROM t", DialectType::Hive),
            "SELECT groupUniqArray(a) FROM t"
        );
        assert_eq!(
            clickhouse_from("SELECT PERCENTILE(x, 0.5) FROM t", DialectType::Hive),
            "SELECT quantileExact(0.5)(x) FROM t"
        );
        assert_eq!(clickhouse_from("SELECT SIZE(x)", DialectType::Hive), "SELECT length(x)");
        assert_eq!(
            clickhouse_from("SELECT CAST(x AS MAP<STRING, BIGINT>)", DialectType::Hive),
            "SELECT accurateCastOrNull(x, 'Map(String, Int64)')"
        );
        assert_eq!(
            clickhouse_from("SELECT DATE_FORMAT(x, 'yyyy-MM-dd HH:mm')", DialectType::Hive),
            "SELECT formatDateTime(x, '%Y-%m-%d %H:%i')"
        );
        assert_eq!(clickhouse_from("SELECT MAP('a', 1)", DialectType::Hive), "SELECT map('a', 1)");
    }

    #[test]
    fn test_array_join() {
        assert_eq!(
            clickhouse_from("SELECT a FROM x LATERAL VIEW EXPLODE(y) t AS a", DialectType::Hive),
            "SELECT a FROM x ARRAY JOIN y AS a"
        );
        assert_eq!(
            clickhouse_from("SELECT a FROM x LATERAL VIEW OUTER EXPLODE(y) t AS a", DialectType::Hive),
            "SELECT a FROM x LEFT ARRAY JOIN y AS a"
        );
    }

    #[test]
    fn test_string_aggregation() {
        assert_eq!(
            clickhouse_from("SELECT GROUP_CONCAT(a SEPARATOR ',') FROM t", DialectType::MySQL),
            "SELECT arrayStringConcat(groupArray(a), ',') FROM t"
        );
    }

    #[test]
    fn test_null_ordering() {
        assert_eq!(
            clickhouse_from("SELECT a FROM t ORDER BY a DESC", DialectType::Postgres),
            "SELECT a FROM t ORDER BY a DESC NULLS FIRST"
        );
        assert_eq!(
            clickhouse_from("SELECT a FROM t ORDER BY a", DialectType::Postgres),
            "SELECT a FROM t ORDER BY a"
        );
    }

    #[test]
    fn test_try_cast() {
        assert_eq!(
            clickhouse_from("SELECT TRY_CAST(x AS INT)", DialectType::Snowflake),
            "SELECT accurateCastOrNull(x, 'Int32')"
        );
    }

    #[test]
    fn test_unknown_parametric_aggregate() {
        let err = Dialect::get(DialectType::ClickHouse)
            .parse("SELECT topK(3)(x) FROM t")
            .unwrap_err();
        assert!(matches!(err, Error::Parse { .. }), "got {err:?}");
    }
}
