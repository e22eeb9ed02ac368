//! Apache Drill Dialect
//!
//! Drill queries files and nested data with a Calcite-derived grammar.
//! Key differences:
//! - Backticks for identifiers, backslash escapes in strings
//! - TO_CHAR / TO_TIMESTAMP / TO_DATE with Joda-style `yyyy-MM-dd` patterns
//! - FLATTEN for arrays, REPEATED_CONTAINS for membership
//! - No IF(), QUALIFY, DISTINCT ON or TRY_CAST

use super::hive::HIVE_TIME_MAPPING;
use super::postgres::as_date;
use super::{
    format_or_default, interval_arith, render_formatted, render_if_as_case, render_interval_call,
    DialectImpl, DialectType, DEFAULT_TIME_FORMAT,
};
use crate::expressions::{DataTypeKind, Expression, ExpressionKind};
use crate::generator::{GeneratorConfig, PropertiesStyle, StringEscape};
use crate::parser::{
    binary, check_arity, format_func, ts_or_ds_to_date, unary, NormalizationStrategy, ParserConfig,
};
use crate::time::TimeMapping;
use crate::tokens::TokenizerConfig;

/// Apache Drill dialect
pub struct DrillDialect;

impl DialectImpl for DrillDialect {
    fn dialect_type(&self) -> DialectType {
        DialectType::Drill
    }

    fn tokenizer_config(&self, config: &mut TokenizerConfig) {
        config.identifiers.clear();
        config.identifiers.insert('`', '`');
        config.string_escapes = vec!['\\'];
    }

    fn parser_config(&self, config: &mut ParserConfig) {
        config.normalization = NormalizationStrategy::CaseInsensitive;
        config.time_mapping = TimeMapping::new(HIVE_TIME_MAPPING);
        config.time_format = Some(DEFAULT_TIME_FORMAT.to_string());

        config.function("TO_CHAR", |a, c| format_func(Expression::TimeToStr, "TO_CHAR", a, c));
        config.function("TO_TIMESTAMP", |args, c| {
            if args.len() == 1 {
                return unary(Expression::UnixToTime, "TO_TIMESTAMP", args);
            }
            format_func(Expression::StrToTime, "TO_TIMESTAMP", args, c)
        });
        config.function("TO_DATE", |args, c| {
            check_arity("TO_DATE", &args, 1, 2)?;
            if args.len() == 1 {
                return Ok(ts_or_ds_to_date(args.into_iter().next().unwrap_or_else(Expression::null)));
            }
            format_func(Expression::StrToDate, "TO_DATE", args, c)
        });
        config.function("DATE_ADD", |a, _| interval_arith("DATE_ADD", a, Expression::DateAdd));
        config.function("DATE_SUB", |a, _| interval_arith("DATE_SUB", a, Expression::DateSub));
        config.function("FLATTEN", |a, _| unary(Expression::Explode, "FLATTEN", a));
        config.function("REPEATED_CONTAINS", |a, _| {
            binary(Expression::ArrayContains, "REPEATED_CONTAINS", a)
        });
        config.function("REPEATED_COUNT", |a, _| unary(Expression::ArraySize, "REPEATED_COUNT", a));
        config.function("REGEXP_MATCHES", |a, _| binary(Expression::RegexpLike, "REGEXP_MATCHES", a));
    }

    fn generator_config(&self, config: &mut GeneratorConfig) {
        use ExpressionKind as K;

        config.set_identifier_quotes('`', '`');
        config.string_escape = StringEscape::Backslash;
        config.supports_qualify = false;
        config.supports_distinct_on = false;
        config.supports_try_cast = false;
        config.supports_bucket_sample = false;
        config.supports_hive_clauses = false;
        config.properties_style = PropertiesStyle::Unsupported;
        config.time_mapping = TimeMapping::new(HIVE_TIME_MAPPING);
        config.time_format = Some(DEFAULT_TIME_FORMAT.to_string());

        config.type_name(DataTypeKind::Int, "INTEGER");
        config.type_name(DataTypeKind::Text, "VARCHAR");
        config.type_name(DataTypeKind::Binary, "VARBINARY");
        config.type_name(DataTypeKind::Blob, "VARBINARY");
        config.type_name(DataTypeKind::DateTime, "TIMESTAMP");

        config.rename(K::Explode, "FLATTEN");
        config.rename(K::ArrayContains, "REPEATED_CONTAINS");
        config.rename(K::ArraySize, "REPEATED_COUNT");
        config.rename(K::RegexpLike, "REGEXP_MATCHES");
        config.rename(K::UnixToTime, "TO_TIMESTAMP");
        config.rename(K::TimeToUnix, "UNIX_TIMESTAMP");

        config.transform(K::If, |g, e| {
            let Expression::If(f) = e else { return g.render_default(e) };
            render_if_as_case(g, f)
        });
        config.transform(K::TsOrDsToDate, |g, e| {
            let Expression::TsOrDsToDate(f) = e else { return g.render_default(e) };
            g.render(&as_date(&f.this))
        });
        config.transform(K::DateAdd, |g, e| {
            let Expression::DateAdd(f) = e else { return g.render_default(e) };
            render_interval_call(g, "DATE_ADD", &f.this, f)
        });
        config.transform(K::DateSub, |g, e| {
            let Expression::DateSub(f) = e else { return g.render_default(e) };
            render_interval_call(g, "DATE_SUB", &f.this, f)
        });
        config.transform(K::TsOrDsAdd, |g, e| {
            let Expression::TsOrDsAdd(f) = e else { return g.render_default(e) };
            render_interval_call(g, "DATE_ADD", &as_date(&f.this), f)
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
        config.transform(K::StrToUnix, |g, e| {
            let Expression::StrToUnix(f) = e else { return g.render_default(e) };
            let format = format_or_default(g, f.format.as_ref());
            render_formatted(g, "UNIX_TIMESTAMP", &f.this, &format)
        });
    }
}

#[cfg(test)]
mod tests {
    use crate::dialects::{Dialect, DialectType};

    fn drill_from(sql: &str, source: DialectType) -> String {
        let result = Dialect::get(source)
            .transpile_to(sql, &Dialect::get(DialectType::Drill), &Default::default())
            .expect("Transpile failed");
        result[0].clone()
    }

    #[test]
    fn test_identity() {
        for sql in [
            "SELECT `a b` FROM dfs.`/tmp/data.json`",
            "SELECT TO_TIMESTAMP(x, 'yyyy-MM-dd HH:mm:ss')",
            "SELECT TO_CHAR(x, 'yyyy-MM-dd')",
            "SELECT REPEATED_CONTAINS(x, 1)",
            "SELECT FLATTEN(x) FROM t",
            "SELECT DATE_ADD(x, INTERVAL 1 DAY)",
        ] {
            assert_eq!(drill_from(sql, DialectType::Drill), sql);
        }
    }

    #[test]
    fn test_from_hive() {
        assert_eq!(
            drill_from("SELECT DATE_FORMAT(x, 'yyyy-MM-dd')", DialectType::Hive),
            "SELECT TO_CHAR(x, 'yyyy-MM-dd')"
        );
        assert_eq!(drill_from("SELECT EXPLODE(x) FROM t", DialectType::Hive), "SELECT FLATTEN(x) FROM t");
        assert_eq!(
            drill_from("SELECT IF(c, 1, 2)", DialectType::Hive),
            "SELECT CASE WHEN c THEN 1 ELSE 2 END"
        );
        assert_eq!(
            drill_from("SELECT TO_DATE(x)", DialectType::Hive),
            "SELECT CAST(x AS DATE)"
        );
    }
}
