//! T-SQL (SQL Server) Dialect
//!
//! Key differences:
//! - `[ ]` or `"` quoted identifiers, rendered with brackets
//! - `SELECT TOP n`, falling back to `OFFSET .. FETCH` when an offset is present
//! - `+` for string concatenation, IIF for IF, ISNULL / LEN / CHARINDEX
//! - DATEADD / DATEDIFF / DATEPART with bare unit keywords
//! - FORMAT with .NET date patterns, STRING_AGG
//! - No boolean literals, NULLS FIRST/LAST, QUALIFY or arrays

use super::postgres::{as_date, extract};
use super::{
    format_or_default, is_default_format, negated, operator_as_infix, render_formatted,
    render_locate, render_unit_first, unit_first, unit_first_diff, DialectImpl, DialectType,
};
use crate::error::Result;
use crate::expressions::{
    CurrentTimestamp, DataType, DataTypeKind, Expression, ExpressionKind, FormatFunc, VarArgFunc,
};
use crate::generator::{Generator, GeneratorConfig, LimitStyle, PropertiesStyle};
use crate::parser::{
    build_group_concat, build_locate, format_func, take_args, unary, unit_name, NormalizationStrategy,
    ParserConfig,
};
use crate::time::TimeMapping;
use crate::tokens::{TokenType, TokenizerConfig};

const EPOCH: &str = "1970-01-01";

/// .NET custom date and time format specifiers
const TSQL_TIME_MAPPING: &[(&str, &str)] = &[
    ("yyyy", "%Y"),
    ("yy", "%y"),
    ("MMMM", "%B"),
    ("MMM", "%b"),
    ("MM", "%m"),
    ("dddd", "%A"),
    ("ddd", "%a"),
    ("dd", "%d"),
    ("HH", "%H"),
    ("hh", "%I"),
    ("mm", "%M"),
    ("ss", "%S"),
    ("ffffff", "%f"),
    ("tt", "%p"),
];

/// T-SQL dialect
pub struct TSQLDialect;

impl DialectImpl for TSQLDialect {
    fn dialect_type(&self) -> DialectType {
        DialectType::TSQL
    }

    fn tokenizer_config(&self, config: &mut TokenizerConfig) {
        config.identifiers.insert('[', ']');
        config.keywords.insert("TOP".to_string(), TokenType::Top);
    }

    fn parser_config(&self, config: &mut ParserConfig) {
        config.normalization = NormalizationStrategy::CaseInsensitive;
        config.time_mapping = TimeMapping::new(TSQL_TIME_MAPPING);
        for (name, kind) in [
            ("BIT", DataTypeKind::Boolean),
            ("DATETIME2", DataTypeKind::DateTime),
            ("DATETIMEOFFSET", DataTypeKind::TimestampTz),
            ("UNIQUEIDENTIFIER", DataTypeKind::Uuid),
            ("NTEXT", DataTypeKind::Text),
            ("IMAGE", DataTypeKind::VarBinary),
        ] {
            config.type_names.insert(name.to_string(), kind);
        }

        config.function("ISNULL", |args, _| {
            let [x, y] = take_args("ISNULL", args)?;
            Ok(Expression::Coalesce(Box::new(VarArgFunc::new(vec![x, y]))))
        });
        config.function("LEN", |a, _| unary(Expression::Length, "LEN", a));
        config.function("CHARINDEX", build_locate);
        config.function("STRING_AGG", build_group_concat);
        config.function("DATEADD", |a, _| unit_first("DATEADD", a, Expression::DateAdd));
        config.function("DATEDIFF", |a, _| unit_first_diff("DATEDIFF", a));
        config.function("DATEPART", |args, _| {
            let [unit, this] = take_args("DATEPART", args)?;
            let field = unit_name(&unit).unwrap_or_else(|| "DAY".to_string());
            Ok(extract(&field, this))
        });
        config.function("GETDATE", |args, _| {
            let [] = take_args("GETDATE", args)?;
            Ok(Expression::CurrentTimestamp(CurrentTimestamp))
        });
        config.function("FORMAT", |a, c| format_func(Expression::TimeToStr, "FORMAT", a, c));
    }

    fn generator_config(&self, config: &mut GeneratorConfig) {
        use ExpressionKind as K;

        config.set_identifier_quotes('[', ']');
        config.hex_literal_prefix = true;
        config.limit_style = LimitStyle::Top;
        config.supports_null_ordering = false;
        config.supports_qualify = false;
        config.supports_distinct_on = false;
        config.supports_ilike = false;
        config.supports_bucket_sample = false;
        config.supports_hive_clauses = false;
        config.properties_style = PropertiesStyle::Unsupported;
        config.time_mapping = TimeMapping::new(TSQL_TIME_MAPPING);

        for (kind, name) in [
            (DataTypeKind::Boolean, "BIT"),
            (DataTypeKind::Double, "FLOAT"),
            (DataTypeKind::Float, "REAL"),
            (DataTypeKind::Text, "VARCHAR(MAX)"),
            (DataTypeKind::Blob, "VARBINARY(MAX)"),
            (DataTypeKind::Timestamp, "DATETIME2"),
            (DataTypeKind::DateTime, "DATETIME2"),
            (DataTypeKind::TimestampTz, "DATETIMEOFFSET"),
            (DataTypeKind::Uuid, "UNIQUEIDENTIFIER"),
        ] {
            config.type_name(kind, name);
        }

        operator_as_infix(config, K::DPipe, "+");
        config.rename(K::If, "IIF");
        config.rename(K::Length, "LEN");

        config.transform(K::Boolean, |g, e| {
            let Expression::Boolean(b) = e else { return g.render_default(e) };
            g.write(if b.value { "1" } else { "0" });
            Ok(())
        });
        config.transform(K::CurrentTimestamp, |g, _| g.render_function("GETDATE", &[]));
        config.transform(K::StrPosition, |g, e| {
            let Expression::StrPosition(f) = e else { return g.render_default(e) };
            render_locate(g, "CHARINDEX", f)
        });
        config.transform(K::GroupConcat, |g, e| {
            let Expression::GroupConcat(f) = e else { return g.render_default(e) };
            if f.distinct {
                return Err(g.unsupported("STRING_AGG(DISTINCT ..)"));
            }
            let separator = f.separator.clone().unwrap_or_else(|| Expression::string(","));
            g.render_function("STRING_AGG", &[&f.this, &separator])
        });
        config.transform(K::Extract, |g, e| {
            let Expression::Extract(f) = e else { return g.render_default(e) };
            render_unit_first(g, "DATEPART", &f.field, &[&f.this])
        });

        config.transform(K::DateAdd, |g, e| {
            let Expression::DateAdd(f) = e else { return g.render_default(e) };
            render_unit_first(g, "DATEADD", f.unit_or_day(), &[&f.expression, &f.this])
        });
        config.transform(K::DateSub, |g, e| {
            let Expression::DateSub(f) = e else { return g.render_default(e) };
            let amount = negated(&f.expression);
            render_unit_first(g, "DATEADD", f.unit_or_day(), &[&amount, &f.this])
        });
        config.transform(K::TsOrDsAdd, |g, e| {
            let Expression::TsOrDsAdd(f) = e else { return g.render_default(e) };
            let this = as_date(&f.this);
            render_unit_first(g, "DATEADD", f.unit_or_day(), &[&f.expression, &this])
        });
        config.transform(K::DateDiff, |g, e| {
            let Expression::DateDiff(f) = e else { return g.render_default(e) };
            render_unit_first(g, "DATEDIFF", f.unit_or_day(), &[&f.expression, &f.this])
        });

        config.transform(K::TimeToStr, |g, e| {
            let Expression::TimeToStr(f) = e else { return g.render_default(e) };
            let format = format_or_default(g, f.format.as_ref());
            render_formatted(g, "FORMAT", &f.this, &format)
        });
        config.transform(K::StrToTime, |g, e| {
            let Expression::StrToTime(f) = e else { return g.render_default(e) };
            render_parse(g, f, DataTypeKind::DateTime)
        });
        config.transform(K::StrToDate, |g, e| {
            let Expression::StrToDate(f) = e else { return g.render_default(e) };
            render_parse(g, f, DataTypeKind::Date)
        });
        config.transform(K::StrToUnix, |g, e| {
            let Expression::StrToUnix(f) = e else { return g.render_default(e) };
            if !is_default_format(g, f.format.as_ref()) && !is_iso_format(f.format.as_ref()) {
                return Err(g.unsupported("parsing with a custom time format"));
            }
            let time = Expression::cast(f.this.clone(), DataType::new(DataTypeKind::DateTime));
            render_unit_first(g, "DATEDIFF", "SECOND", &[&Expression::string(EPOCH), &time])
        });
        config.transform(K::TimeToUnix, |g, e| {
            let Expression::TimeToUnix(f) = e else { return g.render_default(e) };
            render_unit_first(g, "DATEDIFF", "SECOND", &[&Expression::string(EPOCH), &f.this])
        });
        config.transform(K::UnixToTime, |g, e| {
            let Expression::UnixToTime(f) = e else { return g.render_default(e) };
            render_unit_first(g, "DATEADD", "SECOND", &[&f.this, &Expression::string(EPOCH)])
        });
        for kind in [K::Unnest, K::Explode, K::Array, K::ArrayContains, K::ArrayContainsAll] {
            config.transform(kind, |g, e| Err(g.unsupported(e.kind().to_string())));
        }
    }
}

/// Only the default layout can be parsed without a style code
fn render_parse(g: &mut Generator<'_>, f: &FormatFunc, to: DataTypeKind) -> Result<()> {
    if !is_default_format(g, f.format.as_ref()) && !is_iso_format(f.format.as_ref()) {
        return Err(g.unsupported("parsing with a custom time format"));
    }
    g.render(&Expression::cast(f.this.clone(), DataType::new(to)))
}

fn is_iso_format(format: Option<&Expression>) -> bool {
    matches!(
        format.and_then(Expression::as_string),
        Some("%Y-%m-%d" | "%Y-%m-%d %H:%M:%S")
    )
}

#[cfg(test)]
mod tests {
    use crate::dialects::{Dialect, DialectType};
    use crate::error::Error;

    fn tsql_from(sql: &str, source: DialectType) -> String {
        let result = Dialect::get(source)
            .transpile_to(sql, &Dialect::get(DialectType::TSQL), &Default::default())
            .expect("Transpile failed");
        result[0].clone()
    }

    #[test]
    fn test_identity() {
        for sql in [
            "SELECT TOP 10 [a b] FROM [dbo].[t]",
            "SELECT IIF(a > 1, 'x', 'y')",
            "SELECT LEN(s), CHARINDEX('a', s)",
            "SELECT DATEADD(DAY, 1, x)",
            "SELECT DATEDIFF(DAY, a, b)",
            "SELECT DATEPART(YEAR, x)",
            "SELECT GETDATE()",
            "SELECT STRING_AGG(a, ',') FROM t",
            "SELECT FORMAT(x, 'yyyy-MM-dd')",
            "SELECT CAST(x AS DATETIME2)",
            "SELECT 0x1F",
        ] {
            assert_eq!(tsql_from(sql, DialectType::TSQL), sql);
        }
    }

    #[test]
    fn test_quoted_identifiers() {
        assert_eq!(tsql_from("SELECT \"a\" FROM t", DialectType::TSQL), "SELECT [a] FROM t");
        assert_eq!(tsql_from("SELECT ISNULL(a, 0)", DialectType::TSQL), "SELECT COALESCE(a, 0)");
    }

    #[test]
    fn test_limit_as_top() {
        assert_eq!(
            tsql_from("SELECT a FROM t LIMIT 5", DialectType::Postgres),
            "SELECT TOP 5 a FROM t"
        );
        assert_eq!(
            tsql_from("SELECT a FROM t ORDER BY a LIMIT 5 OFFSET 10", DialectType::Generic),
            "SELECT a FROM t ORDER BY a OFFSET 10 ROWS FETCH FIRST 5 ROWS ONLY"
        );
    }

    #[test]
    fn test_from_hive() {
        assert_eq!(
            tsql_from("SELECT a || b, IF(c, TRUE, FALSE) FROM t", DialectType::Hive),
            "SELECT a + b, IIF(c, 1, 0) FROM t"
        );
        assert_eq!(
            tsql_from("SELECT DATE_ADD(x, 1), LENGTH(s), LOCATE('a', s)", DialectType::Hive),
            "SELECT DATEADD(DAY, 1, CAST(x AS DATE)), LEN(s), CHARINDEX('a', s)"
        );
        assert_eq!(
            tsql_from("SELECT DATE_FORMAT(x, 'yyyy-MM-dd HH:mm')", DialectType::Hive),
            "SELECT FORMAT(x, 'yyyy-MM-dd HH:mm')"
        );
        assert_eq!(
            tsql_from("SELECT CAST(a AS BOOLEAN), CAST(b AS STRING)", DialectType::Hive),
            "SELECT TRY_CAST(a AS BIT), TRY_CAST(b AS VARCHAR(MAX))"
        );
    }

    #[test]
    fn test_window_null_ordering_as_sort_key() {
        assert_eq!(
            tsql_from("SELECT ROW_NUMBER() OVER (ORDER BY a) FROM t", DialectType::Postgres),
            "SELECT ROW_NUMBER() OVER (ORDER BY CASE WHEN a IS NULL THEN 1 ELSE 0 END, a) FROM t"
        );
    }

    #[test]
    fn test_custom_parse_format_unsupported() {
        let hive = Dialect::get(DialectType::Hive);
        let ast = hive.parse("SELECT TO_DATE(x, 'dd/MM/yyyy')").expect("Parse failed");
        let err = Dialect::get(DialectType::TSQL).generate(&ast[0]).unwrap_err();
        assert!(matches!(err, Error::Unsupported { .. }), "got {err:?}");
        assert_eq!(
            tsql_from("SELECT TO_DATE(x, 'yyyy-MM-dd')", DialectType::Hive),
            "SELECT CAST(x AS DATE)"
        );
    }

    #[test]
    fn test_epoch_conversions() {
        assert_eq!(
            tsql_from("SELECT FROM_UNIXTIME(n), TO_UNIXTIME(x)", DialectType::Presto),
            "SELECT DATEADD(SECOND, n, '1970-01-01'), DATEDIFF(SECOND, '1970-01-01', x)"
        );
    }
}
