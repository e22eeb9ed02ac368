//! Oracle Dialect
//!
//! Oracle Database lexical rules, function builders and render transforms.
//! Key differences:
//! - Unquoted identifiers resolve upper-case
//! - MINUS instead of EXCEPT, `OFFSET .. FETCH FIRST .. ROWS ONLY` instead of LIMIT
//! - Table aliases without AS
//! - VARCHAR2 / NUMBER / CLOB type names
//! - TO_CHAR / TO_DATE / TO_TIMESTAMP with `YYYY-MM-DD HH24:MI:SS` templates
//! - INSTR, LISTAGG, DBMS_RANDOM.VALUE
//! - ADD_MONTHS and NUMTODSINTERVAL for date arithmetic
//! - No IF(), ILIKE, TRY_CAST, QUALIFY or DISTINCT ON

use super::postgres::{as_date, extract};
use super::{
    format_or_default, negated, render_formatted, render_if_as_case, unit_string, DialectImpl,
    DialectType, DEFAULT_TIME_FORMAT,
};
use crate::error::Result;
use crate::expressions::{
    BinaryOp, DataTypeKind, DateArith, Expression, ExpressionKind, FormatFunc,
};
use crate::generator::{Generator, GeneratorConfig, LimitStyle, PropertiesStyle};
use crate::parser::{
    build_group_concat, build_strpos, format_func, take_args, NormalizationStrategy, NullOrdering, ParserConfig,
};
use crate::time::TimeMapping;
use crate::tokens::{TokenType, TokenizerConfig};

/// Oracle datetime format elements; lower-case spellings are accepted on input
const ORACLE_TIME_MAPPING: &[(&str, &str)] = &[
    ("yyyy", "%Y"),
    ("mm", "%m"),
    ("dd", "%d"),
    ("hh24", "%H"),
    ("mi", "%M"),
    ("ss", "%S"),
    ("YYYY", "%Y"),
    ("YY", "%y"),
    ("MONTH", "%B"),
    ("MON", "%b"),
    ("MM", "%m"),
    ("DDD", "%j"),
    ("DD", "%d"),
    ("DAY", "%A"),
    ("DY", "%a"),
    ("HH", "%I"),
    ("HH12", "%I"),
    ("HH24", "%H"),
    ("MI", "%M"),
    ("SS", "%S"),
    ("FF", "%f"),
    ("FF6", "%f"),
    ("AM", "%p"),
    ("PM", "%p"),
];

/// Oracle dialect
pub struct OracleDialect;

impl DialectImpl for OracleDialect {
    fn dialect_type(&self) -> DialectType {
        DialectType::Oracle
    }

    fn tokenizer_config(&self, config: &mut TokenizerConfig) {
        config.nested_comments = false;
        config.keywords.insert("MINUS".to_string(), TokenType::Except);
    }

    fn parser_config(&self, config: &mut ParserConfig) {
        config.normalization = NormalizationStrategy::Uppercase;
        config.null_ordering = NullOrdering::NullsAreLarge;
        config.time_mapping = TimeMapping::new(ORACLE_TIME_MAPPING);
        config.time_format = Some(DEFAULT_TIME_FORMAT.to_string());
        for (name, kind) in [
            ("VARCHAR2", DataTypeKind::VarChar),
            ("NVARCHAR2", DataTypeKind::NVarChar),
            ("NUMBER", DataTypeKind::Decimal),
            ("CLOB", DataTypeKind::Text),
            ("RAW", DataTypeKind::VarBinary),
            ("BINARY_FLOAT", DataTypeKind::Float),
            ("BINARY_DOUBLE", DataTypeKind::Double),
        ] {
            config.type_names.insert(name.to_string(), kind);
        }

        config.function("TO_CHAR", |a, c| format_func(Expression::TimeToStr, "TO_CHAR", a, c));
        config.function("TO_DATE", |a, c| format_func(Expression::StrToDate, "TO_DATE", a, c));
        config.function("TO_TIMESTAMP", |a, c| format_func(Expression::StrToTime, "TO_TIMESTAMP", a, c));
        config.function("INSTR", build_strpos);
        config.function("LISTAGG", build_group_concat);
        config.function("ADD_MONTHS", |args, _| {
            let [this, months] = take_args("ADD_MONTHS", args)?;
            Ok(Expression::DateAdd(Box::new(DateArith::new(this, months, Some("MONTH".into())))))
        });
        config.function("MONTHS_BETWEEN", |args, _| {
            let [end, start] = take_args("MONTHS_BETWEEN", args)?;
            Ok(Expression::DateDiff(Box::new(DateArith::new(end, start, Some("MONTH".into())))))
        });
    }

    fn generator_config(&self, config: &mut GeneratorConfig) {
        use ExpressionKind as K;

        config.null_ordering = NullOrdering::NullsAreLarge;
        config.limit_style = LimitStyle::FetchFirst;
        config.table_alias_as = false;
        config.supports_qualify = false;
        config.supports_distinct_on = false;
        config.supports_ilike = false;
        config.supports_try_cast = false;
        config.supports_bucket_sample = false;
        config.supports_hive_clauses = false;
        config.properties_style = PropertiesStyle::Unsupported;
        config.time_mapping = TimeMapping::new(ORACLE_TIME_MAPPING);
        config.time_format = Some(DEFAULT_TIME_FORMAT.to_string());

        for (kind, name) in [
            (DataTypeKind::Boolean, "NUMBER(1)"),
            (DataTypeKind::TinyInt, "NUMBER(3)"),
            (DataTypeKind::BigInt, "NUMBER(19)"),
            (DataTypeKind::Decimal, "NUMBER"),
            (DataTypeKind::Double, "DOUBLE PRECISION"),
            (DataTypeKind::VarChar, "VARCHAR2"),
            (DataTypeKind::NVarChar, "NVARCHAR2"),
            (DataTypeKind::Text, "CLOB"),
            (DataTypeKind::Binary, "RAW"),
            (DataTypeKind::VarBinary, "RAW"),
            (DataTypeKind::DateTime, "TIMESTAMP"),
            (DataTypeKind::TimestampTz, "TIMESTAMP WITH TIME ZONE"),
            (DataTypeKind::TimestampLtz, "TIMESTAMP WITH LOCAL TIME ZONE"),
            (DataTypeKind::Uuid, "RAW(16)"),
        ] {
            config.type_name(kind, name);
        }

        config.rename(K::Substring, "SUBSTR");
        config.rename(K::GroupConcat, "LISTAGG");

        config.transform(K::Except, |g, e| {
            let Expression::Except(op) = e else { return g.render_default(e) };
            g.render_set_operation(op, "MINUS")
        });
        config.transform(K::If, |g, e| {
            let Expression::If(f) = e else { return g.render_default(e) };
            render_if_as_case(g, f)
        });
        config.transform(K::Rand, |g, _| {
            g.write("DBMS_RANDOM.VALUE");
            Ok(())
        });
        config.transform(K::StrPosition, |g, e| {
            let Expression::StrPosition(f) = e else { return g.render_default(e) };
            let mut args = vec![&f.this, &f.substr];
            args.extend(f.position.as_ref());
            g.render_function("INSTR", &args)
        });
        config.transform(K::TsOrDsToDate, |g, e| {
            let Expression::TsOrDsToDate(f) = e else { return g.render_default(e) };
            g.render(&as_date(&f.this))
        });
        for (kind, field) in [(K::Day, "DAY"), (K::Month, "MONTH"), (K::Year, "YEAR")] {
            config.transform(kind, move |g, e| match e {
                Expression::Day(f) | Expression::Month(f) | Expression::Year(f) => {
                    g.render(&extract(field, f.this.clone()))
                }
                _ => g.render_default(e),
            });
        }

        config.transform(K::DateAdd, |g, e| {
            let Expression::DateAdd(f) = e else { return g.render_default(e) };
            render_date_add(g, &f.this, &f.expression, f.unit_or_day())
        });
        config.transform(K::DateSub, |g, e| {
            let Expression::DateSub(f) = e else { return g.render_default(e) };
            render_date_add(g, &f.this, &negated(&f.expression), f.unit_or_day())
        });
        config.transform(K::TsOrDsAdd, |g, e| {
            let Expression::TsOrDsAdd(f) = e else { return g.render_default(e) };
            render_date_add(g, &as_date(&f.this), &f.expression, f.unit_or_day())
        });
        config.transform(K::DateDiff, |g, e| {
            let Expression::DateDiff(f) = e else { return g.render_default(e) };
            render_date_diff(g, f)
        });
        config.transform(K::TimeToStr, |g, e| {
            let Expression::TimeToStr(f) = e else { return g.render_default(e) };
            render_to(g, "TO_CHAR", f)
        });
        config.transform(K::StrToTime, |g, e| {
            let Expression::StrToTime(f) = e else { return g.render_default(e) };
            render_to(g, "TO_TIMESTAMP", f)
        });
        config.transform(K::StrToDate, |g, e| {
            let Expression::StrToDate(f) = e else { return g.render_default(e) };
            render_to(g, "TO_DATE", f)
        });
    }
}

fn render_to(g: &mut Generator<'_>, name: &str, f: &FormatFunc) -> Result<()> {
    let format = format_or_default(g, f.format.as_ref());
    render_formatted(g, name, &f.this, &format)
}

/// ADD_MONTHS for calendar units, a day-second interval otherwise
fn render_date_add(g: &mut Generator<'_>, this: &Expression, amount: &Expression, unit: &str) -> Result<()> {
    let scaled = |factor: i64| {
        Expression::Mul(Box::new(BinaryOp::new(amount.clone(), Expression::number(factor))))
    };
    let (months, days) = match unit {
        "MONTH" => (Some(amount.clone()), None),
        "QUARTER" => (Some(scaled(3)), None),
        "YEAR" => (Some(scaled(12)), None),
        "WEEK" => (None, Some((scaled(7), "DAY"))),
        "DAY" | "HOUR" | "MINUTE" | "SECOND" => (None, Some((amount.clone(), unit))),
        other => return Err(g.unsupported(format!("date arithmetic by {other}"))),
    };
    if let Some(months) = months {
        return g.render_function("ADD_MONTHS", &[this, &months]);
    }
    let Some((amount, unit)) = days else {
        return Ok(());
    };
    let interval = Expression::func("NUMTODSINTERVAL", vec![amount, unit_string(unit)]);
    g.render(&Expression::Add(Box::new(BinaryOp::new(this.clone(), interval))))
}

/// Subtracting dates yields days; MONTHS_BETWEEN covers calendar units
fn render_date_diff(g: &mut Generator<'_>, f: &DateArith) -> Result<()> {
    match f.unit_or_day() {
        "DAY" => {
            let diff = Expression::Sub(Box::new(BinaryOp::new(as_date(&f.this), as_date(&f.expression))));
            g.render(&diff)
        }
        "MONTH" => g.render_function("MONTHS_BETWEEN", &[&f.this, &f.expression]),
        unit => Err(g.unsupported(format!("DATE_DIFF by {unit}"))),
    }
}

#[cfg(test)]
mod tests {
    use crate::dialects::{Dialect, DialectType};
    use crate::error::Error;

    fn oracle_from(sql: &str, source: DialectType) -> String {
        let result = Dialect::get(source)
            .transpile_to(sql, &Dialect::get(DialectType::Oracle), &Default::default())
            .expect("Transpile failed");
        result[0].clone()
    }

    #[test]
    fn test_identity() {
        for sql in [
            "SELECT a FROM x MINUS SELECT a FROM y",
            "SELECT TO_CHAR(x, 'YYYY-MM-DD HH24:MI:SS') FROM dual",
            "SELECT INSTR(x, 'a')",
            "SELECT LISTAGG(a, ',') FROM t",
            "SELECT ADD_MONTHS(x, 1)",
            "SELECT MONTHS_BETWEEN(a, b)",
            "SELECT CAST(x AS VARCHAR2(10))",
            "SELECT a FROM t x",
        ] {
            assert_eq!(oracle_from(sql, DialectType::Oracle), sql);
        }
    }

    #[test]
    fn test_limit_and_aliases() {
        assert_eq!(
            oracle_from("SELECT a FROM t AS x LIMIT 10", DialectType::Postgres),
            "SELECT a FROM t x FETCH FIRST 10 ROWS ONLY"
        );
        assert_eq!(
            oracle_from("SELECT a FROM t LIMIT 10 OFFSET 5", DialectType::Postgres),
            "SELECT a FROM t OFFSET 5 ROWS FETCH FIRST 10 ROWS ONLY"
        );
    }

    #[test]
    fn test_from_hive() {
        assert_eq!(
            oracle_from("SELECT IF(c, 1, 2)", DialectType::Hive),
            "SELECT CASE WHEN c THEN 1 ELSE 2 END"
        );
        assert_eq!(oracle_from("SELECT RAND()", DialectType::Hive), "SELECT DBMS_RANDOM.VALUE");
        assert_eq!(
            oracle_from("SELECT DATE_ADD('2020-01-01', 1)", DialectType::Hive),
            "SELECT CAST('2020-01-01' AS DATE) + NUMTODSINTERVAL(1, 'DAY')"
        );
        assert_eq!(
            oracle_from("SELECT DATE_FORMAT(x, 'yyyy-MM-dd')", DialectType::Hive),
            "SELECT TO_CHAR(x, 'YYYY-MM-DD')"
        );
        assert_eq!(
            oracle_from("SELECT CAST(x AS STRING)", DialectType::Hive),
            "SELECT CAST(x AS CLOB)"
        );
    }

    #[test]
    fn test_calendar_arithmetic() {
        assert_eq!(
            oracle_from("SELECT DATE_ADD('year', 2, x)", DialectType::Presto),
            "SELECT ADD_MONTHS(x, 2 * 12)"
        );
        let presto = Dialect::get(DialectType::Presto);
        let ast = presto.parse("SELECT DATE_DIFF('hour', a, b)").expect("Parse failed");
        let err = Dialect::get(DialectType::Oracle).generate(&ast[0]).unwrap_err();
        assert!(matches!(err, Error::Unsupported { .. }), "got {err:?}");
    }

    #[test]
    fn test_try_cast_and_ilike_downgraded() {
        assert_eq!(
            oracle_from("SELECT TRY_CAST(x AS INT) FROM t WHERE a ILIKE 'x'", DialectType::Snowflake),
            "SELECT CAST(x AS INT) FROM t WHERE LOWER(a) LIKE LOWER('x')"
        );
    }
}
