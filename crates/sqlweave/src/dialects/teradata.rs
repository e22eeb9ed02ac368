//! Teradata Dialect
//!
//! Key differences:
//! - SEL / INS / UPD / DEL abbreviations and EQ / NE / LT / GT comparison words
//! - `SELECT TOP n` instead of LIMIT
//! - `a MOD b` for modulo
//! - TRYCAST, BYTEINT, INDEX(str, substr)
//! - Interval-literal date arithmetic and ADD_MONTHS
//! - QUALIFY is native; DISTINCT ON and ILIKE are not

use super::postgres::as_date;
use super::{
    format_or_default, negated, operator_as_infix, render_formatted, render_if_as_case, DialectImpl,
    DialectType, DEFAULT_TIME_FORMAT,
};
use crate::error::Result;
use crate::expressions::{
    BinaryOp, DataTypeKind, DateArith, Expression, ExpressionKind, FormatFunc, Interval, Literal,
    StrPosition,
};
use crate::generator::{Generator, GeneratorConfig, LimitStyle, PropertiesStyle};
use crate::parser::{format_func, take_args, unary, NormalizationStrategy, ParserConfig};
use crate::time::TimeMapping;
use crate::tokens::{TokenType, TokenizerConfig};

const TERADATA_TIME_MAPPING: &[(&str, &str)] = &[
    ("YYYY", "%Y"),
    ("YY", "%y"),
    ("MMMM", "%B"),
    ("MMM", "%b"),
    ("MM", "%m"),
    ("DDD", "%j"),
    ("DD", "%d"),
    ("HH", "%H"),
    ("HH24", "%H"),
    ("MI", "%M"),
    ("SS", "%S"),
    ("S(6)", "%f"),
];

/// Teradata dialect
pub struct TeradataDialect;

impl DialectImpl for TeradataDialect {
    fn dialect_type(&self) -> DialectType {
        DialectType::Teradata
    }

    fn tokenizer_config(&self, config: &mut TokenizerConfig) {
        config.nested_comments = false;
        for (word, token) in [
            ("SEL", TokenType::Select),
            ("INS", TokenType::Insert),
            ("UPD", TokenType::Update),
            ("DEL", TokenType::Delete),
            ("TOP", TokenType::Top),
            ("MOD", TokenType::Mod),
            ("TRYCAST", TokenType::TryCast),
            ("EQ", TokenType::Eq),
            ("NE", TokenType::Neq),
            ("LT", TokenType::Lt),
            ("LE", TokenType::Lte),
            ("GT", TokenType::Gt),
            ("GE", TokenType::Gte),
            ("HELP", TokenType::Command),
            ("COLLECT", TokenType::Command),
        ] {
            config.keywords.insert(word.to_string(), token);
        }
    }

    fn parser_config(&self, config: &mut ParserConfig) {
        config.normalization = NormalizationStrategy::CaseInsensitive;
        config.time_mapping = TimeMapping::new(TERADATA_TIME_MAPPING);
        config.time_format = Some(DEFAULT_TIME_FORMAT.to_string());
        config.type_names.insert("BYTEINT".to_string(), DataTypeKind::TinyInt);

        config.function("INDEX", |args, _| {
            let [this, substr] = take_args("INDEX", args)?;
            Ok(Expression::StrPosition(Box::new(StrPosition {
                this,
                substr,
                position: None,
            })))
        });
        config.function("CHARACTERS", |a, _| unary(Expression::Length, "CHARACTERS", a));
        config.function("CHAR_LENGTH", |a, _| unary(Expression::Length, "CHAR_LENGTH", a));
        config.function("TO_CHAR", |a, c| format_func(Expression::TimeToStr, "TO_CHAR", a, c));
        config.function("TO_DATE", |a, c| format_func(Expression::StrToDate, "TO_DATE", a, c));
        config.function("TO_TIMESTAMP", |args, c| {
            if args.len() == 1 {
                return unary(Expression::UnixToTime, "TO_TIMESTAMP", args);
            }
            format_func(Expression::StrToTime, "TO_TIMESTAMP", args, c)
        });
        config.function("ADD_MONTHS", |args, _| {
            let [this, months] = take_args("ADD_MONTHS", args)?;
            Ok(Expression::DateAdd(Box::new(DateArith::new(this, months, Some("MONTH".into())))))
        });
    }

    fn generator_config(&self, config: &mut GeneratorConfig) {
        use ExpressionKind as K;

        config.limit_style = LimitStyle::Top;
        config.supports_distinct_on = false;
        config.supports_ilike = false;
        config.supports_bucket_sample = false;
        config.supports_hive_clauses = false;
        config.properties_style = PropertiesStyle::Unsupported;
        config.time_mapping = TimeMapping::new(TERADATA_TIME_MAPPING);
        config.time_format = Some(DEFAULT_TIME_FORMAT.to_string());

        for (kind, name) in [
            (DataTypeKind::Boolean, "BYTEINT"),
            (DataTypeKind::TinyInt, "BYTEINT"),
            (DataTypeKind::Double, "DOUBLE PRECISION"),
            (DataTypeKind::Text, "LONG VARCHAR"),
            (DataTypeKind::VarBinary, "VARBYTE"),
            (DataTypeKind::Binary, "BYTE"),
            (DataTypeKind::DateTime, "TIMESTAMP"),
            (DataTypeKind::TimestampTz, "TIMESTAMP WITH TIME ZONE"),
        ] {
            config.type_name(kind, name);
        }

        operator_as_infix(config, K::Mod, "MOD");
        config.rename(K::Length, "CHARACTERS");
        config.rename(K::Substring, "SUBSTR");

        config.transform(K::TryCast, |g, e| {
            let Expression::TryCast(cast) = e else { return g.render_default(e) };
            g.render_cast(cast, "TRYCAST")
        });
        config.transform(K::If, |g, e| {
            let Expression::If(f) = e else { return g.render_default(e) };
            render_if_as_case(g, f)
        });
        config.transform(K::StrPosition, |g, e| {
            let Expression::StrPosition(f) = e else { return g.render_default(e) };
            if f.position.is_some() {
                return Err(g.unsupported("INDEX with a start position"));
            }
            g.render_function("INDEX", &[&f.this, &f.substr])
        });
        config.transform(K::DateAdd, |g, e| {
            let Expression::DateAdd(f) = e else { return g.render_default(e) };
            render_date_add(g, &f.this, &f.expression, f.unit_or_day(), false)
        });
        config.transform(K::DateSub, |g, e| {
            let Expression::DateSub(f) = e else { return g.render_default(e) };
            render_date_add(g, &f.this, &f.expression, f.unit_or_day(), true)
        });
        config.transform(K::TsOrDsAdd, |g, e| {
            let Expression::TsOrDsAdd(f) = e else { return g.render_default(e) };
            let this = as_date(&f.this);
            render_date_add(g, &this, &f.expression, f.unit_or_day(), false)
        });
        config.transform(K::TimeToStr, |g, e| {
            let Expression::TimeToStr(f) = e else { return g.render_default(e) };
            render_to(g, "TO_CHAR", f)
        });
        config.transform(K::StrToDate, |g, e| {
            let Expression::StrToDate(f) = e else { return g.render_default(e) };
            render_to(g, "TO_DATE", f)
        });
        config.transform(K::StrToTime, |g, e| {
            let Expression::StrToTime(f) = e else { return g.render_default(e) };
            render_to(g, "TO_TIMESTAMP", f)
        });
        config.rename(K::UnixToTime, "TO_TIMESTAMP");
    }
}

fn render_to(g: &mut Generator<'_>, name: &str, f: &FormatFunc) -> Result<()> {
    let format = format_or_default(g, f.format.as_ref());
    render_formatted(g, name, &f.this, &format)
}

/// `x + INTERVAL 'n' UNIT`, or ADD_MONTHS for month and year steps
fn render_date_add(
    g: &mut Generator<'_>,
    this: &Expression,
    amount: &Expression,
    unit: &str,
    subtract: bool,
) -> Result<()> {
    let signed = || {
        if subtract {
            negated(amount)
        } else {
            amount.clone()
        }
    };
    match unit {
        "MONTH" => return g.render_function("ADD_MONTHS", &[this, &signed()]),
        "YEAR" => {
            let months = Expression::Mul(Box::new(BinaryOp::new(signed(), Expression::number(12))));
            return g.render_function("ADD_MONTHS", &[this, &months]);
        }
        "DAY" | "HOUR" | "MINUTE" | "SECOND" => {}
        other => return Err(g.unsupported(format!("date arithmetic by {other}"))),
    }
    let interval = |text: String| {
        Expression::Interval(Box::new(Interval {
            this: Expression::string(text),
            unit: Some(unit.to_string()),
        }))
    };
    let step = match amount {
        Expression::Literal(Literal::Number(n)) => interval(n.clone()),
        other => Expression::Mul(Box::new(BinaryOp::new(
            Expression::paren(other.clone()),
            interval("1".to_string()),
        ))),
    };
    let op = BinaryOp::new(this.clone(), step);
    g.render(&if subtract {
        Expression::Sub(Box::new(op))
    } else {
        Expression::Add(Box::new(op))
    })
}

#[cfg(test)]
mod tests {
    use crate::dialects::{Dialect, DialectType};
    use crate::expressions::Expression;

    fn teradata_from(sql: &str, source: DialectType) -> String {
        let result = Dialect::get(source)
            .transpile_to(sql, &Dialect::get(DialectType::Teradata), &Default::default())
            .expect("Transpile failed");
        result[0].clone()
    }

    #[test]
    fn test_identity() {
        for sql in [
            "SELECT TOP 10 a FROM t",
            "SELECT a MOD 2 FROM t",
            "SELECT TRYCAST(x AS INT)",
            "SELECT INDEX(s, 'a')",
            "SELECT CHARACTERS(s)",
            "SELECT TO_CHAR(x, 'YYYY-MM-DD')",
            "SELECT a FROM t QUALIFY ROW_NUMBER() OVER (PARTITION BY b ORDER BY c) = 1",
        ] {
            assert_eq!(teradata_from(sql, DialectType::Teradata), sql);
        }
    }

    #[test]
    fn test_abbreviations() {
        assert_eq!(
            teradata_from("SEL a FROM t WHERE b EQ 1 AND c GE 2", DialectType::Teradata),
            "SELECT a FROM t WHERE b = 1 AND c >= 2"
        );
        let ast = Dialect::get(DialectType::Teradata).parse("HELP TABLE t").expect("Parse failed");
        assert!(matches!(ast[0], Expression::Command(_)));
    }

    #[test]
    fn test_from_postgres() {
        assert_eq!(
            teradata_from("SELECT a % 2 FROM t LIMIT 5", DialectType::Postgres),
            "SELECT TOP 5 a MOD 2 FROM t"
        );
    }

    #[test]
    fn test_from_hive() {
        assert_eq!(
            teradata_from("SELECT DATE_ADD('2020-01-01', 1)", DialectType::Hive),
            "SELECT CAST('2020-01-01' AS DATE) + INTERVAL '1' DAY"
        );
        assert_eq!(
            teradata_from("SELECT DATE_FORMAT(x, 'yyyy-MM-dd'), LENGTH(s)", DialectType::Hive),
            "SELECT TO_CHAR(x, 'YYYY-MM-DD'), CHARACTERS(s)"
        );
        assert_eq!(
            teradata_from("SELECT CAST(a AS BOOLEAN), CAST(b AS STRING)", DialectType::Hive),
            "SELECT TRYCAST(a AS BYTEINT), TRYCAST(b AS LONG VARCHAR)"
        );
    }

    #[test]
    fn test_from_presto_months() {
        assert_eq!(
            teradata_from("SELECT DATE_ADD('month', 3, d)", DialectType::Presto),
            "SELECT ADD_MONTHS(d, 3)"
        );
    }
}
