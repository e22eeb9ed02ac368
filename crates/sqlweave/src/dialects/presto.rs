//! Presto Dialect
//!
//! Presto is the base for the Trino dialect.
//! Key differences:
//! - Bitwise operators are functions (`BITWISE_AND`, `BITWISE_NOT`, ...)
//! - MySQL-style time formats (`%Y-%m-%d %H:%i:%S`) in DATE_FORMAT / DATE_PARSE
//! - Unit-first date functions: `DATE_ADD('day', n, x)`, `DATE_DIFF('day', a, b)`
//! - `ARRAY[...]` literals; CARDINALITY, CONTAINS, APPROX_PERCENTILE
//! - `ROW(...)` structs and `ARRAY(T)` / `MAP(K, V)` parameterized types
//! - NULLs sort last in both directions
//! - `WITH (...)` table properties and `CROSS JOIN UNNEST` instead of lateral views
//! - No QUALIFY, DISTINCT ON, ILIKE or bucket sampling

use super::{
    bracket_arrays, flag_value, format_or_default, negated, operator_as_function,
    operator_from_function, render_formatted, render_strpos, unit_first, unit_first_diff, unit_string,
    DialectImpl, DialectType, DEFAULT_DATE_FORMAT, DEFAULT_TIME_FORMAT,
};
use crate::error::Result;
use crate::expressions::{
    BinaryOp, Bracket, Case, DataType, DataTypeKind, Expression, ExpressionKind,
    FormatFunc, Identifier, Lambda, Substring, UnaryFunc, UnaryOp,
};
use crate::generator::{Generator, GeneratorConfig, NestedTypeStyle};
use crate::parser::{
    binary, format_func, take_args, unary, NormalizationStrategy, NullOrdering, ParserConfig,
};
use crate::time::TimeMapping;

/// MySQL-style directives Presto uses, and their strftime equivalents
pub(crate) const PRESTO_TIME_MAPPING: &[(&str, &str)] = &[
    ("%M", "%B"),
    ("%c", "%-m"),
    ("%e", "%-d"),
    ("%h", "%I"),
    ("%i", "%M"),
    ("%s", "%S"),
    ("%S", "%S"),
    ("%u", "%W"),
    ("%k", "%-H"),
    ("%l", "%-I"),
    ("%W", "%A"),
];

/// Presto dialect
pub struct PrestoDialect;

impl DialectImpl for PrestoDialect {
    fn dialect_type(&self) -> DialectType {
        DialectType::Presto
    }

    fn parser_config(&self, config: &mut ParserConfig) {
        config.null_ordering = NullOrdering::NullsAreLast;
        config.normalization = NormalizationStrategy::CaseInsensitive;
        config.time_mapping = TimeMapping::new(PRESTO_TIME_MAPPING);
        config.time_format = Some(DEFAULT_TIME_FORMAT.to_string());

        config.type_names.insert("ROW".to_string(), DataTypeKind::Struct);
        config.type_names.insert("VARBINARY".to_string(), DataTypeKind::VarBinary);

        config.function("BITWISE_AND", |a, _| operator_from_function("BITWISE_AND", a, Expression::BitwiseAnd));
        config.function("BITWISE_OR", |a, _| operator_from_function("BITWISE_OR", a, Expression::BitwiseOr));
        config.function("BITWISE_XOR", |a, _| operator_from_function("BITWISE_XOR", a, Expression::BitwiseXor));
        config.function("BITWISE_ARITHMETIC_SHIFT_LEFT", |a, _| {
            operator_from_function("BITWISE_ARITHMETIC_SHIFT_LEFT", a, Expression::ShiftLeft)
        });
        config.function("BITWISE_ARITHMETIC_SHIFT_RIGHT", |a, _| {
            operator_from_function("BITWISE_ARITHMETIC_SHIFT_RIGHT", a, Expression::ShiftRight)
        });
        config.function("BITWISE_NOT", |a, _| {
            let [this] = take_args("BITWISE_NOT", a)?;
            Ok(Expression::BitwiseNot(Box::new(UnaryOp::new(this))))
        });

        config.function("DATE_ADD", |args, _| unit_first("DATE_ADD", args, Expression::DateAdd));
        config.function("DATE_DIFF", |args, _| unit_first_diff("DATE_DIFF", args));
        config.function("DATE_FORMAT", |a, c| format_func(Expression::TimeToStr, "DATE_FORMAT", a, c));
        config.function("DATE_PARSE", |a, c| format_func(Expression::StrToTime, "DATE_PARSE", a, c));
        config.function("FROM_UNIXTIME", |a, _| unary(Expression::UnixToTime, "FROM_UNIXTIME", a));
        config.function("TO_UNIXTIME", |a, _| unary(Expression::TimeToUnix, "TO_UNIXTIME", a));
        config.function("APPROX_PERCENTILE", |a, _| {
            binary(Expression::ApproxQuantile, "APPROX_PERCENTILE", a)
        });
        config.function("CONTAINS", |a, _| binary(Expression::ArrayContains, "CONTAINS", a));
        config.function("CARDINALITY", |a, _| unary(Expression::ArraySize, "CARDINALITY", a));
    }

    fn generator_config(&self, config: &mut GeneratorConfig) {
        use ExpressionKind as K;

        config.null_ordering = NullOrdering::NullsAreLast;
        config.nested_type_style = NestedTypeStyle::Parens;
        config.supports_qualify = false;
        config.supports_distinct_on = false;
        config.supports_ilike = false;
        config.supports_bucket_sample = false;
        config.supports_hive_clauses = false;
        config.time_mapping = TimeMapping::new(PRESTO_TIME_MAPPING);
        config.time_format = Some(DEFAULT_TIME_FORMAT.to_string());

        config.type_name(DataTypeKind::Int, "INTEGER");
        config.type_name(DataTypeKind::Float, "REAL");
        config.type_name(DataTypeKind::Text, "VARCHAR");
        config.type_name(DataTypeKind::Binary, "VARBINARY");
        config.type_name(DataTypeKind::Blob, "VARBINARY");
        config.type_name(DataTypeKind::Struct, "ROW");
        config.type_name(DataTypeKind::DateTime, "TIMESTAMP");

        operator_as_function(config, K::BitwiseAnd, "BITWISE_AND");
        operator_as_function(config, K::BitwiseOr, "BITWISE_OR");
        operator_as_function(config, K::BitwiseXor, "BITWISE_XOR");
        operator_as_function(config, K::ShiftLeft, "BITWISE_ARITHMETIC_SHIFT_LEFT");
        operator_as_function(config, K::ShiftRight, "BITWISE_ARITHMETIC_SHIFT_RIGHT");
        config.transform(K::BitwiseNot, |g, e| {
            let Expression::BitwiseNot(op) = e else { return g.render_default(e) };
            g.render_function("BITWISE_NOT", &[&op.this])
        });
        bracket_arrays(config, "ARRAY");

        config.rename(K::Quantile, "APPROX_PERCENTILE");
        config.rename(K::ApproxQuantile, "APPROX_PERCENTILE");
        config.rename(K::ArrayContains, "CONTAINS");
        config.rename(K::ArraySize, "CARDINALITY");
        config.rename(K::UnixToTime, "FROM_UNIXTIME");
        config.rename(K::TimeToUnix, "TO_UNIXTIME");
        config.rename(K::Rand, "RANDOM");
        config.rename(K::Substring, "SUBSTR");

        config.transform(K::StrPosition, |g, e| {
            let Expression::StrPosition(f) = e else { return g.render_default(e) };
            render_strpos(g, f)
        });
        config.transform(K::Initcap, |g, e| {
            let Expression::Initcap(f) = e else { return g.render_default(e) };
            let pattern = Expression::string(r"(\w)(\w*)");
            g.render_function("REGEXP_REPLACE", &[&f.this, &pattern, &initcap_lambda()])
        });
        config.transform(K::ArraySort, |g, e| {
            let Expression::ArraySort(f) = e else { return g.render_default(e) };
            if let Some(comparator) = &f.comparator {
                return g.render_function("ARRAY_SORT", &[&f.this, comparator]);
            }
            match f.asc.as_ref().map(flag_value) {
                Some(Some(false)) => g.render_function("ARRAY_SORT", &[&f.this, &descending_comparator()]),
                Some(None) => Err(g.unsupported("SORT_ARRAY with a non-literal direction")),
                _ => g.render_function("ARRAY_SORT", &[&f.this]),
            }
        });
        config.transform(K::GroupConcat, |g, e| {
            let Expression::GroupConcat(f) = e else { return g.render_default(e) };
            let collected = if f.distinct {
                Expression::SetAgg(Box::new(UnaryFunc::new(f.this.clone())))
            } else {
                Expression::ArrayAgg(Box::new(UnaryFunc::new(f.this.clone())))
            };
            let separator = f.separator.clone().unwrap_or_else(|| Expression::string(","));
            g.render_function("ARRAY_JOIN", &[&collected, &separator])
        });

        config.transform(K::TsOrDsToDate, |g, e| {
            let Expression::TsOrDsToDate(f) = e else { return g.render_default(e) };
            g.render(&date_prefix_as_date(&f.this))
        });
        config.transform(K::TsOrDsAdd, |g, e| {
            let Expression::TsOrDsAdd(f) = e else { return g.render_default(e) };
            let prefix = date_prefix(f.this.clone());
            let parsed = Expression::StrToTime(Box::new(FormatFunc::new(
                prefix,
                Some(Expression::string(DEFAULT_DATE_FORMAT)),
            )));
            render_date_add(g, f.unit_or_day(), &f.expression, &parsed)
        });
        config.transform(K::DateAdd, |g, e| {
            let Expression::DateAdd(f) = e else { return g.render_default(e) };
            render_date_add(g, f.unit_or_day(), &f.expression, &f.this)
        });
        config.transform(K::DateSub, |g, e| {
            let Expression::DateSub(f) = e else { return g.render_default(e) };
            render_date_add(g, f.unit_or_day(), &negated(&f.expression), &f.this)
        });
        config.transform(K::DateDiff, |g, e| {
            let Expression::DateDiff(f) = e else { return g.render_default(e) };
            let unit = unit_string(&f.unit_or_day().to_lowercase());
            g.render_function("DATE_DIFF", &[&unit, &f.expression, &f.this])
        });
        config.transform(K::TimeToStr, |g, e| {
            let Expression::TimeToStr(f) = e else { return g.render_default(e) };
            let format = format_or_default(g, f.format.as_ref());
            render_formatted(g, "DATE_FORMAT", &f.this, &format)
        });
        config.transform(K::StrToTime, |g, e| {
            let Expression::StrToTime(f) = e else { return g.render_default(e) };
            let format = format_or_default(g, f.format.as_ref());
            render_formatted(g, "DATE_PARSE", &f.this, &format)
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
            g.render_function("TO_UNIXTIME", &[&parsed])
        });
        config.transform(K::UnixToStr, |g, e| {
            let Expression::UnixToStr(f) = e else { return g.render_default(e) };
            let time = Expression::UnixToTime(Box::new(UnaryFunc::new(f.this.clone())));
            let format = format_or_default(g, f.format.as_ref());
            render_formatted(g, "DATE_FORMAT", &time, &format)
        });
    }
}

fn render_date_add(g: &mut Generator<'_>, unit: &str, amount: &Expression, this: &Expression) -> Result<()> {
    let unit = unit_string(unit);
    g.render_function("DATE_ADD", &[&unit, amount, this])
}

/// `SUBSTR(x, 1, 10)`
fn date_prefix(this: Expression) -> Expression {
    Expression::Substring(Box::new(Substring {
        this,
        start: Some(Expression::number(1)),
        length: Some(Expression::number(10)),
    }))
}

/// `CAST(SUBSTR(CAST(x AS VARCHAR), 1, 10) AS DATE)`
pub(crate) fn date_prefix_as_date(this: &Expression) -> Expression {
    let text = Expression::cast(this.clone(), DataType::new(DataTypeKind::VarChar));
    Expression::cast(date_prefix(text), DataType::new(DataTypeKind::Date))
}

/// `x -> UPPER(x[1]) || LOWER(x[2])` over the capture groups of `(\w)(\w*)`
fn initcap_lambda() -> Expression {
    let group = |i| {
        Expression::Bracket(Box::new(Bracket {
            this: Expression::column("x"),
            expressions: vec![Expression::number(i)],
        }))
    };
    let body = Expression::DPipe(Box::new(BinaryOp::new(
        Expression::Upper(Box::new(UnaryFunc::new(group(1)))),
        Expression::Lower(Box::new(UnaryFunc::new(group(2)))),
    )));
    Expression::Lambda(Box::new(Lambda {
        params: vec![Identifier::new("x")],
        body,
    }))
}

/// `(a, b) -> CASE WHEN a < b THEN 1 WHEN a > b THEN -1 ELSE 0 END`
fn descending_comparator() -> Expression {
    let (a, b) = (Expression::column("a"), Expression::column("b"));
    let case = Expression::Case(Box::new(Case {
        operand: None,
        whens: vec![
            (
                Expression::Lt(Box::new(BinaryOp::new(a.clone(), b.clone()))),
                Expression::number(1),
            ),
            (Expression::Gt(Box::new(BinaryOp::new(a, b))), Expression::number(-1)),
        ],
        default: Some(Expression::number(0)),
    }));
    Expression::Lambda(Box::new(Lambda {
        params: vec![Identifier::new("a"), Identifier::new("b")],
        body: case,
    }))
}

#[cfg(test)]
mod tests {
    use crate::dialects::{Dialect, DialectType};
    use crate::error::Error;

    fn presto_from(sql: &str, source: DialectType) -> String {
        let result = Dialect::get(source)
            .transpile_to(sql, &Dialect::get(DialectType::Presto), &Default::default())
            .expect("Transpile failed");
        result[0].clone()
    }

    #[test]
    fn test_bitwise_functions() {
        assert_eq!(presto_from("SELECT x & 1", DialectType::Hive), "SELECT BITWISE_AND(x, 1)");
        assert_eq!(presto_from("SELECT ~x", DialectType::Hive), "SELECT BITWISE_NOT(x)");
        assert_eq!(
            presto_from("SELECT x << 1", DialectType::Hive),
            "SELECT BITWISE_ARITHMETIC_SHIFT_LEFT(x, 1)"
        );
        assert_eq!(
            presto_from("SELECT x & 1 > 0", DialectType::Hive),
            "SELECT BITWISE_AND(x, 1) > 0"
        );
    }

    #[test]
    fn test_bitwise_functions_parse_back() {
        assert_eq!(
            presto_from("SELECT BITWISE_OR(x, 1)", DialectType::Presto),
            "SELECT BITWISE_OR(x, 1)"
        );
        let hive = Dialect::get(DialectType::Presto)
            .transpile_to("SELECT BITWISE_XOR(x, 1)", &Dialect::get(DialectType::Hive), &Default::default())
            .expect("Transpile failed");
        assert_eq!(hive[0], "SELECT x ^ 1");
    }

    #[test]
    fn test_date_functions_roundtrip() {
        for sql in [
            "SELECT DATE_ADD('DAY', 1, x)",
            "SELECT DATE_DIFF('day', a, b)",
            "SELECT DATE_FORMAT(x, '%Y-%m-%d %H:%i:%S')",
            "SELECT DATE_PARSE(x, '%Y-%m-%d')",
            "SELECT TO_UNIXTIME(x)",
            "SELECT FROM_UNIXTIME(x)",
        ] {
            assert_eq!(presto_from(sql, DialectType::Presto), sql);
        }
    }

    #[test]
    fn test_hive_date_add() {
        assert_eq!(
            presto_from("SELECT DATE_ADD('2020-01-01', 1)", DialectType::Hive),
            "SELECT DATE_ADD('DAY', 1, DATE_PARSE(SUBSTR('2020-01-01', 1, 10), '%Y-%m-%d'))"
        );
    }

    #[test]
    fn test_null_ordering() {
        assert_eq!(
            presto_from(
                "SELECT fname FROM t ORDER BY age DESC NULLS FIRST, fname ASC NULLS LAST, lname",
                DialectType::Hive
            ),
            "SELECT fname FROM t ORDER BY age DESC NULLS FIRST, fname, lname NULLS FIRST"
        );
    }

    #[test]
    fn test_array_functions() {
        assert_eq!(presto_from("SELECT SIZE(x)", DialectType::Hive), "SELECT CARDINALITY(x)");
        assert_eq!(
            presto_from("SELECT ARRAY_CONTAINS(x, 1)", DialectType::Hive),
            "SELECT CONTAINS(x, 1)"
        );
        assert_eq!(
            presto_from("SELECT SORT_ARRAY(x, FALSE)", DialectType::Hive),
            "SELECT ARRAY_SORT(x, (a, b) -> CASE WHEN a < b THEN 1 WHEN a > b THEN -1 ELSE 0 END)"
        );
        assert_eq!(presto_from("SELECT ARRAY(1, 2)", DialectType::Hive), "SELECT ARRAY[1, 2]");
    }

    #[test]
    fn test_posexplode_column_order() {
        assert_eq!(
            presto_from("SELECT a FROM x LATERAL VIEW POSEXPLODE(y) t AS p, a", DialectType::Hive),
            "SELECT a FROM x CROSS JOIN UNNEST(y) WITH ORDINALITY AS t(a, p)"
        );
        let hive = Dialect::get(DialectType::Presto)
            .transpile_to(
                "SELECT a FROM x CROSS JOIN UNNEST(y) WITH ORDINALITY AS t(a, p)",
                &Dialect::get(DialectType::Hive),
                &Default::default(),
            )
            .expect("Transpile failed");
        assert_eq!(hive[0], "SELECT a FROM x LATERAL VIEW POSEXPLODE(y) t AS p, a");
    }

    #[test]
    fn test_initcap_as_regexp_replace() {
        assert_eq!(
            presto_from("SELECT INITCAP('new york')", DialectType::Hive),
            r"SELECT REGEXP_REPLACE('new york', '(\w)(\w*)', x -> UPPER(x[1]) || LOWER(x[2]))"
        );
    }

    #[test]
    fn test_parameterized_types() {
        assert_eq!(
            presto_from("SELECT CAST(x AS ARRAY<INT>)", DialectType::Hive),
            "SELECT TRY_CAST(x AS ARRAY(INTEGER))"
        );
    }

    #[test]
    fn test_qualify_unsupported() {
        let snowflake = Dialect::get(DialectType::Snowflake);
        let ast = snowflake
            .parse("SELECT a FROM t QUALIFY ROW_NUMBER() OVER (ORDER BY a) = 1")
            .expect("Parse failed");
        let err = Dialect::get(DialectType::Presto).generate(&ast[0]).unwrap_err();
        assert!(matches!(err, Error::Unsupported { .. }), "got {err:?}");
    }
}
