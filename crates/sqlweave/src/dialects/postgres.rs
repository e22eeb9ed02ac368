//! PostgreSQL Dialect
//!
//! PostgreSQL is the base for the Redshift dialect.
//! Key differences:
//! - `$$dollar quoted$$` strings
//! - `~` regex match, `^` exponentiation, `#` bitwise XOR
//! - `->` / `->>` JSON access operators
//! - TO_CHAR / TO_TIMESTAMP / TO_DATE with `YYYY-MM-DD HH24:MI:SS` templates
//! - Date arithmetic with interval literals: `x + INTERVAL '1 DAY'`
//! - `ARRAY[...]` literals, `x @> ARRAY[y]` containment, STRING_AGG
//! - NULLs sort as larger than every value
//! - No QUALIFY or TRY_CAST

use super::{
    bracket_arrays, format_or_default, function_as_infix, operator_as_infix, render_formatted,
    render_if_as_case, render_strpos, DialectImpl, DialectType, DEFAULT_TIME_FORMAT,
};
use crate::error::Result;
use crate::expressions::{
    BinaryFunc, BinaryOp, DataType, DataTypeKind, DateArith, Expression, ExpressionKind, Extract,
    Function, GroupConcat, Interval, Literal, UnaryFunc, VarArgFunc,
};
use crate::generator::{Generator, GeneratorConfig, NestedTypeStyle, PropertiesStyle};
use crate::parser::{
    check_arity, format_func, precedence, take_args, unary, unit_name, NullOrdering, ParserConfig,
};
use crate::time::TimeMapping;
use crate::tokens::{TokenType, TokenizerConfig};

/// Template patterns shared by PostgreSQL-family TO_CHAR implementations
pub(crate) const POSTGRES_TIME_MAPPING: &[(&str, &str)] = &[
    ("YYYY", "%Y"),
    ("YY", "%y"),
    ("MM", "%m"),
    ("DD", "%d"),
    ("DDD", "%j"),
    ("HH", "%I"),
    ("HH12", "%I"),
    ("HH24", "%H"),
    ("MI", "%M"),
    ("SS", "%S"),
    ("US", "%f"),
    ("PM", "%p"),
    ("AM", "%p"),
    ("Month", "%B"),
    ("Mon", "%b"),
    ("Day", "%A"),
    ("Dy", "%a"),
];

/// PostgreSQL dialect
pub struct PostgresDialect;

impl DialectImpl for PostgresDialect {
    fn dialect_type(&self) -> DialectType {
        DialectType::Postgres
    }

    fn tokenizer_config(&self, config: &mut TokenizerConfig) {
        config.quotes.insert("$$".to_string(), "$$".to_string());
        config.operators.insert("@>".to_string(), TokenType::AtGt);
    }

    fn parser_config(&self, config: &mut ParserConfig) {
        config.null_ordering = NullOrdering::NullsAreLarge;
        config.time_mapping = TimeMapping::new(POSTGRES_TIME_MAPPING);
        config.time_format = Some(DEFAULT_TIME_FORMAT.to_string());

        config.operator(TokenType::Tilde, precedence::COMPARISON, |l, r| {
            Expression::RegexpLike(Box::new(BinaryFunc::new(l, r)))
        });
        config.operator(TokenType::Caret, precedence::EXPONENT, |l, r| {
            Expression::Pow(Box::new(BinaryFunc::new(l, r)))
        });
        config.operator(TokenType::Arrow, precedence::ACCESS, |l, r| {
            Expression::JsonExtract(Box::new(BinaryFunc::new(l, r)))
        });
        config.operator(TokenType::DArrow, precedence::ACCESS, |l, r| {
            Expression::JsonExtractScalar(Box::new(BinaryFunc::new(l, r)))
        });
        config.operator(TokenType::AtGt, precedence::COMPARISON, array_contains);

        config.type_names.insert("SERIAL".to_string(), DataTypeKind::Int);
        config.type_names.insert("BIGSERIAL".to_string(), DataTypeKind::BigInt);
        config.type_names.insert("JSONB".to_string(), DataTypeKind::Variant);

        config.function("TO_CHAR", |a, c| format_func(Expression::TimeToStr, "TO_CHAR", a, c));
        config.function("TO_DATE", |a, c| format_func(Expression::StrToDate, "TO_DATE", a, c));
        // TO_TIMESTAMP(epoch) or TO_TIMESTAMP(text, template)
        config.function("TO_TIMESTAMP", |args, c| {
            if args.len() == 1 {
                return unary(Expression::UnixToTime, "TO_TIMESTAMP", args);
            }
            format_func(Expression::StrToTime, "TO_TIMESTAMP", args, c)
        });
        config.function("CARDINALITY", |a, _| unary(Expression::ArraySize, "CARDINALITY", a));
        config.function("DATE_PART", |args, _| {
            let [field, this] = take_args("DATE_PART", args)?;
            let field = unit_name(&field).unwrap_or_else(|| "EPOCH".to_string());
            Ok(Expression::Extract(Box::new(Extract { field, this })))
        });
        config.function("STRING_AGG", |args, _| {
            check_arity("STRING_AGG", &args, 1, 2)?;
            let mut args = args.into_iter();
            let this = args.next().unwrap_or_else(Expression::null);
            Ok(Expression::GroupConcat(Box::new(GroupConcat {
                this,
                separator: args.next(),
                distinct: false,
            })))
        });
    }

    fn generator_config(&self, config: &mut GeneratorConfig) {
        use ExpressionKind as K;

        config.null_ordering = NullOrdering::NullsAreLarge;
        config.nested_type_style = NestedTypeStyle::Postfix;
        config.supports_qualify = false;
        config.supports_try_cast = false;
        config.supports_bucket_sample = false;
        config.supports_hive_clauses = false;
        config.properties_style = PropertiesStyle::Unsupported;
        config.time_mapping = TimeMapping::new(POSTGRES_TIME_MAPPING);
        config.time_format = Some(DEFAULT_TIME_FORMAT.to_string());

        config.type_name(DataTypeKind::TinyInt, "SMALLINT");
        config.type_name(DataTypeKind::Float, "REAL");
        config.type_name(DataTypeKind::Double, "DOUBLE PRECISION");
        config.type_name(DataTypeKind::Binary, "BYTEA");
        config.type_name(DataTypeKind::VarBinary, "BYTEA");
        config.type_name(DataTypeKind::Blob, "BYTEA");
        config.type_name(DataTypeKind::DateTime, "TIMESTAMP");
        config.type_name(DataTypeKind::Variant, "JSONB");

        operator_as_infix(config, K::BitwiseXor, "#");
        function_as_infix(config, K::RegexpLike, "~");
        function_as_infix(config, K::JsonExtract, "->");
        function_as_infix(config, K::JsonExtractScalar, "->>");
        function_as_infix(config, K::Pow, "^");
        function_as_infix(config, K::ArrayContainsAll, "@>");
        bracket_arrays(config, "ARRAY");

        config.rename(K::ArraySize, "CARDINALITY");
        config.rename(K::Explode, "UNNEST");
        config.rename(K::Rand, "RANDOM");
        config.rename(K::UnixToTime, "TO_TIMESTAMP");

        config.transform(K::If, |g, e| {
            let Expression::If(f) = e else { return g.render_default(e) };
            render_if_as_case(g, f)
        });
        config.transform(K::StrPosition, |g, e| {
            let Expression::StrPosition(f) = e else { return g.render_default(e) };
            render_strpos(g, f)
        });
        config.transform(K::ArrayContains, |g, e| {
            let Expression::ArrayContains(f) = e else { return g.render_default(e) };
            let needle = Expression::Array(Box::new(VarArgFunc::new(vec![f.expression.clone()])));
            g.render(&f.this)?;
            g.write(" @> ");
            g.render(&needle)
        });
        config.transform(K::GroupConcat, |g, e| {
            let Expression::GroupConcat(f) = e else { return g.render_default(e) };
            let separator = f.separator.clone().unwrap_or_else(|| Expression::string(","));
            g.write(&g.function_name("STRING_AGG"));
            g.write("(");
            if f.distinct {
                g.keyword("DISTINCT ");
            }
            g.render(&f.this)?;
            g.write(", ");
            g.render(&separator)?;
            g.write(")");
            Ok(())
        });
        config.transform(K::SetAgg, |g, e| {
            let Expression::SetAgg(f) = e else { return g.render_default(e) };
            g.render(&distinct_call("ARRAY_AGG", &f.this))
        });
        config.transform(K::ApproxDistinct, |g, e| {
            let Expression::ApproxDistinct(f) = e else { return g.render_default(e) };
            tracing::debug!(
                target: "sqlweave::generate",
                dialect = %g.dialect(),
                "APPROX_DISTINCT rendered as an exact COUNT(DISTINCT)"
            );
            g.render(&distinct_call("COUNT", &f.this))
        });
        config.transform(K::Quantile, |g, e| {
            let Expression::Quantile(f) = e else { return g.render_default(e) };
            render_percentile(g, f)
        });
        config.transform(K::ApproxQuantile, |g, e| {
            let Expression::ApproxQuantile(f) = e else { return g.render_default(e) };
            render_percentile(g, f)
        });

        config.transform(K::TsOrDsToDate, |g, e| {
            let Expression::TsOrDsToDate(f) = e else { return g.render_default(e) };
            g.render(&as_date(&f.this))
        });
        config.transform(K::DateAdd, |g, e| {
            let Expression::DateAdd(f) = e else { return g.render_default(e) };
            g.render(&shifted(f.this.clone(), f, Expression::Add))
        });
        config.transform(K::TsOrDsAdd, |g, e| {
            let Expression::TsOrDsAdd(f) = e else { return g.render_default(e) };
            g.render(&shifted(as_date(&f.this), f, Expression::Add))
        });
        config.transform(K::DateSub, |g, e| {
            let Expression::DateSub(f) = e else { return g.render_default(e) };
            g.render(&shifted(f.this.clone(), f, Expression::Sub))
        });
        config.transform(K::DateDiff, |g, e| {
            let Expression::DateDiff(f) = e else { return g.render_default(e) };
            render_date_diff(g, f)
        });
        for (kind, field) in [(K::Day, "DAY"), (K::Month, "MONTH"), (K::Year, "YEAR")] {
            config.transform(kind, move |g, e| match e {
                Expression::Day(f) | Expression::Month(f) | Expression::Year(f) => {
                    g.render(&extract(field, f.this.clone()))
                }
                _ => g.render_default(e),
            });
        }

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
            g.render(&extract("EPOCH", f.this.clone()))
        });
        config.transform(K::StrToUnix, |g, e| {
            let Expression::StrToUnix(f) = e else { return g.render_default(e) };
            g.render(&extract("EPOCH", Expression::StrToTime(f.clone())))
        });
        config.transform(K::UnixToStr, |g, e| {
            let Expression::UnixToStr(f) = e else { return g.render_default(e) };
            let time = Expression::UnixToTime(Box::new(UnaryFunc::new(f.this.clone())));
            let format = format_or_default(g, f.format.as_ref());
            render_formatted(g, "TO_CHAR", &time, &format)
        });
    }
}

fn distinct_call(name: &str, this: &Expression) -> Expression {
    Expression::Function(Box::new(Function {
        name: name.to_string(),
        args: vec![this.clone()],
        distinct: true,
    }))
}

pub(crate) fn extract(field: &str, this: Expression) -> Expression {
    Expression::Extract(Box::new(Extract {
        field: field.to_string(),
        this,
    }))
}

/// `CAST(x AS DATE)` unless `x` is already a date
pub(crate) fn as_date(this: &Expression) -> Expression {
    match this {
        Expression::Cast(cast) if cast.to.kind == DataTypeKind::Date => this.clone(),
        Expression::TsOrDsToDate(f) => as_date(&f.this),
        other => Expression::cast(other.clone(), DataType::new(DataTypeKind::Date)),
    }
}

/// `INTERVAL 'n UNIT'` for a literal amount, `n * INTERVAL '1 UNIT'` otherwise
pub(crate) fn interval_literal(amount: &Expression, unit: &str) -> Expression {
    let interval = |text: String| {
        Expression::Interval(Box::new(Interval {
            this: Expression::string(text),
            unit: None,
        }))
    };
    match amount {
        Expression::Literal(Literal::Number(n)) => interval(format!("{n} {unit}")),
        Expression::Literal(_) | Expression::Column(_) | Expression::Paren(_) => Expression::Mul(
            Box::new(BinaryOp::new(amount.clone(), interval(format!("1 {unit}")))),
        ),
        compound => Expression::Mul(Box::new(BinaryOp::new(
            Expression::paren(compound.clone()),
            interval(format!("1 {unit}")),
        ))),
    }
}

fn shifted(this: Expression, f: &DateArith, op: fn(Box<BinaryOp>) -> Expression) -> Expression {
    op(Box::new(BinaryOp::new(this, interval_literal(&f.expression, f.unit_or_day()))))
}

/// Day differences subtract dates; clock units divide the epoch difference
fn render_date_diff(g: &mut Generator<'_>, f: &DateArith) -> Result<()> {
    let seconds = match f.unit_or_day() {
        "DAY" => {
            let diff = Expression::Sub(Box::new(BinaryOp::new(as_date(&f.this), as_date(&f.expression))));
            return g.render(&diff);
        }
        "WEEK" => 604_800,
        "HOUR" => 3_600,
        "MINUTE" => 60,
        "SECOND" => 1,
        unit => return Err(g.unsupported(format!("DATE_DIFF by {unit}"))),
    };
    let span = Expression::Sub(Box::new(BinaryOp::new(f.this.clone(), f.expression.clone())));
    let epoch = extract("EPOCH", span);
    let scaled = if seconds == 1 {
        epoch
    } else {
        Expression::Div(Box::new(BinaryOp::new(epoch, Expression::number(seconds))))
    };
    g.render(&Expression::cast(scaled, DataType::new(DataTypeKind::BigInt)))
}

/// `PERCENTILE_CONT(q) WITHIN GROUP (ORDER BY x)`
pub(crate) fn render_percentile(g: &mut Generator<'_>, f: &BinaryFunc) -> Result<()> {
    g.render_function("PERCENTILE_CONT", &[&f.expression])?;
    g.keyword(" WITHIN GROUP (ORDER BY ");
    g.render(&f.this)?;
    g.write(")");
    Ok(())
}

/// `x @> ARRAY[e]` tests one element; any other right side is a containment of all
fn array_contains(this: Expression, expression: Expression) -> Expression {
    match expression {
        Expression::Array(array) if array.expressions.len() == 1 => {
            let needle = array.expressions.into_iter().next().unwrap_or_else(Expression::null);
            Expression::ArrayContains(Box::new(BinaryFunc::new(this, needle)))
        }
        other => Expression::ArrayContainsAll(Box::new(BinaryFunc::new(this, other))),
    }
}
