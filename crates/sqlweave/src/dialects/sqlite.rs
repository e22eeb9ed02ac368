//! SQLite Dialect
//!
//! Key differences:
//! - `"`, backtick and `[ ]` identifier quoting
//! - Type affinities: INTEGER, REAL, TEXT, BLOB
//! - STRFTIME(format, x) and DATE(x, modifier) for time handling
//! - IIF, INSTR, RANDOM, GROUP_CONCAT(x, sep)
//! - No arrays, QUALIFY, DISTINCT ON, ILIKE or TRY_CAST

use super::{format_first, render_format_first, DialectImpl, DialectType};
use crate::error::Result;
use crate::expressions::{
    BinaryOp, DataType, DataTypeKind, DateArith, Expression, ExpressionKind, Literal, StrPosition,
};
use crate::generator::{Generator, GeneratorConfig, PropertiesStyle};
use crate::parser::{
    take_args, ts_or_ds_to_date, unary, NormalizationStrategy, ParserConfig,
};
use crate::tokens::{TokenType, TokenizerConfig};

/// SQLite dialect
pub struct SQLiteDialect;

impl DialectImpl for SQLiteDialect {
    fn dialect_type(&self) -> DialectType {
        DialectType::SQLite
    }

    fn tokenizer_config(&self, config: &mut TokenizerConfig) {
        config.identifiers.insert('[', ']');
        config.identifiers.insert('`', '`');
        config.nested_comments = false;
        config.keywords.insert("PRAGMA".to_string(), TokenType::Command);
        config.keywords.insert("VACUUM".to_string(), TokenType::Command);
    }

    fn parser_config(&self, config: &mut ParserConfig) {
        config.normalization = NormalizationStrategy::CaseInsensitive;

        config.function("INSTR", |args, _| {
            let [this, substr] = take_args("INSTR", args)?;
            Ok(Expression::StrPosition(Box::new(StrPosition {
                this,
                substr,
                position: None,
            })))
        });
        config.function("STRFTIME", |a, c| format_first(Expression::TimeToStr, "STRFTIME", a, c));
        config.function("DATE", |args, _| {
            if args.len() == 1 {
                let [this] = take_args("DATE", args)?;
                return Ok(ts_or_ds_to_date(this));
            }
            Ok(with_modifiers("DATE", args))
        });
        config.function("DATETIME", |args, _| Ok(with_modifiers("DATETIME", args)));
        config.function("UNIXEPOCH", |a, _| unary(Expression::TimeToUnix, "UNIXEPOCH", a));
    }

    fn generator_config(&self, config: &mut GeneratorConfig) {
        use ExpressionKind as K;

        config.supports_qualify = false;
        config.supports_distinct_on = false;
        config.supports_ilike = false;
        config.supports_try_cast = false;
        config.supports_bucket_sample = false;
        config.supports_hive_clauses = false;
        config.properties_style = PropertiesStyle::Unsupported;

        for (kind, name) in [
            (DataTypeKind::Boolean, "INTEGER"),
            (DataTypeKind::TinyInt, "INTEGER"),
            (DataTypeKind::SmallInt, "INTEGER"),
            (DataTypeKind::Int, "INTEGER"),
            (DataTypeKind::BigInt, "INTEGER"),
            (DataTypeKind::Float, "REAL"),
            (DataTypeKind::Double, "REAL"),
            (DataTypeKind::Char, "TEXT"),
            (DataTypeKind::VarChar, "TEXT"),
            (DataTypeKind::NVarChar, "TEXT"),
            (DataTypeKind::Binary, "BLOB"),
            (DataTypeKind::VarBinary, "BLOB"),
        ] {
            config.type_name(kind, name);
        }

        config.rename(K::If, "IIF");
        config.rename(K::Rand, "RANDOM");
        config.rename(K::TimeToUnix, "UNIXEPOCH");

        config.transform(K::StrPosition, |g, e| {
            let Expression::StrPosition(f) = e else { return g.render_default(e) };
            if f.position.is_some() {
                return Err(g.unsupported("INSTR with a start position"));
            }
            g.render_function("INSTR", &[&f.this, &f.substr])
        });
        config.transform(K::GroupConcat, |g, e| {
            let Expression::GroupConcat(f) = e else { return g.render_default(e) };
            if f.distinct && f.separator.is_some() {
                return Err(g.unsupported("GROUP_CONCAT with DISTINCT and a separator"));
            }
            g.render_default(e)
        });
        config.transform(K::TimeToStr, |g, e| {
            let Expression::TimeToStr(f) = e else { return g.render_default(e) };
            render_format_first(g, "STRFTIME", f)
        });
        config.transform(K::TsOrDsToDate, |g, e| {
            let Expression::TsOrDsToDate(f) = e else { return g.render_default(e) };
            g.render_function("DATE", &[&f.this])
        });
        config.transform(K::DateAdd, |g, e| {
            let Expression::DateAdd(f) = e else { return g.render_default(e) };
            render_modifier(g, &f.this, &f.expression, false, f.unit_or_day())
        });
        config.transform(K::DateSub, |g, e| {
            let Expression::DateSub(f) = e else { return g.render_default(e) };
            render_modifier(g, &f.this, &f.expression, true, f.unit_or_day())
        });
        config.transform(K::TsOrDsAdd, |g, e| {
            let Expression::TsOrDsAdd(f) = e else { return g.render_default(e) };
            render_modifier(g, &f.this, &f.expression, false, f.unit_or_day())
        });
        config.transform(K::DateDiff, |g, e| {
            let Expression::DateDiff(f) = e else { return g.render_default(e) };
            if f.unit_or_day() != "DAY" {
                return Err(g.unsupported(format!("DATE_DIFF by {}", f.unit_or_day())));
            }
            let julian = |x: &Expression| Expression::func("JULIANDAY", vec![x.clone()]);
            let days = Expression::Sub(Box::new(BinaryOp::new(julian(&f.this), julian(&f.expression))));
            g.render(&Expression::cast(days, DataType::new(DataTypeKind::Int)))
        });
        for kind in [K::Unnest, K::Explode, K::Array, K::ArrayContains, K::ArrayContainsAll] {
            config.transform(kind, |g, e| Err(g.unsupported(e.kind().to_string())));
        }
    }
}

/// `DATE(x, 'n unit')`, or `DATETIME(..)` for clock units
fn render_modifier(
    g: &mut Generator<'_>,
    this: &Expression,
    amount: &Expression,
    subtract: bool,
    unit: &str,
) -> Result<()> {
    let (factor, unit) = match unit {
        "WEEK" => (7, "DAY"),
        "QUARTER" => (3, "MONTH"),
        "DAY" | "MONTH" | "YEAR" | "HOUR" | "MINUTE" | "SECOND" => (1, unit),
        other => return Err(g.unsupported(format!("date arithmetic by {other}"))),
    };
    let function = match unit {
        "HOUR" | "MINUTE" | "SECOND" => "DATETIME",
        _ => "DATE",
    };
    let suffix = format!(" {}", unit.to_lowercase());
    let scaled = constant(amount)
        .and_then(|n| n.checked_mul(factor))
        .and_then(|n| if subtract { n.checked_neg() } else { Some(n) });
    let modifier = match scaled {
        Some(n) => Expression::string(format!("{n}{suffix}")),
        None => {
            let mut amount = amount.clone();
            if factor != 1 {
                amount = Expression::Mul(Box::new(BinaryOp::new(amount, Expression::number(factor))));
            }
            let mut text = Expression::cast(amount, DataType::new(DataTypeKind::Text));
            if subtract {
                text = Expression::DPipe(Box::new(BinaryOp::new(Expression::string("-"), text)));
            }
            Expression::DPipe(Box::new(BinaryOp::new(text, Expression::string(suffix))))
        }
    };
    g.render_function(function, &[&strip_date_cast(this), &modifier])
}

/// Integer value of a literal or a product of literals
fn constant(expr: &Expression) -> Option<i64> {
    match expr {
        Expression::Literal(Literal::Number(n)) => n.parse().ok(),
        Expression::Mul(op) => constant(&op.left)?.checked_mul(constant(&op.right)?),
        Expression::Neg(op) => constant(&op.this)?.checked_neg(),
        Expression::Paren(p) => constant(&p.this),
        _ => None,
    }
}

/// `DATE(x, '1 day', ...)` as nested DateAdd nodes.
///
/// DATE takes calendar units and DATETIME clock units. Any other modifier
/// (`'start of month'`, a computed string) keeps the call as written.
fn with_modifiers(name: &str, args: Vec<Expression>) -> Expression {
    let clock = name == "DATETIME";
    let steps: Option<Vec<(i64, &'static str)>> = args
        .iter()
        .skip(1)
        .map(|arg| match arg {
            Expression::Literal(Literal::String(text)) => parse_modifier(text, clock),
            _ => None,
        })
        .collect();
    let (Some(steps), Some(first)) = (steps, args.first()) else {
        return Expression::func(name, args);
    };
    if steps.is_empty() {
        return Expression::func(name, args);
    }
    let start = if clock { first.clone() } else { ts_or_ds_to_date(first.clone()) };
    steps.into_iter().fold(start, |this, (n, unit)| {
        Expression::DateAdd(Box::new(DateArith::new(this, Expression::number(n), Some(unit.into()))))
    })
}

/// `'-3 days'` as `(-3, "DAY")`
fn parse_modifier(text: &str, clock: bool) -> Option<(i64, &'static str)> {
    let mut parts = text.split_whitespace();
    let amount = parts.next()?;
    let unit = parts.next()?.to_uppercase();
    if parts.next().is_some() {
        return None;
    }
    let n: i64 = amount.strip_prefix('+').unwrap_or(amount).parse().ok()?;
    let unit = match unit.trim_end_matches('S') {
        "DAY" if !clock => "DAY",
        "MONTH" if !clock => "MONTH",
        "YEAR" if !clock => "YEAR",
        "HOUR" if clock => "HOUR",
        "MINUTE" if clock => "MINUTE",
        "SECOND" if clock => "SECOND",
        _ => return None,
    };
    Some((n, unit))
}

/// DATE() already coerces its argument
fn strip_date_cast(this: &Expression) -> Expression {
    match this {
        Expression::Cast(cast) if cast.to.kind == DataTypeKind::Date => cast.this.clone(),
        Expression::TsOrDsToDate(f) => f.this.clone(),
        _ => this.clone(),
    }
}
