//! Redshift Dialect
//!
//! Redshift is based on PostgreSQL 8 with its own function library.
//! Key differences from PostgreSQL:
//! - Unit-first DATEADD / DATEDIFF with bare unit keywords
//! - LEN, LISTAGG, GETDATE, GET_ARRAY_LENGTH
//! - `ARRAY(a, b)` SUPER arrays
//! - MINUS as a synonym for EXCEPT; block comments do not nest
//! - QUALIFY is supported, DISTINCT ON is not

use super::postgres::as_date;
use super::{negated, render_unit_first, unit_first, unit_first_diff, DialectImpl, DialectType};
use crate::expressions::{CurrentTimestamp, DataTypeKind, Expression, ExpressionKind, GroupConcat};
use crate::generator::GeneratorConfig;
use crate::parser::{check_arity, unary, ParserConfig};
use crate::tokens::{TokenType, TokenizerConfig};

/// Redshift dialect
pub struct RedshiftDialect;

impl DialectImpl for RedshiftDialect {
    fn dialect_type(&self) -> DialectType {
        DialectType::Redshift
    }

    fn base_name(&self) -> Option<String> {
        Some(DialectType::Postgres.name().to_string())
    }

    fn tokenizer_config(&self, config: &mut TokenizerConfig) {
        config.nested_comments = false;
        config.keywords.insert("MINUS".to_string(), TokenType::Except);
    }

    fn parser_config(&self, config: &mut ParserConfig) {
        config.type_names.insert("SUPER".to_string(), DataTypeKind::Variant);

        config.function("LEN", |a, _| unary(Expression::Length, "LEN", a));
        config.function("DATEADD", |a, _| unit_first("DATEADD", a, Expression::DateAdd));
        config.function("DATE_ADD", |a, _| unit_first("DATE_ADD", a, Expression::DateAdd));
        config.function("DATEDIFF", |a, _| unit_first_diff("DATEDIFF", a));
        config.function("DATE_DIFF", |a, _| unit_first_diff("DATE_DIFF", a));
        config.function("GET_ARRAY_LENGTH", |a, _| unary(Expression::ArraySize, "GET_ARRAY_LENGTH", a));
        config.function("GETDATE", |a, _| {
            check_arity("GETDATE", &a, 0, 0)?;
            Ok(Expression::CurrentTimestamp(CurrentTimestamp))
        });
        config.function("LISTAGG", |args, _| {
            check_arity("LISTAGG", &args, 1, 2)?;
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

        config.supports_qualify = true;
        config.supports_distinct_on = false;
        config.type_name(DataTypeKind::Variant, "SUPER");
        config.type_name(DataTypeKind::Binary, "VARBYTE");
        config.type_name(DataTypeKind::VarBinary, "VARBYTE");
        config.type_name(DataTypeKind::Blob, "VARBYTE");

        // SUPER arrays are built with a plain function call
        config.transforms.remove(&K::Array);
        config.rename(K::Length, "LEN");
        config.rename(K::ArraySize, "GET_ARRAY_LENGTH");
        config.rename(K::GroupConcat, "LISTAGG");

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
        // SUPER arrays have no containment operator
        for kind in [K::ArrayContains, K::ArrayContainsAll] {
            config.transform(kind, |g, e| Err(g.unsupported(e.kind().to_string())));
        }
    }
}
