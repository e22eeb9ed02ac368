//! MySQL Dialect
//!
//! MySQL-specific lexical rules, function builders and render transforms.
//! Key differences:
//! - Backticks for identifiers, single or double quotes for strings
//! - Backslash escapes in strings; `#` line comments
//! - `||` is logical OR, so concatenation is CONCAT()
//! - `DIV` integer division, `<=>` null-safe equality, REGEXP / RLIKE
//! - `DATE_ADD(x, INTERVAL n UNIT)`, DATEDIFF and TIMESTAMPDIFF
//! - DATE_FORMAT / STR_TO_DATE with `%i` minutes and `%s` seconds
//! - LOCATE(substr, str) argument order
//! - No NULLS FIRST / LAST, QUALIFY, DISTINCT ON, ILIKE or TRY_CAST

use super::presto::PRESTO_TIME_MAPPING;
use super::{
    format_or_default, function_as_infix, interval_arith, operator_as_infix, render_formatted,
    render_interval_call, render_locate, render_unit_first, DialectImpl, DialectType,
    DEFAULT_TIME_FORMAT,
};
use crate::expressions::{
    BinaryOp, DataTypeKind, DateArith, Expression, ExpressionKind, StrPosition,
};
use crate::generator::{GeneratorConfig, PropertiesStyle, StringEscape};
use crate::parser::{
    build_locate, format_func, precedence, take_args, ts_or_ds_to_date, unary,
    NormalizationStrategy, ParserConfig,
};
use crate::time::TimeMapping;
use crate::tokens::{TokenType, TokenizerConfig};

/// MySQL dialect
pub struct MySQLDialect;

impl DialectImpl for MySQLDialect {
    fn dialect_type(&self) -> DialectType {
        DialectType::MySQL
    }

    fn tokenizer_config(&self, config: &mut TokenizerConfig) {
        config.identifiers.clear();
        config.identifiers.insert('`', '`');
        config.quotes.insert("\"".to_string(), "\"".to_string());
        config.string_escapes = vec!['\'', '\\'];
        config.hash_comments = true;
        for (word, token_type) in [
            ("DIV", TokenType::Div),
            ("REGEXP", TokenType::RLike),
            ("RLIKE", TokenType::RLike),
        ] {
            config.keywords.insert(word.to_string(), token_type);
        }
    }

    fn parser_config(&self, config: &mut ParserConfig) {
        config.normalization = NormalizationStrategy::CaseSensitive;
        config.time_mapping = TimeMapping::new(PRESTO_TIME_MAPPING);
        config.time_format = Some(DEFAULT_TIME_FORMAT.to_string());
        config.operator(TokenType::DPipe, precedence::OR, |l, r| {
            Expression::Or(Box::new(BinaryOp::new(l, r)))
        });

        config.function("DATE_ADD", |a, _| interval_arith("DATE_ADD", a, Expression::DateAdd));
        config.function("DATE_SUB", |a, _| interval_arith("DATE_SUB", a, Expression::DateSub));
        config.function("ADDDATE", |a, _| interval_arith("ADDDATE", a, Expression::DateAdd));
        config.function("SUBDATE", |a, _| interval_arith("SUBDATE", a, Expression::DateSub));
        config.function("DATEDIFF", |args, _| {
            let [this, expression] = take_args("DATEDIFF", args)?;
            Ok(Expression::DateDiff(Box::new(DateArith::new(this, expression, None))))
        });
        config.function("DATE", |args, _| {
            let [this] = take_args("DATE", args)?;
            Ok(ts_or_ds_to_date(this))
        });
        config.function("DATE_FORMAT", |a, c| format_func(Expression::TimeToStr, "DATE_FORMAT", a, c));
        config.function("STR_TO_DATE", |a, c| format_func(Expression::StrToDate, "STR_TO_DATE", a, c));
        config.function("FROM_UNIXTIME", |a, _| unary(Expression::UnixToTime, "FROM_UNIXTIME", a));
        config.function("UNIX_TIMESTAMP", |args, _| {
            if args.is_empty() {
                return Ok(Expression::func("UNIX_TIMESTAMP", args));
            }
            unary(Expression::TimeToUnix, "UNIX_TIMESTAMP", args)
        });
        config.function("CHAR_LENGTH", |a, _| unary(Expression::Length, "CHAR_LENGTH", a));
        config.function("LOCATE", build_locate);
        config.function("INSTR", |args, _| {
            let [this, substr] = take_args("INSTR", args)?;
            Ok(Expression::StrPosition(Box::new(StrPosition {
                this,
                substr,
                position: None,
            })))
        });
    }

    fn generator_config(&self, config: &mut GeneratorConfig) {
        use ExpressionKind as K;

        config.set_identifier_quotes('`', '`');
        config.hex_literal_prefix = true;
        config.string_escape = StringEscape::Backslash;
        config.supports_null_ordering = false;
        config.supports_qualify = false;
        config.supports_distinct_on = false;
        config.supports_ilike = false;
        config.supports_try_cast = false;
        config.supports_bucket_sample = false;
        config.supports_hive_clauses = false;
        config.properties_style = PropertiesStyle::Unsupported;
        config.time_mapping = TimeMapping::new(PRESTO_TIME_MAPPING);
        config.time_format = Some(DEFAULT_TIME_FORMAT.to_string());

        config.type_name(DataTypeKind::TimestampTz, "TIMESTAMP");
        config.type_name(DataTypeKind::TimestampLtz, "TIMESTAMP");
        config.type_name(DataTypeKind::Uuid, "CHAR(36)");
        config.type_name(DataTypeKind::Variant, "JSON");

        operator_as_infix(config, K::NullSafeEq, "<=>");
        operator_as_infix(config, K::IntDiv, "DIV");
        function_as_infix(config, K::RegexpLike, "REGEXP");
        config.transform(K::DPipe, |g, e| {
            let Expression::DPipe(op) = e else { return g.render_default(e) };
            g.render_function("CONCAT", &[&op.left, &op.right])
        });

        config.rename(K::Length, "CHAR_LENGTH");
        config.rename(K::TsOrDsToDate, "DATE");
        config.rename(K::UnixToTime, "FROM_UNIXTIME");
        config.rename(K::TimeToUnix, "UNIX_TIMESTAMP");

        config.transform(K::GroupConcat, |g, e| {
            let Expression::GroupConcat(f) = e else { return g.render_default(e) };
            g.write(&g.function_name("GROUP_CONCAT"));
            g.write("(");
            if f.distinct {
                g.keyword("DISTINCT ");
            }
            g.render(&f.this)?;
            if let Some(separator) = &f.separator {
                g.keyword(" SEPARATOR ");
                g.render(separator)?;
            }
            g.write(")");
            Ok(())
        });
        config.transform(K::StrPosition, |g, e| {
            let Expression::StrPosition(f) = e else { return g.render_default(e) };
            render_locate(g, "LOCATE", f)
        });
        config.transform(K::DateAdd, |g, e| {
            let Expression::DateAdd(f) = e else { return g.render_default(e) };
            render_interval_call(g, "DATE_ADD", &f.this, f)
        });
        config.transform(K::TsOrDsAdd, |g, e| {
            let Expression::TsOrDsAdd(f) = e else { return g.render_default(e) };
            render_interval_call(g, "DATE_ADD", &f.this, f)
        });
        config.transform(K::DateSub, |g, e| {
            let Expression::DateSub(f) = e else { return g.render_default(e) };
            render_interval_call(g, "DATE_SUB", &f.this, f)
        });
        config.transform(K::DateDiff, |g, e| {
            let Expression::DateDiff(f) = e else { return g.render_default(e) };
            match f.unit_or_day() {
                "DAY" => g.render_function("DATEDIFF", &[&f.this, &f.expression]),
                unit => render_unit_first(g, "TIMESTAMPDIFF", unit, &[&f.expression, &f.this]),
            }
        });
        config.transform(K::TimeToStr, |g, e| {
            let Expression::TimeToStr(f) = e else { return g.render_default(e) };
            let format = format_or_default(g, f.format.as_ref());
            render_formatted(g, "DATE_FORMAT", &f.this, &format)
        });
        config.transform(K::StrToDate, |g, e| {
            let Expression::StrToDate(f) = e else { return g.render_default(e) };
            let format = format_or_default(g, f.format.as_ref());
            render_formatted(g, "STR_TO_DATE", &f.this, &format)
        });
        config.transform(K::StrToTime, |g, e| {
            let Expression::StrToTime(f) = e else { return g.render_default(e) };
            let format = format_or_default(g, f.format.as_ref());
            render_formatted(g, "STR_TO_DATE", &f.this, &format)
        });
        config.transform(K::StrToUnix, |g, e| {
            let Expression::StrToUnix(f) = e else { return g.render_default(e) };
            let parsed = Expression::StrToTime(f.clone());
            g.render_function("UNIX_TIMESTAMP", &[&parsed])
        });
        config.transform(K::UnixToStr, |g, e| {
            let Expression::UnixToStr(f) = e else { return g.render_default(e) };
            let format = format_or_default(g, f.format.as_ref());
            render_formatted(g, "FROM_UNIXTIME", &f.this, &format)
        });
    }
}
