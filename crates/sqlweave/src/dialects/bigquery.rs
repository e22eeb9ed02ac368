//! BigQuery Dialect
//!
//! BigQuery (GoogleSQL) lexical rules, function builders and render transforms.
//! Key differences:
//! - Backticks for identifiers, single, double or triple quotes for strings
//! - INT64 / FLOAT64 / NUMERIC / STRING / BYTES / BOOL type names
//! - TIMESTAMP is zone-aware; DATETIME is the civil timestamp
//! - Value-last DATE_DIFF / DATE_TRUNC with bare unit keywords
//! - FORMAT_DATE / PARSE_TIMESTAMP take the format first
//! - SAFE_CAST instead of TRY_CAST, `[a, b]` array literals
//! - `UNNEST(x) AS a WITH OFFSET AS p` instead of a column list
//! - No ILIKE, DISTINCT ON or NULLS FIRST / LAST

use super::postgres::as_date;
use super::{
    bracket_arrays, format_first, interval_arith, render_format_first,
    render_interval_call, DialectImpl, DialectType, DEFAULT_TIME_FORMAT,
};
use crate::error::{Error, Result};
use crate::expressions::{
    DataTypeKind, DateArith, DateTrunc, Expression, ExpressionKind, FormatFunc,
    UnaryFunc, Unnest,
};
use crate::generator::{Generator, GeneratorConfig, PropertiesStyle, StringEscape};
use crate::parser::{
    binary, build_group_concat, take_args, ts_or_ds_to_date, unary, unit_name, NormalizationStrategy,
    ParserConfig,
};
use crate::time::TimeMapping;
use crate::tokens::TokenizerConfig;

/// Format elements BigQuery spells differently from strftime
const BIGQUERY_TIME_MAPPING: &[(&str, &str)] = &[("%E6S", "%S.%f")];

/// BigQuery dialect
pub struct BigQueryDialect;

impl DialectImpl for BigQueryDialect {
    fn dialect_type(&self) -> DialectType {
        DialectType::BigQuery
    }

    fn tokenizer_config(&self, config: &mut TokenizerConfig) {
        config.identifiers.clear();
        config.identifiers.insert('`', '`');
        for quote in ["\"", "'''", "\"\"\""] {
            config.quotes.insert(quote.to_string(), quote.to_string());
        }
        config.string_escapes = vec!['\\'];
        config.hash_comments = true;
    }

    fn parser_config(&self, config: &mut ParserConfig) {
        config.normalization = NormalizationStrategy::CaseInsensitive;
        config.log_defaults_to_ln = true;
        config.time_mapping = TimeMapping::new(BIGQUERY_TIME_MAPPING);
        config.time_format = Some(DEFAULT_TIME_FORMAT.to_string());
        for (name, kind) in [
            ("INT64", DataTypeKind::BigInt),
            ("FLOAT64", DataTypeKind::Double),
            ("NUMERIC", DataTypeKind::Decimal),
            ("BIGNUMERIC", DataTypeKind::Decimal),
            ("STRING", DataTypeKind::Text),
            ("BYTES", DataTypeKind::VarBinary),
            ("BOOL", DataTypeKind::Boolean),
            ("DATETIME", DataTypeKind::Timestamp),
            ("TIMESTAMP", DataTypeKind::TimestampTz),
            ("JSON", DataTypeKind::Json),
        ] {
            config.type_names.insert(name.to_string(), kind);
        }

        for name in ["DATE_ADD", "DATETIME_ADD", "TIMESTAMP_ADD"] {
            config.function(name, |a, _| interval_arith("DATE_ADD", a, Expression::DateAdd));
        }
        for name in ["DATE_SUB", "DATETIME_SUB", "TIMESTAMP_SUB"] {
            config.function(name, |a, _| interval_arith("DATE_SUB", a, Expression::DateSub));
        }
        // DATE_DIFF(end, start, unit)
        for name in ["DATE_DIFF", "DATETIME_DIFF", "TIMESTAMP_DIFF"] {
            config.function(name, |args, _| {
                let [end, start, unit] = take_args("DATE_DIFF", args)?;
                Ok(Expression::DateDiff(Box::new(DateArith::new(end, start, unit_name(&unit)))))
            });
        }
        for name in ["DATE_TRUNC", "DATETIME_TRUNC", "TIMESTAMP_TRUNC"] {
            config.function(name, |args, _| {
                let [this, unit] = take_args("DATE_TRUNC", args)?;
                let unit = unit_name(&unit).ok_or_else(|| Error::parse("DATE_TRUNC expects a unit name"))?;
                Ok(Expression::DateTrunc(Box::new(DateTrunc { this, unit })))
            });
        }
        for name in ["FORMAT_DATE", "FORMAT_DATETIME", "FORMAT_TIMESTAMP"] {
            config.function(name, |args, c| format_first(Expression::TimeToStr, "FORMAT_DATE", args, c));
        }
        for name in ["PARSE_TIMESTAMP", "PARSE_DATETIME"] {
            config.function(name, |args, c| format_first(Expression::StrToTime, "PARSE_TIMESTAMP", args, c));
        }
        config.function("PARSE_DATE", |args, c| format_first(Expression::StrToDate, "PARSE_DATE", args, c));
        config.function("DATE", |args, _| {
            let [this] = take_args("DATE", args)?;
            Ok(ts_or_ds_to_date(this))
        });
        config.function("UNIX_SECONDS", |a, _| unary(Expression::TimeToUnix, "UNIX_SECONDS", a));
        config.function("TIMESTAMP_SECONDS", |a, _| {
            unary(Expression::UnixToTime, "TIMESTAMP_SECONDS", a)
        });
        config.function("ARRAY_LENGTH", |a, _| unary(Expression::ArraySize, "ARRAY_LENGTH", a));
        config.function("REGEXP_CONTAINS", |a, _| binary(Expression::RegexpLike, "REGEXP_CONTAINS", a));
        config.function("JSON_VALUE", |a, _| binary(Expression::JsonExtractScalar, "JSON_VALUE", a));
        config.function("STRING_AGG", build_group_concat);
    }

    fn generator_config(&self, config: &mut GeneratorConfig) {
        use ExpressionKind as K;

        config.set_identifier_quotes('`', '`');
        config.string_escape = StringEscape::Backslash;
        config.supports_null_ordering = false;
        config.supports_distinct_on = false;
        config.supports_ilike = false;
        config.supports_bucket_sample = false;
        config.supports_hive_clauses = false;
        config.properties_style = PropertiesStyle::Unsupported;
        config.time_mapping = TimeMapping::new(BIGQUERY_TIME_MAPPING);
        config.time_format = Some(DEFAULT_TIME_FORMAT.to_string());

        for (kind, name) in [
            (DataTypeKind::TinyInt, "INT64"),
            (DataTypeKind::SmallInt, "INT64"),
            (DataTypeKind::Int, "INT64"),
            (DataTypeKind::BigInt, "INT64"),
            (DataTypeKind::Float, "FLOAT64"),
            (DataTypeKind::Double, "FLOAT64"),
            (DataTypeKind::Decimal, "NUMERIC"),
            (DataTypeKind::Char, "STRING"),
            (DataTypeKind::VarChar, "STRING"),
            (DataTypeKind::NChar, "STRING"),
            (DataTypeKind::NVarChar, "STRING"),
            (DataTypeKind::Text, "STRING"),
            (DataTypeKind::Uuid, "STRING"),
            (DataTypeKind::Binary, "BYTES"),
            (DataTypeKind::VarBinary, "BYTES"),
            (DataTypeKind::Blob, "BYTES"),
            (DataTypeKind::Boolean, "BOOL"),
            (DataTypeKind::Timestamp, "DATETIME"),
            (DataTypeKind::DateTime, "DATETIME"),
            (DataTypeKind::TimestampTz, "TIMESTAMP"),
            (DataTypeKind::TimestampLtz, "TIMESTAMP"),
            (DataTypeKind::Variant, "JSON"),
        ] {
            config.type_name(kind, name);
        }

        bracket_arrays(config, "");
        config.rename(K::TsOrDsToDate, "DATE");
        config.rename(K::ArraySize, "ARRAY_LENGTH");
        config.rename(K::RegexpLike, "REGEXP_CONTAINS");
        config.rename(K::ApproxDistinct, "APPROX_COUNT_DISTINCT");
        config.rename(K::TimeToUnix, "UNIX_SECONDS");
        config.rename(K::UnixToTime, "TIMESTAMP_SECONDS");
        config.rename(K::Explode, "UNNEST");

        config.transform(K::TryCast, |g, e| {
            let Expression::TryCast(cast) = e else { return g.render_default(e) };
            g.render_cast(cast, "SAFE_CAST")
        });
        config.transform(K::GroupConcat, |g, e| {
            let Expression::GroupConcat(f) = e else { return g.render_default(e) };
            g.write("STRING_AGG(");
            if f.distinct {
                g.keyword("DISTINCT ");
            }
            g.render(&f.this)?;
            if let Some(separator) = &f.separator {
                g.write(", ");
                g.render(separator)?;
            }
            g.write(")");
            Ok(())
        });
        config.transform(K::SetAgg, |g, e| {
            let Expression::SetAgg(f) = e else { return g.render_default(e) };
            g.write("ARRAY_AGG(");
            g.keyword("DISTINCT ");
            g.render(&f.this)?;
            g.write(")");
            Ok(())
        });
        config.transform(K::ArrayContains, |g, e| {
            let Expression::ArrayContains(f) = e else { return g.render_default(e) };
            g.keyword("EXISTS (SELECT 1 FROM ");
            g.render_function("UNNEST", &[&f.this])?;
            g.keyword(" AS _col WHERE _col = ");
            g.render(&f.expression)?;
            g.write(")");
            Ok(())
        });
        config.transform(K::ArrayContainsAll, |g, _| Err(g.unsupported("array containment of all elements")));
        for kind in [K::Quantile, K::ApproxQuantile] {
            config.transform(kind, |g, _| Err(g.unsupported("PERCENTILE as an aggregate")));
        }
        for (kind, field) in [(K::Day, "DAY"), (K::Month, "MONTH"), (K::Year, "YEAR")] {
            config.transform(kind, move |g, e| {
                let (Expression::Day(f) | Expression::Month(f) | Expression::Year(f)) = e else {
                    return g.render_default(e);
                };
                g.keyword("EXTRACT(");
                g.keyword(field);
                g.keyword(" FROM ");
                g.render(&f.this)?;
                g.write(")");
                Ok(())
            });
        }

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
        config.transform(K::DateDiff, |g, e| {
            let Expression::DateDiff(f) = e else { return g.render_default(e) };
            render_unit_last(g, "DATE_DIFF", &[&f.this, &f.expression], f.unit_or_day())
        });
        config.transform(K::DateTrunc, |g, e| {
            let Expression::DateTrunc(f) = e else { return g.render_default(e) };
            render_unit_last(g, "DATE_TRUNC", &[&f.this], &f.unit)
        });
        config.transform(K::TimeToStr, |g, e| {
            let Expression::TimeToStr(f) = e else { return g.render_default(e) };
            render_format_first(g, "FORMAT_DATE", f)
        });
        config.transform(K::StrToTime, |g, e| {
            let Expression::StrToTime(f) = e else { return g.render_default(e) };
            render_format_first(g, "PARSE_TIMESTAMP", f)
        });
        config.transform(K::StrToDate, |g, e| {
            let Expression::StrToDate(f) = e else { return g.render_default(e) };
            render_format_first(g, "PARSE_DATE", f)
        });
        config.transform(K::StrToUnix, |g, e| {
            let Expression::StrToUnix(f) = e else { return g.render_default(e) };
            let parsed = Expression::StrToTime(f.clone());
            g.render_function("UNIX_SECONDS", &[&parsed])
        });
        config.transform(K::UnixToStr, |g, e| {
            let Expression::UnixToStr(f) = e else { return g.render_default(e) };
            let time = Expression::UnixToTime(Box::new(UnaryFunc::new(f.this.clone())));
            render_format_first(g, "FORMAT_TIMESTAMP", &FormatFunc::new(time, f.format.clone()))
        });
        config.transform(K::Unnest, |g, e| {
            let Expression::Unnest(unnest) = e else { return g.render_default(e) };
            render_unnest(g, unnest)
        });
    }
}

/// `NAME(arg, ..., UNIT)` with the unit as a bare keyword
fn render_unit_last(g: &mut Generator<'_>, name: &str, args: &[&Expression], unit: &str) -> Result<()> {
    g.write(&g.function_name(name));
    g.write("(");
    for arg in args {
        g.render(arg)?;
        g.write(", ");
    }
    g.keyword(unit);
    g.write(")");
    Ok(())
}

/// The alias of an UNNEST names its value column, and WITH OFFSET the position
fn render_unnest(g: &mut Generator<'_>, unnest: &Unnest) -> Result<()> {
    g.render_function("UNNEST", &unnest.expressions.iter().collect::<Vec<_>>())?;
    let Some(alias) = &unnest.alias else {
        if unnest.ordinality {
            g.keyword(" WITH OFFSET");
        }
        return Ok(());
    };
    let (value, position) = match alias.columns.as_slice() {
        [] => (&alias.name, None),
        [value] => (value, None),
        [value, position] if unnest.ordinality => (value, Some(position)),
        _ => return Err(g.unsupported("UNNEST of several columns")),
    };
    g.keyword(" AS ");
    g.render_identifier(value);
    if unnest.ordinality {
        g.keyword(" WITH OFFSET");
        if let Some(position) = position {
            g.keyword(" AS ");
            g.render_identifier(position);
        }
    }
    Ok(())
}
