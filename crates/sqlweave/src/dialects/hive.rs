//! Hive Dialect
//!
//! Hive-specific lexical rules, function builders and render transforms.
//! Key differences:
//! - Backticks for identifiers, single or double quotes for strings
//! - Backslash escapes inside strings
//! - Numeric literal suffixes (`1L`, `1S`, `1Y`, `1D`, `1F`, `1BD`)
//! - CAST is not strict, so it parses as TRY_CAST; no TRY_CAST on output
//! - No ILIKE support (use LOWER + LIKE)
//! - Java-style time formats (`yyyy-MM-dd HH:mm:ss`)
//! - Date functions take date strings (DATEDIFF, DATE_ADD, TO_DATE)
//! - COLLECT_LIST / COLLECT_SET for array aggregation, SIZE for array length
//! - LATERAL VIEW EXPLODE instead of UNNEST joins
//! - STORED AS / PARTITIONED BY / TBLPROPERTIES table properties

use super::{
    format_or_default, function_as_infix, is_default_format, negated, operator_as_infix,
    render_interleaved_map, render_locate, DialectImpl, DialectType, DEFAULT_DATE_FORMAT,
    DEFAULT_TIME_FORMAT,
};
use crate::error::Result;
use crate::expressions::{
    DataTypeKind, DateArith, Expression, ExpressionKind, FormatFunc, StrPosition, UnaryFunc,
};
use crate::generator::{Generator, GeneratorConfig, LateralStyle, PropertiesStyle, StringEscape};
use crate::parser::{
    binary, build_locate, build_map_from_pairs, check_arity, take_args, ts_or_ds_to_date, unary,
    NormalizationStrategy, ParserConfig,
};
use crate::time::TimeMapping;
use crate::tokens::{TokenType, TokenizerConfig};

/// Java `SimpleDateFormat` directives and their strftime equivalents.
///
/// When several directives share a strftime form, the last one is used for
/// output.
pub(crate) const HIVE_TIME_MAPPING: &[(&str, &str)] = &[
    ("y", "%Y"),
    ("Y", "%Y"),
    ("YYYY", "%Y"),
    ("yyyy", "%Y"),
    ("YY", "%y"),
    ("yy", "%y"),
    ("MMMM", "%B"),
    ("MMM", "%b"),
    ("MM", "%m"),
    ("M", "%-m"),
    ("dd", "%d"),
    ("d", "%-d"),
    ("HH", "%H"),
    ("H", "%-H"),
    ("hh", "%I"),
    ("h", "%-I"),
    ("mm", "%M"),
    ("m", "%-M"),
    ("ss", "%S"),
    ("s", "%-S"),
    ("SSSSSS", "%f"),
    ("a", "%p"),
    ("DD", "%j"),
    ("D", "%-j"),
    ("E", "%a"),
    ("EE", "%a"),
    ("EEE", "%a"),
    ("EEEE", "%A"),
];

/// Hive dialect
pub struct HiveDialect;

impl DialectImpl for HiveDialect {
    fn dialect_type(&self) -> DialectType {
        DialectType::Hive
    }

    fn tokenizer_config(&self, config: &mut TokenizerConfig) {
        // Hive uses backticks for identifiers, not double quotes
        config.identifiers.clear();
        config.identifiers.insert('`', '`');
        config.quotes.insert("\"".to_string(), "\"".to_string());
        // Only backslash escapes; '' is two quotes
        config.string_escapes = vec!['\\'];
        config.identifiers_can_start_with_digit = true;
        for (word, token_type) in [
            ("DIV", TokenType::Div),
            ("RLIKE", TokenType::RLike),
            ("REGEXP", TokenType::RLike),
            ("SORT", TokenType::Sort),
            ("ADD", TokenType::Command),
            ("MSCK", TokenType::Command),
        ] {
            config.keywords.insert(word.to_string(), token_type);
        }
        config
            .numeric_suffixes
            .extend(["L", "S", "Y", "D", "F", "BD"].map(String::from));
    }

    fn parser_config(&self, config: &mut ParserConfig) {
        for (suffix, kind) in [
            ("L", DataTypeKind::BigInt),
            ("S", DataTypeKind::SmallInt),
            ("Y", DataTypeKind::TinyInt),
            ("D", DataTypeKind::Double),
            ("F", DataTypeKind::Float),
            ("BD", DataTypeKind::Decimal),
        ] {
            config.literal_suffixes.insert(suffix.to_string(), kind);
        }
        config.strict_cast = false;
        config.log_defaults_to_ln = true;
        config.normalization = NormalizationStrategy::CaseInsensitive;
        config.time_mapping = TimeMapping::new(HIVE_TIME_MAPPING);
        config.time_format = Some(DEFAULT_TIME_FORMAT.to_string());

        // DATEDIFF(end, start) in days, both sides dates or date strings
        config.function("DATEDIFF", |args, _| {
            let [end, start] = take_args("DATEDIFF", args)?;
            Ok(Expression::DateDiff(Box::new(DateArith::new(
                ts_or_ds_to_date(end),
                ts_or_ds_to_date(start),
                None,
            ))))
        });
        config.function("DATE_ADD", |args, _| {
            let [this, days] = take_args("DATE_ADD", args)?;
            Ok(Expression::TsOrDsAdd(Box::new(DateArith::new(this, days, Some("DAY".into())))))
        });
        config.function("DATE_SUB", |args, _| {
            let [this, days] = take_args("DATE_SUB", args)?;
            Ok(Expression::TsOrDsAdd(Box::new(DateArith::new(
                this,
                negated(&days),
                Some("DAY".into()),
            ))))
        });
        config.function("TO_DATE", |args, config| {
            check_arity("TO_DATE", &args, 1, 2)?;
            let mut args = args.into_iter();
            let this = args.next().unwrap_or_else(Expression::null);
            match args.next() {
                Some(format) => Ok(Expression::StrToDate(Box::new(FormatFunc::new(
                    this,
                    Some(config.canonical_format(format)),
                )))),
                None => Ok(ts_or_ds_to_date(this)),
            }
        });
        config.function("FROM_UNIXTIME", |args, config| {
            with_default_format(Expression::UnixToStr, "FROM_UNIXTIME", args, config)
        });
        config.function("UNIX_TIMESTAMP", |args, config| {
            // Without arguments it is the current time
            if args.is_empty() {
                return Ok(Expression::func("UNIX_TIMESTAMP", args));
            }
            with_default_format(Expression::StrToUnix, "UNIX_TIMESTAMP", args, config)
        });
        config.function("DATE_FORMAT", |args, config| {
            let [this, format] = take_args("DATE_FORMAT", args)?;
            Ok(Expression::TimeToStr(Box::new(FormatFunc::new(
                this,
                Some(config.canonical_format(format)),
            ))))
        });
        config.function("DAY", |args, _| {
            let [this] = take_args("DAY", args)?;
            Ok(Expression::Day(Box::new(UnaryFunc::new(ts_or_ds_to_date(this)))))
        });
        config.function("MONTH", |args, _| {
            let [this] = take_args("MONTH", args)?;
            Ok(Expression::Month(Box::new(UnaryFunc::new(ts_or_ds_to_date(this)))))
        });
        config.function("YEAR", |args, _| {
            let [this] = take_args("YEAR", args)?;
            Ok(Expression::Year(Box::new(UnaryFunc::new(ts_or_ds_to_date(this)))))
        });
        config.function("PERCENTILE", |a, _| binary(Expression::Quantile, "PERCENTILE", a));
        config.function("PERCENTILE_APPROX", |a, _| {
            binary(Expression::ApproxQuantile, "PERCENTILE_APPROX", a)
        });
        config.function("COLLECT_LIST", |a, _| unary(Expression::ArrayAgg, "COLLECT_LIST", a));
        config.function("COLLECT_SET", |a, _| unary(Expression::SetAgg, "COLLECT_SET", a));
        config.function("SIZE", |a, _| unary(Expression::ArraySize, "SIZE", a));
        config.function("GET_JSON_OBJECT", |a, _| {
            binary(Expression::JsonExtractScalar, "GET_JSON_OBJECT", a)
        });
        config.function("LOCATE", build_locate);
        // INSTR(str, substr)
        config.function("INSTR", |args, _| {
            let [this, substr] = take_args("INSTR", args)?;
            Ok(Expression::StrPosition(Box::new(StrPosition {
                this,
                substr,
                position: None,
            })))
        });
        config.function("MAP", build_map_from_pairs);
    }

    fn generator_config(&self, config: &mut GeneratorConfig) {
        use ExpressionKind as K;

        config.set_identifier_quotes('`', '`');
        config.identifiers_can_start_with_digit = true;
        config.string_escape = StringEscape::Backslash;
        config.struct_field_sep = ": ";
        config.alias_post_tablesample = true;
        config.properties_style = PropertiesStyle::Hive;
        config.lateral_style = LateralStyle::LateralView;
        config.left_semi_joins = true;
        config.supports_qualify = false;
        config.supports_distinct_on = false;
        config.supports_ilike = false;
        config.supports_try_cast = false;
        config.time_mapping = TimeMapping::new(HIVE_TIME_MAPPING);
        config.time_format = Some(DEFAULT_TIME_FORMAT.to_string());

        config.type_name(DataTypeKind::Text, "STRING");
        config.type_name(DataTypeKind::Json, "STRING");
        config.type_name(DataTypeKind::Uuid, "STRING");
        config.type_name(DataTypeKind::Blob, "BINARY");
        config.type_name(DataTypeKind::VarBinary, "BINARY");
        config.type_name(DataTypeKind::DateTime, "TIMESTAMP");
        config.type_name(DataTypeKind::TimestampTz, "TIMESTAMP");

        operator_as_infix(config, K::NullSafeEq, "<=>");
        function_as_infix(config, K::RegexpLike, "RLIKE");

        config.rename(K::Quantile, "PERCENTILE");
        config.rename(K::ApproxQuantile, "PERCENTILE_APPROX");
        config.rename(K::ArrayAgg, "COLLECT_LIST");
        config.rename(K::SetAgg, "COLLECT_SET");
        config.rename(K::ArraySize, "SIZE");
        config.rename(K::ApproxDistinct, "APPROX_COUNT_DISTINCT");
        config.rename(K::JsonExtract, "GET_JSON_OBJECT");
        config.rename(K::JsonExtractScalar, "GET_JSON_OBJECT");
        config.rename(K::TsOrDsToDate, "TO_DATE");
        config.rename(K::UnixToTime, "FROM_UNIXTIME");
        config.rename(K::TimeToUnix, "UNIX_TIMESTAMP");

        config.transform(K::DateDiff, |g, e| {
            let Expression::DateDiff(f) = e else { return g.render_default(e) };
            if f.unit_or_day() != "DAY" {
                return Err(g.unsupported(format!("DATEDIFF in {} units", f.unit_or_day())));
            }
            g.render_function("DATEDIFF", &[&f.this, &f.expression])
        });
        config.transform(K::TsOrDsAdd, |g, e| {
            let Expression::TsOrDsAdd(f) = e else { return g.render_default(e) };
            render_date_add(g, f)
        });
        config.transform(K::DateAdd, |g, e| {
            let Expression::DateAdd(f) = e else { return g.render_default(e) };
            render_date_add(g, f)
        });
        config.transform(K::DateSub, |g, e| {
            let Expression::DateSub(f) = e else { return g.render_default(e) };
            if f.unit_or_day() != "DAY" {
                return Err(g.unsupported(format!("DATE_SUB in {} units", f.unit_or_day())));
            }
            g.render_function("DATE_SUB", &[&f.this, &f.expression])
        });
        config.transform(K::UnixToStr, |g, e| {
            let Expression::UnixToStr(f) = e else { return g.render_default(e) };
            render_with_optional_format(g, "FROM_UNIXTIME", f)
        });
        config.transform(K::StrToUnix, |g, e| {
            let Expression::StrToUnix(f) = e else { return g.render_default(e) };
            render_with_optional_format(g, "UNIX_TIMESTAMP", f)
        });
        config.transform(K::TimeToStr, |g, e| {
            let Expression::TimeToStr(f) = e else { return g.render_default(e) };
            let format = format_or_default(g, f.format.as_ref());
            g.write(&g.function_name("DATE_FORMAT"));
            g.write("(");
            g.render(&f.this)?;
            g.write(", ");
            g.render_format(&format)?;
            g.write(")");
            Ok(())
        });
        config.transform(K::StrToTime, |g, e| {
            let Expression::StrToTime(f) = e else { return g.render_default(e) };
            if is_default_format(g, f.format.as_ref()) {
                g.keyword("CAST(");
                g.render(&f.this)?;
                g.keyword(" AS TIMESTAMP)");
                return Ok(());
            }
            render_reparsed(g, f, "TIMESTAMP")
        });
        config.transform(K::StrToDate, |g, e| {
            let Expression::StrToDate(f) = e else { return g.render_default(e) };
            let date_only = f.format.as_ref().and_then(Expression::as_string) == Some(DEFAULT_DATE_FORMAT);
            if f.format.is_none() || date_only {
                return g.render_function("TO_DATE", &[&f.this]);
            }
            render_reparsed(g, f, "DATE")
        });
        config.transform(K::StrPosition, |g, e| {
            let Expression::StrPosition(f) = e else { return g.render_default(e) };
            render_locate(g, "LOCATE", f)
        });
        config.transform(K::Map, |g, e| {
            let Expression::Map(map) = e else { return g.render_default(e) };
            render_interleaved_map(g, "MAP", map)
        });
        config.transform(K::ArraySort, |g, e| {
            let Expression::ArraySort(f) = e else { return g.render_default(e) };
            match (&f.comparator, &f.asc) {
                (Some(comparator), _) => g.render_function("ARRAY_SORT", &[&f.this, comparator]),
                (None, Some(asc)) => g.render_function("SORT_ARRAY", &[&f.this, asc]),
                (None, None) => g.render_function("SORT_ARRAY", &[&f.this]),
            }
        });
        config.transform(K::GroupConcat, |g, e| {
            let Expression::GroupConcat(f) = e else { return g.render_default(e) };
            let collect = if f.distinct {
                Expression::SetAgg(Box::new(UnaryFunc::new(f.this.clone())))
            } else {
                Expression::ArrayAgg(Box::new(UnaryFunc::new(f.this.clone())))
            };
            let separator = f.separator.clone().unwrap_or_else(|| Expression::string(","));
            g.render_function("CONCAT_WS", &[&separator, &collect])
        });
        config.transform(K::DateTrunc, |g, e| {
            let Expression::DateTrunc(f) = e else { return g.render_default(e) };
            let unit = Expression::string(f.unit.clone());
            g.render_function("TRUNC", &[&f.this, &unit])
        });
    }
}

/// `NAME(x[, fmt])` with the format filled in from the dialect default
fn with_default_format(
    make: fn(Box<FormatFunc>) -> Expression,
    name: &'static str,
    args: Vec<Expression>,
    config: &ParserConfig,
) -> Result<Expression> {
    check_arity(name, &args, 1, 2)?;
    let mut args = args.into_iter();
    let this = args.next().unwrap_or_else(Expression::null);
    let format = args
        .next()
        .map(|f| config.canonical_format(f))
        .or_else(|| config.default_format());
    Ok(make(Box::new(FormatFunc::new(this, format))))
}

fn render_with_optional_format(g: &mut Generator<'_>, name: &str, f: &FormatFunc) -> Result<()> {
    if is_default_format(g, f.format.as_ref()) {
        return g.render_function(name, &[&f.this]);
    }
    let format = format_or_default(g, f.format.as_ref());
    g.write(&g.function_name(name));
    g.write("(");
    g.render(&f.this)?;
    g.write(", ");
    g.render_format(&format)?;
    g.write(")");
    Ok(())
}

/// `CAST(FROM_UNIXTIME(UNIX_TIMESTAMP(x, fmt)) AS <type>)`
fn render_reparsed(g: &mut Generator<'_>, f: &FormatFunc, type_name: &str) -> Result<()> {
    let format = format_or_default(g, f.format.as_ref());
    g.keyword("CAST(");
    g.write(&g.function_name("FROM_UNIXTIME"));
    g.write("(");
    g.write(&g.function_name("UNIX_TIMESTAMP"));
    g.write("(");
    g.render(&f.this)?;
    g.write(", ");
    g.render_format(&format)?;
    g.write("))");
    g.keyword(" AS ");
    g.keyword(type_name);
    g.write(")");
    Ok(())
}

fn render_date_add(g: &mut Generator<'_>, f: &DateArith) -> Result<()> {
    match f.unit_or_day() {
        "DAY" => g.render_function("DATE_ADD", &[&f.this, &f.expression]),
        "MONTH" => g.render_function("ADD_MONTHS", &[&f.this, &f.expression]),
        unit => Err(g.unsupported(format!("DATE_ADD in {unit} units"))),
    }
}

#[cfg(test)]
mod tests {
    use crate::dialects::{Dialect, DialectType};
    use crate::error::Error;

    fn hive_to(sql: &str, target: DialectType) -> String {
        let result = Dialect::get(DialectType::Hive)
            .transpile_to(sql, &Dialect::get(target), &Default::default())
            .expect("Transpile failed");
        result[0].clone()
    }

    #[test]
    fn test_identity() {
        for sql in [
            "SELECT a FROM x LATERAL VIEW EXPLODE(y) t AS a",
            "SELECT * FROM x TABLESAMPLE(1) AS foo",
            "SELECT DATE_FORMAT(x, 'yyyy-MM-dd')",
            "SELECT `a b` FROM t",
            "SELECT x FROM t DISTRIBUTE BY x SORT BY x",
        ] {
            assert_eq!(hive_to(sql, DialectType::Hive), sql);
        }
    }

    #[test]
    fn test_suffix_literals() {
        assert_eq!(hive_to("SELECT 1L", DialectType::Hive), "SELECT CAST(1 AS BIGINT)");
        assert_eq!(hive_to("SELECT 1.0bd", DialectType::Hive), "SELECT CAST(1.0 AS DECIMAL)");
    }

    #[test]
    fn test_date_functions_to_generic() {
        assert_eq!(
            hive_to("SELECT DATE_ADD('2020-01-01', 1)", DialectType::Generic),
            "SELECT TS_OR_DS_ADD('2020-01-01', 1, 'DAY')"
        );
        assert_eq!(
            hive_to("SELECT DATEDIFF(a, b)", DialectType::Generic),
            "SELECT DATE_DIFF(TS_OR_DS_TO_DATE(a), TS_OR_DS_TO_DATE(b))"
        );
    }

    #[test]
    fn test_to_date_not_wrapped_twice() {
        assert_eq!(
            hive_to("SELECT DATEDIFF(TO_DATE(y), x)", DialectType::Hive),
            "SELECT DATEDIFF(TO_DATE(y), TO_DATE(x))"
        );
    }

    #[test]
    fn test_default_format_omitted() {
        assert_eq!(
            hive_to("SELECT FROM_UNIXTIME(x, 'yyyy-MM-dd HH:mm:ss')", DialectType::Hive),
            "SELECT FROM_UNIXTIME(x)"
        );
    }

    #[test]
    fn test_interleaved_map_requires_literal_arrays() {
        let presto = Dialect::get(DialectType::Presto);
        let ast = presto.parse("SELECT MAP(k, v)").expect("Parse failed");
        let err = Dialect::get(DialectType::Hive).generate(&ast[0]).unwrap_err();
        assert!(matches!(err, Error::Unsupported { .. }), "got {err:?}");
    }
}
