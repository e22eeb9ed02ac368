//! StarRocks Dialect
//!
//! StarRocks speaks the MySQL protocol and grammar with OLAP extensions.
//! Key differences from MySQL:
//! - ARRAY_LENGTH, ARRAY_AGG and APPROX_COUNT_DISTINCT
//! - `DATE_DIFF('unit', a, b)` for non-day differences
//! - `[a, b]` array literals

use super::{bracket_arrays, unit_string, DialectImpl, DialectType};
use crate::expressions::{DateArith, Expression, ExpressionKind};
use crate::generator::GeneratorConfig;
use crate::parser::{take_args, unary, unit_name, ParserConfig};

/// StarRocks dialect
pub struct StarRocksDialect;

impl DialectImpl for StarRocksDialect {
    fn dialect_type(&self) -> DialectType {
        DialectType::StarRocks
    }

    fn base_name(&self) -> Option<String> {
        Some(DialectType::MySQL.name().to_string())
    }

    fn parser_config(&self, config: &mut ParserConfig) {
        config.function("ARRAY_LENGTH", |a, _| unary(Expression::ArraySize, "ARRAY_LENGTH", a));
        // DATE_DIFF(unit, end, start)
        config.function("DATE_DIFF", |args, _| {
            let [unit, end, start] = take_args("DATE_DIFF", args)?;
            Ok(Expression::DateDiff(Box::new(DateArith::new(end, start, unit_name(&unit)))))
        });
    }

    fn generator_config(&self, config: &mut GeneratorConfig) {
        use ExpressionKind as K;

        bracket_arrays(config, "");
        config.rename(K::ApproxDistinct, "APPROX_COUNT_DISTINCT");
        config.rename(K::ArraySize, "ARRAY_LENGTH");

        config.transform(K::DateDiff, |g, e| {
            let Expression::DateDiff(f) = e else { return g.render_default(e) };
            match f.unit_or_day() {
                "DAY" => g.render_function("DATEDIFF", &[&f.this, &f.expression]),
                unit => {
                    let unit = unit_string(&unit.to_lowercase());
                    g.render_function("DATE_DIFF", &[&unit, &f.this, &f.expression])
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use crate::dialects::{Dialect, DialectType};

    fn starrocks(sql: &str) -> String {
        let dialect = Dialect::get(DialectType::StarRocks);
        let ast = dialect.parse(sql).expect("Parse failed");
        dialect.generate(&ast[0]).expect("Generate failed")
    }

    #[test]
    fn test_inherits_mysql() {
        assert_eq!(starrocks("SELECT `a` DIV 2 FROM t"), "SELECT `a` DIV 2 FROM t");
        assert_eq!(starrocks("SELECT a DIV 2 FROM t"), "SELECT a DIV 2 FROM t");
        assert_eq!(starrocks("SELECT LOCATE('a', x)"), "SELECT LOCATE('a', x)");
    }

    #[test]
    fn test_array_functions() {
        assert_eq!(starrocks("SELECT ARRAY_LENGTH([1, 2])"), "SELECT ARRAY_LENGTH([1, 2])");
        assert_eq!(
            starrocks("SELECT APPROX_DISTINCT(x)"),
            "SELECT APPROX_COUNT_DISTINCT(x)"
        );
    }

    #[test]
    fn test_date_diff() {
        assert_eq!(starrocks("SELECT DATE_DIFF('hour', a, b)"), "SELECT DATE_DIFF('hour', a, b)");
        assert_eq!(starrocks("SELECT DATEDIFF(a, b)"), "SELECT DATEDIFF(a, b)");
    }
}
