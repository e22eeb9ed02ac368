//! Tableau Dialect
//!
//! Tableau calculated-field syntax as emitted into custom SQL.
//! Key differences:
//! - `[ ]` identifiers; single or double quoted strings
//! - `IF c THEN t ELSE f END` instead of IF()
//! - COUNTD(x) for COUNT(DISTINCT x), IFNULL for two-argument COALESCE
//! - FIND, DATEADD, DATEDIFF, DATETRUNC with lower-case date parts

use super::{unit_first, unit_first_diff, unit_string, DialectImpl, DialectType};
use crate::error::Result;
use crate::expressions::{Expression, ExpressionKind, Function, IfFunc};
use crate::generator::{Generator, GeneratorConfig, PropertiesStyle};
use crate::parser::{build_date_trunc, build_strpos, NormalizationStrategy, ParserConfig};
use crate::tokens::TokenizerConfig;

/// Tableau dialect
pub struct TableauDialect;

impl DialectImpl for TableauDialect {
    fn dialect_type(&self) -> DialectType {
        DialectType::Tableau
    }

    fn tokenizer_config(&self, config: &mut TokenizerConfig) {
        config.identifiers.clear();
        config.identifiers.insert('[', ']');
        config.quotes.insert("\"".to_string(), "\"".to_string());
    }

    fn parser_config(&self, config: &mut ParserConfig) {
        config.normalization = NormalizationStrategy::CaseInsensitive;

        config.function("COUNTD", |args, _| {
            Ok(Expression::Function(Box::new(Function {
                name: "COUNT".to_string(),
                args,
                distinct: true,
            })))
        });
        config.function("FIND", build_strpos);
        config.function("DATEADD", |a, _| unit_first("DATEADD", a, Expression::DateAdd));
        config.function("DATEDIFF", |a, _| unit_first_diff("DATEDIFF", a));
        config.function("DATETRUNC", build_date_trunc);
    }

    fn generator_config(&self, config: &mut GeneratorConfig) {
        use ExpressionKind as K;

        config.set_identifier_quotes('[', ']');
        config.supports_qualify = false;
        config.supports_distinct_on = false;
        config.supports_ilike = false;
        config.supports_try_cast = false;
        config.supports_bucket_sample = false;
        config.supports_hive_clauses = false;
        config.properties_style = PropertiesStyle::Unsupported;

        config.transform(K::If, |g, e| {
            let Expression::If(f) = e else { return g.render_default(e) };
            render_if_block(g, f)
        });
        config.transform(K::Coalesce, |g, e| match e {
            Expression::Coalesce(f) if f.expressions.len() == 2 => {
                g.render_function("IFNULL", &[&f.expressions[0], &f.expressions[1]])
            }
            _ => g.render_default(e),
        });
        config.transform(K::Function, |g, e| match e {
            Expression::Function(f) if f.distinct && f.name.eq_ignore_ascii_case("COUNT") => {
                g.render_function("COUNTD", &f.args.iter().collect::<Vec<_>>())
            }
            _ => g.render_default(e),
        });
        config.transform(K::StrPosition, |g, e| {
            let Expression::StrPosition(f) = e else { return g.render_default(e) };
            let mut args = vec![&f.this, &f.substr];
            args.extend(f.position.as_ref());
            g.render_function("FIND", &args)
        });
        config.transform(K::DateAdd, |g, e| {
            let Expression::DateAdd(f) = e else { return g.render_default(e) };
            let unit = date_part(f.unit_or_day());
            g.render_function("DATEADD", &[&unit, &f.expression, &f.this])
        });
        config.transform(K::DateDiff, |g, e| {
            let Expression::DateDiff(f) = e else { return g.render_default(e) };
            let unit = date_part(f.unit_or_day());
            g.render_function("DATEDIFF", &[&unit, &f.expression, &f.this])
        });
        config.transform(K::DateTrunc, |g, e| {
            let Expression::DateTrunc(f) = e else { return g.render_default(e) };
            g.render_function("DATETRUNC", &[&date_part(&f.unit), &f.this])
        });
    }
}

fn date_part(unit: &str) -> Expression {
    unit_string(&unit.to_lowercase())
}

fn render_if_block(g: &mut Generator<'_>, f: &IfFunc) -> Result<()> {
    g.keyword("IF ");
    g.render(&f.condition)?;
    g.keyword(" THEN ");
    g.render(&f.true_value)?;
    if let Some(false_value) = &f.false_value {
        g.keyword(" ELSE ");
        g.render(false_value)?;
    }
    g.keyword(" END");
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::dialects::{Dialect, DialectType};

    fn tableau_from(sql: &str, source: DialectType) -> String {
        let result = Dialect::get(source)
            .transpile_to(sql, &Dialect::get(DialectType::Tableau), &Default::default())
            .expect("Transpile failed");
        result[0].clone()
    }

    #[test]
    fn test_identity() {
        for sql in [
            "SELECT [a b] FROM [t]",
            "SELECT COUNTD(a) FROM t",
            "SELECT IF a > 1 THEN 'x' ELSE 'y' END FROM t",
            "SELECT IFNULL(a, 0) FROM t",
            "SELECT FIND(s, 'a')",
            "SELECT DATEADD('month', 1, d)",
            "SELECT DATETRUNC('month', d)",
        ] {
            assert_eq!(tableau_from(sql, DialectType::Tableau), sql);
        }
    }

    #[test]
    fn test_double_quoted_strings() {
        assert_eq!(tableau_from("SELECT \"abc\"", DialectType::Tableau), "SELECT 'abc'");
    }

    #[test]
    fn test_elseif_becomes_case() {
        assert_eq!(
            tableau_from("SELECT IF a = 1 THEN 'x' ELSEIF a = 2 THEN 'y' END", DialectType::Tableau),
            "SELECT CASE WHEN a = 1 THEN 'x' WHEN a = 2 THEN 'y' END"
        );
    }

    #[test]
    fn test_from_hive() {
        assert_eq!(
            tableau_from("SELECT IF(c, 1, 2), COUNT(DISTINCT b) FROM t", DialectType::Hive),
            "SELECT IF c THEN 1 ELSE 2 END, COUNTD(b) FROM t"
        );
        assert_eq!(
            tableau_from("SELECT `a b`, COALESCE(x, y) FROM t", DialectType::Hive),
            "SELECT [a b], IFNULL(x, y) FROM t"
        );
    }

    #[test]
    fn test_to_hive() {
        let tableau = Dialect::get(DialectType::Tableau);
        let hive = Dialect::get(DialectType::Hive);
        let out = tableau
            .transpile_to("SELECT COUNTD(a), IF c THEN 1 END FROM t", &hive, &Default::default())
            .expect("Transpile failed");
        assert_eq!(out[0], "SELECT COUNT(DISTINCT a), IF(c, 1) FROM t");
    }
}
