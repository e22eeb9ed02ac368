//! Trino Dialect
//!
//! Trino shares Presto's syntax and function library.
//! Key differences from Presto:
//! - LISTAGG(x, sep) WITHIN GROUP for string aggregation

use super::{DialectImpl, DialectType};
use crate::expressions::{Expression, ExpressionKind, GroupConcat};
use crate::generator::GeneratorConfig;
use crate::parser::{check_arity, ParserConfig};

/// Trino dialect
pub struct TrinoDialect;

impl DialectImpl for TrinoDialect {
    fn dialect_type(&self) -> DialectType {
        DialectType::Trino
    }

    fn base_name(&self) -> Option<String> {
        Some(DialectType::Presto.name().to_string())
    }

    fn parser_config(&self, config: &mut ParserConfig) {
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
        config.transform(ExpressionKind::GroupConcat, |g, e| {
            let Expression::GroupConcat(f) = e else { return g.render_default(e) };
            let separator = f.separator.clone().unwrap_or_else(|| Expression::string(","));
            g.write(&g.function_name("LISTAGG"));
            g.write("(");
            if f.distinct {
                g.keyword("DISTINCT ");
            }
            g.render(&f.this)?;
            g.write(", ");
            g.render(&separator)?;
            g.keyword(") WITHIN GROUP (ORDER BY ");
            g.render(&f.this)?;
            g.write(")");
            Ok(())
        });
    }
}

#[cfg(test)]
mod tests {
    use crate::dialects::{Dialect, DialectType};

    #[test]
    fn test_inherits_presto() {
        let trino = Dialect::get(DialectType::Trino);
        let ast = Dialect::get(DialectType::Hive).parse("SELECT x & 1").expect("Parse failed");
        assert_eq!(trino.generate(&ast[0]).unwrap(), "SELECT BITWISE_AND(x, 1)");
        assert_eq!(trino.bundle().lineage, vec!["trino", "presto", "generic"]);
    }

    #[test]
    fn test_group_concat_as_listagg() {
        let mysql = Dialect::get(DialectType::MySQL);
        let ast = mysql.parse("SELECT GROUP_CONCAT(a, '-') FROM t").expect("Parse failed");
        assert_eq!(
            Dialect::get(DialectType::Trino).generate(&ast[0]).unwrap(),
            "SELECT LISTAGG(a, '-') WITHIN GROUP (ORDER BY a) FROM t"
        );
    }
}
