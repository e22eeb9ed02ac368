//! Spark SQL Dialect
//!
//! Spark inherits the Hive dialect and changes what Spark SQL spells
//! differently.
//! Key differences from Hive:
//! - Short integer type names (`BYTE`, `SHORT`, `LONG`)
//! - SHIFTLEFT / SHIFTRIGHT functions instead of `<<` / `>>`
//! - MAP_FROM_ARRAYS for maps built from key and value arrays
//! - ILIKE is supported
//! - CACHE TABLE statement

use super::{operator_as_function, operator_from_function, DialectImpl, DialectType};
use crate::expressions::{DataTypeKind, Expression, ExpressionKind, MapFunc};
use crate::generator::GeneratorConfig;
use crate::parser::{take_args, ParserConfig};
use crate::tokens::{TokenType, TokenizerConfig};

/// Spark SQL dialect
pub struct SparkDialect;

impl DialectImpl for SparkDialect {
    fn dialect_type(&self) -> DialectType {
        DialectType::Spark
    }

    fn base_name(&self) -> Option<String> {
        Some(DialectType::Hive.name().to_string())
    }

    fn tokenizer_config(&self, config: &mut TokenizerConfig) {
        config.keywords.insert("CACHE".to_string(), TokenType::Cache);
        config.keywords.insert("UNCACHE".to_string(), TokenType::Command);
        config.keywords.insert("REFRESH".to_string(), TokenType::Command);
    }

    fn parser_config(&self, config: &mut ParserConfig) {
        config.statement_parsers.insert(TokenType::Cache, |p| p.parse_cache());
        config.function("MAP_FROM_ARRAYS", |args, _| {
            let [keys, values] = take_args("MAP_FROM_ARRAYS", args)?;
            Ok(Expression::Map(Box::new(MapFunc { keys, values })))
        });
        config.function("SHIFTLEFT", |args, _| {
            operator_from_function("SHIFTLEFT", args, Expression::ShiftLeft)
        });
        config.function("SHIFTRIGHT", |args, _| {
            operator_from_function("SHIFTRIGHT", args, Expression::ShiftRight)
        });
    }

    fn generator_config(&self, config: &mut GeneratorConfig) {
        use ExpressionKind as K;

        config.supports_ilike = true;
        config.type_name(DataTypeKind::TinyInt, "BYTE");
        config.type_name(DataTypeKind::SmallInt, "SHORT");
        config.type_name(DataTypeKind::BigInt, "LONG");

        operator_as_function(config, K::ShiftLeft, "SHIFTLEFT");
        operator_as_function(config, K::ShiftRight, "SHIFTRIGHT");
        config.rename(K::Map, "MAP_FROM_ARRAYS");
    }
}
