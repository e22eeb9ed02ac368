//! Databricks Dialect
//!
//! Databricks SQL is Spark SQL plus a few extensions.
//! Key differences from Spark:
//! - QUALIFY is supported
//! - TRY_CAST is available, so CAST is strict again

use super::{DialectImpl, DialectType};
use crate::generator::GeneratorConfig;
use crate::parser::ParserConfig;

/// Databricks dialect
pub struct DatabricksDialect;

impl DialectImpl for DatabricksDialect {
    fn dialect_type(&self) -> DialectType {
        DialectType::Databricks
    }

    fn base_name(&self) -> Option<String> {
        Some(DialectType::Spark.name().to_string())
    }

    fn parser_config(&self, config: &mut ParserConfig) {
        config.strict_cast = true;
    }

    fn generator_config(&self, config: &mut GeneratorConfig) {
        config.supports_qualify = true;
        config.supports_try_cast = true;
    }
}
