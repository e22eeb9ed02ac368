//! Generic SQL Dialect
//!
//! The root of every inheritance chain. It adds nothing to the default
//! tokenizer, parser and generator tables, so canonical nodes render under
//! their canonical names (`TS_OR_DS_ADD`, `STR_TO_UNIX`, `DATE_DIFF`, ...)
//! and those names parse back into the same nodes.

use super::{DialectImpl, DialectType};

/// Generic dialect
pub struct GenericDialect;

impl DialectImpl for GenericDialect {
    fn dialect_type(&self) -> DialectType {
        DialectType::Generic
    }

    fn base_name(&self) -> Option<String> {
        None
    }
}
