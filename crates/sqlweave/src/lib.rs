//! sqlweave - SQL parsing and dialect translation
//!
//! SQL text in one dialect is parsed into a dialect-neutral [`Expression`]
//! tree and rendered back out for another dialect.
//!
//! # Architecture
//!
//! 1. **Tokenizer** - SQL string to token stream
//! 2. **Parser** - token stream to AST
//! 3. **Generator** - AST back to SQL string
//!
//! Every stage reads its tables from a [`Dialect`] bundle, resolved once per
//! name and shared behind an `Arc`.
//!
//! ```
//! use sqlweave::{transpile_one, GenerateOptions};
//!
//! let sql = transpile_one("SELECT a & 1 FROM t", "hive", "presto", &GenerateOptions::default()).unwrap();
//! assert_eq!(sql, "SELECT BITWISE_AND(a, 1) FROM t");
//! ```

pub mod dialects;
pub mod error;
pub mod expressions;
pub mod generator;
pub mod parser;
pub mod time;
pub mod tokens;
pub mod traversal;
pub mod trie;

use serde::{Deserialize, Serialize};

pub use dialects::{unregister_custom_dialect, CustomDialectBuilder, Dialect, DialectImpl, DialectType};
pub use error::{Error, Result, Stage, ValidationError, ValidationResult, ValidationSeverity};
pub use expressions::{Expression, ExpressionKind};
pub use generator::{GenerateOptions, Generator, GeneratorConfig, NormalizeCase};
pub use parser::{ErrorLevel, ParseOptions, Parser, ParserConfig};
pub use time::{format_time, TimeMapping};
pub use tokens::{Span, Token, TokenType, Tokenizer, TokenizerConfig};
pub use traversal::{transform, transform_map, BfsIter, DfsIter, ExpressionWalk};
pub use trie::{new_trie, Trie, TrieResult};

/// Options for both ends of a transpile call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranspileOptions {
    pub read: ParseOptions,
    pub write: GenerateOptions,
}

/// Transpile SQL from one dialect to another.
///
/// Returns one string per `;`-separated statement. Any failure fails the
/// whole call.
///
/// # Example
/// ```
/// use sqlweave::{transpile, GenerateOptions};
///
/// let out = transpile("SELECT 1; SELECT 2", "generic", "duckdb", &GenerateOptions::default()).unwrap();
/// assert_eq!(out, vec!["SELECT 1", "SELECT 2"]);
/// ```
pub fn transpile(sql: &str, read: &str, write: &str, options: &GenerateOptions) -> Result<Vec<String>> {
    transpile_with(
        sql,
        read,
        write,
        &TranspileOptions {
            read: ParseOptions::default(),
            write: options.clone(),
        },
    )
}

/// [`transpile`] with parse options as well as generate options.
pub fn transpile_with(sql: &str, read: &str, write: &str, options: &TranspileOptions) -> Result<Vec<String>> {
    let source = Dialect::get_by_name(read)?;
    let target = Dialect::get_by_name(write)?;
    let _span = tracing::debug_span!(
        target: "sqlweave::generate",
        "transpile",
        read = %source.name(),
        write = %target.name()
    )
    .entered();

    source
        .parse_with_options(sql, options.read)?
        .iter()
        .map(|expr| target.generate_with(expr, &options.write))
        .collect()
}

/// Transpile input that holds exactly one statement.
pub fn transpile_one(sql: &str, read: &str, write: &str, options: &GenerateOptions) -> Result<String> {
    let mut out = transpile(sql, read, write, options)?;
    if out.len() != 1 {
        return Err(Error::parse(format!("Expected 1 statement, found {}", out.len())));
    }
    Ok(out.remove(0))
}

/// Parse SQL into one AST per statement.
pub fn parse(sql: &str, dialect: &str) -> Result<Vec<Expression>> {
    Dialect::get_by_name(dialect)?.parse(sql)
}

/// Parse with explicit [`ParseOptions`], e.g. lenient mode.
pub fn parse_with_options(sql: &str, dialect: &str, options: &ParseOptions) -> Result<Vec<Expression>> {
    Dialect::get_by_name(dialect)?.parse_with_options(sql, *options)
}

/// Parse a single statement.
///
/// Fails if the input holds zero or several statements.
pub fn parse_one(sql: &str, dialect: &str) -> Result<Expression> {
    let mut expressions = parse(sql, dialect)?;
    if expressions.len() != 1 {
        return Err(Error::parse(format!(
            "Expected 1 statement, found {}",
            expressions.len()
        )));
    }
    Ok(expressions.remove(0))
}

/// Parse a bare expression such as `a + 1`.
pub fn parse_expression(sql: &str, dialect: &str) -> Result<Expression> {
    Dialect::get_by_name(dialect)?.parse_expression(sql)
}

/// Render an AST as SQL for `dialect`.
pub fn generate(expression: &Expression, dialect: &str, options: &GenerateOptions) -> Result<String> {
    Dialect::get_by_name(dialect)?.generate_with(expression, options)
}

/// Split SQL into tokens using `dialect`'s lexical rules.
pub fn tokenize(sql: &str, dialect: &str) -> Result<Vec<Token>> {
    Dialect::get_by_name(dialect)?.tokenize(sql)
}

/// Check that SQL tokenizes and parses in `dialect`.
///
/// Never fails: problems are reported in the returned [`ValidationResult`].
/// Bare expressions such as `1 + 1` parse but are reported as errors since
/// they are not statements.
pub fn validate(sql: &str, dialect: &str) -> ValidationResult {
    let expressions = match parse(sql, dialect) {
        Ok(expressions) => expressions,
        Err(e) => return ValidationResult::with_errors(vec![ValidationError::from(&e)]),
    };

    let mut result = ValidationResult::success();
    for expr in expressions.iter().filter(|e| !e.is_statement()) {
        result.add_error(
            ValidationError::error(format!("Expected a statement, found {}", expr.kind()))
                .with_stage(Stage::Parse),
        );
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_transpile_by_name() {
        let out = transpile("SELECT x & 1", "hive", "presto", &GenerateOptions::default()).unwrap();
        assert_eq!(out, vec!["SELECT BITWISE_AND(x, 1)"]);
    }

    #[test]
    fn test_transpile_unknown_dialect() {
        let err = transpile("SELECT 1", "hive", "nope", &GenerateOptions::default()).unwrap_err();
        assert!(matches!(err, Error::UnknownDialect { ref name } if name == "nope"));
        assert_eq!(err.stage(), Stage::Registry);
    }

    #[test]
    fn test_transpile_one_rejects_many() {
        assert!(transpile_one("SELECT 1; SELECT 2", "generic", "generic", &GenerateOptions::default()).is_err());
    }

    #[test]
    fn test_parse_one() {
        let ast = parse_one("SELECT a FROM t", "generic").unwrap();
        assert!(ast.is_statement());
        assert!(parse_one("SELECT 1; SELECT 2", "generic").is_err());
    }

    #[test]
    fn test_parse_expression_and_generate() {
        let expr = parse_expression("a + 1", "generic").unwrap();
        assert_eq!(generate(&expr, "duckdb", &GenerateOptions::default()).unwrap(), "a + 1");
    }

    #[test]
    fn test_tokenize() {
        let tokens = tokenize("SELECT `a`", "hive").unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].token_type, TokenType::Select);
    }

    #[test]
    fn test_validate() {
        assert!(validate("SELECT a FROM t", "generic").valid);

        let bare = validate("1 + 1", "generic");
        assert!(!bare.valid);

        let broken = validate("SELECT 'abc", "generic");
        assert!(!broken.valid);
        assert_eq!(broken.errors[0].stage, Some(Stage::Lex));
        assert_eq!(broken.errors[0].line, Some(1));
    }

    #[test]
    fn test_transpile_options_from_json() {
        let opts: TranspileOptions =
            serde_json::from_str(r#"{"read": {"error_level": "lenient"}, "write": {"pretty": true}}"#).unwrap();
        assert_eq!(opts.read.error_level, ErrorLevel::Lenient);
        assert!(opts.write.pretty);
        assert_eq!(opts.write.max_width, 80);
    }
}
