//! SQL Dialect System
//!
//! A dialect is a set of deltas applied to the generic tokenizer, parser and
//! generator configuration. Each [`DialectImpl`] names its base dialect;
//! resolution starts from the generic defaults and applies every ancestor's
//! deltas root-first, so a child's settings win over its parent's. The result
//! is frozen into an [`Arc<DialectBundle>`] and cached in a process-wide
//! registry.
//!
//! # Usage
//!
//! ```rust
//! use sqlweave::dialects::{Dialect, DialectType};
//!
//! let hive = Dialect::get(DialectType::Hive);
//! let ast = hive.parse("SELECT x & 1 FROM t").unwrap();
//! let presto = Dialect::get(DialectType::Presto);
//! assert_eq!(presto.generate(&ast[0]).unwrap(), "SELECT BITWISE_AND(x, 1) FROM t");
//! ```
//!
//! Custom dialects are registered at runtime through [`CustomDialectBuilder`]
//! and resolved by name with [`Dialect::get_by_name`].

mod bigquery;
mod clickhouse;
mod databricks;
mod drill;
mod duckdb;
mod generic;
mod hive;
mod mysql;
mod oracle;
mod postgres;
mod presto;
mod redshift;
mod snowflake;
mod spark;
mod sqlite;
mod starrocks;
mod tableau;
mod teradata;
mod trino;
mod tsql;

pub use bigquery::BigQueryDialect;
pub use clickhouse::ClickHouseDialect;
pub use databricks::DatabricksDialect;
pub use drill::DrillDialect;
pub use duckdb::DuckDBDialect;
pub use generic::GenericDialect;
pub use hive::HiveDialect;
pub use mysql::MySQLDialect;
pub use oracle::OracleDialect;
pub use postgres::PostgresDialect;
pub use presto::PrestoDialect;
pub use redshift::RedshiftDialect;
pub use snowflake::SnowflakeDialect;
pub use spark::SparkDialect;
pub use sqlite::SQLiteDialect;
pub use starrocks::StarRocksDialect;
pub use tableau::TableauDialect;
pub use teradata::TeradataDialect;
pub use trino::TrinoDialect;
pub use tsql::TSQLDialect;

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::expressions::{
    BinaryFunc, BinaryOp, Case, DateArith, Expression, ExpressionKind, FormatFunc, Identifier, IfFunc,
    MapFunc, StrPosition, Substring,
};
use crate::generator::{GenerateOptions, Generator, GeneratorConfig};
use crate::parser::{take_args, unit_name, NormalizationStrategy, ParseOptions, Parser, ParserConfig};
use crate::tokens::{Token, Tokenizer, TokenizerConfig};

/// Built-in SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectType {
    /// Dialect-neutral SQL; the root of every inheritance chain
    #[default]
    Generic,
    BigQuery,
    ClickHouse,
    Databricks,
    Drill,
    DuckDB,
    Hive,
    MySQL,
    Oracle,
    Postgres,
    Presto,
    Redshift,
    Snowflake,
    Spark,
    SQLite,
    StarRocks,
    Tableau,
    Teradata,
    Trino,
    TSQL,
}

impl DialectType {
    pub const ALL: [DialectType; 20] = [
        DialectType::Generic,
        DialectType::BigQuery,
        DialectType::ClickHouse,
        DialectType::Databricks,
        DialectType::Drill,
        DialectType::DuckDB,
        DialectType::Hive,
        DialectType::MySQL,
        DialectType::Oracle,
        DialectType::Postgres,
        DialectType::Presto,
        DialectType::Redshift,
        DialectType::Snowflake,
        DialectType::Spark,
        DialectType::SQLite,
        DialectType::StarRocks,
        DialectType::Tableau,
        DialectType::Teradata,
        DialectType::Trino,
        DialectType::TSQL,
    ];

    /// Canonical lower-case name
    pub fn name(self) -> &'static str {
        match self {
            DialectType::Generic => "generic",
            DialectType::BigQuery => "bigquery",
            DialectType::ClickHouse => "clickhouse",
            DialectType::Databricks => "databricks",
            DialectType::Drill => "drill",
            DialectType::DuckDB => "duckdb",
            DialectType::Hive => "hive",
            DialectType::MySQL => "mysql",
            DialectType::Oracle => "oracle",
            DialectType::Postgres => "postgres",
            DialectType::Presto => "presto",
            DialectType::Redshift => "redshift",
            DialectType::Snowflake => "snowflake",
            DialectType::Spark => "spark",
            DialectType::SQLite => "sqlite",
            DialectType::StarRocks => "starrocks",
            DialectType::Tableau => "tableau",
            DialectType::Teradata => "teradata",
            DialectType::Trino => "trino",
            DialectType::TSQL => "tsql",
        }
    }

    /// Look up a built-in by name or alias, case-insensitively. `""` is generic.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        match name.as_str() {
            "" => Some(DialectType::Generic),
            "postgresql" => Some(DialectType::Postgres),
            "mssql" | "sqlserver" => Some(DialectType::TSQL),
            other => DialectType::ALL.into_iter().find(|d| d.name() == other),
        }
    }

    fn implementation(self) -> &'static dyn DialectImpl {
        match self {
            DialectType::Generic => &GenericDialect,
            DialectType::BigQuery => &BigQueryDialect,
            DialectType::ClickHouse => &ClickHouseDialect,
            DialectType::Databricks => &DatabricksDialect,
            DialectType::Drill => &DrillDialect,
            DialectType::DuckDB => &DuckDBDialect,
            DialectType::Hive => &HiveDialect,
            DialectType::MySQL => &MySQLDialect,
            DialectType::Oracle => &OracleDialect,
            DialectType::Postgres => &PostgresDialect,
            DialectType::Presto => &PrestoDialect,
            DialectType::Redshift => &RedshiftDialect,
            DialectType::Snowflake => &SnowflakeDialect,
            DialectType::Spark => &SparkDialect,
            DialectType::SQLite => &SQLiteDialect,
            DialectType::StarRocks => &StarRocksDialect,
            DialectType::Tableau => &TableauDialect,
            DialectType::Teradata => &TeradataDialect,
            DialectType::Trino => &TrinoDialect,
            DialectType::TSQL => &TSQLDialect,
        }
    }
}

impl fmt::Display for DialectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DialectType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        DialectType::from_name(s).ok_or_else(|| Error::unknown_dialect(s))
    }
}

/// Deltas a dialect applies on top of its base.
///
/// Every method receives the configuration already populated by the base
/// chain and changes only what differs. Implementations must be stateless.
pub trait DialectImpl: Send + Sync {
    fn dialect_type(&self) -> DialectType;

    /// Registry name of this dialect
    fn name(&self) -> String {
        self.dialect_type().name().to_string()
    }

    /// Name of the dialect this one inherits from; `None` only for the root
    fn base_name(&self) -> Option<String> {
        Some(DialectType::Generic.name().to_string())
    }

    fn tokenizer_config(&self, _config: &mut TokenizerConfig) {}

    fn parser_config(&self, _config: &mut ParserConfig) {}

    fn generator_config(&self, _config: &mut GeneratorConfig) {}
}

/// Resolved, immutable configuration for one dialect.
#[derive(Debug)]
pub struct DialectBundle {
    pub name: String,
    pub dialect_type: DialectType,
    pub tokenizer: Tokenizer,
    pub parser: ParserConfig,
    pub generator: GeneratorConfig,
    /// Names of every dialect in the inheritance chain, this one first
    pub lineage: Vec<String>,
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Registry {
    custom: HashMap<String, Arc<dyn DialectImpl>>,
    bundles: HashMap<String, Arc<DialectBundle>>,
}

static REGISTRY: Lazy<RwLock<Registry>> = Lazy::new(|| RwLock::new(Registry::default()));

fn poisoned<T>(_: T) -> Error {
    Error::registry("dialect registry lock poisoned")
}

fn canonical_name(name: &str) -> String {
    match DialectType::from_name(name) {
        Some(builtin) => builtin.name().to_string(),
        None => name.trim().to_lowercase(),
    }
}

/// Resolve a dialect name (built-in, alias or custom) to its bundle.
pub fn resolve(name: &str) -> Result<Arc<DialectBundle>> {
    let name = canonical_name(name);
    {
        let registry = REGISTRY.read().map_err(poisoned)?;
        if let Some(bundle) = registry.bundles.get(&name) {
            tracing::trace!(target: "sqlweave::dialects", dialect = %name, "bundle cache hit");
            return Ok(Arc::clone(bundle));
        }
    }

    let mut registry = REGISTRY.write().map_err(poisoned)?;
    if let Some(bundle) = registry.bundles.get(&name) {
        return Ok(Arc::clone(bundle));
    }
    let bundle = Arc::new(build_bundle(&registry, &name)?);
    tracing::trace!(
        target: "sqlweave::dialects",
        dialect = %name,
        lineage = ?bundle.lineage,
        "resolved dialect bundle"
    );
    registry.bundles.insert(name, Arc::clone(&bundle));
    Ok(bundle)
}

fn lookup(registry: &Registry, name: &str) -> Option<Arc<dyn DialectImpl>> {
    match DialectType::from_name(name) {
        Some(builtin) => Some(Arc::new(BuiltinRef(builtin.implementation()))),
        None => registry.custom.get(name).cloned(),
    }
}

/// Adapter so built-in and custom dialects share one chain type.
struct BuiltinRef(&'static dyn DialectImpl);

impl DialectImpl for BuiltinRef {
    fn dialect_type(&self) -> DialectType {
        self.0.dialect_type()
    }
    fn name(&self) -> String {
        self.0.name()
    }
    fn base_name(&self) -> Option<String> {
        self.0.base_name()
    }
    fn tokenizer_config(&self, config: &mut TokenizerConfig) {
        self.0.tokenizer_config(config)
    }
    fn parser_config(&self, config: &mut ParserConfig) {
        self.0.parser_config(config)
    }
    fn generator_config(&self, config: &mut GeneratorConfig) {
        self.0.generator_config(config)
    }
}

fn build_bundle(registry: &Registry, name: &str) -> Result<DialectBundle> {
    let mut chain: Vec<Arc<dyn DialectImpl>> = Vec::new();
    let mut seen = HashSet::new();
    let mut next = Some(name.to_string());
    while let Some(current) = next {
        let current = canonical_name(&current);
        if !seen.insert(current.clone()) {
            return Err(Error::registry(format!(
                "dialect '{name}' has a cyclic base chain through '{current}'"
            )));
        }
        let dialect = lookup(registry, &current).ok_or_else(|| Error::unknown_dialect(&current))?;
        next = dialect.base_name();
        chain.push(dialect);
    }
    Ok(assemble(name, &chain))
}

/// Bundle for a built-in, without consulting the registry
fn builtin_bundle(dialect_type: DialectType) -> DialectBundle {
    let mut chain: Vec<Arc<dyn DialectImpl>> = Vec::new();
    let mut next = Some(dialect_type);
    while let Some(current) = next {
        let dialect = current.implementation();
        next = dialect.base_name().and_then(|base| DialectType::from_name(&base));
        chain.push(Arc::new(BuiltinRef(dialect)));
    }
    assemble(dialect_type.name(), &chain)
}

/// Apply a chain (child first) root-first over the generic defaults
fn assemble(name: &str, chain: &[Arc<dyn DialectImpl>]) -> DialectBundle {
    let mut tokenizer = TokenizerConfig::default();
    let mut parser = ParserConfig::default();
    let mut generator = GeneratorConfig::default();
    for dialect in chain.iter().rev() {
        dialect.tokenizer_config(&mut tokenizer);
        dialect.parser_config(&mut parser);
        dialect.generator_config(&mut generator);
    }

    // String decoding in the parser follows the tokenizer's quoting rules
    parser.string_escapes = tokenizer.string_escapes.clone();
    parser.quotes = tokenizer.quotes.clone();
    generator.dialect = name.to_string();

    DialectBundle {
        name: name.to_string(),
        dialect_type: chain.first().map(|d| d.dialect_type()).unwrap_or_default(),
        tokenizer: Tokenizer::new(tokenizer),
        parser,
        generator,
        lineage: chain.iter().map(|d| d.name()).collect(),
    }
}

fn invalidate_dependants(registry: &mut Registry, name: &str) {
    registry
        .bundles
        .retain(|_, bundle| !bundle.lineage.iter().any(|n| n == name));
}

/// Remove a custom dialect. Returns `false` when no such custom dialect exists.
pub fn unregister_custom_dialect(name: &str) -> bool {
    let name = canonical_name(name);
    let Ok(mut registry) = REGISTRY.write() else {
        tracing::warn!(target: "sqlweave::dialects", dialect = %name, "registry lock poisoned, dialect not unregistered");
        return false;
    };
    if registry.custom.remove(&name).is_none() {
        return false;
    }
    invalidate_dependants(&mut registry, &name);
    tracing::debug!(target: "sqlweave::dialects", dialect = %name, "unregistered custom dialect");
    true
}

// ---------------------------------------------------------------------------
// Custom dialects
// ---------------------------------------------------------------------------

type TokenizerModifier = Box<dyn Fn(&mut TokenizerConfig) + Send + Sync>;
type ParserModifier = Box<dyn Fn(&mut ParserConfig) + Send + Sync>;
type GeneratorModifier = Box<dyn Fn(&mut GeneratorConfig) + Send + Sync>;

struct CustomDialect {
    name: String,
    base: String,
    dialect_type: DialectType,
    tokenizer: Vec<TokenizerModifier>,
    parser: Vec<ParserModifier>,
    generator: Vec<GeneratorModifier>,
}

impl DialectImpl for CustomDialect {
    fn dialect_type(&self) -> DialectType {
        self.dialect_type
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn base_name(&self) -> Option<String> {
        Some(self.base.clone())
    }

    fn tokenizer_config(&self, config: &mut TokenizerConfig) {
        self.tokenizer.iter().for_each(|modify| modify(config));
    }

    fn parser_config(&self, config: &mut ParserConfig) {
        self.parser.iter().for_each(|modify| modify(config));
    }

    fn generator_config(&self, config: &mut GeneratorConfig) {
        self.generator.iter().for_each(|modify| modify(config));
    }
}

/// Builder for dialects registered at runtime.
///
/// ```rust
/// use sqlweave::dialects::{CustomDialectBuilder, Dialect, DialectType};
/// use sqlweave::expressions::ExpressionKind;
///
/// CustomDialectBuilder::new("acme")
///     .based_on(DialectType::Presto)
///     .generator_config_modifier(|gc| gc.rename(ExpressionKind::ArraySize, "ARRAY_LEN"))
///     .register()
///     .unwrap();
///
/// let sql = sqlweave::transpile_one("SELECT SIZE(x)", "hive", "acme", &Default::default()).unwrap();
/// assert_eq!(sql, "SELECT ARRAY_LEN(x)");
/// # sqlweave::unregister_custom_dialect("acme");
/// ```
pub struct CustomDialectBuilder {
    name: String,
    base: String,
    allow_override: bool,
    tokenizer: Vec<TokenizerModifier>,
    parser: Vec<ParserModifier>,
    generator: Vec<GeneratorModifier>,
}

impl CustomDialectBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base: DialectType::Generic.name().to_string(),
            allow_override: false,
            tokenizer: Vec::new(),
            parser: Vec::new(),
            generator: Vec::new(),
        }
    }

    pub fn based_on(mut self, base: DialectType) -> Self {
        self.base = base.name().to_string();
        self
    }

    /// Inherit from another custom dialect by name
    pub fn based_on_name(mut self, base: impl Into<String>) -> Self {
        self.base = base.into();
        self
    }

    /// Replace an existing custom dialect of the same name instead of failing
    pub fn allow_override(mut self, allow: bool) -> Self {
        self.allow_override = allow;
        self
    }

    pub fn tokenizer_config_modifier<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut TokenizerConfig) + Send + Sync + 'static,
    {
        self.tokenizer.push(Box::new(f));
        self
    }

    pub fn parser_config_modifier<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut ParserConfig) + Send + Sync + 'static,
    {
        self.parser.push(Box::new(f));
        self
    }

    pub fn generator_config_modifier<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut GeneratorConfig) + Send + Sync + 'static,
    {
        self.generator.push(Box::new(f));
        self
    }

    /// Validate and add the dialect to the global registry.
    pub fn register(self) -> Result<()> {
        let name = self.name.trim().to_lowercase();
        if name.is_empty() {
            return Err(Error::registry("custom dialect name must not be empty"));
        }
        if DialectType::from_name(&name).is_some() {
            return Err(Error::registry(format!(
                "custom dialect '{name}' collides with built-in dialect"
            )));
        }

        let mut registry = REGISTRY.write().map_err(poisoned)?;
        let base = canonical_name(&self.base);
        if base == name {
            return Err(Error::registry(format!("dialect '{name}' cannot be based on itself")));
        }
        let dialect_type = lookup(&registry, &base)
            .ok_or_else(|| Error::unknown_dialect(&base))?
            .dialect_type();

        if registry.custom.contains_key(&name) {
            if !self.allow_override {
                return Err(Error::registry(format!(
                    "custom dialect '{name}' is already registered"
                )));
            }
            tracing::warn!(
                target: "sqlweave::dialects",
                dialect = %name,
                "overriding previously registered custom dialect"
            );
            invalidate_dependants(&mut registry, &name);
        }

        let dialect = CustomDialect {
            name: name.clone(),
            base,
            dialect_type,
            tokenizer: self.tokenizer,
            parser: self.parser,
            generator: self.generator,
        };
        registry.custom.insert(name.clone(), Arc::new(dialect));
        tracing::debug!(target: "sqlweave::dialects", dialect = %name, "registered custom dialect");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Dialect handle
// ---------------------------------------------------------------------------

/// A resolved dialect: a cheap handle over a shared [`DialectBundle`].
#[derive(Debug, Clone)]
pub struct Dialect {
    bundle: Arc<DialectBundle>,
}

impl Dialect {
    /// Handle for a built-in dialect
    pub fn get(dialect_type: DialectType) -> Dialect {
        let bundle = resolve(dialect_type.name())
            .unwrap_or_else(|_| Arc::new(builtin_bundle(dialect_type)));
        Dialect { bundle }
    }

    /// Handle for a built-in, alias or custom dialect name
    pub fn get_by_name(name: &str) -> Result<Dialect> {
        resolve(name).map(|bundle| Dialect { bundle })
    }

    pub fn name(&self) -> &str {
        &self.bundle.name
    }

    /// The built-in type this dialect is, or derives from
    pub fn dialect_type(&self) -> DialectType {
        self.bundle.dialect_type
    }

    pub fn bundle(&self) -> &Arc<DialectBundle> {
        &self.bundle
    }

    pub fn tokenizer_config(&self) -> &TokenizerConfig {
        self.bundle.tokenizer.config()
    }

    pub fn parser_config(&self) -> &ParserConfig {
        &self.bundle.parser
    }

    pub fn generator_config(&self) -> &GeneratorConfig {
        &self.bundle.generator
    }

    pub fn tokenize(&self, sql: &str) -> Result<Vec<Token>> {
        let _span = tracing::debug_span!(target: "sqlweave::tokenize", "tokenize", dialect = %self.name()).entered();
        self.bundle.tokenizer.tokenize(sql)
    }

    /// Parse every `;`-separated statement
    pub fn parse(&self, sql: &str) -> Result<Vec<Expression>> {
        self.parse_with_options(sql, ParseOptions::default())
    }

    pub fn parse_with_options(&self, sql: &str, options: ParseOptions) -> Result<Vec<Expression>> {
        let tokens = self.tokenize(sql)?;
        let _span = tracing::debug_span!(
            target: "sqlweave::parse",
            "parse",
            dialect = %self.name(),
            tokens = tokens.len()
        )
        .entered();
        Parser::new(&self.bundle.parser, options)
            .with_source(sql)
            .parse(tokens)
    }

    /// Parse a single expression such as `a + 1`
    pub fn parse_expression(&self, sql: &str) -> Result<Expression> {
        let tokens = self.tokenize(sql)?;
        let _span = tracing::debug_span!(target: "sqlweave::parse", "parse_expression", dialect = %self.name()).entered();
        Parser::new(&self.bundle.parser, ParseOptions::default())
            .with_source(sql)
            .parse_single_expression(tokens)
    }

    pub fn generate(&self, expr: &Expression) -> Result<String> {
        self.generate_with(expr, &GenerateOptions::default())
    }

    pub fn generate_with(&self, expr: &Expression, options: &GenerateOptions) -> Result<String> {
        let _span = tracing::debug_span!(target: "sqlweave::generate", "generate", dialect = %self.name()).entered();
        Generator::new(&self.bundle.generator, options.clone()).generate(expr)
    }

    /// Parse with this dialect and render every statement in `target`
    pub fn transpile_to(&self, sql: &str, target: &Dialect, options: &GenerateOptions) -> Result<Vec<String>> {
        self.parse(sql)?
            .iter()
            .map(|expr| target.generate_with(expr, options))
            .collect()
    }

    /// Apply this dialect's identifier normalization strategy
    pub fn normalize_identifier(&self, id: &Identifier) -> Identifier {
        let name = match self.bundle.parser.normalization {
            NormalizationStrategy::CaseSensitive => id.name.clone(),
            _ if id.quoted => id.name.clone(),
            NormalizationStrategy::Lowercase | NormalizationStrategy::CaseInsensitive => {
                id.name.to_lowercase()
            }
            NormalizationStrategy::Uppercase => id.name.to_uppercase(),
        };
        Identifier {
            name,
            quoted: id.quoted,
        }
    }

    /// Whether two identifiers name the same entity in this dialect
    pub fn identifiers_equal(&self, a: &Identifier, b: &Identifier) -> bool {
        if self.bundle.parser.normalization == NormalizationStrategy::CaseInsensitive {
            return a.name.eq_ignore_ascii_case(&b.name);
        }
        self.normalize_identifier(a).name == self.normalize_identifier(b).name
    }
}

// ---------------------------------------------------------------------------
// Render helpers shared by the dialect modules
// ---------------------------------------------------------------------------

/// Canonical form of `yyyy-MM-dd HH:mm:ss`
pub(crate) const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Canonical form of `yyyy-MM-dd`
pub(crate) const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

fn binary_op(expr: &Expression) -> Option<&BinaryOp> {
    match expr {
        Expression::BitwiseAnd(op)
        | Expression::BitwiseOr(op)
        | Expression::BitwiseXor(op)
        | Expression::ShiftLeft(op)
        | Expression::ShiftRight(op)
        | Expression::NullSafeEq(op)
        | Expression::IntDiv(op)
        | Expression::Mod(op)
        | Expression::DPipe(op) => Some(op),
        _ => None,
    }
}

fn binary_func(expr: &Expression) -> Option<&BinaryFunc> {
    match expr {
        Expression::RegexpLike(f)
        | Expression::JsonExtract(f)
        | Expression::JsonExtractScalar(f)
        | Expression::ArrayContains(f)
        | Expression::ArrayContainsAll(f)
        | Expression::Quantile(f)
        | Expression::ApproxQuantile(f)
        | Expression::Pow(f) => Some(f),
        _ => None,
    }
}

/// Render a binary operator as `NAME(left, right)`
pub(crate) fn operator_as_function(config: &mut GeneratorConfig, kind: ExpressionKind, name: &'static str) {
    config.transform(kind, move |g, e| match binary_op(e) {
        Some(op) => g.render_function(name, &[&op.left, &op.right]),
        None => g.render_default(e),
    });
}

/// Render a binary operator with a different infix spelling
pub(crate) fn operator_as_infix(config: &mut GeneratorConfig, kind: ExpressionKind, operator: &'static str) {
    config.transform(kind, move |g, e| match binary_op(e) {
        Some(op) => g.render_binary(op, operator),
        None => g.render_default(e),
    });
}

/// Render a two-argument function node as `this OPERATOR expression`
pub(crate) fn function_as_infix(config: &mut GeneratorConfig, kind: ExpressionKind, operator: &'static str) {
    config.transform(kind, move |g, e| match binary_func(e) {
        Some(f) => {
            g.render(&f.this)?;
            g.write(" ");
            g.keyword(operator);
            g.write(" ");
            g.render(&f.expression)
        }
        None => g.render_default(e),
    });
}

/// Render array constructors as `PREFIX[a, b]`
pub(crate) fn bracket_arrays(config: &mut GeneratorConfig, prefix: &'static str) {
    config.transform(ExpressionKind::Array, move |g, e| {
        let Expression::Array(array) = e else { return g.render_default(e) };
        g.keyword(prefix);
        g.write("[");
        g.render_list(&array.expressions)?;
        g.write("]");
        Ok(())
    });
}

/// Parse `NAME(a, b)` into a binary operator node
pub(crate) fn operator_from_function(
    name: &'static str,
    args: Vec<Expression>,
    make: fn(Box<BinaryOp>) -> Expression,
) -> Result<Expression> {
    let [left, right] = take_args(name, args)?;
    Ok(make(Box::new(BinaryOp::new(left, right))))
}

/// `NAME(this, format)` with the format converted to the target's directives
pub(crate) fn render_formatted(
    g: &mut Generator<'_>,
    name: &str,
    this: &Expression,
    format: &Expression,
) -> Result<()> {
    g.write(&g.function_name(name));
    g.write("(");
    g.render(this)?;
    g.write(", ");
    g.render_format(format)?;
    g.write(")");
    Ok(())
}

/// The format argument of a node, or the target's default format
pub(crate) fn format_or_default(g: &Generator<'_>, format: Option<&Expression>) -> Expression {
    match format {
        Some(format) => format.clone(),
        None => Expression::string(g.config().time_format.clone().unwrap_or_else(|| DEFAULT_TIME_FORMAT.to_string())),
    }
}

/// Parse `NAME(format, this)`
pub(crate) fn format_first(
    make: fn(Box<FormatFunc>) -> Expression,
    name: &'static str,
    args: Vec<Expression>,
    config: &ParserConfig,
) -> Result<Expression> {
    let [format, this] = take_args(name, args)?;
    Ok(make(Box::new(FormatFunc::new(this, Some(config.canonical_format(format))))))
}

/// `NAME(format, this)` with the format converted to the target's directives
pub(crate) fn render_format_first(g: &mut Generator<'_>, name: &str, f: &FormatFunc) -> Result<()> {
    let format = format_or_default(g, f.format.as_ref());
    g.write(&g.function_name(name));
    g.write("(");
    g.render_format(&format)?;
    g.write(", ");
    g.render(&f.this)?;
    g.write(")");
    Ok(())
}

/// Whether a format argument is the target's default format
pub(crate) fn is_default_format(g: &Generator<'_>, format: Option<&Expression>) -> bool {
    match format {
        None => true,
        Some(format) => match (format.as_string(), &g.config().time_format) {
            (Some(s), Some(default)) => s == default,
            _ => false,
        },
    }
}

/// `STRPOS(this, substr)`, or with a start position
/// `STRPOS(SUBSTRING(this, pos), substr) + pos - 1`, with the target's SUBSTRING name
pub(crate) fn render_strpos(g: &mut Generator<'_>, f: &StrPosition) -> Result<()> {
    let Some(position) = &f.position else {
        return g.render_function("STRPOS", &[&f.this, &f.substr]);
    };
    let tail = Expression::Substring(Box::new(Substring {
        this: f.this.clone(),
        start: Some(position.clone()),
        length: None,
    }));
    let found = Expression::func("STRPOS", vec![tail, f.substr.clone()]);
    let shifted = Expression::Sub(Box::new(BinaryOp::new(
        Expression::Add(Box::new(BinaryOp::new(found, position.clone()))),
        Expression::number(1),
    )));
    g.render(&shifted)
}

/// `NAME(substr, this[, position])` for LOCATE-style argument order
pub(crate) fn render_locate(g: &mut Generator<'_>, name: &str, f: &StrPosition) -> Result<()> {
    let mut args = vec![&f.substr, &f.this];
    args.extend(f.position.as_ref());
    g.render_function(name, &args)
}

/// `IF(c, t, f)` as a searched CASE
pub(crate) fn render_if_as_case(g: &mut Generator<'_>, f: &IfFunc) -> Result<()> {
    let case = Expression::Case(Box::new(Case {
        operand: None,
        whens: vec![(f.condition.clone(), f.true_value.clone())],
        default: f.false_value.clone(),
    }));
    g.render(&case)
}

/// `NAME(k1, v1, k2, v2, ...)` from a map built out of two array literals
pub(crate) fn render_interleaved_map(g: &mut Generator<'_>, name: &str, map: &MapFunc) -> Result<()> {
    let (Expression::Array(keys), Expression::Array(values)) = (&map.keys, &map.values) else {
        return Err(g.unsupported("MAP from non-literal key or value arrays"));
    };
    if keys.expressions.len() != values.expressions.len() {
        return Err(Error::generate(format!(
            "MAP has {} keys but {} values",
            keys.expressions.len(),
            values.expressions.len()
        )));
    }
    let args: Vec<&Expression> = keys
        .expressions
        .iter()
        .zip(&values.expressions)
        .flat_map(|(k, v)| [k, v])
        .collect();
    g.render_function(name, &args)
}

/// Unit name as a quoted string argument
pub(crate) fn unit_string(unit: &str) -> Expression {
    Expression::string(unit)
}

/// `n * -1`
pub(crate) fn negated(expr: &Expression) -> Expression {
    Expression::Mul(Box::new(BinaryOp::new(expr.clone(), Expression::number(-1))))
}

/// `INTERVAL n UNIT`, with a compound amount wrapped in parentheses
pub(crate) fn render_interval(g: &mut Generator<'_>, amount: &Expression, unit: &str) -> Result<()> {
    g.keyword("INTERVAL ");
    match amount {
        Expression::Literal(_) | Expression::Column(_) | Expression::Var(_) | Expression::Paren(_) => {
            g.render(amount)?
        }
        compound => {
            g.write("(");
            g.render(compound)?;
            g.write(")");
        }
    }
    g.write(" ");
    g.keyword(unit);
    Ok(())
}

/// Parse `NAME(this, INTERVAL n UNIT)`; a bare amount counts days
pub(crate) fn interval_arith(
    name: &'static str,
    args: Vec<Expression>,
    make: fn(Box<DateArith>) -> Expression,
) -> Result<Expression> {
    let [this, amount] = take_args(name, args)?;
    let arith = match amount {
        Expression::Interval(interval) => {
            let unit = interval.unit.map(|u| u.to_uppercase());
            DateArith::new(this, interval.this, unit)
        }
        amount => DateArith::new(this, amount, Some("DAY".to_string())),
    };
    Ok(make(Box::new(arith)))
}

/// Parse `NAME(unit, amount, this)` into a date arithmetic node
pub(crate) fn unit_first(
    name: &'static str,
    args: Vec<Expression>,
    make: fn(Box<DateArith>) -> Expression,
) -> Result<Expression> {
    let [unit, amount, this] = take_args(name, args)?;
    Ok(make(Box::new(DateArith::new(this, amount, unit_name(&unit)))))
}

/// Parse `NAME(unit, start, end)`, which measures `end - start`
pub(crate) fn unit_first_diff(name: &'static str, args: Vec<Expression>) -> Result<Expression> {
    let [unit, start, end] = take_args(name, args)?;
    Ok(Expression::DateDiff(Box::new(DateArith::new(end, start, unit_name(&unit)))))
}

/// `NAME(this, INTERVAL n UNIT)`
pub(crate) fn render_interval_call(g: &mut Generator<'_>, name: &str, this: &Expression, f: &DateArith) -> Result<()> {
    g.write(&g.function_name(name));
    g.write("(");
    g.render(this)?;
    g.write(", ");
    render_interval(g, &f.expression, f.unit_or_day())?;
    g.write(")");
    Ok(())
}

/// `NAME(UNIT, arg, ...)` with the unit as a bare keyword
pub(crate) fn render_unit_first(g: &mut Generator<'_>, name: &str, unit: &str, args: &[&Expression]) -> Result<()> {
    g.write(&g.function_name(name));
    g.write("(");
    g.keyword(unit);
    for arg in args {
        g.write(", ");
        g.render(arg)?;
    }
    g.write(")");
    Ok(())
}

/// The literal value of a boolean-ish sort flag, if it is one
pub(crate) fn flag_value(expr: &Expression) -> Option<bool> {
    match expr {
        Expression::Boolean(b) => Some(b.value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_names_and_aliases() {
        assert_eq!(DialectType::from_name("PostgreSQL"), Some(DialectType::Postgres));
        assert_eq!(DialectType::from_name("mssql"), Some(DialectType::TSQL));
        assert_eq!(DialectType::from_name("sqlserver"), Some(DialectType::TSQL));
        assert_eq!(DialectType::from_name(""), Some(DialectType::Generic));
        assert_eq!(DialectType::from_name("nope"), None);
        for dialect in DialectType::ALL {
            assert_eq!(dialect.name().parse::<DialectType>().unwrap(), dialect);
        }
    }

    #[test]
    fn test_resolve_caches_bundles() {
        let a = resolve("spark").unwrap();
        let b = resolve("SPARK").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.lineage, vec!["spark", "hive", "generic"]);
    }

    #[test]
    fn test_unknown_dialect() {
        let err = Dialect::get_by_name("no_such_dialect").unwrap_err();
        assert!(matches!(err, Error::UnknownDialect { .. }));
    }

    #[test]
    fn test_child_overrides_parent() {
        // Spark keeps Hive's backticks but renames its own types
        let spark = Dialect::get(DialectType::Spark);
        assert_eq!(spark.generator_config().identifier_quote_start, '`');
        let hive = Dialect::get(DialectType::Hive);
        assert_ne!(
            spark.generator_config().type_names.get(&crate::expressions::DataTypeKind::BigInt),
            hive.generator_config().type_names.get(&crate::expressions::DataTypeKind::BigInt)
        );
    }

    #[test]
    fn test_identifier_normalization() {
        let postgres = Dialect::get(DialectType::Postgres);
        let snowflake = Dialect::get(DialectType::Snowflake);
        let id = Identifier::new("MyTable");
        assert_eq!(postgres.normalize_identifier(&id).name, "mytable");
        assert_eq!(snowflake.normalize_identifier(&id).name, "MYTABLE");
        assert_eq!(postgres.normalize_identifier(&Identifier::quoted("MyTable")).name, "MyTable");
        assert!(postgres.identifiers_equal(&Identifier::new("ABC"), &Identifier::new("abc")));
        assert!(!postgres.identifiers_equal(&Identifier::quoted("ABC"), &Identifier::new("abc")));
    }
}
