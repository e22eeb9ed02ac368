//! SQL Generator -- renders an [`Expression`] tree as dialect-specific SQL.
//!
//! Rendering is a recursive walk. For every node the generator first looks up
//! a render transform registered for the node's [`ExpressionKind`] in
//! [`GeneratorConfig::transforms`]; a dialect uses these to spell a canonical
//! node its own way (Presto writes `BitwiseAnd` as `BITWISE_AND(x, 1)`). When
//! no transform is registered, the default renderer handles the node with an
//! exhaustive `match`.
//!
//! Cheaper per-dialect knobs live directly on [`GeneratorConfig`]: a function
//! rename table, type names, identifier quotes, string escaping, the NULL
//! ordering default and a handful of clause-style flags.
//!
//! Per-call formatting is controlled by [`GenerateOptions`] (pretty printing,
//! identifier quoting and case normalization).

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::expressions::*;
use crate::parser::NullOrdering;
use crate::time::TimeMapping;

/// Custom renderer for one node kind.
///
/// Receives the generator and the node, and writes the node's SQL through the
/// generator's `write*` and `render*` methods.
pub type RenderFn = Arc<dyn Fn(&mut Generator<'_>, &Expression) -> Result<()> + Send + Sync>;

/// How quote characters inside string literals are escaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringEscape {
    /// `'it''s'`
    DoubledQuote,
    /// `'it\'s'`, with backslashes and control characters escaped too
    Backslash,
}

/// How parameterized types are spelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NestedTypeStyle {
    /// `ARRAY<INT>`, `MAP<K, V>`, `STRUCT<a INT>`
    Angle,
    /// `ARRAY(INTEGER)`, `MAP(K, V)`, `ROW(a INTEGER)`
    Parens,
    /// `INT[]`; maps and structs fall back to parentheses
    Postfix,
}

/// Where a row limit is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitStyle {
    /// `LIMIT n OFFSET m`
    Limit,
    /// `SELECT TOP n`
    Top,
    /// `OFFSET m ROWS FETCH FIRST n ROWS ONLY`
    FetchFirst,
}

/// How CREATE TABLE properties are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertiesStyle {
    /// `COMMENT 'c' PARTITIONED BY (...) STORED AS FMT LOCATION 'l' TBLPROPERTIES (...)`
    Hive,
    /// `WITH (FORMAT = 'fmt', key = value, ...)`
    With,
    /// The dialect has no property syntax
    Unsupported,
}

/// How a join against an UNNEST is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LateralStyle {
    /// `LATERAL VIEW EXPLODE(x) t AS a`
    LateralView,
    /// `CROSS JOIN UNNEST(x) AS t(a)`
    CrossJoinUnnest,
    /// ClickHouse `ARRAY JOIN x AS a`
    ArrayJoin,
}

/// Case applied to unquoted identifiers and function names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizeCase {
    #[default]
    None,
    Upper,
    Lower,
}

/// Per-call formatting options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateOptions {
    /// Put each clause on its own line
    pub pretty: bool,
    /// Quote every identifier
    pub identify: bool,
    pub normalize_case: NormalizeCase,
    /// In pretty mode, start continuation lines with the comma
    pub leading_comma: bool,
    /// In pretty mode, argument lists wider than this break across lines
    pub max_width: usize,
    /// Spaces per indentation level
    pub indent: usize,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            identify: false,
            normalize_case: NormalizeCase::None,
            leading_comma: false,
            max_width: 80,
            indent: 2,
        }
    }
}

impl GenerateOptions {
    pub fn pretty() -> Self {
        Self {
            pretty: true,
            ..Self::default()
        }
    }
}

/// Rendering tables for a dialect.
#[derive(Clone)]
pub struct GeneratorConfig {
    /// Dialect name, used in `Unsupported` errors
    pub dialect: String,
    pub identifier_quote_start: char,
    pub identifier_quote_end: char,
    pub identifiers_can_start_with_digit: bool,
    pub string_escape: StringEscape,
    /// Write hex literals as `0x1F` rather than `X'1F'`
    pub hex_literal_prefix: bool,
    pub null_ordering: NullOrdering,
    /// Whether `NULLS FIRST` / `NULLS LAST` can be written at all
    pub supports_null_ordering: bool,
    /// Type kind -> spelling; kinds not listed use their default name
    pub type_names: HashMap<DataTypeKind, String>,
    pub nested_type_style: NestedTypeStyle,
    /// Separator between a struct field name and its type
    pub struct_field_sep: &'static str,
    pub transforms: HashMap<ExpressionKind, RenderFn>,
    /// Kind -> function name for nodes rendered as plain function calls
    pub function_names: HashMap<ExpressionKind, String>,
    /// Write the table alias after TABLESAMPLE
    pub alias_post_tablesample: bool,
    /// Write `AS` between a table and its alias
    pub table_alias_as: bool,
    pub limit_style: LimitStyle,
    pub properties_style: PropertiesStyle,
    pub lateral_style: LateralStyle,
    /// Write semi and anti joins as `LEFT SEMI JOIN` / `LEFT ANTI JOIN`
    pub left_semi_joins: bool,
    pub supports_qualify: bool,
    pub supports_distinct_on: bool,
    pub supports_ilike: bool,
    pub supports_try_cast: bool,
    pub supports_bucket_sample: bool,
    /// DISTRIBUTE BY, SORT BY and CLUSTER BY
    pub supports_hive_clauses: bool,
    pub time_mapping: TimeMapping,
    /// Default time format in canonical form
    pub time_format: Option<String>,
    /// Upper-cased words that must be quoted when used as identifiers
    pub reserved_words: HashSet<String>,
}

impl fmt::Debug for GeneratorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorConfig")
            .field("dialect", &self.dialect)
            .field("identifier_quote_start", &self.identifier_quote_start)
            .field("string_escape", &self.string_escape)
            .field("null_ordering", &self.null_ordering)
            .field("transforms", &self.transforms.keys().collect::<Vec<_>>())
            .field("function_names", &self.function_names)
            .field("limit_style", &self.limit_style)
            .field("properties_style", &self.properties_style)
            .field("lateral_style", &self.lateral_style)
            .finish_non_exhaustive()
    }
}

const RESERVED_WORDS: &[&str] = &[
    "ALL", "AND", "ANY", "AS", "ASC", "BETWEEN", "BY", "CASE", "CAST", "CREATE", "CROSS", "DELETE",
    "DESC", "DISTINCT", "DROP", "ELSE", "END", "EXCEPT", "EXISTS", "FALSE", "FETCH", "FOR", "FROM",
    "FULL", "GROUP", "HAVING", "IN", "INNER", "INSERT", "INTERSECT", "INTERVAL", "INTO", "IS",
    "JOIN", "LATERAL", "LEFT", "LIKE", "LIMIT", "NATURAL", "NOT", "NULL", "OFFSET", "ON", "OR",
    "ORDER", "OUTER", "OVER", "QUALIFY", "RIGHT", "SELECT", "SET", "TABLE", "TABLESAMPLE", "THEN",
    "TRUE", "UNION", "UPDATE", "USING", "VALUES", "WHEN", "WHERE", "WITH",
];

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            dialect: "generic".to_string(),
            identifier_quote_start: '"',
            identifier_quote_end: '"',
            identifiers_can_start_with_digit: false,
            string_escape: StringEscape::DoubledQuote,
            hex_literal_prefix: false,
            null_ordering: NullOrdering::NullsAreSmall,
            supports_null_ordering: true,
            type_names: HashMap::new(),
            nested_type_style: NestedTypeStyle::Angle,
            struct_field_sep: " ",
            transforms: HashMap::new(),
            function_names: HashMap::new(),
            alias_post_tablesample: false,
            table_alias_as: true,
            limit_style: LimitStyle::Limit,
            properties_style: PropertiesStyle::With,
            lateral_style: LateralStyle::CrossJoinUnnest,
            left_semi_joins: false,
            supports_qualify: true,
            supports_distinct_on: true,
            supports_ilike: true,
            supports_try_cast: true,
            supports_bucket_sample: true,
            supports_hive_clauses: true,
            time_mapping: TimeMapping::default(),
            time_format: None,
            reserved_words: RESERVED_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

impl GeneratorConfig {
    /// Register a render transform for a node kind, replacing any inherited one
    pub fn transform<F>(&mut self, kind: ExpressionKind, render: F)
    where
        F: Fn(&mut Generator<'_>, &Expression) -> Result<()> + Send + Sync + 'static,
    {
        self.transforms.insert(kind, Arc::new(render));
    }

    /// Render a node kind as a plain call with a different function name
    pub fn rename(&mut self, kind: ExpressionKind, name: &str) {
        self.transforms.remove(&kind);
        self.function_names.insert(kind, name.to_string());
    }

    /// Set the spelling of a type kind
    pub fn type_name(&mut self, kind: DataTypeKind, name: &str) {
        self.type_names.insert(kind, name.to_string());
    }

    pub fn set_identifier_quotes(&mut self, start: char, end: char) {
        self.identifier_quote_start = start;
        self.identifier_quote_end = end;
    }
}

static GENERIC_CONFIG: Lazy<GeneratorConfig> = Lazy::new(GeneratorConfig::default);

/// SQL text writer for one [`GeneratorConfig`].
pub struct Generator<'a> {
    config: &'a GeneratorConfig,
    options: GenerateOptions,
    out: String,
    level: usize,
}

impl Generator<'static> {
    /// Render with the generic dialect and default options
    pub fn sql(expr: &Expression) -> Result<String> {
        Generator::new(&GENERIC_CONFIG, GenerateOptions::default()).generate(expr)
    }
}

impl<'a> Generator<'a> {
    pub fn new(config: &'a GeneratorConfig, options: GenerateOptions) -> Self {
        Self {
            config,
            options,
            out: String::new(),
            level: 0,
        }
    }

    pub fn config(&self) -> &'a GeneratorConfig {
        self.config
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    pub fn dialect(&self) -> &str {
        &self.config.dialect
    }

    /// Render one tree to a string.
    pub fn generate(&mut self, expr: &Expression) -> Result<String> {
        self.out.clear();
        self.level = 0;
        self.render(expr)?;
        Ok(std::mem::take(&mut self.out))
    }

    pub fn unsupported(&self, feature: impl Into<String>) -> Error {
        Error::unsupported(feature, self.config.dialect.clone())
    }

    // -----------------------------------------------------------------------
    // Output primitives
    // -----------------------------------------------------------------------

    pub fn write(&mut self, text: &str) {
        self.out.push_str(text);
    }

    pub fn write_char(&mut self, c: char) {
        self.out.push(c);
    }

    /// Write a keyword, always upper-case
    pub fn keyword(&mut self, keyword: &str) {
        self.out.push_str(keyword);
    }

    fn newline(&mut self) {
        self.out.push('\n');
        let width = self.level * self.options.indent;
        self.out.extend(std::iter::repeat(' ').take(width));
    }

    /// Clause separator: a newline in pretty mode, otherwise a space
    pub fn sep(&mut self) {
        if self.options.pretty {
            self.newline();
        } else {
            self.out.push(' ');
        }
    }

    fn indented<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.level += 1;
        let result = f(self);
        self.level -= 1;
        result
    }

    /// Render `expr` into a separate string without touching the output
    pub fn render_to_string(&mut self, expr: &Expression) -> Result<String> {
        let saved = std::mem::take(&mut self.out);
        let result = self.render(expr);
        let rendered = std::mem::replace(&mut self.out, saved);
        result.map(|_| rendered)
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    /// Render a node, honouring the dialect's transform for its kind.
    pub fn render(&mut self, expr: &Expression) -> Result<()> {
        let config = self.config;
        match config.transforms.get(&expr.kind()) {
            Some(transform) => transform(self, expr),
            None => self.render_default(expr),
        }
    }

    /// Render `items` separated by `", "`
    pub fn render_list(&mut self, items: &[Expression]) -> Result<()> {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.render(item)?;
        }
        Ok(())
    }

    /// Clause items: inline after a space, or one per indented line when pretty
    fn render_items(&mut self, items: &[Expression]) -> Result<()> {
        if !self.options.pretty {
            self.write(" ");
            return self.render_list(items);
        }
        let leading_comma = self.options.leading_comma;
        let last = items.len().saturating_sub(1);
        self.indented(|g| {
            for (i, item) in items.iter().enumerate() {
                g.newline();
                if leading_comma && i > 0 {
                    g.write(", ");
                }
                g.render(item)?;
                if !leading_comma && i < last {
                    g.write(",");
                }
            }
            Ok(())
        })
    }

    /// Clause whose body is a single condition
    fn render_condition_clause(&mut self, keyword: &str, condition: &Expression) -> Result<()> {
        self.sep();
        self.keyword(keyword);
        if self.options.pretty {
            self.indented(|g| {
                g.newline();
                g.render(condition)
            })
        } else {
            self.write(" ");
            self.render(condition)
        }
    }

    fn render_list_clause(&mut self, keyword: &str, items: &[Expression]) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }
        self.sep();
        self.keyword(keyword);
        self.render_items(items)
    }

    /// Apply `normalize_case` to a function name
    pub fn function_name(&self, name: &str) -> String {
        match self.options.normalize_case {
            NormalizeCase::None => name.to_string(),
            NormalizeCase::Upper => name.to_uppercase(),
            NormalizeCase::Lower => name.to_lowercase(),
        }
    }

    /// `NAME(arg, ...)`, broken across lines when pretty and wider than `max_width`
    pub fn render_function(&mut self, name: &str, args: &[&Expression]) -> Result<()> {
        let name = self.function_name(name);
        if !self.options.pretty {
            self.write(&name);
            self.write("(");
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    self.write(", ");
                }
                self.render(arg)?;
            }
            self.write(")");
            return Ok(());
        }

        self.level += 1;
        let rendered: Result<Vec<String>> = args.iter().map(|a| self.render_to_string(a)).collect();
        self.level -= 1;
        let rendered = rendered?;

        let width = name.len() + 2 + rendered.iter().map(|s| s.len() + 2).sum::<usize>();
        self.write(&name);
        self.write("(");
        if width <= self.options.max_width || rendered.is_empty() {
            self.write(&rendered.join(", "));
        } else {
            let last = rendered.len() - 1;
            self.level += 1;
            for (i, arg) in rendered.iter().enumerate() {
                self.newline();
                self.write(arg);
                if i < last {
                    self.write(",");
                }
            }
            self.level -= 1;
            self.newline();
        }
        self.write(")");
        Ok(())
    }

    /// Render a typed node as a call, using the dialect's name for its kind if renamed
    pub fn render_named(&mut self, kind: ExpressionKind, default: &str, args: &[&Expression]) -> Result<()> {
        let config = self.config;
        let name = config.function_names.get(&kind).map(String::as_str).unwrap_or(default);
        self.render_function(name, args)
    }

    // -----------------------------------------------------------------------
    // Leaves
    // -----------------------------------------------------------------------

    /// A single-quoted string literal escaped for the target dialect
    pub fn render_string(&mut self, value: &str) {
        self.out.push('\'');
        match self.config.string_escape {
            StringEscape::DoubledQuote => {
                for c in value.chars() {
                    if c == '\'' {
                        self.out.push_str("''");
                    } else {
                        self.out.push(c);
                    }
                }
            }
            StringEscape::Backslash => {
                for c in value.chars() {
                    match c {
                        '\'' => self.out.push_str("\\'"),
                        '\\' => self.out.push_str("\\\\"),
                        '\n' => self.out.push_str("\\n"),
                        '\t' => self.out.push_str("\\t"),
                        '\r' => self.out.push_str("\\r"),
                        '\0' => self.out.push_str("\\0"),
                        c => self.out.push(c),
                    }
                }
            }
        }
        self.out.push('\'');
    }

    /// Render a format argument, converting canonical directives to the target's
    pub fn render_format(&mut self, format: &Expression) -> Result<()> {
        match format {
            Expression::Literal(Literal::String(s)) => {
                let converted = self.config.time_mapping.from_canonical(s);
                self.render_string(&converted);
                Ok(())
            }
            other => self.render(other),
        }
    }

    fn is_safe_identifier(&self, name: &str) -> bool {
        let mut chars = name.chars();
        let Some(first) = chars.next() else {
            return false;
        };
        let first_ok = first.is_alphabetic()
            || first == '_'
            || (first.is_ascii_digit() && self.config.identifiers_can_start_with_digit);
        first_ok
            && chars.all(|c| c.is_alphanumeric() || c == '_')
            && !self.config.reserved_words.contains(&name.to_uppercase())
    }

    pub fn render_identifier(&mut self, id: &Identifier) {
        let name = if id.quoted {
            id.name.clone()
        } else {
            match self.options.normalize_case {
                NormalizeCase::None => id.name.clone(),
                NormalizeCase::Upper => id.name.to_uppercase(),
                NormalizeCase::Lower => id.name.to_lowercase(),
            }
        };
        if id.quoted || self.options.identify || !self.is_safe_identifier(&name) {
            let (start, end) = (self.config.identifier_quote_start, self.config.identifier_quote_end);
            self.out.push(start);
            for c in name.chars() {
                if c == end {
                    self.out.push(end);
                }
                self.out.push(c);
            }
            self.out.push(end);
        } else {
            self.out.push_str(&name);
        }
    }

    pub fn render_identifiers(&mut self, ids: &[Identifier]) {
        for (i, id) in ids.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.render_identifier(id);
        }
    }

    /// Type name with parameters and nested types
    pub fn render_data_type(&mut self, data_type: &DataType) -> Result<()> {
        let config = self.config;
        let name = config
            .type_names
            .get(&data_type.kind)
            .map(String::as_str)
            .unwrap_or_else(|| data_type.kind.default_name());

        if data_type.kind.is_nested() && !data_type.nested.is_empty() {
            let style = self.config.nested_type_style;
            if style == NestedTypeStyle::Postfix && data_type.kind == DataTypeKind::Array {
                self.render_nested_item(&data_type.nested[0])?;
                self.write("[]");
                return Ok(());
            }
            let (open, close) = match style {
                NestedTypeStyle::Angle => ("<", ">"),
                NestedTypeStyle::Parens | NestedTypeStyle::Postfix => ("(", ")"),
            };
            self.write(name);
            self.write(open);
            for (i, item) in data_type.nested.iter().enumerate() {
                if i > 0 {
                    self.write(", ");
                }
                self.render_nested_item(item)?;
            }
            self.write(close);
            return Ok(());
        }

        self.write(name);
        if !data_type.params.is_empty() {
            self.write("(");
            self.render_list(&data_type.params)?;
            self.write(")");
        }
        Ok(())
    }

    fn render_nested_item(&mut self, item: &Expression) -> Result<()> {
        match item {
            Expression::ColumnDef(def) => {
                self.render_identifier(&def.name);
                if let Some(data_type) = &def.data_type {
                    self.write(self.config.struct_field_sep);
                    self.render_data_type(data_type)?;
                }
                Ok(())
            }
            Expression::DataType(dt) => self.render_data_type(dt),
            other => self.render(other),
        }
    }

    /// `left OPERATOR right`
    pub fn render_binary(&mut self, op: &BinaryOp, operator: &str) -> Result<()> {
        self.render(&op.left)?;
        self.write(" ");
        self.write(operator);
        self.write(" ");
        self.render(&op.right)
    }

    // -----------------------------------------------------------------------
    // Default renderer
    // -----------------------------------------------------------------------

    /// Render a node without consulting the transform table for the node itself.
    pub fn render_default(&mut self, expr: &Expression) -> Result<()> {
        use ExpressionKind as K;
        match expr {
            Expression::Literal(lit) => {
                match lit {
                    Literal::String(s) => self.render_string(s),
                    Literal::Number(n) => self.write(n),
                    Literal::HexString(h) if self.config.hex_literal_prefix => {
                        self.write("0x");
                        self.write(h);
                    }
                    Literal::HexString(h) => {
                        self.write("X'");
                        self.write(h);
                        self.write("'");
                    }
                    Literal::BitString(b) => {
                        self.write("B'");
                        self.write(b);
                        self.write("'");
                    }
                }
                Ok(())
            }
            Expression::Boolean(b) => {
                self.keyword(if b.value { "TRUE" } else { "FALSE" });
                Ok(())
            }
            Expression::Null(_) => {
                self.keyword("NULL");
                Ok(())
            }
            Expression::Identifier(id) => {
                self.render_identifier(id);
                Ok(())
            }
            Expression::Column(col) => {
                if let Some(table) = &col.table {
                    self.render_identifier(table);
                    self.write(".");
                }
                self.render_identifier(&col.name);
                Ok(())
            }
            Expression::Dot(dot) => {
                self.render(&dot.this)?;
                self.write(".");
                self.render_identifier(&dot.field);
                Ok(())
            }
            Expression::Table(table) => self.render_table(table),
            Expression::Star(star) => {
                if let Some(table) = &star.table {
                    self.render_identifier(table);
                    self.write(".");
                }
                self.write("*");
                Ok(())
            }
            Expression::Var(var) => {
                self.write(&var.name);
                Ok(())
            }
            Expression::Placeholder(p) => {
                match &p.name {
                    Some(name) => {
                        self.write(":");
                        self.write(name);
                    }
                    None => self.write("?"),
                }
                Ok(())
            }
            Expression::Parameter(p) => {
                self.write("@");
                self.write(&p.name);
                Ok(())
            }
            Expression::DataType(dt) => self.render_data_type(dt),
            Expression::Interval(interval) => {
                self.keyword("INTERVAL ");
                self.render(&interval.this)?;
                if let Some(unit) = &interval.unit {
                    self.write(" ");
                    self.keyword(unit);
                }
                Ok(())
            }
            Expression::Unparsed(u) => {
                self.write(&u.text);
                Ok(())
            }

            Expression::Select(select) => self.render_select(select),
            Expression::Union(op) => self.render_set_operation(op, "UNION"),
            Expression::Intersect(op) => self.render_set_operation(op, "INTERSECT"),
            Expression::Except(op) => self.render_set_operation(op, "EXCEPT"),
            Expression::Subquery(sub) => {
                self.render_wrapped_query(&sub.this)?;
                if let Some(alias) = &sub.alias {
                    self.render_table_alias(alias);
                }
                Ok(())
            }
            Expression::Values(values) => {
                self.keyword("VALUES");
                self.render_items(&values.rows)?;
                if let Some(alias) = &values.alias {
                    self.render_table_alias(alias);
                }
                Ok(())
            }
            Expression::Tuple(tuple) => {
                self.write("(");
                self.render_list(&tuple.expressions)?;
                self.write(")");
                Ok(())
            }

            Expression::Insert(insert) => self.render_insert(insert),
            Expression::Update(update) => {
                self.keyword("UPDATE ");
                self.render_table(&update.table)?;
                self.sep();
                self.keyword("SET");
                self.render_items(&update.set)?;
                if !update.from.is_empty() {
                    self.render_list_clause("FROM", &update.from)?;
                }
                if let Some(condition) = &update.where_clause {
                    self.render_condition_clause("WHERE", condition)?;
                }
                Ok(())
            }
            Expression::Delete(delete) => {
                self.keyword("DELETE FROM ");
                self.render_table(&delete.table)?;
                if let Some(condition) = &delete.where_clause {
                    self.render_condition_clause("WHERE", condition)?;
                }
                Ok(())
            }
            Expression::Create(create) => self.render_create(create),
            Expression::Drop(drop) => {
                self.keyword("DROP ");
                self.keyword(drop.kind.as_str());
                if drop.if_exists {
                    self.keyword(" IF EXISTS");
                }
                self.write(" ");
                self.render_table(&drop.this)?;
                if drop.cascade {
                    self.keyword(" CASCADE");
                }
                Ok(())
            }
            Expression::Use(use_stmt) => {
                self.keyword("USE ");
                if let Some(kind) = &use_stmt.kind {
                    self.keyword(kind);
                    self.write(" ");
                }
                self.render_identifier(&use_stmt.this);
                Ok(())
            }
            Expression::Cache(cache) => {
                self.keyword("CACHE ");
                if cache.lazy {
                    self.keyword("LAZY ");
                }
                self.keyword("TABLE ");
                self.render_table(&cache.table)?;
                if !cache.options.is_empty() {
                    self.keyword(" OPTIONS(");
                    for (i, option) in cache.options.iter().enumerate() {
                        if i > 0 {
                            self.write(", ");
                        }
                        if let Property::Generic { key, value } = option {
                            self.render_string(key);
                            self.write(" = ");
                            self.render(value)?;
                        }
                    }
                    self.write(")");
                }
                if let Some(query) = &cache.query {
                    self.keyword(" AS");
                    self.sep();
                    self.render(query)?;
                }
                Ok(())
            }
            Expression::Command(cmd) => {
                self.keyword(&cmd.this);
                if !cmd.expression.is_empty() {
                    self.write(" ");
                    self.write(&cmd.expression);
                }
                Ok(())
            }

            Expression::Alias(alias) => {
                self.render(&alias.this)?;
                self.keyword(" AS ");
                self.render_identifier(&alias.alias);
                Ok(())
            }
            Expression::Ordered(ordered) => self.render_ordered(ordered),
            Expression::Window(window) => self.render_window(window),
            Expression::Filter(filter) => {
                self.render(&filter.this)?;
                self.keyword(" FILTER(WHERE ");
                self.render(&filter.condition)?;
                self.write(")");
                Ok(())
            }
            Expression::Lambda(lambda) => {
                if lambda.params.len() == 1 {
                    self.render_identifier(&lambda.params[0]);
                } else {
                    self.write("(");
                    self.render_identifiers(&lambda.params);
                    self.write(")");
                }
                self.write(" -> ");
                self.render(&lambda.body)
            }
            Expression::Unnest(unnest) => {
                self.render_function("UNNEST", &unnest.expressions.iter().collect::<Vec<_>>())?;
                if unnest.ordinality {
                    self.keyword(" WITH ORDINALITY");
                }
                if let Some(alias) = &unnest.alias {
                    self.render_table_alias(alias);
                }
                Ok(())
            }
            Expression::ColumnDef(def) => self.render_column_def(def),
            Expression::Paren(paren) => {
                self.write("(");
                self.render(&paren.this)?;
                self.write(")");
                Ok(())
            }

            Expression::And(op) => self.render_binary(op, "AND"),
            Expression::Or(op) => self.render_binary(op, "OR"),
            Expression::Not(op) => self.render_not(&op.this),
            Expression::Eq(op) => self.render_binary(op, "="),
            Expression::Neq(op) => self.render_binary(op, "<>"),
            Expression::NullSafeEq(op) => self.render_binary(op, "IS NOT DISTINCT FROM"),
            Expression::Lt(op) => self.render_binary(op, "<"),
            Expression::Lte(op) => self.render_binary(op, "<="),
            Expression::Gt(op) => self.render_binary(op, ">"),
            Expression::Gte(op) => self.render_binary(op, ">="),
            Expression::Is(op) => self.render_binary(op, "IS"),
            Expression::Like(op) => self.render_binary(op, "LIKE"),
            Expression::ILike(op) => self.render_ilike(op, false),
            Expression::Escape(op) => self.render_binary(op, "ESCAPE"),
            Expression::In(in_expr) => self.render_in(in_expr, false),
            Expression::Between(between) => self.render_between(between, false),
            Expression::Exists(op) => {
                self.keyword("EXISTS ");
                self.render_wrapped_query(&op.this)
            }

            Expression::Add(op) => self.render_binary(op, "+"),
            Expression::Sub(op) => self.render_binary(op, "-"),
            Expression::Mul(op) => self.render_binary(op, "*"),
            Expression::Div(op) => self.render_binary(op, "/"),
            Expression::IntDiv(op) => {
                let division = Expression::Div(op.clone());
                let cast = Expression::cast(division, DataType::new(DataTypeKind::Int));
                self.render(&cast)
            }
            Expression::Mod(op) => self.render_binary(op, "%"),
            Expression::Neg(op) => {
                let inner = self.render_to_string(&op.this)?;
                self.write("-");
                if inner.starts_with('-') {
                    self.write(" ");
                }
                self.write(&inner);
                Ok(())
            }
            Expression::DPipe(op) => self.render_binary(op, "||"),
            Expression::Collate(op) => self.render_binary(op, "COLLATE"),
            Expression::BitwiseAnd(op) => self.render_binary(op, "&"),
            Expression::BitwiseOr(op) => self.render_binary(op, "|"),
            Expression::BitwiseXor(op) => self.render_binary(op, "^"),
            Expression::BitwiseNot(op) => {
                self.write("~");
                self.render(&op.this)
            }
            Expression::ShiftLeft(op) => self.render_binary(op, "<<"),
            Expression::ShiftRight(op) => self.render_binary(op, ">>"),

            Expression::Case(case) => self.render_case(case),
            Expression::If(f) => {
                let mut args = vec![&f.condition, &f.true_value];
                args.extend(f.false_value.as_ref());
                self.render_named(K::If, "IF", &args)
            }
            Expression::Coalesce(f) => {
                self.render_named(K::Coalesce, "COALESCE", &f.expressions.iter().collect::<Vec<_>>())
            }
            Expression::Cast(cast) => self.render_cast(cast, "CAST"),
            Expression::TryCast(cast) => {
                if self.config.supports_try_cast {
                    self.render_cast(cast, "TRY_CAST")
                } else {
                    tracing::debug!(
                        target: "sqlweave::generate",
                        dialect = %self.config.dialect,
                        "TRY_CAST rendered as CAST"
                    );
                    self.render_cast(cast, "CAST")
                }
            }
            Expression::Extract(extract) => {
                self.keyword("EXTRACT(");
                self.keyword(&extract.field);
                self.keyword(" FROM ");
                self.render(&extract.this)?;
                self.write(")");
                Ok(())
            }
            Expression::Bracket(bracket) => {
                self.render(&bracket.this)?;
                self.write("[");
                self.render_list(&bracket.expressions)?;
                self.write("]");
                Ok(())
            }
            Expression::Array(array) => {
                self.render_named(K::Array, "ARRAY", &array.expressions.iter().collect::<Vec<_>>())
            }
            Expression::Map(map) => self.render_named(K::Map, "MAP", &[&map.keys, &map.values]),
            Expression::Function(f) => self.render_anonymous(f),

            Expression::Lower(f) => self.render_named(K::Lower, "LOWER", &[&f.this]),
            Expression::Upper(f) => self.render_named(K::Upper, "UPPER", &[&f.this]),
            Expression::Length(f) => self.render_named(K::Length, "LENGTH", &[&f.this]),
            Expression::Initcap(f) => self.render_named(K::Initcap, "INITCAP", &[&f.this]),
            Expression::Substring(f) => {
                let mut args = vec![&f.this];
                args.extend(f.start.as_ref());
                args.extend(f.length.as_ref());
                self.render_named(K::Substring, "SUBSTRING", &args)
            }
            Expression::StrPosition(f) => {
                let mut args = vec![&f.this, &f.substr];
                args.extend(f.position.as_ref());
                self.render_named(K::StrPosition, "STR_POSITION", &args)
            }
            Expression::Split(f) => self.render_named(K::Split, "SPLIT", &[&f.this, &f.expression]),
            Expression::RegexpLike(f) => {
                self.render_named(K::RegexpLike, "REGEXP_LIKE", &[&f.this, &f.expression])
            }
            Expression::GroupConcat(f) => {
                let config = self.config;
                let name = config
                    .function_names
                    .get(&K::GroupConcat)
                    .map(String::as_str)
                    .unwrap_or("GROUP_CONCAT");
                self.write(&self.function_name(name));
                self.write("(");
                if f.distinct {
                    self.keyword("DISTINCT ");
                }
                self.render(&f.this)?;
                if let Some(separator) = &f.separator {
                    self.write(", ");
                    self.render(separator)?;
                }
                self.write(")");
                Ok(())
            }
            Expression::JsonExtract(f) => {
                self.render_named(K::JsonExtract, "JSON_EXTRACT", &[&f.this, &f.expression])
            }
            Expression::JsonExtractScalar(f) => self.render_named(
                K::JsonExtractScalar,
                "JSON_EXTRACT_SCALAR",
                &[&f.this, &f.expression],
            ),

            Expression::Ln(f) => self.render_named(K::Ln, "LN", &[&f.this]),
            Expression::Log(f) => self.render_named(K::Log, "LOG", &[&f.this, &f.expression]),
            Expression::Pow(f) => self.render_named(K::Pow, "POWER", &[&f.this, &f.expression]),
            Expression::Rand(_) => self.render_named(K::Rand, "RAND", &[]),

            Expression::ApproxDistinct(f) => {
                self.render_named(K::ApproxDistinct, "APPROX_DISTINCT", &[&f.this])
            }
            Expression::ArrayAgg(f) => self.render_named(K::ArrayAgg, "ARRAY_AGG", &[&f.this]),
            Expression::SetAgg(f) => self.render_named(K::SetAgg, "SET_AGG", &[&f.this]),
            Expression::Quantile(f) => {
                self.render_named(K::Quantile, "QUANTILE", &[&f.this, &f.expression])
            }
            Expression::ApproxQuantile(f) => {
                self.render_named(K::ApproxQuantile, "APPROX_QUANTILE", &[&f.this, &f.expression])
            }

            Expression::ArrayContains(f) => {
                self.render_named(K::ArrayContains, "ARRAY_CONTAINS", &[&f.this, &f.expression])
            }
            Expression::ArrayContainsAll(f) => {
                self.render_named(K::ArrayContainsAll, "ARRAY_CONTAINS_ALL", &[&f.this, &f.expression])
            }
            Expression::ArraySize(f) => self.render_named(K::ArraySize, "ARRAY_SIZE", &[&f.this]),
            Expression::ArraySort(f) => {
                if let Some(comparator) = &f.comparator {
                    self.render_named(K::ArraySort, "ARRAY_SORT", &[&f.this, comparator])
                } else if let Some(asc) = &f.asc {
                    self.render_function("SORT_ARRAY", &[&f.this, asc])
                } else {
                    self.render_named(K::ArraySort, "ARRAY_SORT", &[&f.this])
                }
            }
            Expression::Explode(f) => self.render_named(K::Explode, "EXPLODE", &[&f.this]),
            Expression::PosExplode(f) => self.render_named(K::PosExplode, "POSEXPLODE", &[&f.this]),

            Expression::CurrentDate(_) => {
                self.keyword("CURRENT_DATE");
                Ok(())
            }
            Expression::CurrentTimestamp(_) => {
                self.keyword("CURRENT_TIMESTAMP");
                Ok(())
            }
            Expression::DateAdd(f) => self.render_date_arith(K::DateAdd, "DATE_ADD", f),
            Expression::DateSub(f) => self.render_date_arith(K::DateSub, "DATE_SUB", f),
            Expression::DateDiff(f) => self.render_date_arith(K::DateDiff, "DATE_DIFF", f),
            Expression::TsOrDsAdd(f) => self.render_date_arith(K::TsOrDsAdd, "TS_OR_DS_ADD", f),
            Expression::DateTrunc(f) => {
                let unit = Expression::string(f.unit.clone());
                self.render_named(K::DateTrunc, "DATE_TRUNC", &[&unit, &f.this])
            }
            Expression::TsOrDsToDate(f) => {
                self.render_named(K::TsOrDsToDate, "TS_OR_DS_TO_DATE", &[&f.this])
            }
            Expression::StrToTime(f) => self.render_format_func(K::StrToTime, "STR_TO_TIME", f),
            Expression::StrToDate(f) => self.render_format_func(K::StrToDate, "STR_TO_DATE", f),
            Expression::StrToUnix(f) => self.render_format_func(K::StrToUnix, "STR_TO_UNIX", f),
            Expression::UnixToStr(f) => self.render_format_func(K::UnixToStr, "UNIX_TO_STR", f),
            Expression::TimeToStr(f) => self.render_format_func(K::TimeToStr, "TIME_TO_STR", f),
            Expression::UnixToTime(f) => self.render_named(K::UnixToTime, "UNIX_TO_TIME", &[&f.this]),
            Expression::TimeToUnix(f) => self.render_named(K::TimeToUnix, "TIME_TO_UNIX", &[&f.this]),
            Expression::Day(f) => self.render_named(K::Day, "DAY", &[&f.this]),
            Expression::Month(f) => self.render_named(K::Month, "MONTH", &[&f.this]),
            Expression::Year(f) => self.render_named(K::Year, "YEAR", &[&f.this]),
        }
    }

    fn render_anonymous(&mut self, f: &Function) -> Result<()> {
        tracing::debug!(
            target: "sqlweave::generate",
            dialect = %self.config.dialect,
            function = %f.name,
            "passing unknown function through by name"
        );
        if !f.distinct {
            return self.render_function(&f.name, &f.args.iter().collect::<Vec<_>>());
        }
        self.write(&self.function_name(&f.name));
        self.keyword("(DISTINCT ");
        self.render_list(&f.args)?;
        self.write(")");
        Ok(())
    }

    fn render_date_arith(&mut self, kind: ExpressionKind, default: &str, f: &DateArith) -> Result<()> {
        match &f.unit {
            Some(unit) => {
                let unit = Expression::string(unit.clone());
                self.render_named(kind, default, &[&f.this, &f.expression, &unit])
            }
            None => self.render_named(kind, default, &[&f.this, &f.expression]),
        }
    }

    fn render_format_func(&mut self, kind: ExpressionKind, default: &str, f: &FormatFunc) -> Result<()> {
        let config = self.config;
        let name = config.function_names.get(&kind).map(String::as_str).unwrap_or(default);
        self.write(&self.function_name(name));
        self.write("(");
        self.render(&f.this)?;
        if let Some(format) = &f.format {
            self.write(", ");
            self.render_format(format)?;
        }
        self.write(")");
        Ok(())
    }

    pub fn render_cast(&mut self, cast: &Cast, name: &str) -> Result<()> {
        self.keyword(name);
        self.write("(");
        self.render(&cast.this)?;
        self.keyword(" AS ");
        self.render_data_type(&cast.to)?;
        self.write(")");
        Ok(())
    }

    fn render_case(&mut self, case: &Case) -> Result<()> {
        self.keyword("CASE");
        if let Some(operand) = &case.operand {
            self.write(" ");
            self.render(operand)?;
        }
        for (condition, result) in &case.whens {
            self.keyword(" WHEN ");
            self.render(condition)?;
            self.keyword(" THEN ");
            self.render(result)?;
        }
        if let Some(default) = &case.default {
            self.keyword(" ELSE ");
            self.render(default)?;
        }
        self.keyword(" END");
        Ok(())
    }

    fn render_in(&mut self, in_expr: &In, negated: bool) -> Result<()> {
        self.render(&in_expr.this)?;
        self.keyword(if negated { " NOT IN " } else { " IN " });
        match &in_expr.query {
            Some(query) => self.render_wrapped_query(query),
            None => {
                self.write("(");
                self.render_list(&in_expr.expressions)?;
                self.write(")");
                Ok(())
            }
        }
    }

    fn render_between(&mut self, between: &Between, negated: bool) -> Result<()> {
        self.render(&between.this)?;
        self.keyword(if negated { " NOT BETWEEN " } else { " BETWEEN " });
        self.render(&between.low)?;
        self.keyword(" AND ");
        self.render(&between.high)
    }

    fn render_ilike(&mut self, op: &BinaryOp, negated: bool) -> Result<()> {
        if self.config.supports_ilike {
            return self.render_binary(op, if negated { "NOT ILIKE" } else { "ILIKE" });
        }
        tracing::debug!(
            target: "sqlweave::generate",
            dialect = %self.config.dialect,
            "ILIKE rendered as LOWER(..) LIKE LOWER(..)"
        );
        let lowered = BinaryOp::new(
            Expression::Lower(Box::new(UnaryFunc::new(op.left.clone()))),
            Expression::Lower(Box::new(UnaryFunc::new(op.right.clone()))),
        );
        self.render_binary(&lowered, if negated { "NOT LIKE" } else { "LIKE" })
    }

    /// NOT folds into IS NOT, NOT IN, NOT LIKE and friends when the inner node has no transform
    fn render_not(&mut self, inner: &Expression) -> Result<()> {
        let has_transform = self.config.transforms.contains_key(&inner.kind());
        if !has_transform {
            match inner {
                Expression::Is(op) => return self.render_binary(op, "IS NOT"),
                Expression::In(in_expr) => return self.render_in(in_expr, true),
                Expression::Like(op) => return self.render_binary(op, "NOT LIKE"),
                Expression::ILike(op) => return self.render_ilike(op, true),
                Expression::Between(between) => return self.render_between(between, true),
                Expression::NullSafeEq(op) => return self.render_binary(op, "IS DISTINCT FROM"),
                _ => {}
            }
        }
        self.keyword("NOT ");
        self.render(inner)
    }

    fn render_ordered(&mut self, ordered: &Ordered) -> Result<()> {
        let explicit_nulls = ordered.nulls_first != self.config.null_ordering.nulls_first(ordered.desc);
        if explicit_nulls && !self.config.supports_null_ordering {
            self.render_null_sort_key(ordered)?;
            self.write(", ");
        }
        self.render(&ordered.this)?;
        if ordered.desc {
            self.keyword(" DESC");
        }
        if explicit_nulls && self.config.supports_null_ordering {
            self.keyword(if ordered.nulls_first {
                " NULLS FIRST"
            } else {
                " NULLS LAST"
            });
        }
        Ok(())
    }

    /// `CASE WHEN x IS NULL THEN 1 ELSE 0 END` sorted ahead of `x`, for targets
    /// that cannot write NULLS FIRST / NULLS LAST.
    fn render_null_sort_key(&mut self, ordered: &Ordered) -> Result<()> {
        // a position refers to a select item, not a value that can be tested
        if matches!(ordered.this, Expression::Literal(Literal::Number(_))) {
            return Err(self.unsupported("NULLS FIRST/LAST ordering by position"));
        }
        tracing::debug!(
            target: "sqlweave::generate",
            dialect = %self.config.dialect,
            "NULLS FIRST/LAST emulated with a sort key"
        );
        let (null_rank, value_rank) = if ordered.nulls_first { (0, 1) } else { (1, 0) };
        let is_null = Expression::Is(Box::new(BinaryOp::new(ordered.this.clone(), Expression::null())));
        let key = Expression::Case(Box::new(Case {
            operand: None,
            whens: vec![(is_null, Expression::number(null_rank))],
            default: Some(Expression::number(value_rank)),
        }));
        self.render(&key)
    }

    fn render_window(&mut self, window: &Window) -> Result<()> {
        self.render(&window.this)?;
        self.keyword(" OVER (");
        let mut need_space = false;
        if !window.partition_by.is_empty() {
            self.keyword("PARTITION BY ");
            self.render_list(&window.partition_by)?;
            need_space = true;
        }
        if !window.order_by.is_empty() {
            if need_space {
                self.write(" ");
            }
            self.keyword("ORDER BY ");
            self.render_list(&window.order_by)?;
            need_space = true;
        }
        if let Some(frame) = &window.frame {
            if need_space {
                self.write(" ");
            }
            self.keyword(match frame.kind {
                FrameKind::Rows => "ROWS ",
                FrameKind::Range => "RANGE ",
            });
            match &frame.end {
                Some(end) => {
                    self.keyword("BETWEEN ");
                    self.render_frame_bound(&frame.start)?;
                    self.keyword(" AND ");
                    self.render_frame_bound(end)?;
                }
                None => self.render_frame_bound(&frame.start)?,
            }
        }
        self.write(")");
        Ok(())
    }

    fn render_frame_bound(&mut self, bound: &FrameBound) -> Result<()> {
        match bound {
            FrameBound::UnboundedPreceding => self.keyword("UNBOUNDED PRECEDING"),
            FrameBound::UnboundedFollowing => self.keyword("UNBOUNDED FOLLOWING"),
            FrameBound::CurrentRow => self.keyword("CURRENT ROW"),
            FrameBound::Preceding(e) => {
                self.render(e)?;
                self.keyword(" PRECEDING");
            }
            FrameBound::Following(e) => {
                self.render(e)?;
                self.keyword(" FOLLOWING");
            }
        }
        Ok(())
    }

    fn render_column_def(&mut self, def: &ColumnDef) -> Result<()> {
        self.render_identifier(&def.name);
        if let Some(data_type) = &def.data_type {
            self.write(" ");
            self.render_data_type(data_type)?;
        }
        for constraint in &def.constraints {
            match constraint {
                ColumnConstraint::NotNull => self.keyword(" NOT NULL"),
                ColumnConstraint::Null => self.keyword(" NULL"),
                ColumnConstraint::PrimaryKey => self.keyword(" PRIMARY KEY"),
                ColumnConstraint::Unique => self.keyword(" UNIQUE"),
                ColumnConstraint::Default(value) => {
                    self.keyword(" DEFAULT ");
                    self.render(value)?;
                }
                ColumnConstraint::Comment(comment) => {
                    self.keyword(" COMMENT ");
                    self.render_string(comment);
                }
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// `(query)`, with the query indented on its own lines when pretty
    pub fn render_wrapped_query(&mut self, query: &Expression) -> Result<()> {
        self.write("(");
        if self.options.pretty && query.is_query() {
            self.indented(|g| {
                g.newline();
                g.render(query)
            })?;
            self.newline();
        } else {
            self.render(query)?;
        }
        self.write(")");
        Ok(())
    }

    fn render_with(&mut self, with: &With) -> Result<()> {
        self.keyword("WITH ");
        if with.recursive {
            self.keyword("RECURSIVE ");
        }
        for (i, cte) in with.ctes.iter().enumerate() {
            if i > 0 {
                self.write(",");
                self.sep();
            }
            self.render_identifier(&cte.alias.name);
            if !cte.alias.columns.is_empty() {
                self.write("(");
                self.render_identifiers(&cte.alias.columns);
                self.write(")");
            }
            self.keyword(" AS ");
            self.render_wrapped_query(&cte.this)?;
        }
        self.sep();
        Ok(())
    }

    fn render_select(&mut self, select: &Select) -> Result<()> {
        for comment in &select.comments {
            self.write("/* ");
            self.write(comment.trim());
            self.write(" */ ");
        }
        if let Some(with) = &select.with {
            self.render_with(with)?;
        }

        self.keyword("SELECT");
        if let Some(distinct) = &select.distinct {
            self.keyword(" DISTINCT");
            if !distinct.on.is_empty() {
                if !self.config.supports_distinct_on {
                    return Err(self.unsupported("DISTINCT ON"));
                }
                self.keyword(" ON (");
                self.render_list(&distinct.on)?;
                self.write(")");
            }
        }
        if self.config.limit_style == LimitStyle::Top && select.offset.is_none() {
            if let Some(limit) = &select.limit {
                self.keyword(" TOP ");
                self.render(limit)?;
            }
        }
        self.render_items(&select.expressions)?;

        if !select.from.is_empty() {
            self.sep();
            self.keyword("FROM ");
            self.render_list(&select.from)?;
        }
        for join in &select.joins {
            self.render_join(join)?;
        }

        if let Some(condition) = &select.where_clause {
            self.render_condition_clause("WHERE", condition)?;
        }
        self.render_list_clause("GROUP BY", &select.group_by)?;
        if let Some(condition) = &select.having {
            self.render_condition_clause("HAVING", condition)?;
        }
        if let Some(condition) = &select.qualify {
            if !self.config.supports_qualify {
                return Err(self.unsupported("QUALIFY"));
            }
            self.render_condition_clause("QUALIFY", condition)?;
        }
        self.render_list_clause("ORDER BY", &select.order_by)?;

        let hive_clauses = !select.distribute_by.is_empty()
            || !select.sort_by.is_empty()
            || !select.cluster_by.is_empty();
        if hive_clauses && !self.config.supports_hive_clauses {
            return Err(self.unsupported("DISTRIBUTE BY / SORT BY / CLUSTER BY"));
        }
        self.render_list_clause("DISTRIBUTE BY", &select.distribute_by)?;
        self.render_list_clause("SORT BY", &select.sort_by)?;
        self.render_list_clause("CLUSTER BY", &select.cluster_by)?;

        match (self.config.limit_style, &select.offset) {
            // TOP cannot express an offset
            (LimitStyle::Top, Some(_)) => self.render_fetch(select.limit.as_ref(), select.offset.as_ref()),
            _ => self.render_limit(select.limit.as_ref(), select.offset.as_ref()),
        }
    }

    fn render_limit(&mut self, limit: Option<&Expression>, offset: Option<&Expression>) -> Result<()> {
        match self.config.limit_style {
            LimitStyle::Limit => {
                if let Some(limit) = limit {
                    self.sep();
                    self.keyword("LIMIT ");
                    self.render(limit)?;
                }
                if let Some(offset) = offset {
                    self.sep();
                    self.keyword("OFFSET ");
                    self.render(offset)?;
                }
            }
            LimitStyle::FetchFirst => self.render_fetch(limit, offset)?,
            // Written right after SELECT
            LimitStyle::Top => {}
        }
        Ok(())
    }

    fn render_fetch(&mut self, limit: Option<&Expression>, offset: Option<&Expression>) -> Result<()> {
        if let Some(offset) = offset {
            self.sep();
            self.keyword("OFFSET ");
            self.render(offset)?;
            self.keyword(" ROWS");
        }
        if let Some(limit) = limit {
            self.sep();
            self.keyword("FETCH FIRST ");
            self.render(limit)?;
            self.keyword(" ROWS ONLY");
        }
        Ok(())
    }

    pub fn render_set_operation(&mut self, op: &SetOperation, keyword: &str) -> Result<()> {
        self.render(&op.left)?;
        self.sep();
        self.keyword(keyword);
        if !op.distinct {
            self.keyword(" ALL");
        } else if op.explicit_distinct {
            self.keyword(" DISTINCT");
        }
        self.sep();
        self.render(&op.right)?;
        self.render_list_clause("ORDER BY", &op.order_by)?;
        if self.config.limit_style == LimitStyle::Top {
            return self.render_fetch(op.limit.as_ref(), None);
        }
        self.render_limit(op.limit.as_ref(), None)
    }

    pub fn render_table_alias(&mut self, alias: &TableAlias) {
        self.keyword(if self.config.table_alias_as { " AS " } else { " " });
        self.render_identifier(&alias.name);
        if !alias.columns.is_empty() {
            self.write("(");
            self.render_identifiers(&alias.columns);
            self.write(")");
        }
    }

    /// Table name with alias and sample in the dialect's order
    pub fn render_table(&mut self, table: &TableRef) -> Result<()> {
        if let Some(catalog) = &table.catalog {
            self.render_identifier(catalog);
            self.write(".");
        }
        if let Some(schema) = &table.schema {
            self.render_identifier(schema);
            self.write(".");
        }
        self.render_identifier(&table.name);

        if self.config.alias_post_tablesample {
            if let Some(sample) = &table.sample {
                self.render_sample(sample)?;
            }
            if let Some(alias) = &table.alias {
                self.render_table_alias(alias);
            }
        } else {
            if let Some(alias) = &table.alias {
                self.render_table_alias(alias);
            }
            if let Some(sample) = &table.sample {
                self.render_sample(sample)?;
            }
        }
        Ok(())
    }

    fn render_sample(&mut self, sample: &Sample) -> Result<()> {
        self.keyword(" TABLESAMPLE");
        if let Some(method) = &sample.method {
            self.write(" ");
            self.keyword(method);
        }
        self.write("(");
        if let Some(bucket) = &sample.bucket {
            if !self.config.supports_bucket_sample {
                return Err(self.unsupported("TABLESAMPLE BUCKET"));
            }
            self.keyword("BUCKET ");
            self.render(&bucket.numerator)?;
            self.keyword(" OUT OF ");
            self.render(&bucket.denominator)?;
            if let Some(field) = &bucket.field {
                self.keyword(" ON ");
                self.render(field)?;
            }
        } else if let Some(size) = &sample.size {
            self.render(size)?;
            match sample.unit {
                Some(SampleUnit::Percent) => self.keyword(" PERCENT"),
                Some(SampleUnit::Rows) => self.keyword(" ROWS"),
                None => {}
            }
        }
        self.write(")");
        if let Some(seed) = &sample.seed {
            self.keyword(" REPEATABLE (");
            self.render(seed)?;
            self.write(")");
        }
        Ok(())
    }

    fn render_join(&mut self, join: &Join) -> Result<()> {
        if let Expression::Unnest(unnest) = &join.this {
            match self.config.lateral_style {
                LateralStyle::LateralView => return self.render_lateral_view(join, unnest),
                LateralStyle::ArrayJoin => return self.render_array_join(join, unnest),
                LateralStyle::CrossJoinUnnest => {}
            }
        }

        self.sep();
        if join.natural {
            self.keyword("NATURAL ");
        }
        let left_semi = self.config.left_semi_joins;
        self.keyword(match join.kind {
            JoinKind::Plain => "JOIN ",
            JoinKind::Inner => "INNER JOIN ",
            JoinKind::Left => "LEFT JOIN ",
            JoinKind::Right => "RIGHT JOIN ",
            JoinKind::Full => "FULL JOIN ",
            JoinKind::Cross => "CROSS JOIN ",
            JoinKind::Semi if left_semi => "LEFT SEMI JOIN ",
            JoinKind::Semi => "SEMI JOIN ",
            JoinKind::Anti if left_semi => "LEFT ANTI JOIN ",
            JoinKind::Anti => "ANTI JOIN ",
        });
        self.render(&join.this)?;

        if let Some(on) = &join.on {
            self.keyword(" ON ");
            self.render(on)?;
        } else if !join.using.is_empty() {
            self.keyword(" USING (");
            self.render_identifiers(&join.using);
            self.write(")");
        } else if join.kind == JoinKind::Left && matches!(join.this, Expression::Unnest(_)) {
            self.keyword(" ON TRUE");
        }
        Ok(())
    }

    fn render_array_join(&mut self, join: &Join, unnest: &Unnest) -> Result<()> {
        let [argument] = unnest.expressions.as_slice() else {
            return Err(self.unsupported("ARRAY JOIN of several arrays"));
        };
        if unnest.ordinality {
            return Err(self.unsupported("ARRAY JOIN with a position column"));
        }
        self.sep();
        if join.kind == JoinKind::Left {
            self.keyword("LEFT ");
        }
        self.keyword("ARRAY JOIN ");
        self.render(argument)?;
        if let Some(alias) = &unnest.alias {
            let value = alias.columns.first().unwrap_or(&alias.name);
            self.keyword(" AS ");
            self.render_identifier(value);
        }
        Ok(())
    }

    fn render_lateral_view(&mut self, join: &Join, unnest: &Unnest) -> Result<()> {
        let [argument] = unnest.expressions.as_slice() else {
            return Err(self.unsupported("LATERAL VIEW of a multi-argument UNNEST"));
        };
        let Some(alias) = &unnest.alias else {
            return Err(self.unsupported("LATERAL VIEW without a table alias"));
        };
        self.sep();
        self.keyword("LATERAL VIEW ");
        if join.kind == JoinKind::Left {
            self.keyword("OUTER ");
        }
        let name = if unnest.ordinality { "POSEXPLODE" } else { "EXPLODE" };
        self.render_function(name, &[argument])?;
        self.write(" ");
        self.render_identifier(&alias.name);
        if !alias.columns.is_empty() {
            let mut columns = alias.columns.clone();
            if unnest.ordinality && columns.len() > 1 {
                columns.rotate_right(1);
            }
            self.keyword(" AS ");
            self.render_identifiers(&columns);
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // DML and DDL
    // -----------------------------------------------------------------------

    fn render_insert(&mut self, insert: &Insert) -> Result<()> {
        if insert.overwrite {
            self.keyword("INSERT OVERWRITE TABLE ");
        } else {
            self.keyword("INSERT INTO ");
        }
        self.render_table(&insert.table)?;
        if !insert.partition.is_empty() {
            self.keyword(" PARTITION (");
            self.render_list(&insert.partition)?;
            self.write(")");
        }
        if !insert.columns.is_empty() {
            self.write(" (");
            self.render_identifiers(&insert.columns);
            self.write(")");
        }
        self.sep();
        self.render(&insert.query)
    }

    fn render_create(&mut self, create: &Create) -> Result<()> {
        self.keyword("CREATE ");
        if create.replace {
            self.keyword("OR REPLACE ");
        }
        if create.temporary {
            self.keyword("TEMPORARY ");
        }
        self.keyword(create.kind.as_str());
        if create.if_not_exists {
            self.keyword(" IF NOT EXISTS");
        }
        self.write(" ");
        self.render_table(&create.this)?;

        let style = self.config.properties_style;
        if style == PropertiesStyle::Unsupported && !create.properties.is_empty() {
            return Err(self.unsupported("table properties"));
        }

        let (columns, properties) = match style {
            PropertiesStyle::Hive => hive_partition_layout(create),
            _ => flat_partition_layout(create),
        };
        if !columns.is_empty() {
            self.write(" (");
            for (i, column) in columns.iter().enumerate() {
                if i > 0 {
                    self.write(", ");
                }
                self.render_column_def(column)?;
            }
            self.write(")");
        }

        if !properties.is_empty() {
            match style {
                PropertiesStyle::Hive => self.render_hive_properties(&properties)?,
                PropertiesStyle::With => self.render_with_properties(&properties)?,
                PropertiesStyle::Unsupported => {}
            }
        }

        if let Some(query) = &create.expression {
            self.keyword(" AS");
            self.sep();
            self.render(query)?;
        }
        Ok(())
    }

    fn render_hive_properties(&mut self, properties: &[Property]) -> Result<()> {
        for property in properties {
            if let Property::Comment(comment) = property {
                self.keyword(" COMMENT ");
                self.render_string(comment);
            }
        }
        for property in properties {
            if let Property::PartitionedBy(items) = property {
                self.keyword(" PARTITIONED BY (");
                self.render_list(items)?;
                self.write(")");
            }
        }
        for property in properties {
            if let Property::FileFormat(format) = property {
                self.keyword(" STORED AS ");
                self.keyword(&format.to_uppercase());
            }
        }
        for property in properties {
            if let Property::Location(location) = property {
                self.keyword(" LOCATION ");
                self.render_string(location);
            }
        }
        let generic: Vec<(&String, &Expression)> = properties
            .iter()
            .filter_map(|p| match p {
                Property::Generic { key, value } => Some((key, value)),
                _ => None,
            })
            .collect();
        if !generic.is_empty() {
            self.keyword(" TBLPROPERTIES (");
            for (i, (key, value)) in generic.into_iter().enumerate() {
                if i > 0 {
                    self.write(", ");
                }
                self.render_string(key);
                self.write(" = ");
                self.render(value)?;
            }
            self.write(")");
        }
        Ok(())
    }

    fn render_with_properties(&mut self, properties: &[Property]) -> Result<()> {
        self.keyword(" WITH (");
        for (i, property) in properties.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            match property {
                Property::FileFormat(format) => {
                    self.keyword("FORMAT = ");
                    self.render_string(format);
                }
                Property::PartitionedBy(items) => {
                    let names: Vec<Expression> = items
                        .iter()
                        .map(|item| match item {
                            Expression::ColumnDef(def) => Expression::string(def.name.name.clone()),
                            Expression::Column(col) => Expression::string(col.name.name.clone()),
                            other => other.clone(),
                        })
                        .collect();
                    self.keyword("PARTITIONED_BY = ");
                    self.render(&Expression::Array(Box::new(VarArgFunc::new(names))))?;
                }
                Property::Location(location) => {
                    self.keyword("LOCATION = ");
                    self.render_string(location);
                }
                Property::Comment(comment) => {
                    self.keyword("COMMENT = ");
                    self.render_string(comment);
                }
                Property::Generic { key, value } => {
                    self.render_identifier(&Identifier::new(key.clone()));
                    self.write(" = ");
                    self.render(value)?;
                }
            }
        }
        self.write(")");
        Ok(())
    }
}

/// Typed partition columns join the regular column list
fn flat_partition_layout(create: &Create) -> (Vec<ColumnDef>, Vec<Property>) {
    let mut columns = create.columns.clone();
    for property in &create.properties {
        if let Property::PartitionedBy(items) = property {
            columns.extend(items.iter().filter_map(|item| match item {
                Expression::ColumnDef(def) => Some(def.as_ref().clone()),
                _ => None,
            }));
        }
    }
    (columns, create.properties.clone())
}

/// Partition columns named in the column list move into PARTITIONED BY with their types
fn hive_partition_layout(create: &Create) -> (Vec<ColumnDef>, Vec<Property>) {
    let partition_names: Vec<&str> = create
        .properties
        .iter()
        .filter_map(|p| match p {
            Property::PartitionedBy(items) => Some(items),
            _ => None,
        })
        .flatten()
        .filter_map(|item| match item {
            Expression::Column(col) => Some(col.name.name.as_str()),
            _ => None,
        })
        .collect();
    if partition_names.is_empty() {
        return (create.columns.clone(), create.properties.clone());
    }

    let (moved, columns): (Vec<ColumnDef>, Vec<ColumnDef>) = create
        .columns
        .iter()
        .cloned()
        .partition(|def| partition_names.contains(&def.name.name.as_str()));
    let properties = create
        .properties
        .iter()
        .map(|p| match p {
            Property::PartitionedBy(items) => Property::PartitionedBy(
                items
                    .iter()
                    .map(|item| match item {
                        Expression::Column(col) => moved
                            .iter()
                            .find(|def| def.name.name == col.name.name)
                            .map(|def| Expression::ColumnDef(Box::new(def.clone())))
                            .unwrap_or_else(|| item.clone()),
                        other => other.clone(),
                    })
                    .collect(),
            ),
            other => other.clone(),
        })
        .collect();
    (columns, properties)
}
