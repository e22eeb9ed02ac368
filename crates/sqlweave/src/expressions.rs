//! SQL Expression AST (Abstract Syntax Tree).
//!
//! This module defines the dialect-neutral node types the parser produces and
//! the generator consumes.
//!
//! # Architecture
//!
//! The central type is [`Expression`], a tagged enum with one variant per SQL
//! construct. Inner structs carry the argument slots of each variant, so the
//! set of slots for a node kind is fixed by its type. Heap-allocated payloads
//! are boxed to keep the enum small.
//!
//! Children are owned: a tree never shares a node between two parents and
//! never points back at its parent. Equality is structural (`PartialEq`) and
//! deep copy is `Clone`. Tree-wide rewrites go through
//! [`crate::traversal::transform`], which rebuilds the tree bottom-up.
//!
//! Every variant has a fieldless twin in [`ExpressionKind`], used as the key
//! of per-dialect render-transform tables.
//!
//! # Variant Groups
//!
//! | Group | Examples |
//! |---|---|
//! | **Queries** | `Select`, `Union`, `Intersect`, `Except`, `Subquery`, `Values` |
//! | **Statements** | `Insert`, `Update`, `Delete`, `Create`, `Drop`, `Use`, `Cache`, `Command` |
//! | **Operators** | `And`, `Add`, `Eq`, `BitwiseAnd`, `ShiftLeft`, `Not`, `In`, `Between` |
//! | **Functions** | `Function` (anonymous), plus typed nodes such as `TsOrDsAdd`, `ArraySize`, `StrPosition` |
//! | **Literals** | `Literal`, `Boolean`, `Null`, `Interval`, `Array`, `Map` |
//! | **Types** | `DataType`, `Cast`, `TryCast` |
//! | **Names** | `Identifier`, `Column`, `Table`, `Star`, `Dot` |
//!
//! # SQL Generation
//!
//! Every `Expression` can be rendered with [`Expression::sql()`] (generic
//! dialect) or [`Expression::sql_for()`] (named dialect).

use serde::{Deserialize, Serialize};
use std::fmt;
use strum::EnumDiscriminants;

/// Represent any SQL expression or statement as a single, recursive AST node.
///
/// # Constructing Expressions
///
/// ```rust
/// use sqlweave::expressions::Expression;
///
/// let col = Expression::column("id");
/// let lit = Expression::number(42);
/// let call = Expression::func("ABS", vec![col.clone()]);
/// assert_eq!(call.sql(), "ABS(id)");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, EnumDiscriminants)]
#[serde(rename_all = "snake_case")]
#[strum_discriminants(name(ExpressionKind))]
#[strum_discriminants(derive(Hash, Serialize, Deserialize, strum::Display))]
pub enum Expression {
    // Literals and atoms
    Literal(Literal),
    Boolean(BooleanLiteral),
    Null(Null),
    Identifier(Identifier),
    Column(Column),
    Dot(Box<Dot>),
    Table(TableRef),
    Star(Star),
    Var(Var),
    Placeholder(Placeholder),
    Parameter(Parameter),
    DataType(DataType),
    Interval(Box<Interval>),
    /// Opaque source text kept by lenient parsing
    Unparsed(Unparsed),

    // Queries
    Select(Box<Select>),
    Union(Box<SetOperation>),
    Intersect(Box<SetOperation>),
    Except(Box<SetOperation>),
    Subquery(Box<Subquery>),
    Values(Box<Values>),
    Tuple(Box<VarArgFunc>),

    // Statements
    Insert(Box<Insert>),
    Update(Box<Update>),
    Delete(Box<Delete>),
    Create(Box<Create>),
    Drop(Box<Drop>),
    Use(Box<Use>),
    Cache(Box<Cache>),
    Command(Box<Command>),

    // Clause-level nodes
    Alias(Box<Alias>),
    Ordered(Box<Ordered>),
    Window(Box<Window>),
    Filter(Box<Filter>),
    Lambda(Box<Lambda>),
    Unnest(Box<Unnest>),
    ColumnDef(Box<ColumnDef>),
    Paren(Box<Paren>),

    // Logical and comparison operators
    And(Box<BinaryOp>),
    Or(Box<BinaryOp>),
    Not(Box<UnaryOp>),
    Eq(Box<BinaryOp>),
    Neq(Box<BinaryOp>),
    NullSafeEq(Box<BinaryOp>),
    Lt(Box<BinaryOp>),
    Lte(Box<BinaryOp>),
    Gt(Box<BinaryOp>),
    Gte(Box<BinaryOp>),
    Is(Box<BinaryOp>),
    Like(Box<BinaryOp>),
    ILike(Box<BinaryOp>),
    Escape(Box<BinaryOp>),
    In(Box<In>),
    Between(Box<Between>),
    Exists(Box<UnaryOp>),

    // Arithmetic, string and bitwise operators
    Add(Box<BinaryOp>),
    Sub(Box<BinaryOp>),
    Mul(Box<BinaryOp>),
    Div(Box<BinaryOp>),
    IntDiv(Box<BinaryOp>),
    Mod(Box<BinaryOp>),
    Neg(Box<UnaryOp>),
    DPipe(Box<BinaryOp>),
    Collate(Box<BinaryOp>),
    BitwiseAnd(Box<BinaryOp>),
    BitwiseOr(Box<BinaryOp>),
    BitwiseXor(Box<BinaryOp>),
    BitwiseNot(Box<UnaryOp>),
    ShiftLeft(Box<BinaryOp>),
    ShiftRight(Box<BinaryOp>),

    // Conditional and structural expressions
    Case(Box<Case>),
    If(Box<IfFunc>),
    Coalesce(Box<VarArgFunc>),
    Cast(Box<Cast>),
    TryCast(Box<Cast>),
    Extract(Box<Extract>),
    Bracket(Box<Bracket>),
    Array(Box<VarArgFunc>),
    Map(Box<MapFunc>),

    // Anonymous function call
    Function(Box<Function>),

    // String functions
    Lower(Box<UnaryFunc>),
    Upper(Box<UnaryFunc>),
    Length(Box<UnaryFunc>),
    Initcap(Box<UnaryFunc>),
    Substring(Box<Substring>),
    StrPosition(Box<StrPosition>),
    Split(Box<BinaryFunc>),
    RegexpLike(Box<BinaryFunc>),
    GroupConcat(Box<GroupConcat>),
    JsonExtract(Box<BinaryFunc>),
    JsonExtractScalar(Box<BinaryFunc>),

    // Math
    Ln(Box<UnaryFunc>),
    Log(Box<BinaryFunc>),
    Pow(Box<BinaryFunc>),
    Rand(Rand),

    // Aggregates
    ApproxDistinct(Box<UnaryFunc>),
    ArrayAgg(Box<UnaryFunc>),
    SetAgg(Box<UnaryFunc>),
    Quantile(Box<BinaryFunc>),
    ApproxQuantile(Box<BinaryFunc>),

    // Arrays
    ArrayContains(Box<BinaryFunc>),
    /// Every element of `expression` is also in `this`
    ArrayContainsAll(Box<BinaryFunc>),
    ArraySize(Box<UnaryFunc>),
    ArraySort(Box<ArraySort>),
    Explode(Box<UnaryFunc>),
    PosExplode(Box<UnaryFunc>),

    // Dates and times
    CurrentDate(CurrentDate),
    CurrentTimestamp(CurrentTimestamp),
    DateAdd(Box<DateArith>),
    DateSub(Box<DateArith>),
    DateDiff(Box<DateArith>),
    DateTrunc(Box<DateTrunc>),
    TsOrDsAdd(Box<DateArith>),
    TsOrDsToDate(Box<UnaryFunc>),
    StrToTime(Box<FormatFunc>),
    StrToDate(Box<FormatFunc>),
    StrToUnix(Box<FormatFunc>),
    UnixToStr(Box<FormatFunc>),
    TimeToStr(Box<FormatFunc>),
    UnixToTime(Box<UnaryFunc>),
    TimeToUnix(Box<UnaryFunc>),
    Day(Box<UnaryFunc>),
    Month(Box<UnaryFunc>),
    Year(Box<UnaryFunc>),
}

impl Expression {
    /// The fieldless kind tag of this node.
    pub fn kind(&self) -> ExpressionKind {
        ExpressionKind::from(self)
    }

    /// Returns `true` if this expression is a top-level SQL statement.
    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            Expression::Select(_)
                | Expression::Union(_)
                | Expression::Intersect(_)
                | Expression::Except(_)
                | Expression::Subquery(_)
                | Expression::Values(_)
                | Expression::Insert(_)
                | Expression::Update(_)
                | Expression::Delete(_)
                | Expression::Create(_)
                | Expression::Drop(_)
                | Expression::Use(_)
                | Expression::Cache(_)
                | Expression::Command(_)
                | Expression::Unparsed(_)
        )
    }

    /// Returns `true` for query expressions that can appear as a subquery.
    pub fn is_query(&self) -> bool {
        matches!(
            self,
            Expression::Select(_)
                | Expression::Union(_)
                | Expression::Intersect(_)
                | Expression::Except(_)
                | Expression::Values(_)
        )
    }

    pub fn number(n: i64) -> Self {
        Expression::Literal(Literal::Number(n.to_string()))
    }

    /// A numeric literal from its source text, e.g. `"1.5"` or `"1e3"`
    pub fn number_text(text: impl Into<String>) -> Self {
        Expression::Literal(Literal::Number(text.into()))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Expression::Literal(Literal::String(s.into()))
    }

    pub fn boolean(value: bool) -> Self {
        Expression::Boolean(BooleanLiteral { value })
    }

    pub fn null() -> Self {
        Expression::Null(Null)
    }

    pub fn star() -> Self {
        Expression::Star(Star { table: None })
    }

    pub fn identifier(name: impl Into<String>) -> Self {
        Expression::Identifier(Identifier::new(name))
    }

    pub fn var(name: impl Into<String>) -> Self {
        Expression::Var(Var { name: name.into() })
    }

    /// An unqualified column reference
    pub fn column(name: impl Into<String>) -> Self {
        Expression::Column(Column {
            name: Identifier::new(name),
            table: None,
        })
    }

    /// An anonymous function call
    pub fn func(name: impl Into<String>, args: Vec<Expression>) -> Self {
        Expression::Function(Box::new(Function::new(name, args)))
    }

    pub fn cast(this: Expression, to: DataType) -> Self {
        Expression::Cast(Box::new(Cast { this, to }))
    }

    pub fn paren(this: Expression) -> Self {
        Expression::Paren(Box::new(Paren { this }))
    }

    /// Wrap this expression in an alias
    pub fn alias(self, name: impl Into<String>) -> Self {
        Expression::Alias(Box::new(Alias {
            this: self,
            alias: Identifier::new(name),
        }))
    }

    /// Returns the string value if this is a string literal
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Expression::Literal(Literal::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Returns the output name of a projection: its alias, column name or identifier.
    pub fn output_name(&self) -> Option<&str> {
        match self {
            Expression::Alias(a) => Some(&a.alias.name),
            Expression::Column(c) => Some(&c.name.name),
            Expression::Identifier(id) => Some(&id.name),
            _ => None,
        }
    }

    /// Generate a SQL string for this expression using the generic dialect.
    ///
    /// Returns an empty string if generation fails.
    pub fn sql(&self) -> String {
        crate::generator::Generator::sql(self).unwrap_or_default()
    }

    /// Generate a SQL string for this expression targeting a named dialect.
    ///
    /// Returns an empty string if the dialect is unknown or generation fails.
    pub fn sql_for(&self, dialect: &str) -> String {
        crate::generate(self, dialect, &crate::GenerateOptions::default()).unwrap_or_default()
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sql())
    }
}

/// Literal values, kept as source text for numbers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Literal {
    /// Decoded string value
    String(String),
    Number(String),
    /// Hex digits of `X'..'`
    HexString(String),
    /// Binary digits of `B'..'`
    BitString(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Literal::Number(n) => write!(f, "{}", n),
            Literal::HexString(h) => write!(f, "X'{}'", h),
            Literal::BitString(b) => write!(f, "B'{}'", b),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BooleanLiteral {
    pub value: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Null;

/// A name, with the quoting it had in the source
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier {
    /// The raw text of the identifier, without any quoting characters.
    pub name: String,
    /// Whether the identifier was quoted in the source SQL.
    pub quoted: bool,
}

impl Identifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quoted: false,
        }
    }

    pub fn quoted(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quoted: true,
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.quoted {
            write!(f, "\"{}\"", self.name.replace('"', "\"\""))
        } else {
            write!(f, "{}", self.name)
        }
    }
}

/// A column reference, optionally qualified by table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: Identifier,
    pub table: Option<Identifier>,
}

/// Field access beyond `table.column`, e.g. `db.t.c` or `s.field`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dot {
    pub this: Expression,
    pub field: Identifier,
}

/// `*` or `t.*`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Star {
    pub table: Option<Identifier>,
}

/// A bare word such as an interval unit or a date part
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Var {
    pub name: String,
}

/// `?` or `:name`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholder {
    pub name: Option<String>,
}

/// `@name` session variable or parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
}

/// Source text the lenient parser could not parse.
///
/// It is a terminal leaf: traversal never descends into it, it compares by
/// text, and it renders verbatim in every dialect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unparsed {
    pub text: String,
}

/// A table reference in FROM, JOIN, INSERT or DDL position.
///
/// TABLESAMPLE is stored here whatever its position relative to the alias was
/// in the source; each dialect decides the output order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRef {
    pub name: Identifier,
    pub schema: Option<Identifier>,
    pub catalog: Option<Identifier>,
    pub alias: Option<TableAlias>,
    pub sample: Option<Box<Sample>>,
}

impl TableRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Identifier::new(name),
            schema: None,
            catalog: None,
            alias: None,
            sample: None,
        }
    }
}

/// `alias` or `alias(col1, col2)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableAlias {
    pub name: Identifier,
    pub columns: Vec<Identifier>,
}

impl TableAlias {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Identifier::new(name),
            columns: Vec::new(),
        }
    }
}

/// TABLESAMPLE clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Sampling method such as `BERNOULLI` or `SYSTEM`
    pub method: Option<String>,
    pub size: Option<Expression>,
    pub unit: Option<SampleUnit>,
    /// Hive `BUCKET x OUT OF y [ON expr]`
    pub bucket: Option<Bucket>,
    pub seed: Option<Expression>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleUnit {
    Percent,
    Rows,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub numerator: Expression,
    pub denominator: Expression,
    pub field: Option<Expression>,
}

/// Type name plus parameters (`DECIMAL(10, 2)`) and nested types
/// (`ARRAY<INT>`, `MAP<STRING, INT>`, `STRUCT<a INT>`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataType {
    pub kind: DataTypeKind,
    pub params: Vec<Expression>,
    /// Element types, or `ColumnDef`s for struct fields
    pub nested: Vec<Expression>,
}

impl DataType {
    pub fn new(kind: DataTypeKind) -> Self {
        Self {
            kind,
            params: Vec::new(),
            nested: Vec::new(),
        }
    }
}

impl From<DataTypeKind> for DataType {
    fn from(kind: DataTypeKind) -> Self {
        DataType::new(kind)
    }
}

/// Dialect-neutral type kinds. Dialects map them to their own spelling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataTypeKind {
    Boolean,
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    Float,
    Double,
    Decimal,
    Char,
    VarChar,
    NChar,
    NVarChar,
    Text,
    Binary,
    VarBinary,
    Blob,
    Date,
    Time,
    Timestamp,
    TimestampTz,
    TimestampLtz,
    DateTime,
    Interval,
    Json,
    Uuid,
    Variant,
    Array,
    Map,
    Struct,
    /// A type name no dialect table knows, rendered as written
    Custom(String),
}

impl DataTypeKind {
    /// Canonical spelling, used when a dialect has no mapping
    pub fn default_name(&self) -> &str {
        match self {
            DataTypeKind::Boolean => "BOOLEAN",
            DataTypeKind::TinyInt => "TINYINT",
            DataTypeKind::SmallInt => "SMALLINT",
            DataTypeKind::Int => "INT",
            DataTypeKind::BigInt => "BIGINT",
            DataTypeKind::Float => "FLOAT",
            DataTypeKind::Double => "DOUBLE",
            DataTypeKind::Decimal => "DECIMAL",
            DataTypeKind::Char => "CHAR",
            DataTypeKind::VarChar => "VARCHAR",
            DataTypeKind::NChar => "NCHAR",
            DataTypeKind::NVarChar => "NVARCHAR",
            DataTypeKind::Text => "TEXT",
            DataTypeKind::Binary => "BINARY",
            DataTypeKind::VarBinary => "VARBINARY",
            DataTypeKind::Blob => "BLOB",
            DataTypeKind::Date => "DATE",
            DataTypeKind::Time => "TIME",
            DataTypeKind::Timestamp => "TIMESTAMP",
            DataTypeKind::TimestampTz => "TIMESTAMPTZ",
            DataTypeKind::TimestampLtz => "TIMESTAMPLTZ",
            DataTypeKind::DateTime => "DATETIME",
            DataTypeKind::Interval => "INTERVAL",
            DataTypeKind::Json => "JSON",
            DataTypeKind::Uuid => "UUID",
            DataTypeKind::Variant => "VARIANT",
            DataTypeKind::Array => "ARRAY",
            DataTypeKind::Map => "MAP",
            DataTypeKind::Struct => "STRUCT",
            DataTypeKind::Custom(name) => name,
        }
    }

    pub fn is_nested(&self) -> bool {
        matches!(self, DataTypeKind::Array | DataTypeKind::Map | DataTypeKind::Struct)
    }
}

/// `INTERVAL <this> <unit>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub this: Expression,
    pub unit: Option<String>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// A SELECT query.
///
/// LATERAL VIEW and UNNEST joins both live in `joins`, as a [`Join`] whose
/// `this` is an [`Unnest`] node. TSQL `TOP n` is stored as `limit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Select {
    pub with: Option<With>,
    pub distinct: Option<Distinct>,
    /// The select-list: columns, expressions, aliases, and wildcards.
    pub expressions: Vec<Expression>,
    /// Comma-separated FROM sources
    pub from: Vec<Expression>,
    pub joins: Vec<Join>,
    pub where_clause: Option<Expression>,
    pub group_by: Vec<Expression>,
    pub having: Option<Expression>,
    pub qualify: Option<Expression>,
    /// `Ordered` nodes
    pub order_by: Vec<Expression>,
    pub distribute_by: Vec<Expression>,
    pub sort_by: Vec<Expression>,
    pub cluster_by: Vec<Expression>,
    pub limit: Option<Expression>,
    pub offset: Option<Expression>,
    /// Comments that preceded the SELECT keyword
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,
}

/// `DISTINCT` or `DISTINCT ON (...)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Distinct {
    pub on: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct With {
    pub recursive: bool,
    pub ctes: Vec<Cte>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cte {
    pub alias: TableAlias,
    pub this: Expression,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinKind {
    /// Bare `JOIN`
    Plain,
    Inner,
    Left,
    Right,
    Full,
    Cross,
    Semi,
    Anti,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Join {
    pub this: Expression,
    pub kind: JoinKind,
    pub natural: bool,
    pub on: Option<Expression>,
    pub using: Vec<Identifier>,
}

impl Join {
    pub fn new(this: Expression, kind: JoinKind) -> Self {
        Self {
            this,
            kind,
            natural: false,
            on: None,
            using: Vec::new(),
        }
    }
}

/// Which source syntax produced an [`Unnest`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnnestOrigin {
    /// Hive/Spark `LATERAL VIEW EXPLODE(...)`
    Explode,
    /// `UNNEST(...)` table function
    Unnest,
}

/// Table-valued array expansion.
///
/// One shape for `LATERAL VIEW [POS]EXPLODE(x) t AS c` and
/// `UNNEST(x) [WITH ORDINALITY] AS t(c)`. With ordinality the position
/// column is the last alias column, whatever order the source wrote it in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unnest {
    pub expressions: Vec<Expression>,
    pub ordinality: bool,
    pub alias: Option<TableAlias>,
    pub origin: UnnestOrigin,
}

/// UNION / INTERSECT / EXCEPT
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetOperation {
    pub left: Expression,
    pub right: Expression,
    /// `false` for `ALL`
    pub distinct: bool,
    /// Set when the source spelled out `DISTINCT`
    pub explicit_distinct: bool,
    pub order_by: Vec<Expression>,
    pub limit: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subquery {
    pub this: Expression,
    pub alias: Option<TableAlias>,
}

/// `VALUES (..), (..)`; each row is a `Tuple`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Values {
    pub rows: Vec<Expression>,
    pub alias: Option<TableAlias>,
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insert {
    pub table: TableRef,
    pub columns: Vec<Identifier>,
    /// Hive `INSERT OVERWRITE TABLE`
    pub overwrite: bool,
    /// Hive `PARTITION (ds = '...')` values
    pub partition: Vec<Expression>,
    pub query: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    pub table: TableRef,
    /// `Eq` nodes, one per assignment
    pub set: Vec<Expression>,
    pub from: Vec<Expression>,
    pub where_clause: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delete {
    pub table: TableRef,
    pub where_clause: Option<Expression>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreateKind {
    Table,
    View,
}

impl CreateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CreateKind::Table => "TABLE",
            CreateKind::View => "VIEW",
        }
    }
}

/// CREATE TABLE / CREATE VIEW
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Create {
    pub kind: CreateKind,
    pub this: TableRef,
    pub replace: bool,
    pub temporary: bool,
    pub if_not_exists: bool,
    pub columns: Vec<ColumnDef>,
    pub properties: Vec<Property>,
    /// `AS <query>`
    pub expression: Option<Expression>,
}

/// Table properties, from Hive clauses or a `WITH (...)` list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    /// `STORED AS <format>` / `FORMAT = '<format>'`, original spelling kept
    FileFormat(String),
    /// Column definitions (Hive) or bare column names (Presto)
    PartitionedBy(Vec<Expression>),
    Location(String),
    Comment(String),
    Generic { key: String, value: Expression },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: Identifier,
    pub data_type: Option<DataType>,
    pub constraints: Vec<ColumnConstraint>,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: Identifier::new(name),
            data_type: Some(data_type),
            constraints: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnConstraint {
    NotNull,
    Null,
    PrimaryKey,
    Unique,
    Default(Expression),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drop {
    pub kind: CreateKind,
    pub this: TableRef,
    pub if_exists: bool,
    pub cascade: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Use {
    /// Optional object kind, e.g. `DATABASE` or `SCHEMA`
    pub kind: Option<String>,
    pub this: Identifier,
}

/// Spark `CACHE [LAZY] TABLE t [OPTIONS (...)] [AS query]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cache {
    pub lazy: bool,
    pub table: TableRef,
    pub options: Vec<Property>,
    pub query: Option<Expression>,
}

/// A statement kept as text: its leading keyword and the raw remainder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub this: String,
    pub expression: String,
}

// ---------------------------------------------------------------------------
// Clause-level nodes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alias {
    pub this: Expression,
    pub alias: Identifier,
}

/// An ORDER BY item.
///
/// `nulls_first` is always explicit: the parser fills it in from the source
/// dialect's NULL ordering when the query does not spell it out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ordered {
    pub this: Expression,
    pub desc: bool,
    pub nulls_first: bool,
}

/// `<function> OVER (PARTITION BY .. ORDER BY .. <frame>)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Window {
    pub this: Expression,
    pub partition_by: Vec<Expression>,
    pub order_by: Vec<Expression>,
    pub frame: Option<WindowFrame>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowFrame {
    pub kind: FrameKind,
    pub start: FrameBound,
    pub end: Option<FrameBound>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameKind {
    Rows,
    Range,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameBound {
    UnboundedPreceding,
    UnboundedFollowing,
    CurrentRow,
    Preceding(Expression),
    Following(Expression),
}

/// `<aggregate> FILTER (WHERE <condition>)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub this: Expression,
    pub condition: Expression,
}

/// `x -> body` or `(a, b) -> body`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lambda {
    pub params: Vec<Identifier>,
    pub body: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paren {
    pub this: Expression,
}

// ---------------------------------------------------------------------------
// Operator payloads
// ---------------------------------------------------------------------------

/// Shared payload for binary operator variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryOp {
    pub left: Expression,
    pub right: Expression,
}

impl BinaryOp {
    pub fn new(left: Expression, right: Expression) -> Self {
        Self { left, right }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnaryOp {
    pub this: Expression,
}

impl UnaryOp {
    pub fn new(this: Expression) -> Self {
        Self { this }
    }
}

/// `x IN (..)` or `x IN (subquery)`; `NOT IN` is `Not(In)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct In {
    pub this: Expression,
    pub expressions: Vec<Expression>,
    pub query: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Between {
    pub this: Expression,
    pub low: Expression,
    pub high: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    /// `CASE <operand> WHEN ..` form
    pub operand: Option<Expression>,
    pub whens: Vec<(Expression, Expression)>,
    pub default: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfFunc {
    pub condition: Expression,
    pub true_value: Expression,
    pub false_value: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cast {
    pub this: Expression,
    pub to: DataType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extract {
    /// Date part, upper-cased (`YEAR`, `DOW`, ...)
    pub field: String,
    pub this: Expression,
}

/// Subscript: `x[i]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    pub this: Expression,
    pub expressions: Vec<Expression>,
}

/// Map constructor from a key array and a value array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapFunc {
    pub keys: Expression,
    pub values: Expression,
}

// ---------------------------------------------------------------------------
// Function payloads
// ---------------------------------------------------------------------------

/// A function call the dialect layer has no typed node for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    /// Name as written in the source
    pub name: String,
    pub args: Vec<Expression>,
    pub distinct: bool,
}

impl Function {
    pub fn new(name: impl Into<String>, args: Vec<Expression>) -> Self {
        Self {
            name: name.into(),
            args,
            distinct: false,
        }
    }
}

/// Shared payload for single-argument typed functions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnaryFunc {
    pub this: Expression,
}

impl UnaryFunc {
    pub fn new(this: Expression) -> Self {
        Self { this }
    }
}

/// Shared payload for two-argument typed functions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryFunc {
    pub this: Expression,
    pub expression: Expression,
}

impl BinaryFunc {
    pub fn new(this: Expression, expression: Expression) -> Self {
        Self { this, expression }
    }
}

/// Shared payload for variadic typed functions and tuples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarArgFunc {
    pub expressions: Vec<Expression>,
}

impl VarArgFunc {
    pub fn new(expressions: Vec<Expression>) -> Self {
        Self { expressions }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Substring {
    pub this: Expression,
    pub start: Option<Expression>,
    pub length: Option<Expression>,
}

/// Position of `substr` in `this`, 1-based, searching from `position`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrPosition {
    pub this: Expression,
    pub substr: Expression,
    pub position: Option<Expression>,
}

/// String aggregation with optional separator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupConcat {
    pub this: Expression,
    pub separator: Option<Expression>,
    pub distinct: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArraySort {
    pub this: Expression,
    /// Sort direction flag (`SORT_ARRAY(x, FALSE)`)
    pub asc: Option<Expression>,
    /// Comparator lambda (`ARRAY_SORT(x, (a, b) -> ..)`)
    pub comparator: Option<Expression>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Rand;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CurrentDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CurrentTimestamp;

/// Date arithmetic: `this` shifted by (or compared with) `expression` in `unit`s.
///
/// For `DateDiff` the result is `this - expression`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateArith {
    pub this: Expression,
    pub expression: Expression,
    /// Upper-cased unit name, `None` meaning days
    pub unit: Option<String>,
}

impl DateArith {
    pub fn new(this: Expression, expression: Expression, unit: Option<String>) -> Self {
        Self {
            this,
            expression,
            unit,
        }
    }

    /// Unit name, defaulting to `DAY`
    pub fn unit_or_day(&self) -> &str {
        self.unit.as_deref().unwrap_or("DAY")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateTrunc {
    pub this: Expression,
    pub unit: String,
}

/// A conversion driven by a time format.
///
/// String-literal formats are stored in canonical strftime form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatFunc {
    pub this: Expression,
    pub format: Option<Expression>,
}

impl FormatFunc {
    pub fn new(this: Expression, format: Option<Expression>) -> Self {
        Self { this, format }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tag() {
        let e = Expression::func("F", vec![]);
        assert_eq!(e.kind(), ExpressionKind::Function);
        assert_eq!(Expression::null().kind(), ExpressionKind::Null);
        assert_eq!(ExpressionKind::TsOrDsAdd.to_string(), "TsOrDsAdd");
    }

    #[test]
    fn test_structural_equality() {
        let a = Expression::Add(Box::new(BinaryOp::new(
            Expression::column("x"),
            Expression::number(1),
        )));
        let b = a.clone();
        assert_eq!(a, b);
        let c = Expression::Add(Box::new(BinaryOp::new(
            Expression::column("x"),
            Expression::number(2),
        )));
        assert_ne!(a, c);
    }

    #[test]
    fn test_unparsed_compares_by_text() {
        let a = Expression::Unparsed(Unparsed { text: "FOO BAR".into() });
        let b = Expression::Unparsed(Unparsed { text: "FOO BAR".into() });
        assert_eq!(a, b);
        assert!(a.is_statement());
    }

    #[test]
    fn test_output_name() {
        assert_eq!(Expression::column("a").output_name(), Some("a"));
        assert_eq!(Expression::number(1).alias("b").output_name(), Some("b"));
        assert_eq!(Expression::number(1).output_name(), None);
    }

    #[test]
    fn test_serde_roundtrip() {
        let e = Expression::cast(Expression::number(1), DataType::new(DataTypeKind::BigInt));
        let json = serde_json::to_string(&e).unwrap();
        let back: Expression = serde_json::from_str(&json).unwrap();
        assert_eq!(e, back);
    }
}
