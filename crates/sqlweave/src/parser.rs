//! SQL Parser -- recursive-descent statements, Pratt-style binary operators.
//!
//! The parser consumes the token stream from [`crate::tokens::Tokenizer`] and
//! builds [`Expression`] trees. Everything that varies per dialect is data in
//! [`ParserConfig`]:
//!
//! - `statement_parsers`: statement-starting token -> parse function
//! - `functions`: upper-cased function name -> builder producing a typed node
//! - `binary_operators`: operator token -> precedence and node constructor
//! - `literal_suffixes` / `type_names`: numeric suffixes and type spellings
//! - NULL ordering, identifier normalization, cast strictness, time formats
//!
//! # Error handling
//!
//! A production that cannot match fails with [`Error::Parse`], naming what was
//! expected and the token found. With [`ErrorLevel::Lenient`] a failing
//! statement becomes an [`Expression::Unparsed`] leaf holding its source text
//! and parsing resumes after the next top-level `;`.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::expressions::*;
use crate::time::TimeMapping;
use crate::tokens::{unescape_identifier, unescape_string, Span, Token, TokenType};

/// Parses one statement whose first token is the table key.
pub type StatementParser = fn(&mut Parser<'_>) -> Result<Expression>;

/// Builds a node from the parsed arguments of a function call.
pub type FunctionBuilder = fn(Vec<Expression>, &ParserConfig) -> Result<Expression>;

/// Binding power and constructor for one infix operator token.
#[derive(Clone, Copy)]
pub struct BinaryOperator {
    pub precedence: u8,
    pub build: fn(Expression, Expression) -> Expression,
}

impl BinaryOperator {
    pub const fn new(precedence: u8, build: fn(Expression, Expression) -> Expression) -> Self {
        Self { precedence, build }
    }
}

/// Operator precedence levels, loosest first.
pub mod precedence {
    pub const OR: u8 = 1;
    pub const AND: u8 = 2;
    pub const NOT: u8 = 3;
    pub const COMPARISON: u8 = 4;
    pub const BITWISE_OR: u8 = 5;
    pub const BITWISE_XOR: u8 = 6;
    pub const BITWISE_AND: u8 = 7;
    pub const SHIFT: u8 = 8;
    pub const ADDITIVE: u8 = 9;
    pub const MULTIPLICATIVE: u8 = 10;
    pub const EXPONENT: u8 = 11;
    pub const COLLATE: u8 = 12;
    pub const ACCESS: u8 = 13;
}

/// Where NULLs sort when an ORDER BY item does not say.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullOrdering {
    /// NULLs compare below every value: first in ASC, last in DESC
    NullsAreSmall,
    /// NULLs compare above every value: last in ASC, first in DESC
    NullsAreLarge,
    /// NULLs always sort last
    NullsAreLast,
}

impl NullOrdering {
    /// Implicit NULLS FIRST for a sort direction
    pub fn nulls_first(self, desc: bool) -> bool {
        match self {
            NullOrdering::NullsAreSmall => !desc,
            NullOrdering::NullsAreLarge => desc,
            NullOrdering::NullsAreLast => false,
        }
    }
}

/// How unquoted identifiers resolve to stored names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationStrategy {
    Lowercase,
    Uppercase,
    /// Every identifier is compared exactly, quoted or not
    CaseSensitive,
    /// Every identifier is compared case-insensitively, quoted or not
    CaseInsensitive,
}

/// What to do when a statement fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorLevel {
    /// Fail the whole call on the first error
    #[default]
    Strict,
    /// Keep the failing statement as an `Unparsed` leaf and continue
    Lenient,
}

/// Per-invocation parse options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    pub error_level: ErrorLevel,
}

impl ParseOptions {
    pub fn lenient() -> Self {
        Self {
            error_level: ErrorLevel::Lenient,
        }
    }
}

/// Parser tables for a dialect.
#[derive(Clone)]
pub struct ParserConfig {
    pub statement_parsers: HashMap<TokenType, StatementParser>,
    pub functions: HashMap<String, FunctionBuilder>,
    pub binary_operators: HashMap<TokenType, BinaryOperator>,
    /// Upper-cased numeric suffix -> type of the implied cast
    pub literal_suffixes: HashMap<String, DataTypeKind>,
    /// Upper-cased type spelling -> type kind
    pub type_names: HashMap<String, DataTypeKind>,
    /// Keywords that can never be used as a bare name
    pub reserved_keywords: HashSet<TokenType>,
    pub null_ordering: NullOrdering,
    pub normalization: NormalizationStrategy,
    /// When false, `CAST` parses as `TryCast`
    pub strict_cast: bool,
    /// Single-argument `LOG(x)` means natural log
    pub log_defaults_to_ln: bool,
    pub time_mapping: TimeMapping,
    /// Default time format in canonical form
    pub time_format: Option<String>,
    /// Copied from the tokenizer so string tokens can be decoded
    pub string_escapes: Vec<char>,
    pub quotes: HashMap<String, String>,
}

impl fmt::Debug for ParserConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserConfig")
            .field("statement_parsers", &self.statement_parsers.len())
            .field("functions", &self.functions.len())
            .field("binary_operators", &self.binary_operators.len())
            .field("null_ordering", &self.null_ordering)
            .field("normalization", &self.normalization)
            .field("strict_cast", &self.strict_cast)
            .field("time_format", &self.time_format)
            .finish()
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        use precedence::*;
        use TokenType as T;

        let mut binary_operators: HashMap<TokenType, BinaryOperator> = HashMap::new();
        let mut op = |t: TokenType, p: u8, build: fn(Expression, Expression) -> Expression| {
            binary_operators.insert(t, BinaryOperator::new(p, build));
        };
        op(T::Or, OR, |l, r| Expression::Or(Box::new(BinaryOp::new(l, r))));
        op(T::And, AND, |l, r| Expression::And(Box::new(BinaryOp::new(l, r))));
        op(T::Eq, COMPARISON, |l, r| Expression::Eq(Box::new(BinaryOp::new(l, r))));
        op(T::Neq, COMPARISON, |l, r| Expression::Neq(Box::new(BinaryOp::new(l, r))));
        op(T::NullSafeEq, COMPARISON, |l, r| Expression::NullSafeEq(Box::new(BinaryOp::new(l, r))));
        op(T::Lt, COMPARISON, |l, r| Expression::Lt(Box::new(BinaryOp::new(l, r))));
        op(T::Lte, COMPARISON, |l, r| Expression::Lte(Box::new(BinaryOp::new(l, r))));
        op(T::Gt, COMPARISON, |l, r| Expression::Gt(Box::new(BinaryOp::new(l, r))));
        op(T::Gte, COMPARISON, |l, r| Expression::Gte(Box::new(BinaryOp::new(l, r))));
        op(T::RLike, COMPARISON, |l, r| {
            Expression::RegexpLike(Box::new(BinaryFunc::new(l, r)))
        });
        op(T::Pipe, BITWISE_OR, |l, r| Expression::BitwiseOr(Box::new(BinaryOp::new(l, r))));
        op(T::Caret, BITWISE_XOR, |l, r| Expression::BitwiseXor(Box::new(BinaryOp::new(l, r))));
        op(T::Amp, BITWISE_AND, |l, r| Expression::BitwiseAnd(Box::new(BinaryOp::new(l, r))));
        op(T::LShift, SHIFT, |l, r| Expression::ShiftLeft(Box::new(BinaryOp::new(l, r))));
        op(T::RShift, SHIFT, |l, r| Expression::ShiftRight(Box::new(BinaryOp::new(l, r))));
        op(T::Plus, ADDITIVE, |l, r| Expression::Add(Box::new(BinaryOp::new(l, r))));
        op(T::Dash, ADDITIVE, |l, r| Expression::Sub(Box::new(BinaryOp::new(l, r))));
        op(T::DPipe, ADDITIVE, |l, r| Expression::DPipe(Box::new(BinaryOp::new(l, r))));
        op(T::Star, MULTIPLICATIVE, |l, r| Expression::Mul(Box::new(BinaryOp::new(l, r))));
        op(T::Slash, MULTIPLICATIVE, |l, r| Expression::Div(Box::new(BinaryOp::new(l, r))));
        op(T::Percent, MULTIPLICATIVE, |l, r| Expression::Mod(Box::new(BinaryOp::new(l, r))));
        op(T::Div, MULTIPLICATIVE, |l, r| Expression::IntDiv(Box::new(BinaryOp::new(l, r))));
        op(T::Mod, MULTIPLICATIVE, |l, r| Expression::Mod(Box::new(BinaryOp::new(l, r))));
        op(T::Collate, COLLATE, |l, r| Expression::Collate(Box::new(BinaryOp::new(l, r))));

        let mut statement_parsers: HashMap<TokenType, StatementParser> = HashMap::new();
        statement_parsers.insert(T::Select, |p| p.parse_query());
        statement_parsers.insert(T::With, |p| p.parse_query());
        statement_parsers.insert(T::Values, |p| p.parse_query());
        statement_parsers.insert(T::Insert, |p| p.parse_insert());
        statement_parsers.insert(T::Update, |p| p.parse_update());
        statement_parsers.insert(T::Delete, |p| p.parse_delete());
        statement_parsers.insert(T::Create, |p| p.parse_create());
        statement_parsers.insert(T::Drop, |p| p.parse_drop());
        statement_parsers.insert(T::Use, |p| p.parse_use());
        statement_parsers.insert(T::Command, |p| p.parse_command());
        statement_parsers.insert(T::Set, |p| p.parse_command());

        let reserved_keywords = [
            T::All,
            T::And,
            T::Anti,
            T::As,
            T::Between,
            T::By,
            T::Case,
            T::Cast,
            T::Cluster,
            T::Create,
            T::Cross,
            T::Distinct,
            T::Distribute,
            T::Drop,
            T::Else,
            T::End,
            T::Except,
            T::Exists,
            T::False,
            T::Fetch,
            T::From,
            T::Full,
            T::Group,
            T::Having,
            T::ILike,
            T::In,
            T::Inner,
            T::Insert,
            T::Intersect,
            T::Interval,
            T::Into,
            T::Is,
            T::Join,
            T::Lateral,
            T::Left,
            T::Like,
            T::Limit,
            T::Natural,
            T::Not,
            T::Null,
            T::Offset,
            T::On,
            T::Or,
            T::Order,
            T::Outer,
            T::Over,
            T::Qualify,
            T::Right,
            T::RLike,
            T::Select,
            T::Semi,
            T::Set,
            T::Sort,
            T::Table,
            T::Tablesample,
            T::Then,
            T::Top,
            T::True,
            T::TryCast,
            T::Union,
            T::Update,
            T::Using,
            T::Values,
            T::When,
            T::Where,
            T::With,
        ]
        .into_iter()
        .collect();

        let mut quotes = HashMap::new();
        quotes.insert("'".to_string(), "'".to_string());

        Self {
            statement_parsers,
            functions: default_functions(),
            binary_operators,
            literal_suffixes: HashMap::new(),
            type_names: default_type_names(),
            reserved_keywords,
            null_ordering: NullOrdering::NullsAreSmall,
            normalization: NormalizationStrategy::Lowercase,
            strict_cast: true,
            log_defaults_to_ln: false,
            time_mapping: TimeMapping::default(),
            time_format: None,
            string_escapes: vec!['\''],
            quotes,
        }
    }
}

impl ParserConfig {
    /// Register a function builder under an upper-cased name
    pub fn function(&mut self, name: &str, builder: FunctionBuilder) {
        self.functions.insert(name.to_uppercase(), builder);
    }

    /// Register an infix operator
    pub fn operator(
        &mut self,
        token_type: TokenType,
        precedence: u8,
        build: fn(Expression, Expression) -> Expression,
    ) {
        self.binary_operators
            .insert(token_type, BinaryOperator::new(precedence, build));
    }

    /// Convert a format argument into canonical form when it is a string literal
    pub fn canonical_format(&self, format: Expression) -> Expression {
        match format {
            Expression::Literal(Literal::String(s)) => {
                Expression::string(self.time_mapping.to_canonical(&s))
            }
            other => other,
        }
    }

    /// The dialect's default time format as a canonical string literal
    pub fn default_format(&self) -> Option<Expression> {
        self.time_format.as_ref().map(|f| Expression::string(f.clone()))
    }
}

fn default_type_names() -> HashMap<String, DataTypeKind> {
    use DataTypeKind as K;
    [
        ("BOOLEAN", K::Boolean),
        ("BOOL", K::Boolean),
        ("TINYINT", K::TinyInt),
        ("BYTE", K::TinyInt),
        ("INT1", K::TinyInt),
        ("SMALLINT", K::SmallInt),
        ("SHORT", K::SmallInt),
        ("INT2", K::SmallInt),
        ("INT", K::Int),
        ("INTEGER", K::Int),
        ("INT4", K::Int),
        ("MEDIUMINT", K::Int),
        ("BIGINT", K::BigInt),
        ("LONG", K::BigInt),
        ("INT8", K::BigInt),
        ("INT64", K::BigInt),
        ("FLOAT", K::Float),
        ("REAL", K::Float),
        ("FLOAT4", K::Float),
        ("DOUBLE", K::Double),
        ("FLOAT8", K::Double),
        ("FLOAT64", K::Double),
        ("DECIMAL", K::Decimal),
        ("NUMERIC", K::Decimal),
        ("NUMBER", K::Decimal),
        ("DEC", K::Decimal),
        ("CHAR", K::Char),
        ("CHARACTER", K::Char),
        ("VARCHAR", K::VarChar),
        ("VARCHAR2", K::VarChar),
        ("NCHAR", K::NChar),
        ("NVARCHAR", K::NVarChar),
        ("NVARCHAR2", K::NVarChar),
        ("TEXT", K::Text),
        ("STRING", K::Text),
        ("CLOB", K::Text),
        ("BINARY", K::Binary),
        ("VARBINARY", K::VarBinary),
        ("BLOB", K::Blob),
        ("BYTEA", K::Blob),
        ("BYTES", K::Blob),
        ("DATE", K::Date),
        ("TIME", K::Time),
        ("TIMESTAMP", K::Timestamp),
        ("TIMESTAMPTZ", K::TimestampTz),
        ("TIMESTAMPLTZ", K::TimestampLtz),
        ("TIMESTAMP_LTZ", K::TimestampLtz),
        ("TIMESTAMP_TZ", K::TimestampTz),
        ("DATETIME", K::DateTime),
        ("INTERVAL", K::Interval),
        ("JSON", K::Json),
        ("UUID", K::Uuid),
        ("VARIANT", K::Variant),
        ("ARRAY", K::Array),
        ("MAP", K::Map),
        ("STRUCT", K::Struct),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

// ---------------------------------------------------------------------------
// Function builders shared by every dialect
// ---------------------------------------------------------------------------

/// Check arity and destructure into a fixed-size array.
pub fn take_args<const N: usize>(name: &str, args: Vec<Expression>) -> Result<[Expression; N]> {
    let len = args.len();
    args.try_into()
        .map_err(|_| Error::parse(format!("{name} expects {N} argument(s), got {len}")))
}

/// Check that `min <= args.len() <= max`.
pub fn check_arity(name: &str, args: &[Expression], min: usize, max: usize) -> Result<()> {
    if args.len() < min || args.len() > max {
        return Err(Error::parse(format!(
            "{name} expects {min} to {max} arguments, got {}",
            args.len()
        )));
    }
    Ok(())
}

/// Interpret a unit argument (`'DAY'`, `day`, `DAY`) as an upper-cased unit name.
pub fn unit_name(expr: &Expression) -> Option<String> {
    match expr {
        Expression::Literal(Literal::String(s)) => Some(s.to_uppercase()),
        Expression::Var(v) => Some(v.name.to_uppercase()),
        Expression::Column(c) if c.table.is_none() => Some(c.name.name.to_uppercase()),
        Expression::Identifier(id) => Some(id.name.to_uppercase()),
        _ => None,
    }
}

pub fn unary(make: fn(Box<UnaryFunc>) -> Expression, name: &'static str, args: Vec<Expression>) -> Result<Expression> {
    let [this] = take_args(name, args)?;
    Ok(make(Box::new(UnaryFunc::new(this))))
}

pub fn binary(
    make: fn(Box<BinaryFunc>) -> Expression,
    name: &'static str,
    args: Vec<Expression>,
) -> Result<Expression> {
    let [this, expression] = take_args(name, args)?;
    Ok(make(Box::new(BinaryFunc::new(this, expression))))
}

pub fn format_func(
    make: fn(Box<FormatFunc>) -> Expression,
    name: &'static str,
    args: Vec<Expression>,
    config: &ParserConfig,
) -> Result<Expression> {
    check_arity(name, &args, 1, 2)?;
    let mut args = args.into_iter();
    let this = args.next().unwrap_or_else(Expression::null);
    let format = args.next().map(|f| config.canonical_format(f));
    Ok(make(Box::new(FormatFunc::new(this, format))))
}

pub fn date_arith(
    make: fn(Box<DateArith>) -> Expression,
    name: &'static str,
    args: Vec<Expression>,
) -> Result<Expression> {
    check_arity(name, &args, 2, 3)?;
    let mut args = args.into_iter();
    let this = args.next().unwrap_or_else(Expression::null);
    let expression = args.next().unwrap_or_else(Expression::null);
    let unit = args.next().as_ref().and_then(unit_name);
    Ok(make(Box::new(DateArith::new(this, expression, unit))))
}

/// Build an ArraySort from `(array[, comparator])`.
pub fn build_array_sort(args: Vec<Expression>, _: &ParserConfig) -> Result<Expression> {
    check_arity("ARRAY_SORT", &args, 1, 2)?;
    let mut args = args.into_iter();
    let this = args.next().unwrap_or_else(Expression::null);
    Ok(Expression::ArraySort(Box::new(ArraySort {
        this,
        asc: None,
        comparator: args.next(),
    })))
}

/// Build an ArraySort from `(array[, ascending])`.
pub fn build_sort_array(args: Vec<Expression>, _: &ParserConfig) -> Result<Expression> {
    check_arity("SORT_ARRAY", &args, 1, 2)?;
    let mut args = args.into_iter();
    let this = args.next().unwrap_or_else(Expression::null);
    Ok(Expression::ArraySort(Box::new(ArraySort {
        this,
        asc: args.next(),
        comparator: None,
    })))
}

/// `STRPOS(haystack, needle[, position])`
pub fn build_strpos(args: Vec<Expression>, _: &ParserConfig) -> Result<Expression> {
    check_arity("STRPOS", &args, 2, 3)?;
    let mut args = args.into_iter();
    let this = args.next().unwrap_or_else(Expression::null);
    let substr = args.next().unwrap_or_else(Expression::null);
    Ok(Expression::StrPosition(Box::new(StrPosition {
        this,
        substr,
        position: args.next(),
    })))
}

/// Build a StrPosition from LOCATE-style `(substr, str[, pos])`.
pub fn build_locate(args: Vec<Expression>, _: &ParserConfig) -> Result<Expression> {
    check_arity("LOCATE", &args, 2, 3)?;
    let mut args = args.into_iter();
    let substr = args.next().unwrap_or_else(Expression::null);
    let this = args.next().unwrap_or_else(Expression::null);
    Ok(Expression::StrPosition(Box::new(StrPosition {
        this,
        substr,
        position: args.next(),
    })))
}

fn build_substring(args: Vec<Expression>, _: &ParserConfig) -> Result<Expression> {
    check_arity("SUBSTRING", &args, 2, 3)?;
    let mut args = args.into_iter();
    let this = args.next().unwrap_or_else(Expression::null);
    Ok(Expression::Substring(Box::new(Substring {
        this,
        start: args.next(),
        length: args.next(),
    })))
}

fn build_log(args: Vec<Expression>, config: &ParserConfig) -> Result<Expression> {
    check_arity("LOG", &args, 1, 2)?;
    if args.len() == 1 {
        if config.log_defaults_to_ln {
            return unary(Expression::Ln, "LOG", args);
        }
        return Ok(Expression::func("LOG", args));
    }
    binary(Expression::Log, "LOG", args)
}

pub fn build_if(args: Vec<Expression>, _: &ParserConfig) -> Result<Expression> {
    check_arity("IF", &args, 2, 3)?;
    let mut args = args.into_iter();
    let condition = args.next().unwrap_or_else(Expression::null);
    let true_value = args.next().unwrap_or_else(Expression::null);
    Ok(Expression::If(Box::new(IfFunc {
        condition,
        true_value,
        false_value: args.next(),
    })))
}

pub fn build_group_concat(args: Vec<Expression>, _: &ParserConfig) -> Result<Expression> {
    check_arity("GROUP_CONCAT", &args, 1, 2)?;
    let mut args = args.into_iter();
    let this = args.next().unwrap_or_else(Expression::null);
    Ok(Expression::GroupConcat(Box::new(GroupConcat {
        this,
        separator: args.next(),
        distinct: false,
    })))
}

pub fn build_date_trunc(args: Vec<Expression>, _: &ParserConfig) -> Result<Expression> {
    let [unit, this] = take_args("DATE_TRUNC", args)?;
    let unit = unit_name(&unit).ok_or_else(|| Error::parse("DATE_TRUNC expects a unit name"))?;
    Ok(Expression::DateTrunc(Box::new(DateTrunc { this, unit })))
}

fn build_map(args: Vec<Expression>, _: &ParserConfig) -> Result<Expression> {
    let [keys, values] = take_args("MAP", args)?;
    Ok(Expression::Map(Box::new(MapFunc { keys, values })))
}

/// Build a Map from alternating `k1, v1, k2, v2, ...` arguments.
pub fn build_map_from_pairs(args: Vec<Expression>, _: &ParserConfig) -> Result<Expression> {
    if args.len() % 2 != 0 {
        return Err(Error::parse("MAP expects an even number of arguments"));
    }
    let mut keys = Vec::with_capacity(args.len() / 2);
    let mut values = Vec::with_capacity(args.len() / 2);
    for (i, arg) in args.into_iter().enumerate() {
        if i % 2 == 0 {
            keys.push(arg);
        } else {
            values.push(arg);
        }
    }
    Ok(Expression::Map(Box::new(MapFunc {
        keys: Expression::Array(Box::new(VarArgFunc::new(keys))),
        values: Expression::Array(Box::new(VarArgFunc::new(values))),
    })))
}

fn no_args(name: &'static str, args: &[Expression]) -> Result<()> {
    check_arity(name, args, 0, 0)
}

fn default_functions() -> HashMap<String, FunctionBuilder> {
    let mut functions: HashMap<String, FunctionBuilder> = HashMap::new();
    let mut add = |name: &str, builder: FunctionBuilder| {
        functions.insert(name.to_string(), builder);
    };
    add("LOWER", |a, _| unary(Expression::Lower, "LOWER", a));
    add("LCASE", |a, _| unary(Expression::Lower, "LCASE", a));
    add("UPPER", |a, _| unary(Expression::Upper, "UPPER", a));
    add("UCASE", |a, _| unary(Expression::Upper, "UCASE", a));
    add("LENGTH", |a, _| unary(Expression::Length, "LENGTH", a));
    add("INITCAP", |a, _| unary(Expression::Initcap, "INITCAP", a));
    add("LN", |a, _| unary(Expression::Ln, "LN", a));
    add("LOG", build_log);
    add("POW", |a, _| binary(Expression::Pow, "POW", a));
    add("POWER", |a, _| binary(Expression::Pow, "POWER", a));
    add("RAND", |a, _| no_args("RAND", &a).map(|_| Expression::Rand(Rand)));
    add("RANDOM", |a, _| no_args("RANDOM", &a).map(|_| Expression::Rand(Rand)));
    add("COALESCE", |a, _| Ok(Expression::Coalesce(Box::new(VarArgFunc::new(a)))));
    add("IFNULL", |a, _| {
        let [x, y] = take_args("IFNULL", a)?;
        Ok(Expression::Coalesce(Box::new(VarArgFunc::new(vec![x, y]))))
    });
    add("NVL", |a, _| {
        let [x, y] = take_args("NVL", a)?;
        Ok(Expression::Coalesce(Box::new(VarArgFunc::new(vec![x, y]))))
    });
    add("IF", build_if);
    add("IIF", build_if);
    add("ARRAY", |a, _| Ok(Expression::Array(Box::new(VarArgFunc::new(a)))));
    add("MAP", build_map);
    add("ARRAY_CONTAINS", |a, _| binary(Expression::ArrayContains, "ARRAY_CONTAINS", a));
    add("ARRAY_CONTAINS_ALL", |a, _| {
        binary(Expression::ArrayContainsAll, "ARRAY_CONTAINS_ALL", a)
    });
    add("ARRAY_SIZE", |a, _| unary(Expression::ArraySize, "ARRAY_SIZE", a));
    add("ARRAY_AGG", |a, _| unary(Expression::ArrayAgg, "ARRAY_AGG", a));
    add("SET_AGG", |a, _| unary(Expression::SetAgg, "SET_AGG", a));
    add("ARRAY_SORT", build_array_sort);
    add("SORT_ARRAY", build_sort_array);
    add("EXPLODE", |a, _| unary(Expression::Explode, "EXPLODE", a));
    add("POSEXPLODE", |a, _| unary(Expression::PosExplode, "POSEXPLODE", a));
    add("APPROX_DISTINCT", |a, _| unary(Expression::ApproxDistinct, "APPROX_DISTINCT", a));
    add("APPROX_COUNT_DISTINCT", |a, _| {
        unary(Expression::ApproxDistinct, "APPROX_COUNT_DISTINCT", a)
    });
    add("QUANTILE", |a, _| binary(Expression::Quantile, "QUANTILE", a));
    add("APPROX_QUANTILE", |a, _| binary(Expression::ApproxQuantile, "APPROX_QUANTILE", a));
    add("STR_POSITION", build_strpos);
    add("STRPOS", build_strpos);
    add("SUBSTRING", build_substring);
    add("SUBSTR", build_substring);
    add("SPLIT", |a, _| binary(Expression::Split, "SPLIT", a));
    add("REGEXP_LIKE", |a, _| binary(Expression::RegexpLike, "REGEXP_LIKE", a));
    add("JSON_EXTRACT", |a, _| binary(Expression::JsonExtract, "JSON_EXTRACT", a));
    add("JSON_EXTRACT_SCALAR", |a, _| {
        binary(Expression::JsonExtractScalar, "JSON_EXTRACT_SCALAR", a)
    });
    add("GROUP_CONCAT", build_group_concat);
    add("CURRENT_DATE", |a, _| {
        no_args("CURRENT_DATE", &a).map(|_| Expression::CurrentDate(CurrentDate))
    });
    add("CURRENT_TIMESTAMP", |a, _| {
        no_args("CURRENT_TIMESTAMP", &a).map(|_| Expression::CurrentTimestamp(CurrentTimestamp))
    });
    add("NOW", |a, _| no_args("NOW", &a).map(|_| Expression::CurrentTimestamp(CurrentTimestamp)));
    add("DATE_TRUNC", build_date_trunc);
    add("DAY", |a, _| unary(Expression::Day, "DAY", a));
    add("MONTH", |a, _| unary(Expression::Month, "MONTH", a));
    add("YEAR", |a, _| unary(Expression::Year, "YEAR", a));
    add("DATE_ADD", |a, _| date_arith(Expression::DateAdd, "DATE_ADD", a));
    add("DATE_SUB", |a, _| date_arith(Expression::DateSub, "DATE_SUB", a));
    add("DATE_DIFF", |a, _| date_arith(Expression::DateDiff, "DATE_DIFF", a));
    add("TS_OR_DS_ADD", |a, _| date_arith(Expression::TsOrDsAdd, "TS_OR_DS_ADD", a));
    add("TS_OR_DS_TO_DATE", |a, _| unary(Expression::TsOrDsToDate, "TS_OR_DS_TO_DATE", a));
    add("STR_TO_TIME", |a, c| format_func(Expression::StrToTime, "STR_TO_TIME", a, c));
    add("STR_TO_DATE", |a, c| format_func(Expression::StrToDate, "STR_TO_DATE", a, c));
    add("STR_TO_UNIX", |a, c| format_func(Expression::StrToUnix, "STR_TO_UNIX", a, c));
    add("UNIX_TO_STR", |a, c| format_func(Expression::UnixToStr, "UNIX_TO_STR", a, c));
    add("TIME_TO_STR", |a, c| format_func(Expression::TimeToStr, "TIME_TO_STR", a, c));
    add("UNIX_TO_TIME", |a, _| unary(Expression::UnixToTime, "UNIX_TO_TIME", a));
    add("TIME_TO_UNIX", |a, _| unary(Expression::TimeToUnix, "TIME_TO_UNIX", a));
    functions
}

/// Wrap `expr` in `TsOrDsToDate` unless it already is one.
pub fn ts_or_ds_to_date(expr: Expression) -> Expression {
    match expr {
        Expression::TsOrDsToDate(_) => expr,
        other => Expression::TsOrDsToDate(Box::new(UnaryFunc::new(other))),
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

const INTERVAL_UNITS: &[&str] = &[
    "YEAR", "YEARS", "QUARTER", "QUARTERS", "MONTH", "MONTHS", "WEEK", "WEEKS", "DAY", "DAYS",
    "HOUR", "HOURS", "MINUTE", "MINUTES", "SECOND", "SECONDS", "MILLISECOND", "MILLISECONDS",
    "MICROSECOND", "MICROSECONDS",
];

/// Recursive-descent SQL parser over a token vector.
pub struct Parser<'a> {
    config: &'a ParserConfig,
    options: ParseOptions,
    source: Option<Vec<char>>,
    tokens: Vec<Token>,
    current: usize,
    eof: Token,
}

impl<'a> Parser<'a> {
    pub fn new(config: &'a ParserConfig, options: ParseOptions) -> Self {
        Self {
            config,
            options,
            source: None,
            tokens: Vec::new(),
            current: 0,
            eof: Token::new(TokenType::Eof, "", Span::default()),
        }
    }

    /// Attach the source text, used to slice `Unparsed` and `Command` bodies.
    pub fn with_source(mut self, sql: &str) -> Self {
        self.source = Some(sql.chars().collect());
        self
    }

    /// Parse with the generic dialect in strict mode.
    pub fn parse_sql(sql: &str) -> Result<Vec<Expression>> {
        crate::dialects::Dialect::get(crate::dialects::DialectType::Generic).parse(sql)
    }

    pub fn config(&self) -> &ParserConfig {
        self.config
    }

    /// Parse every `;`-separated statement in `tokens`.
    pub fn parse(&mut self, tokens: Vec<Token>) -> Result<Vec<Expression>> {
        self.reset(tokens);
        let mut statements = Vec::new();

        loop {
            while self.match_token(TokenType::Semicolon) {}
            if self.is_at_end() {
                break;
            }
            let start = self.current;
            match self.parse_statement_with_terminator() {
                Ok(statement) => statements.push(statement),
                Err(err) if self.options.error_level == ErrorLevel::Lenient => {
                    tracing::debug!(
                        target: "sqlweave::parse",
                        error = %err,
                        "keeping unparseable statement as text"
                    );
                    statements.push(self.recover(start));
                }
                Err(err) => return Err(err),
            }
        }

        Ok(statements)
    }

    /// Parse exactly one expression, with nothing after it.
    pub fn parse_single_expression(&mut self, tokens: Vec<Token>) -> Result<Expression> {
        self.reset(tokens);
        let expr = self.parse_expression()?;
        if !self.is_at_end() {
            return Err(self.error_expected(&["end of input"]));
        }
        Ok(expr)
    }

    fn reset(&mut self, tokens: Vec<Token>) {
        self.tokens = tokens;
        self.current = 0;
        if let Some(last) = self.tokens.last() {
            let end = last.span.end;
            // position just past the last token, which may itself span lines
            let (line, column) = match last.text.rfind('\n') {
                Some(i) => (
                    last.span.line + last.text.matches('\n').count(),
                    last.text[i + 1..].chars().count() + 1,
                ),
                None => (last.span.line, last.span.column + (end - last.span.start)),
            };
            self.eof = Token::new(TokenType::Eof, "", Span::new(end, end, line, column));
        }
    }

    fn parse_statement_with_terminator(&mut self) -> Result<Expression> {
        let statement = self.parse_statement()?;
        if !self.is_at_end() && !self.check(TokenType::Semicolon) {
            return Err(self.error_expected(&["';'", "end of input"]));
        }
        Ok(statement)
    }

    /// Skip to the next `;` and keep the skipped tokens as text
    fn recover(&mut self, start: usize) -> Expression {
        let mut end = start;
        while end < self.tokens.len() && self.tokens[end].token_type != TokenType::Semicolon {
            end += 1;
        }
        let text = self.text_between(start, end);
        self.current = end;
        Expression::Unparsed(Unparsed { text })
    }

    /// Source text covered by tokens `[start, end)`
    fn text_between(&self, start: usize, end: usize) -> String {
        if start >= end {
            return String::new();
        }
        match &self.source {
            Some(chars) => {
                let from = self.tokens[start].span.start;
                let to = self.tokens[end - 1].span.end.min(chars.len());
                chars[from..to].iter().collect()
            }
            None => self.tokens[start..end]
                .iter()
                .map(|t| t.text.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    // -----------------------------------------------------------------------
    // Token helpers
    // -----------------------------------------------------------------------

    pub fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len()
    }

    pub fn peek(&self) -> &Token {
        self.tokens.get(self.current).unwrap_or(&self.eof)
    }

    pub fn peek_at(&self, offset: usize) -> &Token {
        self.tokens.get(self.current + offset).unwrap_or(&self.eof)
    }

    pub fn peek_type(&self) -> TokenType {
        self.peek().token_type
    }

    pub fn check(&self, token_type: TokenType) -> bool {
        self.peek_type() == token_type
    }

    pub fn check_next(&self, token_type: TokenType) -> bool {
        self.peek_at(1).token_type == token_type
    }

    /// Whether the current token is the unquoted word `word`
    pub fn check_word(&self, word: &str) -> bool {
        self.word_at(0, word)
    }

    fn word_at(&self, offset: usize, word: &str) -> bool {
        let token = self.peek_at(offset);
        token.token_type != TokenType::Identifier
            && token.token_type != TokenType::String
            && token.token_type != TokenType::Eof
            && token.text.eq_ignore_ascii_case(word)
    }

    pub fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    pub fn match_token(&mut self, token_type: TokenType) -> bool {
        if self.check(token_type) {
            self.current += 1;
            true
        } else {
            false
        }
    }

    pub fn match_word(&mut self, word: &str) -> bool {
        if self.check_word(word) {
            self.current += 1;
            true
        } else {
            false
        }
    }

    /// Match a sequence of words, consuming nothing unless all match
    pub fn match_words(&mut self, words: &[&str]) -> bool {
        if words.iter().enumerate().all(|(i, w)| self.word_at(i, w)) {
            self.current += words.len();
            true
        } else {
            false
        }
    }

    pub fn expect(&mut self, token_type: TokenType, what: &str) -> Result<Token> {
        if self.check(token_type) {
            Ok(self.advance())
        } else {
            Err(self.error_expected(&[what]))
        }
    }

    pub fn expect_word(&mut self, word: &str) -> Result<()> {
        if self.match_word(word) {
            Ok(())
        } else {
            Err(self.error_expected(&[word]))
        }
    }

    pub fn error_expected(&self, expected: &[&str]) -> Error {
        let token = self.peek();
        let found = if token.token_type == TokenType::Eof {
            "end of input".to_string()
        } else {
            token.text.clone()
        };
        Error::unexpected(
            "Unexpected token",
            expected.iter().map(|s| s.to_string()).collect(),
            found,
            token.span,
        )
    }

    fn string_value(&self, token: &Token) -> String {
        unescape_string(&token.text, &self.config.quotes, &self.config.string_escapes)
    }

    fn is_name_token(&self, token: &Token) -> bool {
        match token.token_type {
            TokenType::Var | TokenType::Identifier => true,
            t => t.is_keyword() && !self.config.reserved_keywords.contains(&t),
        }
    }

    /// An identifier: a bare word, a quoted identifier, or a non-reserved keyword
    pub fn parse_identifier(&mut self) -> Result<Identifier> {
        let token = self.peek();
        if token.token_type == TokenType::Identifier {
            let id = Identifier::quoted(unescape_identifier(&token.text));
            self.current += 1;
            return Ok(id);
        }
        if self.is_name_token(token) {
            let id = Identifier::new(token.text.clone());
            self.current += 1;
            return Ok(id);
        }
        Err(self.error_expected(&["identifier"]))
    }

    /// Any word, reserved or not (used after `.` and for type names)
    fn parse_any_identifier(&mut self) -> Result<Identifier> {
        let token = self.peek();
        match token.token_type {
            TokenType::Identifier => {
                let id = Identifier::quoted(unescape_identifier(&token.text));
                self.current += 1;
                Ok(id)
            }
            t if t == TokenType::Var || t.is_keyword() => {
                let id = Identifier::new(token.text.clone());
                self.current += 1;
                Ok(id)
            }
            _ => Err(self.error_expected(&["identifier"])),
        }
    }

    fn parse_identifier_list(&mut self) -> Result<Vec<Identifier>> {
        let mut ids = vec![self.parse_identifier()?];
        while self.match_token(TokenType::Comma) {
            ids.push(self.parse_identifier()?);
        }
        Ok(ids)
    }

    fn parse_string(&mut self) -> Result<String> {
        if self.check(TokenType::String) {
            let token = self.advance();
            Ok(self.string_value(&token))
        } else {
            Err(self.error_expected(&["string"]))
        }
    }

    // -----------------------------------------------------------------------
    // Statements
    // -----------------------------------------------------------------------

    pub fn parse_statement(&mut self) -> Result<Expression> {
        let token_type = self.peek_type();
        if let Some(parser) = self.config.statement_parsers.get(&token_type).copied() {
            return parser(self);
        }
        if token_type == TokenType::LParen {
            let save = self.current;
            if let Ok(query) = self.parse_query() {
                if self.is_at_end() || self.check(TokenType::Semicolon) {
                    return Ok(query);
                }
            }
            self.current = save;
        }
        self.parse_expression()
    }

    /// SELECT / VALUES / parenthesized query, with WITH and set operations.
    pub fn parse_query(&mut self) -> Result<Expression> {
        let with = if self.check(TokenType::With) {
            Some(self.parse_with()?)
        } else {
            None
        };

        let mut query = self.parse_query_term()?;

        loop {
            let make: fn(Box<SetOperation>) -> Expression = match self.peek_type() {
                TokenType::Union => Expression::Union,
                TokenType::Intersect => Expression::Intersect,
                TokenType::Except => Expression::Except,
                _ => break,
            };
            self.advance();
            let mut distinct = true;
            let mut explicit_distinct = false;
            if self.match_token(TokenType::All) {
                distinct = false;
            } else if self.match_token(TokenType::Distinct) {
                explicit_distinct = true;
            }
            let mut right = self.parse_query_term()?;

            // Trailing ORDER BY / LIMIT bind to the whole set operation
            let mut order_by = Vec::new();
            let mut limit = None;
            if let Expression::Select(select) = &mut right {
                order_by = std::mem::take(&mut select.order_by);
                limit = select.limit.take();
            }

            query = make(Box::new(SetOperation {
                left: query,
                right,
                distinct,
                explicit_distinct,
                order_by,
                limit,
            }));
        }

        if let Some(with) = with {
            attach_with(&mut query, with)?;
        }
        Ok(query)
    }

    fn parse_query_term(&mut self) -> Result<Expression> {
        match self.peek_type() {
            TokenType::Select => self.parse_select(),
            TokenType::Values => self.parse_values(),
            TokenType::LParen => {
                self.advance();
                let query = self.parse_query()?;
                self.expect(TokenType::RParen, "')'")?;
                Ok(Expression::Subquery(Box::new(Subquery { this: query, alias: None })))
            }
            _ => Err(self.error_expected(&["SELECT", "VALUES", "'('"])),
        }
    }

    fn parse_with(&mut self) -> Result<With> {
        self.expect(TokenType::With, "WITH")?;
        let recursive = self.match_token(TokenType::Recursive);
        let mut ctes = Vec::new();
        loop {
            let name = self.parse_identifier()?;
            let mut columns = Vec::new();
            if self.match_token(TokenType::LParen) {
                columns = self.parse_identifier_list()?;
                self.expect(TokenType::RParen, "')'")?;
            }
            self.expect(TokenType::As, "AS")?;
            self.expect(TokenType::LParen, "'('")?;
            let this = self.parse_query()?;
            self.expect(TokenType::RParen, "')'")?;
            ctes.push(Cte {
                alias: TableAlias { name, columns },
                this,
            });
            if !self.match_token(TokenType::Comma) {
                break;
            }
        }
        Ok(With { recursive, ctes })
    }

    fn parse_select(&mut self) -> Result<Expression> {
        let select_token = self.expect(TokenType::Select, "SELECT")?;
        let mut select = Select {
            comments: select_token.comments,
            ..Default::default()
        };

        if self.match_token(TokenType::Distinct) {
            let mut on = Vec::new();
            if self.match_token(TokenType::On) {
                self.expect(TokenType::LParen, "'('")?;
                on = self.parse_expression_list()?;
                self.expect(TokenType::RParen, "')'")?;
            }
            select.distinct = Some(Distinct { on });
        } else {
            self.match_token(TokenType::All);
        }

        if self.match_token(TokenType::Top) {
            let limit = if self.match_token(TokenType::LParen) {
                let e = self.parse_expression()?;
                self.expect(TokenType::RParen, "')'")?;
                e
            } else {
                self.parse_primary()?
            };
            select.limit = Some(limit);
        }

        select.expressions = self.parse_projections()?;

        if self.match_token(TokenType::From) {
            select.from.push(self.parse_table_source()?);
            while self.match_token(TokenType::Comma) {
                select.from.push(self.parse_table_source()?);
            }
            select.joins = self.parse_joins()?;
        }

        if self.match_token(TokenType::Where) {
            select.where_clause = Some(self.parse_expression()?);
        }

        if self.check(TokenType::Group) && self.check_next(TokenType::By) {
            self.current += 2;
            select.group_by = self.parse_group_by()?;
        }

        if self.match_token(TokenType::Having) {
            select.having = Some(self.parse_expression()?);
        }

        if self.match_token(TokenType::Qualify) {
            select.qualify = Some(self.parse_expression()?);
        }

        if self.check(TokenType::Order) && self.check_next(TokenType::By) {
            self.current += 2;
            select.order_by = self.parse_ordered_list()?;
        }

        if self.check(TokenType::Distribute) && self.check_next(TokenType::By) {
            self.current += 2;
            select.distribute_by = self.parse_expression_list()?;
        }

        if self.check(TokenType::Sort) && self.check_next(TokenType::By) {
            self.current += 2;
            select.sort_by = self.parse_ordered_list()?;
        }

        if self.check(TokenType::Cluster) && self.check_next(TokenType::By) {
            self.current += 2;
            select.cluster_by = self.parse_expression_list()?;
        }

        if self.match_token(TokenType::Limit) {
            let first = self.parse_expression()?;
            if self.match_token(TokenType::Comma) {
                // MySQL `LIMIT offset, count`
                select.offset = Some(first);
                select.limit = Some(self.parse_expression()?);
            } else {
                select.limit = Some(first);
            }
        }

        if self.match_token(TokenType::Offset) {
            select.offset = Some(self.parse_expression()?);
            if !self.match_word("ROWS") {
                self.match_word("ROW");
            }
        }

        if self.match_token(TokenType::Fetch) {
            if !self.match_word("FIRST") {
                self.expect_word("NEXT")?;
            }
            let count = if self.check_word("ROWS") || self.check_word("ROW") {
                Expression::number(1)
            } else {
                self.parse_primary()?
            };
            if !self.match_word("ROWS") {
                self.expect_word("ROW")?;
            }
            self.expect_word("ONLY")?;
            select.limit = Some(count);
        }

        Ok(Expression::Select(Box::new(select)))
    }

    fn parse_projections(&mut self) -> Result<Vec<Expression>> {
        let mut expressions = vec![self.parse_projection()?];
        while self.match_token(TokenType::Comma) {
            expressions.push(self.parse_projection()?);
        }
        Ok(expressions)
    }

    fn parse_projection(&mut self) -> Result<Expression> {
        let expr = self.parse_expression()?;
        self.parse_alias(expr)
    }

    fn parse_alias(&mut self, expr: Expression) -> Result<Expression> {
        if self.match_token(TokenType::As) {
            let alias = if self.check(TokenType::String) {
                let token = self.advance();
                Identifier::quoted(self.string_value(&token))
            } else {
                self.parse_any_identifier()?
            };
            return Ok(Expression::Alias(Box::new(Alias { this: expr, alias })));
        }
        if matches!(self.peek_type(), TokenType::Var | TokenType::Identifier) {
            let alias = self.parse_identifier()?;
            return Ok(Expression::Alias(Box::new(Alias { this: expr, alias })));
        }
        Ok(expr)
    }

    fn parse_group_by(&mut self) -> Result<Vec<Expression>> {
        let mut items = Vec::new();
        loop {
            if (self.check_word("ROLLUP") || self.check_word("CUBE")) && self.check_next(TokenType::LParen) {
                let name = self.advance().text.to_uppercase();
                self.advance();
                let args = self.parse_expression_list()?;
                self.expect(TokenType::RParen, "')'")?;
                items.push(Expression::func(name, args));
            } else {
                items.push(self.parse_expression()?);
            }
            if !self.match_token(TokenType::Comma) {
                break;
            }
        }
        // Trailing `WITH ROLLUP` / `WITH CUBE`
        if self.check(TokenType::With) && (self.word_at(1, "ROLLUP") || self.word_at(1, "CUBE")) {
            self.advance();
            let name = self.advance().text.to_uppercase();
            items = vec![Expression::func(name, items)];
        }
        Ok(items)
    }

    fn parse_ordered_list(&mut self) -> Result<Vec<Expression>> {
        let mut items = vec![self.parse_ordered()?];
        while self.match_token(TokenType::Comma) {
            items.push(self.parse_ordered()?);
        }
        Ok(items)
    }

    /// One ORDER BY item with its NULL placement made explicit.
    pub fn parse_ordered(&mut self) -> Result<Expression> {
        let this = self.parse_expression()?;
        let desc = if self.match_token(TokenType::Desc) {
            true
        } else {
            self.match_token(TokenType::Asc);
            false
        };
        let nulls_first = if self.match_words(&["NULLS", "FIRST"]) {
            true
        } else if self.match_words(&["NULLS", "LAST"]) {
            false
        } else {
            self.config.null_ordering.nulls_first(desc)
        };
        Ok(Expression::Ordered(Box::new(Ordered {
            this,
            desc,
            nulls_first,
        })))
    }

    fn parse_values(&mut self) -> Result<Expression> {
        self.expect(TokenType::Values, "VALUES")?;
        let mut rows = Vec::new();
        loop {
            if self.match_token(TokenType::LParen) {
                let items = self.parse_expression_list()?;
                self.expect(TokenType::RParen, "')'")?;
                rows.push(Expression::Tuple(Box::new(VarArgFunc::new(items))));
            } else {
                rows.push(self.parse_expression()?);
            }
            if !self.match_token(TokenType::Comma) {
                break;
            }
        }
        Ok(Expression::Values(Box::new(Values { rows, alias: None })))
    }

    // -----------------------------------------------------------------------
    // FROM sources and joins
    // -----------------------------------------------------------------------

    /// A table, subquery, VALUES list, UNNEST or table function, with alias and sample.
    pub fn parse_table_source(&mut self) -> Result<Expression> {
        if self.check(TokenType::LParen) {
            self.advance();
            let this = self.parse_query()?;
            self.expect(TokenType::RParen, "')'")?;
            let alias = self.parse_table_alias()?;
            return Ok(Expression::Subquery(Box::new(Subquery { this, alias })));
        }

        if self.check(TokenType::Values) {
            let mut values = self.parse_values()?;
            if let Expression::Values(v) = &mut values {
                v.alias = self.parse_table_alias()?;
            }
            return Ok(values);
        }

        if self.check_word("UNNEST") && self.check_next(TokenType::LParen) {
            self.current += 2;
            let expressions = self.parse_expression_list()?;
            self.expect(TokenType::RParen, "')'")?;
            let ordinality = self.match_words(&["WITH", "ORDINALITY"]);
            let alias = self.parse_table_alias()?;
            return Ok(Expression::Unnest(Box::new(Unnest {
                expressions,
                ordinality,
                alias,
                origin: UnnestOrigin::Unnest,
            })));
        }

        let first = self.parse_identifier()?;
        if self.check(TokenType::LParen) {
            let func = self.parse_function_call(first.name)?;
            return match self.parse_table_alias()? {
                Some(alias) => Ok(Expression::Alias(Box::new(Alias {
                    this: func,
                    alias: alias.name,
                }))),
                None => Ok(func),
            };
        }

        let mut parts = vec![first];
        while self.match_token(TokenType::Dot) {
            parts.push(self.parse_any_identifier()?);
        }
        let mut table = table_from_parts(parts);

        if self.check(TokenType::Tablesample) {
            table.sample = Some(Box::new(self.parse_sample()?));
        }
        table.alias = self.parse_table_alias()?;
        if table.sample.is_none() && self.check(TokenType::Tablesample) {
            table.sample = Some(Box::new(self.parse_sample()?));
        }
        Ok(Expression::Table(table))
    }

    /// `[AS] name [(col, ...)]`
    fn parse_table_alias(&mut self) -> Result<Option<TableAlias>> {
        let explicit = self.match_token(TokenType::As);
        if !explicit && !matches!(self.peek_type(), TokenType::Var | TokenType::Identifier) {
            return Ok(None);
        }
        // Words that follow a table source and must never be read as its alias
        if !explicit && (self.check_word("WINDOW") || self.check_word("ORDINALITY")) {
            return Ok(None);
        }
        let name = self.parse_identifier()?;
        let mut columns = Vec::new();
        if self.match_token(TokenType::LParen) {
            columns = self.parse_identifier_list()?;
            self.expect(TokenType::RParen, "')'")?;
        }
        Ok(Some(TableAlias { name, columns }))
    }

    fn parse_sample(&mut self) -> Result<Sample> {
        self.expect(TokenType::Tablesample, "TABLESAMPLE")?;
        let method = if matches!(self.peek_type(), TokenType::Var) && self.check_next(TokenType::LParen) {
            Some(self.advance().text.to_uppercase())
        } else {
            None
        };
        self.expect(TokenType::LParen, "'('")?;

        let mut sample = Sample {
            method,
            size: None,
            unit: None,
            bucket: None,
            seed: None,
        };

        if self.match_word("BUCKET") {
            let numerator = self.parse_primary()?;
            self.expect_word("OUT")?;
            self.expect_word("OF")?;
            let denominator = self.parse_primary()?;
            let field = if self.match_token(TokenType::On) {
                Some(self.parse_expression()?)
            } else {
                None
            };
            sample.bucket = Some(Bucket {
                numerator,
                denominator,
                field,
            });
        } else {
            sample.size = Some(self.parse_expression()?);
            if self.match_word("PERCENT") {
                sample.unit = Some(SampleUnit::Percent);
            } else if self.match_word("ROWS") {
                sample.unit = Some(SampleUnit::Rows);
            }
        }
        self.expect(TokenType::RParen, "')'")?;

        if self.match_word("REPEATABLE") || self.match_word("SEED") {
            self.expect(TokenType::LParen, "'('")?;
            sample.seed = Some(self.parse_expression()?);
            self.expect(TokenType::RParen, "')'")?;
        }
        Ok(sample)
    }

    fn parse_joins(&mut self) -> Result<Vec<Join>> {
        let mut joins = Vec::new();
        loop {
            if self.check(TokenType::Lateral) && self.word_at(1, "VIEW") {
                joins.push(self.parse_lateral_view()?);
                continue;
            }

            let save = self.current;
            let natural = self.match_token(TokenType::Natural);
            let kind = match self.peek_type() {
                TokenType::Join => JoinKind::Plain,
                TokenType::Inner => {
                    self.advance();
                    JoinKind::Inner
                }
                TokenType::Left => {
                    self.advance();
                    if self.match_token(TokenType::Semi) {
                        JoinKind::Semi
                    } else if self.match_token(TokenType::Anti) {
                        JoinKind::Anti
                    } else {
                        self.match_token(TokenType::Outer);
                        JoinKind::Left
                    }
                }
                TokenType::Right => {
                    self.advance();
                    self.match_token(TokenType::Outer);
                    JoinKind::Right
                }
                TokenType::Full => {
                    self.advance();
                    self.match_token(TokenType::Outer);
                    JoinKind::Full
                }
                TokenType::Cross => {
                    self.advance();
                    JoinKind::Cross
                }
                TokenType::Semi => {
                    self.advance();
                    JoinKind::Semi
                }
                TokenType::Anti => {
                    self.advance();
                    JoinKind::Anti
                }
                _ => {
                    self.current = save;
                    break;
                }
            };
            self.expect(TokenType::Join, "JOIN")?;

            let this = self.parse_table_source()?;
            let mut join = Join::new(this, kind);
            join.natural = natural;
            if self.match_token(TokenType::On) {
                join.on = Some(self.parse_expression()?);
            } else if self.match_token(TokenType::Using) {
                self.expect(TokenType::LParen, "'('")?;
                join.using = self.parse_identifier_list()?;
                self.expect(TokenType::RParen, "')'")?;
            }
            joins.push(join);
        }
        Ok(joins)
    }

    /// `LATERAL VIEW [OUTER] EXPLODE(x) t [AS a, b]`
    fn parse_lateral_view(&mut self) -> Result<Join> {
        self.expect(TokenType::Lateral, "LATERAL")?;
        self.expect_word("VIEW")?;
        let outer = self.match_token(TokenType::Outer);

        let func_token = self.peek().clone();
        let ordinality = if self.match_word("EXPLODE") {
            false
        } else if self.match_word("POSEXPLODE") {
            true
        } else {
            return Err(Error::unexpected(
                "Unsupported LATERAL VIEW function",
                vec!["EXPLODE".to_string(), "POSEXPLODE".to_string()],
                func_token.text,
                func_token.span,
            ));
        };
        self.expect(TokenType::LParen, "'('")?;
        let expressions = self.parse_expression_list()?;
        self.expect(TokenType::RParen, "')'")?;

        let table = self.parse_identifier()?;
        let mut columns = Vec::new();
        if self.match_token(TokenType::As) {
            columns = self.parse_identifier_list()?;
        }
        // POSEXPLODE names the position first
        if ordinality && columns.len() > 1 {
            columns.rotate_left(1);
        }

        let unnest = Expression::Unnest(Box::new(Unnest {
            expressions,
            ordinality,
            alias: Some(TableAlias { name: table, columns }),
            origin: UnnestOrigin::Explode,
        }));
        Ok(Join::new(unnest, if outer { JoinKind::Left } else { JoinKind::Cross }))
    }

    /// A plain table name: `[catalog.][schema.]name`
    pub fn parse_table_ref(&mut self) -> Result<TableRef> {
        let mut parts = vec![self.parse_identifier()?];
        while self.match_token(TokenType::Dot) {
            parts.push(self.parse_any_identifier()?);
        }
        Ok(table_from_parts(parts))
    }

    // -----------------------------------------------------------------------
    // DML and DDL
    // -----------------------------------------------------------------------

    fn parse_insert(&mut self) -> Result<Expression> {
        self.expect(TokenType::Insert, "INSERT")?;
        let overwrite = if self.match_token(TokenType::Overwrite) {
            true
        } else {
            self.expect(TokenType::Into, "INTO")?;
            false
        };
        self.match_token(TokenType::Table);
        let table = self.parse_table_ref()?;

        let mut partition = Vec::new();
        if self.match_token(TokenType::Partition) {
            self.expect(TokenType::LParen, "'('")?;
            partition = self.parse_expression_list()?;
            self.expect(TokenType::RParen, "')'")?;
        }

        let mut columns = Vec::new();
        if self.check(TokenType::LParen) && !matches!(self.peek_at(1).token_type, TokenType::Select | TokenType::With) {
            self.advance();
            columns = self.parse_identifier_list()?;
            self.expect(TokenType::RParen, "')'")?;
        }

        let query = self.parse_query()?;
        Ok(Expression::Insert(Box::new(Insert {
            table,
            columns,
            overwrite,
            partition,
            query,
        })))
    }

    fn parse_update(&mut self) -> Result<Expression> {
        self.expect(TokenType::Update, "UPDATE")?;
        let mut table = self.parse_table_ref()?;
        table.alias = self.parse_table_alias()?;
        self.expect(TokenType::Set, "SET")?;
        let set = self.parse_expression_list()?;
        let mut from = Vec::new();
        if self.match_token(TokenType::From) {
            from.push(self.parse_table_source()?);
            while self.match_token(TokenType::Comma) {
                from.push(self.parse_table_source()?);
            }
        }
        let where_clause = if self.match_token(TokenType::Where) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        Ok(Expression::Update(Box::new(Update {
            table,
            set,
            from,
            where_clause,
        })))
    }

    fn parse_delete(&mut self) -> Result<Expression> {
        self.expect(TokenType::Delete, "DELETE")?;
        self.match_token(TokenType::From);
        let mut table = self.parse_table_ref()?;
        table.alias = self.parse_table_alias()?;
        let where_clause = if self.match_token(TokenType::Where) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        Ok(Expression::Delete(Box::new(Delete { table, where_clause })))
    }

    fn parse_create(&mut self) -> Result<Expression> {
        self.expect(TokenType::Create, "CREATE")?;
        let replace = if self.match_token(TokenType::Or) {
            self.expect(TokenType::Replace, "REPLACE")?;
            true
        } else {
            false
        };
        let temporary = self.match_token(TokenType::Temporary);
        self.match_word("EXTERNAL");

        let kind = if self.match_token(TokenType::Table) {
            CreateKind::Table
        } else if self.match_token(TokenType::View) {
            CreateKind::View
        } else {
            return Err(self.error_expected(&["TABLE", "VIEW"]));
        };

        let if_not_exists = if self.match_token(TokenType::If) {
            self.expect(TokenType::Not, "NOT")?;
            self.expect(TokenType::Exists, "EXISTS")?;
            true
        } else {
            false
        };

        let this = self.parse_table_ref()?;

        let mut columns = Vec::new();
        if self.check(TokenType::LParen) && !matches!(self.peek_at(1).token_type, TokenType::Select | TokenType::With) {
            self.advance();
            loop {
                columns.push(self.parse_column_def()?);
                if !self.match_token(TokenType::Comma) {
                    break;
                }
            }
            self.expect(TokenType::RParen, "')'")?;
        }

        let properties = self.parse_properties()?;

        let expression = if self.match_token(TokenType::As) {
            Some(self.parse_query()?)
        } else if matches!(self.peek_type(), TokenType::Select | TokenType::With) {
            Some(self.parse_query()?)
        } else {
            None
        };

        Ok(Expression::Create(Box::new(Create {
            kind,
            this,
            replace,
            temporary,
            if_not_exists,
            columns,
            properties,
            expression,
        })))
    }

    /// `name type [constraints...]`
    pub fn parse_column_def(&mut self) -> Result<ColumnDef> {
        let name = self.parse_identifier()?;
        let data_type = if matches!(
            self.peek_type(),
            TokenType::Comma | TokenType::RParen | TokenType::Eof
        ) {
            None
        } else {
            Some(self.parse_data_type()?)
        };

        let mut constraints = Vec::new();
        loop {
            if self.check(TokenType::Not) && self.check_next(TokenType::Null) {
                self.current += 2;
                constraints.push(ColumnConstraint::NotNull);
            } else if self.match_token(TokenType::Null) {
                constraints.push(ColumnConstraint::Null);
            } else if self.check(TokenType::Primary) {
                self.advance();
                self.expect_word("KEY")?;
                constraints.push(ColumnConstraint::PrimaryKey);
            } else if self.match_token(TokenType::Unique) {
                constraints.push(ColumnConstraint::Unique);
            } else if self.match_token(TokenType::Default) {
                constraints.push(ColumnConstraint::Default(self.parse_unary()?));
            } else if self.check_word("COMMENT") && self.check_next(TokenType::String) {
                self.advance();
                constraints.push(ColumnConstraint::Comment(self.parse_string()?));
            } else {
                break;
            }
        }
        Ok(ColumnDef {
            name,
            data_type,
            constraints,
        })
    }

    /// Table properties in Hive clause form or as a `WITH (...)` list.
    pub fn parse_properties(&mut self) -> Result<Vec<Property>> {
        let mut properties = Vec::new();
        loop {
            if self.check_word("COMMENT") && self.check_next(TokenType::String) {
                self.advance();
                properties.push(Property::Comment(self.parse_string()?));
            } else if self.check_word("PARTITIONED") && self.check_next(TokenType::By) {
                self.current += 2;
                self.expect(TokenType::LParen, "'('")?;
                let mut items = Vec::new();
                loop {
                    let is_def = !matches!(self.peek_at(1).token_type, TokenType::Comma | TokenType::RParen);
                    if is_def {
                        items.push(Expression::ColumnDef(Box::new(self.parse_column_def()?)));
                    } else {
                        items.push(self.parse_expression()?);
                    }
                    if !self.match_token(TokenType::Comma) {
                        break;
                    }
                }
                self.expect(TokenType::RParen, "')'")?;
                properties.push(Property::PartitionedBy(items));
            } else if self.match_words(&["STORED"]) {
                self.expect(TokenType::As, "AS")?;
                properties.push(Property::FileFormat(self.parse_any_identifier()?.name));
            } else if self.match_token(TokenType::Using) {
                properties.push(Property::FileFormat(self.parse_any_identifier()?.name));
            } else if self.check_word("LOCATION") && self.check_next(TokenType::String) {
                self.advance();
                properties.push(Property::Location(self.parse_string()?));
            } else if self.match_word("TBLPROPERTIES") || self.match_word("OPTIONS") {
                properties.extend(self.parse_property_list()?);
            } else if self.check(TokenType::With) && self.check_next(TokenType::LParen) {
                self.advance();
                properties.extend(self.parse_property_list()?);
            } else {
                break;
            }
        }
        Ok(properties)
    }

    /// `(key = value, ...)`; well-known keys map to typed properties
    fn parse_property_list(&mut self) -> Result<Vec<Property>> {
        self.expect(TokenType::LParen, "'('")?;
        let mut properties = Vec::new();
        loop {
            let key = if self.check(TokenType::String) {
                self.parse_string()?
            } else {
                self.parse_any_identifier()?.name
            };
            self.expect(TokenType::Eq, "'='")?;
            let value = self.parse_expression()?;
            properties.push(typed_property(key, value));
            if !self.match_token(TokenType::Comma) {
                break;
            }
        }
        self.expect(TokenType::RParen, "')'")?;
        Ok(properties)
    }

    fn parse_drop(&mut self) -> Result<Expression> {
        self.expect(TokenType::Drop, "DROP")?;
        let kind = if self.match_token(TokenType::Table) {
            CreateKind::Table
        } else if self.match_token(TokenType::View) {
            CreateKind::View
        } else {
            return Err(self.error_expected(&["TABLE", "VIEW"]));
        };
        let if_exists = if self.match_token(TokenType::If) {
            self.expect(TokenType::Exists, "EXISTS")?;
            true
        } else {
            false
        };
        let this = self.parse_table_ref()?;
        let cascade = self.match_word("CASCADE");
        Ok(Expression::Drop(Box::new(Drop {
            kind,
            this,
            if_exists,
            cascade,
        })))
    }

    fn parse_use(&mut self) -> Result<Expression> {
        self.expect(TokenType::Use, "USE")?;
        let kind = if matches!(self.peek_at(1).token_type, TokenType::Var | TokenType::Identifier)
            && self.peek_type() == TokenType::Var
        {
            Some(self.advance().text.to_uppercase())
        } else {
            None
        };
        let this = self.parse_identifier()?;
        Ok(Expression::Use(Box::new(Use { kind, this })))
    }

    /// `CACHE [LAZY] TABLE t [OPTIONS ('k' = v)] [[AS] query]`
    pub fn parse_cache(&mut self) -> Result<Expression> {
        self.expect(TokenType::Cache, "CACHE")?;
        let lazy = self.match_word("LAZY");
        self.expect(TokenType::Table, "TABLE")?;
        let table = self.parse_table_ref()?;
        let options = if self.match_word("OPTIONS") {
            self.parse_property_list()?
        } else {
            Vec::new()
        };
        let query = if self.match_token(TokenType::As) || self.check(TokenType::Select) || self.check(TokenType::With) {
            Some(self.parse_query()?)
        } else {
            None
        };
        Ok(Expression::Cache(Box::new(Cache {
            lazy,
            table,
            options,
            query,
        })))
    }

    /// A statement kept as its leading keyword plus raw text.
    pub fn parse_command(&mut self) -> Result<Expression> {
        let keyword = self.advance();
        let start = self.current;
        let mut end = start;
        while end < self.tokens.len() && self.tokens[end].token_type != TokenType::Semicolon {
            end += 1;
        }
        let expression = self.text_between(start, end);
        self.current = end;
        Ok(Expression::Command(Box::new(Command {
            this: keyword.text.to_uppercase(),
            expression,
        })))
    }

    // -----------------------------------------------------------------------
    // Expressions
    // -----------------------------------------------------------------------

    pub fn parse_expression(&mut self) -> Result<Expression> {
        self.parse_binary(0)
    }

    pub fn parse_expression_list(&mut self) -> Result<Vec<Expression>> {
        let mut items = vec![self.parse_expression()?];
        while self.match_token(TokenType::Comma) {
            items.push(self.parse_expression()?);
        }
        Ok(items)
    }

    fn parse_binary(&mut self, min_precedence: u8) -> Result<Expression> {
        let mut left = self.parse_unary()?;
        loop {
            if precedence::COMPARISON >= min_precedence && self.at_range_operator() {
                left = self.parse_range(left)?;
                continue;
            }
            let Some(op) = self.config.binary_operators.get(&self.peek_type()).copied() else {
                break;
            };
            if op.precedence < min_precedence {
                break;
            }
            self.advance();
            let right = self.parse_binary(op.precedence + 1)?;
            left = (op.build)(left, right);
        }
        Ok(left)
    }

    fn at_range_operator(&self) -> bool {
        match self.peek_type() {
            TokenType::In | TokenType::Between | TokenType::Like | TokenType::ILike | TokenType::Is => true,
            TokenType::Not => {
                let next = self.peek_at(1).token_type;
                matches!(
                    next,
                    TokenType::In | TokenType::Between | TokenType::Like | TokenType::ILike
                ) || self
                    .config
                    .binary_operators
                    .get(&next)
                    .is_some_and(|op| op.precedence == precedence::COMPARISON)
            }
            _ => false,
        }
    }

    /// IN, BETWEEN, LIKE, ILIKE and IS, each optionally negated
    fn parse_range(&mut self, left: Expression) -> Result<Expression> {
        let negate = self.match_token(TokenType::Not);
        let token_type = self.peek_type();
        let expr = match token_type {
            TokenType::In => {
                self.advance();
                self.parse_in(left)?
            }
            TokenType::Between => {
                self.advance();
                let low = self.parse_binary(precedence::COMPARISON + 1)?;
                self.expect(TokenType::And, "AND")?;
                let high = self.parse_binary(precedence::COMPARISON + 1)?;
                Expression::Between(Box::new(Between { this: left, low, high }))
            }
            TokenType::Like | TokenType::ILike => {
                self.advance();
                let right = self.parse_binary(precedence::COMPARISON + 1)?;
                let op = Box::new(BinaryOp::new(left, right));
                let mut expr = if token_type == TokenType::Like {
                    Expression::Like(op)
                } else {
                    Expression::ILike(op)
                };
                if self.match_token(TokenType::Escape) {
                    let escape = self.parse_primary()?;
                    expr = Expression::Escape(Box::new(BinaryOp::new(expr, escape)));
                }
                expr
            }
            TokenType::Is => {
                self.advance();
                let negated = self.match_token(TokenType::Not);
                if self.match_token(TokenType::Distinct) {
                    self.expect(TokenType::From, "FROM")?;
                    let right = self.parse_binary(precedence::COMPARISON + 1)?;
                    let eq = Expression::NullSafeEq(Box::new(BinaryOp::new(left, right)));
                    // IS DISTINCT FROM is the negation of IS NOT DISTINCT FROM
                    return Ok(wrap_not(eq, negate == negated));
                }
                let right = match self.peek_type() {
                    TokenType::Null => {
                        self.advance();
                        Expression::null()
                    }
                    TokenType::True => {
                        self.advance();
                        Expression::boolean(true)
                    }
                    TokenType::False => {
                        self.advance();
                        Expression::boolean(false)
                    }
                    _ => return Err(self.error_expected(&["NULL", "TRUE", "FALSE", "DISTINCT FROM"])),
                };
                let is = Expression::Is(Box::new(BinaryOp::new(left, right)));
                return Ok(wrap_not(is, negate != negated));
            }
            other => {
                let Some(op) = self.config.binary_operators.get(&other).copied() else {
                    return Err(self.error_expected(&["IN", "BETWEEN", "LIKE"]));
                };
                self.advance();
                let right = self.parse_binary(op.precedence + 1)?;
                (op.build)(left, right)
            }
        };
        Ok(wrap_not(expr, negate))
    }

    fn parse_in(&mut self, this: Expression) -> Result<Expression> {
        self.expect(TokenType::LParen, "'('")?;
        let in_expr = if matches!(self.peek_type(), TokenType::Select | TokenType::With) {
            let query = self.parse_query()?;
            In {
                this,
                expressions: Vec::new(),
                query: Some(query),
            }
        } else {
            let expressions = if self.check(TokenType::RParen) {
                Vec::new()
            } else {
                self.parse_expression_list()?
            };
            In {
                this,
                expressions,
                query: None,
            }
        };
        self.expect(TokenType::RParen, "')'")?;
        Ok(Expression::In(Box::new(in_expr)))
    }

    fn parse_unary(&mut self) -> Result<Expression> {
        match self.peek_type() {
            TokenType::Not => {
                self.advance();
                let this = self.parse_binary(precedence::NOT)?;
                Ok(Expression::Not(Box::new(UnaryOp::new(this))))
            }
            TokenType::Dash => {
                self.advance();
                let this = self.parse_unary()?;
                Ok(Expression::Neg(Box::new(UnaryOp::new(this))))
            }
            TokenType::Plus => {
                self.advance();
                self.parse_unary()
            }
            TokenType::Tilde => {
                self.advance();
                let this = self.parse_unary()?;
                Ok(Expression::BitwiseNot(Box::new(UnaryOp::new(this))))
            }
            _ => {
                let primary = self.parse_primary()?;
                self.parse_postfix(primary)
            }
        }
    }

    /// `::type`, `[index]` and `.field` after a primary expression
    fn parse_postfix(&mut self, mut expr: Expression) -> Result<Expression> {
        loop {
            match self.peek_type() {
                TokenType::DColon => {
                    self.advance();
                    let to = self.parse_data_type()?;
                    expr = Expression::Cast(Box::new(Cast { this: expr, to }));
                }
                TokenType::LBracket => {
                    self.advance();
                    let expressions = self.parse_expression_list()?;
                    self.expect(TokenType::RBracket, "']'")?;
                    expr = Expression::Bracket(Box::new(Bracket { this: expr, expressions }));
                }
                TokenType::Dot if !matches!(expr, Expression::Column(_) | Expression::Star(_)) => {
                    self.advance();
                    let field = self.parse_any_identifier()?;
                    expr = Expression::Dot(Box::new(Dot { this: expr, field }));
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    pub fn parse_primary(&mut self) -> Result<Expression> {
        let token = self.peek().clone();
        match token.token_type {
            TokenType::Number => {
                self.advance();
                let literal = Expression::number_text(token.text.replace('_', ""));
                match &token.suffix {
                    Some(suffix) => {
                        let kind = self.config.literal_suffixes.get(suffix).cloned().ok_or_else(|| {
                            Error::unexpected(
                                "Unknown numeric suffix",
                                Vec::new(),
                                suffix.clone(),
                                token.span,
                            )
                        })?;
                        Ok(Expression::cast(literal, DataType::new(kind)))
                    }
                    None => Ok(literal),
                }
            }
            TokenType::String => {
                self.advance();
                Ok(Expression::string(self.string_value(&token)))
            }
            TokenType::HexString => {
                self.advance();
                Ok(Expression::Literal(Literal::HexString(literal_digits(&token.text))))
            }
            TokenType::BitString => {
                self.advance();
                Ok(Expression::Literal(Literal::BitString(literal_digits(&token.text))))
            }
            TokenType::True => {
                self.advance();
                Ok(Expression::boolean(true))
            }
            TokenType::False => {
                self.advance();
                Ok(Expression::boolean(false))
            }
            TokenType::Null => {
                self.advance();
                Ok(Expression::null())
            }
            TokenType::Star => {
                self.advance();
                Ok(Expression::star())
            }
            TokenType::Placeholder => {
                self.advance();
                Ok(Expression::Placeholder(Placeholder { name: None }))
            }
            TokenType::Colon if self.is_name_token(self.peek_at(1)) => {
                self.advance();
                let name = self.advance().text;
                Ok(Expression::Placeholder(Placeholder { name: Some(name) }))
            }
            TokenType::At => {
                self.advance();
                let name = self.parse_any_identifier()?.name;
                Ok(Expression::Parameter(Parameter { name }))
            }
            TokenType::LParen => self.parse_paren(),
            TokenType::LBracket => {
                self.advance();
                let items = if self.check(TokenType::RBracket) {
                    Vec::new()
                } else {
                    self.parse_expression_list()?
                };
                self.expect(TokenType::RBracket, "']'")?;
                Ok(Expression::Array(Box::new(VarArgFunc::new(items))))
            }
            TokenType::Case => self.parse_case(),
            TokenType::Cast | TokenType::TryCast => {
                self.advance();
                let try_cast = token.token_type == TokenType::TryCast || !self.config.strict_cast;
                self.parse_cast(try_cast)
            }
            TokenType::Interval => self.parse_interval(),
            TokenType::Exists => {
                self.advance();
                self.expect(TokenType::LParen, "'('")?;
                let query = self.parse_query()?;
                self.expect(TokenType::RParen, "')'")?;
                Ok(Expression::Exists(Box::new(UnaryOp::new(query))))
            }
            TokenType::If if !self.check_next(TokenType::LParen) => self.parse_if_block(),
            TokenType::If | TokenType::Left | TokenType::Right | TokenType::Replace | TokenType::Mod | TokenType::Insert
                if self.check_next(TokenType::LParen) =>
            {
                self.advance();
                self.parse_function_call(token.text)
            }
            _ if self.is_name_token(&token) => self.parse_name(),
            _ => Err(self.error_expected(&["expression"])),
        }
    }

    fn parse_paren(&mut self) -> Result<Expression> {
        self.expect(TokenType::LParen, "'('")?;
        if matches!(self.peek_type(), TokenType::Select | TokenType::With) {
            let query = self.parse_query()?;
            self.expect(TokenType::RParen, "')'")?;
            return Ok(Expression::Subquery(Box::new(Subquery { this: query, alias: None })));
        }
        if self.match_token(TokenType::RParen) {
            return Ok(Expression::Tuple(Box::new(VarArgFunc::new(Vec::new()))));
        }
        let first = self.parse_expression()?;
        if self.match_token(TokenType::Comma) {
            let mut items = vec![first];
            items.extend(self.parse_expression_list()?);
            self.expect(TokenType::RParen, "')'")?;
            return Ok(Expression::Tuple(Box::new(VarArgFunc::new(items))));
        }
        self.expect(TokenType::RParen, "')'")?;
        Ok(Expression::paren(first))
    }

    fn parse_case(&mut self) -> Result<Expression> {
        self.expect(TokenType::Case, "CASE")?;
        let operand = if self.check(TokenType::When) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        let mut whens = Vec::new();
        while self.match_token(TokenType::When) {
            let condition = self.parse_expression()?;
            self.expect(TokenType::Then, "THEN")?;
            let result = self.parse_expression()?;
            whens.push((condition, result));
        }
        if whens.is_empty() {
            return Err(self.error_expected(&["WHEN"]));
        }
        let default = if self.match_token(TokenType::Else) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.expect(TokenType::End, "END")?;
        Ok(Expression::Case(Box::new(Case {
            operand,
            whens,
            default,
        })))
    }

    /// `IF c THEN t [ELSEIF c THEN t ...] [ELSE f] END`
    fn parse_if_block(&mut self) -> Result<Expression> {
        self.expect(TokenType::If, "IF")?;
        let mut whens = Vec::new();
        loop {
            let condition = self.parse_expression()?;
            self.expect(TokenType::Then, "THEN")?;
            whens.push((condition, self.parse_expression()?));
            if !self.peek().text.eq_ignore_ascii_case("ELSEIF") {
                break;
            }
            self.advance();
        }
        let default = if self.match_token(TokenType::Else) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.expect(TokenType::End, "END")?;
        if whens.len() == 1 {
            let (condition, true_value) = whens.remove(0);
            return Ok(Expression::If(Box::new(IfFunc {
                condition,
                true_value,
                false_value: default,
            })));
        }
        Ok(Expression::Case(Box::new(Case {
            operand: None,
            whens,
            default,
        })))
    }

    fn parse_cast(&mut self, try_cast: bool) -> Result<Expression> {
        self.expect(TokenType::LParen, "'('")?;
        let this = self.parse_expression()?;
        self.expect(TokenType::As, "AS")?;
        let to = self.parse_data_type()?;
        self.expect(TokenType::RParen, "')'")?;
        let cast = Box::new(Cast { this, to });
        Ok(if try_cast {
            Expression::TryCast(cast)
        } else {
            Expression::Cast(cast)
        })
    }

    fn parse_interval(&mut self) -> Result<Expression> {
        self.expect(TokenType::Interval, "INTERVAL")?;
        let this = self.parse_unary()?;
        let unit = if INTERVAL_UNITS.iter().any(|u| self.check_word(u)) {
            Some(self.advance().text.to_uppercase())
        } else {
            None
        };
        Ok(Expression::Interval(Box::new(Interval { this, unit })))
    }

    /// Column reference, dotted path, function call or special form starting with a name
    fn parse_name(&mut self) -> Result<Expression> {
        let token = self.peek().clone();
        let upper = token.text.to_uppercase();
        let quoted = token.token_type == TokenType::Identifier;

        if !quoted {
            match upper.as_str() {
                "ARRAY" if self.check_next(TokenType::LBracket) => {
                    self.current += 2;
                    let items = if self.check(TokenType::RBracket) {
                        Vec::new()
                    } else {
                        self.parse_expression_list()?
                    };
                    self.expect(TokenType::RBracket, "']'")?;
                    return Ok(Expression::Array(Box::new(VarArgFunc::new(items))));
                }
                "DATE" | "TIMESTAMP" | "TIME" | "DATETIME" if self.check_next(TokenType::String) => {
                    self.advance();
                    let value = self.parse_string()?;
                    let kind = self
                        .config
                        .type_names
                        .get(&upper)
                        .cloned()
                        .unwrap_or_else(|| DataTypeKind::Custom(upper.clone()));
                    return Ok(Expression::cast(Expression::string(value), DataType::new(kind)));
                }
                "CURRENT_DATE" if !self.check_next(TokenType::LParen) => {
                    self.advance();
                    return Ok(Expression::CurrentDate(CurrentDate));
                }
                "CURRENT_TIMESTAMP" if !self.check_next(TokenType::LParen) => {
                    self.advance();
                    return Ok(Expression::CurrentTimestamp(CurrentTimestamp));
                }
                "SAFE_CAST" if self.check_next(TokenType::LParen) => {
                    self.advance();
                    return self.parse_cast(true);
                }
                "EXTRACT" if self.check_next(TokenType::LParen) => {
                    self.current += 2;
                    let field = self.parse_any_identifier()?.name.to_uppercase();
                    self.expect(TokenType::From, "FROM")?;
                    let this = self.parse_expression()?;
                    self.expect(TokenType::RParen, "')'")?;
                    return Ok(Expression::Extract(Box::new(Extract { field, this })));
                }
                "POSITION" if self.check_next(TokenType::LParen) => {
                    self.current += 2;
                    let first = self.parse_binary(precedence::COMPARISON + 1)?;
                    // POSITION(haystack, needle[, start])
                    if self.match_token(TokenType::Comma) {
                        let substr = self.parse_expression()?;
                        let position = match self.match_token(TokenType::Comma) {
                            true => Some(self.parse_expression()?),
                            false => None,
                        };
                        self.expect(TokenType::RParen, "')'")?;
                        return Ok(Expression::StrPosition(Box::new(StrPosition {
                            this: first,
                            substr,
                            position,
                        })));
                    }
                    self.expect(TokenType::In, "IN")?;
                    let this = self.parse_expression()?;
                    self.expect(TokenType::RParen, "')'")?;
                    return Ok(Expression::StrPosition(Box::new(StrPosition {
                        this,
                        substr: first,
                        position: None,
                    })));
                }
                _ => {}
            }
        }

        if self.check_next(TokenType::LParen) {
            self.advance();
            return self.parse_function_call(token.text);
        }

        let first = self.parse_identifier()?;
        if !self.check(TokenType::Dot) {
            return Ok(Expression::Column(Column {
                name: first,
                table: None,
            }));
        }

        // Dotted path: t.c, t.*, db.t.c ...
        let mut parts = vec![first];
        while self.check(TokenType::Dot) {
            if self.check_next(TokenType::Star) {
                self.current += 2;
                let table = parts.pop();
                return Ok(Expression::Star(Star { table }));
            }
            self.advance();
            parts.push(self.parse_any_identifier()?);
        }
        let mut parts = parts.into_iter();
        let table = parts.next();
        let name = parts.next().unwrap_or_else(|| Identifier::new(""));
        let mut expr = Expression::Column(Column { name, table });
        for field in parts {
            expr = Expression::Dot(Box::new(Dot { this: expr, field }));
        }
        Ok(expr)
    }

    /// Function call after its name: arguments, builder lookup, FILTER and OVER.
    pub fn parse_function_call(&mut self, name: String) -> Result<Expression> {
        let name_span = self
            .current
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map_or(self.peek().span, |token| token.span);
        self.expect(TokenType::LParen, "'('")?;
        let upper = name.to_uppercase();
        let distinct = self.match_token(TokenType::Distinct);

        let mut args = Vec::new();
        if !self.check(TokenType::RParen) {
            loop {
                args.push(self.parse_function_arg()?);
                if !self.match_token(TokenType::Comma) {
                    // SUBSTRING(x FROM a FOR b)
                    if (upper == "SUBSTRING" || upper == "SUBSTR") && self.match_token(TokenType::From) {
                        args.push(self.parse_expression()?);
                        if self.match_word("FOR") {
                            args.push(self.parse_expression()?);
                        }
                    }
                    // GROUP_CONCAT(x SEPARATOR ',')
                    if upper == "GROUP_CONCAT" && self.match_word("SEPARATOR") {
                        args.push(self.parse_expression()?);
                    }
                    break;
                }
            }
        }
        self.expect(TokenType::RParen, "')'")?;

        // Parametric aggregate `name(params)(args)`: the builder sees args, then params
        if !distinct && self.check(TokenType::LParen) {
            self.advance();
            let mut values = Vec::new();
            if !self.check(TokenType::RParen) {
                values = self.parse_expression_list()?;
            }
            self.expect(TokenType::RParen, "')'")?;
            if !self.config.functions.contains_key(&upper) {
                return Err(Error::parse(format!("Unknown parametric aggregate {name}")).located(&name, name_span));
            }
            values.append(&mut args);
            args = values;
        }

        let located = |e: Error| e.located(&name, name_span);
        let mut expr = match self.config.functions.get(&upper) {
            Some(builder) if !distinct => builder(args, self.config).map_err(located)?,
            Some(builder) if upper == "GROUP_CONCAT" => match builder(args, self.config).map_err(located)? {
                Expression::GroupConcat(mut g) => {
                    g.distinct = true;
                    Expression::GroupConcat(g)
                }
                other => other,
            },
            _ => Expression::Function(Box::new(Function {
                name,
                args,
                distinct,
            })),
        };

        if self.check(TokenType::Filter) && self.check_next(TokenType::LParen) {
            self.current += 2;
            self.expect(TokenType::Where, "WHERE")?;
            let condition = self.parse_expression()?;
            self.expect(TokenType::RParen, "')'")?;
            expr = Expression::Filter(Box::new(Filter { this: expr, condition }));
        }

        if self.match_token(TokenType::Over) {
            expr = self.parse_window(expr)?;
        }
        Ok(expr)
    }

    fn parse_function_arg(&mut self) -> Result<Expression> {
        if let Some(params) = self.lambda_params() {
            let body = self.parse_expression()?;
            return Ok(Expression::Lambda(Box::new(Lambda { params, body })));
        }
        self.parse_expression()
    }

    /// Consume `x ->` or `(a, b) ->` when a lambda starts here
    fn lambda_params(&mut self) -> Option<Vec<Identifier>> {
        if self.is_name_token(self.peek()) && self.check_next(TokenType::Arrow) {
            let token = self.advance();
            self.advance();
            let id = if token.token_type == TokenType::Identifier {
                Identifier::quoted(unescape_identifier(&token.text))
            } else {
                Identifier::new(token.text)
            };
            return Some(vec![id]);
        }
        if !self.check(TokenType::LParen) {
            return None;
        }
        let mut offset = 1;
        loop {
            if !self.is_name_token(self.peek_at(offset)) {
                return None;
            }
            offset += 1;
            match self.peek_at(offset).token_type {
                TokenType::Comma => offset += 1,
                TokenType::RParen => break,
                _ => return None,
            }
        }
        if self.peek_at(offset + 1).token_type != TokenType::Arrow {
            return None;
        }
        self.advance();
        let mut params = Vec::new();
        loop {
            let token = self.advance();
            params.push(if token.token_type == TokenType::Identifier {
                Identifier::quoted(unescape_identifier(&token.text))
            } else {
                Identifier::new(token.text)
            });
            if self.advance().token_type == TokenType::RParen {
                break;
            }
        }
        self.advance();
        Some(params)
    }

    fn parse_window(&mut self, this: Expression) -> Result<Expression> {
        self.expect(TokenType::LParen, "'('")?;
        let mut window = Window {
            this,
            partition_by: Vec::new(),
            order_by: Vec::new(),
            frame: None,
        };
        if self.check(TokenType::Partition) && self.check_next(TokenType::By) {
            self.current += 2;
            window.partition_by = self.parse_expression_list()?;
        }
        if self.check(TokenType::Order) && self.check_next(TokenType::By) {
            self.current += 2;
            window.order_by = self.parse_ordered_list()?;
        }
        let kind = if self.match_word("ROWS") {
            Some(FrameKind::Rows)
        } else if self.match_word("RANGE") {
            Some(FrameKind::Range)
        } else {
            None
        };
        if let Some(kind) = kind {
            let (start, end) = if self.match_token(TokenType::Between) {
                let start = self.parse_frame_bound()?;
                self.expect(TokenType::And, "AND")?;
                (start, Some(self.parse_frame_bound()?))
            } else {
                (self.parse_frame_bound()?, None)
            };
            window.frame = Some(WindowFrame { kind, start, end });
        }
        self.expect(TokenType::RParen, "')'")?;
        Ok(Expression::Window(Box::new(window)))
    }

    fn parse_frame_bound(&mut self) -> Result<FrameBound> {
        if self.match_words(&["UNBOUNDED", "PRECEDING"]) {
            return Ok(FrameBound::UnboundedPreceding);
        }
        if self.match_words(&["UNBOUNDED", "FOLLOWING"]) {
            return Ok(FrameBound::UnboundedFollowing);
        }
        if self.match_words(&["CURRENT", "ROW"]) {
            return Ok(FrameBound::CurrentRow);
        }
        let value = self.parse_binary(precedence::ADDITIVE)?;
        if self.match_word("PRECEDING") {
            Ok(FrameBound::Preceding(value))
        } else if self.match_word("FOLLOWING") {
            Ok(FrameBound::Following(value))
        } else {
            Err(self.error_expected(&["PRECEDING", "FOLLOWING"]))
        }
    }

    // -----------------------------------------------------------------------
    // Types
    // -----------------------------------------------------------------------

    /// A type name with optional parameters, nested types and `[]` suffixes.
    pub fn parse_data_type(&mut self) -> Result<DataType> {
        let name = self.parse_any_identifier()?;
        let mut upper = name.name.to_uppercase();

        if upper == "DOUBLE" && self.match_word("PRECISION") {
            upper = "DOUBLE".to_string();
        } else if (upper == "CHARACTER" || upper == "CHAR") && self.match_word("VARYING") {
            upper = "VARCHAR".to_string();
        } else if upper == "TIMESTAMP" {
            if self.match_words(&["WITH", "TIME", "ZONE"]) {
                upper = "TIMESTAMPTZ".to_string();
            } else if self.match_words(&["WITH", "LOCAL", "TIME", "ZONE"]) {
                upper = "TIMESTAMPLTZ".to_string();
            } else if self.match_words(&["WITHOUT", "TIME", "ZONE"]) {
                upper = "TIMESTAMP".to_string();
            }
        }

        let kind = match self.config.type_names.get(&upper) {
            Some(kind) => kind.clone(),
            None if name.quoted => DataTypeKind::Custom(name.name),
            None => DataTypeKind::Custom(upper),
        };
        let mut data_type = DataType::new(kind);

        if data_type.kind.is_nested() && self.match_token(TokenType::Lt) {
            data_type.nested = self.parse_nested_types(&data_type.kind)?;
            self.expect_closing_angle()?;
        } else if self.match_token(TokenType::LParen) {
            if data_type.kind.is_nested() {
                data_type.nested = self.parse_nested_types(&data_type.kind)?;
            } else {
                data_type.params = self.parse_expression_list()?;
            }
            self.expect(TokenType::RParen, "')'")?;
        }

        while self.check(TokenType::LBracket) && self.check_next(TokenType::RBracket) {
            self.current += 2;
            let mut array = DataType::new(DataTypeKind::Array);
            array.nested = vec![Expression::DataType(data_type)];
            data_type = array;
        }
        Ok(data_type)
    }

    fn parse_nested_types(&mut self, kind: &DataTypeKind) -> Result<Vec<Expression>> {
        let mut items = Vec::new();
        loop {
            if *kind == DataTypeKind::Struct {
                let name = self.parse_any_identifier()?;
                self.match_token(TokenType::Colon);
                let field_type = self.parse_data_type()?;
                items.push(Expression::ColumnDef(Box::new(ColumnDef {
                    name,
                    data_type: Some(field_type),
                    constraints: Vec::new(),
                })));
            } else {
                items.push(Expression::DataType(self.parse_data_type()?));
            }
            if !self.match_token(TokenType::Comma) {
                break;
            }
        }
        Ok(items)
    }

    /// Accept `>`, splitting a `>>` token produced by nested generics
    fn expect_closing_angle(&mut self) -> Result<()> {
        match self.peek_type() {
            TokenType::Gt => {
                self.advance();
                Ok(())
            }
            TokenType::RShift => {
                if let Some(token) = self.tokens.get_mut(self.current) {
                    token.token_type = TokenType::Gt;
                    token.text = ">".to_string();
                    token.span.start += 1;
                }
                Ok(())
            }
            TokenType::Gte => {
                if let Some(token) = self.tokens.get_mut(self.current) {
                    token.token_type = TokenType::Eq;
                    token.text = "=".to_string();
                    token.span.start += 1;
                }
                Ok(())
            }
            _ => Err(self.error_expected(&["'>'"])),
        }
    }
}

fn wrap_not(expr: Expression, negate: bool) -> Expression {
    if negate {
        Expression::Not(Box::new(UnaryOp::new(expr)))
    } else {
        expr
    }
}

fn strip_quotes(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    if chars.len() >= 2 {
        chars[1..chars.len() - 1].iter().collect()
    } else {
        raw.to_string()
    }
}

/// Digits of `'1F'` (from `X'1F'`) or `1F` (from `0x1F`)
fn literal_digits(text: &str) -> String {
    if text.starts_with('\'') {
        strip_quotes(text)
    } else {
        text.to_string()
    }
}

fn table_from_parts(mut parts: Vec<Identifier>) -> TableRef {
    let name = parts.pop().unwrap_or_else(|| Identifier::new(""));
    let schema = parts.pop();
    let catalog = parts.pop();
    TableRef {
        name,
        schema,
        catalog,
        alias: None,
        sample: None,
    }
}

/// Map well-known property keys onto typed properties
fn typed_property(key: String, value: Expression) -> Property {
    let upper = key.to_uppercase();
    match (upper.as_str(), value) {
        ("FORMAT", Expression::Literal(Literal::String(format))) => Property::FileFormat(format),
        ("PARTITIONED_BY", Expression::Array(columns)) => Property::PartitionedBy(
            columns
                .expressions
                .into_iter()
                .map(|c| match c {
                    Expression::Literal(Literal::String(name)) => Expression::column(name),
                    other => other,
                })
                .collect(),
        ),
        ("LOCATION", Expression::Literal(Literal::String(location))) => Property::Location(location),
        ("COMMENT", Expression::Literal(Literal::String(comment))) => Property::Comment(comment),
        (_, value) => Property::Generic { key, value },
    }
}

/// Put a WITH clause on the leftmost SELECT of a query
fn attach_with(query: &mut Expression, with: With) -> Result<()> {
    match query {
        Expression::Select(select) => {
            select.with = Some(with);
            Ok(())
        }
        Expression::Union(op) | Expression::Intersect(op) | Expression::Except(op) => {
            attach_with(&mut op.left, with)
        }
        Expression::Subquery(sub) => attach_with(&mut sub.this, with),
        _ => Err(Error::parse("WITH must be followed by a SELECT")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::Tokenizer;

    fn parse(sql: &str) -> Vec<Expression> {
        let config = ParserConfig::default();
        let tokens = Tokenizer::default().tokenize(sql).unwrap();
        Parser::new(&config, ParseOptions::default())
            .with_source(sql)
            .parse(tokens)
            .unwrap()
    }

    fn parse_one(sql: &str) -> Expression {
        parse(sql).remove(0)
    }

    fn parse_err(sql: &str) -> Error {
        let config = ParserConfig::default();
        let tokens = Tokenizer::default().tokenize(sql).unwrap();
        Parser::new(&config, ParseOptions::default())
            .parse(tokens)
            .unwrap_err()
    }

    #[test]
    fn test_precedence() {
        let expr = parse_one("a + b * c");
        let Expression::Add(add) = expr else {
            panic!("expected Add");
        };
        assert!(matches!(add.right, Expression::Mul(_)));

        let expr = parse_one("x & 1 > 0");
        let Expression::Gt(gt) = expr else {
            panic!("expected Gt");
        };
        assert!(matches!(gt.left, Expression::BitwiseAnd(_)));
    }

    #[test]
    fn test_not_binds_looser_than_comparison() {
        let expr = parse_one("NOT a = 1 AND b");
        let Expression::And(and) = expr else {
            panic!("expected And");
        };
        assert!(matches!(and.left, Expression::Not(_)));
    }

    #[test]
    fn test_select_clauses() {
        let expr = parse_one("SELECT DISTINCT a AS x, b y FROM t WHERE a > 1 GROUP BY a HAVING COUNT(*) > 1 ORDER BY a DESC LIMIT 5");
        let Expression::Select(select) = expr else {
            panic!("expected Select");
        };
        assert!(select.distinct.is_some());
        assert_eq!(select.expressions.len(), 2);
        assert_eq!(select.expressions[1].output_name(), Some("y"));
        assert_eq!(select.from.len(), 1);
        assert!(select.where_clause.is_some());
        assert_eq!(select.group_by.len(), 1);
        assert!(select.having.is_some());
        assert_eq!(select.limit, Some(Expression::number(5)));
        let Expression::Ordered(ordered) = &select.order_by[0] else {
            panic!("expected Ordered");
        };
        assert!(ordered.desc);
        // Default ordering is nulls-are-small: DESC puts NULLs last
        assert!(!ordered.nulls_first);
    }

    #[test]
    fn test_multiple_statements() {
        let statements = parse("SELECT 1; SELECT 2;");
        assert_eq!(statements.len(), 2);
    }

    #[test]
    fn test_joins() {
        let expr = parse_one("SELECT * FROM a LEFT OUTER JOIN b ON a.id = b.id CROSS JOIN c");
        let Expression::Select(select) = expr else {
            panic!("expected Select");
        };
        assert_eq!(select.joins.len(), 2);
        assert_eq!(select.joins[0].kind, JoinKind::Left);
        assert!(select.joins[0].on.is_some());
        assert_eq!(select.joins[1].kind, JoinKind::Cross);
    }

    #[test]
    fn test_set_operation_takes_trailing_order() {
        let expr = parse_one("SELECT a FROM x UNION ALL SELECT a FROM y ORDER BY a LIMIT 1");
        let Expression::Union(union) = expr else {
            panic!("expected Union");
        };
        assert!(!union.distinct);
        assert_eq!(union.order_by.len(), 1);
        assert!(union.limit.is_some());
    }

    #[test]
    fn test_range_operators() {
        assert!(matches!(parse_one("a NOT IN (1, 2)"), Expression::Not(_)));
        assert!(matches!(parse_one("a BETWEEN 1 AND 2"), Expression::Between(_)));
        assert!(matches!(parse_one("a IS NOT NULL"), Expression::Not(_)));
        assert!(matches!(parse_one("a LIKE 'x%'"), Expression::Like(_)));
        assert!(matches!(parse_one("a IN (SELECT 1)"), Expression::In(_)));
    }

    #[test]
    fn test_lambda_argument() {
        let expr = parse_one("TRANSFORM(xs, (a, b) -> a + b)");
        let Expression::Function(f) = expr else {
            panic!("expected Function");
        };
        let Expression::Lambda(lambda) = &f.args[1] else {
            panic!("expected Lambda");
        };
        assert_eq!(lambda.params.len(), 2);
    }

    #[test]
    fn test_function_builders() {
        assert!(matches!(parse_one("COALESCE(a, b, c)"), Expression::Coalesce(_)));
        assert!(matches!(parse_one("TS_OR_DS_ADD(x, 1, 'DAY')"), Expression::TsOrDsAdd(_)));
        assert!(matches!(parse_one("my_udf(1)"), Expression::Function(_)));
        let Expression::Function(count) = parse_one("COUNT(DISTINCT a)") else {
            panic!("expected Function");
        };
        assert!(count.distinct);
    }

    #[test]
    fn test_window() {
        let expr = parse_one("ROW_NUMBER() OVER (PARTITION BY a ORDER BY b ROWS BETWEEN UNBOUNDED PRECEDING AND CURRENT ROW)");
        let Expression::Window(window) = expr else {
            panic!("expected Window");
        };
        assert_eq!(window.partition_by.len(), 1);
        let frame = window.frame.expect("frame");
        assert_eq!(frame.start, FrameBound::UnboundedPreceding);
        assert_eq!(frame.end, Some(FrameBound::CurrentRow));
    }

    #[test]
    fn test_nested_type_closing_shift() {
        let expr = parse_one("CAST(x AS ARRAY<ARRAY<INT>>)");
        let Expression::Cast(cast) = expr else {
            panic!("expected Cast");
        };
        assert_eq!(cast.to.kind, DataTypeKind::Array);
        let Expression::DataType(inner) = &cast.to.nested[0] else {
            panic!("expected nested type");
        };
        assert_eq!(inner.kind, DataTypeKind::Array);
    }

    #[test]
    fn test_table_sample_before_or_after_alias() {
        for sql in ["SELECT * FROM x TABLESAMPLE(10) y", "SELECT * FROM x AS y TABLESAMPLE(10)"] {
            let Expression::Select(select) = parse_one(sql) else {
                panic!("expected Select");
            };
            let Expression::Table(table) = &select.from[0] else {
                panic!("expected Table");
            };
            assert_eq!(table.alias.as_ref().map(|a| a.name.name.as_str()), Some("y"));
            assert_eq!(
                table.sample.as_ref().and_then(|s| s.size.clone()),
                Some(Expression::number(10))
            );
        }
    }

    #[test]
    fn test_error_names_expected_and_found() {
        let err = parse_err("SELECT (1 FROM t");
        match err {
            Error::Parse { expected, found, span, .. } => {
                assert!(expected.contains(&"')'".to_string()));
                assert_eq!(found, "FROM");
                assert_eq!(span.map(|s| s.start), Some(10));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_lenient_keeps_unparsed_text() {
        let sql = "SELECT 1; SELECT (1 FROM t; SELECT 2";
        let config = ParserConfig::default();
        let tokens = Tokenizer::default().tokenize(sql).unwrap();
        let statements = Parser::new(&config, ParseOptions::lenient())
            .with_source(sql)
            .parse(tokens)
            .unwrap();
        assert_eq!(statements.len(), 3);
        assert_eq!(
            statements[1],
            Expression::Unparsed(Unparsed {
                text: "SELECT (1 FROM t".to_string()
            })
        );
        assert!(matches!(statements[2], Expression::Select(_)));
    }

    #[test]
    fn test_command_keeps_raw_text() {
        let Expression::Command(cmd) = parse_one("SHOW TABLES IN db") else {
            panic!("expected Command");
        };
        assert_eq!(cmd.this, "SHOW");
        assert_eq!(cmd.expression, "TABLES IN db");
    }

    #[test]
    fn test_null_ordering() {
        assert!(NullOrdering::NullsAreSmall.nulls_first(false));
        assert!(!NullOrdering::NullsAreSmall.nulls_first(true));
        assert!(NullOrdering::NullsAreLarge.nulls_first(true));
        assert!(!NullOrdering::NullsAreLast.nulls_first(true));
    }
}
