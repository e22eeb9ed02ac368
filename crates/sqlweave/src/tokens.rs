//! Token types and tokenization for SQL parsing
//!
//! This module defines the SQL token kinds and the configurable tokenizer that
//! turns SQL text into a flat token stream. All dialect differences at the
//! lexical level (quote characters, identifier delimiters, keyword tables,
//! escape rules and numeric literal suffixes) live in [`TokenizerConfig`].
//!
//! String literals and quoted identifiers keep their raw lexeme, delimiters
//! included. Escape decoding happens at the point of use via
//! [`unescape_string`] and [`unescape_identifier`].

use crate::error::{Error, Result};
use crate::trie::Trie;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Represents a position in the source SQL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    /// Starting character offset
    pub start: usize,
    /// Ending character offset (exclusive)
    pub end: usize,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub column: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize, column: usize) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }
}

/// A token in the SQL token stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub token_type: TokenType,
    /// The raw lexeme. Strings and quoted identifiers include their delimiters.
    pub text: String,
    pub span: Span,
    /// Comments that appeared before this token
    #[serde(default)]
    pub comments: Vec<String>,
    /// Numeric literal type suffix, upper-cased (e.g. `L` for `10L`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
}

impl Token {
    /// Create a new token
    pub fn new(token_type: TokenType, text: impl Into<String>, span: Span) -> Self {
        Self {
            token_type,
            text: text.into(),
            span,
            comments: Vec::new(),
            suffix: None,
        }
    }

    /// Create a NUMBER token
    pub fn number(n: i64) -> Self {
        Self::new(TokenType::Number, n.to_string(), Span::default())
    }

    /// Create a VAR token
    pub fn var(s: impl Into<String>) -> Self {
        Self::new(TokenType::Var, s, Span::default())
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comments.push(comment.into());
        self
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self.token_type, self.text)
    }
}

/// All token kinds produced by the tokenizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u16)]
pub enum TokenType {
    // Punctuation
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Dot,
    Semicolon,
    Colon,
    DColon,
    At,

    // Operators
    Star,
    Slash,
    Percent,
    Plus,
    Dash,
    Caret,
    Amp,
    Pipe,
    DPipe,
    Tilde,
    Eq,
    Neq,
    NullSafeEq,
    Lt,
    Lte,
    Gt,
    Gte,
    LShift,
    RShift,
    Arrow,
    DArrow,
    FArrow,
    /// `@>`, only in dialects that register it
    AtGt,
    Placeholder,

    // Literals and names
    String,
    Number,
    HexString,
    BitString,
    Identifier,
    Var,

    // Keywords
    All,
    And,
    Anti,
    As,
    Asc,
    Between,
    By,
    Cache,
    Case,
    Cast,
    Cluster,
    Collate,
    Command,
    Constraint,
    Create,
    Cross,
    Default,
    Delete,
    Desc,
    Distinct,
    Distribute,
    Div,
    Drop,
    Else,
    End,
    Escape,
    Except,
    Exists,
    False,
    Fetch,
    Filter,
    From,
    Full,
    Group,
    Having,
    If,
    ILike,
    In,
    Inner,
    Insert,
    Intersect,
    Interval,
    Into,
    Is,
    Join,
    Lateral,
    Left,
    Like,
    Limit,
    Mod,
    Natural,
    Not,
    Null,
    Offset,
    On,
    Or,
    Order,
    Outer,
    Over,
    Overwrite,
    Partition,
    Primary,
    Qualify,
    Recursive,
    Replace,
    Right,
    RLike,
    Select,
    Semi,
    Set,
    Sort,
    Table,
    Tablesample,
    Temporary,
    Then,
    Top,
    True,
    TryCast,
    Union,
    Unique,
    Update,
    Use,
    Using,
    Values,
    View,
    When,
    Where,
    With,

    /// End of input marker, never produced by the tokenizer itself
    Eof,
}

impl TokenType {
    /// Returns true for word tokens that came from the keyword table
    pub fn is_keyword(&self) -> bool {
        (*self as u16) >= (TokenType::All as u16) && (*self as u16) < (TokenType::Eof as u16)
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            TokenType::Eq
                | TokenType::Neq
                | TokenType::NullSafeEq
                | TokenType::Lt
                | TokenType::Lte
                | TokenType::Gt
                | TokenType::Gte
        )
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            TokenType::Plus | TokenType::Dash | TokenType::Star | TokenType::Slash | TokenType::Percent
        )
    }

    /// Tokens that can open a string literal
    pub fn is_string(&self) -> bool {
        matches!(self, TokenType::String | TokenType::HexString | TokenType::BitString)
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Tokenizer configuration for a dialect
#[derive(Debug, Clone)]
pub struct TokenizerConfig {
    /// Keywords mapping (uppercase keyword -> token type)
    pub keywords: HashMap<String, TokenType>,
    /// Single character tokens
    pub single_tokens: HashMap<char, TokenType>,
    /// Multi-character operators, matched longest-first
    pub operators: HashMap<String, TokenType>,
    /// String quote delimiters (start -> end)
    pub quotes: HashMap<String, String>,
    /// Identifier quote characters (start -> end)
    pub identifiers: HashMap<char, char>,
    /// Characters that escape the following quote or escape character
    pub string_escapes: Vec<char>,
    /// Whether block comments nest
    pub nested_comments: bool,
    /// Whether `#` starts a line comment
    pub hash_comments: bool,
    /// Recognized numeric literal suffixes, upper-cased (e.g. `L`, `BD`)
    pub numeric_suffixes: HashSet<String>,
    /// Whether unquoted identifiers may start with a digit (`1a`)
    pub identifiers_can_start_with_digit: bool,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        let keywords = [
            ("ALL", TokenType::All),
            ("AND", TokenType::And),
            ("ANTI", TokenType::Anti),
            ("AS", TokenType::As),
            ("ASC", TokenType::Asc),
            ("BETWEEN", TokenType::Between),
            ("BY", TokenType::By),
            ("CASE", TokenType::Case),
            ("CAST", TokenType::Cast),
            ("CLUSTER", TokenType::Cluster),
            ("COLLATE", TokenType::Collate),
            ("CONSTRAINT", TokenType::Constraint),
            ("CREATE", TokenType::Create),
            ("CROSS", TokenType::Cross),
            ("DEFAULT", TokenType::Default),
            ("DELETE", TokenType::Delete),
            ("DESC", TokenType::Desc),
            ("DISTINCT", TokenType::Distinct),
            ("DISTRIBUTE", TokenType::Distribute),
            ("DROP", TokenType::Drop),
            ("ELSE", TokenType::Else),
            ("END", TokenType::End),
            ("ESCAPE", TokenType::Escape),
            ("EXCEPT", TokenType::Except),
            ("EXISTS", TokenType::Exists),
            ("FALSE", TokenType::False),
            ("FETCH", TokenType::Fetch),
            ("FILTER", TokenType::Filter),
            ("FROM", TokenType::From),
            ("FULL", TokenType::Full),
            ("GROUP", TokenType::Group),
            ("HAVING", TokenType::Having),
            ("IF", TokenType::If),
            ("ILIKE", TokenType::ILike),
            ("IN", TokenType::In),
            ("INNER", TokenType::Inner),
            ("INSERT", TokenType::Insert),
            ("INTERSECT", TokenType::Intersect),
            ("INTERVAL", TokenType::Interval),
            ("INTO", TokenType::Into),
            ("IS", TokenType::Is),
            ("JOIN", TokenType::Join),
            ("LATERAL", TokenType::Lateral),
            ("LEFT", TokenType::Left),
            ("LIKE", TokenType::Like),
            ("LIMIT", TokenType::Limit),
            ("NATURAL", TokenType::Natural),
            ("NOT", TokenType::Not),
            ("NULL", TokenType::Null),
            ("OFFSET", TokenType::Offset),
            ("ON", TokenType::On),
            ("OR", TokenType::Or),
            ("ORDER", TokenType::Order),
            ("OUTER", TokenType::Outer),
            ("OVER", TokenType::Over),
            ("OVERWRITE", TokenType::Overwrite),
            ("PARTITION", TokenType::Partition),
            ("PRIMARY", TokenType::Primary),
            ("QUALIFY", TokenType::Qualify),
            ("RECURSIVE", TokenType::Recursive),
            ("REPLACE", TokenType::Replace),
            ("RIGHT", TokenType::Right),
            ("SELECT", TokenType::Select),
            ("SEMI", TokenType::Semi),
            ("SET", TokenType::Set),
            ("TABLE", TokenType::Table),
            ("TABLESAMPLE", TokenType::Tablesample),
            ("TEMPORARY", TokenType::Temporary),
            ("TEMP", TokenType::Temporary),
            ("THEN", TokenType::Then),
            ("TRUE", TokenType::True),
            ("TRY_CAST", TokenType::TryCast),
            ("UNION", TokenType::Union),
            ("UNIQUE", TokenType::Unique),
            ("UPDATE", TokenType::Update),
            ("USE", TokenType::Use),
            ("USING", TokenType::Using),
            ("VALUES", TokenType::Values),
            ("VIEW", TokenType::View),
            ("WHEN", TokenType::When),
            ("WHERE", TokenType::Where),
            ("WITH", TokenType::With),
            ("ALTER", TokenType::Command),
            ("ANALYZE", TokenType::Command),
            ("CALL", TokenType::Command),
            ("COMMENT", TokenType::Command),
            ("DESCRIBE", TokenType::Command),
            ("EXPLAIN", TokenType::Command),
            ("GRANT", TokenType::Command),
            ("REVOKE", TokenType::Command),
            ("SHOW", TokenType::Command),
            ("TRUNCATE", TokenType::Command),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let single_tokens = [
            ('(', TokenType::LParen),
            (')', TokenType::RParen),
            ('[', TokenType::LBracket),
            (']', TokenType::RBracket),
            ('{', TokenType::LBrace),
            ('}', TokenType::RBrace),
            (',', TokenType::Comma),
            ('.', TokenType::Dot),
            (';', TokenType::Semicolon),
            (':', TokenType::Colon),
            ('@', TokenType::At),
            ('*', TokenType::Star),
            ('/', TokenType::Slash),
            ('%', TokenType::Percent),
            ('+', TokenType::Plus),
            ('-', TokenType::Dash),
            ('^', TokenType::Caret),
            ('&', TokenType::Amp),
            ('|', TokenType::Pipe),
            ('~', TokenType::Tilde),
            ('=', TokenType::Eq),
            ('<', TokenType::Lt),
            ('>', TokenType::Gt),
            ('?', TokenType::Placeholder),
        ]
        .into_iter()
        .collect();

        let operators = [
            ("<=", TokenType::Lte),
            (">=", TokenType::Gte),
            ("<>", TokenType::Neq),
            ("!=", TokenType::Neq),
            ("==", TokenType::Eq),
            ("<=>", TokenType::NullSafeEq),
            ("<<", TokenType::LShift),
            (">>", TokenType::RShift),
            ("||", TokenType::DPipe),
            ("::", TokenType::DColon),
            ("->", TokenType::Arrow),
            ("->>", TokenType::DArrow),
            ("=>", TokenType::FArrow),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let mut quotes = HashMap::new();
        quotes.insert("'".to_string(), "'".to_string());

        let mut identifiers = HashMap::new();
        identifiers.insert('"', '"');

        Self {
            keywords,
            single_tokens,
            operators,
            quotes,
            identifiers,
            string_escapes: vec!['\''],
            nested_comments: true,
            hash_comments: false,
            numeric_suffixes: HashSet::new(),
            identifiers_can_start_with_digit: false,
        }
    }
}

/// SQL Tokenizer
///
/// Holds the dialect configuration plus the operator trie built from it, so
/// a tokenizer is built once per dialect bundle and reused for every call.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    config: TokenizerConfig,
    operator_trie: Trie<TokenType>,
}

impl Tokenizer {
    /// Create a new tokenizer with the given configuration
    pub fn new(config: TokenizerConfig) -> Self {
        let mut operator_trie = Trie::new();
        for (op, token_type) in &config.operators {
            operator_trie.insert(op, *token_type);
        }
        Self {
            config,
            operator_trie,
        }
    }

    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    /// Tokenize a SQL string
    pub fn tokenize(&self, sql: &str) -> Result<Vec<Token>> {
        let _span = tracing::trace_span!(target: "sqlweave::tokenize", "tokenize", len = sql.len())
            .entered();
        let mut state = TokenizerState::new(sql, &self.config, &self.operator_trie);
        state.tokenize()
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(TokenizerConfig::default())
    }
}

/// Decode a raw string lexeme (delimiters included) into its value.
///
/// An escape character followed by the closing delimiter or by another escape
/// character yields the second character. With backslash escapes, the usual
/// control sequences (`\n`, `\t`, `\r`, `\0`) are decoded and any other
/// backslash sequence is kept verbatim.
pub fn unescape_string(raw: &str, quotes: &HashMap<String, String>, escapes: &[char]) -> String {
    let Some((start, end)) = quotes
        .iter()
        .filter(|(start, end)| raw.starts_with(start.as_str()) && raw.ends_with(end.as_str()))
        .max_by_key(|(start, _)| start.len())
    else {
        return raw.to_string();
    };
    if raw.len() < start.len() + end.len() {
        return String::new();
    }
    let inner: Vec<char> = raw[start.len()..raw.len() - end.len()].chars().collect();
    if end.chars().count() != 1 {
        return inner.into_iter().collect();
    }
    let delimiter = end.chars().next().unwrap_or('\'');

    let mut value = String::with_capacity(inner.len());
    let mut i = 0;
    while i < inner.len() {
        let c = inner[i];
        if escapes.contains(&c) && i + 1 < inner.len() {
            let next = inner[i + 1];
            if next == delimiter || (c != delimiter && escapes.contains(&next)) {
                value.push(next);
                i += 2;
                continue;
            }
            if c == '\\' {
                let decoded = match next {
                    'n' => Some('\n'),
                    't' => Some('\t'),
                    'r' => Some('\r'),
                    '0' => Some('\0'),
                    _ => None,
                };
                if let Some(decoded) = decoded {
                    value.push(decoded);
                    i += 2;
                    continue;
                }
            }
        }
        value.push(c);
        i += 1;
    }
    value
}

/// Decode a raw quoted identifier lexeme, undoubling the closing delimiter.
pub fn unescape_identifier(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    if chars.len() < 2 {
        return raw.to_string();
    }
    let end = chars[chars.len() - 1];
    let inner: String = chars[1..chars.len() - 1].iter().collect();
    inner.replace(&format!("{end}{end}"), &end.to_string())
}

/// Internal state for tokenization
struct TokenizerState<'a> {
    chars: Vec<char>,
    size: usize,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    line: usize,
    column: usize,
    start_line: usize,
    start_column: usize,
    comments: Vec<String>,
    config: &'a TokenizerConfig,
    operators: &'a Trie<TokenType>,
}

impl<'a> TokenizerState<'a> {
    fn new(sql: &str, config: &'a TokenizerConfig, operators: &'a Trie<TokenType>) -> Self {
        let chars: Vec<char> = sql.chars().collect();
        let size = chars.len();
        Self {
            chars,
            size,
            tokens: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
            column: 1,
            start_line: 1,
            start_column: 1,
            comments: Vec::new(),
            config,
            operators,
        }
    }

    fn tokenize(&mut self) -> Result<Vec<Token>> {
        loop {
            self.skip_whitespace_and_comments()?;
            if self.is_at_end() {
                break;
            }
            self.start = self.current;
            self.start_line = self.line;
            self.start_column = self.column;
            self.scan_token()?;
        }

        // Comments after the last token stay with it
        if !self.comments.is_empty() {
            if let Some(last) = self.tokens.last_mut() {
                last.comments.append(&mut self.comments);
            }
        }

        Ok(std::mem::take(&mut self.tokens))
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.size
    }

    fn peek(&self) -> char {
        self.peek_at(0)
    }

    fn peek_next(&self) -> char {
        self.peek_at(1)
    }

    fn peek_at(&self, offset: usize) -> char {
        self.chars.get(self.current + offset).copied().unwrap_or('\0')
    }

    fn advance(&mut self) -> char {
        let c = self.peek();
        self.current += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        c
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::tokenize(message, self.start, self.start_line, self.start_column)
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<()> {
        while !self.is_at_end() {
            let c = self.peek();
            match c {
                c if c.is_whitespace() => {
                    self.advance();
                }
                '-' if self.peek_next() == '-' => self.scan_line_comment(2),
                '#' if self.config.hash_comments => self.scan_line_comment(1),
                '/' if self.peek_next() == '*' => self.scan_block_comment()?,
                _ => break,
            }
        }
        Ok(())
    }

    fn scan_line_comment(&mut self, marker_len: usize) {
        for _ in 0..marker_len {
            self.advance();
        }
        let start = self.current;
        while !self.is_at_end() && self.peek() != '\n' {
            self.advance();
        }
        let comment: String = self.chars[start..self.current].iter().collect();
        self.comments.push(comment.trim().to_string());
    }

    fn scan_block_comment(&mut self) -> Result<()> {
        self.start = self.current;
        self.start_line = self.line;
        self.start_column = self.column;
        self.advance(); // /
        self.advance(); // *
        let content_start = self.current;
        let mut depth = 1;

        while !self.is_at_end() {
            if self.config.nested_comments && self.peek() == '/' && self.peek_next() == '*' {
                self.advance();
                self.advance();
                depth += 1;
            } else if self.peek() == '*' && self.peek_next() == '/' {
                depth -= 1;
                if depth == 0 {
                    break;
                }
                self.advance();
                self.advance();
            } else {
                self.advance();
            }
        }

        if depth > 0 {
            return Err(self.error("Unterminated block comment"));
        }

        let content: String = self.chars[content_start..self.current].iter().collect();
        self.advance(); // *
        self.advance(); // /
        self.comments.push(content.trim().to_string());
        Ok(())
    }

    fn scan_token(&mut self) -> Result<()> {
        let c = self.peek();

        if c.is_ascii_digit() || (c == '.' && self.peek_next().is_ascii_digit() && !self.after_name()) {
            return self.scan_number();
        }

        if let Some(&end) = self.config.identifiers.get(&c) {
            return self.scan_quoted_identifier(end);
        }

        if let Some((start, end)) = self.match_quote(self.current) {
            return self.scan_string(TokenType::String, 0, start, end);
        }

        // Prefixed strings: X'..' (hex), B'..' (bits), N'..' (national)
        if matches!(c, 'x' | 'X' | 'b' | 'B' | 'n' | 'N') {
            if let Some((start, end)) = self.match_quote(self.current + 1) {
                let token_type = match c {
                    'x' | 'X' => TokenType::HexString,
                    'b' | 'B' => TokenType::BitString,
                    _ => TokenType::String,
                };
                return self.scan_string(token_type, 1, start, end);
            }
        }

        if let Some((token_type, len)) = self.match_operator() {
            for _ in 0..len {
                self.advance();
            }
            self.add_token(token_type);
            return Ok(());
        }

        if let Some(&token_type) = self.config.single_tokens.get(&c) {
            self.advance();
            self.add_token(token_type);
            return Ok(());
        }

        if c.is_alphabetic() || c == '_' {
            return self.scan_identifier_or_keyword();
        }

        self.advance();
        Err(self.error(format!("Unexpected character: '{}'", c)))
    }

    /// Whether the previous character ends a name, so `.5` is a dot, not a number
    fn after_name(&self) -> bool {
        self.current > 0 && {
            let prev = self.chars[self.current - 1];
            prev.is_alphanumeric() || prev == '_' || prev == ')' || prev == ']' || prev == '`' || prev == '"'
        }
    }

    /// Longest configured quote delimiter starting at `pos`
    fn match_quote(&self, pos: usize) -> Option<(String, String)> {
        self.config
            .quotes
            .iter()
            .filter(|(start, _)| {
                start
                    .chars()
                    .enumerate()
                    .all(|(i, ch)| self.chars.get(pos + i) == Some(&ch))
            })
            .max_by_key(|(start, _)| start.len())
            .map(|(start, end)| (start.clone(), end.clone()))
    }

    /// Longest operator match via the operator trie
    fn match_operator(&self) -> Option<(TokenType, usize)> {
        self.operators
            .longest_match(&self.chars[self.current..])
            .map(|(len, token_type)| (*token_type, len))
    }

    fn scan_string(&mut self, token_type: TokenType, prefix_len: usize, start: String, end: String) -> Result<()> {
        for _ in 0..prefix_len + start.chars().count() {
            self.advance();
        }
        let end_chars: Vec<char> = end.chars().collect();
        let delimiter = end_chars[0];

        let escapes = &self.config.string_escapes;
        loop {
            if self.is_at_end() {
                return Err(self.error("Unterminated string"));
            }
            let c = self.peek();
            if end_chars.len() == 1 && escapes.contains(&c) {
                let next = self.peek_next();
                if next == delimiter || (c != delimiter && escapes.contains(&next)) {
                    self.advance();
                    self.advance();
                    continue;
                }
            }
            if end_chars
                .iter()
                .enumerate()
                .all(|(i, ch)| self.peek_at(i) == *ch)
            {
                for _ in 0..end_chars.len() {
                    self.advance();
                }
                break;
            }
            self.advance();
        }

        let text: String = self.chars[self.start + prefix_len..self.current].iter().collect();
        self.add_token_with_text(token_type, text);
        Ok(())
    }

    fn scan_quoted_identifier(&mut self, end_quote: char) -> Result<()> {
        self.advance(); // Opening quote
        loop {
            if self.is_at_end() {
                return Err(self.error("Unterminated identifier"));
            }
            if self.peek() == end_quote {
                if self.peek_next() == end_quote {
                    self.advance();
                    self.advance();
                    continue;
                }
                self.advance();
                break;
            }
            self.advance();
        }
        self.add_token(TokenType::Identifier);
        Ok(())
    }

    fn scan_number(&mut self) -> Result<()> {
        if self.peek() == '0' && self.scan_prefixed_number() {
            return Ok(());
        }

        while self.peek().is_ascii_digit() || (self.peek() == '_' && self.peek_next().is_ascii_digit()) {
            self.advance();
        }

        if self.peek() == '.' && self.peek_next() != '.' {
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        if matches!(self.peek(), 'e' | 'E') {
            let next = self.peek_next();
            if next.is_ascii_digit()
                || ((next == '+' || next == '-') && self.peek_at(2).is_ascii_digit())
            {
                self.advance();
                if matches!(self.peek(), '+' | '-') {
                    self.advance();
                }
                while self.peek().is_ascii_digit() {
                    self.advance();
                }
            }
        }

        let number_end = self.current;
        let mut word_len = 0;
        while {
            let ch = self.peek_at(word_len);
            ch.is_alphanumeric() || ch == '_'
        } {
            word_len += 1;
        }

        if word_len > 0 {
            let word: String = self.chars[number_end..number_end + word_len]
                .iter()
                .collect::<String>()
                .to_uppercase();
            if self.config.numeric_suffixes.contains(&word) {
                for _ in 0..word_len {
                    self.advance();
                }
                let text: String = self.chars[self.start..number_end].iter().collect();
                self.add_token_with_text(TokenType::Number, text);
                if let Some(last) = self.tokens.last_mut() {
                    last.suffix = Some(word);
                }
                return Ok(());
            }
            if self.config.identifiers_can_start_with_digit
                && self.chars[self.start..number_end].iter().all(|c| c.is_ascii_digit())
            {
                for _ in 0..word_len {
                    self.advance();
                }
                self.add_token(TokenType::Var);
                return Ok(());
            }
        }

        self.add_token(TokenType::Number);
        Ok(())
    }

    /// `0x1F` and `0b101` as hex and bit literals. The token text is the digits.
    fn scan_prefixed_number(&mut self) -> bool {
        let (token_type, is_digit): (TokenType, fn(char) -> bool) = match self.peek_next() {
            'x' | 'X' => (TokenType::HexString, |c| c.is_ascii_hexdigit()),
            'b' | 'B' => (TokenType::BitString, |c| c == '0' || c == '1'),
            _ => return false,
        };
        let mut len = 0;
        while {
            let ch = self.peek_at(2 + len);
            ch.is_alphanumeric() || ch == '_'
        } {
            len += 1;
        }
        if len == 0 || !(0..len).all(|i| is_digit(self.peek_at(2 + i))) {
            return false;
        }
        for _ in 0..2 + len {
            self.advance();
        }
        let digits: String = self.chars[self.start + 2..self.current].iter().collect();
        self.add_token_with_text(token_type, digits);
        true
    }

    fn scan_identifier_or_keyword(&mut self) -> Result<()> {
        while !self.is_at_end() {
            let c = self.peek();
            if c.is_alphanumeric() || c == '_' || c == '$' {
                self.advance();
            } else {
                break;
            }
        }

        let text: String = self.chars[self.start..self.current].iter().collect();
        let token_type = self
            .config
            .keywords
            .get(&text.to_uppercase())
            .copied()
            .unwrap_or(TokenType::Var);
        self.add_token_with_text(token_type, text);
        Ok(())
    }

    fn add_token(&mut self, token_type: TokenType) {
        let text: String = self.chars[self.start..self.current].iter().collect();
        self.add_token_with_text(token_type, text);
    }

    fn add_token_with_text(&mut self, token_type: TokenType, text: String) {
        let span = Span::new(self.start, self.current, self.start_line, self.start_column);
        let mut token = Token::new(token_type, text, span);
        token.comments.append(&mut self.comments);
        self.tokens.push(token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types(sql: &str) -> Vec<TokenType> {
        Tokenizer::default()
            .tokenize(sql)
            .unwrap()
            .into_iter()
            .map(|t| t.token_type)
            .collect()
    }

    #[test]
    fn test_simple_select() {
        let tokenizer = Tokenizer::default();
        let tokens = tokenizer.tokenize("SELECT 1").unwrap();

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].token_type, TokenType::Select);
        assert_eq!(tokens[1].token_type, TokenType::Number);
        assert_eq!(tokens[1].text, "1");
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        assert_eq!(
            types("select a From t"),
            vec![TokenType::Select, TokenType::Var, TokenType::From, TokenType::Var]
        );
    }

    #[test]
    fn test_multi_char_operators_longest_match() {
        assert_eq!(
            types("a <=> b <= c <> d << e ->> f"),
            vec![
                TokenType::Var,
                TokenType::NullSafeEq,
                TokenType::Var,
                TokenType::Lte,
                TokenType::Var,
                TokenType::Neq,
                TokenType::Var,
                TokenType::LShift,
                TokenType::Var,
                TokenType::DArrow,
                TokenType::Var,
            ]
        );
    }

    #[test]
    fn test_string_keeps_raw_lexeme() {
        let tokens = Tokenizer::default().tokenize("'it''s'").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].token_type, TokenType::String);
        assert_eq!(tokens[0].text, "'it''s'");
        let config = TokenizerConfig::default();
        assert_eq!(
            unescape_string(&tokens[0].text, &config.quotes, &config.string_escapes),
            "it's"
        );
    }

    #[test]
    fn test_backslash_escapes() {
        let mut config = TokenizerConfig::default();
        config.string_escapes = vec!['\\'];
        let tokens = Tokenizer::new(config.clone()).tokenize(r"'\'' '\\a' '\n'").unwrap();
        let values: Vec<String> = tokens
            .iter()
            .map(|t| unescape_string(&t.text, &config.quotes, &config.string_escapes))
            .collect();
        assert_eq!(values, vec!["'".to_string(), "\\a".to_string(), "\n".to_string()]);
    }

    #[test]
    fn test_double_quoted_string_with_inner_quotes() {
        let mut config = TokenizerConfig::default();
        config.identifiers.clear();
        config.identifiers.insert('`', '`');
        config.quotes.insert("\"".into(), "\"".into());
        config.string_escapes = vec!['\\'];
        let tokens = Tokenizer::new(config.clone()).tokenize("\"1''2\"").unwrap();
        assert_eq!(tokens[0].token_type, TokenType::String);
        assert_eq!(
            unescape_string(&tokens[0].text, &config.quotes, &config.string_escapes),
            "1''2"
        );
    }

    #[test]
    fn test_quoted_identifier() {
        let tokens = Tokenizer::default().tokenize("\"a\"\"b\"").unwrap();
        assert_eq!(tokens[0].token_type, TokenType::Identifier);
        assert_eq!(unescape_identifier(&tokens[0].text), "a\"b");
    }

    #[test]
    fn test_numeric_suffix() {
        let mut config = TokenizerConfig::default();
        config.numeric_suffixes.extend(["L".to_string(), "BD".to_string()]);
        let tokens = Tokenizer::new(config).tokenize("10L 1.5bd 2x").unwrap();
        assert_eq!(tokens[0].text, "10");
        assert_eq!(tokens[0].suffix.as_deref(), Some("L"));
        assert_eq!(tokens[1].text, "1.5");
        assert_eq!(tokens[1].suffix.as_deref(), Some("BD"));
        assert_eq!(tokens[2].suffix, None);
        assert_eq!(tokens[3].token_type, TokenType::Var);
    }

    #[test]
    fn test_comments_attach_to_next_token() {
        let tokens = Tokenizer::default().tokenize("-- lead\nSELECT /* mid */ 1").unwrap();
        assert_eq!(tokens[0].comments, vec!["lead".to_string()]);
        assert_eq!(tokens[1].comments, vec!["mid".to_string()]);
    }

    #[test]
    fn test_unterminated_string_reports_offset() {
        let err = Tokenizer::default().tokenize("SELECT 'abc").unwrap_err();
        match err {
            Error::Tokenize { offset, line, column, .. } => {
                assert_eq!(offset, 7);
                assert_eq!(line, 1);
                assert_eq!(column, 8);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unterminated_comment() {
        assert!(Tokenizer::default().tokenize("SELECT 1 /* open").is_err());
    }

    #[test]
    fn test_unexpected_character() {
        assert!(Tokenizer::default().tokenize("SELECT 1 ¤").is_err());
    }

    #[test]
    fn test_hex_string() {
        let tokens = Tokenizer::default().tokenize("X'CC'").unwrap();
        assert_eq!(tokens[0].token_type, TokenType::HexString);
        assert_eq!(tokens[0].text, "'CC'");
    }

    #[test]
    fn test_prefixed_hex_and_bit_numbers() {
        let tokens = Tokenizer::default().tokenize("0x1F 0b101 0xZZ 0").unwrap();
        assert_eq!(tokens[0].token_type, TokenType::HexString);
        assert_eq!(tokens[0].text, "1F");
        assert_eq!(tokens[0].span.end, 4);
        assert_eq!(tokens[1].token_type, TokenType::BitString);
        assert_eq!(tokens[1].text, "101");
        // not hex digits: a number followed by a name
        assert_eq!(tokens[2].token_type, TokenType::Number);
        assert_eq!(tokens[2].text, "0");
        assert_eq!(tokens[3].token_type, TokenType::Var);
        assert_eq!(tokens[4].token_type, TokenType::Number);
    }
}
