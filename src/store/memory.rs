//! In-Memory Store Adapter
//!
//! Backs tests and the file-driven CLI with real scan/query/update
//! semantics: a recursive-descent evaluator for the fixed
//! filter-expression vocabulary, fixed-size pages with continuation
//! tokens, and update-by-URL merging into the latest row.
//!
//! The evaluator implements exactly the operators the query prompt is
//! allowed to emit: `=`, `<>`, `<`, `<=`, `>`, `>=`, `AND`, `OR`,
//! `NOT`, parentheses, `IN (...)`, `contains()`, `begins_with()`,
//! `attribute_exists()`, `attribute_not_exists()`. Anything else is a
//! malformed expression and errors at execution time.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::RwLock;

use super::{Page, ScanParams, StoreAdapter};
use crate::query::PartitionKey;
use crate::types::{ArticleRecord, ArticleUpdate, Result, RiskError};

const DEFAULT_PAGE_SIZE: usize = 100;

pub struct MemoryStore {
    records: RwLock<Vec<ArticleRecord>>,
    page_size: usize,
}

impl MemoryStore {
    pub fn new(records: Vec<ArticleRecord>) -> Self {
        Self::with_page_size(records, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(records: Vec<ArticleRecord>, page_size: usize) -> Self {
        Self {
            records: RwLock::new(records),
            page_size: page_size.max(1),
        }
    }

    /// Snapshot of all records, for writing results back out
    pub fn records(&self) -> Vec<ArticleRecord> {
        self.records.read().expect("store lock poisoned").clone()
    }

    fn page_of(&self, matches: Vec<ArticleRecord>, params: &ScanParams) -> Result<Page> {
        let start = match &params.start_token {
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| RiskError::Store(format!("invalid continuation token: {}", token)))?,
            None => 0,
        };
        let per_page = self.page_size.min(params.limit.max(1) as usize);
        let end = (start + per_page).min(matches.len());
        let next = (end < matches.len()).then(|| end.to_string());

        Ok(Page {
            rows: matches.get(start..end).unwrap_or_default().to_vec(),
            next,
        })
    }

    fn filter_matches(
        &self,
        records: &[ArticleRecord],
        params: &ScanParams,
    ) -> Result<Vec<ArticleRecord>> {
        match &params.filter_expression {
            Some(expression) => {
                let evaluator = FilterEvaluator::new(
                    expression,
                    params.attribute_names.as_ref(),
                    params.attribute_values.as_ref(),
                )?;
                let mut matches = Vec::new();
                for record in records {
                    if evaluator.matches(record)? {
                        matches.push(record.clone());
                    }
                }
                Ok(matches)
            }
            None => Ok(records.to_vec()),
        }
    }
}

#[async_trait]
impl StoreAdapter for MemoryStore {
    async fn scan(&self, params: &ScanParams) -> Result<Page> {
        let records = self.records.read().expect("store lock poisoned").clone();
        let matches = self.filter_matches(&records, params)?;
        self.page_of(matches, params)
    }

    async fn query(&self, partition_key: &PartitionKey, params: &ScanParams) -> Result<Page> {
        if partition_key.name != "URL" {
            return Err(RiskError::Store(format!(
                "unknown partition key: {}",
                partition_key.name
            )));
        }
        let records: Vec<ArticleRecord> = self
            .records
            .read()
            .expect("store lock poisoned")
            .iter()
            .filter(|r| r.url == partition_key.value)
            .cloned()
            .collect();
        let matches = self.filter_matches(&records, params)?;
        self.page_of(matches, params)
    }

    async fn update_article(&self, url: &str, update: &ArticleUpdate) -> Result<()> {
        if update.is_empty() {
            return Ok(());
        }
        let mut records = self.records.write().expect("store lock poisoned");
        let target = records
            .iter_mut()
            .filter(|r| r.url == url)
            .max_by(|a, b| a.date_time.cmp(&b.date_time))
            .ok_or_else(|| RiskError::Store(format!("no record found for URL: {}", url)))?;
        update.apply_to(target);
        Ok(())
    }
}

// =============================================================================
// Filter Expression Evaluation
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    /// `#alias` attribute-name placeholder
    Name(String),
    /// `:binding` value placeholder
    Binding(String),
    StrLit(String),
    LParen,
    RParen,
    Comma,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Not,
    In,
}

struct FilterEvaluator {
    tokens: Vec<Token>,
    names: BTreeMap<String, String>,
    values: BTreeMap<String, Value>,
}

/// Parser state for one record evaluation
struct Cursor<'a> {
    evaluator: &'a FilterEvaluator,
    record: &'a ArticleRecord,
    pos: usize,
}

impl FilterEvaluator {
    fn new(
        expression: &str,
        names: Option<&BTreeMap<String, String>>,
        values: Option<&BTreeMap<String, Value>>,
    ) -> Result<Self> {
        Ok(Self {
            tokens: tokenize(expression)?,
            names: names.cloned().unwrap_or_default(),
            values: values.cloned().unwrap_or_default(),
        })
    }

    fn matches(&self, record: &ArticleRecord) -> Result<bool> {
        let mut cursor = Cursor {
            evaluator: self,
            record,
            pos: 0,
        };
        let result = cursor.or_expr()?;
        if cursor.pos != self.tokens.len() {
            return Err(malformed("trailing tokens after expression"));
        }
        Ok(result)
    }
}

fn malformed(detail: &str) -> RiskError {
    RiskError::Store(format!("malformed filter expression: {}", detail))
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<&Token> {
        self.evaluator.tokens.get(self.pos)
    }

    fn next(&mut self) -> Result<&Token> {
        let token = self
            .evaluator
            .tokens
            .get(self.pos)
            .ok_or_else(|| malformed("unexpected end of expression"))?;
        self.pos += 1;
        Ok(token)
    }

    fn expect(&mut self, expected: Token) -> Result<()> {
        let token = self.next()?;
        if *token != expected {
            return Err(malformed(&format!(
                "expected {:?}, found {:?}",
                expected, token
            )));
        }
        Ok(())
    }

    fn or_expr(&mut self) -> Result<bool> {
        let mut result = self.and_expr()?;
        while matches!(self.peek(), Some(Token::Or)) {
            self.pos += 1;
            let rhs = self.and_expr()?;
            result = result || rhs;
        }
        Ok(result)
    }

    fn and_expr(&mut self) -> Result<bool> {
        let mut result = self.unary()?;
        while matches!(self.peek(), Some(Token::And)) {
            self.pos += 1;
            let rhs = self.unary()?;
            result = result && rhs;
        }
        Ok(result)
    }

    fn unary(&mut self) -> Result<bool> {
        if matches!(self.peek(), Some(Token::Not)) {
            self.pos += 1;
            return Ok(!self.unary()?);
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<bool> {
        match self.next()?.clone() {
            Token::LParen => {
                let result = self.or_expr()?;
                self.expect(Token::RParen)?;
                Ok(result)
            }
            Token::Ident(ident) if matches!(self.peek(), Some(Token::LParen)) => {
                self.function(&ident)
            }
            Token::Ident(ident) => self.comparison(self.attribute_of_path(&ident)),
            Token::Name(alias) => {
                let resolved = self.resolve_alias(&alias)?;
                self.comparison(self.record.attribute(&resolved))
            }
            token => Err(malformed(&format!("unexpected token {:?}", token))),
        }
    }

    fn function(&mut self, name: &str) -> Result<bool> {
        self.expect(Token::LParen)?;
        let attribute = self.path_operand()?;
        let result = match name.to_ascii_lowercase().as_str() {
            "attribute_exists" => attribute.is_some(),
            "attribute_not_exists" => attribute.is_none(),
            "contains" => {
                self.expect(Token::Comma)?;
                let needle = self.value_operand()?;
                attribute.is_some_and(|haystack| haystack.contains(&needle))
            }
            "begins_with" => {
                self.expect(Token::Comma)?;
                let prefix = self.value_operand()?;
                attribute.is_some_and(|value| value.starts_with(&prefix))
            }
            other => return Err(malformed(&format!("unknown function {}", other))),
        };
        self.expect(Token::RParen)?;
        Ok(result)
    }

    /// Comparison or IN-list with the left-hand attribute already resolved
    fn comparison(&mut self, attribute: Option<String>) -> Result<bool> {
        match self.next()?.clone() {
            Token::Eq => Ok(attribute == Some(self.value_operand()?)),
            Token::Ne => {
                let operand = self.value_operand()?;
                Ok(attribute.is_some_and(|value| value != operand))
            }
            Token::Lt => self.ordered(attribute, |ord| ord.is_lt()),
            Token::Le => self.ordered(attribute, |ord| ord.is_le()),
            Token::Gt => self.ordered(attribute, |ord| ord.is_gt()),
            Token::Ge => self.ordered(attribute, |ord| ord.is_ge()),
            Token::In => {
                self.expect(Token::LParen)?;
                let mut found = false;
                loop {
                    let candidate = self.value_operand()?;
                    if attribute.as_deref() == Some(candidate.as_str()) {
                        found = true;
                    }
                    match self.next()?.clone() {
                        Token::Comma => continue,
                        Token::RParen => break,
                        token => {
                            return Err(malformed(&format!(
                                "expected ',' or ')' in IN list, found {:?}",
                                token
                            )));
                        }
                    }
                }
                Ok(found)
            }
            token => Err(malformed(&format!(
                "expected comparison operator, found {:?}",
                token
            ))),
        }
    }

    fn ordered(
        &mut self,
        attribute: Option<String>,
        accept: impl Fn(std::cmp::Ordering) -> bool,
    ) -> Result<bool> {
        let operand = self.value_operand()?;
        // Absent attributes fail every ordered comparison
        Ok(attribute.is_some_and(|value| accept(value.as_str().cmp(operand.as_str()))))
    }

    fn path_operand(&mut self) -> Result<Option<String>> {
        match self.next()?.clone() {
            Token::Ident(name) => Ok(self.attribute_of_path(&name)),
            Token::Name(alias) => {
                let resolved = self.resolve_alias(&alias)?;
                Ok(self.record.attribute(&resolved))
            }
            token => Err(malformed(&format!(
                "expected attribute path, found {:?}",
                token
            ))),
        }
    }

    fn value_operand(&mut self) -> Result<String> {
        match self.next()?.clone() {
            Token::Binding(binding) => {
                let value = self
                    .evaluator
                    .values
                    .get(&binding)
                    .ok_or_else(|| malformed(&format!("unbound value placeholder {}", binding)))?;
                Ok(value_as_string(value))
            }
            Token::StrLit(literal) => Ok(literal),
            token => Err(malformed(&format!(
                "expected value operand, found {:?}",
                token
            ))),
        }
    }

    fn attribute_of_path(&self, name: &str) -> Option<String> {
        self.record.attribute(name)
    }

    fn resolve_alias(&self, alias: &str) -> Result<String> {
        self.evaluator
            .names
            .get(alias)
            .cloned()
            .ok_or_else(|| malformed(&format!("unbound name placeholder {}", alias)))
    }
}

fn value_as_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn tokenize(expression: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = expression.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' | '\n' | '\r' => i += 1,
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            '=' => {
                tokens.push(Token::Eq);
                i += 1;
            }
            '<' => {
                if chars.get(i + 1) == Some(&'>') {
                    tokens.push(Token::Ne);
                    i += 2;
                } else if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Le);
                    i += 2;
                } else {
                    tokens.push(Token::Lt);
                    i += 1;
                }
            }
            '>' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Ge);
                    i += 2;
                } else {
                    tokens.push(Token::Gt);
                    i += 1;
                }
            }
            '\'' | '"' => {
                let quote = c;
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && chars[end] != quote {
                    end += 1;
                }
                if end >= chars.len() {
                    return Err(malformed("unterminated string literal"));
                }
                tokens.push(Token::StrLit(chars[start..end].iter().collect()));
                i = end + 1;
            }
            '#' | ':' => {
                let start = i;
                i += 1;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                if i == start + 1 {
                    return Err(malformed(&format!("dangling '{}' placeholder", c)));
                }
                let word: String = chars[start..i].iter().collect();
                tokens.push(if c == '#' {
                    Token::Name(word)
                } else {
                    Token::Binding(word)
                });
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                tokens.push(match word.to_ascii_uppercase().as_str() {
                    "AND" => Token::And,
                    "OR" => Token::Or,
                    "NOT" => Token::Not,
                    "IN" => Token::In,
                    _ => Token::Ident(word),
                });
            }
            other => return Err(malformed(&format!("unexpected character '{}'", other))),
        }
    }

    if tokens.is_empty() {
        return Err(malformed("empty expression"));
    }
    Ok(tokens)
}
