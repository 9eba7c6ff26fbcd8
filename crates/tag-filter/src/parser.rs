// crates/tag-filter/src/parser.rs
// ============================================================================
// Module: Tag Filter Parser
// Description: Lexer and recursive-descent parser for tag-filter expressions.
// Purpose: Turn author-facing filter text into a `TagFilterExpression`.
// Dependencies: crate::ast, serde_json
// ============================================================================

//! ## Overview
//! Grammar (keywords and operators are case-insensitive):
//!
//! ```text
//! Expr       := Or
//! Or         := And ( "OR" And )*
//! And        := Primary ( "AND" Primary )*
//! Primary    := "(" Expr ")" | Comparison | Unary
//! Comparison := Identifier Op Literal
//! Unary      := Identifier UnaryOp
//! Identifier := name [ ":" tag-key ] [ "@src" | "@dest" | "@na" ]
//! Literal    := QuotedString | Number | "TRUE" | "FALSE"
//! ```
//!
//! Strings may use single or double quotes; a backslash escapes the next
//! character. Input is untrusted: size and parenthesis depth are bounded.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

use serde_json::Number;

use crate::ast::ComparisonOperator;
use crate::ast::EntityOrigin;
use crate::ast::Literal;
use crate::ast::TagFilterExpression;
use crate::ast::TagKey;
use crate::ast::UnaryOperator;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum accepted input size in bytes.
const MAX_INPUT_BYTES: usize = 64 * 1024;
/// Maximum parenthesis nesting depth.
const MAX_NESTING: usize = 32;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while parsing or mapping a tag filter.
///
/// # Invariants
/// - Positions are byte offsets into the original input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagFilterError {
    /// Input was empty or whitespace only.
    EmptyInput,
    /// Input exceeded the size limit.
    InputTooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual input length in bytes.
        actual_bytes: usize,
    },
    /// Parentheses nested deeper than the limit.
    NestingTooDeep {
        /// Maximum allowed depth.
        max_depth: usize,
        /// Byte offset of the offending parenthesis.
        position: usize,
    },
    /// A token appeared where something else was expected.
    UnexpectedToken {
        /// Human-friendly expectation summary.
        expected: &'static str,
        /// The token that was actually seen.
        found: String,
        /// Byte offset in the input.
        position: usize,
    },
    /// An identifier was followed by an unknown operator keyword.
    UnknownOperator {
        /// The unrecognized keyword.
        found: String,
        /// Byte offset in the input.
        position: usize,
    },
    /// An identifier had an empty name, empty tag key, or unknown entity suffix.
    InvalidTagKey {
        /// The raw identifier text.
        raw: String,
        /// Byte offset in the input.
        position: usize,
    },
    /// A quoted string was not closed.
    UnterminatedString {
        /// Byte offset of the opening quote.
        position: usize,
    },
    /// A numeric literal failed to parse.
    InvalidNumber {
        /// The raw numeric text.
        raw: String,
        /// Byte offset in the input.
        position: usize,
    },
    /// Input continued after a complete expression.
    TrailingInput {
        /// Byte offset where the trailing input begins.
        position: usize,
    },
    /// The remote JSON model could not be mapped to an expression.
    InvalidWireModel(String),
}

impl fmt::Display for TagFilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "tag filter is empty"),
            Self::InputTooLarge {
                max_bytes,
                actual_bytes,
            } => write!(f, "tag filter exceeds size limit: {actual_bytes} bytes (max {max_bytes})"),
            Self::NestingTooDeep {
                max_depth,
                position,
            } => write!(f, "tag filter nesting exceeds depth {max_depth} at {position}"),
            Self::UnexpectedToken {
                expected,
                found,
                position,
            } => write!(f, "unexpected token `{found}` at {position}, expected {expected}"),
            Self::UnknownOperator {
                found,
                position,
            } => write!(f, "unknown operator `{found}` at {position}"),
            Self::InvalidTagKey {
                raw,
                position,
            } => write!(f, "invalid tag key `{raw}` at {position}"),
            Self::UnterminatedString {
                position,
            } => write!(f, "unterminated string starting at {position}"),
            Self::InvalidNumber {
                raw,
                position,
            } => write!(f, "invalid number `{raw}` at {position}"),
            Self::TrailingInput {
                position,
            } => write!(f, "unexpected trailing input at {position}"),
            Self::InvalidWireModel(message) => write!(f, "invalid tag filter model: {message}"),
        }
    }
}

impl std::error::Error for TagFilterError {}

// ============================================================================
// SECTION: Public API
// ============================================================================

/// Parses a tag-filter expression.
///
/// # Errors
/// Returns [`TagFilterError`] for empty or oversized input, lexical errors,
/// unknown operators, malformed identifiers, or trailing input.
pub fn parse(input: &str) -> Result<TagFilterExpression, TagFilterError> {
    if input.len() > MAX_INPUT_BYTES {
        return Err(TagFilterError::InputTooLarge {
            max_bytes: MAX_INPUT_BYTES,
            actual_bytes: input.len(),
        });
    }
    let tokens = Lexer::new(input).lex()?;
    let mut parser = Parser::new(tokens);
    let expression = parser.parse_or()?;
    parser.expect_eof()?;
    Ok(expression)
}

// ============================================================================
// SECTION: Lexer
// ============================================================================

/// Lexer token.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    /// Identifier, keyword, or operator word.
    Word(&'a str),
    /// Quoted string with escapes resolved.
    Str(String),
    /// Numeric literal text.
    Number(&'a str),
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// End-of-input marker.
    Eof,
}

/// Token paired with its byte offset.
#[derive(Debug, Clone)]
struct SpannedToken<'a> {
    /// Token value.
    token: Token<'a>,
    /// Byte offset into the input.
    position: usize,
}

/// Lexer over the filter text.
struct Lexer<'a> {
    /// Source input.
    input: &'a str,
    /// Character cursor.
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer for the input.
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
        }
    }

    /// Splits the input into tokens terminated by [`Token::Eof`].
    fn lex(mut self) -> Result<Vec<SpannedToken<'a>>, TagFilterError> {
        let mut tokens = Vec::new();
        while let Some(&(position, ch)) = self.chars.peek() {
            let token = match ch {
                c if c.is_whitespace() => {
                    self.chars.next();
                    continue;
                }
                '(' => {
                    self.chars.next();
                    Token::LParen
                }
                ')' => {
                    self.chars.next();
                    Token::RParen
                }
                '\'' | '"' => self.lex_string(position, ch)?,
                c if c.is_ascii_digit() || c == '-' => self.lex_number(position),
                c if c.is_ascii_alphabetic() || c == '_' => {
                    let end = self.consume_while(is_word_char);
                    Token::Word(&self.input[position .. end])
                }
                other => {
                    return Err(TagFilterError::UnexpectedToken {
                        expected: "identifier, literal, or parenthesis",
                        found: other.to_string(),
                        position,
                    });
                }
            };
            tokens.push(SpannedToken {
                token,
                position,
            });
        }
        if tokens.is_empty() {
            return Err(TagFilterError::EmptyInput);
        }
        tokens.push(SpannedToken {
            token: Token::Eof,
            position: self.input.len(),
        });
        Ok(tokens)
    }

    /// Lexes a quoted string starting at `start`.
    fn lex_string(&mut self, start: usize, quote: char) -> Result<Token<'a>, TagFilterError> {
        self.chars.next();
        let mut value = String::new();
        loop {
            match self.chars.next() {
                Some((_, '\\')) => match self.chars.next() {
                    Some((_, escaped)) => value.push(escaped),
                    None => {
                        return Err(TagFilterError::UnterminatedString {
                            position: start,
                        });
                    }
                },
                Some((_, ch)) if ch == quote => return Ok(Token::Str(value)),
                Some((_, ch)) => value.push(ch),
                None => {
                    return Err(TagFilterError::UnterminatedString {
                        position: start,
                    });
                }
            }
        }
    }

    /// Lexes a numeric literal with an optional signed exponent; validation
    /// happens in the parser.
    fn lex_number(&mut self, start: usize) -> Token<'a> {
        self.chars.next();
        let mut end = self.consume_while(|c| c.is_ascii_digit() || c == '.');
        if self.chars.next_if(|&(_, c)| c == 'e' || c == 'E').is_some() {
            self.chars.next_if(|&(_, c)| c == '+' || c == '-');
            end = self.consume_while(|c| c.is_ascii_digit());
        }
        Token::Number(&self.input[start .. end])
    }

    /// Advances while `condition` holds and returns the end offset.
    fn consume_while(&mut self, condition: impl Fn(char) -> bool) -> usize {
        while let Some(&(_, ch)) = self.chars.peek() {
            if !condition(ch) {
                break;
            }
            self.chars.next();
        }
        self.chars.peek().map_or(self.input.len(), |&(offset, _)| offset)
    }
}

/// Returns true for characters allowed inside identifiers and keywords.
const fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '-' | '/' | ':' | '@')
}

// ============================================================================
// SECTION: Parser
// ============================================================================

/// Recursive-descent parser over the token stream.
struct Parser<'a> {
    /// Token stream ending with `Eof`.
    tokens: Vec<SpannedToken<'a>>,
    /// Current token index.
    index: usize,
    /// Current parenthesis depth.
    nesting: usize,
}

impl<'a> Parser<'a> {
    /// Creates a parser over lexed tokens.
    const fn new(tokens: Vec<SpannedToken<'a>>) -> Self {
        Self {
            tokens,
            index: 0,
            nesting: 0,
        }
    }

    /// Parses `And ( OR And )*`.
    fn parse_or(&mut self) -> Result<TagFilterExpression, TagFilterError> {
        let mut parts = vec![self.parse_and()?];
        while self.matches_keyword("OR") {
            parts.push(self.parse_and()?);
        }
        Ok(TagFilterExpression::or(parts))
    }

    /// Parses `Primary ( AND Primary )*`.
    fn parse_and(&mut self) -> Result<TagFilterExpression, TagFilterError> {
        let mut parts = vec![self.parse_primary()?];
        while self.matches_keyword("AND") {
            parts.push(self.parse_primary()?);
        }
        Ok(TagFilterExpression::and(parts))
    }

    /// Parses a parenthesized group or a predicate leaf.
    fn parse_primary(&mut self) -> Result<TagFilterExpression, TagFilterError> {
        let SpannedToken {
            token,
            position,
        } = self.current().clone();
        match token {
            Token::LParen => {
                if self.nesting + 1 > MAX_NESTING {
                    return Err(TagFilterError::NestingTooDeep {
                        max_depth: MAX_NESTING,
                        position,
                    });
                }
                self.advance();
                self.nesting += 1;
                let expression = self.parse_or()?;
                self.nesting -= 1;
                self.expect_rparen()?;
                Ok(expression)
            }
            Token::Word(word) if !is_logical_keyword(word) => {
                self.advance();
                let key = parse_tag_key(word, position)?;
                self.parse_predicate(key)
            }
            _ => Err(TagFilterError::UnexpectedToken {
                expected: "identifier or `(`",
                found: self.describe_current(),
                position,
            }),
        }
    }

    /// Parses the operator (and literal) following an identifier.
    fn parse_predicate(&mut self, key: TagKey) -> Result<TagFilterExpression, TagFilterError> {
        let SpannedToken {
            token,
            position,
        } = self.current().clone();
        let Token::Word(word) = token else {
            return Err(TagFilterError::UnexpectedToken {
                expected: "operator",
                found: self.describe_current(),
                position,
            });
        };
        if let Some(operator) = UnaryOperator::from_keyword(word) {
            self.advance();
            return Ok(TagFilterExpression::unary(key, operator));
        }
        if let Some(operator) = ComparisonOperator::from_keyword(word) {
            self.advance();
            let value = self.parse_literal()?;
            return Ok(TagFilterExpression::comparison(key, operator, value));
        }
        Err(TagFilterError::UnknownOperator {
            found: word.to_string(),
            position,
        })
    }

    /// Parses a string, number, or boolean literal.
    fn parse_literal(&mut self) -> Result<Literal, TagFilterError> {
        let SpannedToken {
            token,
            position,
        } = self.current().clone();
        let literal = match token {
            Token::Str(value) => Literal::String(value),
            Token::Number(raw) => Literal::Number(parse_number(raw, position)?),
            Token::Word(word) if word.eq_ignore_ascii_case("TRUE") => Literal::Bool(true),
            Token::Word(word) if word.eq_ignore_ascii_case("FALSE") => Literal::Bool(false),
            _ => {
                return Err(TagFilterError::UnexpectedToken {
                    expected: "string, number, TRUE, or FALSE",
                    found: self.describe_current(),
                    position,
                });
            }
        };
        self.advance();
        Ok(literal)
    }

    /// Consumes a closing parenthesis.
    fn expect_rparen(&mut self) -> Result<(), TagFilterError> {
        if self.current().token == Token::RParen {
            self.advance();
            Ok(())
        } else {
            Err(TagFilterError::UnexpectedToken {
                expected: "`)`",
                found: self.describe_current(),
                position: self.current().position,
            })
        }
    }

    /// Ensures all input has been consumed.
    fn expect_eof(&self) -> Result<(), TagFilterError> {
        if self.current().token == Token::Eof {
            Ok(())
        } else {
            Err(TagFilterError::TrailingInput {
                position: self.current().position,
            })
        }
    }

    /// Consumes the current token if it is the given keyword.
    fn matches_keyword(&mut self, keyword: &str) -> bool {
        if let Token::Word(word) = self.current().token
            && word.eq_ignore_ascii_case(keyword)
        {
            self.advance();
            return true;
        }
        false
    }

    /// Returns the current token.
    fn current(&self) -> &SpannedToken<'a> {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.index.min(last)]
    }

    /// Advances to the next token, stopping at `Eof`.
    const fn advance(&mut self) {
        if self.index + 1 < self.tokens.len() {
            self.index += 1;
        }
    }

    /// Formats the current token for diagnostics.
    fn describe_current(&self) -> String {
        match &self.current().token {
            Token::Word(word) => (*word).to_string(),
            Token::Str(value) => format!("'{value}'"),
            Token::Number(raw) => (*raw).to_string(),
            Token::LParen => "(".to_string(),
            Token::RParen => ")".to_string(),
            Token::Eof => "end of input".to_string(),
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns true for `AND` / `OR` in any case.
fn is_logical_keyword(word: &str) -> bool {
    word.eq_ignore_ascii_case("AND") || word.eq_ignore_ascii_case("OR")
}

/// Splits `name[:key][@entity]` into a [`TagKey`].
fn parse_tag_key(raw: &str, position: usize) -> Result<TagKey, TagFilterError> {
    let invalid = || TagFilterError::InvalidTagKey {
        raw: raw.to_string(),
        position,
    };
    let (body, entity) = match raw.rsplit_once('@') {
        Some((body, suffix)) => (body, EntityOrigin::from_suffix(suffix).ok_or_else(invalid)?),
        None => (raw, EntityOrigin::NotApplicable),
    };
    let (name, tag_key) = match body.split_once(':') {
        Some((name, tag_key)) => {
            if tag_key.is_empty() {
                return Err(invalid());
            }
            (name, Some(tag_key.to_string()))
        }
        None => (body, None),
    };
    if name.is_empty() || name.contains('@') {
        return Err(invalid());
    }
    Ok(TagKey {
        name: name.to_string(),
        tag_key,
        entity,
    })
}

/// Returns true when `key` prints as one identifier token that parses back
/// to the same key.
pub(crate) fn is_printable_tag_key(key: &TagKey) -> bool {
    let text = key.to_string();
    text.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_')
        && text.chars().all(is_word_char)
        && !is_logical_keyword(&text)
        && parse_tag_key(&text, 0).is_ok_and(|parsed| parsed == *key)
}

/// Parses integer, decimal, or exponent literal text.
fn parse_number(raw: &str, position: usize) -> Result<Number, TagFilterError> {
    let invalid = || TagFilterError::InvalidNumber {
        raw: raw.to_string(),
        position,
    };
    if raw.contains(['.', 'e', 'E']) {
        let value: f64 = raw.parse().map_err(|_| invalid())?;
        Number::from_f64(value).ok_or_else(invalid)
    } else {
        let value: i64 = raw.parse().map_err(|_| invalid())?;
        Ok(Number::from(value))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::panic,
        reason = "Test-only assertions are permitted."
    )]

    use super::*;
    use crate::ast::ComparisonExpression;

    #[test]
    fn parses_comparison_with_string_literal() {
        let expr = parse("service.name EQUALS 'checkout'").unwrap();
        assert_eq!(
            expr,
            TagFilterExpression::comparison(
                TagKey::new("service.name"),
                ComparisonOperator::Equals,
                Literal::String("checkout".to_string()),
            )
        );
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let expr = parse("a IS_EMPTY OR b IS_EMPTY AND c IS_EMPTY").unwrap();
        let TagFilterExpression::Or(children) = expr else {
            panic!("expected OR at the root");
        };
        assert_eq!(children.len(), 2);
        assert!(matches!(children[1], TagFilterExpression::And(_)));
    }

    #[test]
    fn keywords_are_case_insensitive() {
        let lower = parse("a equals true and b not_blank").unwrap();
        let upper = parse("a EQUALS TRUE AND b NOT_BLANK").unwrap();
        assert_eq!(lower, upper);
    }

    #[test]
    fn parses_entity_and_tag_key() {
        let expr = parse("call.http.header:x-trace@src CONTAINS \"abc\"").unwrap();
        let TagFilterExpression::Comparison(ComparisonExpression {
            key,
            ..
        }) = expr
        else {
            panic!("expected comparison");
        };
        assert_eq!(key.name, "call.http.header");
        assert_eq!(key.tag_key.as_deref(), Some("x-trace"));
        assert_eq!(key.entity, EntityOrigin::Source);
    }

    #[test]
    fn parses_integer_decimal_and_negative_numbers() {
        for (input, expected) in
            [("a LESS_THAN 5", "5"), ("a LESS_THAN 0.25", "0.25"), ("a GREATER_THAN -3", "-3")]
        {
            let TagFilterExpression::Comparison(cmp) = parse(input).unwrap() else {
                panic!("expected comparison");
            };
            let Literal::Number(number) = cmp.value else {
                panic!("expected number literal");
            };
            assert_eq!(number.to_string(), expected);
        }
    }

    #[test]
    fn rejects_unknown_operator() {
        let err = parse("a LIKE 'x'").unwrap_err();
        assert!(matches!(err, TagFilterError::UnknownOperator { .. }));
    }

    #[test]
    fn rejects_missing_literal() {
        let err = parse("a EQUALS").unwrap_err();
        assert!(matches!(err, TagFilterError::UnexpectedToken { .. }));
    }

    #[test]
    fn rejects_unterminated_string() {
        let err = parse("a EQUALS 'abc").unwrap_err();
        assert_eq!(
            err,
            TagFilterError::UnterminatedString {
                position: 9
            }
        );
    }

    #[test]
    fn rejects_trailing_input() {
        let err = parse("a IS_EMPTY b").unwrap_err();
        assert!(matches!(err, TagFilterError::TrailingInput { .. }));
    }

    #[test]
    fn rejects_unbalanced_parentheses() {
        assert!(parse("(a IS_EMPTY").is_err());
        assert!(parse("a IS_EMPTY)").is_err());
    }

    #[test]
    fn rejects_empty_input() {
        assert_eq!(parse("   ").unwrap_err(), TagFilterError::EmptyInput);
    }

    #[test]
    fn rejects_unknown_entity_suffix() {
        let err = parse("a@moon IS_EMPTY").unwrap_err();
        assert!(matches!(err, TagFilterError::InvalidTagKey { .. }));
    }

    #[test]
    fn rejects_excessive_nesting() {
        let input = format!("{}a IS_EMPTY{}", "(".repeat(40), ")".repeat(40));
        let err = parse(&input).unwrap_err();
        assert!(matches!(err, TagFilterError::NestingTooDeep { .. }));
    }

    #[test]
    fn rejects_malformed_number() {
        let err = parse("a EQUALS 1.2.3").unwrap_err();
        assert!(matches!(err, TagFilterError::InvalidNumber { .. }));
    }

    #[test]
    fn parses_exponent_numbers() {
        for (input, expected) in [
            ("a LESS_THAN 1e-7", 1e-7),
            ("a LESS_THAN 2.5E+20", 2.5e20),
            ("a LESS_THAN -4e3", -4000.0),
        ] {
            let TagFilterExpression::Comparison(cmp) = parse(input).unwrap() else {
                panic!("expected comparison");
            };
            let Literal::Number(number) = cmp.value else {
                panic!("expected number literal");
            };
            assert_eq!(number.as_f64(), Some(expected));
        }
    }

    #[test]
    fn rejects_exponent_without_digits() {
        let err = parse("a EQUALS 1e").unwrap_err();
        assert!(matches!(err, TagFilterError::InvalidNumber { .. }));
    }

    #[test]
    fn printable_tag_keys_survive_a_reparse() {
        assert!(is_printable_tag_key(&parse_tag_key("beacon.meta:tier@src", 0).unwrap()));
        let rejected = [("service name", None), ("a", Some("x y")), ("and", None), ("9lives", None)];
        for (name, tag_key) in rejected {
            let key = TagKey {
                name: name.to_string(),
                tag_key: tag_key.map(str::to_string),
                entity: EntityOrigin::NotApplicable,
            };
            assert!(!is_printable_tag_key(&key), "{key}");
        }
    }

    #[test]
    fn keyword_cannot_be_an_identifier() {
        assert!(parse("AND IS_EMPTY").is_err());
    }
}
