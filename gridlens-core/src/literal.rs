//! Parsing of the literal-encoded columns in the trial summary table.
//!
//! Structured columns hold nested tuples and lists of numbers, e.g.
//! `[(1, 2), (3, 4)]` or `[0, 1, 1]`. [`Literal::parse`] accepts that
//! grammar (numbers, `True`/`False`, lists, tuples, trailing commas) and the
//! typed accessors turn a parsed value into what the model needs.

use std::fmt;

use thiserror::Error;

use crate::record::Position;

/// Deepest list/tuple nesting [`Literal::parse`] accepts.
pub const MAX_DEPTH: usize = 64;

/// Errors produced while parsing or converting a literal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LiteralError {
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEnd { expected: &'static str },

    #[error("unexpected character {found:?} at offset {offset}, expected {expected}")]
    UnexpectedChar {
        found: char,
        offset: usize,
        expected: &'static str,
    },

    #[error("invalid number {text:?} at offset {offset}")]
    InvalidNumber { text: String, offset: usize },

    #[error("nesting deeper than {max} levels at offset {offset}", max = MAX_DEPTH)]
    TooDeep { offset: usize },

    #[error("trailing input at offset {offset}")]
    TrailingInput { offset: usize },

    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

/// A parsed literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Bool(bool),
    List(Vec<Literal>),
    Tuple(Vec<Literal>),
}

impl Literal {
    /// Parse a complete literal. Surrounding whitespace is ignored; anything
    /// else after the value is an error.
    pub fn parse(text: &str) -> Result<Self, LiteralError> {
        let mut parser = Parser::new(text);
        let value = parser.value()?;
        parser.skip_ws();
        if parser.pos < parser.bytes.len() {
            return Err(LiteralError::TrailingInput { offset: parser.pos });
        }
        Ok(value)
    }

    fn kind(&self) -> &'static str {
        match self {
            Literal::Int(_) => "int",
            Literal::Float(_) => "float",
            Literal::Bool(_) => "bool",
            Literal::List(_) => "list",
            Literal::Tuple(_) => "tuple",
        }
    }

    /// Numeric value; ints widen to floats.
    pub fn as_f64(&self) -> Result<f64, LiteralError> {
        match self {
            Literal::Int(i) => Ok(*i as f64),
            Literal::Float(f) => Ok(*f),
            other => Err(LiteralError::TypeMismatch {
                expected: "number",
                found: other.kind(),
            }),
        }
    }

    pub fn as_i64(&self) -> Result<i64, LiteralError> {
        match self {
            Literal::Int(i) => Ok(*i),
            other => Err(LiteralError::TypeMismatch {
                expected: "int",
                found: other.kind(),
            }),
        }
    }

    /// Elements of a list or tuple.
    pub fn as_seq(&self) -> Result<&[Literal], LiteralError> {
        match self {
            Literal::List(items) | Literal::Tuple(items) => Ok(items),
            other => Err(LiteralError::TypeMismatch {
                expected: "sequence",
                found: other.kind(),
            }),
        }
    }

    /// A grid coordinate written as a two-element tuple or list.
    pub fn as_position(&self) -> Result<Position, LiteralError> {
        match self.as_seq()? {
            [row, col] => Ok(Position::new(row.as_i64()?, col.as_i64()?)),
            _ => Err(LiteralError::TypeMismatch {
                expected: "coordinate pair",
                found: self.kind(),
            }),
        }
    }

    pub fn as_f64_vec(&self) -> Result<Vec<f64>, LiteralError> {
        self.as_seq()?.iter().map(Literal::as_f64).collect()
    }

    pub fn as_positions(&self) -> Result<Vec<Position>, LiteralError> {
        self.as_seq()?.iter().map(Literal::as_position).collect()
    }
}

struct Parser<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            depth: 0,
        }
    }

    fn skip_ws(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn unexpected(&self, expected: &'static str) -> LiteralError {
        match self.text[self.pos..].chars().next() {
            Some(found) => LiteralError::UnexpectedChar {
                found,
                offset: self.pos,
                expected,
            },
            None => LiteralError::UnexpectedEnd { expected },
        }
    }

    fn value(&mut self) -> Result<Literal, LiteralError> {
        self.skip_ws();
        match self.peek() {
            Some(b'[') => {
                self.pos += 1;
                let (items, _) = self.items(b']')?;
                Ok(Literal::List(items))
            }
            Some(b'(') => {
                self.pos += 1;
                let (mut items, trailing_comma) = self.items(b')')?;
                // `(x)` is just a parenthesised value, `(x,)` is a 1-tuple.
                if items.len() == 1 && !trailing_comma {
                    Ok(items.remove(0))
                } else {
                    Ok(Literal::Tuple(items))
                }
            }
            Some(c) if c == b'-' || c == b'+' || c == b'.' || c.is_ascii_digit() => self.number(),
            Some(c) if c.is_ascii_alphabetic() => self.keyword(),
            _ => Err(self.unexpected("a value")),
        }
    }

    /// Comma separated values up to `close`. Also reports whether the last
    /// element was followed by a comma.
    fn items(&mut self, close: u8) -> Result<(Vec<Literal>, bool), LiteralError> {
        if self.depth == MAX_DEPTH {
            return Err(LiteralError::TooDeep {
                offset: self.pos - 1,
            });
        }
        self.depth += 1;
        let items = self.items_inner(close);
        self.depth -= 1;
        items
    }

    fn items_inner(&mut self, close: u8) -> Result<(Vec<Literal>, bool), LiteralError> {
        let mut items = Vec::new();
        let mut trailing_comma = false;
        loop {
            self.skip_ws();
            if self.peek() == Some(close) {
                self.pos += 1;
                return Ok((items, trailing_comma));
            }
            items.push(self.value()?);
            self.skip_ws();
            match self.peek() {
                Some(b',') => {
                    self.pos += 1;
                    trailing_comma = true;
                }
                Some(c) if c == close => {
                    self.pos += 1;
                    return Ok((items, false));
                }
                _ => return Err(self.unexpected("',' or closing bracket")),
            }
        }
    }

    fn number(&mut self) -> Result<Literal, LiteralError> {
        let start = self.pos;
        let mut is_float = false;
        if matches!(self.peek(), Some(b'-') | Some(b'+')) {
            self.pos += 1;
        }
        while let Some(c) = self.peek() {
            match c {
                b'0'..=b'9' | b'_' => {}
                b'.' => is_float = true,
                b'e' | b'E' => {
                    is_float = true;
                    if matches!(self.bytes.get(self.pos + 1), Some(b'-') | Some(b'+')) {
                        self.pos += 1;
                    }
                }
                _ => break,
            }
            self.pos += 1;
        }
        let raw = &self.text[start..self.pos];
        let text = raw.replace('_', "");
        let invalid = || LiteralError::InvalidNumber {
            text: raw.to_string(),
            offset: start,
        };
        if is_float {
            text.parse::<f64>().map(Literal::Float).map_err(|_| invalid())
        } else {
            text.parse::<i64>().map(Literal::Int).map_err(|_| invalid())
        }
    }

    fn keyword(&mut self) -> Result<Literal, LiteralError> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_alphanumeric() || c == b'_') {
            self.pos += 1;
        }
        match &self.text[start..self.pos] {
            "True" => Ok(Literal::Bool(true)),
            "False" => Ok(Literal::Bool(false)),
            _ => {
                self.pos = start;
                Err(self.unexpected("a value"))
            }
        }
    }
}

/// A scalar carried through to the output table. Integers render without a
/// fractional part unless promoted with [`Number::to_float`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn parse(text: &str) -> Result<Self, LiteralError> {
        match Literal::parse(text)? {
            Literal::Int(i) => Ok(Number::Int(i)),
            Literal::Float(f) => Ok(Number::Float(f)),
            other => Err(LiteralError::TypeMismatch {
                expected: "number",
                found: other.kind(),
            }),
        }
    }

    /// The same value as a float, as when its column holds any float.
    pub fn to_float(self) -> Self {
        match self {
            Number::Int(i) => Number::Float(i as f64),
            float => float,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{i}"),
            Number::Float(v) => f.write_str(&format_float(*v)),
        }
    }
}

impl serde::Serialize for Number {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Number::Int(i) => serializer.serialize_i64(*i),
            Number::Float(f) => serializer.serialize_f64(*f),
        }
    }
}

/// Render a float with the shortest digits that round-trip, keeping `.0` on
/// integral values and switching to exponent form outside `[1e-4, 1e16)`.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let formatted = format!("{value:e}");
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) => {
                let (sign, digits) = match exponent.strip_prefix('-') {
                    Some(digits) => ('-', digits),
                    None => ('+', exponent),
                };
                format!("{mantissa}e{sign}{digits:0>2}")
            }
            None => formatted,
        };
    }
    let formatted = value.to_string();
    if formatted.contains('.') {
        formatted
    } else {
        format!("{formatted}.0")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_position_list() {
        let value = Literal::parse("[(1, 2), (3, 4)]").unwrap();
        let positions = value.as_positions().unwrap();
        assert_eq!(positions, vec![Position::new(1, 2), Position::new(3, 4)]);
    }

    #[test]
    fn test_parse_tuple_and_list_coordinates_are_equivalent() {
        let tuple = Literal::parse("(10, 1)").unwrap().as_position().unwrap();
        let list = Literal::parse("[10, 1]").unwrap().as_position().unwrap();
        assert_eq!(tuple, list);
    }

    #[test]
    fn test_parse_mixed_numbers_widen_to_float() {
        let rewards = Literal::parse("[5, 0.5, -2, 1e1]")
            .unwrap()
            .as_f64_vec()
            .unwrap();
        assert_eq!(rewards, vec![5.0, 0.5, -2.0, 10.0]);
    }

    #[test]
    fn test_parse_trailing_comma_and_single_tuple() {
        assert_eq!(
            Literal::parse("[1, 2,]").unwrap(),
            Literal::List(vec![Literal::Int(1), Literal::Int(2)])
        );
        assert_eq!(
            Literal::parse("(7,)").unwrap(),
            Literal::Tuple(vec![Literal::Int(7)])
        );
        assert_eq!(Literal::parse("(7)").unwrap(), Literal::Int(7));
    }

    #[test]
    fn test_parse_empty_list() {
        assert_eq!(Literal::parse(" [] ").unwrap(), Literal::List(Vec::new()));
    }

    #[test]
    fn test_parse_booleans() {
        assert_eq!(Literal::parse("True").unwrap(), Literal::Bool(true));
        assert_eq!(Literal::parse("False").unwrap(), Literal::Bool(false));
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        assert!(matches!(
            Literal::parse("[(1, 2), (3, 4)"),
            Err(LiteralError::UnexpectedEnd { .. })
        ));
        assert!(matches!(
            Literal::parse("[1 2]"),
            Err(LiteralError::UnexpectedChar { found: '2', .. })
        ));
        assert!(matches!(
            Literal::parse("[1] x"),
            Err(LiteralError::TrailingInput { offset: 4 })
        ));
        assert!(matches!(
            Literal::parse("'a'"),
            Err(LiteralError::UnexpectedChar { found: '\'', .. })
        ));
        assert!(matches!(
            Literal::parse("1.2.3"),
            Err(LiteralError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_position_requires_pair_of_ints() {
        let triple = Literal::parse("(1, 2, 3)").unwrap();
        assert!(triple.as_position().is_err());
        let floats = Literal::parse("(1.0, 2)").unwrap();
        assert!(matches!(
            floats.as_position(),
            Err(LiteralError::TypeMismatch { expected: "int", .. })
        ));
    }

    #[test]
    fn test_number_keeps_int_rendering() {
        assert_eq!(Number::parse("7").unwrap().to_string(), "7");
        assert_eq!(Number::parse("7.0").unwrap().to_string(), "7.0");
        assert_eq!(Number::parse("6.5").unwrap().to_string(), "6.5");
        assert!(Number::parse("[1]").is_err());
    }

    #[test]
    fn test_number_to_float() {
        assert_eq!(Number::Int(2).to_float(), Number::Float(2.0));
        assert_eq!(Number::Int(2).to_float().to_string(), "2.0");
        assert_eq!(Number::Float(6.5).to_float(), Number::Float(6.5));
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |depth: usize| format!("{}{}", "[".repeat(depth), "]".repeat(depth));

        assert!(Literal::parse(&nested(MAX_DEPTH)).is_ok());
        assert_eq!(
            Literal::parse(&nested(MAX_DEPTH + 1)),
            Err(LiteralError::TooDeep { offset: MAX_DEPTH })
        );
        assert!(matches!(
            Literal::parse(&nested(1_000_000)),
            Err(LiteralError::TooDeep { .. })
        ));
        assert!(matches!(
            Literal::parse(&"(".repeat(100_000)),
            Err(LiteralError::TooDeep { .. })
        ));
        let siblings = format!("[{}]", vec![nested(MAX_DEPTH - 1); 3].join(", "));
        assert!(Literal::parse(&siblings).is_ok());
    }

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(0.0), "0.0");
        assert_eq!(format_float(1.0), "1.0");
        assert_eq!(format_float(0.375), "0.375");
        assert_eq!(format_float(-2.5), "-2.5");
        assert_eq!(format_float(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_float(1e-5), "1e-05");
        assert_eq!(format_float(1.5e20), "1.5e+20");
    }
}
