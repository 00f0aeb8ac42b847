//! Restricted literal parser for shell arguments.
//!
//! Converts an extracted argument substring into BSON. Strict JSON is tried
//! first since well-formed filters with double-quoted keys are the common
//! case; everything else goes through a recursive-descent parser over the
//! literal token stream.
//!
//! The fallback grammar is deliberately closed: object and array literals,
//! string/number/boolean/null literals, regex literals, and a fixed
//! whitelist of constructor forms (`Date`, `ISODate`, `ObjectId`,
//! `NumberInt`, `NumberLong`, `RegExp`, each with or without `new`). There
//! is no evaluation of arbitrary expressions - unknown identifiers and
//! calls are parse errors.

use mongodb::bson::{Bson, Document};

use crate::error::{ParseError, Result};
use crate::parser::lexer::{Lexer, Token, TokenKind};

/// Parse an argument substring into a BSON value.
///
/// Tries strict JSON first, then the restricted literal grammar. When both
/// fail, the returned error carries the literal parser's message.
pub fn parse_argument(source: &str) -> Result<Bson> {
    let trimmed = source.trim();

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Ok(bson) = Bson::try_from(value) {
            return Ok(widen_integers(bson));
        }
    }

    LiteralParser::parse(trimmed)
}

/// Normalize integers to Int64 recursively. The JSON conversion produces
/// Int32 for small values while the fallback grammar produces Int64; the
/// two paths must yield identically typed BSON for the same literal.
fn widen_integers(bson: Bson) -> Bson {
    match bson {
        Bson::Int32(n) => Bson::Int64(n as i64),
        Bson::Document(doc) => Bson::Document(
            doc.into_iter()
                .map(|(key, value)| (key, widen_integers(value)))
                .collect(),
        ),
        Bson::Array(items) => Bson::Array(items.into_iter().map(widen_integers).collect()),
        other => other,
    }
}

/// Parse an argument substring that must be a document.
pub fn parse_document(source: &str) -> Result<Document> {
    match parse_argument(source)? {
        Bson::Document(doc) => Ok(doc),
        other => Err(ParseError::InvalidQuery(format!(
            "expected an object, got {}",
            bson_type_name(&other)
        ))
        .into()),
    }
}

/// Parse an argument substring that must be an array of documents.
pub fn parse_document_array(source: &str) -> Result<Vec<Document>> {
    match parse_argument(source)? {
        Bson::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Bson::Document(doc) => Ok(doc),
                other => Err(ParseError::InvalidQuery(format!(
                    "array elements must be objects, got {}",
                    bson_type_name(&other)
                ))
                .into()),
            })
            .collect(),
        other => Err(ParseError::InvalidQuery(format!(
            "expected an array, got {}",
            bson_type_name(&other)
        ))
        .into()),
    }
}

fn bson_type_name(bson: &Bson) -> &'static str {
    match bson {
        Bson::Document(_) => "an object",
        Bson::Array(_) => "an array",
        Bson::String(_) => "a string",
        Bson::Boolean(_) => "a boolean",
        Bson::Null => "null",
        Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) => "a number",
        Bson::DateTime(_) => "a date",
        _ => "a non-object value",
    }
}

/// Recursive-descent parser over the literal token stream.
struct LiteralParser {
    tokens: Vec<Token>,
    pos: usize,
}

impl LiteralParser {
    /// Parse the input as a single literal value.
    fn parse(input: &str) -> Result<Bson> {
        let tokens = Lexer::tokenize(input);
        let mut parser = Self { tokens, pos: 0 };
        let value = parser.parse_value()?;
        parser.expect_eof()?;
        Ok(value)
    }

    fn parse_value(&mut self) -> Result<Bson> {
        match self.current_kind().cloned() {
            Some(TokenKind::LBrace) => self.parse_object(),
            Some(TokenKind::LBracket) => self.parse_array(),
            Some(TokenKind::LParen) => {
                // Users sometimes wrap arguments as `({...})`.
                self.advance();
                let value = self.parse_value()?;
                self.expect(&TokenKind::RParen, "expected ')' after expression")?;
                Ok(value)
            }
            Some(TokenKind::String(s)) => {
                self.advance();
                Ok(Bson::String(s))
            }
            Some(TokenKind::Number(n)) => {
                self.advance();
                number_to_bson(&n, false)
            }
            Some(TokenKind::Minus) => {
                self.advance();
                match self.current_kind().cloned() {
                    Some(TokenKind::Number(n)) => {
                        self.advance();
                        number_to_bson(&n, true)
                    }
                    _ => Err(ParseError::SyntaxError(
                        "unary minus is only supported on numeric literals".to_string(),
                    )
                    .into()),
                }
            }
            Some(TokenKind::Plus) => {
                self.advance();
                match self.current_kind().cloned() {
                    Some(TokenKind::Number(n)) => {
                        self.advance();
                        number_to_bson(&n, false)
                    }
                    _ => Err(ParseError::SyntaxError(
                        "unary plus is only supported on numeric literals".to_string(),
                    )
                    .into()),
                }
            }
            Some(TokenKind::Regex { pattern, flags }) => {
                self.advance();
                Ok(Bson::RegularExpression(bson::Regex {
                    pattern,
                    options: sorted_flags(&flags),
                }))
            }
            Some(TokenKind::Ident(name)) => {
                self.advance();
                self.parse_ident_value(&name)
            }
            Some(other) => {
                Err(ParseError::SyntaxError(format!("unexpected token: {other:?}")).into())
            }
            None => Err(ParseError::SyntaxError("unexpected end of input".to_string()).into()),
        }
    }

    /// Keywords and whitelisted constructor forms.
    fn parse_ident_value(&mut self, name: &str) -> Result<Bson> {
        match name {
            "true" => Ok(Bson::Boolean(true)),
            "false" => Ok(Bson::Boolean(false)),
            "null" | "undefined" => Ok(Bson::Null),
            "Infinity" => Ok(Bson::Double(f64::INFINITY)),
            "NaN" => Ok(Bson::Double(f64::NAN)),
            "new" => {
                let ctor = self.expect_identifier("expected constructor name after 'new'")?;
                let args = self.parse_call_arguments(true)?;
                constructor_to_bson(&ctor, &args)
            }
            "Date" | "ISODate" | "ObjectId" | "NumberInt" | "NumberLong" | "RegExp" => {
                let args = self.parse_call_arguments(false)?;
                constructor_to_bson(name, &args)
            }
            other => Err(ParseError::SyntaxError(format!(
                "'{other}' is not a supported literal or constructor"
            ))
            .into()),
        }
    }

    /// Parse `(arg, ...)` after a constructor name. With `optional` set,
    /// a bare `new Date` with no parentheses yields an empty argument list.
    fn parse_call_arguments(&mut self, optional: bool) -> Result<Vec<Bson>> {
        if !self.check(&TokenKind::LParen) {
            if optional {
                return Ok(Vec::new());
            }
            return Err(
                ParseError::SyntaxError("expected '(' after constructor name".to_string()).into(),
            );
        }
        self.advance();

        let mut args = Vec::new();
        if self.check(&TokenKind::RParen) {
            self.advance();
            return Ok(args);
        }

        loop {
            args.push(self.parse_value()?);
            if self.check(&TokenKind::Comma) {
                self.advance();
                if self.check(&TokenKind::RParen) {
                    break;
                }
                continue;
            }
            break;
        }

        self.expect(&TokenKind::RParen, "expected ')' after arguments")?;
        Ok(args)
    }

    /// Parse object literal: { key: value, ... }
    fn parse_object(&mut self) -> Result<Bson> {
        self.expect(&TokenKind::LBrace, "expected '{'")?;

        let mut doc = Document::new();

        if self.check(&TokenKind::RBrace) {
            self.advance();
            return Ok(Bson::Document(doc));
        }

        loop {
            let key = self.parse_property_key()?;
            self.expect(&TokenKind::Colon, "expected ':' after property key")?;
            let value = self.parse_value()?;
            doc.insert(key, value);

            if self.check(&TokenKind::Comma) {
                self.advance();
                // Allow trailing comma
                if self.check(&TokenKind::RBrace) {
                    break;
                }
                continue;
            } else if self.check(&TokenKind::RBrace) {
                break;
            } else {
                return Err(ParseError::SyntaxError(
                    "expected ',' or '}' after property".to_string(),
                )
                .into());
            }
        }

        self.expect(&TokenKind::RBrace, "expected '}'")?;
        Ok(Bson::Document(doc))
    }

    /// Parse property key (identifier, string, or number)
    fn parse_property_key(&mut self) -> Result<String> {
        match self.current_kind().cloned() {
            Some(TokenKind::Ident(name)) => {
                self.advance();
                Ok(name)
            }
            Some(TokenKind::String(s)) => {
                self.advance();
                Ok(s)
            }
            Some(TokenKind::Number(n)) => {
                self.advance();
                Ok(n)
            }
            _ => Err(ParseError::SyntaxError(
                "expected property key (identifier, string, or number)".to_string(),
            )
            .into()),
        }
    }

    /// Parse array literal: [elem1, elem2, ...]
    fn parse_array(&mut self) -> Result<Bson> {
        self.expect(&TokenKind::LBracket, "expected '['")?;

        let mut elements = Vec::new();

        if self.check(&TokenKind::RBracket) {
            self.advance();
            return Ok(Bson::Array(elements));
        }

        loop {
            elements.push(self.parse_value()?);

            if self.check(&TokenKind::Comma) {
                self.advance();
                // Allow trailing comma
                if self.check(&TokenKind::RBracket) {
                    break;
                }
                continue;
            } else if self.check(&TokenKind::RBracket) {
                break;
            } else {
                return Err(ParseError::SyntaxError(
                    "expected ',' or ']' after array element".to_string(),
                )
                .into());
            }
        }

        self.expect(&TokenKind::RBracket, "expected ']'")?;
        Ok(Bson::Array(elements))
    }

    // Token manipulation methods

    fn current_kind(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.current_kind()
            .is_some_and(|k| std::mem::discriminant(k) == std::mem::discriminant(kind))
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn expect(&mut self, kind: &TokenKind, message: &str) -> Result<()> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::SyntaxError(message.to_string()).into())
        }
    }

    fn expect_identifier(&mut self, message: &str) -> Result<String> {
        match self.current_kind().cloned() {
            Some(TokenKind::Ident(name)) => {
                self.advance();
                Ok(name)
            }
            _ => Err(ParseError::SyntaxError(message.to_string()).into()),
        }
    }

    fn expect_eof(&mut self) -> Result<()> {
        match self.current_kind() {
            Some(TokenKind::Eof) | None => Ok(()),
            Some(other) => Err(ParseError::SyntaxError(format!(
                "unexpected trailing input: {other:?}"
            ))
            .into()),
        }
    }
}

/// Convert a numeric token into BSON, preferring Int64 for whole numbers.
/// Integer tokens go through `i64` directly so values above 2^53 keep
/// their precision; only fractional or exponent forms take the `f64` path.
fn number_to_bson(raw: &str, negate: bool) -> Result<Bson> {
    if !raw.contains(['.', 'e', 'E']) {
        if let Ok(value) = raw.parse::<i64>() {
            return Ok(Bson::Int64(if negate { -value } else { value }));
        }
    }

    let value = raw
        .parse::<f64>()
        .map_err(|_| ParseError::SyntaxError(format!("invalid number: {raw}")))?;
    let value = if negate { -value } else { value };

    if value.fract() == 0.0 && value >= i64::MIN as f64 && value <= i64::MAX as f64 {
        Ok(Bson::Int64(value as i64))
    } else {
        Ok(Bson::Double(value))
    }
}

/// MongoDB stores regex options sorted alphabetically.
fn sorted_flags(flags: &str) -> String {
    let mut chars: Vec<char> = flags.chars().collect();
    chars.sort_unstable();
    chars.dedup();
    chars.into_iter().collect()
}

/// Evaluate a whitelisted constructor form.
fn constructor_to_bson(name: &str, args: &[Bson]) -> Result<Bson> {
    match name {
        "Date" | "ISODate" => match args.first() {
            None => Ok(Bson::DateTime(bson::DateTime::now())),
            Some(Bson::String(s)) => parse_date_string(s),
            Some(Bson::Int64(millis)) => Ok(Bson::DateTime(bson::DateTime::from_millis(*millis))),
            Some(Bson::Double(millis)) => {
                Ok(Bson::DateTime(bson::DateTime::from_millis(*millis as i64)))
            }
            Some(_) => Err(ParseError::SyntaxError(
                "Date argument must be a string or a millisecond timestamp".to_string(),
            )
            .into()),
        },
        "ObjectId" => match args.first() {
            None => Ok(Bson::ObjectId(bson::oid::ObjectId::new())),
            Some(Bson::String(s)) => {
                let oid = bson::oid::ObjectId::parse_str(s)
                    .map_err(|e| ParseError::SyntaxError(format!("invalid ObjectId: {e}")))?;
                Ok(Bson::ObjectId(oid))
            }
            Some(_) => {
                Err(ParseError::SyntaxError("ObjectId argument must be a string".to_string())
                    .into())
            }
        },
        "NumberInt" => match args.first() {
            Some(Bson::Int64(n)) => Ok(Bson::Int32(*n as i32)),
            Some(Bson::Double(n)) => Ok(Bson::Int32(*n as i32)),
            Some(Bson::String(s)) => {
                let n = s
                    .parse::<i32>()
                    .map_err(|e| ParseError::SyntaxError(format!("invalid int: {e}")))?;
                Ok(Bson::Int32(n))
            }
            _ => Err(ParseError::SyntaxError(
                "NumberInt requires a number or string argument".to_string(),
            )
            .into()),
        },
        "NumberLong" => match args.first() {
            Some(Bson::Int64(n)) => Ok(Bson::Int64(*n)),
            Some(Bson::Double(n)) => Ok(Bson::Int64(*n as i64)),
            Some(Bson::String(s)) => {
                let n = s
                    .parse::<i64>()
                    .map_err(|e| ParseError::SyntaxError(format!("invalid long: {e}")))?;
                Ok(Bson::Int64(n))
            }
            _ => Err(ParseError::SyntaxError(
                "NumberLong requires a number or string argument".to_string(),
            )
            .into()),
        },
        "RegExp" => {
            let pattern = match args.first() {
                Some(Bson::String(s)) => s.clone(),
                _ => {
                    return Err(ParseError::SyntaxError(
                        "RegExp requires a pattern string".to_string(),
                    )
                    .into());
                }
            };
            let options = match args.get(1) {
                Some(Bson::String(s)) => sorted_flags(s),
                None => String::new(),
                Some(_) => {
                    return Err(ParseError::SyntaxError(
                        "RegExp flags must be a string".to_string(),
                    )
                    .into());
                }
            };
            Ok(Bson::RegularExpression(bson::Regex { pattern, options }))
        }
        other => {
            Err(ParseError::SyntaxError(format!("unsupported constructor: {other}")).into())
        }
    }
}

/// Parse a date string: RFC 3339 first, then the `YYYY-MM-DD` and
/// `YYYY-MM-DD HH:MM:SS` forms users type into the shell.
fn parse_date_string(s: &str) -> Result<Bson> {
    if let Ok(datetime) = bson::DateTime::parse_rfc3339_str(s) {
        return Ok(Bson::DateTime(datetime));
    }

    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d").map(|date| date.and_time(NaiveTime::MIN))
        })
        .map_err(|_| ParseError::SyntaxError(format!("invalid date string: '{s}'")))?;

    Ok(Bson::DateTime(bson::DateTime::from_millis(
        naive.and_utc().timestamp_millis(),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_json_path() {
        let bson = parse_argument(r#"{"a": 1}"#).unwrap();
        let doc = bson.as_document().unwrap();
        assert_eq!(doc.get_i64("a").unwrap(), 1);
    }

    #[test]
    fn test_both_paths_agree_on_integer_type() {
        let strict = parse_argument(r#"{"a": 1}"#).unwrap();
        let fallback = parse_argument("{a: 1}").unwrap();
        assert_eq!(strict, fallback);
        assert_eq!(
            strict.as_document().unwrap().get("a"),
            Some(&Bson::Int64(1))
        );
    }

    #[test]
    fn test_large_integer_keeps_precision() {
        let bson = parse_argument("{id: 9007199254740993}").unwrap();
        assert_eq!(
            bson.as_document().unwrap().get("id"),
            Some(&Bson::Int64(9007199254740993))
        );

        let bson = parse_argument(r#"{"id": 9007199254740993}"#).unwrap();
        assert_eq!(
            bson.as_document().unwrap().get("id"),
            Some(&Bson::Int64(9007199254740993))
        );
    }

    #[test]
    fn test_unquoted_keys_via_fallback() {
        let bson = parse_argument("{name: 'John', age: 30}").unwrap();
        let doc = bson.as_document().unwrap();
        assert_eq!(doc.get_str("name").unwrap(), "John");
        assert_eq!(doc.get_i64("age").unwrap(), 30);
    }

    #[test]
    fn test_nested_object() {
        let bson = parse_argument("{user: {name: 'John', tags: [1, 2]}}").unwrap();
        let user = bson.as_document().unwrap().get_document("user").unwrap();
        assert_eq!(user.get_str("name").unwrap(), "John");
        assert_eq!(user.get_array("tags").unwrap().len(), 2);
    }

    #[test]
    fn test_query_operators() {
        let bson = parse_argument("{age: {$gt: 18, $lt: 65}}").unwrap();
        let age = bson.as_document().unwrap().get_document("age").unwrap();
        assert_eq!(age.get_i64("$gt").unwrap(), 18);
        assert_eq!(age.get_i64("$lt").unwrap(), 65);
    }

    #[test]
    fn test_new_date_yields_datetime() {
        let bson = parse_argument("{createdAt: new Date()}").unwrap();
        let doc = bson.as_document().unwrap();
        assert!(matches!(doc.get("createdAt"), Some(Bson::DateTime(_))));
    }

    #[test]
    fn test_date_from_ymd_string() {
        let bson = parse_argument("new Date('2024-03-01')").unwrap();
        match bson {
            Bson::DateTime(dt) => {
                assert_eq!(dt.try_to_rfc3339_string().unwrap(), "2024-03-01T00:00:00Z");
            }
            other => panic!("expected datetime, got {other:?}"),
        }
    }

    #[test]
    fn test_date_from_millis() {
        let bson = parse_argument("new Date(0)").unwrap();
        assert_eq!(bson, Bson::DateTime(bson::DateTime::from_millis(0)));
    }

    #[test]
    fn test_isodate_call() {
        let bson = parse_argument("ISODate('2024-03-01T12:30:00Z')").unwrap();
        assert!(matches!(bson, Bson::DateTime(_)));
    }

    #[test]
    fn test_objectid_roundtrip() {
        let bson = parse_argument("ObjectId('507f1f77bcf86cd799439011')").unwrap();
        match bson {
            Bson::ObjectId(oid) => assert_eq!(oid.to_hex(), "507f1f77bcf86cd799439011"),
            other => panic!("expected ObjectId, got {other:?}"),
        }
    }

    #[test]
    fn test_new_objectid_without_args() {
        let bson = parse_argument("new ObjectId()").unwrap();
        assert!(matches!(bson, Bson::ObjectId(_)));
    }

    #[test]
    fn test_objectid_invalid_hex() {
        assert!(parse_argument("ObjectId('nothex')").is_err());
    }

    #[test]
    fn test_number_wrappers() {
        assert_eq!(parse_argument("NumberInt(42)").unwrap(), Bson::Int32(42));
        assert_eq!(
            parse_argument("NumberLong(123456789)").unwrap(),
            Bson::Int64(123456789)
        );
    }

    #[test]
    fn test_regex_literal() {
        let bson = parse_argument("{name: /^jo/i}").unwrap();
        let doc = bson.as_document().unwrap();
        match doc.get("name") {
            Some(Bson::RegularExpression(re)) => {
                assert_eq!(re.pattern, "^jo");
                assert_eq!(re.options, "i");
            }
            other => panic!("expected regex, got {other:?}"),
        }
    }

    #[test]
    fn test_regexp_constructor() {
        let bson = parse_argument("new RegExp('^a.b$', 'im')").unwrap();
        match bson {
            Bson::RegularExpression(re) => {
                assert_eq!(re.pattern, "^a.b$");
                assert_eq!(re.options, "im");
            }
            other => panic!("expected regex, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_number() {
        assert_eq!(parse_argument("{delta: -5}").unwrap(),
            Bson::Document(bson::doc! {"delta": Bson::Int64(-5)}));
    }

    #[test]
    fn test_parenthesized_argument() {
        let bson = parse_argument("({a: 1})").unwrap();
        assert!(bson.as_document().is_some());
    }

    #[test]
    fn test_trailing_comma_tolerated() {
        let bson = parse_argument("{a: 1, b: [1, 2,],}").unwrap();
        let doc = bson.as_document().unwrap();
        assert_eq!(doc.get_array("b").unwrap().len(), 2);
    }

    #[test]
    fn test_arbitrary_identifier_rejected() {
        // No eval path: free identifiers are a parse error, not code.
        assert!(parse_argument("process").is_err());
        assert!(parse_argument("{a: exploit()}").is_err());
    }

    #[test]
    fn test_trailing_garbage_rejected() {
        assert!(parse_argument("{a: 1} garbage").is_err());
    }

    #[test]
    fn test_parse_document_rejects_array() {
        let err = parse_document("[1, 2]").unwrap_err();
        assert!(err.to_string().contains("expected an object"));
    }

    #[test]
    fn test_parse_document_array_rejects_scalars() {
        assert!(parse_document_array("[{a:1}, 2]").is_err());
        assert!(parse_document_array("{a:1}").is_err());
    }
}
