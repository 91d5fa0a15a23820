//! tokenizer for condition expressions

use tracing::trace;

use super::error::{ConditionError, ConditionResult};

/// byte range of a token in the source expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    /// numeric literal, suffix already stripped
    Number(f64),
    /// quoted text without the quotes
    Str(String),
    /// `${name}`
    Property(String),

    LParen,
    RParen,
    Comma,

    Plus,
    Minus,
    Star,
    Slash,

    EqEq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,

    AndAnd,
    OrOr,

    Eof,
}

impl TokenKind {
    /// short description for error messages
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Ident(name) => format!("identifier '{}'", name),
            TokenKind::Number(n) => format!("number {}", n),
            TokenKind::Str(s) => format!("string '{}'", s),
            TokenKind::Property(name) => format!("property '${{{}}}'", name),
            TokenKind::LParen => "'('".to_string(),
            TokenKind::RParen => "')'".to_string(),
            TokenKind::Comma => "','".to_string(),
            TokenKind::Plus => "'+'".to_string(),
            TokenKind::Minus => "'-'".to_string(),
            TokenKind::Star => "'*'".to_string(),
            TokenKind::Slash => "'/'".to_string(),
            TokenKind::EqEq => "'=='".to_string(),
            TokenKind::Ne => "'!='".to_string(),
            TokenKind::Lt => "'<'".to_string(),
            TokenKind::Le => "'<='".to_string(),
            TokenKind::Gt => "'>'".to_string(),
            TokenKind::Ge => "'>='".to_string(),
            TokenKind::AndAnd => "'&&'".to_string(),
            TokenKind::OrOr => "'||'".to_string(),
            TokenKind::Eof => "end of expression".to_string(),
        }
    }
}

/// split an expression into tokens, always terminated by `Eof`
pub fn lex(input: &str) -> ConditionResult<Vec<Token>> {
    let mut out = Vec::new();
    let bytes = input.as_bytes();
    let mut i = 0usize;

    while i < bytes.len() {
        let c = bytes[i] as char;
        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        let start = i;

        // property alias: ${name}
        if c == '$' && bytes.get(i + 1) == Some(&b'{') {
            let body = start + 2;
            let end = input[body..]
                .find('}')
                .map(|offset| body + offset)
                .ok_or_else(|| ConditionError::parse(start, "unclosed property reference: ${"))?;
            let name = input[body..end].trim();
            if name.is_empty() {
                return Err(ConditionError::parse(start, "empty property reference"));
            }
            i = end + 1;
            out.push(Token {
                kind: TokenKind::Property(name.to_string()),
                span: Span { start, end: i },
            });
            continue;
        }

        // string literal, no escapes
        if c == '\'' || c == '"' {
            let body = start + 1;
            let end = input[body..]
                .find(c)
                .map(|offset| body + offset)
                .ok_or_else(|| ConditionError::parse(start, "unterminated string literal"))?;
            let text = &input[body..end];
            check_aliases_closed(text, body)?;
            i = end + 1;
            out.push(Token {
                kind: TokenKind::Str(text.to_string()),
                span: Span { start, end: i },
            });
            continue;
        }

        // number: [0-9]+(.[0-9]+)?([eE][+-]?[0-9]+)? with an optional type suffix
        if c.is_ascii_digit()
            || (c == '.' && bytes.get(i + 1).map_or(false, |b| b.is_ascii_digit()))
        {
            i = scan_number(bytes, i)?;
            let text = &input[start..i];
            let value: f64 = text
                .parse()
                .map_err(|_| ConditionError::parse(start, format!("invalid number '{}'", text)))?;

            if i < bytes.len() && matches!(bytes[i], b'f' | b'F' | b'l' | b'L' | b'd' | b'D') {
                i += 1;
            }
            if i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || matches!(bytes[i], b'_' | b'.')) {
                return Err(ConditionError::parse(
                    start,
                    format!("invalid number '{}'", &input[start..=i]),
                ));
            }

            out.push(Token {
                kind: TokenKind::Number(value),
                span: Span { start, end: i },
            });
            continue;
        }

        // identifier, dots allowed after the first character
        if c.is_ascii_alphabetic() || c == '_' {
            i += 1;
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || matches!(bytes[i], b'_' | b'.')) {
                i += 1;
            }
            out.push(Token {
                kind: TokenKind::Ident(input[start..i].to_string()),
                span: Span { start, end: i },
            });
            continue;
        }

        // two-char operators
        if i + 1 < bytes.len() {
            let kind = match &bytes[i..i + 2] {
                b"&&" => Some(TokenKind::AndAnd),
                b"||" => Some(TokenKind::OrOr),
                b"==" => Some(TokenKind::EqEq),
                b"!=" => Some(TokenKind::Ne),
                b"<=" => Some(TokenKind::Le),
                b">=" => Some(TokenKind::Ge),
                _ => None,
            };
            if let Some(kind) = kind {
                i += 2;
                out.push(Token {
                    kind,
                    span: Span { start, end: i },
                });
                continue;
            }
        }

        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '<' => TokenKind::Lt,
            '>' => TokenKind::Gt,
            '=' => return Err(ConditionError::parse(start, "unexpected '=', did you mean '=='?")),
            '!' => {
                return Err(ConditionError::parse(
                    start,
                    "unexpected '!', use not(...) or '!='",
                ))
            }
            _ => {
                let ch = input[start..].chars().next().unwrap_or(c);
                return Err(ConditionError::parse(start, format!("unexpected character '{}'", ch)));
            }
        };
        i += 1;
        out.push(Token {
            kind,
            span: Span { start, end: i },
        });
    }

    out.push(Token {
        kind: TokenKind::Eof,
        span: Span {
            start: input.len(),
            end: input.len(),
        },
    });

    trace!(count = out.len(), "tokenized condition");
    Ok(out)
}

fn scan_number(bytes: &[u8], mut i: usize) -> ConditionResult<usize> {
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' && bytes.get(i + 1).map_or(false, |b| b.is_ascii_digit()) {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
    }

    // exponent, only when digits follow
    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        let mut j = i + 1;
        if j < bytes.len() && matches!(bytes[j], b'+' | b'-') {
            j += 1;
        }
        if j < bytes.len() && bytes[j].is_ascii_digit() {
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            i = j;
        }
    }

    Ok(i)
}

fn check_aliases_closed(text: &str, offset: usize) -> ConditionResult<()> {
    let mut rest = text;
    let mut base = offset;
    while let Some(start) = rest.find("${") {
        match rest[start + 2..].find('}') {
            Some(end) => {
                let consumed = start + 2 + end + 1;
                base += consumed;
                rest = &rest[consumed..];
            }
            None => {
                return Err(ConditionError::parse(
                    base + start,
                    "unclosed property reference: ${",
                ))
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        lex(input).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("a==b != c<=d>=e<f>g && h || i"),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::EqEq,
                TokenKind::Ident("b".into()),
                TokenKind::Ne,
                TokenKind::Ident("c".into()),
                TokenKind::Le,
                TokenKind::Ident("d".into()),
                TokenKind::Ge,
                TokenKind::Ident("e".into()),
                TokenKind::Lt,
                TokenKind::Ident("f".into()),
                TokenKind::Gt,
                TokenKind::Ident("g".into()),
                TokenKind::AndAnd,
                TokenKind::Ident("h".into()),
                TokenKind::OrOr,
                TokenKind::Ident("i".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_number_suffixes() {
        for input in ["42", "42.0", "42f", "42.0f", "42L", "42l", "42.0d"] {
            assert_eq!(kinds(input), vec![TokenKind::Number(42.0), TokenKind::Eof], "{}", input);
        }
        assert_eq!(kinds("1.5e3")[0], TokenKind::Number(1500.0));
        assert_eq!(kinds(".5")[0], TokenKind::Number(0.5));
    }

    #[test]
    fn test_invalid_number() {
        assert!(lex("42abc").is_err());
        assert!(lex("1.2.3").is_err());
    }

    #[test]
    fn test_strings_and_properties() {
        assert_eq!(
            kinds("contains(\"it's\", '${a}/x') + ${os.name}"),
            vec![
                TokenKind::Ident("contains".into()),
                TokenKind::LParen,
                TokenKind::Str("it's".into()),
                TokenKind::Comma,
                TokenKind::Str("${a}/x".into()),
                TokenKind::RParen,
                TokenKind::Plus,
                TokenKind::Property("os.name".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_spans() {
        let tokens = lex("ab + ${c}").unwrap();
        assert_eq!(tokens[0].span, Span { start: 0, end: 2 });
        assert_eq!(tokens[1].span, Span { start: 3, end: 4 });
        assert_eq!(tokens[2].span, Span { start: 5, end: 9 });
        assert_eq!(tokens[3].span, Span { start: 9, end: 9 });
    }

    #[test]
    fn test_unclosed_references() {
        assert!(matches!(
            lex("${unclosed"),
            Err(ConditionError::Parse { offset: 0, .. })
        ));
        assert!(matches!(
            lex("'a/${b'"),
            Err(ConditionError::Parse { offset: 3, .. })
        ));
        assert!(lex("'unterminated").is_err());
        assert!(lex("${}").is_err());
    }

    #[test]
    fn test_lone_operator_characters() {
        assert!(lex("a = b").is_err());
        assert!(lex("!a").is_err());
        assert!(lex("a & b").is_err());
        assert!(lex("a | b").is_err());
        assert!(lex("a # b").is_err());
    }
}
