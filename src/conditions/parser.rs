//! recursive-descent parser: tokens -> condition AST
//!
//! precedence, lowest first:
//! `||` < `&&` < `== !=` < `< <= > >=` < `+ -` < `* /` < unary `-` < primary
//!
//! an identifier immediately followed by `(` is a function call, `true` and
//! `false` (any case) are boolean literals, any other bare identifier is an
//! error.

use tracing::trace;

use super::error::{ConditionError, ConditionResult};
use super::lexer::{lex, Token, TokenKind};
use super::types::{BinaryOp, Expr, UnaryOp, Value};

/// parse a condition expression into an AST
pub fn parse_expression(src: &str) -> ConditionResult<Expr> {
    let tokens = lex(src)?;
    let mut p = Parser { tokens, pos: 0 };

    if p.peek().kind == TokenKind::Eof {
        return Err(ConditionError::parse(0, "empty expression"));
    }

    let expr = p.parse_or()?;
    match &p.peek().kind {
        TokenKind::Eof => {}
        TokenKind::RParen => {
            return Err(ConditionError::parse(
                p.offset(),
                "mismatched parentheses: unexpected ')'",
            ))
        }
        other => {
            return Err(ConditionError::parse(
                p.offset(),
                format!("unexpected {}", other.describe()),
            ))
        }
    }

    trace!(expression = src, ast = %expr, "parsed condition");
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        // lex always terminates the stream with Eof
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn bump(&mut self) -> Token {
        let t = self.peek().clone();
        if t.kind != TokenKind::Eof {
            self.pos += 1;
        }
        t
    }

    fn offset(&self) -> usize {
        self.peek().span.start
    }

    fn consume(&mut self, kind: TokenKind) -> bool {
        if self.peek().kind == kind {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect_close(&mut self, what: &str) -> ConditionResult<()> {
        if self.consume(TokenKind::RParen) {
            Ok(())
        } else {
            Err(ConditionError::parse(
                self.offset(),
                format!(
                    "mismatched parentheses: missing ')' {}, found {}",
                    what,
                    self.peek().kind.describe()
                ),
            ))
        }
    }

    fn parse_or(&mut self) -> ConditionResult<Expr> {
        let mut e = self.parse_and()?;
        while self.consume(TokenKind::OrOr) {
            let r = self.parse_and()?;
            e = Expr::binary(BinaryOp::Or, e, r);
        }
        Ok(e)
    }

    fn parse_and(&mut self) -> ConditionResult<Expr> {
        let mut e = self.parse_equality()?;
        while self.consume(TokenKind::AndAnd) {
            let r = self.parse_equality()?;
            e = Expr::binary(BinaryOp::And, e, r);
        }
        Ok(e)
    }

    fn parse_equality(&mut self) -> ConditionResult<Expr> {
        let mut e = self.parse_relational()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::Ne => BinaryOp::Ne,
                _ => break,
            };
            self.bump();
            let r = self.parse_relational()?;
            e = Expr::binary(op, e, r);
        }
        Ok(e)
    }

    fn parse_relational(&mut self) -> ConditionResult<Expr> {
        let mut e = self.parse_additive()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::Le => BinaryOp::Le,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::Ge => BinaryOp::Ge,
                _ => break,
            };
            self.bump();
            let r = self.parse_additive()?;
            e = Expr::binary(op, e, r);
        }
        Ok(e)
    }

    fn parse_additive(&mut self) -> ConditionResult<Expr> {
        let mut e = self.parse_multiplicative()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.bump();
            let r = self.parse_multiplicative()?;
            e = Expr::binary(op, e, r);
        }
        Ok(e)
    }

    fn parse_multiplicative(&mut self) -> ConditionResult<Expr> {
        let mut e = self.parse_unary()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                _ => break,
            };
            self.bump();
            let r = self.parse_unary()?;
            e = Expr::binary(op, e, r);
        }
        Ok(e)
    }

    fn parse_unary(&mut self) -> ConditionResult<Expr> {
        if self.consume(TokenKind::Minus) {
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Neg,
                operand: Box::new(operand),
            });
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> ConditionResult<Expr> {
        let start = self.offset();
        let token = self.bump();
        match token.kind {
            TokenKind::Number(n) => Ok(Expr::Literal(Value::Number(n))),
            TokenKind::Str(s) => Ok(Expr::Literal(Value::String(s))),
            TokenKind::Property(name) => Ok(Expr::Property(name)),
            TokenKind::LParen => {
                let inner = self.parse_or()?;
                self.expect_close("after grouped expression")?;
                Ok(Expr::Group(Box::new(inner)))
            }
            TokenKind::Ident(name) => {
                if self.peek().kind == TokenKind::LParen {
                    self.bump();
                    let args = self.parse_arguments(&name)?;
                    return Ok(Expr::Call { name, args });
                }
                if name.eq_ignore_ascii_case("true") {
                    Ok(Expr::Literal(Value::Bool(true)))
                } else if name.eq_ignore_ascii_case("false") {
                    Ok(Expr::Literal(Value::Bool(false)))
                } else {
                    Err(ConditionError::parse(
                        start,
                        format!("unknown identifier '{}'", name),
                    ))
                }
            }
            TokenKind::Eof => Err(ConditionError::parse(start, "unexpected end of expression")),
            TokenKind::RParen => Err(ConditionError::parse(
                start,
                "mismatched parentheses: unexpected ')'",
            )),
            other => Err(ConditionError::parse(
                start,
                format!("unexpected {}", other.describe()),
            )),
        }
    }

    /// arguments after the opening `(` of a call
    fn parse_arguments(&mut self, name: &str) -> ConditionResult<Vec<Expr>> {
        let mut args = Vec::new();
        if self.consume(TokenKind::RParen) {
            return Ok(args);
        }

        loop {
            args.push(self.parse_or()?);
            if self.consume(TokenKind::Comma) {
                if matches!(self.peek().kind, TokenKind::RParen) {
                    return Err(ConditionError::parse(
                        self.offset(),
                        format!("trailing ',' in call to '{}'", name),
                    ));
                }
                continue;
            }
            self.expect_close(&format!("in call to '{}'", name))?;
            return Ok(args);
        }
    }
}
