use crate::ast::*;
use crate::lexer::{Span, Token, TokenKind};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected token: expected {expected}, found {found} at position {span:?}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },
    #[error("Unexpected end of file")]
    UnexpectedEof,
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn parse(source: &str) -> Result<Program, ParseError> {
        let tokens = crate::lexer::Lexer::tokenize(source);
        let mut parser = Parser::new(tokens);
        parser.parse_program()
    }

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> TokenKind {
        self.current().map(|t| t.kind).unwrap_or(TokenKind::Eof)
    }

    fn peek_kind_at(&self, offset: usize) -> TokenKind {
        self.tokens
            .get(self.pos + offset)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn skip_newlines_and_comments(&mut self) {
        while matches!(self.peek_kind(), TokenKind::Newline | TokenKind::Comment) {
            self.advance();
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.current() {
            Some(t) if t.kind == TokenKind::Eof => ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: "end of file".to_string(),
                span: t.span,
            },
            Some(t) => ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: format!("'{}'", t.text.escape_default()),
                span: t.span,
            },
            None => ParseError::UnexpectedEof,
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token, ParseError> {
        match self.current() {
            Some(t) if t.kind == kind => {
                let token = t.clone();
                self.advance();
                Ok(token)
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    /// Statements end at a newline, a comment, or the end of input
    fn expect_line_end(&mut self) -> Result<(), ParseError> {
        match self.peek_kind() {
            TokenKind::Newline | TokenKind::Comment | TokenKind::Eof => Ok(()),
            _ => Err(self.unexpected("end of line")),
        }
    }

    fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut statements = Vec::new();

        loop {
            self.skip_newlines_and_comments();

            let statement = match self.peek_kind() {
                TokenKind::Eof => break,
                TokenKind::Maximize => Statement::Objective(self.parse_objective()?),
                TokenKind::Ident | TokenKind::Number | TokenKind::Plus | TokenKind::Minus => {
                    Statement::Constraint(self.parse_constraint()?)
                }
                _ => return Err(self.unexpected("maximize or a constraint")),
            };
            self.expect_line_end()?;
            statements.push(statement);
        }

        Ok(Program { statements })
    }

    fn parse_objective(&mut self) -> Result<Objective, ParseError> {
        let start = self.expect(TokenKind::Maximize, "maximize")?.span;
        let terms = self.parse_terms()?;
        let end = terms.last().map(|t| t.span).unwrap_or(start);

        Ok(Objective {
            span: start.merge(end),
            terms,
        })
    }

    fn parse_constraint(&mut self) -> Result<Constraint, ParseError> {
        let start = self.current().map(|t| t.span).unwrap_or(Span::new(0, 0));

        let mut label = None;
        if self.peek_kind() == TokenKind::Ident && self.peek_kind_at(1) == TokenKind::Colon {
            label = Some(self.expect(TokenKind::Ident, "label")?.text);
            self.advance();
        }

        let terms = self.parse_terms()?;
        self.expect(TokenKind::Le, "'<='")?;
        let (rhs, end) = self.parse_signed_number()?;

        Ok(Constraint {
            span: start.merge(end),
            label,
            terms,
            rhs,
        })
    }

    /// `[+|-] term ((+|-) term)*`
    fn parse_terms(&mut self) -> Result<Vec<Term>, ParseError> {
        let mut terms = Vec::new();

        let (sign, sign_span) = self.parse_sign();
        terms.push(self.parse_term(sign, sign_span)?);

        while matches!(self.peek_kind(), TokenKind::Plus | TokenKind::Minus) {
            let (sign, sign_span) = self.parse_sign();
            terms.push(self.parse_term(sign, sign_span)?);
        }

        Ok(terms)
    }

    fn parse_sign(&mut self) -> (f64, Option<Span>) {
        match self.peek_kind() {
            TokenKind::Plus | TokenKind::Minus => {
                let negative = self.peek_kind() == TokenKind::Minus;
                let span = self.advance().map(|t| t.span);
                (if negative { -1.0 } else { 1.0 }, span)
            }
            _ => (1.0, None),
        }
    }

    /// `number [*] variable` or a bare `variable`
    fn parse_term(&mut self, sign: f64, sign_span: Option<Span>) -> Result<Term, ParseError> {
        let mut coefficient = sign;
        let mut span = sign_span;

        if self.peek_kind() == TokenKind::Number {
            let (value, number_span) = self.parse_number()?;
            coefficient *= value;
            span = Some(span.map_or(number_span, |s| s.merge(number_span)));
            if self.peek_kind() == TokenKind::Star {
                self.advance();
            }
        }

        let variable = self.expect(TokenKind::Ident, "variable")?;

        Ok(Term {
            span: span.map_or(variable.span, |s| s.merge(variable.span)),
            coefficient,
            variable: variable.text,
        })
    }

    fn parse_number(&mut self) -> Result<(f64, Span), ParseError> {
        let token = self.expect(TokenKind::Number, "number")?;
        let value = token
            .text
            .parse::<f64>()
            .map_err(|_| ParseError::InvalidNumber(token.text.clone()))?;
        Ok((value, token.span))
    }

    fn parse_signed_number(&mut self) -> Result<(f64, Span), ParseError> {
        let (sign, sign_span) = self.parse_sign();
        let (value, span) = self.parse_number()?;
        Ok((sign * value, sign_span.map_or(span, |s| s.merge(span))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_objective() {
        let program = Parser::parse("maximize 3x + 2*y - z").unwrap();
        assert_eq!(program.statements.len(), 1);
        match &program.statements[0] {
            Statement::Objective(o) => {
                let terms: Vec<_> = o.terms.iter().map(|t| (t.coefficient, t.variable.as_str())).collect();
                assert_eq!(terms, vec![(3.0, "x"), (2.0, "y"), (-1.0, "z")]);
                assert_eq!(o.span, Span::new(0, 21));
            }
            _ => panic!("Expected objective"),
        }
    }

    #[test]
    fn test_parse_constraints() {
        let source = r#"
            max x
            cap: x + y + z <= 10
            -2x - 0.5y <= -1  # lower bound in disguise
        "#;
        let program = Parser::parse(source).unwrap();
        assert_eq!(program.statements.len(), 3);

        match &program.statements[1] {
            Statement::Constraint(c) => {
                assert_eq!(c.label.as_deref(), Some("cap"));
                assert_eq!(c.terms.len(), 3);
                assert_eq!(c.rhs, 10.0);
            }
            _ => panic!("Expected constraint"),
        }

        match &program.statements[2] {
            Statement::Constraint(c) => {
                assert_eq!(c.label, None);
                let coefficients: Vec<_> = c.terms.iter().map(|t| t.coefficient).collect();
                assert_eq!(coefficients, vec![-2.0, -0.5]);
                assert_eq!(c.rhs, -1.0);
            }
            _ => panic!("Expected constraint"),
        }
    }

    #[test]
    fn test_term_span_covers_sign() {
        let program = Parser::parse("x - 4y <= 2").unwrap();
        let Statement::Constraint(c) = &program.statements[0] else {
            panic!("Expected constraint");
        };
        assert_eq!(c.terms[1].span, Span::new(2, 6));
        assert_eq!(c.span, Span::new(0, 11));
    }

    #[test]
    fn test_rejects_greater_equal() {
        let err = Parser::parse("x + y >= 3").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnexpectedToken {
                expected: "'<='".to_string(),
                found: "'>'".to_string(),
                span: Span::new(6, 7),
            }
        );
    }

    #[test]
    fn test_requires_line_break_between_statements() {
        let err = Parser::parse("x <= 1 y <= 2").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { ref expected, .. } if expected == "end of line"));
    }

    #[test]
    fn test_missing_rhs() {
        let err = Parser::parse("x + y <=").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnexpectedToken {
                expected: "number".to_string(),
                found: "end of file".to_string(),
                span: Span::new(8, 8),
            }
        );
    }

    #[test]
    fn test_invalid_number() {
        let err = Parser::parse("1.2.3x <= 1").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { .. } | ParseError::InvalidNumber(_)));
    }
}
