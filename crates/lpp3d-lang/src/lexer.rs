use std::iter::Peekable;
use std::str::CharIndices;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Keywords
    Maximize,

    // Literals
    Ident,
    Number,

    // Operators
    Plus,
    Minus,
    Star,
    Le,
    Colon,

    // Special
    Newline,
    Comment,
    Eof,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, text: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            text: text.into(),
        }
    }
}

/// Splits `.lp` source into tokens. Whitespace other than newlines is dropped;
/// comments are kept as tokens so the parser can skip them.
pub struct Lexer<'a> {
    source: &'a str,
    rest: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            rest: source.char_indices().peekable(),
        }
    }

    pub fn tokenize(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }

    /// Byte offset of the next unread character
    fn offset(&mut self) -> usize {
        self.rest.peek().map_or(self.source.len(), |&(i, _)| i)
    }

    fn second(&self) -> Option<char> {
        let mut ahead = self.rest.clone();
        ahead.next();
        ahead.next().map(|(_, c)| c)
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.rest.next_if(|&(_, c)| pred(c)).is_some() {}
    }

    /// Token covering everything consumed since `start`
    fn finish(&mut self, kind: TokenKind, start: usize) -> Token {
        let end = self.offset();
        Token::new(kind, Span::new(start, end), &self.source[start..end])
    }

    fn number(&mut self, start: usize) -> Token {
        self.eat_while(|c| c.is_ascii_digit());
        if self.rest.next_if(|&(_, c)| c == '.').is_some() {
            self.eat_while(|c| c.is_ascii_digit());
        }
        self.finish(TokenKind::Number, start)
    }

    fn word(&mut self, start: usize) -> Token {
        self.eat_while(|c| c.is_alphanumeric() || c == '_');
        let token = self.finish(TokenKind::Ident, start);
        if matches!(token.text.as_str(), "max" | "maximize") {
            Token { kind: TokenKind::Maximize, ..token }
        } else {
            token
        }
    }

    pub fn next_token(&mut self) -> Token {
        self.eat_while(|c| matches!(c, ' ' | '\t' | '\r'));

        let start = self.offset();
        let Some(&(_, c)) = self.rest.peek() else {
            return Token::new(TokenKind::Eof, Span::new(start, start), "");
        };

        let kind = match (c, self.second()) {
            ('#', _) | ('/', Some('/')) => {
                self.eat_while(|c| c != '\n');
                return self.finish(TokenKind::Comment, start);
            }
            ('.', Some(n)) if n.is_ascii_digit() => return self.number(start),
            (c, _) if c.is_ascii_digit() => return self.number(start),
            (c, _) if c.is_alphabetic() || c == '_' => return self.word(start),
            ('<', Some('=')) => {
                self.rest.next();
                TokenKind::Le
            }
            ('≤', _) => TokenKind::Le,
            ('\n', _) => TokenKind::Newline,
            ('+', _) => TokenKind::Plus,
            ('-', _) => TokenKind::Minus,
            ('*', _) => TokenKind::Star,
            (':', _) => TokenKind::Colon,
            _ => TokenKind::Error,
        };
        self.rest.next();
        self.finish(kind, start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize(source).iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            kinds("max maximize maxi"),
            vec![
                TokenKind::Maximize,
                TokenKind::Maximize,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        let tokens = Lexer::tokenize("100 8.5 .25 0.005");
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["100", "8.5", ".25", "0.005", ""]);
    }

    #[test]
    fn test_coefficient_glued_to_variable() {
        let tokens = Lexer::tokenize("3x-2.5y");
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["3", "x", "-", "2.5", "y", ""]);
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("+ - * <= ≤ :"),
            vec![
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Le,
                TokenKind::Le,
                TokenKind::Colon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            kinds("x # comment\ny // another\n"),
            vec![
                TokenKind::Ident,
                TokenKind::Comment,
                TokenKind::Newline,
                TokenKind::Ident,
                TokenKind::Comment,
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_unsupported_operators_are_errors() {
        let tokens = Lexer::tokenize("x >= 1");
        assert_eq!(tokens[1].kind, TokenKind::Error);
        assert_eq!(tokens[1].text, ">");
        assert_eq!(tokens[1].span, Span::new(2, 3));
    }

    #[test]
    fn test_spans_are_byte_offsets() {
        let tokens = Lexer::tokenize("x ≤ 4\n");
        let spans: Vec<_> = tokens.iter().map(|t| (t.span.start, t.span.end)).collect();
        assert_eq!(spans, vec![(0, 1), (2, 5), (6, 7), (7, 8), (8, 8)]);
        assert_eq!(tokens[1].text, "≤");
    }
}
