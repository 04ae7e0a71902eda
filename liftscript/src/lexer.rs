//! Lexer
//!
//! Turns source text into tokens. Numbers may carry a weight unit suffix
//! (`135lb`, `60 kg`), and dotted names such as `state.weight` come out
//! as a single identifier.

use crate::ast::Span;
use liftscript_core::{ScriptError, Unit};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Number(f64),
    Weight(f64, Unit),
    Str(String),
    Ident(String),

    // Keywords
    If,
    Else,
    For,
    While,
    From,
    To,
    Return,
    True,
    False,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Eq,  // ==
    Ne,  // !=
    Lt,
    Le,
    Gt,
    Ge,
    And, // &&
    Or,  // ||
    Not, // !
    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    Question,
    Colon,

    // Delimiters
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Semicolon,

    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text of the token
    pub text: String,
    pub span: Span,
    /// A line break (or a comment spanning one) came before this token.
    /// The parser uses it to end statements.
    pub newline_before: bool,
}

impl Token {
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// How the token reads in an error message
    pub fn describe(&self) -> String {
        match &self.kind {
            TokenKind::Eof => "end of input".to_string(),
            TokenKind::Number(_) | TokenKind::Weight(..) => format!("number '{}'", self.text),
            TokenKind::Str(_) => "string literal".to_string(),
            TokenKind::Ident(name) => format!("identifier '{}'", name),
            _ => format!("'{}'", self.text),
        }
    }
}

fn keyword(word: &str) -> Option<TokenKind> {
    Some(match word {
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        "for" => TokenKind::For,
        "while" => TokenKind::While,
        "from" => TokenKind::From,
        "to" => TokenKind::To,
        "return" => TokenKind::Return,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        _ => return None,
    })
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[derive(Debug, Clone, Copy)]
struct Mark {
    pos: usize,
    line: usize,
    col: usize,
}

pub struct Lexer {
    source: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, ScriptError> {
        let mut tokens: Vec<Token> = Vec::new();

        loop {
            let line_before = self.line;
            self.skip_whitespace_and_comments()?;
            let newline_before = tokens.is_empty() || self.line > line_before;

            if self.at_end() {
                let start = self.mark();
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    text: String::new(),
                    span: self.span_from(start),
                    newline_before,
                });
                break;
            }

            let mut token = self.next_token()?;
            token.newline_before = newline_before;
            tokens.push(token);
        }

        Ok(tokens)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.source.get(self.pos + n).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.source.get(self.pos).copied()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn mark(&self) -> Mark {
        Mark { pos: self.pos, line: self.line, col: self.col }
    }

    fn reset(&mut self, mark: Mark) {
        self.pos = mark.pos;
        self.line = mark.line;
        self.col = mark.col;
    }

    fn span_from(&self, start: Mark) -> Span {
        Span {
            offset: start.pos,
            len: self.pos - start.pos,
            line: start.line,
            column: start.col,
        }
    }

    fn text_from(&self, start: Mark) -> String {
        self.source[start.pos..self.pos].iter().collect()
    }

    fn error_at(&self, err: ScriptError, at: Mark) -> ScriptError {
        err.at(self.span_from(at).position())
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), ScriptError> {
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some(c), _) if c.is_whitespace() => {
                    self.advance();
                }
                (Some('/'), Some('/')) => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                (Some('/'), Some('*')) => {
                    let start = self.mark();
                    self.advance();
                    self.advance();
                    loop {
                        match (self.peek(), self.peek_at(1)) {
                            (Some('*'), Some('/')) => {
                                self.advance();
                                self.advance();
                                break;
                            }
                            (Some(_), _) => {
                                self.advance();
                            }
                            (None, _) => {
                                return Err(self.error_at(ScriptError::unterminated_comment(), start));
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, ScriptError> {
        let start = self.mark();
        let c = match self.peek() {
            Some(c) => c,
            None => return Ok(self.make(TokenKind::Eof, start)),
        };

        if c.is_ascii_digit() {
            return self.lex_number(start);
        }
        if is_ident_start(c) {
            return Ok(self.lex_ident(start));
        }
        if c == '"' || c == '\'' {
            return self.lex_string(start, c);
        }

        self.advance();
        let next = self.peek();
        let kind = match (c, next) {
            ('+', Some('=')) => self.two(TokenKind::PlusAssign),
            ('-', Some('=')) => self.two(TokenKind::MinusAssign),
            ('*', Some('=')) => self.two(TokenKind::StarAssign),
            ('/', Some('=')) => self.two(TokenKind::SlashAssign),
            ('=', Some('=')) => self.two(TokenKind::Eq),
            ('!', Some('=')) => self.two(TokenKind::Ne),
            ('<', Some('=')) => self.two(TokenKind::Le),
            ('>', Some('=')) => self.two(TokenKind::Ge),
            ('&', Some('&')) => self.two(TokenKind::And),
            ('|', Some('|')) => self.two(TokenKind::Or),
            ('+', _) => TokenKind::Plus,
            ('-', _) => TokenKind::Minus,
            ('*', _) => TokenKind::Star,
            ('/', _) => TokenKind::Slash,
            ('%', _) => TokenKind::Percent,
            ('=', _) => TokenKind::Assign,
            ('!', _) => TokenKind::Not,
            ('<', _) => TokenKind::Lt,
            ('>', _) => TokenKind::Gt,
            ('?', _) => TokenKind::Question,
            (':', _) => TokenKind::Colon,
            ('(', _) => TokenKind::LParen,
            (')', _) => TokenKind::RParen,
            ('{', _) => TokenKind::LBrace,
            ('}', _) => TokenKind::RBrace,
            (',', _) => TokenKind::Comma,
            (';', _) => TokenKind::Semicolon,
            _ => return Err(self.error_at(ScriptError::unexpected_char(c), start)),
        };
        Ok(self.make(kind, start))
    }

    /// Consume the second character of a two-character operator
    fn two(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    fn make(&self, kind: TokenKind, start: Mark) -> Token {
        Token {
            kind,
            text: self.text_from(start),
            span: self.span_from(start),
            newline_before: false,
        }
    }

    fn consume_digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    fn lex_number(&mut self, start: Mark) -> Result<Token, ScriptError> {
        self.consume_digits();
        if self.peek() == Some('.') {
            if !self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
                let text = self.text_from(start);
                return Err(self.error_at(ScriptError::unterminated_number(&text), start));
            }
            self.advance();
            self.consume_digits();
        }

        let text = self.text_from(start);
        let value: f64 = text
            .parse()
            .map_err(|_| self.error_at(ScriptError::unterminated_number(&text), start))?;

        // Unit suffix, attached or after spaces on the same line
        let before_suffix = self.mark();
        while matches!(self.peek(), Some(' ') | Some('\t')) {
            self.advance();
        }
        let separated = self.pos > before_suffix.pos;

        if self.peek().is_some_and(is_ident_start) {
            let word_start = self.mark();
            while self.peek().is_some_and(is_ident_char) {
                self.advance();
            }
            let word = self.text_from(word_start);
            if let Some(unit) = Unit::from_suffix(&word) {
                return Ok(self.make(TokenKind::Weight(value, unit), start));
            }
            if !separated {
                let bad = word.chars().next().unwrap_or('?');
                return Err(self.error_at(ScriptError::unexpected_char(bad), word_start)
                    .with_suggestion("Weight units are lb, lbs or kg"));
            }
        }

        self.reset(before_suffix);
        Ok(self.make(TokenKind::Number(value), start))
    }

    fn lex_ident(&mut self, start: Mark) -> Token {
        while self.peek().is_some_and(is_ident_char) {
            self.advance();
        }
        let mut dotted = false;
        while self.peek() == Some('.') && self.peek_at(1).is_some_and(is_ident_start) {
            dotted = true;
            self.advance();
            while self.peek().is_some_and(is_ident_char) {
                self.advance();
            }
        }

        let text = self.text_from(start);
        let kind = match keyword(&text) {
            Some(kw) if !dotted => kw,
            _ => TokenKind::Ident(text),
        };
        self.make(kind, start)
    }

    fn lex_string(&mut self, start: Mark, quote: char) -> Result<Token, ScriptError> {
        self.advance();
        let mut value = String::new();
        loop {
            match self.peek() {
                None | Some('\n') => {
                    return Err(self.error_at(ScriptError::unterminated_string(), start));
                }
                Some(c) if c == quote => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    match self.advance() {
                        Some('n') => value.push('\n'),
                        Some('t') => value.push('\t'),
                        Some(c) => value.push(c),
                        None => {
                            return Err(self.error_at(ScriptError::unterminated_string(), start));
                        }
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
            }
        }
        Ok(self.make(TokenKind::Str(value), start))
    }
}

/// Tokenize source text. The last token is always `Eof`.
pub fn tokenize(source: &str) -> Result<Vec<Token>, ScriptError> {
    Lexer::new(source).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use liftscript_core::codes;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_arithmetic_tokens() {
        assert_eq!(
            kinds("(2 + 3) * 4"),
            vec![
                TokenKind::LParen,
                TokenKind::Number(2.0),
                TokenKind::Plus,
                TokenKind::Number(3.0),
                TokenKind::RParen,
                TokenKind::Star,
                TokenKind::Number(4.0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_weight_suffix() {
        assert_eq!(kinds("135lb"), vec![TokenKind::Weight(135.0, Unit::Lb), TokenKind::Eof]);
        assert_eq!(kinds("2.5 kg"), vec![TokenKind::Weight(2.5, Unit::Kg), TokenKind::Eof]);
        assert_eq!(kinds("5lbs"), vec![TokenKind::Weight(5.0, Unit::Lb), TokenKind::Eof]);
        assert_eq!(tokenize("5kgs").unwrap_err().code, codes::UNEXPECTED_CHAR);
    }

    #[test]
    fn test_number_followed_by_name() {
        assert_eq!(
            kinds("5 kgx"),
            vec![TokenKind::Number(5.0), TokenKind::Ident("kgx".into()), TokenKind::Eof]
        );
        let err = tokenize("5x").unwrap_err();
        assert_eq!(err.code, codes::UNEXPECTED_CHAR);
        assert_eq!(err.position.unwrap().offset, 1);
    }

    #[test]
    fn test_dotted_identifier() {
        assert_eq!(kinds("state.weight"), vec![TokenKind::Ident("state.weight".into()), TokenKind::Eof]);
        assert_eq!(kinds("if"), vec![TokenKind::If, TokenKind::Eof]);
    }

    #[test]
    fn test_comments_skipped() {
        let toks = tokenize("1 // one\n/* two\n */ 2").unwrap();
        assert_eq!(toks[1].kind, TokenKind::Number(2.0));
        assert!(toks[1].newline_before);
        assert_eq!(toks[1].span.line, 3);
    }

    #[test]
    fn test_two_char_operators() {
        assert_eq!(
            kinds("a += 1 <= b != c && !d"),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::PlusAssign,
                TokenKind::Number(1.0),
                TokenKind::Le,
                TokenKind::Ident("b".into()),
                TokenKind::Ne,
                TokenKind::Ident("c".into()),
                TokenKind::And,
                TokenKind::Not,
                TokenKind::Ident("d".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(kinds(r#""a\"b""#), vec![TokenKind::Str("a\"b".into()), TokenKind::Eof]);
        assert_eq!(kinds("'kg'"), vec![TokenKind::Str("kg".into()), TokenKind::Eof]);
    }

    #[test]
    fn test_lex_errors() {
        let err = tokenize("1 + @").unwrap_err();
        assert!(err.is_lex());
        assert_eq!(err.code, codes::UNEXPECTED_CHAR);
        assert_eq!(err.position.unwrap().column, 5);

        assert_eq!(tokenize("\"open").unwrap_err().code, codes::UNTERMINATED_STRING);
        assert_eq!(tokenize("1.").unwrap_err().code, codes::UNTERMINATED_NUMBER);
        assert_eq!(tokenize("/* never").unwrap_err().code, codes::UNTERMINATED_COMMENT);
        assert_eq!(tokenize("a & b").unwrap_err().code, codes::UNEXPECTED_CHAR);
    }

    #[test]
    fn test_eof_offset() {
        let toks = tokenize("1 + ").unwrap();
        let eof = toks.last().unwrap();
        assert!(eof.is_eof());
        assert_eq!(eof.span.offset, 4);
    }
}
