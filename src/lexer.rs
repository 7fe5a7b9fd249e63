// ABOUTME: Single-pass lexer turning source text into a position-tagged token stream

use crate::error::ElangError;
use crate::token::{StringPart, Token, TokenKind};

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    column: u32,
}

/// Tokenize a full source string. The returned stream always ends with Eof.
pub fn tokenize(source: &str) -> Result<Vec<Token>, ElangError> {
    Lexer::new(source).run()
}

/// Tokenize text that was lifted out of a larger source, offsetting all
/// positions so diagnostics point at the enclosing program. Used for the
/// expression fragments of interpolated strings.
pub fn tokenize_at(source: &str, line: u32, column: u32) -> Result<Vec<Token>, ElangError> {
    let mut lexer = Lexer::new(source);
    lexer.line = line;
    lexer.column = column;
    lexer.run()
}

impl Lexer {
    fn new(source: &str) -> Self {
        Lexer {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn run(mut self) -> Result<Vec<Token>, ElangError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_blanks();
            let (line, column) = (self.line, self.column);
            let Some(c) = self.peek() else {
                tokens.push(Token::new(TokenKind::Eof, line, column));
                return Ok(tokens);
            };

            // $$ starts a line comment; a single $ is not part of the language
            if c == '$' {
                if self.peek_at(1) == Some('$') {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                    continue;
                }
                return Err(ElangError::syntax("Unexpected character '$'", line, column)
                    .with_hint("comments start with '$$'"));
            }

            if c == '\n' {
                self.bump();
                tokens.push(Token::new(TokenKind::Newline, line, column));
                continue;
            }

            if c == '"' || c == '\'' {
                tokens.push(self.lex_string(c)?);
                continue;
            }

            if c.is_ascii_digit() {
                tokens.push(self.lex_number());
                continue;
            }

            if c.is_alphabetic() || c == '_' {
                tokens.push(self.lex_word());
                continue;
            }

            tokens.push(self.lex_operator()?);
        }
    }

    // ------------------------------------------------------------------
    // Character helpers
    // ------------------------------------------------------------------

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Skip spaces, tabs, and carriage returns. Newlines are tokens.
    fn skip_blanks(&mut self) {
        while let Some(c) = self.peek() {
            if c == ' ' || c == '\t' || c == '\r' {
                self.bump();
            } else {
                break;
            }
        }
    }

    // ------------------------------------------------------------------
    // Token scanners
    // ------------------------------------------------------------------

    fn lex_number(&mut self) -> Token {
        let (line, column) = (self.line, self.column);
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }

        // A dot makes this a float, unless it is the range operator '..'
        // or the start of a method call on the literal.
        if self.peek() == Some('.')
            && self.peek_at(1) != Some('.')
            && self.peek_at(1).is_some_and(|c| c.is_ascii_digit())
        {
            text.push('.');
            self.bump();
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    text.push(c);
                    self.bump();
                } else {
                    break;
                }
            }
            let value: f64 = text.parse().unwrap_or(0.0);
            return Token::new(TokenKind::Float(value), line, column);
        }

        let value: i64 = text.parse().unwrap_or(0);
        Token::new(TokenKind::Int(value), line, column)
    }

    fn lex_word(&mut self) -> Token {
        let (line, column) = (self.line, self.column);
        let mut word = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                word.push(c);
                self.bump();
            } else {
                break;
            }
        }
        match TokenKind::keyword(&word) {
            Some(kind) => Token::new(kind, line, column),
            None => Token::new(TokenKind::Ident(word), line, column),
        }
    }

    /// Lex a quoted string. Double quotes allow `{expr}` interpolation;
    /// single quotes are always plain.
    fn lex_string(&mut self, quote: char) -> Result<Token, ElangError> {
        let (line, column) = (self.line, self.column);
        self.bump(); // opening quote

        let mut parts: Vec<StringPart> = Vec::new();
        let mut current = String::new();

        loop {
            let Some(c) = self.peek() else {
                return Err(ElangError::syntax("Unterminated string", line, column)
                    .with_hint(format!("expected a closing {}", quote)));
            };

            if c == quote {
                self.bump();
                break;
            }

            if c == '\\' {
                self.bump();
                let Some(escaped) = self.bump() else {
                    return Err(ElangError::syntax("Unterminated string", line, column)
                        .with_hint(format!("expected a closing {}", quote)));
                };
                current.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    '\\' => '\\',
                    '"' => '"',
                    '\'' => '\'',
                    '{' => '{',
                    other => other,
                });
                continue;
            }

            if c == '{' && quote == '"' {
                self.bump();
                let expr = self.lex_interpolation(line, column)?;
                if !current.is_empty() {
                    parts.push(StringPart::Lit(std::mem::take(&mut current)));
                }
                parts.push(StringPart::Expr(expr));
                continue;
            }

            current.push(c);
            self.bump();
        }

        if parts.is_empty() {
            return Ok(Token::new(TokenKind::Str(current), line, column));
        }
        if !current.is_empty() {
            parts.push(StringPart::Lit(current));
        }
        Ok(Token::new(TokenKind::InterpStr(parts), line, column))
    }

    /// Capture the text between balanced braces, character for character
    fn lex_interpolation(&mut self, line: u32, column: u32) -> Result<String, ElangError> {
        let mut depth = 1usize;
        let mut text = String::new();
        loop {
            let Some(c) = self.peek() else {
                return Err(ElangError::syntax("Unterminated interpolation", line, column)
                    .with_hint("expected a closing '}'"));
            };
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        self.bump();
                        return Ok(text);
                    }
                }
                _ => {}
            }
            text.push(c);
            self.bump();
        }
    }

    fn lex_operator(&mut self) -> Result<Token, ElangError> {
        let (line, column) = (self.line, self.column);
        let c = self.peek().expect("caller checked");
        let next = self.peek_at(1);

        // Two-character operators must win over their one-character prefixes
        let two = match (c, next) {
            ('*', Some('*')) => Some(TokenKind::StarStar),
            ('.', Some('.')) => Some(TokenKind::DotDot),
            ('=', Some('>')) => Some(TokenKind::FatArrow),
            ('-', Some('>')) => Some(TokenKind::Arrow),
            ('+', Some('=')) => Some(TokenKind::PlusEq),
            ('-', Some('=')) => Some(TokenKind::MinusEq),
            ('*', Some('=')) => Some(TokenKind::StarEq),
            ('/', Some('=')) => Some(TokenKind::SlashEq),
            ('=', Some('=')) => Some(TokenKind::EqEq),
            ('!', Some('=')) => Some(TokenKind::NotEq),
            ('<', Some('=')) => Some(TokenKind::LessEq),
            ('>', Some('=')) => Some(TokenKind::GreaterEq),
            ('&', Some('&')) => Some(TokenKind::AmpAmp),
            _ => None,
        };
        if let Some(kind) = two {
            self.bump();
            self.bump();
            return Ok(Token::new(kind, line, column));
        }

        let kind = match c {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '=' => TokenKind::Assign,
            '<' => TokenKind::Less,
            '>' => TokenKind::Greater,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            ':' => TokenKind::Colon,
            other => {
                return Err(ElangError::syntax(
                    format!("Unexpected character '{}'", other),
                    line,
                    column,
                ));
            }
        };
        self.bump();
        Ok(Token::new(kind, line, column))
    }
}
