// ABOUTME: Recursive-descent parser with precedence-climbing expressions

use crate::ast::{BinOp, InterpPart, Node, NodeKind, SayEnd, UnOp};
use crate::error::ElangError;
use crate::lexer;
use crate::token::{StringPart, Token, TokenKind};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

/// Parse a full program into its root block
pub fn parse(tokens: Vec<Token>) -> Result<Node, ElangError> {
    Parser::new(tokens).program()
}

/// Lex and parse a whole source string in one step
pub fn parse_source(source: &str) -> Result<Node, ElangError> {
    parse(lexer::tokenize(source)?)
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn program(&mut self) -> Result<Node, ElangError> {
        let mut statements = Vec::new();
        self.skip_newlines();
        while !self.at(&TokenKind::Eof) {
            statements.push(self.statement()?);
            self.end_of_statement()?;
            self.skip_newlines();
        }
        Ok(Node::new(NodeKind::Block(statements), 1, 1))
    }

    // ------------------------------------------------------------------
    // Token helpers
    // ------------------------------------------------------------------

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    fn peek_at(&self, offset: usize) -> &TokenKind {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn at(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token, ElangError> {
        if self.at(&kind) {
            return Ok(self.advance());
        }
        let token = self.peek();
        let err = ElangError::parse(
            format!("Expected {}, found {}", what, token.kind.describe()),
            token.line,
            token.column,
        );
        Err(match kind {
            TokenKind::RBrace => err.with_hint("missing '}' to close this block"),
            TokenKind::RParen => err.with_hint("missing ')' to close the parentheses"),
            TokenKind::RBracket => err.with_hint("missing ']' to close the brackets"),
            _ => err,
        })
    }

    fn skip_newlines(&mut self) {
        while self.at(&TokenKind::Newline) {
            self.advance();
        }
    }

    /// Statements are separated by newlines (or end at a closer)
    fn end_of_statement(&mut self) -> Result<(), ElangError> {
        match self.peek_kind() {
            TokenKind::Newline | TokenKind::RBrace | TokenKind::Eof => Ok(()),
            other => {
                let token = self.peek();
                Err(ElangError::parse(
                    format!("Unexpected {} after statement", other.describe()),
                    token.line,
                    token.column,
                )
                .with_hint("statements are separated by newlines"))
            }
        }
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn statement(&mut self) -> Result<Node, ElangError> {
        match self.peek_kind() {
            TokenKind::Fn => self.fn_def(),
            TokenKind::Return => self.return_stmt(),
            TokenKind::If => self.if_stmt(),
            TokenKind::While => self.while_stmt(),
            TokenKind::For => self.for_stmt(),
            TokenKind::Use => self.use_stmt(),
            TokenKind::Break => {
                let token = self.advance();
                Ok(Node::new(NodeKind::Break, token.line, token.column))
            }
            TokenKind::Continue => {
                let token = self.advance();
                Ok(Node::new(NodeKind::Continue, token.line, token.column))
            }
            TokenKind::Say => self.say_stmt(),
            TokenKind::AmpAmp => self.command_stmt(),
            TokenKind::Ident(_) => self.ident_stmt(),
            _ => self.expression(),
        }
    }

    fn fn_def(&mut self) -> Result<Node, ElangError> {
        let kw = self.advance();
        let name = self.ident("a function name")?;
        self.expect(TokenKind::LParen, "'(' after the function name")?;
        let mut params = Vec::new();
        if !self.at(&TokenKind::RParen) {
            loop {
                params.push(self.ident("a parameter name")?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "')'")?;

        // Optional return annotation, recorded but never checked
        let return_type = if self.eat(&TokenKind::Arrow) {
            Some(self.ident("a type name after '->'")?)
        } else {
            None
        };

        let body = self.block()?;
        Ok(Node::new(
            NodeKind::FnDef {
                name,
                params,
                body: Box::new(body),
                return_type,
            },
            kw.line,
            kw.column,
        ))
    }

    fn return_stmt(&mut self) -> Result<Node, ElangError> {
        let kw = self.advance();
        let value = match self.peek_kind() {
            TokenKind::Newline | TokenKind::RBrace | TokenKind::Eof => None,
            _ => Some(Box::new(self.expression()?)),
        };
        Ok(Node::new(NodeKind::Return(value), kw.line, kw.column))
    }

    fn if_stmt(&mut self) -> Result<Node, ElangError> {
        let kw = self.advance();
        let cond = self.expression()?;
        let then = self.block()?;

        // `else` may sit on the same line or after newlines
        let saved = self.pos;
        self.skip_newlines();
        let otherwise = if self.eat(&TokenKind::Else) {
            if self.at(&TokenKind::If) {
                Some(Box::new(self.if_stmt()?))
            } else {
                Some(Box::new(self.block()?))
            }
        } else {
            self.pos = saved;
            None
        };

        Ok(Node::new(
            NodeKind::If {
                cond: Box::new(cond),
                then: Box::new(then),
                otherwise,
            },
            kw.line,
            kw.column,
        ))
    }

    fn while_stmt(&mut self) -> Result<Node, ElangError> {
        let kw = self.advance();
        let cond = self.expression()?;
        let body = self.block()?;
        Ok(Node::new(
            NodeKind::While {
                cond: Box::new(cond),
                body: Box::new(body),
            },
            kw.line,
            kw.column,
        ))
    }

    /// `for (var in a..b [step N] [reverse])` or `for (var in iterable)`
    fn for_stmt(&mut self) -> Result<Node, ElangError> {
        let kw = self.advance();
        self.expect(TokenKind::LParen, "'(' after 'for'")?;
        let var = self.ident("a loop variable")?;
        self.expect(TokenKind::In, "'in'")?;
        let start = self.expression()?;

        if self.eat(&TokenKind::DotDot) {
            let end = self.expression()?;
            let step = if self.eat(&TokenKind::Step) {
                Some(Box::new(self.expression()?))
            } else {
                None
            };
            let reverse = self.eat(&TokenKind::Reverse);
            self.expect(TokenKind::RParen, "')'")?;
            let body = self.block()?;
            return Ok(Node::new(
                NodeKind::ForRange {
                    var,
                    start: Box::new(start),
                    end: Box::new(end),
                    step,
                    reverse,
                    body: Box::new(body),
                },
                kw.line,
                kw.column,
            ));
        }

        self.expect(TokenKind::RParen, "')'")?;
        let body = self.block()?;
        Ok(Node::new(
            NodeKind::ForEach {
                var,
                iterable: Box::new(start),
                body: Box::new(body),
            },
            kw.line,
            kw.column,
        ))
    }

    fn use_stmt(&mut self) -> Result<Node, ElangError> {
        let kw = self.advance();
        let module = self.ident("a module name after 'use'")?;
        Ok(Node::new(NodeKind::Use { module }, kw.line, kw.column))
    }

    /// `say(a, b).newl` - multiple values concatenate with single spaces
    fn say_stmt(&mut self) -> Result<Node, ElangError> {
        let kw = self.advance();
        self.expect(TokenKind::LParen, "'(' after 'say'")?;

        let mut value: Option<Node> = None;
        if !self.at(&TokenKind::RParen) {
            let mut expr = self.expression()?;
            while self.eat(&TokenKind::Comma) {
                let next = self.expression()?;
                let space = Node::new(NodeKind::Str(" ".to_string()), kw.line, kw.column);
                let left = Node::new(
                    NodeKind::Binary {
                        left: Box::new(expr),
                        op: BinOp::Add,
                        right: Box::new(space),
                    },
                    kw.line,
                    kw.column,
                );
                expr = Node::new(
                    NodeKind::Binary {
                        left: Box::new(left),
                        op: BinOp::Add,
                        right: Box::new(next),
                    },
                    kw.line,
                    kw.column,
                );
            }
            value = Some(expr);
        }
        self.expect(TokenKind::RParen, "')'")?;

        let mut ends = Vec::new();
        while self.eat(&TokenKind::Dot) {
            let token = self.peek().clone();
            let name = self.ident("a say modifier")?;
            match name.as_str() {
                "newl" => ends.push(SayEnd::Newline),
                "space" => ends.push(SayEnd::Space),
                "tab" => ends.push(SayEnd::Tab),
                other => {
                    return Err(ElangError::parse(
                        format!("Unknown say modifier '{}'", other),
                        token.line,
                        token.column,
                    )
                    .with_hint("valid modifiers are .newl, .space and .tab"));
                }
            }
        }

        Ok(Node::new(
            NodeKind::Say {
                value: value.map(Box::new),
                ends,
            },
            kw.line,
            kw.column,
        ))
    }

    /// `&&name.with.dots`
    fn command_stmt(&mut self) -> Result<Node, ElangError> {
        let kw = self.advance();
        let mut path = self.ident("a command name after '&&'")?;
        while self.eat(&TokenKind::Dot) {
            path.push('.');
            path.push_str(&self.ident("a command segment")?);
        }
        Ok(Node::new(NodeKind::Command { path }, kw.line, kw.column))
    }

    /// Statements starting with an identifier: plain assignment, compound
    /// assignment, indexed assignment, or an expression statement.
    fn ident_stmt(&mut self) -> Result<Node, ElangError> {
        let compound = match self.peek_at(1) {
            TokenKind::Assign => {
                let token = self.advance();
                let name = ident_name(&token);
                self.advance(); // '='
                let value = self.expression()?;
                return Ok(Node::new(
                    NodeKind::Assign {
                        name,
                        value: Box::new(value),
                    },
                    token.line,
                    token.column,
                ));
            }
            TokenKind::PlusEq => Some(BinOp::Add),
            TokenKind::MinusEq => Some(BinOp::Sub),
            TokenKind::StarEq => Some(BinOp::Mul),
            TokenKind::SlashEq => Some(BinOp::Div),
            _ => None,
        };

        if let Some(op) = compound {
            let token = self.advance();
            let name = ident_name(&token);
            self.advance(); // the compound operator
            let value = self.expression()?;
            return Ok(Node::new(
                NodeKind::CompoundAssign {
                    name,
                    op,
                    value: Box::new(value),
                },
                token.line,
                token.column,
            ));
        }

        // `name[expr] = value` is only distinguishable from an indexed read
        // by the '=' after the postfix chain; parse speculatively and rewind.
        if *self.peek_at(1) == TokenKind::LBracket {
            let saved = self.pos;
            let (line, column) = (self.peek().line, self.peek().column);
            let target = self.postfix()?;
            if self.at(&TokenKind::Assign) {
                if let NodeKind::Index { target, index } = target.kind {
                    self.advance(); // '='
                    let value = self.expression()?;
                    return Ok(Node::new(
                        NodeKind::IndexSet {
                            target,
                            index,
                            value: Box::new(value),
                        },
                        line,
                        column,
                    ));
                }
            }
            self.pos = saved;
        }

        self.expression()
    }

    fn ident(&mut self, what: &str) -> Result<String, ElangError> {
        match self.peek_kind() {
            TokenKind::Ident(_) => {
                let token = self.advance();
                Ok(ident_name(&token))
            }
            other => {
                let token = self.peek();
                Err(ElangError::parse(
                    format!("Expected {}, found {}", what, other.describe()),
                    token.line,
                    token.column,
                ))
            }
        }
    }

    /// `{` statements `}` with newlines between statements
    fn block(&mut self) -> Result<Node, ElangError> {
        let open = self.expect(TokenKind::LBrace, "'{'")?;
        let mut statements = Vec::new();
        self.skip_newlines();
        while !self.at(&TokenKind::RBrace) {
            if self.at(&TokenKind::Eof) {
                return Err(ElangError::parse(
                    "Unexpected end of input inside a block",
                    open.line,
                    open.column,
                )
                .with_hint("missing '}' to close this block"));
            }
            statements.push(self.statement()?);
            self.end_of_statement()?;
            self.skip_newlines();
        }
        self.advance(); // '}'
        Ok(Node::new(NodeKind::Block(statements), open.line, open.column))
    }

    // ------------------------------------------------------------------
    // Expressions, lowest precedence first
    // ------------------------------------------------------------------

    pub fn expression(&mut self) -> Result<Node, ElangError> {
        self.or_expr()
    }

    fn or_expr(&mut self) -> Result<Node, ElangError> {
        let mut left = self.and_expr()?;
        while self.at(&TokenKind::Or) {
            let token = self.advance();
            let right = self.and_expr()?;
            left = binary(left, BinOp::Or, right, &token);
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Node, ElangError> {
        let mut left = self.not_expr()?;
        while self.at(&TokenKind::And) {
            let token = self.advance();
            let right = self.not_expr()?;
            left = binary(left, BinOp::And, right, &token);
        }
        Ok(left)
    }

    fn not_expr(&mut self) -> Result<Node, ElangError> {
        if self.at(&TokenKind::Not) {
            let token = self.advance();
            let operand = self.not_expr()?;
            return Ok(Node::new(
                NodeKind::Unary {
                    op: UnOp::Not,
                    operand: Box::new(operand),
                },
                token.line,
                token.column,
            ));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Node, ElangError> {
        let mut left = self.additive()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::EqEq => BinOp::Eq,
                TokenKind::NotEq => BinOp::Ne,
                TokenKind::Less => BinOp::Lt,
                TokenKind::Greater => BinOp::Gt,
                TokenKind::LessEq => BinOp::Le,
                TokenKind::GreaterEq => BinOp::Ge,
                _ => break,
            };
            let token = self.advance();
            let right = self.additive()?;
            left = binary(left, op, right, &token);
        }
        Ok(left)
    }

    fn additive(&mut self) -> Result<Node, ElangError> {
        let mut left = self.term()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            let token = self.advance();
            let right = self.term()?;
            left = binary(left, op, right, &token);
        }
        Ok(left)
    }

    fn term(&mut self) -> Result<Node, ElangError> {
        let mut left = self.power()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Mod,
                _ => break,
            };
            let token = self.advance();
            let right = self.power()?;
            left = binary(left, op, right, &token);
        }
        Ok(left)
    }

    /// `**` is right-associative
    fn power(&mut self) -> Result<Node, ElangError> {
        let left = self.unary()?;
        if self.at(&TokenKind::StarStar) {
            let token = self.advance();
            let right = self.power()?;
            return Ok(binary(left, BinOp::Pow, right, &token));
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Node, ElangError> {
        if self.at(&TokenKind::Minus) {
            let token = self.advance();
            let operand = self.unary()?;
            return Ok(Node::new(
                NodeKind::Unary {
                    op: UnOp::Neg,
                    operand: Box::new(operand),
                },
                token.line,
                token.column,
            ));
        }
        self.postfix()
    }

    /// Postfix chain: `.method(args)`, `.field`, `[index]`
    fn postfix(&mut self) -> Result<Node, ElangError> {
        let mut expr = self.primary()?;
        loop {
            if self.at(&TokenKind::Dot) {
                let token = self.advance();
                let name = self.ident("a method or field name after '.'")?;
                if self.eat(&TokenKind::LParen) {
                    let args = self.arguments()?;
                    expr = Node::new(
                        NodeKind::MethodCall {
                            target: Box::new(expr),
                            method: name,
                            args,
                        },
                        token.line,
                        token.column,
                    );
                } else {
                    expr = Node::new(
                        NodeKind::FieldGet {
                            target: Box::new(expr),
                            field: name,
                        },
                        token.line,
                        token.column,
                    );
                }
            } else if self.at(&TokenKind::LBracket) {
                let token = self.advance();
                let index = self.expression()?;
                self.expect(TokenKind::RBracket, "']'")?;
                expr = Node::new(
                    NodeKind::Index {
                        target: Box::new(expr),
                        index: Box::new(index),
                    },
                    token.line,
                    token.column,
                );
            } else {
                return Ok(expr);
            }
        }
    }

    /// Comma-separated expressions up to ')'
    fn arguments(&mut self) -> Result<Vec<Node>, ElangError> {
        let mut args = Vec::new();
        if !self.at(&TokenKind::RParen) {
            loop {
                args.push(self.expression()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "')'")?;
        Ok(args)
    }

    fn primary(&mut self) -> Result<Node, ElangError> {
        let token = self.peek().clone();
        match &token.kind {
            TokenKind::Int(value) => {
                let value = *value;
                self.advance();
                Ok(Node::new(NodeKind::Int(value), token.line, token.column))
            }
            TokenKind::Float(value) => {
                let value = *value;
                self.advance();
                Ok(Node::new(NodeKind::Float(value), token.line, token.column))
            }
            TokenKind::Str(text) => {
                let text = text.clone();
                self.advance();
                Ok(Node::new(NodeKind::Str(text), token.line, token.column))
            }
            TokenKind::InterpStr(parts) => {
                let parts = parts.clone();
                self.advance();
                self.interpolated(parts, token.line, token.column)
            }
            TokenKind::True => {
                self.advance();
                Ok(Node::new(NodeKind::Bool(true), token.line, token.column))
            }
            TokenKind::False => {
                self.advance();
                Ok(Node::new(NodeKind::Bool(false), token.line, token.column))
            }
            TokenKind::NoneLit => {
                self.advance();
                Ok(Node::new(NodeKind::Null, token.line, token.column))
            }
            TokenKind::Take => {
                self.advance();
                let prompt = if self.eat(&TokenKind::LParen) {
                    if self.eat(&TokenKind::RParen) {
                        None
                    } else {
                        let expr = self.expression()?;
                        self.expect(TokenKind::RParen, "')'")?;
                        Some(Box::new(expr))
                    }
                } else {
                    None
                };
                Ok(Node::new(NodeKind::Take { prompt }, token.line, token.column))
            }
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                // `x => expr` is a single-parameter lambda
                if self.at(&TokenKind::FatArrow) {
                    self.advance();
                    let body = self.expression()?;
                    return Ok(Node::new(
                        NodeKind::Lambda {
                            params: vec![name],
                            body: Box::new(body),
                        },
                        token.line,
                        token.column,
                    ));
                }
                if self.eat(&TokenKind::LParen) {
                    let args = self.arguments()?;
                    return Ok(Node::new(
                        NodeKind::Call { name, args },
                        token.line,
                        token.column,
                    ));
                }
                Ok(Node::new(NodeKind::Ident(name), token.line, token.column))
            }
            TokenKind::LBracket => self.list_literal(),
            TokenKind::LBrace => self.map_literal(),
            TokenKind::LParen => self.lambda_or_group(),
            other => Err(ElangError::parse(
                format!("Unexpected {}", other.describe()),
                token.line,
                token.column,
            )),
        }
    }

    fn list_literal(&mut self) -> Result<Node, ElangError> {
        let open = self.advance();
        let mut elements = Vec::new();
        self.skip_newlines();
        if !self.at(&TokenKind::RBracket) {
            loop {
                elements.push(self.expression()?);
                self.skip_newlines();
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
                self.skip_newlines();
            }
        }
        self.expect(TokenKind::RBracket, "']'")?;
        Ok(Node::new(NodeKind::List(elements), open.line, open.column))
    }

    fn map_literal(&mut self) -> Result<Node, ElangError> {
        let open = self.advance();
        let mut entries = Vec::new();
        self.skip_newlines();
        if !self.at(&TokenKind::RBrace) {
            loop {
                let key = self.expression()?;
                self.expect(TokenKind::Colon, "':' between key and value")?;
                let value = self.expression()?;
                entries.push((key, value));
                self.skip_newlines();
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
                self.skip_newlines();
            }
        }
        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(Node::new(NodeKind::MapLit(entries), open.line, open.column))
    }

    /// `(a, b) => expr` or a parenthesized expression; decided by
    /// speculatively reading an identifier list and rewinding on mismatch.
    fn lambda_or_group(&mut self) -> Result<Node, ElangError> {
        let open = self.advance();
        let saved = self.pos;

        if let Some(params) = self.try_lambda_params() {
            let body = self.expression()?;
            return Ok(Node::new(
                NodeKind::Lambda {
                    params,
                    body: Box::new(body),
                },
                open.line,
                open.column,
            ));
        }

        self.pos = saved;
        let expr = self.expression()?;
        self.expect(TokenKind::RParen, "')'")?;
        Ok(expr)
    }

    /// Recognize `ident, ident, ...) =>` without building AST; None means
    /// this was not a lambda head and the cursor must be restored.
    fn try_lambda_params(&mut self) -> Option<Vec<String>> {
        let mut params = Vec::new();
        if !self.at(&TokenKind::RParen) {
            loop {
                match self.peek_kind() {
                    TokenKind::Ident(name) => {
                        params.push(name.clone());
                        self.advance();
                    }
                    _ => return None,
                }
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        if !self.eat(&TokenKind::RParen) {
            return None;
        }
        if !self.eat(&TokenKind::FatArrow) {
            return None;
        }
        Some(params)
    }

    /// Re-parse each captured `{...}` fragment as an expression. Positions
    /// inside a fragment are offset from the enclosing string token, so
    /// errors point at the outer program.
    fn interpolated(
        &mut self,
        parts: Vec<StringPart>,
        line: u32,
        column: u32,
    ) -> Result<Node, ElangError> {
        let mut out = Vec::new();
        for part in parts {
            match part {
                StringPart::Lit(text) => out.push(InterpPart::Lit(text)),
                StringPart::Expr(text) => {
                    let tokens = lexer::tokenize_at(&text, line, column)?;
                    let mut sub = Parser::new(tokens);
                    let expr = sub.expression()?;
                    sub.skip_newlines();
                    if !sub.at(&TokenKind::Eof) {
                        let token = sub.peek();
                        return Err(ElangError::parse(
                            format!(
                                "Unexpected {} inside interpolation",
                                token.kind.describe()
                            ),
                            token.line,
                            token.column,
                        ));
                    }
                    out.push(InterpPart::Expr(expr));
                }
            }
        }
        Ok(Node::new(NodeKind::InterpStr(out), line, column))
    }
}

fn binary(left: Node, op: BinOp, right: Node, token: &Token) -> Node {
    Node::new(
        NodeKind::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        },
        token.line,
        token.column,
    )
}

fn ident_name(token: &Token) -> String {
    match &token.kind {
        TokenKind::Ident(name) => name.clone(),
        _ => unreachable!("caller checked for an identifier"),
    }
}
