//! Recursive descent parser
//!
//! Precedence, lowest first: `?:`, `||`, `&&`, `== !=`, `< <= > >=`,
//! `+ -`, `* / %`, unary `- + !`, then calls and atoms. Relational
//! operators chain into a single `Compare` node.

use crate::ast::*;
use crate::lexer::{tokenize, Token, TokenKind};
use liftscript_core::{ArithOp, CmpOp, ScriptError, Weight};

/// Nesting limit for blocks, parentheses, unary chains and the height of
/// operator chains
pub const MAX_DEPTH: usize = 64;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !tokens.last().is_some_and(Token::is_eof) {
            let span = tokens
                .last()
                .map(|t| Span {
                    offset: t.span.offset + t.span.len,
                    len: 0,
                    line: t.span.line,
                    column: t.span.column + t.span.len,
                })
                .unwrap_or(Span { offset: 0, len: 0, line: 1, column: 1 });
            tokens.push(Token { kind: TokenKind::Eof, text: String::new(), span, newline_before: true });
        }
        Self { tokens, pos: 0, depth: 0 }
    }

    pub fn parse(&mut self) -> Result<Program, ScriptError> {
        let start = self.peek().span;
        let statements = self.parse_statements(false)?;
        let end = self.peek().span;
        Ok(Program { statements, span: start.to(end) })
    }

    // ========== Token helpers ==========

    fn peek(&self) -> &Token {
        // The token list always ends with Eof and the parser never moves past it
        let last = self.tokens.len() - 1;
        &self.tokens[self.pos.min(last)]
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    fn peek_at(&self, n: usize) -> &TokenKind {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + n).min(last)].kind
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !token.is_eof() {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token, ScriptError> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&format!("Expected {}", what)))
        }
    }

    fn unexpected(&self, expected: &str) -> ScriptError {
        let token = self.peek();
        ScriptError::syntax(format!("{}, found {}", expected, token.describe()))
            .at(token.span.position())
    }

    fn enter(&mut self) -> Result<(), ScriptError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ScriptError::syntax("expression nested too deeply")
                .at(self.peek().span.position()));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Undo the `enter` calls made for `folded` operators of one chain
    fn leave_chain(&mut self, folded: usize) {
        self.depth -= folded;
    }

    // ========== Statements ==========

    fn parse_statements(&mut self, in_block: bool) -> Result<Vec<Stmt>, ScriptError> {
        let mut statements = Vec::new();
        loop {
            while self.check(&TokenKind::Semicolon) {
                self.advance();
            }
            match self.peek_kind() {
                TokenKind::Eof if in_block => return Err(self.unexpected("Expected '}'")),
                TokenKind::Eof => break,
                TokenKind::RBrace if in_block => break,
                TokenKind::RBrace => return Err(self.unexpected("Expected statement")),
                _ => {}
            }

            let stmt = self.parse_statement()?;
            let needs_separator = !stmt.kind.ends_with_block();
            statements.push(stmt);
            if needs_separator {
                self.expect_statement_end()?;
            }
        }
        Ok(statements)
    }

    fn expect_statement_end(&self) -> Result<(), ScriptError> {
        let token = self.peek();
        match token.kind {
            TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof => Ok(()),
            _ if token.newline_before => Ok(()),
            _ => Err(self.unexpected("Expected end of statement")),
        }
    }

    fn parse_statement(&mut self) -> Result<Stmt, ScriptError> {
        match self.peek_kind() {
            TokenKind::If => self.parse_if(),
            TokenKind::For => self.parse_for(),
            TokenKind::While => self.parse_while(),
            TokenKind::Return => {
                let keyword = self.advance();
                let value = self.parse_expression()?;
                let span = keyword.span.to(value.span);
                Ok(Stmt { kind: StmtKind::Return(value), span })
            }
            TokenKind::Ident(_) if assign_op(self.peek_at(1)).is_some() => self.parse_assignment(),
            _ => {
                let expr = self.parse_expression()?;
                let span = expr.span;
                Ok(Stmt { kind: StmtKind::Expr(expr), span })
            }
        }
    }

    /// `x = e`, or `x op= e` which becomes `x = x op e`
    fn parse_assignment(&mut self) -> Result<Stmt, ScriptError> {
        let target_token = self.advance();
        let target = match &target_token.kind {
            TokenKind::Ident(name) => name.clone(),
            _ => return Err(self.unexpected("Expected identifier")),
        };
        let op_token = self.advance();
        let value = self.parse_expression()?;
        let span = target_token.span.to(value.span);

        let value = match assign_op(&op_token.kind).flatten() {
            Some(op) => {
                let current = Expr { kind: ExprKind::Ident(target.clone()), span: target_token.span };
                Expr {
                    kind: ExprKind::Binary(Box::new(current), op, Box::new(value)),
                    span,
                }
            }
            None => value,
        };
        Ok(Stmt { kind: StmtKind::Assign { target, value }, span })
    }

    fn parse_if(&mut self) -> Result<Stmt, ScriptError> {
        let keyword = self.expect(TokenKind::If, "'if'")?;
        self.expect(TokenKind::LParen, "'(' after 'if'")?;
        let cond = self.parse_expression()?;
        self.expect(TokenKind::RParen, "')' after condition")?;
        let then_block = self.parse_block()?;
        let mut span = keyword.span.to(then_block.span);

        let else_branch = if self.check(&TokenKind::Else) {
            self.advance();
            if self.check(&TokenKind::If) {
                self.enter()?;
                let nested = self.parse_if()?;
                self.leave();
                span = span.to(nested.span);
                Some(ElseBranch::If(Box::new(nested)))
            } else {
                let block = self.parse_block()?;
                span = span.to(block.span);
                Some(ElseBranch::Block(block))
            }
        } else {
            None
        };

        Ok(Stmt { kind: StmtKind::If { cond, then_block, else_branch }, span })
    }

    fn parse_for(&mut self) -> Result<Stmt, ScriptError> {
        let keyword = self.expect(TokenKind::For, "'for'")?;
        self.expect(TokenKind::LParen, "'(' after 'for'")?;
        let var = match self.peek_kind() {
            TokenKind::Ident(name) if !name.contains('.') => name.clone(),
            _ => return Err(self.unexpected("Expected loop variable")),
        };
        self.advance();
        self.expect(TokenKind::From, "'from'")?;
        let from = self.parse_expression()?;
        self.expect(TokenKind::To, "'to'")?;
        let to = self.parse_expression()?;
        self.expect(TokenKind::RParen, "')' after loop range")?;
        let body = self.parse_block()?;
        let span = keyword.span.to(body.span);
        Ok(Stmt { kind: StmtKind::For { var, from, to, body }, span })
    }

    fn parse_while(&mut self) -> Result<Stmt, ScriptError> {
        let keyword = self.expect(TokenKind::While, "'while'")?;
        self.expect(TokenKind::LParen, "'(' after 'while'")?;
        let cond = self.parse_expression()?;
        self.expect(TokenKind::RParen, "')' after condition")?;
        let body = self.parse_block()?;
        let span = keyword.span.to(body.span);
        Ok(Stmt { kind: StmtKind::While { cond, body }, span })
    }

    fn parse_block(&mut self) -> Result<Block, ScriptError> {
        let open = self.expect(TokenKind::LBrace, "'{'")?;
        self.enter()?;
        let statements = self.parse_statements(true)?;
        self.leave();
        let close = self.expect(TokenKind::RBrace, "'}'")?;
        Ok(Block { statements, span: open.span.to(close.span) })
    }

    // ========== Expressions ==========

    pub fn parse_expression(&mut self) -> Result<Expr, ScriptError> {
        self.enter()?;
        let expr = self.parse_ternary()?;
        self.leave();
        Ok(expr)
    }

    fn parse_ternary(&mut self) -> Result<Expr, ScriptError> {
        let cond = self.parse_or()?;
        if !self.check(&TokenKind::Question) {
            return Ok(cond);
        }
        self.advance();
        let then = self.parse_expression()?;
        self.expect(TokenKind::Colon, "':' in conditional expression")?;
        self.enter()?;
        let otherwise = self.parse_ternary()?;
        self.leave();
        let span = cond.span.to(otherwise.span);
        Ok(Expr {
            kind: ExprKind::Conditional {
                cond: Box::new(cond),
                then: Box::new(then),
                otherwise: Box::new(otherwise),
            },
            span,
        })
    }

    fn parse_or(&mut self) -> Result<Expr, ScriptError> {
        let mut left = self.parse_and()?;
        let mut folded = 0;
        while self.check(&TokenKind::Or) {
            self.advance();
            self.enter()?;
            folded += 1;
            let right = self.parse_and()?;
            left = logical(left, LogicalOp::Or, right);
        }
        self.leave_chain(folded);
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ScriptError> {
        let mut left = self.parse_equality()?;
        let mut folded = 0;
        while self.check(&TokenKind::And) {
            self.advance();
            self.enter()?;
            folded += 1;
            let right = self.parse_equality()?;
            left = logical(left, LogicalOp::And, right);
        }
        self.leave_chain(folded);
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, ScriptError> {
        let mut left = self.parse_relational()?;
        let mut folded = 0;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Eq => CmpOp::Eq,
                TokenKind::Ne => CmpOp::Ne,
                _ => break,
            };
            self.advance();
            self.enter()?;
            folded += 1;
            let right = self.parse_relational()?;
            let span = left.span.to(right.span);
            left = Expr {
                kind: ExprKind::Compare { first: Box::new(left), rest: vec![(op, right)] },
                span,
            };
        }
        self.leave_chain(folded);
        Ok(left)
    }

    fn parse_relational(&mut self) -> Result<Expr, ScriptError> {
        let first = self.parse_additive()?;
        let mut rest = Vec::new();
        loop {
            let op = match self.peek_kind() {
                TokenKind::Lt => CmpOp::Lt,
                TokenKind::Le => CmpOp::Le,
                TokenKind::Gt => CmpOp::Gt,
                TokenKind::Ge => CmpOp::Ge,
                _ => break,
            };
            self.advance();
            rest.push((op, self.parse_additive()?));
        }

        match rest.last() {
            None => Ok(first),
            Some((_, last)) => {
                let span = first.span.to(last.span);
                Ok(Expr { kind: ExprKind::Compare { first: Box::new(first), rest }, span })
            }
        }
    }

    fn parse_additive(&mut self) -> Result<Expr, ScriptError> {
        let mut left = self.parse_multiplicative()?;
        let mut folded = 0;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => ArithOp::Add,
                TokenKind::Minus => ArithOp::Sub,
                _ => break,
            };
            self.advance();
            self.enter()?;
            folded += 1;
            let right = self.parse_multiplicative()?;
            left = binary(left, op, right);
        }
        self.leave_chain(folded);
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ScriptError> {
        let mut left = self.parse_unary()?;
        let mut folded = 0;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => ArithOp::Mul,
                TokenKind::Slash => ArithOp::Div,
                TokenKind::Percent => ArithOp::Rem,
                _ => break,
            };
            self.advance();
            self.enter()?;
            folded += 1;
            let right = self.parse_unary()?;
            left = binary(left, op, right);
        }
        self.leave_chain(folded);
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ScriptError> {
        let op = match self.peek_kind() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Not => UnaryOp::Not,
            _ => return self.parse_primary(),
        };
        let token = self.advance();
        self.enter()?;
        let operand = self.parse_unary()?;
        self.leave();
        let span = token.span.to(operand.span);
        Ok(Expr { kind: ExprKind::Unary(op, Box::new(operand)), span })
    }

    fn parse_primary(&mut self) -> Result<Expr, ScriptError> {
        let token = self.peek().clone();
        let literal = |lit| Ok(Expr { kind: ExprKind::Literal(lit), span: token.span });

        match &token.kind {
            TokenKind::Number(n) => {
                self.advance();
                literal(Literal::Number(*n))
            }
            TokenKind::Weight(v, unit) => {
                self.advance();
                literal(Literal::Weight(Weight::new(*v, *unit)))
            }
            TokenKind::Str(s) => {
                self.advance();
                literal(Literal::Text(s.clone()))
            }
            TokenKind::True => {
                self.advance();
                literal(Literal::Bool(true))
            }
            TokenKind::False => {
                self.advance();
                literal(Literal::Bool(false))
            }
            TokenKind::Ident(name) => {
                self.advance();
                let call_follows = self.check(&TokenKind::LParen) && !self.peek().newline_before;
                if call_follows {
                    self.parse_call(name.clone(), &token)
                } else {
                    Ok(Expr { kind: ExprKind::Ident(name.clone()), span: token.span })
                }
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            _ => Err(self.unexpected("Expected expression")),
        }
    }

    fn parse_call(&mut self, name: String, name_token: &Token) -> Result<Expr, ScriptError> {
        self.expect(TokenKind::LParen, "'('")?;
        let mut args = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                args.push(self.parse_expression()?);
                if self.check(&TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        let close = self.expect(TokenKind::RParen, "')' after arguments")?;
        Ok(Expr { kind: ExprKind::Call { name, args }, span: name_token.span.to(close.span) })
    }
}

/// `Some(None)` for plain `=`, `Some(Some(op))` for compound forms
fn assign_op(kind: &TokenKind) -> Option<Option<ArithOp>> {
    match kind {
        TokenKind::Assign => Some(None),
        TokenKind::PlusAssign => Some(Some(ArithOp::Add)),
        TokenKind::MinusAssign => Some(Some(ArithOp::Sub)),
        TokenKind::StarAssign => Some(Some(ArithOp::Mul)),
        TokenKind::SlashAssign => Some(Some(ArithOp::Div)),
        _ => None,
    }
}

fn binary(left: Expr, op: ArithOp, right: Expr) -> Expr {
    let span = left.span.to(right.span);
    Expr { kind: ExprKind::Binary(Box::new(left), op, Box::new(right)), span }
}

fn logical(left: Expr, op: LogicalOp, right: Expr) -> Expr {
    let span = left.span.to(right.span);
    Expr { kind: ExprKind::Logical(Box::new(left), op, Box::new(right)), span }
}

/// Parse a token stream
pub fn parse(tokens: Vec<Token>) -> Result<Program, ScriptError> {
    Parser::new(tokens).parse()
}

/// Tokenize and parse
pub fn parse_source(source: &str) -> Result<Program, ScriptError> {
    parse(tokenize(source)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use liftscript_core::{codes, Unit};

    fn expr(src: &str) -> Expr {
        let program = parse_source(src).unwrap();
        match program.statements.into_iter().next().map(|s| s.kind) {
            Some(StmtKind::Expr(e)) => e,
            other => panic!("expected expression statement, got {:?}", other),
        }
    }

    #[test]
    fn test_precedence() {
        let e = expr("1 + 2 * 3");
        match e.kind {
            ExprKind::Binary(_, ArithOp::Add, right) => {
                assert!(matches!(right.kind, ExprKind::Binary(_, ArithOp::Mul, _)));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parens_override_precedence() {
        let e = expr("(2 + 3) * 4");
        match e.kind {
            ExprKind::Binary(left, ArithOp::Mul, _) => {
                assert!(matches!(left.kind, ExprKind::Binary(_, ArithOp::Add, _)));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_chained_comparison() {
        let e = expr("1 < x <= 3");
        match e.kind {
            ExprKind::Compare { rest, .. } => {
                assert_eq!(rest.len(), 2);
                assert_eq!(rest[0].0, CmpOp::Lt);
                assert_eq!(rest[1].0, CmpOp::Le);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_weight_literal() {
        let e = expr("60kg");
        assert_eq!(e.kind, ExprKind::Literal(Literal::Weight(Weight::new(60.0, Unit::Kg))));
    }

    #[test]
    fn test_call_and_ternary() {
        let e = expr("cr >= r ? roundWeight(w + 5lb) : w");
        match e.kind {
            ExprKind::Conditional { then, .. } => match then.kind {
                ExprKind::Call { name, args } => {
                    assert_eq!(name, "roundWeight");
                    assert_eq!(args.len(), 1);
                }
                other => panic!("unexpected {:?}", other),
            },
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_compound_assignment_desugars() {
        let program = parse_source("state.weight += 5lb").unwrap();
        match &program.statements[0].kind {
            StmtKind::Assign { target, value } => {
                assert_eq!(target, "state.weight");
                match &value.kind {
                    ExprKind::Binary(left, ArithOp::Add, _) => {
                        assert_eq!(left.kind, ExprKind::Ident("state.weight".into()));
                    }
                    other => panic!("unexpected {:?}", other),
                }
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_statements_by_newline_and_semicolon() {
        let program = parse_source("a = 1\nb = 2; a + b").unwrap();
        assert_eq!(program.statements.len(), 3);
        let err = parse_source("1 2").unwrap_err();
        assert!(err.is_syntax());
        assert_eq!(err.position.unwrap().offset, 2);
    }

    #[test]
    fn test_if_else_chain() {
        let program = parse_source("if (a) { 1 } else if (b) { 2 } else { 3 }").unwrap();
        match &program.statements[0].kind {
            StmtKind::If { else_branch: Some(ElseBranch::If(nested)), .. } => {
                assert!(matches!(
                    nested.kind,
                    StmtKind::If { else_branch: Some(ElseBranch::Block(_)), .. }
                ));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_for_loop() {
        let program = parse_source("for (i from 1 to ns) {\n  x += i\n}").unwrap();
        match &program.statements[0].kind {
            StmtKind::For { var, body, .. } => {
                assert_eq!(var, "i");
                assert_eq!(body.statements.len(), 1);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_missing_operand_reports_end_offset() {
        let err = parse_source("1 + ").unwrap_err();
        assert_eq!(err.code, codes::SYNTAX_ERROR);
        let pos = err.position.unwrap();
        assert_eq!(pos.offset, 4);
        assert_eq!(pos.column, 5);
        assert!(err.message.contains("end of input"));
    }

    #[test]
    fn test_unclosed_block() {
        let err = parse_source("if (x) { 1").unwrap_err();
        assert!(err.message.contains("Expected '}'"));
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}1{}", "(".repeat(200), ")".repeat(200));
        let err = parse_source(&deep).unwrap_err();
        assert!(err.message.contains("nested too deeply"));

        let ok = format!("{}1{}", "(".repeat(20), ")".repeat(20));
        assert!(parse_source(&ok).is_ok());
    }

    #[test]
    fn test_long_operator_chain_is_bounded() {
        for op in ["+", "*", "&&", "||", "=="] {
            let long = format!("1{}", format!(" {} 1", op).repeat(500));
            let err = parse_source(&long).unwrap_err();
            assert!(err.is_syntax());
            assert!(err.message.contains("nested too deeply"), "{}", op);
        }

        // Depth is released between chains
        let src = format!("a = 1{}\nb = 1{}", " + 1".repeat(40), " - 1".repeat(40));
        assert_eq!(parse_source(&src).unwrap().statements.len(), 2);
    }

    #[test]
    fn test_empty_program() {
        let program = parse_source("  // nothing\n").unwrap();
        assert!(program.statements.is_empty());
    }

    #[test]
    fn test_parse_is_deterministic() {
        let src = "x = w * 1.05\nif (cr >= r) { state.w = x } else { state.w = w }";
        assert_eq!(parse_source(src).unwrap(), parse_source(src).unwrap());
    }
}
