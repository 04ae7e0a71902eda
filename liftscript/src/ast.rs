//! Abstract Syntax Tree
//!
//! Immutable once parsed. Every node records the span it came from so
//! runtime errors can point back into the source.

use liftscript_core::{ArithOp, CmpOp, Position, Weight};
use serde::{Deserialize, Serialize};

/// Source range of a token or node. `offset` and `len` count characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    pub offset: usize,
    pub len: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn position(&self) -> Position {
        Position::new(self.offset, self.line, self.column)
    }

    /// Span from the start of `self` to the end of `other`
    pub fn to(&self, other: Span) -> Span {
        let end = (other.offset + other.len).max(self.offset + self.len);
        Span { len: end - self.offset, ..*self }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StmtKind {
    Expr(Expr),
    /// `target = value`; compound assignments arrive desugared
    Assign { target: String, value: Expr },
    If { cond: Expr, then_block: Block, else_branch: Option<ElseBranch> },
    /// `for (var from a to b) { ... }`, inclusive
    For { var: String, from: Expr, to: Expr, body: Block },
    While { cond: Expr, body: Block },
    Return(Expr),
}

impl StmtKind {
    /// Statements closed by a brace need no separator after them
    pub fn ends_with_block(&self) -> bool {
        matches!(self, StmtKind::If { .. } | StmtKind::For { .. } | StmtKind::While { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElseBranch {
    Block(Block),
    If(Box<Stmt>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    Literal(Literal),
    /// Plain or dotted name (`w`, `state.weight`)
    Ident(String),
    Unary(UnaryOp, Box<Expr>),
    Binary(Box<Expr>, ArithOp, Box<Expr>),
    Logical(Box<Expr>, LogicalOp, Box<Expr>),
    /// `a < b <= c` holds when every adjacent pair holds
    Compare { first: Box<Expr>, rest: Vec<(CmpOp, Expr)> },
    Call { name: String, args: Vec<Expr> },
    /// `cond ? then : otherwise`
    Conditional { cond: Box<Expr>, then: Box<Expr>, otherwise: Box<Expr> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Number(f64),
    Weight(Weight),
    Bool(bool),
    Text(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp { Neg, Plus, Not }

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalOp { And, Or }
