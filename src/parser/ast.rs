use crate::core::Value;
use std::fmt;

/// Root statement type
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Insert(InsertStmt),
    Query(QueryStmt),
    Update(UpdateStmt),
    Delete(DeleteStmt),
    /// CREATE / ALTER / DROP of a schema object
    Ddl,
    /// Anything the router has no dedicated handling for (SET, SHOW, BEGIN, ...)
    Other,
}

/// INSERT statement
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStmt {
    pub columns: Vec<String>, // empty = all columns, in table order
    pub values: Vec<Vec<Expr>>,
}

/// SELECT query statement
#[derive(Debug, Clone, PartialEq)]
pub struct QueryStmt {
    pub selection: Option<Expr>,
    /// FOR UPDATE / FOR SHARE
    pub locking: bool,
}

/// UPDATE statement
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStmt {
    pub selection: Option<Expr>,
}

/// DELETE statement
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStmt {
    pub selection: Option<Expr>,
}

/// Expression types
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Column reference
    Column(String),

    /// Compound identifier (e.g. table.column)
    CompoundIdentifier(Vec<String>),

    /// Literal value
    Literal(Value),

    /// Parameter placeholder, zero-based
    Parameter(usize),

    /// Binary operation (a = b, a AND b, ...)
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },

    /// Expression kept only by its SQL text (functions, IN lists, subqueries, ...)
    Opaque(String),
}

impl Expr {
    /// Column name of a plain or qualified column reference.
    pub fn column_name(&self) -> Option<&str> {
        match self {
            Expr::Column(name) => Some(name),
            Expr::CompoundIdentifier(parts) => parts.last().map(String::as_str),
            _ => None,
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // Comparison
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Logical
    And,
    Or,

    /// Arithmetic and everything else
    Other,
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Column(name) => write!(f, "{}", name),
            Expr::CompoundIdentifier(parts) => write!(f, "{}", parts.join(".")),
            Expr::Literal(val) => write!(f, "{}", val),
            Expr::Parameter(idx) => write!(f, "${}", idx + 1),
            Expr::BinaryOp { left, op, right } => write!(f, "({} {} {})", left, op, right),
            Expr::Opaque(sql) => write!(f, "{}", sql),
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::Eq => "=",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
            BinaryOp::Other => "?op",
        };
        write!(f, "{}", s)
    }
}
