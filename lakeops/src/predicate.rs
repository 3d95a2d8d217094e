//! Typed row predicates for DELETE
//!
//! A [`Predicate`] names columns explicitly, so it can be checked against the
//! target schema before anything is sent to the store. It renders to a SQL
//! condition with quoted identifiers and escaped string literals.

use crate::{Error, Result};
use std::fmt;

/// Comparison operators supported in a predicate leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl CompareOp {
    fn as_sql(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::NotEq => "<>",
            CompareOp::Lt => "<",
            CompareOp::LtEq => "<=",
            CompareOp::Gt => ">",
            CompareOp::GtEq => ">=",
        }
    }
}

/// Literal on the right-hand side of a comparison
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

impl From<i64> for Literal {
    fn from(v: i64) -> Self {
        Literal::Int(v)
    }
}

impl From<i32> for Literal {
    fn from(v: i32) -> Self {
        Literal::Int(v as i64)
    }
}

impl From<f64> for Literal {
    fn from(v: f64) -> Self {
        Literal::Float(v)
    }
}

impl From<bool> for Literal {
    fn from(v: bool) -> Self {
        Literal::Bool(v)
    }
}

impl From<&str> for Literal {
    fn from(v: &str) -> Self {
        Literal::Str(v.to_string())
    }
}

impl From<String> for Literal {
    fn from(v: String) -> Self {
        Literal::Str(v)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(v) => write!(f, "{}", v),
            Literal::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{:.1}", v),
            Literal::Float(v) => write!(f, "{}", v),
            Literal::Str(v) => write!(f, "'{}'", v.replace('\'', "''")),
            Literal::Bool(v) => write!(f, "{}", v),
        }
    }
}

/// Boolean condition over table columns
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare {
        column: String,
        op: CompareOp,
        value: Literal,
    },
    IsNull(String),
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    pub fn compare(column: impl Into<String>, op: CompareOp, value: impl Into<Literal>) -> Self {
        Predicate::Compare {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(column: impl Into<String>, value: impl Into<Literal>) -> Self {
        Self::compare(column, CompareOp::Eq, value)
    }

    pub fn gt(column: impl Into<String>, value: impl Into<Literal>) -> Self {
        Self::compare(column, CompareOp::Gt, value)
    }

    pub fn lt(column: impl Into<String>, value: impl Into<Literal>) -> Self {
        Self::compare(column, CompareOp::Lt, value)
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Predicate::IsNull(column.into())
    }

    pub fn and(self, other: Predicate) -> Self {
        Predicate::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Predicate) -> Self {
        Predicate::Or(Box::new(self), Box::new(other))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Predicate::Not(Box::new(self))
    }

    /// Every column referenced, in order of appearance
    pub fn columns(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Predicate::Compare { column, .. } | Predicate::IsNull(column) => out.push(column),
            Predicate::And(l, r) | Predicate::Or(l, r) => {
                l.collect_columns(out);
                r.collect_columns(out);
            }
            Predicate::Not(inner) => inner.collect_columns(out),
        }
    }

    /// Reject predicates that reference columns the table does not have
    pub fn validate(&self, table_columns: &[String]) -> Result<()> {
        let unknown: Vec<&str> = self
            .columns()
            .into_iter()
            .filter(|c| !table_columns.iter().any(|t| t == c))
            .collect();

        if unknown.is_empty() {
            Ok(())
        } else {
            Err(Error::InvalidOperation(format!(
                "Predicate references unknown column(s) {:?}; table has {:?}",
                unknown, table_columns
            )))
        }
    }

    /// SQL condition text understood by the store's expression parser
    pub fn to_sql(&self) -> String {
        match self {
            Predicate::Compare { column, op, value } => {
                format!("{} {} {}", quote_ident(column), op.as_sql(), value)
            }
            Predicate::IsNull(column) => format!("{} IS NULL", quote_ident(column)),
            Predicate::And(l, r) => format!("({}) AND ({})", l.to_sql(), r.to_sql()),
            Predicate::Or(l, r) => format!("({}) OR ({})", l.to_sql(), r.to_sql()),
            Predicate::Not(inner) => format!("NOT ({})", inner.to_sql()),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
