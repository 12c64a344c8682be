use std::fmt;
use std::ops::Not;

use super::Value;

/// Substring marking a field reference that is already bound to a form
/// variable and must not be qualified again.
pub const VAR_MARKER: &str = "_var_";

/// Prefix qualifying a bare field name into the form-variable namespace.
pub const VAR_PREFIX: &str = "form_var_";

/// Qualify a raw field reference into the form-variable namespace.
///
/// References already carrying [`VAR_MARKER`] are returned unchanged; bare
/// names get [`VAR_PREFIX`] prepended.
#[must_use]
pub fn form_var(name: &str) -> String {
    if name.contains(VAR_MARKER) {
        name.to_owned()
    } else {
        format!("{VAR_PREFIX}{name}")
    }
}

/// Render the list-coercion wrapper over a qualified field reference.
///
/// A form variable may hold a scalar, a list, or nothing; membership tests
/// need a uniform list. The wrapper reads
/// `X if isinstance(X, list) else ([X] if X else [])`.
#[must_use]
pub fn as_list(name: &str) -> String {
    let f = form_var(name);
    format!("{f} if isinstance({f}, list) else ([{f}] if {f} else [])")
}

/// Comparison operators supported in condition expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

/// Condition expression AST. Variable names are stored fully qualified;
/// rendering to the target expression language happens once, via `Display`.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Truthiness test of a form variable.
    Var(String),
    Compare {
        var: String,
        op: CompareOp,
        value: Value,
    },
    /// Membership of a literal in the list-coerced value of a form variable.
    Member {
        value: Value,
        var: String,
    },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Eq => write!(f, "=="),
            CompareOp::Neq => write!(f, "!="),
            CompareOp::Gt => write!(f, ">"),
            CompareOp::Gte => write!(f, ">="),
            CompareOp::Lt => write!(f, "<"),
            CompareOp::Lte => write!(f, "<="),
        }
    }
}

/// Renders target-language boolean syntax: `and`/`or`/`not`, membership via
/// the list-coercion wrapper. Every compound form is parenthesized so the
/// output never depends on target-language precedence.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Var(var) => write!(f, "{var}"),
            Expr::Compare { var, op, value } => write!(f, "({var} {op} {value})"),
            Expr::Member { value, var } => write!(f, "({value} in ({}))", as_list(var)),
            Expr::And(a, b) => write!(f, "({a} and {b})"),
            Expr::Or(a, b) => write!(f, "({a} or {b})"),
            Expr::Not(inner) => write!(f, "(not {inner})"),
        }
    }
}

impl Expr {
    #[must_use]
    pub fn and(self, other: Expr) -> Expr {
        Expr::And(Box::new(self), Box::new(other))
    }

    #[must_use]
    pub fn or(self, other: Expr) -> Expr {
        Expr::Or(Box::new(self), Box::new(other))
    }
}

impl Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::Not(Box::new(self))
    }
}

/// Intermediate builder for expressions over one field reference.
/// Created by [`field()`]; the name is qualified on construction.
#[derive(Debug, Clone)]
pub struct FieldRef {
    var: String,
}

impl FieldRef {
    /// Truthiness test of the field itself.
    #[must_use]
    pub fn truthy(self) -> Expr {
        Expr::Var(self.var)
    }

    /// Membership test: `value in` the list-coerced field.
    #[must_use]
    pub fn contains(self, value: impl Into<Value>) -> Expr {
        Expr::Member {
            value: value.into(),
            var: self.var,
        }
    }

    #[must_use]
    pub fn eq(self, value: impl Into<Value>) -> Expr {
        self.compare(CompareOp::Eq, value)
    }

    #[must_use]
    pub fn neq(self, value: impl Into<Value>) -> Expr {
        self.compare(CompareOp::Neq, value)
    }

    #[must_use]
    pub fn gt(self, value: impl Into<Value>) -> Expr {
        self.compare(CompareOp::Gt, value)
    }

    #[must_use]
    pub fn gte(self, value: impl Into<Value>) -> Expr {
        self.compare(CompareOp::Gte, value)
    }

    #[must_use]
    pub fn lt(self, value: impl Into<Value>) -> Expr {
        self.compare(CompareOp::Lt, value)
    }

    #[must_use]
    pub fn lte(self, value: impl Into<Value>) -> Expr {
        self.compare(CompareOp::Lte, value)
    }

    fn compare(self, op: CompareOp, value: impl Into<Value>) -> Expr {
        Expr::Compare {
            var: self.var,
            op,
            value: value.into(),
        }
    }
}

#[must_use]
pub fn field(name: &str) -> FieldRef {
    FieldRef {
        var: form_var(name),
    }
}
