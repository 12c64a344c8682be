use std::fmt;

use super::error::GenerateError;
use super::expr::Expr;

/// What a condition does when its expression evaluates to true.
/// Each variant carries exactly the payload that applies to it, so a
/// condition can never hold a message and a hidden field at the same time.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionAction {
    /// Show a message and stop navigation past the current page.
    LeavePage { message: String },
    /// Suppress the entire page.
    HidePage,
    /// Suppress a single field.
    HideField { field: String },
}

/// Variant tag of a [`ConditionAction`], used in accessors and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionKind {
    LeavePage,
    HidePage,
    HideField,
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionKind::LeavePage => write!(f, "leave-page"),
            ConditionKind::HidePage => write!(f, "hide-page"),
            ConditionKind::HideField => write!(f, "hide-field"),
        }
    }
}

/// A conditional visibility/navigation rule attached to a page or field.
///
/// Holds the boolean expression and the action to take when it holds.
/// The wrong-kind accessors fail with
/// [`GenerateError::NotApplicable`] instead of returning a sentinel:
/// template code reaching for a payload the condition does not carry is a
/// contract violation and must surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    expr: Expr,
    action: ConditionAction,
}

impl Condition {
    #[must_use]
    pub fn new(expr: Expr, action: ConditionAction) -> Self {
        Self { expr, action }
    }

    #[must_use]
    pub fn kind(&self) -> ConditionKind {
        match self.action {
            ConditionAction::LeavePage { .. } => ConditionKind::LeavePage,
            ConditionAction::HidePage => ConditionKind::HidePage,
            ConditionAction::HideField { .. } => ConditionKind::HideField,
        }
    }

    #[must_use]
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Render the expression to target-language boolean syntax.
    #[must_use]
    pub fn build(&self) -> String {
        self.expr.to_string()
    }

    /// The leave-page message.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::NotApplicable`] unless the kind is
    /// [`ConditionKind::LeavePage`].
    pub fn message(&self) -> Result<&str, GenerateError> {
        match &self.action {
            ConditionAction::LeavePage { message } => Ok(message),
            _ => Err(GenerateError::NotApplicable {
                accessor: "message",
                kind: self.kind(),
            }),
        }
    }

    /// The name of the field this condition hides.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::NotApplicable`] unless the kind is
    /// [`ConditionKind::HideField`].
    pub fn hidden_field(&self) -> Result<&str, GenerateError> {
        match &self.action {
            ConditionAction::HideField { field } => Ok(field),
            _ => Err(GenerateError::NotApplicable {
                accessor: "hidden_field",
                kind: self.kind(),
            }),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)
    }
}
