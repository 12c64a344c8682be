mod condition;
mod error;
mod expr;
mod value;

pub use condition::{Condition, ConditionAction, ConditionKind};
pub use error::GenerateError;
pub use expr::{as_list, field, form_var, CompareOp, Expr, FieldRef, VAR_MARKER, VAR_PREFIX};
pub use value::Value;
