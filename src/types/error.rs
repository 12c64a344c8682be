use thiserror::Error;

use super::condition::ConditionKind;

/// Errors raised while driving a definition through the generator.
/// All of them are fatal to the current definition file only.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(
        "field name '{name}' was already used in this definition; \
         add a context to the key or create a new one"
    )]
    DuplicateFieldName { name: String },

    #[error("accessor '{accessor}' is not applicable to a {kind} condition")]
    NotApplicable {
        accessor: &'static str,
        kind: ConditionKind,
    },

    #[error("unknown field-data key '{key}'")]
    UnknownFieldData { key: String },

    #[error("definition never declares a form name")]
    MissingFormName,
}
