//! A form-definition compiler: converts line-oriented definition files into
//! form files, assigning every field a stable integer id backed by a
//! persisted per-form cache so regeneration never renumbers existing fields.
//!
//! The pipeline: [`parse::parse`] turns a definition into blocks and
//! [`Condition`]s, the built-in emitter resolves ids through the
//! [`IdAllocator`] and labels through an injected [`FieldData`] provider,
//! and [`Generator::generate`] orchestrates one file end to end (cache
//! load, render, form write, cache flush).

mod error;
mod fields;
mod generate;
mod idcache;
mod render;
mod types;

pub mod parse;

pub use error::FormgenError;
pub use fields::{FieldData, FieldEntry, StaticFieldData};
pub use generate::{GenerateSummary, Generator};
pub use idcache::{CacheError, IdAllocator};
pub use render::varname;
pub use types::{
    as_list, field, form_var, CompareOp, Condition, ConditionAction, ConditionKind, Expr,
    FieldRef, GenerateError, Value, VAR_MARKER, VAR_PREFIX,
};
