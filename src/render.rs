use std::fmt::Write as _;

use crate::fields::FieldData;
use crate::idcache::IdAllocator;
use crate::parse::{Block, Definition, FieldKind};
use crate::types::GenerateError;

/// Turn a field-data key into a form variable name.
#[must_use]
pub fn varname(key: &str) -> String {
    key.replace(':', "_")
}

/// Render a parsed definition to the output form text.
///
/// This is the template seam: every durable field resolves its id through
/// the allocator, every anonymous block takes the current counter, and
/// conditions render through [`Condition::build`](crate::Condition::build).
///
/// # Errors
///
/// Returns [`GenerateError`] on a missing form name, an unknown field-data
/// key, or a duplicate field name.
pub(crate) fn render(
    def: &Definition,
    data: &dyn FieldData,
    alloc: &mut IdAllocator,
) -> Result<String, GenerateError> {
    let title_key = def
        .meta
        .title
        .as_deref()
        .ok_or(GenerateError::MissingFormName)?;

    let mut out = String::new();
    let _ = writeln!(out, "form \"{}\"", data.label(title_key)?);
    if let Some(key) = def.meta.identifier.as_deref() {
        let _ = writeln!(out, "  identifier \"{}\"", data.label(key)?);
    }
    if let Some(key) = def.meta.description.as_deref() {
        let _ = writeln!(out, "  description \"{}\"", data.label(key)?);
    }
    if let Some(key) = def.meta.url.as_deref() {
        let _ = writeln!(out, "  url \"{}\"", data.label(key)?);
    }

    for block in &def.blocks {
        match block {
            Block::Page { title } => {
                let id = alloc.get_id(None)?;
                let _ = writeln!(out, "page {id} \"{}\"", data.label(title)?);
            }
            Block::Field { kind, key } => {
                let id = alloc.get_id(Some(key))?;
                let label = data.label(key)?;
                let _ = write!(
                    out,
                    "  field {id} {} \"{label}\" varname={}",
                    kind.keyword(),
                    varname(key),
                );
                if matches!(kind, FieldKind::Select) {
                    let _ = write!(out, " items=[{}]", data.items(key)?.join(", "));
                }
                if def.listing.iter().any(|k| k == key) {
                    let _ = write!(out, " in-listing");
                }
                if def.filters.iter().any(|k| k == key) {
                    let _ = write!(out, " in-filter");
                }
                out.push('\n');
            }
            Block::Comment { key } => {
                let id = alloc.get_id(None)?;
                let _ = writeln!(out, "  comment {id} \"{}\"", data.label(key)?);
            }
            Block::Title { key } => {
                let id = alloc.get_id(None)?;
                let _ = writeln!(out, "  title {id} \"{}\"", data.label(key)?);
            }
            Block::Condition(cond) => {
                let _ = write!(out, "  condition {} when {}", cond.kind(), cond.build());
                match cond.message() {
                    Ok(message) => {
                        let _ = write!(out, " message \"{message}\"");
                    }
                    Err(GenerateError::NotApplicable { .. }) => {}
                    Err(e) => return Err(e),
                }
                match cond.hidden_field() {
                    Ok(field) => {
                        let _ = write!(out, " field={}", varname(field));
                    }
                    Err(GenerateError::NotApplicable { .. }) => {}
                    Err(e) => return Err(e),
                }
                out.push('\n');
            }
        }
    }

    Ok(out)
}
