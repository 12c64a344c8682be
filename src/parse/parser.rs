use crate::types::Condition;

/// Field blocks that carry a durable, cache-backed id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    LongText,
    Checkbox,
    Select,
}

impl FieldKind {
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::LongText => "longtext",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Select => "select",
        }
    }
}

/// One unit of a parsed definition, in source order.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Starts a page; the key resolves to the page title.
    Page { title: String },
    /// A data field with a durable id.
    Field { kind: FieldKind, key: String },
    /// Free-standing explanatory text; anonymous.
    Comment { key: String },
    /// A section title; anonymous.
    Title { key: String },
    /// A conditional visibility/navigation rule.
    Condition(Condition),
}

/// Form-level metadata collected from `form` and `meta` lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormMeta {
    /// Field-data key of the form title. Required by generation.
    pub title: Option<String>,
    pub identifier: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
}

/// A skipped line whose leading token named no known block type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineWarning {
    pub line: usize,
    pub token: String,
}

/// The result of parsing one definition file.
#[derive(Debug, Default)]
pub struct Definition {
    pub meta: FormMeta,
    pub blocks: Vec<Block>,
    /// Field-data keys shown in the admin listing.
    pub listing: Vec<String>,
    /// Field-data keys offered as admin filters.
    pub filters: Vec<String>,
    /// Unknown-block lines, skipped but reported.
    pub warnings: Vec<LineWarning>,
}
