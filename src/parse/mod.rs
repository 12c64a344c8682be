mod error;
mod grammar;
mod parser;

pub use error::ParseError;
pub use parser::{Block, Definition, FieldKind, FormMeta, LineWarning};

/// Parse a definition file into a [`Definition`].
///
/// The format is line-oriented: blank lines and `#` comments are skipped,
/// the first token of every other line selects the block type. Lines whose
/// leading token names no known block are collected as warnings and
/// skipped; they never fail the parse.
///
/// # Errors
///
/// Returns [`ParseError`] (with the offending line number) if a known
/// directive is malformed.
pub fn parse(input: &str) -> Result<Definition, ParseError> {
    let mut def = Definition::default();

    for (idx, raw) in input.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut tokens = line.split_whitespace();
        let head = tokens.next().unwrap_or_default();
        match head {
            "form" => {
                def.meta.title = Some(single_arg(line_no, head, &mut tokens)?);
            }
            "meta" => {
                let sub = tokens.next().ok_or_else(|| {
                    ParseError::new(line_no, "meta needs a name and a field-data key")
                })?;
                let key = single_arg(line_no, "meta", &mut tokens)?;
                match sub {
                    "identifier" => def.meta.identifier = Some(key),
                    "description" => def.meta.description = Some(key),
                    "url" => def.meta.url = Some(key),
                    other => {
                        return Err(ParseError::new(
                            line_no,
                            format!("unknown meta name '{other}'"),
                        ))
                    }
                }
            }
            "listing" | "filter" => {
                let keys: Vec<String> = tokens.map(str::to_owned).collect();
                if keys.is_empty() {
                    return Err(ParseError::new(
                        line_no,
                        format!("'{head}' needs at least one field-data key"),
                    ));
                }
                if head == "listing" {
                    def.listing.extend(keys);
                } else {
                    def.filters.extend(keys);
                }
            }
            "page" => {
                let title = single_arg(line_no, head, &mut tokens)?;
                def.blocks.push(Block::Page { title });
            }
            "text" | "longtext" | "checkbox" | "select" => {
                let kind = match head {
                    "text" => FieldKind::Text,
                    "longtext" => FieldKind::LongText,
                    "checkbox" => FieldKind::Checkbox,
                    _ => FieldKind::Select,
                };
                let key = single_arg(line_no, head, &mut tokens)?;
                def.blocks.push(Block::Field { kind, key });
            }
            "comment" => {
                let key = single_arg(line_no, head, &mut tokens)?;
                def.blocks.push(Block::Comment { key });
            }
            "title" => {
                let key = single_arg(line_no, head, &mut tokens)?;
                def.blocks.push(Block::Title { key });
            }
            "when" => {
                // The grammar gets the raw remainder: quoted messages may
                // contain any whitespace.
                let rest = line["when".len()..].trim_start();
                let cond = grammar::parse_condition(rest)
                    .map_err(|msg| ParseError::new(line_no, msg))?;
                def.blocks.push(Block::Condition(cond));
            }
            other => def.warnings.push(LineWarning {
                line: line_no,
                token: other.to_owned(),
            }),
        }
    }

    Ok(def)
}

fn single_arg(
    line_no: usize,
    head: &str,
    tokens: &mut std::str::SplitWhitespace<'_>,
) -> Result<String, ParseError> {
    let arg = tokens
        .next()
        .ok_or_else(|| ParseError::new(line_no, format!("'{head}' needs a field-data key")))?;
    if tokens.next().is_some() {
        return Err(ParseError::new(
            line_no,
            format!("'{head}' takes exactly one field-data key"),
        ));
    }
    Ok(arg.to_owned())
}
