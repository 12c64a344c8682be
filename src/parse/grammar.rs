use winnow::ascii::dec_int;
use winnow::combinator::{alt, cut_err, delimited, opt, preceded, repeat};
use winnow::error::{ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{any, take_while};

use crate::types::{field, form_var, CompareOp, Condition, ConditionAction, Expr, Value};

// -- Whitespace -------------------------------------------------------------

fn ws(input: &mut &str) -> ModalResult<()> {
    take_while(0.., |c: char| c.is_ascii_whitespace())
        .void()
        .parse_next(input)
}

// -- Identifiers ------------------------------------------------------------

// Field references allow ':' for contextualized field-data keys.
fn ident<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        take_while(1.., |c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| {
            c.is_ascii_alphanumeric() || c == '_' || c == ':'
        }),
    )
        .take()
        .parse_next(input)
}

// -- Values -----------------------------------------------------------------

fn string_literal(input: &mut &str) -> ModalResult<String> {
    '"'.parse_next(input)?;
    let mut s = String::new();
    loop {
        let ch = any.parse_next(input)?;
        match ch {
            '"' => return Ok(s),
            '\\' => {
                let esc = any.parse_next(input)?;
                match esc {
                    '"' => s.push('"'),
                    '\\' => s.push('\\'),
                    'n' => s.push('\n'),
                    't' => s.push('\t'),
                    other => {
                        s.push('\\');
                        s.push(other);
                    }
                }
            }
            c => s.push(c),
        }
    }
}

fn value(input: &mut &str) -> ModalResult<Value> {
    ws.parse_next(input)?;
    alt((
        string_literal.map(Value::String),
        "true".value(Value::Bool(true)),
        "false".value(Value::Bool(false)),
        dec_int::<_, i64, _>.map(Value::Int),
    ))
    .context(StrContext::Expected(StrContextValue::Description("value")))
    .parse_next(input)
}

// -- Comparison operators ---------------------------------------------------

fn compare_op(input: &mut &str) -> ModalResult<CompareOp> {
    ws.parse_next(input)?;
    alt((
        ">=".value(CompareOp::Gte),
        ">".value(CompareOp::Gt),
        "<=".value(CompareOp::Lte),
        "<".value(CompareOp::Lt),
        "==".value(CompareOp::Eq),
        "!=".value(CompareOp::Neq),
    ))
    .parse_next(input)
}

// -- Expressions (precedence: or < and < not < primary) ---------------------

fn primary(input: &mut &str) -> ModalResult<Expr> {
    ws.parse_next(input)?;
    alt((delimited('(', expr, (ws, ')')), membership, comparison_or_var))
        .context(StrContext::Expected(StrContextValue::Description(
            "expression",
        )))
        .parse_next(input)
}

// `<literal> in <field>`: membership in the list-coerced field value.
fn membership(input: &mut &str) -> ModalResult<Expr> {
    let val = value.parse_next(input)?;
    ws.parse_next(input)?;
    "in".parse_next(input)?;
    ws.parse_next(input)?;
    let name = cut_err(ident)
        .context(StrContext::Expected(StrContextValue::Description(
            "field reference",
        )))
        .parse_next(input)?;
    Ok(field(name).contains(val))
}

fn comparison_or_var(input: &mut &str) -> ModalResult<Expr> {
    let name = ident.parse_next(input)?;
    let checkpoint = input.checkpoint();
    ws.parse_next(input)?;
    if let Ok(op) = compare_op.parse_next(input) {
        let val = cut_err(value).parse_next(input)?;
        Ok(Expr::Compare {
            var: form_var(name),
            op,
            value: val,
        })
    } else {
        input.reset(&checkpoint);
        Ok(Expr::Var(form_var(name)))
    }
}

fn unary(input: &mut &str) -> ModalResult<Expr> {
    ws.parse_next(input)?;
    if opt(alt(("NOT", "not"))).parse_next(input)?.is_some() {
        let inner = cut_err(unary).parse_next(input)?;
        Ok(Expr::Not(Box::new(inner)))
    } else {
        primary(input)
    }
}

fn and_expr(input: &mut &str) -> ModalResult<Expr> {
    let first = unary(input)?;
    let rest: Vec<Expr> =
        repeat(0.., preceded((ws, alt(("AND", "and"))), cut_err(unary))).parse_next(input)?;
    Ok(rest
        .into_iter()
        .fold(first, |acc, r| Expr::And(Box::new(acc), Box::new(r))))
}

fn or_expr(input: &mut &str) -> ModalResult<Expr> {
    let first = and_expr(input)?;
    let rest: Vec<Expr> =
        repeat(0.., preceded((ws, alt(("OR", "or"))), cut_err(and_expr))).parse_next(input)?;
    Ok(rest
        .into_iter()
        .fold(first, |acc, r| Expr::Or(Box::new(acc), Box::new(r))))
}

fn expr(input: &mut &str) -> ModalResult<Expr> {
    ws.parse_next(input)?;
    or_expr(input)
}

// -- Condition actions ------------------------------------------------------

fn action(input: &mut &str) -> ModalResult<ConditionAction> {
    ws.parse_next(input)?;
    alt((
        preceded(("leave", ws), cut_err(string_literal))
            .map(|message| ConditionAction::LeavePage { message }),
        "hide-page".value(ConditionAction::HidePage),
        preceded(("hide-field", ws), cut_err(ident)).map(|f| ConditionAction::HideField {
            field: f.to_owned(),
        }),
    ))
    .context(StrContext::Expected(StrContextValue::Description(
        "condition action (leave / hide-page / hide-field)",
    )))
    .parse_next(input)
}

fn condition(input: &mut &str) -> ModalResult<Condition> {
    let e = expr(input)?;
    let a = cut_err(action).parse_next(input)?;
    ws.parse_next(input)?;
    Ok(Condition::new(e, a))
}

/// Parse the remainder of a `when` line into a [`Condition`].
pub(crate) fn parse_condition(input: &str) -> Result<Condition, String> {
    condition.parse(input).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ConditionKind;

    #[test]
    fn simple_comparison_with_leave() {
        let cond = parse_condition(r#"status == "closed" leave "Requests are closed.""#).unwrap();
        assert_eq!(cond.kind(), ConditionKind::LeavePage);
        assert_eq!(cond.message().unwrap(), "Requests are closed.");
        assert_eq!(cond.build(), "(form_var_status == 'closed')");
    }

    #[test]
    fn bare_field_is_a_truthiness_test() {
        let cond = parse_condition("opt_out hide-page").unwrap();
        assert_eq!(cond.kind(), ConditionKind::HidePage);
        assert_eq!(cond.build(), "form_var_opt_out");
    }

    #[test]
    fn membership_uses_list_coercion() {
        let cond = parse_condition(r#""other" in choices hide-field details"#).unwrap();
        assert_eq!(cond.kind(), ConditionKind::HideField);
        assert_eq!(cond.hidden_field().unwrap(), "details");
        let built = cond.build();
        assert!(built.starts_with("('other' in ("));
        assert!(built.contains("isinstance(form_var_choices, list)"));
    }

    #[test]
    fn precedence_and_binds_before_or() {
        let cond = parse_condition("a or b and c hide-page").unwrap();
        match cond.expr() {
            Expr::Or(left, right) => {
                assert!(matches!(left.as_ref(), Expr::Var(v) if v == "form_var_a"));
                assert!(matches!(right.as_ref(), Expr::And(_, _)));
            }
            other => panic!("expected Or, got {other:?}"),
        }
    }

    #[test]
    fn parenthesized_grouping() {
        let cond = parse_condition("(a or b) and c hide-page").unwrap();
        match cond.expr() {
            Expr::And(left, right) => {
                assert!(matches!(left.as_ref(), Expr::Or(_, _)));
                assert!(matches!(right.as_ref(), Expr::Var(v) if v == "form_var_c"));
            }
            other => panic!("expected And, got {other:?}"),
        }
    }

    #[test]
    fn not_expression() {
        let cond = parse_condition("not consent hide-page").unwrap();
        assert_eq!(cond.build(), "(not form_var_consent)");
    }

    #[test]
    fn all_comparison_ops() {
        let ops = [
            ("==", CompareOp::Eq),
            ("!=", CompareOp::Neq),
            (">", CompareOp::Gt),
            (">=", CompareOp::Gte),
            ("<", CompareOp::Lt),
            ("<=", CompareOp::Lte),
        ];
        for (sym, expected) in ops {
            let cond = parse_condition(&format!("age {sym} 18 hide-page")).unwrap();
            match cond.expr() {
                Expr::Compare { op, .. } => assert_eq!(*op, expected, "failed for {sym}"),
                other => panic!("expected Compare for {sym}, got {other:?}"),
            }
        }
    }

    #[test]
    fn all_value_types() {
        let cases = [
            ("42", Value::Int(42)),
            ("-5", Value::Int(-5)),
            ("true", Value::Bool(true)),
            ("false", Value::Bool(false)),
            (r#""hello""#, Value::String("hello".into())),
        ];
        for (literal, expected) in cases {
            let cond = parse_condition(&format!("x == {literal} hide-page")).unwrap();
            match cond.expr() {
                Expr::Compare { value, .. } => {
                    assert_eq!(*value, expected, "failed for {literal}");
                }
                other => panic!("expected Compare for {literal}, got {other:?}"),
            }
        }
    }

    #[test]
    fn contextualized_field_keys_parse() {
        let cond = parse_condition("applicant:age >= 18 hide-field guardian:name").unwrap();
        assert_eq!(cond.build(), "(form_var_applicant:age >= 18)");
        assert_eq!(cond.hidden_field().unwrap(), "guardian:name");
    }

    #[test]
    fn already_qualified_reference_is_kept() {
        let cond = parse_condition("form_var_status == \"open\" hide-page").unwrap();
        assert_eq!(cond.build(), "(form_var_status == 'open')");
    }

    #[test]
    fn string_escapes_in_message() {
        let cond = parse_condition(r#"x == 1 leave "a \"quoted\" word""#).unwrap();
        assert_eq!(cond.message().unwrap(), "a \"quoted\" word");
    }

    #[test]
    fn missing_action_is_an_error() {
        assert!(parse_condition("status == \"open\"").is_err());
    }

    #[test]
    fn dangling_operator_is_an_error() {
        assert!(parse_condition("a and hide-page").is_err());
    }
}
