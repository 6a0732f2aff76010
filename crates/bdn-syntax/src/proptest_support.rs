//! Property-based testing support with arbitrary generators.
//!
//! This module provides proptest strategies for generating canonical
//! component trees to test parser/formatter invariants.

use std::collections::BTreeMap;

use proptest::prelude::*;

use crate::ast::*;
use crate::literal::{self, Binary, Primitive, Symbol, Tag};
use crate::token::TokenKind;

/// Generate a symbol name (alphanumeric, starts with a letter).
fn name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-zA-Z0-9]{0,8}"
}

/// Generate the text of a real, imaginary or complex number.
fn number_text_strategy() -> impl Strategy<Value = String> {
    let constant = prop::sample::select(vec!["e", "π", "pi", "φ", "phi", "τ", "tau"]);
    prop_oneof![
        (0u32..10_000).prop_map(|n| n.to_string()),
        (-500i32..500, 1u32..100).prop_map(|(whole, fraction)| format!("{whole}.{fraction}")),
        (any::<bool>(), constant).prop_map(|(negative, c)| {
            if negative { format!("-{c}") } else { c.to_string() }
        }),
        (1u32..100).prop_map(|n| format!("{n}i")),
        (1u32..100).prop_map(|n| format!("-{n}.5i")),
        (1i32..50, prop_oneof![-50i32..0, 1i32..50])
            .prop_map(|(real, imaginary)| format!("({real}, {imaginary}i)")),
        Just("(-π, -φi)".to_string()),
    ]
}

/// Generate literal text of a kind whose canonical form is easy to produce.
fn literal_text_strategy() -> impl Strategy<Value = (TokenKind, String)> {
    let fractions = prop::sample::select(vec!["", ".25", ".5"]);
    prop_oneof![
        number_text_strategy().prop_map(|text| (TokenKind::Number, text)),
        Just((TokenKind::Angle, "~π".to_string())),
        (0u32..6, fractions).prop_map(|(whole, fraction)| {
            (TokenKind::Angle, format!("~{whole}{fraction}"))
        }),
        any::<bool>().prop_map(|b| (TokenKind::Boolean, b.to_string())),
        name_strategy().prop_map(|s| (TokenKind::Symbol, format!("${s}"))),
        "[a-zA-Z ]{0,12}".prop_map(|s| (TokenKind::Quote, format!("\"{s}\""))),
        (0u32..=100).prop_map(|n| (TokenKind::Percentage, format!("{n}%"))),
        (1u32..100).prop_map(|n| (TokenKind::Probability, format!(".{n}"))),
        (1u32..20, 1u32..20).prop_map(|(a, b)| (TokenKind::Version, format!("v{a}.{b}"))),
        (1u32..31).prop_map(|d| (TokenKind::Duration, format!("~P{d}D"))),
        (1970u32..2100).prop_map(|y| (TokenKind::Moment, format!("<{y}-06-15>"))),
        Just((TokenKind::Pattern, "any".to_string())),
        prop::collection::vec(any::<u8>(), 1..12)
            .prop_map(|bytes| (TokenKind::Tag, Tag::from_bytes(&bytes).to_string())),
        "(/[a-z][a-z0-9]{0,5}){1,3}".prop_map(|s| (TokenKind::Name, s)),
        prop::collection::vec(any::<u8>(), 1..90)
            .prop_map(|bytes| (TokenKind::Binary, Binary::new(bytes).to_string())),
        "[a-z]{1,8}".prop_map(|s| (TokenKind::Resource, format!("<https://example.com/{s}>"))),
        "[a-zA-Z ]{0,12}".prop_map(|s| (TokenKind::Narrative, format!("\">{s}<\""))),
    ]
}

/// Generate an arbitrary primitive.
pub fn arb_primitive() -> impl Strategy<Value = Primitive> {
    literal_text_strategy().prop_filter_map("literal must decode", |(kind, text)| {
        literal::parse(kind, &text).ok()
    })
}

/// Generate an optional trailing note.
fn arb_note() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        4 => Just(None),
        1 => "[a-z]{1,10}".prop_map(|text| Some(format!("! {text}"))),
    ]
}

/// Generate a leaf component.
pub fn arb_leaf() -> impl Strategy<Value = Component> {
    (arb_primitive(), arb_note()).prop_map(|(primitive, note)| Component {
        note,
        ..Component::from(primitive)
    })
}

/// Generate a context with distinct parameter names.
fn arb_context(value: BoxedStrategy<Component>) -> impl Strategy<Value = Option<Context>> {
    prop::option::weighted(
        0.2,
        prop::collection::btree_map(name_strategy(), value, 1..3).prop_map(|parameters| {
            let mut context = Context::new();
            for (name, value) in parameters {
                if let Ok(symbol) = Symbol::new(name) {
                    context.insert(symbol, value);
                }
            }
            context
        }),
    )
}

/// Generate a variable name that cannot be read as a keyword or literal.
fn variable_strategy() -> impl Strategy<Value = String> {
    "q[a-z]{0,4}"
}

/// Generate an expression operand. Only the final operand of a statement may
/// carry a note, since a note runs to the end of the line.
fn arb_operand(with_note: bool) -> impl Strategy<Value = Expression> {
    let note = if with_note { arb_note().boxed() } else { Just(None::<String>).boxed() };
    prop_oneof![
        variable_strategy().prop_map(Expression::Variable),
        (arb_primitive(), note).prop_map(|(primitive, note)| {
            Expression::Component(Box::new(Component {
                note,
                ..Component::from(primitive)
            }))
        }),
    ]
}

/// Generate a flat expression whose last operand may carry a note.
fn arb_expression() -> impl Strategy<Value = Expression> {
    let operator = prop::sample::select(vec![
        Operator::Concatenate,
        Operator::Power,
        Operator::Times,
        Operator::Plus,
        Operator::Minus,
        Operator::Equal,
        Operator::And,
        Operator::Or,
    ]);
    prop_oneof![
        3 => arb_operand(true),
        2 => (arb_operand(false), operator, arb_operand(true)).prop_map(
            |(first, operator, second)| Expression::binary(first, operator, second)
        ),
        1 => arb_operand(true).prop_map(|operand| Expression::Complement(Box::new(operand))),
        1 => variable_strategy().prop_map(|name| {
            Expression::Dereference(Box::new(Expression::Variable(name)))
        }),
    ]
}

/// Generate a statement ending in an expression.
fn arb_statement() -> impl Strategy<Value = Statement> {
    let assignment = prop::sample::select(Assignment::ALL.to_vec());
    let main = prop_oneof![
        3 => (variable_strategy(), assignment, arb_expression()).prop_map(
            |(name, operator, expression)| MainClause::Evaluate {
                assignment: Some((Recipient::Variable(name), operator)),
                expression,
            }
        ),
        1 => arb_expression().prop_map(MainClause::Return),
        1 => arb_expression().prop_map(MainClause::Throw),
    ];
    main.prop_map(|main| Statement::Clause {
        main,
        handler: None,
    })
}

/// Generate a procedure of simple statements.
pub fn arb_procedure() -> impl Strategy<Value = Procedure> {
    prop::collection::vec(arb_statement(), 0..4).prop_map(|statements| Procedure { statements })
}

/// Generate an arbitrary component tree of nested collections and procedures.
pub fn arb_component() -> impl Strategy<Value = Component> {
    arb_leaf().prop_recursive(3, 24, 4, |inner| {
        let sequence = prop::collection::vec(inner.clone(), 0..4).prop_map(Collection::Sequence);
        let structure = prop::collection::btree_map(name_strategy(), inner.clone(), 0..4)
            .prop_map(|entries: BTreeMap<String, Component>| {
                let mut structure = Collection::Structure(Vec::new());
                for (name, value) in entries {
                    if let Ok(key) = literal::parse(TokenKind::Symbol, &format!("${name}")) {
                        structure.insert(key, value);
                    }
                }
                structure
            });
        let entity = prop_oneof![
            2 => sequence.prop_map(Entity::Collection),
            2 => structure.prop_map(Entity::Collection),
            1 => arb_procedure().prop_map(Entity::Procedure),
        ];
        (entity, arb_context(inner.boxed()), arb_note())
            .prop_map(|(entity, context, note)| Component {
                entity,
                context,
                note,
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{format, format_document, FormatConfig};
    use crate::parser::Parser;

    proptest! {
        /// Formatted components parse back to the same tree.
        #[test]
        fn parse_formatted_components(component in arb_component()) {
            let text = format(&component, &FormatConfig::default());
            let parsed = Parser::parse_component(&text);
            prop_assert!(parsed.is_ok(), "Failed to parse:\n{}\nError: {:?}", text, parsed.as_ref().err());
            prop_assert_eq!(parsed.unwrap(), component);
        }

        /// Formatting should be idempotent: format(parse(format(x))) == format(x).
        #[test]
        fn format_idempotent(component in arb_component()) {
            let config = FormatConfig::default();
            let document = Document { notice: None, component };
            let formatted1 = format_document(&document, &config);

            let reparsed = Parser::parse(&formatted1);
            prop_assert!(reparsed.is_ok(), "Failed to parse:\n{}\nError: {:?}", formatted1, reparsed.as_ref().err());
            let formatted2 = format_document(&reparsed.unwrap(), &config);
            prop_assert_eq!(formatted1, formatted2, "Formatting not idempotent");
        }

        /// Every generated literal survives a trip through its text form.
        #[test]
        fn literal_text_round_trip(primitive in arb_primitive()) {
            let text = primitive.to_string();
            let parsed = literal::parse(primitive.kind(), &text);
            prop_assert_eq!(parsed.ok(), Some(primitive));
        }
    }
}
