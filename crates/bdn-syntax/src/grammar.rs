//! The BDN grammar as data.
//!
//! Each parser rule pushes its name onto a rule stack while it runs; when a
//! committed rule fails, the diagnostic names the active rules and quotes the
//! productions below so the caller can see what was expected.

/// Grammar rules in the order the parser descends through them.
pub const GRAMMAR: &[(&str, &str)] = &[
    ("document", "(COMMENT EOL)? component EOL EOF"),
    ("component", "entity context? NOTE?"),
    ("entity", "primitive | bracket | openRange | procedure"),
    ("primitive", "element | string"),
    (
        "bracket",
        r#""[" (":" "]" | "]" | EOL? (structure | range | sequence))"#,
    ),
    (
        "structure",
        r#"association ("," association)* "]" | EOL (association EOL)* "]""#,
    ),
    ("association", r#"primitive ":" component"#),
    ("range", r#"primitive ".." primitive ("]" | ")")"#),
    ("openRange", r#""(" primitive ".." primitive ("]" | ")")"#),
    (
        "sequence",
        r#"component ("," component)* "]" | EOL (component EOL)* "]""#,
    ),
    (
        "context",
        r#""(" EOL? parameter (("," | EOL) parameter)* EOL? ")""#,
    ),
    ("parameter", r#"SYMBOL ":" component"#),
    (
        "procedure",
        r#""{" ("}" | EOL ((COMMENT | statement) EOL)* "}" | statement (";" statement)* "}")"#,
    ),
    ("statement", "mainClause handler?"),
    (
        "handler",
        r#""on" IDENTIFIER ("matching" expression "do" procedure)+"#,
    ),
    (
        "mainClause",
        "if | select | while | with | continue | break | return | throw | evaluate",
    ),
    ("if", r#""if" expression "do" procedure"#),
    (
        "select",
        r#""select" expression ("matching" expression "do" procedure)+"#,
    ),
    ("while", r#""while" expression "do" procedure"#),
    (
        "with",
        r#""with" "each" IDENTIFIER "in" expression "do" procedure"#,
    ),
    ("continue", r#""continue" "loop""#),
    ("break", r#""break" "loop""#),
    ("return", r#""return" expression"#),
    ("throw", r#""throw" expression"#),
    (
        "evaluate",
        r#"(recipient (":=" | "?=" | "+=" | "-=" | "*=" | "/="))? expression"#,
    ),
    ("recipient", r#"IDENTIFIER ("[" indices "]")?"#),
    (
        "expression",
        "(component | function | variable | precedence | dereference | magnitude | inversion | complement) extension*",
    ),
    (
        "extension",
        "invocation | item | chaining | exponential | arithmetic | comparison | logical",
    ),
    (
        "invocation",
        r#"("." | "<-") IDENTIFIER "(" arguments ")""#,
    ),
    ("item", r#""[" indices "]""#),
    ("chaining", r#""&" expression"#),
    ("exponential", r#""^" expression"#),
    (
        "arithmetic",
        r#"("*" | "/" | "//" | "+" | "-") expression"#,
    ),
    (
        "comparison",
        r#"("<" | "=" | ">" | "≠" | "IS" | "MATCHES") expression"#,
    ),
    (
        "logical",
        r#"("and" | "sans" | "xor" | "or") expression"#,
    ),
    ("function", r#"IDENTIFIER "(" arguments ")""#),
    ("variable", "IDENTIFIER"),
    ("arguments", r#"(expression ("," expression)*)?"#),
    ("indices", r#"expression ("," expression)*"#),
    ("precedence", r#""(" expression ")""#),
    ("dereference", r#""@" expression"#),
    ("magnitude", r#""|" expression "|""#),
    ("inversion", r#"("-" | "*") expression"#),
    ("complement", r#""not" expression"#),
];

/// Look up the production for a rule name.
#[must_use]
pub fn production(rule: &str) -> Option<&'static str> {
    GRAMMAR
        .iter()
        .find(|(name, _)| *name == rule)
        .map(|(_, production)| *production)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_rules_have_productions() {
        assert_eq!(production("parameter"), Some(r#"SYMBOL ":" component"#));
        assert!(production("sequence").is_some());
        assert!(production("nonsense").is_none());
    }

    #[test]
    fn rule_names_are_unique() {
        let mut names: Vec<&str> = GRAMMAR.iter().map(|(name, _)| *name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), GRAMMAR.len());
    }
}
