//! Canonical formatter for BDN components.
//!
//! Formatting is deterministic: any component prints the same way every
//! time, and parsing the output yields an equal tree. Collections, contexts
//! and procedures with a single element stay on one line; anything larger is
//! laid out one element per line, indented one level deeper than its
//! brackets.

use crate::ast::*;
use crate::literal::{Primitive, StringType};

/// Formatting options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatConfig {
    /// One level of indentation (default: four spaces).
    pub indent: String,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            indent: "    ".to_string(),
        }
    }
}

impl FormatConfig {
    /// Indent with `width` spaces per level.
    #[must_use]
    pub fn with_width(width: usize) -> Self {
        Self {
            indent: " ".repeat(width),
        }
    }
}

/// Format a component. The result has no trailing newline.
#[must_use]
pub fn format(component: &Component, config: &FormatConfig) -> String {
    let mut formatter = Formatter::new(config);
    formatter.component(component);
    formatter.output
}

/// Format a document, ending with exactly one newline.
#[must_use]
pub fn format_document(document: &Document, config: &FormatConfig) -> String {
    let mut formatter = Formatter::new(config);
    if let Some(notice) = &document.notice {
        formatter.write(notice);
        formatter.newline();
    }
    formatter.component(&document.component);
    formatter.newline();
    formatter.output
}

struct Formatter<'a> {
    config: &'a FormatConfig,
    output: String,
    depth: usize,
}

impl<'a> Formatter<'a> {
    const fn new(config: &'a FormatConfig) -> Self {
        Self {
            config,
            output: String::new(),
            depth: 0,
        }
    }

    fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }

    fn newline(&mut self) {
        self.output.push('\n');
    }

    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.output.push_str(&self.config.indent);
        }
    }

    /// Write `items` one per line between `open` and `close`, or inline when
    /// `inline` allows it.
    fn block<T>(
        &mut self,
        open: &str,
        close: &str,
        items: &[T],
        inline: bool,
        separator: &str,
        mut item: impl FnMut(&mut Self, &T),
    ) {
        self.write(open);
        if inline {
            for (i, each) in items.iter().enumerate() {
                if i > 0 {
                    self.write(separator);
                }
                item(self, each);
            }
            self.write(close);
            return;
        }
        self.newline();
        self.depth += 1;
        for each in items {
            self.indent();
            item(self, each);
            self.newline();
        }
        self.depth -= 1;
        self.indent();
        self.write(close);
    }

    // ========================================================================
    // Components
    // ========================================================================

    fn component(&mut self, component: &Component) {
        self.entity(&component.entity);
        if let Some(context) = &component.context {
            self.context(context);
        }
        if let Some(note) = &component.note {
            self.write("  ");
            self.write(note);
        }
    }

    fn entity(&mut self, entity: &Entity) {
        match entity {
            Entity::Element(element) => self.write(&element.to_string()),
            Entity::String(string) => self.string(string),
            Entity::Range(range) => self.write(&range.to_string()),
            Entity::Collection(collection) => self.collection(collection),
            Entity::Procedure(procedure) => self.procedure(procedure),
        }
    }

    fn string(&mut self, string: &StringType) {
        match string {
            StringType::Binary(binary) => {
                let text = binary.format_indented(&self.config.indent, self.depth);
                self.write(&text);
            }
            other => self.write(&other.to_string()),
        }
    }

    fn primitive(&mut self, primitive: &Primitive) {
        match primitive {
            Primitive::Element(element) => self.write(&element.to_string()),
            Primitive::String(string) => self.string(string),
        }
    }

    fn collection(&mut self, collection: &Collection) {
        match collection {
            Collection::Sequence(items) if items.is_empty() => self.write("[ ]"),
            Collection::Structure(associations) if associations.is_empty() => self.write("[:]"),
            Collection::Sequence(items) => {
                let inline = items.len() == 1 && items[0].note.is_none();
                self.block("[", "]", items, inline, ", ", Self::component);
            }
            Collection::Structure(associations) => {
                let inline = associations.len() == 1 && associations[0].value.note.is_none();
                self.block("[", "]", associations, inline, ", ", |f, association| {
                    f.primitive(&association.key);
                    f.write(": ");
                    f.component(&association.value);
                });
            }
        }
    }

    fn context(&mut self, context: &Context) {
        if context.is_empty() {
            return;
        }
        let parameters: Vec<_> = context.iter().collect();
        let inline = parameters.len() == 1 && parameters[0].1.note.is_none();
        self.block("(", ")", &parameters, inline, ", ", |f, (symbol, value)| {
            f.write(&symbol.to_string());
            f.write(": ");
            f.component(value);
        });
    }

    // ========================================================================
    // Procedures
    // ========================================================================

    fn procedure(&mut self, procedure: &Procedure) {
        let statements = &procedure.statements;
        if statements.is_empty() {
            self.write("{ }");
            return;
        }
        let inline = statements.len() == 1 && !ends_line(&statements[0]);
        self.block("{", "}", statements, inline, "; ", Self::statement);
    }

    fn statement(&mut self, statement: &Statement) {
        match statement {
            Statement::Comment(text) => self.write(text),
            Statement::Clause { main, handler } => {
                self.main_clause(main);
                if let Some(handler) = handler {
                    self.write(" on ");
                    self.write(&handler.exception);
                    self.options(&handler.blocks);
                }
            }
        }
    }

    fn options(&mut self, blocks: &[Block]) {
        for block in blocks {
            self.write(" matching ");
            self.block_body(block);
        }
    }

    fn block_body(&mut self, block: &Block) {
        self.expression(&block.expression);
        self.write(" do ");
        self.procedure(&block.procedure);
    }

    fn main_clause(&mut self, main: &MainClause) {
        match main {
            MainClause::If(block) => {
                self.write("if ");
                self.block_body(block);
            }
            MainClause::Select { target, options } => {
                self.write("select ");
                self.expression(target);
                self.options(options);
            }
            MainClause::While(block) => {
                self.write("while ");
                self.block_body(block);
            }
            MainClause::With {
                item,
                sequence,
                procedure,
            } => {
                self.write("with each ");
                self.write(item);
                self.write(" in ");
                self.expression(sequence);
                self.write(" do ");
                self.procedure(procedure);
            }
            MainClause::Continue => self.write("continue loop"),
            MainClause::Break => self.write("break loop"),
            MainClause::Return(result) => {
                self.write("return ");
                self.expression(result);
            }
            MainClause::Throw(exception) => {
                self.write("throw ");
                self.expression(exception);
            }
            MainClause::Evaluate {
                assignment,
                expression,
            } => {
                if let Some((recipient, operator)) = assignment {
                    self.recipient(recipient);
                    self.write(" ");
                    self.write(operator.as_str());
                    self.write(" ");
                }
                self.expression(expression);
            }
        }
    }

    fn recipient(&mut self, recipient: &Recipient) {
        match recipient {
            Recipient::Variable(name) => self.write(name),
            Recipient::Attribute { name, indices } => {
                self.write(name);
                self.write("[");
                self.list(indices);
                self.write("]");
            }
        }
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn expression(&mut self, expression: &Expression) {
        match expression {
            Expression::Component(component) => self.component(component),
            Expression::Variable(name) => self.write(name),
            Expression::Function { name, arguments } => {
                self.write(name);
                self.write("(");
                self.list(arguments);
                self.write(")");
            }
            Expression::Precedence(inner) => {
                self.write("(");
                self.expression(inner);
                self.write(")");
            }
            Expression::Dereference(inner) => {
                self.write("@");
                self.expression(inner);
            }
            Expression::Magnitude(inner) => {
                self.write("|");
                self.expression(inner);
                self.write("|");
            }
            Expression::Inversion { operator, operand } => {
                self.write(operator.as_str());
                self.expression(operand);
            }
            Expression::Complement(inner) => {
                self.write("not ");
                self.expression(inner);
            }
            Expression::Invocation {
                target,
                operator,
                message,
                arguments,
            } => {
                self.expression(target);
                self.write(operator.as_str());
                self.write(message);
                self.write("(");
                self.list(arguments);
                self.write(")");
            }
            Expression::Item { composite, indices } => {
                self.expression(composite);
                self.write("[");
                self.list(indices);
                self.write("]");
            }
            Expression::Binary {
                first,
                operator,
                second,
            } => {
                self.expression(first);
                self.write(" ");
                self.write(operator.as_str());
                self.write(" ");
                self.expression(second);
            }
        }
    }

    fn list(&mut self, expressions: &[Expression]) {
        for (i, expression) in expressions.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.expression(expression);
        }
    }
}

/// Whether printing `statement` leaves the rest of its line taken, by a
/// comment or by a trailing note.
fn ends_line(statement: &Statement) -> bool {
    match statement {
        Statement::Comment(_) => true,
        Statement::Clause {
            handler: Some(_), ..
        } => false,
        Statement::Clause { main, .. } => match main {
            MainClause::Return(expression)
            | MainClause::Throw(expression)
            | MainClause::Evaluate { expression, .. } => ends_with_note(expression),
            _ => false,
        },
    }
}

/// Whether the last thing printed for `expression` is a note.
fn ends_with_note(expression: &Expression) -> bool {
    match expression {
        Expression::Component(component) => component.note.is_some(),
        Expression::Binary { second: last, .. }
        | Expression::Inversion { operand: last, .. }
        | Expression::Dereference(last)
        | Expression::Complement(last) => ends_with_note(last),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literal::Binary;
    use crate::parser::Parser;

    fn canonical(source: &str) -> String {
        let component = Parser::parse_component(source).unwrap();
        format(&component, &FormatConfig::default())
    }

    #[test]
    fn test_format_empty_forms() {
        insta::assert_snapshot!(canonical("[]"), @"[ ]");
        insta::assert_snapshot!(canonical("[:]"), @"[:]");
        insta::assert_snapshot!(canonical("{}"), @"{ }");
    }

    #[test]
    fn test_format_single_items_inline() {
        insta::assert_snapshot!(canonical("[\n    42\n]"), @"[42]");
        insta::assert_snapshot!(canonical("[$key:\"value\"]"), @r#"[$key: "value"]"#);
        insta::assert_snapshot!(canonical("{\n    return x\n}"), @"{return x}");
    }

    #[test]
    fn test_format_many_items_multiline() {
        insta::assert_snapshot!(canonical("[$foo, $bar]"), @r"
        [
            $foo
            $bar
        ]
        ");
    }

    #[test]
    fn test_format_note_forces_multiline() {
        assert_eq!(
            canonical("[\n    42  ! the answer\n]"),
            "[\n    42  ! the answer\n]"
        );
    }

    #[test]
    fn test_format_nested_depth() {
        assert_eq!(
            canonical("[$a: [1, 2], $b: {x := 1; y := 2}]"),
            "[\n    $a: [\n        1\n        2\n    ]\n    $b: {\n        x := 1\n        y := 2\n    }\n]"
        );
    }

    #[test]
    fn test_format_context() {
        assert_eq!(
            canonical("[1, 2]($type:/bdn/collections/Set/v1)"),
            "[\n    1\n    2\n]($type: /bdn/collections/Set/v1)"
        );
        assert_eq!(
            canonical("\"x\"($a: 1, $b: 2)"),
            "\"x\"(\n    $a: 1\n    $b: 2\n)"
        );
    }

    #[test]
    fn test_format_expression_spacing() {
        assert_eq!(
            canonical("{return -x+|y|*not z}"),
            "{return -x + |y| * not z}"
        );
        assert_eq!(
            canonical("{list.add(@item[1], queue<-next())}"),
            "{list.add(@item[1], queue<-next())}"
        );
    }

    #[test]
    fn test_format_statements() {
        let source = "{\n    !>\n        Setup.\n    <!\n    if x > 3 do {return x} on error matching any do {throw error}\n    with each item in items do {total += item}\n}";
        assert_eq!(canonical(source), source);
    }

    #[test]
    fn test_format_trailing_note_forces_multiline_procedure() {
        assert_eq!(canonical("{\n    x := 5  ! note\n}"), "{\n    x := 5  ! note\n}");
        assert_eq!(
            canonical("{\n    return y + [1]  ! last\n}"),
            "{\n    return y + [1]  ! last\n}"
        );
        assert_eq!(
            canonical("{\n    if x do {\n        throw $bad  ! why\n    }\n}"),
            "{if x do {\n    throw $bad  ! why\n}}"
        );
    }

    #[test]
    fn test_format_wraps_long_binary() {
        let component = Component::from(Primitive::String(StringType::Binary(Binary::new(
            vec![7; 60],
        ))));
        let formatted = format(&component, &FormatConfig::default());
        let lines: Vec<&str> = formatted.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "'>");
        assert_eq!(lines[1].len(), 64);
        assert_eq!(lines[3], "<'");
        assert_eq!(canonical(&formatted), formatted);
    }

    #[test]
    fn test_format_document_single_newline() {
        let document = Parser::parse("!>\n    Notice.\n<!\n[1, 2]\n").unwrap();
        assert_eq!(
            format_document(&document, &FormatConfig::default()),
            "!>\n    Notice.\n<!\n[\n    1\n    2\n]\n"
        );
    }

    #[test]
    fn test_format_custom_indent() {
        let component = Parser::parse_component("[1, 2]").unwrap();
        assert_eq!(
            format(&component, &FormatConfig::with_width(2)),
            "[\n  1\n  2\n]"
        );
    }
}
