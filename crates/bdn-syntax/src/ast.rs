//! The component tree produced by the parser and consumed by the formatter.
//!
//! A document holds a single component. Components wrap an entity (a literal,
//! range, collection or procedure) together with an optional parameter
//! context and trailing note. Every node owns its children outright.

use std::fmt;

use facet::Facet;
use indexmap::IndexMap;

use crate::literal::{Element, Primitive, StringType, Symbol};
use crate::range::Range;

// ============================================================================
// Documents and Components
// ============================================================================

/// A complete BDN document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Text of a leading `!>` ... `<!` comment, delimiters included.
    pub notice: Option<String>,
    /// The document body.
    pub component: Component,
}

/// An entity with its optional context and note.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    /// The value itself.
    pub entity: Entity,
    /// Parameters attached in `( ... )` after the entity.
    pub context: Option<Context>,
    /// Text of a trailing `! ...` note, including the `!`.
    pub note: Option<String>,
}

impl Component {
    /// Wrap an entity with no context or note.
    #[must_use]
    pub const fn new(entity: Entity) -> Self {
        Self {
            entity,
            context: None,
            note: None,
        }
    }

    /// Attach a context.
    #[must_use]
    pub fn with_context(mut self, context: Context) -> Self {
        self.context = Some(context);
        self
    }

    /// Attach a note.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// The concrete collection kind, or `None` when the entity is not a
    /// collection.
    ///
    /// Structures are always catalogs. A sequence is a list unless its
    /// `$type` parameter names a set, queue or stack.
    #[must_use]
    pub fn collection_kind(&self) -> Option<CollectionKind> {
        match &self.entity {
            Entity::Collection(Collection::Structure(_)) => Some(CollectionKind::Catalog),
            Entity::Collection(Collection::Sequence(_)) => {
                let declared = self
                    .context
                    .as_ref()
                    .and_then(|context| context.get("type"))
                    .and_then(|component| match &component.entity {
                        Entity::String(StringType::Name(name)) => {
                            name.segments().iter().find_map(|segment| {
                                CollectionKind::DECLARED
                                    .into_iter()
                                    .find(|kind| kind.segment() == Some(segment.as_str()))
                            })
                        }
                        _ => None,
                    });
                Some(declared.unwrap_or(CollectionKind::List))
            }
            _ => None,
        }
    }
}

impl From<Entity> for Component {
    fn from(entity: Entity) -> Self {
        Self::new(entity)
    }
}

impl From<Primitive> for Component {
    fn from(primitive: Primitive) -> Self {
        Self::new(primitive.into())
    }
}

/// The value part of a component.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    /// An element literal.
    Element(Element),
    /// A string literal.
    String(StringType),
    /// A range between two primitives.
    Range(Range),
    /// A sequence or structure in `[ ... ]`.
    Collection(Collection),
    /// Statements in `{ ... }`.
    Procedure(Procedure),
}

impl From<Primitive> for Entity {
    fn from(primitive: Primitive) -> Self {
        match primitive {
            Primitive::Element(element) => Self::Element(element),
            Primitive::String(string) => Self::String(string),
        }
    }
}

/// Parameters keyed by symbol, in insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Context {
    parameters: IndexMap<Symbol, Component>,
}

impl Context {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, returning the value it replaced.
    pub fn insert(&mut self, symbol: Symbol, value: Component) -> Option<Component> {
        self.parameters.insert(symbol, value)
    }

    /// Look up a parameter by name, without the `$`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Component> {
        self.parameters
            .iter()
            .find(|(symbol, _)| symbol.name() == name)
            .map(|(_, value)| value)
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Whether there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &Component)> {
        self.parameters.iter()
    }
}

// ============================================================================
// Collections
// ============================================================================

/// Items in `[ ... ]`.
#[derive(Debug, Clone, PartialEq)]
pub enum Collection {
    /// Ordered components: `[1, 2, 3]`.
    Sequence(Vec<Component>),
    /// Ordered key/value associations: `[$a: 1, $b: 2]`.
    Structure(Vec<Association>),
}

impl Collection {
    /// Number of items or associations.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Sequence(items) => items.len(),
            Self::Structure(associations) => associations.len(),
        }
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Associate `value` with `key` in a structure. An existing key keeps its
    /// position and has its value replaced, which is returned.
    ///
    /// A sequence has no keys, so it is left untouched and the value is
    /// handed back.
    pub fn insert(&mut self, key: Primitive, value: Component) -> Option<Component> {
        let Self::Structure(associations) = self else {
            return Some(value);
        };
        if let Some(existing) = associations.iter_mut().find(|entry| entry.key == key) {
            return Some(std::mem::replace(&mut existing.value, value));
        }
        associations.push(Association { key, value });
        None
    }

    /// Look up the value associated with `key` in a structure.
    #[must_use]
    pub fn get(&self, key: &Primitive) -> Option<&Component> {
        match self {
            Self::Structure(associations) => associations
                .iter()
                .find(|entry| entry.key == *key)
                .map(|entry| &entry.value),
            Self::Sequence(_) => None,
        }
    }
}

/// A key/value pair in a structure.
#[derive(Debug, Clone, PartialEq)]
pub struct Association {
    /// The key.
    pub key: Primitive,
    /// The value.
    pub value: Component,
}

/// The concrete kind of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Facet)]
#[repr(u8)]
pub enum CollectionKind {
    /// An ordered sequence.
    List,
    /// An ordered sequence without duplicates.
    Set,
    /// A first-in, first-out sequence.
    Queue,
    /// A last-in, first-out sequence.
    Stack,
    /// A structure of associations.
    Catalog,
}

impl CollectionKind {
    /// Kinds that a sequence only takes when its `$type` declares them.
    pub const DECLARED: [Self; 3] = [Self::Set, Self::Queue, Self::Stack];

    /// The canonical `$type` name for kinds that must be declared.
    #[must_use]
    pub const fn type_name(self) -> Option<&'static str> {
        match self {
            Self::Set => Some("/bdn/collections/Set/v1"),
            Self::Queue => Some("/bdn/collections/Queue/v1"),
            Self::Stack => Some("/bdn/collections/Stack/v1"),
            Self::List | Self::Catalog => None,
        }
    }

    /// The segment of [`type_name`](Self::type_name) that identifies the kind
    /// inside any declared name.
    fn segment(self) -> Option<&'static str> {
        self.type_name().and_then(|name| name.rsplit('/').nth(1))
    }
}

// ============================================================================
// Procedures
// ============================================================================

/// Statements in `{ ... }`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Procedure {
    /// The statements, in order.
    pub statements: Vec<Statement>,
}

/// A line of a procedure.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// A standalone `!>` ... `<!` comment.
    Comment(String),
    /// A clause with an optional exception handler.
    Clause {
        /// The clause.
        main: MainClause,
        /// Exception handling for the clause.
        handler: Option<Handler>,
    },
}

/// `on $exception matching ... do { ... }`.
#[derive(Debug, Clone, PartialEq)]
pub struct Handler {
    /// Name bound to the exception.
    pub exception: String,
    /// Patterns tried in order.
    pub blocks: Vec<Block>,
}

/// An expression paired with the procedure it guards.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Condition or pattern.
    pub expression: Expression,
    /// Body.
    pub procedure: Procedure,
}

/// The main clause of a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum MainClause {
    /// `if condition do { ... }`
    If(Block),
    /// `select target matching pattern do { ... } ...`
    Select {
        /// The value being matched.
        target: Expression,
        /// Options tried in order.
        options: Vec<Block>,
    },
    /// `while condition do { ... }`
    While(Block),
    /// `with each item in sequence do { ... }`
    With {
        /// The loop variable.
        item: String,
        /// The sequence iterated over.
        sequence: Expression,
        /// Body.
        procedure: Procedure,
    },
    /// `continue loop`
    Continue,
    /// `break loop`
    Break,
    /// `return result`
    Return(Expression),
    /// `throw exception`
    Throw(Expression),
    /// An expression, optionally assigned to a recipient.
    Evaluate {
        /// Target and operator when the result is assigned.
        assignment: Option<(Recipient, Assignment)>,
        /// The expression.
        expression: Expression,
    },
}

/// Where an evaluated result is stored.
#[derive(Debug, Clone, PartialEq)]
pub enum Recipient {
    /// `name := ...`
    Variable(String),
    /// `name[index] := ...`
    Attribute {
        /// The composite variable.
        name: String,
        /// Indices into it.
        indices: Vec<Expression>,
    },
}

/// Assignment operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Facet)]
#[repr(u8)]
pub enum Assignment {
    /// `:=`
    Define,
    /// `?=`
    Default,
    /// `+=`
    Sum,
    /// `-=`
    Difference,
    /// `*=`
    Product,
    /// `/=`
    Quotient,
}

impl Assignment {
    /// All operators.
    pub const ALL: [Self; 6] = [
        Self::Define,
        Self::Default,
        Self::Sum,
        Self::Difference,
        Self::Product,
        Self::Quotient,
    ];

    /// The operator text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Define => ":=",
            Self::Default => "?=",
            Self::Sum => "+=",
            Self::Difference => "-=",
            Self::Product => "*=",
            Self::Quotient => "/=",
        }
    }

    /// Look up an operator by its text.
    #[must_use]
    pub fn from_text(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == text)
    }
}

// ============================================================================
// Expressions
// ============================================================================

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A literal, range, collection or procedure.
    Component(Box<Component>),
    /// A variable reference.
    Variable(String),
    /// `name(arguments)`
    Function {
        /// Function name.
        name: String,
        /// Arguments.
        arguments: Vec<Expression>,
    },
    /// `(expression)`
    Precedence(Box<Expression>),
    /// `@expression`
    Dereference(Box<Expression>),
    /// `|expression|`
    Magnitude(Box<Expression>),
    /// `-expression` or `*expression`
    Inversion {
        /// Which inverse.
        operator: Inversion,
        /// The operand.
        operand: Box<Expression>,
    },
    /// `not expression`
    Complement(Box<Expression>),
    /// `target.message(arguments)` or `target<-message(arguments)`
    Invocation {
        /// The receiver.
        target: Box<Expression>,
        /// Synchronous or asynchronous.
        operator: Invocation,
        /// Message name.
        message: String,
        /// Arguments.
        arguments: Vec<Expression>,
    },
    /// `composite[indices]`
    Item {
        /// The composite being indexed.
        composite: Box<Expression>,
        /// Indices.
        indices: Vec<Expression>,
    },
    /// Two operands joined by an infix operator.
    Binary {
        /// Left operand.
        first: Box<Expression>,
        /// The operator.
        operator: Operator,
        /// Right operand.
        second: Box<Expression>,
    },
}

impl Expression {
    /// Shorthand for a literal component.
    #[must_use]
    pub fn literal(primitive: Primitive) -> Self {
        Self::Component(Box::new(primitive.into()))
    }

    /// Shorthand for a binary expression.
    #[must_use]
    pub fn binary(first: Self, operator: Operator, second: Self) -> Self {
        Self::Binary {
            first: Box::new(first),
            operator,
            second: Box::new(second),
        }
    }
}

/// Unary inversion operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Facet)]
#[repr(u8)]
pub enum Inversion {
    /// `-x`, the additive inverse.
    Negative,
    /// `*x`, the complex conjugate.
    Conjugate,
}

impl Inversion {
    /// The operator text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Negative => "-",
            Self::Conjugate => "*",
        }
    }
}

/// Message-passing operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Facet)]
#[repr(u8)]
pub enum Invocation {
    /// `.` waits for the result.
    Synchronous,
    /// `<-` sends without waiting.
    Asynchronous,
}

impl Invocation {
    /// The operator text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Synchronous => ".",
            Self::Asynchronous => "<-",
        }
    }
}

/// Grouping of infix operators, in the order the parser tries them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Facet)]
#[repr(u8)]
pub enum OperatorClass {
    /// `&`
    Chaining,
    /// `^`
    Exponential,
    /// `* / // + -`
    Arithmetic,
    /// `< = > ≠ IS MATCHES`
    Comparison,
    /// `and sans xor or`
    Logical,
}

/// Infix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Facet)]
#[repr(u8)]
pub enum Operator {
    /// `&`
    Concatenate,
    /// `^`
    Power,
    /// `*`
    Times,
    /// `/`
    Divide,
    /// `//`
    Remainder,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `<`
    Less,
    /// `=`
    Equal,
    /// `>`
    More,
    /// `≠`
    Unequal,
    /// `IS`
    Is,
    /// `MATCHES`
    Matches,
    /// `and`
    And,
    /// `sans`
    Sans,
    /// `xor`
    Xor,
    /// `or`
    Or,
}

impl Operator {
    /// All operators, grouped by class in parser order.
    pub const ALL: [Self; 17] = [
        Self::Concatenate,
        Self::Power,
        Self::Times,
        Self::Divide,
        Self::Remainder,
        Self::Plus,
        Self::Minus,
        Self::Less,
        Self::Equal,
        Self::More,
        Self::Unequal,
        Self::Is,
        Self::Matches,
        Self::And,
        Self::Sans,
        Self::Xor,
        Self::Or,
    ];

    /// The operator text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Concatenate => "&",
            Self::Power => "^",
            Self::Times => "*",
            Self::Divide => "/",
            Self::Remainder => "//",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Less => "<",
            Self::Equal => "=",
            Self::More => ">",
            Self::Unequal => "≠",
            Self::Is => "IS",
            Self::Matches => "MATCHES",
            Self::And => "and",
            Self::Sans => "sans",
            Self::Xor => "xor",
            Self::Or => "or",
        }
    }

    /// The class the operator belongs to.
    #[must_use]
    pub const fn class(self) -> OperatorClass {
        match self {
            Self::Concatenate => OperatorClass::Chaining,
            Self::Power => OperatorClass::Exponential,
            Self::Times | Self::Divide | Self::Remainder | Self::Plus | Self::Minus => {
                OperatorClass::Arithmetic
            }
            Self::Less | Self::Equal | Self::More | Self::Unequal | Self::Is | Self::Matches => {
                OperatorClass::Comparison
            }
            Self::And | Self::Sans | Self::Xor | Self::Or => OperatorClass::Logical,
        }
    }

    /// Look up an operator of the given class by its text.
    #[must_use]
    pub fn lookup(class: OperatorClass, text: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.class() == class && op.as_str() == text)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literal::{self, Name, Quote};
    use crate::token::TokenKind;

    fn symbol(name: &str) -> Symbol {
        Symbol::new(name).unwrap()
    }

    fn quote(text: &str) -> Component {
        Primitive::String(StringType::Quote(Quote::new(text))).into()
    }

    #[test]
    fn structure_insert_replaces_in_place() {
        let mut collection = Collection::Structure(Vec::new());
        let first = literal::parse(TokenKind::Symbol, "$a").unwrap();
        let second = literal::parse(TokenKind::Symbol, "$b").unwrap();
        assert!(collection.insert(first.clone(), quote("one")).is_none());
        assert!(collection.insert(second, quote("two")).is_none());
        let replaced = collection.insert(first.clone(), quote("uno"));
        assert_eq!(replaced, Some(quote("one")));
        assert_eq!(collection.len(), 2);
        let Collection::Structure(associations) = &collection else {
            panic!("expected a structure");
        };
        assert_eq!(associations[0].key, first);
        assert_eq!(collection.get(&first), Some(&quote("uno")));
    }

    #[test]
    fn collection_kinds() {
        let list = Component::new(Entity::Collection(Collection::Sequence(Vec::new())));
        assert_eq!(list.collection_kind(), Some(CollectionKind::List));

        let mut context = Context::new();
        let name: Name = "/bdn/collections/Stack/v1".parse().unwrap();
        context.insert(
            symbol("type"),
            Primitive::String(StringType::Name(name)).into(),
        );
        let stack = list.clone().with_context(context);
        assert_eq!(stack.collection_kind(), Some(CollectionKind::Stack));

        for kind in CollectionKind::DECLARED {
            let mut context = Context::new();
            let name: Name = kind.type_name().unwrap().parse().unwrap();
            context.insert(symbol("type"), Primitive::String(StringType::Name(name)).into());
            let declared = list.clone().with_context(context);
            assert_eq!(declared.collection_kind(), Some(kind));
        }

        let catalog = Component::new(Entity::Collection(Collection::Structure(Vec::new())));
        assert_eq!(catalog.collection_kind(), Some(CollectionKind::Catalog));
        assert_eq!(quote("x").collection_kind(), None);
    }

    #[test]
    fn context_keeps_insertion_order() {
        let mut context = Context::new();
        context.insert(symbol("zeta"), quote("z"));
        context.insert(symbol("alpha"), quote("a"));
        let names: Vec<&str> = context.iter().map(|(symbol, _)| symbol.name()).collect();
        assert_eq!(names, ["zeta", "alpha"]);
        assert_eq!(context.get("alpha"), Some(&quote("a")));
    }

    #[test]
    fn operator_lookup_respects_class() {
        assert_eq!(
            Operator::lookup(OperatorClass::Arithmetic, "//"),
            Some(Operator::Remainder)
        );
        assert_eq!(Operator::lookup(OperatorClass::Logical, "+"), None);
        assert_eq!(Assignment::from_text("?="), Some(Assignment::Default));
        assert_eq!(CollectionKind::Set.type_name(), Some("/bdn/collections/Set/v1"));
    }
}
