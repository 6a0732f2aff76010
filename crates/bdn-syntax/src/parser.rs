//! Recursive-descent parser from tokens to the component tree.
//!
//! The scanner runs on a worker thread and hands tokens over a bounded queue.
//! Tokens are appended to an arena as the parser asks for them; backtracking
//! just moves the cursor back, so alternatives can look ahead as far as they
//! need.
//!
//! Each alternative returns `Ok(None)` when it does not apply, after putting
//! the cursor back where it started. Once an alternative has seen enough to
//! commit, a missing piece is a fatal [`ParseError`].

use std::ops::ControlFlow;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use tracing::{debug, trace, warn};

use crate::ast::*;
use crate::error::{Diagnostic, ParseError, ParseResult};
use crate::literal::{self, Primitive, Symbol};
use crate::range::{Extent, Range};
use crate::scanner;
use crate::span::Span;
use crate::token::{Token, TokenKind};

/// Configuration for the token pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseConfig {
    /// Tokens the scanner may run ahead of the parser (default: 256).
    pub queue_capacity: usize,
    /// How long the parser waits for the next token (default: 5 seconds).
    pub token_timeout: Duration,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 256,
            token_timeout: Duration::from_secs(5),
        }
    }
}

/// Parser for BDN documents and components.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    config: ParseConfig,
}

impl Parser {
    /// Create a parser with a custom configuration.
    #[must_use]
    pub const fn with_config(config: ParseConfig) -> Self {
        Self { config }
    }

    /// Parse a complete document with the default configuration.
    pub fn parse(source: &str) -> ParseResult<Document> {
        Self::default().document(source)
    }

    /// Parse a single component with the default configuration.
    pub fn parse_component(source: &str) -> ParseResult<Component> {
        Self::default().component(source)
    }

    /// Parse a complete document: an optional notice comment, a component and
    /// a final end of line.
    pub fn document(&self, source: &str) -> ParseResult<Document> {
        self.run(source, Session::document)
    }

    /// Parse a single component, optionally followed by an end of line.
    pub fn component(&self, source: &str) -> ParseResult<Component> {
        self.run(source, Session::fragment)
    }

    fn run<'s, T>(
        &self,
        source: &'s str,
        entry: impl FnOnce(&mut Session<'s>) -> ParseResult<T>,
    ) -> ParseResult<T> {
        thread::scope(|scope| {
            let receiver = scanner::spawn(scope, source, self.config.queue_capacity);
            let mut session = Session::new(source, receiver, self.config.token_timeout);
            // The session owns the receiver; dropping it on return releases
            // a scanner still blocked on a full queue.
            entry(&mut session)
        })
    }
}

/// State for one parse: the token arena, cursor and active rules.
struct Session<'a> {
    source: &'a str,
    receiver: Receiver<Token>,
    timeout: Duration,
    tokens: Vec<Token>,
    cursor: usize,
    rules: Vec<&'static str>,
}

impl<'a> Session<'a> {
    fn new(source: &'a str, receiver: Receiver<Token>, timeout: Duration) -> Self {
        Self {
            source,
            receiver,
            timeout,
            tokens: Vec::new(),
            cursor: 0,
            rules: Vec::new(),
        }
    }

    // ========================================================================
    // Token Arena
    // ========================================================================

    /// Pull tokens from the queue until the cursor is backed by one.
    fn fill(&mut self) -> ParseResult<()> {
        while self.tokens.len() <= self.cursor {
            match self.receiver.recv_timeout(self.timeout) {
                Ok(token) => self.tokens.push(token),
                Err(RecvTimeoutError::Timeout) => {
                    warn!(timeout = ?self.timeout, tokens = self.tokens.len(), "token queue stalled");
                    return Err(ParseError::Timeout(self.timeout));
                }
                Err(RecvTimeoutError::Disconnected) => {
                    let end = u32::try_from(self.source.len()).unwrap_or(u32::MAX);
                    let (line, column) = self
                        .tokens
                        .last()
                        .map_or((1, 1), |token| (token.span.end_line, token.span.end_column));
                    self.tokens
                        .push(Token::new(TokenKind::Eof, "", Span::point(end, line, column)));
                }
            }
        }
        Ok(())
    }

    /// The token at the cursor. An unrecognised character is fatal here.
    fn peek(&mut self) -> ParseResult<&Token> {
        self.fill()?;
        let token = &self.tokens[self.cursor];
        if token.kind == TokenKind::Error {
            let token = token.clone();
            return Err(ParseError::Lexical(
                self.diagnostic("unrecognized character", token),
            ));
        }
        Ok(&self.tokens[self.cursor])
    }

    /// Move past the current token. The cursor never moves past `Eof`.
    fn advance(&mut self) -> ParseResult<Token> {
        let token = self.peek()?.clone();
        if token.kind != TokenKind::Eof {
            self.cursor += 1;
        }
        Ok(token)
    }

    const fn mark(&self) -> usize {
        self.cursor
    }

    fn reset(&mut self, mark: usize) {
        if self.cursor != mark {
            trace!(from = self.cursor, to = mark, rule = ?self.rules.last(), "backtrack");
            self.cursor = mark;
        }
    }

    fn backup(&mut self) {
        self.reset(self.cursor.saturating_sub(1));
    }

    fn take_kind(&mut self, kind: TokenKind) -> ParseResult<Option<Token>> {
        if self.peek()?.kind == kind {
            return self.advance().map(Some);
        }
        Ok(None)
    }

    fn take_delimiter(&mut self, text: &str) -> ParseResult<bool> {
        if self.peek()?.is_delimiter(text) {
            self.advance()?;
            return Ok(true);
        }
        Ok(false)
    }

    fn take_keyword(&mut self, text: &str) -> ParseResult<bool> {
        if self.peek()?.is_keyword(text) {
            self.advance()?;
            return Ok(true);
        }
        Ok(false)
    }

    fn take_identifier(&mut self) -> ParseResult<Option<String>> {
        Ok(self.take_kind(TokenKind::Identifier)?.map(|token| token.text))
    }

    fn expect_delimiter(&mut self, text: &str) -> ParseResult<()> {
        if self.take_delimiter(text)? {
            return Ok(());
        }
        Err(self.error(&format!("expected `{text}`")))
    }

    fn expect_keyword(&mut self, text: &str) -> ParseResult<()> {
        if self.take_keyword(text)? {
            return Ok(());
        }
        Err(self.error(&format!("expected `{text}`")))
    }

    fn expect_identifier(&mut self) -> ParseResult<String> {
        match self.take_identifier()? {
            Some(name) => Ok(name),
            None => Err(self.error("expected an identifier")),
        }
    }

    fn expect_eol(&mut self) -> ParseResult<()> {
        if self.take_kind(TokenKind::Eol)?.is_some() {
            return Ok(());
        }
        Err(self.error("expected the end of the line"))
    }

    /// Run `body` with `name` pushed onto the rule stack.
    fn rule<T>(
        &mut self,
        name: &'static str,
        body: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<T> {
        self.rules.push(name);
        let result = body(self);
        self.rules.pop();
        result
    }

    fn diagnostic(&self, message: &str, token: Token) -> Diagnostic {
        Diagnostic::new(message, token, self.source, &self.rules)
    }

    /// A syntax error at the current token.
    fn error(&mut self, message: &str) -> ParseError {
        let token = match self.peek() {
            Ok(token) => token.clone(),
            Err(error) => return error,
        };
        ParseError::Syntax(self.diagnostic(message, token))
    }

    /// Require a piece that a committed production cannot do without.
    fn require<T>(&mut self, found: Option<T>, message: &str) -> ParseResult<T> {
        match found {
            Some(value) => Ok(value),
            None => Err(self.error(message)),
        }
    }

    // ========================================================================
    // Documents and Components
    // ========================================================================

    /// Parse a document.
    fn document(&mut self) -> ParseResult<Document> {
        self.rule("document", |p| {
            let notice = match p.take_kind(TokenKind::Comment)? {
                Some(comment) => {
                    p.expect_eol()?;
                    Some(comment.text)
                }
                None => None,
            };
            let component = p.component()?;
            let component = p.require(component, "expected a component")?;
            p.expect_eol()?;
            if p.take_kind(TokenKind::Eof)?.is_none() {
                return Err(p.error("expected the end of the document"));
            }
            debug!(tokens = p.tokens.len(), "parsed document");
            Ok(Document { notice, component })
        })
    }

    /// Parse a stand-alone component.
    fn fragment(&mut self) -> ParseResult<Component> {
        let component = self.component()?;
        let component = self.require(component, "expected a component")?;
        self.take_kind(TokenKind::Eol)?;
        if self.take_kind(TokenKind::Eof)?.is_none() {
            return Err(self.error("expected the end of the component"));
        }
        debug!(tokens = self.tokens.len(), "parsed component");
        Ok(component)
    }

    /// Parse a component: an entity with optional context and note.
    fn component(&mut self) -> ParseResult<Option<Component>> {
        self.rule("component", |p| {
            let Some(entity) = p.entity()? else {
                return Ok(None);
            };
            let context = p.context()?;
            let note = p.take_kind(TokenKind::Note)?.map(|token| token.text);
            Ok(Some(Component {
                entity,
                context,
                note,
            }))
        })
    }

    /// Parse an entity.
    fn entity(&mut self) -> ParseResult<Option<Entity>> {
        self.rule("entity", |p| {
            if let Some(primitive) = p.primitive()? {
                return Ok(Some(primitive.into()));
            }
            if let Some(entity) = p.bracket()? {
                return Ok(Some(entity));
            }
            if let Some(range) = p.open_range()? {
                return Ok(Some(Entity::Range(range)));
            }
            Ok(p.procedure()?.map(Entity::Procedure))
        })
    }

    /// Parse a single literal token into its value.
    fn primitive(&mut self) -> ParseResult<Option<Primitive>> {
        let token = self.peek()?;
        if !token.kind.is_literal() {
            return Ok(None);
        }
        let token = self.advance()?;
        match literal::parse(token.kind, &token.text) {
            Ok(primitive) => Ok(Some(primitive)),
            Err(source) => Err(ParseError::Literal {
                diagnostic: self.diagnostic("invalid literal", token),
                source,
            }),
        }
    }

    // ========================================================================
    // Collections and Ranges
    // ========================================================================

    /// Parse anything in `[ ... ]`.
    fn bracket(&mut self) -> ParseResult<Option<Entity>> {
        if !self.take_delimiter("[")? {
            return Ok(None);
        }
        self.rule("bracket", |p| {
            if p.take_delimiter(":")? {
                p.expect_delimiter("]")?;
                return Ok(Some(Entity::Collection(Collection::Structure(Vec::new()))));
            }
            if p.take_delimiter("]")? {
                return Ok(Some(Entity::Collection(Collection::Sequence(Vec::new()))));
            }
            let multiline = p.take_kind(TokenKind::Eol)?.is_some();
            if let Some(structure) = p.structure(multiline)? {
                return Ok(Some(Entity::Collection(structure)));
            }
            if !multiline {
                if let Some(range) = p.range()? {
                    return Ok(Some(Entity::Range(range)));
                }
            }
            p.sequence(multiline).map(|sequence| Some(Entity::Collection(sequence)))
        })
    }

    /// Parse a structure body after the opening `[`.
    fn structure(&mut self, multiline: bool) -> ParseResult<Option<Collection>> {
        self.rule("structure", |p| {
            let Some(first) = p.association()? else {
                return Ok(None);
            };
            let mut structure = Collection::Structure(Vec::new());
            structure.insert(first.key, first.value);
            if multiline {
                p.expect_eol()?;
                while !p.take_delimiter("]")? {
                    let association = p.association()?;
                    let association = p.require(association, "expected an association or `]`")?;
                    structure.insert(association.key, association.value);
                    p.expect_eol()?;
                }
            } else {
                while p.take_delimiter(",")? {
                    let association = p.association()?;
                    let association = p.require(association, "expected an association")?;
                    structure.insert(association.key, association.value);
                }
                p.expect_delimiter("]")?;
            }
            Ok(Some(structure))
        })
    }

    /// Parse `key: value`. A primitive without a `:` is not a key.
    fn association(&mut self) -> ParseResult<Option<Association>> {
        let mark = self.mark();
        self.rule("association", |p| {
            let Some(key) = p.primitive()? else {
                return Ok(None);
            };
            if !p.take_delimiter(":")? {
                p.reset(mark);
                return Ok(None);
            }
            let value = p.component()?;
            let value = p.require(value, "expected a value after `:`")?;
            Ok(Some(Association { key, value }))
        })
    }

    /// Parse `first..last` followed by the closing bracket, after `[`.
    fn range(&mut self) -> ParseResult<Option<Range>> {
        self.rule("range", |p| p.endpoints('['))
    }

    /// Parse `(first..last]` or `(first..last)`.
    fn open_range(&mut self) -> ParseResult<Option<Range>> {
        let mark = self.mark();
        if !self.take_delimiter("(")? {
            return Ok(None);
        }
        let range = self.rule("openRange", |p| p.endpoints('('))?;
        if range.is_none() {
            self.reset(mark);
        }
        Ok(range)
    }

    /// The endpoints and closing bracket of a range whose opening bracket has
    /// been taken. Commits once `..` follows the first endpoint.
    fn endpoints(&mut self, open: char) -> ParseResult<Option<Range>> {
        let mark = self.mark();
        let start = self.peek()?.clone();
        let Some(first) = self.primitive()? else {
            return Ok(None);
        };
        if !self.take_delimiter("..")? {
            self.reset(mark);
            return Ok(None);
        }
        let last = self.primitive()?;
        let last = self.require(last, "expected the last endpoint of the range")?;
        let close = if self.take_delimiter("]")? {
            ']'
        } else if self.take_delimiter(")")? {
            ')'
        } else {
            return Err(self.error("expected `]` or `)`"));
        };
        let extent = Extent::from_brackets(open, close).unwrap_or_default();
        Range::new(first, extent, last)
            .map(Some)
            .map_err(|source| ParseError::Type {
                diagnostic: self.diagnostic("invalid range", start),
                source,
            })
    }

    /// Parse a sequence body after the opening `[`.
    fn sequence(&mut self, multiline: bool) -> ParseResult<Collection> {
        self.rule("sequence", |p| {
            let mut items = Vec::new();
            if multiline {
                while !p.take_delimiter("]")? {
                    let item = p.component()?;
                    items.push(p.require(item, "expected a component or `]`")?);
                    p.expect_eol()?;
                }
            } else {
                let item = p.component()?;
                items.push(p.require(item, "expected a component")?);
                while p.take_delimiter(",")? {
                    let item = p.component()?;
                    items.push(p.require(item, "expected a component")?);
                }
                p.expect_delimiter("]")?;
            }
            Ok(Collection::Sequence(items))
        })
    }

    /// Parse a context. Only `( $symbol :` commits to one.
    fn context(&mut self) -> ParseResult<Option<Context>> {
        let mark = self.mark();
        if !self.take_delimiter("(")? {
            return Ok(None);
        }
        let multiline = self.take_kind(TokenKind::Eol)?.is_some();
        let commits =
            self.take_kind(TokenKind::Symbol)?.is_some() && self.take_delimiter(":")?;
        self.reset(mark);
        if !commits {
            return Ok(None);
        }
        self.advance()?;
        if multiline {
            self.advance()?;
        }
        self.rule("context", |p| {
            let mut context = Context::new();
            loop {
                let (symbol, value) = p.parameter()?;
                context.insert(symbol, value);
                if multiline {
                    p.expect_eol()?;
                    if p.take_delimiter(")")? {
                        break;
                    }
                } else if !p.take_delimiter(",")? {
                    p.expect_delimiter(")")?;
                    break;
                }
            }
            Ok(Some(context))
        })
    }

    /// Parse `$symbol: component`.
    fn parameter(&mut self) -> ParseResult<(Symbol, Component)> {
        self.rule("parameter", |p| {
            let token = p.take_kind(TokenKind::Symbol)?;
            let token = p.require(token, "expected a parameter symbol")?;
            let symbol = token.text.parse::<Symbol>().map_err(|source| ParseError::Literal {
                diagnostic: p.diagnostic("invalid literal", token.clone()),
                source,
            })?;
            p.expect_delimiter(":")?;
            let value = p.component()?;
            let value = p.require(value, "expected a parameter value")?;
            Ok((symbol, value))
        })
    }

    // ========================================================================
    // Procedures and Statements
    // ========================================================================

    /// Parse `{ ... }`.
    fn procedure(&mut self) -> ParseResult<Option<Procedure>> {
        if !self.take_delimiter("{")? {
            return Ok(None);
        }
        self.rule("procedure", |p| {
            let mut statements = Vec::new();
            if p.take_delimiter("}")? {
                return Ok(Some(Procedure { statements }));
            }
            if p.take_kind(TokenKind::Eol)?.is_some() {
                while !p.take_delimiter("}")? {
                    if let Some(comment) = p.take_kind(TokenKind::Comment)? {
                        statements.push(Statement::Comment(comment.text));
                    } else {
                        statements.push(p.statement()?);
                    }
                    p.expect_eol()?;
                }
            } else {
                statements.push(p.statement()?);
                while p.take_delimiter(";")? {
                    statements.push(p.statement()?);
                }
                p.expect_delimiter("}")?;
            }
            Ok(Some(Procedure { statements }))
        })
    }

    /// Parse a required procedure, as after `do`.
    fn body(&mut self) -> ParseResult<Procedure> {
        let procedure = self.procedure()?;
        self.require(procedure, "expected a procedure")
    }

    /// Parse a clause with its optional handler.
    fn statement(&mut self) -> ParseResult<Statement> {
        self.rule("statement", |p| {
            let main = p.main_clause()?;
            let main = p.require(main, "expected a statement")?;
            let handler = p.handler()?;
            Ok(Statement::Clause { main, handler })
        })
    }

    /// Parse `on exception matching ... do { ... }`.
    fn handler(&mut self) -> ParseResult<Option<Handler>> {
        if !self.take_keyword("on")? {
            return Ok(None);
        }
        self.rule("handler", |p| {
            let exception = p.expect_identifier()?;
            let blocks = p.options()?;
            Ok(Some(Handler { exception, blocks }))
        })
    }

    /// Parse one or more `matching expression do procedure` options.
    fn options(&mut self) -> ParseResult<Vec<Block>> {
        self.expect_keyword("matching")?;
        let mut blocks = vec![self.block()?];
        while self.take_keyword("matching")? {
            blocks.push(self.block()?);
        }
        Ok(blocks)
    }

    /// Parse `expression do procedure`.
    fn block(&mut self) -> ParseResult<Block> {
        let expression = self.expression()?;
        let expression = self.require(expression, "expected an expression")?;
        self.expect_keyword("do")?;
        let procedure = self.body()?;
        Ok(Block {
            expression,
            procedure,
        })
    }

    /// Parse the main clause of a statement.
    fn main_clause(&mut self) -> ParseResult<Option<MainClause>> {
        self.rule("mainClause", |p| {
            if p.take_keyword("if")? {
                return p.rule("if", |p| p.block().map(|block| Some(MainClause::If(block))));
            }
            if p.take_keyword("select")? {
                return p.rule("select", |p| {
                    let target = p.expression()?;
                    let target = p.require(target, "expected an expression")?;
                    let options = p.options()?;
                    Ok(Some(MainClause::Select { target, options }))
                });
            }
            if p.take_keyword("while")? {
                return p.rule("while", |p| {
                    p.block().map(|block| Some(MainClause::While(block)))
                });
            }
            if p.take_keyword("with")? {
                return p.rule("with", |p| {
                    p.expect_keyword("each")?;
                    let item = p.expect_identifier()?;
                    p.expect_keyword("in")?;
                    let sequence = p.expression()?;
                    let sequence = p.require(sequence, "expected an expression")?;
                    p.expect_keyword("do")?;
                    let procedure = p.body()?;
                    Ok(Some(MainClause::With {
                        item,
                        sequence,
                        procedure,
                    }))
                });
            }
            if p.take_keyword("continue")? {
                return p.rule("continue", |p| {
                    p.expect_keyword("loop")?;
                    Ok(Some(MainClause::Continue))
                });
            }
            if p.take_keyword("break")? {
                return p.rule("break", |p| {
                    p.expect_keyword("loop")?;
                    Ok(Some(MainClause::Break))
                });
            }
            if p.take_keyword("return")? {
                return p.rule("return", |p| {
                    let result = p.expression()?;
                    let result = p.require(result, "expected an expression")?;
                    Ok(Some(MainClause::Return(result)))
                });
            }
            if p.take_keyword("throw")? {
                return p.rule("throw", |p| {
                    let exception = p.expression()?;
                    let exception = p.require(exception, "expected an expression")?;
                    Ok(Some(MainClause::Throw(exception)))
                });
            }
            p.evaluate()
        })
    }

    /// Parse an expression, assigned to a recipient when one leads.
    fn evaluate(&mut self) -> ParseResult<Option<MainClause>> {
        self.rule("evaluate", |p| {
            let mark = p.mark();
            if let Some(recipient) = p.recipient()? {
                if let Some(operator) = p.assignment()? {
                    let expression = p.expression()?;
                    let expression = p.require(expression, "expected an expression")?;
                    return Ok(Some(MainClause::Evaluate {
                        assignment: Some((recipient, operator)),
                        expression,
                    }));
                }
            }
            p.reset(mark);
            Ok(p.expression()?.map(|expression| MainClause::Evaluate {
                assignment: None,
                expression,
            }))
        })
    }

    /// Parse `name` or `name[indices]`, backing off if anything is missing.
    fn recipient(&mut self) -> ParseResult<Option<Recipient>> {
        let mark = self.mark();
        let Some(name) = self.take_identifier()? else {
            return Ok(None);
        };
        if !self.take_delimiter("[")? {
            return Ok(Some(Recipient::Variable(name)));
        }
        let indices = self.rule("recipient", |p| {
            let Some(indices) = p.indices()? else {
                return Ok(None);
            };
            Ok(p.take_delimiter("]")?.then_some(indices))
        })?;
        match indices {
            Some(indices) => Ok(Some(Recipient::Attribute { name, indices })),
            None => {
                self.reset(mark);
                Ok(None)
            }
        }
    }

    fn assignment(&mut self) -> ParseResult<Option<Assignment>> {
        let token = self.peek()?;
        if token.kind != TokenKind::Delimiter {
            return Ok(None);
        }
        let operator = Assignment::from_text(&token.text);
        if operator.is_some() {
            self.advance()?;
        }
        Ok(operator)
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// Parse an expression: a primary followed by any number of extensions.
    fn expression(&mut self) -> ParseResult<Option<Expression>> {
        self.rule("expression", |p| {
            let Some(mut expression) = p.primary()? else {
                return Ok(None);
            };
            loop {
                match p.extension(expression)? {
                    ControlFlow::Continue(extended) => expression = extended,
                    ControlFlow::Break(done) => return Ok(Some(done)),
                }
            }
        })
    }

    fn required_expression(&mut self) -> ParseResult<Expression> {
        let expression = self.expression()?;
        self.require(expression, "expected an expression")
    }

    /// Parse the leading part of an expression.
    fn primary(&mut self) -> ParseResult<Option<Expression>> {
        if let Some(component) = self.component()? {
            return Ok(Some(Expression::Component(Box::new(component))));
        }
        if let Some(function) = self.function()? {
            return Ok(Some(function));
        }
        if let Some(name) = self.take_identifier()? {
            return Ok(Some(Expression::Variable(name)));
        }
        if self.take_delimiter("(")? {
            return self.rule("precedence", |p| {
                let inner = p.required_expression()?;
                p.expect_delimiter(")")?;
                Ok(Some(Expression::Precedence(Box::new(inner))))
            });
        }
        if self.take_delimiter("@")? {
            return self.rule("dereference", |p| {
                let inner = p.required_expression()?;
                Ok(Some(Expression::Dereference(Box::new(inner))))
            });
        }
        if self.take_delimiter("|")? {
            return self.rule("magnitude", |p| {
                let inner = p.required_expression()?;
                p.expect_delimiter("|")?;
                Ok(Some(Expression::Magnitude(Box::new(inner))))
            });
        }
        for operator in [Inversion::Negative, Inversion::Conjugate] {
            if self.take_delimiter(operator.as_str())? {
                return self.rule("inversion", |p| {
                    let operand = Box::new(p.required_expression()?);
                    Ok(Some(Expression::Inversion { operator, operand }))
                });
            }
        }
        if self.take_keyword("not")? {
            return self.rule("complement", |p| {
                let inner = p.required_expression()?;
                Ok(Some(Expression::Complement(Box::new(inner))))
            });
        }
        Ok(None)
    }

    /// Parse `name(arguments)`. A bare name is left for the variable rule.
    fn function(&mut self) -> ParseResult<Option<Expression>> {
        let Some(name) = self.take_identifier()? else {
            return Ok(None);
        };
        if !self.take_delimiter("(")? {
            self.backup();
            return Ok(None);
        }
        self.rule("function", |p| {
            let arguments = p.arguments()?;
            Ok(Some(Expression::Function { name, arguments }))
        })
    }

    /// Parse arguments up to and including the closing `)`.
    fn arguments(&mut self) -> ParseResult<Vec<Expression>> {
        self.rule("arguments", |p| {
            let mut arguments = Vec::new();
            if p.take_delimiter(")")? {
                return Ok(arguments);
            }
            arguments.push(p.required_expression()?);
            while p.take_delimiter(",")? {
                arguments.push(p.required_expression()?);
            }
            p.expect_delimiter(")")?;
            Ok(arguments)
        })
    }

    /// Parse one or more comma-separated index expressions.
    fn indices(&mut self) -> ParseResult<Option<Vec<Expression>>> {
        self.rule("indices", |p| {
            let Some(first) = p.expression()? else {
                return Ok(None);
            };
            let mut indices = vec![first];
            while p.take_delimiter(",")? {
                indices.push(p.required_expression()?);
            }
            Ok(Some(indices))
        })
    }

    /// Try each extension in order against `base`.
    fn extension(&mut self, base: Expression) -> ParseResult<ControlFlow<Expression, Expression>> {
        for operator in [Invocation::Synchronous, Invocation::Asynchronous] {
            if self.take_delimiter(operator.as_str())? {
                return self.rule("invocation", |p| {
                    let message = p.expect_identifier()?;
                    p.expect_delimiter("(")?;
                    let arguments = p.arguments()?;
                    Ok(ControlFlow::Continue(Expression::Invocation {
                        target: Box::new(base),
                        operator,
                        message,
                        arguments,
                    }))
                });
            }
        }
        if self.take_delimiter("[")? {
            return self.rule("item", |p| {
                let indices = p.indices()?;
                let indices = p.require(indices, "expected an index")?;
                p.expect_delimiter("]")?;
                Ok(ControlFlow::Continue(Expression::Item {
                    composite: Box::new(base),
                    indices,
                }))
            });
        }
        let classes = [
            (OperatorClass::Chaining, "chaining"),
            (OperatorClass::Exponential, "exponential"),
            (OperatorClass::Arithmetic, "arithmetic"),
            (OperatorClass::Comparison, "comparison"),
            (OperatorClass::Logical, "logical"),
        ];
        let token = self.peek()?;
        if matches!(token.kind, TokenKind::Delimiter | TokenKind::Keyword) {
            let text = token.text.clone();
            for (class, rule) in classes {
                if let Some(operator) = Operator::lookup(class, &text) {
                    self.advance()?;
                    return self.rule(rule, |p| {
                        let second = p.required_expression()?;
                        Ok(ControlFlow::Continue(Expression::binary(
                            base, operator, second,
                        )))
                    });
                }
            }
        }
        Ok(ControlFlow::Break(base))
    }
}
