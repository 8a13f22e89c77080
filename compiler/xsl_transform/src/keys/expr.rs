//! Match patterns and use expressions: parsing and evaluation.
//!
//! Grammar (whitespace between tokens is ignored):
//!
//! ```text
//! pattern   := path ('|' path)*
//! path      := step ('/' step)*
//! step      := name-test | 'text' '(' ')' | 'node' '(' ')'
//! use       := use-step ('/' use-step)*
//! use-step  := step | '@' name-test | '.' | '..'
//! name-test := '*' | NAME | NAME ':' NAME | NAME ':' '*'
//! ```
//!
//! Prefixes are resolved while parsing, so a compiled pattern holds URIs
//! only and is independent of the declaring node.

use rustc_hash::FxHashSet;
use xsl_ir::{Document, NodeId, NodeKind, NsRef};

use super::lexer::{tokenize, Lexeme, Token};
use super::{PrefixResolver, SyntaxError};

/// Test on a node's expanded name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NameTest {
    /// `*`
    Any,
    /// `prefix:*`, holding the resolved URI.
    Namespace(String),
    /// `name` or `prefix:name`.
    Qualified { uri: Option<String>, local: String },
}

impl NameTest {
    fn matches(&self, local: &str, uri: Option<&str>) -> bool {
        match self {
            NameTest::Any => true,
            NameTest::Namespace(ns) => uri == Some(ns.as_str()),
            NameTest::Qualified { uri: want, local: name } => {
                name == local && want.as_deref() == uri
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeTest {
    Name(NameTest),
    /// `text()`
    Text,
    /// `node()`
    AnyNode,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    Child,
    Attribute,
    SelfNode,
    Parent,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Step {
    pub axis: Axis,
    pub test: NodeTest,
}

/// Does `node` satisfy `test` on the child axis?
///
/// The document node is never matched; it is nobody's child.
fn node_matches(doc: &Document, node: NodeId, test: &NodeTest) -> bool {
    match (test, doc.kind(node)) {
        (_, NodeKind::Document) => false,
        (NodeTest::AnyNode, _) | (NodeTest::Text, NodeKind::Text(_)) => true,
        (NodeTest::Name(name), NodeKind::Element(element)) => {
            name.matches(&element.name, ns_uri(doc, element.ns))
        }
        _ => false,
    }
}

fn ns_uri(doc: &Document, ns: Option<NsRef>) -> Option<&str> {
    ns.map(|r| doc.binding(r).uri.as_str())
}

/// A compiled match pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchPattern {
    alternatives: Vec<Vec<Step>>,
}

impl MatchPattern {
    pub fn parse(source: &str, scope: &dyn PrefixResolver) -> Result<Self, SyntaxError> {
        let lexemes = tokenize(source)?;
        let mut parser = Parser::new(&lexemes, scope);
        let mut alternatives = vec![parser.path(false)?];
        while parser.eat(Token::Pipe) {
            alternatives.push(parser.path(false)?);
        }
        parser.finish()?;
        Ok(MatchPattern { alternatives })
    }

    /// Does `node` match any alternative?
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.alternatives
            .iter()
            .any(|steps| path_matches(doc, node, steps))
    }
}

/// The last step tests `node`, each earlier step tests the next ancestor.
fn path_matches(doc: &Document, node: NodeId, steps: &[Step]) -> bool {
    let Some((last, rest)) = steps.split_last() else {
        return false;
    };
    if !node_matches(doc, node, &last.test) {
        return false;
    }
    let mut current = node;
    for step in rest.iter().rev() {
        match doc.parent(current) {
            Some(parent) if node_matches(doc, parent, &step.test) => current = parent,
            _ => return false,
        }
    }
    true
}

/// A compiled use expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UseExpr {
    steps: Vec<Step>,
}

/// An item selected while evaluating a use expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Item {
    Node(NodeId),
    /// Attribute `index` of the element.
    Attribute(NodeId, usize),
}

impl UseExpr {
    pub fn parse(source: &str, scope: &dyn PrefixResolver) -> Result<Self, SyntaxError> {
        let lexemes = tokenize(source)?;
        let mut parser = Parser::new(&lexemes, scope);
        let steps = parser.path(true)?;
        parser.finish()?;
        Ok(UseExpr { steps })
    }

    /// String values of the items selected from `node`, first selection first.
    pub fn evaluate(&self, doc: &Document, node: NodeId) -> Vec<String> {
        let mut current = vec![Item::Node(node)];
        for step in &self.steps {
            let mut seen = FxHashSet::default();
            let mut next = Vec::new();
            for &item in &current {
                for selected in select(doc, item, step) {
                    if seen.insert(selected) {
                        next.push(selected);
                    }
                }
            }
            current = next;
        }
        current
            .into_iter()
            .map(|item| match item {
                Item::Node(id) => doc.string_value(id),
                Item::Attribute(owner, index) => doc.attributes(owner)[index].value.clone(),
            })
            .collect()
    }
}

fn select(doc: &Document, item: Item, step: &Step) -> Vec<Item> {
    match (step.axis, item) {
        (Axis::SelfNode, _) => vec![item],
        (Axis::Parent, Item::Node(id)) => doc.parent(id).map(Item::Node).into_iter().collect(),
        (Axis::Parent, Item::Attribute(owner, _)) => vec![Item::Node(owner)],
        (Axis::Child, Item::Node(id)) => doc
            .children(id)
            .iter()
            .filter(|&&child| node_matches(doc, child, &step.test))
            .map(|&child| Item::Node(child))
            .collect(),
        (Axis::Attribute, Item::Node(id)) => {
            let NodeTest::Name(test) = &step.test else {
                return Vec::new();
            };
            doc.attributes(id)
                .iter()
                .enumerate()
                .filter(|(_, attr)| test.matches(&attr.name, ns_uri(doc, attr.ns)))
                .map(|(index, _)| Item::Attribute(id, index))
                .collect()
        }
        (Axis::Child | Axis::Attribute, Item::Attribute(..)) => Vec::new(),
    }
}

struct Parser<'p, 'src> {
    lexemes: &'p [Lexeme<'src>],
    pos: usize,
    scope: &'p dyn PrefixResolver,
}

impl<'p, 'src> Parser<'p, 'src> {
    fn new(lexemes: &'p [Lexeme<'src>], scope: &'p dyn PrefixResolver) -> Self {
        Parser {
            lexemes,
            pos: 0,
            scope,
        }
    }

    fn peek(&self) -> Option<Lexeme<'src>> {
        self.lexemes.get(self.pos).copied()
    }

    fn peek_token(&self) -> Option<Token> {
        self.peek().map(|l| l.token)
    }

    fn eat(&mut self, token: Token) -> bool {
        if self.peek_token() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token, expected: &'static str) -> Result<Lexeme<'src>, SyntaxError> {
        match self.peek() {
            Some(lexeme) if lexeme.token == token => {
                self.pos += 1;
                Ok(lexeme)
            }
            other => Err(Self::unexpected(other, expected)),
        }
    }

    fn unexpected(found: Option<Lexeme<'_>>, expected: &'static str) -> SyntaxError {
        match found {
            Some(lexeme) => SyntaxError::Unexpected {
                found: lexeme.token.describe(),
                offset: lexeme.offset,
                expected,
            },
            None => SyntaxError::UnexpectedEnd { expected },
        }
    }

    fn finish(&self) -> Result<(), SyntaxError> {
        match self.peek() {
            None => Ok(()),
            other => Err(Self::unexpected(other, "end of expression")),
        }
    }

    fn path(&mut self, is_use: bool) -> Result<Vec<Step>, SyntaxError> {
        let mut steps = vec![self.step(is_use)?];
        while self.eat(Token::Slash) {
            steps.push(self.step(is_use)?);
        }
        Ok(steps)
    }

    fn step(&mut self, is_use: bool) -> Result<Step, SyntaxError> {
        let expected = if is_use { "a step" } else { "a pattern step" };
        let Some(lexeme) = self.peek() else {
            return Err(SyntaxError::UnexpectedEnd { expected });
        };
        match lexeme.token {
            Token::Dot | Token::DotDot | Token::At if !is_use => Err(SyntaxError::NotInPattern {
                found: lexeme.token.describe(),
                offset: lexeme.offset,
            }),
            Token::Dot => {
                self.pos += 1;
                Ok(Step {
                    axis: Axis::SelfNode,
                    test: NodeTest::AnyNode,
                })
            }
            Token::DotDot => {
                self.pos += 1;
                Ok(Step {
                    axis: Axis::Parent,
                    test: NodeTest::AnyNode,
                })
            }
            Token::At => {
                self.pos += 1;
                Ok(Step {
                    axis: Axis::Attribute,
                    test: NodeTest::Name(self.name_test()?),
                })
            }
            Token::Name if self.lexemes.get(self.pos + 1).map(|l| l.token) == Some(Token::LParen) => {
                let test = match lexeme.text {
                    "text" => NodeTest::Text,
                    "node" => NodeTest::AnyNode,
                    other => {
                        return Err(SyntaxError::UnknownNodeTest {
                            name: other.to_owned(),
                            offset: lexeme.offset,
                        })
                    }
                };
                self.pos += 2;
                self.expect(Token::RParen, "`)`")?;
                Ok(Step {
                    axis: Axis::Child,
                    test,
                })
            }
            Token::Name | Token::Star => Ok(Step {
                axis: Axis::Child,
                test: NodeTest::Name(self.name_test()?),
            }),
            _ => Err(Self::unexpected(Some(lexeme), expected)),
        }
    }

    fn name_test(&mut self) -> Result<NameTest, SyntaxError> {
        if self.eat(Token::Star) {
            return Ok(NameTest::Any);
        }
        let first = self.expect(Token::Name, "a name or `*`")?;
        if !self.eat(Token::Colon) {
            return Ok(NameTest::Qualified {
                uri: None,
                local: first.text.to_owned(),
            });
        }
        let uri = self
            .scope
            .resolve_prefix(first.text)
            .ok_or_else(|| SyntaxError::UnboundPrefix {
                prefix: first.text.to_owned(),
                offset: first.offset,
            })?;
        if self.eat(Token::Star) {
            return Ok(NameTest::Namespace(uri));
        }
        let local = self.expect(Token::Name, "a local name or `*`")?;
        Ok(NameTest::Qualified {
            uri: Some(uri),
            local: local.text.to_owned(),
        })
    }
}
