//! Selector Matching
//!
//! The general-query engine behind `query_selector_all`: selector groups,
//! compound simple selectors, attribute matchers, and the descendant,
//! child, and sibling combinators. Results are always static snapshots.

use thiserror::Error;

use crate::node::ElementData;
use crate::{Document, NodeId};

/// Selector parse failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unexpected character `{0}` at offset {1}")]
    UnexpectedChar(char, usize),
    #[error("unsupported selector feature: {0}")]
    Unsupported(&'static str),
}

/// A parsed selector group (comma-separated complex selectors)
#[derive(Debug, Clone)]
pub struct SelectorList {
    selectors: Vec<ComplexSelector>,
}

/// One complex selector, stored right-to-left: the key compound first,
/// then each (combinator, compound) step toward the left end.
#[derive(Debug, Clone)]
struct ComplexSelector {
    key: Compound,
    rest: Vec<(Combinator, Compound)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
    NextSibling,
    SubsequentSibling,
}

#[derive(Debug, Clone)]
struct Compound {
    parts: Vec<SimplePart>,
}

#[derive(Debug, Clone)]
enum SimplePart {
    Universal,
    Tag(String),
    Id(String),
    Class(String),
    Attr(AttrSelector),
}

#[derive(Debug, Clone)]
struct AttrSelector {
    name: String,
    matcher: Option<AttrMatcher>,
}

#[derive(Debug, Clone)]
enum AttrMatcher {
    /// [attr=value] - exact match
    Exact(String),
    /// [attr~=value] - whitespace-separated list contains
    Includes(String),
    /// [attr|=value] - exact or hyphen-prefixed
    DashMatch(String),
    /// [attr^=value] - starts with
    Prefix(String),
    /// [attr$=value] - ends with
    Suffix(String),
    /// [attr*=value] - contains substring
    Substring(String),
}

impl AttrSelector {
    fn matches(&self, value: Option<&str>) -> bool {
        let Some(value) = value else { return false };
        match &self.matcher {
            None => true,
            Some(AttrMatcher::Exact(expected)) => value == expected,
            Some(AttrMatcher::Includes(expected)) => {
                !expected.is_empty() && value.split_whitespace().any(|word| word == expected)
            }
            Some(AttrMatcher::DashMatch(expected)) => {
                value == expected
                    || (value.len() > expected.len()
                        && value.starts_with(expected.as_str())
                        && value.as_bytes()[expected.len()] == b'-')
            }
            Some(AttrMatcher::Prefix(expected)) => {
                !expected.is_empty() && value.starts_with(expected.as_str())
            }
            Some(AttrMatcher::Suffix(expected)) => {
                !expected.is_empty() && value.ends_with(expected.as_str())
            }
            Some(AttrMatcher::Substring(expected)) => {
                !expected.is_empty() && value.contains(expected.as_str())
            }
        }
    }
}

impl SimplePart {
    fn matches(&self, elem: &ElementData) -> bool {
        match self {
            Self::Universal => true,
            Self::Tag(tag) => elem.tag() == tag,
            Self::Id(id) => elem.id() == Some(id.as_str()),
            Self::Class(class) => elem.has_class(class),
            Self::Attr(attr) => attr.matches(elem.attribute(&attr.name).as_deref()),
        }
    }
}

impl Compound {
    fn matches(&self, elem: &ElementData) -> bool {
        self.parts.iter().all(|part| part.matches(elem))
    }
}

impl SelectorList {
    /// Parse a selector group
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        Parser::new(input).parse_list()
    }

    /// Whether the element matches any selector in the group
    pub fn matches(&self, doc: &Document, id: NodeId) -> bool {
        self.selectors
            .iter()
            .any(|complex| matches_complex(doc, id, complex))
    }
}

fn matches_complex(doc: &Document, id: NodeId, complex: &ComplexSelector) -> bool {
    match doc.element(id) {
        Some(elem) if complex.key.matches(elem) => matches_rest(doc, id, &complex.rest, 0),
        _ => false,
    }
}

fn matches_rest(doc: &Document, id: NodeId, rest: &[(Combinator, Compound)], step: usize) -> bool {
    let Some((combinator, compound)) = rest.get(step) else {
        return true;
    };
    match combinator {
        Combinator::Child => doc
            .parent_element(id)
            .is_some_and(|parent| {
                doc.element(parent).is_some_and(|e| compound.matches(e))
                    && matches_rest(doc, parent, rest, step + 1)
            }),
        Combinator::Descendant => {
            let mut cursor = doc.parent_element(id);
            while let Some(ancestor) = cursor {
                if doc.element(ancestor).is_some_and(|e| compound.matches(e))
                    && matches_rest(doc, ancestor, rest, step + 1)
                {
                    return true;
                }
                cursor = doc.parent_element(ancestor);
            }
            false
        }
        Combinator::NextSibling => prev_sibling_element(doc, id).is_some_and(|prev| {
            doc.element(prev).is_some_and(|e| compound.matches(e))
                && matches_rest(doc, prev, rest, step + 1)
        }),
        Combinator::SubsequentSibling => {
            let mut cursor = prev_sibling_element(doc, id);
            while let Some(prev) = cursor {
                if doc.element(prev).is_some_and(|e| compound.matches(e))
                    && matches_rest(doc, prev, rest, step + 1)
                {
                    return true;
                }
                cursor = prev_sibling_element(doc, prev);
            }
            false
        }
    }
}

fn prev_sibling_element(doc: &Document, id: NodeId) -> Option<NodeId> {
    let mut cursor = doc.get(id)?.prev_sibling;
    while cursor.is_some() {
        let node = doc.get(cursor)?;
        if node.is_element() {
            return Some(cursor);
        }
        cursor = node.prev_sibling;
    }
    None
}

/// Run a parsed-on-the-fly selector over the descendants of `root`
pub(crate) fn query_selector_all(
    doc: &Document,
    root: NodeId,
    selector: &str,
) -> Result<Vec<NodeId>, SelectorError> {
    let list = SelectorList::parse(selector)?;
    Ok(doc
        .descendant_elements(root)
        .into_iter()
        .filter(|&id| list.matches(doc, id))
        .collect())
}

// Byte classification tables in the manner of the HTML tag scanner.
fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r' | 0x0C)) {
            self.pos += 1;
        }
        self.pos != start
    }

    fn unexpected(&self) -> SelectorError {
        match self.peek() {
            Some(b) => SelectorError::UnexpectedChar(b as char, self.pos),
            None => SelectorError::Empty,
        }
    }

    fn parse_ident(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_byte) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.unexpected());
        }
        // the ident byte set is pure ASCII, so this cannot split a char
        Ok(String::from_utf8_lossy(&self.input[start..self.pos]).into_owned())
    }

    fn parse_string(&mut self, quote: u8) -> Result<String, SelectorError> {
        self.bump();
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b == quote {
                let value = String::from_utf8_lossy(&self.input[start..self.pos]).into_owned();
                self.bump();
                return Ok(value);
            }
            self.pos += 1;
        }
        Err(SelectorError::UnexpectedChar(quote as char, self.pos))
    }

    fn parse_attr(&mut self) -> Result<AttrSelector, SelectorError> {
        self.bump(); // consume '['
        self.skip_whitespace();
        let name = self.parse_ident()?;
        self.skip_whitespace();

        let matcher = match self.peek() {
            Some(b']') => None,
            Some(op @ (b'~' | b'|' | b'^' | b'$' | b'*')) => {
                self.bump();
                if self.peek() != Some(b'=') {
                    return Err(self.unexpected());
                }
                self.bump();
                let value = self.parse_attr_value()?;
                Some(match op {
                    b'~' => AttrMatcher::Includes(value),
                    b'|' => AttrMatcher::DashMatch(value),
                    b'^' => AttrMatcher::Prefix(value),
                    b'$' => AttrMatcher::Suffix(value),
                    _ => AttrMatcher::Substring(value),
                })
            }
            Some(b'=') => {
                self.bump();
                Some(AttrMatcher::Exact(self.parse_attr_value()?))
            }
            _ => return Err(self.unexpected()),
        };

        self.skip_whitespace();
        if self.peek() != Some(b']') {
            return Err(self.unexpected());
        }
        self.bump();
        Ok(AttrSelector { name, matcher })
    }

    fn parse_attr_value(&mut self) -> Result<String, SelectorError> {
        self.skip_whitespace();
        let value = match self.peek() {
            Some(quote @ (b'"' | b'\'')) => self.parse_string(quote)?,
            _ => self.parse_ident()?,
        };
        self.skip_whitespace();
        Ok(value)
    }

    fn parse_compound(&mut self) -> Result<Compound, SelectorError> {
        let mut parts = Vec::new();
        loop {
            match self.peek() {
                Some(b'*') => {
                    self.bump();
                    parts.push(SimplePart::Universal);
                }
                Some(b'#') => {
                    self.bump();
                    parts.push(SimplePart::Id(self.parse_ident()?));
                }
                Some(b'.') => {
                    self.bump();
                    parts.push(SimplePart::Class(self.parse_ident()?));
                }
                Some(b'[') => parts.push(SimplePart::Attr(self.parse_attr()?)),
                Some(b':') => return Err(SelectorError::Unsupported("pseudo-classes")),
                Some(b) if is_ident_byte(b) => {
                    if parts.is_empty() {
                        parts.push(SimplePart::Tag(self.parse_ident()?.to_ascii_lowercase()));
                    } else {
                        // a tag may only lead a compound
                        return Err(self.unexpected());
                    }
                }
                _ => break,
            }
        }
        if parts.is_empty() {
            return Err(self.unexpected());
        }
        Ok(Compound { parts })
    }

    fn parse_complex(&mut self) -> Result<ComplexSelector, SelectorError> {
        // parsed left-to-right, stored right-to-left
        let mut compounds = vec![self.parse_compound()?];
        let mut combinators = Vec::new();

        loop {
            let had_space = self.skip_whitespace();
            let combinator = match self.peek() {
                Some(b'>') => {
                    self.bump();
                    self.skip_whitespace();
                    Combinator::Child
                }
                Some(b'+') => {
                    self.bump();
                    self.skip_whitespace();
                    Combinator::NextSibling
                }
                Some(b'~') => {
                    self.bump();
                    self.skip_whitespace();
                    Combinator::SubsequentSibling
                }
                Some(b',') | None => break,
                Some(_) if had_space => Combinator::Descendant,
                Some(_) => return Err(self.unexpected()),
            };
            compounds.push(self.parse_compound()?);
            combinators.push(combinator);
        }

        let key = compounds.pop().ok_or(SelectorError::Empty)?;
        let rest = combinators
            .into_iter()
            .rev()
            .zip(compounds.into_iter().rev())
            .collect();
        Ok(ComplexSelector { key, rest })
    }

    fn parse_list(&mut self) -> Result<SelectorList, SelectorError> {
        self.skip_whitespace();
        if self.peek().is_none() {
            return Err(SelectorError::Empty);
        }

        let mut selectors = vec![self.parse_complex()?];
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b',') => {
                    self.bump();
                    self.skip_whitespace();
                    selectors.push(self.parse_complex()?);
                }
                None => break,
                Some(_) => return Err(self.unexpected()),
            }
        }
        Ok(SelectorList { selectors })
    }
}
