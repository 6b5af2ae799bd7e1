pub mod text;
pub mod tokens;

use std::ops::Range;

use tokens::{tokenize, Attr, Token};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

#[derive(Debug, Clone)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<Attr>,
    /// Start tag bytes.
    pub open: Range<usize>,
    /// End tag bytes; `None` for void elements and elements closed implicitly.
    pub close: Option<Range<usize>>,
    /// Bytes between the start tag and the end of the element's content.
    pub content: Range<usize>,
    /// Token indices strictly inside the element.
    pub inner: Range<usize>,
    pub parent: Option<usize>,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&Attr> {
        self.attrs.iter().find(|a| a.name == name)
    }

    pub fn attr_value(&self, name: &str) -> Option<&str> {
        self.attr(name).and_then(|a| a.value.as_deref())
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr_value("class").unwrap_or("").split_whitespace()
    }

    /// First class token, the element's discriminator.
    pub fn primary_class(&self) -> Option<&str> {
        self.classes().next()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    pub fn is_closed(&self) -> bool {
        self.close.is_some()
    }
}

/// A parsed HTML document. Elements are stored in document (pre-)order, so
/// an element's descendants directly follow it.
#[derive(Debug)]
pub struct Document<'a> {
    pub source: &'a str,
    pub tokens: Vec<Token>,
    pub elements: Vec<Element>,
}

impl<'a> Document<'a> {
    pub fn parse(source: &'a str) -> Self {
        let tokens = tokenize(source);
        let elements = build_tree(source, &tokens);
        Document {
            source,
            tokens,
            elements,
        }
    }

    pub fn comments(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.tokens.iter().filter_map(|t| match t {
            Token::Comment { body, span } => Some((span.start, &self.source[body.clone()])),
            _ => None,
        })
    }

    /// Indices of every element nested inside `idx`.
    pub fn descendants(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        let end = self.elements[idx].content.end;
        (idx + 1..self.elements.len()).take_while(move |&j| self.elements[j].open.start < end)
    }

    pub fn ancestors(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.elements[idx].parent, move |&p| self.elements[p].parent)
    }

    /// Visible text of an element: descendant text tokens only, with entities
    /// decoded and whitespace collapsed.
    pub fn inner_text(&self, idx: usize) -> String {
        let mut raw = String::new();
        for token in &self.tokens[self.elements[idx].inner.clone()] {
            if let Token::Text(r) = token {
                raw.push_str(&self.source[r.clone()]);
            }
        }
        text::clean(&raw)
    }

    /// The bytes an edit of the element's text may replace: the first text
    /// token inside the element that is not blank. With no nested markup that
    /// is the whole content; a label after a leading icon is found past the
    /// icon. Falls back to the whole content when there is no text at all.
    pub fn editable_run(&self, idx: usize) -> Range<usize> {
        let el = &self.elements[idx];
        self.tokens[el.inner.clone()]
            .iter()
            .find_map(|t| match t {
                Token::Text(r) if !self.source[r.clone()].trim().is_empty() => Some(r.clone()),
                _ => None,
            })
            .unwrap_or_else(|| el.content.clone())
    }
}

fn build_tree(source: &str, tokens: &[Token]) -> Vec<Element> {
    let mut elements: Vec<Element> = Vec::new();
    let mut stack: Vec<usize> = Vec::new();

    for (ti, token) in tokens.iter().enumerate() {
        match token {
            Token::StartTag { name, attrs, span, .. } => {
                let idx = elements.len();
                // `/>` only ends void elements; on `<div/>` it is ignored, as in HTML.
                let leaf = VOID_ELEMENTS.contains(&name.as_str());
                elements.push(Element {
                    name: name.clone(),
                    attrs: attrs.clone(),
                    open: span.clone(),
                    close: None,
                    content: span.end..span.end,
                    inner: ti + 1..ti + 1,
                    parent: stack.last().copied(),
                });
                if !leaf {
                    stack.push(idx);
                }
            }
            Token::EndTag { name, span } => {
                // Stray end tags (nothing open with that name) are ignored.
                let Some(pos) = stack.iter().rposition(|&e| elements[e].name == *name) else {
                    continue;
                };
                for &unclosed in &stack[pos + 1..] {
                    elements[unclosed].content.end = span.start;
                    elements[unclosed].inner.end = ti;
                }
                let e = stack[pos];
                elements[e].close = Some(span.clone());
                elements[e].content.end = span.start;
                elements[e].inner.end = ti;
                stack.truncate(pos);
            }
            _ => {}
        }
    }

    for &unclosed in &stack {
        elements[unclosed].content.end = source.len();
        elements[unclosed].inner.end = tokens.len();
    }

    elements
}
