//! CSS selector subset
//!
//! Supports what site adapters need to find composer elements:
//! type, `#id`, `.class`, `[attr]`, `[attr="v"]`, `[attr*="v"]`,
//! `[attr^="v"]`, `[attr$="v"]`, compound selectors, the descendant and
//! child (`>`) combinators, and comma-separated selector groups.
//!
//! Pseudo-classes and sibling combinators are rejected at parse time.

use crate::error::{DomError, Result};
use crate::node::{ElementData, NodeId, NodeKind};
use crate::tree::Tree;

/// Parsed selector group (`a, b, c`)
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList {
    selectors: Vec<ComplexSelector>,
}

#[derive(Debug, Clone, PartialEq)]
struct ComplexSelector {
    /// Rightmost compound last; each entry carries the combinator linking it to the previous one
    parts: Vec<(Combinator, Compound)>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttributeSelector>,
}

#[derive(Debug, Clone, PartialEq)]
struct AttributeSelector {
    name: String,
    test: Option<(AttributeOp, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum AttributeOp {
    Equals,
    Contains,
    Prefix,
    Suffix,
}

impl SelectorList {
    /// Parse a selector string
    pub fn parse(input: &str) -> Result<Self> {
        let mut selectors = Vec::new();
        for group in split_groups(input) {
            let group = group.trim();
            if group.is_empty() {
                return Err(invalid(input, "empty selector in group"));
            }
            selectors.push(parse_complex(input, group)?);
        }
        if selectors.is_empty() {
            return Err(invalid(input, "empty selector"));
        }
        Ok(Self { selectors })
    }

    /// Whether `node` matches any selector in the group
    pub(crate) fn matches(&self, tree: &Tree, node: NodeId) -> bool {
        self.selectors.iter().any(|s| s.matches(tree, node))
    }
}

impl ComplexSelector {
    fn matches(&self, tree: &Tree, node: NodeId) -> bool {
        match_from(tree, &self.parts, self.parts.len(), node)
    }
}

/// Match `parts[..end]` with the last part anchored at `node`
fn match_from(tree: &Tree, parts: &[(Combinator, Compound)], end: usize, node: NodeId) -> bool {
    let Some(el) = element(tree, node) else {
        return false;
    };
    let (combinator, compound) = &parts[end - 1];
    if !compound.matches(el) {
        return false;
    }
    if end == 1 {
        return true;
    }
    match combinator {
        Combinator::Child => tree
            .parent_of(node)
            .is_some_and(|parent| match_from(tree, parts, end - 1, parent)),
        Combinator::Descendant => {
            let mut current = tree.parent_of(node);
            while let Some(ancestor) = current {
                if match_from(tree, parts, end - 1, ancestor) {
                    return true;
                }
                current = tree.parent_of(ancestor);
            }
            false
        }
    }
}

fn element(tree: &Tree, node: NodeId) -> Option<&ElementData> {
    match tree.get(node).map(|n| &n.kind) {
        Some(NodeKind::Element(el)) => Some(el),
        _ => None,
    }
}

impl Compound {
    fn matches(&self, el: &ElementData) -> bool {
        if let Some(tag) = &self.tag {
            if tag != "*" && *tag != el.tag {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if el.id() != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|class| el.has_class(class)) {
            return false;
        }
        self.attributes.iter().all(|attr| attr.matches(el))
    }

    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.id.is_none() && self.classes.is_empty() && self.attributes.is_empty()
    }
}

impl AttributeSelector {
    fn matches(&self, el: &ElementData) -> bool {
        let Some(actual) = el.attribute(&self.name) else {
            return false;
        };
        match &self.test {
            None => true,
            Some((AttributeOp::Equals, expected)) => actual == expected,
            Some((AttributeOp::Contains, expected)) => actual.contains(expected.as_str()),
            Some((AttributeOp::Prefix, expected)) => actual.starts_with(expected.as_str()),
            Some((AttributeOp::Suffix, expected)) => actual.ends_with(expected.as_str()),
        }
    }
}

fn invalid(selector: &str, reason: &str) -> DomError {
    DomError::InvalidSelector {
        selector: selector.to_string(),
        reason: reason.to_string(),
    }
}

/// Split on commas that are not inside brackets or quotes
fn split_groups(input: &str) -> Vec<&str> {
    let mut groups = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                groups.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    groups.push(&input[start..]);
    groups
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn parse_complex(full: &str, group: &str) -> Result<ComplexSelector> {
    let chars: Vec<char> = group.chars().collect();
    let mut pos = 0;
    let mut parts = Vec::new();
    let mut pending = Combinator::Descendant;

    while pos < chars.len() {
        let mut saw_space = false;
        while pos < chars.len() && chars[pos].is_whitespace() {
            pos += 1;
            saw_space = true;
        }
        if pos >= chars.len() {
            break;
        }
        if chars[pos] == '>' {
            if parts.is_empty() {
                return Err(invalid(full, "selector starts with a combinator"));
            }
            pending = Combinator::Child;
            pos += 1;
            continue;
        }
        if matches!(chars[pos], '+' | '~') {
            return Err(invalid(full, "sibling combinators are not supported"));
        }
        if saw_space && pending != Combinator::Child {
            pending = Combinator::Descendant;
        }

        let compound = parse_compound(full, &chars, &mut pos)?;
        if compound.is_empty() {
            return Err(invalid(full, "expected a simple selector"));
        }
        parts.push((pending, compound));
        pending = Combinator::Descendant;
    }

    if parts.is_empty() {
        return Err(invalid(full, "empty selector"));
    }
    if pending == Combinator::Child {
        return Err(invalid(full, "dangling combinator"));
    }
    Ok(ComplexSelector { parts })
}

fn parse_ident(chars: &[char], pos: &mut usize) -> String {
    let start = *pos;
    while *pos < chars.len() && is_ident_char(chars[*pos]) {
        *pos += 1;
    }
    chars[start..*pos].iter().collect()
}

fn parse_compound(full: &str, chars: &[char], pos: &mut usize) -> Result<Compound> {
    let mut compound = Compound::default();

    if *pos < chars.len() && chars[*pos] == '*' {
        compound.tag = Some("*".to_string());
        *pos += 1;
    } else if *pos < chars.len() && is_ident_char(chars[*pos]) {
        compound.tag = Some(parse_ident(chars, pos).to_ascii_lowercase());
    }

    while *pos < chars.len() {
        match chars[*pos] {
            '#' => {
                *pos += 1;
                let id = parse_ident(chars, pos);
                if id.is_empty() {
                    return Err(invalid(full, "empty id selector"));
                }
                compound.id = Some(id);
            }
            '.' => {
                *pos += 1;
                let class = parse_ident(chars, pos);
                if class.is_empty() {
                    return Err(invalid(full, "empty class selector"));
                }
                compound.classes.push(class);
            }
            '[' => {
                *pos += 1;
                compound.attributes.push(parse_attribute(full, chars, pos)?);
            }
            ':' => return Err(invalid(full, "pseudo-classes are not supported")),
            c if c.is_whitespace() || c == '>' || c == '+' || c == '~' => break,
            c => return Err(invalid(full, &format!("unexpected character '{}'", c))),
        }
    }
    Ok(compound)
}

fn parse_attribute(full: &str, chars: &[char], pos: &mut usize) -> Result<AttributeSelector> {
    let skip_ws = |pos: &mut usize| {
        while *pos < chars.len() && chars[*pos].is_whitespace() {
            *pos += 1;
        }
    };

    skip_ws(pos);
    let name = parse_ident(chars, pos).to_ascii_lowercase();
    if name.is_empty() {
        return Err(invalid(full, "empty attribute name"));
    }
    skip_ws(pos);

    let op = match chars.get(*pos) {
        Some(']') => {
            *pos += 1;
            return Ok(AttributeSelector { name, test: None });
        }
        Some('=') => {
            *pos += 1;
            AttributeOp::Equals
        }
        Some(c @ ('*' | '^' | '$')) if chars.get(*pos + 1) == Some(&'=') => {
            let op = match c {
                '*' => AttributeOp::Contains,
                '^' => AttributeOp::Prefix,
                _ => AttributeOp::Suffix,
            };
            *pos += 2;
            op
        }
        _ => return Err(invalid(full, "bad attribute operator")),
    };
    skip_ws(pos);

    let value = match chars.get(*pos) {
        Some(q @ ('"' | '\'')) => {
            let q = *q;
            *pos += 1;
            let start = *pos;
            while *pos < chars.len() && chars[*pos] != q {
                *pos += 1;
            }
            if *pos >= chars.len() {
                return Err(invalid(full, "unterminated string"));
            }
            let value: String = chars[start..*pos].iter().collect();
            *pos += 1;
            value
        }
        _ => parse_ident(chars, pos),
    };
    skip_ws(pos);

    if chars.get(*pos) != Some(&']') {
        return Err(invalid(full, "expected ']'"));
    }
    *pos += 1;
    Ok(AttributeSelector {
        name,
        test: Some((op, value)),
    })
}
