//! CSS selector subset for the simulated backend.
//!
//! Supported: type (`div`, `*`), `#id`, `.class`, `[attr]`, `[attr=value]`,
//! `:nth-child(n)` with a plain position, `:checked`, descendant and child
//! (`>`) combinators, and comma-separated lists.
//! Anything else is rejected with a driver error instead of silently
//! matching the wrong elements.

use super::dom::{NodeId, SimDocument};
use crate::result::{ProbeError, ProbeResult};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, Option<String>)>,
    nth_child: Option<usize>,
    checked: bool,
}

impl Compound {
    fn matches(&self, doc: &SimDocument, node: NodeId) -> bool {
        let Some(element) = doc.element(node) else {
            return false;
        };
        if self.tag.as_deref().is_some_and(|tag| tag != element.tag()) {
            return false;
        }
        if self.id.as_deref().is_some_and(|id| element.attribute("id") != Some(id)) {
            return false;
        }
        if !self.classes.iter().all(|c| element.has_class(c)) {
            return false;
        }
        if self.checked && !doc.is_checked(node) {
            return false;
        }
        if self
            .nth_child
            .is_some_and(|position| doc.index_in_parent(node).map(|i| i + 1) != Some(position))
        {
            return false;
        }
        self.attrs.iter().all(|(name, value)| {
            let actual = match name.as_str() {
                "value" => Some(doc.value(node)),
                _ => element.attribute(name).map(str::to_string),
            };
            match (value, actual) {
                (None, actual) => actual.is_some(),
                (Some(expected), Some(actual)) => *expected == actual,
                (Some(_), None) => false,
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    parts: Vec<(Combinator, Compound)>,
}

impl Complex {
    fn matches_at(&self, doc: &SimDocument, node: NodeId, index: usize) -> bool {
        let Some((combinator, compound)) = self.parts.get(index) else {
            return false;
        };
        if !compound.matches(doc, node) {
            return false;
        }
        if index == 0 {
            return true;
        }
        match combinator {
            Combinator::Child => doc
                .parent_in_document(node)
                .is_some_and(|parent| self.matches_at(doc, parent, index - 1)),
            Combinator::Descendant => {
                let mut current = doc.parent_in_document(node);
                while let Some(ancestor) = current {
                    if self.matches_at(doc, ancestor, index - 1) {
                        return true;
                    }
                    current = doc.parent_in_document(ancestor);
                }
                false
            }
        }
    }
}

/// Parsed selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssSelector {
    alternatives: Vec<Complex>,
}

impl CssSelector {
    /// Parse a selector list
    pub fn parse(source: &str) -> ProbeResult<Self> {
        let alternatives = source
            .split(',')
            .map(|part| parse_complex(part.trim()))
            .collect::<Result<Vec<_>, String>>()
            .map_err(|reason| ProbeError::driver(format!("invalid selector {source:?}: {reason}")))?;
        Ok(Self { alternatives })
    }

    /// Whether `node` matches any alternative
    #[must_use]
    pub fn matches(&self, doc: &SimDocument, node: NodeId) -> bool {
        self.alternatives
            .iter()
            .any(|complex| complex.matches_at(doc, node, complex.parts.len().saturating_sub(1)))
    }
}

fn parse_complex(source: &str) -> Result<Complex, String> {
    let chars: Vec<char> = source.chars().collect();
    let mut parts = Vec::new();
    let mut pending = Combinator::Descendant;
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            c if c.is_whitespace() => i += 1,
            '>' => {
                if parts.is_empty() {
                    return Err("leading combinator".to_string());
                }
                pending = Combinator::Child;
                i += 1;
            }
            _ => {
                let (compound, next) = parse_compound(&chars, i)?;
                parts.push((pending, compound));
                pending = Combinator::Descendant;
                i = next;
            }
        }
    }
    if parts.is_empty() {
        return Err("empty selector".to_string());
    }
    if pending == Combinator::Child {
        return Err("trailing combinator".to_string());
    }
    Ok(Complex { parts })
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn ident(chars: &[char], start: usize) -> (String, usize) {
    let end = chars[start..]
        .iter()
        .position(|c| !is_ident_char(*c))
        .map_or(chars.len(), |offset| start + offset);
    (chars[start..end].iter().collect(), end)
}

fn parse_compound(chars: &[char], start: usize) -> Result<(Compound, usize), String> {
    let mut compound = Compound::default();
    let mut i = start;
    while i < chars.len() {
        match chars[i] {
            '#' | '.' => {
                let (name, next) = ident(chars, i + 1);
                if name.is_empty() {
                    return Err(format!("empty name after {:?}", chars[i]));
                }
                if chars[i] == '#' {
                    compound.id = Some(name);
                } else {
                    compound.classes.push(name);
                }
                i = next;
            }
            '[' => {
                let close = chars[i..]
                    .iter()
                    .position(|c| *c == ']')
                    .ok_or_else(|| "unclosed attribute selector".to_string())?;
                let inner: String = chars[i + 1..i + close].iter().collect();
                let attr = match inner.split_once('=') {
                    Some((name, value)) => (
                        name.trim().to_string(),
                        Some(value.trim().trim_matches(|c| c == '"' || c == '\'').to_string()),
                    ),
                    None => (inner.trim().to_string(), None),
                };
                if attr.0.is_empty() || !attr.0.chars().all(is_ident_char) {
                    return Err(format!("unsupported attribute selector [{inner}]"));
                }
                compound.attrs.push(attr);
                i += close + 1;
            }
            ':' => {
                let (name, next) = ident(chars, i + 1);
                match name.as_str() {
                    "checked" => {
                        compound.checked = true;
                        i = next;
                    }
                    "nth-child" => {
                        if chars.get(next) != Some(&'(') {
                            return Err("expected ( after :nth-child".to_string());
                        }
                        let close = chars[next..]
                            .iter()
                            .position(|c| *c == ')')
                            .ok_or_else(|| "unclosed :nth-child".to_string())?
                            + next;
                        let argument: String = chars[next + 1..close].iter().collect();
                        let position = argument
                            .trim()
                            .parse::<usize>()
                            .ok()
                            .filter(|p| *p > 0)
                            .ok_or_else(|| format!("unsupported :nth-child({argument})"))?;
                        compound.nth_child = Some(position);
                        i = close + 1;
                    }
                    other => return Err(format!("unsupported pseudo-class :{other}")),
                }
            }
            '*' if i == start => i += 1,
            c if is_ident_char(c) && i == start => {
                let (tag, next) = ident(chars, i);
                compound.tag = Some(tag.to_ascii_lowercase());
                i = next;
            }
            c if c.is_whitespace() || c == '>' => break,
            other => return Err(format!("unsupported syntax at {other:?}")),
        }
    }
    Ok((compound, i))
}
