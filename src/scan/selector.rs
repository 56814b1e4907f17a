use std::fmt;

use super::identifier::Identifier;
use crate::frontend::ast::TypeExpr;

/// A dotted qualified name as a non-empty, head-first linked chain of
/// segments. Constructors append only, so chains are acyclic; equality and
/// hashing traverse the full chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selector {
    head: Identifier,
    rest: Option<Box<Selector>>,
}

impl Selector {
    /// Build from segments; `None` when the iterator is empty.
    pub fn of<I, S>(segments: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let collected: Vec<String> = segments.into_iter().map(Into::into).collect();
        let mut chain: Option<Selector> = None;
        for segment in collected.into_iter().rev() {
            chain = Some(Selector {
                head: Identifier::new(segment),
                rest: chain.map(Box::new),
            });
        }
        chain
    }

    #[must_use]
    pub fn single(segment: impl Into<String>) -> Self {
        Selector {
            head: Identifier::new(segment),
            rest: None,
        }
    }

    /// Build from a parsed type reference, which already carries its
    /// type-argument subtrees out of band; `None` for primitives.
    #[must_use]
    pub fn from_type(ty: &TypeExpr) -> Option<Self> {
        Self::of(ty.segments.iter().cloned())
    }

    #[must_use]
    pub fn head(&self) -> &Identifier {
        &self.head
    }

    #[must_use]
    pub fn tail(&self) -> Option<&Selector> {
        self.rest.as_deref()
    }

    #[must_use]
    pub fn last(&self) -> &Identifier {
        let mut node = self;
        while let Some(rest) = node.rest.as_deref() {
            node = rest;
        }
        &node.head
    }

    #[must_use]
    pub fn len(&self) -> usize {
        1 + self.rest.as_deref().map_or(0, Selector::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn segments(&self) -> impl Iterator<Item = &Identifier> {
        SegmentIter { node: Some(self) }
    }

    /// `self.other` concatenation.
    #[must_use]
    pub fn joined(&self, other: &Selector) -> Selector {
        let segments = self
            .segments()
            .chain(other.segments())
            .map(|segment| segment.as_str().to_string());
        Selector::of(segments).unwrap_or_else(|| self.clone())
    }

    /// Enclosing paths of this selector, innermost first; empty for a
    /// single-segment selector.
    #[must_use]
    pub fn prefixes(&self) -> Vec<Selector> {
        let segments: Vec<&Identifier> = self.segments().collect();
        let mut prefixes = Vec::new();
        for take in (1..segments.len()).rev() {
            if let Some(prefix) =
                Selector::of(segments[..take].iter().map(|segment| segment.as_str()))
            {
                prefixes.push(prefix);
            }
        }
        prefixes
    }
}

struct SegmentIter<'a> {
    node: Option<&'a Selector>,
}

impl<'a> Iterator for SegmentIter<'a> {
    type Item = &'a Identifier;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.node?;
        self.node = node.rest.as_deref();
        Some(&node.head)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rest.as_deref() {
            None => write!(f, "{}", self.head),
            Some(rest) => write!(f, "{}.{rest}", self.head),
        }
    }
}
