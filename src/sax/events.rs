//! SAX Event Types
//!
//! Owned names, attributes and events exchanged between a tokenizer and a
//! [`ContentHandler`](super::ContentHandler).

use memchr::memchr;
use std::fmt;

/// Namespace-qualified element or attribute name
///
/// `qualified` is the name as written (`prefix:local`); `namespace` is the
/// URI the prefix resolved to, when namespace processing is on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    qualified: String,
    namespace: Option<String>,
}

impl QName {
    pub fn new(qualified: impl Into<String>) -> Self {
        QName {
            qualified: qualified.into(),
            namespace: None,
        }
    }

    pub fn with_namespace(qualified: impl Into<String>, namespace: impl Into<String>) -> Self {
        QName {
            qualified: qualified.into(),
            namespace: Some(namespace.into()),
        }
    }

    /// Name as written in the document
    pub fn as_str(&self) -> &str {
        &self.qualified
    }

    /// Local name (after colon)
    pub fn local_name(&self) -> &str {
        split_name(&self.qualified).1
    }

    /// Namespace prefix (before colon), if any
    pub fn prefix(&self) -> Option<&str> {
        split_name(&self.qualified).0
    }

    /// Resolved namespace URI, if any
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub(crate) fn set_namespace(&mut self, namespace: Option<String>) {
        self.namespace = namespace;
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified)
    }
}

/// Split a name into prefix and local name at the colon
fn split_name(name: &str) -> (Option<&str>, &str) {
    match memchr(b':', name.as_bytes()) {
        Some(pos) => (Some(&name[..pos]), &name[pos + 1..]),
        None => (None, name),
    }
}

/// A single attribute with its entity-decoded value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: QName,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Attribute {
            name: QName::new(name),
            value: value.into(),
        }
    }
}

/// Attributes of one element, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<Attribute>);

impl Attributes {
    pub fn new() -> Self {
        Attributes(Vec::new())
    }

    /// Build from `(name, value)` pairs without namespace information
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        pairs
            .into_iter()
            .map(|(name, value)| Attribute::new(name, value))
            .collect()
    }

    pub fn push(&mut self, attribute: Attribute) {
        self.0.push(attribute);
    }

    /// Value of the attribute with this qualified name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|a| a.name.as_str() == name)
            .map(|a| a.value.as_str())
    }

    /// Value of the attribute with this namespace URI and local name
    pub fn get_ns(&self, namespace: &str, local_name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|a| a.name.namespace() == Some(namespace) && a.name.local_name() == local_name)
            .map(|a| a.value.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, Attribute> {
        self.0.iter_mut()
    }

    pub(crate) fn retain(&mut self, keep: impl FnMut(&Attribute) -> bool) {
        self.0.retain(keep);
    }
}

impl FromIterator<Attribute> for Attributes {
    fn from_iter<I: IntoIterator<Item = Attribute>>(iter: I) -> Self {
        Attributes(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A structural parsing event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaxEvent {
    /// Start of an element, empty elements included
    StartElement { name: QName, attributes: Attributes },
    /// Character data (text and CDATA), possibly one fragment of a run
    Characters(String),
    /// End of an element
    EndElement { name: QName },
    /// End of the document
    EndDocument,
}

impl SaxEvent {
    #[inline]
    pub fn is_start_element(&self) -> bool {
        matches!(self, SaxEvent::StartElement { .. })
    }

    #[inline]
    pub fn is_end_element(&self) -> bool {
        matches!(self, SaxEvent::EndElement { .. })
    }

    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self, SaxEvent::Characters(_))
    }

    /// Element name if this is a start or end element
    pub fn element_name(&self) -> Option<&QName> {
        match self {
            SaxEvent::StartElement { name, .. } | SaxEvent::EndElement { name } => Some(name),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_name() {
        let name = QName::new("div");
        assert_eq!(name.local_name(), "div");
        assert!(name.prefix().is_none());
        assert!(name.namespace().is_none());
    }

    #[test]
    fn test_namespaced_name() {
        let name = QName::with_namespace("svg:rect", "http://www.w3.org/2000/svg");
        assert_eq!(name.as_str(), "svg:rect");
        assert_eq!(name.local_name(), "rect");
        assert_eq!(name.prefix(), Some("svg"));
        assert_eq!(name.namespace(), Some("http://www.w3.org/2000/svg"));
    }

    #[test]
    fn test_attribute_lookup() {
        let mut attrs = Attributes::from_pairs([("id", "7"), ("x:kind", "book")]);
        for attr in attrs.iter_mut() {
            if attr.name.prefix() == Some("x") {
                attr.name.set_namespace(Some("urn:x".into()));
            }
        }
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs.get("id"), Some("7"));
        assert_eq!(attrs.get_ns("urn:x", "kind"), Some("book"));
        assert_eq!(attrs.get("missing"), None);
    }
}
