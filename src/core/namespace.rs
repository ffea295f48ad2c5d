//! Namespace Resolution
//!
//! Stack-based namespace resolver for XML namespace handling.

/// Well-known namespace URIs
pub mod ns {
    pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
    pub const XMLNS: &str = "http://www.w3.org/2000/xmlns/";
}

/// Namespace binding (prefix -> URI); the default namespace uses prefix ""
#[derive(Debug, Clone)]
struct NsBinding {
    prefix: String,
    uri: String,
    depth: usize,
}

/// Stack-based namespace resolver
#[derive(Debug)]
pub struct NamespaceScope {
    bindings: Vec<NsBinding>,
    depth: usize,
}

impl NamespaceScope {
    /// Create a resolver with pre-declared xml and xmlns prefixes
    pub fn new() -> Self {
        let mut bindings = Vec::with_capacity(16);
        bindings.push(NsBinding {
            prefix: "xml".into(),
            uri: ns::XML.into(),
            depth: 0,
        });
        bindings.push(NsBinding {
            prefix: "xmlns".into(),
            uri: ns::XMLNS.into(),
            depth: 0,
        });
        NamespaceScope { bindings, depth: 0 }
    }

    /// Enter a new element scope
    pub fn push_scope(&mut self) {
        self.depth += 1;
    }

    /// Leave an element scope, removing any bindings declared in it
    pub fn pop_scope(&mut self) {
        while let Some(binding) = self.bindings.last() {
            if binding.depth < self.depth {
                break;
            }
            self.bindings.pop();
        }
        self.depth = self.depth.saturating_sub(1);
    }

    /// Declare a binding for the current scope
    ///
    /// Redeclaring `xml` or `xmlns` is ignored. An empty URI on the default
    /// prefix undeclares the default namespace.
    pub fn declare(&mut self, prefix: &str, uri: &str) {
        if prefix == "xml" || prefix == "xmlns" {
            return;
        }
        self.bindings.push(NsBinding {
            prefix: prefix.to_string(),
            uri: uri.to_string(),
            depth: self.depth,
        });
    }

    /// Resolve a prefix to a namespace URI
    pub fn resolve(&self, prefix: &str) -> Option<&str> {
        self.bindings
            .iter()
            .rev()
            .find(|b| b.prefix == prefix)
            .map(|b| b.uri.as_str())
            .filter(|uri| !uri.is_empty())
    }

    /// Resolve the default namespace
    pub fn resolve_default(&self) -> Option<&str> {
        self.resolve("")
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl Default for NamespaceScope {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_namespaces() {
        let scope = NamespaceScope::new();
        assert_eq!(scope.resolve("xml"), Some(ns::XML));
        assert_eq!(scope.resolve_default(), None);
    }

    #[test]
    fn test_scope_pop() {
        let mut scope = NamespaceScope::new();

        scope.push_scope();
        scope.declare("foo", "http://example.com/foo");
        assert_eq!(scope.resolve("foo"), Some("http://example.com/foo"));

        scope.pop_scope();
        assert_eq!(scope.resolve("foo"), None);
        assert_eq!(scope.depth(), 0);
    }

    #[test]
    fn test_shadow_binding() {
        let mut scope = NamespaceScope::new();

        scope.push_scope();
        scope.declare("ns", "http://example.com/ns1");

        scope.push_scope();
        scope.declare("ns", "http://example.com/ns2");
        assert_eq!(scope.resolve("ns"), Some("http://example.com/ns2"));

        scope.pop_scope();
        assert_eq!(scope.resolve("ns"), Some("http://example.com/ns1"));
    }

    #[test]
    fn test_undeclare_default() {
        let mut scope = NamespaceScope::new();
        scope.push_scope();
        scope.declare("", "urn:outer");
        scope.push_scope();
        scope.declare("", "");
        assert_eq!(scope.resolve_default(), None);
        scope.pop_scope();
        assert_eq!(scope.resolve_default(), Some("urn:outer"));
    }
}
