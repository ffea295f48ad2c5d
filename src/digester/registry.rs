//! Rule Registry
//!
//! Rules are registered under patterns before parsing starts. The registry
//! is read-only while a digester dispatches, and one registry can be shared
//! by many digesters through `Rc<Rules>`.

use super::matcher::{Pattern, PatternMatcher, RuleId};
use super::path::PathStack;
use super::rule::Rule;
use crate::error::{DigesterError, Result};

struct RuleEntry {
    pattern: Pattern,
    /// Only fire for elements in this namespace
    namespace: Option<String>,
    rule: Box<dyn Rule>,
}

/// Ordered set of rules keyed by pattern
#[derive(Default)]
pub struct Rules {
    entries: Vec<RuleEntry>,
    matcher: PatternMatcher,
}

impl Rules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule under `pattern`
    pub fn add(&mut self, pattern: &str, rule: impl Rule + 'static) -> Result<RuleId> {
        let pattern = Pattern::parse(pattern)?;
        Ok(self.insert(pattern, None, Box::new(rule)))
    }

    /// Register a rule that only fires for elements in `namespace`
    pub fn add_ns(
        &mut self,
        pattern: &str,
        namespace: &str,
        rule: impl Rule + 'static,
    ) -> Result<RuleId> {
        let pattern = Pattern::parse(pattern)?;
        Ok(self.insert(pattern, Some(namespace.to_string()), Box::new(rule)))
    }

    /// Register several rules under one pattern, in order
    ///
    /// An empty list is rejected; nothing is registered on failure.
    pub fn add_all(&mut self, pattern: &str, rules: Vec<Box<dyn Rule>>) -> Result<Vec<RuleId>> {
        let parsed = Pattern::parse(pattern)?;
        if rules.is_empty() {
            return Err(DigesterError::pattern(pattern, "empty rule list"));
        }
        Ok(rules
            .into_iter()
            .map(|rule| self.insert(parsed.clone(), None, rule))
            .collect())
    }

    fn insert(&mut self, pattern: Pattern, namespace: Option<String>, rule: Box<dyn Rule>) -> RuleId {
        let id = RuleId(self.entries.len());
        self.matcher.add(&pattern, id);
        self.entries.push(RuleEntry {
            pattern,
            namespace,
            rule,
        });
        id
    }

    pub fn rule(&self, id: RuleId) -> Option<&dyn Rule> {
        self.entries.get(id.0).map(|e| e.rule.as_ref())
    }

    pub fn pattern(&self, id: RuleId) -> Option<&Pattern> {
        self.entries.get(id.0).map(|e| &e.pattern)
    }

    pub fn namespace(&self, id: RuleId) -> Option<&str> {
        self.entries.get(id.0).and_then(|e| e.namespace.as_deref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rules matching `path`, most specific first, ignoring namespaces
    pub fn matching_rules(&self, path: &PathStack) -> Vec<RuleId> {
        self.matcher.matching_rules(path)
    }

    /// Whether rule `id` may fire for an element in `namespace`
    pub fn accepts(&self, id: RuleId, namespace: Option<&str>) -> bool {
        match self.entries.get(id.0) {
            Some(entry) => match &entry.namespace {
                Some(required) => namespace == Some(required.as_str()),
                None => true,
            },
            None => false,
        }
    }
}

impl std::fmt::Debug for Rules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| (e.pattern.as_str(), e.rule.name())))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    struct Named(&'static str);

    impl Rule for Named {
        fn name(&self) -> &'static str {
            self.0
        }
    }

    fn path(segments: &[&str]) -> PathStack {
        let mut path = PathStack::new();
        for segment in segments {
            path.push(segment);
        }
        path
    }

    #[test]
    fn test_registration_order_under_one_pattern() {
        let mut rules = Rules::new();
        let first = rules.add("root/item", Named("first")).unwrap();
        let ids = rules
            .add_all("root/item", vec![Box::new(Named("second")), Box::new(Named("third"))])
            .unwrap();

        let matched = rules.matching_rules(&path(&["root", "item"]));
        assert_eq!(matched, [first, ids[0], ids[1]]);
        let names: Vec<_> = matched
            .iter()
            .filter_map(|id| rules.rule(*id))
            .map(|r| r.name())
            .collect();
        assert_eq!(names, ["first", "second", "third"]);
        assert_eq!(rules.len(), 3);
    }

    #[test]
    fn test_empty_rule_list_rejected() {
        let mut rules = Rules::new();
        let err = rules.add_all("root/item", Vec::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PatternConflict);
        assert!(rules.is_empty());
    }

    #[test]
    fn test_malformed_pattern_rejected() {
        let mut rules = Rules::new();
        let err = rules.add("root//item", Named("x")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PatternConflict);
        assert!(rules.is_empty());
    }

    #[test]
    fn test_namespace_filter() {
        let mut rules = Rules::new();
        let any = rules.add("*/item", Named("any")).unwrap();
        let scoped = rules.add_ns("*/item", "urn:catalog", Named("scoped")).unwrap();

        assert!(rules.accepts(any, None));
        assert!(rules.accepts(scoped, Some("urn:catalog")));
        assert!(!rules.accepts(scoped, Some("urn:other")));
        assert!(!rules.accepts(scoped, None));
        assert_eq!(rules.namespace(scoped), Some("urn:catalog"));
        assert_eq!(rules.pattern(any).map(Pattern::as_str), Some("*/item"));
    }
}
