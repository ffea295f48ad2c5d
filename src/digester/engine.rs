//! Dispatch Engine
//!
//! [`Digester`] receives parsing events through [`ContentHandler`], keeps
//! the element path, asks the registry which rules match each element and
//! runs their hooks in lifecycle order:
//!
//! ```text
//! <item>      begin   (registration order)
//!   text      body    (flushed at the next child start or at </item>)
//! </item>     end     (registration order)
//! EOF         finish  (each fired rule once, reverse registration order)
//! ```
//!
//! Each open element gets a frame holding its matched rules and the depth of
//! both stacks when it opened. When a hook fails, the stacks are cut back to
//! the failing element's marks and the engine refuses further events until
//! [`Digester::reset`].

use super::config::DigesterConfig;
use super::matcher::RuleId;
use super::path::PathStack;
use super::registry::Rules;
use super::rule::{Context, Rule};
use super::stack::{ObjectStack, ParamStack, StackMark};
use crate::core::tokenizer::Tokenizer;
use crate::error::{DigesterError, ParseFailure, StackKind, TokenizerError};
use crate::invoke::{MethodInvoker, ReflectiveInvoker, Value};
use crate::sax::{Attributes, ContentHandler, QName};
use lru::LruCache;
use std::collections::BTreeSet;
use std::fmt;
use std::num::NonZeroUsize;
use std::rc::Rc;

/// Lifecycle of a digester between resets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Fresh or reset; objects may be seeded with [`Digester::push`]
    Ready,
    /// At least one event has been received
    Running,
    /// `end_document` completed
    Finished,
    /// A hook or the input failed
    Failed,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EngineState::Ready => "ready",
            EngineState::Running => "running",
            EngineState::Finished => "finished",
            EngineState::Failed => "failed",
        })
    }
}

/// Per-element dispatch state
struct Frame {
    name: QName,
    rules: Vec<RuleId>,
    objects: StackMark,
    params: StackMark,
}

/// Rule-driven event consumer that builds an object graph
pub struct Digester {
    rules: Rc<Rules>,
    config: DigesterConfig,
    invoker: Box<dyn MethodInvoker>,
    cache: Option<LruCache<String, Rc<[RuleId]>>>,

    path: PathStack,
    objects: ObjectStack,
    params: ParamStack,
    root: Option<Value>,
    frames: Vec<Frame>,
    /// Text collected for the innermost open element
    body: String,
    /// Rules that fired at least once
    fired: BTreeSet<RuleId>,
    state: EngineState,
}

impl Digester {
    pub fn new(rules: impl Into<Rc<Rules>>) -> Self {
        Self::with_config(rules, DigesterConfig::default())
    }

    pub fn with_config(rules: impl Into<Rc<Rules>>, config: DigesterConfig) -> Self {
        Digester {
            rules: rules.into(),
            cache: NonZeroUsize::new(config.match_cache_capacity).map(LruCache::new),
            config,
            invoker: Box::new(ReflectiveInvoker),
            path: PathStack::new(),
            objects: ObjectStack::new(StackKind::Objects),
            params: ParamStack::new(),
            root: None,
            frames: Vec::with_capacity(16),
            body: String::new(),
            fired: BTreeSet::new(),
            state: EngineState::Ready,
        }
    }

    /// Replace the method invoker used by linking rules
    pub fn with_invoker(mut self, invoker: impl MethodInvoker + 'static) -> Self {
        self.invoker = Box::new(invoker);
        self
    }

    pub fn config(&self) -> &DigesterConfig {
        &self.config
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Seed the object stack
    ///
    /// Pushed before parsing, the object becomes the root that rules link
    /// children into.
    pub fn push(&mut self, value: impl Into<Value>) {
        let value = value.into();
        if self.objects.is_empty() {
            self.root = Some(value.clone());
        }
        self.objects.push(value);
    }

    /// First object pushed onto an empty stack
    pub fn root(&self) -> Option<&Value> {
        self.root.as_ref()
    }

    pub fn take_root(&mut self) -> Option<Value> {
        self.root.take()
    }

    /// Current object stack depth
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Slash-joined path of the innermost open element
    pub fn match_path(&self) -> &str {
        self.path.as_match()
    }

    /// Tokenize `input` and dispatch its events, returning the root
    pub fn parse(&mut self, input: &[u8]) -> Result<Option<Value>, ParseFailure> {
        if self.state != EngineState::Ready {
            return Err(self.aborted());
        }
        Tokenizer::new(input)
            .namespace_aware(self.config.namespace_aware)
            .scan(self)?;
        Ok(self.root.clone())
    }

    /// Drop all parse state, keeping rules, configuration and invoker
    pub fn reset(&mut self) {
        self.path.clear();
        self.objects.clear();
        self.params.clear();
        self.root = None;
        self.frames.clear();
        self.body.clear();
        self.fired.clear();
        self.state = EngineState::Ready;
    }

    fn aborted(&self) -> ParseFailure {
        ParseFailure::new(
            self.path.as_match(),
            DigesterError::Aborted { state: self.state },
        )
    }

    /// Accept an event, moving Ready to Running
    fn enter(&mut self) -> Result<(), ParseFailure> {
        match self.state {
            EngineState::Ready => {
                self.state = EngineState::Running;
                Ok(())
            }
            EngineState::Running => Ok(()),
            EngineState::Finished | EngineState::Failed => Err(self.aborted()),
        }
    }

    /// Rewind to the innermost frame's marks and stop
    fn fail(&mut self, error: DigesterError) -> ParseFailure {
        if let Some(frame) = self.frames.last() {
            // Marks were taken at this depth or shallower; a rule that popped
            // past them already reported its own underflow.
            let target = self.config.log_target.as_str();
            if let Err(e) = self.objects.truncate_to(frame.objects) {
                log::debug!(target: target, "Object stack below its mark at {{{}}}: {e}", self.path.as_match());
            }
            if let Err(e) = self.params.clear_to(frame.params) {
                log::debug!(target: target, "Param stack below its mark at {{{}}}: {e}", self.path.as_match());
            }
        }
        self.state = EngineState::Failed;
        self.body.clear();
        log::debug!(target: self.config.log_target.as_str(), "Parse failed at {{{}}}: {error}", self.path.as_match());
        ParseFailure::new(self.path.as_match(), error)
    }

    fn context(&mut self) -> Context<'_> {
        Context {
            objects: &mut self.objects,
            params: &mut self.params,
            path: &self.path,
            root: &mut self.root,
            invoker: self.invoker.as_ref(),
            log_target: &self.config.log_target,
        }
    }

    /// Rules for the current path, namespace filter applied
    fn match_rules(&mut self, namespace: Option<&str>) -> Vec<RuleId> {
        let matched: Rc<[RuleId]> = match self.cache.as_mut() {
            Some(cache) => match cache.get(self.path.as_match()).cloned() {
                Some(hit) => hit,
                None => {
                    let computed: Rc<[RuleId]> = self.rules.matching_rules(&self.path).into();
                    cache.put(self.path.as_match().to_string(), Rc::clone(&computed));
                    computed
                }
            },
            None => self.rules.matching_rules(&self.path).into(),
        };

        matched
            .iter()
            .copied()
            .filter(|id| self.rules.accepts(*id, namespace))
            .collect()
    }

    /// Deliver collected text to the innermost element's rules
    fn flush_body(&mut self) -> Result<(), DigesterError> {
        if self.body.is_empty() {
            return Ok(());
        }
        let text = std::mem::take(&mut self.body);
        if self.config.skip_whitespace_body && text.trim().is_empty() {
            return Ok(());
        }
        let Some(frame) = self.frames.last() else {
            return Ok(());
        };
        let name = frame.name.clone();
        let ids = frame.rules.clone();
        let rules = Rc::clone(&self.rules);

        for id in ids {
            let rule = lookup(&rules, id)?;
            log::debug!(target: self.config.log_target.as_str(), "  Fire body() for {}", rule.name());
            rule.body(&mut self.context(), &name, &text)?;
        }
        Ok(())
    }

    fn dispatch_start(&mut self, name: QName, attributes: Attributes) -> Result<(), DigesterError> {
        self.flush_body()?;

        self.path.push(name.as_str());
        let ids = self.match_rules(name.namespace());
        log::trace!(
            target: self.config.log_target.as_str(),
            "startElement({}) {{{}}}: {} rule(s)",
            name,
            self.path.as_match(),
            ids.len()
        );

        self.frames.push(Frame {
            name: name.clone(),
            rules: ids.clone(),
            objects: self.objects.mark(),
            params: self.params.mark(),
        });

        let rules = Rc::clone(&self.rules);
        for id in ids {
            self.fired.insert(id);
            let rule = lookup(&rules, id)?;
            log::debug!(target: self.config.log_target.as_str(), "  Fire begin() for {}", rule.name());
            rule.begin(&mut self.context(), &name, &attributes)?;
        }
        Ok(())
    }

    fn dispatch_end(&mut self, name: QName) -> Result<(), DigesterError> {
        if self.frames.is_empty() {
            return Err(DigesterError::underflow(StackKind::Path, 1, 0));
        }
        self.flush_body()?;
        log::trace!(target: self.config.log_target.as_str(), "endElement({}) {{{}}}", name, self.path.as_match());

        let ids = self.frames.last().map(|f| f.rules.clone()).unwrap_or_default();
        let rules = Rc::clone(&self.rules);
        for id in ids {
            let rule = lookup(&rules, id)?;
            log::debug!(target: self.config.log_target.as_str(), "  Fire end() for {}", rule.name());
            rule.end(&mut self.context(), &name)?;
        }

        self.frames.pop();
        self.path.pop()
    }

    fn dispatch_finish(&mut self) -> Result<(), DigesterError> {
        if !self.frames.is_empty() {
            return Err(DigesterError::Unbalanced {
                open: self.frames.len(),
            });
        }
        log::trace!(target: self.config.log_target.as_str(), "endDocument()");

        // RuleId is the registration index
        let fired: Vec<RuleId> = self.fired.iter().rev().copied().collect();
        let rules = Rc::clone(&self.rules);
        for id in fired {
            let rule = lookup(&rules, id)?;
            log::debug!(target: self.config.log_target.as_str(), "  Fire finish() for {}", rule.name());
            rule.finish(&mut self.context())?;
        }
        Ok(())
    }
}

fn lookup(rules: &Rules, id: RuleId) -> Result<&dyn Rule, DigesterError> {
    rules
        .rule(id)
        .ok_or_else(|| DigesterError::rule("Digester", format!("unknown rule {id}")))
}

impl ContentHandler for Digester {
    type Error = ParseFailure;

    fn start_element(&mut self, name: QName, attributes: Attributes) -> Result<(), ParseFailure> {
        self.enter()?;
        self.dispatch_start(name, attributes).map_err(|e| self.fail(e))
    }

    fn characters(&mut self, text: &str) -> Result<(), ParseFailure> {
        self.enter()?;
        // Text outside the root element belongs to no rule
        if !self.frames.is_empty() {
            self.body.push_str(text);
        }
        Ok(())
    }

    fn end_element(&mut self, name: QName) -> Result<(), ParseFailure> {
        self.enter()?;
        self.dispatch_end(name).map_err(|e| self.fail(e))
    }

    fn end_document(&mut self) -> Result<(), ParseFailure> {
        self.enter()?;
        self.dispatch_finish().map_err(|e| self.fail(e))?;
        self.state = EngineState::Finished;
        Ok(())
    }

    fn fatal_error(&mut self, error: TokenizerError) -> ParseFailure {
        self.fail(error.into())
    }
}

impl fmt::Debug for Digester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Digester")
            .field("state", &self.state)
            .field("path", &self.path.as_match())
            .field("objects", &self.objects.len())
            .field("params", &self.params.len())
            .field("rules", &self.rules.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::sax::replay;
    use crate::sax::SaxEvent;
    use std::cell::RefCell;

    type Log = Rc<RefCell<Vec<String>>>;

    /// Records every hook call as `label.hook(detail)`
    struct Recorder {
        label: &'static str,
        log: Log,
        fail_on: Option<&'static str>,
    }

    impl Recorder {
        fn new(label: &'static str, log: &Log) -> Self {
            Recorder {
                label,
                log: Rc::clone(log),
                fail_on: None,
            }
        }

        fn failing(mut self, hook: &'static str) -> Self {
            self.fail_on = Some(hook);
            self
        }

        fn record(&self, hook: &'static str, detail: &str) -> crate::error::Result<()> {
            self.log
                .borrow_mut()
                .push(format!("{}.{hook}({detail})", self.label));
            if self.fail_on == Some(hook) {
                return Err(DigesterError::rule("Recorder", format!("{hook} failed")));
            }
            Ok(())
        }
    }

    impl Rule for Recorder {
        fn begin(&self, ctx: &mut Context<'_>, name: &QName, _attributes: &Attributes) -> crate::error::Result<()> {
            ctx.push(Value::from(name.as_str()));
            self.record("begin", name.as_str())
        }

        fn body(&self, _ctx: &mut Context<'_>, _name: &QName, text: &str) -> crate::error::Result<()> {
            self.record("body", text)
        }

        fn end(&self, ctx: &mut Context<'_>, name: &QName) -> crate::error::Result<()> {
            ctx.pop()?;
            self.record("end", name.as_str())
        }

        fn finish(&self, _ctx: &mut Context<'_>) -> crate::error::Result<()> {
            self.record("finish", "")
        }
    }

    fn taken(log: &Log) -> Vec<String> {
        std::mem::take(&mut *log.borrow_mut())
    }

    #[test]
    fn test_lifecycle_order() {
        let log = Log::default();
        let mut rules = Rules::new();
        rules.add("a", Recorder::new("R1", &log)).unwrap();
        rules.add("a/b", Recorder::new("R2", &log)).unwrap();
        rules.add("*/b", Recorder::new("R3", &log)).unwrap();

        let mut digester = Digester::new(rules);
        digester.parse(b"<a>x<b>y</b>z</a>").unwrap();

        assert_eq!(
            taken(&log),
            [
                "R1.begin(a)",
                "R1.body(x)",
                "R2.begin(b)",
                "R3.begin(b)",
                "R2.body(y)",
                "R3.body(y)",
                "R2.end(b)",
                "R3.end(b)",
                "R1.body(z)",
                "R1.end(a)",
                "R3.finish()",
                "R2.finish()",
                "R1.finish()",
            ]
        );
        assert_eq!(digester.state(), EngineState::Finished);
        assert_eq!(digester.object_count(), 0);
    }

    #[test]
    fn test_fragmented_text_is_one_body() {
        let log = Log::default();
        let mut rules = Rules::new();
        rules.add("a", Recorder::new("R", &log)).unwrap();

        let mut digester = Digester::new(rules);
        digester.parse(b"<a>one &amp; <![CDATA[two]]></a>").unwrap();
        assert!(taken(&log).contains(&"R.body(one & two)".to_string()));
    }

    #[test]
    fn test_skip_whitespace_body() {
        let log = Log::default();
        let mut rules = Rules::new();
        rules.add("a", Recorder::new("R", &log)).unwrap();
        let rules = Rc::new(rules);

        let config = DigesterConfig::default().skip_whitespace_body(true);
        let mut digester = Digester::with_config(Rc::clone(&rules), config);
        digester.parse(b"<a>\n  <b/>\n</a>").unwrap();
        assert!(!taken(&log).iter().any(|entry| entry.starts_with("R.body")));

        let mut digester = Digester::new(rules);
        digester.parse(b"<a>\n  <b/>\n</a>").unwrap();
        assert_eq!(taken(&log).iter().filter(|e| e.starts_with("R.body")).count(), 2);
    }

    #[test]
    fn test_finish_once_per_rule() {
        let log = Log::default();
        let mut rules = Rules::new();
        rules.add("*/item", Recorder::new("R", &log)).unwrap();

        let mut digester = Digester::new(rules);
        digester.parse(b"<root><item/><item/><item/></root>").unwrap();
        let entries = taken(&log);
        assert_eq!(entries.iter().filter(|e| e.ends_with("finish()")).count(), 1);
        assert_eq!(entries.last().map(String::as_str), Some("R.finish()"));
    }

    #[test]
    fn test_finish_follows_registration_not_firing() {
        let log = Log::default();
        let mut rules = Rules::new();
        rules.add("*/item", Recorder::new("Early", &log)).unwrap();
        rules.add("root", Recorder::new("Late", &log)).unwrap();

        let mut digester = Digester::new(rules);
        digester.parse(b"<root><item/></root>").unwrap();
        let entries = taken(&log);
        let begins: Vec<_> = entries.iter().filter(|e| e.contains(".begin")).collect();
        assert_eq!(begins, ["Late.begin(root)", "Early.begin(item)"]);
        let finishes: Vec<_> = entries.iter().filter(|e| e.ends_with("finish()")).collect();
        assert_eq!(finishes, ["Late.finish()", "Early.finish()"]);
    }

    /// Pops one entry more than it pushed, then fails
    struct Overpop;

    impl Rule for Overpop {
        fn begin(&self, ctx: &mut Context<'_>, _name: &QName, _attributes: &Attributes) -> crate::error::Result<()> {
            ctx.pop()?;
            Err(DigesterError::rule("Overpop", "gave up"))
        }
    }

    #[test]
    fn test_failure_below_mark_still_fails_cleanly() {
        let log = Log::default();
        let mut rules = Rules::new();
        rules.add("root", Recorder::new("Outer", &log)).unwrap();
        rules.add("root/item", Overpop).unwrap();

        let mut digester = Digester::new(rules);
        let failure = digester.parse(b"<root><item/></root>").unwrap_err();
        assert_eq!(failure.kind(), ErrorKind::Rule);
        assert_eq!(failure.path(), "root/item");
        assert_eq!(digester.state(), EngineState::Failed);
        // The entry Outer pushed is gone; the rewind cannot restore it
        assert_eq!(digester.object_count(), 0);
    }

    #[test]
    fn test_failure_rewinds_and_poisons() {
        let log = Log::default();
        let mut rules = Rules::new();
        rules.add("root", Recorder::new("Outer", &log)).unwrap();
        rules.add("root/item", Recorder::new("Inner", &log).failing("end")).unwrap();

        let mut digester = Digester::new(rules);
        let failure = digester.parse(b"<root><item>text</item></root>").unwrap_err();
        assert_eq!(failure.kind(), ErrorKind::Rule);
        assert_eq!(failure.path(), "root/item");
        assert_eq!(digester.state(), EngineState::Failed);
        // Inner popped its own entry before failing; Outer's entry survives
        assert_eq!(digester.object_count(), 1);

        let entries = taken(&log);
        assert!(!entries.iter().any(|e| e == "Outer.end(root)"));
        assert!(!entries.iter().any(|e| e.ends_with("finish()")));

        let again = digester.end_element(QName::new("root")).unwrap_err();
        assert_eq!(again.kind(), ErrorKind::Aborted);

        digester.reset();
        assert_eq!(digester.state(), EngineState::Ready);
        assert_eq!(digester.object_count(), 0);
    }

    #[test]
    fn test_begin_failure_drops_element_entries() {
        let log = Log::default();
        let mut rules = Rules::new();
        rules.add("root", Recorder::new("Outer", &log)).unwrap();
        rules.add("root/item", Recorder::new("Pusher", &log)).unwrap();
        rules.add("root/item", Recorder::new("Broken", &log).failing("begin")).unwrap();

        let mut digester = Digester::new(rules);
        let failure = digester.parse(b"<root><item/></root>").unwrap_err();
        assert_eq!(failure.path(), "root/item");
        assert_eq!(digester.object_count(), 1);
    }

    #[test]
    fn test_end_without_open_element_underflows() {
        let mut digester = Digester::new(Rules::new());
        let failure = digester.end_element(QName::new("a")).unwrap_err();
        assert_eq!(failure.kind(), ErrorKind::Underflow);
        assert_eq!(failure.path(), "");
        assert_eq!(digester.state(), EngineState::Failed);
    }

    #[test]
    fn test_unbalanced_document_end() {
        let mut digester = Digester::new(Rules::new());
        let events = vec![
            SaxEvent::StartElement {
                name: QName::new("a"),
                attributes: Attributes::new(),
            },
            SaxEvent::EndDocument,
        ];
        let failure = replay(events, &mut digester).unwrap_err();
        assert_eq!(failure.kind(), ErrorKind::Tokenizer);
        assert!(matches!(failure.error(), DigesterError::Unbalanced { open: 1 }));
    }

    #[test]
    fn test_tokenizer_error_carries_path() {
        let mut digester = Digester::new(Rules::new());
        let failure = digester.parse(b"<a><b></c></a>").unwrap_err();
        assert_eq!(failure.kind(), ErrorKind::Tokenizer);
        assert_eq!(failure.path(), "a/b");
    }

    #[test]
    fn test_parse_requires_ready_state() {
        let mut digester = Digester::new(Rules::new());
        digester.parse(b"<a/>").unwrap();
        assert_eq!(digester.state(), EngineState::Finished);

        let failure = digester.parse(b"<a/>").unwrap_err();
        assert_eq!(failure.kind(), ErrorKind::Aborted);

        digester.reset();
        assert!(digester.parse(b"<a/>").is_ok());
    }

    #[test]
    fn test_namespace_filtered_rules() {
        let log = Log::default();
        let mut rules = Rules::new();
        rules.add_ns("*/item", "urn:a", Recorder::new("A", &log)).unwrap();
        rules.add_ns("*/item", "urn:b", Recorder::new("B", &log)).unwrap();

        let mut digester = Digester::new(rules);
        digester
            .parse(b"<root xmlns='urn:a'><item/><item xmlns='urn:b'/></root>")
            .unwrap();
        let begins: Vec<_> = taken(&log)
            .into_iter()
            .filter(|e| e.contains(".begin"))
            .collect();
        assert_eq!(begins, ["A.begin(item)", "B.begin(item)"]);
    }

    #[test]
    fn test_cache_disabled_matches_same_rules() {
        let log = Log::default();
        let mut rules = Rules::new();
        rules.add("*/b", Recorder::new("R", &log)).unwrap();

        let config = DigesterConfig::default().match_cache_capacity(0);
        let mut digester = Digester::with_config(rules, config);
        digester.parse(b"<a><b/><b/></a>").unwrap();
        let begins = taken(&log).iter().filter(|e| e.contains(".begin")).count();
        assert_eq!(begins, 2);
    }

    #[test]
    fn test_seeded_root_survives() {
        let mut digester = Digester::new(Rules::new());
        digester.push(Value::from("seed"));
        let root = digester.parse(b"<a/>").unwrap();
        assert_eq!(root, Some(Value::from("seed")));
        assert_eq!(digester.take_root(), Some(Value::from("seed")));
        assert!(digester.root().is_none());
    }
}
