//! RustyDigester - Rule-driven XML to object mapping
//!
//! Register rules against element path patterns, feed a document through
//! the bundled tokenizer (or any [`sax::ContentHandler`] driver), and the
//! rules build an object graph on a stack that mirrors the document nesting.
//!
//! ```text
//! bytes --> core::Tokenizer --> Digester --> Rules (pattern -> rule hooks)
//!                                  |
//!                                  +--> object / param stacks --> root
//! ```
//!
//! Patterns:
//! - `catalog/item`: exact path
//! - `*/item`: any path ending in `item`
//! - `*`: every element
//!
//! Rules matching the same element run most specific first: exact, then
//! longer wildcard suffixes, then `*`, ties in registration order.

pub mod core;
pub mod digester;
pub mod error;
pub mod invoke;
pub mod rules;
pub mod sax;

pub use digester::{Context, Digester, DigesterConfig, EngineState, Rule, RuleId, Rules};
pub use error::{DigesterError, ErrorKind, ParseFailure, Result};
pub use invoke::{
    Invocable, InvokeError, MatchPolicy, MethodCall, MethodInvoker, MethodSignature, ObjectRef,
    ReflectiveInvoker, Value, ValueType,
};
pub use rules::{
    CallMethodRule, CallParamRule, ObjectCreateRule, SetNextRule, SetPropertiesRule, SetRootRule,
    SetTopRule,
};
pub use sax::{Attributes, ContentHandler, QName};
