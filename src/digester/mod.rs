//! Rule Dispatch
//!
//! ## Architecture
//!
//! ```text
//! ContentHandler events
//!        |
//!        v
//!    Digester ---> PathStack ---> PatternMatcher (via Rules, LRU-cached)
//!        |
//!        +---> Rule hooks ---> ObjectStack / ParamStack / MethodInvoker
//! ```
//!
//! Build a [`Rules`] registry once, then create a [`Digester`] per parse.

pub mod config;
pub mod engine;
pub mod matcher;
pub mod path;
pub mod registry;
pub mod rule;
pub mod stack;

pub use config::DigesterConfig;
pub use engine::{Digester, EngineState};
pub use matcher::{Pattern, PatternKind, PatternMatcher, RuleId};
pub use path::PathStack;
pub use registry::Rules;
pub use rule::{Context, Rule};
pub use stack::{ObjectStack, ParamFrame, ParamStack, Stack, StackMark};
