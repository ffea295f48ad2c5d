//! Error Types
//!
//! Every failure aborts the current parse. Dispatch code raises
//! [`DigesterError`]; the caller receives it wrapped in a [`ParseFailure`]
//! that also records the element path active when the parse stopped.

use crate::digester::EngineState;
use crate::invoke::{MatchPolicy, ValueType};
use std::fmt;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, DigesterError>;

/// Which stack an underflow happened on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackKind {
    Path,
    Objects,
    Params,
}

impl fmt::Display for StackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StackKind::Path => "path",
            StackKind::Objects => "object",
            StackKind::Params => "param",
        })
    }
}

/// Malformed input reported by the tokenizer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at byte {position}")]
pub struct TokenizerError {
    pub message: String,
    pub position: usize,
}

impl TokenizerError {
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        TokenizerError {
            message: message.into(),
            position,
        }
    }
}

/// Argument type list, rendered as `Str, Int`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeList(pub Vec<ValueType>);

impl fmt::Display for TypeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, ty) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{ty}")?;
        }
        Ok(())
    }
}

/// Errors raised while registering rules or dispatching events
#[derive(Debug, Error)]
pub enum DigesterError {
    /// Pop/peek/mark beyond the available depth of a stack
    #[error("{stack} stack underflow: requested depth {requested}, {available} available")]
    Underflow {
        stack: StackKind,
        requested: usize,
        available: usize,
    },

    /// Malformed pattern or empty rule list at registration time
    #[error("pattern `{pattern}` rejected: {reason}")]
    PatternConflict {
        pattern: String,
        reason: &'static str,
    },

    /// The method invoker could not resolve or perform a call
    #[error("cannot invoke {target_type}.{method}({arg_types}) with {policy} matching: {reason}")]
    DelegateInvocation {
        target_type: String,
        method: String,
        arg_types: TypeList,
        policy: MatchPolicy,
        reason: String,
    },

    /// Malformed input, propagated unchanged from the tokenizer
    #[error(transparent)]
    Tokenizer(#[from] TokenizerError),

    /// The document ended while elements were still open
    #[error("document ended with {open} unclosed element(s)")]
    Unbalanced { open: usize },

    /// A rule implementation failed on its own terms
    #[error("{rule}: {message}")]
    Rule { rule: &'static str, message: String },

    /// An event reached an engine that already stopped
    #[error("digester is {state}; call reset() before feeding more events")]
    Aborted { state: EngineState },
}

/// Coarse classification of a [`DigesterError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Underflow,
    PatternConflict,
    DelegateInvocation,
    Tokenizer,
    Rule,
    Aborted,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorKind::Underflow => "underflow",
            ErrorKind::PatternConflict => "pattern conflict",
            ErrorKind::DelegateInvocation => "delegate invocation",
            ErrorKind::Tokenizer => "tokenizer",
            ErrorKind::Rule => "rule",
            ErrorKind::Aborted => "aborted",
        })
    }
}

impl DigesterError {
    /// Failure raised by a rule implementation
    pub fn rule(rule: &'static str, message: impl Into<String>) -> Self {
        DigesterError::Rule {
            rule,
            message: message.into(),
        }
    }

    pub(crate) fn underflow(stack: StackKind, requested: usize, available: usize) -> Self {
        DigesterError::Underflow {
            stack,
            requested,
            available,
        }
    }

    pub(crate) fn pattern(pattern: &str, reason: &'static str) -> Self {
        DigesterError::PatternConflict {
            pattern: pattern.to_string(),
            reason,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DigesterError::Underflow { .. } => ErrorKind::Underflow,
            DigesterError::PatternConflict { .. } => ErrorKind::PatternConflict,
            DigesterError::DelegateInvocation { .. } => ErrorKind::DelegateInvocation,
            DigesterError::Tokenizer(_) | DigesterError::Unbalanced { .. } => ErrorKind::Tokenizer,
            DigesterError::Rule { .. } => ErrorKind::Rule,
            DigesterError::Aborted { .. } => ErrorKind::Aborted,
        }
    }

    /// Attempted call signature, for delegate invocation failures
    ///
    /// Rendered as `Target.method(Type, Type)`.
    pub fn signature(&self) -> Option<String> {
        match self {
            DigesterError::DelegateInvocation {
                target_type,
                method,
                arg_types,
                ..
            } => Some(format!("{target_type}.{method}({arg_types})")),
            _ => None,
        }
    }
}

/// Terminal failure of a parse
///
/// Carries the error kind, the slash-joined element path that was active
/// when dispatch stopped (empty at document level) and the underlying error.
#[derive(Debug, Error)]
#[error("{kind} error at `{path}`: {source}")]
pub struct ParseFailure {
    kind: ErrorKind,
    path: String,
    #[source]
    source: DigesterError,
}

impl ParseFailure {
    pub fn new(path: impl Into<String>, source: DigesterError) -> Self {
        ParseFailure {
            kind: source.kind(),
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn error(&self) -> &DigesterError {
        &self.source
    }

    pub fn into_error(self) -> DigesterError {
        self.source
    }

    pub fn signature(&self) -> Option<String> {
        self.source.signature()
    }
}
