//! Invocable capability
//!
//! Domain objects opt into method dispatch by implementing [`Invocable`]:
//! they declare the methods they expose and perform a call once the invoker
//! has resolved which declared signature applies.

use super::value::{Value, ValueType};
use std::any::Any;
use std::fmt;
use thiserror::Error;

/// Upcast helper so `dyn Invocable` can be downcast to its concrete type
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A method an [`Invocable`] object exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodSignature {
    pub name: &'static str,
    pub params: &'static [ValueType],
}

impl MethodSignature {
    pub const fn new(name: &'static str, params: &'static [ValueType]) -> Self {
        MethodSignature { name, params }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, ty) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{ty}")?;
        }
        f.write_str(")")
    }
}

/// Failure reported by an object while performing a call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvokeError {
    #[error("no method `{0}` accepting the given arguments")]
    NoSuchMethod(String),
    #[error("{0}")]
    Failed(String),
}

impl InvokeError {
    pub fn failed(message: impl Into<String>) -> Self {
        InvokeError::Failed(message.into())
    }
}

/// Method dispatch capability for domain objects
///
/// `invoke` receives the signature chosen by the invoker together with
/// arguments already converted to its parameter types.
pub trait Invocable: AsAny + fmt::Debug {
    /// Type name used for [`ValueType::Object`] matching and diagnostics
    fn type_name(&self) -> &'static str;

    /// Declared methods, in resolution order
    fn methods(&self) -> &[MethodSignature];

    fn invoke(
        &mut self,
        signature: &MethodSignature,
        args: Vec<Value>,
    ) -> Result<Option<Value>, InvokeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_display() {
        const SIG: MethodSignature =
            MethodSignature::new("add_item", &[ValueType::Object("Item"), ValueType::Int]);
        assert_eq!(SIG.arity(), 2);
        assert_eq!(SIG.to_string(), "add_item(Item, Int)");
    }
}
