//! Method invocation collaborators
//!
//! - Value: stack values and shared object handles
//! - Invocable: capability trait domain objects implement
//! - Invoker: overload resolution and call dispatch
//! - Convert: text to typed argument conversion

pub mod convert;
pub mod invocable;
pub mod invoker;
pub mod value;

pub use convert::convert;
pub use invocable::{AsAny, Invocable, InvokeError, MethodSignature};
pub use invoker::{resolve, MatchPolicy, MethodCall, MethodInvoker, ReflectiveInvoker};
pub use value::{ObjectRef, Value, ValueType};
