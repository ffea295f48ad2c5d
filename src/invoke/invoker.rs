//! Method Invoker
//!
//! Rules that call a named method on a stack-resident object hand the call
//! to the engine's [`MethodInvoker`]. The default [`ReflectiveInvoker`]
//! resolves the overload against the target's declared signatures under the
//! rule's [`MatchPolicy`] and performs the call.

use super::convert::convert;
use super::invocable::MethodSignature;
use super::value::{ObjectRef, Value, ValueType};
use crate::error::{DigesterError, Result, TypeList};
use std::fmt;

/// Overload resolution policy, fixed per rule instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchPolicy {
    /// Parameter types must equal the expected argument types
    Exact,
    /// An exact signature wins, otherwise the first declared signature whose
    /// parameters accept the argument types
    #[default]
    Assignable,
}

impl fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MatchPolicy::Exact => "exact",
            MatchPolicy::Assignable => "assignable",
        })
    }
}

/// A fully described call on a target object
#[derive(Debug, Clone)]
pub struct MethodCall {
    pub target: ObjectRef,
    pub method: String,
    pub args: Vec<Value>,
    /// Expected argument types, one per argument
    pub param_types: Vec<ValueType>,
    pub policy: MatchPolicy,
}

impl MethodCall {
    /// Build the error reported when this call cannot be performed
    pub fn failure(&self, reason: impl Into<String>) -> DigesterError {
        DigesterError::DelegateInvocation {
            target_type: self.target.type_name().to_string(),
            method: self.method.clone(),
            arg_types: TypeList(self.param_types.clone()),
            policy: self.policy,
            reason: reason.into(),
        }
    }
}

/// Performs method calls on behalf of rules
pub trait MethodInvoker {
    fn invoke(&self, call: MethodCall) -> Result<Option<Value>>;
}

/// Pick the declared signature for `name` and `types` under `policy`
pub fn resolve<'a>(
    methods: &'a [MethodSignature],
    name: &str,
    types: &[ValueType],
    policy: MatchPolicy,
) -> Option<&'a MethodSignature> {
    let mut candidates = methods
        .iter()
        .filter(|sig| sig.name == name && sig.arity() == types.len());

    match policy {
        MatchPolicy::Exact => candidates.find(|sig| sig.params == types),
        MatchPolicy::Assignable => {
            let candidates: Vec<_> = candidates.collect();
            candidates
                .iter()
                .find(|sig| sig.params == types)
                .or_else(|| {
                    candidates.iter().find(|sig| {
                        sig.params
                            .iter()
                            .zip(types)
                            .all(|(param, arg)| param.accepts(*arg))
                    })
                })
                .copied()
        }
    }
}

/// Default invoker backed by [`Invocable`](super::Invocable) declarations
#[derive(Debug, Default, Clone, Copy)]
pub struct ReflectiveInvoker;

impl MethodInvoker for ReflectiveInvoker {
    fn invoke(&self, call: MethodCall) -> Result<Option<Value>> {
        if call.args.len() != call.param_types.len() {
            return Err(call.failure(format!(
                "{} argument(s) supplied for {} declared type(s)",
                call.args.len(),
                call.param_types.len()
            )));
        }

        let mut target = call
            .target
            .try_borrow_mut()
            .map_err(|_| call.failure("target object is already borrowed"))?;

        let signature = *resolve(target.methods(), &call.method, &call.param_types, call.policy)
            .ok_or_else(|| call.failure("no matching method"))?;

        let args = call
            .args
            .iter()
            .cloned()
            .zip(signature.params)
            .map(|(arg, ty)| convert(arg, *ty))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|reason| call.failure(reason))?;

        target
            .invoke(&signature, args)
            .map_err(|e| call.failure(e.to_string()))
    }
}
