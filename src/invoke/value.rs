//! Stack Values
//!
//! Everything rules push onto the object stack or collect as call arguments
//! is a [`Value`]. Domain objects travel as [`ObjectRef`] handles so one
//! object can sit on the stack and be linked into its parent at once.

use super::invocable::Invocable;
use std::cell::{BorrowMutError, Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

/// Declared type of a method parameter or of a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Bool,
    Int,
    Float,
    Str,
    /// Domain object, identified by its `Invocable::type_name`
    Object(&'static str),
    /// Accepts any value
    Any,
}

impl ValueType {
    /// Whether a parameter of this type accepts an argument of type `arg`
    /// without an exact match.
    ///
    /// `Any` accepts everything and `Float` accepts `Int`; otherwise the
    /// types must be equal.
    pub fn accepts(self, arg: ValueType) -> bool {
        match (self, arg) {
            (a, b) if a == b => true,
            (ValueType::Any, _) => true,
            (ValueType::Float, ValueType::Int) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Bool => f.write_str("Bool"),
            ValueType::Int => f.write_str("Int"),
            ValueType::Float => f.write_str("Float"),
            ValueType::Str => f.write_str("Str"),
            ValueType::Object(name) => f.write_str(name),
            ValueType::Any => f.write_str("Any"),
        }
    }
}

/// Shared handle to a domain object
///
/// Cloning the handle shares the object. The type name is captured at
/// construction so it stays readable while the object is mutably borrowed.
#[derive(Clone)]
pub struct ObjectRef {
    inner: Rc<RefCell<dyn Invocable>>,
    type_name: &'static str,
}

impl ObjectRef {
    pub fn new<T: Invocable>(value: T) -> Self {
        let type_name = value.type_name();
        let inner: Rc<RefCell<dyn Invocable>> = Rc::new(RefCell::new(value));
        ObjectRef { inner, type_name }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.inner), Rc::as_ptr(&other.inner))
    }

    /// Borrow the object
    ///
    /// # Panics
    ///
    /// Panics if the object is currently mutably borrowed.
    pub fn borrow(&self) -> Ref<'_, dyn Invocable> {
        self.inner.borrow()
    }

    pub fn try_borrow_mut(&self) -> Result<RefMut<'_, dyn Invocable>, BorrowMutError> {
        self.inner.try_borrow_mut()
    }

    /// Check the concrete type of the object
    pub fn is<T: 'static>(&self) -> bool {
        self.inner
            .try_borrow()
            .map(|obj| obj.as_any().is::<T>())
            .unwrap_or(false)
    }

    /// Run `f` against the object downcast to `T`
    ///
    /// Returns `None` if the object is not a `T` or is mutably borrowed.
    pub fn with<T: 'static, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let obj = self.inner.try_borrow().ok()?;
        obj.as_any().downcast_ref::<T>().map(f)
    }

    /// Mutable variant of [`ObjectRef::with`]
    pub fn with_mut<T: 'static, R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut obj = self.inner.try_borrow_mut().ok()?;
        obj.as_any_mut().downcast_mut::<T>().map(f)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_borrow() {
            Ok(obj) => fmt::Debug::fmt(&*obj, f),
            Err(_) => write!(f, "{}(<borrowed>)", self.type_name),
        }
    }
}

/// A value held on the object stack or passed as a call argument
#[derive(Debug, Clone)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Object(ObjectRef),
}

impl Value {
    /// Wrap a domain object
    pub fn object<T: Invocable>(value: T) -> Self {
        Value::Object(ObjectRef::new(value))
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Bool(_) => ValueType::Bool,
            Value::Int(_) => ValueType::Int,
            Value::Float(_) => ValueType::Float,
            Value::Str(_) => ValueType::Str,
            Value::Object(obj) => ValueType::Object(obj.type_name()),
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn into_object(self) -> Option<ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Object(obj) => f.write_str(obj.type_name()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<ObjectRef> for Value {
    fn from(obj: ObjectRef) -> Self {
        Value::Object(obj)
    }
}
